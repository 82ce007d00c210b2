use bevy::prelude::Vec3;
use ns_sim::AgentState;
use ns_utils::{BlockPos, Direction};
use ns_world::{BlockInfo, WorldGrid, is_climbable, is_solid, is_water};

use super::{Move, MoveKind, MoveState, MoveStatus};
use crate::settings::PathSettings;

/// Yaw that points the sim's forward vector from `from` toward `to`.
fn yaw_toward(from: Vec3, to: Vec3) -> f32 {
    let dx = to.x - from.x;
    let dz = to.z - from.z;
    (-dx).atan2(-dz)
}

fn horizontal_dist_sq(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    dx * dx + dz * dz
}

/// The face of `target` an agent standing in `agent_cell` would hit.
pub(crate) fn break_face(agent_cell: BlockPos, target: BlockPos) -> Direction {
    let d = target - agent_cell;
    if d.y < 0 {
        Direction::Up
    } else if d.y > 0 {
        Direction::Down
    } else if d.x > 0 {
        Direction::West
    } else if d.x < 0 {
        Direction::East
    } else if d.z > 0 {
        Direction::North
    } else {
        Direction::South
    }
}

/// Picks a solid neighbor of `cell` to click against and the face of
/// that neighbor pointing back into `cell`.
fn place_face(world: &WorldGrid, cell: BlockPos) -> Option<(BlockPos, Direction)> {
    for dir in [
        Direction::Down,
        Direction::North,
        Direction::South,
        Direction::West,
        Direction::East,
        Direction::Up,
    ] {
        let neighbor = cell.shift(dir);
        if world.state(neighbor).is_some_and(is_solid) {
            return Some((neighbor, dir.opposite()));
        }
    }
    None
}

fn cell_blocked(world: &WorldGrid, pos: BlockPos) -> bool {
    world
        .state(pos)
        .map(BlockInfo::of)
        .is_some_and(|info| info.blocks_motion && info.snow_layers == 0)
}

fn supported(world: &WorldGrid, feet: BlockPos) -> bool {
    world.state(feet.down()).is_some_and(is_solid)
        || world.state(feet).is_some_and(is_water)
        || world.state(feet).is_some_and(is_climbable)
}

/// Cells this movement may have planned to clear, in clearing order.
fn obstruction_cells(mv: &Move) -> Vec<BlockPos> {
    match mv.kind {
        MoveKind::Traverse => vec![mv.dest.up(), mv.dest],
        MoveKind::Ascend => vec![mv.src.up_by(2), mv.dest.up(), mv.dest],
        MoveKind::Descend => {
            let edge = BlockPos::new(mv.dest.x, mv.src.y, mv.dest.z);
            vec![edge.up(), edge]
        }
        MoveKind::Pillar => vec![mv.src.up_by(2)],
        MoveKind::Downward => vec![mv.dest],
        MoveKind::Diagonal | MoveKind::Parkour(_) => Vec::new(),
    }
}

pub(super) fn update(
    mv: &Move,
    state: &mut MoveState,
    agent: &AgentState,
    world: &WorldGrid,
    settings: &PathSettings,
) {
    if state.is_terminal() {
        return;
    }
    if state.ticks >= settings.movement_timeout_ticks {
        state.status = MoveStatus::Failed;
        return;
    }
    state.ticks += 1;
    state.forward = 0.0;
    state.jump = false;
    state.sneak = false;
    state.sprint = false;
    state.break_target = None;
    state.place_target = None;

    let feet = BlockPos::from_feet(agent.pos);
    let floor_y = mv.src.y.min(mv.dest.y);
    if feet.y < floor_y - 1 {
        state.status = MoveStatus::Unreachable;
        return;
    }
    if feet == mv.dest && supported(world, feet) {
        state.status = MoveStatus::Success;
        return;
    }

    // Still digging. Face the obstruction and keep the break request up.
    if let Some(block) = obstruction_cells(mv)
        .into_iter()
        .find(|&p| cell_blocked(world, p))
    {
        state.status = MoveStatus::Preparing;
        let target = block.center();
        let eye = agent.pos + Vec3::new(0.0, 1.62, 0.0);
        state.yaw = yaw_toward(agent.pos, target);
        state.pitch = (eye.y - target.y).atan2(horizontal_dist_sq(eye, target).sqrt().max(0.01));
        state.break_target = Some((block, break_face(feet, block)));
        return;
    }
    state.status = MoveStatus::Running;

    let dest_center = mv.dest.center_bottom();
    match mv.kind {
        MoveKind::Traverse => {
            state.yaw = yaw_toward(agent.pos, dest_center);
            state.pitch = 0.0;
            state.forward = 1.0;
            state.sprint = settings.allow_sprint;
        }
        MoveKind::Ascend => {
            state.yaw = yaw_toward(agent.pos, dest_center);
            state.pitch = 0.0;
            state.forward = 1.0;
            state.jump = agent.on_ground;
            let floor = mv.dest.down();
            if !cell_blocked(world, floor) && !world.state(floor).is_some_and(is_solid) {
                state.place_target = place_face(world, floor);
            }
        }
        MoveKind::Descend => {
            state.yaw = yaw_toward(agent.pos, dest_center);
            state.pitch = 0.0;
            // Ease off near the landing center so the fall stays in the
            // destination column.
            let close = horizontal_dist_sq(agent.pos, dest_center) < 0.04;
            state.forward = if close { 0.0 } else { 1.0 };
            let floor = mv.dest.down();
            if feet.y <= mv.dest.y + 1 && !world.state(floor).is_some_and(is_solid) {
                state.place_target = place_face(world, floor);
            }
        }
        MoveKind::Diagonal => {
            state.yaw = yaw_toward(agent.pos, dest_center);
            state.pitch = 0.0;
            state.forward = 1.0;
            state.sprint = settings.allow_sprint && mv.dest.y == mv.src.y;
        }
        MoveKind::Parkour(n) => {
            state.yaw = yaw_toward(agent.pos, dest_center);
            state.pitch = 0.0;
            state.forward = 1.0;
            state.sprint = n >= 3 || settings.allow_sprint;
            // Leave jumping to the last moment on the edge.
            let src_center = mv.src.center_bottom();
            let off_center = horizontal_dist_sq(agent.pos, src_center) > 0.12;
            state.jump = agent.on_ground && off_center;
        }
        MoveKind::Pillar => {
            if world.state(mv.src).is_some_and(is_climbable) {
                // Press into the wall carrying the climbable.
                let wall = Direction::horizontal()
                    .into_iter()
                    .find(|d| world.state(mv.src.shift(*d)).is_some_and(is_solid));
                if let Some(dir) = wall {
                    state.yaw = dir.yaw();
                    state.forward = 1.0;
                } else {
                    state.jump = true;
                }
            } else if world.state(mv.src).is_some_and(is_water) {
                state.jump = true;
            } else {
                state.yaw = agent.yaw;
                state.pitch = std::f32::consts::FRAC_PI_2;
                state.jump = true;
                if agent.pos.y > mv.src.y as f32 + 0.9 && !cell_blocked(world, mv.src) {
                    state.place_target = place_face(world, mv.src);
                }
            }
        }
        MoveKind::Downward => {
            state.yaw = agent.yaw;
            state.pitch = std::f32::consts::FRAC_PI_2;
            // Obstruction already cleared; just let gravity finish.
        }
    }
}
