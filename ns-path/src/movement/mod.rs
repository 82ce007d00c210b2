mod costs;
mod exec;

#[cfg(test)]
mod tests;

use ns_sim::{AgentInput, AgentState, ControlIntent};
use ns_utils::{BlockPos, Direction};
use ns_world::WorldGrid;

use crate::context::CalculationContext;
use crate::cost::COST_INF;
use crate::settings::PathSettings;

pub use costs::candidates;
pub(crate) use exec::break_face;

/// The closed set of legal transitions between adjacent path nodes.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveKind {
    /// One block horizontally, same level.
    Traverse,
    /// One block horizontally plus a jump up one.
    Ascend,
    /// One block horizontally and down, extended to multi-block fall
    /// columns.
    Descend,
    /// One block along both horizontal axes, dy in -1..=1.
    Diagonal,
    /// Flat gap jump over n-1 unsupported cells, n in 2..=4.
    Parkour(u8),
    /// Straight up by jump-and-place or a climbable.
    Pillar,
    /// Straight down by digging out the cell underfoot.
    Downward,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum MoveStatus {
    /// Clearing obstructions before the body moves.
    Preparing,
    Running,
    Success,
    /// Tick budget overrun or the world no longer matches the plan.
    Failed,
    /// The agent ended up somewhere this movement cannot recover from.
    Unreachable,
}

/// Per-tick output of a movement state machine, consumed by the executor.
#[derive(Clone, Debug)]
pub struct MoveState {
    pub yaw: f32,
    pub pitch: f32,
    pub forward: f32,
    pub jump: bool,
    pub sneak: bool,
    pub sprint: bool,
    pub break_target: Option<(BlockPos, Direction)>,
    pub place_target: Option<(BlockPos, Direction)>,
    pub status: MoveStatus,
    pub ticks: u32,
}

impl MoveState {
    pub fn new() -> MoveState {
        MoveState {
            yaw: 0.0,
            pitch: 0.0,
            forward: 0.0,
            jump: false,
            sneak: false,
            sprint: false,
            break_target: None,
            place_target: None,
            status: MoveStatus::Preparing,
            ticks: 0,
        }
    }

    pub fn as_input(&self) -> AgentInput {
        AgentInput {
            forward: self.forward,
            strafe: 0.0,
            jump: self.jump,
            sprint: self.sprint,
            sneak: self.sneak,
            yaw: self.yaw,
            pitch: self.pitch,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self.status,
            MoveStatus::Success | MoveStatus::Failed | MoveStatus::Unreachable
        )
    }

    pub fn intents(&self) -> Vec<ControlIntent> {
        let mut out = vec![
            ControlIntent::LookAt {
                yaw: self.yaw,
                pitch: self.pitch,
            },
            ControlIntent::SetForward(self.forward),
            ControlIntent::SetJump(self.jump),
            ControlIntent::SetSneak(self.sneak),
            ControlIntent::SetSprint(self.sprint),
        ];
        if let Some((pos, face)) = self.break_target {
            if self.ticks <= 1 {
                out.push(ControlIntent::StartBreak { pos, face });
            } else {
                out.push(ControlIntent::ContinueBreak { pos, face });
            }
        }
        if let Some((pos, face)) = self.place_target {
            out.push(ControlIntent::Place { pos, face });
        }
        out
    }
}

impl Default for MoveState {
    fn default() -> Self {
        Self::new()
    }
}

/// What a movement would do to the world: total cost plus the cells it
/// clears and the at-most-one cell it scaffolds. Cost `+∞` marks the
/// whole plan infeasible.
#[derive(Clone, Debug)]
pub struct MovePlan {
    pub cost: f32,
    pub breaks: Vec<BlockPos>,
    pub place: Option<BlockPos>,
}

impl MovePlan {
    pub fn new() -> MovePlan {
        MovePlan {
            cost: 0.0,
            breaks: Vec::new(),
            place: None,
        }
    }

    pub fn infeasible() -> MovePlan {
        MovePlan {
            cost: COST_INF,
            breaks: Vec::new(),
            place: None,
        }
    }

    pub fn is_feasible(&self) -> bool {
        self.cost.is_finite()
    }
}

impl Default for MovePlan {
    fn default() -> Self {
        Self::new()
    }
}

/// One atomic transition from `src` feet cell to `dest` feet cell. The
/// plan is recomputed from world state on demand so an executor can
/// re-verify edges that were costed against an older snapshot.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Move {
    pub kind: MoveKind,
    pub src: BlockPos,
    pub dest: BlockPos,
}

impl Move {
    pub fn new(kind: MoveKind, src: BlockPos, dest: BlockPos) -> Move {
        Move { kind, src, dest }
    }

    /// Classifies the offset between two consecutive path cells back into
    /// a movement, for re-synthesis from a stored path.
    pub fn between(src: BlockPos, dest: BlockPos) -> Option<Move> {
        let d = dest - src;
        let kind = match (d.x, d.y, d.z) {
            (0, 1, 0) => MoveKind::Pillar,
            (0, -1, 0) => MoveKind::Downward,
            (x, 0, z) if x.abs() + z.abs() == 1 => MoveKind::Traverse,
            (x, 1, z) if x.abs() + z.abs() == 1 => MoveKind::Ascend,
            (x, y, z) if x.abs() + z.abs() == 1 && y < 0 => MoveKind::Descend,
            (x, y, z) if x.abs() == 1 && z.abs() == 1 && (-1..=1).contains(&y) => {
                MoveKind::Diagonal
            }
            (x, 0, 0) if (2..=4).contains(&x.abs()) => MoveKind::Parkour(x.unsigned_abs() as u8),
            (0, 0, z) if (2..=4).contains(&z.abs()) => MoveKind::Parkour(z.unsigned_abs() as u8),
            _ => return None,
        };
        Some(Move { kind, src, dest })
    }

    /// Horizontal travel direction, if the movement has one.
    pub fn direction(&self) -> Option<Direction> {
        let d = self.dest - self.src;
        if d.x > 0 {
            Some(Direction::East)
        } else if d.x < 0 {
            Some(Direction::West)
        } else if d.z > 0 {
            Some(Direction::South)
        } else if d.z < 0 {
            Some(Direction::North)
        } else {
            None
        }
    }

    pub fn plan(&self, ctx: &CalculationContext) -> MovePlan {
        match self.kind {
            MoveKind::Traverse => costs::traverse(ctx, self.src, self.dest),
            MoveKind::Ascend => costs::ascend(ctx, self.src, self.dest),
            MoveKind::Descend => costs::descend(ctx, self.src, self.dest),
            MoveKind::Diagonal => costs::diagonal(ctx, self.src, self.dest),
            MoveKind::Parkour(n) => costs::parkour(ctx, self.src, self.dest, n),
            MoveKind::Pillar => costs::pillar(ctx, self.src),
            MoveKind::Downward => costs::downward(ctx, self.src),
        }
    }

    pub fn cost(&self, ctx: &CalculationContext) -> f32 {
        self.plan(ctx).cost
    }

    /// Advances the per-tick state machine against the live agent and
    /// world. Terminal statuses stick.
    pub fn update(
        &self,
        state: &mut MoveState,
        agent: &AgentState,
        world: &WorldGrid,
        settings: &PathSettings,
    ) {
        exec::update(self, state, agent, world, settings);
    }
}
