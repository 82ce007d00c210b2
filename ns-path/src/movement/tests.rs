use std::sync::Arc;

use ns_utils::BlockPos;
use ns_world::{WorldGrid, block_state};

use super::*;
use crate::context::{CalculationContext, InventoryQuery};
use crate::cost::{
    COST_INF, JUMP_ONE_BLOCK_COST, SPRINT_ONE_BLOCK_COST, WALK_ONE_BLOCK_COST,
};

const STONE: u16 = block_state(1, 0);

struct FullInventory;

impl InventoryQuery for FullInventory {
    fn has_throwaway_item(&self) -> bool {
        true
    }
    fn has_water_bucket(&self) -> bool {
        true
    }
    fn tool_speed_against(&self, _state: u16) -> f32 {
        10.0
    }
}

fn flat_world() -> WorldGrid {
    let mut world = WorldGrid::default();
    world.fill_layer(BlockPos::new(-16, 64, -16), BlockPos::new(31, 64, 31), STONE);
    world
}

fn ctx(world: WorldGrid) -> CalculationContext {
    CalculationContext::new(
        Arc::new(world),
        crate::settings::PathSettings::default(),
        Arc::new(crate::context::EmptyInventory),
    )
}

fn ctx_full(world: WorldGrid) -> CalculationContext {
    CalculationContext::new(
        Arc::new(world),
        crate::settings::PathSettings::default(),
        Arc::new(FullInventory),
    )
}

#[test]
fn sprint_traverse_is_at_most_walk_cost() {
    let ctx = ctx(flat_world());
    let src = BlockPos::new(0, 65, 0);
    let mv = Move::new(MoveKind::Traverse, src, BlockPos::new(1, 65, 0));
    let cost = mv.cost(&ctx);
    assert!(cost.is_finite());
    assert!(cost <= WALK_ONE_BLOCK_COST);
    assert!((cost - SPRINT_ONE_BLOCK_COST).abs() < 1e-4);
}

#[test]
fn traverse_into_wall_adds_mining_time() {
    let mut world = flat_world();
    world.set_block(BlockPos::new(1, 65, 0), STONE);
    world.set_block(BlockPos::new(1, 66, 0), STONE);
    let ctx = ctx_full(world);
    let mv = Move::new(
        MoveKind::Traverse,
        BlockPos::new(0, 65, 0),
        BlockPos::new(1, 65, 0),
    );
    let plan = mv.plan(&ctx);
    assert!(plan.cost.is_finite());
    assert!(plan.cost > WALK_ONE_BLOCK_COST);
    assert_eq!(plan.breaks.len(), 2);
}

#[test]
fn traverse_over_void_is_infeasible() {
    let mut world = flat_world();
    world.set_block(BlockPos::new(1, 64, 0), 0);
    let ctx = ctx(world);
    let mv = Move::new(
        MoveKind::Traverse,
        BlockPos::new(0, 65, 0),
        BlockPos::new(1, 65, 0),
    );
    assert_eq!(mv.cost(&ctx), COST_INF);
}

#[test]
fn pillar_cost_is_jump_place_penalty() {
    let ctx = ctx_full(flat_world());
    let src = BlockPos::new(0, 65, 0);
    let plan = Move::new(MoveKind::Pillar, src, src.up()).plan(&ctx);
    let expected =
        JUMP_ONE_BLOCK_COST + ctx.settings.place_block_cost + ctx.settings.jump_penalty;
    assert!((plan.cost - expected).abs() < 1e-4);
    assert_eq!(plan.place, Some(src));
}

#[test]
fn pillar_without_throwaway_is_infeasible() {
    let ctx = ctx(flat_world());
    let src = BlockPos::new(0, 65, 0);
    assert_eq!(Move::new(MoveKind::Pillar, src, src.up()).cost(&ctx), COST_INF);
}

#[test]
fn ten_block_fall_needs_a_bucket() {
    // Ledge at y=75 stepping east off into a 10-block drop to the floor.
    let mut world = flat_world();
    world.set_block(BlockPos::new(0, 74, 0), STONE);
    let src = BlockPos::new(0, 75, 0);
    let dest = BlockPos::new(1, 65, 0);
    let mv = Move::new(MoveKind::Descend, src, dest);

    assert_eq!(mv.cost(&ctx(world.clone())), COST_INF);
    let with_bucket = mv.cost(&ctx_full(world));
    assert!(with_bucket.is_finite());
}

#[test]
fn three_block_fall_is_fine_dry() {
    let mut world = flat_world();
    world.set_block(BlockPos::new(0, 67, 0), STONE);
    let src = BlockPos::new(0, 68, 0);
    let dest = BlockPos::new(1, 65, 0);
    let cost = Move::new(MoveKind::Descend, src, dest).cost(&ctx(world));
    assert!(cost.is_finite());
}

#[test]
fn descend_with_absent_floor_places_exactly_one_block() {
    // The cell stepped down into has no floor; the plan scaffolds it.
    let mut world = flat_world();
    for y in 56..=64 {
        world.set_block(BlockPos::new(1, y, 0), 0);
    }
    // The cleared column still borders the floor slab the agent stands
    // on, so a scaffold block can be clicked into place.
    let src = BlockPos::new(0, 65, 0);
    let dest = BlockPos::new(1, 64, 0);
    let plan = Move::new(MoveKind::Descend, src, dest).plan(&ctx_full(world));
    assert!(plan.cost.is_finite());
    assert_eq!(plan.place, Some(dest.down()));
    assert!(plan.breaks.is_empty());
}

#[test]
fn four_block_gap_is_infeasible() {
    // Landing 5 cells out means a 4-cell gap, beyond the catalogue.
    let mut world = flat_world();
    for x in 1..=4 {
        world.set_block(BlockPos::new(x, 64, 0), 0);
    }
    let ctx = ctx(world);
    let src = BlockPos::new(0, 65, 0);
    let mut out = Vec::new();
    candidates(&ctx, src, &mut out);
    assert!(
        !out.iter()
            .any(|(mv, _)| mv.dest == BlockPos::new(5, 65, 0))
    );
}

#[test]
fn three_block_gap_is_a_parkour_edge() {
    let mut world = flat_world();
    for x in 1..=2 {
        world.set_block(BlockPos::new(x, 64, 0), 0);
    }
    let ctx = ctx(world);
    let src = BlockPos::new(0, 65, 0);
    let mut out = Vec::new();
    candidates(&ctx, src, &mut out);
    let jump = out
        .iter()
        .find(|(mv, _)| mv.kind == MoveKind::Parkour(3) && mv.dest == BlockPos::new(3, 65, 0));
    assert!(jump.is_some());
}

#[test]
fn parkour_rejects_supported_gap() {
    // A floor under the "gap" means a walk is possible; the jump edge
    // must not exist.
    let ctx = ctx(flat_world());
    let src = BlockPos::new(0, 65, 0);
    let mv = Move::new(MoveKind::Parkour(2), src, BlockPos::new(2, 65, 0));
    assert_eq!(mv.cost(&ctx), COST_INF);
}

#[test]
fn diagonal_needs_a_clear_corner() {
    let mut world = flat_world();
    // Wall both corner columns.
    for (x, z) in [(1, 0), (0, 1)] {
        world.set_block(BlockPos::new(x, 65, z), STONE);
        world.set_block(BlockPos::new(x, 66, z), STONE);
    }
    let ctx = ctx(world);
    let src = BlockPos::new(0, 65, 0);
    let mv = Move::new(MoveKind::Diagonal, src, BlockPos::new(1, 65, 1));
    assert_eq!(mv.cost(&ctx), COST_INF);
}

#[test]
fn diagonal_with_one_corner_open_is_feasible() {
    let mut world = flat_world();
    world.set_block(BlockPos::new(1, 65, 0), STONE);
    world.set_block(BlockPos::new(1, 66, 0), STONE);
    let ctx = ctx(world);
    let src = BlockPos::new(0, 65, 0);
    let cost = Move::new(MoveKind::Diagonal, src, BlockPos::new(1, 65, 1)).cost(&ctx);
    assert!(cost.is_finite());
    assert!(cost > SPRINT_ONE_BLOCK_COST);
}

#[test]
fn downward_digs_through_the_floor() {
    let mut world = flat_world();
    world.set_block(BlockPos::new(0, 63, 0), STONE);
    // Floor below the dug cell so the drop lands.
    world.set_block(BlockPos::new(0, 62, 0), STONE);
    let ctx = ctx_full(world);
    let src = BlockPos::new(0, 65, 0);
    let plan = Move::new(MoveKind::Downward, src, src.down()).plan(&ctx);
    assert!(plan.cost.is_finite());
    assert_eq!(plan.breaks, vec![src.down()]);
}

#[test]
fn cost_sentinel_is_never_nan_or_nonpositive() {
    let mut world = flat_world();
    world.set_block(BlockPos::new(2, 65, 1), STONE);
    world.set_block(BlockPos::new(-1, 64, 0), 0);
    let ctx = ctx_full(world);
    for x in -2..=2 {
        for z in -2..=2 {
            let mut out = Vec::new();
            candidates(&ctx, BlockPos::new(x, 65, z), &mut out);
            for (mv, cost) in out {
                assert!(!cost.is_nan(), "{mv:?}");
                assert!(cost > 0.0, "{mv:?} cost {cost}");
            }
        }
    }
}

#[test]
fn between_classifies_offsets() {
    let src = BlockPos::new(0, 65, 0);
    let cases = [
        (BlockPos::new(1, 65, 0), MoveKind::Traverse),
        (BlockPos::new(0, 66, -1), MoveKind::Ascend),
        (BlockPos::new(-1, 62, 0), MoveKind::Descend),
        (BlockPos::new(1, 65, 1), MoveKind::Diagonal),
        (BlockPos::new(0, 65, 3), MoveKind::Parkour(3)),
        (BlockPos::new(0, 66, 0), MoveKind::Pillar),
        (BlockPos::new(0, 64, 0), MoveKind::Downward),
    ];
    for (dest, kind) in cases {
        let mv = Move::between(src, dest).unwrap();
        assert_eq!(mv.kind, kind, "{dest:?}");
    }
    assert!(Move::between(src, BlockPos::new(2, 66, 0)).is_none());
    assert!(Move::between(src, src).is_none());
}

#[test]
fn traverse_update_reaches_success_on_arrival() {
    let world = flat_world();
    let settings = crate::settings::PathSettings::default();
    let mv = Move::new(
        MoveKind::Traverse,
        BlockPos::new(0, 65, 0),
        BlockPos::new(1, 65, 0),
    );
    let mut state = MoveState::new();
    let mut agent = ns_sim::AgentState {
        pos: BlockPos::new(0, 65, 0).center_bottom(),
        on_ground: true,
        ..Default::default()
    };
    for _ in 0..60 {
        mv.update(&mut state, &agent, &world, &settings);
        if state.is_terminal() {
            break;
        }
        let next = ns_sim::step_tick(&agent, &state.as_input(), &world);
        agent = next;
    }
    assert_eq!(state.status, MoveStatus::Success);
}

#[test]
fn movement_times_out_when_stuck() {
    let mut world = flat_world();
    world.set_block(BlockPos::new(1, 65, 0), STONE);
    world.set_block(BlockPos::new(1, 66, 0), STONE);
    let settings = crate::settings::PathSettings::default();
    let mv = Move::new(
        MoveKind::Parkour(2),
        BlockPos::new(0, 65, 0),
        BlockPos::new(2, 65, 0),
    );
    let mut state = MoveState::new();
    let agent = ns_sim::AgentState {
        pos: BlockPos::new(0, 65, 0).center_bottom(),
        on_ground: true,
        ..Default::default()
    };
    for _ in 0..=settings.movement_timeout_ticks {
        mv.update(&mut state, &agent, &world, &settings);
    }
    assert_eq!(state.status, MoveStatus::Failed);
}
