use std::sync::atomic::{AtomicBool, Ordering};
use std::time::{Duration, Instant};

use ns_utils::BlockPos;
use tracing::{debug, trace};

use crate::context::CalculationContext;
use crate::goal::Goal;
use crate::movement::Move;
use crate::node::{NodeArena, OpenSet};
use crate::path::Path;

/// A relaxation below this is noise and not worth a heap update.
const MIN_IMPROVEMENT: f32 = 0.01;
/// Cancel and timeout checks happen once per this many expansions.
const CHECK_INTERVAL: usize = 64;

#[derive(Debug)]
pub enum SearchOutcome {
    /// The popped node satisfied the goal.
    Success(Path),
    /// Budget ran out; this is the least-bad prefix found.
    Partial(Path),
    /// Nothing useful was reachable in budget.
    Failure,
    Cancelled,
}

impl SearchOutcome {
    pub fn path(&self) -> Option<&Path> {
        match self {
            SearchOutcome::Success(p) | SearchOutcome::Partial(p) => Some(p),
            _ => None,
        }
    }
}

/// Tracks, per cost-vs-heuristic trade-off coefficient, the most
/// promising node seen. On timeout the first coefficient whose champion
/// made real progress supplies the partial path.
struct BestSoFar {
    coefficients: Vec<f32>,
    value: Vec<f32>,
    node: Vec<u32>,
}

impl BestSoFar {
    fn new(coefficients: &[f32], start_h: f32) -> BestSoFar {
        BestSoFar {
            coefficients: coefficients.to_vec(),
            value: vec![start_h; coefficients.len()],
            node: vec![0; coefficients.len()],
        }
    }

    fn observe(&mut self, index: u32, g: f32, h: f32) {
        for (i, coef) in self.coefficients.iter().enumerate() {
            let value = h + g / coef;
            if value < self.value[i] - MIN_IMPROVEMENT {
                self.value[i] = value;
                self.node[i] = index;
            }
        }
    }

    /// The champion of the first coefficient that moved at least
    /// `min_progress` blocks from the start, if any.
    fn best(&self, arena: &NodeArena, start: BlockPos, min_progress: f32) -> Option<u32> {
        let min_sq = min_progress * min_progress;
        self.node
            .iter()
            .copied()
            .find(|&n| arena.get(n).pos.distance_sq(start) >= min_sq)
    }
}

/// One time-boxed A* calculation over the movement catalogue.
pub fn search(
    ctx: &CalculationContext,
    start: BlockPos,
    goal: &Goal,
    cancel: &AtomicBool,
) -> SearchOutcome {
    let started = Instant::now();
    let primary = Duration::from_millis(ctx.settings.primary_timeout_ms);
    let failure = Duration::from_millis(ctx.settings.failure_timeout_ms);

    let mut arena = NodeArena::default();
    let mut open = OpenSet::default();
    let start_h = goal.heuristic(start);
    let start_index = arena.get_or_insert(start, start_h);
    arena.get_mut(start_index).g = 0.0;
    open.push(&mut arena, start_index);

    let mut best = BestSoFar::new(&ctx.settings.coefficients, start_h);
    let mut edges = Vec::with_capacity(32);
    let mut expanded = 0usize;
    let mut cancelled = false;

    while let Some(current) = open.pop(&mut arena) {
        expanded += 1;
        if expanded % CHECK_INTERVAL == 0 {
            if cancel.load(Ordering::Relaxed) {
                cancelled = true;
                break;
            }
            let useful_partial = best
                .best(&arena, start, ctx.settings.min_partial_progress)
                .is_some();
            let budget = if useful_partial { primary } else { failure };
            if started.elapsed() > budget {
                trace!(expanded, "search budget exhausted");
                break;
            }
        }

        let node = arena.get(current);
        let pos = node.pos;
        let g = node.g;
        if goal.is_in_goal(pos) {
            let positions = arena.reconstruct(current);
            debug!(
                expanded,
                length = positions.len(),
                elapsed_ms = started.elapsed().as_millis() as u64,
                "path found"
            );
            return SearchOutcome::Success(Path::new(positions, goal.clone(), true, expanded));
        }

        edges.clear();
        crate::movement::candidates(ctx, pos, &mut edges);
        for &(mv, cost) in &edges {
            debug_assert!(cost > 0.0 && cost.is_finite());
            let tentative = g + cost;
            let h = goal.heuristic(mv.dest);
            let neighbor = arena.get_or_insert(mv.dest, h);
            let entry = arena.get_mut(neighbor);
            if tentative < entry.g - MIN_IMPROVEMENT {
                entry.g = tentative;
                entry.parent = current;
                if arena.get(neighbor).in_open_set() {
                    open.update(&mut arena, neighbor);
                } else {
                    open.push(&mut arena, neighbor);
                }
                best.observe(neighbor, tentative, h);
            }
        }
    }

    if cancelled {
        debug!(expanded, "search cancelled");
        return SearchOutcome::Cancelled;
    }
    match best.best(&arena, start, ctx.settings.min_partial_progress) {
        Some(node) if node != start_index => {
            let positions = arena.reconstruct(node);
            debug!(
                expanded,
                length = positions.len(),
                "search yields partial path"
            );
            SearchOutcome::Partial(Path::new(positions, goal.clone(), false, expanded))
        }
        _ => {
            debug!(expanded, "search failed");
            SearchOutcome::Failure
        }
    }
}

/// Verifies the spiritual A* invariant the executor depends on: costs
/// along a reconstructed path never decrease.
pub fn g_is_monotone(path: &Path, ctx: &CalculationContext) -> bool {
    let mut g = 0.0f32;
    for mv in path.movements() {
        let cost = mv.cost(ctx);
        if !cost.is_finite() || cost <= 0.0 {
            return false;
        }
        let next = g + cost;
        if next < g {
            return false;
        }
        g = next;
    }
    true
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::sync::atomic::AtomicBool;

    use super::*;
    use crate::context::EmptyInventory;
    use crate::settings::PathSettings;
    use ns_world::{WorldGrid, block_state};

    const STONE: u16 = block_state(1, 0);

    fn flat_ctx() -> CalculationContext {
        let mut world = WorldGrid::default();
        world.fill_layer(BlockPos::new(-16, 64, -16), BlockPos::new(31, 64, 31), STONE);
        CalculationContext::new(
            Arc::new(world),
            PathSettings::default(),
            Arc::new(EmptyInventory),
        )
    }

    #[test]
    fn finds_straight_line_on_flat_ground() {
        let ctx = flat_ctx();
        let cancel = AtomicBool::new(false);
        let goal = Goal::Block(BlockPos::new(8, 65, 0));
        let out = search(&ctx, BlockPos::new(0, 65, 0), &goal, &cancel);
        let SearchOutcome::Success(path) = out else {
            panic!("expected success, got {out:?}");
        };
        assert!(path.reaches_goal);
        assert_eq!(path.start(), BlockPos::new(0, 65, 0));
        assert_eq!(path.end(), BlockPos::new(8, 65, 0));
        assert!(g_is_monotone(&path, &ctx));
    }

    #[test]
    fn routes_around_a_wall() {
        let mut world = WorldGrid::default();
        world.fill_layer(BlockPos::new(-16, 64, -16), BlockPos::new(31, 64, 31), STONE);
        // Tall wall across z at x=4, with a doorway far to the south.
        for z in -16..=8 {
            for y in 65..=68 {
                world.set_block(BlockPos::new(4, y, z), STONE);
            }
        }
        let ctx = CalculationContext::new(
            Arc::new(world),
            PathSettings {
                allow_break: false,
                allow_place: false,
                ..PathSettings::default()
            },
            Arc::new(EmptyInventory),
        );
        let cancel = AtomicBool::new(false);
        let goal = Goal::Block(BlockPos::new(8, 65, 0));
        let out = search(&ctx, BlockPos::new(0, 65, 0), &goal, &cancel);
        let SearchOutcome::Success(path) = out else {
            panic!("expected success, got {out:?}");
        };
        // The route must pass the doorway south of the wall.
        assert!(path.positions().iter().any(|p| p.z > 8));
    }

    #[test]
    fn already_there_is_immediate_success() {
        let ctx = flat_ctx();
        let cancel = AtomicBool::new(false);
        let goal = Goal::Block(BlockPos::new(0, 65, 0));
        let out = search(&ctx, BlockPos::new(0, 65, 0), &goal, &cancel);
        let SearchOutcome::Success(path) = out else {
            panic!("expected success, got {out:?}");
        };
        assert_eq!(path.len(), 1);
    }

    #[test]
    fn pre_cancelled_search_reports_cancelled() {
        let ctx = flat_ctx();
        let cancel = AtomicBool::new(true);
        // Unreachable goal so the loop runs long enough to hit a check.
        let goal = Goal::Block(BlockPos::new(9999, 65, 0));
        let out = search(&ctx, BlockPos::new(0, 65, 0), &goal, &cancel);
        assert!(matches!(out, SearchOutcome::Cancelled));
    }

    #[test]
    fn strict_direction_yields_partial() {
        // Never satisfiable; exhausting the loaded area must still hand
        // back the deepest prefix along the direction.
        let ctx = flat_ctx();
        let cancel = AtomicBool::new(false);
        let goal = Goal::strict_direction(BlockPos::new(0, 65, 0), 1, 0);
        let out = search(&ctx, BlockPos::new(0, 65, 0), &goal, &cancel);
        let SearchOutcome::Partial(path) = out else {
            panic!("expected partial, got {out:?}");
        };
        assert!(!path.reaches_goal);
        assert!(path.end().x > 5);
    }

    #[test]
    fn boxed_in_agent_fails() {
        let mut world = WorldGrid::default();
        world.fill_layer(BlockPos::new(-16, 64, -16), BlockPos::new(31, 64, 31), STONE);
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            for y in 65..=67 {
                world.set_block(BlockPos::new(dx, y, dz), STONE);
            }
        }
        world.set_block(BlockPos::new(0, 67, 0), STONE);
        let ctx = CalculationContext::new(
            Arc::new(world),
            PathSettings {
                allow_break: false,
                allow_place: false,
                ..PathSettings::default()
            },
            Arc::new(EmptyInventory),
        );
        let cancel = AtomicBool::new(false);
        let goal = Goal::Block(BlockPos::new(8, 65, 0));
        let out = search(&ctx, BlockPos::new(0, 65, 0), &goal, &cancel);
        assert!(matches!(out, SearchOutcome::Failure), "got {out:?}");
    }
}
