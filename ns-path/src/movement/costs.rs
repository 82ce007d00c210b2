use ns_utils::{BlockPos, Direction};

use super::{Move, MoveKind, MovePlan};
use crate::context::CalculationContext;
use crate::cost::{
    CENTER_AFTER_FALL_COST, COST_INF, JUMP_ONE_BLOCK_COST, LADDER_DOWN_ONE_COST,
    LADDER_UP_ONE_COST, SPRINT_ONE_BLOCK_COST, SQRT_2, WALK_OFF_BLOCK_COST, WALK_ONE_BLOCK_COST,
    WALK_ONE_IN_WATER_COST,
};

/// Adds the clearing cost for `pos` to the plan. Returns false when the
/// cell can neither be walked through nor broken.
fn clear_or_break(ctx: &CalculationContext, pos: BlockPos, plan: &mut MovePlan) -> bool {
    let b = ctx.break_cost(pos);
    if b == COST_INF {
        return false;
    }
    if b > 0.0 {
        plan.breaks.push(pos);
        plan.cost += b;
    }
    true
}

/// Slowdown divisor from the block the agent walks across. Soul sand and
/// similar report a factor below one.
fn floor_speed(ctx: &CalculationContext, floor: BlockPos) -> f32 {
    match ctx.info(floor) {
        Some(info) => info.speed_factor.max(0.01),
        None => 1.0,
    }
}

pub(super) fn traverse(ctx: &CalculationContext, src: BlockPos, dest: BlockPos) -> MovePlan {
    let mut plan = MovePlan::new();
    if !clear_or_break(ctx, dest, &mut plan) || !clear_or_break(ctx, dest.up(), &mut plan) {
        return MovePlan::infeasible();
    }
    let water = ctx.is_water(dest) || ctx.is_water(src);
    let supported = ctx.can_walk_on(dest.down());
    if !supported && !water && !ctx.is_climbable(dest) {
        return MovePlan::infeasible();
    }
    let speed = floor_speed(ctx, dest.down());
    let base = if water {
        WALK_ONE_IN_WATER_COST
    } else if ctx.settings.allow_sprint && plan.breaks.is_empty() && speed >= 1.0 {
        SPRINT_ONE_BLOCK_COST
    } else {
        WALK_ONE_BLOCK_COST / speed
    };
    plan.cost += base;
    plan
}

pub(super) fn ascend(ctx: &CalculationContext, src: BlockPos, dest: BlockPos) -> MovePlan {
    let mut plan = MovePlan::new();
    if !ctx.in_bounds(dest.up()) {
        return MovePlan::infeasible();
    }
    // Clearance for the jump arc above the source head.
    if !clear_or_break(ctx, src.up_by(2), &mut plan) {
        return MovePlan::infeasible();
    }
    if !clear_or_break(ctx, dest, &mut plan) || !clear_or_break(ctx, dest.up(), &mut plan) {
        return MovePlan::infeasible();
    }
    if !ctx.can_walk_on(dest.down()) {
        // The landing cell sits at source level; scaffold it if allowed.
        let place = ctx.place_cost();
        if place == COST_INF || !ctx.can_place_against(dest.down()) {
            return MovePlan::infeasible();
        }
        plan.place = Some(dest.down());
        plan.cost += place;
    }
    plan.cost += WALK_ONE_BLOCK_COST.max(JUMP_ONE_BLOCK_COST) + ctx.settings.jump_penalty;
    plan
}

/// Walk off the edge and fall to `dest`. `dest` may be any number of
/// cells below the level walked off; the whole column in between has to
/// be fall-through clear. Breaking is only allowed at the walk-off level
/// where the body is still supported.
pub(super) fn descend(ctx: &CalculationContext, src: BlockPos, dest: BlockPos) -> MovePlan {
    let fall = src.y - dest.y;
    if fall < 1 {
        return MovePlan::infeasible();
    }
    let mut plan = MovePlan::new();
    let edge = BlockPos::new(dest.x, src.y, dest.z);
    if !clear_or_break(ctx, edge, &mut plan) || !clear_or_break(ctx, edge.up(), &mut plan) {
        return MovePlan::infeasible();
    }
    for y in (dest.y..src.y - 1).rev() {
        let cell = BlockPos::new(dest.x, y + 1, dest.z);
        if !ctx.can_walk_through(cell) {
            return MovePlan::infeasible();
        }
    }
    if !ctx.can_walk_through(dest) {
        return MovePlan::infeasible();
    }
    let water_landing = ctx.is_water(dest);
    let supported = ctx.can_walk_on(dest.down());
    if !supported && !water_landing {
        // Only the single-step drop may scaffold its own floor; a longer
        // fall onto a block being placed mid-air is not plannable.
        if fall != 1 {
            return MovePlan::infeasible();
        }
        let place = ctx.place_cost();
        if place == COST_INF || !ctx.can_place_against(dest.down()) {
            return MovePlan::infeasible();
        }
        plan.place = Some(dest.down());
        plan.cost += place;
    }
    if !water_landing && fall > ctx.settings.max_fall_no_water {
        // Too far to land dry. A water-bucket escape stretches the limit,
        // at the cost of the bucket interaction.
        if !ctx.has_water_bucket
            || !ctx.settings.allow_place
            || fall > ctx.settings.max_fall_with_bucket
        {
            return MovePlan::infeasible();
        }
        plan.cost += ctx.settings.place_block_cost;
    }
    let fall_ticks = ctx.fall_cost(fall);
    if fall_ticks == COST_INF {
        return MovePlan::infeasible();
    }
    plan.cost += WALK_OFF_BLOCK_COST + fall_ticks + CENTER_AFTER_FALL_COST;
    plan
}

/// Corner-cutting step. No break or place support; both body columns at
/// the cut corners are probed and at least one must be clear.
pub(super) fn diagonal(ctx: &CalculationContext, src: BlockPos, dest: BlockPos) -> MovePlan {
    let dy = dest.y - src.y;
    let corner_a = BlockPos::new(dest.x, src.y, src.z);
    let corner_b = BlockPos::new(src.x, src.y, dest.z);
    let column_clear = |feet: BlockPos| {
        let head_extra = dy > 0;
        ctx.can_walk_through(feet)
            && ctx.can_walk_through(feet.up())
            && (!head_extra || ctx.can_walk_through(feet.up_by(2)))
    };
    if !column_clear(corner_a) && !column_clear(corner_b) {
        return MovePlan::infeasible();
    }
    if !ctx.can_walk_through(dest) || !ctx.can_walk_through(dest.up()) {
        return MovePlan::infeasible();
    }
    if dy > 0 && !ctx.can_walk_through(src.up_by(2)) {
        return MovePlan::infeasible();
    }
    let water = ctx.is_water(dest) || ctx.is_water(src);
    let supported = ctx.can_walk_on(dest.down());
    if !supported && !water {
        return MovePlan::infeasible();
    }
    let mut plan = MovePlan::new();
    let speed = floor_speed(ctx, dest.down());
    let base = if water {
        WALK_ONE_IN_WATER_COST
    } else if ctx.settings.allow_sprint && dy == 0 && speed >= 1.0 {
        SPRINT_ONE_BLOCK_COST
    } else {
        WALK_ONE_BLOCK_COST / speed
    };
    plan.cost += base * SQRT_2;
    match dy.cmp(&0) {
        std::cmp::Ordering::Greater => {
            plan.cost += JUMP_ONE_BLOCK_COST + ctx.settings.jump_penalty;
        }
        std::cmp::Ordering::Less => {
            let fall = ctx.fall_cost(1);
            if fall == COST_INF {
                return MovePlan::infeasible();
            }
            plan.cost += fall;
        }
        std::cmp::Ordering::Equal => {}
    }
    plan
}

/// Flat gap jump across `n - 1` cells of open air. The gap must be a
/// real gap: cells the agent flies through cannot carry support that a
/// cheaper walk would have used.
pub(super) fn parkour(ctx: &CalculationContext, src: BlockPos, dest: BlockPos, n: u8) -> MovePlan {
    if !ctx.settings.allow_parkour {
        return MovePlan::infeasible();
    }
    let n = n as i32;
    if n >= 3 && !ctx.settings.allow_sprint {
        return MovePlan::infeasible();
    }
    let Some(dir) = Move::new(MoveKind::Parkour(n as u8), src, dest).direction() else {
        return MovePlan::infeasible();
    };
    // Launch clearance above the head.
    if !ctx.can_walk_through(src.up_by(2)) {
        return MovePlan::infeasible();
    }
    for step in 1..n {
        let cell = src.shift_by(dir, step);
        if !ctx.can_walk_through(cell)
            || !ctx.can_walk_through(cell.up())
            || !ctx.can_walk_through(cell.up_by(2))
        {
            return MovePlan::infeasible();
        }
        if ctx.can_walk_on(cell.down()) {
            return MovePlan::infeasible();
        }
    }
    if !ctx.can_walk_through(dest)
        || !ctx.can_walk_through(dest.up())
        || !ctx.can_walk_on(dest.down())
    {
        return MovePlan::infeasible();
    }
    let mut plan = MovePlan::new();
    plan.cost += SPRINT_ONE_BLOCK_COST * n as f32
        + JUMP_ONE_BLOCK_COST
        + ctx.settings.jump_penalty * (n - 1) as f32;
    plan
}

/// Straight up one cell. A climbable in the source cell is the cheap
/// path; otherwise jump and scaffold the vacated feet cell.
pub(super) fn pillar(ctx: &CalculationContext, src: BlockPos) -> MovePlan {
    let mut plan = MovePlan::new();
    if !ctx.in_bounds(src.up_by(2)) {
        return MovePlan::infeasible();
    }
    if ctx.is_climbable(src) {
        plan.cost += LADDER_UP_ONE_COST;
        return plan;
    }
    if ctx.is_water(src) {
        // Swimming up needs water above to swim into.
        if !ctx.is_water(src.up()) {
            return MovePlan::infeasible();
        }
        plan.cost += WALK_ONE_IN_WATER_COST;
        return plan;
    }
    if !clear_or_break(ctx, src.up_by(2), &mut plan) {
        return MovePlan::infeasible();
    }
    let place = ctx.place_cost();
    if place == COST_INF {
        return MovePlan::infeasible();
    }
    plan.place = Some(src);
    plan.cost += place + JUMP_ONE_BLOCK_COST + ctx.settings.jump_penalty;
    plan
}

/// Straight down one cell, digging out the floor underfoot when solid.
pub(super) fn downward(ctx: &CalculationContext, src: BlockPos) -> MovePlan {
    if !ctx.settings.allow_downward {
        return MovePlan::infeasible();
    }
    let dest = src.down();
    if !ctx.in_bounds(dest) {
        return MovePlan::infeasible();
    }
    let mut plan = MovePlan::new();
    if ctx.is_climbable(dest) {
        plan.cost += LADDER_DOWN_ONE_COST;
        return plan;
    }
    if ctx.is_water(dest) {
        plan.cost += WALK_ONE_IN_WATER_COST;
        return plan;
    }
    if !clear_or_break(ctx, dest, &mut plan) {
        return MovePlan::infeasible();
    }
    // After the cell opens up the body drops one; it has to land on
    // something, not start an uncontrolled fall.
    if !ctx.can_walk_on(dest.down()) && !ctx.is_water(dest) && !ctx.is_climbable(dest.down()) {
        return MovePlan::infeasible();
    }
    let fall = ctx.fall_cost(1);
    if fall == COST_INF {
        return MovePlan::infeasible();
    }
    plan.cost += fall;
    plan
}

/// Finds the feet cell a walk-off in `dir` would land in, scanning the
/// fall column down to the deepest fall any setting could accept.
fn descend_landing(ctx: &CalculationContext, src: BlockPos, dir: Direction) -> Option<BlockPos> {
    let adj = src.shift(dir);
    let deepest = ctx
        .settings
        .max_fall_with_bucket
        .max(ctx.settings.max_fall_no_water);
    for fall in 1..=deepest {
        let feet = adj.down_by(fall);
        if !ctx.in_bounds(feet) {
            return None;
        }
        if !ctx.can_walk_through(feet) {
            return None;
        }
        if ctx.can_walk_on(feet.down()) || ctx.is_water(feet) {
            return Some(feet);
        }
    }
    None
}

/// Enumerates every movement leaving `src`, pushing only feasible edges.
/// Out-of-domain and unloaded destinations are pruned before any cost
/// model runs.
pub fn candidates(ctx: &CalculationContext, src: BlockPos, out: &mut Vec<(Move, f32)>) {
    let mut push = |mv: Move| {
        if !ctx.in_bounds(mv.dest) || !ctx.is_loaded(mv.dest) {
            return;
        }
        let cost = mv.cost(ctx);
        if cost.is_finite() {
            out.push((mv, cost));
        }
    };

    for dir in Direction::horizontal() {
        let adj = src.shift(dir);
        push(Move::new(MoveKind::Traverse, src, adj));
        push(Move::new(MoveKind::Ascend, src, adj.up()));
        if let Some(landing) = descend_landing(ctx, src, dir) {
            push(Move::new(MoveKind::Descend, src, landing));
        } else if ctx.settings.allow_place {
            // No landing in range; bridge down one by placing the floor.
            push(Move::new(MoveKind::Descend, src, adj.down()));
        }
        for n in 2..=4u8 {
            push(Move::new(
                MoveKind::Parkour(n),
                src,
                src.shift_by(dir, n as i32),
            ));
        }
    }
    for dx in [-1, 1] {
        for dz in [-1, 1] {
            for dy in [0, -1, 1] {
                push(Move::new(MoveKind::Diagonal, src, src + (dx, dy, dz)));
            }
        }
    }
    push(Move::new(MoveKind::Pillar, src, src.up()));
    push(Move::new(MoveKind::Downward, src, src.down()));
}
