//! Movement costs in ticks. Derived from vanilla travel speeds
//! (blocks per second at 20 ticks per second), so one cost unit is one
//! tick of travel time.

pub const COST_INF: f32 = f32::INFINITY;

pub const WALK_ONE_BLOCK_COST: f32 = 20.0 / 4.317;
pub const SPRINT_ONE_BLOCK_COST: f32 = 20.0 / 5.612;
pub const WALK_ONE_IN_WATER_COST: f32 = 20.0 / 2.2;
pub const SNEAK_ONE_BLOCK_COST: f32 = 20.0 / 1.3;
pub const LADDER_UP_ONE_COST: f32 = 20.0 / 2.35;
pub const LADDER_DOWN_ONE_COST: f32 = 20.0 / 3.0;

/// Leaving the support of the current block while walking off an edge.
pub const WALK_OFF_BLOCK_COST: f32 = WALK_ONE_BLOCK_COST * 0.8;
/// Re-centering onto the landing block after a fall.
pub const CENTER_AFTER_FALL_COST: f32 = WALK_ONE_BLOCK_COST - WALK_OFF_BLOCK_COST;

/// Ticks airborne for a one-block upward jump.
pub const JUMP_ONE_BLOCK_COST: f32 = 5.72;

pub const SQRT_2: f32 = std::f32::consts::SQRT_2;

/// Per-block heuristic for descending; falls are cheap but not free.
pub const FALL_ONE_BLOCK_HEURISTIC: f32 = 2.0;

const FALL_GRAVITY: f32 = 0.08;
const FALL_DRAG: f32 = 0.98;

/// Ticks to free-fall the given distance, with fractional interpolation
/// on the final tick. Integrates the vanilla formula
/// `v' = (v - 0.08) * 0.98` so planning and live motion agree.
pub fn ticks_to_fall(blocks: f32) -> f32 {
    if blocks <= 0.0 {
        return 0.0;
    }
    let mut fallen = 0.0f32;
    let mut vel = 0.0f32;
    let mut ticks = 0.0f32;
    loop {
        vel = (vel - FALL_GRAVITY) * FALL_DRAG;
        let step = -vel;
        if fallen + step >= blocks {
            return ticks + (blocks - fallen) / step;
        }
        fallen += step;
        ticks += 1.0;
        // Terminal velocity bound; avoids spinning on absurd inputs.
        if ticks > 10_000.0 {
            return ticks;
        }
    }
}

/// Precomputed `ticks_to_fall` for integer heights `0..=max`.
pub fn fall_cost_table(max: usize) -> Vec<f32> {
    (0..=max).map(|n| ticks_to_fall(n as f32)).collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn base_costs_are_positive_and_ordered() {
        assert!(SPRINT_ONE_BLOCK_COST < WALK_ONE_BLOCK_COST);
        assert!(WALK_ONE_BLOCK_COST < WALK_ONE_IN_WATER_COST);
        assert!(WALK_ONE_IN_WATER_COST < SNEAK_ONE_BLOCK_COST);
        assert!(WALK_OFF_BLOCK_COST > 0.0);
        assert!(CENTER_AFTER_FALL_COST > 0.0);
    }

    #[test]
    fn fall_ticks_monotone() {
        let table = fall_cost_table(20);
        assert_eq!(table[0], 0.0);
        for w in table.windows(2) {
            assert!(w[1] > w[0]);
        }
        // Falling accelerates, so the marginal block gets cheaper.
        assert!(table[2] - table[1] < table[1] - table[0]);
    }

    #[test]
    fn fall_ticks_interpolates() {
        let half = ticks_to_fall(0.5);
        let one = ticks_to_fall(1.0);
        assert!(half > 0.0);
        assert!(half < one);
    }
}
