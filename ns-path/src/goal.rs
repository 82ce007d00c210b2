use ns_utils::BlockPos;

use crate::cost::{
    FALL_ONE_BLOCK_HEURISTIC, JUMP_ONE_BLOCK_COST, SQRT_2, WALK_ONE_BLOCK_COST,
};

/// Where the agent is trying to get. A closed set of predicate/heuristic
/// pairs; heuristics are in the same tick units as movement costs.
#[derive(Clone, Debug)]
pub enum Goal {
    /// Feet in exactly this cell.
    Block(BlockPos),
    /// Feet in this cell or the one below it; tolerant of landing short.
    TwoBlocks(BlockPos),
    /// Anywhere in the vertical column.
    Xz { x: i32, z: i32 },
    /// Anywhere on the horizontal plane.
    YLevel(i32),
    /// Within a sphere around the center.
    Near { center: BlockPos, radius: i32 },
    /// Standing on, in, or cardinally adjacent to the block.
    GetToBlock(BlockPos),
    /// Satisfied by any member.
    Composite(Vec<Goal>),
    /// Get away from the wrapped goal.
    Inverse(Box<Goal>),
    /// Tunnel from the origin along a fixed horizontal direction; never
    /// satisfied, the search runs until its budget and yields the deepest
    /// partial. Construct through [`Goal::strict_direction`].
    StrictDirection { origin: BlockPos, dx: i32, dz: i32 },
}

impl Goal {
    /// A zero direction vector is a structurally invalid goal.
    pub fn strict_direction(origin: BlockPos, dx: i32, dz: i32) -> Goal {
        assert!(
            dx != 0 || dz != 0,
            "strict direction goal requires a non-zero direction"
        );
        Goal::StrictDirection { origin, dx, dz }
    }

    pub fn is_in_goal(&self, pos: BlockPos) -> bool {
        match self {
            Goal::Block(p) => pos == *p,
            Goal::TwoBlocks(p) => pos.x == p.x && pos.z == p.z && (pos.y == p.y || pos.y == p.y - 1),
            Goal::Xz { x, z } => pos.x == *x && pos.z == *z,
            Goal::YLevel(y) => pos.y == *y,
            Goal::Near { center, radius } => {
                pos.distance_sq(*center) <= (*radius * *radius) as f32
            }
            Goal::GetToBlock(p) => {
                let d = pos - *p;
                d.x.abs() + d.y.abs() + d.z.abs() <= 1
            }
            Goal::Composite(goals) => goals.iter().any(|g| g.is_in_goal(pos)),
            Goal::Inverse(inner) => !inner.is_in_goal(pos),
            Goal::StrictDirection { .. } => false,
        }
    }

    pub fn heuristic(&self, pos: BlockPos) -> f32 {
        match self {
            Goal::Block(p) => xz_heuristic(p.x - pos.x, p.z - pos.z) + y_heuristic(p.y - pos.y),
            Goal::TwoBlocks(p) => {
                let dy = if pos.y > p.y {
                    p.y - pos.y
                } else if pos.y < p.y - 1 {
                    p.y - 1 - pos.y
                } else {
                    0
                };
                xz_heuristic(p.x - pos.x, p.z - pos.z) + y_heuristic(dy)
            }
            Goal::Xz { x, z } => xz_heuristic(x - pos.x, z - pos.z),
            Goal::YLevel(y) => y_heuristic(y - pos.y),
            Goal::Near { center, radius } => {
                let dist = pos.distance_sq(*center).sqrt() - *radius as f32;
                dist.max(0.0) * WALK_ONE_BLOCK_COST
            }
            Goal::GetToBlock(p) => (Goal::Block(*p).heuristic(pos) - WALK_ONE_BLOCK_COST).max(0.0),
            Goal::Composite(goals) => goals
                .iter()
                .map(|g| g.heuristic(pos))
                .fold(f32::INFINITY, f32::min),
            Goal::Inverse(inner) => -inner.heuristic(pos),
            Goal::StrictDirection { origin, dx, dz } => {
                // Reward progress along the axis, punish lateral drift.
                let rel_x = (pos.x - origin.x) as f32;
                let rel_z = (pos.z - origin.z) as f32;
                let len = ((dx * dx + dz * dz) as f32).sqrt();
                let ux = *dx as f32 / len;
                let uz = *dz as f32 / len;
                let along = rel_x * ux + rel_z * uz;
                let lateral = (rel_x * uz - rel_z * ux).abs();
                (-along + lateral * 4.0) * WALK_ONE_BLOCK_COST
            }
        }
    }
}

fn xz_heuristic(dx: i32, dz: i32) -> f32 {
    let x = dx.abs() as f32;
    let z = dz.abs() as f32;
    let (straight, diagonal) = if x < z { (z - x, x) } else { (x - z, z) };
    (diagonal * SQRT_2 + straight) * WALK_ONE_BLOCK_COST
}

fn y_heuristic(dy: i32) -> f32 {
    if dy > 0 {
        dy as f32 * JUMP_ONE_BLOCK_COST
    } else {
        -dy as f32 * FALL_ONE_BLOCK_HEURISTIC
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn block_goal_zero_at_target() {
        let goal = Goal::Block(BlockPos::new(3, 64, -2));
        assert!(goal.is_in_goal(BlockPos::new(3, 64, -2)));
        assert_eq!(goal.heuristic(BlockPos::new(3, 64, -2)), 0.0);
        assert!(goal.heuristic(BlockPos::new(0, 64, 0)) > 0.0);
    }

    #[test]
    fn xz_heuristic_favors_diagonals() {
        // 3 straight + 3 diagonal beats 6 straight + 3 straight.
        let diag = xz_heuristic(3, 3);
        let straight = xz_heuristic(6, 0);
        assert!(diag < straight);
    }

    #[test]
    fn two_blocks_accepts_either_cell() {
        let goal = Goal::TwoBlocks(BlockPos::new(0, 65, 0));
        assert!(goal.is_in_goal(BlockPos::new(0, 65, 0)));
        assert!(goal.is_in_goal(BlockPos::new(0, 64, 0)));
        assert!(!goal.is_in_goal(BlockPos::new(0, 63, 0)));
    }

    #[test]
    fn get_to_block_accepts_adjacency() {
        let goal = Goal::GetToBlock(BlockPos::new(0, 64, 0));
        assert!(goal.is_in_goal(BlockPos::new(1, 64, 0)));
        assert!(goal.is_in_goal(BlockPos::new(0, 65, 0)));
        assert!(goal.is_in_goal(BlockPos::new(0, 63, 0)));
        assert!(!goal.is_in_goal(BlockPos::new(2, 64, 0)));
    }

    #[test]
    fn composite_takes_min_heuristic() {
        let a = Goal::Block(BlockPos::new(10, 64, 0));
        let b = Goal::Block(BlockPos::new(2, 64, 0));
        let both = Goal::Composite(vec![a.clone(), b.clone()]);
        let at = BlockPos::new(0, 64, 0);
        assert_eq!(both.heuristic(at), a.heuristic(at).min(b.heuristic(at)));
    }

    #[test]
    fn inverse_flips_membership() {
        let goal = Goal::Inverse(Box::new(Goal::Near {
            center: BlockPos::new(0, 64, 0),
            radius: 4,
        }));
        assert!(!goal.is_in_goal(BlockPos::new(0, 64, 0)));
        assert!(goal.is_in_goal(BlockPos::new(10, 64, 0)));
    }

    #[test]
    fn strict_direction_rewards_progress() {
        let goal = Goal::strict_direction(BlockPos::new(0, 64, 0), 1, 0);
        let near = goal.heuristic(BlockPos::new(1, 64, 0));
        let far = goal.heuristic(BlockPos::new(8, 64, 0));
        let drifted = goal.heuristic(BlockPos::new(8, 64, 3));
        assert!(far < near);
        assert!(drifted > far);
        assert!(!goal.is_in_goal(BlockPos::new(100, 64, 0)));
    }

    #[test]
    #[should_panic(expected = "non-zero direction")]
    fn zero_direction_is_rejected() {
        let _ = Goal::strict_direction(BlockPos::new(0, 64, 0), 0, 0);
    }
}
