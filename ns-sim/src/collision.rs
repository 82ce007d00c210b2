use bevy::prelude::Vec3;
use ns_geom::{Aabb, calculate_x_offset, calculate_y_offset, calculate_z_offset};
use ns_utils::BlockPos;
use ns_world::{WORLD_HEIGHT, WorldGrid, collision_shape, is_climbable, is_water, speed_factor};

use crate::types::{AGENT_HALF_WIDTH, AGENT_HEIGHT, AGENT_STEP_HEIGHT, agent_aabb};

const COLLISION_EPS: f32 = 1e-5;
const SNEAK_EDGE_STEP: f32 = 0.05;

/// Sweeps the agent box against the block shapes of the live world. Also
/// answers the support/liquid/climbable queries the physics step and the
/// movement state machines share.
pub struct CollisionResolver<'a> {
    world: &'a WorldGrid,
}

impl<'a> CollisionResolver<'a> {
    pub fn new(world: &'a WorldGrid) -> Self {
        Self { world }
    }

    pub fn has_chunk_at_pos(&self, pos: Vec3) -> bool {
        self.world
            .is_position_loaded(pos.x.floor() as i32, pos.z.floor() as i32)
    }

    fn collect_collision_boxes(&self, min: Vec3, max: Vec3) -> Vec<Aabb> {
        let (min_x, max_x) = block_range(min.x, max.x);
        let (min_y, max_y) = block_range(min.y, max.y);
        let (min_z, max_z) = block_range(min.z, max.z);
        let mut out = Vec::new();
        for y in min_y..=max_y {
            if y >= WORLD_HEIGHT {
                continue;
            }
            for z in min_z..=max_z {
                for x in min_x..=max_x {
                    let pos = BlockPos::new(x, y, z);
                    match self.world.block_at(x, y, z) {
                        Some(state) => {
                            let shape = collision_shape(self.world, pos, state);
                            let origin = Vec3::new(x as f32, y as f32, z as f32);
                            out.extend(shape.to_world_aabbs(origin));
                        }
                        // Below the world or into an unloaded chunk: a
                        // solid wall, never a fall into the void.
                        None => out.push(Aabb::new(
                            Vec3::new(x as f32, y as f32, z as f32),
                            Vec3::new(x as f32 + 1.0, y as f32 + 1.0, z as f32 + 1.0),
                        )),
                    }
                }
            }
        }
        out
    }

    pub fn aabb_collides(&self, min: Vec3, max: Vec3) -> bool {
        let query = Aabb::new(min, max);
        for block in self.collect_collision_boxes(min, max) {
            if query.intersects(&block) {
                return true;
            }
        }
        false
    }

    fn aabb_has_water(&self, bb: &Aabb) -> bool {
        let (min_x, max_x) = block_range(bb.min.x, bb.max.x);
        let (min_y, max_y) = block_range(bb.min.y, bb.max.y);
        let (min_z, max_z) = block_range(bb.min.z, bb.max.z);
        for y in min_y..=max_y {
            for z in min_z..=max_z {
                for x in min_x..=max_x {
                    let Some(state) = self.world.block_at(x, y, z) else {
                        continue;
                    };
                    if !is_water(state) {
                        continue;
                    }
                    let liquid_bb = Aabb::new(
                        Vec3::new(x as f32, y as f32, z as f32),
                        Vec3::new(x as f32 + 1.0, y as f32 + 1.0, z as f32 + 1.0),
                    );
                    if bb.intersects(&liquid_bb) {
                        return true;
                    }
                }
            }
        }
        false
    }

    /// Material check against the body box expanded down by 0.4 then
    /// contracted, vanilla isInWater parity.
    pub fn is_agent_in_water(&self, pos: Vec3) -> bool {
        let bb = agent_aabb(pos)
            .offset(Vec3::new(0.0, -0.4, 0.0))
            .contract(0.001, 0.001, 0.001);
        self.aabb_has_water(&bb)
    }

    pub fn is_offset_position_in_water(&self, pos: Vec3, offset: Vec3) -> bool {
        let bb = agent_aabb(pos).offset(offset);
        !self.aabb_collides(bb.min, bb.max) && !self.aabb_has_water(&bb)
    }

    /// Climbable material at the feet or body cell.
    pub fn is_on_climbable(&self, pos: Vec3) -> bool {
        let base = BlockPos::from_feet(pos);
        [base, base.up()].iter().any(|p| {
            self.world
                .state(*p)
                .is_some_and(is_climbable)
        })
    }

    fn has_support_one_block_down(&self, pos: Vec3) -> bool {
        let min = Vec3::new(
            pos.x - AGENT_HALF_WIDTH,
            pos.y - 1.0,
            pos.z - AGENT_HALF_WIDTH,
        );
        let max = Vec3::new(
            pos.x + AGENT_HALF_WIDTH,
            pos.y + AGENT_HEIGHT - 1.0,
            pos.z + AGENT_HALF_WIDTH,
        );
        self.aabb_collides(min, max)
    }

    pub fn ground_slipperiness(&self, pos: Vec3) -> f32 {
        let x = pos.x.floor() as i32;
        let y = (pos.y - 1.0).floor() as i32;
        let z = pos.z.floor() as i32;
        self.world
            .block_at(x, y, z)
            .map_or(0.6, ns_world::slipperiness)
    }

    /// Smallest speed factor of the blocks under the feet box. Soul sand
    /// drags the whole footprint down.
    pub fn ground_speed_factor(&self, pos: Vec3) -> f32 {
        let y = (pos.y - 0.2).floor() as i32;
        let x0 = (pos.x - AGENT_HALF_WIDTH).floor() as i32;
        let x1 = (pos.x + AGENT_HALF_WIDTH).floor() as i32;
        let z0 = (pos.z - AGENT_HALF_WIDTH).floor() as i32;
        let z1 = (pos.z + AGENT_HALF_WIDTH).floor() as i32;
        let mut factor = 1.0f32;
        for z in z0..=z1 {
            for x in x0..=x1 {
                if let Some(state) = self.world.block_at(x, y, z) {
                    factor = factor.min(speed_factor(state));
                }
            }
        }
        factor
    }

    /// Shortens sneak motion so the agent never walks off an edge.
    pub fn clamp_sneak_edge_velocity(&self, pos: Vec3, vel: Vec3) -> Vec3 {
        let mut dx = vel.x;
        let mut dz = vel.z;

        while dx.abs() > COLLISION_EPS
            && !self.has_support_one_block_down(pos + Vec3::new(dx, 0.0, 0.0))
        {
            dx = step_toward_zero(dx);
        }

        while dz.abs() > COLLISION_EPS
            && !self.has_support_one_block_down(pos + Vec3::new(0.0, 0.0, dz))
        {
            dz = step_toward_zero(dz);
        }

        while dx.abs() > COLLISION_EPS
            && dz.abs() > COLLISION_EPS
            && !self.has_support_one_block_down(pos + Vec3::new(dx, 0.0, dz))
        {
            dx = step_toward_zero(dx);
            dz = step_toward_zero(dz);
        }

        Vec3::new(dx, vel.y, dz)
    }

    /// Axis-ordered swept resolution (Y, X, Z) plus the vanilla step-up
    /// branch. Returns (pos, vel, on_ground, collided_horizontally).
    pub fn move_with_collisions(
        &self,
        mut pos: Vec3,
        mut vel: Vec3,
        was_on_ground: bool,
        in_fluid: bool,
        sneaking: bool,
    ) -> (Vec3, Vec3, bool, bool) {
        let original = vel;
        let mut bb = agent_aabb(pos);

        let broadphase = bb.expanded_by_motion(vel);
        let mut boxes = self.collect_collision_boxes(broadphase.min, broadphase.max);

        let mut y = vel.y;
        for block in &boxes {
            y = calculate_y_offset(&bb, block, y);
        }
        bb = bb.offset(Vec3::new(0.0, y, 0.0));

        let mut x = vel.x;
        for block in &boxes {
            x = calculate_x_offset(&bb, block, x);
        }
        bb = bb.offset(Vec3::new(x, 0.0, 0.0));

        let mut z = vel.z;
        for block in &boxes {
            z = calculate_z_offset(&bb, block, z);
        }
        bb = bb.offset(Vec3::new(0.0, 0.0, z));

        let stepped_down = original.y != y && original.y < 0.0;
        let horizontal_blocked = original.x != x || original.z != z;

        if AGENT_STEP_HEIGHT > 0.0
            && (was_on_ground || stepped_down || in_fluid)
            && horizontal_blocked
            && !sneaking
        {
            // Vanilla 1.8 moveEntity step resolution branch.
            let prev_x = x;
            let prev_y = y;
            let prev_z = z;
            let prev_bb = bb;
            let start_bb = agent_aabb(pos);

            bb = start_bb;
            y = AGENT_STEP_HEIGHT;
            let query = bb.add_coord(Vec3::new(original.x, y, original.z));
            boxes = self.collect_collision_boxes(query.min, query.max);

            // Candidate A: clip the rise against the horizontally-shifted box.
            let mut bb_a = bb;
            let bb_a_query = bb_a.add_coord(Vec3::new(original.x, 0.0, original.z));
            let mut y_a = y;
            for block in &boxes {
                y_a = calculate_y_offset(&bb_a_query, block, y_a);
            }
            bb_a = bb_a.offset(Vec3::new(0.0, y_a, 0.0));
            let mut x_a = original.x;
            for block in &boxes {
                x_a = calculate_x_offset(&bb_a, block, x_a);
            }
            bb_a = bb_a.offset(Vec3::new(x_a, 0.0, 0.0));
            let mut z_a = original.z;
            for block in &boxes {
                z_a = calculate_z_offset(&bb_a, block, z_a);
            }
            bb_a = bb_a.offset(Vec3::new(0.0, 0.0, z_a));

            // Candidate B: rise first, then move horizontally.
            let mut bb_b = bb;
            let mut y_b = y;
            for block in &boxes {
                y_b = calculate_y_offset(&bb_b, block, y_b);
            }
            bb_b = bb_b.offset(Vec3::new(0.0, y_b, 0.0));
            let mut x_b = original.x;
            for block in &boxes {
                x_b = calculate_x_offset(&bb_b, block, x_b);
            }
            bb_b = bb_b.offset(Vec3::new(x_b, 0.0, 0.0));
            let mut z_b = original.z;
            for block in &boxes {
                z_b = calculate_z_offset(&bb_b, block, z_b);
            }
            bb_b = bb_b.offset(Vec3::new(0.0, 0.0, z_b));

            let dist_a = x_a * x_a + z_a * z_a;
            let dist_b = x_b * x_b + z_b * z_b;

            if dist_a > dist_b {
                x = x_a;
                z = z_a;
                y = -y_a;
                bb = bb_a;
            } else {
                x = x_b;
                z = z_b;
                y = -y_b;
                bb = bb_b;
            }

            for block in &boxes {
                y = calculate_y_offset(&bb, block, y);
            }
            bb = bb.offset(Vec3::new(0.0, y, 0.0));

            // Keep the step only if it nets more horizontal progress.
            if prev_x * prev_x + prev_z * prev_z >= x * x + z * z {
                x = prev_x;
                y = prev_y;
                z = prev_z;
                bb = prev_bb;
            }
        }

        if original.x != x {
            vel.x = 0.0;
        } else {
            vel.x = x;
        }
        if original.y != y {
            vel.y = 0.0;
        } else {
            vel.y = y;
        }
        if original.z != z {
            vel.z = 0.0;
        } else {
            vel.z = z;
        }

        pos = aabb_feet_position(bb);
        // on_ground only when vertical motion was clipped while moving down.
        let on_ground = original.y != y && original.y < 0.0;

        let collided_horizontally = original.x != x || original.z != z;
        (pos, vel, on_ground, collided_horizontally)
    }
}

fn aabb_feet_position(aabb: Aabb) -> Vec3 {
    Vec3::new(
        (aabb.min.x + aabb.max.x) * 0.5,
        aabb.min.y,
        (aabb.min.z + aabb.max.z) * 0.5,
    )
}

fn block_range(min: f32, max: f32) -> (i32, i32) {
    let min_i = (min + COLLISION_EPS).floor() as i32;
    let max_i = (max - COLLISION_EPS).floor() as i32;
    if min_i <= max_i {
        (min_i, max_i)
    } else {
        (max_i, min_i)
    }
}

fn step_toward_zero(v: f32) -> f32 {
    if v > 0.0 {
        (v - SNEAK_EDGE_STEP).max(0.0)
    } else {
        (v + SNEAK_EDGE_STEP).min(0.0)
    }
}
