//! Stateless per-tick movement formulas, vanilla 1.8 parity. The planner
//! validates movement costs against the same numbers the live body runs.

use bevy::prelude::Vec3;
use ns_world::WorldGrid;

use crate::collision::CollisionResolver;
use crate::types::{AgentInput, AgentState};

pub const GRAVITY: f32 = -0.08;
pub const AIR_DRAG: f32 = 0.98;
pub const WATER_GRAVITY: f32 = -0.02;
pub const WATER_DRAG: f32 = 0.8;
const WATER_SURFACE_STEP: f32 = 0.3;
pub const JUMP_VEL: f32 = 0.42;
const BASE_MOVE_SPEED: f32 = 0.1;
const SPEED_IN_AIR: f32 = 0.02;
const WATER_MOVE_SPEED: f32 = 0.02;
const SWIM_UP_ACCEL: f32 = 0.04;
const SPRINT_JUMP_BOOST: f32 = 0.2;
const MOVE_INPUT_DAMPING: f32 = 0.98;
const SNEAK_INPUT_SCALE: f32 = 0.3;
const CLIMB_SPEED: f32 = 0.2;
const CLIMB_CLAMP: f32 = 0.15;

pub fn effective_sprint(input: &AgentInput) -> bool {
    input.sprint && !input.sneak && input.forward > 0.0
}

/// Advances the body one tick: jump impulse, directional acceleration,
/// collision resolution, then gravity and friction. Order matches the
/// vanilla entity tick so costs and live motion agree.
pub fn step_tick(prev: &AgentState, input: &AgentInput, world: &WorldGrid) -> AgentState {
    let resolver = CollisionResolver::new(world);
    let mut state = *prev;
    state.yaw = input.yaw;
    state.pitch = input.pitch;
    if !resolver.has_chunk_at_pos(state.pos) {
        state.vel = Vec3::ZERO;
        state.on_ground = true;
        return state;
    }
    let sprinting = effective_sprint(input);
    let in_water = resolver.is_agent_in_water(state.pos);
    let on_climbable = resolver.is_on_climbable(state.pos);

    if !in_water && state.on_ground && input.jump {
        state.vel.y = JUMP_VEL;
        state.on_ground = false;
        if sprinting {
            let (sin_yaw, cos_yaw) = state.yaw.sin_cos();
            let forward = Vec3::new(-sin_yaw, 0.0, -cos_yaw);
            state.vel.x += forward.x * SPRINT_JUMP_BOOST;
            state.vel.z += forward.z * SPRINT_JUMP_BOOST;
        }
    }

    let mut wish = Vec3::new(
        input.strafe * MOVE_INPUT_DAMPING,
        0.0,
        input.forward * MOVE_INPUT_DAMPING,
    );
    if wish.length_squared() > 1.0 {
        wish = wish.normalize();
    }
    if input.sneak {
        wish.x *= SNEAK_INPUT_SCALE;
        wish.z *= SNEAK_INPUT_SCALE;
    }

    let move_speed = BASE_MOVE_SPEED * if sprinting { 1.3 } else { 1.0 };

    let mut f4 = if state.on_ground {
        resolver.ground_slipperiness(state.pos) * 0.91
    } else {
        0.91
    };

    let f = 0.16277136 / (f4 * f4 * f4);
    let f5 = if in_water {
        WATER_MOVE_SPEED
    } else if state.on_ground {
        move_speed * f
    } else {
        // Airborne acceleration uses the fixed jump movement factor and is
        // not multiplied by sprint each tick.
        SPEED_IN_AIR
    };

    accelerate_yaw_relative(&mut state.vel, wish.x, wish.z, f5, state.yaw);

    if on_climbable {
        // Ladder clamp: limited lateral speed and terminal descent.
        state.vel.x = state.vel.x.clamp(-CLIMB_CLAMP, CLIMB_CLAMP);
        state.vel.z = state.vel.z.clamp(-CLIMB_CLAMP, CLIMB_CLAMP);
        if state.vel.y < -CLIMB_CLAMP {
            state.vel.y = -CLIMB_CLAMP;
        }
        if input.sneak && state.vel.y < 0.0 {
            state.vel.y = 0.0;
        }
    }

    if state.on_ground && input.sneak {
        let clamped = resolver.clamp_sneak_edge_velocity(state.pos, state.vel);
        state.vel.x = clamped.x;
        state.vel.z = clamped.z;
    }

    let pre_move_y = state.pos.y;
    let (pos, vel, on_ground, collided_horizontally) = resolver.move_with_collisions(
        state.pos,
        state.vel,
        state.on_ground,
        in_water,
        input.sneak,
    );
    state.pos = pos;
    state.vel = vel;
    state.on_ground = on_ground;

    if on_climbable && collided_horizontally {
        // Pressing into a climbable block climbs it.
        state.vel.y = CLIMB_SPEED;
    }

    // Soul-sand style slowdown from whatever the footprint stands on.
    if state.on_ground {
        let factor = resolver.ground_speed_factor(state.pos);
        if factor < 1.0 {
            state.vel.x *= factor;
            state.vel.z *= factor;
        }
    }

    if in_water {
        if input.jump {
            state.vel.y += SWIM_UP_ACCEL;
        }
        state.vel.x *= WATER_DRAG;
        state.vel.y *= WATER_DRAG;
        state.vel.z *= WATER_DRAG;
        state.vel.y += WATER_GRAVITY;
        if collided_horizontally
            && resolver.is_offset_position_in_water(
                state.pos,
                Vec3::new(
                    state.vel.x,
                    state.vel.y + 0.6 - state.pos.y + pre_move_y,
                    state.vel.z,
                ),
            )
        {
            state.vel.y = WATER_SURFACE_STEP;
        }
    } else {
        state.vel.y += GRAVITY;
        state.vel.y *= AIR_DRAG;
        f4 = if state.on_ground {
            resolver.ground_slipperiness(state.pos) * 0.91
        } else {
            0.91
        };
        state.vel.x *= f4;
        state.vel.z *= f4;
    }
    state
}

fn accelerate_yaw_relative(vel: &mut Vec3, strafe: f32, forward: f32, accel: f32, yaw: f32) {
    let f = strafe * strafe + forward * forward;
    if f < 1.0e-4 {
        return;
    }

    let mut f = f.sqrt();
    if f < 1.0 {
        f = 1.0;
    }
    let f = accel / f;
    let strafe = strafe * f;
    let forward = forward * f;

    let (sin_yaw, cos_yaw) = yaw.sin_cos();
    let forward_dir = Vec3::new(-sin_yaw, 0.0, -cos_yaw);
    let right_dir = Vec3::new(cos_yaw, 0.0, -sin_yaw);
    let dir = right_dir * strafe + forward_dir * forward;
    vel.x += dir.x;
    vel.z += dir.z;
}
