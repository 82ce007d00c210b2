use bevy::prelude::{Resource, Vec3};
use ns_geom::Aabb;

pub const AGENT_HALF_WIDTH: f32 = 0.3;
pub const AGENT_HEIGHT: f32 = 1.8;
pub const AGENT_STEP_HEIGHT: f32 = 0.6;

/// Discrete input intent for one tick.
#[derive(Clone, Copy, Debug, Default)]
pub struct AgentInput {
    pub forward: f32,
    pub strafe: f32,
    pub jump: bool,
    pub sprint: bool,
    pub sneak: bool,
    pub yaw: f32,
    pub pitch: f32,
}

/// Live kinematic state of the simulated body. `pos` is the feet center.
#[derive(Clone, Copy, Debug, Resource)]
pub struct AgentState {
    pub pos: Vec3,
    pub vel: Vec3,
    pub on_ground: bool,
    pub yaw: f32,
    pub pitch: f32,
    /// Correlates break/place requests with world acknowledgement;
    /// bumped once per issued request.
    pub action_sequence: u32,
}

impl Default for AgentState {
    fn default() -> Self {
        Self {
            pos: Vec3::ZERO,
            vel: Vec3::ZERO,
            on_ground: false,
            yaw: 0.0,
            pitch: 0.0,
            action_sequence: 0,
        }
    }
}

impl AgentState {
    pub fn increment_sequence(&mut self) -> u32 {
        self.action_sequence = self.action_sequence.wrapping_add(1);
        self.action_sequence
    }
}

pub fn agent_aabb(pos: Vec3) -> Aabb {
    Aabb::new(
        Vec3::new(pos.x - AGENT_HALF_WIDTH, pos.y, pos.z - AGENT_HALF_WIDTH),
        Vec3::new(
            pos.x + AGENT_HALF_WIDTH,
            pos.y + AGENT_HEIGHT,
            pos.z + AGENT_HALF_WIDTH,
        ),
    )
}
