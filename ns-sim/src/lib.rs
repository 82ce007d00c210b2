pub mod collision;
pub mod control;
pub mod physics;
pub mod types;

pub use collision::CollisionResolver;
pub use control::ControlIntent;
pub use physics::{effective_sprint, step_tick};
pub use types::{AGENT_HALF_WIDTH, AGENT_HEIGHT, AgentInput, AgentState, agent_aabb};
