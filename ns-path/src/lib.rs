//! Planning and execution for an autonomous voxel-world agent: movement
//! cost model, time-boxed A*, per-tick movement state machines, and the
//! background-search lifecycle controller.

pub mod astar;
pub mod behavior;
pub mod context;
pub mod cost;
pub mod executor;
pub mod goal;
pub mod movement;
pub mod node;
pub mod path;
pub mod settings;

pub use astar::{SearchOutcome, search};
pub use behavior::{PathEvent, PathState, PathingBehavior};
pub use context::{CalculationContext, EmptyInventory, InventoryQuery};
pub use executor::{ExecStatus, PathExecutor, TickOutput};
pub use goal::Goal;
pub use movement::{Move, MoveKind, MovePlan, MoveState, MoveStatus};
pub use path::Path;
pub use settings::PathSettings;
