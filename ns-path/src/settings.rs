use serde::{Deserialize, Serialize};

/// Tunables for planning and execution. Built once, snapshotted into each
/// `CalculationContext`; the trade-off coefficient set is behavior-defining
/// and ships as data.
#[derive(Clone, Debug, Serialize, Deserialize)]
pub struct PathSettings {
    pub allow_break: bool,
    pub allow_place: bool,
    pub allow_parkour: bool,
    pub allow_downward: bool,
    pub allow_sprint: bool,

    /// Flat penalty added to every movement that leaves the ground.
    pub jump_penalty: f32,
    /// Cost of scaffolding one block.
    pub place_block_cost: f32,
    /// Extra ticks per break action on top of the hardness time.
    pub break_overhead: f32,

    /// Tallest drop survivable with no fluid escape.
    pub max_fall_no_water: i32,
    /// Tallest drop when a water-bucket escape is available.
    pub max_fall_with_bucket: i32,

    /// Search gives up this long after a useful partial path exists.
    pub primary_timeout_ms: u64,
    /// Search gives up this long after starting with nothing useful.
    pub failure_timeout_ms: u64,
    /// Minimum blocks of progress for a partial path to count as useful.
    pub min_partial_progress: f32,
    /// Cost-vs-heuristic trade-offs tracked for partial results.
    pub coefficients: Vec<f32>,

    /// Failure backoff bounds, in ticks.
    pub backoff_min_ticks: u32,
    pub backoff_max_ticks: u32,

    /// Movements inspected ahead of the active one for obstructions.
    pub horizon: usize,
    /// Tick budget before an executing movement is declared failed.
    pub movement_timeout_ticks: u32,
}

impl Default for PathSettings {
    fn default() -> Self {
        Self {
            allow_break: true,
            allow_place: true,
            allow_parkour: true,
            allow_downward: true,
            allow_sprint: true,
            jump_penalty: 2.0,
            place_block_cost: 20.0,
            break_overhead: 2.0,
            max_fall_no_water: 3,
            max_fall_with_bucket: 20,
            primary_timeout_ms: 500,
            failure_timeout_ms: 2000,
            min_partial_progress: 5.0,
            coefficients: vec![1.5, 2.0, 2.5, 3.0, 4.0, 5.0, 10.0],
            backoff_min_ticks: 10,
            backoff_max_ticks: 160,
            horizon: 5,
            movement_timeout_ticks: 100,
        }
    }
}
