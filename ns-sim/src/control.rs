use ns_utils::{BlockPos, Direction};

/// Discrete control outputs the executor emits each tick. Translating
/// these into wire messages is the protocol layer's job.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum ControlIntent {
    LookAt { yaw: f32, pitch: f32 },
    SetForward(f32),
    SetJump(bool),
    SetSneak(bool),
    SetSprint(bool),
    StartBreak { pos: BlockPos, face: Direction },
    ContinueBreak { pos: BlockPos, face: Direction },
    CancelBreak,
    Place { pos: BlockPos, face: Direction },
}
