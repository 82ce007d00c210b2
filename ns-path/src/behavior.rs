use std::sync::Arc;
use std::sync::atomic::{AtomicBool, Ordering};
use std::thread;

use bevy::prelude::Resource;
use crossbeam::channel::{Receiver, bounded};
use ns_sim::AgentState;
use ns_utils::BlockPos;
use ns_world::WorldGrid;
use tracing::{debug, info, warn};

use crate::astar::{self, SearchOutcome};
use crate::context::{CalculationContext, InventoryQuery};
use crate::executor::{ExecStatus, PathExecutor, TickOutput};
use crate::goal::Goal;
use crate::settings::PathSettings;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum PathState {
    Idle,
    Calculating,
    Pathing,
    Paused,
}

/// Lifecycle notifications surfaced once, on the tick they happen.
#[derive(Clone, Debug, PartialEq)]
pub enum PathEvent {
    CalculationStarted,
    CalculationFinished { found_path: bool },
    GoalReached,
    PathAborted,
}

struct InFlightSearch {
    cancel: Arc<AtomicBool>,
    calculating: Arc<AtomicBool>,
    result: Receiver<SearchOutcome>,
}

/// Top-level controller: owns the goal, hands searches to a background
/// thread, installs finished paths into an executor, and drives it one
/// world tick at a time. Exactly one search is in flight per agent.
#[derive(Resource)]
pub struct PathingBehavior {
    settings: PathSettings,
    inventory: Arc<dyn InventoryQuery>,
    goal: Option<Goal>,
    state: PathState,
    executor: Option<PathExecutor>,
    in_flight: Option<InFlightSearch>,
    /// Ticks to wait before the next search attempt, when backing off.
    retry_in: Option<u32>,
    consecutive_failures: u32,
    /// Calculating flag of a cancelled search that may still be winding
    /// down. Cancellation is cooperative; callers must not assume the
    /// thread stopped until `is_calculating` reads false.
    winding_down: Option<Arc<AtomicBool>>,
}

impl PathingBehavior {
    pub fn new(settings: PathSettings, inventory: Arc<dyn InventoryQuery>) -> PathingBehavior {
        PathingBehavior {
            settings,
            inventory,
            goal: None,
            state: PathState::Idle,
            executor: None,
            in_flight: None,
            retry_in: None,
            consecutive_failures: 0,
            winding_down: None,
        }
    }

    pub fn state(&self) -> PathState {
        self.state
    }

    pub fn goal(&self) -> Option<&Goal> {
        self.goal.as_ref()
    }

    pub fn is_pathing(&self) -> bool {
        matches!(self.state, PathState::Pathing | PathState::Paused)
    }

    /// True while a background search owns the node table. After a
    /// cancel request the search has not necessarily stopped until this
    /// reads false.
    pub fn is_calculating(&self) -> bool {
        self.in_flight
            .as_ref()
            .is_some_and(|s| s.calculating.load(Ordering::Acquire))
            || self
                .winding_down
                .as_ref()
                .is_some_and(|c| c.load(Ordering::Acquire))
    }

    pub fn current_path(&self) -> Option<&crate::path::Path> {
        self.executor.as_ref().map(|e| e.path())
    }

    /// Sets the goal and starts a background calculation from `start`.
    /// Returns without blocking; any previous search is cancelled.
    pub fn set_goal_and_path(&mut self, goal: Goal, start: BlockPos, world: &Arc<WorldGrid>) {
        self.cancel_in_flight();
        self.executor = None;
        self.retry_in = None;
        self.consecutive_failures = 0;
        self.goal = Some(goal);
        self.spawn_search(start, world);
    }

    /// Cooperatively cancels everything and returns to idle.
    pub fn force_cancel(&mut self) {
        self.cancel_in_flight();
        self.goal = None;
        self.executor = None;
        self.retry_in = None;
        self.state = PathState::Idle;
    }

    /// Withholds control output without discarding the plan.
    pub fn pause(&mut self) {
        if self.state == PathState::Pathing {
            self.state = PathState::Paused;
        }
    }

    pub fn resume(&mut self) {
        if self.state == PathState::Paused {
            self.state = PathState::Pathing;
        }
    }

    fn cancel_in_flight(&mut self) {
        if let Some(search) = self.in_flight.take() {
            search.cancel.store(true, Ordering::Release);
            // The thread observes the flag at its next periodic check and
            // winds down on its own; the stale result is dropped with the
            // receiver.
            self.winding_down = Some(search.calculating);
        }
    }

    fn spawn_search(&mut self, start: BlockPos, world: &Arc<WorldGrid>) {
        let Some(goal) = self.goal.clone() else {
            return;
        };
        let cancel = Arc::new(AtomicBool::new(false));
        let calculating = Arc::new(AtomicBool::new(true));
        let (tx, rx) = bounded(1);
        let ctx = CalculationContext::new(
            Arc::clone(world),
            self.settings.clone(),
            Arc::clone(&self.inventory),
        );
        {
            let cancel = Arc::clone(&cancel);
            let calculating = Arc::clone(&calculating);
            thread::spawn(move || {
                let outcome = astar::search(&ctx, start, &goal, &cancel);
                calculating.store(false, Ordering::Release);
                // The owner may have moved on; a dead receiver is fine.
                let _ = tx.send(outcome);
            });
        }
        self.in_flight = Some(InFlightSearch {
            cancel,
            calculating,
            result: rx,
        });
        self.state = PathState::Calculating;
        debug!(?start, "search started");
    }

    fn schedule_retry(&mut self) {
        let wait = (self.settings.backoff_min_ticks << self.consecutive_failures.min(16))
            .min(self.settings.backoff_max_ticks);
        self.consecutive_failures += 1;
        self.retry_in = Some(wait);
        self.state = PathState::Calculating;
        debug!(wait, "retry scheduled");
    }

    /// Advances the whole behavior by one world tick. Call at the world
    /// cadence; never blocks on the background search.
    pub fn on_tick(
        &mut self,
        agent: &mut AgentState,
        world: &Arc<WorldGrid>,
    ) -> (TickOutput, Option<PathEvent>) {
        let mut event = None;

        if self
            .winding_down
            .as_ref()
            .is_some_and(|c| !c.load(Ordering::Acquire))
        {
            self.winding_down = None;
        }

        // Backoff countdown toward the next attempt. Runs before result
        // installation so a retry scheduled this tick waits its full span.
        if let Some(wait) = self.retry_in {
            if wait == 0 {
                self.retry_in = None;
                let start = BlockPos::from_feet(agent.pos);
                self.spawn_search(start, world);
                event = Some(PathEvent::CalculationStarted);
            } else {
                self.retry_in = Some(wait - 1);
            }
        }

        // Install a completed search, if one arrived.
        let finished = self
            .in_flight
            .as_ref()
            .and_then(|s| s.result.try_recv().ok());
        if let Some(outcome) = finished {
            self.in_flight = None;
            event = Some(self.install(outcome));
        }

        if self.state != PathState::Pathing {
            return (TickOutput::default(), event);
        }
        let Some(executor) = self.executor.as_mut() else {
            self.state = PathState::Idle;
            return (TickOutput::default(), event);
        };

        let ctx = CalculationContext::new(
            Arc::clone(world),
            self.settings.clone(),
            Arc::clone(&self.inventory),
        );
        let output = executor.on_tick(agent, &ctx);
        match executor.status() {
            ExecStatus::Executing => {}
            ExecStatus::Done => {
                info!("goal reached");
                self.executor = None;
                self.goal = None;
                self.state = PathState::Idle;
                self.consecutive_failures = 0;
                event = Some(PathEvent::GoalReached);
            }
            ExecStatus::PartialDone => {
                // Walked as far as the partial went; replan from here.
                debug!("partial path exhausted, replanning");
                self.executor = None;
                self.consecutive_failures = 0;
                let start = BlockPos::from_feet(agent.pos);
                self.spawn_search(start, world);
            }
            ExecStatus::Failed => {
                warn!("path execution failed");
                self.executor = None;
                event = Some(PathEvent::PathAborted);
                self.schedule_retry();
            }
        }
        (output, event)
    }

    fn install(&mut self, outcome: SearchOutcome) -> PathEvent {
        match outcome {
            SearchOutcome::Success(path) | SearchOutcome::Partial(path) => {
                info!(
                    length = path.len(),
                    reaches_goal = path.reaches_goal,
                    nodes = path.nodes_considered,
                    "path installed"
                );
                self.executor = Some(PathExecutor::new(path));
                self.state = PathState::Pathing;
                self.consecutive_failures = 0;
                PathEvent::CalculationFinished { found_path: true }
            }
            SearchOutcome::Failure => {
                warn!("search found no path");
                self.schedule_retry();
                PathEvent::CalculationFinished { found_path: false }
            }
            SearchOutcome::Cancelled => {
                debug!("search cancelled");
                if self.goal.is_none() {
                    self.state = PathState::Idle;
                }
                PathEvent::CalculationFinished { found_path: false }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use super::*;
    use crate::context::EmptyInventory;
    use ns_sim::step_tick;
    use ns_world::block_state;

    const STONE: u16 = block_state(1, 0);

    fn flat_world() -> Arc<WorldGrid> {
        let mut world = WorldGrid::default();
        world.fill_layer(BlockPos::new(-16, 64, -16), BlockPos::new(31, 64, 31), STONE);
        Arc::new(world)
    }

    fn behavior() -> PathingBehavior {
        PathingBehavior::new(PathSettings::default(), Arc::new(EmptyInventory))
    }

    fn agent_at(pos: BlockPos) -> AgentState {
        AgentState {
            pos: pos.center_bottom(),
            on_ground: true,
            ..Default::default()
        }
    }

    /// Ticks until the in-flight search result has been installed.
    fn tick_until_not_calculating(
        behavior: &mut PathingBehavior,
        agent: &mut AgentState,
        world: &Arc<WorldGrid>,
    ) {
        for _ in 0..500 {
            behavior.on_tick(agent, world);
            if behavior.state() != PathState::Calculating || behavior.retry_in.is_some() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("search never finished");
    }

    #[test]
    fn reaches_a_nearby_goal_end_to_end() {
        let world = flat_world();
        let mut behavior = behavior();
        let mut agent = agent_at(BlockPos::new(0, 65, 0));
        behavior.set_goal_and_path(Goal::Block(BlockPos::new(6, 65, 0)), BlockPos::new(0, 65, 0), &world);
        assert_eq!(behavior.state(), PathState::Calculating);
        tick_until_not_calculating(&mut behavior, &mut agent, &world);
        assert_eq!(behavior.state(), PathState::Pathing);

        let mut reached = false;
        for _ in 0..600 {
            let (output, event) = behavior.on_tick(&mut agent, &world);
            if event == Some(PathEvent::GoalReached) {
                reached = true;
                break;
            }
            agent = step_tick(&agent, &output.input, &world);
        }
        assert!(reached);
        assert_eq!(behavior.state(), PathState::Idle);
        assert_eq!(BlockPos::from_feet(agent.pos), BlockPos::new(6, 65, 0));
    }

    #[test]
    fn force_cancel_returns_to_idle_and_winds_down() {
        let world = flat_world();
        let mut behavior = behavior();
        // Far outside the loaded area so the search runs its full budget.
        behavior.set_goal_and_path(
            Goal::Block(BlockPos::new(10_000, 65, 0)),
            BlockPos::new(0, 65, 0),
            &world,
        );
        behavior.force_cancel();
        assert!(!behavior.is_pathing());
        assert_eq!(behavior.state(), PathState::Idle);
        assert!(behavior.goal().is_none());

        // Cooperative cancel: the flag flips only once the thread
        // observes the request.
        for _ in 0..500 {
            if !behavior.is_calculating() {
                return;
            }
            thread::sleep(Duration::from_millis(10));
        }
        panic!("cancelled search never wound down");
    }

    #[test]
    fn failure_schedules_tick_counted_backoff() {
        let mut world = WorldGrid::default();
        world.fill_layer(BlockPos::new(-16, 64, -16), BlockPos::new(31, 64, 31), STONE);
        // Box the agent in with unbreakable settings.
        for (dx, dz) in [(1, 0), (-1, 0), (0, 1), (0, -1)] {
            for y in 65..=67 {
                world.set_block(BlockPos::new(dx, y, dz), STONE);
            }
        }
        world.set_block(BlockPos::new(0, 67, 0), STONE);
        let world = Arc::new(world);
        let settings = PathSettings {
            allow_break: false,
            allow_place: false,
            ..PathSettings::default()
        };
        let mut behavior = PathingBehavior::new(settings.clone(), Arc::new(EmptyInventory));
        let mut agent = agent_at(BlockPos::new(0, 65, 0));
        behavior.set_goal_and_path(Goal::Block(BlockPos::new(8, 65, 0)), BlockPos::new(0, 65, 0), &world);
        tick_until_not_calculating(&mut behavior, &mut agent, &world);
        let wait = behavior.retry_in.expect("backoff scheduled");
        assert!(wait >= settings.backoff_min_ticks);
        assert!(wait <= settings.backoff_max_ticks);
        // Counting down is tick-driven, not wall-clock.
        behavior.on_tick(&mut agent, &world);
        assert_eq!(behavior.retry_in, Some(wait - 1));
    }

    #[test]
    fn pause_withholds_output_but_keeps_the_plan() {
        let world = flat_world();
        let mut behavior = behavior();
        let mut agent = agent_at(BlockPos::new(0, 65, 0));
        behavior.set_goal_and_path(Goal::Block(BlockPos::new(5, 65, 0)), BlockPos::new(0, 65, 0), &world);
        tick_until_not_calculating(&mut behavior, &mut agent, &world);
        assert_eq!(behavior.state(), PathState::Pathing);

        behavior.pause();
        assert_eq!(behavior.state(), PathState::Paused);
        let (output, _) = behavior.on_tick(&mut agent, &world);
        assert_eq!(output.input.forward, 0.0);
        assert!(output.intents.is_empty());
        assert!(behavior.current_path().is_some());

        behavior.resume();
        assert_eq!(behavior.state(), PathState::Pathing);
        let (output, _) = behavior.on_tick(&mut agent, &world);
        assert!(output.input.forward > 0.0);
    }
}
