use ns_sim::{AgentInput, AgentState, ControlIntent};
use ns_utils::BlockPos;
use tracing::{debug, warn};

use crate::context::CalculationContext;
use crate::movement::{Move, MoveState, MoveStatus, break_face};
use crate::path::Path;

/// What the executor reports after a tick.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ExecStatus {
    Executing,
    /// Walked the whole path and the path reached its goal.
    Done,
    /// Walked the whole path but the path was a partial; the owner
    /// should replan from here.
    PartialDone,
    /// The active movement failed or the next edge became impossible.
    Failed,
}

/// Per-tick control decisions plus the discrete intents to forward.
#[derive(Clone, Debug, Default)]
pub struct TickOutput {
    pub input: AgentInput,
    pub intents: Vec<ControlIntent>,
}

/// Walks a [`Path`] one movement at a time. Movements are re-synthesized
/// from the coordinate pairs so each is verified against the live world,
/// not the snapshot it was planned on.
pub struct PathExecutor {
    path: Path,
    movements: Vec<Move>,
    index: usize,
    state: MoveState,
    status: ExecStatus,
}

impl PathExecutor {
    pub fn new(path: Path) -> PathExecutor {
        let movements = path.movements();
        let status = if movements.is_empty() {
            if path.reaches_goal {
                ExecStatus::Done
            } else {
                ExecStatus::PartialDone
            }
        } else {
            ExecStatus::Executing
        };
        PathExecutor {
            path,
            movements,
            index: 0,
            state: MoveState::new(),
            status,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn status(&self) -> ExecStatus {
        self.status
    }

    pub fn is_finished(&self) -> bool {
        self.status != ExecStatus::Executing
    }

    /// Index of the movement currently being driven.
    pub fn active_index(&self) -> usize {
        self.index
    }

    fn finish(&mut self) -> ExecStatus {
        self.status = if self.path.reaches_goal {
            ExecStatus::Done
        } else {
            ExecStatus::PartialDone
        };
        self.status
    }

    pub fn on_tick(&mut self, agent: &mut AgentState, ctx: &CalculationContext) -> TickOutput {
        let mut out = TickOutput::default();
        if self.is_finished() {
            return out;
        }

        // The body sometimes lands ahead of the bookkeeping (a sprint
        // carries across a node). Fast-forward over already-reached
        // destinations.
        let feet = BlockPos::from_feet(agent.pos);
        let ahead = (self.index..self.movements.len().min(self.index + 2))
            .find(|&i| self.movements[i].dest == feet);
        if let Some(i) = ahead {
            if i != self.index || self.state.status == MoveStatus::Success {
                self.index = i + 1;
                self.state = MoveState::new();
            }
        }
        if self.index >= self.movements.len() {
            self.finish();
            return out;
        }

        // Runtime re-verification: a next edge that went infeasible means
        // the world changed under the plan. Abort before walking into it.
        if let Some(next) = self.movements.get(self.index + 1) {
            if !next.cost(ctx).is_finite() {
                warn!(index = self.index + 1, mv = ?next, "next movement became impossible");
                self.abort(&mut out);
                return out;
            }
        }

        // Horizon lookahead: start clearing obstructions a few movements
        // out so arrival does not stall on a dig.
        let horizon_end = self
            .movements
            .len()
            .min(self.index + 1 + ctx.settings.horizon);
        for mv in &self.movements[self.index + 1..horizon_end] {
            let plan = mv.plan(ctx);
            if let Some(&cell) = plan.breaks.first() {
                out.intents.push(ControlIntent::StartBreak {
                    pos: cell,
                    face: break_face(feet, cell),
                });
                break;
            }
        }

        let mv = self.movements[self.index];
        mv.update(&mut self.state, agent, &ctx.world, &ctx.settings);
        match self.state.status {
            MoveStatus::Success => {
                debug!(index = self.index, mv = ?mv, "movement complete");
                self.index += 1;
                self.state = MoveState::new();
                if self.index >= self.movements.len() {
                    self.finish();
                }
            }
            MoveStatus::Failed | MoveStatus::Unreachable => {
                warn!(index = self.index, mv = ?mv, status = ?self.state.status, "movement aborted");
                out.intents.clear();
                self.abort(&mut out);
                return out;
            }
            MoveStatus::Preparing | MoveStatus::Running => {}
        }

        out.input = self.state.as_input();
        out.intents.extend(self.state.intents());
        // Each break or place request carries a fresh sequence number so
        // the protocol layer can match the world's acknowledgement back
        // to it.
        for intent in &out.intents {
            if matches!(
                intent,
                ControlIntent::StartBreak { .. } | ControlIntent::Place { .. }
            ) {
                agent.increment_sequence();
            }
        }
        out
    }

    /// A dig left running at abort would keep swinging forever; tell the
    /// protocol layer to stop it.
    fn abort(&mut self, out: &mut TickOutput) {
        if self.state.break_target.is_some() {
            out.intents.push(ControlIntent::CancelBreak);
        }
        self.status = ExecStatus::Failed;
    }
}
