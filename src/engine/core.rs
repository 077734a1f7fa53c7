// src/engine/core.rs

//! Synchronous heart of the run loop.
//!
//! [`CoreRuntime`] owns the scheduler and turns ticks and [`RuntimeEvent`]s
//! into [`CoreStep`]s: what to dispatch, and whether the loop goes on.
//! Timing, channels and executors live in `engine::runtime::Runtime`; the
//! core can be driven by hand in tests without Tokio or processes.

use tracing::{info, warn};

use crate::dag::{RunSummary, ScheduledTask, Scheduler};
use crate::engine::RuntimeEvent;
use crate::errors::{Result, SchedulerError};

/// Work the async shell must carry out after a core step.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CoreCommand {
    /// Hand these freshly fired tasks to the executor backend.
    DispatchTasks(Vec<ScheduledTask>),
}

/// Decision returned by the core after a tick or an event.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CoreStep {
    /// Commands the IO shell should execute.
    pub commands: Vec<CoreCommand>,
    /// `false` ends the run loop.
    pub keep_running: bool,
}

impl CoreStep {
    fn idle(keep_running: bool) -> Self {
        Self {
            commands: Vec::new(),
            keep_running,
        }
    }
}

/// Pure core runtime state: the scheduler and nothing else.
///
/// No channels, no Tokio types, no IO.
#[derive(Debug)]
pub struct CoreRuntime {
    scheduler: Scheduler,
}

impl CoreRuntime {
    pub fn new(scheduler: Scheduler) -> Self {
        Self { scheduler }
    }

    pub fn scheduler(&self) -> &Scheduler {
        &self.scheduler
    }

    pub fn into_scheduler(self) -> Scheduler {
        self.scheduler
    }

    pub fn is_drained(&self) -> bool {
        self.scheduler.is_drained()
    }

    pub fn summary(&self) -> RunSummary {
        self.scheduler.summary()
    }

    /// Run one admission tick.
    ///
    /// `keep_running` is `false` once WAIT, READY and RUN are all empty, in
    /// which case the run is over.
    pub fn tick(&mut self) -> Result<CoreStep> {
        let fired = self.scheduler.tick()?;

        let mut step = CoreStep::idle(!self.scheduler.is_drained());
        if !fired.is_empty() {
            step.commands.push(CoreCommand::DispatchTasks(fired));
        }
        Ok(step)
    }

    /// Handle a single runtime event.
    ///
    /// Exit notifications never dispatch anything: newly ready tasks wait
    /// for the next tick.
    pub fn step(&mut self, event: RuntimeEvent) -> Result<CoreStep> {
        match event {
            RuntimeEvent::TaskExited { task, code } => {
                match self.scheduler.on_exit(&task, code) {
                    Ok(_) => {}
                    Err(err @ (SchedulerError::UnknownTask(_) | SchedulerError::NotRunning { .. })) => {
                        warn!(task = %task, exit_code = code, error = %err, "ignoring unexpected exit notification");
                    }
                    Err(err) => return Err(err),
                }
                Ok(CoreStep::idle(true))
            }
            RuntimeEvent::ShutdownRequested => {
                info!(pending = self.scheduler.pending(), "shutdown requested");
                Ok(CoreStep::idle(false))
            }
        }
    }
}
