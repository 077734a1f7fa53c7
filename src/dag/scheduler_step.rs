// src/dag/scheduler_step.rs

//! Result types returned by the scheduler's mutating operations.

use std::fmt;

use crate::types::{InvalidReason, TaskName};

/// Outcome of a tidy pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct TidyReport {
    /// Tasks placed in READY, in registration order.
    pub ready: Vec<TaskName>,
    /// Tasks placed in WAIT, in registration order.
    pub waiting: Vec<TaskName>,
    /// Tasks removed from the registry and why.
    pub dropped: Vec<(TaskName, InvalidReason)>,
}

impl TidyReport {
    /// Number of tasks that made it into the graph.
    pub fn admitted(&self) -> usize {
        self.ready.len() + self.waiting.len()
    }

    pub fn is_empty(&self) -> bool {
        self.admitted() == 0 && self.dropped.is_empty()
    }

    pub fn was_dropped(&self, name: &str) -> bool {
        self.dropped.iter().any(|(n, _)| n == name)
    }
}

/// Effects of one exit notification.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExitReport {
    pub task: TaskName,
    pub code: i32,
    /// Dependents promoted WAIT -> READY (success only).
    pub newly_ready: Vec<TaskName>,
    /// Dependents moved WAIT -> CANCEL (failure only), sorted by name.
    pub cancelled: Vec<TaskName>,
}

impl ExitReport {
    pub fn succeeded(&self) -> bool {
        self.code == 0
    }
}

/// Per-state task counts, used for the end-of-run report.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub init: usize,
    pub waiting: usize,
    pub ready: usize,
    pub running: usize,
    pub done: usize,
    pub failed: usize,
    pub cancelled: usize,
}

impl RunSummary {
    pub fn pending(&self) -> usize {
        self.waiting + self.ready + self.running
    }

    /// `true` once nothing is left to run and nothing failed or was cancelled.
    pub fn is_success(&self) -> bool {
        self.pending() == 0 && self.init == 0 && self.failed == 0 && self.cancelled == 0
    }
}

impl fmt::Display for RunSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "done={} failed={} cancelled={} pending={}",
            self.done,
            self.failed,
            self.cancelled,
            self.pending()
        )
    }
}
