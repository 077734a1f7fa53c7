// src/dag/task.rs

//! Task and slot entities.

use chrono::{DateTime, Utc};

use crate::types::{InvalidReason, TaskName, TaskState};

/// Default priority for tasks that do not set one.
pub const DEFAULT_PRIORITY: i64 = 0;

/// Default capacity charge for tasks that do not set one.
pub const DEFAULT_CAPACITY: u32 = 1;

/// Resolved registration input for a task.
///
/// Config defaults have already been applied; see
/// [`crate::config::TaskConfig::resolve`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TaskSpec {
    pub name: TaskName,
    pub slot: String,
    pub priority: i64,
    pub capacity: u32,
    pub cmd: Option<String>,
    /// Successors: each named task will depend on this one.
    pub to: Vec<TaskName>,
    /// Predecessors: this task depends on each named task.
    pub from: Vec<TaskName>,
}

impl TaskSpec {
    pub fn new(name: impl Into<TaskName>, slot: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            slot: slot.into(),
            priority: DEFAULT_PRIORITY,
            capacity: DEFAULT_CAPACITY,
            cmd: None,
            to: Vec::new(),
            from: Vec::new(),
        }
    }
}

/// A registered task with its graph edges and runtime bookkeeping.
#[derive(Debug, Clone)]
pub struct Task {
    pub name: TaskName,
    pub slot: String,
    pub priority: i64,
    pub capacity: u32,
    pub cmd: Option<String>,
    pub to: Vec<TaskName>,
    pub from: Vec<TaskName>,

    /// Predecessors that have not completed yet.
    pub depends: Vec<TaskName>,
    /// Successors that list this task as a predecessor.
    pub blocks: Vec<TaskName>,

    pub state: TaskState,
    pub invalid_reason: Option<InvalidReason>,
    pub exit_code: Option<i32>,
    pub fired_at: Option<DateTime<Utc>>,
    pub exited_at: Option<DateTime<Utc>>,
}

impl Task {
    pub fn from_spec(spec: TaskSpec) -> Self {
        Self {
            name: spec.name,
            slot: spec.slot,
            priority: spec.priority,
            capacity: spec.capacity,
            cmd: spec.cmd,
            to: spec.to,
            from: spec.from,
            depends: Vec::new(),
            blocks: Vec::new(),
            state: TaskState::Init,
            invalid_reason: None,
            exit_code: None,
            fired_at: None,
            exited_at: None,
        }
    }

    /// Flag the task as invalid during tidy.
    ///
    /// The task stays in INIT (and in the Init queue) until tidy settles the
    /// batch. Only the first reason is kept so logs show the root cause.
    pub(crate) fn mark_invalid(&mut self, reason: InvalidReason) {
        if self.invalid_reason.is_none() {
            self.invalid_reason = Some(reason);
        }
    }

    pub fn is_marked_invalid(&self) -> bool {
        self.invalid_reason.is_some()
    }
}

/// A named resource pool.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Slot {
    pub name: String,
    pub capacity: u32,
    /// Capacity consumed by running tasks.
    pub rank: u32,
}

impl Slot {
    pub fn new(name: impl Into<String>, capacity: u32) -> Self {
        Self {
            name: name.into(),
            capacity,
            rank: 0,
        }
    }

    pub fn available(&self) -> u32 {
        self.capacity.saturating_sub(self.rank)
    }

    pub fn has_room(&self) -> bool {
        self.rank < self.capacity
    }
}

/// Description of a fired task handed to the executor.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ScheduledTask {
    pub name: TaskName,
    pub slot: String,
    pub priority: i64,
    pub capacity: u32,
    pub cmd: Option<String>,
}

impl ScheduledTask {
    pub fn from_task(task: &Task) -> Self {
        Self {
            name: task.name.clone(),
            slot: task.slot.clone(),
            priority: task.priority,
            capacity: task.capacity,
            cmd: task.cmd.clone(),
        }
    }
}
