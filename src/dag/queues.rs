// src/dag/queues.rs

//! State-tagged task queues.

use std::collections::BTreeMap;

use tracing::trace;

use crate::dag::task::Task;
use crate::errors::{Result, SchedulerError};
use crate::types::{TaskName, TaskState};

/// One insertion-ordered queue per queued [`TaskState`].
///
/// The association between a queue and its state lives in the map key, so a
/// task's queue is always found through `task.state`.
#[derive(Debug, Clone)]
pub struct TaskQueues {
    queues: BTreeMap<TaskState, Vec<TaskName>>,
}

impl TaskQueues {
    pub fn new() -> Self {
        let queues = TaskState::QUEUED
            .iter()
            .map(|state| (*state, Vec::new()))
            .collect();
        Self { queues }
    }

    /// Append a freshly registered task to the Init queue.
    pub fn push_init(&mut self, task: &Task) {
        debug_assert_eq!(task.state, TaskState::Init);
        self.queue_mut(TaskState::Init).push(task.name.clone());
    }

    /// Names currently queued under `state`, in insertion order.
    pub fn get(&self, state: TaskState) -> &[TaskName] {
        self.queues
            .get(&state)
            .map(|q| q.as_slice())
            .unwrap_or(&[])
    }

    pub fn len(&self, state: TaskState) -> usize {
        self.get(state).len()
    }

    /// Number of tasks that still need the run loop (Wait + Ready + Run).
    pub fn pending(&self) -> usize {
        self.len(TaskState::Wait) + self.len(TaskState::Ready) + self.len(TaskState::Run)
    }

    /// Queue that currently holds `name`, if any.
    pub fn state_of(&self, name: &str) -> Option<TaskState> {
        self.queues
            .iter()
            .find(|(_, q)| q.iter().any(|n| n == name))
            .map(|(state, _)| *state)
    }

    /// Move `task` from the `from` queue to the `to` queue and update its state.
    ///
    /// Fails without touching anything if `task.state != from`, if the state
    /// machine forbids the transition, or if the task is not in the `from`
    /// queue. Moving to `Invalid` only removes the task from its queue.
    pub fn move_task(&mut self, task: &mut Task, from: TaskState, to: TaskState) -> Result<()> {
        let transition_error = || SchedulerError::InvalidTransition {
            task: task.name.clone(),
            from: task.state,
            to,
        };

        if task.state != from || !from.can_transition_to(to) {
            return Err(transition_error());
        }

        let source = self.queue_mut(from);
        let pos = source
            .iter()
            .position(|n| *n == task.name)
            .ok_or_else(transition_error)?;
        source.remove(pos);

        if to != TaskState::Invalid {
            self.queue_mut(to).push(task.name.clone());
        }
        task.state = to;

        trace!(task = %task.name, %from, %to, "moved task");
        Ok(())
    }

    fn queue_mut(&mut self, state: TaskState) -> &mut Vec<TaskName> {
        self.queues.entry(state).or_default()
    }
}

impl Default for TaskQueues {
    fn default() -> Self {
        Self::new()
    }
}
