// src/dag/state_manager.rs

//! Completion-driven state transitions for dependents of a finished task.

use std::collections::{HashMap, HashSet};

use tracing::{debug, warn};

use crate::dag::queues::TaskQueues;
use crate::dag::task::Task;
use crate::errors::Result;
use crate::types::{TaskName, TaskState};

/// Applies the effects of a task exit to the tasks it blocks.
pub struct StateManager<'a> {
    tasks: &'a mut HashMap<TaskName, Task>,
    queues: &'a mut TaskQueues,
}

impl<'a> StateManager<'a> {
    pub fn new(tasks: &'a mut HashMap<TaskName, Task>, queues: &'a mut TaskQueues) -> Self {
        Self { tasks, queues }
    }

    /// Resolve the edges from `done` to its dependents.
    ///
    /// Every task in `done.blocks` drops `done` from its `depends`; the ones
    /// left with no pending dependency while in WAIT move to READY. Returns
    /// the newly ready task names.
    pub fn release_dependents(&mut self, done: &str) -> Result<Vec<TaskName>> {
        let blocks = match self.tasks.get(done) {
            Some(task) => task.blocks.clone(),
            None => return Ok(Vec::new()),
        };

        let mut newly_ready = Vec::new();

        for name in blocks {
            let Some(dependent) = self.tasks.get_mut(&name) else {
                warn!(task = %name, cause = %done, "blocked task missing from registry");
                continue;
            };

            dependent.depends.retain(|d| d != done);

            if dependent.depends.is_empty() && dependent.state == TaskState::Wait {
                self.queues
                    .move_task(dependent, TaskState::Wait, TaskState::Ready)?;
                debug!(task = %name, cause = %done, "dependencies satisfied; task ready");
                newly_ready.push(name);
            }
        }

        Ok(newly_ready)
    }

    /// Cancel every WAIT task transitively blocked by `failed`.
    ///
    /// READY and RUN tasks are left alone: their dependencies are already
    /// satisfied. Returns the cancelled names in cancellation order.
    pub fn cancel_dependents(&mut self, failed: &str) -> Result<Vec<TaskName>> {
        let mut stack = self.waiting_blocked_by(failed);
        let mut visited: HashSet<TaskName> = HashSet::new();
        let mut cancelled = Vec::new();

        while let Some(name) = stack.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }

            let Some(task) = self.tasks.get_mut(&name) else {
                continue;
            };
            if task.state != TaskState::Wait {
                continue;
            }

            self.queues
                .move_task(task, TaskState::Wait, TaskState::Cancel)?;
            debug!(task = %name, cause = %failed, "task cancelled");

            stack.extend(
                self.waiting_blocked_by(&name)
                    .into_iter()
                    .filter(|b| !visited.contains(b)),
            );
            cancelled.push(name);
        }

        Ok(cancelled)
    }

    fn waiting_blocked_by(&self, name: &str) -> Vec<TaskName> {
        let Some(task) = self.tasks.get(name) else {
            return Vec::new();
        };

        task.blocks
            .iter()
            .filter(|b| {
                self.tasks
                    .get(b.as_str())
                    .is_some_and(|t| t.state == TaskState::Wait)
            })
            .cloned()
            .collect()
    }
}
