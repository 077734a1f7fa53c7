// src/dag/tidy.rs

//! Graph construction and validation for freshly registered tasks.
//!
//! Tidy turns the Init queue into a validated dependency graph:
//! 1. each task's capacity is checked against its slot,
//! 2. `to` / `from` lists become `depends` / `blocks` edges,
//! 3. dependency cycles are detected,
//! 4. invalidity cascades over `blocks`,
//! 5. invalid tasks are dropped, the rest move to READY or WAIT.

use std::collections::{BTreeMap, HashMap, HashSet};

use petgraph::algo::tarjan_scc;
use petgraph::graphmap::DiGraphMap;
use tracing::{debug, info};

use crate::dag::queues::TaskQueues;
use crate::dag::scheduler_step::TidyReport;
use crate::dag::task::{Slot, Task};
use crate::errors::Result;
use crate::types::{InvalidReason, TaskName, TaskState};

/// One tidy pass over the current Init batch.
pub struct Validator<'a> {
    tasks: &'a mut HashMap<TaskName, Task>,
    slots: &'a BTreeMap<String, Slot>,
    queues: &'a mut TaskQueues,
}

impl<'a> Validator<'a> {
    pub fn new(
        tasks: &'a mut HashMap<TaskName, Task>,
        slots: &'a BTreeMap<String, Slot>,
        queues: &'a mut TaskQueues,
    ) -> Self {
        Self {
            tasks,
            slots,
            queues,
        }
    }

    pub fn run(mut self) -> Result<TidyReport> {
        let batch: Vec<TaskName> = self.queues.get(TaskState::Init).to_vec();
        if batch.is_empty() {
            debug!("tidy: init queue empty; nothing to do");
            return Ok(TidyReport::default());
        }

        let members: HashSet<TaskName> = batch.iter().cloned().collect();

        let mut slot_ok = Vec::with_capacity(batch.len());
        for name in &batch {
            if self.check_slot(name) {
                slot_ok.push(name.clone());
            }
        }

        for name in &slot_ok {
            self.link_successors(name, &members);
            self.link_predecessors(name, &members);
        }

        self.mark_cycles(&batch);
        self.cascade_invalid(&batch);
        self.settle(batch)
    }

    /// Returns `false` if the task was marked invalid.
    fn check_slot(&mut self, name: &str) -> bool {
        let Some(task) = self.tasks.get_mut(name) else {
            return false;
        };

        if task.capacity == 0 {
            debug!(task = %name, "tidy: task requests zero capacity");
            task.mark_invalid(InvalidReason::ZeroCapacity);
            return false;
        }

        match self.slots.get(&task.slot) {
            None => {
                debug!(task = %name, slot = %task.slot, "tidy: invalid slot id");
                task.mark_invalid(InvalidReason::UnknownSlot(task.slot.clone()));
                false
            }
            Some(slot) if task.capacity > slot.capacity => {
                debug!(
                    task = %name,
                    slot = %slot.name,
                    requested = task.capacity,
                    available = slot.capacity,
                    "tidy: task can never fit its slot"
                );
                task.mark_invalid(InvalidReason::CapacityExceedsSlot {
                    requested: task.capacity,
                    available: slot.capacity,
                });
                false
            }
            Some(_) => true,
        }
    }

    /// `to` entries: each named task in this batch comes to depend on `name`.
    /// Unknown targets, or targets outside the batch, are skipped.
    fn link_successors(&mut self, name: &str, members: &HashSet<TaskName>) {
        let targets = match self.tasks.get(name) {
            Some(task) => task.to.clone(),
            None => return,
        };

        for target in targets {
            if !self.tasks.contains_key(&target) {
                debug!(task = %name, id = %target, "tidy: unknown `to` task; skipped");
                continue;
            }
            if !members.contains(&target) {
                debug!(task = %name, id = %target, "tidy: `to` task already tidied; skipped");
                continue;
            }
            self.link(&target, name);
        }
    }

    /// `from` entries: `name` depends on each named task. An unknown
    /// predecessor makes `name` invalid.
    fn link_predecessors(&mut self, name: &str, members: &HashSet<TaskName>) {
        let preds = match self.tasks.get(name) {
            Some(task) => task.from.clone(),
            None => return,
        };

        for pred in preds {
            let pred_state = self.tasks.get(&pred).map(|t| t.state);

            let reason = match pred_state {
                None => Some(InvalidReason::UnknownDependency(pred.clone())),
                Some(_) if members.contains(&pred) => None,
                Some(TaskState::Done) => {
                    debug!(task = %name, id = %pred, "tidy: predecessor already done");
                    continue;
                }
                Some(TaskState::Fail) | Some(TaskState::Cancel) => {
                    Some(InvalidReason::FailedDependency(pred.clone()))
                }
                Some(_) => None,
            };

            match reason {
                Some(reason) => {
                    debug!(task = %name, id = %pred, %reason, "tidy: invalid `from` task");
                    if let Some(task) = self.tasks.get_mut(name) {
                        task.mark_invalid(reason);
                    }
                }
                None => self.link(name, &pred),
            }
        }
    }

    /// Record "`task` depends on `pred`" on both ends.
    fn link(&mut self, task: &str, pred: &str) {
        if let Some(t) = self.tasks.get_mut(task) {
            if !t.depends.iter().any(|d| d == pred) {
                t.depends.push(pred.to_string());
            }
        }
        if let Some(p) = self.tasks.get_mut(pred) {
            if !p.blocks.iter().any(|b| b == task) {
                p.blocks.push(task.to_string());
            }
        }
    }

    /// Mark every task that sits on a dependency cycle, self-loops included.
    ///
    /// Edges only ever point into the current batch, so cycles cannot involve
    /// tasks from earlier tidy passes.
    fn mark_cycles(&mut self, batch: &[TaskName]) {
        let edges: Vec<(TaskName, TaskName)> = batch
            .iter()
            .filter_map(|name| self.tasks.get(name))
            .flat_map(|task| {
                task.depends
                    .iter()
                    .map(move |pred| (pred.clone(), task.name.clone()))
            })
            .collect();

        let cyclic: Vec<TaskName> = {
            let mut graph: DiGraphMap<&str, ()> = DiGraphMap::new();
            for name in batch {
                graph.add_node(name.as_str());
            }
            for (pred, task) in &edges {
                graph.add_edge(pred.as_str(), task.as_str(), ());
            }

            tarjan_scc(&graph)
                .into_iter()
                .filter(|scc| scc.len() > 1 || graph.contains_edge(scc[0], scc[0]))
                .flatten()
                .map(|n| n.to_string())
                .collect()
        };

        for name in cyclic {
            if let Some(task) = self.tasks.get_mut(&name) {
                debug!(task = %name, "tidy: task is part of a dependency cycle");
                task.mark_invalid(InvalidReason::DependencyCycle);
            }
        }
    }

    /// Everything reachable over `blocks` from an invalid task is invalid too.
    fn cascade_invalid(&mut self, batch: &[TaskName]) {
        let mut queue: Vec<TaskName> = batch
            .iter()
            .filter(|name| self.tasks.get(*name).is_some_and(Task::is_marked_invalid))
            .cloned()
            .collect();
        let mut visited: HashSet<TaskName> = HashSet::new();

        while let Some(name) = queue.pop() {
            if !visited.insert(name.clone()) {
                continue;
            }

            let blocks = match self.tasks.get(&name) {
                Some(task) => task.blocks.clone(),
                None => continue,
            };

            for blocked in blocks {
                let Some(task) = self.tasks.get_mut(&blocked) else {
                    continue;
                };
                if task.state == TaskState::Init && !task.is_marked_invalid() {
                    task.mark_invalid(InvalidReason::InvalidDependency(name.clone()));
                    queue.push(blocked);
                }
            }
        }
    }

    /// Drop invalid tasks and place the rest in READY or WAIT.
    fn settle(&mut self, batch: Vec<TaskName>) -> Result<TidyReport> {
        let mut report = TidyReport::default();

        for name in batch {
            let Some(task) = self.tasks.get_mut(&name) else {
                continue;
            };

            if let Some(reason) = task.invalid_reason.clone() {
                self.queues
                    .move_task(task, TaskState::Init, TaskState::Invalid)?;
                self.tasks.remove(&name);
                info!(task = %name, %reason, "tidy: dropping invalid task");
                report.dropped.push((name, reason));
            } else if task.depends.is_empty() {
                self.queues
                    .move_task(task, TaskState::Init, TaskState::Ready)?;
                report.ready.push(name);
            } else {
                self.queues
                    .move_task(task, TaskState::Init, TaskState::Wait)?;
                report.waiting.push(name);
            }
        }

        if !report.dropped.is_empty() {
            let dropped: HashSet<&str> = report.dropped.iter().map(|(n, _)| n.as_str()).collect();
            for task in self.tasks.values_mut() {
                task.blocks.retain(|b| !dropped.contains(b.as_str()));
            }
        }

        info!(
            added = report.admitted(),
            dropped = report.dropped.len(),
            "Add {} new tasks.",
            report.admitted()
        );

        Ok(report)
    }
}
