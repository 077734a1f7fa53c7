// src/dag/scheduler.rs

use std::collections::{BTreeMap, HashMap};

use chrono::Utc;
use tracing::{Span, debug, info, info_span, warn};

use crate::config::model::ConfigFile;
use crate::dag::admission::select_for_admission;
use crate::dag::queues::TaskQueues;
use crate::dag::scheduler_step::{ExitReport, RunSummary, TidyReport};
use crate::dag::state_manager::StateManager;
use crate::dag::task::{ScheduledTask, Slot, Task, TaskSpec};
use crate::dag::tidy::Validator;
use crate::errors::{Result, SchedulerError};
use crate::types::{TaskName, TaskState};

/// Owns every task and slot of one run.
///
/// It is responsible for:
/// - registering slots and tasks
/// - validating the dependency graph (`tidy`)
/// - admitting READY tasks within slot capacity (`tick`)
/// - applying exits: unblocking dependents or cancelling them (`on_exit`)
///
/// The scheduler never runs anything itself; `tick` returns the fired tasks
/// and the caller hands them to an executor.
#[derive(Debug)]
pub struct Scheduler {
    id: String,
    span: Span,
    tasks: HashMap<TaskName, Task>,
    slots: BTreeMap<String, Slot>,
    queues: TaskQueues,
}

impl Scheduler {
    /// Empty scheduler whose log events are scoped to `scheduler{id=..}`.
    pub fn new(id: impl Into<String>) -> Self {
        let id = id.into();
        let span = info_span!("scheduler", id = %id);
        Self::with_span(id, span)
    }

    /// Empty scheduler that records its log events inside `span`.
    pub fn with_span(id: impl Into<String>, span: Span) -> Self {
        Self {
            id: id.into(),
            span,
            tasks: HashMap::new(),
            slots: BTreeMap::new(),
            queues: TaskQueues::new(),
        }
    }

    /// Register every slot and task of a validated [`ConfigFile`].
    ///
    /// Tasks are left in INIT; call [`Scheduler::tidy`] afterwards.
    pub fn from_config(cfg: &ConfigFile) -> Result<Self> {
        let mut scheduler = Self::new(cfg.config.id.clone());

        for slot in &cfg.slot {
            scheduler.add_slot(Slot::new(slot.name.clone(), slot.capacity))?;
        }
        for task in &cfg.task {
            scheduler.add_task(task.resolve(&cfg.default)?)?;
        }

        Ok(scheduler)
    }

    pub fn id(&self) -> &str {
        &self.id
    }

    /// Register a slot. Names must be unique and capacity at least 1.
    pub fn add_slot(&mut self, slot: Slot) -> Result<()> {
        let _enter = self.span.enter();

        if self.slots.contains_key(&slot.name) {
            debug!(slot = %slot.name, "duplicated slot name");
            return Err(SchedulerError::DuplicateSlot(slot.name));
        }
        if slot.capacity == 0 {
            debug!(slot = %slot.name, "slot without capacity");
            return Err(SchedulerError::EmptySlot(slot.name));
        }

        debug!(slot = %slot.name, capacity = slot.capacity, "slot added");
        self.slots.insert(slot.name.clone(), slot);
        Ok(())
    }

    /// Register a task in INIT. Validation is deferred to [`Scheduler::tidy`].
    pub fn add_task(&mut self, spec: TaskSpec) -> Result<()> {
        let span = self.span.clone();
        let _enter = span.enter();

        if self.tasks.contains_key(&spec.name) {
            debug!(task = %spec.name, "duplicated task name");
            return Err(SchedulerError::DuplicateTask(spec.name));
        }

        let task = Task::from_spec(spec);
        debug!(
            task = %task.name,
            slot = %task.slot,
            priority = task.priority,
            capacity = task.capacity,
            "task added"
        );

        self.queues.push_init(&task);
        self.tasks.insert(task.name.clone(), task);
        Ok(())
    }

    /// Build and validate the dependency graph of all INIT tasks.
    ///
    /// Invalid tasks are removed from the registry; the rest move to READY
    /// or WAIT. Calling it with an empty Init queue does nothing.
    pub fn tidy(&mut self) -> Result<TidyReport> {
        let span = self.span.clone();
        let _enter = span.enter();

        Validator::new(&mut self.tasks, &self.slots, &mut self.queues).run()
    }

    /// Run admission control once and fire the selected tasks.
    ///
    /// Fired tasks move READY -> RUN and charge their slot; the returned list
    /// is what the executor must start.
    pub fn tick(&mut self) -> Result<Vec<ScheduledTask>> {
        let span = self.span.clone();
        let _enter = span.enter();

        if self.queues.len(TaskState::Ready) == 0 {
            return Ok(Vec::new());
        }

        let selected = {
            let ready: Vec<&Task> = self
                .queues
                .get(TaskState::Ready)
                .iter()
                .filter_map(|name| self.tasks.get(name))
                .collect();
            select_for_admission(&self.slots, &ready)
        };

        let mut fired = Vec::with_capacity(selected.len());
        for name in selected {
            fired.push(self.fire(&name)?);
        }
        Ok(fired)
    }

    fn fire(&mut self, name: &str) -> Result<ScheduledTask> {
        let task = self
            .tasks
            .get_mut(name)
            .ok_or_else(|| SchedulerError::UnknownTask(name.to_string()))?;

        self.queues
            .move_task(task, TaskState::Ready, TaskState::Run)?;
        task.fired_at = Some(Utc::now());

        let rank = match self.slots.get_mut(&task.slot) {
            Some(slot) => {
                slot.rank += task.capacity;
                slot.rank
            }
            None => 0,
        };

        debug!(
            task = %task.name,
            slot = %task.slot,
            capacity = task.capacity,
            rank,
            "task fired"
        );
        info!("Task {{{}}} fire.", task.name);

        Ok(ScheduledTask::from_task(task))
    }

    /// Apply the exit of a running task.
    ///
    /// - exit code 0: RUN -> DONE, dependents lose this edge and the ones with
    ///   nothing left to wait for move WAIT -> READY.
    /// - any other code: RUN -> FAIL, and every WAIT task transitively
    ///   blocked by it moves to CANCEL.
    ///
    /// Fails with [`SchedulerError::UnknownTask`] or
    /// [`SchedulerError::NotRunning`] without changing anything if the
    /// notification does not match a running task.
    pub fn on_exit(&mut self, name: &str, code: i32) -> Result<ExitReport> {
        let span = self.span.clone();
        let _enter = span.enter();

        let task = self
            .tasks
            .get_mut(name)
            .ok_or_else(|| SchedulerError::UnknownTask(name.to_string()))?;

        if task.state != TaskState::Run {
            return Err(SchedulerError::NotRunning {
                task: name.to_string(),
                state: task.state,
            });
        }

        if let Some(slot) = self.slots.get_mut(&task.slot) {
            slot.rank = match slot.rank.checked_sub(task.capacity) {
                Some(rank) => rank,
                None => {
                    warn!(
                        slot = %slot.name,
                        rank = slot.rank,
                        capacity = task.capacity,
                        "slot rank underflow on exit; clamping to 0"
                    );
                    0
                }
            };
        }

        task.exit_code = Some(code);
        task.exited_at = Some(Utc::now());
        debug!(task = %name, exit_code = code, slot = %task.slot, "task exit");

        let mut report = ExitReport {
            task: name.to_string(),
            code,
            newly_ready: Vec::new(),
            cancelled: Vec::new(),
        };

        if code == 0 {
            self.queues
                .move_task(task, TaskState::Run, TaskState::Done)?;
            info!("Task {{{}}} exit, successfully.", name);

            let mut manager = StateManager::new(&mut self.tasks, &mut self.queues);
            report.newly_ready = manager.release_dependents(name)?;
        } else {
            self.queues
                .move_task(task, TaskState::Run, TaskState::Fail)?;
            info!("Task {{{}}} exit, error code is {}.", name, code);

            let mut manager = StateManager::new(&mut self.tasks, &mut self.queues);
            let mut cancelled = manager.cancel_dependents(name)?;
            if !cancelled.is_empty() {
                cancelled.sort();
                info!(
                    task = %name,
                    cancelled = ?cancelled,
                    "Task {{{}}} cancels {}.",
                    name,
                    cancelled.join(",")
                );
            }
            report.cancelled = cancelled;
        }

        Ok(report)
    }

    /// Number of tasks still in WAIT, READY or RUN.
    pub fn pending(&self) -> usize {
        self.queues.pending()
    }

    /// `true` once WAIT, READY and RUN are all empty.
    pub fn is_drained(&self) -> bool {
        self.pending() == 0
    }

    pub fn task(&self, name: &str) -> Option<&Task> {
        self.tasks.get(name)
    }

    pub fn tasks(&self) -> impl Iterator<Item = &Task> {
        self.tasks.values()
    }

    pub fn contains_task(&self, name: &str) -> bool {
        self.tasks.contains_key(name)
    }

    pub fn state_of(&self, name: &str) -> Option<TaskState> {
        self.tasks.get(name).map(|t| t.state)
    }

    pub fn slot(&self, name: &str) -> Option<&Slot> {
        self.slots.get(name)
    }

    pub fn slots(&self) -> impl Iterator<Item = &Slot> {
        self.slots.values()
    }

    /// Task names queued under `state`, in insertion order.
    pub fn queue(&self, state: TaskState) -> &[TaskName] {
        self.queues.get(state)
    }

    pub fn summary(&self) -> RunSummary {
        RunSummary {
            init: self.queues.len(TaskState::Init),
            waiting: self.queues.len(TaskState::Wait),
            ready: self.queues.len(TaskState::Ready),
            running: self.queues.len(TaskState::Run),
            done: self.queues.len(TaskState::Done),
            failed: self.queues.len(TaskState::Fail),
            cancelled: self.queues.len(TaskState::Cancel),
        }
    }

    /// Check the structural invariants and describe every violation found.
    ///
    /// - each task sits in exactly one queue, the one matching its state
    /// - `depends` / `blocks` are symmetric
    /// - READY tasks have no pending dependency, WAIT tasks have at least one
    /// - each slot's rank equals the capacity held by its RUN tasks and stays
    ///   within `0..=capacity`
    pub fn check_invariants(&self) -> Vec<String> {
        let mut violations = Vec::new();

        let queued: usize = TaskState::QUEUED.iter().map(|s| self.queues.len(*s)).sum();
        if queued != self.tasks.len() {
            violations.push(format!(
                "{} queued entries for {} registered tasks",
                queued,
                self.tasks.len()
            ));
        }

        for state in TaskState::QUEUED {
            for name in self.queues.get(state) {
                match self.tasks.get(name) {
                    Some(task) if task.state == state => {}
                    Some(task) => violations.push(format!(
                        "task '{name}' is in the {state} queue but has state {}",
                        task.state
                    )),
                    None => violations.push(format!("queued task '{name}' is not registered")),
                }
            }
        }

        for task in self.tasks.values() {
            for pred in &task.depends {
                let symmetric = self
                    .tasks
                    .get(pred)
                    .is_some_and(|p| p.blocks.iter().any(|b| *b == task.name));
                if !symmetric {
                    violations.push(format!(
                        "task '{}' depends on '{}' without a matching blocks entry",
                        task.name, pred
                    ));
                }
            }

            match task.state {
                TaskState::Ready if !task.depends.is_empty() => violations.push(format!(
                    "ready task '{}' still depends on {:?}",
                    task.name, task.depends
                )),
                TaskState::Wait if task.depends.is_empty() => violations.push(format!(
                    "waiting task '{}' has no pending dependency",
                    task.name
                )),
                _ => {}
            }
        }

        for slot in self.slots.values() {
            let held: u32 = self
                .queues
                .get(TaskState::Run)
                .iter()
                .filter_map(|name| self.tasks.get(name))
                .filter(|task| task.slot == slot.name)
                .map(|task| task.capacity)
                .sum();

            if slot.rank != held {
                violations.push(format!(
                    "slot '{}' rank {} but running tasks hold {}",
                    slot.name, slot.rank, held
                ));
            }
            if slot.rank > slot.capacity {
                violations.push(format!(
                    "slot '{}' rank {} exceeds capacity {}",
                    slot.name, slot.rank, slot.capacity
                ));
            }
        }

        violations
    }
}
