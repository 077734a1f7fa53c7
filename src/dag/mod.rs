// src/dag/mod.rs

//! Task graph and scheduling.
//!
//! - [`task`] holds the task and slot entities.
//! - [`queues`] keeps one insertion-ordered queue per task state.
//! - [`tidy`] builds and validates the dependency graph.
//! - [`admission`] decides which ready tasks fit their slot.
//! - [`state_manager`] applies exits to dependent tasks.
//! - [`scheduler`] owns all of the above and exposes the public operations.
//! - [`scheduler_step`] defines the reports returned by those operations.

pub mod admission;
pub mod queues;
pub mod scheduler;
pub mod scheduler_step;
pub mod state_manager;
pub mod task;
pub mod tidy;

pub use admission::select_for_admission;
pub use queues::TaskQueues;
pub use scheduler::Scheduler;
pub use scheduler_step::{ExitReport, RunSummary, TidyReport};
pub use task::{ScheduledTask, Slot, Task, TaskSpec};
