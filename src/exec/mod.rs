// src/exec/mod.rs

//! Process execution layer.
//!
//! This module is responsible for actually running the commands of fired
//! tasks, using `tokio::process::Command`, and reporting each exit back to
//! the runtime as a [`RuntimeEvent::TaskExited`](crate::engine::RuntimeEvent).
//!
//! - [`executor_loop`] owns the background loop that spawns task runners and
//!   keeps their join handles while they run.
//! - [`task_runner`] handles individual task process execution.
//! - [`backend`] provides the `ExecutorBackend` trait and a concrete
//!   `RealExecutorBackend` that the runtime uses in production, and which
//!   tests can replace with a fake implementation.

pub mod backend;
pub mod executor_loop;
pub mod task_runner;

pub use backend::{ExecutorBackend, RealExecutorBackend};
pub use executor_loop::spawn_executor;
