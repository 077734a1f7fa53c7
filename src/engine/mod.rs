// src/engine/mod.rs

//! Orchestration engine for slotdag.
//!
//! This module ties together:
//! - the scheduler (admission, completion handling)
//! - the periodic tick that admits READY tasks
//! - the runtime event loop that reacts to:
//!   - task exit notifications from the executor
//!   - shutdown signals
//!
//! The pure core state machine lives in [`core`]; the async/IO shell is
//! implemented in [`runtime`].

use std::time::Duration;

use crate::types::TaskName;

/// Runtime options used by the async shell.
#[derive(Debug, Clone, Copy)]
pub struct RuntimeOptions {
    /// Delay between two ticks while tasks are still pending.
    pub tick_interval: Duration,
}

impl Default for RuntimeOptions {
    fn default() -> Self {
        Self {
            tick_interval: Duration::from_millis(500),
        }
    }
}

/// Events flowing into the runtime from the executor and signal handler.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RuntimeEvent {
    /// A fired task's workload exited with `code` (0 = success).
    TaskExited { task: TaskName, code: i32 },
    /// Graceful shutdown requested (e.g. Ctrl-C).
    ShutdownRequested,
}

pub mod core;
pub mod runtime;

pub use core::{CoreCommand, CoreRuntime, CoreStep};
pub use runtime::Runtime;
