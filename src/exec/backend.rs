// src/exec/backend.rs

//! The seam between the run loop and whatever starts task workloads.
//!
//! Contract: every task handed to [`ExecutorBackend::execute`] produces
//! exactly one `RuntimeEvent::TaskExited` on the runtime channel, sooner or
//! later. `execute` itself only has to *start* the work.

use std::future::Future;
use std::pin::Pin;

use tokio::sync::mpsc;

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::errors::{Result, SchedulerError};

use super::executor_loop::spawn_executor;

/// Starts fired tasks.
///
/// [`RealExecutorBackend`] runs shell commands; tests substitute backends
/// that report exits directly.
pub trait ExecutorBackend: Send {
    fn execute(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>>;
}

/// Process-spawning backend.
///
/// Hands fired tasks to the loop started by [`spawn_executor`], which runs
/// each one on its own Tokio task.
pub struct RealExecutorBackend {
    tx: mpsc::Sender<ScheduledTask>,
}

impl RealExecutorBackend {
    /// Start the executor loop; exits are reported on `runtime_tx`.
    pub fn new(runtime_tx: mpsc::Sender<RuntimeEvent>) -> Self {
        Self {
            tx: spawn_executor(runtime_tx),
        }
    }
}

impl ExecutorBackend for RealExecutorBackend {
    fn execute(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let tx = self.tx.clone();

        Box::pin(async move {
            for task in tasks {
                if tx.send(task).await.is_err() {
                    return Err(SchedulerError::ExecutorClosed);
                }
            }
            Ok(())
        })
    }
}
