use std::collections::HashMap;
use std::future::Future;
use std::pin::Pin;
use std::sync::{Arc, Mutex};

use slotdag::dag::ScheduledTask;
use slotdag::engine::RuntimeEvent;
use slotdag::errors::Result;
use slotdag::exec::ExecutorBackend;
use tokio::sync::mpsc;
use tracing::warn;

/// A fake executor that:
/// - records which tasks were "run", in dispatch order
/// - reports `TaskExited` for each of them, with the exit code configured
///   for that task (0 by default).
///
/// Exits are sent from a spawned task; the runtime drains its event channel
/// only after `execute` returns.
pub struct FakeExecutor {
    runtime_tx: mpsc::Sender<RuntimeEvent>,
    executed: Arc<Mutex<Vec<String>>>,
    exit_codes: HashMap<String, i32>,
}

impl FakeExecutor {
    pub fn new(
        runtime_tx: mpsc::Sender<RuntimeEvent>,
        executed: Arc<Mutex<Vec<String>>>,
    ) -> Self {
        Self {
            runtime_tx,
            executed,
            exit_codes: HashMap::new(),
        }
    }

    /// Make `task` exit with `code` instead of 0.
    pub fn with_exit_code(mut self, task: &str, code: i32) -> Self {
        self.exit_codes.insert(task.to_string(), code);
        self
    }
}

impl ExecutorBackend for FakeExecutor {
    fn execute(
        &mut self,
        tasks: Vec<ScheduledTask>,
    ) -> Pin<Box<dyn Future<Output = Result<()>> + Send + '_>> {
        let exits: Vec<(String, i32)> = tasks
            .into_iter()
            .map(|t| {
                let code = self.exit_codes.get(&t.name).copied().unwrap_or(0);
                (t.name, code)
            })
            .collect();

        self.executed
            .lock()
            .unwrap()
            .extend(exits.iter().map(|(name, _)| name.clone()));

        let tx = self.runtime_tx.clone();
        Box::pin(async move {
            tokio::spawn(async move {
                for (task, code) in exits {
                    if tx.send(RuntimeEvent::TaskExited { task, code }).await.is_err() {
                        warn!("runtime gone; fake exit notification dropped");
                        return;
                    }
                }
            });
            Ok(())
        })
    }
}
