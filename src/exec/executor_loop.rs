// src/exec/executor_loop.rs

//! Background loop that starts fired tasks and tracks their join handles.

use std::collections::HashMap;

use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;
use crate::exec::task_runner::run_task;
use crate::types::TaskName;

/// Start the executor loop and return the sender `RealExecutorBackend` feeds.
///
/// Each task runs on its own Tokio task. Its `JoinHandle` is kept here only
/// while it runs; the scheduler never sees process handles.
pub fn spawn_executor(runtime_tx: mpsc::Sender<RuntimeEvent>) -> mpsc::Sender<ScheduledTask> {
    let (tx, mut rx) = mpsc::channel::<ScheduledTask>(32);

    tokio::spawn(async move {
        info!("executor loop started");

        let mut active: HashMap<TaskName, JoinHandle<()>> = HashMap::new();

        while let Some(task) = rx.recv().await {
            handle_fired_task(task, &mut active, &runtime_tx);
        }

        info!(
            still_running = active.values().filter(|h| !h.is_finished()).count(),
            "executor loop finished (channel closed)"
        );
    });

    tx
}

/// Start a fired task and remember its handle.
fn handle_fired_task(
    task: ScheduledTask,
    active: &mut HashMap<TaskName, JoinHandle<()>>,
    runtime_tx: &mpsc::Sender<RuntimeEvent>,
) {
    active.retain(|name, handle| {
        let finished = handle.is_finished();
        if finished {
            debug!(task = %name, "releasing handle of exited task");
        }
        !finished
    });

    if active.contains_key(&task.name) {
        // The scheduler fires a task once; a second request means a caller
        // bypassed it. Running both would report two exits.
        warn!(task = %task.name, "task already running; ignoring duplicate request");
        return;
    }

    let name = task.name.clone();
    let rt_tx = runtime_tx.clone();
    let handle = tokio::spawn(async move {
        run_task(task, rt_tx).await;
    });

    active.insert(name, handle);
}
