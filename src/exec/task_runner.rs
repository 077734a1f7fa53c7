// src/exec/task_runner.rs

//! Runs one fired task as a child process and reports its exit code.

use std::process::Stdio;

use anyhow::{Context, Result};
use tokio::io::{AsyncBufReadExt, BufReader};
use tokio::process::Command;
use tokio::sync::mpsc;
use tracing::{debug, error, info};

use crate::dag::ScheduledTask;
use crate::engine::RuntimeEvent;

/// Exit code reported when the process could not be started or awaited, or
/// was terminated by a signal.
pub const SPAWN_FAILURE_CODE: i32 = -1;

/// Run a single task and send exactly one `TaskExited` event for it.
///
/// - A task without `cmd` exits 0 immediately.
/// - Spawn or wait errors are reported as [`SPAWN_FAILURE_CODE`].
pub async fn run_task(task: ScheduledTask, runtime_tx: mpsc::Sender<RuntimeEvent>) {
    let code = match run_task_inner(&task).await {
        Ok(code) => code,
        Err(err) => {
            error!(task = %task.name, error = %err, "task execution error");
            SPAWN_FAILURE_CODE
        }
    };

    if runtime_tx
        .send(RuntimeEvent::TaskExited {
            task: task.name.clone(),
            code,
        })
        .await
        .is_err()
    {
        error!(task = %task.name, exit_code = code, "runtime gone; exit notification lost");
    }
}

async fn run_task_inner(task: &ScheduledTask) -> Result<i32> {
    let Some(ref command) = task.cmd else {
        debug!(task = %task.name, "task has no command; reporting success");
        return Ok(0);
    };

    info!(task = %task.name, slot = %task.slot, cmd = %command, "starting task process");

    let mut cmd = if cfg!(windows) {
        let mut c = Command::new("cmd");
        c.arg("/C").arg(command);
        c
    } else {
        let mut c = Command::new("sh");
        c.arg("-c").arg(command);
        c
    };

    cmd.env("SLOTDAG_TASK", &task.name)
        .env("SLOTDAG_SLOT", &task.slot)
        .stdin(Stdio::null())
        .stdout(Stdio::piped())
        .stderr(Stdio::piped())
        .kill_on_drop(true);

    let mut child = cmd
        .spawn()
        .with_context(|| format!("spawning process for task '{}'", task.name))?;

    if let Some(stdout) = child.stdout.take() {
        let task_name = task.name.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stdout).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                info!(task = %task_name, "stdout: {}", line);
            }
        });
    }

    // Drained even at quiet log levels so a chatty child cannot block on a full pipe.
    if let Some(stderr) = child.stderr.take() {
        let task_name = task.name.clone();
        tokio::spawn(async move {
            let mut lines = BufReader::new(stderr).lines();
            while let Ok(Some(line)) = lines.next_line().await {
                debug!(task = %task_name, "stderr: {}", line);
            }
        });
    }

    let status = child
        .wait()
        .await
        .with_context(|| format!("waiting for process of task '{}'", task.name))?;

    let code = status.code().unwrap_or(SPAWN_FAILURE_CODE);
    info!(
        task = %task.name,
        exit_code = code,
        success = status.success(),
        "task process exited"
    );

    Ok(code)
}
