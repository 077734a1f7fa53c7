// src/engine/runtime.rs

use std::fmt;

use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::dag::{ScheduledTask, Scheduler};
use crate::errors::{Result, SchedulerError};
use crate::exec::ExecutorBackend;

use super::core::CoreRuntime;
use super::{CoreCommand, RuntimeEvent, RuntimeOptions};

/// Drives the scheduler on a fixed tick and delegates execution to an
/// `ExecutorBackend`.
///
/// This is a pure IO shell around `CoreRuntime`. The runtime owns the
/// scheduler, so ticks and exit notifications are applied one at a time on
/// a single task; executors report exits through `event_rx`.
pub struct Runtime<E: ExecutorBackend> {
    core: CoreRuntime,
    options: RuntimeOptions,
    event_rx: mpsc::Receiver<RuntimeEvent>,
    executor: E,
}

impl<E: ExecutorBackend> fmt::Debug for Runtime<E> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Runtime")
            .field("core", &self.core)
            .field("options", &self.options)
            .finish_non_exhaustive()
    }
}

impl<E: ExecutorBackend> Runtime<E> {
    pub fn new(
        scheduler: Scheduler,
        options: RuntimeOptions,
        event_rx: mpsc::Receiver<RuntimeEvent>,
        executor: E,
    ) -> Self {
        Self {
            core: CoreRuntime::new(scheduler),
            options,
            event_rx,
            executor,
        }
    }

    /// Main loop.
    ///
    /// - Tick: admit and dispatch READY tasks.
    /// - If WAIT, READY or RUN is non-empty, wait `tick_interval` while
    ///   applying exit events as they arrive, then tick again.
    /// - Otherwise the run is over.
    ///
    /// Returns the scheduler so callers can inspect final task states.
    pub async fn run(mut self) -> Result<Scheduler> {
        info!(id = %self.core.scheduler().id(), "slotdag runtime started");

        'ticks: loop {
            let step = self.core.tick()?;
            self.execute_commands(step.commands).await?;

            if !step.keep_running {
                break;
            }

            let sleep = tokio::time::sleep(self.options.tick_interval);
            tokio::pin!(sleep);

            loop {
                tokio::select! {
                    _ = &mut sleep => break,
                    event = self.event_rx.recv() => {
                        let Some(event) = event else {
                            return Err(SchedulerError::EventChannelClosed(
                                self.core.scheduler().pending(),
                            ));
                        };

                        debug!(?event, "runtime received event");
                        let step = self.core.step(event)?;
                        self.execute_commands(step.commands).await?;

                        if !step.keep_running {
                            break 'ticks;
                        }
                    }
                }
            }
        }

        info!(summary = %self.core.summary(), "runtime exiting");
        Ok(self.core.into_scheduler())
    }

    async fn execute_commands(&mut self, commands: Vec<CoreCommand>) -> Result<()> {
        for command in commands {
            match command {
                CoreCommand::DispatchTasks(tasks) => self.dispatch(tasks).await?,
            }
        }
        Ok(())
    }

    async fn dispatch(&mut self, tasks: Vec<ScheduledTask>) -> Result<()> {
        if tasks.is_empty() {
            return Ok(());
        }

        let names: Vec<_> = tasks.iter().map(|t| t.name.as_str()).collect();
        debug!(?names, "dispatching fired tasks");

        self.executor.execute(tasks).await
    }
}
