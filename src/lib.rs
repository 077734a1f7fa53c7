// src/lib.rs

pub mod cli;
pub mod config;
pub mod dag;
pub mod engine;
pub mod errors;
pub mod exec;
pub mod logging;
pub mod types;

use anyhow::Result;
use tokio::sync::mpsc;
use tracing::{debug, info};

use crate::cli::CliArgs;
use crate::config::loader::load_and_validate;
use crate::dag::{RunSummary, Scheduler, TidyReport};
use crate::engine::{Runtime, RuntimeEvent, RuntimeOptions};
use crate::exec::RealExecutorBackend;

/// High-level entry point used by `main.rs`.
///
/// This wires together:
/// - config loading
/// - slot / task registration and tidy
/// - executor
/// - runtime tick loop
/// - Ctrl-C handling
///
/// Returns the per-state counts at the end of the run.
pub async fn run(args: CliArgs) -> Result<RunSummary> {
    let mut cfg = load_and_validate(&args.config)?;

    if let Some(tick_ms) = args.tick_ms {
        cfg.config.tick_interval_ms = tick_ms.max(1);
    }

    let mut scheduler = Scheduler::from_config(&cfg)?;
    let report = scheduler.tidy()?;

    if args.dry_run {
        print_dry_run(&scheduler, &report);
        return Ok(scheduler.summary());
    }

    // Runtime event channel.
    let (rt_tx, rt_rx) = mpsc::channel::<RuntimeEvent>(64);

    let executor = RealExecutorBackend::new(rt_tx.clone());

    // Ctrl-C → graceful shutdown.
    {
        let tx = rt_tx.clone();
        tokio::spawn(async move {
            if let Err(e) = tokio::signal::ctrl_c().await {
                eprintln!("failed to listen for Ctrl+C: {e}");
                return;
            }
            let _ = tx.send(RuntimeEvent::ShutdownRequested).await;
        });
    }

    info!(
        ready = report.ready.len(),
        waiting = report.waiting.len(),
        dropped = report.dropped.len(),
        "task graph ready"
    );

    let options = RuntimeOptions {
        tick_interval: cfg.config.tick_interval(),
    };

    let runtime = Runtime::new(scheduler, options, rt_rx, executor);
    let scheduler = runtime.run().await?;

    Ok(scheduler.summary())
}

/// Dry-run output: slots, validated tasks and dropped tasks.
fn print_dry_run(scheduler: &Scheduler, report: &TidyReport) {
    println!("slotdag dry-run ({})", scheduler.id());
    println!();

    println!("slots:");
    for slot in scheduler.slots() {
        println!("  - {} (capacity {})", slot.name, slot.capacity);
    }
    println!();

    println!("tasks ({}):", report.admitted());
    for name in report.ready.iter().chain(report.waiting.iter()) {
        let Some(task) = scheduler.task(name) else {
            continue;
        };
        println!("  - {} [{}]", task.name, task.state);
        println!(
            "      slot: {}  priority: {}  capacity: {}",
            task.slot, task.priority, task.capacity
        );
        if let Some(ref cmd) = task.cmd {
            println!("      cmd: {cmd}");
        }
        if !task.depends.is_empty() {
            println!("      depends: {:?}", task.depends);
        }
        if !task.blocks.is_empty() {
            println!("      blocks: {:?}", task.blocks);
        }
    }

    if !report.dropped.is_empty() {
        println!();
        println!("dropped ({}):", report.dropped.len());
        for (name, reason) in &report.dropped {
            println!("  - {name}: {reason}");
        }
    }

    debug!("dry-run complete (no execution)");
}
