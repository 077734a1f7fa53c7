// src/main.rs

use slotdag::{cli, logging, run};

#[tokio::main]
async fn main() {
    match run_main().await {
        Ok(true) => {}
        Ok(false) => std::process::exit(1),
        Err(err) => {
            eprintln!("slotdag error: {err:?}");
            std::process::exit(1);
        }
    }
}

/// Returns whether the run succeeded (every task done).
async fn run_main() -> anyhow::Result<bool> {
    let args = cli::parse();
    logging::init_logging(args.log_level)?;

    let dry_run = args.dry_run;
    let summary = run(args).await?;
    if dry_run {
        return Ok(true);
    }

    println!("slotdag: {summary}");
    Ok(summary.is_success())
}
