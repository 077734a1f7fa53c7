// src/config/validate.rs

use crate::config::model::ConfigFile;
use crate::errors::{Result, SchedulerError};

/// Run basic structural validation against a loaded configuration.
///
/// This checks:
/// - there is at least one slot and one task
/// - `[config]` values are usable (`id` non-empty, `tick_interval_ms >= 1`)
/// - slot names are non-empty and capacities are `>= 1`
/// - task names are non-empty, each task resolves a slot name and a
///   capacity `>= 1`
///
/// It does **not** check that slot or dependency references resolve, nor
/// look for cycles: the scheduler's tidy pass drops such tasks and logs why.
pub fn validate_config(cfg: &ConfigFile) -> Result<()> {
    ensure_not_empty(cfg)?;
    validate_global_config(cfg)?;
    validate_slots(cfg)?;
    validate_tasks(cfg)?;
    Ok(())
}

fn ensure_not_empty(cfg: &ConfigFile) -> Result<()> {
    if cfg.slot.is_empty() {
        return Err(SchedulerError::ConfigError(
            "config must contain at least one [[slot]] entry".to_string(),
        ));
    }
    if cfg.task.is_empty() {
        return Err(SchedulerError::ConfigError(
            "config must contain at least one [[task]] entry".to_string(),
        ));
    }
    Ok(())
}

fn validate_global_config(cfg: &ConfigFile) -> Result<()> {
    if cfg.config.id.trim().is_empty() {
        return Err(SchedulerError::ConfigError(
            "[config].id must not be empty".to_string(),
        ));
    }

    if cfg.config.tick_interval_ms == 0 {
        return Err(SchedulerError::ConfigError(
            "[config].tick_interval_ms must be >= 1 (got 0)".to_string(),
        ));
    }

    Ok(())
}

fn validate_slots(cfg: &ConfigFile) -> Result<()> {
    for slot in cfg.slot.iter() {
        if slot.name.trim().is_empty() {
            return Err(SchedulerError::ConfigError(
                "slot name must not be empty".to_string(),
            ));
        }
        if slot.capacity == 0 {
            return Err(SchedulerError::ConfigError(format!(
                "slot '{}' must have capacity >= 1 (got 0)",
                slot.name
            )));
        }
    }
    Ok(())
}

fn validate_tasks(cfg: &ConfigFile) -> Result<()> {
    for task in cfg.task.iter() {
        if task.name.trim().is_empty() {
            return Err(SchedulerError::ConfigError(
                "task name must not be empty".to_string(),
            ));
        }
        if task.capacity.or(cfg.default.capacity) == Some(0) {
            return Err(SchedulerError::ConfigError(format!(
                "task '{}' must have capacity >= 1 (got 0)",
                task.name
            )));
        }
        if task.effective_slot(&cfg.default).is_none() {
            return Err(SchedulerError::ConfigError(format!(
                "task '{}' has no slot and [default].slot is not set",
                task.name
            )));
        }
    }
    Ok(())
}
