// src/config/model.rs

use std::time::Duration;

use serde::Deserialize;

use crate::dag::task::{DEFAULT_CAPACITY, DEFAULT_PRIORITY, TaskSpec};
use crate::errors::{Result, SchedulerError};

/// Top-level configuration as read from a TOML file.
///
/// ```toml
/// [config]
/// id = "nightly"
/// tick_interval_ms = 500
///
/// [default]
/// slot = "cpu"
///
/// [[slot]]
/// name = "cpu"
/// capacity = 4
///
/// [[task]]
/// name = "build"
/// priority = 10
/// capacity = 2
/// cmd = "make"
/// from = ["fetch"]
/// ```
///
/// Slots and tasks are arrays of tables so their registration order is the
/// file order; READY-queue order (and therefore tie-breaking) follows it.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigFile {
    /// Global behaviour config from `[config]`.
    #[serde(default)]
    pub config: ConfigSection,

    /// Fallbacks for task fields from `[default]`.
    #[serde(default)]
    pub default: DefaultSection,

    /// All `[[slot]]` entries.
    #[serde(default)]
    pub slot: Vec<SlotConfig>,

    /// All `[[task]]` entries.
    #[serde(default)]
    pub task: Vec<TaskConfig>,
}

/// `[config]` section.
#[derive(Debug, Clone, Deserialize)]
pub struct ConfigSection {
    /// Run identifier, attached to every scheduler log event.
    #[serde(default = "default_id")]
    pub id: String,

    /// Delay between two scheduler ticks, in milliseconds.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

fn default_id() -> String {
    "main".to_string()
}

fn default_tick_interval_ms() -> u64 {
    500
}

impl ConfigSection {
    pub fn tick_interval(&self) -> Duration {
        Duration::from_millis(self.tick_interval_ms)
    }
}

impl Default for ConfigSection {
    fn default() -> Self {
        Self {
            id: default_id(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

/// `[default]` section.
///
/// Each field is used only when a task leaves the matching field unset.
/// Unset here too, `priority` falls back to 0 and `capacity` to 1; `slot`
/// has no fallback and must then be given per task.
#[derive(Debug, Clone, Deserialize, Default)]
pub struct DefaultSection {
    #[serde(default)]
    pub slot: Option<String>,

    #[serde(default)]
    pub priority: Option<i64>,

    #[serde(default)]
    pub capacity: Option<u32>,
}

/// `[[slot]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct SlotConfig {
    pub name: String,

    /// Total capacity units the slot can host at once.
    pub capacity: u32,
}

/// `[[task]]` entry.
#[derive(Debug, Clone, Deserialize)]
pub struct TaskConfig {
    pub name: String,

    /// Slot to run in; falls back to `default.slot`.
    #[serde(default)]
    pub slot: Option<String>,

    /// Sort key for admission; higher runs first.
    #[serde(default)]
    pub priority: Option<i64>,

    /// Capacity units held in the slot while running.
    #[serde(default)]
    pub capacity: Option<u32>,

    /// Shell command to execute. Tasks without one succeed immediately.
    #[serde(default)]
    pub cmd: Option<String>,

    /// Tasks that must wait for this one.
    #[serde(default)]
    pub to: Vec<String>,

    /// Tasks this one waits for.
    #[serde(default)]
    pub from: Vec<String>,
}

impl TaskConfig {
    /// Effective slot name given `[default]`.
    pub fn effective_slot<'a>(&'a self, defaults: &'a DefaultSection) -> Option<&'a str> {
        self.slot.as_deref().or(defaults.slot.as_deref())
    }

    /// Apply `[default]` and produce the registration input for the scheduler.
    pub fn resolve(&self, defaults: &DefaultSection) -> Result<TaskSpec> {
        let slot = self.effective_slot(defaults).ok_or_else(|| {
            SchedulerError::ConfigError(format!(
                "task '{}' has no slot and [default].slot is not set",
                self.name
            ))
        })?;

        Ok(TaskSpec {
            name: self.name.clone(),
            slot: slot.to_string(),
            priority: self
                .priority
                .or(defaults.priority)
                .unwrap_or(DEFAULT_PRIORITY),
            capacity: self
                .capacity
                .or(defaults.capacity)
                .unwrap_or(DEFAULT_CAPACITY),
            cmd: self.cmd.clone(),
            to: self.to.clone(),
            from: self.from.clone(),
        })
    }
}
