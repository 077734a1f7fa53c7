// src/errors.rs

//! Crate-wide error type and result alias.

use thiserror::Error;

use crate::types::TaskState;

#[derive(Error, Debug)]
pub enum SchedulerError {
    #[error("duplicated task name: {0}")]
    DuplicateTask(String),

    #[error("duplicated slot name: {0}")]
    DuplicateSlot(String),

    #[error("slot '{0}' must have capacity >= 1")]
    EmptySlot(String),

    #[error("Task not found: {0}")]
    UnknownTask(String),

    #[error("task '{task}' is not running (state: {state})")]
    NotRunning { task: String, state: TaskState },

    #[error("invalid transition for task '{task}': {from} -> {to}")]
    InvalidTransition {
        task: String,
        from: TaskState,
        to: TaskState,
    },

    #[error("Configuration error: {0}")]
    ConfigError(String),

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("executor channel closed")]
    ExecutorClosed,

    #[error("runtime event channel closed with {0} task(s) still pending")]
    EventChannelClosed(usize),

    #[error(transparent)]
    Other(#[from] anyhow::Error),
}

pub type Result<T> = std::result::Result<T, SchedulerError>;
