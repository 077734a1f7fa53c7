use std::fmt;

/// Canonical task name type used throughout the crate.
pub type TaskName = String;

/// Lifecycle state of a task.
///
/// ```text
/// INIT -> WAIT -> READY -> RUN -> DONE
///   |       |                 \-> FAIL
///   |       \-> CANCEL
///   \-> READY
///   \-> INVALID
/// ```
///
/// `Done`, `Fail`, `Cancel` and `Invalid` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum TaskState {
    Init,
    Wait,
    Ready,
    Run,
    Done,
    Fail,
    Cancel,
    Invalid,
}

impl TaskState {
    /// States that own a queue in the scheduler. `Invalid` tasks are never
    /// queued; tidy removes them from the registry.
    pub const QUEUED: [TaskState; 7] = [
        TaskState::Init,
        TaskState::Wait,
        TaskState::Ready,
        TaskState::Run,
        TaskState::Done,
        TaskState::Fail,
        TaskState::Cancel,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            TaskState::Init => "init",
            TaskState::Wait => "wait",
            TaskState::Ready => "ready",
            TaskState::Run => "run",
            TaskState::Done => "done",
            TaskState::Fail => "fail",
            TaskState::Cancel => "cancel",
            TaskState::Invalid => "invalid",
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(
            self,
            TaskState::Done | TaskState::Fail | TaskState::Cancel | TaskState::Invalid
        )
    }

    /// Whether the state machine allows moving from `self` to `to`.
    pub fn can_transition_to(&self, to: TaskState) -> bool {
        use TaskState::*;
        matches!(
            (self, to),
            (Init, Wait)
                | (Init, Ready)
                | (Init, Invalid)
                | (Wait, Ready)
                | (Wait, Cancel)
                | (Ready, Run)
                | (Run, Done)
                | (Run, Fail)
        )
    }
}

impl fmt::Display for TaskState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Why tidy rejected a task.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InvalidReason {
    /// The configured slot is not registered.
    UnknownSlot(String),
    /// The task asks for no capacity at all.
    ZeroCapacity,
    /// The task asks for more capacity than its slot can ever provide.
    CapacityExceedsSlot { requested: u32, available: u32 },
    /// A `from` entry names a task that does not exist.
    UnknownDependency(String),
    /// A `from` entry names a task that already failed or was cancelled.
    FailedDependency(String),
    /// The task is part of a dependency cycle.
    DependencyCycle,
    /// A predecessor was itself invalid.
    InvalidDependency(String),
}

impl fmt::Display for InvalidReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InvalidReason::UnknownSlot(slot) => write!(f, "slot name is not found: {slot}"),
            InvalidReason::ZeroCapacity => f.write_str("task capacity must be >= 1"),
            InvalidReason::CapacityExceedsSlot {
                requested,
                available,
            } => write!(
                f,
                "requested capacity {requested} exceeds slot capacity {available}"
            ),
            InvalidReason::UnknownDependency(dep) => write!(f, "unknown dependency: {dep}"),
            InvalidReason::FailedDependency(dep) => {
                write!(f, "dependency already failed or cancelled: {dep}")
            }
            InvalidReason::DependencyCycle => f.write_str("dependency cycle"),
            InvalidReason::InvalidDependency(dep) => write!(f, "dependency is invalid: {dep}"),
        }
    }
}
