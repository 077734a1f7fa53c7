#![allow(dead_code)]

pub use slotdag_test_utils::builders;
pub use slotdag_test_utils::fake_executor;
pub use slotdag_test_utils::{init_tracing, with_timeout};

use slotdag::dag::Scheduler;
use slotdag::types::TaskState;

/// Fire everything admissible this tick and return the names, in firing order.
pub fn tick_names(scheduler: &mut Scheduler) -> Vec<String> {
    scheduler
        .tick()
        .expect("tick failed")
        .into_iter()
        .map(|t| t.name)
        .collect()
}

pub fn assert_state(scheduler: &Scheduler, task: &str, expected: TaskState) {
    assert_eq!(
        scheduler.state_of(task),
        Some(expected),
        "unexpected state for task '{task}'"
    );
}

pub fn assert_invariants(scheduler: &Scheduler) {
    let violations = scheduler.check_invariants();
    assert!(violations.is_empty(), "invariant violations: {violations:#?}");
}
