mod common;
use crate::common::builders::{TaskSpecBuilder, scheduler_with, tidied_scheduler};
use crate::common::{assert_invariants, assert_state, init_tracing, tick_names};

use slotdag::types::{InvalidReason, TaskState};

fn reason_of<'a>(report: &'a slotdag::dag::TidyReport, name: &str) -> Option<&'a InvalidReason> {
    report
        .dropped
        .iter()
        .find(|(n, _)| n == name)
        .map(|(_, reason)| reason)
}

#[test]
fn linear_chain_splits_into_ready_and_wait() {
    init_tracing();

    let mut scheduler = scheduler_with(
        &[("cpu", 1)],
        vec![
            TaskSpecBuilder::new("A").build(),
            TaskSpecBuilder::new("B").from("A").build(),
        ],
    );
    let report = scheduler.tidy().expect("tidy");

    assert_eq!(report.ready, ["A"]);
    assert_eq!(report.waiting, ["B"]);
    assert!(report.dropped.is_empty());

    assert_state(&scheduler, "A", TaskState::Ready);
    assert_state(&scheduler, "B", TaskState::Wait);
    assert_eq!(scheduler.task("B").unwrap().depends, ["A"]);
    assert_eq!(scheduler.task("A").unwrap().blocks, ["B"]);
    assert_invariants(&scheduler);
}

#[test]
fn unknown_slot_cascades_to_dependents() {
    init_tracing();

    let mut scheduler = scheduler_with(
        &[("cpu", 1)],
        vec![
            TaskSpecBuilder::new("X").slot("gpu").build(),
            TaskSpecBuilder::new("Y").from("X").build(),
            TaskSpecBuilder::new("Z").build(),
        ],
    );
    let report = scheduler.tidy().expect("tidy");

    assert!(!scheduler.contains_task("X"));
    assert!(!scheduler.contains_task("Y"));
    assert_state(&scheduler, "Z", TaskState::Ready);

    assert_eq!(
        reason_of(&report, "X"),
        Some(&InvalidReason::UnknownSlot("gpu".to_string()))
    );
    assert_eq!(
        reason_of(&report, "Y"),
        Some(&InvalidReason::InvalidDependency("X".to_string()))
    );
    assert_eq!(report.ready, ["Z"]);
    assert_invariants(&scheduler);
}

#[test]
fn unknown_predecessor_invalidates_task_and_its_dependents() {
    init_tracing();

    let mut scheduler = scheduler_with(
        &[("cpu", 1)],
        vec![
            TaskSpecBuilder::new("B").from("ghost").build(),
            TaskSpecBuilder::new("C").from("B").build(),
        ],
    );
    let report = scheduler.tidy().expect("tidy");

    assert_eq!(
        reason_of(&report, "B"),
        Some(&InvalidReason::UnknownDependency("ghost".to_string()))
    );
    assert_eq!(
        reason_of(&report, "C"),
        Some(&InvalidReason::InvalidDependency("B".to_string()))
    );
    assert_eq!(report.admitted(), 0);
    assert_eq!(scheduler.summary().init, 0);
}

#[test]
fn to_edges_make_the_target_wait() {
    let scheduler = tidied_scheduler(
        &[("cpu", 1)],
        vec![
            TaskSpecBuilder::new("A").to("B").build(),
            TaskSpecBuilder::new("B").build(),
        ],
    );

    assert_state(&scheduler, "A", TaskState::Ready);
    assert_state(&scheduler, "B", TaskState::Wait);
    assert_eq!(scheduler.task("B").unwrap().depends, ["A"]);
    assert_eq!(scheduler.task("A").unwrap().blocks, ["B"]);
    assert_invariants(&scheduler);
}

#[test]
fn to_and_from_for_the_same_edge_link_once() {
    let scheduler = tidied_scheduler(
        &[("cpu", 1)],
        vec![
            TaskSpecBuilder::new("A").to("B").build(),
            TaskSpecBuilder::new("B").from("A").build(),
        ],
    );

    assert_eq!(scheduler.task("B").unwrap().depends, ["A"]);
    assert_eq!(scheduler.task("A").unwrap().blocks, ["B"]);
}

#[test]
fn unknown_to_target_is_skipped() {
    let mut scheduler = scheduler_with(
        &[("cpu", 1)],
        vec![TaskSpecBuilder::new("A").to("nowhere").build()],
    );
    let report = scheduler.tidy().expect("tidy");

    assert!(report.dropped.is_empty());
    assert_state(&scheduler, "A", TaskState::Ready);
    assert!(scheduler.task("A").unwrap().blocks.is_empty());
}

#[test]
fn dropped_successors_are_pruned_from_blocks() {
    let mut scheduler = scheduler_with(
        &[("cpu", 1)],
        vec![
            TaskSpecBuilder::new("A").to("X").build(),
            TaskSpecBuilder::new("X").slot("gpu").build(),
            TaskSpecBuilder::new("B").from("A").from("ghost").build(),
        ],
    );
    let report = scheduler.tidy().expect("tidy");

    assert!(report.was_dropped("X"));
    assert!(report.was_dropped("B"));
    assert_state(&scheduler, "A", TaskState::Ready);
    assert!(scheduler.task("A").unwrap().blocks.is_empty());
    assert_invariants(&scheduler);

    // A's completion must not trip over the dropped tasks.
    assert_eq!(tick_names(&mut scheduler), ["A"]);
    let exit = scheduler.on_exit("A", 0).expect("exit");
    assert!(exit.newly_ready.is_empty());
    assert!(scheduler.is_drained());
}

#[test]
fn capacity_larger_than_slot_is_invalid() {
    let mut scheduler = scheduler_with(
        &[("cpu", 2)],
        vec![
            TaskSpecBuilder::new("huge").capacity(3).build(),
            TaskSpecBuilder::new("fits").capacity(2).build(),
        ],
    );
    let report = scheduler.tidy().expect("tidy");

    assert_eq!(
        reason_of(&report, "huge"),
        Some(&InvalidReason::CapacityExceedsSlot {
            requested: 3,
            available: 2
        })
    );
    assert_state(&scheduler, "fits", TaskState::Ready);
}

#[test]
fn self_dependency_is_a_cycle() {
    let mut scheduler = scheduler_with(
        &[("cpu", 1)],
        vec![TaskSpecBuilder::new("A").from("A").build()],
    );
    let report = scheduler.tidy().expect("tidy");

    assert_eq!(reason_of(&report, "A"), Some(&InvalidReason::DependencyCycle));
    assert!(!scheduler.contains_task("A"));
    assert!(scheduler.is_drained());
}

#[test]
fn mutual_dependency_drops_the_cycle_and_its_dependents() {
    init_tracing();

    let mut scheduler = scheduler_with(
        &[("cpu", 1)],
        vec![
            TaskSpecBuilder::new("A").from("B").build(),
            TaskSpecBuilder::new("B").from("A").build(),
            TaskSpecBuilder::new("C").from("A").build(),
            TaskSpecBuilder::new("D").build(),
        ],
    );
    let report = scheduler.tidy().expect("tidy");

    assert_eq!(reason_of(&report, "A"), Some(&InvalidReason::DependencyCycle));
    assert_eq!(reason_of(&report, "B"), Some(&InvalidReason::DependencyCycle));
    assert_eq!(
        reason_of(&report, "C"),
        Some(&InvalidReason::InvalidDependency("A".to_string()))
    );
    assert_eq!(report.ready, ["D"]);
    assert_invariants(&scheduler);
}

#[test]
fn second_tidy_without_new_tasks_changes_nothing() {
    let mut scheduler = tidied_scheduler(
        &[("cpu", 1)],
        vec![
            TaskSpecBuilder::new("A").build(),
            TaskSpecBuilder::new("B").from("A").build(),
        ],
    );
    let before = scheduler.summary();

    let report = scheduler.tidy().expect("second tidy");

    assert!(report.is_empty());
    assert_eq!(scheduler.summary(), before);
    assert_eq!(scheduler.task("B").unwrap().depends, ["A"]);
    assert_eq!(scheduler.task("A").unwrap().blocks, ["B"]);
}

#[test]
fn valid_registration_round_trips_into_ready_and_wait() {
    let mut specs = Vec::new();
    for i in 0..20 {
        let slot = ["cpu", "io", "net"][i % 3];
        let mut builder = TaskSpecBuilder::new(&format!("t{i}")).slot(slot);
        if i >= 3 {
            builder = builder.from(&format!("t{}", i - 3));
        }
        if i % 5 == 0 && i + 1 < 20 {
            builder = builder.to(&format!("t{}", i + 1));
        }
        specs.push(builder.build());
    }

    let mut scheduler = scheduler_with(&[("cpu", 2), ("io", 1), ("net", 3)], specs);
    scheduler.tidy().expect("tidy");

    let summary = scheduler.summary();
    assert_eq!(summary.ready + summary.waiting, 20);
    assert_eq!(summary.init, 0);
    assert_invariants(&scheduler);
}

#[test]
fn incremental_tidy_skips_done_predecessor() {
    let mut scheduler = tidied_scheduler(&[("cpu", 1)], vec![TaskSpecBuilder::new("A").build()]);
    assert_eq!(tick_names(&mut scheduler), ["A"]);
    scheduler.on_exit("A", 0).expect("exit A");

    scheduler
        .add_task(TaskSpecBuilder::new("B").from("A").build())
        .expect("add B");
    let report = scheduler.tidy().expect("tidy B");

    assert_eq!(report.ready, ["B"]);
    assert!(scheduler.task("B").unwrap().depends.is_empty());
    assert!(scheduler.task("A").unwrap().blocks.is_empty());
    assert_invariants(&scheduler);
}

#[test]
fn incremental_tidy_rejects_failed_predecessor() {
    let mut scheduler = tidied_scheduler(&[("cpu", 1)], vec![TaskSpecBuilder::new("A").build()]);
    assert_eq!(tick_names(&mut scheduler), ["A"]);
    scheduler.on_exit("A", 2).expect("exit A");

    scheduler
        .add_task(TaskSpecBuilder::new("B").from("A").build())
        .expect("add B");
    let report = scheduler.tidy().expect("tidy B");

    assert_eq!(
        reason_of(&report, "B"),
        Some(&InvalidReason::FailedDependency("A".to_string()))
    );
    assert!(!scheduler.contains_task("B"));
}

#[test]
fn incremental_tidy_links_to_running_predecessor() {
    let mut scheduler = tidied_scheduler(&[("cpu", 1)], vec![TaskSpecBuilder::new("A").build()]);
    assert_eq!(tick_names(&mut scheduler), ["A"]);

    scheduler
        .add_task(TaskSpecBuilder::new("B").from("A").build())
        .expect("add B");
    let report = scheduler.tidy().expect("tidy B");
    assert_eq!(report.waiting, ["B"]);
    assert_invariants(&scheduler);

    let exit = scheduler.on_exit("A", 0).expect("exit A");
    assert_eq!(exit.newly_ready, ["B"]);
    assert_state(&scheduler, "B", TaskState::Ready);
}

#[test]
fn to_edge_into_an_earlier_batch_is_ignored() {
    let mut scheduler = tidied_scheduler(&[("cpu", 1)], vec![TaskSpecBuilder::new("A").build()]);

    scheduler
        .add_task(TaskSpecBuilder::new("C").to("A").build())
        .expect("add C");
    scheduler.tidy().expect("tidy C");

    assert_state(&scheduler, "A", TaskState::Ready);
    assert!(scheduler.task("A").unwrap().depends.is_empty());
    assert!(scheduler.task("C").unwrap().blocks.is_empty());
    assert_invariants(&scheduler);
}

#[test]
fn zero_capacity_task_is_invalid() {
    init_tracing();

    let mut scheduler = scheduler_with(
        &[("cpu", 1)],
        vec![
            TaskSpecBuilder::new("free").capacity(0).build(),
            TaskSpecBuilder::new("after").from("free").build(),
            TaskSpecBuilder::new("paid").build(),
        ],
    );
    let report = scheduler.tidy().expect("tidy");

    assert_eq!(reason_of(&report, "free"), Some(&InvalidReason::ZeroCapacity));
    assert_eq!(
        reason_of(&report, "after"),
        Some(&InvalidReason::InvalidDependency("free".to_string()))
    );
    assert_eq!(report.ready, ["paid"]);

    // Only real capacity is ever charged: one unit, one task.
    assert_eq!(tick_names(&mut scheduler), ["paid"]);
    assert_eq!(scheduler.slot("cpu").unwrap().rank, 1);
    assert_invariants(&scheduler);
}
