mod common;
use crate::common::builders::{TaskSpecBuilder, tidied_scheduler};
use crate::common::{assert_invariants, assert_state, init_tracing, tick_names};

use std::collections::BTreeMap;

use slotdag::dag::{Slot, Task, TaskSpec, select_for_admission};
use slotdag::types::TaskState;

#[test]
fn capacity_bounds_admission_per_tick() {
    init_tracing();

    let mut scheduler = tidied_scheduler(
        &[("cpu", 2)],
        vec![
            TaskSpecBuilder::new("p1").priority(1).build(),
            TaskSpecBuilder::new("p2").priority(2).build(),
            TaskSpecBuilder::new("p3").priority(3).build(),
        ],
    );

    assert_eq!(tick_names(&mut scheduler), ["p3", "p2"]);
    assert_state(&scheduler, "p1", TaskState::Ready);
    assert_eq!(scheduler.slot("cpu").unwrap().rank, 2);
    assert_invariants(&scheduler);

    // Slot full: nothing more this tick.
    assert!(tick_names(&mut scheduler).is_empty());

    scheduler.on_exit("p3", 0).expect("exit p3");
    assert_eq!(scheduler.slot("cpu").unwrap().rank, 1);
    assert_eq!(tick_names(&mut scheduler), ["p1"]);
    assert_invariants(&scheduler);
}

#[test]
fn equal_priorities_fire_latest_queued_first() {
    let mut scheduler = tidied_scheduler(
        &[("cpu", 1)],
        vec![
            TaskSpecBuilder::new("a").build(),
            TaskSpecBuilder::new("b").build(),
            TaskSpecBuilder::new("c").build(),
        ],
    );

    assert_eq!(tick_names(&mut scheduler), ["c"]);
    scheduler.on_exit("c", 0).expect("exit c");
    assert_eq!(tick_names(&mut scheduler), ["b"]);
    scheduler.on_exit("b", 0).expect("exit b");
    assert_eq!(tick_names(&mut scheduler), ["a"]);
}

#[test]
fn higher_priority_wins_regardless_of_queue_order() {
    let mut scheduler = tidied_scheduler(
        &[("cpu", 3)],
        vec![
            TaskSpecBuilder::new("urgent").priority(10).build(),
            TaskSpecBuilder::new("normal").build(),
            TaskSpecBuilder::new("background").priority(-5).build(),
            TaskSpecBuilder::new("late").priority(10).build(),
        ],
    );

    // Sorted ascending: background, normal, urgent, late; popped from the tail.
    assert_eq!(tick_names(&mut scheduler), ["late", "urgent", "normal"]);
    assert_state(&scheduler, "background", TaskState::Ready);
}

#[test]
fn task_capacity_is_charged_against_the_slot() {
    let mut scheduler = tidied_scheduler(
        &[("gpu", 4)],
        vec![
            TaskSpecBuilder::new("train").slot("gpu").capacity(3).priority(2).build(),
            TaskSpecBuilder::new("eval").slot("gpu").capacity(1).priority(1).build(),
        ],
    );

    assert_eq!(tick_names(&mut scheduler), ["train", "eval"]);
    let gpu = scheduler.slot("gpu").unwrap();
    assert_eq!(gpu.rank, 4);
    assert!(!gpu.has_room());
    assert_invariants(&scheduler);

    scheduler.on_exit("train", 0).expect("exit train");
    assert_eq!(scheduler.slot("gpu").unwrap().rank, 1);
}

#[test]
fn task_that_does_not_fit_closes_the_slot_for_the_tick() {
    let mut scheduler = tidied_scheduler(
        &[("cpu", 3)],
        vec![
            TaskSpecBuilder::new("small").priority(9).build(),
            TaskSpecBuilder::new("big").priority(5).capacity(3).build(),
            TaskSpecBuilder::new("tiny").priority(1).build(),
        ],
    );

    // After `small`, `big` needs 3 of the 2 left: the slot stops admitting,
    // even though `tiny` would fit.
    assert_eq!(tick_names(&mut scheduler), ["small"]);
    assert_state(&scheduler, "big", TaskState::Ready);
    assert_state(&scheduler, "tiny", TaskState::Ready);

    scheduler.on_exit("small", 0).expect("exit small");
    assert_eq!(tick_names(&mut scheduler), ["big"]);
    scheduler.on_exit("big", 0).expect("exit big");
    assert_eq!(tick_names(&mut scheduler), ["tiny"]);
}

#[test]
fn slots_are_admitted_independently() {
    let mut scheduler = tidied_scheduler(
        &[("cpu", 1), ("io", 2)],
        vec![
            TaskSpecBuilder::new("c1").slot("cpu").build(),
            TaskSpecBuilder::new("c2").slot("cpu").build(),
            TaskSpecBuilder::new("i1").slot("io").build(),
            TaskSpecBuilder::new("i2").slot("io").build(),
        ],
    );

    // Buckets are visited in slot-name order.
    assert_eq!(tick_names(&mut scheduler), ["c2", "i2", "i1"]);
    assert_state(&scheduler, "c1", TaskState::Ready);

    // `cpu` full, `io` has room but nothing READY for it.
    scheduler.on_exit("i2", 0).expect("exit i2");
    assert!(tick_names(&mut scheduler).is_empty());
    assert_invariants(&scheduler);
}

#[test]
fn fired_task_carries_its_execution_data() {
    let mut scheduler = tidied_scheduler(
        &[("cpu", 2)],
        vec![
            TaskSpecBuilder::new("build")
                .priority(4)
                .capacity(2)
                .cmd("make all")
                .build(),
        ],
    );

    let fired = scheduler.tick().expect("tick");
    assert_eq!(fired.len(), 1);
    let task = &fired[0];
    assert_eq!(task.name, "build");
    assert_eq!(task.slot, "cpu");
    assert_eq!(task.priority, 4);
    assert_eq!(task.capacity, 2);
    assert_eq!(task.cmd.as_deref(), Some("make all"));
    assert!(scheduler.task("build").unwrap().fired_at.is_some());
}

#[test]
fn selection_ignores_full_and_unknown_slots() {
    let mut slots = BTreeMap::new();
    let mut full = Slot::new("full", 1);
    full.rank = 1;
    slots.insert("full".to_string(), full);
    slots.insert("open".to_string(), Slot::new("open", 2));

    let tasks: Vec<Task> = [("f", "full"), ("o", "open"), ("x", "missing")]
        .into_iter()
        .map(|(name, slot)| Task::from_spec(TaskSpec::new(name, slot)))
        .collect();
    let ready: Vec<&Task> = tasks.iter().collect();

    assert_eq!(select_for_admission(&slots, &ready), ["o"]);
}

#[test]
fn selection_with_no_ready_tasks_is_empty() {
    let mut slots = BTreeMap::new();
    slots.insert("cpu".to_string(), Slot::new("cpu", 4));

    assert!(select_for_admission(&slots, &[]).is_empty());
}
