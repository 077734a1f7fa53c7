// src/dag/admission.rs

//! Admission control: which READY tasks fit into their slot this tick.

use std::collections::BTreeMap;

use tracing::trace;

use crate::dag::task::{Slot, Task};
use crate::types::TaskName;

/// Pick the READY tasks to fire, bounded by each slot's free capacity.
///
/// - Only slots with `rank < capacity` get a bucket; tasks of full or unknown
///   slots stay READY.
/// - Each bucket is stable-sorted ascending by priority and consumed from the
///   tail, so the highest priority goes first and, among equal priorities,
///   the most recently queued task goes first.
/// - A task is charged its `capacity`. When the next task does not fit the
///   remaining capacity, the slot stops admitting for this tick.
///
/// `ready` must be in READY-queue order. The result is grouped by slot name.
pub fn select_for_admission(slots: &BTreeMap<String, Slot>, ready: &[&Task]) -> Vec<TaskName> {
    let mut buckets: BTreeMap<&str, Vec<&Task>> = slots
        .values()
        .filter(|slot| slot.has_room())
        .map(|slot| (slot.name.as_str(), Vec::new()))
        .collect();

    if buckets.is_empty() {
        return Vec::new();
    }

    for task in ready {
        if let Some(bucket) = buckets.get_mut(task.slot.as_str()) {
            bucket.push(*task);
        }
    }

    let mut selected = Vec::new();

    for (slot_name, mut bucket) in buckets {
        if bucket.is_empty() {
            continue;
        }
        let Some(slot) = slots.get(slot_name) else {
            continue;
        };

        bucket.sort_by_key(|task| task.priority);

        let mut avail = slot.available();
        while avail > 0 {
            let Some(task) = bucket.last() else {
                break;
            };
            if task.capacity > avail {
                trace!(
                    task = %task.name,
                    slot = %slot_name,
                    capacity = task.capacity,
                    avail,
                    "next task does not fit; slot closed for this tick"
                );
                break;
            }
            avail -= task.capacity;
            selected.push(task.name.clone());
            bucket.pop();
        }
    }

    selected
}
