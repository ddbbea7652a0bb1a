use proptest::prelude::*;

use super::*;

proptest! {
    /// spec.md §3 invariant 3: "Worker ids are strictly increasing; no
    /// id is ever recycled" — holds across any interleaving of inserts
    /// and removals, not just the handful of fixed sequences above.
    #[test]
    fn ids_are_strictly_increasing_and_never_recycled(
        insert_a_worker in prop::collection::vec(any::<bool>(), 1..64),
    ) {
        let mut reg = WorkerRegistry::new();
        let mut live: Vec<WorkerId> = Vec::new();
        let mut highest_seen: Option<WorkerId> = None;

        for do_insert in insert_a_worker {
            if do_insert || live.is_empty() {
                let id = reg.insert(1);
                if let Some(prev) = highest_seen {
                    prop_assert!(id > prev, "ids must never repeat or go backwards");
                }
                highest_seen = Some(id);
                live.push(id);
            } else {
                let id = live.pop().expect("non-empty checked above");
                reg.remove(id);
            }
        }

        prop_assert_eq!(reg.size(), live.len());
        prop_assert_eq!(reg.ids(), {
            let mut sorted = live.clone();
            sorted.sort();
            sorted
        });
    }
}

#[test]
fn insert_assigns_monotonic_ids() {
    let mut reg = WorkerRegistry::new();
    let a = reg.insert(100);
    let b = reg.insert(101);
    let c = reg.insert(102);
    assert!(a < b && b < c);
}

#[test]
fn ids_are_never_recycled_after_removal() {
    let mut reg = WorkerRegistry::new();
    let a = reg.insert(100);
    reg.remove(a);
    let b = reg.insert(101);
    assert!(b > a);
}

#[test]
fn new_worker_starts_in_starting_state() {
    let mut reg = WorkerRegistry::new();
    let id = reg.insert(100);
    assert_eq!(reg.get(id).unwrap().state, WorkerState::Starting);
}

#[test]
fn mark_ready_transitions_state() {
    let mut reg = WorkerRegistry::new();
    let id = reg.insert(100);
    reg.mark_ready(id).unwrap();
    assert_eq!(reg.get(id).unwrap().state, WorkerState::Ready);
}

#[test]
fn mark_draining_transitions_state() {
    let mut reg = WorkerRegistry::new();
    let id = reg.insert(100);
    reg.mark_ready(id).unwrap();
    reg.mark_draining(id).unwrap();
    assert_eq!(reg.get(id).unwrap().state, WorkerState::Draining);
}

#[test]
fn transition_on_unknown_id_errors() {
    let mut reg = WorkerRegistry::new();
    let err = reg.mark_ready(WorkerId(999)).unwrap_err();
    assert_eq!(err, RegistryError::NotFound(WorkerId(999)));
}

#[test]
fn remove_deletes_and_returns_worker() {
    let mut reg = WorkerRegistry::new();
    let id = reg.insert(100);
    let removed = reg.remove(id).unwrap();
    assert_eq!(removed.pid, 100);
    assert!(reg.get(id).is_none());
    assert!(reg.remove(id).is_none());
}

#[test]
fn by_pid_finds_matching_worker() {
    let mut reg = WorkerRegistry::new();
    let id = reg.insert(4242);
    assert_eq!(reg.by_pid(4242).unwrap().id, id);
    assert!(reg.by_pid(1).is_none());
}

#[test]
fn oldest_id_is_lowest_tracked_id() {
    let mut reg = WorkerRegistry::new();
    let a = reg.insert(1);
    let _b = reg.insert(2);
    assert_eq!(reg.oldest_id(), Some(a));
    reg.remove(a);
    assert_eq!(reg.oldest_id(), Some(_b));
}

#[test]
fn oldest_id_empty_registry_is_none() {
    let reg = WorkerRegistry::new();
    assert_eq!(reg.oldest_id(), None);
}

#[test]
fn snapshot_is_a_consistent_clone_in_id_order() {
    let mut reg = WorkerRegistry::new();
    let a = reg.insert(1);
    let b = reg.insert(2);
    reg.mark_ready(a).unwrap();
    let snap = reg.snapshot();
    assert_eq!(snap.len(), 2);
    assert_eq!(snap[0].id, a);
    assert_eq!(snap[1].id, b);
    assert_eq!(snap[0].state, WorkerState::Ready);

    // Mutating the registry afterwards must not affect the snapshot already taken.
    reg.mark_ready(b).unwrap();
    assert_eq!(snap[1].state, WorkerState::Starting);
}

#[test]
fn size_and_is_empty_track_registry_contents() {
    let mut reg = WorkerRegistry::new();
    assert!(reg.is_empty());
    assert_eq!(reg.size(), 0);
    let id = reg.insert(1);
    assert_eq!(reg.size(), 1);
    assert!(!reg.is_empty());
    reg.remove(id);
    assert!(reg.is_empty());
}

#[test]
fn ids_returns_ascending_assignment_order() {
    let mut reg = WorkerRegistry::new();
    let a = reg.insert(1);
    let b = reg.insert(2);
    let c = reg.insert(3);
    assert_eq!(reg.ids(), vec![a, b, c]);
}
