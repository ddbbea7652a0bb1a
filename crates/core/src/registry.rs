// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;

use crate::error::RegistryError;
use crate::worker::{WorkerId, WorkerInfo, WorkerState};

/// In-memory table of live workers, keyed by monotonically increasing id.
///
/// Pure data structure: no I/O, no locking. The daemon wraps one of these
/// in a `parking_lot::Mutex` and gives write access only to the
/// Supervisor Core's command-processing task.
#[derive(Debug, Default)]
pub struct WorkerRegistry {
    workers: BTreeMap<WorkerId, WorkerInfo>,
    next_id: u64,
}

impl WorkerRegistry {
    pub fn new() -> Self {
        Self { workers: BTreeMap::new(), next_id: 1 }
    }

    /// Allocate the next id and insert a fresh `starting` worker for `pid`.
    ///
    /// Ids are never reused within the registry's lifetime (invariant 3):
    /// the counter only ever increases, even across removals.
    pub fn insert(&mut self, pid: u32) -> WorkerId {
        let id = WorkerId(self.next_id);
        self.next_id += 1;
        self.workers.insert(id, WorkerInfo::new(id, pid));
        id
    }

    pub fn mark_ready(&mut self, id: WorkerId) -> Result<(), RegistryError> {
        self.transition(id, WorkerState::Ready)
    }

    pub fn mark_draining(&mut self, id: WorkerId) -> Result<(), RegistryError> {
        self.transition(id, WorkerState::Draining)
    }

    fn transition(&mut self, id: WorkerId, state: WorkerState) -> Result<(), RegistryError> {
        let worker = self.workers.get_mut(&id).ok_or(RegistryError::NotFound(id))?;
        worker.state = state;
        Ok(())
    }

    pub fn remove(&mut self, id: WorkerId) -> Option<WorkerInfo> {
        self.workers.remove(&id)
    }

    pub fn get(&self, id: WorkerId) -> Option<&WorkerInfo> {
        self.workers.get(&id)
    }

    pub fn contains(&self, id: WorkerId) -> bool {
        self.workers.contains_key(&id)
    }

    pub fn by_pid(&self, pid: u32) -> Option<&WorkerInfo> {
        self.workers.values().find(|w| w.pid == pid)
    }

    /// All worker ids currently tracked, in ascending (assignment) order.
    pub fn ids(&self) -> Vec<WorkerId> {
        self.workers.keys().copied().collect()
    }

    /// The lowest (oldest) worker id, if any are tracked.
    ///
    /// Used by scale-down, which retires the oldest worker first.
    pub fn oldest_id(&self) -> Option<WorkerId> {
        self.workers.keys().next().copied()
    }

    /// A consistent, cloned view of every tracked worker, in id order.
    pub fn snapshot(&self) -> Vec<WorkerInfo> {
        self.workers.values().cloned().collect()
    }

    pub fn size(&self) -> usize {
        self.workers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.workers.is_empty()
    }
}

#[cfg(test)]
#[path = "registry_tests.rs"]
mod tests;
