// SPDX-License-Identifier: MIT

use std::fmt;
use std::time::{SystemTime, UNIX_EPOCH};

use serde::{Deserialize, Serialize};

/// Unique identifier for a worker instance.
///
/// Assigned by the Supervisor Core on fork, monotonically increasing for
/// the lifetime of the master process. Never reused, even after the
/// worker it named has been removed from the registry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub struct WorkerId(pub u64);

impl WorkerId {
    pub fn next(self) -> Self {
        Self(self.0 + 1)
    }
}

impl fmt::Display for WorkerId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Milliseconds since the Unix epoch. Plain scalar on the wire — this
/// process never needs calendar arithmetic, only "when did this happen"
/// for display and ordering.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Timestamp(pub u64);

impl Timestamp {
    pub fn now() -> Self {
        let ms = SystemTime::now()
            .duration_since(UNIX_EPOCH)
            .map(|d| d.as_millis() as u64)
            .unwrap_or(0);
        Self(ms)
    }
}

/// Lifecycle state of a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WorkerState {
    /// Forked, not yet observed ready (in-band token or probe response).
    Starting,
    /// Accept loop confirmed up.
    Ready,
    /// Retiring: told to drain, awaiting exit or grace-timeout force-kill.
    Draining,
}

/// A tracked worker process.
///
/// Owned exclusively by the [`crate::WorkerRegistry`]: created on fork,
/// state-mutated only by the Supervisor Core, destroyed on observed exit.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct WorkerInfo {
    pub id: WorkerId,
    pub pid: u32,
    pub state: WorkerState,
    #[serde(rename = "startTime")]
    pub start_time: Timestamp,
}

impl WorkerInfo {
    pub fn new(id: WorkerId, pid: u32) -> Self {
        Self { id, pid, state: WorkerState::Starting, start_time: Timestamp::now() }
    }
}
