// SPDX-License-Identifier: MIT

//! [`MasterState`]: the single piece of mutable state the Supervisor Core
//! owns, guarded by one [`parking_lot::Mutex`] so every read sees a
//! non-torn snapshot.

use std::time::Duration;

use gpd_core::{Timestamp, WorkerRegistry};
use parking_lot::Mutex;

/// Tuning knobs resolved once at startup (CLI flag > env var > default,
/// see [`crate::env`]) and held fixed for the master's lifetime.
#[derive(Debug, Clone)]
pub struct Tuning {
    pub grace_timeout: Duration,
    pub ready_timeout: Duration,
    pub ready_poll_interval: Duration,
    pub ready_url: Option<String>,
    pub health_url: Option<String>,
    pub health_interval: Duration,
    pub health_threshold: u32,
}

/// Which lifecycle transition, if any, currently holds exclusive access
/// to the worker pool. Only one may be active at a time: a `reload` in
/// flight must reject a second `reload` and any `scale-down`, and vice
/// versa. `scale-up` is not exclusive — it may run concurrently with
/// nothing else because it never removes a worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    None,
    Reloading,
    ScalingDown,
    ShuttingDown,
}

/// All state the Supervisor Core needs to decide and carry out a
/// lifecycle operation. Mutated only from within the single
/// command-processing task; every other reader — the IPC status handler,
/// the CLI's `status` command proxy — takes the same mutex and only ever
/// reads.
pub struct MasterState {
    pub app_file: String,
    pub start_time: Timestamp,
    pub registry: WorkerRegistry,
    pub transition: Transition,
    pub tuning: Tuning,
    shutdown_requested: bool,
}

impl MasterState {
    pub fn new(app_file: String, tuning: Tuning) -> Self {
        Self {
            app_file,
            start_time: Timestamp::now(),
            registry: WorkerRegistry::new(),
            transition: Transition::None,
            tuning,
            shutdown_requested: false,
        }
    }

    /// `true` once a `shutdown` has been accepted; every other lifecycle
    /// operation must then be rejected.
    pub fn is_shutting_down(&self) -> bool {
        self.transition == Transition::ShuttingDown
    }

    /// `true` while a `reload` or `scale-down` holds the exclusive slot.
    pub fn transition_in_progress(&self) -> bool {
        matches!(self.transition, Transition::Reloading | Transition::ScalingDown)
    }

    /// Record that a shutdown has been asked for, ahead of the `Shutdown`
    /// command actually being drained off the queue. A `reload` or
    /// `scale-down` already in flight polls this at its next suspension
    /// point and aborts early rather than starting another worker,
    /// letting the queued shutdown proceed without waiting for the whole
    /// roll to finish.
    pub fn request_shutdown(&mut self) {
        self.shutdown_requested = true;
    }

    pub fn shutdown_requested(&self) -> bool {
        self.shutdown_requested
    }
}

/// Shared handle to the master's state, cloned into every task that needs
/// to read or mutate it (the command loop, the IPC handlers, the health
/// poller).
pub type SharedMaster = std::sync::Arc<Mutex<MasterState>>;

#[cfg(test)]
mod tests {
    use super::*;

    fn tuning() -> Tuning {
        Tuning {
            grace_timeout: Duration::from_secs(30),
            ready_timeout: Duration::from_secs(10),
            ready_poll_interval: Duration::from_millis(500),
            ready_url: None,
            health_url: None,
            health_interval: Duration::from_secs(10),
            health_threshold: 3,
        }
    }

    #[test]
    fn fresh_master_is_not_shutting_down_or_transitioning() {
        let master = MasterState::new("app.js".to_string(), tuning());
        assert!(!master.is_shutting_down());
        assert!(!master.transition_in_progress());
    }

    #[test]
    fn shutting_down_is_reported_only_in_that_state() {
        let mut master = MasterState::new("app.js".to_string(), tuning());
        master.transition = Transition::ShuttingDown;
        assert!(master.is_shutting_down());
        assert!(!master.transition_in_progress());
    }

    #[test]
    fn reloading_and_scaling_down_both_count_as_in_progress() {
        let mut master = MasterState::new("app.js".to_string(), tuning());
        master.transition = Transition::Reloading;
        assert!(master.transition_in_progress());
        master.transition = Transition::ScalingDown;
        assert!(master.transition_in_progress());
    }

    #[test]
    fn shutdown_requested_is_false_until_asked_for() {
        let mut master = MasterState::new("app.js".to_string(), tuning());
        assert!(!master.shutdown_requested());
        master.request_shutdown();
        assert!(master.shutdown_requested());
    }
}
