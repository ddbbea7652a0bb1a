// SPDX-License-Identifier: MIT

//! The Supervisor Core (spec.md §4.1): the state machine that owns every
//! worker process and carries out `reload`, `scale-up`, `scale-down`, and
//! `shutdown`.
//!
//! All public operations run on the single task that drains the command
//! stream (spec.md §4.2) — there is no internal locking here beyond the
//! brief, non-`await`-holding locks taken on [`MasterState`] to read
//! tuning and publish registry changes. Nothing else is allowed to touch
//! [`WorkerProcess`] handles or spawn/kill workers; a second caller would
//! race the single-writer invariant the rest of the crate relies on.

use std::collections::HashMap;
use std::net::TcpListener as StdTcpListener;
use std::time::Duration;

use gpd_core::WorkerId;
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::{info, warn};

use crate::error::SupervisorError;
use crate::master::{SharedMaster, Transition};
use crate::worker_process::WorkerProcess;

/// Owns the live child processes and drives them through their
/// lifecycle. Metadata about each worker (id, pid, state, start time)
/// lives in [`gpd_core::WorkerRegistry`] inside [`MasterState`], which
/// other tasks may read concurrently; this struct holds the process
/// handles themselves, touched only from here.
pub struct Supervisor {
    master: SharedMaster,
    listener: Option<StdTcpListener>,
    processes: HashMap<WorkerId, WorkerProcess>,
}

impl Supervisor {
    pub fn new(master: SharedMaster, listener: Option<StdTcpListener>) -> Self {
        Self { master, listener, processes: HashMap::new() }
    }

    pub fn worker_count(&self) -> usize {
        self.processes.len()
    }

    /// Spawn the initial pool named at startup (spec.md §7 "Startup").
    /// Every worker must become ready before `start` returns; a worker
    /// that never does fails the whole startup.
    pub async fn start(&mut self, count: usize) -> Result<(), SupervisorError> {
        for _ in 0..count {
            self.spawn_one().await?;
        }
        Ok(())
    }

    /// Roll the pool one worker at a time: spawn a replacement, wait for
    /// it to become ready, then retire the oldest still-active worker
    /// (spec.md §4.1 "reload"). Only one reload or scale-down may be in
    /// flight at once (invariant 4).
    pub async fn reload(&mut self) -> Result<(), SupervisorError> {
        self.begin_transition(Transition::Reloading)?;
        let outcome = self.reload_inner().await;
        self.end_transition();
        outcome
    }

    async fn reload_inner(&mut self) -> Result<(), SupervisorError> {
        let generation: Vec<WorkerId> = {
            let master = self.master.lock();
            master.registry.ids()
        };
        for old_id in generation {
            if self.master.lock().shutdown_requested() {
                info!("shutdown requested mid-reload, aborting the roll at this suspension point");
                break;
            }
            // spec.md §4.1 step 3 / §7: a replacement that never becomes
            // ready aborts only this step. The old worker is kept alive
            // and the roll proceeds to the next id rather than failing
            // the whole reload.
            if let Err(err) = self.spawn_one().await {
                warn!(worker_id = %old_id, ?err, "replacement failed to become ready, keeping the old worker for this step");
                continue;
            }
            self.retire(old_id).await;
        }
        Ok(())
    }

    /// Add exactly one worker to the pool without retiring any existing
    /// one (spec.md §4.1 "scale-up"). Not mutually exclusive with a
    /// concurrent reload/scale-down since it never removes a worker, but
    /// is still only ever called from the single command task.
    pub async fn scale_up(&mut self) -> Result<(), SupervisorError> {
        if self.is_shutting_down() {
            return Err(SupervisorError::ShuttingDown);
        }
        self.spawn_one().await
    }

    /// Retire the oldest worker in the pool (spec.md §4.1 "scale-down",
    /// and the resolved Open Question in DESIGN.md on which worker is
    /// chosen). Refuses to go below one worker.
    pub async fn scale_down(&mut self) -> Result<(), SupervisorError> {
        self.begin_transition(Transition::ScalingDown)?;
        let outcome = self.scale_down_inner().await;
        self.end_transition();
        outcome
    }

    async fn scale_down_inner(&mut self) -> Result<(), SupervisorError> {
        let oldest = {
            let master = self.master.lock();
            if master.registry.size() <= 1 {
                return Err(SupervisorError::MinimumPoolSize);
            }
            master.registry.oldest_id()
        };
        if let Some(id) = oldest {
            self.retire(id).await;
        }
        Ok(())
    }

    /// Drain every worker concurrently and mark the master as shutting
    /// down. Once this returns, no further lifecycle operation is
    /// accepted (spec.md §4.1 invariant 4, §4.5 "shutdown"). A single
    /// top-level timer of `graceTimeout` bounds the *whole* drain rather
    /// than each worker serially (spec.md §5 "A global shutdown arms a
    /// top-level timer..."); if it elapses with workers still alive the
    /// caller must force process exit with non-zero status (spec.md §7
    /// "Global shutdown grace expiry").
    pub async fn shutdown(&mut self) -> Result<(), SupervisorError> {
        let grace_timeout = {
            let mut master = self.master.lock();
            master.transition = Transition::ShuttingDown;
            master.tuning.grace_timeout
        };

        let ids: Vec<WorkerId> = self.processes.keys().copied().collect();
        let mut drains = tokio::task::JoinSet::new();
        for id in ids {
            if let Some(process) = self.processes.remove(&id) {
                let master = self.master.clone();
                drains.spawn(retire_process(master, id, process));
            }
        }

        let all_drained = async {
            while drains.join_next().await.is_some() {}
        };
        if tokio::time::timeout(grace_timeout, all_drained).await.is_err() {
            warn!("global shutdown grace timeout elapsed with workers still alive");
            return Err(SupervisorError::ShutdownTimedOut);
        }
        Ok(())
    }

    fn is_shutting_down(&self) -> bool {
        self.master.lock().is_shutting_down()
    }

    fn begin_transition(&self, transition: Transition) -> Result<(), SupervisorError> {
        let mut master = self.master.lock();
        if master.is_shutting_down() {
            return Err(SupervisorError::ShuttingDown);
        }
        if master.transition_in_progress() {
            return Err(SupervisorError::TransitionInProgress);
        }
        master.transition = transition;
        Ok(())
    }

    fn end_transition(&self) {
        let mut master = self.master.lock();
        master.transition = Transition::None;
    }

    /// Spawn one worker, wait for it to become ready via whichever signal
    /// is configured (in-band token and/or HTTP probe — spec.md §4.1 step
    /// 2: "either signal counts"), then register it. A worker that never
    /// becomes ready within `readyTimeout` is killed and counted as a
    /// failed spawn.
    async fn spawn_one(&mut self) -> Result<(), SupervisorError> {
        let (app_file, ready_timeout, ready_url, ready_poll_interval) = {
            let master = self.master.lock();
            (
                master.app_file.clone(),
                master.tuning.ready_timeout,
                master.tuning.ready_url.clone(),
                master.tuning.ready_poll_interval,
            )
        };

        let mut process =
            WorkerProcess::spawn(&app_file, self.listener.as_ref()).map_err(|_| SupervisorError::SpawnFailed)?;
        let pid = process.pid;

        let ready = wait_ready(&mut process, ready_timeout, ready_url.as_deref(), ready_poll_interval).await;
        if !ready {
            warn!(pid, "worker failed to become ready within the timeout, killing it");
            let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
            let _ = process.wait().await;
            return Err(SupervisorError::SpawnFailed);
        }

        let id = {
            let mut master = self.master.lock();
            let id = master.registry.insert(pid);
            let _ = master.registry.mark_ready(id);
            id
        };
        info!(pid, worker_id = %id, "worker ready");
        self.processes.insert(id, process);
        Ok(())
    }

    /// Mark a worker draining, ask it to shut down, and wait up to the
    /// grace timeout before escalating to SIGKILL (spec.md §4.1 step 4).
    /// The worker is removed from the registry once it has exited, not
    /// before — `status` must keep reporting it until then.
    async fn retire(&mut self, id: WorkerId) {
        let Some(process) = self.processes.remove(&id) else {
            self.master.lock().registry.remove(id);
            return;
        };
        retire_process(self.master.clone(), id, process).await;
    }

    /// Crash-restart policy (spec.md §4.1, §7 "Unexpected worker exit",
    /// §8 property 6). Called once per command-loop tick: any worker
    /// that exited on its own since the last tick is reaped here,
    /// because a worker removed intentionally (`retire`/`shutdown`) is
    /// always taken out of `self.processes` before it is awaited, so
    /// whatever is left behind and dead was never meant to exit yet.
    ///
    /// A transition in flight is already retiring workers on its own
    /// schedule, so an exit observed here while one is active belongs to
    /// it rather than to a crash, and is left alone.
    pub async fn reap_crashed(&mut self) {
        if self.master.lock().transition != Transition::None {
            return;
        }

        let dead: Vec<WorkerId> = self
            .processes
            .iter_mut()
            .filter_map(|(id, process)| match process.child.try_wait() {
                Ok(Some(_)) => Some(*id),
                _ => None,
            })
            .collect();

        for id in dead {
            self.processes.remove(&id);
            self.master.lock().registry.remove(id);
            warn!(worker_id = %id, "worker exited outside of a transition, forking a replacement");
            if let Err(err) = self.spawn_one().await {
                warn!(worker_id = %id, ?err, "crash-restart replacement failed to become ready");
            }
        }
    }
}

/// The single-worker drain procedure shared by `retire` (used one at a
/// time during a reload or scale-down) and `shutdown` (fanned out across
/// every live worker at once, see [`Supervisor::shutdown`]).
async fn retire_process(master: SharedMaster, id: WorkerId, mut process: WorkerProcess) {
    {
        let mut m = master.lock();
        let _ = m.registry.mark_draining(id);
    }
    let grace_timeout = master.lock().tuning.grace_timeout;

    let _ = process.send_shutdown_token().await;
    let pid = process.pid;
    match tokio::time::timeout(grace_timeout, process.wait()).await {
        Ok(_) => info!(pid, worker_id = %id, "worker exited during drain"),
        Err(_) => {
            warn!(pid, worker_id = %id, "worker did not exit within the grace timeout, sending SIGKILL");
            let _ = signal::kill(Pid::from_raw(pid as i32), Signal::SIGKILL);
            let _ = process.wait().await;
        }
    }
    master.lock().registry.remove(id);
}

/// Wait for either the in-band `ready` token or a successful HTTP probe,
/// whichever arrives first, up to `timeout` (spec.md §4.1 step 2). If
/// neither is configured the token is the only signal available.
async fn wait_ready(
    process: &mut WorkerProcess,
    timeout: Duration,
    ready_url: Option<&str>,
    poll_interval: Duration,
) -> bool {
    let token_wait = process.wait_for_ready_token();

    match ready_url {
        None => tokio::time::timeout(timeout, token_wait).await.unwrap_or(false),
        Some(url) => {
            let probe_wait = poll_until_reachable(url, poll_interval);
            tokio::select! {
                token_ready = token_wait => token_ready,
                probe_ready = probe_wait => probe_ready,
                _ = tokio::time::sleep(timeout) => false,
            }
        }
    }
}

/// Poll `url` until it returns any HTTP-level response — 4xx/5xx counts
/// as reachable, only connection failures keep polling (spec.md §4.1
/// step 2, "any HTTP response, including error statuses, counts").
async fn poll_until_reachable(url: &str, interval: Duration) -> bool {
    loop {
        let outcome = gpd_probe::probe(url, interval).await;
        if outcome.reachable {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
}

#[cfg(test)]
#[path = "supervisor_tests.rs"]
mod tests;
