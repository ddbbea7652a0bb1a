// SPDX-License-Identifier: MIT

//! The ambient liveness poller.
//!
//! This is deliberately NOT part of the Supervisor Core: it never reads
//! or mutates the registry and never enqueues a [`crate::command::Command`].
//! It exists purely to surface sustained unreachability of the
//! application's health endpoint in the logs — acting on that signal
//! (e.g. triggering a reload) is an operator decision, not something
//! this crate does on its own.

use std::time::Duration;

use tracing::{error, info};

/// Poll `health_url` every `interval`; once `threshold` consecutive
/// probes fail, log an error and keep polling. A single success resets
/// the streak. Runs until the task is aborted (the caller holds the
/// `JoinHandle`).
pub async fn run(health_url: String, interval: Duration, threshold: u32) {
    let mut consecutive_failures: u32 = 0;
    loop {
        let outcome = gpd_probe::probe(&health_url, interval).await;
        if outcome.reachable {
            if consecutive_failures > 0 {
                info!(health_url, "health endpoint recovered");
            }
            consecutive_failures = 0;
        } else {
            consecutive_failures += 1;
            if consecutive_failures == threshold {
                error!(health_url, threshold, "health endpoint has been unreachable for {threshold} consecutive checks");
            }
        }
        tokio::time::sleep(interval).await;
    }
}
