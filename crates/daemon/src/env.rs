// SPDX-License-Identifier: MIT

//! Centralized environment variable access for the daemon crate
//! (spec.md §6 "Environment variables").
//!
//! One free function per setting, CLI flag > env var > built-in default.
//! Callers in `gpd-cli` pass an explicit `Some(value)` from a parsed flag;
//! `None` falls through to the environment/default here.

use std::time::Duration;

/// `GPDD_WORKERS` — default pool size when not given on the CLI.
/// Falls back to the host's available parallelism, per spec.md §6.
pub fn default_workers(cli_value: Option<usize>) -> usize {
    cli_value
        .or_else(|| std::env::var("GPDD_WORKERS").ok().and_then(|s| s.parse().ok()))
        .unwrap_or_else(|| std::thread::available_parallelism().map(|n| n.get()).unwrap_or(1))
}

/// `GPDD_GRACE_TIMEOUT` — drain deadline in ms (default 30000).
pub fn grace_timeout(cli_value: Option<Duration>) -> Duration {
    cli_value
        .or_else(|| {
            std::env::var("GPDD_GRACE_TIMEOUT").ok().and_then(|s| s.parse().ok()).map(Duration::from_millis)
        })
        .unwrap_or(Duration::from_millis(30_000))
}

/// `GPDD_READY_TIMEOUT` — ready deadline in ms (default 10000).
pub fn ready_timeout(cli_value: Option<Duration>) -> Duration {
    cli_value
        .or_else(|| {
            std::env::var("GPDD_READY_TIMEOUT").ok().and_then(|s| s.parse().ok()).map(Duration::from_millis)
        })
        .unwrap_or(Duration::from_millis(10_000))
}

/// Poll interval used while waiting on the readiness probe (spec.md §4.1
/// step 2: "poll every `readyPollInterval` (default 500 ms)").
pub fn ready_poll_interval() -> Duration {
    std::env::var("GPDD_READY_POLL_INTERVAL_MS")
        .ok()
        .and_then(|s| s.parse().ok())
        .map(Duration::from_millis)
        .unwrap_or(Duration::from_millis(500))
}

/// `GPDD_READY_URL` — readiness endpoint, admissible alongside the in-band token.
pub fn ready_url(cli_value: Option<String>) -> Option<String> {
    cli_value.or_else(|| std::env::var("GPDD_READY_URL").ok())
}

/// `GPDD_HEALTH_URL` — liveness endpoint for the ambient health poller (§4.6).
pub fn health_url(cli_value: Option<String>) -> Option<String> {
    cli_value.or_else(|| std::env::var("GPDD_HEALTH_URL").ok())
}

pub fn health_interval(cli_value: Option<Duration>) -> Duration {
    cli_value
        .or_else(|| {
            std::env::var("GPDD_HEALTH_INTERVAL").ok().and_then(|s| s.parse().ok()).map(Duration::from_millis)
        })
        .unwrap_or(Duration::from_millis(10_000))
}

pub fn health_threshold(cli_value: Option<u32>) -> u32 {
    cli_value
        .or_else(|| std::env::var("GPDD_HEALTH_THRESHOLD").ok().and_then(|s| s.parse().ok()))
        .unwrap_or(3)
}

/// `GPDD_IPC_PORT` — fixed loopback port (0 = ephemeral).
pub fn ipc_port() -> u16 {
    std::env::var("GPDD_IPC_PORT").ok().and_then(|s| s.parse().ok()).unwrap_or(0)
}

/// Shared listening socket address for worker processes (supplemental —
/// not named in spec.md's CLI/env table, which treats the worker's
/// listening socket as wholly owned by the external application binary;
/// the master still has to bind *something* to hand down per spec.md §5
/// "Shared resources". See DESIGN.md for the resolved Open Question.
pub fn listen_addr() -> String {
    std::env::var("GPDD_LISTEN_ADDR").unwrap_or_else(|_| "127.0.0.1:8080".to_string())
}

/// Decimal ASCII pid file created at startup, removed at clean exit
/// (spec.md §6 "Persisted state"). Resolved relative to the process's
/// working directory, same as the teacher resolves its own runtime files.
pub const PID_FILE_NAME: &str = ".gpd-runtime.pid";

/// Sidecar next to [`PID_FILE_NAME`]: decimal ASCII port of the loopback
/// IPC endpoint, created at IPC bind and removed at cleanup.
pub const PORT_FILE_NAME: &str = ".gpd-runtime.port";

/// Fixed file descriptor number the shared listening socket is handed to
/// workers on. `3` is the first descriptor above the inherited stdio
/// triple, matching systemd socket-activation convention.
pub const LISTEN_FD: i32 = 3;

/// Env var workers read to discover [`LISTEN_FD`].
pub const LISTEN_FD_VAR: &str = "GPD_LISTEN_FD";
