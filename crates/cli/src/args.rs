// SPDX-License-Identifier: MIT

use std::time::Duration;

use clap::{Parser, Subcommand};

/// Zero-downtime process supervisor.
#[derive(Debug, Parser)]
#[command(name = "gpd", version, about)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Run the supervisor in the foreground (or detached with `--daemon`).
    Start {
        /// Path to the worker application binary.
        app_file: String,

        /// Initial pool size (default: `GPDD_WORKERS`, falling back to host CPU count).
        #[arg(long = "workers")]
        workers: Option<usize>,

        /// Readiness probe URL, admissible alongside the in-band `ready` token.
        #[arg(long = "ready-url")]
        ready_url: Option<String>,

        /// Liveness probe URL for the ambient health poller.
        #[arg(long = "health-url")]
        health_url: Option<String>,

        /// Liveness poll interval in milliseconds.
        #[arg(long = "health-interval", value_parser = parse_millis)]
        health_interval: Option<Duration>,

        /// Consecutive liveness failures before escalating to an error log.
        #[arg(long = "health-threshold")]
        health_threshold: Option<u32>,

        /// Detach into the background; stdio is redirected to a log file.
        #[arg(long = "daemon")]
        daemon: bool,
    },

    /// Send `reload` via IPC; falls back to SIGHUP if IPC is unavailable.
    Reload,

    /// Send `stop` via IPC; falls back to SIGTERM, then SIGKILL after 30s.
    Stop,

    /// Print the running instance's `RuntimeStatus`, or report none running.
    Status,
}

fn parse_millis(s: &str) -> Result<Duration, std::num::ParseIntError> {
    s.parse::<u64>().map(Duration::from_millis)
}
