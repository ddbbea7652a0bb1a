// SPDX-License-Identifier: MIT

mod args;
mod client;
mod daemonize;
mod logging;

use std::net::SocketAddr;
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use gpd_daemon::env::{self, PID_FILE_NAME, PORT_FILE_NAME};
use gpd_daemon::lifecycle::{self, Sidecars, StartupConfig};
use gpd_daemon::master::Tuning;

const LOG_FILE_NAME: &str = ".gpd-runtime.log";

fn main() -> Result<()> {
    let cli = args::Cli::parse();

    let runtime = tokio::runtime::Runtime::new().context("building tokio runtime")?;
    let exit_code = runtime.block_on(run(cli))?;
    std::process::exit(exit_code);
}

async fn run(cli: args::Cli) -> Result<i32> {
    match cli.command {
        args::Command::Start { app_file, workers, ready_url, health_url, health_interval, health_threshold, daemon } => {
            run_start(app_file, workers, ready_url, health_url, health_interval, health_threshold, daemon).await
        }
        args::Command::Reload => Ok(client::reload().await),
        args::Command::Stop => Ok(client::stop().await),
        args::Command::Status => Ok(client::status().await),
    }
}

#[allow(clippy::too_many_arguments)]
async fn run_start(
    app_file: String,
    workers: Option<usize>,
    ready_url: Option<String>,
    health_url: Option<String>,
    health_interval: Option<std::time::Duration>,
    health_threshold: Option<u32>,
    daemon: bool,
) -> Result<i32> {
    let already_detached = std::env::var(daemonize::DETACHED_VAR).is_ok();

    if daemon && !already_detached {
        logging::init_foreground();
        let args: Vec<String> = std::env::args().skip(1).filter(|a| a != "--daemon").collect();
        daemonize::spawn_detached(&args, &PathBuf::from(LOG_FILE_NAME))?;
        return Ok(0);
    }

    if already_detached {
        logging::init_detached(&PathBuf::from(LOG_FILE_NAME));
    } else {
        logging::init_foreground();
    }

    let tuning = Tuning {
        grace_timeout: env::grace_timeout(None),
        ready_timeout: env::ready_timeout(None),
        ready_poll_interval: env::ready_poll_interval(),
        ready_url: env::ready_url(ready_url),
        health_url: env::health_url(health_url),
        health_interval: env::health_interval(health_interval),
        health_threshold: env::health_threshold(health_threshold),
    };

    let ipc_addr: SocketAddr = ([127, 0, 0, 1], env::ipc_port()).into();

    let config = StartupConfig {
        app_file,
        workers: env::default_workers(workers),
        sidecars: Sidecars { pid_file: PathBuf::from(PID_FILE_NAME), port_file: PathBuf::from(PORT_FILE_NAME) },
        listen_addr: env::listen_addr(),
        ipc_addr,
        tuning,
    };

    match lifecycle::startup(config).await {
        Ok(()) => Ok(0),
        Err(e) => {
            tracing::error!(error = %e, "startup failed");
            Ok(1)
        }
    }
}
