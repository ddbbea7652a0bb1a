// SPDX-License-Identifier: MIT

//! The CLI's half of the IPC surface: reads the sidecar pid/port files a
//! running master publishes and talks loopback HTTP to it, falling back
//! to host signals when the sidecar files are missing or stale.

use std::time::Duration;

use gpd_wire::{CommandAck, RuntimeStatus};
use gpd_daemon::env::{PID_FILE_NAME, PORT_FILE_NAME};
use nix::sys::signal::{self, Signal};
use nix::unistd::Pid;
use tracing::warn;

fn read_pid() -> Option<i32> {
    std::fs::read_to_string(PID_FILE_NAME).ok()?.trim().parse().ok()
}

fn read_port() -> Option<u16> {
    std::fs::read_to_string(PORT_FILE_NAME).ok()?.trim().parse().ok()
}

fn base_url(port: u16) -> String {
    format!("http://127.0.0.1:{port}")
}

async fn post(port: u16, path: &str) -> Option<CommandAck> {
    let client = reqwest::Client::new();
    let response = client.post(format!("{}{path}", base_url(port))).send().await.ok()?;
    response.json::<CommandAck>().await.ok()
}

async fn get_status_over_ipc(port: u16) -> Option<RuntimeStatus> {
    let client = reqwest::Client::new();
    let response = client.get(format!("{}/status", base_url(port))).send().await.ok()?;
    response.json::<RuntimeStatus>().await.ok()
}

/// `reload` — enqueue `reload` via IPC; fall back to `SIGHUP` if no
/// master is reachable over loopback.
pub async fn reload() -> i32 {
    if let Some(port) = read_port() {
        if post(port, "/reload").await.is_some() {
            return 0;
        }
        warn!("IPC reload failed, falling back to SIGHUP");
    }

    match read_pid() {
        Some(pid) if signal::kill(Pid::from_raw(pid), Signal::SIGHUP).is_ok() => 0,
        _ => 1,
    }
}

/// `stop` — enqueue `stop` via IPC; fall back to `SIGTERM`, wait up to
/// 30s for exit, then `SIGKILL`.
pub async fn stop() -> i32 {
    let pid = read_pid();

    if let Some(port) = read_port() {
        if post(port, "/stop").await.is_some() {
            if let Some(pid) = pid {
                return wait_for_exit(pid, Duration::from_secs(30)).await;
            }
            return 0;
        }
        warn!("IPC stop failed, falling back to SIGTERM");
    }

    let Some(pid) = pid else { return 1 };
    if signal::kill(Pid::from_raw(pid), Signal::SIGTERM).is_err() {
        return 1;
    }
    wait_for_exit(pid, Duration::from_secs(30)).await
}

async fn wait_for_exit(pid: i32, timeout: Duration) -> i32 {
    let deadline = tokio::time::Instant::now() + timeout;
    while tokio::time::Instant::now() < deadline {
        if signal::kill(Pid::from_raw(pid), None).is_err() {
            return 0;
        }
        tokio::time::sleep(Duration::from_millis(200)).await;
    }
    warn!(pid, "process did not exit within the grace timeout, sending SIGKILL");
    let _ = signal::kill(Pid::from_raw(pid), Signal::SIGKILL);
    1
}

/// `status` — print the running instance's [`RuntimeStatus`], or report
/// that none is running. Exits non-zero only on an actual IPC error, not
/// on "nothing is running".
pub async fn status() -> i32 {
    let Some(port) = read_port() else {
        println!("no running instance");
        return 0;
    };

    match get_status_over_ipc(port).await {
        Some(status) => {
            match serde_json::to_string_pretty(&status) {
                Ok(json) => println!("{json}"),
                Err(_) => println!("no running instance"),
            }
            0
        }
        None => {
            println!("no running instance");
            0
        }
    }
}
