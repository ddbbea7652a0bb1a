// SPDX-License-Identifier: MIT

//! Detached (`--daemon`) launcher.
//!
//! A thin launcher: re-exec the current binary with standard I/O
//! redirected to a log file, with an internal flag marking the child as
//! already detached so it runs the supervisor in the foreground of its
//! own process rather than re-entering this launcher. The launcher
//! process then returns immediately; the supervisor itself has no notion
//! of detachment.

use std::process::Stdio;

use anyhow::{Context, Result};

/// Env var the re-exec'd child checks to know it's already past the
/// launcher step and should run the supervisor directly.
pub const DETACHED_VAR: &str = "GPD_DETACHED";

/// Re-exec the current executable with `args`, redirecting its stdio to
/// `log_path`, and return without waiting for it — the detached process
/// keeps running after this one exits.
pub fn spawn_detached(args: &[String], log_path: &std::path::Path) -> Result<()> {
    let exe = std::env::current_exe().context("resolving current executable")?;
    let log_file = std::fs::OpenOptions::new()
        .create(true)
        .append(true)
        .open(log_path)
        .with_context(|| format!("opening log file {}", log_path.display()))?;
    let log_file_for_err = log_file.try_clone().context("cloning log file handle")?;

    std::process::Command::new(exe)
        .args(args)
        .env(DETACHED_VAR, "1")
        .stdin(Stdio::null())
        .stdout(Stdio::from(log_file))
        .stderr(Stdio::from(log_file_for_err))
        .spawn()
        .context("spawning detached supervisor")?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn spawn_detached_creates_and_appends_to_the_log_file() {
        let dir = tempfile::tempdir().unwrap();
        let log_path = dir.path().join("gpd.log");
        spawn_detached(&["--version".to_string()], &log_path).unwrap();
        // Give the detached `--version` invocation a moment to run and exit.
        std::thread::sleep(std::time::Duration::from_millis(200));
        assert!(log_path.exists());
    }
}
