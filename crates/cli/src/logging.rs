// SPDX-License-Identifier: MIT

//! Logging setup.
//!
//! Foreground runs log to stdout with the standard `tracing_subscriber`
//! `EnvFilter` (`RUST_LOG`, default `info`). A detached run — stdio
//! already redirected to the log file by [`crate::daemonize`] — still
//! benefits from a dedicated non-rolling file appender so log lines are
//! flushed promptly instead of buffered behind the redirected stdio pipe.

use std::path::Path;

use tracing_subscriber::EnvFilter;

fn env_filter() -> EnvFilter {
    EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"))
}

/// Initialize logging for a foreground run: plain stdout.
pub fn init_foreground() {
    tracing_subscriber::fmt().with_env_filter(env_filter()).init();
}

/// Initialize logging for a detached run: a dedicated file appender at
/// `log_path`, in addition to stdio which is already pointed at the same
/// file by the launcher.
pub fn init_detached(log_path: &Path) {
    let dir = log_path.parent().filter(|p| !p.as_os_str().is_empty()).unwrap_or_else(|| Path::new("."));
    let file_name = log_path.file_name().unwrap_or_else(|| std::ffi::OsStr::new("gpd.log"));
    let appender = tracing_appender::rolling::never(dir, file_name);
    tracing_subscriber::fmt().with_env_filter(env_filter()).with_writer(appender).with_ansi(false).init();
}
