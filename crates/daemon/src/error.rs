// SPDX-License-Identifier: MIT

use std::path::PathBuf;

use thiserror::Error;

/// Errors from [`crate::lifecycle::startup`] (spec.md §7).
#[derive(Debug, Error)]
pub enum LifecycleError {
    #[error("another master is already running (pid lock held at {0})")]
    AlreadyRunning(PathBuf),

    #[error("failed to spawn initial worker: {0}")]
    SpawnFailed(std::io::Error),

    #[error("failed to bind IPC listener: {0}")]
    IpcBindFailed(std::io::Error),

    #[error("failed to bind shared listening socket on {0}: {1}")]
    ListenBindFailed(String, std::io::Error),

    #[error("io error: {0}")]
    Io(#[from] std::io::Error),

    #[error("global shutdown grace timeout elapsed with workers still alive")]
    ShutdownTimedOut,
}

/// Errors from [`crate::supervisor::Supervisor`] public operations
/// (spec.md §4.1).
#[derive(Debug, Error, Clone, Copy, PartialEq, Eq)]
pub enum SupervisorError {
    #[error("a reload, scale-down, or shutdown is already in progress")]
    TransitionInProgress,

    #[error("shutdown is in progress, no further lifecycle operations are accepted")]
    ShuttingDown,

    #[error("cannot scale down below one worker")]
    MinimumPoolSize,

    #[error("failed to spawn replacement worker")]
    SpawnFailed,

    #[error("global shutdown grace timeout elapsed with workers still alive")]
    ShutdownTimedOut,
}
