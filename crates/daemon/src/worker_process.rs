// SPDX-License-Identifier: MIT

//! Spawning and talking to a single worker child process.
//!
//! Each worker inherits stderr (so its logs interleave with the master's
//! on the controlling terminal or log file), gets a piped stdin/stdout
//! pair for the in-band `ready` / `shutdown` token protocol, and — when a
//! shared listening socket is configured — a duplicate of that socket's
//! descriptor at [`crate::env::LISTEN_FD`].

use std::net::TcpListener as StdTcpListener;
use std::process::Stdio;

use command_fds::{CommandFdExt, FdMapping};
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::process::{Child, Command};

use crate::env;
use crate::error::LifecycleError;

/// The in-band readiness/shutdown token a worker writes to its stdout
/// and reads from its stdin.
pub mod token {
    pub const READY: &str = "ready";
    pub const SHUTDOWN: &str = "shutdown";
}

/// A running worker child and the handles needed to talk to it.
pub struct WorkerProcess {
    pub child: Child,
    pub pid: u32,
    stdin: tokio::process::ChildStdin,
    stdout: BufReader<tokio::process::ChildStdout>,
}

impl WorkerProcess {
    /// Spawn `app_file` as a worker, optionally handing it a duplicate of
    /// `listener`'s descriptor so it can `accept()` off the same queue as
    /// every other live generation.
    pub fn spawn(app_file: &str, listener: Option<&StdTcpListener>) -> Result<Self, LifecycleError> {
        let mut command = Command::new(app_file);
        command.stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::inherit());

        if let Some(listener) = listener {
            let dup = listener.try_clone().map_err(LifecycleError::Io)?;
            let owned: std::os::fd::OwnedFd = dup.into();
            command
                .as_std_mut()
                .fd_mappings(vec![FdMapping { parent_fd: owned, child_fd: env::LISTEN_FD }])
                .map_err(|e| LifecycleError::SpawnFailed(std::io::Error::other(e.to_string())))?;
            command.env(env::LISTEN_FD_VAR, env::LISTEN_FD.to_string());
        }

        let mut child = command.spawn().map_err(LifecycleError::SpawnFailed)?;
        let pid = child.id().ok_or_else(|| {
            LifecycleError::SpawnFailed(std::io::Error::other("worker exited before its pid could be read"))
        })?;
        let stdin = child.stdin.take().ok_or_else(|| {
            LifecycleError::SpawnFailed(std::io::Error::other("worker stdin was not piped"))
        })?;
        let stdout = BufReader::new(child.stdout.take().ok_or_else(|| {
            LifecycleError::SpawnFailed(std::io::Error::other("worker stdout was not piped"))
        })?);

        Ok(Self { child, pid, stdin, stdout })
    }

    /// Block until the worker writes [`token::READY`] on stdout, or the
    /// stream closes first (the worker exited or never wrote the token).
    /// Any other line is ignored — workers may log freely on stdout
    /// before becoming ready.
    pub async fn wait_for_ready_token(&mut self) -> bool {
        let mut line = String::new();
        loop {
            line.clear();
            match self.stdout.read_line(&mut line).await {
                Ok(0) => return false,
                Ok(_) => {
                    if line.trim() == token::READY {
                        return true;
                    }
                }
                Err(_) => return false,
            }
        }
    }

    /// Write the `shutdown` token to the worker's stdin, asking it to
    /// drain and exit on its own before the grace timeout elapses.
    pub async fn send_shutdown_token(&mut self) -> std::io::Result<()> {
        self.stdin.write_all(format!("{}\n", token::SHUTDOWN).as_bytes()).await?;
        self.stdin.flush().await
    }

    /// Wait for the child to exit, reaping it.
    pub async fn wait(&mut self) -> std::io::Result<std::process::ExitStatus> {
        self.child.wait().await
    }
}

#[cfg(test)]
impl WorkerProcess {
    /// Test-only constructor that spawns a shell script directly instead
    /// of routing through [`Self::spawn`], which only accepts a bare
    /// executable path. Lets tests stand in a fake worker without a real
    /// worker binary on disk.
    fn spawn_shell(script: &str) -> Self {
        let mut command = Command::new("/bin/sh");
        command.arg("-c").arg(script).stdin(Stdio::piped()).stdout(Stdio::piped()).stderr(Stdio::inherit());
        let mut child = command.spawn().expect("spawn failed");
        let pid = child.id().expect("pid");
        let stdin = child.stdin.take().expect("piped stdin");
        let stdout = BufReader::new(child.stdout.take().expect("piped stdout"));
        Self { child, pid, stdin, stdout }
    }
}

#[cfg(test)]
#[path = "worker_process_tests.rs"]
mod tests;
