// SPDX-License-Identifier: MIT

//! Process lifecycle: acquiring the PID lock, binding the shared
//! resources, running the command loop, and cleaning up sidecar files on
//! the way out (spec.md §7 "Startup" and "Shutdown").

use std::net::SocketAddr;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use std::time::Duration;

use fs2::FileExt;
use parking_lot::Mutex;
use tracing::{info, warn};

use crate::command::Command;
use crate::control_plane;
use crate::error::LifecycleError;
use crate::ipc;
use crate::listening_socket::SharedListener;
use crate::master::{MasterState, SharedMaster, Tuning};
use crate::supervisor::Supervisor;

/// Sidecar files the master publishes next to the app file's runtime
/// directory so a `gpd` client can find and lock against the daemon
/// without a shared port/PID known in advance (spec.md §7).
pub struct Sidecars {
    pub pid_file: PathBuf,
    pub port_file: PathBuf,
}

/// Everything [`startup`] needs to bring a master up.
pub struct StartupConfig {
    pub app_file: String,
    pub workers: usize,
    pub sidecars: Sidecars,
    pub listen_addr: String,
    pub ipc_addr: SocketAddr,
    pub tuning: Tuning,
}

/// Acquire the PID lock at `path`, reclaiming it if the process that
/// held it is no longer alive (spec.md §7: "a stale lock left by a
/// crashed master must not block the next start"). Returns the open,
/// locked file — it must be kept alive for the process's lifetime, since
/// dropping it releases the lock.
pub fn acquire_pid_lock(path: &Path) -> Result<std::fs::File, LifecycleError> {
    let file = std::fs::OpenOptions::new().create(true).write(true).read(true).truncate(false).open(path)?;

    match file.try_lock_exclusive() {
        Ok(()) => {}
        Err(_) => {
            if !holder_is_alive(path) {
                warn!(path = %path.display(), "reclaiming stale pid lock");
                file.try_lock_exclusive().map_err(|_| LifecycleError::AlreadyRunning(path.to_path_buf()))?;
            } else {
                return Err(LifecycleError::AlreadyRunning(path.to_path_buf()));
            }
        }
    }

    use std::io::{Seek, SeekFrom, Write};
    let mut file = file;
    file.set_len(0)?;
    file.seek(SeekFrom::Start(0))?;
    write!(file, "{}", std::process::id())?;
    file.sync_all()?;
    Ok(file)
}

fn holder_is_alive(path: &Path) -> bool {
    let Ok(contents) = std::fs::read_to_string(path) else { return false };
    let Ok(pid) = contents.trim().parse::<i32>() else { return false };
    nix::sys::signal::kill(nix::unistd::Pid::from_raw(pid), None).is_ok()
}

/// Bring a master fully up: lock the PID file, bind the shared listening
/// socket, spawn the initial worker pool, start the IPC surface and
/// ambient health poller, then run the command loop until a `shutdown`
/// is processed. Returns once the pool has fully drained.
pub async fn startup(config: StartupConfig) -> Result<(), LifecycleError> {
    let _pid_lock = acquire_pid_lock(&config.sidecars.pid_file)?;

    let shared_listener = SharedListener::bind(&config.listen_addr)?;
    info!(addr = shared_listener.addr(), "shared listening socket bound");

    let master: SharedMaster = Arc::new(Mutex::new(MasterState::new(config.app_file.clone(), config.tuning.clone())));

    let mut supervisor = Supervisor::new(master.clone(), Some(shared_listener.try_clone().map_err(LifecycleError::Io)?));
    supervisor.start(config.workers).await.map_err(|_| LifecycleError::SpawnFailed(std::io::Error::other("initial pool failed to become ready")))?;

    let (commands_tx, commands_rx) = control_plane::spawn(16, master.clone());

    let ipc_master = master.clone();
    let ipc_commands = commands_tx.clone();
    let port_file = config.sidecars.port_file.clone();
    let ipc_addr = config.ipc_addr;
    tokio::spawn(async move {
        if let Err(e) = ipc::serve(ipc_addr, ipc_master, ipc_commands, Some(port_file)).await {
            tracing::error!(error = %e, "IPC surface exited");
        }
    });

    if let Some(health_url) = config.tuning.health_url.clone() {
        let interval = config.tuning.health_interval;
        let threshold = config.tuning.health_threshold;
        tokio::spawn(crate::health::run(health_url, interval, threshold));
    }

    let clean_shutdown = run_command_loop(&mut supervisor, commands_rx).await;

    cleanup(&config.sidecars);
    if clean_shutdown {
        Ok(())
    } else {
        Err(LifecycleError::ShutdownTimedOut)
    }
}

/// How often the command loop checks for a worker that exited on its
/// own, outside of any commanded transition (spec.md §4.1 "crash-restart
/// policy", §8 property 6). Short enough that a crash is noticed well
/// within a test's or operator's patience, long enough not to spin.
const CRASH_POLL_INTERVAL: Duration = Duration::from_millis(200);

/// Drain the command stream until a `shutdown` is processed, reaping any
/// worker that exits unexpectedly along the way and forking its
/// replacement (spec.md §4.1, §7 "Unexpected worker exit"). Returns
/// `true` if every worker exited within the global grace timeout,
/// `false` if it elapsed with workers still alive (spec.md §7 "Global
/// shutdown grace expiry" — the caller maps this to a non-zero exit).
async fn run_command_loop(supervisor: &mut Supervisor, mut commands: tokio::sync::mpsc::UnboundedReceiver<Command>) -> bool {
    loop {
        tokio::select! {
            maybe_command = commands.recv() => {
                let Some(command) = maybe_command else { return true };
                let result = match command {
                    Command::Reload => supervisor.reload().await,
                    Command::ScaleUp => supervisor.scale_up().await,
                    Command::ScaleDown => supervisor.scale_down().await,
                    Command::Shutdown => {
                        let outcome = supervisor.shutdown().await;
                        let clean = outcome.is_ok();
                        if let Err(e) = outcome {
                            warn!(error = %e, "shutdown reported an error while draining");
                        }
                        return clean;
                    }
                };
                if let Err(e) = result {
                    warn!(command = %command, error = %e, "command rejected");
                }
            }
            _ = tokio::time::sleep(CRASH_POLL_INTERVAL) => {
                supervisor.reap_crashed().await;
            }
        }
    }
}

fn cleanup(sidecars: &Sidecars) {
    let _ = std::fs::remove_file(&sidecars.pid_file);
    let _ = std::fs::remove_file(&sidecars.port_file);
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn acquire_pid_lock_writes_the_current_pid() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpd.pid");
        let file = acquire_pid_lock(&path).unwrap();
        drop(file);
        let contents = std::fs::read_to_string(&path).unwrap();
        assert_eq!(contents, std::process::id().to_string());
    }

    #[test]
    fn acquire_pid_lock_rejects_a_second_holder() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpd.pid");
        let _first = acquire_pid_lock(&path).unwrap();
        let second = acquire_pid_lock(&path);
        assert!(matches!(second, Err(LifecycleError::AlreadyRunning(_))));
    }

    #[test]
    fn acquire_pid_lock_reclaims_a_stale_lock() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("gpd.pid");
        // A pid that is vanishingly unlikely to be alive on this host.
        std::fs::write(&path, "999999").unwrap();
        let file = acquire_pid_lock(&path);
        assert!(file.is_ok());
    }
}
