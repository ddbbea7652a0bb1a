// SPDX-License-Identifier: MIT

//! The Control-Plane Adapter (spec.md §4.4): merges OS signals and
//! IPC-originated requests into the single ordered [`Command`] stream the
//! Supervisor Core drains.

use tokio::signal::unix::{signal, SignalKind};
use tokio::sync::mpsc;
use tracing::info;

use crate::command::Command;
use crate::master::SharedMaster;

/// A handle IPC handlers use to enqueue a command onto the shared
/// stream, without needing to know anything about signal handling.
pub type CommandSender = mpsc::UnboundedSender<Command>;

/// Spawns the task that listens for `SIGHUP` (reload) and `SIGTERM` /
/// `SIGINT` (shutdown) and forwards them onto `tx` (spec.md §4.4
/// "signals"). Returns the `tx` half so IPC handlers can enqueue
/// commands onto the same receiver the signal task feeds. `master` lets a
/// terminating signal mark the shutdown request immediately, the same way
/// the IPC `/stop` handler does, so an in-flight reload observes it at its
/// next suspension point rather than waiting for the signal's `Shutdown`
/// command to reach the front of the queue.
pub fn spawn(rx_buffer: usize, master: SharedMaster) -> (CommandSender, mpsc::UnboundedReceiver<Command>) {
    let _ = rx_buffer; // unbounded: commands are rare, bounding buys nothing here.
    let (tx, rx) = mpsc::unbounded_channel();
    spawn_signal_forwarder(tx.clone(), master);
    (tx, rx)
}

fn spawn_signal_forwarder(tx: CommandSender, master: SharedMaster) {
    tokio::spawn(async move {
        let mut hangup = match signal(SignalKind::hangup()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGHUP handler");
                return;
            }
        };
        let mut terminate = match signal(SignalKind::terminate()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGTERM handler");
                return;
            }
        };
        let mut interrupt = match signal(SignalKind::interrupt()) {
            Ok(s) => s,
            Err(e) => {
                tracing::error!(error = %e, "failed to install SIGINT handler");
                return;
            }
        };

        loop {
            tokio::select! {
                _ = hangup.recv() => {
                    info!("received SIGHUP, enqueuing reload");
                    if tx.send(Command::Reload).is_err() {
                        break;
                    }
                }
                _ = terminate.recv() => {
                    info!("received SIGTERM, enqueuing shutdown");
                    master.lock().request_shutdown();
                    let _ = tx.send(Command::Shutdown);
                    break;
                }
                _ = interrupt.recv() => {
                    info!("received SIGINT, enqueuing shutdown");
                    master.lock().request_shutdown();
                    let _ = tx.send(Command::Shutdown);
                    break;
                }
            }
        }
    });
}
