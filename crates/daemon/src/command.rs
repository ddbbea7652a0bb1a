// SPDX-License-Identifier: MIT

use std::fmt;

/// A lifecycle command, as funneled through the Control-Plane Adapter
/// into the Supervisor Core's single ordered queue (spec.md §4.4).
///
/// Duplicate commands are permitted on the wire; the core's idempotence
/// guards (invariant 4) decide what happens when one arrives while a
/// transition is already active.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Command {
    Reload,
    ScaleUp,
    ScaleDown,
    /// Graceful drain-and-exit of the whole pool. There is no separate
    /// force-kill variant; escalation to SIGKILL after the grace timeout
    /// happens per worker inside the shutdown drain loop, not as a
    /// distinct queued command.
    Shutdown,
}

impl fmt::Display for Command {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            Command::Reload => "reload",
            Command::ScaleUp => "scale-up",
            Command::ScaleDown => "scale-down",
            Command::Shutdown => "shutdown",
        };
        write!(f, "{s}")
    }
}
