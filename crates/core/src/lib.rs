// SPDX-License-Identifier: MIT

//! Core data types for the `gpd` process supervisor.
//!
//! This crate holds the pure, I/O-free shape of the supervisor's data
//! model: worker identifiers, the worker lifecycle state machine, the
//! worker registry, and the runtime status snapshot published over IPC.
//! Nothing here spawns a process, opens a socket, or reads an environment
//! variable — those concerns live in `gpd-daemon`.

mod error;
mod registry;
mod status;
#[cfg(any(test, feature = "test-support"))]
pub mod test_support;
mod worker;

pub use error::RegistryError;
pub use registry::WorkerRegistry;
pub use status::RuntimeStatus;
pub use worker::{Timestamp, WorkerId, WorkerInfo, WorkerState};
