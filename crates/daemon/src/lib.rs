// SPDX-License-Identifier: MIT

//! The `gpd` master process: the Supervisor Core, its Control-Plane
//! Adapter, IPC surface, and process lifecycle.

pub mod command;
pub mod control_plane;
pub mod env;
pub mod error;
pub mod health;
pub mod ipc;
pub mod lifecycle;
pub mod listening_socket;
pub mod master;
pub mod supervisor;
pub mod worker_process;

pub use command::Command;
pub use error::{LifecycleError, SupervisorError};
pub use lifecycle::{Sidecars, StartupConfig};
pub use master::{MasterState, SharedMaster, Transition, Tuning};
pub use supervisor::Supervisor;
