// SPDX-License-Identifier: MIT

//! JSON wire types for the loopback IPC surface.
//!
//! `gpd-daemon`'s IPC Surface and the `gpd` CLI client both depend on
//! this crate so the shape of a response can never drift between the two
//! ends of the same wire.

mod ack;
mod error;

pub use ack::CommandAck;
pub use error::ErrorBody;

/// Names used in [`CommandAck::command`] and the CLI's IPC requests.
/// Kept as plain `&str` constants rather than an enum: the wire contract
/// is the string itself, not a Rust type.
pub mod command_name {
    pub const RELOAD: &str = "reload";
    pub const STOP: &str = "stop";
    pub const SCALE_UP: &str = "scale-up";
    pub const SCALE_DOWN: &str = "scale-down";
}

pub use gpd_core::RuntimeStatus;
