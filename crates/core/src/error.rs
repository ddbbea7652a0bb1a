// SPDX-License-Identifier: MIT

use thiserror::Error;

use crate::worker::WorkerId;

/// Errors raised by [`crate::WorkerRegistry`] mutation methods.
///
/// These are all programmer-error-shaped: a caller that respects the
/// registry's contract (insert once, transition a live id, remove once)
/// never sees one. They exist so a bug in the supervisor's command loop
/// surfaces as a typed error rather than a panic.
#[derive(Debug, Error, PartialEq, Eq)]
pub enum RegistryError {
    #[error("worker {0} is not registered")]
    NotFound(WorkerId),
}
