// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Body returned for 404 (unknown route) and 5xx (no handler registered)
/// responses.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ErrorBody {
    pub error: String,
}

impl ErrorBody {
    pub fn new(message: impl Into<String>) -> Self {
        Self { error: message.into() }
    }
}
