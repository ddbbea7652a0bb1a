// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

/// Body returned by `POST /reload`, `POST /stop`, `POST /scale/up`,
/// `POST /scale/down` on success.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct CommandAck {
    pub ok: bool,
    pub command: String,
}

impl CommandAck {
    pub fn new(command: impl Into<String>) -> Self {
        Self { ok: true, command: command.into() }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn serializes_as_external_contract_shape() {
        let ack = CommandAck::new(crate::command_name::RELOAD);
        let json = serde_json::to_value(&ack).unwrap();
        assert_eq!(json, serde_json::json!({"ok": true, "command": "reload"}));
    }
}
