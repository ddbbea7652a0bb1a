// SPDX-License-Identifier: MIT

use serde::{Deserialize, Serialize};

use crate::worker::{Timestamp, WorkerInfo};

/// Snapshot of the running master, as published by `GET /status`. Field
/// names and shape are part of the external contract — do not rename
/// without a wire version bump.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RuntimeStatus {
    #[serde(rename = "appFile")]
    pub app_file: String,
    #[serde(rename = "startTime")]
    pub start_time: Timestamp,
    pub workers: Vec<WorkerInfo>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::worker::{WorkerId, WorkerState};

    #[test]
    fn serializes_with_external_contract_field_names() {
        let status = RuntimeStatus {
            app_file: "/srv/app/server.js".to_string(),
            start_time: Timestamp(1_700_000_000_000),
            workers: vec![WorkerInfo {
                id: WorkerId(1),
                pid: 4242,
                state: WorkerState::Ready,
                start_time: Timestamp(1_700_000_000_500),
            }],
        };

        let json = serde_json::to_value(&status).unwrap();
        assert_eq!(json["appFile"], "/srv/app/server.js");
        assert_eq!(json["startTime"], 1_700_000_000_000u64);
        assert_eq!(json["workers"][0]["id"], 1);
        assert_eq!(json["workers"][0]["pid"], 4242);
        assert_eq!(json["workers"][0]["state"], "ready");
        assert_eq!(json["workers"][0]["startTime"], 1_700_000_000_500u64);
    }
}
