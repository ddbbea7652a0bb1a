// SPDX-License-Identifier: MIT

//! Shared test helpers for use across crates.
//!
//! Gated behind `#[cfg(any(test, feature = "test-support"))]` so
//! `gpd-daemon`'s test suite can build arbitrary worker states without
//! duplicating the strategy here.

use crate::worker::WorkerState;

pub mod strategies {
    use super::WorkerState;
    use proptest::prelude::*;

    pub fn arb_worker_state() -> impl Strategy<Value = WorkerState> {
        prop_oneof![Just(WorkerState::Starting), Just(WorkerState::Ready), Just(WorkerState::Draining)]
    }
}
