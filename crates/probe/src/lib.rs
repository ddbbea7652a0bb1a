// SPDX-License-Identifier: MIT

//! Single-shot transport probe (spec.md §4.5).
//!
//! `probe()` is the only operation this crate exposes: given a URL and a
//! timeout, attempt one HTTP request and report whether a response was
//! obtained at all. It does not retry, does not interpret the response
//! body, and does not schedule itself periodically — the daemon's
//! readiness loop and liveness poller are both just callers that decide
//! when to call `probe()` again.

use std::sync::OnceLock;
use std::time::{Duration, Instant};

use thiserror::Error;

/// Outcome of a single probe attempt.
///
/// `reachable` is true for *any* HTTP-level response, including 4xx/5xx —
/// per spec.md §4.1 step 2, the probe only answers "is the accept loop
/// up", not "did the application like this request". Only a
/// transport-level failure (connection refused, TLS handshake failure,
/// timeout) yields `reachable = false`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ProbeOutcome {
    pub reachable: bool,
    pub status: Option<u16>,
    pub latency_ms: u64,
    pub error: Option<String>,
}

#[derive(Debug, Error)]
pub enum ProbeError {
    #[error("invalid probe url: {0}")]
    InvalidUrl(String),
}

fn client() -> &'static reqwest::Client {
    static CLIENT: OnceLock<reqwest::Client> = OnceLock::new();
    CLIENT.get_or_init(|| {
        reqwest::Client::builder()
            // Readiness/liveness targets are always local-host; accepting a
            // self-signed cert here is not a trust decision about a remote
            // party, it's talking to our own freshly-forked worker.
            .danger_accept_invalid_certs(true)
            .build()
            .unwrap_or_else(|_| reqwest::Client::new())
    })
}

/// Attempt one GET request against `url`, bounded by `timeout`.
///
/// A malformed `url` is reported the same way a transport failure is —
/// `reachable: false` with the reason in `error` — since callers treat
/// every probe outcome uniformly and never branch on [`ProbeError`]
/// directly; validating first just gives that error a precise message
/// instead of whatever `reqwest` would say about a bad request builder.
pub async fn probe(url: &str, timeout: Duration) -> ProbeOutcome {
    if let Err(err) = validate(url) {
        return ProbeOutcome { reachable: false, status: None, latency_ms: 0, error: Some(err.to_string()) };
    }

    let started = Instant::now();
    let result = client().get(url).timeout(timeout).send().await;
    let latency_ms = started.elapsed().as_millis() as u64;

    match result {
        Ok(response) => {
            ProbeOutcome { reachable: true, status: Some(response.status().as_u16()), latency_ms, error: None }
        }
        Err(err) => ProbeOutcome { reachable: false, status: None, latency_ms, error: Some(err.to_string()) },
    }
}

fn validate(url: &str) -> Result<(), ProbeError> {
    if url.starts_with("http://") || url.starts_with("https://") {
        Ok(())
    } else {
        Err(ProbeError::InvalidUrl(url.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn unreachable_host_is_not_reachable() {
        // Port 1 on loopback is reserved and nothing should ever be listening there.
        let outcome = probe("http://127.0.0.1:1/", Duration::from_millis(200)).await;
        assert!(!outcome.reachable);
        assert_eq!(outcome.status, None);
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn unresolvable_host_is_not_reachable() {
        let outcome =
            probe("http://gpd-probe-test.invalid.example/", Duration::from_millis(500)).await;
        assert!(!outcome.reachable);
        assert!(outcome.error.is_some());
    }

    #[tokio::test]
    async fn malformed_url_is_reported_as_unreachable_without_a_network_call() {
        let outcome = probe("not-a-url", Duration::from_millis(200)).await;
        assert!(!outcome.reachable);
        assert!(outcome.error.unwrap().contains("invalid probe url"));
    }
}
