// SPDX-License-Identifier: MIT

//! Fixture worker used by the end-to-end tests in `tests/specs.rs`. Not
//! part of the supervisor itself — stands in for the external
//! application binary the real core only ever talks to through spawn,
//! the `ready`/`shutdown` token channel, and process-exit events.
//!
//! `GPD_TEST_WORKER_MODE=token` (default): announce readiness over the
//! in-band token channel immediately.
//! `GPD_TEST_WORKER_MODE=probe`: open a throwaway TCP listener, print its
//! port as `PROBE_PORT:<port>` on stdout, and answer every connection
//! with a bare HTTP 404 — never emitting the `ready` token, so only the
//! readiness probe can mark this worker ready.

use std::io::{BufRead, Write};
use std::net::TcpListener;

fn main() {
    let mode = std::env::var("GPD_TEST_WORKER_MODE").unwrap_or_else(|_| "token".to_string());

    match mode.as_str() {
        "probe" => run_probe_mode(),
        _ => run_token_mode(),
    }

    wait_for_shutdown_token();
}

fn run_token_mode() {
    println!("ready");
    std::io::stdout().flush().ok();
}

fn run_probe_mode() {
    let addr = std::env::var("GPD_TEST_WORKER_PROBE_PORT")
        .ok()
        .map(|p| format!("127.0.0.1:{p}"))
        .unwrap_or_else(|| "127.0.0.1:0".to_string());
    let listener = TcpListener::bind(addr).expect("bind probe listener");
    let port = listener.local_addr().expect("local addr").port();
    println!("PROBE_PORT:{port}");
    std::io::stdout().flush().ok();

    std::thread::spawn(move || {
        for stream in listener.incoming().flatten() {
            let mut stream = stream;
            let _ = stream.write_all(b"HTTP/1.1 404 Not Found\r\ncontent-length: 0\r\n\r\n");
        }
    });
}

fn wait_for_shutdown_token() {
    let stdin = std::io::stdin();
    for line in stdin.lock().lines().map_while(Result::ok) {
        if line.trim() == "shutdown" {
            std::process::exit(0);
        }
    }
    // stdin closed without a shutdown token: keep the process alive so
    // external-kill scenarios (crash-restart tests) can still observe it.
    loop {
        std::thread::sleep(std::time::Duration::from_secs(3600));
    }
}
