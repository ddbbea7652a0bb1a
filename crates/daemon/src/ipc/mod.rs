// SPDX-License-Identifier: MIT

//! The loopback HTTP/JSON IPC surface:
//! `GET /status`, `POST /reload`, `POST /stop`, `POST /scale/up`,
//! `POST /scale/down`. Every mutating route enqueues a [`Command`] onto
//! the shared control-plane stream and acknowledges immediately — the
//! actual lifecycle work happens asynchronously on the Supervisor Core's
//! single command-processing task, never inline in a handler.

use std::net::SocketAddr;
use std::path::{Path, PathBuf};

use axum::extract::State;
use axum::http::StatusCode;
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use gpd_wire::{command_name, CommandAck, ErrorBody, RuntimeStatus};
use tracing::{info, warn};

use crate::command::Command;
use crate::control_plane::CommandSender;
use crate::master::SharedMaster;

#[derive(Clone)]
struct AppState {
    master: SharedMaster,
    commands: CommandSender,
}

pub fn router(master: SharedMaster, commands: CommandSender) -> Router {
    let state = AppState { master, commands };
    Router::new()
        .route("/status", get(get_status))
        .route("/reload", post(post_reload))
        .route("/stop", post(post_stop))
        .route("/scale/up", post(post_scale_up))
        .route("/scale/down", post(post_scale_down))
        .fallback(not_found)
        .with_state(state)
}

async fn get_status(State(state): State<AppState>) -> Json<RuntimeStatus> {
    let master = state.master.lock();
    Json(RuntimeStatus { app_file: master.app_file.clone(), start_time: master.start_time, workers: master.registry.snapshot() })
}

async fn post_reload(State(state): State<AppState>) -> impl IntoResponse {
    enqueue(&state, Command::Reload, command_name::RELOAD)
}

async fn post_stop(State(state): State<AppState>) -> impl IntoResponse {
    // Mark the request immediately, not just once `Command::Shutdown`
    // reaches the front of the queue: a reload already running on the
    // command task polls this flag at its next suspension point and
    // aborts the roll early instead of finishing every worker first.
    state.master.lock().request_shutdown();
    enqueue(&state, Command::Shutdown, command_name::STOP)
}

async fn post_scale_up(State(state): State<AppState>) -> impl IntoResponse {
    enqueue(&state, Command::ScaleUp, command_name::SCALE_UP)
}

async fn post_scale_down(State(state): State<AppState>) -> impl IntoResponse {
    enqueue(&state, Command::ScaleDown, command_name::SCALE_DOWN)
}

fn enqueue(state: &AppState, command: Command, name: &str) -> (StatusCode, Json<CommandAck>) {
    if state.commands.send(command).is_err() {
        warn!(command = name, "control-plane receiver has gone away");
    }
    // spec.md §6 "IPC wire form": every mutating route acknowledges with
    // 200, not 202 — the command is only enqueued here, not yet applied,
    // but the wire contract doesn't distinguish accepted-vs-applied.
    (StatusCode::OK, Json(CommandAck::new(name)))
}

async fn not_found() -> (StatusCode, Json<ErrorBody>) {
    (StatusCode::NOT_FOUND, Json(ErrorBody::new("not found")))
}

/// Serve the IPC surface on `addr`, publishing the bound port to
/// `port_file` so a `gpd` client with no prior knowledge of the port can
/// still find the running daemon. The file is
/// removed on a clean shutdown.
pub async fn serve(addr: SocketAddr, master: SharedMaster, commands: CommandSender, port_file: Option<PathBuf>) -> std::io::Result<()> {
    let listener = tokio::net::TcpListener::bind(addr).await?;
    let bound = listener.local_addr()?;

    if let Some(path) = &port_file {
        write_port_file(path, bound.port())?;
    }
    info!(addr = %bound, "IPC surface listening");

    let app = router(master, commands);
    let result = axum::serve(listener, app).await;

    if let Some(path) = &port_file {
        let _ = std::fs::remove_file(path);
    }
    result
}

fn write_port_file(path: &Path, port: u16) -> std::io::Result<()> {
    std::fs::write(path, port.to_string())
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;
    use std::time::Duration;

    use axum::body::Body;
    use axum::http::Request;
    use parking_lot::Mutex;
    use tokio::sync::mpsc;
    use tower::ServiceExt;

    use super::*;
    use crate::master::{MasterState, Tuning};

    fn tuning() -> Tuning {
        Tuning {
            grace_timeout: Duration::from_secs(30),
            ready_timeout: Duration::from_secs(10),
            ready_poll_interval: Duration::from_millis(500),
            ready_url: None,
            health_url: None,
            health_interval: Duration::from_secs(10),
            health_threshold: 3,
        }
    }

    fn test_router() -> (Router, mpsc::UnboundedReceiver<Command>) {
        let master = Arc::new(Mutex::new(MasterState::new("app.js".to_string(), tuning())));
        let (tx, rx) = mpsc::unbounded_channel();
        (router(master, tx), rx)
    }

    #[tokio::test]
    async fn status_reports_the_app_file() {
        let (router, _rx) = test_router();
        let response =
            router.oneshot(Request::builder().uri("/status").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let body = axum::body::to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let status: RuntimeStatus = serde_json::from_slice(&body).unwrap();
        assert_eq!(status.app_file, "app.js");
        assert!(status.workers.is_empty());
    }

    #[tokio::test]
    async fn reload_enqueues_a_command_and_acknowledges() {
        let (router, mut rx) = test_router();
        let response =
            router.oneshot(Request::builder().method("POST").uri("/reload").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(rx.recv().await, Some(Command::Reload));
    }

    #[tokio::test]
    async fn unknown_route_returns_404_with_error_body() {
        let (router, _rx) = test_router();
        let response =
            router.oneshot(Request::builder().uri("/nope").body(Body::empty()).unwrap()).await.unwrap();
        assert_eq!(response.status(), StatusCode::NOT_FOUND);
    }

    #[tokio::test]
    async fn scale_up_and_scale_down_each_enqueue_their_own_command() {
        let (router, mut rx) = test_router();
        let response = router
            .clone()
            .oneshot(Request::builder().method("POST").uri("/scale/up").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        let response = router
            .oneshot(Request::builder().method("POST").uri("/scale/down").body(Body::empty()).unwrap())
            .await
            .unwrap();
        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(rx.recv().await, Some(Command::ScaleUp));
        assert_eq!(rx.recv().await, Some(Command::ScaleDown));
    }
}
