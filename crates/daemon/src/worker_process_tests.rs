use super::*;

#[tokio::test]
async fn wait_for_ready_token_returns_true_on_ready_line() {
    let mut worker = WorkerProcess::spawn_shell("echo ready; sleep 5");
    assert!(worker.wait_for_ready_token().await);
    let _ = worker.child.start_kill();
}

#[tokio::test]
async fn wait_for_ready_token_ignores_other_output_first() {
    let mut worker = WorkerProcess::spawn_shell("echo booting; echo ready; sleep 5");
    assert!(worker.wait_for_ready_token().await);
    let _ = worker.child.start_kill();
}

#[tokio::test]
async fn wait_for_ready_token_returns_false_when_stream_closes_first() {
    let mut worker = WorkerProcess::spawn_shell("echo not-ready");
    assert!(!worker.wait_for_ready_token().await);
}

#[tokio::test]
async fn send_shutdown_token_is_observed_by_worker() {
    let mut worker = WorkerProcess::spawn_shell("read line; echo \"got:$line\"");
    worker.send_shutdown_token().await.unwrap();
    let mut out = String::new();
    worker.stdout.read_line(&mut out).await.unwrap();
    assert_eq!(out.trim(), format!("got:{}", token::SHUTDOWN));
}
