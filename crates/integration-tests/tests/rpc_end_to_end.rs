//! Launch / Poll / Stop through the JSON-RPC server and the SDK client

#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use jsonrpsee::server::ServerHandle;
use remex_api_rpc::{RpcServer, RpcServerConfig};
use remex_core::{CommandManager, ManagerConfig};
use remex_infra_system::ShellLauncher;
use remex_sdk::{RemexClient, SdkError, LAUNCH_FAILED};

/// The server stops when the returned handle is dropped
async fn start_daemon(max_commands: usize) -> (ServerHandle, RemexClient) {
    let config = ManagerConfig::default().with_max_commands(max_commands);
    let manager = Arc::new(CommandManager::new(config, Arc::new(ShellLauncher::new())).unwrap());

    let rpc_config = RpcServerConfig {
        host: "127.0.0.1".to_string(),
        port: 0,
    };
    let (handle, addr) = RpcServer::new(rpc_config, manager).start().await.unwrap();
    let client = RemexClient::connect(format!("http://{}", addr))
        .await
        .unwrap();

    (handle, client)
}

#[tokio::test]
async fn test_launch_poll_stop_roundtrip() {
    let (_server, client) = start_daemon(4).await;

    let id = client.launch("echo hello").await.unwrap();
    assert!(id > 0);

    let done = client
        .wait_for_completion(id, Duration::from_millis(20), Duration::from_secs(10))
        .await
        .unwrap();
    assert!(done.output.ends_with("hello\n"));
    assert_eq!(done.output_bytes, done.output.len());
    assert_eq!(done.exit_code, Some(0));

    let stopped = client.stop(id).await.unwrap();
    assert!(stopped.stopped);

    let err = client.poll(id).await.unwrap_err();
    assert!(err.is_not_found(), "unexpected error: {}", err);
}

#[tokio::test]
async fn test_launch_failures_return_sentinel() {
    let (_server, client) = start_daemon(1).await;

    let running = client.launch("sleep 30").await.unwrap();
    assert!(running > 0);

    assert_eq!(client.launch("sleep 30").await.unwrap(), LAUNCH_FAILED);
    assert_eq!(client.launch("").await.unwrap(), LAUNCH_FAILED);

    client.stop(running).await.unwrap();
    let next = client.launch("true").await.unwrap();
    assert!(next > running);
    client.stop(next).await.unwrap();
}

#[tokio::test]
async fn test_stop_unknown_id_is_not_found() {
    let (_server, client) = start_daemon(2).await;

    let err = client.stop(404).await.unwrap_err();
    assert!(matches!(err, SdkError::Rpc { code: 4001, .. }));
}

#[tokio::test]
async fn test_stats_reflect_table() {
    let (_server, client) = start_daemon(3).await;

    let id = client.launch("sleep 30").await.unwrap();
    let stats = client.stats().await.unwrap();
    assert_eq!(stats.capacity, 3);
    assert_eq!(stats.tracked, 1);
    assert_eq!(stats.active, 1);
    assert_eq!(stats.launched_total, 1);

    client.stop(id).await.unwrap();
    assert_eq!(client.stats().await.unwrap().tracked, 0);
}
