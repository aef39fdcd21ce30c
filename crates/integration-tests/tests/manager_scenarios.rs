//! Command manager scenarios against real `/bin/sh` processes

#![cfg(unix)]

use std::sync::Arc;
use std::time::Duration;

use remex_core::{AppError, CommandId, CommandManager, CommandSnapshot, ManagerConfig};
use remex_infra_system::ShellLauncher;
use tokio_test::{assert_err, assert_ok};

fn manager(max_commands: usize) -> CommandManager {
    let config = ManagerConfig::default()
        .with_max_commands(max_commands)
        .with_stop_timeout(Duration::from_secs(2));
    CommandManager::new(config, Arc::new(ShellLauncher::new())).unwrap()
}

async fn wait_finished(manager: &CommandManager, id: CommandId) -> CommandSnapshot {
    let deadline = tokio::time::Instant::now() + Duration::from_secs(10);
    loop {
        let snapshot = manager.poll(id).unwrap();
        if snapshot.finished {
            return snapshot;
        }
        assert!(
            tokio::time::Instant::now() < deadline,
            "command {} did not finish",
            id
        );
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
}

#[tokio::test]
async fn test_echo_output_and_exit() {
    let manager = manager(4);

    let id = assert_ok!(manager.launch("echo hello").await);
    assert!(id > 0);

    let snapshot = wait_finished(&manager, id).await;
    assert!(snapshot.output.ends_with(b"hello\n"));
    assert_eq!(snapshot.exit_code, Some(0));

    // Finished commands stay pollable until stopped
    assert_eq!(manager.poll(id).unwrap().output, snapshot.output);
    assert_ok!(manager.stop(id).await);
    assert!(matches!(manager.poll(id), Err(AppError::NotFound(_))));
}

#[tokio::test]
async fn test_stderr_is_merged_with_stdout() {
    let manager = manager(4);

    let id = manager
        .launch("echo out; echo err 1>&2; exit 7")
        .await
        .unwrap();
    let snapshot = wait_finished(&manager, id).await;

    let text = String::from_utf8_lossy(&snapshot.output);
    assert!(text.contains("out\n"));
    assert!(text.contains("err\n"));
    assert_eq!(snapshot.exit_code, Some(7));
}

#[tokio::test]
async fn test_successive_polls_extend_prefix() {
    let manager = manager(4);

    let id = manager
        .launch("i=0; while [ $i -lt 5 ]; do echo tick $i; i=$((i+1)); sleep 0.1; done")
        .await
        .unwrap();

    let mut previous = Vec::new();
    let mut grew = 0;
    loop {
        let snapshot = manager.poll(id).unwrap();
        assert!(
            snapshot.output.starts_with(&previous),
            "later snapshot must extend the earlier one"
        );
        if snapshot.output.len() > previous.len() {
            grew += 1;
        }
        previous = snapshot.output;
        if snapshot.finished {
            break;
        }
        tokio::time::sleep(Duration::from_millis(30)).await;
    }

    assert!(grew >= 2, "output should arrive incrementally");
    assert!(String::from_utf8_lossy(&previous).contains("tick 4\n"));
    manager.stop(id).await.unwrap();
}

#[tokio::test]
async fn test_stop_running_command_releases_id() {
    let manager = manager(4);

    let id = manager.launch("sleep 30").await.unwrap();
    let started = tokio::time::Instant::now();
    assert_ok!(manager.stop(id).await);
    assert!(started.elapsed() < Duration::from_secs(5));

    assert!(matches!(manager.poll(id), Err(AppError::NotFound(_))));
    assert!(matches!(manager.stop(id).await, Err(AppError::NotFound(_))));
    assert_eq!(manager.stats().tracked, 0);
}

#[tokio::test]
async fn test_full_table_then_reuse_with_fresh_id() {
    let manager = manager(2);

    let first = manager.launch("sleep 30").await.unwrap();
    let second = manager.launch("sleep 30").await.unwrap();
    assert_err!(manager.launch("sleep 30").await);

    manager.stop(first).await.unwrap();
    let third = manager.launch("echo again").await.unwrap();
    assert!(third > second, "ids are never reused");

    let snapshot = wait_finished(&manager, third).await;
    assert!(snapshot.output.ends_with(b"again\n"));

    manager.shutdown().await;
    assert_eq!(manager.stats().tracked, 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_concurrent_commands_keep_separate_output() {
    let manager = Arc::new(manager(8));

    let mut ids = Vec::new();
    for name in ["alpha", "beta", "gamma", "delta"] {
        let command = format!("for i in 1 2 3; do echo {}; sleep 0.05; done", name);
        ids.push((name, manager.launch(&command).await.unwrap()));
    }

    for (name, id) in ids {
        let snapshot = wait_finished(&manager, id).await;
        let text = String::from_utf8_lossy(&snapshot.output).into_owned();
        assert_eq!(text, format!("{0}\n{0}\n{0}\n", name));
        manager.stop(id).await.unwrap();
    }
}

#[tokio::test]
async fn test_unknown_shell_is_launch_failure() {
    let config = ManagerConfig::default().with_max_commands(1);
    let launcher = ShellLauncher::with_shell("/nonexistent/remex-shell");
    let manager = CommandManager::new(config, Arc::new(launcher)).unwrap();

    let err = manager.launch("echo hi").await.unwrap_err();
    assert!(err.is_launch_failure());

    // The slot came back even though an id was consumed
    let stats = manager.stats();
    assert_eq!(stats.tracked, 0);
}
