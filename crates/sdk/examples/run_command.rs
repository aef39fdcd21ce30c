//! Run a single command through the daemon and stream its output
//!
//! # Usage
//!
//! 1. Start the daemon:
//!    ```bash
//!    cargo run --package remex-daemon
//!    ```
//!
//! 2. Run this example:
//!    ```bash
//!    cargo run --example run_command -- "ls -la /tmp"
//!    ```

use remex_sdk::{unprinted_suffix, RemexClient, LAUNCH_FAILED};
use std::io::Write;
use std::time::Duration;

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let command = std::env::args()
        .nth(1)
        .unwrap_or_else(|| "echo hello from remex".to_string());

    let client = RemexClient::connect("http://127.0.0.1:9527").await?;

    let id = client.launch(&command).await?;
    if id == LAUNCH_FAILED {
        return Err(format!("daemon refused to launch '{}'", command).into());
    }
    eprintln!("launched command {}", id);

    // Print only the new suffix of each snapshot
    let mut printed = 0;
    let snapshot = loop {
        let snapshot = client.poll(id).await?;
        let suffix = unprinted_suffix(&snapshot.output, printed, snapshot.finished);
        if !suffix.is_empty() {
            print!("{}", suffix);
            std::io::stdout().flush()?;
            printed += suffix.len();
        }
        if snapshot.finished {
            break snapshot;
        }
        tokio::time::sleep(Duration::from_millis(250)).await;
    };

    eprintln!("exit code: {:?}", snapshot.exit_code);
    client.stop(id).await?;

    Ok(())
}
