//! Remex Client Implementation

use crate::error::{Result, SdkError};
use crate::types::{LaunchResponse, PollResponse, StatsResponse, StopResponse};
use jsonrpsee::core::client::ClientT;
use jsonrpsee::core::params::ObjectParams;
use jsonrpsee::http_client::{HttpClient, HttpClientBuilder};
use jsonrpsee::rpc_params;
use std::time::Duration;

/// Remex daemon client
///
/// Provides a high-level interface to launch, poll and stop remote commands.
///
/// # Example
///
/// ```no_run
/// use remex_sdk::RemexClient;
///
/// # async fn example() -> Result<(), Box<dyn std::error::Error>> {
/// let client = RemexClient::connect("http://127.0.0.1:9527").await?;
/// let id = client.launch("echo hello").await?;
/// let snapshot = client.poll(id).await?;
/// print!("{}", snapshot.output);
/// # Ok(())
/// # }
/// ```
pub struct RemexClient {
    client: HttpClient,
}

impl RemexClient {
    /// Connect to the Remex daemon
    ///
    /// # Arguments
    ///
    /// * `url` - RPC endpoint URL (e.g., `http://127.0.0.1:9527`)
    pub async fn connect(url: impl AsRef<str>) -> Result<Self> {
        let url = url.as_ref();

        let client = HttpClientBuilder::default()
            .request_timeout(Duration::from_secs(30))
            .build(url)
            .map_err(|e| SdkError::Connection(format!("Failed to create client: {}", e)))?;

        Ok(Self { client })
    }

    /// Launch a shell command
    ///
    /// Returns the command id, or [`LAUNCH_FAILED`](crate::LAUNCH_FAILED) when
    /// the daemon started nothing (table full, rejected text, spawn failure).
    pub async fn launch(&self, command: impl Into<String>) -> Result<i64> {
        let mut params = ObjectParams::new();
        params.insert("command", command.into())?;
        let response: LaunchResponse = self.client.request("command.launch.v1", params).await?;

        Ok(response.command_id)
    }

    /// Fetch the full output captured so far
    pub async fn poll(&self, command_id: i64) -> Result<PollResponse> {
        let response: PollResponse = self
            .client
            .request("command.poll.v1", id_params(command_id)?)
            .await?;

        Ok(response)
    }

    /// Stop a command and release its id
    pub async fn stop(&self, command_id: i64) -> Result<StopResponse> {
        let response: StopResponse = self
            .client
            .request("command.stop.v1", id_params(command_id)?)
            .await?;

        Ok(response)
    }

    /// Daemon table statistics
    pub async fn stats(&self) -> Result<StatsResponse> {
        let response: StatsResponse = self.client.request("admin.stats.v1", rpc_params![]).await?;

        Ok(response)
    }

    /// Poll every `interval` until the command finishes or `timeout` elapses
    ///
    /// The command stays tracked afterwards; call [`stop`](Self::stop) to release it.
    pub async fn wait_for_completion(
        &self,
        command_id: i64,
        interval: Duration,
        timeout: Duration,
    ) -> Result<PollResponse> {
        let deadline = tokio::time::Instant::now() + timeout;
        loop {
            let snapshot = self.poll(command_id).await?;
            if snapshot.finished {
                return Ok(snapshot);
            }
            if tokio::time::Instant::now() + interval > deadline {
                return Err(SdkError::Timeout(command_id));
            }
            tokio::time::sleep(interval).await;
        }
    }
}

fn id_params(command_id: i64) -> Result<ObjectParams> {
    let mut params = ObjectParams::new();
    params.insert("command_id", command_id)?;
    Ok(params)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_connect_rejects_bad_url() {
        let result = RemexClient::connect("not a url").await;
        assert!(matches!(result, Err(SdkError::Connection(_))));
    }

    #[test]
    fn test_id_params_are_named() {
        use jsonrpsee::core::traits::ToRpcParams;

        let raw = id_params(42).unwrap().to_rpc_params().unwrap().unwrap();
        assert_eq!(raw.get(), r#"{"command_id":42}"#);
    }
}
