//! Remex SDK - Rust Client Library
//!
//! Provides a convenient client for the Remex daemon's Launch / Poll / Stop API.
//!
//! # Example
//!
//! ```no_run
//! use remex_sdk::{RemexClient, LAUNCH_FAILED};
//! use std::time::Duration;
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let client = RemexClient::connect("http://127.0.0.1:9527").await?;
//!
//!     let id = client.launch("uname -a").await?;
//!     if id == LAUNCH_FAILED {
//!         return Err("launch failed".into());
//!     }
//!
//!     let done = client
//!         .wait_for_completion(id, Duration::from_millis(200), Duration::from_secs(10))
//!         .await?;
//!     print!("{}", done.output);
//!     client.stop(id).await?;
//!
//!     Ok(())
//! }
//! ```

mod client;
mod error;
mod output;
mod types;

pub use client::RemexClient;
pub use error::{Result, SdkError, NOT_FOUND_CODE};
pub use output::unprinted_suffix;
pub use types::{LaunchResponse, PollResponse, StatsResponse, StopResponse, LAUNCH_FAILED};
