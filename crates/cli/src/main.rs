//! Remex CLI - Command-line interface for the Remex daemon

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use colored::Colorize;
use serde::{Deserialize, Serialize};
use serde_json::json;
use std::io::Write;
use std::time::Duration;
use tabled::{Table, Tabled};

const DEFAULT_RPC_URL: &str = "http://127.0.0.1:9527";
const LAUNCH_FAILED: i64 = -1;

#[derive(Parser)]
#[command(name = "remex")]
#[command(about = "Remote command executor CLI", long_about = None)]
#[command(version)]
struct Cli {
    #[command(subcommand)]
    command: Commands,

    /// RPC server URL
    #[arg(long, env = "REMEX_RPC_URL", default_value = DEFAULT_RPC_URL)]
    rpc_url: String,
}

#[derive(Subcommand)]
enum Commands {
    /// Launch a shell command and print its id
    Launch {
        /// Command line, passed to the daemon's shell as one string
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Print everything a command has written so far
    Poll {
        /// Command ID
        command_id: i64,
    },

    /// Stop a command and release its id
    Stop {
        /// Command ID
        command_id: i64,
    },

    /// Launch, stream output until it finishes, then release it
    Run {
        /// Poll interval in milliseconds
        #[arg(short, long, default_value = "250")]
        interval_ms: u64,

        /// Command line, passed to the daemon's shell as one string
        #[arg(required = true, trailing_var_arg = true, allow_hyphen_values = true)]
        command: Vec<String>,
    },

    /// Show daemon status
    Status,
}

#[derive(Serialize)]
struct JsonRpcRequest {
    jsonrpc: String,
    method: String,
    params: serde_json::Value,
    id: u64,
}

#[derive(Deserialize)]
struct JsonRpcResponse {
    #[allow(dead_code)]
    jsonrpc: String,
    #[allow(dead_code)]
    id: u64,
    result: Option<serde_json::Value>,
    error: Option<JsonRpcError>,
}

#[derive(Deserialize)]
struct JsonRpcError {
    code: i32,
    message: String,
}

#[derive(Deserialize)]
struct PollResult {
    output: String,
    finished: bool,
    exit_code: Option<i32>,
}

#[derive(Deserialize, Tabled)]
struct StatsResult {
    capacity: usize,
    tracked: usize,
    active: usize,
    finished: usize,
    launched_total: u64,
    uptime_seconds: u64,
}

async fn call_rpc(url: &str, method: &str, params: serde_json::Value) -> Result<serde_json::Value> {
    let request = JsonRpcRequest {
        jsonrpc: "2.0".to_string(),
        method: method.to_string(),
        params,
        id: 1,
    };

    let client = reqwest::Client::new();
    let response: JsonRpcResponse = client
        .post(url)
        .json(&request)
        .send()
        .await
        .context("Failed to connect to daemon")?
        .json()
        .await
        .context("Failed to parse response")?;

    if let Some(error) = response.error {
        anyhow::bail!("RPC error ({}): {}", error.code, error.message);
    }

    response
        .result
        .ok_or_else(|| anyhow::anyhow!("No result in response"))
}

async fn launch(url: &str, command: &[String]) -> Result<i64> {
    let command = command.join(" ");
    let result = call_rpc(url, "command.launch.v1", json!({ "command": command })).await?;
    let command_id = result["command_id"]
        .as_i64()
        .context("Malformed launch response")?;

    if command_id == LAUNCH_FAILED {
        anyhow::bail!("Daemon could not launch '{}'", command);
    }
    Ok(command_id)
}

async fn poll(url: &str, command_id: i64) -> Result<PollResult> {
    let result = call_rpc(url, "command.poll.v1", json!({ "command_id": command_id })).await?;
    serde_json::from_value(result).context("Malformed poll response")
}

async fn stop(url: &str, command_id: i64) -> Result<()> {
    call_rpc(url, "command.stop.v1", json!({ "command_id": command_id })).await?;
    Ok(())
}

/// Portion of `output` not yet printed
///
/// A trailing replacement character on a running command may be a split
/// multi-byte sequence, so it is held back until more output arrives.
fn unprinted_suffix(output: &str, printed: usize, finished: bool) -> &str {
    let visible = if finished {
        output
    } else {
        output.trim_end_matches('\u{fffd}')
    };
    visible.get(printed..).unwrap_or("")
}

fn print_exit(exit_code: Option<i32>) {
    match exit_code {
        Some(0) => eprintln!("{}", "✓ exited with code 0".green().bold()),
        Some(code) => eprintln!("{}", format!("✗ exited with code {}", code).red().bold()),
        None => eprintln!("{}", "✗ terminated by signal".red().bold()),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    match cli.command {
        Commands::Launch { command } => {
            let command_id = launch(&cli.rpc_url, &command).await?;
            println!("{}", command_id);
        }

        Commands::Poll { command_id } => {
            let result = poll(&cli.rpc_url, command_id).await?;
            print!("{}", result.output);
            std::io::stdout().flush()?;

            if result.finished {
                print_exit(result.exit_code);
            } else {
                eprintln!("{}", "… still running".yellow());
            }
        }

        Commands::Stop { command_id } => {
            stop(&cli.rpc_url, command_id).await?;
            eprintln!("{}", format!("✓ Command {} stopped", command_id).green().bold());
        }

        Commands::Run {
            interval_ms,
            command,
        } => {
            let command_id = launch(&cli.rpc_url, &command).await?;
            let interval = Duration::from_millis(interval_ms.max(1));

            let mut printed = 0;
            let exit_code = loop {
                let result = poll(&cli.rpc_url, command_id).await?;
                let suffix = unprinted_suffix(&result.output, printed, result.finished);
                if !suffix.is_empty() {
                    print!("{}", suffix);
                    std::io::stdout().flush()?;
                    printed += suffix.len();
                }
                if result.finished {
                    break result.exit_code;
                }
                tokio::time::sleep(interval).await;
            };

            stop(&cli.rpc_url, command_id).await?;
            print_exit(exit_code);
            if exit_code != Some(0) {
                std::process::exit(exit_code.unwrap_or(1));
            }
        }

        Commands::Status => {
            println!("{}", "System Status".cyan().bold());
            println!();

            match call_rpc(&cli.rpc_url, "admin.stats.v1", json!({})).await {
                Ok(stats) => {
                    println!("  {} {}", "RPC URL:".bold(), cli.rpc_url);
                    println!("  {} {}", "Status:".bold(), "ONLINE".green());
                    println!();

                    let stats: StatsResult =
                        serde_json::from_value(stats).context("Malformed stats response")?;
                    println!("{}", Table::new(vec![stats]));
                }
                Err(e) => {
                    println!("  {} {}", "Status:".bold(), "ERROR".red());
                    println!("  {} {}", "Error:".bold(), e);
                }
            }
        }
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_suffix_after_previous_print() {
        assert_eq!(unprinted_suffix("abc\ndef\n", 4, false), "def\n");
        assert_eq!(unprinted_suffix("abc", 3, false), "");
    }

    #[test]
    fn test_trailing_replacement_held_back_until_finished() {
        assert_eq!(unprinted_suffix("ab\u{fffd}", 0, false), "ab");
        assert_eq!(unprinted_suffix("ab\u{fffd}", 2, true), "\u{fffd}");
    }

    #[test]
    fn test_cli_parses_trailing_command() {
        let cli = Cli::parse_from(["remex", "run", "ls", "-la", "/tmp"]);
        match cli.command {
            Commands::Run {
                command,
                interval_ms,
            } => {
                assert_eq!(command, vec!["ls", "-la", "/tmp"]);
                assert_eq!(interval_ms, 250);
            }
            _ => panic!("expected run"),
        }
    }
}
