//! prompt-proxy e2e runner
//!
//! Starts a mock Gemini, generates a proxy config pointing at it with a
//! file-mounted API key, spawns the real proxy binary and drives both
//! routes over HTTP.
//!
//!   cargo run                          # every test
//!   cargo run -- --filter errors/      # a subset
//!   cargo run -- --list
//!   cargo run -- --proxy-bin PATH --proxy-logs

mod backend;
mod client;
mod harness;
mod runner;
mod tests;
mod types;

use clap::Parser;
use colored::Colorize;
use std::path::PathBuf;

use harness::Harness;
use runner::{list_tests, run_tests, TestContext};
use tests::all_tests;

/// Proxy binary candidates, tried in order
const DEFAULT_PROXY_BINS: &[&str] = &["../target/release/prompt-proxy", "../target/debug/prompt-proxy"];

#[derive(Parser)]
#[command(name = "e2e", about = "End-to-end tests for prompt-proxy")]
struct Cli {
    /// prompt-proxy binary (default: ../target/release, then ../target/debug)
    #[arg(long)]
    proxy_bin: Option<PathBuf>,

    /// Only run tests whose name contains this string
    #[arg(long, short)]
    filter: Option<String>,

    /// List tests and exit
    #[arg(long)]
    list: bool,

    /// Show the proxy's own log output
    #[arg(long)]
    proxy_logs: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();
    let cases = all_tests();

    if cli.list {
        list_tests(&cases);
        return Ok(());
    }

    let proxy_bin = match cli.proxy_bin {
        Some(path) => path,
        None => find_proxy_bin()?,
    };

    let harness = Harness::start(&proxy_bin, cli.proxy_logs).await?;
    let ctx = TestContext::new(&harness, client::build_client());

    let report = run_tests(&cases, &ctx, cli.filter.as_deref()).await;
    harness.shutdown().await;

    if !report.all_passed() {
        std::process::exit(1);
    }
    Ok(())
}

fn find_proxy_bin() -> anyhow::Result<PathBuf> {
    DEFAULT_PROXY_BINS
        .iter()
        .copied()
        .map(PathBuf::from)
        .find(|candidate| candidate.exists())
        .inspect(|found| println!("Using proxy binary: {}", found.display().to_string().bright_cyan()))
        .ok_or_else(|| {
            anyhow::anyhow!(
                "No proxy binary found. Tried: {}\nBuild with: cd .. && cargo build --release",
                DEFAULT_PROXY_BINS.join(", ")
            )
        })
}
