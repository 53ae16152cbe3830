//! # cwatch — Conwatch CLI
//!
//! Live container-status dashboard. Polls the local container runtime and
//! pushes snapshots to every connected browser over WebSockets.

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use clap::Parser;
use conwatch_common::config::ConwatchConfig;
use conwatch_common::constants;
use conwatch_runtime::{CliRuntime, RuntimeClient};
use conwatch_sync::{Poller, SessionRegistry};
use tokio_util::sync::CancellationToken;

/// Live container-status dashboard over WebSockets.
#[derive(Parser, Debug)]
#[command(name = "cwatch", version, about)]
struct Cli {
    /// Address to listen on.
    #[arg(long, env = "CWATCH_LISTEN", default_value = constants::DEFAULT_LISTEN_ADDR)]
    listen: SocketAddr,

    /// Seconds between consecutive runtime polls.
    #[arg(long, env = "CWATCH_POLL_INTERVAL", default_value_t = constants::DEFAULT_POLL_INTERVAL_SECS)]
    poll_interval: u64,

    /// Bound of each observer's outbound snapshot queue.
    #[arg(long, env = "CWATCH_QUEUE_BOUND", default_value_t = constants::DEFAULT_QUEUE_BOUND)]
    queue_bound: usize,

    /// Container runtime binary (auto-detects docker/podman when omitted).
    #[arg(long, env = "CWATCH_RUNTIME")]
    runtime: Option<String>,
}

impl Cli {
    fn into_config(self) -> ConwatchConfig {
        ConwatchConfig {
            listen_addr: self.listen,
            poll_interval: Duration::from_secs(self.poll_interval),
            queue_bound: self.queue_bound,
            runtime_binary: self.runtime,
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let config = Cli::parse().into_config();
    config.validate()?;
    run(config).await
}

async fn run(config: ConwatchConfig) -> anyhow::Result<()> {
    let client: Arc<dyn RuntimeClient> = match &config.runtime_binary {
        Some(binary) => Arc::new(CliRuntime::with_binary(binary)),
        None => Arc::new(CliRuntime::detect()),
    };
    let registry = Arc::new(SessionRegistry::new(config.queue_bound));
    let cancel = CancellationToken::new();

    let poller = Poller::new(
        client,
        Arc::clone(&registry),
        config.poll_interval,
        cancel.clone(),
    );
    let poller_task = tokio::spawn(poller.run());

    let signal_cancel = cancel.clone();
    let _ = tokio::spawn(async move {
        if let Err(error) = tokio::signal::ctrl_c().await {
            tracing::warn!(%error, "failed to listen for shutdown signal");
        }
        tracing::info!("shutdown signal received");
        signal_cancel.cancel();
    });

    conwatch_server::serve(config.listen_addr, Arc::clone(&registry), cancel.clone()).await?;

    // The server stopped: make sure the rest of the system winds down too.
    cancel.cancel();
    registry.close_all();
    poller_task.await?;
    tracing::info!("shutdown complete");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Parses with the `CWATCH_*` variables cleared, so ambient environment
    /// cannot leak into default-value assertions.
    #[allow(unsafe_code)]
    fn parse_isolated<const N: usize>(args: [&str; N]) -> Cli {
        for key in [
            "CWATCH_LISTEN",
            "CWATCH_POLL_INTERVAL",
            "CWATCH_QUEUE_BOUND",
            "CWATCH_RUNTIME",
        ] {
            // Safety: tests here do not touch the environment concurrently.
            unsafe { std::env::remove_var(key) };
        }
        Cli::parse_from(args)
    }

    #[test]
    fn defaults_match_documented_values() {
        let cli = parse_isolated(["cwatch"]);
        assert_eq!(cli.listen.port(), 1111);
        assert_eq!(cli.poll_interval, 2);
        assert_eq!(cli.queue_bound, 8);
        assert!(cli.runtime.is_none());
    }

    #[test]
    fn flags_override_defaults() {
        let cli = parse_isolated([
            "cwatch",
            "--listen",
            "127.0.0.1:8080",
            "--poll-interval",
            "5",
            "--queue-bound",
            "16",
            "--runtime",
            "podman",
        ]);
        let config = cli.into_config();
        assert_eq!(config.listen_addr.port(), 8080);
        assert_eq!(config.poll_interval, Duration::from_secs(5));
        assert_eq!(config.queue_bound, 16);
        assert_eq!(config.runtime_binary.as_deref(), Some("podman"));
    }

    #[test]
    fn zero_poll_interval_fails_validation() {
        let cli = parse_isolated(["cwatch", "--poll-interval", "0"]);
        assert!(cli.into_config().validate().is_err());
    }
}
