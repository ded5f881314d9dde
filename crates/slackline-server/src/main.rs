//! Slackline — entry point.
//!
//! Serves a fixed set of Slack operations and a log-file reader over
//! MCP, on stdio by default or SSE with `--transport sse`.

use anyhow::{Context, Result};
use clap::Parser;
use tracing::info;

use slackline_core::{ServerConfig, Transport};
use slackline_server::{build_registry, run_sse, run_stdio, McpServer};

// ─────────────────────────────────────────────
// CLI definition
// ─────────────────────────────────────────────

/// Slack MCP server driving a browser-session identity
#[derive(Parser)]
#[command(name = "slackline", version, about, long_about = None)]
struct Cli {
    /// Transport to serve on: "stdio" or "sse". Overrides MCP_TRANSPORT.
    #[arg(short, long)]
    transport: Option<String>,

    /// Bind address for the SSE transport. Overrides SLACKLINE_BIND_ADDR.
    #[arg(short, long)]
    bind: Option<String>,

    /// Enable debug logging
    #[arg(long, default_value_t = false)]
    logs: bool,
}

// ─────────────────────────────────────────────
// Entrypoint
// ─────────────────────────────────────────────

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();
    init_logging(cli.logs);

    let mut config = ServerConfig::from_env().context("configuration error")?;
    if let Some(transport) = &cli.transport {
        config.transport = transport
            .parse()
            .map_err(|e: String| anyhow::anyhow!(e))
            .context("invalid --transport")?;
    }
    if let Some(bind) = cli.bind {
        config.bind_addr = bind;
    }

    let registry = build_registry(&config);
    info!(tools = registry.len(), transport = %config.transport, "starting slackline");
    let server = McpServer::new(std::sync::Arc::new(registry));

    match config.transport {
        Transport::Stdio => run_stdio(server).await,
        Transport::Sse => run_sse(server, &config.bind_addr).await,
    }
}

/// Diagnostics go to stderr in both transports: under stdio, stdout
/// belongs to the protocol.
fn init_logging(verbose: bool) {
    use tracing_subscriber::EnvFilter;

    let filter = if verbose {
        EnvFilter::new("slackline=debug,info")
    } else {
        EnvFilter::new("warn")
    };

    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .compact()
        .init();
}
