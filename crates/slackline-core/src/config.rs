//! Process configuration — read once from the environment at startup.
//!
//! The resulting [`ServerConfig`] is immutable for the process lifetime
//! and handed by reference (or `Arc`) into every component; there is no
//! global mutable state. Missing required variables are a fatal startup
//! error: the process never begins serving tools without a complete
//! credential pair and a logs channel.

use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use anyhow::{bail, Context, Result};

/// Default SSE listen address.
const DEFAULT_BIND_ADDR: &str = "127.0.0.1:8000";

// ─────────────────────────────────────────────
// Transport
// ─────────────────────────────────────────────

/// How the MCP substrate is served.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transport {
    /// Newline-delimited JSON-RPC over stdin/stdout (default).
    Stdio,
    /// HTTP Server-Sent Events with a companion POST endpoint.
    Sse,
}

impl FromStr for Transport {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s {
            "stdio" => Ok(Transport::Stdio),
            "sse" => Ok(Transport::Sse),
            other => Err(format!("unknown transport '{other}' (expected 'stdio' or 'sse')")),
        }
    }
}

impl fmt::Display for Transport {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Transport::Stdio => write!(f, "stdio"),
            Transport::Sse => write!(f, "sse"),
        }
    }
}

// ─────────────────────────────────────────────
// ServerConfig
// ─────────────────────────────────────────────

/// Everything the server needs, fixed at startup.
#[derive(Clone, Debug)]
pub struct ServerConfig {
    /// Slack web token (`xoxc-…`), sent as the Bearer credential.
    pub xoxc_token: String,
    /// Slack cookie token (`xoxd-…`), sent as the `d` cookie.
    pub xoxd_token: String,
    /// Channel every audit record is posted to. Fixed here; callers
    /// cannot redirect audit output through tool arguments.
    pub logs_channel: String,
    /// Serving transport.
    pub transport: Transport,
    /// Confinement root for `get_server_logs`. `None` disables the
    /// boundary check entirely — an explicit deployment opt-out.
    pub log_base: Option<PathBuf>,
    /// Listen address for the SSE transport.
    pub bind_addr: String,
}

impl ServerConfig {
    /// Load configuration from process environment variables.
    pub fn from_env() -> Result<Self> {
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Load configuration through an injectable lookup (testable without
    /// mutating process-global environment state).
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let xoxc_token = required(&lookup, "SLACK_XOXC_TOKEN")?;
        let xoxd_token = required(&lookup, "SLACK_XOXD_TOKEN")?;
        let logs_channel = required(&lookup, "LOGS_CHANNEL_ID")?;

        let transport = match lookup("MCP_TRANSPORT") {
            Some(raw) => raw
                .parse::<Transport>()
                .map_err(|e| anyhow::anyhow!(e))
                .context("invalid MCP_TRANSPORT")?,
            None => Transport::Stdio,
        };

        let log_base = lookup("LOG_BASE_PATH")
            .filter(|s| !s.is_empty())
            .map(PathBuf::from);

        let bind_addr = lookup("SLACKLINE_BIND_ADDR")
            .filter(|s| !s.is_empty())
            .unwrap_or_else(|| DEFAULT_BIND_ADDR.to_string());

        Ok(Self {
            xoxc_token,
            xoxd_token,
            logs_channel,
            transport,
            log_base,
            bind_addr,
        })
    }
}

/// Fetch a required variable; empty counts as missing.
fn required<F>(lookup: &F, key: &str) -> Result<String>
where
    F: Fn(&str) -> Option<String>,
{
    match lookup(key) {
        Some(value) if !value.is_empty() => Ok(value),
        _ => bail!("required environment variable {key} is not set"),
    }
}
