//! Audit Logger — posts a one-line record of each completed tool call
//! into a fixed operations channel.
//!
//! The audit post rides the same Session Client every tool uses, which
//! creates a recursive call shape (a tool calls Slack to report on a
//! tool that called Slack). Two rules keep it contained: the logger is
//! invoked at most once per tool invocation and never invokes itself,
//! and a failed audit post is logged to the process diagnostic stream
//! and discarded — it never changes the originating tool's result and
//! never triggers a second attempt.

use std::sync::Arc;

use serde_json::json;
use tracing::warn;

use crate::session::SessionClient;

/// Best-effort recorder bound to one destination channel at startup.
pub struct AuditLogger {
    session: Arc<SessionClient>,
    logs_channel: String,
}

impl AuditLogger {
    /// The logs channel is fixed here and not rediscoverable from tool
    /// arguments.
    pub fn new(session: Arc<SessionClient>, logs_channel: impl Into<String>) -> Self {
        Self {
            session,
            logs_channel: logs_channel.into(),
        }
    }

    /// Post `summary` to the logs channel. Never fails observably.
    pub async fn record(&self, summary: &str) {
        let payload = json!({
            "channel": self.logs_channel,
            "text": summary,
        });
        if let Err(e) = self.session.call("chat.postMessage", Some(payload)).await {
            warn!(error = %e, "audit post failed (discarded)");
        }
    }
}
