//! Slack Web API access for Slackline: the session-authenticated HTTP
//! client, message-timestamp normalization, and the audit logger that
//! posts tool summaries back into a fixed operations channel.

pub mod audit;
pub mod session;
pub mod ts;

pub use audit::AuditLogger;
pub use session::SessionClient;
pub use ts::normalize_ts;
