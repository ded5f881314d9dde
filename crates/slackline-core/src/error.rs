//! Error taxonomy for tool execution.
//!
//! Every failure a tool can surface to its caller is one of these
//! variants. Nothing here is retried; only the audit side-channel
//! swallows its own post failures (see `slackline-slack::audit`).

/// Convenience alias used throughout the workspace.
pub type Result<T> = std::result::Result<T, Error>;

/// Failure modes surfaced to the external caller.
#[derive(Debug, thiserror::Error)]
pub enum Error {
    /// Slack rejected the session credentials (HTTP 401/403 or an
    /// auth-class `error` code in an `ok: false` body).
    #[error("authentication rejected: {0}")]
    Auth(String),

    /// Network-level or HTTP-level failure talking to Slack.
    #[error("transport failure: {0}")]
    Transport(String),

    /// Slack answered `ok: false` with a non-auth error code.
    #[error("slack api error: {0}")]
    Api(String),

    /// A requested log path escapes the configured base directory.
    /// Carries only the path as the caller supplied it, never the
    /// resolved form, so nothing outside the boundary is disclosed.
    #[error("access denied: '{0}' is outside the allowed log directory")]
    PathViolation(String),

    /// Log file does not exist (or is not a regular file).
    #[error("log file not found: {0}")]
    NotFound(String),

    /// Log file exists but cannot be read.
    #[error("permission denied reading {0}")]
    AccessDenied(String),

    /// A required tool argument is missing, empty, or of the wrong type.
    #[error("invalid argument: {0}")]
    Validation(String),
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_path_violation_mentions_only_requested_path() {
        let err = Error::PathViolation("../../etc/passwd".into());
        let msg = err.to_string();
        assert!(msg.contains("../../etc/passwd"));
        assert!(!msg.contains("/etc/passwd\n"));
    }

    #[test]
    fn test_variants_render_distinctly() {
        let auth = Error::Auth("invalid_auth".into()).to_string();
        let transport = Error::Transport("connection refused".into()).to_string();
        let not_found = Error::NotFound("app.log".into()).to_string();
        assert!(auth.starts_with("authentication rejected"));
        assert!(transport.starts_with("transport failure"));
        assert!(not_found.starts_with("log file not found"));
    }
}
