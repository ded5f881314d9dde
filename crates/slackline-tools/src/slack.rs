//! The Slack-facing tools: channel history, join, post message, post
//! command, add reaction, and identity check.
//!
//! Shared shape: validate arguments, perform the primary Slack action
//! through the Session Client, and only after it succeeded hand the
//! Audit Logger a one-line summary (skipped when the caller passed
//! `skip_log`). Failures return to the caller without an audit record.
//! The pre-join inside `post_message`/`post_command` goes straight
//! through the Session Client so a single invocation never produces
//! more than one audit record.

use std::collections::HashMap;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};
use tracing::debug;

use slackline_core::{Error, Result};
use slackline_slack::{normalize_ts, AuditLogger, SessionClient};

use super::base::{optional_bool, optional_string, require_string, Tool};

/// Longest argument excerpt an audit summary will carry.
const SUMMARY_PREVIEW_CHARS: usize = 80;

/// Truncate on a char boundary for audit summaries.
fn preview(text: &str) -> String {
    if text.chars().count() <= SUMMARY_PREVIEW_CHARS {
        return text.to_string();
    }
    let cut: String = text.chars().take(SUMMARY_PREVIEW_CHARS).collect();
    format!("{cut}…")
}

// ─────────────────────────────────────────────
// get_channel_history
// ─────────────────────────────────────────────

/// Fetches the message history of a channel.
pub struct GetChannelHistoryTool {
    session: Arc<SessionClient>,
    audit: Arc<AuditLogger>,
}

impl GetChannelHistoryTool {
    pub fn new(session: Arc<SessionClient>, audit: Arc<AuditLogger>) -> Self {
        Self { session, audit }
    }
}

#[async_trait]
impl Tool for GetChannelHistoryTool {
    fn name(&self) -> &str {
        "get_channel_history"
    }

    fn description(&self) -> &str {
        "Get the message history of a Slack channel."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "channel_id": {
                    "type": "string",
                    "description": "Channel identifier (e.g. C0123456789)"
                }
            },
            "required": ["channel_id"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> Result<String> {
        let channel_id = require_string(&params, "channel_id")?;

        let body = self
            .session
            .call("conversations.history", Some(json!({"channel": channel_id})))
            .await?;
        let messages = body.get("messages").cloned().unwrap_or_else(|| json!([]));

        self.audit
            .record(&format!("Fetched history of channel <#{channel_id}>"))
            .await;

        serde_json::to_string_pretty(&messages)
            .map_err(|e| Error::Api(format!("unrenderable history payload: {e}")))
    }
}

// ─────────────────────────────────────────────
// join_channel
// ─────────────────────────────────────────────

/// Joins a channel as the session identity.
pub struct JoinChannelTool {
    session: Arc<SessionClient>,
    audit: Arc<AuditLogger>,
}

impl JoinChannelTool {
    pub fn new(session: Arc<SessionClient>, audit: Arc<AuditLogger>) -> Self {
        Self { session, audit }
    }
}

#[async_trait]
impl Tool for JoinChannelTool {
    fn name(&self) -> &str {
        "join_channel"
    }

    fn description(&self) -> &str {
        "Join a Slack channel."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "channel_id": {
                    "type": "string",
                    "description": "Channel identifier to join"
                },
                "skip_log": {
                    "type": "boolean",
                    "description": "Suppress the audit record for this call",
                    "default": false
                }
            },
            "required": ["channel_id"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> Result<String> {
        let channel_id = require_string(&params, "channel_id")?;
        let skip_log = optional_bool(&params, "skip_log");

        self.session
            .call("conversations.join", Some(json!({"channel": channel_id})))
            .await?;

        if !skip_log {
            self.audit
                .record(&format!("Joined channel <#{channel_id}>"))
                .await;
        }
        Ok("true".to_string())
    }
}

// ─────────────────────────────────────────────
// post_message
// ─────────────────────────────────────────────

/// Posts a message, optionally as a threaded reply.
pub struct PostMessageTool {
    session: Arc<SessionClient>,
    audit: Arc<AuditLogger>,
}

impl PostMessageTool {
    pub fn new(session: Arc<SessionClient>, audit: Arc<AuditLogger>) -> Self {
        Self { session, audit }
    }
}

#[async_trait]
impl Tool for PostMessageTool {
    fn name(&self) -> &str {
        "post_message"
    }

    fn description(&self) -> &str {
        "Post a message to a Slack channel. A non-empty thread_ts makes \
         it a threaded reply to that message."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "channel_id": {
                    "type": "string",
                    "description": "Channel to post into"
                },
                "message": {
                    "type": "string",
                    "description": "Message text"
                },
                "thread_ts": {
                    "type": "string",
                    "description": "Timestamp of the message to reply under; empty for a top-level message",
                    "default": ""
                },
                "skip_log": {
                    "type": "boolean",
                    "description": "Suppress the audit record for this call",
                    "default": false
                }
            },
            "required": ["channel_id", "message"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> Result<String> {
        let channel_id = require_string(&params, "channel_id")?;
        let message = require_string(&params, "message")?;
        let thread_ts = optional_string(&params, "thread_ts").unwrap_or_default();
        let skip_log = optional_bool(&params, "skip_log");

        let mut payload = json!({
            "channel": channel_id,
            "text": message,
        });
        if !thread_ts.is_empty() {
            let ts = normalize_ts(&thread_ts).ok_or_else(|| {
                Error::Validation(format!("'{thread_ts}' is not a Slack message timestamp"))
            })?;
            payload["thread_ts"] = json!(ts);
        }

        // Best-effort join so posting into a not-yet-joined channel
        // works; DMs and already-joined channels make this a no-op.
        if let Err(e) = self
            .session
            .call("conversations.join", Some(json!({"channel": channel_id})))
            .await
        {
            debug!(error = %e, "pre-join before post failed (continuing)");
        }

        self.session.call("chat.postMessage", Some(payload)).await?;

        if !skip_log {
            self.audit
                .record(&format!(
                    "Posted message to channel <#{channel_id}>: {}",
                    preview(&message)
                ))
                .await;
        }
        Ok("true".to_string())
    }
}

// ─────────────────────────────────────────────
// post_command
// ─────────────────────────────────────────────

/// Posts a slash command into a channel.
pub struct PostCommandTool {
    session: Arc<SessionClient>,
    audit: Arc<AuditLogger>,
}

impl PostCommandTool {
    pub fn new(session: Arc<SessionClient>, audit: Arc<AuditLogger>) -> Self {
        Self { session, audit }
    }
}

#[async_trait]
impl Tool for PostCommandTool {
    fn name(&self) -> &str {
        "post_command"
    }

    fn description(&self) -> &str {
        "Post a slash command (e.g. /remind) to a Slack channel."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "channel_id": {
                    "type": "string",
                    "description": "Channel to run the command in"
                },
                "command": {
                    "type": "string",
                    "description": "Slash command, including the leading slash"
                },
                "text": {
                    "type": "string",
                    "description": "Arguments passed to the command (may be empty)"
                },
                "skip_log": {
                    "type": "boolean",
                    "description": "Suppress the audit record for this call",
                    "default": false
                }
            },
            "required": ["channel_id", "command", "text"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> Result<String> {
        let channel_id = require_string(&params, "channel_id")?;
        let command = require_string(&params, "command")?;
        // Required but allowed to be empty: a bare slash command is valid.
        let text = params
            .get("text")
            .and_then(|v| v.as_str())
            .map(|s| s.to_string())
            .ok_or_else(|| Error::Validation("missing required parameter 'text'".into()))?;
        let skip_log = optional_bool(&params, "skip_log");

        if let Err(e) = self
            .session
            .call("conversations.join", Some(json!({"channel": channel_id})))
            .await
        {
            debug!(error = %e, "pre-join before command failed (continuing)");
        }

        self.session
            .call(
                "chat.command",
                Some(json!({
                    "channel": channel_id,
                    "command": command,
                    "text": text,
                })),
            )
            .await?;

        if !skip_log {
            let summary = format!(
                "Posted command to channel <#{channel_id}>: {command} {}",
                preview(&text)
            );
            self.audit.record(summary.trim_end()).await;
        }
        Ok("true".to_string())
    }
}

// ─────────────────────────────────────────────
// add_reaction
// ─────────────────────────────────────────────

/// Adds an emoji reaction to a message. Slack silently no-ops if this
/// identity already reacted; no local dedup is attempted.
pub struct AddReactionTool {
    session: Arc<SessionClient>,
    audit: Arc<AuditLogger>,
}

impl AddReactionTool {
    pub fn new(session: Arc<SessionClient>, audit: Arc<AuditLogger>) -> Self {
        Self { session, audit }
    }
}

#[async_trait]
impl Tool for AddReactionTool {
    fn name(&self) -> &str {
        "add_reaction"
    }

    fn description(&self) -> &str {
        "Add an emoji reaction to a Slack message."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "channel_id": {
                    "type": "string",
                    "description": "Channel containing the message"
                },
                "message_ts": {
                    "type": "string",
                    "description": "Timestamp of the message to react to"
                },
                "reaction": {
                    "type": "string",
                    "description": "Emoji name without colons (e.g. thumbsup)"
                }
            },
            "required": ["channel_id", "message_ts", "reaction"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> Result<String> {
        let channel_id = require_string(&params, "channel_id")?;
        let message_ts = require_string(&params, "message_ts")?;
        let reaction = require_string(&params, "reaction")?;

        let ts = normalize_ts(&message_ts).ok_or_else(|| {
            Error::Validation(format!("'{message_ts}' is not a Slack message timestamp"))
        })?;

        self.session
            .call(
                "reactions.add",
                Some(json!({
                    "channel": channel_id,
                    "name": reaction,
                    "timestamp": ts,
                })),
            )
            .await?;

        self.audit
            .record(&format!(
                "Added reaction :{reaction}: to message {ts} in channel <#{channel_id}>"
            ))
            .await;
        Ok("true".to_string())
    }
}

// ─────────────────────────────────────────────
// whoami
// ─────────────────────────────────────────────

/// Checks authentication and reports the session identity.
pub struct WhoamiTool {
    session: Arc<SessionClient>,
    audit: Arc<AuditLogger>,
}

impl WhoamiTool {
    pub fn new(session: Arc<SessionClient>, audit: Arc<AuditLogger>) -> Self {
        Self { session, audit }
    }
}

#[async_trait]
impl Tool for WhoamiTool {
    fn name(&self) -> &str {
        "whoami"
    }

    fn description(&self) -> &str {
        "Check authentication and return the Slack identity of the session."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {},
            "required": []
        })
    }

    async fn execute(&self, _params: HashMap<String, Value>) -> Result<String> {
        let body = self.session.call("auth.test", None).await?;
        let user = body["user"]
            .as_str()
            .ok_or_else(|| Error::Api("auth.test response missing 'user'".into()))?
            .to_string();

        self.audit.record("Checked authentication & identity").await;
        Ok(user)
    }
}

// ─────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;
    use slackline_core::ServerConfig;
    use wiremock::matchers::{body_partial_json, method, path};
    use wiremock::{Mock, MockServer, ResponseTemplate};

    const LOGS_CHANNEL: &str = "C0LOGS";

    fn make_config() -> ServerConfig {
        ServerConfig::from_lookup(|key| match key {
            "SLACK_XOXC_TOKEN" => Some("xoxc-web".into()),
            "SLACK_XOXD_TOKEN" => Some("xoxd-cookie".into()),
            "LOGS_CHANNEL_ID" => Some(LOGS_CHANNEL.into()),
            _ => None,
        })
        .unwrap()
    }

    async fn setup() -> (MockServer, Arc<SessionClient>, Arc<AuditLogger>) {
        let mock_server = MockServer::start().await;
        let session = Arc::new(SessionClient::with_api_base(
            &make_config(),
            &mock_server.uri(),
        ));
        let audit = Arc::new(AuditLogger::new(session.clone(), LOGS_CHANNEL));
        (mock_server, session, audit)
    }

    fn params(pairs: &[(&str, Value)]) -> HashMap<String, Value> {
        pairs.iter().map(|(k, v)| (k.to_string(), v.clone())).collect()
    }

    fn ok_body() -> ResponseTemplate {
        ResponseTemplate::new(200).set_body_json(json!({"ok": true}))
    }

    /// Match the audit post (a chat.postMessage aimed at the logs channel).
    fn audit_post() -> impl wiremock::Match {
        body_partial_json(json!({"channel": LOGS_CHANNEL}))
    }

    // ── get_channel_history ──

    #[tokio::test]
    async fn test_history_returns_messages_and_audits_once() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.history"))
            .and(body_partial_json(json!({"channel": "C123"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "ok": true,
                "messages": [{"text": "first", "ts": "1.1"}, {"text": "second", "ts": "1.2"}]
            })))
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(audit_post())
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;

        let tool = GetChannelHistoryTool::new(session, audit);
        let out = tool
            .execute(params(&[("channel_id", json!("C123"))]))
            .await
            .unwrap();
        assert!(out.contains("\"first\""));
        assert!(out.contains("\"second\""));
    }

    #[tokio::test]
    async fn test_history_missing_channel_is_validation() {
        let (_mock_server, session, audit) = setup().await;
        let tool = GetChannelHistoryTool::new(session, audit);
        let err = tool.execute(HashMap::new()).await.unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_history_failure_produces_no_audit() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.history"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": false, "error": "channel_not_found"})),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ok_body())
            .expect(0)
            .mount(&mock_server)
            .await;

        let tool = GetChannelHistoryTool::new(session, audit);
        let err = tool
            .execute(params(&[("channel_id", json!("C404"))]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Api(_)));
    }

    // ── join_channel ──

    #[tokio::test]
    async fn test_join_audits_by_default() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.join"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(audit_post())
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;

        let tool = JoinChannelTool::new(session, audit);
        let out = tool
            .execute(params(&[("channel_id", json!("C123"))]))
            .await
            .unwrap();
        assert_eq!(out, "true");
    }

    #[tokio::test]
    async fn test_join_skip_log_suppresses_audit() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.join"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ok_body())
            .expect(0)
            .mount(&mock_server)
            .await;

        let tool = JoinChannelTool::new(session, audit);
        tool.execute(params(&[
            ("channel_id", json!("C123")),
            ("skip_log", json!(true)),
        ]))
        .await
        .unwrap();
    }

    // ── post_message ──

    #[tokio::test]
    async fn test_post_message_top_level_has_no_thread_ts() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.join"))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;

        let tool = PostMessageTool::new(session, audit);
        tool.execute(params(&[
            ("channel_id", json!("C123")),
            ("message", json!("hello")),
            ("skip_log", json!(true)),
        ]))
        .await
        .unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let post = requests
            .iter()
            .find(|r| r.url.path() == "/chat.postMessage")
            .expect("message was posted");
        let body: Value = serde_json::from_slice(&post.body).unwrap();
        assert_eq!(body["channel"], "C123");
        assert_eq!(body["text"], "hello");
        assert!(body.get("thread_ts").is_none());
    }

    #[tokio::test]
    async fn test_post_message_threaded_reply() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.join"))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_partial_json(json!({"thread_ts": "1712345678.123456"})))
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;

        let tool = PostMessageTool::new(session, audit);
        tool.execute(params(&[
            ("channel_id", json!("C123")),
            ("message", json!("hello")),
            ("thread_ts", json!("1712345678.123456")),
            ("skip_log", json!(true)),
        ]))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_post_message_url_form_thread_ts_normalized() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.join"))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_partial_json(json!({"thread_ts": "1712345678.123456"})))
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;

        let tool = PostMessageTool::new(session, audit);
        tool.execute(params(&[
            ("channel_id", json!("C123")),
            ("message", json!("hello")),
            ("thread_ts", json!("1712345678123456")),
            ("skip_log", json!(true)),
        ]))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_post_message_bad_thread_ts_is_validation() {
        let (_mock_server, session, audit) = setup().await;
        let tool = PostMessageTool::new(session, audit);
        let err = tool
            .execute(params(&[
                ("channel_id", json!("C123")),
                ("message", json!("hello")),
                ("thread_ts", json!("not-a-ts")),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_post_message_empty_message_is_validation() {
        let (_mock_server, session, audit) = setup().await;
        let tool = PostMessageTool::new(session, audit);
        let err = tool
            .execute(params(&[
                ("channel_id", json!("C123")),
                ("message", json!("")),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    #[tokio::test]
    async fn test_post_message_audit_comes_after_primary_post() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.join"))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;

        let tool = PostMessageTool::new(session, audit);
        tool.execute(params(&[
            ("channel_id", json!("C123")),
            ("message", json!("hello")),
        ]))
        .await
        .unwrap();

        let requests = mock_server.received_requests().await.unwrap();
        let posts: Vec<Value> = requests
            .iter()
            .filter(|r| r.url.path() == "/chat.postMessage")
            .map(|r| serde_json::from_slice(&r.body).unwrap())
            .collect();
        assert_eq!(posts.len(), 2);
        // Primary message first, audit record second.
        assert_eq!(posts[0]["channel"], "C123");
        assert_eq!(posts[1]["channel"], LOGS_CHANNEL);
    }

    #[tokio::test]
    async fn test_post_message_succeeds_even_if_audit_post_fails() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.join"))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;
        // Audit destination rejects; primary channel accepts.
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(audit_post())
            .respond_with(ResponseTemplate::new(500))
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(body_partial_json(json!({"channel": "C123"})))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;

        let tool = PostMessageTool::new(session, audit);
        let out = tool
            .execute(params(&[
                ("channel_id", json!("C123")),
                ("message", json!("hello")),
            ]))
            .await
            .unwrap();
        assert_eq!(out, "true");
    }

    #[tokio::test]
    async fn test_post_message_continues_when_pre_join_fails() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.join"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": false, "error": "method_not_supported_for_channel_type"})),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;

        let tool = PostMessageTool::new(session, audit);
        let out = tool
            .execute(params(&[
                ("channel_id", json!("D456")),
                ("message", json!("dm text")),
                ("skip_log", json!(true)),
            ]))
            .await
            .unwrap();
        assert_eq!(out, "true");
    }

    // ── post_command ──

    #[tokio::test]
    async fn test_post_command_sends_command_and_text() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.join"))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.command"))
            .and(body_partial_json(json!({
                "channel": "C123",
                "command": "/remind",
                "text": "me in 5 minutes"
            })))
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;

        let tool = PostCommandTool::new(session, audit);
        let out = tool
            .execute(params(&[
                ("channel_id", json!("C123")),
                ("command", json!("/remind")),
                ("text", json!("me in 5 minutes")),
                ("skip_log", json!(true)),
            ]))
            .await
            .unwrap();
        assert_eq!(out, "true");
    }

    #[tokio::test]
    async fn test_post_command_allows_empty_text() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/conversations.join"))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.command"))
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;

        let tool = PostCommandTool::new(session, audit);
        tool.execute(params(&[
            ("channel_id", json!("C123")),
            ("command", json!("/away")),
            ("text", json!("")),
            ("skip_log", json!(true)),
        ]))
        .await
        .unwrap();
    }

    #[tokio::test]
    async fn test_post_command_missing_text_is_validation() {
        let (_mock_server, session, audit) = setup().await;
        let tool = PostCommandTool::new(session, audit);
        let err = tool
            .execute(params(&[
                ("channel_id", json!("C123")),
                ("command", json!("/away")),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    // ── add_reaction ──

    #[tokio::test]
    async fn test_add_reaction_normalizes_url_form_ts() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/reactions.add"))
            .and(body_partial_json(json!({
                "channel": "C123",
                "name": "thumbsup",
                "timestamp": "1712345678.123456"
            })))
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(audit_post())
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;

        let tool = AddReactionTool::new(session, audit);
        let out = tool
            .execute(params(&[
                ("channel_id", json!("C123")),
                ("message_ts", json!("1712345678123456")),
                ("reaction", json!("thumbsup")),
            ]))
            .await
            .unwrap();
        assert_eq!(out, "true");
    }

    #[tokio::test]
    async fn test_add_reaction_invalid_ts_is_validation() {
        let (_mock_server, session, audit) = setup().await;
        let tool = AddReactionTool::new(session, audit);
        let err = tool
            .execute(params(&[
                ("channel_id", json!("C123")),
                ("message_ts", json!("yesterday")),
                ("reaction", json!("thumbsup")),
            ]))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Validation(_)));
    }

    // ── whoami ──

    #[tokio::test]
    async fn test_whoami_returns_identity() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/auth.test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": true, "user": "ops-operator"})),
            )
            .expect(1)
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .and(audit_post())
            .respond_with(ok_body())
            .expect(1)
            .mount(&mock_server)
            .await;

        let tool = WhoamiTool::new(session, audit);
        assert_eq!(tool.execute(HashMap::new()).await.unwrap(), "ops-operator");
    }

    #[tokio::test]
    async fn test_whoami_auth_rejection_propagates() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/auth.test"))
            .respond_with(
                ResponseTemplate::new(200)
                    .set_body_json(json!({"ok": false, "error": "invalid_auth"})),
            )
            .mount(&mock_server)
            .await;

        let tool = WhoamiTool::new(session, audit);
        let err = tool.execute(HashMap::new()).await.unwrap_err();
        assert!(matches!(err, Error::Auth(_)));
    }

    // ── concurrency ──

    #[tokio::test]
    async fn test_concurrent_tools_do_not_interfere() {
        let (mock_server, session, audit) = setup().await;
        Mock::given(method("POST"))
            .and(path("/auth.test"))
            .respond_with(
                ResponseTemplate::new(200).set_body_json(json!({"ok": true, "user": "me"})),
            )
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/conversations.join"))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;
        Mock::given(method("POST"))
            .and(path("/chat.postMessage"))
            .respond_with(ok_body())
            .mount(&mock_server)
            .await;

        let whoami = WhoamiTool::new(session.clone(), audit.clone());
        let join = JoinChannelTool::new(session, audit);

        let (a, b) = tokio::join!(
            whoami.execute(HashMap::new()),
            join.execute(params(&[("channel_id", json!("C777"))])),
        );
        assert_eq!(a.unwrap(), "me");
        assert_eq!(b.unwrap(), "true");
    }

    // ── preview ──

    #[test]
    fn test_preview_short_text_unchanged() {
        assert_eq!(preview("hello"), "hello");
    }

    #[test]
    fn test_preview_truncates_long_text() {
        let long = "x".repeat(200);
        let p = preview(&long);
        assert!(p.chars().count() <= SUMMARY_PREVIEW_CHARS + 1);
        assert!(p.ends_with('…'));
    }
}
