//! Session Client — signed calls against the Slack Web API.
//!
//! Slack's browser-session surface wants two credential fragments on
//! every request: the web token as a Bearer header and the cookie token
//! as the `d` cookie. Both come from the immutable process config; this
//! client holds no other state and performs no retries — a single
//! network failure surfaces immediately to the calling tool.

use reqwest::header::{COOKIE, USER_AGENT};
use reqwest::StatusCode;
use serde_json::{json, Value};
use tracing::debug;

use slackline_core::{Error, Result, ServerConfig};

/// Slack Web API base URL.
pub const SLACK_API_BASE: &str = "https://slack.com/api";

/// User-Agent sent with every call.
const AGENT: &str = concat!("slackline/", env!("CARGO_PKG_VERSION"));

/// Request timeout. Retries and backoff are out of scope; this is the
/// only transport-level policy applied.
const TIMEOUT_SECS: u64 = 30;

/// `error` codes in an `ok: false` body that mean the session itself
/// was rejected, as opposed to the request being wrong.
const AUTH_ERROR_CODES: &[&str] = &[
    "invalid_auth",
    "not_authed",
    "account_inactive",
    "token_revoked",
    "token_expired",
];

/// HTTP client bound to one credential pair for the process lifetime.
pub struct SessionClient {
    http: reqwest::Client,
    xoxc_token: String,
    xoxd_token: String,
    api_base: String,
}

impl std::fmt::Debug for SessionClient {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        // Tokens intentionally omitted.
        f.debug_struct("SessionClient")
            .field("api_base", &self.api_base)
            .finish()
    }
}

impl SessionClient {
    /// Create a client from the process configuration.
    pub fn new(config: &ServerConfig) -> Self {
        Self::with_api_base(config, SLACK_API_BASE)
    }

    /// Create a client pointed at an alternate API base (tests point
    /// this at a local mock server).
    pub fn with_api_base(config: &ServerConfig, api_base: &str) -> Self {
        let http = reqwest::Client::builder()
            .timeout(std::time::Duration::from_secs(TIMEOUT_SECS))
            .build()
            .expect("Failed to build HTTP client");

        Self {
            http,
            xoxc_token: config.xoxc_token.clone(),
            xoxd_token: config.xoxd_token.clone(),
            api_base: api_base.trim_end_matches('/').to_string(),
        }
    }

    /// POST to a Slack Web API endpoint (e.g. `"chat.postMessage"`) and
    /// return the parsed `ok: true` body.
    ///
    /// Error mapping: HTTP 401/403 → `Auth`; any other non-success
    /// status or network failure → `Transport`; an `ok: false` body →
    /// `Auth` for auth-class error codes, `Api` otherwise.
    pub async fn call(&self, endpoint: &str, params: Option<Value>) -> Result<Value> {
        let url = format!("{}/{endpoint}", self.api_base);
        debug!(endpoint, "calling slack web api");

        let response = self
            .http
            .post(&url)
            .bearer_auth(&self.xoxc_token)
            .header(COOKIE, format!("d={}", self.xoxd_token))
            .header(USER_AGENT, AGENT)
            .json(&params.unwrap_or_else(|| json!({})))
            .send()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        let status = response.status();
        if status == StatusCode::UNAUTHORIZED || status == StatusCode::FORBIDDEN {
            return Err(Error::Auth(format!("slack returned {status} for {endpoint}")));
        }
        if !status.is_success() {
            return Err(Error::Transport(format!(
                "slack returned {status} for {endpoint}"
            )));
        }

        let body: Value = response
            .json()
            .await
            .map_err(|e| Error::Transport(e.to_string()))?;

        if body["ok"].as_bool() != Some(true) {
            let code = body["error"].as_str().unwrap_or("unknown").to_string();
            if AUTH_ERROR_CODES.contains(&code.as_str()) {
                return Err(Error::Auth(code));
            }
            return Err(Error::Api(format!("{endpoint}: {code}")));
        }

        Ok(body)
    }
}
