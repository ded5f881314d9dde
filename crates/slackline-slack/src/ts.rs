//! Slack message-timestamp normalization.
//!
//! The Web API wants `seconds.microseconds` (e.g. `1712345678.123456`),
//! but operators routinely paste the 16-digit integer form embedded in
//! Slack message URLs. Accept both, reject everything else.

use std::sync::OnceLock;

use regex::Regex;

fn canonical_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d+\.\d+$").unwrap())
}

fn url_form_re() -> &'static Regex {
    static RE: OnceLock<Regex> = OnceLock::new();
    RE.get_or_init(|| Regex::new(r"^\d{16}$").unwrap())
}

/// Normalize a message timestamp to the Web API form.
///
/// Returns `None` when the input is in neither accepted shape; the
/// caller decides whether that is a validation error.
pub fn normalize_ts(ts: &str) -> Option<String> {
    if canonical_re().is_match(ts) {
        return Some(ts.to_string());
    }
    if url_form_re().is_match(ts) {
        return Some(format!("{}.{}", &ts[..10], &ts[10..]));
    }
    None
}
