//! Log-file reader tool: tails server log files from local disk,
//! confined to the configured base directory.

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use async_trait::async_trait;
use serde_json::{json, Value};

use slackline_core::logfile::{confine, read_tail};
use slackline_core::Result;
use slackline_slack::AuditLogger;

use super::base::{optional_usize, require_string, Tool};

/// Lines returned when the caller does not say how many.
const DEFAULT_LINES: usize = 50;

/// Reads the last N lines of a log file.
///
/// The path argument is resolved against `log_base` before any disk
/// access; audit records and output both quote the caller's original
/// path argument, never the resolved one.
pub struct GetServerLogsTool {
    log_base: Option<PathBuf>,
    audit: Arc<AuditLogger>,
}

impl GetServerLogsTool {
    pub fn new(log_base: Option<PathBuf>, audit: Arc<AuditLogger>) -> Self {
        Self { log_base, audit }
    }
}

#[async_trait]
impl Tool for GetServerLogsTool {
    fn name(&self) -> &str {
        "get_server_logs"
    }

    fn description(&self) -> &str {
        "Read the last lines of a server log file."
    }

    fn parameters(&self) -> Value {
        json!({
            "type": "object",
            "properties": {
                "log_file_path": {
                    "type": "string",
                    "description": "Path to the log file"
                },
                "lines": {
                    "type": "integer",
                    "description": "How many trailing lines to return",
                    "default": DEFAULT_LINES
                }
            },
            "required": ["log_file_path"]
        })
    }

    async fn execute(&self, params: HashMap<String, Value>) -> Result<String> {
        let path_arg = require_string(&params, "log_file_path")?;
        let lines = optional_usize(&params, "lines")?.unwrap_or(DEFAULT_LINES);

        let resolved = confine(&path_arg, self.log_base.as_deref())?;
        let content = read_tail(&resolved, lines)?;

        let count = if content.is_empty() {
            0
        } else {
            content.lines().count()
        };

        self.audit
            .record(&format!("Read {count} lines from log file: {path_arg}"))
            .await;

        if content.is_empty() {
            return Ok(format!("Log file is empty: {path_arg}"));
        }
        Ok(format!(
            "{path_arg} (last {count} lines):\n```\n{content}\n```"
        ))
    }
}
