//! Tool Registry — name-keyed store the MCP layer dispatches through.

use std::collections::HashMap;
use std::sync::Arc;

use serde_json::Value;
use tracing::info;

use slackline_core::{Error, Result};

use super::base::{Tool, ToolDefinition};

/// Stores tools keyed by name and dispatches calls.
///
/// Built once at startup and shared read-only afterwards; concurrent
/// invocations need no locking.
pub struct ToolRegistry {
    tools: HashMap<String, Arc<dyn Tool>>,
}

impl ToolRegistry {
    /// Create an empty registry.
    pub fn new() -> Self {
        Self {
            tools: HashMap::new(),
        }
    }

    /// Register a tool. Overwrites any previous tool with the same name.
    pub fn register(&mut self, tool: Arc<dyn Tool>) {
        info!(tool = tool.name(), "registered tool");
        self.tools.insert(tool.name().to_string(), tool);
    }

    /// Check if a tool is registered.
    pub fn has(&self, name: &str) -> bool {
        self.tools.contains_key(name)
    }

    /// Names of all registered tools, sorted for determinism.
    pub fn tool_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.tools.keys().cloned().collect();
        names.sort();
        names
    }

    /// Caller-facing definitions for all registered tools, sorted.
    pub fn definitions(&self) -> Vec<ToolDefinition> {
        let mut defs: Vec<ToolDefinition> =
            self.tools.values().map(|t| t.to_definition()).collect();
        defs.sort_by(|a, b| a.name.cmp(&b.name));
        defs
    }

    /// Execute a tool by name. Unknown names are a validation failure;
    /// tool failures propagate untouched.
    pub async fn execute(&self, name: &str, params: HashMap<String, Value>) -> Result<String> {
        let tool = self
            .tools
            .get(name)
            .ok_or_else(|| Error::Validation(format!("unknown tool '{name}'")))?;
        tool.execute(params).await
    }

    /// Number of registered tools.
    pub fn len(&self) -> usize {
        self.tools.len()
    }

    /// Whether the registry is empty.
    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }
}

impl Default for ToolRegistry {
    fn default() -> Self {
        Self::new()
    }
}
