//! MCP server wiring: protocol types, dispatch, and the two transports.

pub mod protocol;
pub mod server;
pub mod sse;

use std::sync::Arc;

use slackline_core::ServerConfig;
use slackline_slack::{AuditLogger, SessionClient};
use slackline_tools::logs::GetServerLogsTool;
use slackline_tools::slack::{
    AddReactionTool, GetChannelHistoryTool, JoinChannelTool, PostCommandTool, PostMessageTool,
    WhoamiTool,
};
use slackline_tools::ToolRegistry;

pub use server::{run_stdio, McpServer};
pub use sse::run_sse;

/// Build the full tool registry from the process configuration.
pub fn build_registry(config: &ServerConfig) -> ToolRegistry {
    let session = Arc::new(SessionClient::new(config));
    let audit = Arc::new(AuditLogger::new(session.clone(), config.logs_channel.clone()));

    let mut registry = ToolRegistry::new();
    registry.register(Arc::new(GetChannelHistoryTool::new(
        session.clone(),
        audit.clone(),
    )));
    registry.register(Arc::new(JoinChannelTool::new(session.clone(), audit.clone())));
    registry.register(Arc::new(PostMessageTool::new(session.clone(), audit.clone())));
    registry.register(Arc::new(PostCommandTool::new(session.clone(), audit.clone())));
    registry.register(Arc::new(AddReactionTool::new(session.clone(), audit.clone())));
    registry.register(Arc::new(WhoamiTool::new(session, audit.clone())));
    registry.register(Arc::new(GetServerLogsTool::new(
        config.log_base.clone(),
        audit,
    )));
    registry
}
