//! The tool surface: the `Tool` trait, the registry the MCP layer
//! dispatches through, and the seven operations themselves.

pub mod base;
pub mod logs;
pub mod registry;
pub mod slack;

pub use base::{Tool, ToolDefinition};
pub use registry::ToolRegistry;
