//! Registry - 백엔드 등록 설정
//!
//! - `mcp/` - MCP 서버(백엔드) 등록 (자체 load/save)

pub mod mcp;

// MCP
pub use mcp::{McpConfig, McpConfigFile, McpServer, MCP_FILE};
