//! MCP 백엔드 등록 설정 (`mcp.json`)

mod server;

pub use server::{McpConfig, McpConfigFile, McpServer, MCP_FILE};
