//! toolgate-core: Core Runtime for ToolGate
//!
//! Layer2 - 백엔드 연결과 라우팅 레이어
//!
//! # 주요 모듈
//!
//! - `mcp`: stdio MCP 백엔드 (프레이밍, 트랜스포트, 어댑터)
//! - `router`: 여러 백엔드의 시작/상태/도구 호출 라우팅
//! - `gateway`: 라우터 + 카탈로그 조립
//!
//! # 사용 예시
//!
//! ```ignore
//! use toolgate_core::Gateway;
//! use toolgate_foundation::{GatewayConfig, McpConfig};
//!
//! let gateway = Gateway::new(GatewayConfig::load()?, McpConfig::load()?);
//! gateway.start().await;
//!
//! let report = gateway.build_catalog().await;
//! let result = gateway
//!     .router()
//!     .call_tool("github", "create_issue", json!({ "title": "bug" }))
//!     .await?;
//!
//! gateway.shutdown().await;
//! ```

pub mod gateway;
pub mod mcp;
pub mod router;

// Re-exports: Gateway
pub use gateway::Gateway;

// Re-exports: MCP
pub use mcp::{
    validate_arguments, AdapterOptions, AdapterState, BackendAdapter, BackendEvent, McpContent,
    McpTool, McpToolResult, ServerInfo, StdioTransport,
};

// Re-exports: Router
pub use router::{BackendRouter, McpToolProducer, RouterStatus, ServerTools, ToolListing};
