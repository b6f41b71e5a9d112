//! MCP backends - Model Context Protocol over stdio
//!
//! ## 구성
//! - `protocol`: JSON-RPC 2.0 메시지와 수신 메시지 분류
//! - `framing`: NDJSON 줄 디코더 (`LinesCodec` 기반)
//! - `transport`: 프로세스 stdio 연결, 요청/응답 상관관계, 타임아웃
//! - `adapter`: 백엔드 하나의 상태 머신 (시작, 핸드셰이크, 정지)
//! - `schema`: 도구 인자 검증
//!
//! ## 참고
//! - https://modelcontextprotocol.io/

mod adapter;
mod framing;
mod protocol;
mod schema;
mod transport;
mod types;

pub use adapter::{AdapterOptions, AdapterState, BackendAdapter, BackendEvent};
pub use framing::{Frame, NdjsonCodec, MAX_LINE_LENGTH};
pub use protocol::{IncomingMessage, JsonRpcError, JsonRpcNotification, JsonRpcRequest};
pub use schema::validate_arguments;
pub use transport::{ExitInfo, StdioTransport};
pub use types::{InitializeResult, McpContent, McpTool, McpToolResult, ServerInfo};

#[cfg(all(test, unix))]
pub(crate) use adapter::test_support;
