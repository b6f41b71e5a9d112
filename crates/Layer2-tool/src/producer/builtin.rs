//! Gateway meta tools

use super::ToolProducer;
use crate::catalog::ToolDescriptor;
use async_trait::async_trait;
use serde_json::json;
use toolgate_foundation::{Result, ToolSource};

/// 내장 도구 소유자 이름
pub const GATEWAY_SERVER: &str = "toolgate";

/// 도구 검색 도구 이름
pub const SEARCH_TOOL_NAME: &str = "search_tools";

/// 게이트웨이 자체 도구 생산자
///
/// - `search_tools`: 카탈로그 검색
/// - `list_servers`: 백엔드 상태
/// - `call_tool`: 백엔드 도구 호출
#[derive(Debug, Default)]
pub struct BuiltinProducer;

impl BuiltinProducer {
    pub fn new() -> Self {
        Self
    }

    pub fn descriptors() -> Vec<ToolDescriptor> {
        vec![
            search_tool_descriptor(),
            ToolDescriptor::new(
                ToolSource::Builtin,
                GATEWAY_SERVER,
                "list_servers",
                "List registered tool backends and whether each one is ready.",
            )
            .schema(json!({ "type": "object", "properties": {} })),
            ToolDescriptor::new(
                ToolSource::Builtin,
                GATEWAY_SERVER,
                "call_tool",
                "Invoke a tool on a named backend with JSON arguments.",
            )
            .schema(json!({
                "type": "object",
                "properties": {
                    "server": { "type": "string", "description": "Backend name" },
                    "tool": { "type": "string", "description": "Tool name on that backend" },
                    "arguments": { "type": "object", "description": "Tool arguments" }
                },
                "required": ["server", "tool"]
            })),
        ]
    }
}

/// `search_tools` 정의 (익스포터에서도 사용)
pub fn search_tool_descriptor() -> ToolDescriptor {
    ToolDescriptor::new(
        ToolSource::Builtin,
        GATEWAY_SERVER,
        SEARCH_TOOL_NAME,
        "Search the tool catalog by keyword or regex and return matching tool definitions.",
    )
    .schema(json!({
        "type": "object",
        "properties": {
            "query": { "type": "string", "description": "Keywords or a regex pattern" },
            "limit": { "type": "integer", "minimum": 1, "description": "Maximum results" },
            "type": { "type": "string", "enum": ["auto", "bm25", "regex", "hybrid"] },
            "category": { "type": "string" },
            "source": { "type": "string", "enum": ["mcp", "compiled_crate", "subagent", "builtin"] },
            "minScore": { "type": "number", "description": "Drop results scoring below this" }
        },
        "required": ["query"]
    }))
}

#[async_trait]
impl ToolProducer for BuiltinProducer {
    fn name(&self) -> &str {
        "builtins"
    }

    fn source(&self) -> ToolSource {
        ToolSource::Builtin
    }

    async fn produce(&self) -> Result<Vec<ToolDescriptor>> {
        Ok(Self::descriptors())
    }
}
