//! MCP Types - 백엔드가 주고받는 페이로드

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// 백엔드가 제공하는 도구 정보
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpTool {
    /// 도구 이름
    pub name: String,

    /// 도구 설명
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub description: Option<String>,

    /// 입력 스키마 (JSON Schema)
    #[serde(rename = "inputSchema", default = "default_schema")]
    pub input_schema: Value,
}

/// `tools/list` 응답 한 페이지
#[derive(Debug, Clone, Deserialize)]
pub struct ListToolsPage {
    #[serde(default)]
    pub tools: Vec<McpTool>,

    #[serde(rename = "nextCursor", default)]
    pub next_cursor: Option<String>,
}

/// 도구 실행 결과
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct McpToolResult {
    /// 결과 콘텐츠
    #[serde(default)]
    pub content: Vec<McpContent>,

    /// 도구 수준 오류 여부
    #[serde(rename = "isError", default)]
    pub is_error: bool,
}

/// 결과 콘텐츠
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "lowercase")]
pub enum McpContent {
    Text {
        text: String,
    },

    Image {
        data: String,
        #[serde(rename = "mimeType")]
        mime_type: String,
    },

    Resource {
        resource: Value,
    },

    /// 알 수 없는 콘텐츠 타입
    #[serde(other)]
    Unknown,
}

impl McpToolResult {
    pub fn success(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text { text: text.into() }],
            is_error: false,
        }
    }

    pub fn error(text: impl Into<String>) -> Self {
        Self {
            content: vec![McpContent::Text { text: text.into() }],
            is_error: true,
        }
    }

    /// 텍스트 콘텐츠를 줄바꿈으로 이어 붙임
    pub fn text(&self) -> String {
        self.content
            .iter()
            .filter_map(|c| match c {
                McpContent::Text { text } => Some(text.as_str()),
                _ => None,
            })
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// `initialize` 응답에서 쓰는 서버 정보
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct ServerInfo {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub version: String,
}

/// `initialize` 응답
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct InitializeResult {
    #[serde(default)]
    pub protocol_version: String,
    #[serde(default)]
    pub server_info: ServerInfo,
    #[serde(default)]
    pub capabilities: Value,
}

fn default_schema() -> Value {
    serde_json::json!({ "type": "object" })
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_tool_result() {
        let result: McpToolResult = serde_json::from_value(json!({
            "content": [
                {"type": "text", "text": "line 1"},
                {"type": "image", "data": "AAA", "mimeType": "image/png"},
                {"type": "audio", "data": "x"},
                {"type": "text", "text": "line 2"}
            ],
            "isError": true
        }))
        .unwrap();

        assert!(result.is_error);
        assert_eq!(result.content[2], McpContent::Unknown);
        assert_eq!(result.text(), "line 1\nline 2");
        assert!(!McpToolResult::success("ok").is_error);
    }

    #[test]
    fn test_list_page() {
        let page: ListToolsPage = serde_json::from_value(json!({
            "tools": [{"name": "echo"}],
            "nextCursor": "c2"
        }))
        .unwrap();
        assert_eq!(page.tools[0].input_schema["type"], "object");
        assert_eq!(page.next_cursor.as_deref(), Some("c2"));
    }

    #[test]
    fn test_initialize_result() {
        let init: InitializeResult = serde_json::from_value(json!({
            "protocolVersion": "2024-11-05",
            "serverInfo": {"name": "mock", "version": "1.0"},
            "capabilities": {"tools": {}}
        }))
        .unwrap();
        assert_eq!(init.server_info.name, "mock");
    }
}
