//! Catalog entry types

use serde::{Deserialize, Serialize};
use serde_json::Value;
use toolgate_foundation::{ToolPriority, ToolSource};

/// ID 구분자
pub const ID_SEPARATOR: &str = "__";

/// 생산자가 내놓는 원시 도구 설명
///
/// 우선순위와 지연 로딩 여부는 아직 결정되지 않은 상태이며,
/// `PriorityPolicy`가 빌드 시점에 한 번 결정합니다.
#[derive(Debug, Clone, PartialEq)]
pub struct ToolDescriptor {
    /// 도구 이름 (백엔드 안에서 고유)
    pub name: String,

    /// 사람이 읽는 설명
    pub description: String,

    /// JSON Schema
    pub input_schema: Value,

    /// 소유자 (MCP 서버, 크레이트, 에이전트 이름)
    pub server: String,

    /// 출처
    pub source: ToolSource,

    /// 카테고리 힌트
    pub category: Option<String>,

    /// 생산자 우선순위 힌트
    pub priority: Option<ToolPriority>,
}

impl ToolDescriptor {
    pub fn new(
        source: ToolSource,
        server: impl Into<String>,
        name: impl Into<String>,
        description: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            description: description.into(),
            input_schema: empty_object_schema(),
            server: server.into(),
            source,
            category: None,
            priority: None,
        }
    }

    pub fn schema(mut self, schema: Value) -> Self {
        self.input_schema = schema;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn priority(mut self, priority: ToolPriority) -> Self {
        self.priority = Some(priority);
        self
    }

    /// 출처별 네임스페이스 ID
    ///
    /// - `mcp__{server}__{tool}`
    /// - `crate__{crate}__{tool}`
    /// - `agent__{name}`
    /// - `builtin__{name}`
    pub fn id(&self) -> String {
        let prefix = self.source.id_prefix();
        match self.source {
            ToolSource::Mcp | ToolSource::CompiledCrate => format!(
                "{prefix}{sep}{}{sep}{}",
                self.server,
                self.name,
                sep = ID_SEPARATOR
            ),
            ToolSource::Subagent | ToolSource::Builtin => {
                format!("{prefix}{ID_SEPARATOR}{}", self.name)
            }
        }
    }

    /// 명시 카테고리가 없을 때의 기본값
    pub fn resolved_category(&self) -> String {
        if let Some(category) = self.category.as_deref().filter(|c| !c.trim().is_empty()) {
            return category.trim().to_string();
        }
        match self.source {
            ToolSource::Mcp | ToolSource::CompiledCrate => self.server.clone(),
            ToolSource::Subagent => "subagent".to_string(),
            ToolSource::Builtin => "gateway".to_string(),
        }
    }
}

/// 카탈로그 엔트리 (빌드 후 불변)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolCatalogEntry {
    pub id: String,
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub server: String,
    pub source: ToolSource,
    pub category: String,
    pub priority: ToolPriority,
    pub defer_loading: bool,
}

impl ToolCatalogEntry {
    /// 항상 로드되는 도구인지
    pub fn is_always_loaded(&self) -> bool {
        self.priority == ToolPriority::Always
    }
}

/// 외부 API의 도구 이름 규칙(`^[a-zA-Z0-9_-]{1,64}$`)에 맞게 정리
pub fn sanitize_tool_name(id: &str) -> String {
    let mut name: String = id
        .chars()
        .map(|c| {
            if c.is_ascii_alphanumeric() || c == '_' || c == '-' {
                c
            } else {
                '_'
            }
        })
        .collect();

    if name.is_empty() {
        name.push('_');
    }
    if name.len() > MAX_TOOL_NAME {
        // 잘린 이름끼리 겹치지 않도록 전체 id의 해시를 붙임
        let suffix = format!("_{:08x}", fnv1a(id.as_bytes()));
        name.truncate(MAX_TOOL_NAME - suffix.len());
        name.push_str(&suffix);
    }
    name
}

/// 내보내는 도구 이름 최대 길이
const MAX_TOOL_NAME: usize = 64;

/// 32-bit FNV-1a
fn fnv1a(bytes: &[u8]) -> u32 {
    bytes.iter().fold(0x811c_9dc5, |hash: u32, b| {
        (hash ^ u32::from(*b)).wrapping_mul(0x0100_0193)
    })
}

pub(crate) fn empty_object_schema() -> Value {
    serde_json::json!({ "type": "object", "properties": {} })
}
