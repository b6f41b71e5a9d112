//! Core Types - 계층 간 공유되는 도구 분류 타입

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

// ============================================================================
// ToolSource - 도구 출처
// ============================================================================

/// 도구 출처 (카탈로그 생산자 종류)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ToolSource {
    /// MCP 백엔드 프로세스의 `tools/list`
    Mcp,
    /// 컴파일된 크레이트의 도구 매니페스트
    CompiledCrate,
    /// 서브에이전트 정의
    Subagent,
    /// 게이트웨이 내장 도구
    Builtin,
}

impl ToolSource {
    pub const ALL: [ToolSource; 4] = [
        ToolSource::Mcp,
        ToolSource::CompiledCrate,
        ToolSource::Subagent,
        ToolSource::Builtin,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Mcp => "mcp",
            Self::CompiledCrate => "compiled_crate",
            Self::Subagent => "subagent",
            Self::Builtin => "builtin",
        }
    }

    /// 카탈로그 ID 접두사
    pub fn id_prefix(&self) -> &'static str {
        match self {
            Self::Mcp => "mcp",
            Self::CompiledCrate => "crate",
            Self::Subagent => "agent",
            Self::Builtin => "builtin",
        }
    }
}

impl fmt::Display for ToolSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolSource {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "mcp" => Ok(Self::Mcp),
            "compiled_crate" | "crate" => Ok(Self::CompiledCrate),
            "subagent" | "agent" => Ok(Self::Subagent),
            "builtin" => Ok(Self::Builtin),
            other => Err(format!("unknown tool source '{}'", other)),
        }
    }
}

// ============================================================================
// ToolPriority - 로딩 우선순위
// ============================================================================

/// 도구 로딩 우선순위
///
/// `Always`는 항상 컨텍스트에 로드되며 지연 로딩 대상이 될 수 없습니다.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ToolPriority {
    Always,
    High,
    Medium,
    Low,
}

impl ToolPriority {
    pub const ALL: [ToolPriority; 4] = [
        ToolPriority::Always,
        ToolPriority::High,
        ToolPriority::Medium,
        ToolPriority::Low,
    ];

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Always => "always",
            Self::High => "high",
            Self::Medium => "medium",
            Self::Low => "low",
        }
    }
}

impl fmt::Display for ToolPriority {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ToolPriority {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "always" => Ok(Self::Always),
            "high" => Ok(Self::High),
            "medium" => Ok(Self::Medium),
            "low" => Ok(Self::Low),
            other => Err(format!("unknown tool priority '{}'", other)),
        }
    }
}

// ============================================================================
// SearchType - 검색 엔진 선택
// ============================================================================

/// 검색 엔진 종류
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SearchType {
    /// 쿼리 모양으로 자동 선택 (정규식 메타문자 → Regex, 그 외 → Hybrid)
    #[default]
    Auto,
    Bm25,
    Regex,
    Hybrid,
}

impl SearchType {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Auto => "auto",
            Self::Bm25 => "bm25",
            Self::Regex => "regex",
            Self::Hybrid => "hybrid",
        }
    }
}

impl fmt::Display for SearchType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SearchType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "auto" => Ok(Self::Auto),
            "bm25" => Ok(Self::Bm25),
            "regex" => Ok(Self::Regex),
            "hybrid" => Ok(Self::Hybrid),
            other => Err(format!("unknown search type '{}'", other)),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_source_serde_and_parse() {
        let json = serde_json::to_string(&ToolSource::CompiledCrate).unwrap();
        assert_eq!(json, "\"compiled_crate\"");
        assert_eq!("compiled-crate".parse::<ToolSource>(), Ok(ToolSource::CompiledCrate));
        assert_eq!("agent".parse::<ToolSource>(), Ok(ToolSource::Subagent));
        assert!("plugin".parse::<ToolSource>().is_err());
    }

    #[test]
    fn test_priority_order() {
        assert!(ToolPriority::Always < ToolPriority::High);
        assert!(ToolPriority::Medium < ToolPriority::Low);
        assert_eq!("HIGH".parse::<ToolPriority>(), Ok(ToolPriority::High));
        assert_eq!(ToolPriority::Low.to_string(), "low");
    }

    #[test]
    fn test_search_type_default() {
        assert_eq!(SearchType::default(), SearchType::Auto);
        assert_eq!("bm25".parse::<SearchType>(), Ok(SearchType::Bm25));
    }
}
