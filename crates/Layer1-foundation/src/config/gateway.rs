//! Gateway Config - 게이트웨이 통합 설정
//!
//! 타임아웃, 검색, 카탈로그 정책, 토큰 예산을 하나로 관리합니다.
//! `gateway.json` 또는 `gateway.toml`을 글로벌 → 프로젝트 순으로 병합합니다.

use crate::core::{SearchType, ToolPriority, ToolSource};
use crate::storage::JsonStore;
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::debug;

/// 설정 파일명 (JSON)
pub const GATEWAY_CONFIG_FILE: &str = "gateway.json";

/// 설정 파일명 (TOML)
pub const GATEWAY_CONFIG_TOML: &str = "gateway.toml";

/// 기본 MCP 프로토콜 버전
pub const DEFAULT_PROTOCOL_VERSION: &str = "2024-11-05";

// ============================================================================
// Gateway Config (통합)
// ============================================================================

/// ToolGate 통합 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GatewayConfig {
    /// 버전 (마이그레이션용)
    pub version: u32,

    /// 요청 타임아웃 (밀리초, 기본 30초)
    pub request_timeout_ms: u64,

    /// 준비 신호 폴백 타임아웃 (밀리초, 기본 2초)
    pub ready_timeout_ms: u64,

    /// initialize 요청에 보낼 프로토콜 버전
    pub protocol_version: String,

    /// initialize 요청에 보낼 클라이언트 이름
    pub client_name: String,

    /// 검색 설정
    pub search: SearchSettings,

    /// 카탈로그 빌드 설정
    pub catalog: CatalogSettings,

    /// 토큰 예산 추정 설정
    pub budget: BudgetSettings,
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            version: 1,
            request_timeout_ms: 30_000,
            ready_timeout_ms: 2_000,
            protocol_version: DEFAULT_PROTOCOL_VERSION.to_string(),
            client_name: "toolgate".to_string(),
            search: SearchSettings::default(),
            catalog: CatalogSettings::default(),
            budget: BudgetSettings::default(),
        }
    }
}

/// 검색 설정 (에디터 설정 내보내기에도 사용)
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct SearchSettings {
    pub enabled: bool,
    pub search_type: SearchType,
    pub max_results: usize,
    /// 저장된 카탈로그 경로 (없으면 프로젝트 `.toolgate/catalog.json`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub catalog_path: Option<PathBuf>,
}

impl Default for SearchSettings {
    fn default() -> Self {
        Self {
            enabled: true,
            search_type: SearchType::Auto,
            max_results: 10,
            catalog_path: None,
        }
    }
}

/// 카탈로그 빌드 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct CatalogSettings {
    /// 컴파일된 크레이트 매니페스트 (파일 또는 디렉토리)
    pub manifest_paths: Vec<PathBuf>,
    /// 서브에이전트 정의 디렉토리 (*.md)
    pub subagent_dirs: Vec<PathBuf>,
    /// 내장 메타 도구 포함 여부
    pub include_builtins: bool,
    /// 우선순위 정책
    pub policy: PolicySettings,
}

impl Default for CatalogSettings {
    fn default() -> Self {
        Self {
            manifest_paths: vec![],
            subagent_dirs: vec![],
            include_builtins: true,
            policy: PolicySettings::default(),
        }
    }
}

/// 우선순위/지연 로딩 정책 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct PolicySettings {
    /// 항상 로드할 도구 (이름 또는 ID)
    pub always: Vec<String>,
    /// 도구별 우선순위 재정의 (이름 또는 ID → 우선순위)
    pub overrides: BTreeMap<String, ToolPriority>,
    /// 카테고리 기본 우선순위
    pub category_defaults: BTreeMap<String, ToolPriority>,
    /// 출처 기본 우선순위
    pub source_defaults: BTreeMap<ToolSource, ToolPriority>,
    /// 즉시 로드할 우선순위 (나머지는 지연 로딩)
    pub eager_priorities: Vec<ToolPriority>,
}

impl Default for PolicySettings {
    fn default() -> Self {
        let source_defaults = BTreeMap::from([
            (ToolSource::Builtin, ToolPriority::Always),
            (ToolSource::CompiledCrate, ToolPriority::High),
            (ToolSource::Mcp, ToolPriority::Medium),
            (ToolSource::Subagent, ToolPriority::Low),
        ]);
        Self {
            always: vec![],
            overrides: BTreeMap::new(),
            category_defaults: BTreeMap::new(),
            source_defaults,
            eager_priorities: vec![ToolPriority::Always],
        }
    }
}

/// 토큰 예산 추정 설정
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct BudgetSettings {
    /// 도구 정의 하나당 추정 토큰
    pub per_tool_tokens: u64,
    /// 검색 도구 자체의 정의 토큰
    pub search_tool_tokens: u64,
}

impl Default for BudgetSettings {
    fn default() -> Self {
        Self {
            per_tool_tokens: 350,
            search_tool_tokens: 500,
        }
    }
}

impl GatewayConfig {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn request_timeout(&self) -> Duration {
        Duration::from_millis(self.request_timeout_ms)
    }

    pub fn ready_timeout(&self) -> Duration {
        Duration::from_millis(self.ready_timeout_ms)
    }

    /// 유효성 검증
    pub fn validate(&self) -> Result<()> {
        if self.request_timeout_ms == 0 {
            return Err(Error::Config("requestTimeoutMs must be greater than zero".into()));
        }
        if self.ready_timeout_ms == 0 {
            return Err(Error::Config("readyTimeoutMs must be greater than zero".into()));
        }
        if self.search.max_results == 0 {
            return Err(Error::Config("search.maxResults must be greater than zero".into()));
        }
        Ok(())
    }

    /// 카탈로그 경로 (설정값 또는 프로젝트 기본 경로)
    pub fn catalog_path(&self) -> Result<PathBuf> {
        match &self.search.catalog_path {
            Some(path) => Ok(path.clone()),
            None => Ok(JsonStore::current_project()?.file_path("catalog.json")),
        }
    }

    // ========================================================================
    // Load
    // ========================================================================

    /// 글로벌 + 프로젝트 병합 로드 (프로젝트 우선, 필드 단위 병합)
    pub fn load() -> Result<Self> {
        let mut merged = Value::Object(Default::default());

        if let Ok(global) = JsonStore::global() {
            if let Some(layer) = read_layer(global.base_dir())? {
                merge_values(&mut merged, layer);
            }
        }

        if let Ok(project) = JsonStore::current_project() {
            if let Some(layer) = read_layer(project.base_dir())? {
                merge_values(&mut merged, layer);
            }
        }

        let config: GatewayConfig = serde_json::from_value(merged)
            .map_err(|e| Error::Config(format!("Invalid gateway config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }

    /// 지정된 파일에서 로드 (.json / .toml)
    pub fn load_from(path: &Path) -> Result<Self> {
        let value = read_config_file(path)?;
        let config: GatewayConfig = serde_json::from_value(value)
            .map_err(|e| Error::Config(format!("Invalid gateway config {}: {}", path.display(), e)))?;
        config.validate()?;
        Ok(config)
    }

    /// TOML 문자열에서 파싱
    pub fn from_toml(content: &str) -> Result<Self> {
        let value: Value = toml::from_str(content)
            .map_err(|e| Error::Config(format!("Invalid gateway TOML: {}", e)))?;
        let config: GatewayConfig = serde_json::from_value(value)
            .map_err(|e| Error::Config(format!("Invalid gateway config: {}", e)))?;
        config.validate()?;
        Ok(config)
    }
}

/// 디렉토리에서 gateway.json / gateway.toml 중 존재하는 것을 읽음
fn read_layer(dir: &Path) -> Result<Option<Value>> {
    for name in [GATEWAY_CONFIG_FILE, GATEWAY_CONFIG_TOML] {
        let path = dir.join(name);
        if path.exists() {
            debug!("Loading gateway config layer: {}", path.display());
            return read_config_file(&path).map(Some);
        }
    }
    Ok(None)
}

fn read_config_file(path: &Path) -> Result<Value> {
    let content = std::fs::read_to_string(path)
        .map_err(|e| Error::Config(format!("Failed to read {}: {}", path.display(), e)))?;

    let is_toml = path
        .extension()
        .map(|ext| ext.eq_ignore_ascii_case("toml"))
        .unwrap_or(false);

    if is_toml {
        toml::from_str::<Value>(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    } else {
        serde_json::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse {}: {}", path.display(), e)))
    }
}

/// JSON 객체 깊은 병합 (overlay 우선)
fn merge_values(base: &mut Value, overlay: Value) {
    match (base, overlay) {
        (Value::Object(base_map), Value::Object(overlay_map)) => {
            for (key, value) in overlay_map {
                match base_map.get_mut(&key) {
                    Some(existing) => merge_values(existing, value),
                    None => {
                        base_map.insert(key, value);
                    }
                }
            }
        }
        (base, overlay) => *base = overlay,
    }
}
