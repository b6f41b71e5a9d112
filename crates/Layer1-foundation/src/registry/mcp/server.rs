use crate::storage::{load_json_file, JsonStore};
use crate::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::{Path, PathBuf};
use std::sync::OnceLock;

/// 설정 파일명
pub const MCP_FILE: &str = "mcp.json";

/// 개별 백엔드(MCP 서버) 설정
///
/// Claude Code 호환 형식:
/// ```json
/// {
///   "command": "npx",
///   "args": ["-y", "@modelcontextprotocol/server-github"],
///   "env": { "GITHUB_TOKEN": "${GITHUB_TOKEN}" },
///   "readyMarker": "running on stdio"
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Deserialize, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct McpServer {
    /// 실행 명령어
    pub command: String,

    /// 명령어 인자
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<String>,

    /// 환경 변수 (${VAR} 형식 지원)
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub env: HashMap<String, String>,

    /// 작업 디렉토리
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub cwd: Option<PathBuf>,

    /// 활성화 여부
    #[serde(default = "default_true")]
    pub enabled: bool,

    /// stderr 준비 신호 (부분 문자열). 없으면 핸드셰이크 응답과 타이머만 사용
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub ready_marker: Option<String>,

    /// 요청 타임아웃 재정의 (초)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub timeout_secs: Option<u64>,
}

impl McpServer {
    /// stdio 서버 생성
    pub fn new(command: impl Into<String>) -> Self {
        Self {
            command: command.into(),
            args: vec![],
            env: HashMap::new(),
            cwd: None,
            enabled: true,
            ready_marker: None,
            timeout_secs: None,
        }
    }

    /// 유효성 검증
    pub fn validate(&self) -> std::result::Result<(), String> {
        if self.command.trim().is_empty() {
            return Err("server requires a non-empty 'command'".to_string());
        }
        if self.timeout_secs == Some(0) {
            return Err("'timeoutSecs' must be greater than zero".to_string());
        }
        Ok(())
    }

    /// 환경변수 확장 (${VAR} 또는 ${VAR:-default})
    pub fn expand_env(&self) -> HashMap<String, String> {
        self.env
            .iter()
            .map(|(k, v)| (k.clone(), expand_env_var(v)))
            .collect()
    }

    // === Builder methods ===

    pub fn args(mut self, args: Vec<String>) -> Self {
        self.args = args;
        self
    }

    pub fn arg(mut self, arg: impl Into<String>) -> Self {
        self.args.push(arg.into());
        self
    }

    pub fn cwd(mut self, path: impl Into<PathBuf>) -> Self {
        self.cwd = Some(path.into());
        self
    }

    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.insert(key.into(), value.into());
        self
    }

    pub fn ready_marker(mut self, marker: impl Into<String>) -> Self {
        self.ready_marker = Some(marker.into());
        self
    }

    pub fn timeout(mut self, secs: u64) -> Self {
        self.timeout_secs = Some(secs);
        self
    }

    pub fn disabled(mut self) -> Self {
        self.enabled = false;
        self
    }
}

/// 백엔드 설정 컬렉션 (이름 -> 설정)
///
/// 파일에서는 래퍼 없이 `{ name: server }` 맵으로 표현됨
#[derive(Debug, Clone, Default, PartialEq, Deserialize, Serialize)]
#[serde(transparent)]
pub struct McpConfig {
    pub servers: BTreeMap<String, McpServer>,
}

impl McpConfig {
    pub fn new() -> Self {
        Self::default()
    }

    /// 서버 추가
    pub fn add(&mut self, name: impl Into<String>, server: McpServer) {
        self.servers.insert(name.into(), server);
    }

    /// 빌더 형태로 서버 추가
    pub fn with(mut self, name: impl Into<String>, server: McpServer) -> Self {
        self.add(name, server);
        self
    }

    /// 서버 조회
    pub fn get(&self, name: &str) -> Option<&McpServer> {
        self.servers.get(name)
    }

    /// 서버 개수
    pub fn len(&self) -> usize {
        self.servers.len()
    }

    /// 비어있는지 확인
    pub fn is_empty(&self) -> bool {
        self.servers.is_empty()
    }

    /// 활성화된 서버만
    pub fn iter_enabled(&self) -> impl Iterator<Item = (&String, &McpServer)> {
        self.servers.iter().filter(|(_, s)| s.enabled)
    }

    /// 유효성 검증
    pub fn validate(&self) -> std::result::Result<(), Vec<String>> {
        let errors: Vec<_> = self
            .servers
            .iter()
            .filter_map(|(name, s)| s.validate().err().map(|e| format!("{}: {}", name, e)))
            .collect();

        if errors.is_empty() {
            Ok(())
        } else {
            Err(errors)
        }
    }

    /// 다른 설정과 병합 (other가 우선)
    pub fn merge(&mut self, other: McpConfig) {
        self.servers.extend(other.servers);
    }

    // === Storage 연동 ===

    /// 글로벌 + 프로젝트 설정 로드 (프로젝트 우선)
    pub fn load() -> Result<Self> {
        let mut config = McpConfig::new();

        if let Ok(global) = JsonStore::global() {
            if let Some(file) = global.load_optional::<McpConfigFile>(MCP_FILE)? {
                config.merge(file.mcp_servers);
            }
        }

        if let Ok(project) = JsonStore::current_project() {
            if let Some(file) = project.load_optional::<McpConfigFile>(MCP_FILE)? {
                config.merge(file.mcp_servers);
            }
        }

        Ok(config)
    }

    /// 지정된 경로에서 로드 (`.mcp.json` 등)
    pub fn load_from(path: &Path) -> Result<Self> {
        let file: McpConfigFile = load_json_file(path)?;
        file.mcp_servers
            .validate()
            .map_err(|errors| Error::Config(errors.join("; ")))?;
        Ok(file.mcp_servers)
    }

    /// 프로젝트 설정 저장
    pub fn save_project(&self) -> Result<()> {
        let store = JsonStore::current_project()?;
        let file = McpConfigFile {
            mcp_servers: self.clone(),
        };
        store.save(MCP_FILE, &file)
    }
}

/// Claude Code 호환 설정 파일 구조
///
/// ```json
/// {
///   "mcpServers": {
///     "github": { "command": "npx", "args": ["-y", "@modelcontextprotocol/server-github"] }
///   }
/// }
/// ```
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
pub struct McpConfigFile {
    #[serde(default, rename = "mcpServers")]
    pub mcp_servers: McpConfig,
}

impl McpConfigFile {
    pub fn from_json(content: &str) -> Result<Self> {
        Ok(serde_json::from_str(content)?)
    }
}

/// 환경변수 확장
/// - ${VAR}: 환경변수 값
/// - ${VAR:-default}: 환경변수가 없으면 기본값
fn expand_env_var(value: &str) -> String {
    static RE_DEFAULT: OnceLock<regex::Regex> = OnceLock::new();
    static RE_SIMPLE: OnceLock<regex::Regex> = OnceLock::new();

    let re_default = RE_DEFAULT.get_or_init(|| {
        regex::Regex::new(r"\$\{([^}:]+):-([^}]*)\}").expect("static regex is valid")
    });
    let re_simple = RE_SIMPLE
        .get_or_init(|| regex::Regex::new(r"\$\{([^}]+)\}").expect("static regex is valid"));

    let result = re_default.replace_all(value, |caps: &regex::Captures| {
        std::env::var(&caps[1]).unwrap_or_else(|_| caps[2].to_string())
    });

    re_simple
        .replace_all(&result, |caps: &regex::Captures| {
            std::env::var(&caps[1]).unwrap_or_default()
        })
        .to_string()
}

fn default_true() -> bool {
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_server_builder() {
        let server = McpServer::new("npx")
            .arg("-y")
            .arg("@modelcontextprotocol/server-github")
            .env("NODE_ENV", "production")
            .ready_marker("running on stdio");

        assert_eq!(server.command, "npx");
        assert_eq!(server.args, vec!["-y", "@modelcontextprotocol/server-github"]);
        assert_eq!(server.ready_marker.as_deref(), Some("running on stdio"));
        assert!(server.enabled);
        assert!(server.validate().is_ok());
    }

    #[test]
    fn test_parse_claude_compatible_file() {
        let json = r#"{
            "mcpServers": {
                "github": {
                    "command": "npx",
                    "args": ["-y", "@modelcontextprotocol/server-github"],
                    "env": { "TOKEN": "abc" }
                },
                "weather": {
                    "command": "weather-mcp",
                    "enabled": false,
                    "readyMarker": "ready",
                    "timeoutSecs": 5
                }
            }
        }"#;

        let file = McpConfigFile::from_json(json).unwrap();
        let config = file.mcp_servers;
        assert_eq!(config.len(), 2);

        let weather = config.get("weather").unwrap();
        assert!(!weather.enabled);
        assert_eq!(weather.timeout_secs, Some(5));
        assert_eq!(weather.ready_marker.as_deref(), Some("ready"));

        let enabled: Vec<_> = config.iter_enabled().map(|(n, _)| n.as_str()).collect();
        assert_eq!(enabled, vec!["github"]);
    }

    #[test]
    fn test_merge_prefers_other() {
        let mut base = McpConfig::new().with("a", McpServer::new("one"));
        base.merge(McpConfig::new().with("a", McpServer::new("two")).with("b", McpServer::new("b")));

        assert_eq!(base.len(), 2);
        assert_eq!(base.get("a").unwrap().command, "two");
    }

    #[test]
    fn test_env_expansion() {
        std::env::set_var("TOOLGATE_TEST_VAR", "test_value");

        let expanded = expand_env_var("prefix_${TOOLGATE_TEST_VAR}_suffix");
        assert_eq!(expanded, "prefix_test_value_suffix");

        let with_default = expand_env_var("${TOOLGATE_NONEXISTENT:-default_val}");
        assert_eq!(with_default, "default_val");

        std::env::remove_var("TOOLGATE_TEST_VAR");
    }

    #[test]
    fn test_validation_error() {
        let config = McpConfig::new()
            .with("empty", McpServer::new("  "))
            .with("zero", McpServer::new("ok").timeout(0));

        let errors = config.validate().unwrap_err();
        assert_eq!(errors.len(), 2);
        assert!(errors[0].starts_with("empty:"));
    }

    #[test]
    fn test_load_from_path() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join(".mcp.json");
        std::fs::write(
            &path,
            r#"{"mcpServers": {"echo": {"command": "echo-mcp", "args": ["--stdio"]}}}"#,
        )
        .unwrap();

        let config = McpConfig::load_from(&path).unwrap();
        assert_eq!(config.get("echo").unwrap().args, vec!["--stdio"]);

        std::fs::write(&path, r#"{"mcpServers": {"bad": {"command": ""}}}"#).unwrap();
        assert!(McpConfig::load_from(&path).is_err());
    }
}
