//! Error types for ToolGate
//!
//! 게이트웨이 전체 에러를 중앙에서 관리
//!
//! 백엔드 단위 에러(Spawn, Timeout, Exited 등)는 해당 백엔드에만 영향을 주고
//! 게이트웨이 전체로 전파되지 않습니다.

use thiserror::Error;

/// Result type alias
pub type Result<T> = std::result::Result<T, Error>;

/// ToolGate 에러 타입
#[derive(Error, Debug)]
pub enum Error {
    // ========================================================================
    // 설정 관련
    // ========================================================================
    #[error("Configuration error: {0}")]
    Config(String),

    // ========================================================================
    // 백엔드 프로세스 관련
    // ========================================================================
    #[error("Failed to spawn backend '{server}': {message}")]
    Spawn { server: String, message: String },

    #[error("Protocol error from '{server}': {message}")]
    Protocol { server: String, message: String },

    #[error("Request '{method}' to '{server}' timed out after {timeout_ms}ms")]
    RequestTimeout {
        server: String,
        method: String,
        timeout_ms: u64,
    },

    #[error("Backend '{name}' not found (registered: {})", format_available(.available))]
    BackendNotFound { name: String, available: Vec<String> },

    #[error("Backend '{0}' is not ready")]
    BackendUnready(String),

    #[error("Backend '{server}' exited: {reason}")]
    BackendExited { server: String, reason: String },

    // ========================================================================
    // JSON-RPC 관련
    // ========================================================================
    #[error("JSON-RPC error {code}: {message}")]
    Rpc { code: i64, message: String },

    // ========================================================================
    // Tool 관련
    // ========================================================================
    #[error("Invalid arguments for tool '{tool}': {message}")]
    InvalidArguments { tool: String, message: String },

    #[error("Catalog error: {0}")]
    Catalog(String),

    // ========================================================================
    // 외부 에러 변환
    // ========================================================================
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    #[error("JSON error: {0}")]
    Json(#[from] serde_json::Error),

    // ========================================================================
    // 기타
    // ========================================================================
    #[error("Internal error: {0}")]
    Internal(String),
}

fn format_available(available: &[String]) -> String {
    if available.is_empty() {
        "none".to_string()
    } else {
        available.join(", ")
    }
}

impl Error {
    /// 재시도 가능한 에러인지 확인
    pub fn is_retryable(&self) -> bool {
        matches!(
            self,
            Error::RequestTimeout { .. } | Error::BackendUnready(_) | Error::BackendExited { .. }
        )
    }

    /// 단일 백엔드에 국한된 에러인지 확인 (게이트웨이 전체 장애 아님)
    pub fn is_backend_scoped(&self) -> bool {
        matches!(
            self,
            Error::Spawn { .. }
                | Error::Protocol { .. }
                | Error::RequestTimeout { .. }
                | Error::BackendUnready(_)
                | Error::BackendExited { .. }
                | Error::Rpc { .. }
        )
    }

    /// Spawn 에러 생성 헬퍼
    pub fn spawn(server: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Spawn {
            server: server.into(),
            message: message.into(),
        }
    }

    /// Protocol 에러 생성 헬퍼
    pub fn protocol(server: impl Into<String>, message: impl Into<String>) -> Self {
        Error::Protocol {
            server: server.into(),
            message: message.into(),
        }
    }

    /// 종료 에러 생성 헬퍼
    pub fn exited(server: impl Into<String>, reason: impl Into<String>) -> Self {
        Error::BackendExited {
            server: server.into(),
            reason: reason.into(),
        }
    }

    /// 잘못된 인자 에러 생성 헬퍼
    pub fn invalid_arguments(tool: impl Into<String>, message: impl Into<String>) -> Self {
        Error::InvalidArguments {
            tool: tool.into(),
            message: message.into(),
        }
    }
}

// ============================================================================
// From 구현 (추가 변환)
// ============================================================================

impl From<String> for Error {
    fn from(s: String) -> Self {
        Error::Internal(s)
    }
}

impl From<&str> for Error {
    fn from(s: &str) -> Self {
        Error::Internal(s.to_string())
    }
}
