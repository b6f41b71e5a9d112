//! # toolgate-foundation
//!
//! Foundation layer for ToolGate:
//! - Error: 게이트웨이 에러 분류 (Spawn, Protocol, Timeout, NotFound, Unready ...)
//! - Core: 계층 간 공유 타입 (ToolSource, ToolPriority, SearchType)
//! - Registry: MCP 백엔드 등록 설정 (`mcp.json`, Claude Code 호환)
//! - Config: 게이트웨이 통합 설정 (`gateway.json` / `gateway.toml`)
//! - Storage: JsonStore (글로벌/프로젝트 설정 디렉토리)
//!
//! ## 아키텍처
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────┐
//! │  Layer4: toolgate CLI                                    │
//! │                     │                                   │
//! │          ┌─────────┴─────────┐                         │
//! │          ▼                   ▼                         │
//! │  Layer2: Core            Layer2: Tool                  │
//! │  (Adapter, Router)       (Catalog, Search, Export)     │
//! │          │                   │                         │
//! │          └─────────┬─────────┘                         │
//! │                    ▼                                   │
//! │  Layer1: Foundation (Error, Config, Storage)           │
//! └─────────────────────────────────────────────────────────┘
//! ```

pub mod config;
pub mod core;
pub mod error;
pub mod registry;
pub mod storage;

// ============================================================================
// Error
// ============================================================================
pub use error::{Error, Result};

// ============================================================================
// Core (공유 타입)
// ============================================================================
pub use core::{SearchType, ToolPriority, ToolSource};

// ============================================================================
// Config (설정)
// ============================================================================
pub use config::{
    BudgetSettings, CatalogSettings, GatewayConfig, PolicySettings, SearchSettings,
    DEFAULT_PROTOCOL_VERSION, GATEWAY_CONFIG_FILE, GATEWAY_CONFIG_TOML,
};

// ============================================================================
// Registry (백엔드 등록)
// ============================================================================
pub use registry::{McpConfig, McpConfigFile, McpServer, MCP_FILE};

// ============================================================================
// Storage (저장소)
// ============================================================================
pub use storage::{JsonStore, GLOBAL_DIR_NAME, PROJECT_DIR_NAME};
