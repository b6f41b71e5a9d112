//! Backend Router - 이름으로 주소 지정되는 백엔드 레지스트리
//!
//! - 모든 백엔드를 동시에 시작하고 결과를 모읍니다 (scatter/gather)
//! - 한 백엔드의 실패는 로그만 남기고 나머지에 영향을 주지 않습니다
//! - 종료 이벤트를 `subscribe()`로 노출하지만 재시작하지는 않습니다

mod producer;

pub use producer::McpToolProducer;

use crate::mcp::{
    validate_arguments, AdapterOptions, BackendAdapter, BackendEvent, McpTool, McpToolResult,
};
use futures::future::join_all;
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::Value;
use std::collections::{BTreeMap, HashMap};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::{broadcast, Mutex};
use toolgate_foundation::{Error, GatewayConfig, McpConfig, Result};
use tracing::{debug, info, warn};

/// 이벤트 채널 버퍼
const EVENT_CAPACITY: usize = 64;

/// 라우터 상태 (순수 조회)
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouterStatus {
    pub initialized: bool,
    pub servers: BTreeMap<String, bool>,
    pub total: usize,
    pub ready_count: usize,
}

/// 서버 하나의 도구 목록 또는 오류
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ServerTools {
    Tools { tools: Vec<McpTool> },
    Error { error: String },
}

/// `list_all_tools()` 결과
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct ToolListing {
    pub servers: Vec<String>,
    pub tools: BTreeMap<String, ServerTools>,
}

/// 백엔드 라우터
pub struct BackendRouter {
    configs: McpConfig,
    options: AdapterOptions,
    registry: RwLock<HashMap<String, Arc<BackendAdapter>>>,
    initialized: AtomicBool,
    init_lock: Mutex<()>,
    events: broadcast::Sender<BackendEvent>,
}

impl BackendRouter {
    pub fn new(configs: McpConfig, options: AdapterOptions) -> Self {
        let (events, _) = broadcast::channel(EVENT_CAPACITY);
        Self {
            configs,
            options,
            registry: RwLock::new(HashMap::new()),
            initialized: AtomicBool::new(false),
            init_lock: Mutex::new(()),
            events,
        }
    }

    pub fn from_config(configs: McpConfig, gateway: &GatewayConfig) -> Self {
        Self::new(configs, AdapterOptions::from_config(gateway))
    }

    pub fn configs(&self) -> &McpConfig {
        &self.configs
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized.load(Ordering::SeqCst)
    }

    /// 백엔드 종료 이벤트 구독
    pub fn subscribe(&self) -> broadcast::Receiver<BackendEvent> {
        self.events.subscribe()
    }

    /// 활성화된 모든 백엔드를 동시에 시작
    ///
    /// 실패한 백엔드는 등록되지 않으며, 끝나면 항상 `initialized = true`.
    /// 두 번째 호출은 경고만 남기고 아무것도 하지 않습니다.
    pub async fn initialize(&self) {
        let _guard = self.init_lock.lock().await;
        if self.is_initialized() {
            warn!("Backend router already initialized");
            return;
        }

        let adapters: Vec<Arc<BackendAdapter>> = self
            .configs
            .iter_enabled()
            .map(|(name, config)| {
                Arc::new(BackendAdapter::new(
                    name.clone(),
                    config.clone(),
                    self.options.clone(),
                    self.events.clone(),
                ))
            })
            .collect();

        info!("Starting {} backends", adapters.len());
        let outcomes = join_all(adapters.iter().map(|a| a.start())).await;

        let mut registered = 0;
        {
            let mut registry = self.registry.write();
            for (adapter, outcome) in adapters.into_iter().zip(outcomes) {
                match outcome {
                    Ok(()) => {
                        registry.insert(adapter.name().to_string(), adapter);
                        registered += 1;
                    }
                    Err(e) => warn!("Backend '{}' failed to start: {}", adapter.name(), e),
                }
            }
        }

        self.initialized.store(true, Ordering::SeqCst);
        info!("Backend router initialized ({} registered)", registered);
    }

    /// 등록된 서버 이름 (정렬)
    pub fn server_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.registry.read().keys().cloned().collect();
        names.sort();
        names
    }

    /// 이름으로 어댑터 조회
    pub fn get_server(&self, name: &str) -> Result<Arc<BackendAdapter>> {
        let found = self.registry.read().get(name).cloned();
        if let Some(adapter) = found {
            return Ok(adapter);
        }
        Err(Error::BackendNotFound {
            name: name.to_string(),
            available: self.server_names(),
        })
    }

    /// 모든 백엔드의 도구 목록 (백엔드별 오류 격리)
    pub async fn list_all_tools(&self) -> ToolListing {
        let adapters: Vec<Arc<BackendAdapter>> = {
            let registry = self.registry.read();
            let mut adapters: Vec<_> = registry.values().cloned().collect();
            adapters.sort_by(|a, b| a.name().cmp(b.name()));
            adapters
        };

        let outcomes = join_all(adapters.iter().map(|a| a.list_tools())).await;

        let mut listing = ToolListing::default();
        for (adapter, outcome) in adapters.iter().zip(outcomes) {
            let name = adapter.name().to_string();
            let slot = match outcome {
                Ok(tools) => ServerTools::Tools { tools },
                Err(e) => {
                    warn!("Listing tools of '{}' failed: {}", name, e);
                    ServerTools::Error {
                        error: e.to_string(),
                    }
                }
            };
            listing.servers.push(name.clone());
            listing.tools.insert(name, slot);
        }
        listing
    }

    /// 도구 호출
    ///
    /// 알 수 없는 서버는 등록된 이름 목록과 함께 즉시 거부되고,
    /// 준비되지 않은 서버는 `BackendUnready`로 거부됩니다.
    /// 인자는 도구의 `inputSchema`로 검증한 뒤 전달합니다. 도구 목록을 얻을 수
    /// 없는 백엔드는 검증 없이 전달합니다.
    pub async fn call_tool(&self, server: &str, tool: &str, args: Value) -> Result<McpToolResult> {
        let adapter = self.get_server(server)?;
        if !adapter.ready() {
            return Err(Error::BackendUnready(server.to_string()));
        }

        match adapter.tool(tool).await {
            Ok(Some(def)) => validate_arguments(&def.input_schema, &args)
                .map_err(|message| Error::invalid_arguments(tool, message))?,
            Ok(None) => {
                return Err(Error::invalid_arguments(
                    tool,
                    format!("backend '{}' does not offer this tool", server),
                ))
            }
            Err(e) => debug!("Schema lookup for '{}' on '{}' skipped: {}", tool, server, e),
        }

        adapter.call_tool(tool, args).await
    }

    /// 상태 조회 (부작용 없음)
    pub fn get_status(&self) -> RouterStatus {
        let registry = self.registry.read();
        let servers: BTreeMap<String, bool> = registry
            .iter()
            .map(|(name, adapter)| (name.clone(), adapter.ready()))
            .collect();
        let ready_count = servers.values().filter(|r| **r).count();

        RouterStatus {
            initialized: self.is_initialized(),
            total: servers.len(),
            ready_count,
            servers,
        }
    }

    /// 모든 백엔드 정지, 레지스트리 비움, `initialized = false`
    pub async fn shutdown(&self) {
        let _guard = self.init_lock.lock().await;
        let adapters: Vec<Arc<BackendAdapter>> =
            self.registry.write().drain().map(|(_, a)| a).collect();

        if !adapters.is_empty() {
            info!("Shutting down {} backends", adapters.len());
        }
        join_all(adapters.iter().map(|a| a.stop())).await;

        self.initialized.store(false, Ordering::SeqCst);
    }
}
