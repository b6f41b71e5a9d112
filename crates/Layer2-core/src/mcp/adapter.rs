//! Backend Adapter - 백엔드 프로세스 하나의 생명주기
//!
//! 상태 전이:
//!
//! ```text
//! Starting ──(stderr marker | fallback timer)──▶ Ready ──(initialize ack)──▶ Initialized
//!     └──────────────────(initialize ack)───────────────────────────────────▲
//! any ──(process exit | stop)──▶ Exited
//! any ──(handshake failure)──▶ Failed
//! ```
//!
//! `initialize`는 시작 직후 보내며 그 응답이 기본 준비 신호입니다.
//! stderr 마커는 선택적인 보조 신호, 타이머는 마지막 안전장치입니다.

use super::transport::{ExitInfo, StdioTransport};
use super::types::{InitializeResult, ListToolsPage, McpTool, McpToolResult, ServerInfo};
use parking_lot::RwLock;
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, watch};
use toolgate_foundation::{Error, GatewayConfig, McpServer, Result};
use tracing::{debug, error, info, warn};

/// 페이지네이션 상한
const MAX_LIST_PAGES: usize = 100;

const TOOLS_LIST_CHANGED: &str = "notifications/tools/list_changed";

/// 어댑터 상태
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum AdapterState {
    Starting,
    Ready,
    Initialized,
    Exited,
    Failed,
}

impl AdapterState {
    /// 호출 가능한 상태인지
    pub fn is_ready(&self) -> bool {
        matches!(self, Self::Ready | Self::Initialized)
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::Exited | Self::Failed)
    }
}

/// 라우터가 관찰하는 백엔드 이벤트
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BackendEvent {
    /// 프로세스 종료. `expected`는 `stop()`으로 인한 종료
    Exited {
        server: String,
        code: Option<i32>,
        expected: bool,
    },
}

/// 어댑터 옵션 (게이트웨이 설정 + 백엔드별 재정의)
#[derive(Debug, Clone, PartialEq)]
pub struct AdapterOptions {
    pub request_timeout: Duration,
    pub ready_timeout: Duration,
    pub protocol_version: String,
    pub client_name: String,
    pub client_version: String,
}

impl Default for AdapterOptions {
    fn default() -> Self {
        Self::from_config(&GatewayConfig::default())
    }
}

impl AdapterOptions {
    pub fn from_config(config: &GatewayConfig) -> Self {
        Self {
            request_timeout: config.request_timeout(),
            ready_timeout: config.ready_timeout(),
            protocol_version: config.protocol_version.clone(),
            client_name: config.client_name.clone(),
            client_version: env!("CARGO_PKG_VERSION").to_string(),
        }
    }

    /// 백엔드별 `timeoutSecs` 적용
    pub fn for_server(&self, server: &McpServer) -> Self {
        let mut options = self.clone();
        if let Some(secs) = server.timeout_secs {
            options.request_timeout = Duration::from_secs(secs);
        }
        options
    }
}

/// `tools/list` 결과 캐시
#[derive(Debug, Clone, Default)]
enum ToolCache {
    #[default]
    Empty,
    Listed(Vec<McpTool>),
    /// 마지막 조회 실패 (list_changed 알림 전까지 다시 조회하지 않음)
    Unavailable(String),
}

/// 백엔드 어댑터
pub struct BackendAdapter {
    name: String,
    config: McpServer,
    options: AdapterOptions,
    state: Arc<watch::Sender<AdapterState>>,
    transport: RwLock<Option<Arc<StdioTransport>>>,
    server_info: Arc<RwLock<Option<ServerInfo>>>,
    last_error: Arc<RwLock<Option<String>>>,
    tools: Arc<RwLock<ToolCache>>,
    events: broadcast::Sender<BackendEvent>,
}

impl BackendAdapter {
    pub fn new(
        name: impl Into<String>,
        config: McpServer,
        options: AdapterOptions,
        events: broadcast::Sender<BackendEvent>,
    ) -> Self {
        let options = options.for_server(&config);
        let (state, _) = watch::channel(AdapterState::Starting);
        Self {
            name: name.into(),
            config,
            options,
            state: Arc::new(state),
            transport: RwLock::new(None),
            server_info: Arc::new(RwLock::new(None)),
            last_error: Arc::new(RwLock::new(None)),
            tools: Arc::new(RwLock::new(ToolCache::Empty)),
            events,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn config(&self) -> &McpServer {
        &self.config
    }

    pub fn options(&self) -> &AdapterOptions {
        &self.options
    }

    pub fn state(&self) -> AdapterState {
        *self.state.borrow()
    }

    /// Ready 또는 Initialized 이고 종료되지 않음
    pub fn ready(&self) -> bool {
        self.state().is_ready()
    }

    pub fn server_info(&self) -> Option<ServerInfo> {
        self.server_info.read().clone()
    }

    pub fn last_error(&self) -> Option<String> {
        self.last_error.read().clone()
    }

    /// 프로세스 시작 + 핸드셰이크
    ///
    /// 핸드셰이크 응답, stderr 마커, 대체 타이머 중 먼저 오는 것으로 반환합니다.
    /// 타이머로 반환한 경우 핸드셰이크는 백그라운드에서 계속됩니다.
    pub async fn start(&self) -> Result<()> {
        if self.transport.read().is_some() {
            warn!("Backend '{}' already started", self.name);
            return Ok(());
        }

        self.state.send_replace(AdapterState::Starting);
        let transport = match StdioTransport::spawn(&self.name, &self.config, self.options.request_timeout) {
            Ok(t) => Arc::new(t),
            Err(e) => {
                error!("{}", e);
                *self.last_error.write() = Some(e.to_string());
                self.state.send_replace(AdapterState::Failed);
                return Err(e);
            }
        };
        *self.transport.write() = Some(Arc::clone(&transport));

        self.spawn_exit_watch(Arc::clone(&transport));
        self.spawn_list_changed_watch(&transport);
        self.spawn_handshake(Arc::clone(&transport));

        let marker = transport.ready_marker();
        let marker_seen = async move {
            match marker {
                Some(notify) => notify.notified().await,
                None => std::future::pending::<()>().await,
            }
        };

        let mut state_rx = self.state.subscribe();
        let settled = state_rx.wait_for(|s| matches!(s, AdapterState::Initialized | AdapterState::Failed | AdapterState::Exited));

        let outcome = tokio::select! {
            outcome = settled => {
                let state = outcome.map(|s| *s).unwrap_or(AdapterState::Exited);
                match state {
                    AdapterState::Initialized => Ok(()),
                    AdapterState::Failed => Err(Error::protocol(
                        &self.name,
                        self.last_error().unwrap_or_else(|| "handshake failed".to_string()),
                    )),
                    _ => Err(Error::exited(&self.name, "exited during startup")),
                }
            }
            _ = marker_seen => {
                self.promote_to_ready();
                info!("Backend '{}' signalled readiness on stderr", self.name);
                Ok(())
            }
            _ = tokio::time::sleep(self.options.ready_timeout) => {
                self.promote_to_ready();
                warn!(
                    "Backend '{}' did not acknowledge within {:?}; accepting and continuing handshake",
                    self.name, self.options.ready_timeout
                );
                Ok(())
            }
        };

        // 등록되지 않는 백엔드는 여기서 프로세스까지 정리
        if outcome.is_err() {
            self.stop().await;
        }
        outcome
    }

    /// Starting → Ready (다른 상태는 유지)
    fn promote_to_ready(&self) {
        self.state.send_if_modified(|s| {
            if *s == AdapterState::Starting {
                *s = AdapterState::Ready;
                true
            } else {
                false
            }
        });
    }

    fn spawn_handshake(&self, transport: Arc<StdioTransport>) {
        let name = self.name.clone();
        let state = Arc::clone(&self.state);
        let server_info = Arc::clone(&self.server_info);
        let last_error = Arc::clone(&self.last_error);
        let params = json!({
            "protocolVersion": self.options.protocol_version,
            "capabilities": {},
            "clientInfo": {
                "name": self.options.client_name,
                "version": self.options.client_version,
            }
        });

        tokio::spawn(async move {
            let outcome = match transport.request("initialize", Some(params)).await {
                Ok(result) => {
                    let init: InitializeResult = match serde_json::from_value(result) {
                        Ok(init) => init,
                        Err(e) => {
                            warn!("Backend '{}' sent a malformed initialize result: {}", name, e);
                            InitializeResult::default()
                        }
                    };
                    match transport.notify("notifications/initialized", None).await {
                        Ok(()) => Ok(init),
                        Err(e) => Err(e),
                    }
                }
                Err(e) => Err(e),
            };

            match outcome {
                Ok(init) => {
                    info!(
                        "Backend '{}' initialized ({} {}, protocol {})",
                        name, init.server_info.name, init.server_info.version, init.protocol_version
                    );
                    *server_info.write() = Some(init.server_info);
                    state.send_if_modified(|s| {
                        if s.is_terminal() {
                            false
                        } else {
                            *s = AdapterState::Initialized;
                            true
                        }
                    });
                }
                Err(e) => {
                    *last_error.write() = Some(e.to_string());
                    let failed = state.send_if_modified(|s| {
                        if *s == AdapterState::Exited {
                            false
                        } else {
                            *s = AdapterState::Failed;
                            true
                        }
                    });
                    if failed {
                        error!("Backend '{}' handshake failed: {}", name, e);
                    }
                }
            }
        });
    }

    fn spawn_exit_watch(&self, transport: Arc<StdioTransport>) {
        let name = self.name.clone();
        let state = Arc::clone(&self.state);
        let events = self.events.clone();

        tokio::spawn(async move {
            let Some(ExitInfo { code, expected }) = transport.exited().await else {
                return;
            };
            state.send_replace(AdapterState::Exited);
            debug!("Backend '{}' exit observed (code {:?})", name, code);
            // 구독자가 없으면 무시
            let _ = events.send(BackendEvent::Exited {
                server: name,
                code,
                expected,
            });
        });
    }

    /// `notifications/tools/list_changed` → 캐시 비움
    fn spawn_list_changed_watch(&self, transport: &StdioTransport) {
        let name = self.name.clone();
        let tools = Arc::clone(&self.tools);
        let mut notifications = transport.subscribe_notifications();

        tokio::spawn(async move {
            loop {
                match notifications.recv().await {
                    Ok(method) if method == TOOLS_LIST_CHANGED => {
                        debug!("Backend '{}' tool list changed", name);
                        *tools.write() = ToolCache::Empty;
                    }
                    Ok(_) => {}
                    Err(broadcast::error::RecvError::Lagged(skipped)) => {
                        debug!("Backend '{}' skipped {} notifications", name, skipped);
                        *tools.write() = ToolCache::Empty;
                    }
                    Err(broadcast::error::RecvError::Closed) => break,
                }
            }
        });
    }

    fn transport(&self) -> Result<Arc<StdioTransport>> {
        self.transport
            .read()
            .clone()
            .ok_or_else(|| Error::BackendUnready(self.name.clone()))
    }

    /// 임의 JSON-RPC 요청
    pub async fn send_request(&self, method: &str, params: Option<Value>) -> Result<Value> {
        self.transport()?.request(method, params).await
    }

    /// `tools/list` (nextCursor 페이지네이션 포함)
    pub async fn list_tools(&self) -> Result<Vec<McpTool>> {
        let transport = self.transport()?;
        let mut tools = Vec::new();
        let mut cursor: Option<String> = None;

        for _ in 0..MAX_LIST_PAGES {
            let params = cursor.as_ref().map(|c| json!({ "cursor": c }));
            let result = transport.request("tools/list", params).await?;
            let page: ListToolsPage = serde_json::from_value(result)
                .map_err(|e| Error::protocol(&self.name, format!("invalid tools/list result: {}", e)))?;
            tools.extend(page.tools);

            match page.next_cursor.filter(|c| !c.is_empty()) {
                Some(next) => cursor = Some(next),
                None => {
                    debug!("Backend '{}' lists {} tools", self.name, tools.len());
                    *self.tools.write() = ToolCache::Listed(tools.clone());
                    return Ok(tools);
                }
            }
        }

        Err(Error::protocol(
            &self.name,
            format!("tools/list exceeded {} pages", MAX_LIST_PAGES),
        ))
    }

    /// 캐시된 목록에서 도구 조회
    ///
    /// 캐시에 없는 이름이면 한 번 다시 조회합니다. 조회가 실패하면 그 사실을
    /// 기억하고 이후 호출은 다시 조회하지 않고 `Err`를 돌려줍니다.
    pub async fn tool(&self, name: &str) -> Result<Option<McpTool>> {
        let cached = self.tools.read().clone();
        match cached {
            ToolCache::Listed(tools) => {
                if let Some(tool) = tools.into_iter().find(|t| t.name == name) {
                    return Ok(Some(tool));
                }
                debug!("Tool '{}' not cached for '{}', refreshing", name, self.name);
            }
            ToolCache::Unavailable(reason) => {
                return Err(Error::protocol(
                    &self.name,
                    format!("tool listing unavailable: {}", reason),
                ))
            }
            ToolCache::Empty => {}
        }

        match self.list_tools().await {
            Ok(tools) => Ok(tools.into_iter().find(|t| t.name == name)),
            Err(e) => {
                warn!("Backend '{}' tool listing failed: {}", self.name, e);
                *self.tools.write() = ToolCache::Unavailable(e.to_string());
                Err(e)
            }
        }
    }

    /// `tools/call`
    pub async fn call_tool(&self, name: &str, arguments: Value) -> Result<McpToolResult> {
        let params = json!({ "name": name, "arguments": arguments });
        let result = self.send_request("tools/call", Some(params)).await?;
        serde_json::from_value(result)
            .map_err(|e| Error::protocol(&self.name, format!("invalid tools/call result: {}", e)))
    }

    /// 정지 (멱등). 대기 요청은 모두 거부됨
    pub async fn stop(&self) {
        self.state.send_replace(AdapterState::Exited);
        let transport = self.transport.write().take();
        if let Some(transport) = transport {
            info!("Stopping backend '{}'", self.name);
            transport.close().await;
        }
        *self.tools.write() = ToolCache::Empty;
    }
}
