//! Gateway - 라우터와 카탈로그를 묶는 조립 지점
//!
//! 전역 싱글턴 없이 명시적으로 생성해서 `Arc`로 공유합니다.

use crate::router::{BackendRouter, McpToolProducer};
use parking_lot::RwLock;
use serde::Deserialize;
use serde_json::{json, Value};
use std::path::{Path, PathBuf};
use std::sync::Arc;
use toolgate_foundation::{Error, GatewayConfig, McpConfig, Result, SearchType, ToolSource};
use toolgate_tool::{
    BuildReport, CatalogBuilder, CatalogStats, SearchOptions, ToolCatalog, ToolSearch,
};
use tracing::info;

#[derive(Debug, Deserialize)]
struct SearchToolArgs {
    query: String,
    #[serde(default)]
    limit: Option<usize>,
    #[serde(default, rename = "type")]
    search_type: Option<SearchType>,
    #[serde(default)]
    category: Option<String>,
    #[serde(default)]
    source: Option<ToolSource>,
    #[serde(default, rename = "minScore")]
    min_score: Option<f64>,
}

#[derive(Debug, Deserialize)]
struct CallToolArgs {
    server: String,
    tool: String,
    #[serde(default = "empty_object")]
    arguments: Value,
}

/// 도구 게이트웨이
pub struct Gateway {
    config: GatewayConfig,
    router: Arc<BackendRouter>,
    catalog: RwLock<Arc<ToolCatalog>>,
}

impl Gateway {
    pub fn new(config: GatewayConfig, backends: McpConfig) -> Self {
        let router = Arc::new(BackendRouter::from_config(backends, &config));
        Self {
            config,
            router,
            catalog: RwLock::new(Arc::new(ToolCatalog::default())),
        }
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }

    pub fn router(&self) -> &Arc<BackendRouter> {
        &self.router
    }

    /// 백엔드 시작
    pub async fn start(&self) {
        self.router.initialize().await;
    }

    /// 현재 카탈로그 스냅샷
    pub fn catalog(&self) -> Arc<ToolCatalog> {
        Arc::clone(&self.catalog.read())
    }

    /// 내장 + 매니페스트 + 서브에이전트 + MCP 백엔드로 카탈로그 빌드
    pub async fn build_catalog(&self) -> BuildReport {
        let mut builder = CatalogBuilder::from_settings(&self.config.catalog);
        builder.add_producer(Arc::new(McpToolProducer::new(Arc::clone(&self.router))));

        let (catalog, report) = builder.build().await;
        *self.catalog.write() = Arc::new(catalog);
        report
    }

    /// 저장된 카탈로그 로드
    pub fn load_catalog(&self, path: &Path) -> Result<()> {
        let catalog = ToolCatalog::load(path)?;
        info!("Loaded {} tools from {}", catalog.len(), path.display());
        *self.catalog.write() = Arc::new(catalog);
        Ok(())
    }

    /// 카탈로그 저장 (경로 없으면 설정의 `catalogPath`)
    pub fn save_catalog(&self, path: Option<&Path>) -> Result<PathBuf> {
        let path = match path {
            Some(p) => p.to_path_buf(),
            None => self.config.catalog_path()?,
        };
        self.catalog().save(&path)?;
        info!("Catalog saved to {}", path.display());
        Ok(path)
    }

    pub fn stats(&self) -> CatalogStats {
        self.catalog().stats(&self.config.budget)
    }

    /// 설정 기본값이 적용된 검색 옵션
    pub fn search_options(&self) -> SearchOptions {
        SearchOptions::new()
            .search_type(self.config.search.search_type)
            .limit(self.config.search.max_results)
    }

    /// 게이트웨이 내장 도구 실행 (`search_tools`, `list_servers`, `call_tool`)
    pub async fn invoke_builtin(&self, name: &str, args: Value) -> Result<Value> {
        match name {
            "search_tools" => {
                let args: SearchToolArgs = serde_json::from_value(args)
                    .map_err(|e| Error::invalid_arguments(name, e.to_string()))?;
                let mut options = self.search_options();
                if let Some(limit) = args.limit {
                    options = options.limit(limit);
                }
                if let Some(t) = args.search_type {
                    options = options.search_type(t);
                }
                options.category = args.category;
                options.source = args.source;
                if let Some(min) = args.min_score {
                    options = options.min_score(min);
                }

                let catalog = self.catalog();
                let search = ToolSearch::new(&catalog);
                let results = search.search(&args.query, &options);
                Ok(serde_json::to_value(&results)?)
            }
            "list_servers" => Ok(serde_json::to_value(self.router.get_status())?),
            "call_tool" => {
                let args: CallToolArgs = serde_json::from_value(args)
                    .map_err(|e| Error::invalid_arguments(name, e.to_string()))?;
                let result = self
                    .router
                    .call_tool(&args.server, &args.tool, args.arguments)
                    .await?;
                Ok(serde_json::to_value(result)?)
            }
            other => Err(Error::invalid_arguments(
                other,
                "not a gateway builtin tool".to_string(),
            )),
        }
    }

    /// 백엔드 정지
    pub async fn shutdown(&self) {
        self.router.shutdown().await;
    }
}

fn empty_object() -> Value {
    json!({})
}
