//! MCP 백엔드 도구 → 카탈로그 생산자

use super::{BackendRouter, ServerTools};
use async_trait::async_trait;
use std::sync::Arc;
use toolgate_foundation::{Result, ToolSource};
use toolgate_tool::{ToolDescriptor, ToolProducer};
use tracing::warn;

/// 라우터의 `list_all_tools()` 결과를 도구 설명으로 변환
///
/// 서버 이름이 소유자이자 카테고리가 됩니다. 목록 조회에 실패한 서버는 건너뜁니다.
pub struct McpToolProducer {
    router: Arc<BackendRouter>,
}

impl McpToolProducer {
    pub fn new(router: Arc<BackendRouter>) -> Self {
        Self { router }
    }
}

#[async_trait]
impl ToolProducer for McpToolProducer {
    fn name(&self) -> &str {
        "mcp"
    }

    fn source(&self) -> ToolSource {
        ToolSource::Mcp
    }

    async fn produce(&self) -> Result<Vec<ToolDescriptor>> {
        let listing = self.router.list_all_tools().await;
        let mut descriptors = Vec::new();

        for (server, slot) in listing.tools {
            match slot {
                ServerTools::Tools { tools } => {
                    descriptors.extend(tools.into_iter().map(|t| {
                        ToolDescriptor::new(
                            ToolSource::Mcp,
                            &server,
                            t.name,
                            t.description.unwrap_or_default(),
                        )
                        .schema(t.input_schema)
                        .category(&server)
                    }));
                }
                ServerTools::Error { error } => {
                    warn!("Skipping tools of '{}' in catalog: {}", server, error);
                }
            }
        }

        Ok(descriptors)
    }
}

#[cfg(all(test, unix))]
mod tests {
    use super::*;
    use crate::mcp::test_support::mock_backend;
    use crate::mcp::AdapterOptions;
    use toolgate_foundation::{McpConfig, ToolPriority};
    use toolgate_tool::{BuiltinProducer, CatalogBuilder, PriorityPolicy};

    #[tokio::test]
    async fn test_catalog_from_router() {
        let router = Arc::new(BackendRouter::new(
            McpConfig::new().with("alpha", mock_backend()),
            AdapterOptions::default(),
        ));
        router.initialize().await;

        let (catalog, report) = CatalogBuilder::new(PriorityPolicy::default())
            .producer(BuiltinProducer::new())
            .producer(McpToolProducer::new(Arc::clone(&router)))
            .build()
            .await;

        assert!(report.is_complete());
        let entry = catalog.get("mcp__alpha__echo").expect("echo cataloged");
        assert_eq!(entry.category, "alpha");
        assert_eq!(entry.priority, ToolPriority::Medium);
        assert!(entry.defer_loading);
        assert_eq!(catalog.by_server("alpha").len(), 1);

        router.shutdown().await;
    }
}
