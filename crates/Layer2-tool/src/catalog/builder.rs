//! Catalog Builder - 여러 생산자를 동시에 실행해 카탈로그 구성

use super::{PriorityPolicy, ToolCatalog, ToolCatalogEntry};
use crate::producer::{BuiltinProducer, ManifestProducer, SubagentProducer, ToolProducer};
use futures::future::join_all;
use serde::Serialize;
use std::collections::HashSet;
use std::sync::Arc;
use toolgate_foundation::{CatalogSettings, ToolSource};
use tracing::{info, warn};

/// 생산자별 빌드 결과
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProducerReport {
    pub name: String,
    pub source: ToolSource,
    pub tools: usize,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

/// 빌드 리포트
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BuildReport {
    pub producers: Vec<ProducerReport>,
    pub total: usize,
    pub duplicates: Vec<String>,
}

impl BuildReport {
    /// 실패한 생산자
    pub fn failures(&self) -> impl Iterator<Item = &ProducerReport> {
        self.producers.iter().filter(|p| p.error.is_some())
    }

    pub fn is_complete(&self) -> bool {
        self.failures().next().is_none()
    }
}

/// 카탈로그 빌더
pub struct CatalogBuilder {
    producers: Vec<Arc<dyn ToolProducer>>,
    policy: PriorityPolicy,
}

impl CatalogBuilder {
    pub fn new(policy: PriorityPolicy) -> Self {
        Self {
            producers: Vec::new(),
            policy,
        }
    }

    /// 설정 기반 기본 생산자 (내장, 매니페스트, 서브에이전트)
    pub fn from_settings(settings: &CatalogSettings) -> Self {
        let mut builder = Self::new(PriorityPolicy::new(settings.policy.clone()));
        if settings.include_builtins {
            builder = builder.producer(BuiltinProducer::new());
        }
        if !settings.manifest_paths.is_empty() {
            builder = builder.producer(ManifestProducer::new(settings.manifest_paths.clone()));
        }
        if !settings.subagent_dirs.is_empty() {
            builder = builder.producer(SubagentProducer::new(settings.subagent_dirs.clone()));
        }
        builder
    }

    pub fn producer(mut self, producer: impl ToolProducer + 'static) -> Self {
        self.producers.push(Arc::new(producer));
        self
    }

    pub fn add_producer(&mut self, producer: Arc<dyn ToolProducer>) {
        self.producers.push(producer);
    }

    pub fn policy(&self) -> &PriorityPolicy {
        &self.policy
    }

    /// 모든 생산자를 동시에 실행하고 병합
    ///
    /// 생산자 실패는 리포트에만 기록되며 다른 생산자의 도구는 그대로 포함됩니다.
    /// 병합 순서는 등록 순서이며 중복 ID는 먼저 나온 쪽이 남습니다.
    pub async fn build(&self) -> (ToolCatalog, BuildReport) {
        let outcomes = join_all(self.producers.iter().map(|p| p.produce())).await;

        let mut report = BuildReport::default();
        let mut entries: Vec<ToolCatalogEntry> = Vec::new();
        let mut seen = HashSet::new();

        for (producer, outcome) in self.producers.iter().zip(outcomes) {
            match outcome {
                Ok(descriptors) => {
                    report.producers.push(ProducerReport {
                        name: producer.name().to_string(),
                        source: producer.source(),
                        tools: descriptors.len(),
                        error: None,
                    });
                    for d in descriptors {
                        let entry = self.policy.apply(d);
                        if !seen.insert(entry.id.clone()) {
                            warn!(
                                "Duplicate tool id '{}' from producer '{}' dropped",
                                entry.id,
                                producer.name()
                            );
                            report.duplicates.push(entry.id);
                            continue;
                        }
                        entries.push(entry);
                    }
                }
                Err(e) => {
                    warn!("Producer '{}' failed: {}", producer.name(), e);
                    report.producers.push(ProducerReport {
                        name: producer.name().to_string(),
                        source: producer.source(),
                        tools: 0,
                        error: Some(e.to_string()),
                    });
                }
            }
        }

        let catalog = ToolCatalog::from_entries(entries);
        report.total = catalog.len();
        info!(
            "Catalog built: {} tools from {} producers ({} failed)",
            report.total,
            report.producers.len(),
            report.failures().count()
        );
        (catalog, report)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolDescriptor;
    use crate::producer::StaticProducer;
    use async_trait::async_trait;
    use toolgate_foundation::{Error, Result, ToolPriority};

    struct FailingProducer;

    #[async_trait]
    impl ToolProducer for FailingProducer {
        fn name(&self) -> &str {
            "broken"
        }

        fn source(&self) -> ToolSource {
            ToolSource::Mcp
        }

        async fn produce(&self) -> Result<Vec<ToolDescriptor>> {
            Err(Error::Internal("backend listing exploded".into()))
        }
    }

    #[tokio::test]
    async fn test_failing_producer_is_isolated() {
        let builder = CatalogBuilder::new(PriorityPolicy::default())
            .producer(FailingProducer)
            .producer(BuiltinProducer::new())
            .producer(StaticProducer::new(
                "static",
                ToolSource::Mcp,
                vec![ToolDescriptor::new(ToolSource::Mcp, "github", "create_issue", "Create")],
            ));

        let (catalog, report) = builder.build().await;
        assert_eq!(catalog.len(), 4);
        assert!(!report.is_complete());

        let failed: Vec<_> = report.failures().map(|p| p.name.as_str()).collect();
        assert_eq!(failed, vec!["broken"]);
        assert!(report.producers[0].error.as_ref().unwrap().contains("exploded"));
    }

    #[tokio::test]
    async fn test_duplicates_reported() {
        let dup = ToolDescriptor::new(ToolSource::Mcp, "gh", "x", "first");
        let builder = CatalogBuilder::new(PriorityPolicy::default())
            .producer(StaticProducer::new("a", ToolSource::Mcp, vec![dup.clone()]))
            .producer(StaticProducer::new("b", ToolSource::Mcp, vec![dup]));

        let (catalog, report) = builder.build().await;
        assert_eq!(catalog.len(), 1);
        assert_eq!(report.duplicates, vec!["mcp__gh__x"]);
    }

    #[tokio::test]
    async fn test_from_settings_defaults() {
        let builder = CatalogBuilder::from_settings(&CatalogSettings::default());
        let (catalog, report) = builder.build().await;

        assert!(report.is_complete());
        assert_eq!(catalog.len(), 3);
        assert!(catalog
            .tools()
            .iter()
            .all(|t| t.priority == ToolPriority::Always && !t.defer_loading));
    }
}
