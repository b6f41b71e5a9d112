//! Tool Catalog - 불변 카탈로그와 파생 인덱스

use super::entry::ToolCatalogEntry;
use crate::budget::{estimate_tokens, TokenEstimate};
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, HashMap};
use std::path::Path;
use toolgate_foundation::{BudgetSettings, Error, Result, ToolPriority, ToolSource};
use tracing::{debug, warn};

/// 스냅샷 포맷 버전
const SNAPSHOT_VERSION: u32 = 1;

/// 빌드된 도구 카탈로그
///
/// 엔트리 목록과 네 개의 파생 인덱스(서버/카테고리/출처/우선순위)는
/// 생성 시점에 한 번 계산되고 이후 변경되지 않습니다.
#[derive(Debug, Clone, Default)]
pub struct ToolCatalog {
    tools: Vec<ToolCatalogEntry>,
    by_id: HashMap<String, usize>,
    by_server: BTreeMap<String, Vec<usize>>,
    by_category: BTreeMap<String, Vec<usize>>,
    by_source: BTreeMap<ToolSource, Vec<usize>>,
    by_priority: BTreeMap<ToolPriority, Vec<usize>>,
    built_at: Option<DateTime<Utc>>,
}

/// 카탈로그 통계
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CatalogStats {
    pub total: usize,
    pub always_loaded: usize,
    pub deferred: usize,
    pub by_source: BTreeMap<ToolSource, usize>,
    pub by_priority: BTreeMap<ToolPriority, usize>,
    pub by_category: BTreeMap<String, usize>,
    pub tokens: TokenEstimate,
}

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CatalogSnapshot {
    version: u32,
    built_at: Option<DateTime<Utc>>,
    tools: Vec<ToolCatalogEntry>,
}

impl ToolCatalog {
    /// 엔트리 목록으로 카탈로그 생성
    ///
    /// 중복 ID는 먼저 들어온 엔트리가 남고 나머지는 버려집니다.
    pub fn from_entries(entries: Vec<ToolCatalogEntry>) -> Self {
        let mut catalog = Self {
            built_at: Some(Utc::now()),
            ..Self::default()
        };

        for mut entry in entries {
            if catalog.by_id.contains_key(&entry.id) {
                warn!("Duplicate tool id '{}' dropped", entry.id);
                continue;
            }
            if entry.priority == ToolPriority::Always {
                entry.defer_loading = false;
            }

            let idx = catalog.tools.len();
            catalog.by_id.insert(entry.id.clone(), idx);
            catalog
                .by_server
                .entry(entry.server.clone())
                .or_default()
                .push(idx);
            catalog
                .by_category
                .entry(entry.category.clone())
                .or_default()
                .push(idx);
            catalog.by_source.entry(entry.source).or_default().push(idx);
            catalog
                .by_priority
                .entry(entry.priority)
                .or_default()
                .push(idx);
            catalog.tools.push(entry);
        }

        debug!("Catalog indexed with {} tools", catalog.tools.len());
        catalog
    }

    /// 전체 엔트리 (빌드 순서)
    pub fn tools(&self) -> &[ToolCatalogEntry] {
        &self.tools
    }

    pub fn len(&self) -> usize {
        self.tools.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tools.is_empty()
    }

    pub fn built_at(&self) -> Option<DateTime<Utc>> {
        self.built_at
    }

    /// ID로 조회
    pub fn get(&self, id: &str) -> Option<&ToolCatalogEntry> {
        self.by_id.get(id).map(|&i| &self.tools[i])
    }

    pub fn contains(&self, id: &str) -> bool {
        self.by_id.contains_key(id)
    }

    /// `priority = always` 도구
    pub fn always_loaded_tools(&self) -> Vec<&ToolCatalogEntry> {
        self.collect(self.by_priority.get(&ToolPriority::Always))
    }

    /// `deferLoading = true` 도구
    pub fn deferred_tools(&self) -> Vec<&ToolCatalogEntry> {
        self.tools.iter().filter(|t| t.defer_loading).collect()
    }

    /// 즉시 로드되는 도구 (deferLoading = false)
    pub fn eager_tools(&self) -> Vec<&ToolCatalogEntry> {
        self.tools.iter().filter(|t| !t.defer_loading).collect()
    }

    pub fn by_category(&self, category: &str) -> Vec<&ToolCatalogEntry> {
        self.collect(self.by_category.get(category))
    }

    pub fn by_source(&self, source: ToolSource) -> Vec<&ToolCatalogEntry> {
        self.collect(self.by_source.get(&source))
    }

    pub fn by_server(&self, server: &str) -> Vec<&ToolCatalogEntry> {
        self.collect(self.by_server.get(server))
    }

    pub fn by_priority(&self, priority: ToolPriority) -> Vec<&ToolCatalogEntry> {
        self.collect(self.by_priority.get(&priority))
    }

    pub fn categories(&self) -> Vec<&str> {
        self.by_category.keys().map(|s| s.as_str()).collect()
    }

    pub fn servers(&self) -> Vec<&str> {
        self.by_server.keys().map(|s| s.as_str()).collect()
    }

    /// 지연 로딩 도구만 있는 카테고리
    pub fn deferred_categories(&self) -> Vec<&str> {
        self.by_category
            .iter()
            .filter(|(_, idxs)| idxs.iter().all(|&i| self.tools[i].defer_loading))
            .map(|(c, _)| c.as_str())
            .collect()
    }

    /// 통계 (출처/우선순위/카테고리별 개수 + 토큰 추정)
    pub fn stats(&self, budget: &BudgetSettings) -> CatalogStats {
        CatalogStats {
            total: self.tools.len(),
            always_loaded: self.always_loaded_tools().len(),
            deferred: self.tools.iter().filter(|t| t.defer_loading).count(),
            by_source: self.by_source.iter().map(|(k, v)| (*k, v.len())).collect(),
            by_priority: self
                .by_priority
                .iter()
                .map(|(k, v)| (*k, v.len()))
                .collect(),
            by_category: self
                .by_category
                .iter()
                .map(|(k, v)| (k.clone(), v.len()))
                .collect(),
            tokens: estimate_tokens(self, budget),
        }
    }

    // === Storage ===

    /// JSON 스냅샷 저장
    pub fn save(&self, path: &Path) -> Result<()> {
        let snapshot = CatalogSnapshot {
            version: SNAPSHOT_VERSION,
            built_at: self.built_at,
            tools: self.tools.clone(),
        };
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        let content = serde_json::to_string_pretty(&snapshot)?;
        std::fs::write(path, content)?;
        debug!("Catalog saved to {}", path.display());
        Ok(())
    }

    /// JSON 스냅샷 로드 (인덱스 재계산)
    pub fn load(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            Error::Catalog(format!("Failed to read {}: {}", path.display(), e))
        })?;
        let snapshot: CatalogSnapshot = serde_json::from_str(&content).map_err(|e| {
            Error::Catalog(format!("Failed to parse {}: {}", path.display(), e))
        })?;
        if snapshot.version > SNAPSHOT_VERSION {
            return Err(Error::Catalog(format!(
                "Unsupported catalog version {} in {}",
                snapshot.version,
                path.display()
            )));
        }

        let mut catalog = Self::from_entries(snapshot.tools);
        catalog.built_at = snapshot.built_at;
        Ok(catalog)
    }

    fn collect(&self, idxs: Option<&Vec<usize>>) -> Vec<&ToolCatalogEntry> {
        idxs.map(|v| v.iter().map(|&i| &self.tools[i]).collect())
            .unwrap_or_default()
    }
}
