//! Tool Search - BM25 / Regex / Hybrid
//!
//! ```text
//! query ─┬─ 정규식 메타문자 포함 ──▶ RegexEngine
//!        └─ 그 외 ─────────────────▶ HybridEngine (BM25·0.6 + Regex·0.4)
//!                                        │
//!                         category / source / minScore 필터
//!                                        │
//!                                   limit (기본 10)
//! ```
//!
//! 검색은 실패하지 않습니다. 빈 쿼리나 잘못된 패턴은 빈 결과 또는
//! 낮은 점수의 결과가 됩니다.

mod bm25;
mod hybrid;
mod pattern;
mod tokenizer;

pub use bm25::{Bm25Engine, BM25_B, BM25_K1};
pub use hybrid::{HybridEngine, BM25_WEIGHT, REGEX_WEIGHT};
pub use pattern::{derive_pattern, RegexEngine};
pub use tokenizer::tokenize;

use crate::catalog::{ToolCatalog, ToolCatalogEntry};
use serde::Serialize;
use std::cmp::Ordering;
use toolgate_foundation::{SearchType, ToolSource};

/// 기본 결과 개수
pub const DEFAULT_LIMIT: usize = 10;

/// 자동 선택 시 Regex 엔진으로 보내는 문자
pub const REGEX_METACHARACTERS: &[char] = &[
    '*', '+', '?', '^', '$', '{', '}', '(', ')', '|', '[', ']', '\\',
];

/// 매칭된 필드
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum MatchedField {
    Name,
    Description,
    Category,
}

/// 검색 결과
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SearchResult<'a> {
    pub tool: &'a ToolCatalogEntry,
    pub score: f64,
    pub matched_fields: Vec<MatchedField>,
}

/// 검색 옵션
#[derive(Debug, Clone, PartialEq)]
pub struct SearchOptions {
    pub search_type: SearchType,
    pub limit: usize,
    pub category: Option<String>,
    pub source: Option<ToolSource>,
    pub min_score: Option<f64>,
}

impl Default for SearchOptions {
    fn default() -> Self {
        Self {
            search_type: SearchType::Auto,
            limit: DEFAULT_LIMIT,
            category: None,
            source: None,
            min_score: None,
        }
    }
}

impl SearchOptions {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn search_type(mut self, search_type: SearchType) -> Self {
        self.search_type = search_type;
        self
    }

    pub fn limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }

    pub fn category(mut self, category: impl Into<String>) -> Self {
        self.category = Some(category.into());
        self
    }

    pub fn source(mut self, source: ToolSource) -> Self {
        self.source = Some(source);
        self
    }

    pub fn min_score(mut self, min_score: f64) -> Self {
        self.min_score = Some(min_score);
        self
    }

    fn accepts(&self, result: &SearchResult<'_>) -> bool {
        if let Some(category) = &self.category {
            if &result.tool.category != category {
                return false;
            }
        }
        if let Some(source) = self.source {
            if result.tool.source != source {
                return false;
            }
        }
        if let Some(min) = self.min_score {
            if result.score < min {
                return false;
            }
        }
        true
    }
}

/// 쿼리 모양으로 엔진 선택
pub fn resolve_search_type(query: &str, requested: SearchType) -> SearchType {
    match requested {
        SearchType::Auto if query.contains(REGEX_METACHARACTERS) => SearchType::Regex,
        SearchType::Auto => SearchType::Hybrid,
        explicit => explicit,
    }
}

/// 점수 내림차순, 동점은 ID 오름차순
pub(crate) fn rank(results: &mut [SearchResult<'_>]) {
    results.sort_by(|a, b| match b.score.total_cmp(&a.score) {
        Ordering::Equal => a.tool.id.cmp(&b.tool.id),
        other => other,
    });
}

/// 카탈로그 검색 파사드
///
/// 엔진 인덱스는 생성 시 한 번 계산됩니다.
pub struct ToolSearch<'a> {
    catalog: &'a ToolCatalog,
    hybrid: HybridEngine<'a>,
}

impl<'a> ToolSearch<'a> {
    pub fn new(catalog: &'a ToolCatalog) -> Self {
        Self {
            catalog,
            hybrid: HybridEngine::new(catalog),
        }
    }

    pub fn catalog(&self) -> &'a ToolCatalog {
        self.catalog
    }

    /// 검색 (필터는 병합 후, limit 적용 전)
    pub fn search(&self, query: &str, options: &SearchOptions) -> Vec<SearchResult<'a>> {
        let search_type = resolve_search_type(query, options.search_type);
        let mut results = match search_type {
            SearchType::Bm25 => self.hybrid.bm25().search(query),
            SearchType::Regex => self.hybrid.regex().search(query),
            SearchType::Hybrid | SearchType::Auto => self.hybrid.search(query),
        };

        results.retain(|r| options.accepts(r));
        results.truncate(options.limit);
        results
    }

    /// 자동완성 (BM25 어휘의 접두사 확장)
    pub fn suggest(&self, partial: &str, limit: usize) -> Vec<String> {
        self.hybrid.bm25().suggest(partial, limit)
    }
}


#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dispatch() {
        assert_eq!(resolve_search_type("github issue", SearchType::Auto), SearchType::Hybrid);
        assert_eq!(resolve_search_type("^github_.*", SearchType::Auto), SearchType::Regex);
        assert_eq!(resolve_search_type("a|b", SearchType::Auto), SearchType::Regex);
        assert_eq!(resolve_search_type("file.read", SearchType::Auto), SearchType::Hybrid);
        assert_eq!(resolve_search_type("^x", SearchType::Bm25), SearchType::Bm25);
    }

    #[test]
    fn test_github_issue_ranking() {
        let catalog = fixtures::catalog();
        let search = ToolSearch::new(&catalog);
        let results = search.search("github issue", &SearchOptions::default());

        let pos = |name: &str| results.iter().position(|r| r.tool.name == name);
        let github = pos("github_issue_create").expect("github tool found");
        assert_eq!(github, 0);
        if let Some(weather) = pos("weather_lookup") {
            assert!(results[github].score > results[weather].score);
        }
    }

    #[test]
    fn test_search_is_idempotent() {
        let catalog = fixtures::catalog();
        let search = ToolSearch::new(&catalog);
        let options = SearchOptions::default();

        let snapshot = |q: &str| -> Vec<(String, f64)> {
            search
                .search(q, &options)
                .into_iter()
                .map(|r| (r.tool.id.clone(), r.score))
                .collect()
        };
        assert_eq!(snapshot("issue"), snapshot("issue"));
        assert_eq!(snapshot("^github"), snapshot("^github"));
    }

    #[test]
    fn test_filters_before_limit() {
        let catalog = fixtures::catalog();
        let search = ToolSearch::new(&catalog);

        let options = SearchOptions::new().source(ToolSource::Subagent).limit(1);
        let results = search.search("issue", &options);
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tool.name, "issue-triager");

        let options = SearchOptions::new().category("github");
        assert!(search
            .search("issue", &options)
            .iter()
            .all(|r| r.tool.category == "github"));

        let options = SearchOptions::new().min_score(f64::MAX);
        assert!(search.search("issue", &options).is_empty());
    }

    #[test]
    fn test_garbage_queries_never_fail() {
        let catalog = fixtures::catalog();
        let search = ToolSearch::new(&catalog);
        let options = SearchOptions::default();

        assert!(search.search("", &options).is_empty());
        assert!(search.search("   ", &options).is_empty());
        assert!(search.search("zzqqxx", &options).is_empty());
        // 잘못된 정규식은 리터럴로 처리
        let _ = search.search("([unclosed", &options);
        let _ = search.search("\\", &options);
    }

    #[test]
    fn test_limit_default() {
        assert_eq!(SearchOptions::default().limit, DEFAULT_LIMIT);
    }

    #[test]
    fn test_suggest() {
        let catalog = fixtures::catalog();
        let search = ToolSearch::new(&catalog);
        let suggestions = search.suggest("github iss", 5);
        assert!(suggestions.contains(&"github issue".to_string()));
        assert!(suggestions.contains(&"github issues".to_string()));
    }
}
