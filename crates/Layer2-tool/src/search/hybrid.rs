//! Hybrid engine - BM25 + Regex merge

use super::{rank, Bm25Engine, MatchedField, RegexEngine, SearchResult};
use crate::catalog::ToolCatalog;
use std::collections::{BTreeSet, HashMap};

pub const BM25_WEIGHT: f64 = 0.6;
pub const REGEX_WEIGHT: f64 = 0.4;

struct Merged<'a> {
    result: SearchResult<'a>,
    fields: BTreeSet<MatchedField>,
}

/// 하이브리드 검색
///
/// `score = bm25 * 0.6 + regex * 0.4`. 한 엔진에서만 나온 결과는
/// 그 엔진의 가중치 몫만 받습니다.
pub struct HybridEngine<'a> {
    bm25: Bm25Engine<'a>,
    regex: RegexEngine<'a>,
}

impl<'a> HybridEngine<'a> {
    pub fn new(catalog: &'a ToolCatalog) -> Self {
        Self {
            bm25: Bm25Engine::new(catalog),
            regex: RegexEngine::new(catalog),
        }
    }

    pub fn bm25(&self) -> &Bm25Engine<'a> {
        &self.bm25
    }

    pub fn regex(&self) -> &RegexEngine<'a> {
        &self.regex
    }

    pub fn search(&self, query: &str) -> Vec<SearchResult<'a>> {
        let mut merged: HashMap<&str, Merged<'a>> = HashMap::new();

        let lexical = self.bm25.search(query);
        let pattern = self.regex.search_words(query);

        for (results, weight) in [(lexical, BM25_WEIGHT), (pattern, REGEX_WEIGHT)] {
            for r in results {
                let contribution = r.score * weight;
                let slot = merged.entry(r.tool.id.as_str()).or_insert_with(|| Merged {
                    result: SearchResult {
                        tool: r.tool,
                        score: 0.0,
                        matched_fields: Vec::new(),
                    },
                    fields: BTreeSet::new(),
                });
                slot.result.score += contribution;
                slot.fields.extend(r.matched_fields);
            }
        }

        let mut results: Vec<SearchResult<'a>> = merged
            .into_values()
            .map(|m| SearchResult {
                matched_fields: m.fields.into_iter().collect(),
                ..m.result
            })
            .collect();
        rank(&mut results);
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::fixtures;

    #[test]
    fn test_hybrid_formula() {
        let catalog = fixtures::catalog();
        let engine = HybridEngine::new(&catalog);

        let query = "github issue";
        let bm25: HashMap<_, _> = engine
            .bm25()
            .search(query)
            .into_iter()
            .map(|r| (r.tool.id.clone(), r.score))
            .collect();
        let regex: HashMap<_, _> = engine
            .regex()
            .search_words(query)
            .into_iter()
            .map(|r| (r.tool.id.clone(), r.score))
            .collect();

        let results = engine.search(query);
        assert!(!results.is_empty());
        for r in &results {
            let b = bm25.get(&r.tool.id).copied().unwrap_or(0.0);
            let x = regex.get(&r.tool.id).copied().unwrap_or(0.0);
            let expected = b * BM25_WEIGHT + x * REGEX_WEIGHT;
            assert!((r.score - expected).abs() < 1e-9, "{}", r.tool.id);
        }
    }

    #[test]
    fn test_matched_fields_union() {
        let catalog = fixtures::catalog();
        let engine = HybridEngine::new(&catalog);

        // 카테고리 "filesystem" 은 정규식에서만 매칭
        let results = engine.search("file");
        let read = results.iter().find(|r| r.tool.name == "read_file").unwrap();
        assert!(read.matched_fields.contains(&MatchedField::Name));
        assert!(read.matched_fields.contains(&MatchedField::Description));
        assert!(read.matched_fields.contains(&MatchedField::Category));
    }

    #[test]
    fn test_ties_broken_by_id() {
        let catalog = fixtures::catalog();
        let engine = HybridEngine::new(&catalog);
        let results = engine.search("github");
        for pair in results.windows(2) {
            assert!(
                pair[0].score > pair[1].score
                    || (pair[0].score == pair[1].score && pair[0].tool.id < pair[1].tool.id)
            );
        }
    }
}
