//! BM25 lexical engine

use super::tokenizer::tokenize;
use super::{rank, MatchedField, SearchResult};
use crate::catalog::ToolCatalog;
use std::collections::{BTreeSet, HashMap, HashSet};

/// 단어 빈도 포화 계수
pub const BM25_K1: f64 = 1.2;

/// 문서 길이 정규화 계수
pub const BM25_B: f64 = 0.75;

struct Document {
    name: HashSet<String>,
    description: HashSet<String>,
    category: HashSet<String>,
    term_freq: HashMap<String, usize>,
    len: usize,
}

/// BM25 인덱스 (name + description + category)
pub struct Bm25Engine<'a> {
    catalog: &'a ToolCatalog,
    docs: Vec<Document>,
    doc_freq: HashMap<String, usize>,
    avg_len: f64,
}

impl<'a> Bm25Engine<'a> {
    pub fn new(catalog: &'a ToolCatalog) -> Self {
        let mut docs = Vec::with_capacity(catalog.len());
        let mut doc_freq: HashMap<String, usize> = HashMap::new();
        let mut total_len = 0usize;

        for tool in catalog.tools() {
            let name = tokenize(&tool.name);
            let description = tokenize(&tool.description);
            let category = tokenize(&tool.category);

            let mut term_freq: HashMap<String, usize> = HashMap::new();
            for token in name.iter().chain(&description).chain(&category) {
                *term_freq.entry(token.clone()).or_default() += 1;
            }
            for term in term_freq.keys() {
                *doc_freq.entry(term.clone()).or_default() += 1;
            }

            let len = name.len() + description.len() + category.len();
            total_len += len;
            docs.push(Document {
                name: name.into_iter().collect(),
                description: description.into_iter().collect(),
                category: category.into_iter().collect(),
                term_freq,
                len,
            });
        }

        let avg_len = if docs.is_empty() {
            0.0
        } else {
            total_len as f64 / docs.len() as f64
        };

        Self {
            catalog,
            docs,
            doc_freq,
            avg_len,
        }
    }

    /// `ln(1 + (N - df + 0.5) / (df + 0.5))`
    pub fn idf(&self, term: &str) -> f64 {
        let n = self.docs.len() as f64;
        let df = self.doc_freq.get(term).copied().unwrap_or(0) as f64;
        (1.0 + (n - df + 0.5) / (df + 0.5)).ln()
    }

    /// 점수 > 0 인 전체 결과 (순위순)
    pub fn search(&self, query: &str) -> Vec<SearchResult<'a>> {
        let terms: BTreeSet<String> = tokenize(query).into_iter().collect();
        if terms.is_empty() || self.docs.is_empty() {
            return Vec::new();
        }

        let tools = self.catalog.tools();
        let mut results = Vec::new();

        for (doc, tool) in self.docs.iter().zip(tools) {
            let mut score = 0.0;
            let mut fields = BTreeSet::new();

            for term in &terms {
                let Some(&tf) = doc.term_freq.get(term) else {
                    continue;
                };
                let tf = tf as f64;
                let norm = if self.avg_len > 0.0 {
                    doc.len as f64 / self.avg_len
                } else {
                    0.0
                };
                score += self.idf(term) * tf * (BM25_K1 + 1.0)
                    / (tf + BM25_K1 * (1.0 - BM25_B + BM25_B * norm));

                if doc.name.contains(term) {
                    fields.insert(MatchedField::Name);
                }
                if doc.description.contains(term) {
                    fields.insert(MatchedField::Description);
                }
                if doc.category.contains(term) {
                    fields.insert(MatchedField::Category);
                }
            }

            if score > 0.0 {
                results.push(SearchResult {
                    tool,
                    score,
                    matched_fields: fields.into_iter().collect(),
                });
            }
        }

        rank(&mut results);
        results
    }

    /// 마지막 쿼리 단어를 어휘의 접두사 매칭으로 확장
    ///
    /// 문서 빈도가 높은 단어부터, 동률은 사전순.
    pub fn suggest(&self, partial: &str, limit: usize) -> Vec<String> {
        let trimmed = partial.trim_start();
        let split = trimmed
            .char_indices()
            .rev()
            .find(|(_, c)| c.is_whitespace())
            .map(|(pos, c)| pos + c.len_utf8());
        let (head, last) = match split {
            Some(at) => trimmed.split_at(at),
            None => ("", trimmed),
        };
        let prefix = last.to_lowercase();
        if prefix.is_empty() {
            return Vec::new();
        }

        let mut candidates: Vec<(&String, usize)> = self
            .doc_freq
            .iter()
            .filter(|(term, _)| term.starts_with(&prefix))
            .map(|(term, df)| (term, *df))
            .collect();
        candidates.sort_by(|a, b| b.1.cmp(&a.1).then_with(|| a.0.cmp(b.0)));

        candidates
            .into_iter()
            .take(limit)
            .map(|(term, _)| format!("{}{}", head, term))
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::fixtures;

    #[test]
    fn test_idf_formula() {
        let catalog = fixtures::catalog();
        let engine = Bm25Engine::new(&catalog);

        // "github" 은 5개 문서 중 2개에 등장
        let expected = (1.0_f64 + (5.0 - 2.0 + 0.5) / (2.0 + 0.5)).ln();
        assert!((engine.idf("github") - expected).abs() < 1e-12);
        assert!(engine.idf("nonexistent") > engine.idf("github"));
    }

    #[test]
    fn test_matched_fields() {
        let catalog = fixtures::catalog();
        let engine = Bm25Engine::new(&catalog);

        let results = engine.search("weather");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].tool.name, "weather_lookup");
        assert_eq!(
            results[0].matched_fields,
            vec![MatchedField::Name, MatchedField::Description, MatchedField::Category]
        );

        let results = engine.search("filesystem");
        assert_eq!(results[0].matched_fields, vec![MatchedField::Category]);
    }

    #[test]
    fn test_ranking_and_empty() {
        let catalog = fixtures::catalog();
        let engine = Bm25Engine::new(&catalog);

        let results = engine.search("github issue");
        assert_eq!(results[0].tool.name, "github_issue_create");
        assert!(results.iter().all(|r| r.tool.name != "weather_lookup"));

        assert!(engine.search("").is_empty());
        assert!(engine.search("!!!").is_empty());
    }

    #[test]
    fn test_suggest_prefix() {
        let catalog = fixtures::catalog();
        let engine = Bm25Engine::new(&catalog);

        let s = engine.suggest("wea", 10);
        assert_eq!(s, vec!["weather"]);

        // "GitHub" 은 camelCase 분리로 "git" 도 어휘에 포함
        let s = engine.suggest("create gi", 10);
        assert_eq!(s, vec!["create github", "create git"]);

        assert!(engine.suggest("", 10).is_empty());
        assert!(engine.suggest("create ", 10).is_empty());
    }

    #[test]
    fn test_suggest_multibyte_whitespace() {
        let catalog = fixtures::catalog();
        let engine = Bm25Engine::new(&catalog);

        assert_eq!(
            engine.suggest("github\u{3000}iss", 5),
            vec!["github\u{3000}issue", "github\u{3000}issues"]
        );
        assert_eq!(engine.suggest("get\u{00A0}wea", 5), vec!["get\u{00A0}weather"]);
        assert_eq!(engine.suggest("\u{3000}wea", 5), vec!["weather"]);
        assert!(engine.suggest("날씨\u{3000}", 5).is_empty());
    }

    #[test]
    fn test_empty_catalog() {
        let catalog = ToolCatalog::default();
        let engine = Bm25Engine::new(&catalog);
        assert!(engine.search("anything").is_empty());
    }
}
