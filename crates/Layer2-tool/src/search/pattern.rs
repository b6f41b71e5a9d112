//! Regex pattern engine

use super::{rank, MatchedField, SearchResult};
use crate::catalog::ToolCatalog;
use regex::{Regex, RegexBuilder};
use tracing::debug;

const NAME_WEIGHT: f64 = 3.0;
const CATEGORY_WEIGHT: f64 = 2.0;
const DESCRIPTION_WEIGHT: f64 = 1.0;

/// 자동 패턴에 포함되는 최소 단어 길이
const MIN_WORD_LEN: usize = 3;

/// 컴파일된 패턴 크기 상한
const PATTERN_SIZE_LIMIT: usize = 1 << 20;

/// 정규식 엔진
pub struct RegexEngine<'a> {
    catalog: &'a ToolCatalog,
}

impl<'a> RegexEngine<'a> {
    pub fn new(catalog: &'a ToolCatalog) -> Self {
        Self { catalog }
    }

    /// 쿼리를 그대로 패턴으로 검색 (잘못된 패턴은 리터럴로)
    pub fn search(&self, pattern: &str) -> Vec<SearchResult<'a>> {
        if pattern.trim().is_empty() {
            return Vec::new();
        }
        match compile(pattern) {
            Some(re) => self.search_compiled(&re),
            None => {
                debug!("Invalid regex '{}', falling back to literal", pattern);
                match compile(&regex::escape(pattern)) {
                    Some(re) => self.search_compiled(&re),
                    None => Vec::new(),
                }
            }
        }
    }

    /// 쿼리 단어로 만든 자동 패턴 검색 (Hybrid 용)
    pub fn search_words(&self, query: &str) -> Vec<SearchResult<'a>> {
        match derive_pattern(query).as_deref().and_then(compile) {
            Some(re) => self.search_compiled(&re),
            None => Vec::new(),
        }
    }

    fn search_compiled(&self, re: &Regex) -> Vec<SearchResult<'a>> {
        let specificity = specificity(re.as_str());
        let mut results = Vec::new();

        for tool in self.catalog.tools() {
            let name = count_matches(re, &tool.name);
            let category = count_matches(re, &tool.category);
            let description = count_matches(re, &tool.description);

            let weighted = name as f64 * NAME_WEIGHT
                + category as f64 * CATEGORY_WEIGHT
                + description as f64 * DESCRIPTION_WEIGHT;
            if weighted <= 0.0 {
                continue;
            }

            let mut fields = Vec::new();
            if name > 0 {
                fields.push(MatchedField::Name);
            }
            if description > 0 {
                fields.push(MatchedField::Description);
            }
            if category > 0 {
                fields.push(MatchedField::Category);
            }

            results.push(SearchResult {
                tool,
                score: weighted * specificity,
                matched_fields: fields,
            });
        }

        rank(&mut results);
        results
    }
}

/// 3자 이상 단어를 이스케이프해서 OR
///
/// `"create github issue"` → `create|github|issue`
pub fn derive_pattern(query: &str) -> Option<String> {
    let words: Vec<String> = query
        .split_whitespace()
        .filter(|w| w.chars().count() >= MIN_WORD_LEN)
        .map(regex::escape)
        .collect();

    if words.is_empty() {
        None
    } else {
        Some(words.join("|"))
    }
}

fn compile(pattern: &str) -> Option<Regex> {
    RegexBuilder::new(pattern)
        .case_insensitive(true)
        .size_limit(PATTERN_SIZE_LIMIT)
        .build()
        .ok()
}

/// 빈 매칭은 세지 않음
fn count_matches(re: &Regex, text: &str) -> usize {
    re.find_iter(text).filter(|m| !m.as_str().is_empty()).count()
}

/// 패턴 구체성 (0, 1)
///
/// 리터럴 문자가 많을수록 1에 가깝습니다. `.*` 같은 넓은 패턴은 낮은 값.
fn specificity(pattern: &str) -> f64 {
    let literal = pattern.chars().filter(|c| c.is_alphanumeric()).count() as f64;
    literal / (literal + 4.0)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::search::fixtures;

    #[test]
    fn test_derive_pattern() {
        assert_eq!(derive_pattern("github issue").as_deref(), Some("github|issue"));
        assert_eq!(derive_pattern("a pr to do").as_deref(), None);
        assert_eq!(derive_pattern("c++ read").as_deref(), Some(r"c\+\+|read"));
    }

    #[test]
    fn test_case_insensitive_and_weights() {
        let catalog = fixtures::catalog();
        let engine = RegexEngine::new(&catalog);

        let results = engine.search("^WEATHER_");
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].matched_fields, vec![MatchedField::Name]);
        let expected = NAME_WEIGHT * specificity("^WEATHER_");
        assert!((results[0].score - expected).abs() < 1e-12);
    }

    #[test]
    fn test_invalid_pattern_falls_back_to_literal() {
        let catalog = fixtures::catalog();
        let engine = RegexEngine::new(&catalog);
        assert!(engine.search("([unclosed").is_empty());
        assert!(engine.search("").is_empty());
    }

    #[test]
    fn test_empty_matches_ignored() {
        let catalog = fixtures::catalog();
        let engine = RegexEngine::new(&catalog);
        assert!(engine.search("x*").is_empty());
    }

    #[test]
    fn test_specificity_orders_patterns() {
        assert!(specificity("github") > specificity("git"));
        assert!(specificity(".*") < 0.01);
    }
}
