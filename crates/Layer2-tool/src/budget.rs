//! Token budget estimator

use crate::catalog::ToolCatalog;
use serde::{Deserialize, Serialize};
use toolgate_foundation::BudgetSettings;

/// 지연 로딩 적용 전/후 컨텍스트 토큰 추정치
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenEstimate {
    pub total_tools: usize,
    pub eager_tools: usize,
    pub without_defer_loading: u64,
    pub with_defer_loading: u64,
    pub savings: i64,
    pub savings_percent: f64,
}

/// 카탈로그 기준 추정
///
/// 즉시 로드 도구는 `deferLoading = false`인 엔트리입니다.
pub fn estimate_tokens(catalog: &ToolCatalog, budget: &BudgetSettings) -> TokenEstimate {
    let eager = catalog.tools().iter().filter(|t| !t.defer_loading).count();
    estimate(catalog.len(), eager, budget)
}

/// 개수 기준 추정
pub fn estimate(total_tools: usize, eager_tools: usize, budget: &BudgetSettings) -> TokenEstimate {
    let without = total_tools as u64 * budget.per_tool_tokens;
    let with = eager_tools as u64 * budget.per_tool_tokens + budget.search_tool_tokens;
    let savings = without as i64 - with as i64;
    let savings_percent = if without == 0 {
        0.0
    } else {
        savings as f64 / without as f64 * 100.0
    };

    TokenEstimate {
        total_tools,
        eager_tools,
        without_defer_loading: without,
        with_defer_loading: with,
        savings,
        savings_percent,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_estimate_defaults() {
        let e = estimate(100, 5, &BudgetSettings::default());
        assert_eq!(e.without_defer_loading, 35_000);
        assert_eq!(e.with_defer_loading, 5 * 350 + 500);
        assert_eq!(e.savings, 35_000 - 2_250);
        assert!((e.savings_percent - 93.571).abs() < 0.01);
    }

    #[test]
    fn test_small_catalog_negative_savings() {
        let e = estimate(1, 1, &BudgetSettings::default());
        assert_eq!(e.savings, -500);
        assert!(e.savings_percent < 0.0);
    }

    #[test]
    fn test_empty_catalog() {
        let e = estimate(0, 0, &BudgetSettings::default());
        assert_eq!(e.without_defer_loading, 0);
        assert_eq!(e.savings_percent, 0.0);
    }

    #[test]
    fn test_custom_costs() {
        let budget = BudgetSettings {
            per_tool_tokens: 100,
            search_tool_tokens: 0,
        };
        let e = estimate(10, 2, &budget);
        assert_eq!(e.savings, 800);
        assert!((e.savings_percent - 80.0).abs() < f64::EPSILON);
    }
}
