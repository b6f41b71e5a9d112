//! Vendor tool array (`tools` parameter of the Messages API)

use crate::catalog::{sanitize_tool_name, PriorityPolicy, ToolCatalog, ToolCatalogEntry};
use crate::producer::builtin::search_tool_descriptor;
use serde::{Deserialize, Serialize};
use serde_json::Value;

/// API 도구 정의
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AnthropicTool {
    pub name: String,
    pub description: String,
    pub input_schema: Value,
    pub defer_loading: bool,
}

impl From<&ToolCatalogEntry> for AnthropicTool {
    fn from(entry: &ToolCatalogEntry) -> Self {
        Self {
            name: sanitize_tool_name(&entry.id),
            description: entry.description.clone(),
            input_schema: entry.input_schema.clone(),
            defer_loading: entry.defer_loading && !entry.is_always_loaded(),
        }
    }
}

/// 카탈로그 전체를 도구 배열로 변환
///
/// `with_search_tool`이면 카탈로그에 검색 도구가 없을 때 맨 앞에 추가합니다.
pub fn export_tools(catalog: &ToolCatalog, with_search_tool: bool) -> Vec<AnthropicTool> {
    let mut tools: Vec<AnthropicTool> = catalog.tools().iter().map(AnthropicTool::from).collect();

    if with_search_tool {
        let search = PriorityPolicy::default().apply(search_tool_descriptor());
        if !catalog.contains(&search.id) {
            tools.insert(0, AnthropicTool::from(&search));
        }
    }
    tools
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::ToolDescriptor;
    use toolgate_foundation::{ToolPriority, ToolSource};

    fn catalog() -> ToolCatalog {
        let policy = PriorityPolicy::default();
        ToolCatalog::from_entries(vec![
            policy.apply(
                ToolDescriptor::new(ToolSource::Mcp, "github", "create.issue", "Create")
                    .priority(ToolPriority::Always),
            ),
            policy.apply(ToolDescriptor::new(ToolSource::Mcp, "weather", "lookup", "Weather")),
        ])
    }

    #[test]
    fn test_always_is_not_deferred() {
        let tools = export_tools(&catalog(), false);
        assert_eq!(tools.len(), 2);
        assert_eq!(tools[0].name, "mcp__github__create_issue");
        assert!(!tools[0].defer_loading);
        assert!(tools[1].defer_loading);
    }

    #[test]
    fn test_search_tool_added_once() {
        let tools = export_tools(&catalog(), true);
        assert_eq!(tools[0].name, "builtin__search_tools");
        assert!(!tools[0].defer_loading);

        let json = serde_json::to_value(&tools[0]).unwrap();
        assert!(json.get("input_schema").is_some());
        assert_eq!(json["defer_loading"], false);
    }

    #[test]
    fn test_long_ids_export_unique_names() {
        let policy = PriorityPolicy::default();
        let catalog = ToolCatalog::from_entries(vec![
            policy.apply(ToolDescriptor::new(
                ToolSource::Mcp,
                "github-enterprise",
                "list_pull_request_review_comment_reactions_for_thread",
                "Reactions on a thread",
            )),
            policy.apply(ToolDescriptor::new(
                ToolSource::Mcp,
                "github-enterprise",
                "list_pull_request_review_comment_reactions_for_user",
                "Reactions by a user",
            )),
        ]);

        let tools = export_tools(&catalog, false);
        assert_eq!(tools.len(), 2);
        assert_ne!(tools[0].name, tools[1].name);
        assert!(tools.iter().all(|t| t.name.len() <= 64));
    }

    #[test]
    fn test_export_does_not_mutate() {
        let catalog = catalog();
        let before = catalog.tools().to_vec();
        let _ = export_tools(&catalog, true);
        assert_eq!(catalog.tools(), before.as_slice());
    }
}
