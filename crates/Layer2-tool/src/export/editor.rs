//! Editor / IDE settings document

use crate::catalog::ToolCatalog;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::path::PathBuf;
use toolgate_foundation::{SearchSettings, SearchType, ToolPriority};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ToolSearchSection {
    pub enabled: bool,
    pub search_type: SearchType,
    pub max_results: usize,
    pub catalog_path: Option<PathBuf>,
}

/// 에디터 설정 문서
///
/// ```json
/// {
///   "toolSearch": { "enabled": true, "searchType": "auto", "maxResults": 10, "catalogPath": ".toolgate/catalog.json" },
///   "alwaysLoadedTools": ["builtin__search_tools"],
///   "deferredCategories": ["github"],
///   "toolPriorities": { "mcp__github__create_issue": "medium" }
/// }
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct EditorSettings {
    pub tool_search: ToolSearchSection,
    pub always_loaded_tools: Vec<String>,
    pub deferred_categories: Vec<String>,
    pub tool_priorities: BTreeMap<String, ToolPriority>,
}

impl EditorSettings {
    pub fn from_catalog(
        catalog: &ToolCatalog,
        search: &SearchSettings,
        catalog_path: Option<PathBuf>,
    ) -> Self {
        Self {
            tool_search: ToolSearchSection {
                enabled: search.enabled,
                search_type: search.search_type,
                max_results: search.max_results,
                catalog_path,
            },
            always_loaded_tools: catalog
                .always_loaded_tools()
                .iter()
                .map(|t| t.id.clone())
                .collect(),
            deferred_categories: catalog
                .deferred_categories()
                .into_iter()
                .map(String::from)
                .collect(),
            tool_priorities: catalog
                .tools()
                .iter()
                .map(|t| (t.id.clone(), t.priority))
                .collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::{PriorityPolicy, ToolDescriptor};
    use crate::producer::BuiltinProducer;
    use toolgate_foundation::ToolSource;

    #[test]
    fn test_settings_document() {
        let policy = PriorityPolicy::default();
        let mut entries: Vec<_> = BuiltinProducer::descriptors()
            .into_iter()
            .map(|d| policy.apply(d))
            .collect();
        entries.push(policy.apply(ToolDescriptor::new(
            ToolSource::Mcp,
            "github",
            "create_issue",
            "Create",
        )));
        let catalog = ToolCatalog::from_entries(entries);

        let settings = EditorSettings::from_catalog(
            &catalog,
            &SearchSettings::default(),
            Some(PathBuf::from(".toolgate/catalog.json")),
        );
        assert_eq!(settings.always_loaded_tools.len(), 3);
        assert_eq!(settings.deferred_categories, vec!["github"]);
        assert_eq!(
            settings.tool_priorities.get("mcp__github__create_issue"),
            Some(&ToolPriority::Medium)
        );

        let json = serde_json::to_value(&settings).unwrap();
        assert_eq!(json["toolSearch"]["maxResults"], 10);
        assert_eq!(json["toolSearch"]["searchType"], "auto");
        assert_eq!(json["toolSearch"]["catalogPath"], ".toolgate/catalog.json");
        assert!(json["alwaysLoadedTools"].is_array());
    }
}
