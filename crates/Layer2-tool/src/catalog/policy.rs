//! Priority Policy - 빌드 시점 우선순위 / 지연 로딩 결정

use super::entry::{ToolCatalogEntry, ToolDescriptor};
use toolgate_foundation::{PolicySettings, ToolPriority, ToolSource};

/// 우선순위 정책
///
/// 결정 순서:
/// 1. `overrides` (ID 또는 이름)
/// 2. `always` 목록
/// 3. 생산자 힌트
/// 4. 카테고리 기본값
/// 5. 출처 기본값
#[derive(Debug, Clone, Default)]
pub struct PriorityPolicy {
    settings: PolicySettings,
}

impl PriorityPolicy {
    pub fn new(settings: PolicySettings) -> Self {
        Self { settings }
    }

    pub fn settings(&self) -> &PolicySettings {
        &self.settings
    }

    /// 우선순위 결정
    pub fn resolve(&self, id: &str, descriptor: &ToolDescriptor, category: &str) -> ToolPriority {
        let s = &self.settings;

        if let Some(p) = s
            .overrides
            .get(id)
            .or_else(|| s.overrides.get(&descriptor.name))
        {
            return *p;
        }

        if s.always.iter().any(|n| n == id || n == &descriptor.name) {
            return ToolPriority::Always;
        }

        if let Some(p) = descriptor.priority {
            return p;
        }

        if let Some(p) = s.category_defaults.get(category) {
            return *p;
        }

        self.source_default(descriptor.source)
    }

    /// 출처 기본값 (설정에 없으면 내장 기본값)
    pub fn source_default(&self, source: ToolSource) -> ToolPriority {
        self.settings
            .source_defaults
            .get(&source)
            .copied()
            .unwrap_or(match source {
                ToolSource::Builtin => ToolPriority::Always,
                ToolSource::CompiledCrate => ToolPriority::High,
                ToolSource::Mcp => ToolPriority::Medium,
                ToolSource::Subagent => ToolPriority::Low,
            })
    }

    /// 지연 로딩 여부. `Always`는 절대 지연되지 않음
    pub fn should_defer(&self, priority: ToolPriority) -> bool {
        if priority == ToolPriority::Always {
            return false;
        }
        !self.settings.eager_priorities.contains(&priority)
    }

    /// 설명 → 카탈로그 엔트리
    pub fn apply(&self, descriptor: ToolDescriptor) -> ToolCatalogEntry {
        let id = descriptor.id();
        let category = descriptor.resolved_category();
        let priority = self.resolve(&id, &descriptor, &category);
        let defer_loading = self.should_defer(priority);

        ToolCatalogEntry {
            id,
            name: descriptor.name,
            description: descriptor.description,
            input_schema: descriptor.input_schema,
            server: descriptor.server,
            source: descriptor.source,
            category,
            priority,
            defer_loading,
        }
    }
}
