//! Catalog producers
//!
//! 각 생산자는 하나의 도구 출처(MCP 백엔드, 컴파일된 크레이트 매니페스트,
//! 서브에이전트 정의, 내장 도구)를 열거합니다. 생산자는 서로 독립적이며
//! 한 생산자의 실패가 다른 생산자에게 영향을 주지 않습니다.

pub mod builtin;
pub mod manifest;
pub mod subagent;

use crate::catalog::ToolDescriptor;
use async_trait::async_trait;
use toolgate_foundation::{Result, ToolSource};

pub use builtin::BuiltinProducer;
pub use manifest::{ManifestProducer, ToolManifest, ToolManifestEntry};
pub use subagent::SubagentProducer;

/// 도구 설명 생산자
#[async_trait]
pub trait ToolProducer: Send + Sync {
    /// 빌드 리포트에 표시되는 이름
    fn name(&self) -> &str;

    /// 생산하는 도구의 출처
    fn source(&self) -> ToolSource;

    /// 도구 설명 열거
    async fn produce(&self) -> Result<Vec<ToolDescriptor>>;
}

/// 테스트/임베딩용 고정 목록 생산자
pub struct StaticProducer {
    name: String,
    source: ToolSource,
    tools: Vec<ToolDescriptor>,
}

impl StaticProducer {
    pub fn new(name: impl Into<String>, source: ToolSource, tools: Vec<ToolDescriptor>) -> Self {
        Self {
            name: name.into(),
            source,
            tools,
        }
    }
}

#[async_trait]
impl ToolProducer for StaticProducer {
    fn name(&self) -> &str {
        &self.name
    }

    fn source(&self) -> ToolSource {
        self.source
    }

    async fn produce(&self) -> Result<Vec<ToolDescriptor>> {
        Ok(self.tools.clone())
    }
}
