//! Tool Catalog
//!
//! - `entry`: 도구 설명 / 카탈로그 엔트리 / ID 규칙
//! - `policy`: 우선순위 및 지연 로딩 결정
//! - `index`: 불변 카탈로그와 파생 인덱스
//! - `builder`: 생산자 병합

mod builder;
mod entry;
mod index;
mod policy;

pub use builder::{BuildReport, CatalogBuilder, ProducerReport};
pub(crate) use entry::empty_object_schema;
pub use entry::{sanitize_tool_name, ToolCatalogEntry, ToolDescriptor, ID_SEPARATOR};
pub use index::{CatalogStats, ToolCatalog};
pub use policy::PriorityPolicy;
