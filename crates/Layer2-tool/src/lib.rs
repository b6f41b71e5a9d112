//! # toolgate-tool
//!
//! Tool catalog for ToolGate providing:
//! - Catalog entries, priority policy and the immutable indexed catalog
//! - Producers (compiled-crate manifests, subagents, builtins)
//! - BM25 / Regex / Hybrid search with filters and autocomplete
//! - Token budget estimation
//! - Exporters (vendor tool array, editor settings)

pub mod budget;
pub mod catalog;
pub mod export;
pub mod producer;
pub mod search;

pub use budget::{estimate, estimate_tokens, TokenEstimate};
pub use catalog::{
    sanitize_tool_name, BuildReport, CatalogBuilder, CatalogStats, PriorityPolicy,
    ProducerReport, ToolCatalog, ToolCatalogEntry, ToolDescriptor,
};
pub use export::{export_tools, AnthropicTool, EditorSettings};
pub use producer::{
    BuiltinProducer, ManifestProducer, StaticProducer, SubagentProducer, ToolManifest,
    ToolProducer,
};
pub use search::{
    resolve_search_type, MatchedField, SearchOptions, SearchResult, ToolSearch, DEFAULT_LIMIT,
};
