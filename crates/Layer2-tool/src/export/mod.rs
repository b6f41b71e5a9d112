//! Exporters - 카탈로그를 읽기만 하는 외부 포맷 변환

pub mod anthropic;
pub mod editor;

pub use anthropic::{export_tools, AnthropicTool};
pub use editor::{EditorSettings, ToolSearchSection};
