//! Core - 계층 간 공유 타입

mod types;

pub use types::{SearchType, ToolPriority, ToolSource};
