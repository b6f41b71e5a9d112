//! Storage module for ToolGate
//!
//! - `json`: JSON - 설정/카탈로그 파일 저장/로드

mod json;

// JSON Storage (범용)
pub use json::{JsonStore, GLOBAL_DIR_NAME, PROJECT_DIR_NAME};
pub(crate) use json::load_json_file;
