mod store;

pub use store::{JsonStore, GLOBAL_DIR_NAME, PROJECT_DIR_NAME};
pub(crate) use store::load_json_file;
