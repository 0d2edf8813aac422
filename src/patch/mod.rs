pub mod column_addition;
pub mod patch_file;
pub mod patch_summary;
pub mod patcher;
pub mod query;
