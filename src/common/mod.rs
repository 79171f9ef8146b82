//! Shared utilities across restoir modules.

pub mod files;
pub mod paths;

pub use files::write_file_with_dirs;
pub use paths::{copy_dir_recursive, copy_file_with_dirs, ensure_dir_exists};
