//! Path utilities.
//!
//! - [`fs`]: path normalization plus recursive copy/remove helpers

pub mod fs;

pub use fs::{copy_dir_all, exists, normalize_path, remove_dir_if_exists, resolve_path};
