//! Configuration section definitions.
//!
//! Each module corresponds to a section in `gh-pages-multi.toml`:
//!
//! | Module     | TOML Section   | Purpose                           |
//! |------------|----------------|-----------------------------------|
//! | `deploy`   | `[deploy]`     | Source, target, remote, branch    |

mod deploy;

pub use deploy::{CommitConfig, DeployConfig, History, resolve_remote, resolve_template};
