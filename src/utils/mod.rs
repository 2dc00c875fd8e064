//! Utility modules.
//!
//! | Module    | Purpose                                          |
//! |-----------|--------------------------------------------------|
//! | `exec`    | Typed subprocess invocation                      |
//! | `git`     | `git` subprocess wrapper                         |
//! | `path`    | Path normalization, recursive copy and removal   |
//! | `remote`  | Remote URL parsing                               |
//! | `version` | Version coercion and the better-target policy    |

pub mod exec;
pub mod git;
pub mod path;
pub mod remote;
pub mod version;
