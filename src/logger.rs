//! Logging utilities with colored output.
//!
//! This module provides:
//! - `Logger`, an explicit logging handle passed to whoever needs to report
//! - `log!` / `debug!` macros for formatted output with colored prefixes
//!
//! # Example
//!
//! ```ignore
//! let logger = Logger::new(verbose);
//! log!(logger, "deploy"; "pushed {} to {}", target, branch);
//! debug!(logger, "git"; "clone {}", remote);
//! ```

use owo_colors::{OwoColorize, Stream};
use std::io::{Write, stderr, stdout};

// ============================================================================
// Log Macros
// ============================================================================

/// Log a message with a colored module prefix
///
/// # Usage
/// ```ignore
/// log!(logger, "module"; "message with {} formatting", args);
/// ```
#[macro_export]
macro_rules! log {
    ($logger:expr, $module:expr; $($arg:tt)*) => {{
        $logger.log($module, &format!($($arg)*))
    }};
}

/// Log a debug message (only shown when the logger is verbose)
///
/// # Usage
/// ```ignore
/// debug!(logger, "module"; "debug info: {}", value);
/// ```
#[macro_export]
macro_rules! debug {
    ($logger:expr, $module:expr; $($arg:tt)*) => {{
        if $logger.is_verbose() {
            $logger.log($module, &format!($($arg)*))
        }
    }};
}

// ============================================================================
// Logger
// ============================================================================

/// Logging handle.
///
/// Cheap to copy; verbosity is decided once from configuration and travels
/// with the handle instead of living in process-wide state.
#[derive(Debug, Clone, Copy, Default)]
pub struct Logger {
    verbose: bool,
}

impl Logger {
    pub const fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Logger that prints nothing but `log` lines.
    #[cfg(test)]
    pub const fn quiet() -> Self {
        Self { verbose: false }
    }

    /// Check if debug output is enabled
    pub const fn is_verbose(&self) -> bool {
        self.verbose
    }

    /// Log a message with a colored module prefix.
    ///
    /// Errors and warnings go to stderr, everything else to stdout.
    pub fn log(&self, module: &str, message: &str) {
        let module_lower = module.to_ascii_lowercase();

        if matches!(module_lower.as_str(), "error" | "warning") {
            let prefix = colorize_prefix(module, &module_lower, Stream::Stderr);
            let mut out = stderr().lock();
            writeln!(out, "{prefix} {message}").ok();
            out.flush().ok();
        } else {
            let prefix = colorize_prefix(module, &module_lower, Stream::Stdout);
            let mut out = stdout().lock();
            writeln!(out, "{prefix} {message}").ok();
            out.flush().ok();
        }
    }
}

/// Apply color to a module prefix based on module type.
///
/// Honors `owo_colors::set_override`, so `--color never` yields plain text.
#[inline]
fn colorize_prefix(module: &str, module_lower: &str, stream: Stream) -> String {
    let prefix = format!("[{module}]");
    match module_lower {
        "deploy" => prefix
            .if_supports_color(stream, |p| p.bright_blue().bold().to_string())
            .to_string(),
        "done" => prefix
            .if_supports_color(stream, |p| p.bright_green().bold().to_string())
            .to_string(),
        "error" => prefix
            .if_supports_color(stream, |p| p.bright_red().bold().to_string())
            .to_string(),
        "warning" => prefix
            .if_supports_color(stream, |p| p.bright_magenta().bold().to_string())
            .to_string(),
        _ => prefix
            .if_supports_color(stream, |p| p.bright_yellow().bold().to_string())
            .to_string(),
    }
}

// ============================================================================
// Tests
// ============================================================================
