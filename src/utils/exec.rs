//! External command execution utilities.
//!
//! Provides a Builder-based API for running commands from argument lists.
//! Arguments are handed to the process verbatim; nothing goes through a shell.
//!
//! # Examples
//!
//! ```ignore
//! use crate::utils::exec::Cmd;
//!
//! // Simple command
//! Cmd::new("git").args(["status", "-s"]).run(&logger)?;
//!
//! // With working directory and environment
//! Cmd::new("git")
//!     .args(["commit", "-m", message])
//!     .cwd(workspace)
//!     .envs([("GIT_AUTHOR_NAME", "Docs Bot")])
//!     .run(&logger)?;
//! ```

use crate::logger::Logger;
use regex::Regex;
use std::{
    ffi::{OsStr, OsString},
    path::{Path, PathBuf},
    process::{Command, ExitStatus, Output},
    sync::OnceLock,
};
use thiserror::Error;

// ============================================================================
// Errors
// ============================================================================

/// Subprocess failures.
#[derive(Debug, Error)]
pub enum ExecError {
    #[error("Failed to execute `{program}`")]
    Spawn {
        program: String,
        #[source]
        source: std::io::Error,
    },

    #[error("{}", format_failure(.program, .args, .status, .stderr, .stdout))]
    Failed {
        program: String,
        args: Vec<String>,
        status: ExitStatus,
        stderr: String,
        stdout: String,
    },
}

impl ExecError {
    /// Stderr of a failed command (empty for spawn errors).
    #[cfg(test)]
    pub fn stderr(&self) -> &str {
        match self {
            Self::Spawn { .. } => "",
            Self::Failed { stderr, .. } => stderr,
        }
    }
}

// ============================================================================
// Builder API
// ============================================================================

/// Command builder for external process execution.
///
/// Provides a fluent API for configuring and running external commands.
#[derive(Default)]
pub struct Cmd {
    program: OsString,
    args: Vec<OsString>,
    cwd: Option<PathBuf>,
    envs: Vec<(String, String)>,
    filter: Option<&'static FilterRule>,
}

impl Cmd {
    /// Create a new command builder.
    pub fn new<S: AsRef<OsStr>>(program: S) -> Self {
        Self {
            program: program.as_ref().to_owned(),
            ..Default::default()
        }
    }

    /// Add a single argument.
    ///
    /// Empty arguments are kept: for git an empty string is a meaningful
    /// (and usually erroneous) value that should surface as a git error.
    pub fn arg<S: AsRef<OsStr>>(mut self, arg: S) -> Self {
        self.args.push(arg.as_ref().to_owned());
        self
    }

    /// Add multiple arguments.
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        self.args
            .extend(args.into_iter().map(|arg| arg.as_ref().to_owned()));
        self
    }

    /// Set working directory.
    pub fn cwd<P: AsRef<Path>>(mut self, dir: P) -> Self {
        self.cwd = Some(dir.as_ref().to_owned());
        self
    }

    /// Set environment variables for the subprocess.
    pub fn envs<K, V, I>(mut self, vars: I) -> Self
    where
        K: AsRef<str>,
        V: AsRef<str>,
        I: IntoIterator<Item = (K, V)>,
    {
        for (k, v) in vars {
            self.envs.push((k.as_ref().to_owned(), v.as_ref().to_owned()));
        }
        self
    }

    /// Set output filter for logging.
    pub fn filter(mut self, filter: &'static FilterRule) -> Self {
        self.filter = Some(filter);
        self
    }

    /// Human readable command line, for logs.
    pub fn display(&self) -> String {
        std::iter::once(&self.program)
            .chain(&self.args)
            .map(|s| s.to_string_lossy())
            .collect::<Vec<_>>()
            .join(" ")
    }

    /// Execute the command and return its output.
    ///
    /// A non-zero exit status is an error. Stderr of a successful run is
    /// echoed through `logger` at debug level, minus filtered lines.
    pub fn run(self, logger: &Logger) -> Result<Output, ExecError> {
        let filter = self.filter.unwrap_or(&EMPTY_FILTER);
        let name = self.program_name();

        let mut cmd = Command::new(&self.program);
        cmd.args(&self.args).envs(self.envs.iter().cloned());

        if let Some(dir) = &self.cwd {
            cmd.current_dir(dir);
        }

        let output = cmd.output().map_err(|source| ExecError::Spawn {
            program: name.clone(),
            source,
        })?;

        if !output.status.success() {
            return Err(ExecError::Failed {
                program: name,
                args: self
                    .args
                    .iter()
                    .map(|a| a.to_string_lossy().into_owned())
                    .collect(),
                status: output.status,
                stderr: String::from_utf8_lossy(&output.stderr).trim().to_owned(),
                stdout: String::from_utf8_lossy(&output.stdout).trim().to_owned(),
            });
        }

        if logger.is_verbose() {
            let stderr = String::from_utf8_lossy(&output.stderr);
            filter.log(logger, &name, stderr.trim());
        }
        Ok(output)
    }

    /// Get the program name for error messages.
    fn program_name(&self) -> String {
        self.program.to_string_lossy().to_string()
    }
}

// ============================================================================
// Output Filtering
// ============================================================================

/// Filter rule for command output logging.
///
/// Used to reduce noise by skipping known warnings or irrelevant messages.
pub struct FilterRule {
    /// Prefixes to skip when logging output.
    pub skip_prefixes: &'static [&'static str],
}

impl FilterRule {
    /// Create a new filter rule.
    pub const fn new(skip_prefixes: &'static [&'static str]) -> Self {
        Self { skip_prefixes }
    }

    /// Check if a line should be skipped.
    fn should_skip(&self, line: &str) -> bool {
        line.is_empty() || self.skip_prefixes.iter().any(|p| line.starts_with(p))
    }

    /// Lines of `output` that pass the filter.
    fn kept_lines<'a>(&self, output: &'a str) -> Vec<&'a str> {
        output
            .lines()
            .filter(|line| {
                let plain = strip_ansi(line);
                let trimmed = plain.trim();
                !trimmed.is_empty() && !self.should_skip(trimmed)
            })
            .collect()
    }

    /// Log output lines that pass the filter.
    pub fn log(&self, logger: &Logger, name: &str, output: &str) {
        let lines = self.kept_lines(output);
        if !lines.is_empty() {
            logger.log(name, &lines.join("\n"));
        }
    }
}

/// Empty filter (no skipping).
pub const EMPTY_FILTER: FilterRule = FilterRule::new(&[]);

// ============================================================================
// Helpers
// ============================================================================

/// Strip ANSI escape codes from string.
fn strip_ansi(s: &str) -> std::borrow::Cow<'_, str> {
    static RE: OnceLock<Regex> = OnceLock::new();
    let re = RE.get_or_init(|| Regex::new(r"\x1b\[[0-9;]*m").unwrap());
    re.replace_all(s, "")
}

/// Format error message for failed command.
fn format_failure(
    program: &str,
    args: &[String],
    status: &ExitStatus,
    stderr: &str,
    stdout: &str,
) -> String {
    let mut msg = format!("Command `{program}");
    for arg in args {
        msg.push(' ');
        msg.push_str(arg);
    }
    msg.push_str(&format!("` failed with {status}"));
    if !stderr.is_empty() {
        msg.push('\n');
        msg.push_str(stderr);
    }
    if !stdout.is_empty() {
        msg.push_str("\nStdout:\n");
        msg.push_str(stdout);
    }
    msg
}

// ============================================================================
// Tests
// ============================================================================
