// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Error handling module.
//!
//! ```text
//!            FlowError (~16 bytes)
//!                   |
//!   +-------+-------+-------+-------+------+
//!   |       |       |       |       |      |
//!   v       v       v       v       v      v
//! Command  Git    Config   Op    Version  Io
//!   Box    Box     Box     Box     Box    Box
//!
//! Sub-errors:
//!   Command  NotFound, Spawn, Failed{command, stdout, stderr}
//!   Git      NotARepository, Command, NoHeadTag, InvalidTag, StashNotFound
//!   Config   NotFound, Parse, MissingKey, InvalidValue, Exists, Write
//!   Op       message + optional cause (unifies the above at action level)
//!   Version  NotIncrementable
//! ```
//!
//! Low-level `CommandError`s are re-wrapped as `GitError`/`ConfigError` at
//! the adapter boundaries; the engine wraps action failures in `OpError`.

use std::error::Error as StdError;

use thiserror::Error;
use tracing::error;

/// Convenience alias for `anyhow::Result`, used at the CLI boundary.
pub type Result<T> = anyhow::Result<T>;

/// Result type using [`FlowError`].
pub type FlowResult<T> = std::result::Result<T, FlowError>;

/// Top-level error type.
///
/// All sub-errors are boxed to keep this enum small on the stack.
#[derive(Debug, Error)]
pub enum FlowError {
    /// External command failed.
    #[error(transparent)]
    Command(Box<CommandError>),

    /// Repository adapter operation failed.
    #[error(transparent)]
    Git(Box<GitError>),

    /// Configuration error.
    #[error(transparent)]
    Config(Box<ConfigError>),

    /// Combined operation failed.
    #[error(transparent)]
    Op(Box<OpError>),

    /// Version string could not be processed.
    #[error(transparent)]
    Version(Box<VersionError>),

    /// I/O error.
    #[error("io error: {0}")]
    Io(Box<std::io::Error>),
}

macro_rules! impl_from_boxed {
    ($($error:ty => $variant:ident),+ $(,)?) => {
        $(
            impl From<$error> for FlowError {
                fn from(err: $error) -> Self {
                    FlowError::$variant(Box::new(err))
                }
            }
        )+
    };
}

impl_from_boxed! {
    CommandError => Command,
    GitError => Git,
    ConfigError => Config,
    OpError => Op,
    VersionError => Version,
    std::io::Error => Io,
}

impl FlowError {
    /// Returns the inner `GitError`, if this is one.
    #[must_use]
    pub fn as_git(&self) -> Option<&GitError> {
        match self {
            Self::Git(err) => Some(err),
            _ => None,
        }
    }

    /// Returns the inner `OpError`, if this is one.
    #[must_use]
    pub fn as_op(&self) -> Option<&OpError> {
        match self {
            Self::Op(err) => Some(err),
            _ => None,
        }
    }
}

// --- Command Errors ---

/// External process errors.
#[derive(Debug, Error)]
pub enum CommandError {
    /// Executable not found in PATH.
    #[error("executable not found: '{program}' (not in PATH)")]
    NotFound { program: String },

    /// Process could not be started.
    #[error("failed to run '{command}': {source}")]
    Spawn {
        command: String,
        #[source]
        source: std::io::Error,
    },

    /// Non-zero exit status or a fatal marker in the output.
    #[error("an error occurred running: {command}{}", format_streams(stdout, stderr))]
    Failed {
        command: String,
        code: Option<i32>,
        stdout: String,
        stderr: String,
    },
}

impl CommandError {
    /// Captured stdout of a failed command (empty for other variants).
    #[must_use]
    pub fn stdout(&self) -> &str {
        match self {
            Self::Failed { stdout, .. } => stdout,
            _ => "",
        }
    }

    /// Captured stderr of a failed command (empty for other variants).
    #[must_use]
    pub fn stderr(&self) -> &str {
        match self {
            Self::Failed { stderr, .. } => stderr,
            _ => "",
        }
    }
}

fn format_streams(stdout: &str, stderr: &str) -> String {
    let mut out = String::new();
    if !stdout.trim().is_empty() {
        out.push_str("\nstdout:\n");
        out.push_str(stdout.trim_end());
    }
    if !stderr.trim().is_empty() {
        out.push_str("\nstderr:\n");
        out.push_str(stderr.trim_end());
    }
    out
}

// --- Git Errors ---

/// Repository adapter errors.
#[derive(Debug, Error)]
pub enum GitError {
    /// Working directory is not inside a git work tree.
    #[error("{path} is not a git repository")]
    NotARepository { path: String },

    /// A git command failed; `message` carries the human context.
    #[error("the git command '{operation}' failed: {message}")]
    Command {
        operation: String,
        message: String,
        #[source]
        source: Box<CommandError>,
    },

    /// Branch HEAD carries no tag of the requested type.
    #[error("the HEAD on branch '{branch}' has no tags of type: {tag_type}/<version>")]
    NoHeadTag { branch: String, tag_type: String },

    /// Branch has no reachable tag of the requested type.
    #[error("the branch '{branch}' has no tags of type: {tag_type}/<version>")]
    NoTag { branch: String, tag_type: String },

    /// Tag does not follow `<tag_type>/<version>`.
    #[error("a tag version could not be extracted from tag '{tag}' (expected {tag_type}/<version>)")]
    InvalidTag { tag: String, tag_type: String },

    /// Named stash is gone (already restored or dropped by hand).
    #[error("no stash named '{name}' exists")]
    StashNotFound { name: String },
}

impl GitError {
    pub(crate) fn command(
        operation: impl Into<String>,
        message: impl Into<String>,
        source: CommandError,
    ) -> Self {
        Self::Command {
            operation: operation.into(),
            message: message.into(),
            source: Box::new(source),
        }
    }
}

// --- Config Errors ---

/// Configuration-related errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Configuration file not found.
    #[error("the config file could not be found: {path}")]
    NotFound { path: String },

    /// Failed to parse configuration file.
    #[error("failed to parse config file '{path}': {message}")]
    Parse { path: String, message: String },

    /// Required key missing or empty.
    #[error("the value for '{key}' in section [{section}] of '{path}' is missing but required")]
    MissingKey {
        path: String,
        section: String,
        key: String,
    },

    /// Invalid configuration value.
    #[error("invalid value for '{key}' in section [{section}]: {message}")]
    InvalidValue {
        section: String,
        key: String,
        message: String,
    },

    /// Refusing to replace an existing file with an example.
    #[error("file '{path}' exists and will not be replaced by an example file")]
    Exists { path: String },

    /// Failed to write configuration file.
    #[error("failed to write config file '{path}': {source}")]
    Write {
        path: String,
        #[source]
        source: std::io::Error,
    },
}

// --- Op Errors ---

/// A combined, multi-step operation failed.
///
/// Carries an optional message and an optional cause; at least one is set.
#[derive(Debug)]
pub struct OpError {
    message: Option<String>,
    cause: Option<FlowError>,
}

impl OpError {
    /// Operation failed for the given reason.
    pub fn msg(message: impl Into<String>) -> Self {
        Self {
            message: Some(message.into()),
            cause: None,
        }
    }

    /// Operation failed because of `cause`.
    pub fn caused_by(cause: impl Into<FlowError>) -> Self {
        Self {
            message: None,
            cause: Some(cause.into()),
        }
    }

    /// Operation failed because of `cause`, with extra context.
    pub fn with_context(message: impl Into<String>, cause: impl Into<FlowError>) -> Self {
        Self {
            message: Some(message.into()),
            cause: Some(cause.into()),
        }
    }

    #[must_use]
    pub fn message(&self) -> Option<&str> {
        self.message.as_deref()
    }

    #[must_use]
    pub const fn cause(&self) -> Option<&FlowError> {
        self.cause.as_ref()
    }
}

impl std::fmt::Display for OpError {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match (&self.message, &self.cause) {
            (Some(message), _) => f.write_str(message),
            (None, Some(cause)) => write!(f, "{cause}"),
            (None, None) => f.write_str("operation failed"),
        }
    }
}

impl StdError for OpError {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        match (&self.message, &self.cause) {
            // Without a message the cause is already the Display text.
            (None, Some(cause)) => cause.source(),
            (Some(_), Some(cause)) => Some(cause),
            _ => None,
        }
    }
}

// --- Version Errors ---

/// Version string errors.
#[derive(Debug, Error)]
pub enum VersionError {
    /// Final component of the base version is not numeric.
    #[error("version '{version}' could not be incremented")]
    NotIncrementable { version: String },
}

/// Renders an error and every source below it, outermost first.
#[must_use]
pub fn chain(err: &(dyn StdError + 'static)) -> Vec<String> {
    let mut lines = vec![err.to_string()];
    let mut current = err.source();
    while let Some(cause) = current {
        lines.push(cause.to_string());
        current = cause.source();
    }
    lines
}

/// Logs an error with its full causal chain at error level.
pub fn log_chain(err: &(dyn StdError + 'static)) {
    for (depth, line) in chain(err).iter().enumerate() {
        if depth == 0 {
            error!("{line}");
        } else {
            error!("  caused by: {line}");
        }
    }
}
