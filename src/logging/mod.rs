// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Logging setup on the `tracing` ecosystem.
//!
//! ```text
//! init_logging(&LogConfig)
//!        |
//!        v
//!    registry
//!    |       |
//!    v       v
//! Console   File (optional)
//! EnvFilter EnvFilter (debug)
//! ANSI if   non_blocking
//! --color
//!        |
//!        v
//!    LogGuard (flush on drop)
//!
//! Verbosity:  -q  Quiet   --> warn
//!                 Normal  --> info
//!             -v  Verbose --> debug
//! ```

use std::fmt;
use std::fs::{self, File};
use std::path::{Path, PathBuf};

use anyhow::Context;
use bon::Builder;
use tracing_appender::non_blocking::WorkerGuard;
use tracing_subscriber::{EnvFilter, Layer, fmt as tfmt, layer::SubscriberExt, util::SubscriberInitExt};

use crate::error::Result;

/// How much is written to the console.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, PartialOrd, Ord)]
pub enum Verbosity {
    /// Warnings and errors only.
    Quiet,
    #[default]
    Normal,
    /// Everything down to debug, including every external command line.
    Verbose,
}

impl Verbosity {
    /// Picks the verbosity from the `-q`/`-v` switches. Quiet wins.
    #[must_use]
    pub const fn from_flags(quiet: bool, verbose: bool) -> Self {
        match (quiet, verbose) {
            (true, _) => Self::Quiet,
            (false, true) => Self::Verbose,
            (false, false) => Self::Normal,
        }
    }

    /// `EnvFilter` directive.
    #[must_use]
    pub const fn filter(self) -> &'static str {
        match self {
            Self::Quiet => "warn",
            Self::Normal => "info",
            Self::Verbose => "debug",
        }
    }
}

impl fmt::Display for Verbosity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.filter())
    }
}

/// Configuration for the logging system.
#[derive(Debug, Clone, Builder)]
pub struct LogConfig {
    #[builder(setters(name = with_verbosity), default)]
    verbosity: Verbosity,
    /// ANSI colors on the console.
    #[builder(setters(name = with_color), default = false)]
    color: bool,
    #[builder(setters(name = with_log_file))]
    log_file: Option<PathBuf>,
    #[builder(setters(name = with_show_timestamps), default = false)]
    show_timestamps: bool,
    #[builder(setters(name = with_show_target), default = false)]
    show_target: bool,
}

impl Default for LogConfig {
    fn default() -> Self {
        Self::builder().build()
    }
}

impl LogConfig {
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        self.verbosity
    }

    #[must_use]
    pub const fn color(&self) -> bool {
        self.color
    }

    #[must_use]
    pub fn log_file(&self) -> Option<&Path> {
        self.log_file.as_deref()
    }

    #[must_use]
    pub const fn show_timestamps(&self) -> bool {
        self.show_timestamps
    }

    #[must_use]
    pub const fn show_target(&self) -> bool {
        self.show_target
    }

    /// Console filter directive for this configuration.
    #[must_use]
    pub const fn console_filter(&self) -> &'static str {
        self.verbosity.filter()
    }
}

/// Keeps the file writer alive; pending lines are flushed on drop.
pub struct LogGuard {
    _file_guard: Option<WorkerGuard>,
}

/// Installs the global subscriber.
///
/// The returned guard must outlive all logging.
///
/// # Errors
///
/// Returns an error if the log file cannot be created or a subscriber is
/// already installed.
///
/// # Example
///
/// ```no_run
/// use debflow::logging::{LogConfig, Verbosity, init_logging};
///
/// let config = LogConfig::builder()
///     .with_verbosity(Verbosity::Verbose)
///     .with_log_file("debflow.log".into())
///     .build();
///
/// let _guard = init_logging(&config).expect("logging");
/// tracing::info!("Logging initialized");
/// ```
pub fn init_logging(config: &LogConfig) -> Result<LogGuard> {
    let console_layer = tfmt::layer()
        .with_writer(std::io::stderr)
        .with_target(config.show_target())
        .with_level(true)
        .with_ansi(config.color());
    let console_layer = if config.show_timestamps() {
        console_layer
            .with_filter(EnvFilter::new(config.console_filter()))
            .boxed()
    } else {
        console_layer
            .without_time()
            .with_filter(EnvFilter::new(config.console_filter()))
            .boxed()
    };

    let (file_layer, file_guard) = if let Some(log_path) = config.log_file() {
        if let Some(parent) = log_path.parent()
            && !parent.as_os_str().is_empty()
        {
            fs::create_dir_all(parent)
                .with_context(|| format!("failed to create log directory {}", parent.display()))?;
        }

        let file = File::create(log_path)
            .with_context(|| format!("failed to create log file {}", log_path.display()))?;
        let (non_blocking, guard) = tracing_appender::non_blocking(file);

        let layer = tfmt::layer()
            .with_writer(non_blocking)
            .with_target(true)
            .with_level(true)
            .with_ansi(false)
            .with_filter(EnvFilter::new(Verbosity::Verbose.filter()));

        (Some(layer), Some(guard))
    } else {
        (None, None)
    };

    tracing_subscriber::registry()
        .with(console_layer)
        .with(file_layer)
        .try_init()
        .context("a global logger is already installed")?;

    Ok(LogGuard {
        _file_guard: file_guard,
    })
}
