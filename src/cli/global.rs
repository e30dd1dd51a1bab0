// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Global CLI options.
//!
//! ```text
//! -v | -q           console verbosity (exclusive)
//! -c                ANSI colors
//! -s                safe mode: nothing is changed
//! -n                no automatic restore after a failure
//! --config FILE     configuration file, relative to the repository
//! --backup-dir DIR  where backups are kept
//! --log-file FILE   full debug log
//! ```

use std::path::PathBuf;

use clap::Args;

use crate::core::context::ExecutionFlags;
use crate::logging::Verbosity;

#[derive(Debug, Clone, Default, Args)]
pub struct GlobalOptions {
    /// Enable verbose mode.
    #[arg(short, long, conflicts_with = "quiet")]
    pub verbose: bool,

    /// Enable quiet mode.
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable colored output.
    #[arg(short, long)]
    pub color: bool,

    /// Prevent any file changes.
    #[arg(short = 's', long = "safemode")]
    pub safe_mode: bool,

    /// Prevent automatic restore when an action fails.
    #[arg(short = 'n', long = "norestore")]
    pub no_restore: bool,

    /// Path to the configuration file, relative to the repository.
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Directory for repository backups.
    #[arg(long = "backup-dir", value_name = "DIR")]
    pub backup_dir: Option<PathBuf>,

    /// Also write a debug log to this file.
    #[arg(long = "log-file", value_name = "FILE")]
    pub log_file: Option<PathBuf>,

    /// Print all long option names and exit.
    #[arg(long = "show-options", hide = true)]
    pub show_options: bool,

    /// Print all action names and exit.
    #[arg(long = "show-actions", hide = true)]
    pub show_actions: bool,
}

impl GlobalOptions {
    #[must_use]
    pub const fn verbosity(&self) -> Verbosity {
        Verbosity::from_flags(self.quiet, self.verbose)
    }

    #[must_use]
    pub fn execution_flags(&self) -> ExecutionFlags {
        let mut flags = ExecutionFlags::empty();
        flags.set(ExecutionFlags::SAFE_MODE, self.safe_mode);
        flags.set(ExecutionFlags::VERBOSE, self.verbose);
        flags.set(ExecutionFlags::QUIET, self.quiet);
        flags.set(ExecutionFlags::COLOR, self.color);
        flags.set(ExecutionFlags::NO_RESTORE, self.no_restore);
        flags
    }
}
