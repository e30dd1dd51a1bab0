// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Per-invocation execution context.
//!
//! Built once from the command line and passed by reference to every
//! component. Nothing in here changes after startup.

use bitflags::bitflags;
use std::path::{Path, PathBuf};

/// Default configuration file name, relative to the working directory.
pub const DEFAULT_CONFIG_FILE: &str = "debflow.conf";

bitflags! {
    /// Flags set from the command line.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ExecutionFlags: u32 {
        /// Log mutating operations instead of performing them
        const SAFE_MODE = 0x01;
        /// Debug-level console output
        const VERBOSE = 0x02;
        /// Warnings and errors only
        const QUIET = 0x04;
        /// ANSI colors on the console
        const COLOR = 0x08;
        /// Leave the repository as-is when an action fails
        const NO_RESTORE = 0x10;
    }
}

/// Execution context for one invocation.
#[derive(Debug, Clone)]
pub struct Context {
    workdir: PathBuf,
    flags: ExecutionFlags,
    backup_dir: PathBuf,
    config_file: PathBuf,
}

impl Context {
    /// Creates a context for `workdir` with default backup and config locations.
    pub fn new(workdir: impl Into<PathBuf>, flags: ExecutionFlags) -> Self {
        let workdir = workdir.into();
        let backup_dir = default_backup_dir(&workdir);
        Self {
            workdir,
            flags,
            backup_dir,
            config_file: PathBuf::from(DEFAULT_CONFIG_FILE),
        }
    }

    /// Overrides the backup directory.
    #[must_use]
    pub fn with_backup_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.backup_dir = dir.into();
        self
    }

    /// Overrides the configuration file (relative paths resolve against the workdir).
    #[must_use]
    pub fn with_config_file(mut self, file: impl Into<PathBuf>) -> Self {
        self.config_file = file.into();
        self
    }

    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    #[must_use]
    pub const fn flags(&self) -> ExecutionFlags {
        self.flags
    }

    #[must_use]
    pub fn backup_dir(&self) -> &Path {
        &self.backup_dir
    }

    /// Absolute path of the configuration file.
    #[must_use]
    pub fn config_path(&self) -> PathBuf {
        if self.config_file.is_absolute() {
            self.config_file.clone()
        } else {
            self.workdir.join(&self.config_file)
        }
    }

    #[must_use]
    pub const fn safe_mode(&self) -> bool {
        self.flags.contains(ExecutionFlags::SAFE_MODE)
    }

    #[must_use]
    pub const fn no_restore(&self) -> bool {
        self.flags.contains(ExecutionFlags::NO_RESTORE)
    }

    /// Base name of the working directory, the default package and backup name.
    #[must_use]
    pub fn dir_name(&self) -> String {
        dir_name(&self.workdir)
    }
}

fn dir_name(path: &Path) -> String {
    path.file_name().map_or_else(
        || "repository".to_string(),
        |name| name.to_string_lossy().into_owned(),
    )
}

/// `<tmp>/debflow/backup/<basename of workdir>`.
#[must_use]
pub fn default_backup_dir(workdir: &Path) -> PathBuf {
    std::env::temp_dir()
        .join("debflow")
        .join("backup")
        .join(dir_name(workdir))
}
