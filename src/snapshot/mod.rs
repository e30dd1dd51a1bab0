// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Whole-directory backups of the working repository.
//!
//! ```text
//! <backup_dir>/
//!   commit-release_2026-03-01-14-02-55.bak.tar.gz
//!   test-pkg_2026-03-01-13-40-10.bak.tar.gz
//!   ^name          ^timestamp (local)
//!
//! create_backup(name)         workdir (incl. .git) --> tar.gz
//! list_backups()              newest first
//! restore_backup(selector)    Name | Index | Prompt
//!                             clear workdir --> unpack
//! ```
//!
//! A failed restore leaves whatever was already written; there is no
//! second-level rollback.

pub mod archive;

use std::fs;
use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use chrono::{Local, NaiveDateTime};
use regex::Regex;
use tracing::{info, warn};

use crate::core::context::Context;
use crate::error::{FlowError, FlowResult, GitError, OpError};
use crate::git::backend::is_git_repo;
use crate::ui::prompt::Prompter;

/// Suffix of every backup file.
pub const BACKUP_EXTENSION: &str = ".bak.tar.gz";

const FILE_DATE_FORMAT: &str = "%Y-%m-%d-%H-%M-%S";
const DISPLAY_DATE_FORMAT: &str = "%Y-%m-%d %H:%M:%S";
const TAB_WIDTH: usize = 8;

static BACKUP_FILE: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"^([^_]+)_(\d{4}-\d{2}-\d{2}-\d{2}-\d{2}-\d{2})\.bak\.tar\.gz$")
        .expect("backup file pattern is valid")
});

/// One backup file found in the backup directory.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupEntry {
    file_name: String,
    name: String,
    created: NaiveDateTime,
}

impl BackupEntry {
    /// Parses `<name>_<timestamp>.bak.tar.gz`; anything else is `None`.
    #[must_use]
    pub fn parse(file_name: &str) -> Option<Self> {
        let caps = BACKUP_FILE.captures(file_name)?;
        let created = NaiveDateTime::parse_from_str(&caps[2], FILE_DATE_FORMAT).ok()?;
        Some(Self {
            file_name: file_name.to_string(),
            name: caps[1].to_string(),
            created,
        })
    }

    #[must_use]
    pub fn file_name(&self) -> &str {
        &self.file_name
    }

    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    #[must_use]
    pub const fn created(&self) -> NaiveDateTime {
        self.created
    }

    /// `YYYY-mm-dd HH:MM:SS`
    #[must_use]
    pub fn display_time(&self) -> String {
        self.created.format(DISPLAY_DATE_FORMAT).to_string()
    }
}

/// How the backup to restore is picked.
pub enum Selector<'a> {
    /// Exact backup file name, as returned by `create_backup`.
    Name(&'a str),
    /// Position in `list_backups()` (0 = newest).
    Index(usize),
    /// Ask the operator.
    Prompt(&'a dyn Prompter),
}

/// Backup directory bound to one working directory.
#[derive(Debug, Clone)]
pub struct BackupStore {
    workdir: PathBuf,
    dir: PathBuf,
    safe_mode: bool,
}

impl BackupStore {
    pub fn new(workdir: impl Into<PathBuf>, dir: impl Into<PathBuf>, safe_mode: bool) -> Self {
        Self {
            workdir: workdir.into(),
            dir: dir.into(),
            safe_mode,
        }
    }

    #[must_use]
    pub fn from_context(ctx: &Context) -> Self {
        Self::new(ctx.workdir(), ctx.backup_dir(), ctx.safe_mode())
    }

    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Archives the whole working directory and returns the backup file name.
    ///
    /// `_` in `name` is replaced by `-` so the name can be parsed back.
    ///
    /// # Errors
    ///
    /// Returns an `OpError` if the working directory is not a repository or
    /// the archive cannot be written.
    pub fn create_backup(&self, name: &str) -> FlowResult<String> {
        self.check_repo()?;

        let name = name.replace('_', "-");
        let file_name = format!(
            "{name}_{}{BACKUP_EXTENSION}",
            Local::now().format(FILE_DATE_FORMAT)
        );
        let path = self.dir.join(&file_name);
        info!(path = %path.display(), "Creating backup file");

        if self.safe_mode {
            return Ok(file_name);
        }

        let result = fs::create_dir_all(&self.dir).and_then(|()| {
            let skip_dir = self.nested_backup_dir();
            archive::pack_tar_gz(&self.workdir, &path, None, &|rel, is_dir| {
                is_dir && skip_dir.as_deref() == Some(rel)
            })
        });

        if let Err(e) = result {
            let _ = fs::remove_file(&path);
            return Err(OpError::with_context(
                format!("could not add backup in '{}'", self.dir.display()),
                e,
            )
            .into());
        }
        Ok(file_name)
    }

    /// Backups in the directory, newest first. A missing directory is empty.
    ///
    /// # Errors
    ///
    /// Returns an I/O error if the directory exists but cannot be read.
    pub fn list_backups(&self) -> FlowResult<Vec<BackupEntry>> {
        let read_dir = match fs::read_dir(&self.dir) {
            Ok(read_dir) => read_dir,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut entries = Vec::new();
        for entry in read_dir {
            let entry = entry?;
            if let Some(backup) = entry.file_name().to_str().and_then(BackupEntry::parse) {
                entries.push(backup);
            }
        }
        entries.sort_by(|a, b| {
            b.created
                .cmp(&a.created)
                .then_with(|| b.file_name.cmp(&a.file_name))
        });
        Ok(entries)
    }

    /// Menu labels for `entries`: the name tab-padded into a column, then the
    /// display time.
    #[must_use]
    pub fn menu_labels(entries: &[BackupEntry]) -> Vec<String> {
        let depth = entries
            .iter()
            .map(|e| 1 + e.name.len() / TAB_WIDTH)
            .max()
            .unwrap_or(1);
        entries
            .iter()
            .map(|e| {
                let tabs = "\t".repeat(depth - e.name.len() / TAB_WIDTH);
                format!("\t{}{tabs}{}", e.name, e.display_time())
            })
            .collect()
    }

    /// Replaces the working directory with the selected backup and returns
    /// its file name.
    ///
    /// # Errors
    ///
    /// Returns an `OpError` if no backup matches, the operator aborts, or
    /// the restore itself fails.
    pub fn restore_backup(&self, selector: Selector<'_>) -> FlowResult<String> {
        self.check_repo()?;

        let file_name = match selector {
            Selector::Name(name) => name.to_string(),
            Selector::Index(idx) => {
                let entries = self.require_backups()?;
                entries
                    .get(idx)
                    .map(|e| e.file_name.clone())
                    .ok_or_else(|| {
                        OpError::msg(format!(
                            "invalid backup index '{idx}' is outside [0-{}]",
                            entries.len() - 1
                        ))
                    })?
            }
            Selector::Prompt(prompter) => {
                let entries = self.require_backups()?;
                let labels = Self::menu_labels(&entries);
                let choice = prompter
                    .choose("Select the backup to restore", &labels, 0)
                    .map_err(OpError::caused_by)?;
                let Some(idx) = choice else {
                    return Err(OpError::msg("Restore aborted by user").into());
                };
                entries[idx].file_name.clone()
            }
        };

        let path = self.dir.join(&file_name);
        info!(backup = %file_name, "Restoring backup");
        // Safe mode never wrote the archive.
        if self.safe_mode {
            return Ok(file_name);
        }
        if !path.is_file() {
            return Err(OpError::msg(format!(
                "backup '{file_name}' does not exist in '{}'",
                self.dir.display()
            ))
            .into());
        }

        let result = self
            .clear_workdir()
            .and_then(|()| archive::unpack_tar_gz(&path, &self.workdir));
        if let Err(e) = result {
            warn!(dir = %self.dir.display(), "Restore failed, the backup can be found in the backup directory");
            return Err(OpError::with_context(
                format!("restore of backup '{file_name}' failed"),
                e,
            )
            .into());
        }
        Ok(file_name)
    }

    fn require_backups(&self) -> FlowResult<Vec<BackupEntry>> {
        let entries = self.list_backups()?;
        if entries.is_empty() {
            return Err(OpError::msg(format!(
                "no backups exist in directory '{}'",
                self.dir.display()
            ))
            .into());
        }
        Ok(entries)
    }

    fn check_repo(&self) -> FlowResult<()> {
        if is_git_repo(&self.workdir) {
            return Ok(());
        }
        let err: FlowError = GitError::NotARepository {
            path: self.workdir.display().to_string(),
        }
        .into();
        Err(OpError::caused_by(err).into())
    }

    /// Backup directory relative to the workdir, if it lives inside it.
    fn nested_backup_dir(&self) -> Option<PathBuf> {
        let workdir = self.workdir.canonicalize().ok()?;
        let dir = self.dir.canonicalize().ok()?;
        dir.strip_prefix(&workdir).ok().map(Path::to_path_buf)
    }

    /// Removes everything in the workdir except the backup directory.
    fn clear_workdir(&self) -> std::io::Result<()> {
        let keep = self.nested_backup_dir().map(|rel| self.workdir.join(rel));
        clear_dir(&self.workdir, keep.as_deref())
    }
}

fn clear_dir(dir: &Path, keep: Option<&Path>) -> std::io::Result<()> {
    for entry in fs::read_dir(dir)? {
        let entry = entry?;
        let path = entry.path();
        let file_type = entry.file_type()?;

        match keep {
            Some(keep) if path == keep => continue,
            Some(keep) if file_type.is_dir() && keep.starts_with(&path) => {
                clear_dir(&path, Some(keep))?;
            }
            _ if file_type.is_dir() => fs::remove_dir_all(&path)?,
            _ => fs::remove_file(&path)?,
        }
    }
    Ok(())
}
