// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Running one action through the engine.

use std::path::{Path, PathBuf};

use anyhow::Context as _;
use tracing::{error, info};

use crate::actions::PackagingActions;
use crate::cli::global::GlobalOptions;
use crate::core::context::Context;
use crate::engine::action::Action;
use crate::engine::{Engine, RunReport};
use crate::error::Result;
use crate::git::backend::ShellGit;
use crate::snapshot::BackupStore;
use crate::ui::prompt::LinePrompter;

/// Builds the execution context for `dir` (default: the current
/// directory) from the global options.
///
/// # Errors
///
/// Returns an error if the directory does not exist.
pub fn build_context(global: &GlobalOptions, dir: Option<&Path>) -> Result<Context> {
    let dir = dir.map_or_else(|| PathBuf::from("."), Path::to_path_buf);
    let workdir = dir
        .canonicalize()
        .with_context(|| format!("directory '{}' not found", dir.display()))?;

    let mut ctx = Context::new(workdir, global.execution_flags());
    if let Some(backup_dir) = &global.backup_dir {
        ctx = ctx.with_backup_dir(backup_dir);
    }
    if let Some(config) = &global.config {
        ctx = ctx.with_config_file(config);
    }
    Ok(ctx)
}

/// Runs `action` on the terminal and reports how it went.
///
/// # Errors
///
/// Returns an error only if the context cannot be built; action failures
/// are part of the report.
pub fn run_action_command(
    action: Action,
    global: &GlobalOptions,
    dir: Option<&Path>,
) -> Result<RunReport> {
    let ctx = build_context(global, dir)?;
    let git = ShellGit::from_context(&ctx);
    let backups = BackupStore::from_context(&ctx);
    let prompter = LinePrompter::stdio();
    let body = PackagingActions;

    let report = Engine::new(&ctx, &git, &backups, &prompter, &body).run(action);
    if report.is_success() {
        info!(action = %action, "Action finished successfully");
    } else {
        error!(action = %action, stages = ?report.stages, "Action failed");
    }
    Ok(report)
}
