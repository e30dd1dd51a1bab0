// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Packaging action bodies.
//!
//! ```text
//! test-pkg          latest release tag --> next version --> tag
//!                   commit-release (unsigned) --> changelog --> test build
//! commit-release    release HEAD tag --> orig tarball --> gbp import-orig
//! update-changelog  gbp dch on the debian branch --> editor --> commit
//! test-build        gbp buildpackage --> ../build-area/<pkg>/<ver>/test
//! commit-build      gbp buildpackage --git-tag, signed --> .../final
//! upload            newest final *source.changes --> dput ppa:<name>
//! clone             git clone --> upstream/debian/release branches
//! restore           pick a backup --> restore it
//! config            write an example debflow.conf
//! ```
//!
//! External tools that change anything are skipped in safe mode; reads
//! (such as `dpkg-parsechangelog`) still run.

pub mod build;
pub mod changelog;
pub mod clone;
pub mod release;
pub mod upload;

#[cfg(test)]
mod tests;

use std::fs;
use std::path::{Path, PathBuf};

use ignore::WalkBuilder;
use tracing::{info, warn};

use crate::config::write_example;
use crate::core::context::Context;
use crate::core::process::builder::{ProcessBuilder, ProcessOutput};
use crate::engine::action::Action;
use crate::engine::{ActionBody, ActionEnv};
use crate::error::{FlowResult, OpError};
use crate::snapshot::Selector;

/// Directory next to the repository that receives build results.
pub const BUILD_AREA: &str = "build-area";

/// The real action bodies.
#[derive(Debug, Clone, Copy, Default)]
pub struct PackagingActions;

impl ActionBody for PackagingActions {
    fn run(&self, action: Action, env: &ActionEnv<'_>) -> FlowResult<()> {
        match action {
            Action::TestPkg => release::test_pkg(env, env.config()?),
            Action::CommitRelease => {
                release::commit_release(env, env.config()?, true, None).map(|_| ())
            }
            Action::UpdateChangelog => changelog::update_changelog(
                env,
                env.config()?,
                &changelog::ChangelogOptions::for_release(),
            )
            .map(|_| ()),
            Action::TestBuild => {
                let config = env.config()?;
                let options = build::BuildOptions::test(config.build.test_build_flags.clone());
                build::build(env, config, &options)
            }
            Action::CommitBuild => {
                let config = env.config()?;
                let options = build::BuildOptions::release(config.build.build_flags.clone());
                build::build(env, config, &options)
            }
            Action::Upload => upload::upload(env, env.config()?),
            Action::Clone => clone::clone(env),
            Action::Restore => restore(env),
            Action::Config => create_config(env.ctx),
        }
    }
}

fn restore(env: &ActionEnv<'_>) -> FlowResult<()> {
    info!("Restoring repository");
    let name = env
        .backups
        .restore_backup(Selector::Prompt(env.prompter))?;
    info!(backup = %name, "Repository restored");
    Ok(())
}

fn create_config(ctx: &Context) -> FlowResult<()> {
    let path = ctx.config_path();
    info!(path = %path.display(), "Creating example config file");
    write_example(&path, &[], ctx.safe_mode()).map_err(OpError::caused_by)?;
    Ok(())
}

/// Runs an external tool that changes something, unless safe mode is on.
///
/// # Errors
///
/// Returns a `CommandError` if the tool fails.
pub fn run_tool(ctx: &Context, process: ProcessBuilder) -> FlowResult<Option<ProcessOutput>> {
    if ctx.safe_mode() {
        info!(cmd = %process.command_line(), "safe mode: skipping");
        return Ok(None);
    }
    Ok(Some(process.run()?))
}

/// `<parent of workdir>/build-area`
#[must_use]
pub fn build_area(workdir: &Path) -> PathBuf {
    workdir
        .parent()
        .map_or_else(|| workdir.join(".."), Path::to_path_buf)
        .join(BUILD_AREA)
}

/// Files below `dir` whose name ends with `suffix`, sorted by path.
/// A missing directory yields nothing.
#[must_use]
pub fn find_files_with_suffix(dir: &Path, suffix: &str) -> Vec<PathBuf> {
    if !dir.is_dir() {
        return Vec::new();
    }
    let mut files: Vec<PathBuf> = WalkBuilder::new(dir)
        .standard_filters(false)
        .build()
        .filter_map(|entry| match entry {
            Ok(entry) => Some(entry),
            Err(e) => {
                warn!(error = %e, "skipping unreadable entry");
                None
            }
        })
        .filter(|entry| entry.file_type().is_some_and(|ft| ft.is_file()))
        .filter(|entry| entry.file_name().to_string_lossy().ends_with(suffix))
        .map(ignore::DirEntry::into_path)
        .collect();
    files.sort();
    files
}

/// Empties `dir`, creating it if needed. Skipped in safe mode.
///
/// # Errors
///
/// Returns an I/O error if the directory cannot be removed or created.
pub fn clean_dir(ctx: &Context, dir: &Path) -> FlowResult<()> {
    info!(dir = %dir.display(), "Cleaning directory");
    if ctx.safe_mode() {
        return Ok(());
    }
    if dir.exists() {
        fs::remove_dir_all(dir)?;
    }
    fs::create_dir_all(dir)?;
    Ok(())
}

/// Splits a configured command such as `code --wait` into program and
/// arguments.
#[must_use]
pub fn command_from_config(command: &str) -> Option<ProcessBuilder> {
    let mut parts = command.split_whitespace();
    let program = parts.next()?;
    Some(ProcessBuilder::new(program).args(parts))
}
