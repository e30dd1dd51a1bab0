// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! `debian/changelog` updates through `gbp dch`.

use std::fs;
use std::path::Path;

use tracing::{debug, info};

use super::{command_from_config, run_tool};
use crate::config::Config;
use crate::core::process::builder::{ProcessBuilder, ProcessFlags};
use crate::engine::ActionEnv;
use crate::error::{FlowResult, OpError};
use crate::git::tags::head_tag_version;
use crate::version::{Version, is_less_than, next_package_build_version};

/// Path of the changelog inside the debian branch.
pub const CHANGELOG_PATH: &str = "debian/changelog";

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ChangelogOptions {
    /// Version of the new entry. Defaults to the upstream HEAD version plus
    /// the debian suffix.
    pub version: Option<String>,
    /// Open the changelog in the configured editor afterwards.
    pub editor: bool,
    pub commit: bool,
    /// Pass `--release` so the entry is finalised for a release.
    pub release: bool,
}

impl ChangelogOptions {
    /// Options of the `update-changelog` action.
    #[must_use]
    pub fn for_release() -> Self {
        Self {
            version: None,
            editor: true,
            commit: true,
            release: true,
        }
    }
}

/// Adds a new changelog entry on the debian branch and returns its version.
///
/// # Errors
///
/// Returns an `OpError` if no version is given and the upstream HEAD is not
/// tagged, or any error from `gbp`, the editor or git.
pub fn update_changelog(
    env: &ActionEnv<'_>,
    config: &Config,
    options: &ChangelogOptions,
) -> FlowResult<String> {
    info!("Updating changelog");
    let version = match &options.version {
        Some(version) => {
            env.git.switch_branch(&config.git.debian_branch)?;
            version.clone()
        }
        None => {
            let upstream =
                head_tag_version(env.git, &config.git.upstream_branch, &config.git.upstream_tag_type)
                    .map_err(|e| {
                        OpError::with_context("could not determine the changelog version", e)
                    })?;
            let proposed = format!("{upstream}{}", config.package.debian_version_suffix);
            env.git.switch_branch(&config.git.debian_branch)?;
            let current = current_changelog_version(&env.ctx.workdir().join(CHANGELOG_PATH));
            rebuild_version(current.as_deref(), proposed)
        }
    };
    info!(version = %version, "Updating changelog with new version");

    run_tool(env.ctx, dch_command(config, &version, options.release).cwd(env.ctx.workdir()))?;

    if options.editor {
        let editor = command_from_config(&config.system.editor_command).ok_or_else(|| {
            OpError::msg("The editor command in the configuration file is empty")
        })?;
        run_tool(
            env.ctx,
            editor
                .arg(CHANGELOG_PATH)
                .cwd(env.ctx.workdir())
                .flag(ProcessFlags::INHERIT_STDIO | ProcessFlags::NO_FATAL_SCAN),
        )?;
    }

    if options.commit {
        info!(branch = %config.git.debian_branch, "Committing updated debian/changelog");
        env.git
            .commit_all(&format!("Update changelog for {version} release."))?;
    }
    Ok(version)
}

/// Version in the first entry of the changelog at `path`, if it can be read.
#[must_use]
pub fn current_changelog_version(path: &Path) -> Option<String> {
    let content = match fs::read_to_string(path) {
        Ok(content) => content,
        Err(e) => {
            debug!(path = %path.display(), error = %e, "No changelog to read");
            return None;
        }
    };
    let first = content.lines().find(|line| !line.trim().is_empty())?;
    let (_, rest) = first.split_once('(')?;
    let (version, _) = rest.split_once(')')?;
    let version = version.trim();
    (!version.is_empty()).then(|| version.to_string())
}

/// Version for a new entry: `proposed`, unless the changelog already has
/// an entry for the same upstream version that is not older, in which case
/// its package build number is bumped.
#[must_use]
pub fn rebuild_version(current: Option<&str>, proposed: String) -> String {
    match current {
        Some(current)
            if Version::parse_upstream(current) == Version::parse_upstream(&proposed)
                && !is_less_than(current, &proposed) =>
        {
            let next = next_package_build_version(current);
            info!(current, next = %next, "Changelog already has this upstream version, bumping the build");
            next
        }
        _ => proposed,
    }
}

/// `gbp dch` invocation for a new entry.
#[must_use]
pub fn dch_command(config: &Config, version: &str, release: bool) -> ProcessBuilder {
    let mut dch = ProcessBuilder::new("gbp").arg("dch").args([
        format!("--debian-branch={}", config.git.debian_branch),
        format!("--new-version={version}"),
        format!("--urgency={}", config.package.urgency),
        "--spawn-editor=snapshot".to_string(),
    ]);
    if let Some(distribution) = &config.package.distribution {
        dch = dch.arg(format!("--distribution={distribution}"));
    }
    if release {
        dch = dch.arg("--release");
    }
    dch
}
