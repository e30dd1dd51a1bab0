// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Release import and the full test run.
//!
//! ```text
//! commit_release
//!   release HEAD tag (asked for if missing)
//!   upstream HEAD version < release version
//!   git archive <release>            --> <tmp>/<release>_archive.tar
//!   extract minus excludes           --> <tmp>/<pkg>-<ver>/
//!   pack without VCS files           --> <tmp>/<pkg>_<ver>.orig.tar.gz
//!   gbp import-orig --merge          --> upstream + debian
//!   reset upstream to upstream/<ver>
//! ```

use std::fs;
use std::path::{Path, PathBuf};

use ignore::gitignore::{Gitignore, GitignoreBuilder};
use tracing::{debug, info, warn};

use super::build::{self, BuildOptions};
use super::changelog::{self, ChangelogOptions};
use super::run_tool;
use crate::config::Config;
use crate::core::process::builder::ProcessBuilder;
use crate::engine::ActionEnv;
use crate::engine::tagging::verify_or_create_head_tag;
use crate::error::{FlowResult, OpError};
use crate::git::backend::GitBackend;
use crate::git::tags::{format_tag, head_tag_version, latest_tag_version};
use crate::snapshot::archive;
use crate::version::{is_less_than, next_version};

/// Suffix of the upstream tarball.
pub const ORIG_TAR_EXTENSION: &str = ".orig.tar.gz";

const GITIGNORE: &str = ".gitignore";

/// Names left out of the orig tarball, like `tar --exclude-vcs`.
const VCS_NAMES: &[&str] = &[
    ".git",
    ".gitignore",
    ".gitattributes",
    ".gitmodules",
    ".hg",
    ".hgignore",
    ".hgtags",
    ".svn",
    ".bzr",
    ".bzrignore",
    "CVS",
];

/// Imports the release branch HEAD into the upstream branch and merges it
/// into the debian branch. Returns the upstream tag.
///
/// `proposed` is the release version to tag HEAD with when it carries no
/// release tag; without it the operator is asked. Tags are signed when
/// `sign` is set and a GPG key is configured.
///
/// # Errors
///
/// Returns an `OpError` if the release version does not exceed the
/// upstream version, or any error from git, the archive or `gbp`.
pub fn commit_release(
    env: &ActionEnv<'_>,
    config: &Config,
    sign: bool,
    proposed: Option<&str>,
) -> FlowResult<String> {
    info!("Committing release");
    let git = env.git;
    let release = verify_or_create_head_tag(
        git,
        env.prompter,
        &config.git.release_branch,
        &config.git.release_tag_type,
        proposed,
    )?;
    let version = release.version;
    info!(version = %version, "Selected release version for upstream commit");

    let upstream_version =
        match head_tag_version(git, &config.git.upstream_branch, &config.git.upstream_tag_type) {
            Ok(v) => Some(v),
            Err(e) => {
                debug!(error = %e, "no upstream version, using the release version");
                None
            }
        };
    if let Some(upstream) = &upstream_version
        && !is_less_than(upstream, &version)
    {
        return Err(OpError::msg(format!(
            "Release version '{version}' is not greater than upstream version '{upstream}', aborting"
        ))
        .into());
    }

    let tmp = tempfile::Builder::new()
        .prefix("debflow-tarball-")
        .tempdir()?;
    let package = &config.package.package_name;

    let tarball = if env.ctx.safe_mode() {
        info!("safe mode: skipping upstream tarball");
        tmp.path().join(orig_tarball_name(package, &version))
    } else {
        git.switch_branch(&config.git.release_branch)?;
        let excludes = exclude_matcher(
            env.ctx.workdir(),
            &config.package.exclude_files,
            &env.ctx.workdir().join(GITIGNORE),
        )?;
        prepare_orig_tarball(
            git,
            &config.git.release_branch,
            tmp.path(),
            package,
            &version,
            &excludes,
        )?
    };

    let mut import = ProcessBuilder::new("gbp")
        .args(["import-orig", "--no-interactive", "--merge"])
        .cwd(env.ctx.workdir());
    if sign {
        match config.gpg_key() {
            Some(key) => import = import.arg("--sign-tags").arg(format!("--keyid={key}")),
            None => warn!("The gpg key id is not set in the configuration file, disabling tag signing"),
        }
    }
    import = import
        .arg("--merge-mode=replace")
        .arg(format!("--debian-branch={}", config.git.debian_branch))
        .arg(format!("--upstream-branch={}", config.git.upstream_branch))
        .arg(format!("--upstream-tag={}/%(version)s", config.git.upstream_tag_type))
        .arg(&tarball);

    info!(
        upstream = %config.git.upstream_branch,
        debian = %config.git.debian_branch,
        "Importing tarball and merging upstream into debian"
    );
    run_tool(env.ctx, import)?;

    let upstream_tag = format_tag(&config.git.upstream_tag_type, &version);
    info!(branch = %config.git.upstream_branch, tag = %upstream_tag, "Resetting upstream branch to import commit");
    git.reset_hard(&config.git.upstream_branch, &upstream_tag)?;

    debug!(dir = %tmp.path().display(), "Cleaning up temporary files");
    tmp.close()?;
    Ok(upstream_tag)
}

/// Prepares a release, test-builds it, and leaves the rollback to the
/// engine (the action restores its backup afterwards).
///
/// # Errors
///
/// Returns any error from the steps above.
pub fn test_pkg(env: &ActionEnv<'_>, config: &Config) -> FlowResult<()> {
    info!("Testing package");
    let latest = latest_tag_version(env.git, &config.git.release_branch, &config.git.release_tag_type)?;
    let next = next_version(&latest)?;
    let release = verify_or_create_head_tag(
        env.git,
        env.prompter,
        &config.git.release_branch,
        &config.git.release_tag_type,
        Some(&next),
    )?;

    commit_release(env, config, false, Some(&release.version))?;

    let options = ChangelogOptions {
        version: Some(format!("{}{}", release.version, config.package.debian_version_suffix)),
        commit: true,
        ..ChangelogOptions::default()
    };
    changelog::update_changelog(env, config, &options)?;

    build::build(
        env,
        config,
        &BuildOptions::test(config.build.test_build_flags.clone()),
    )?;
    info!("Reverting changes");
    Ok(())
}

/// `<package>_<version>.orig.tar.gz`
#[must_use]
pub fn orig_tarball_name(package: &str, version: &str) -> String {
    format!("{package}_{version}{ORIG_TAR_EXTENSION}")
}

/// Matcher for files left out of the upstream tarball: the configured
/// patterns plus the release branch's `.gitignore`, if any.
///
/// # Errors
///
/// Returns an `OpError` if a pattern is invalid.
pub fn exclude_matcher(root: &Path, patterns: &[String], gitignore: &Path) -> FlowResult<Gitignore> {
    let mut builder = GitignoreBuilder::new(root);
    for pattern in patterns {
        builder.add_line(None, pattern).map_err(|e| {
            OpError::msg(format!("invalid exclude pattern '{pattern}': {e}"))
        })?;
    }
    if gitignore.is_file()
        && let Some(e) = builder.add(gitignore)
    {
        warn!(path = %gitignore.display(), error = %e, "could not read all of .gitignore");
    }
    builder
        .build()
        .map_err(|e| OpError::msg(format!("invalid exclude patterns: {e}")).into())
}

/// Builds `<tmp>/<package>_<version>.orig.tar.gz` from the tree of
/// `release_branch` and returns its path.
///
/// # Errors
///
/// Returns a `GitError` if the archive cannot be made, or an `OpError` if
/// extracting or packing fails.
pub fn prepare_orig_tarball(
    git: &dyn GitBackend,
    release_branch: &str,
    tmp: &Path,
    package: &str,
    version: &str,
    excludes: &Gitignore,
) -> FlowResult<PathBuf> {
    let archive_path = tmp.join(format!("{release_branch}_archive.tar"));
    let source_name = format!("{package}-{version}");
    let source_dir = tmp.join(&source_name);
    let tarball = tmp.join(orig_tarball_name(package, version));

    info!(version, branch = release_branch, "Extracting release version from release branch");
    fs::create_dir_all(&source_dir)?;
    git.archive(release_branch, &archive_path)?;
    archive::unpack_tar(&archive_path, &source_dir, &|rel, is_dir| {
        excludes.matched(rel, is_dir).is_ignore()
    })
    .map_err(|e| OpError::with_context("could not extract the release archive", e))?;

    info!(path = %tarball.display(), "Making upstream tarball from extracted source files");
    archive::pack_tar_gz(&source_dir, &tarball, Some(Path::new(&source_name)), &|rel, _| {
        rel.file_name()
            .and_then(|name| name.to_str())
            .is_some_and(|name| VCS_NAMES.contains(&name))
    })
    .map_err(|e| OpError::with_context("could not create the upstream tarball", e))?;

    Ok(tarball)
}
