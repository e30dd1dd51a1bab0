// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Cloning a source repository and laying out the packaging branches.
//!
//! ```text
//! git clone -b <source> <url>
//!   create release/upstream/debian from <source> (unless same name)
//!   upstream: empty tree            "Initial upstream commit."
//!   debian:   empty tree [dh_make]  "Initial debian commit."
//!   release:  debflow.conf          "Initial release commit."
//! ```

use std::fs;
use std::path::Path;

use tracing::{info, warn};

use super::run_tool;
use crate::config::{keys, write_example};
use crate::core::context::{Context, DEFAULT_CONFIG_FILE};
use crate::core::process::builder::ProcessBuilder;
use crate::engine::ActionEnv;
use crate::error::{FlowResult, OpError};
use crate::git::backend::{GitBackend, ShellGit, clone_repo, repo_name_from_url};
use crate::ui::prompt::Prompter;

const DEFAULT_SOURCE_BRANCH: &str = "master";

/// Names chosen for the packaging branches.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CloneBranches {
    pub release: String,
    pub upstream: String,
    pub debian: String,
}

impl Default for CloneBranches {
    fn default() -> Self {
        let default = |key: &str, fallback: &str| keys::default_of(key).unwrap_or(fallback).to_string();
        Self {
            release: default(keys::RELEASE_BRANCH, "master"),
            upstream: default(keys::UPSTREAM_BRANCH, "upstream"),
            debian: default(keys::DEBIAN_BRANCH, "debian"),
        }
    }
}

impl CloneBranches {
    fn roles(&self) -> [(&'static str, &str); 3] {
        [
            ("release", self.release.as_str()),
            ("upstream", self.upstream.as_str()),
            ("debian", self.debian.as_str()),
        ]
    }

    /// Config presets pointing at these branches.
    fn presets(&self) -> [(&'static str, &str); 3] {
        [
            (keys::RELEASE_BRANCH, self.release.as_str()),
            (keys::UPSTREAM_BRANCH, self.upstream.as_str()),
            (keys::DEBIAN_BRANCH, self.debian.as_str()),
        ]
    }
}

/// Clones a remote repository into the working directory and prepares
/// its packaging branches, asking the operator for every name.
///
/// # Errors
///
/// Returns an `OpError` if the URL has no repository name or a prompt
/// fails, or any error from git.
pub fn clone(env: &ActionEnv<'_>) -> FlowResult<()> {
    info!("Cloning remote source repository");
    let prompter = env.prompter;
    let ask = |prompt: &str, default: Option<&str>| -> FlowResult<Option<String>> {
        prompter
            .input(prompt, default, default.is_some())
            .map_err(|e| OpError::caused_by(e).into())
    };

    let url = ask("Enter the URL of the remote repository", None)?.unwrap_or_default();
    let name = repo_name_from_url(&url)
        .ok_or_else(|| OpError::msg(format!("could not find a repository name in '{url}'")))?;
    let source = ask("Enter the name of the remote source branch", Some(DEFAULT_SOURCE_BRANCH))?
        .unwrap_or_else(|| DEFAULT_SOURCE_BRANCH.to_string());

    let defaults = CloneBranches::default();
    let mut answers = Vec::with_capacity(3);
    for (role, default) in defaults.roles() {
        let answer = ask(&format!("Enter the name of the {role} branch"), Some(default))?
            .unwrap_or_else(|| default.to_string());
        answers.push(answer);
    }
    let [release, upstream, debian]: [String; 3] = answers
        .try_into()
        .map_err(|_| OpError::msg("expected three branch names"))?;
    let branches = CloneBranches {
        release,
        upstream,
        debian,
    };

    info!(url = %url, branch = %source, "Cloning and checking out source branch");
    clone_repo(env.ctx.workdir(), &url, &source, env.ctx.safe_mode())?;
    if env.ctx.safe_mode() {
        return Ok(());
    }

    let repo = env.ctx.workdir().join(&name);
    let git = ShellGit::new(&repo, false);
    initialise_branches(&git, prompter, env.ctx, &repo, &name, &source, &branches)
}

/// Creates the packaging branches of a fresh clone at `repo`, which is on
/// branch `source`.
///
/// # Errors
///
/// Returns an error if a branch cannot be created or committed, `dh_make`
/// fails, or the example config cannot be written.
pub fn initialise_branches(
    git: &dyn GitBackend,
    prompter: &dyn Prompter,
    ctx: &Context,
    repo: &Path,
    name: &str,
    source: &str,
    branches: &CloneBranches,
) -> FlowResult<()> {
    for (role, branch) in branches.roles() {
        if branch == source {
            info!(role, branch, "Not creating branch since name conflicts with source branch");
        } else {
            info!(role, branch, source, "Creating branch from source branch");
            git.create_branch(branch)?;
        }
    }

    info!(branch = %branches.upstream, "Cleaning upstream branch");
    git.switch_branch(&branches.upstream)?;
    git.remove_all_tracked()?;
    git.commit_all("Initial upstream commit.")?;

    info!(branch = %branches.debian, "Cleaning debian branch");
    git.switch_branch(&branches.debian)?;
    git.remove_all_tracked()?;
    let example = prompter
        .confirm("Do you want to create an example debian/ files?", Some(false))
        .map_err(OpError::caused_by)?;
    if example {
        create_debian_files(prompter, ctx, repo, name)?;
    }
    git.commit_all("Initial debian commit.")?;

    info!(branch = %branches.release, "Writing example config on release branch");
    git.switch_branch(&branches.release)?;
    write_example(
        &repo.join(DEFAULT_CONFIG_FILE),
        &branches.presets(),
        ctx.safe_mode(),
    )
    .map_err(OpError::caused_by)?;
    git.commit_all("Initial release commit.")?;
    Ok(())
}

fn create_debian_files(
    prompter: &dyn Prompter,
    ctx: &Context,
    repo: &Path,
    name: &str,
) -> FlowResult<()> {
    let version = prompter
        .input("Enter the initial package version", None, false)
        .map_err(OpError::caused_by)?
        .unwrap_or_default();
    let email = prompter
        .input("Enter the developer e-mail address", None, true)
        .map_err(OpError::caused_by)?;

    let package = format!("{name}_{version}");
    let mut dh_make = ProcessBuilder::new("dh_make")
        .args(["-p", package.as_str(), "-i", "--createorig"])
        .stdin("y\n")
        .cwd(repo);
    if let Some(email) = email.filter(|e| !e.trim().is_empty()) {
        dh_make = dh_make.arg("-e").arg(email);
    }
    if run_tool(ctx, dh_make)?.is_none() {
        return Ok(());
    }

    // dh_make leaves the orig tarball next to the repository
    let Some(parent) = repo.parent() else {
        return Ok(());
    };
    for entry in fs::read_dir(parent)? {
        let path = entry?.path();
        let created = path
            .file_name()
            .and_then(|n| n.to_str())
            .is_some_and(|n| n.starts_with(&package));
        if created && path.is_file() {
            info!(path = %path.display(), "Removing dh_make leftover");
            if let Err(e) = fs::remove_file(&path) {
                warn!(path = %path.display(), error = %e, "could not remove file");
            }
        }
    }
    Ok(())
}
