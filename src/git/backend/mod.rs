// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git backend abstraction layer.
//!
//! ```text
//! GitBackend (trait, &self, object safe)
//!      |
//!      v
//! ShellGit { workdir, safe_mode }
//!   check_repo       --> gix::discover (no subprocess)
//!   everything else  --> git CLI via ProcessBuilder
//!
//! read:   current_branch  head_commit  head_tags  latest_tag
//!         is_working_tree_clean  resolve_stash  switch_branch
//! write:  commit_all  stash  apply_stash  reset_hard  tag_head
//!         delete_tag  clean_untracked_and_ignored  create_branch
//!         archive  remove_all_tracked          (no-ops in safe mode)
//! ```
//!
//! Every repository operation checks the working directory first. Command
//! failures come back as `GitError::Command` with the underlying
//! `CommandError` attached as source.

use std::path::{Path, PathBuf};

use tracing::{debug, info};

use crate::core::context::Context;
use crate::core::process::builder::ProcessBuilder;
use crate::error::{CommandError, FlowResult, GitError};

/// Repository operations used by the engine and the packaging actions.
pub trait GitBackend {
    /// Fails with `GitError::NotARepository` unless the working directory is
    /// inside a git work tree.
    ///
    /// # Errors
    ///
    /// See above.
    fn check_repo(&self) -> FlowResult<()>;

    /// Name of the checked out branch.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the repository or HEAD cannot be read.
    fn current_branch(&self) -> FlowResult<String>;

    /// Checks out `branch`. Not gated by safe mode.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch is missing or uncommitted changes
    /// prevent the checkout.
    fn switch_branch(&self, branch: &str) -> FlowResult<()>;

    /// Tags of the form `<tag_type>/...` pointing at the HEAD of `branch`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be checked out or the tags
    /// cannot be listed.
    fn head_tags(&self, branch: &str, tag_type: &str) -> FlowResult<Vec<String>>;

    /// Nearest tag of the form `<tag_type>/*` reachable from `branch`.
    ///
    /// # Errors
    ///
    /// Returns `GitError::NoTag` if there is none.
    fn latest_tag(&self, branch: &str, tag_type: &str) -> FlowResult<String>;

    /// Full hash of the HEAD commit of `branch`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be resolved.
    fn head_commit(&self, branch: &str) -> FlowResult<String>;

    /// True when there is nothing to commit, untracked files included.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the status cannot be read.
    fn is_working_tree_clean(&self) -> FlowResult<bool>;

    /// Stages everything and commits it on the current branch.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if staging or committing fails.
    fn commit_all(&self, message: &str) -> FlowResult<()>;

    /// Stashes all changes, untracked files included, optionally named.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the stash cannot be created.
    fn stash(&self, name: Option<&str>) -> FlowResult<()>;

    /// Applies the named stash (or the latest) on `branch`, dropping it
    /// afterwards when `drop` is set.
    ///
    /// # Errors
    ///
    /// Returns `GitError::StashNotFound` for an unknown name, or a
    /// `GitError` if the apply/drop fails.
    fn apply_stash(&self, branch: &str, name: Option<&str>, drop: bool) -> FlowResult<()>;

    /// Reflog selector (`stash@{n}`) of the stash saved under `name`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the stash list cannot be read.
    fn resolve_stash(&self, name: &str) -> FlowResult<Option<String>>;

    /// Hard-resets `branch` to `commit` (a hash, tag or `HEAD`).
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the reset fails.
    fn reset_hard(&self, branch: &str, commit: &str) -> FlowResult<()>;

    /// Creates the lightweight tag `tag` on the HEAD of `branch`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the tag exists or cannot be created.
    fn tag_head(&self, branch: &str, tag: &str) -> FlowResult<()>;

    /// # Errors
    ///
    /// Returns a `GitError` if the tag cannot be deleted.
    fn delete_tag(&self, tag: &str) -> FlowResult<()>;

    /// Removes untracked files and directories, then ignored files.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if either clean fails.
    fn clean_untracked_and_ignored(&self) -> FlowResult<()>;

    /// Creates `branch` from the current HEAD without switching to it.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the branch cannot be created.
    fn create_branch(&self, branch: &str) -> FlowResult<()>;

    /// Writes the tree of `treeish` as a tar archive to `dest`.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the archive cannot be written.
    fn archive(&self, treeish: &str, dest: &Path) -> FlowResult<()>;

    /// Removes every tracked file from the index and the working tree.
    ///
    /// # Errors
    ///
    /// Returns a `GitError` if the removal fails.
    fn remove_all_tracked(&self) -> FlowResult<()>;
}

/// True if `path` is inside a git repository.
#[must_use]
pub fn is_git_repo(path: &Path) -> bool {
    gix::discover(path).is_ok()
}

/// `https://host/group/name.git` -> `name`.
#[must_use]
pub fn repo_name_from_url(url: &str) -> Option<String> {
    let trimmed = url.trim_end_matches('/');
    let last = trimmed.rsplit(['/', ':']).next()?;
    let name = last
        .strip_suffix(".git")
        .or_else(|| last.strip_suffix(".GIT"))?;
    (!name.is_empty()).then(|| name.to_string())
}

/// Clones `url` at `branch` into `parent/<name>`.
///
/// # Errors
///
/// Returns a `GitError` if the clone fails.
pub fn clone_repo(parent: &Path, url: &str, branch: &str, safe_mode: bool) -> FlowResult<()> {
    if safe_mode {
        info!(url, branch, "safe mode: skipping clone");
        return Ok(());
    }
    ShellGit::git_command(&["clone", "-q", "-b", branch, url], parent).map_err(|e| {
        GitError::command(
            "clone",
            format!("could not clone '{url}' (branch '{branch}')"),
            e,
        )
    })?;
    Ok(())
}

/// Initialises a new repository at `path`.
///
/// # Errors
///
/// Returns a `GitError` if `git init` fails.
pub fn init_repo(path: &Path, safe_mode: bool) -> FlowResult<()> {
    if safe_mode {
        return Ok(());
    }
    let target = path.to_string_lossy();
    let cwd = path.parent().unwrap_or_else(|| Path::new("."));
    ShellGit::git_command(&["init", "-q", &target], cwd).map_err(|e| {
        GitError::command(
            "init",
            format!("could not initiate repository '{}'", path.display()),
            e,
        )
    })?;
    Ok(())
}

/// Shell-based git backend bound to one working directory.
#[derive(Debug, Clone)]
pub struct ShellGit {
    workdir: PathBuf,
    safe_mode: bool,
}

impl ShellGit {
    pub fn new(workdir: impl Into<PathBuf>, safe_mode: bool) -> Self {
        Self {
            workdir: workdir.into(),
            safe_mode,
        }
    }

    /// Backend for the context's working directory and safe-mode flag.
    #[must_use]
    pub fn from_context(ctx: &Context) -> Self {
        Self::new(ctx.workdir(), ctx.safe_mode())
    }

    #[must_use]
    pub fn workdir(&self) -> &Path {
        &self.workdir
    }

    /// Execute a git command. Sets `GCM_INTERACTIVE=never` and `GIT_TERMINAL_PROMPT=0`.
    pub(crate) fn git_command(args: &[&str], cwd: &Path) -> Result<String, CommandError> {
        let output = ProcessBuilder::new("git")
            .args(args)
            .cwd(cwd)
            .env("GCM_INTERACTIVE", "never")
            .env("GIT_TERMINAL_PROMPT", "0")
            .run()?;
        Ok(output.stdout().trim().to_string())
    }

    fn git(&self, args: &[&str]) -> Result<String, CommandError> {
        Self::git_command(args, &self.workdir)
    }

    /// Runs a mutating command unless safe mode is on.
    fn mutate(&self, args: &[&str]) -> Result<(), CommandError> {
        if self.safe_mode {
            debug!(args = %args.join(" "), "safe mode: skipping git");
            return Ok(());
        }
        self.git(args).map(|_| ())
    }
}

impl GitBackend for ShellGit {
    fn check_repo(&self) -> FlowResult<()> {
        if is_git_repo(&self.workdir) {
            Ok(())
        } else {
            Err(GitError::NotARepository {
                path: self.workdir.display().to_string(),
            }
            .into())
        }
    }

    fn current_branch(&self) -> FlowResult<String> {
        self.check_repo()?;
        let branch = self
            .git(&["rev-parse", "--abbrev-ref", "HEAD"])
            .map_err(|e| {
                GitError::command(
                    "rev-parse",
                    "could not find the name of the current branch",
                    e,
                )
            })?;
        Ok(branch)
    }

    fn switch_branch(&self, branch: &str) -> FlowResult<()> {
        self.check_repo()?;
        self.git(&["checkout", "-q", branch]).map_err(|e| {
            GitError::command(
                "checkout",
                format!(
                    "please make sure that the branch '{branch}' exists and all changes are committed"
                ),
                e,
            )
        })?;
        Ok(())
    }

    fn head_tags(&self, branch: &str, tag_type: &str) -> FlowResult<Vec<String>> {
        self.switch_branch(branch)?;
        let listing = self.git(&["tag", "--points-at", "HEAD"]).map_err(|e| {
            GitError::command(
                "tag",
                format!("the tags pointing at '{branch}' HEAD could not be retrieved"),
                e,
            )
        })?;
        let prefix = format!("{tag_type}/");
        Ok(listing
            .lines()
            .map(str::trim)
            .filter(|tag| tag.starts_with(&prefix))
            .map(str::to_string)
            .collect())
    }

    fn latest_tag(&self, branch: &str, tag_type: &str) -> FlowResult<String> {
        self.switch_branch(branch)?;
        let pattern = format!("{tag_type}/*");
        self.git(&["describe", "--abbrev=0", "--tags", "--match", &pattern])
            .map_err(|_| {
                GitError::NoTag {
                    branch: branch.to_string(),
                    tag_type: tag_type.to_string(),
                }
                .into()
            })
    }

    fn head_commit(&self, branch: &str) -> FlowResult<String> {
        self.switch_branch(branch)?;
        let commit = self.git(&["rev-parse", "HEAD"]).map_err(|e| {
            GitError::command(
                "rev-parse",
                format!("could not find HEAD commit of branch '{branch}'"),
                e,
            )
        })?;
        Ok(commit)
    }

    fn is_working_tree_clean(&self) -> FlowResult<bool> {
        self.check_repo()?;
        let status = self.git(&["status", "--porcelain"]).map_err(|e| {
            GitError::command(
                "status",
                "could not determine if working directory is clean",
                e,
            )
        })?;
        Ok(status.is_empty())
    }

    fn commit_all(&self, message: &str) -> FlowResult<()> {
        self.check_repo()?;
        self.mutate(&["add", "-A"])
            .and_then(|()| self.mutate(&["commit", "-q", "-m", message]))
            .map_err(|e| {
                GitError::command("commit", "could not commit changes to current branch", e)
            })?;
        Ok(())
    }

    fn stash(&self, name: Option<&str>) -> FlowResult<()> {
        self.check_repo()?;
        let mut args = vec!["stash", "push", "-q", "--include-untracked"];
        if let Some(name) = name {
            args.extend(["-m", name]);
        }
        self.mutate(&args)
            .map_err(|e| GitError::command("stash", "could not stash uncommitted changes", e))?;
        Ok(())
    }

    fn apply_stash(&self, branch: &str, name: Option<&str>, drop: bool) -> FlowResult<()> {
        self.switch_branch(branch)?;
        if self.safe_mode {
            debug!(stash = ?name, "safe mode: skipping stash apply");
            return Ok(());
        }

        let selector = match name {
            Some(name) => Some(
                self.resolve_stash(name)?
                    .ok_or_else(|| GitError::StashNotFound {
                        name: name.to_string(),
                    })?,
            ),
            None => None,
        };

        let context = name.map_or_else(
            || "could not apply stashed changes".to_string(),
            |name| format!("could not apply stashed changes ({name})"),
        );

        let mut apply = vec!["stash", "apply", "-q"];
        apply.extend(selector.as_deref());
        self.git(&apply)
            .map_err(|e| GitError::command("stash", context.clone(), e))?;

        if drop {
            let mut drop_args = vec!["stash", "drop", "-q"];
            drop_args.extend(selector.as_deref());
            self.git(&drop_args)
                .map_err(|e| GitError::command("stash", context, e))?;
        }
        Ok(())
    }

    fn resolve_stash(&self, name: &str) -> FlowResult<Option<String>> {
        self.check_repo()?;
        let listing = self
            .git(&["stash", "list", "--format=%gd%x09%gs"])
            .map_err(|e| GitError::command("stash", "could not list stashes", e))?;

        // Subjects read "On <branch>: <message>".
        let suffix = format!(": {name}");
        Ok(listing.lines().find_map(|line| {
            let (selector, subject) = line.split_once('\t')?;
            (subject == name || subject.ends_with(&suffix)).then(|| selector.to_string())
        }))
    }

    fn reset_hard(&self, branch: &str, commit: &str) -> FlowResult<()> {
        self.switch_branch(branch)?;
        self.mutate(&["reset", "-q", "--hard", commit]).map_err(|e| {
            GitError::command(
                "reset",
                format!("could not reset branch '{branch}' to commit '{commit}'"),
                e,
            )
        })?;
        Ok(())
    }

    fn tag_head(&self, branch: &str, tag: &str) -> FlowResult<()> {
        self.switch_branch(branch)?;
        self.mutate(&["tag", tag]).map_err(|e| {
            GitError::command(
                "tag",
                format!("the tag '{tag}' could not be created and may already exist"),
                e,
            )
        })?;
        Ok(())
    }

    fn delete_tag(&self, tag: &str) -> FlowResult<()> {
        self.check_repo()?;
        self.mutate(&["tag", "-d", tag]).map_err(|e| {
            GitError::command("tag", format!("the tag '{tag}' could not be deleted"), e)
        })?;
        Ok(())
    }

    fn clean_untracked_and_ignored(&self) -> FlowResult<()> {
        self.check_repo()?;
        self.mutate(&["clean", "-q", "-fd"])
            .and_then(|()| self.mutate(&["clean", "-q", "-fX"]))
            .map_err(|e| GitError::command("clean", "could not clean ignored files", e))?;
        Ok(())
    }

    fn create_branch(&self, branch: &str) -> FlowResult<()> {
        self.check_repo()?;
        self.mutate(&["branch", branch]).map_err(|e| {
            GitError::command("branch", format!("could not create branch '{branch}'"), e)
        })?;
        Ok(())
    }

    fn archive(&self, treeish: &str, dest: &Path) -> FlowResult<()> {
        self.check_repo()?;
        let dest_str = dest.to_string_lossy();
        self.mutate(&["archive", "--format=tar", "-o", &dest_str, treeish])
            .map_err(|e| {
                GitError::command(
                    "archive",
                    format!("could not archive '{treeish}' to '{}'", dest.display()),
                    e,
                )
            })?;
        Ok(())
    }

    fn remove_all_tracked(&self) -> FlowResult<()> {
        self.check_repo()?;
        self.mutate(&["rm", "-q", "-rf", "--ignore-unmatch", "."])
            .map_err(|e| GitError::command("rm", "could not remove tracked files", e))?;
        Ok(())
    }
}

#[cfg(test)]
mod tests;
