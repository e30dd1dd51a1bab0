// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Parking and restoring uncommitted work around an action.
//!
//! ```text
//! create_temp_commit()
//!   clean tree  --> RestorePoint { branch, head, stash: None }
//!   dirty tree  --> stash push "debflow<head>"
//!                   stash apply (keep)
//!                   commit "Temp '<branch>' commit."
//!               --> RestorePoint { branch, head, stash: Some(name) }
//!
//! restore_temp_commit(point)      consumes the point
//!   checkout point.branch
//!   stash set --> reset --hard head; stash apply + drop
//! ```

use tracing::info;

use crate::error::FlowResult;
use crate::git::backend::GitBackend;

/// Branch state recorded before an action runs.
#[derive(Debug, PartialEq, Eq)]
pub struct RestorePoint {
    branch: String,
    head_commit: String,
    stash_name: Option<String>,
}

impl RestorePoint {
    #[must_use]
    pub fn branch(&self) -> &str {
        &self.branch
    }

    #[must_use]
    pub fn head_commit(&self) -> &str {
        &self.head_commit
    }

    #[must_use]
    pub fn stash_name(&self) -> Option<&str> {
        self.stash_name.as_deref()
    }

    /// True when uncommitted changes were parked in a temp commit.
    #[must_use]
    pub const fn has_parked_changes(&self) -> bool {
        self.stash_name.is_some()
    }
}

/// Stash name used for the changes parked on `head_commit`.
#[must_use]
pub fn stash_name_for(head_commit: &str) -> String {
    format!("debflow{head_commit}")
}

/// Records the current branch and commits any uncommitted changes into a
/// temporary commit, keeping a stash of them for the restore.
///
/// # Errors
///
/// Returns a `GitError` if any git step fails. The repository may then hold
/// the stash and a partial temp state.
pub fn create_temp_commit(git: &dyn GitBackend) -> FlowResult<RestorePoint> {
    let branch = git.current_branch()?;
    let head_commit = git.head_commit(&branch)?;

    let stash_name = if git.is_working_tree_clean()? {
        None
    } else {
        let name = stash_name_for(&head_commit);
        info!(branch = %branch, stash = %name, "Parking uncommitted changes");
        git.stash(Some(&name))?;
        git.apply_stash(&branch, Some(&name), false)?;
        git.commit_all(&format!("Temp '{branch}' commit."))?;
        Some(name)
    };

    Ok(RestorePoint {
        branch,
        head_commit,
        stash_name,
    })
}

/// Returns to the recorded branch and brings the parked changes back.
///
/// # Errors
///
/// Returns `GitError::StashNotFound` if the parked stash is gone, or a
/// `GitError` if the checkout, reset or apply fails.
pub fn restore_temp_commit(git: &dyn GitBackend, point: RestorePoint) -> FlowResult<()> {
    let RestorePoint {
        branch,
        head_commit,
        stash_name,
    } = point;

    if git.current_branch()? != branch {
        git.switch_branch(&branch)?;
    }

    if let Some(name) = stash_name {
        info!(branch = %branch, stash = %name, "Restoring uncommitted changes");
        git.reset_hard(&branch, &head_commit)?;
        git.apply_stash(&branch, Some(&name), true)?;
    }
    Ok(())
}
