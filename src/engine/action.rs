// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Supported actions and their static descriptors.
//!
//! ```text
//! action            repo  clean  restore  critical
//! test-pkg           x     x      x       -
//! commit-release     x     x      -       release upstream debian
//! update-changelog   x     x      -       debian
//! test-build         x     x      -       -
//! commit-build       x     x      -       debian
//! upload             x     -      -       -
//! clone              -     -      -       -
//! restore            -     -      -       -
//! config             -     -      -       -
//! ```

use std::fmt;
use std::str::FromStr;

use crate::config::BranchRole;

/// Action identifiers, in help order.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    TestPkg,
    CommitRelease,
    UpdateChangelog,
    TestBuild,
    CommitBuild,
    Upload,
    Clone,
    Restore,
    Config,
}

impl Action {
    pub const ALL: [Self; 9] = [
        Self::TestPkg,
        Self::CommitRelease,
        Self::UpdateChangelog,
        Self::TestBuild,
        Self::CommitBuild,
        Self::Upload,
        Self::Clone,
        Self::Restore,
        Self::Config,
    ];

    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::TestPkg => "test-pkg",
            Self::CommitRelease => "commit-release",
            Self::UpdateChangelog => "update-changelog",
            Self::TestBuild => "test-build",
            Self::CommitBuild => "commit-build",
            Self::Upload => "upload",
            Self::Clone => "clone",
            Self::Restore => "restore",
            Self::Config => "config",
        }
    }

    #[must_use]
    pub const fn descriptor(self) -> &'static ActionDescriptor {
        match self {
            Self::TestPkg => &TEST_PKG,
            Self::CommitRelease => &COMMIT_RELEASE,
            Self::UpdateChangelog => &UPDATE_CHANGELOG,
            Self::TestBuild => &TEST_BUILD,
            Self::CommitBuild => &COMMIT_BUILD,
            Self::Upload => &UPLOAD,
            Self::Clone => &CLONE,
            Self::Restore => &RESTORE,
            Self::Config => &CONFIG,
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Action {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|action| action.as_str() == s)
            .ok_or_else(|| format!("unknown action '{s}'"))
    }
}

/// How the engine prepares for and cleans up after an action.
#[derive(Debug, PartialEq, Eq)]
pub struct ActionDescriptor {
    pub action: Action,
    /// Needs a backup, a temp commit and the configuration.
    pub repository_based: bool,
    /// Clean untracked and ignored files on the config branch first.
    pub clean: bool,
    /// Restore the pre-action backup even after success.
    pub restore_backup: bool,
    /// Uncommitted changes on these branches block the action.
    pub critical_branches: &'static [BranchRole],
}

impl ActionDescriptor {
    const fn local(action: Action) -> Self {
        Self {
            action,
            repository_based: false,
            clean: false,
            restore_backup: false,
            critical_branches: &[],
        }
    }

    const fn repository(action: Action, critical_branches: &'static [BranchRole]) -> Self {
        Self {
            action,
            repository_based: true,
            clean: true,
            restore_backup: false,
            critical_branches,
        }
    }
}

static TEST_PKG: ActionDescriptor = ActionDescriptor {
    restore_backup: true,
    ..ActionDescriptor::repository(Action::TestPkg, &[])
};
static COMMIT_RELEASE: ActionDescriptor = ActionDescriptor::repository(
    Action::CommitRelease,
    &[BranchRole::Release, BranchRole::Upstream, BranchRole::Debian],
);
static UPDATE_CHANGELOG: ActionDescriptor =
    ActionDescriptor::repository(Action::UpdateChangelog, &[BranchRole::Debian]);
static TEST_BUILD: ActionDescriptor = ActionDescriptor::repository(Action::TestBuild, &[]);
static COMMIT_BUILD: ActionDescriptor =
    ActionDescriptor::repository(Action::CommitBuild, &[BranchRole::Debian]);
static UPLOAD: ActionDescriptor = ActionDescriptor {
    clean: false,
    ..ActionDescriptor::repository(Action::Upload, &[])
};
static CLONE: ActionDescriptor = ActionDescriptor::local(Action::Clone);
static RESTORE: ActionDescriptor = ActionDescriptor::local(Action::Restore);
static CONFIG: ActionDescriptor = ActionDescriptor::local(Action::Config);
