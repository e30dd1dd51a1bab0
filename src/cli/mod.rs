// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command line interface (clap derive).
//!
//! ```text
//! debflow [options] [ACTION] [DIR]
//!
//! ACTION  test-pkg | commit-release | update-changelog | test-build
//!         commit-build | upload | clone | restore | config
//! DIR     repository (or, for clone, parent) directory; default "."
//! ```

pub mod global;


use std::path::PathBuf;

use clap::{CommandFactory, Parser, ValueEnum};

use crate::cli::global::GlobalOptions;
use crate::engine::action::Action;

/// Transactional release workflow for git-buildpackage repositories.
#[derive(Debug, Parser)]
#[command(
    name = "debflow",
    author,
    version,
    about = "Maintain debian packages with git and gbp",
    long_about = "debflow Copyright (C) 2026 Romeo Ahmed\n\
                  This program comes with ABSOLUTELY NO WARRANTY\n\
                  This is free software, and you are welcome to redistribute it\n\
                  under certain conditions; see LICENSE for details.\n\n\
                  Maintain debian packages with git and gbp.\n\n\
                  Every repository action first saves a backup of the whole\n\
                  repository and parks uncommitted changes in a temporary commit.\n\
                  If the action fails, the backup is restored (unless -n).",
    after_help = "CONFIGURATION:\n\n\
                  The configuration is read from debflow.conf on the master\n\
                  branch. Create an example with `debflow config`. Any key can be\n\
                  overridden with DEBFLOW_<SECTION>__<KEY>, for example\n\
                  DEBFLOW_PACKAGE__URGENCY=medium."
)]
pub struct Cli {
    #[command(flatten)]
    pub global: GlobalOptions,

    /// Action to run
    #[arg(value_enum)]
    pub action: Option<ActionArg>,

    /// Path to the git repository
    #[arg(value_name = "DIR")]
    pub dir: Option<PathBuf>,
}

/// Action names as accepted on the command line.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ActionArg {
    /// Build a release without keeping any change
    TestPkg,
    /// Import the release branch into upstream and merge into debian
    CommitRelease,
    /// Add a changelog entry for the upstream version
    UpdateChangelog,
    /// Build an unsigned test package
    TestBuild,
    /// Build a signed package and tag the debian commit
    CommitBuild,
    /// Upload the latest build to the configured PPA
    Upload,
    /// Clone a remote repository and create the packaging branches
    Clone,
    /// Restore the repository from a backup
    Restore,
    /// Write an example configuration file
    Config,
}

impl From<ActionArg> for Action {
    fn from(arg: ActionArg) -> Self {
        match arg {
            ActionArg::TestPkg => Self::TestPkg,
            ActionArg::CommitRelease => Self::CommitRelease,
            ActionArg::UpdateChangelog => Self::UpdateChangelog,
            ActionArg::TestBuild => Self::TestBuild,
            ActionArg::CommitBuild => Self::CommitBuild,
            ActionArg::Upload => Self::Upload,
            ActionArg::Clone => Self::Clone,
            ActionArg::Restore => Self::Restore,
            ActionArg::Config => Self::Config,
        }
    }
}

impl Cli {
    /// The selected action, if any.
    #[must_use]
    pub fn action(&self) -> Option<Action> {
        self.action.map(Action::from)
    }
}

/// Every long option name, hidden ones excluded, as `--name`.
#[must_use]
pub fn long_option_names() -> Vec<String> {
    Cli::command()
        .get_arguments()
        .filter(|arg| !arg.is_hide_set())
        .filter_map(|arg| arg.get_long())
        .map(|long| format!("--{long}"))
        .collect()
}

/// Parses command-line arguments.
#[must_use]
pub fn parse() -> Cli {
    Cli::parse()
}

/// Tries to parse command-line arguments, returning an error on failure.
///
/// # Errors
///
/// Returns a `clap::Error` if the arguments are invalid or help/version
/// information was requested.
pub fn try_parse_from<I, T>(iter: I) -> Result<Cli, clap::Error>
where
    I: IntoIterator<Item = T>,
    T: Into<std::ffi::OsString> + Clone,
{
    Cli::try_parse_from(iter)
}
