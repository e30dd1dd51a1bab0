// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Transactional action execution.
//!
//! # Stages
//!
//! ```text
//! Init
//!  |  repository based only:
//!  +--> BackupSaved      create_backup(action)          fail: abort
//!  +--> StateParked      create_temp_commit()           fail: abort, keep backup
//!  +--> ConfigLoaded     checkout master, clean, load   fail: Failed
//!  +--> ConflictChecked  parked changes on a critical
//!  |                     branch: restore temp state, refuse
//!  v
//! Running  body.run(action)
//!  |
//!  +--> Succeeded --> restore_backup?  backup restore (Restored)
//!  |                  otherwise        restore_temp_commit (Restored)
//!  +--> Failed    --> no-restore?      tell the operator
//!                     otherwise        backup restore (RolledBack)
//!  v
//! Done --> RunReport { action, outcome, rollback }
//! ```
//!
//! Action bodies plug in through [`ActionBody`], so the engine can run
//! against stubs in tests.

pub mod action;
pub mod tagging;
pub mod temp_commit;


use std::fmt;

use tracing::{debug, error, info, warn};

use crate::config::{CONFIG_BRANCH, Config};
use crate::core::context::Context;
use crate::error::{FlowError, FlowResult, OpError, log_chain};
use crate::git::backend::GitBackend;
use crate::snapshot::{BackupStore, Selector};
use crate::ui::prompt::Prompter;

use action::{Action, ActionDescriptor};
use temp_commit::{RestorePoint, create_temp_commit, restore_temp_commit};

/// Engine stage, logged on every transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Stage {
    Init,
    BackupSaved,
    StateParked,
    ConfigLoaded,
    ConflictChecked,
    Running,
    Succeeded,
    Failed,
    Restored,
    RolledBack,
    Done,
}

impl fmt::Display for Stage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::Init => "init",
            Self::BackupSaved => "backup-saved",
            Self::StateParked => "state-parked",
            Self::ConfigLoaded => "config-loaded",
            Self::ConflictChecked => "conflict-checked",
            Self::Running => "running",
            Self::Succeeded => "succeeded",
            Self::Failed => "failed",
            Self::Restored => "restored",
            Self::RolledBack => "rolled-back",
            Self::Done => "done",
        };
        f.write_str(name)
    }
}

/// What happened to the action itself.
#[derive(Debug)]
pub enum Outcome {
    Succeeded,
    /// Nothing ran: the backup or the temp commit could not be made.
    Aborted(FlowError),
    /// Uncommitted changes sat on a critical branch; nothing ran.
    Conflict { branch: String },
    /// The action (or the configuration it needs) failed.
    Failed(FlowError),
}

/// What the engine did to the repository afterwards.
#[derive(Debug)]
pub enum Rollback {
    /// Nothing to undo.
    NotNeeded,
    TempStateRestored,
    TempStateRestoreFailed(FlowError),
    BackupRestored(String),
    BackupRestoreFailed(FlowError),
    /// Rollback disabled by `--norestore`.
    Skipped,
    /// The repository may be half-parked; the backup must be restored by hand.
    Manual { backup: String },
}

impl Rollback {
    /// True for the variants that leave the repository in a known state.
    #[must_use]
    pub const fn is_clean(&self) -> bool {
        matches!(
            self,
            Self::NotNeeded | Self::TempStateRestored | Self::BackupRestored(_)
        )
    }
}

/// Result of one engine run.
#[derive(Debug)]
pub struct RunReport {
    pub action: Action,
    pub outcome: Outcome,
    pub rollback: Rollback,
    /// Every stage entered, in order.
    pub stages: Vec<Stage>,
}

impl RunReport {
    #[must_use]
    pub const fn is_success(&self) -> bool {
        matches!(self.outcome, Outcome::Succeeded) && self.rollback.is_clean()
    }

    /// Process exit code for this run.
    #[must_use]
    pub const fn exit_code(&self) -> u8 {
        if self.is_success() { 0 } else { 1 }
    }

    /// The action's error, if it had one.
    #[must_use]
    pub const fn error(&self) -> Option<&FlowError> {
        match &self.outcome {
            Outcome::Aborted(e) | Outcome::Failed(e) => Some(e),
            Outcome::Succeeded | Outcome::Conflict { .. } => None,
        }
    }
}

/// Everything an action body may use.
pub struct ActionEnv<'a> {
    pub ctx: &'a Context,
    pub git: &'a dyn GitBackend,
    pub backups: &'a BackupStore,
    pub prompter: &'a dyn Prompter,
    config: Option<&'a Config>,
}

impl<'a> ActionEnv<'a> {
    pub fn new(
        ctx: &'a Context,
        git: &'a dyn GitBackend,
        backups: &'a BackupStore,
        prompter: &'a dyn Prompter,
        config: Option<&'a Config>,
    ) -> Self {
        Self {
            ctx,
            git,
            backups,
            prompter,
            config,
        }
    }

    /// Configuration loaded for a repository-based action.
    ///
    /// # Errors
    ///
    /// Returns an `OpError` for actions that run without configuration.
    pub fn config(&self) -> FlowResult<&Config> {
        self.config
            .ok_or_else(|| OpError::msg("the configuration is not loaded for this action").into())
    }
}

/// The work of an action, run by the engine between preparation and
/// cleanup.
pub trait ActionBody {
    /// # Errors
    ///
    /// Any error fails the action and triggers the rollback.
    fn run(&self, action: Action, env: &ActionEnv<'_>) -> FlowResult<()>;
}

struct StageLog {
    action: Action,
    stages: Vec<Stage>,
}

impl StageLog {
    fn new(action: Action) -> Self {
        let mut log = Self {
            action,
            stages: Vec::new(),
        };
        log.enter(Stage::Init);
        log
    }

    fn enter(&mut self, stage: Stage) {
        debug!(action = %self.action, stage = %stage, "stage");
        self.stages.push(stage);
    }

    fn finish(mut self, outcome: Outcome, rollback: Rollback) -> RunReport {
        self.enter(Stage::Done);
        RunReport {
            action: self.action,
            outcome,
            rollback,
            stages: self.stages,
        }
    }
}

/// Runs actions with backup, temp-commit and rollback handling.
pub struct Engine<'a> {
    ctx: &'a Context,
    git: &'a dyn GitBackend,
    backups: &'a BackupStore,
    prompter: &'a dyn Prompter,
    body: &'a dyn ActionBody,
}

impl<'a> Engine<'a> {
    pub fn new(
        ctx: &'a Context,
        git: &'a dyn GitBackend,
        backups: &'a BackupStore,
        prompter: &'a dyn Prompter,
        body: &'a dyn ActionBody,
    ) -> Self {
        Self {
            ctx,
            git,
            backups,
            prompter,
            body,
        }
    }

    /// Runs `action` to completion. Never fails; the report says what
    /// happened.
    #[must_use]
    pub fn run(&self, action: Action) -> RunReport {
        info!(action = %action, "Executing action");
        if self.ctx.safe_mode() {
            info!("Safe mode enabled, not changing any files");
        }

        let descriptor = action.descriptor();
        let mut log = StageLog::new(action);

        if !descriptor.repository_based {
            return self.run_local(log);
        }

        info!("Saving backup of repository");
        let backup = match self.backups.create_backup(action.as_str()) {
            Ok(name) => name,
            Err(e) => {
                log_chain(&e);
                return log.finish(Outcome::Aborted(e), Rollback::NotNeeded);
            }
        };
        log.enter(Stage::BackupSaved);

        info!("Saving initial state to restore after execution");
        let point = match create_temp_commit(self.git) {
            Ok(point) => point,
            Err(e) => {
                log_chain(&e);
                warn!(
                    backup = %backup,
                    dir = %self.backups.dir().display(),
                    "No action was run; see 'debflow restore' to recover the repository from the backup"
                );
                return log.finish(Outcome::Aborted(e), Rollback::Manual { backup });
            }
        };
        log.enter(Stage::StateParked);

        let config = match self.load_config(descriptor) {
            Ok(config) => config,
            Err(e) => return self.fail(log, e, &backup),
        };
        log.enter(Stage::ConfigLoaded);

        if let Some(branch) = Self::conflicting_branch(descriptor, &config, &point) {
            error!(
                "Please commit all changes on branch '{branch}' before running action '{action}'"
            );
            let rollback = self.restore_temp_state(point, &backup, &mut log);
            return log.finish(Outcome::Conflict { branch }, rollback);
        }
        log.enter(Stage::ConflictChecked);

        log.enter(Stage::Running);
        let env = self.env(Some(&config));
        if let Err(e) = self.body.run(action, &env) {
            return self.fail(log, e, &backup);
        }
        log.enter(Stage::Succeeded);
        info!(action = %action, "Action completed");

        let rollback = if descriptor.restore_backup {
            self.restore_after_success(&backup, &mut log)
        } else {
            self.restore_temp_state(point, &backup, &mut log)
        };
        log.finish(Outcome::Succeeded, rollback)
    }

    fn env<'e>(&'e self, config: Option<&'e Config>) -> ActionEnv<'e> {
        ActionEnv::new(self.ctx, self.git, self.backups, self.prompter, config)
    }

    fn run_local(&self, mut log: StageLog) -> RunReport {
        log.enter(Stage::Running);
        match self.body.run(log.action, &self.env(None)) {
            Ok(()) => {
                log.enter(Stage::Succeeded);
                info!(action = %log.action, "Action completed");
                log.finish(Outcome::Succeeded, Rollback::NotNeeded)
            }
            Err(e) => {
                let e = into_op(e);
                log_chain(&e);
                log.enter(Stage::Failed);
                info!("No restore action needed");
                log.finish(Outcome::Failed(e), Rollback::NotNeeded)
            }
        }
    }

    fn load_config(&self, descriptor: &ActionDescriptor) -> FlowResult<Config> {
        info!("Reading config file");
        self.git.switch_branch(CONFIG_BRANCH)?;

        if descriptor.clean {
            debug!("Cleaning ignored files from working directory");
            // A branch without .gitignore or anything to clean is fine.
            if let Err(e) = self.git.clean_untracked_and_ignored() {
                debug!(error = %e, "clean skipped");
            }
        }

        let config = Config::load(&self.ctx.config_path(), &self.ctx.dir_name())?;
        for line in config.format_options() {
            debug!("{line}");
        }
        Ok(config)
    }

    fn conflicting_branch(
        descriptor: &ActionDescriptor,
        config: &Config,
        point: &RestorePoint,
    ) -> Option<String> {
        if !point.has_parked_changes() {
            return None;
        }
        descriptor
            .critical_branches
            .iter()
            .any(|role| config.branch(*role) == point.branch())
            .then(|| point.branch().to_string())
    }

    fn restore_temp_state(&self, point: RestorePoint, backup: &str, log: &mut StageLog) -> Rollback {
        info!(branch = %point.branch(), "Restoring initial branch state");
        match restore_temp_commit(self.git, point) {
            Ok(()) => {
                log.enter(Stage::Restored);
                Rollback::TempStateRestored
            }
            Err(e) => {
                log_chain(&e);
                error!(
                    backup = %backup,
                    "Could not restore the initial branch state, see 'debflow restore' to recover the repository"
                );
                Rollback::TempStateRestoreFailed(e)
            }
        }
    }

    fn restore_after_success(&self, backup: &str, log: &mut StageLog) -> Rollback {
        info!("Restoring repository to its state before the action");
        match self.backups.restore_backup(Selector::Name(backup)) {
            Ok(name) => {
                log.enter(Stage::Restored);
                Rollback::BackupRestored(name)
            }
            Err(e) => {
                log_chain(&e);
                error!("Restore failed, see 'debflow restore' to restore the repository to its previous state");
                Rollback::BackupRestoreFailed(e)
            }
        }
    }

    fn fail(&self, mut log: StageLog, err: FlowError, backup: &str) -> RunReport {
        let err = into_op(err);
        log_chain(&err);
        log.enter(Stage::Failed);

        if self.ctx.no_restore() {
            warn!("Restore skipped, see 'debflow restore' to restore the repository to its previous state");
            return log.finish(Outcome::Failed(err), Rollback::Skipped);
        }

        info!(backup = %backup, "Rolling back to the backup");
        let rollback = match self.backups.restore_backup(Selector::Name(backup)) {
            Ok(name) => {
                info!(backup = %name, "Repository restored");
                log.enter(Stage::RolledBack);
                Rollback::BackupRestored(name)
            }
            Err(e) => {
                log_chain(&e);
                error!(
                    dir = %self.backups.dir().display(),
                    "Restore failed as well, recover the repository manually from the backup directory"
                );
                Rollback::BackupRestoreFailed(e)
            }
        };
        log.finish(Outcome::Failed(err), rollback)
    }
}

/// Failures leave the engine as `OpError`s.
fn into_op(err: FlowError) -> FlowError {
    match err {
        FlowError::Op(_) => err,
        other => OpError::caused_by(other).into(),
    }
}
