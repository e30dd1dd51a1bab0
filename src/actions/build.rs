// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Package builds with `gbp buildpackage` and a lintian pass.
//!
//! ```text
//! upstream HEAD version ⊂ dpkg-parsechangelog Version
//!   clean ../build-area/<pkg>/<changelog version>/<test|final>
//!   gbp buildpackage --git-export-dir=<that dir> --git-builder=<cmd>
//!   lintian <first .changes>     (findings are warnings)
//! ```

use std::fmt;
use std::path::{Path, PathBuf};

use bon::Builder;
use tracing::{info, warn};

use super::{build_area, clean_dir, find_files_with_suffix, run_tool};
use crate::config::Config;
use crate::core::process::builder::{ProcessBuilder, ProcessFlags};
use crate::engine::ActionEnv;
use crate::error::{FlowResult, OpError};
use crate::git::tags::head_tag_version;

/// Suffix of the files lintian and dput work on.
pub const CHANGES_EXTENSION: &str = ".changes";

/// Where in the build area a build lands.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BuildKind {
    #[default]
    Test,
    Final,
}

impl BuildKind {
    #[must_use]
    pub const fn dir_name(self) -> &'static str {
        match self {
            Self::Test => "test",
            Self::Final => "final",
        }
    }
}

impl fmt::Display for BuildKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// How a package is built.
#[derive(Debug, Clone, Default, PartialEq, Eq, Builder)]
pub struct BuildOptions {
    #[builder(setters(name = with_kind), default)]
    kind: BuildKind,
    /// Extra flags appended to the builder command.
    #[builder(setters(name = with_flags))]
    flags: Option<String>,
    /// Tag the debian commit after the build.
    #[builder(setters(name = with_tag), default = false)]
    tag: bool,
    #[builder(setters(name = with_sign_tag), default = false)]
    sign_tag: bool,
    #[builder(setters(name = with_sign_changes), default = false)]
    sign_changes: bool,
    #[builder(setters(name = with_sign_source), default = false)]
    sign_source: bool,
}

impl BuildOptions {
    /// Unsigned, untagged build into the `test` directory.
    #[must_use]
    pub const fn test(flags: Option<String>) -> Self {
        Self {
            kind: BuildKind::Test,
            flags,
            tag: false,
            sign_tag: false,
            sign_changes: false,
            sign_source: false,
        }
    }

    /// Tagged and signed build into the `final` directory.
    #[must_use]
    pub const fn release(flags: Option<String>) -> Self {
        Self {
            kind: BuildKind::Final,
            flags,
            tag: true,
            sign_tag: true,
            sign_changes: true,
            sign_source: true,
        }
    }

    #[must_use]
    pub const fn kind(&self) -> BuildKind {
        self.kind
    }

    #[must_use]
    pub fn flags(&self) -> Option<&str> {
        self.flags.as_deref()
    }

    /// `--git-tag` and tag signing options for `gbp buildpackage`.
    #[must_use]
    pub fn tag_options(&self, gpg_key: Option<&str>) -> Vec<String> {
        let mut options = Vec::new();
        if self.tag {
            options.push("--git-tag".to_string());
        }
        if self.sign_tag {
            match gpg_key {
                Some(key) => {
                    options.push("--git-sign-tags".to_string());
                    options.push(format!("--git-keyid={key}"));
                }
                None => warn!("The gpg key id is not set in the configuration file, disabling tag signing"),
            }
        }
        options
    }

    /// Signing options for the builder command (`-uc`, `-us`, `-k<key>`).
    #[must_use]
    pub fn sign_options(&self, gpg_key: Option<&str>) -> Vec<String> {
        let mut options = Vec::new();
        if !self.sign_changes {
            options.push("-uc".to_string());
        }
        if !self.sign_source {
            options.push("-us".to_string());
        }
        if self.sign_changes || self.sign_source {
            match gpg_key {
                Some(key) => options.push(format!("-k{key}")),
                None => warn!("The gpg key id is not set in the configuration file, disabling build signing"),
            }
        }
        options
    }

    /// Value of `--git-builder`.
    #[must_use]
    pub fn builder_command(&self, build_command: &str, gpg_key: Option<&str>) -> String {
        let mut parts = vec![build_command.to_string(), "--no-lintian".to_string()];
        parts.extend(self.sign_options(gpg_key));
        if let Some(flags) = self.flags.as_deref().map(str::trim).filter(|f| !f.is_empty()) {
            parts.push(flags.to_string());
        }
        parts.join(" ")
    }
}

/// `<build area>/<package>/<version>/<kind>`
#[must_use]
pub fn build_dir(workdir: &Path, package: &str, version: &str, kind: BuildKind) -> PathBuf {
    build_area(workdir)
        .join(package)
        .join(version)
        .join(kind.dir_name())
}

/// Builds the package from the debian branch HEAD.
///
/// # Errors
///
/// Returns an `OpError` if the upstream HEAD is not tagged or the
/// changelog does not match the upstream version, or any error from git
/// or `gbp`. Lintian problems never fail the build.
pub fn build(env: &ActionEnv<'_>, config: &Config, options: &BuildOptions) -> FlowResult<()> {
    info!(kind = %options.kind, "Building package");
    let upstream = head_tag_version(env.git, &config.git.upstream_branch, &config.git.upstream_tag_type)
        .map_err(|e| OpError::with_context("could not determine the upstream version", e))?;
    info!(version = %upstream, "Building debian package for upstream version");

    env.git.switch_branch(&config.git.debian_branch)?;
    let version = changelog_version(env.ctx.workdir())?;
    if !version.contains(&upstream) {
        return Err(OpError::msg(format!(
            "Changelog version '{version}' does not match upstream version '{upstream}', \
             run 'debflow update-changelog' first"
        ))
        .into());
    }

    let dir = build_dir(
        env.ctx.workdir(),
        &config.package.package_name,
        &version,
        options.kind,
    );
    clean_dir(env.ctx, &dir)?;

    let gpg_key = config.gpg_key();
    let buildpackage = ProcessBuilder::new("gbp")
        .arg("buildpackage")
        .args(options.tag_options(gpg_key))
        .args([
            format!("--git-debian-tag={}/%(version)s", config.git.debian_tag_type),
            format!("--git-debian-branch={}", config.git.debian_branch),
            format!("--git-upstream-branch={}", config.git.upstream_branch),
            format!("--git-export-dir={}", dir.display()),
            format!(
                "--git-builder={}",
                options.builder_command(&config.build.build_command, gpg_key)
            ),
        ])
        .cwd(env.ctx.workdir());
    if run_tool(env.ctx, buildpackage)?.is_none() {
        return Ok(());
    }

    run_lintian(&dir);
    Ok(())
}

fn changelog_version(workdir: &Path) -> FlowResult<String> {
    let output = ProcessBuilder::new("dpkg-parsechangelog")
        .args(["--show-field", "Version"])
        .cwd(workdir)
        .run()
        .map_err(|e| OpError::with_context("could not read the changelog version", e))?;
    Ok(output.stdout().trim().to_string())
}

fn run_lintian(dir: &Path) {
    if !ProcessBuilder::exists("lintian") {
        warn!("lintian is not installed, skipping package checks");
        return;
    }
    let Some(changes) = find_files_with_suffix(dir, CHANGES_EXTENSION).into_iter().next() else {
        warn!(dir = %dir.display(), "No .changes file found, skipping lintian");
        return;
    };

    info!("Running lintian");
    let result = ProcessBuilder::new("lintian")
        .args(["-Iv", "--color", "auto"])
        .arg(&changes)
        .flag(ProcessFlags::ALLOW_FAILURE | ProcessFlags::NO_FATAL_SCAN)
        .run();
    match result {
        Ok(output) => {
            for line in output.stdout().lines().filter(|l| !l.trim().is_empty()) {
                info!("{line}");
            }
            if output.success() {
                info!("Lintian done");
            } else if output.stderr().trim().is_empty() {
                warn!("Lintian finished with errors");
            } else {
                warn!(stderr = %output.stderr().trim(), "Lintian failed");
            }
        }
        Err(e) => warn!(error = %e, "Could not run lintian"),
    }
}
