// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! PPA upload of the newest final build.

use std::cmp::Reverse;
use std::path::{Path, PathBuf};

use tracing::info;

use super::build::BuildKind;
use super::{build_area, find_files_with_suffix, run_tool};
use crate::config::Config;
use crate::config::keys::{self, Section};
use crate::core::process::builder::ProcessBuilder;
use crate::engine::ActionEnv;
use crate::error::{ConfigError, FlowResult, OpError};
use crate::version::Version;

/// Suffix of the source upload description.
pub const SOURCE_CHANGES_SUFFIX: &str = "source.changes";

/// Version field of a `<package>_<version>_source.changes` file name.
#[must_use]
pub fn changes_version(path: &Path) -> Option<&str> {
    path.file_name()?.to_str()?.split('_').nth(1)
}

/// The `*source.changes` file of the highest version among final builds
/// below `dir`.
#[must_use]
pub fn latest_final_changes(dir: &Path) -> Option<PathBuf> {
    let mut candidates: Vec<PathBuf> = find_files_with_suffix(dir, SOURCE_CHANGES_SUFFIX)
        .into_iter()
        .filter(|path| {
            path.parent()
                .and_then(Path::file_name)
                .is_some_and(|name| name == BuildKind::Final.dir_name())
        })
        .collect();
    candidates.sort_by_key(|path| Reverse(Version::parse(changes_version(path).unwrap_or_default())));
    candidates.into_iter().next()
}

/// Uploads the newest final build to the configured PPA after asking the
/// operator.
///
/// # Errors
///
/// Returns a `ConfigError` if no PPA is configured, or an `OpError` if no
/// build is found, the operator declines, or `dput` fails.
pub fn upload(env: &ActionEnv<'_>, config: &Config) -> FlowResult<()> {
    info!("Uploading package");
    let ppa = config.upload.ppa.as_deref().ok_or_else(|| ConfigError::InvalidValue {
        section: Section::Upload.to_string(),
        key: keys::PPA.to_string(),
        message: "not set, aborting upload".to_string(),
    })?;

    let dir = build_area(env.ctx.workdir()).join(&config.package.package_name);
    let changes = latest_final_changes(&dir).ok_or_else(|| {
        OpError::msg(format!(
            "No final *{SOURCE_CHANGES_SUFFIX} file found in '{}', aborting upload",
            dir.display()
        ))
    })?;
    let version = changes_version(&changes).unwrap_or_default();

    let confirmed = env
        .prompter
        .confirm(&format!("Upload the latest build (version '{version}')?"), None)
        .map_err(OpError::caused_by)?;
    if !confirmed {
        return Err(OpError::msg("Upload aborted by user").into());
    }

    info!(ppa, file = %changes.display(), "Uploading");
    run_tool(
        env.ctx,
        ProcessBuilder::new("dput")
            .arg(format!("ppa:{ppa}"))
            .arg(&changes),
    )
    .map_err(|e| OpError::with_context(format!("The package could not be uploaded to ppa:{ppa}"), e))?;
    Ok(())
}
