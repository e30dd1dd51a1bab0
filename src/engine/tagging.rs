// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! HEAD tag verification.

use tracing::info;

use crate::error::{FlowResult, GitError, OpError};
use crate::git::backend::GitBackend;
use crate::git::tags::{extract_tag_version, format_tag, latest_matching_head_tag};
use crate::ui::prompt::Prompter;

/// Tag found on, or placed on, a branch HEAD.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeadTag {
    pub version: String,
    pub tag: String,
    /// False when the tag already existed.
    pub created: bool,
}

/// Returns the `<tag_type>/*` tag on the HEAD of `branch`, tagging HEAD
/// with `proposed` (or a version asked from the operator) when there is
/// none.
///
/// # Errors
///
/// Returns an `OpError` if the operator declines to enter a version, or a
/// `GitError` if the tags cannot be read or written.
pub fn verify_or_create_head_tag(
    git: &dyn GitBackend,
    prompter: &dyn Prompter,
    branch: &str,
    tag_type: &str,
    proposed: Option<&str>,
) -> FlowResult<HeadTag> {
    match latest_matching_head_tag(git, branch, tag_type) {
        Ok(tag) => {
            let version = extract_tag_version(&tag, tag_type)?;
            info!(branch, tag = %tag, "HEAD is already tagged");
            return Ok(HeadTag {
                version,
                tag,
                created: false,
            });
        }
        Err(e) if matches!(e.as_git(), Some(GitError::NoHeadTag { .. })) => {}
        Err(e) => return Err(e),
    }

    let version = match proposed {
        Some(version) => version.to_string(),
        None => {
            info!(branch, "No {tag_type}/<version> tag on HEAD");
            prompter
                .input("Enter release version to tag", None, true)
                .map_err(OpError::caused_by)?
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
                .ok_or_else(|| {
                    OpError::msg(format!(
                        "Tagging of HEAD commit on branch '{branch}' aborted by user"
                    ))
                })?
        }
    };

    let tag = format_tag(tag_type, &version);
    info!(branch, tag = %tag, "Tagging HEAD");
    git.tag_head(branch, &tag)?;
    Ok(HeadTag {
        version,
        tag,
        created: true,
    })
}
