// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Tag naming and selection.
//!
//! Tags follow `<tag_type>/<version>`, e.g. `release/1.2` or
//! `debian/1.2-0ppa1`.
//!
//! When several tags of one type sit on the same HEAD commit the one with
//! the *lowest* upstream version (part before the first `-`) wins; ties keep
//! git's listing order.

use regex::Regex;

use super::backend::GitBackend;
use crate::error::{FlowResult, GitError};
use crate::version::Version;

/// `<tag_type>/<version>`.
#[must_use]
pub fn format_tag(tag_type: &str, version: &str) -> String {
    format!("{tag_type}/{version}")
}

/// Extracts `<version>` from `<tag_type>/<version>`.
///
/// # Errors
///
/// Returns `GitError::InvalidTag` if the tag does not have that shape.
pub fn extract_tag_version(tag: &str, tag_type: &str) -> Result<String, GitError> {
    let invalid = || GitError::InvalidTag {
        tag: tag.to_string(),
        tag_type: tag_type.to_string(),
    };
    let pattern = Regex::new(&format!("^{}/(.+)$", regex::escape(tag_type))).map_err(|_| invalid())?;
    pattern
        .captures(tag)
        .and_then(|caps| caps.get(1))
        .map(|m| m.as_str().to_string())
        .ok_or_else(invalid)
}

/// Picks the tag to use among several HEAD tags of one type.
#[must_use]
pub fn select_head_tag<'a>(tags: &'a [String], tag_type: &str) -> Option<&'a String> {
    tags.iter()
        .filter_map(|tag| {
            let version = extract_tag_version(tag, tag_type).ok()?;
            Some((tag, Version::parse_upstream(&version)))
        })
        .min_by(|(_, a), (_, b)| a.cmp(b))
        .map(|(tag, _)| tag)
}

/// The `<tag_type>/*` tag on the HEAD of `branch`.
///
/// # Errors
///
/// Returns `GitError::NoHeadTag` if HEAD carries no such tag.
pub fn latest_matching_head_tag(
    git: &dyn GitBackend,
    branch: &str,
    tag_type: &str,
) -> FlowResult<String> {
    let tags = git.head_tags(branch, tag_type)?;
    select_head_tag(&tags, tag_type).cloned().ok_or_else(|| {
        GitError::NoHeadTag {
            branch: branch.to_string(),
            tag_type: tag_type.to_string(),
        }
        .into()
    })
}

/// Version of the `<tag_type>/*` tag on the HEAD of `branch`.
///
/// # Errors
///
/// Returns `GitError::NoHeadTag` if HEAD carries no such tag.
pub fn head_tag_version(git: &dyn GitBackend, branch: &str, tag_type: &str) -> FlowResult<String> {
    let tag = latest_matching_head_tag(git, branch, tag_type)?;
    Ok(extract_tag_version(&tag, tag_type)?)
}

/// Version of the nearest `<tag_type>/*` tag reachable from `branch`.
///
/// # Errors
///
/// Returns `GitError::NoTag` if the branch has no such tag.
pub fn latest_tag_version(
    git: &dyn GitBackend,
    branch: &str,
    tag_type: &str,
) -> FlowResult<String> {
    let tag = git.latest_tag(branch, tag_type)?;
    Ok(extract_tag_version(&tag, tag_type)?)
}
