// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Repository configuration.
//!
//! # Sources
//!
//! ```text
//! Priority (low → high)
//! 1. key defaults (keys::KEYS)
//! 2. debflow.conf on the config branch (or --config)
//! 3. DEBFLOW_<SECTION>__<KEY> env vars
//! ```
//!
//! # Environment Variable Mapping
//!
//! ```text
//! DEBFLOW_GIT__DEBIAN_BRANCH=deb   → git.debian_branch = "deb"
//! DEBFLOW_UPLOAD__PPA=me/stable    → upload.ppa = "me/stable"
//! ```
//!
//! # File Layout
//!
//! ```ini
//! [git]
//! release_branch = master
//! release_tag_type = release
//!
//! [package]
//! exclude_files = debflow.conf,README.md,LICENSE
//! ```
//!
//! Required keys must be present and non-empty in the file or environment;
//! their defaults only seed example files.

pub mod keys;
pub mod loader;

#[cfg(test)]
mod tests;

use std::collections::BTreeMap;
use std::fmt::Write as _;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Deserializer};
use tracing::info;

use crate::error::ConfigError;

use keys::{KEYS, LIST_SEPARATOR, Section};
use loader::ConfigLoader;

/// Environment variable prefix for overrides.
pub const ENV_PREFIX: &str = "DEBFLOW";

/// Branch on which the configuration file lives.
pub const CONFIG_BRANCH: &str = "master";

/// The three packaging branches, resolved to names through [`GitConfig`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BranchRole {
    Release,
    Upstream,
    Debian,
}

/// Complete repository configuration.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Config {
    pub git: GitConfig,
    #[serde(default)]
    pub signing: SigningConfig,
    pub build: BuildConfig,
    pub package: PackageConfig,
    #[serde(default)]
    pub upload: UploadConfig,
    pub system: SystemConfig,
}

/// Branch names and tag prefixes.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct GitConfig {
    pub release_branch: String,
    pub release_tag_type: String,
    pub upstream_branch: String,
    pub upstream_tag_type: String,
    pub debian_branch: String,
    pub debian_tag_type: String,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct SigningConfig {
    /// Key for signed tags and packages; unset means unsigned.
    pub gpg_key_id: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct BuildConfig {
    /// Extra flags for final builds.
    pub build_flags: Option<String>,
    /// Extra flags for test builds.
    pub test_build_flags: Option<String>,
    /// Builder handed to `gbp buildpackage --git-builder`.
    pub build_command: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct PackageConfig {
    pub package_name: String,
    pub distribution: Option<String>,
    pub urgency: String,
    /// Appended to the upstream version for changelog entries, e.g. `-0ppa1`.
    pub debian_version_suffix: String,
    /// Files left out of the upstream tarball.
    #[serde(default, deserialize_with = "split_list")]
    pub exclude_files: Vec<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct UploadConfig {
    /// `dput` target without the `ppa:` prefix.
    pub ppa: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct SystemConfig {
    pub editor_command: String,
}

fn split_list<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<String>, D::Error> {
    let raw = String::deserialize(deserializer)?;
    Ok(raw
        .split(LIST_SEPARATOR)
        .map(str::trim)
        .filter(|item| !item.is_empty())
        .map(str::to_string)
        .collect())
}

impl Config {
    /// Create a new configuration loader.
    #[must_use]
    pub fn builder() -> ConfigLoader {
        ConfigLoader::new()
    }

    /// Loads `path` with `DEBFLOW_*` overrides. `package_default` is used
    /// when the file leaves `package_name` empty.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::NotFound`, `ConfigError::Parse` or
    /// `ConfigError::MissingKey`.
    pub fn load(path: &Path, package_default: &str) -> Result<Self, ConfigError> {
        Self::builder()
            .add_ini_file(path)
            .with_env_prefix(ENV_PREFIX)
            .with_package_default(package_default)
            .build()
    }

    /// Load configuration from an INI string (no environment overrides).
    ///
    /// # Errors
    ///
    /// Same as [`Config::load`], without `NotFound`.
    pub fn parse(content: &str, package_default: &str) -> Result<Self, ConfigError> {
        Self::builder()
            .add_ini_str(content)
            .with_package_default(package_default)
            .build()
    }

    /// Branch name configured for `role`.
    #[must_use]
    pub fn branch(&self, role: BranchRole) -> &str {
        match role {
            BranchRole::Release => &self.git.release_branch,
            BranchRole::Upstream => &self.git.upstream_branch,
            BranchRole::Debian => &self.git.debian_branch,
        }
    }

    /// Configured GPG key, if any.
    #[must_use]
    pub fn gpg_key(&self) -> Option<&str> {
        self.signing.gpg_key_id.as_deref()
    }

    /// Format configuration options for display.
    ///
    /// The signing key is shown as `[hidden]`.
    #[must_use]
    pub fn format_options(&self) -> Vec<String> {
        let mut options = BTreeMap::new();
        let mut put = |section: Section, key: &str, value: Option<&str>| {
            options.insert(
                format!("{section}.{key}"),
                value.unwrap_or_default().to_string(),
            );
        };

        put(Section::Git, keys::RELEASE_BRANCH, Some(&self.git.release_branch));
        put(Section::Git, keys::RELEASE_TAG_TYPE, Some(&self.git.release_tag_type));
        put(Section::Git, keys::UPSTREAM_BRANCH, Some(&self.git.upstream_branch));
        put(Section::Git, keys::UPSTREAM_TAG_TYPE, Some(&self.git.upstream_tag_type));
        put(Section::Git, keys::DEBIAN_BRANCH, Some(&self.git.debian_branch));
        put(Section::Git, keys::DEBIAN_TAG_TYPE, Some(&self.git.debian_tag_type));
        put(
            Section::Signing,
            keys::GPG_KEY_ID,
            self.signing.gpg_key_id.as_ref().map(|_| "[hidden]"),
        );
        put(Section::Build, keys::BUILD_FLAGS, self.build.build_flags.as_deref());
        put(Section::Build, keys::TEST_BUILD_FLAGS, self.build.test_build_flags.as_deref());
        put(Section::Build, keys::BUILD_COMMAND, Some(&self.build.build_command));
        put(Section::Package, keys::PACKAGE_NAME, Some(&self.package.package_name));
        put(Section::Package, keys::DISTRIBUTION, self.package.distribution.as_deref());
        put(Section::Package, keys::URGENCY, Some(&self.package.urgency));
        put(
            Section::Package,
            keys::DEBIAN_VERSION_SUFFIX,
            Some(&self.package.debian_version_suffix),
        );
        let excludes = self.package.exclude_files.join(",");
        put(Section::Package, keys::EXCLUDE_FILES, Some(&excludes));
        put(Section::Upload, keys::PPA, self.upload.ppa.as_deref());
        put(Section::System, keys::EDITOR_COMMAND, Some(&self.system.editor_command));

        let max_key_len = options.keys().map(String::len).max().unwrap_or(0);
        options
            .into_iter()
            .map(|(key, value)| format!("{key:<max_key_len$} = {value}"))
            .collect()
    }
}

/// Renders an example file: every key with its preset, else its default.
#[must_use]
pub fn render_example(presets: &[(&str, &str)]) -> String {
    let mut out = String::new();
    let mut section = None;
    for key in KEYS {
        if section != Some(key.section) {
            if section.is_some() {
                out.push('\n');
            }
            let _ = writeln!(out, "[{}]", key.section);
            section = Some(key.section);
        }
        let value = presets
            .iter()
            .find(|(name, _)| *name == key.name)
            .map(|(_, value)| *value)
            .or(key.default)
            .unwrap_or_default();
        if value.is_empty() {
            let _ = writeln!(out, "{} =", key.name);
        } else {
            let _ = writeln!(out, "{} = {value}", key.name);
        }
    }
    out
}

/// Writes an example configuration to `path`.
///
/// # Errors
///
/// Returns `ConfigError::Exists` if `path` exists, or `ConfigError::Write`
/// if it cannot be written.
pub fn write_example(path: &Path, presets: &[(&str, &str)], safe_mode: bool) -> Result<(), ConfigError> {
    if path.exists() {
        return Err(ConfigError::Exists {
            path: path.display().to_string(),
        });
    }
    info!(path = %path.display(), "Writing example config file");
    if safe_mode {
        return Ok(());
    }
    fs::write(path, render_example(presets)).map_err(|source| ConfigError::Write {
        path: path.display().to_string(),
        source,
    })
}
