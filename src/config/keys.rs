// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! The configuration key table.
//!
//! Every key the loader reads and the example writer emits is listed here,
//! in file order.

use std::fmt;

/// INI section of a key.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum Section {
    Git,
    Signing,
    Build,
    Package,
    Upload,
    System,
}

impl Section {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Git => "git",
            Self::Signing => "signing",
            Self::Build => "build",
            Self::Package => "package",
            Self::Upload => "upload",
            Self::System => "system",
        }
    }
}

impl fmt::Display for Section {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// One configuration key.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Key {
    pub section: Section,
    pub name: &'static str,
    /// Value used when the key is absent or empty.
    pub default: Option<&'static str>,
    /// Absent or empty is an error, regardless of `default`.
    pub required: bool,
}

impl Key {
    const fn new(
        section: Section,
        name: &'static str,
        default: Option<&'static str>,
        required: bool,
    ) -> Self {
        Self {
            section,
            name,
            default,
            required,
        }
    }

    /// `section.name`, the path used by the `config` crate.
    #[must_use]
    pub fn path(&self) -> String {
        format!("{}.{}", self.section, self.name)
    }
}

pub const RELEASE_BRANCH: &str = "release_branch";
pub const RELEASE_TAG_TYPE: &str = "release_tag_type";
pub const UPSTREAM_BRANCH: &str = "upstream_branch";
pub const UPSTREAM_TAG_TYPE: &str = "upstream_tag_type";
pub const DEBIAN_BRANCH: &str = "debian_branch";
pub const DEBIAN_TAG_TYPE: &str = "debian_tag_type";
pub const GPG_KEY_ID: &str = "gpg_key_id";
pub const BUILD_FLAGS: &str = "build_flags";
pub const TEST_BUILD_FLAGS: &str = "test_build_flags";
pub const BUILD_COMMAND: &str = "build_command";
pub const PACKAGE_NAME: &str = "package_name";
pub const DISTRIBUTION: &str = "distribution";
pub const URGENCY: &str = "urgency";
pub const DEBIAN_VERSION_SUFFIX: &str = "debian_version_suffix";
pub const EXCLUDE_FILES: &str = "exclude_files";
pub const PPA: &str = "ppa";
pub const EDITOR_COMMAND: &str = "editor_command";

/// Separator of list values such as `exclude_files`.
pub const LIST_SEPARATOR: char = ',';

pub const KEYS: &[Key] = &[
    Key::new(Section::Git, RELEASE_BRANCH, Some("master"), true),
    Key::new(Section::Git, RELEASE_TAG_TYPE, Some("release"), true),
    Key::new(Section::Git, UPSTREAM_BRANCH, Some("upstream"), true),
    Key::new(Section::Git, UPSTREAM_TAG_TYPE, Some("upstream"), true),
    Key::new(Section::Git, DEBIAN_BRANCH, Some("debian"), true),
    Key::new(Section::Git, DEBIAN_TAG_TYPE, Some("debian"), true),
    Key::new(Section::Signing, GPG_KEY_ID, None, false),
    Key::new(Section::Build, BUILD_FLAGS, None, false),
    Key::new(Section::Build, TEST_BUILD_FLAGS, None, false),
    Key::new(Section::Build, BUILD_COMMAND, Some("debuild"), true),
    Key::new(Section::Package, PACKAGE_NAME, None, false),
    Key::new(Section::Package, DISTRIBUTION, None, false),
    Key::new(Section::Package, URGENCY, Some("low"), false),
    Key::new(Section::Package, DEBIAN_VERSION_SUFFIX, Some("-0ppa1"), false),
    Key::new(
        Section::Package,
        EXCLUDE_FILES,
        Some("debflow.conf,README.md,LICENSE"),
        false,
    ),
    Key::new(Section::Upload, PPA, None, false),
    Key::new(Section::System, EDITOR_COMMAND, Some("editor"), true),
];

/// Looks a key up by name. Names are unique across sections.
#[must_use]
pub fn find(name: &str) -> Option<&'static Key> {
    KEYS.iter().find(|key| key.name == name)
}

/// Default value of the key called `name`.
#[must_use]
pub fn default_of(name: &str) -> Option<&'static str> {
    find(name).and_then(|key| key.default)
}
