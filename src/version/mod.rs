// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Version string utilities.
//!
//! ```text
//! "1.2.10-0ppa1"
//!    |
//!    v  maximal digit runs
//! [1, 2, 10, 0, 1]  --> Version (total order, element-wise, prefix first)
//!
//! next_version:      "1.2.9~rc1"   -> "1.2.10~rc1"
//! next_package_build "1.0-0ppa3"   -> "1.0-0ppa4"
//! ```
//!
//! Only the numeric runs take part in ordering; labels and separators are
//! ignored, so `1.0` and `v1-0` compare equal.

use std::cmp::Ordering;
use std::fmt;
use std::sync::LazyLock;

use regex::Regex;

use crate::error::VersionError;

static PPA_BUILD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*ppa)(\d+)(.*)$").expect("ppa build pattern is valid")
});

static UBUNTU_BUILD: LazyLock<Regex> = LazyLock::new(|| {
    Regex::new(r"(?i)^(.*ubuntu)(\d+)(.*)$").expect("ubuntu build pattern is valid")
});

/// One maximal digit run, stored without leading zeros.
///
/// Compared by length first, then lexically, which is numeric order
/// without any width limit.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
struct NumericRun(String);

impl NumericRun {
    fn new(digits: &str) -> Self {
        let trimmed = digits.trim_start_matches('0');
        Self(if trimmed.is_empty() { "0" } else { trimmed }.to_string())
    }
}

impl Ord for NumericRun {
    fn cmp(&self, other: &Self) -> Ordering {
        self.0
            .len()
            .cmp(&other.0.len())
            .then_with(|| self.0.cmp(&other.0))
    }
}

impl PartialOrd for NumericRun {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

/// The numeric-run view of a version string.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct Version {
    runs: Vec<NumericRun>,
}

impl Version {
    /// Extracts every maximal digit run from `s`.
    #[must_use]
    pub fn parse(s: &str) -> Self {
        let runs = s
            .split(|c: char| !c.is_ascii_digit())
            .filter(|run| !run.is_empty())
            .map(NumericRun::new)
            .collect();
        Self { runs }
    }

    /// Parses only the part before the first `-` (the upstream part of a
    /// packaging version).
    #[must_use]
    pub fn parse_upstream(s: &str) -> Self {
        Self::parse(s.split('-').next().unwrap_or(s))
    }

    /// Number of numeric runs.
    #[must_use]
    pub fn len(&self) -> usize {
        self.runs.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.runs.is_empty()
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let parts: Vec<&str> = self.runs.iter().map(|run| run.0.as_str()).collect();
        f.write_str(&parts.join("."))
    }
}

/// Compares two version strings by their numeric runs.
#[must_use]
pub fn compare_versions(a: &str, b: &str) -> Ordering {
    Version::parse(a).cmp(&Version::parse(b))
}

#[must_use]
pub fn is_less_than(a: &str, b: &str) -> bool {
    compare_versions(a, b) == Ordering::Less
}

#[must_use]
pub fn is_equal(a: &str, b: &str) -> bool {
    compare_versions(a, b) == Ordering::Equal
}

#[must_use]
pub fn is_greater_than(a: &str, b: &str) -> bool {
    compare_versions(a, b) == Ordering::Greater
}

/// Produces the next logical version by bumping the last dotted component of
/// the base part. A revision suffix after the first `~` or `-` is kept as is.
///
/// # Errors
///
/// Returns `VersionError::NotIncrementable` if the last component of the base
/// is not a plain number.
pub fn next_version(version: &str) -> Result<String, VersionError> {
    let (base, suffix) = version
        .find(['~', '-'])
        .map_or((version, ""), |idx| version.split_at(idx));

    let not_incrementable = || VersionError::NotIncrementable {
        version: version.to_string(),
    };

    let (head, last) = base.rsplit_once('.').unwrap_or(("", base));
    if last.is_empty() || !last.bytes().all(|b| b.is_ascii_digit()) {
        return Err(not_incrementable());
    }
    let next = last
        .parse::<u64>()
        .ok()
        .and_then(|n| n.checked_add(1))
        .ok_or_else(not_incrementable)?;

    if head.is_empty() && !base.contains('.') {
        Ok(format!("{next}{suffix}"))
    } else {
        Ok(format!("{head}.{next}{suffix}"))
    }
}

/// Bumps the build number following a `ppa` or `ubuntu` marker
/// (case-insensitive, last occurrence). Versions without a marker are
/// returned unchanged.
#[must_use]
pub fn next_package_build_version(version: &str) -> String {
    for pattern in [&*PPA_BUILD, &*UBUNTU_BUILD] {
        if let Some(caps) = pattern.captures(version) {
            let number = caps[2].parse::<u64>().ok().and_then(|n| n.checked_add(1));
            if let Some(number) = number {
                return format!("{}{}{}", &caps[1], number, &caps[3]);
            }
        }
    }
    version.to_string()
}
