// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use config::Environment;

use super::keys::{self, KEYS, Section};
use super::{BranchRole, Config, ConfigLoader, render_example, write_example};
use crate::error::ConfigError;
use crate::test_utils::temp_dir;

const MINIMAL: &str = "\
[git]
release_branch = master
release_tag_type = release
upstream_branch = upstream
upstream_tag_type = upstream
debian_branch = debian
debian_tag_type = debian

[build]
build_command = debuild

[system]
editor_command = editor
";

#[test]
fn test_defaults_fill_optional_keys() {
    let config = Config::parse(MINIMAL, "hello").expect("minimal config parses");

    assert_eq!(config.package.package_name, "hello");
    assert_eq!(config.package.urgency, "low");
    assert_eq!(config.package.debian_version_suffix, "-0ppa1");
    assert_eq!(
        config.package.exclude_files,
        vec!["debflow.conf", "README.md", "LICENSE"]
    );
    assert_eq!(config.signing.gpg_key_id, None);
    assert_eq!(config.upload.ppa, None);
    assert_eq!(config.build.build_flags, None);
}

#[test]
fn test_empty_optional_values_are_none() {
    let content = format!("{MINIMAL}\n[signing]\ngpg_key_id =\n\n[upload]\nppa =   \n");
    let config = Config::parse(&content, "hello").expect("config parses");

    assert_eq!(config.gpg_key(), None);
    assert_eq!(config.upload.ppa, None);
}

#[test]
fn test_exclude_files_split_on_commas() {
    let content = format!("{MINIMAL}\n[package]\nexclude_files = a.txt, docs/ ,,b\n");
    let config = Config::parse(&content, "hello").expect("config parses");

    assert_eq!(config.package.exclude_files, vec!["a.txt", "docs/", "b"]);
}

#[test]
fn test_missing_required_key() {
    let content = MINIMAL.replace("debian_branch = debian\n", "");
    let err = Config::parse(&content, "hello").expect_err("missing key");

    match err {
        ConfigError::MissingKey { section, key, .. } => {
            assert_eq!(section, "git");
            assert_eq!(key, "debian_branch");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_empty_required_key_is_missing() {
    let content = MINIMAL.replace("editor_command = editor", "editor_command =");
    let err = Config::parse(&content, "hello").expect_err("empty key");

    insta::assert_snapshot!(
        err.to_string(),
        @"the value for 'editor_command' in section [system] of '<string>' is missing but required"
    );
}

#[test]
fn test_load_missing_file() {
    let dir = temp_dir();
    let path = dir.path().join("debflow.conf");
    let err = Config::load(&path, "hello").expect_err("no file");

    assert!(matches!(err, ConfigError::NotFound { .. }));
}

#[test]
fn test_load_file_with_values() {
    let dir = temp_dir();
    let path = dir.path().join("debflow.conf");
    let content = format!(
        "{MINIMAL}\n[package]\npackage_name = foo\ndistribution = noble\n\n[upload]\nppa = me/stable\n"
    );
    std::fs::write(&path, content).expect("write config");

    let config = Config::load(&path, "ignored").expect("config loads");
    assert_eq!(config.package.package_name, "foo");
    assert_eq!(config.package.distribution.as_deref(), Some("noble"));
    assert_eq!(config.upload.ppa.as_deref(), Some("me/stable"));
    assert_eq!(config.branch(BranchRole::Release), "master");
    assert_eq!(config.branch(BranchRole::Upstream), "upstream");
    assert_eq!(config.branch(BranchRole::Debian), "debian");
}

#[test]
fn test_environment_overrides_file() {
    let env = config::Map::from([
        ("DEBFLOW_GIT__DEBIAN_BRANCH".to_string(), "deb".to_string()),
        ("DEBFLOW_UPLOAD__PPA".to_string(), "me/test".to_string()),
    ]);
    let config = ConfigLoader::new()
        .add_ini_str(MINIMAL)
        .with_environment(
            Environment::with_prefix("DEBFLOW")
                .prefix_separator("_")
                .separator("__")
                .source(Some(env)),
        )
        .with_package_default("hello")
        .build()
        .expect("config builds");

    assert_eq!(config.git.debian_branch, "deb");
    assert_eq!(config.upload.ppa.as_deref(), Some("me/test"));
}

#[test]
fn test_format_options_hides_key() {
    let content = format!("{MINIMAL}\n[signing]\ngpg_key_id = ABCDEF\n");
    let config = Config::parse(&content, "hello").expect("config parses");
    let options = config.format_options();

    assert!(options.iter().any(|line| line.ends_with("= [hidden]")));
    assert!(!options.iter().any(|line| line.contains("ABCDEF")));
    assert_eq!(options.len(), KEYS.len());
}

#[test]
fn test_key_table() {
    let git_keys = KEYS.iter().filter(|k| k.section == Section::Git).count();
    assert_eq!(git_keys, 6);
    assert_eq!(keys::default_of(keys::URGENCY), Some("low"));
    assert_eq!(keys::default_of(keys::PPA), None);
    assert!(keys::find(keys::EDITOR_COMMAND).is_some_and(|k| k.required));
    assert_eq!(
        keys::find(keys::DEBIAN_TAG_TYPE).map(keys::Key::path).as_deref(),
        Some("git.debian_tag_type")
    );
}

#[test]
fn test_render_example_round_trips() {
    let example = render_example(&[(keys::PACKAGE_NAME, "foo"), (keys::DEBIAN_BRANCH, "deb")]);

    assert!(example.starts_with("[git]\nrelease_branch = master\n"));
    assert!(example.contains("\ngpg_key_id =\n"));

    let config = Config::parse(&example, "unused").expect("example parses");
    assert_eq!(config.package.package_name, "foo");
    assert_eq!(config.git.debian_branch, "deb");
    assert_eq!(config.build.build_command, "debuild");
}

#[test]
fn test_write_example_refuses_overwrite() {
    let dir = temp_dir();
    let path = dir.path().join("debflow.conf");

    write_example(&path, &[], false).expect("first write");
    let err = write_example(&path, &[], false).expect_err("second write");
    assert!(matches!(err, ConfigError::Exists { .. }));
}

#[test]
fn test_write_example_safe_mode() {
    let dir = temp_dir();
    let path = dir.path().join("debflow.conf");

    write_example(&path, &[], true).expect("safe mode write");
    assert!(!path.exists());
}
