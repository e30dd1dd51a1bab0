// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;
use std::io::Cursor;
use std::path::{Path, PathBuf};

use super::build::{BuildKind, BuildOptions, build_dir};
use super::changelog::{
    ChangelogOptions, current_changelog_version, dch_command, rebuild_version, update_changelog,
};
use super::clone::{CloneBranches, clone, initialise_branches};
use super::release::{commit_release, exclude_matcher, orig_tarball_name, prepare_orig_tarball};
use super::upload::{changes_version, latest_final_changes, upload};
use super::{
    PackagingActions, build, build_area, clean_dir, command_from_config, find_files_with_suffix,
    run_tool,
};
use crate::config::{Config, render_example};
use crate::core::context::{Context, ExecutionFlags};
use crate::core::process::builder::ProcessBuilder;
use crate::engine::action::Action;
use crate::engine::{ActionBody, ActionEnv};
use crate::error::FlowError;
use crate::git::backend::ShellGit;
use crate::snapshot::{BackupStore, archive};
use crate::test_utils::{
    add_packaging_branches, commit_file, init_repo_with_commit, run_git, temp_dir,
};
use crate::ui::prompt::LinePrompter;

/// Runs `f` against `workdir` with a fresh environment and the default
/// configuration plus `presets`.
fn with_env<T>(
    workdir: &Path,
    flags: ExecutionFlags,
    presets: &[(&str, &str)],
    input: &str,
    f: impl FnOnce(&ActionEnv<'_>, &Config) -> T,
) -> T {
    let backups = temp_dir();
    let ctx = Context::new(workdir, flags).with_backup_dir(backups.path());
    let git = ShellGit::from_context(&ctx);
    let store = BackupStore::from_context(&ctx);
    let prompter = LinePrompter::new(Cursor::new(input.to_string()), Vec::new());
    let config = Config::parse(&render_example(presets), "pkg").expect("valid config");
    let env = ActionEnv::new(&ctx, &git, &store, &prompter, Some(&config));
    f(&env, &config)
}

fn packaging_repo() -> tempfile::TempDir {
    let repo = temp_dir();
    init_repo_with_commit(repo.path());
    add_packaging_branches(repo.path());
    repo
}

fn touch(path: &Path) {
    fs::create_dir_all(path.parent().expect("has parent")).expect("create dirs");
    fs::write(path, "x").expect("write file");
}

// --- Helpers ---

#[test]
fn test_build_area_is_next_to_workdir() {
    assert_eq!(
        build_area(Path::new("/work/repo")),
        PathBuf::from("/work/build-area")
    );
    assert_eq!(
        build_dir(Path::new("/work/repo"), "pkg", "1.0-0ppa1", BuildKind::Final),
        PathBuf::from("/work/build-area/pkg/1.0-0ppa1/final")
    );
}

#[test]
fn test_find_files_with_suffix() {
    let dir = temp_dir();
    touch(&dir.path().join("b/pkg_1.0_amd64.changes"));
    touch(&dir.path().join("a/pkg_1.0_source.changes"));
    touch(&dir.path().join("a/pkg_1.0.dsc"));

    let found = find_files_with_suffix(dir.path(), ".changes");
    assert_eq!(
        found,
        vec![
            dir.path().join("a/pkg_1.0_source.changes"),
            dir.path().join("b/pkg_1.0_amd64.changes"),
        ]
    );
    assert!(find_files_with_suffix(&dir.path().join("missing"), ".changes").is_empty());
}

#[test]
fn test_clean_dir() {
    let dir = temp_dir();
    let target = dir.path().join("build");
    touch(&target.join("old.deb"));

    let safe = Context::new(dir.path(), ExecutionFlags::SAFE_MODE);
    clean_dir(&safe, &target).expect("safe clean");
    assert!(target.join("old.deb").exists());

    let ctx = Context::new(dir.path(), ExecutionFlags::empty());
    clean_dir(&ctx, &target).expect("clean");
    assert!(target.is_dir());
    assert_eq!(fs::read_dir(&target).expect("read dir").count(), 0);
}

#[test]
fn test_command_from_config() {
    let editor = command_from_config("code  --wait").expect("command");
    assert_eq!(editor.command_line(), "code --wait");
    assert!(command_from_config("   ").is_none());
}

#[test]
fn test_run_tool_skipped_in_safe_mode() {
    let dir = temp_dir();
    let ctx = Context::new(dir.path(), ExecutionFlags::SAFE_MODE);
    let output = run_tool(&ctx, ProcessBuilder::new("debflow-no-such-tool")).expect("skipped");
    assert!(output.is_none());
}

// --- Release ---

#[test]
fn test_orig_tarball_name() {
    assert_eq!(orig_tarball_name("pkg", "1.2"), "pkg_1.2.orig.tar.gz");
}

#[test]
fn test_prepare_orig_tarball_leaves_out_excluded_files() {
    let repo = temp_dir();
    init_repo_with_commit(repo.path());
    fs::create_dir(repo.path().join("src")).expect("create src");
    commit_file(repo.path(), "src/main.c", "int main;\n", "Add source");
    commit_file(repo.path(), ".gitignore", "*.log\n", "Ignore logs");
    commit_file(repo.path(), "debflow.conf", "[git]\n", "Add config");
    fs::write(repo.path().join("build.log"), "log\n").expect("write log");
    run_git(&["add", "-f", "build.log"], repo.path());
    run_git(&["commit", "-q", "-m", "Add log"], repo.path());

    let git = ShellGit::new(repo.path(), false);
    let patterns: Vec<String> = ["debflow.conf", "README.md", "LICENSE"]
        .map(String::from)
        .to_vec();
    let excludes = exclude_matcher(repo.path(), &patterns, &repo.path().join(".gitignore"))
        .expect("matcher");

    let tmp = temp_dir();
    let tarball = prepare_orig_tarball(&git, "master", tmp.path(), "pkg", "1.0", &excludes)
        .expect("tarball");
    assert_eq!(tarball, tmp.path().join("pkg_1.0.orig.tar.gz"));

    let out = temp_dir();
    archive::unpack_tar_gz(&tarball, out.path()).expect("unpack");
    let source = out.path().join("pkg-1.0");
    assert_eq!(
        fs::read_to_string(source.join("src/main.c")).expect("main.c"),
        "int main;\n"
    );
    for excluded in ["README.md", "debflow.conf", "build.log", ".gitignore"] {
        assert!(!source.join(excluded).exists(), "{excluded} was packed");
    }
}

#[test]
fn test_commit_release_requires_newer_release() {
    let repo = packaging_repo();
    run_git(&["tag", "release/1.0", "master"], repo.path());
    run_git(&["tag", "upstream/1.0", "upstream"], repo.path());

    let err = with_env(repo.path(), ExecutionFlags::empty(), &[], "", |env, config| {
        commit_release(env, config, true, None)
    })
    .expect_err("release is not newer");
    insta::assert_snapshot!(
        err.to_string(),
        @"Release version '1.0' is not greater than upstream version '1.0', aborting"
    );
}

#[test]
fn test_commit_release_safe_mode_changes_nothing() {
    let repo = packaging_repo();
    run_git(&["tag", "release/1.1", "master"], repo.path());

    let tag = with_env(repo.path(), ExecutionFlags::SAFE_MODE, &[], "", |env, config| {
        commit_release(env, config, true, None)
    })
    .expect("safe run");
    assert_eq!(tag, "upstream/1.1");
    assert_eq!(run_git(&["tag", "--list"], repo.path()), "release/1.1");
    assert_eq!(run_git(&["rev-list", "--count", "upstream"], repo.path()), "1");
}

// --- Changelog ---

#[test]
fn test_dch_command() {
    let config = Config::parse(&render_example(&[("distribution", "noble")]), "pkg")
        .expect("valid config");
    insta::assert_snapshot!(
        dch_command(&config, "1.0-0ppa1", true).command_line(),
        @"gbp dch --debian-branch=debian --new-version=1.0-0ppa1 --urgency=low --spawn-editor=snapshot --distribution=noble --release"
    );
    assert!(!dch_command(&config, "1.0", false).command_line().contains("--release"));
}

#[test]
fn test_update_changelog_uses_upstream_version() {
    let repo = packaging_repo();
    run_git(&["tag", "upstream/2.3", "upstream"], repo.path());

    let options = ChangelogOptions {
        commit: true,
        ..ChangelogOptions::default()
    };
    let version = with_env(repo.path(), ExecutionFlags::SAFE_MODE, &[], "", |env, config| {
        update_changelog(env, config, &options)
    })
    .expect("safe run");
    assert_eq!(version, "2.3-0ppa1");
    assert_eq!(run_git(&["rev-parse", "--abbrev-ref", "HEAD"], repo.path()), "debian");
    assert_eq!(run_git(&["rev-list", "--count", "debian"], repo.path()), "1");
}

#[test]
fn test_update_changelog_bumps_rebuild_of_same_upstream() {
    let repo = packaging_repo();
    run_git(&["tag", "upstream/2.3", "upstream"], repo.path());
    run_git(&["checkout", "-q", "debian"], repo.path());
    fs::create_dir_all(repo.path().join("debian")).expect("debian dir");
    commit_file(
        repo.path(),
        "debian/changelog",
        "pkg (2.3-0ppa4) noble; urgency=low\n\n  * Rebuild.\n",
        "Add changelog",
    );
    run_git(&["checkout", "-q", "master"], repo.path());

    let version = with_env(repo.path(), ExecutionFlags::SAFE_MODE, &[], "", |env, config| {
        update_changelog(env, config, &ChangelogOptions::default())
    })
    .expect("safe run");
    assert_eq!(version, "2.3-0ppa5");
}

#[test]
fn test_rebuild_version() {
    assert_eq!(rebuild_version(None, "1.0-0ppa1".to_string()), "1.0-0ppa1");
    assert_eq!(rebuild_version(Some("1.0-0ppa1"), "1.0-0ppa1".to_string()), "1.0-0ppa2");
    assert_eq!(rebuild_version(Some("1.0-1ubuntu2"), "1.0-0ppa1".to_string()), "1.0-1ubuntu3");
    assert_eq!(rebuild_version(Some("0.9-0ppa7"), "1.0-0ppa1".to_string()), "1.0-0ppa1");
}

#[test]
fn test_current_changelog_version() {
    let dir = temp_dir();
    let path = dir.path().join("changelog");
    assert_eq!(current_changelog_version(&path), None);

    fs::write(&path, "\nhello (1.2-0ppa3) noble; urgency=low\n\n  * Entry.\n").expect("write");
    assert_eq!(current_changelog_version(&path).as_deref(), Some("1.2-0ppa3"));

    fs::write(&path, "not a changelog\n").expect("write");
    assert_eq!(current_changelog_version(&path), None);
}

#[test]
fn test_update_changelog_without_upstream_tag() {
    let repo = packaging_repo();
    let err = with_env(repo.path(), ExecutionFlags::SAFE_MODE, &[], "", |env, config| {
        update_changelog(env, config, &ChangelogOptions::for_release())
    })
    .expect_err("no upstream tag");
    assert_eq!(err.to_string(), "could not determine the changelog version");
    assert!(err.as_op().is_some());
}

// --- Build ---

#[test]
fn test_build_options_for_test_builds() {
    let options = BuildOptions::test(Some("  ".to_string()));
    assert_eq!(options.kind(), BuildKind::Test);
    assert!(options.tag_options(Some("ABCD")).is_empty());
    assert_eq!(
        options.builder_command("debuild", Some("ABCD")),
        "debuild --no-lintian -uc -us"
    );
    assert_eq!(BuildOptions::builder().build(), BuildOptions::test(None));
}

#[test]
fn test_build_options_for_release_builds() {
    let options = BuildOptions::release(Some("-sa".to_string()));
    assert_eq!(options.kind(), BuildKind::Final);
    assert_eq!(options.flags(), Some("-sa"));
    assert_eq!(
        options.tag_options(Some("ABCD")),
        ["--git-tag", "--git-sign-tags", "--git-keyid=ABCD"]
    );
    assert_eq!(options.tag_options(None), ["--git-tag"]);
    assert_eq!(
        options.builder_command("debuild", Some("ABCD")),
        "debuild --no-lintian -kABCD -sa"
    );
    assert_eq!(options.builder_command("debuild", None), "debuild --no-lintian -sa");
}

#[test]
fn test_build_options_builder() {
    let options = BuildOptions::builder()
        .with_kind(BuildKind::Final)
        .with_sign_changes(true)
        .build();
    assert_eq!(options.sign_options(Some("ABCD")), ["-us", "-kABCD"]);
    assert_eq!(options.kind().to_string(), "final");
}

#[test]
fn test_build_requires_upstream_tag() {
    let repo = packaging_repo();
    let err = with_env(repo.path(), ExecutionFlags::SAFE_MODE, &[], "", |env, config| {
        build::build(env, config, &BuildOptions::test(None))
    })
    .expect_err("no upstream tag");
    assert_eq!(err.to_string(), "could not determine the upstream version");
}

// --- Upload ---

#[test]
fn test_changes_version() {
    assert_eq!(
        changes_version(Path::new("/b/pkg_1.2-0ppa1_source.changes")),
        Some("1.2-0ppa1")
    );
    assert_eq!(changes_version(Path::new("broken.changes")), None);
}

#[test]
fn test_latest_final_changes_picks_highest_version() {
    let dir = temp_dir();
    for (version, kind) in [
        ("1.2-0ppa1", "final"),
        ("1.10-0ppa1", "final"),
        ("1.9-0ppa1", "final"),
        ("2.0-0ppa1", "test"),
    ] {
        touch(
            &dir.path()
                .join(version)
                .join(kind)
                .join(format!("pkg_{version}_source.changes")),
        );
    }
    let latest = latest_final_changes(dir.path()).expect("a final build");
    assert_eq!(changes_version(&latest), Some("1.10-0ppa1"));
    assert!(latest_final_changes(&dir.path().join("missing")).is_none());
}

fn upload_workdir() -> (tempfile::TempDir, PathBuf) {
    let parent = temp_dir();
    let workdir = parent.path().join("pkg");
    fs::create_dir(&workdir).expect("create workdir");
    touch(&parent.path().join("build-area/pkg/1.0-0ppa1/final/pkg_1.0-0ppa1_source.changes"));
    (parent, workdir)
}

#[test]
fn test_upload_requires_ppa() {
    let (_parent, workdir) = upload_workdir();
    let err = with_env(&workdir, ExecutionFlags::SAFE_MODE, &[], "y\n", upload)
        .expect_err("no ppa");
    assert!(matches!(err, FlowError::Config(_)));
    insta::assert_snapshot!(err.to_string(), @"invalid value for 'ppa' in section [upload]: not set, aborting upload");
}

#[test]
fn test_upload_declined() {
    let (_parent, workdir) = upload_workdir();
    let err = with_env(&workdir, ExecutionFlags::SAFE_MODE, &[("ppa", "me/ppa")], "n\n", upload)
        .expect_err("declined");
    assert_eq!(err.to_string(), "Upload aborted by user");
}

#[test]
fn test_upload_confirmed_in_safe_mode() {
    let (_parent, workdir) = upload_workdir();
    with_env(&workdir, ExecutionFlags::SAFE_MODE, &[("ppa", "me/ppa")], "y\n", upload)
        .expect("safe upload");
}

#[test]
fn test_upload_without_builds() {
    let dir = temp_dir();
    let workdir = dir.path().join("pkg");
    fs::create_dir(&workdir).expect("create workdir");
    let err = with_env(&workdir, ExecutionFlags::SAFE_MODE, &[("ppa", "me/ppa")], "y\n", upload)
        .expect_err("nothing to upload");
    assert!(err.to_string().starts_with("No final *source.changes file found in"));
}

// --- Clone ---

fn subjects(repo: &Path, branch: &str) -> String {
    run_git(&["log", "--format=%s", branch], repo)
}

#[test]
fn test_initialise_branches_with_defaults() {
    let repo = temp_dir();
    init_repo_with_commit(repo.path());
    let ctx = Context::new(repo.path(), ExecutionFlags::empty());
    let git = ShellGit::new(repo.path(), false);
    let prompter = LinePrompter::new(Cursor::new("n\n".to_string()), Vec::new());

    initialise_branches(
        &git,
        &prompter,
        &ctx,
        repo.path(),
        "proj",
        "master",
        &CloneBranches::default(),
    )
    .expect("initialise");

    assert_eq!(run_git(&["ls-tree", "-r", "--name-only", "upstream"], repo.path()), "");
    assert_eq!(run_git(&["ls-tree", "-r", "--name-only", "debian"], repo.path()), "");
    assert_eq!(
        run_git(&["ls-tree", "-r", "--name-only", "master"], repo.path()),
        "README.md\ndebflow.conf"
    );
    insta::assert_snapshot!(subjects(repo.path(), "upstream"), @r"
    Initial upstream commit.
    Initial commit
    ");
    insta::assert_snapshot!(subjects(repo.path(), "master"), @r"
    Initial release commit.
    Initial commit
    ");
    assert_eq!(run_git(&["rev-parse", "--abbrev-ref", "HEAD"], repo.path()), "master");
}

#[test]
fn test_initialise_branches_with_custom_names() {
    let repo = temp_dir();
    init_repo_with_commit(repo.path());
    let ctx = Context::new(repo.path(), ExecutionFlags::empty());
    let git = ShellGit::new(repo.path(), false);
    let prompter = LinePrompter::new(Cursor::new("n\n".to_string()), Vec::new());
    let branches = CloneBranches {
        release: "release".to_string(),
        upstream: "up".to_string(),
        debian: "deb".to_string(),
    };

    initialise_branches(&git, &prompter, &ctx, repo.path(), "proj", "master", &branches)
        .expect("initialise");

    let conf = fs::read_to_string(repo.path().join("debflow.conf")).expect("config written");
    let config = Config::parse(&conf, "proj").expect("valid config");
    assert_eq!(config.git.release_branch, "release");
    assert_eq!(config.git.upstream_branch, "up");
    assert_eq!(config.git.debian_branch, "deb");
    assert_eq!(subjects(repo.path(), "master"), "Initial commit");
}

#[test]
fn test_clone_in_safe_mode_only_asks() {
    let dir = temp_dir();
    with_env(
        dir.path(),
        ExecutionFlags::SAFE_MODE,
        &[],
        "https://example.com/group/proj.git\n\n\n\n\n",
        |env, _| clone(env),
    )
    .expect("safe clone");
    assert!(!dir.path().join("proj").exists());
}

#[test]
fn test_clone_rejects_url_without_name() {
    let dir = temp_dir();
    let err = with_env(
        dir.path(),
        ExecutionFlags::SAFE_MODE,
        &[],
        "https://example.com/\n",
        |env, _| clone(env),
    )
    .expect_err("no repository name");
    assert_eq!(
        err.to_string(),
        "could not find a repository name in 'https://example.com/'"
    );
}

// --- Local actions ---

#[test]
fn test_config_action_writes_example_once() {
    let dir = temp_dir();
    with_env(dir.path(), ExecutionFlags::empty(), &[], "", |env, _| {
        PackagingActions.run(Action::Config, env)
    })
    .expect("config written");
    let written = fs::read_to_string(dir.path().join("debflow.conf")).expect("config file");
    assert!(written.starts_with("[git]"));

    let err = with_env(dir.path(), ExecutionFlags::empty(), &[], "", |env, _| {
        PackagingActions.run(Action::Config, env)
    })
    .expect_err("refuses to overwrite");
    assert!(err.to_string().contains("will not be replaced"));
}
