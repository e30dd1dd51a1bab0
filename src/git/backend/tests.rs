// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::fs;

use super::{GitBackend, ShellGit, is_git_repo, repo_name_from_url};
use crate::error::GitError;
use crate::test_utils::{add_packaging_branches, init_repo_with_commit, run_git, temp_dir};

#[test]
fn test_is_git_repo() {
    let temp = temp_dir();
    assert!(!is_git_repo(temp.path()));

    init_repo_with_commit(temp.path());
    assert!(is_git_repo(temp.path()));
}

#[test]
fn test_operations_outside_repository_fail() {
    let temp = temp_dir();
    let git = ShellGit::new(temp.path(), false);

    let err = git.current_branch().unwrap_err();
    assert!(matches!(err.as_git(), Some(GitError::NotARepository { .. })));
    assert!(git.is_working_tree_clean().is_err());
}

#[test]
fn test_branch_and_commit_queries() {
    let temp = temp_dir();
    init_repo_with_commit(temp.path());
    add_packaging_branches(temp.path());
    let git = ShellGit::new(temp.path(), false);

    assert_eq!(git.current_branch().unwrap(), "master");
    git.switch_branch("debian").unwrap();
    assert_eq!(git.current_branch().unwrap(), "debian");

    let head = git.head_commit("master").unwrap();
    assert_eq!(head, run_git(&["rev-parse", "HEAD"], temp.path()));
    assert_eq!(git.current_branch().unwrap(), "master");

    let err = git.switch_branch("missing").unwrap_err();
    assert!(err.to_string().contains("'missing'"));
}

#[test]
fn test_commit_all_and_cleanliness() {
    let temp = temp_dir();
    init_repo_with_commit(temp.path());
    let git = ShellGit::new(temp.path(), false);

    assert!(git.is_working_tree_clean().unwrap());
    fs::write(temp.path().join("new.txt"), "new").unwrap();
    assert!(!git.is_working_tree_clean().unwrap());

    git.commit_all("Add new file").unwrap();
    assert!(git.is_working_tree_clean().unwrap());
    assert_eq!(
        run_git(&["log", "-1", "--format=%s"], temp.path()),
        "Add new file"
    );
}

#[test]
fn test_named_stash_round_trip() {
    let temp = temp_dir();
    init_repo_with_commit(temp.path());
    let git = ShellGit::new(temp.path(), false);

    fs::write(temp.path().join("README.md"), "changed").unwrap();
    fs::write(temp.path().join("untracked.txt"), "u").unwrap();
    git.stash(Some("debflow-test")).unwrap();
    assert!(git.is_working_tree_clean().unwrap());
    assert_eq!(
        git.resolve_stash("debflow-test").unwrap().as_deref(),
        Some("stash@{0}")
    );

    git.apply_stash("master", Some("debflow-test"), true).unwrap();
    assert_eq!(
        fs::read_to_string(temp.path().join("README.md")).unwrap(),
        "changed"
    );
    assert!(temp.path().join("untracked.txt").exists());
    assert_eq!(git.resolve_stash("debflow-test").unwrap(), None);

    let err = git
        .apply_stash("master", Some("debflow-test"), true)
        .unwrap_err();
    assert!(matches!(
        err.as_git(),
        Some(GitError::StashNotFound { name }) if name == "debflow-test"
    ));
}

#[test]
fn test_tags_reset_and_delete() {
    let temp = temp_dir();
    init_repo_with_commit(temp.path());
    let git = ShellGit::new(temp.path(), false);
    let first = git.head_commit("master").unwrap();

    git.tag_head("master", "release/1.0").unwrap();
    assert_eq!(
        git.head_tags("master", "release").unwrap(),
        vec!["release/1.0".to_string()]
    );
    assert!(git.tag_head("master", "release/1.0").is_err());

    fs::write(temp.path().join("b.txt"), "b").unwrap();
    git.commit_all("Second").unwrap();
    git.reset_hard("master", "release/1.0").unwrap();
    assert_eq!(git.head_commit("master").unwrap(), first);

    git.delete_tag("release/1.0").unwrap();
    assert!(git.head_tags("master", "release").unwrap().is_empty());
}

#[test]
fn test_clean_untracked_and_ignored() {
    let temp = temp_dir();
    init_repo_with_commit(temp.path());
    let git = ShellGit::new(temp.path(), false);

    fs::write(temp.path().join(".gitignore"), "*.log\n").unwrap();
    git.commit_all("Ignore logs").unwrap();
    fs::write(temp.path().join("build.log"), "x").unwrap();
    fs::create_dir(temp.path().join("scratch")).unwrap();
    fs::write(temp.path().join("scratch/file"), "x").unwrap();

    git.clean_untracked_and_ignored().unwrap();
    assert!(!temp.path().join("build.log").exists());
    assert!(!temp.path().join("scratch").exists());
    assert!(temp.path().join("README.md").exists());
}

#[test]
fn test_safe_mode_skips_mutations() {
    let temp = temp_dir();
    init_repo_with_commit(temp.path());
    let git = ShellGit::new(temp.path(), true);

    fs::write(temp.path().join("new.txt"), "new").unwrap();
    git.commit_all("Should not happen").unwrap();
    git.tag_head("master", "release/9.9").unwrap();
    git.stash(Some("ignored")).unwrap();

    assert!(!git.is_working_tree_clean().unwrap());
    assert!(git.head_tags("master", "release").unwrap().is_empty());
    assert_eq!(git.resolve_stash("ignored").unwrap(), None);
}

#[test]
fn test_archive_and_remove_all_tracked() {
    let temp = temp_dir();
    let out = temp_dir();
    init_repo_with_commit(temp.path());
    let git = ShellGit::new(temp.path(), false);

    let tarball = out.path().join("master.tar");
    git.archive("master", &tarball).unwrap();
    assert!(tarball.metadata().unwrap().len() > 0);

    git.create_branch("upstream").unwrap();
    git.switch_branch("upstream").unwrap();
    git.remove_all_tracked().unwrap();
    assert!(!temp.path().join("README.md").exists());
}

#[test]
fn test_repo_name_from_url() {
    assert_eq!(
        repo_name_from_url("https://example.org/group/hello.git").as_deref(),
        Some("hello")
    );
    assert_eq!(
        repo_name_from_url("git@example.org:hello-world.git").as_deref(),
        Some("hello-world")
    );
    assert_eq!(repo_name_from_url("https://example.org/hello"), None);
}
