// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use super::builder::{ProcessBuilder, ProcessFlags};
use crate::error::CommandError;

#[test]
fn test_process_echo() {
    let output = ProcessBuilder::new("echo")
        .arg("hello")
        .run()
        .expect("echo should succeed");

    assert!(output.success());
    insta::assert_snapshot!(output.stdout().trim(), @"hello");
}

#[test]
fn test_process_exit_code_allowed() {
    let output = ProcessBuilder::new("sh")
        .args(["-c", "exit 42"])
        .flag(ProcessFlags::ALLOW_FAILURE)
        .run()
        .expect("process should complete");

    assert_eq!(output.exit_code(), 42);
}

#[test]
fn test_process_nonzero_exit_fails() {
    let err = ProcessBuilder::new("sh")
        .args(["-c", "echo oops >&2; exit 3"])
        .run()
        .expect_err("non-zero exit should fail");

    match err {
        CommandError::Failed { code, stderr, .. } => {
            assert_eq!(code, Some(3));
            assert_eq!(stderr.trim(), "oops");
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn test_fatal_marker_fails_zero_exit() {
    let err = ProcessBuilder::new("sh")
        .args(["-c", "echo 'fatal: not good'"])
        .run()
        .expect_err("fatal marker should fail");
    assert!(err.to_string().contains("fatal: not good"));

    let output = ProcessBuilder::new("sh")
        .args(["-c", "echo 'fatal: not good'"])
        .flag(ProcessFlags::NO_FATAL_SCAN)
        .run()
        .expect("scan disabled");
    assert!(output.success());
}

#[test]
fn test_process_stdin_and_env() {
    let output = ProcessBuilder::new("sh")
        .args(["-c", "read line; echo \"$line-$DEBFLOW_TEST_VAR\""])
        .env("DEBFLOW_TEST_VAR", "value")
        .stdin("y\n")
        .run()
        .expect("process should succeed");

    insta::assert_snapshot!(output.stdout().trim(), @"y-value");
}

#[test]
fn test_process_cwd() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let output = ProcessBuilder::new("pwd")
        .cwd(dir.path())
        .run()
        .expect("pwd should succeed");

    let reported = std::path::PathBuf::from(output.stdout().trim());
    assert_eq!(
        reported.canonicalize().expect("canonical pwd"),
        dir.path().canonicalize().expect("canonical temp dir")
    );
}

#[test]
fn test_executable_lookup() {
    assert!(ProcessBuilder::exists("sh"));
    assert!(!ProcessBuilder::exists("nonexistent_program_12345"));

    let err = ProcessBuilder::new("nonexistent_program_12345")
        .run()
        .expect_err("missing program");
    assert!(matches!(err, CommandError::NotFound { .. }));
}

#[test]
fn test_command_line_quotes_spaces() {
    let builder = ProcessBuilder::new("git").args(["commit", "-m", "Temp 'x' commit."]);
    insta::assert_snapshot!(builder.command_line(), @r#"git commit -m "Temp 'x' commit.""#);
}
