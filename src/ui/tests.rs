// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

use std::io::Cursor;

use super::prompt::{LinePrompter, Prompter};

fn prompter(input: &str) -> LinePrompter<Cursor<Vec<u8>>, Vec<u8>> {
    LinePrompter::new(Cursor::new(input.as_bytes().to_vec()), Vec::new())
}

#[test]
fn test_confirm_default_and_retry() {
    assert!(prompter("\n").confirm("Continue?", Some(true)).unwrap());
    assert!(!prompter("\n").confirm("Continue?", Some(false)).unwrap());

    let p = prompter("maybe\nYES\n");
    assert!(p.confirm("Continue?", None).unwrap());
    let shown = String::from_utf8(p.into_writer()).unwrap();
    assert_eq!(
        shown,
        "Continue? [y/n] Please respond with 'yes' or 'no' (or 'y' or 'n').\nContinue? [y/n] "
    );
}

#[test]
fn test_input_default_and_required() {
    let answer = prompter("\n")
        .input("Enter version", Some("1.0"), true)
        .unwrap();
    assert_eq!(answer.as_deref(), Some("1.0"));

    let skipped = prompter("\n").input("Enter email", None, true).unwrap();
    assert_eq!(skipped, None);

    let p = prompter("\n  https://example.org/Repo.git \n");
    let answer = p.input("Enter URL", None, false).unwrap();
    assert_eq!(answer.as_deref(), Some("https://example.org/Repo.git"));
}

#[test]
fn test_choose_menu() {
    let options = vec!["alpha\t2026-01-01 10:00:00".to_string(), "beta".to_string()];

    assert_eq!(prompter("\n").choose("Pick", &options, 0).unwrap(), Some(0));
    assert_eq!(prompter("a\n").choose("Pick", &options, 0).unwrap(), None);

    let p = prompter("7\n1\n");
    assert_eq!(p.choose("Pick", &options, 0).unwrap(), Some(1));
    let shown = String::from_utf8(p.into_writer()).unwrap();
    assert!(shown.contains("(0) alpha\t2026-01-01 10:00:00"));
    assert!(shown.contains("Pick [0-1 (0)] or 'a' to abort: "));
    assert!(shown.contains("Please respond with an integer in the range [0-1]"));
}

#[test]
fn test_closed_input_is_an_error() {
    let err = prompter("").confirm("Continue?", None).unwrap_err();
    assert_eq!(err.kind(), std::io::ErrorKind::UnexpectedEof);
    assert!(prompter("").choose("Pick", &[], 0).is_err());
}
