// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Shared test utilities.
//!
//! Scratch git repositories and log capturing.

use std::fs;
use std::io::Write;
use std::path::Path;
use std::process::Command;
use std::sync::{Arc, Mutex};

use tempfile::TempDir;
use tracing::Level;
use tracing_subscriber::fmt::MakeWriter;

pub(crate) fn temp_dir() -> TempDir {
    tempfile::tempdir().expect("failed to create temp dir")
}

/// Runs git in `cwd`, panicking on failure. Returns trimmed stdout.
pub(crate) fn run_git(args: &[&str], cwd: &Path) -> String {
    let output = Command::new("git")
        .args(args)
        .current_dir(cwd)
        .output()
        .expect("failed to spawn git");
    assert!(
        output.status.success(),
        "git {} failed: {}",
        args.join(" "),
        String::from_utf8_lossy(&output.stderr)
    );
    String::from_utf8_lossy(&output.stdout).trim().to_string()
}

/// Repository on branch `master` with an identity and one commit (README.md).
pub(crate) fn init_repo_with_commit(dir: &Path) {
    run_git(&["init", "-q"], dir);
    run_git(&["symbolic-ref", "HEAD", "refs/heads/master"], dir);
    run_git(&["config", "user.email", "test@example.com"], dir);
    run_git(&["config", "user.name", "Test"], dir);
    run_git(&["config", "commit.gpgsign", "false"], dir);
    run_git(&["config", "tag.gpgsign", "false"], dir);
    commit_file(dir, "README.md", "# Test\n", "Initial commit");
}

/// Writes `name` and commits it on the current branch.
pub(crate) fn commit_file(dir: &Path, name: &str, content: &str, message: &str) {
    fs::write(dir.join(name), content).expect("failed to write file");
    run_git(&["add", "-A"], dir);
    run_git(&["commit", "-q", "-m", message], dir);
}

/// Adds `upstream` and `debian` branches next to `master`.
pub(crate) fn add_packaging_branches(dir: &Path) {
    run_git(&["branch", "upstream"], dir);
    run_git(&["branch", "debian"], dir);
}

#[derive(Clone)]
struct BufferWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl Write for BufferWriter {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
        self.buffer
            .lock()
            .map_err(|_| std::io::Error::other("buffer poisoned"))?
            .extend_from_slice(buf);
        Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
        Ok(())
    }
}

#[derive(Clone)]
struct BufferMakeWriter {
    buffer: Arc<Mutex<Vec<u8>>>,
}

impl<'a> MakeWriter<'a> for BufferMakeWriter {
    type Writer = BufferWriter;

    fn make_writer(&'a self) -> Self::Writer {
        BufferWriter {
            buffer: self.buffer.clone(),
        }
    }
}

/// Runs `f` while capturing INFO-and-above tracing output.
pub(crate) fn run_with_logs<T>(f: impl FnOnce() -> T) -> (T, String) {
    let buffer = Arc::new(Mutex::new(Vec::new()));
    let subscriber = tracing_subscriber::fmt::Subscriber::builder()
        .with_writer(BufferMakeWriter {
            buffer: buffer.clone(),
        })
        .with_max_level(Level::INFO)
        .with_ansi(false)
        .with_target(false)
        .with_level(false)
        .without_time()
        .finish();

    let result = tracing::subscriber::with_default(subscriber, f);
    let logs = String::from_utf8_lossy(&buffer.lock().expect("log buffer poisoned")).to_string();
    (result, logs)
}
