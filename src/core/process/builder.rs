// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process builder with configuration options.
//!
//! ```text
//! ProcessBuilder
//!  • new/which/exists
//!  • arg/args/cwd/env/flags/flag/stdin
//!
//! ProcessFlags: ALLOW_FAILURE, NO_FATAL_SCAN, INHERIT_STDIO
//! ```

use bitflags::bitflags;
use std::collections::BTreeMap;
use std::ffi::OsStr;
use std::path::{Path, PathBuf};
use std::sync::{OnceLock, RwLock};

use crate::error::CommandError;

/// Static cache for executable paths resolved via `which`.
static EXECUTABLE_CACHE: OnceLock<RwLock<BTreeMap<String, PathBuf>>> = OnceLock::new();

fn exe_cache() -> &'static RwLock<BTreeMap<String, PathBuf>> {
    EXECUTABLE_CACHE.get_or_init(|| RwLock::new(BTreeMap::new()))
}

bitflags! {
    /// Flags controlling process execution behavior.
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct ProcessFlags: u32 {
        /// Return the output instead of failing on a non-zero exit or fatal marker
        const ALLOW_FAILURE = 0x01;
        /// Don't treat "fatal" in stdout/stderr as a failure
        const NO_FATAL_SCAN = 0x02;
        /// Let the child own the terminal (editors); output is not captured
        const INHERIT_STDIO = 0x04;
    }
}

/// Output from a completed process.
#[derive(Debug, Clone, Default)]
pub struct ProcessOutput {
    exit_code: i32,
    stdout: String,
    stderr: String,
}

impl ProcessOutput {
    pub(super) const fn new(exit_code: i32, stdout: String, stderr: String) -> Self {
        Self {
            exit_code,
            stdout,
            stderr,
        }
    }

    /// Returns the process exit code (0 = success, -1 = killed by signal).
    #[must_use]
    pub const fn exit_code(&self) -> i32 {
        self.exit_code
    }

    /// Returns captured stdout (empty with `INHERIT_STDIO`).
    #[must_use]
    pub fn stdout(&self) -> &str {
        &self.stdout
    }

    /// Returns captured stderr (empty with `INHERIT_STDIO`).
    #[must_use]
    pub fn stderr(&self) -> &str {
        &self.stderr
    }

    /// Returns true if the process exited with code 0.
    #[must_use]
    pub const fn success(&self) -> bool {
        self.exit_code == 0
    }

    /// Returns true if either stream mentions a fatal error.
    #[must_use]
    pub fn has_fatal_marker(&self) -> bool {
        self.stdout.contains("fatal") || self.stderr.contains("fatal")
    }
}

/// Builder for configuring and running a process.
#[derive(Debug)]
pub struct ProcessBuilder {
    /// Path or bare name of the executable
    program: PathBuf,
    /// Command-line arguments
    args: Vec<String>,
    /// Working directory
    cwd: Option<PathBuf>,
    /// Extra environment variables
    env: Vec<(String, String)>,
    /// Process flags
    flags: ProcessFlags,
    /// Stdin content (if any)
    stdin: Option<String>,
}

impl ProcessBuilder {
    /// Creates a new `ProcessBuilder` for the given program.
    ///
    /// A bare executable name is resolved via PATH when `run()` is called.
    pub fn new(program: impl AsRef<Path>) -> Self {
        Self {
            program: program.as_ref().to_path_buf(),
            args: Vec::new(),
            cwd: None,
            env: Vec::new(),
            flags: ProcessFlags::empty(),
            stdin: None,
        }
    }

    /// Resolves `program` via PATH, caching the result.
    ///
    /// # Errors
    ///
    /// Returns `CommandError::NotFound` if the executable is not in PATH.
    pub fn which(program: &str) -> Result<PathBuf, CommandError> {
        {
            let cache = exe_cache()
                .read()
                .unwrap_or_else(std::sync::PoisonError::into_inner);
            if let Some(path) = cache.get(program) {
                return Ok(path.clone());
            }
        }

        let path = which::which(program).map_err(|_| CommandError::NotFound {
            program: program.to_string(),
        })?;
        exe_cache()
            .write()
            .unwrap_or_else(std::sync::PoisonError::into_inner)
            .insert(program.to_string(), path.clone());
        Ok(path)
    }

    /// Checks if an executable exists in PATH.
    #[must_use]
    pub fn exists(program: &str) -> bool {
        Self::which(program).is_ok()
    }

    /// Adds an argument to the command.
    #[must_use]
    pub fn arg(mut self, arg: impl AsRef<OsStr>) -> Self {
        self.args.push(arg.as_ref().to_string_lossy().into_owned());
        self
    }

    /// Adds multiple arguments to the command.
    #[must_use]
    pub fn args<I, S>(mut self, args: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: AsRef<OsStr>,
    {
        for arg in args {
            self.args.push(arg.as_ref().to_string_lossy().into_owned());
        }
        self
    }

    /// Sets the working directory for the process.
    #[must_use]
    pub fn cwd(mut self, dir: impl AsRef<Path>) -> Self {
        self.cwd = Some(dir.as_ref().to_path_buf());
        self
    }

    /// Sets an environment variable for the process.
    #[must_use]
    pub fn env(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.env.push((key.into(), value.into()));
        self
    }

    /// Sets process flags.
    #[must_use]
    pub const fn flags(mut self, flags: ProcessFlags) -> Self {
        self.flags = flags;
        self
    }

    /// Adds a process flag.
    #[must_use]
    pub fn flag(mut self, flag: ProcessFlags) -> Self {
        self.flags |= flag;
        self
    }

    /// Sets stdin content.
    #[must_use]
    pub fn stdin(mut self, content: impl Into<String>) -> Self {
        self.stdin = Some(content.into());
        self
    }

    /// Returns the program as given.
    #[must_use]
    pub const fn program(&self) -> &PathBuf {
        &self.program
    }

    pub(super) fn args_slice(&self) -> &[String] {
        &self.args
    }

    pub(super) const fn working_dir(&self) -> Option<&PathBuf> {
        self.cwd.as_ref()
    }

    pub(super) fn env_vars(&self) -> &[(String, String)] {
        &self.env
    }

    pub(super) const fn process_flags(&self) -> ProcessFlags {
        self.flags
    }

    pub(super) fn stdin_content(&self) -> Option<&str> {
        self.stdin.as_deref()
    }
}
