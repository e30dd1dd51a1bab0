// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Process execution.
//!
//! ```text
//! run()
//!   |
//!   v
//! resolve program (which, cached)
//!   |
//!   v
//! build_command()   args, cwd, env, stdio
//!   |
//!   v
//! spawn + feed stdin + wait
//!   |
//!   v
//! exit_code != 0 or "fatal" in output?
//!   (skip if ALLOW_FAILURE / NO_FATAL_SCAN)
//!   |
//!   v
//! ProcessOutput { exit_code, stdout, stderr }
//! ```

use std::io::Write as _;
use std::process::{Command, Stdio};

use tracing::{debug, trace};

use super::builder::{ProcessBuilder, ProcessFlags, ProcessOutput};
use crate::error::CommandError;

impl ProcessBuilder {
    /// Returns the full command line as a string (for logging and errors).
    #[must_use]
    pub fn command_line(&self) -> String {
        use std::fmt::Write as _;

        let mut cmd = self.program().display().to_string();
        for arg in self.args_slice() {
            if arg.contains(' ') || arg.is_empty() {
                let _ = write!(cmd, " \"{arg}\"");
            } else {
                let _ = write!(cmd, " {arg}");
            }
        }
        cmd
    }

    /// Spawns the process and waits for it to finish.
    ///
    /// # Errors
    ///
    /// - `CommandError::NotFound` if a bare program name is not in PATH.
    /// - `CommandError::Spawn` if the process cannot be started.
    /// - `CommandError::Failed` on a non-zero exit or a fatal marker in the
    ///   output, unless `ALLOW_FAILURE` is set.
    pub fn run(self) -> Result<ProcessOutput, CommandError> {
        let cmd_line = self.command_line();
        if let Some(cwd) = self.working_dir() {
            debug!(cwd = %cwd.display(), "cd");
        }
        debug!(cmd = %cmd_line, "exec");

        let mut command = self.build_command()?;
        let flags = self.process_flags();

        let mut child = command.spawn().map_err(|source| CommandError::Spawn {
            command: cmd_line.clone(),
            source,
        })?;
        trace!(pid = child.id(), "spawned");

        if let (Some(content), Some(mut stdin)) = (self.stdin_content(), child.stdin.take()) {
            stdin
                .write_all(content.as_bytes())
                .map_err(|source| CommandError::Spawn {
                    command: cmd_line.clone(),
                    source,
                })?;
        }

        let raw = child
            .wait_with_output()
            .map_err(|source| CommandError::Spawn {
                command: cmd_line.clone(),
                source,
            })?;

        let output = ProcessOutput::new(
            raw.status.code().unwrap_or(-1),
            String::from_utf8_lossy(&raw.stdout).into_owned(),
            String::from_utf8_lossy(&raw.stderr).into_owned(),
        );
        trace!(exit_code = output.exit_code(), "exited");

        let fatal = !flags.contains(ProcessFlags::NO_FATAL_SCAN) && output.has_fatal_marker();
        if (!output.success() || fatal) && !flags.contains(ProcessFlags::ALLOW_FAILURE) {
            return Err(CommandError::Failed {
                command: cmd_line,
                code: Some(output.exit_code()),
                stdout: output.stdout().to_string(),
                stderr: output.stderr().to_string(),
            });
        }

        Ok(output)
    }

    fn build_command(&self) -> Result<Command, CommandError> {
        let program = self.program();
        let resolved = if program.components().count() == 1 && !program.is_absolute() {
            Self::which(&program.to_string_lossy())?
        } else {
            program.clone()
        };

        let mut command = Command::new(resolved);
        command.args(self.args_slice());
        if let Some(cwd) = self.working_dir() {
            command.current_dir(cwd);
        }
        for (key, value) in self.env_vars() {
            command.env(key, value);
        }

        command.stdin(if self.stdin_content().is_some() {
            Stdio::piped()
        } else if self.process_flags().contains(ProcessFlags::INHERIT_STDIO) {
            Stdio::inherit()
        } else {
            Stdio::null()
        });

        if self.process_flags().contains(ProcessFlags::INHERIT_STDIO) {
            command.stdout(Stdio::inherit()).stderr(Stdio::inherit());
        } else {
            command.stdout(Stdio::piped()).stderr(Stdio::piped());
        }

        Ok(command)
    }
}
