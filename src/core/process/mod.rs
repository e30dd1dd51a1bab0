// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Blocking process spawning.
//!
//! ```text
//! ProcessBuilder::new("gbp")
//!   .args() .cwd() .env() .stdin() .flags()
//!   .run()
//!       --> std::process::Command
//!           capture stdout/stderr (or inherit for editors)
//!       --> ProcessOutput { exit_code, stdout, stderr }
//! ```

pub mod builder;
mod runner;
#[cfg(test)]
mod tests;
