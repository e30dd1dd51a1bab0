// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Library root.
//!
//! # Crate Architecture
//!
//! ```text
//!                        main.rs
//!                           |
//!                +----------+----------+
//!                v                     v
//!             cli (clap)          cmd (handlers)
//!                                      |
//!                                      v
//!              ,---------------------------------------,
//!              |                engine                 |
//!              |  backup -> park -> config -> conflict |
//!              |  -> action -> restore / roll back     |
//!              '--+-----------+-----------+--------+---'
//!                 |           |           |        |
//!                 v           v           v        v
//!              actions      config     snapshot    ui
//!           gbp/dput/..   INI + env   tar.gz     prompts
//!                 |
//!          +------+------+
//!          v             v
//!         git         version
//!     gix/CLI, tags   numeric runs
//!
//!   +-----------------------------------------+
//!   |  core   context, process runner         |
//!   +-----------------------------------------+
//!   |  foundation   error, logging            |
//!   +-----------------------------------------+
//! ```

pub mod actions;
pub mod cli;
pub mod cmd;
pub mod config;
pub mod core;
pub mod engine;
pub mod error;
pub mod git;
pub mod logging;
pub mod snapshot;
pub mod ui;
pub mod version;

#[cfg(test)]
mod test_utils;
