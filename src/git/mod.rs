// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Git operations module.
//!
//! ```text
//!          tags.rs
//!   <type>/<version> parsing, HEAD tag selection
//!             |
//!             v
//!      ,------------------,
//!      | backend (trait)  |
//!      '--------+---------'
//!               |
//!               v
//!           ShellGit
//!   gix discovery + git CLI
//! ```

pub mod backend;
pub mod tags;
