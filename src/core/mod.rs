// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Core modules for execution context and process management.
//!
//! ```text
//!           core
//!            |
//!      +-----+------+
//!      |            |
//!      v            v
//!   context      process
//!      |            |
//!   Context      Builder
//!   Flags        Output
//! ```

pub mod context;
pub mod process;
