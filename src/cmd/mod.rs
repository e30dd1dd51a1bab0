// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Command implementations.
//!
//! ```text
//! CLI args --> cmd::run_* handlers
//!   --show-options / --show-actions   list
//!   ACTION [DIR]                      run --> engine
//! ```

pub mod list;
pub mod run;
