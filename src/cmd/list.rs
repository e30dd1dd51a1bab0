// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Listings for shell completion.

use crate::cli::long_option_names;
use crate::engine::action::Action;

/// Prints every long option, one per line.
pub fn run_show_options_command() {
    for name in long_option_names() {
        println!("{name}");
    }
}

/// Prints every action name, one per line.
pub fn run_show_actions_command() {
    for action in Action::ALL {
        println!("{action}");
    }
}
