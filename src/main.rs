// debflow: Debian release workflow helper
//
// SPDX-FileCopyrightText: 2026 Romeo Ahmed
// SPDX-License-Identifier: GPL-3.0-or-later

//! Entry point.
//!
//! ```text
//! cli::parse() --> Logging --> Command Dispatch
//!   --show-options | --show-actions | ACTION [DIR] | (nothing)
//! ```

use std::process::ExitCode;

use debflow::cli::global::GlobalOptions;
use debflow::cli::{self, Cli};
use debflow::cmd::list::{run_show_actions_command, run_show_options_command};
use debflow::cmd::run::run_action_command;
use debflow::logging::{LogConfig, init_logging};

use mimalloc::MiMalloc;

#[global_allocator]
static GLOBAL: MiMalloc = MiMalloc;

fn main() -> ExitCode {
    let cli = cli::parse();

    let log_config = build_log_config(&cli.global);
    let _log_guard = match init_logging(&log_config) {
        Ok(guard) => guard,
        Err(e) => {
            eprintln!("Failed to initialize logging: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    dispatch_command(&cli)
}

fn build_log_config(global: &GlobalOptions) -> LogConfig {
    LogConfig::builder()
        .with_verbosity(global.verbosity())
        .with_color(global.color)
        .maybe_with_log_file(global.log_file.clone())
        .build()
}

fn dispatch_command(cli: &Cli) -> ExitCode {
    if cli.global.show_options {
        run_show_options_command();
        return ExitCode::SUCCESS;
    }
    if cli.global.show_actions {
        run_show_actions_command();
        return ExitCode::SUCCESS;
    }

    let Some(action) = cli.action() else {
        tracing::info!("No action specified, see 'debflow --help'");
        return ExitCode::SUCCESS;
    };

    match run_action_command(action, &cli.global, cli.dir.as_deref()) {
        Ok(report) => ExitCode::from(report.exit_code()),
        Err(e) => {
            eprintln!("Error: {e:#}");
            ExitCode::FAILURE
        }
    }
}
