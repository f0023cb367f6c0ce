//! CLI module for lexrule
//!
//! - run: evaluate rules over a graph and print facts
//! - check: compile and validate a rules file

mod args;
mod commands;
mod errors;
mod io;

use crate::observability::Logger;

pub use args::{Cli, Command, LogLevel, RulesFormat};
pub use commands::{check, check_summary, execute, load_rules, run_command, Config, LoadedRules, RunOptions};
pub use errors::{CliError, CliErrorCode, CliResult};

/// Parse arguments and run the selected command
pub fn run() -> CliResult<()> {
    let cli = Cli::parse_args();
    Logger::set_min_severity(cli.log_level.into());
    run_command(cli.command)
}
