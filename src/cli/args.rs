//! CLI argument definitions using clap
//!
//! Commands:
//! - lexrule run --graph <path> --rules <path> [--config <path>]
//! - lexrule check --rules <path> [--config <path>]
//!
//! `--log-level` applies to every command.

use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

use crate::observability::Severity;

/// lexrule - probabilistic fixed-point rule engine over attributed graphs
#[derive(Parser, Debug)]
#[command(name = "lexrule")]
#[command(version, about, long_about = None)]
pub struct Cli {
    /// Lowest severity written to stderr
    #[arg(long, global = true, value_enum, default_value_t = LogLevel::Info)]
    pub log_level: LogLevel,

    #[command(subcommand)]
    pub command: Command,
}

/// `--log-level` values
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum LogLevel {
    Trace,
    Info,
    Warn,
    Error,
}

impl From<LogLevel> for Severity {
    fn from(level: LogLevel) -> Self {
        match level {
            LogLevel::Trace => Severity::Trace,
            LogLevel::Info => Severity::Info,
            LogLevel::Warn => Severity::Warn,
            LogLevel::Error => Severity::Error,
        }
    }
}

/// How a rules file is read
#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum RulesFormat {
    /// `.json` is a native rule list, anything else is DSL text
    Auto,
    Dsl,
    /// JSON list of `NativeRule`
    Json,
    /// JSON list of foreign rule descriptors
    Foreign,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Run rules over a graph and print the resulting facts
    Run {
        /// Node-link JSON graph
        #[arg(long)]
        graph: PathBuf,

        /// Rules file
        #[arg(long)]
        rules: PathBuf,

        #[arg(long, value_enum, default_value_t = RulesFormat::Auto)]
        format: RulesFormat,

        /// JSON config `{ "engine": {...}, "run": {...} }`
        #[arg(long)]
        config: Option<PathBuf>,

        /// Include supports and trace
        #[arg(long)]
        audit: bool,

        /// Drop facts with this label from the output (repeatable)
        #[arg(long = "block")]
        block: Vec<String>,

        /// Print one fact per line instead of a JSON document
        #[arg(long)]
        stream: bool,

        /// Log every timestep at INFO
        #[arg(long)]
        verbose: bool,
    },

    /// Compile and validate a rules file
    Check {
        #[arg(long)]
        rules: PathBuf,

        #[arg(long, value_enum, default_value_t = RulesFormat::Auto)]
        format: RulesFormat,

        #[arg(long)]
        config: Option<PathBuf>,
    },
}

impl Cli {
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}
