//! lexrule CLI entry point
//!
//! Parses arguments, dispatches to the CLI module and exits non-zero on
//! failure. No other logic lives here.

use lexrule::cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{}", e);
        std::process::exit(1);
    }
}
