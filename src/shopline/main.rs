//! # `spl` binary
//!
//! Thin on purpose: the CLI lives in `cli/`, this file only runs it and turns an error
//! into a red `Error:` line and exit status 1. Everything that decides *what* a command
//! line means lives in the `shopline` library.

use colored::Colorize;

mod cli;

fn main() {
    if let Err(e) = cli::run() {
        eprintln!("{} {}", "Error:".red(), e);
        std::process::exit(1);
    }
}
