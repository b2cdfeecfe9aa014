//! # CLI Layer
//!
//! This module is the only place that knows about terminal I/O: stdout, stderr, prompts,
//! colors and exit codes. It builds the command tree, hands the parse to the library's
//! pre-run hooks, and dispatches to a handler.
//!
//! ## Flow
//!
//! 1. `build_command_tree()` once; clap parses `argv` against it.
//! 2. Logging is initialised (`SHOPLINE_LOG`, else `--verbose`, else warnings only).
//! 3. The parse becomes an `Invocation` and runs through the pre-run hooks.
//! 4. Built-ins (`auth`, `config`, `schema`, `help-json`) run locally; everything else
//!    is a resource command: select credentials, plan the request, then print the plan
//!    (`--dry-run`) or send it and render the response.
//!
//! ## Module Structure
//!
//! - `commands`: `run()` and the per-command handlers
//! - `render`: JSON and text output
//! - `help_json`: machine-readable command descriptions

mod commands;
mod help_json;
mod render;

pub use commands::run;
