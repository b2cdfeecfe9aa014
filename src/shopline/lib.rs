//! # Shopline CLI Architecture
//!
//! `spl` is a command line for the Shopline platform API. Most of what makes it pleasant
//! to use happens **before** a request is sent: short aliases for commands and flags,
//! forgiving store selection, and accepting IDs exactly as the CLI printed them. That
//! input resolution is all library code; the binary only wires it to a terminal.
//!
//! ## Layers
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────┐
//! │  CLI Layer (cli/, wired by main.rs)                         │
//! │  - Parses arguments, renders output, prompts, exit codes    │
//! │  - The ONLY place that knows about stdout/stderr            │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Input Resolution (command_tree, aliases, flags, hooks)     │
//! │  - Builds the aliased command tree once per process         │
//! │  - Normalizes a parse into an Invocation                    │
//! │  - Picks the store profile (profiles/)                      │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Request Planning (schema.rs) and Transport (api.rs)        │
//! │  - Registry of resources, verbs and filters                 │
//! │  - Pure Invocation → ApiRequest, then one HTTP call         │
//! └─────────────────────────────────────────────────────────────┘
//!                              │
//!                              ▼
//! ┌─────────────────────────────────────────────────────────────┐
//! │  Storage Layer (store/, config.rs)                          │
//! │  - Abstract CredentialStore trait                           │
//! │  - FileCredentialStore (production), InMemory (testing)     │
//! └─────────────────────────────────────────────────────────────┘
//! ```
//!
//! ## Key Principle: No I/O Assumptions in Core
//!
//! Library code never writes to stdout/stderr and never exits the process. Environment
//! variables are read through injectable lookups and stdin is passed in as a reader, so
//! every resolution rule is testable without a terminal or a network.
//!
//! ## Module Overview
//!
//! - [`aliases`]: alias tables, the singularizer and the tree aliaser
//! - [`flags`]: hidden second names for flags
//! - [`command_tree`]: the full `spl` command tree and the global flags
//! - [`invocation`]: a parse, detached from clap
//! - [`hooks`]: pre-run normalization of an invocation
//! - [`ids`]: formatted ID tokens (`[order:$ord_1]`)
//! - [`fields`]: field aliases for `--fields` and queries
//! - [`query`]: jq filters over responses
//! - [`profiles`]: store profile resolution
//! - [`store`]: credential storage
//! - [`schema`]: resource registry and request planning
//! - [`api`]: HTTP transport
//! - [`config`]: configuration file and environment
//! - [`error`]: error types
//! - `cli`: dispatch, rendering and help JSON for the binary (not part of the lib API)

pub mod aliases;
pub mod api;
pub mod command_tree;
pub mod config;
pub mod error;
pub mod fields;
pub mod flags;
pub mod hooks;
pub mod ids;
pub mod invocation;
pub mod profiles;
pub mod query;
pub mod schema;
pub mod store;
