//! Hidden second names for existing flags.
//!
//! An alias is registered as a clap long alias on the original argument, so both
//! spellings share one value and using either one reports the original as set from the
//! command line. Aliasing is a silent no-op when the original flag is not declared or
//! when the alias is already spoken for.

use crate::aliases::{common_flag_alias, ROOT_FLAG_ALIASES};
use clap::{Arg, Command};
use tracing::debug;

fn arg_names(arg: &Arg) -> impl Iterator<Item = &str> {
    arg.get_long()
        .into_iter()
        .chain(arg.get_all_aliases().unwrap_or_default())
}

fn is_taken(cmd: &Command, name: &str, reserved: &[String]) -> bool {
    reserved.iter().any(|r| r == name)
        || cmd.get_arguments().any(|arg| arg_names(arg).any(|n| n == name))
}

fn alias_with_reserved(cmd: &mut Command, original: &str, alias: &str, reserved: &[String]) -> bool {
    let Some(id) = cmd
        .get_arguments()
        .find(|arg| arg.get_long() == Some(original))
        .map(|arg| arg.get_id().as_str().to_string())
    else {
        return false;
    };
    if alias.is_empty() || is_taken(cmd, alias, reserved) {
        debug!(command = cmd.get_name(), flag = original, alias, "flag alias dropped");
        return false;
    }
    let owned = std::mem::take(cmd);
    *cmd = owned.mut_arg(id, |arg| arg.alias(alias.to_string()));
    true
}

/// Binds `--alias` to the flag declared as `--original` on `cmd`.
///
/// Returns whether the alias was added.
pub fn flag_alias(cmd: &mut Command, original: &str, alias: &str) -> bool {
    alias_with_reserved(cmd, original, alias, &[])
}

/// The long name of the flag that `name` is a hidden alias of, if any.
pub fn alias_of(cmd: &Command, name: &str) -> Option<String> {
    cmd.get_arguments()
        .find(|arg| {
            arg.get_all_aliases()
                .is_some_and(|aliases| aliases.contains(&name))
        })
        .and_then(|arg| arg.get_long().map(str::to_string))
}

/// Applies the root flag alias table to the root's own (global) flags.
pub fn apply_root_flag_aliases(root: &mut Command) {
    for (original, alias) in ROOT_FLAG_ALIASES {
        flag_alias(root, original, alias);
    }
}

/// Applies the common local flag aliases to every command below the root.
///
/// Global flags are only copied into subcommands when clap builds the tree, so their
/// names are collected from the root and treated as taken everywhere.
pub fn apply_common_flag_aliases(root: &mut Command) {
    let reserved: Vec<String> = root
        .get_arguments()
        .filter(|arg| arg.is_global_set())
        .flat_map(arg_names)
        .map(str::to_string)
        .collect();
    for child in root.get_subcommands_mut() {
        alias_subtree(child, &reserved);
    }
}

fn alias_subtree(cmd: &mut Command, reserved: &[String]) {
    let longs: Vec<String> = cmd
        .get_arguments()
        .filter(|arg| !arg.is_global_set())
        .filter_map(|arg| arg.get_long().map(str::to_string))
        .collect();
    for long in longs {
        if let Some(alias) = common_flag_alias(&long) {
            alias_with_reserved(cmd, &long, alias, reserved);
        }
    }
    for child in cmd.get_subcommands_mut() {
        alias_subtree(child, reserved);
    }
}
