//! `spl help-json [path…]`: a command described as JSON, for scripts and agents.
//!
//! Global flags are listed on every command (marked `global`). Each flag alias appears
//! as its own hidden entry with `alias_of` naming the flag it stands for. No `spl` flag
//! is deprecated, so `deprecated` is always `false`; the key is kept for consumers that
//! read it.

use clap::{Arg, Command};
use serde::Serialize;
use shopline::command_tree::find_command;
use shopline::error::{Result, ShoplineError};

#[derive(Debug, Serialize)]
pub(super) struct HelpFlag {
    pub name: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub short: Option<char>,
    #[serde(rename = "type")]
    pub kind: &'static str,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default: Option<String>,
    pub help: String,
    pub required: bool,
    pub global: bool,
    pub hidden: bool,
    pub deprecated: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub alias_of: Option<String>,
}

#[derive(Debug, Serialize)]
pub(super) struct HelpArg {
    pub name: String,
    pub required: bool,
    pub help: String,
}

#[derive(Debug, Serialize)]
pub(super) struct HelpCommand {
    pub name: String,
    pub aliases: Vec<String>,
    pub about: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub args: Vec<HelpArg>,
    pub flags: Vec<HelpFlag>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub subcommands: Vec<HelpCommand>,
}

fn is_builtin(arg: &Arg) -> bool {
    matches!(arg.get_id().as_str(), "help" | "version")
}

fn help_text(arg: &Arg) -> String {
    arg.get_help().map(|h| h.to_string()).unwrap_or_default()
}

fn collect_flags(cmd: &Command) -> Vec<HelpFlag> {
    let mut flags = Vec::new();
    for arg in cmd.get_arguments() {
        let Some(long) = arg.get_long() else {
            continue;
        };
        if is_builtin(arg) {
            continue;
        }
        let takes_value = arg.get_action().takes_values();
        let flag = HelpFlag {
            name: long.to_string(),
            short: arg.get_short(),
            kind: if takes_value { "string" } else { "bool" },
            default: arg
                .get_default_values()
                .first()
                .filter(|_| takes_value)
                .map(|v| v.to_string_lossy().into_owned()),
            help: help_text(arg),
            required: arg.is_required_set(),
            global: arg.is_global_set(),
            hidden: arg.is_hide_set(),
            deprecated: false,
            alias_of: None,
        };
        for alias in arg.get_all_aliases().unwrap_or_default() {
            flags.push(HelpFlag {
                name: alias.to_string(),
                short: None,
                default: None,
                required: false,
                hidden: true,
                alias_of: Some(flag.name.clone()),
                help: flag.help.clone(),
                ..flag
            });
        }
        flags.push(flag);
    }
    flags.sort_by(|a, b| a.name.cmp(&b.name));
    flags
}

fn collect_args(cmd: &Command) -> Vec<HelpArg> {
    cmd.get_positionals()
        .map(|arg| HelpArg {
            name: arg.get_id().as_str().to_string(),
            required: arg.is_required_set(),
            help: help_text(arg),
        })
        .collect()
}

/// Describes `cmd` and, recursively, its visible subcommands sorted by name.
pub(super) fn describe(cmd: &Command) -> HelpCommand {
    let mut subcommands: Vec<HelpCommand> = cmd
        .get_subcommands()
        .filter(|sub| !sub.is_hide_set() && sub.get_name() != "help")
        .map(describe)
        .collect();
    subcommands.sort_by(|a, b| a.name.cmp(&b.name));

    HelpCommand {
        name: cmd.get_name().to_string(),
        aliases: cmd.get_all_aliases().map(str::to_string).collect(),
        about: cmd.get_about().map(|a| a.to_string()).unwrap_or_default(),
        args: collect_args(cmd),
        flags: collect_flags(cmd),
        subcommands,
    }
}

/// Resolves `path` (aliases allowed) against a built copy of `root` and describes it.
pub(super) fn help_for(root: &Command, path: &[String]) -> Result<HelpCommand> {
    let mut built = root.clone();
    built.build();
    let cmd = find_command(&built, path).ok_or_else(|| {
        ShoplineError::Usage(format!("unknown command: {}", path.join(" ")))
    })?;
    Ok(describe(cmd))
}

#[cfg(test)]
mod tests {
    use super::*;
    use shopline::command_tree::build_command_tree;

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    fn flag<'a>(help: &'a HelpCommand, name: &str) -> &'a HelpFlag {
        help.flags
            .iter()
            .find(|f| f.name == name)
            .unwrap_or_else(|| panic!("no flag {}", name))
    }

    #[test]
    fn test_alias_path_resolves() {
        let help = help_for(&build_command_tree(), &path(&["o", "l"])).unwrap();
        assert_eq!(help.name, "list");
        assert_eq!(help.aliases, vec!["ls", "l"]);
    }

    #[test]
    fn test_flag_alias_entries() {
        let help = help_for(&build_command_tree(), &path(&["orders", "list"])).unwrap();
        let ps = flag(&help, "ps");
        assert!(ps.hidden);
        assert_eq!(ps.alias_of.as_deref(), Some("page-size"));
        let page_size = flag(&help, "page-size");
        assert!(!page_size.hidden);
        assert_eq!(page_size.alias_of, None);
    }

    #[test]
    fn test_globals_are_listed() {
        let help = help_for(&build_command_tree(), &path(&["orders", "get"])).unwrap();
        assert!(flag(&help, "store").global);
        assert_eq!(flag(&help, "out").alias_of.as_deref(), Some("output"));
        assert_eq!(flag(&help, "color").default.as_deref(), Some("auto"));
        assert_eq!(help.args[0].name, "id");
        assert!(help.args[0].required);
    }

    #[test]
    fn test_flags_and_subcommands_sorted() {
        let help = help_for(&build_command_tree(), &[]).unwrap();
        let names: Vec<&str> = help.subcommands.iter().map(|s| s.name.as_str()).collect();
        let mut sorted = names.clone();
        sorted.sort();
        assert_eq!(names, sorted);
        assert!(!names.contains(&"help"));

        let flags: Vec<&str> = help.flags.iter().map(|f| f.name.as_str()).collect();
        let mut sorted = flags.clone();
        sorted.sort();
        assert_eq!(flags, sorted);
    }

    #[test]
    fn test_flag_json_shape() {
        let help = help_for(&build_command_tree(), &path(&["orders", "list"])).unwrap();
        let json = serde_json::to_value(flag(&help, "ps")).unwrap();
        assert_eq!(json["type"], "string");
        assert_eq!(json["deprecated"], false);
        assert_eq!(json["alias_of"], "page-size");
        assert_eq!(json["hidden"], true);
    }

    #[test]
    fn test_unknown_path() {
        assert!(help_for(&build_command_tree(), &path(&["orders", "nope"])).is_err());
    }
}
