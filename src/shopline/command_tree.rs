//! Builds the full `spl` command tree.
//!
//! Resource commands come from the [registry](crate::schema); the handful of built-in
//! commands (`auth`, `config`, `schema`, `help-json`) are declared here. Aliases are
//! applied in one explicit step at the end of [`build_command_tree`], after every command
//! exists, so sibling collision checks see the whole tree.

use crate::aliases::{apply_aliases, singular};
use crate::flags::{apply_common_flag_aliases, apply_root_flag_aliases};
use crate::schema::{Resource, Verb, RESOURCES};
use clap::{value_parser, Arg, ArgAction, Args, Command};

/// Flags accepted by every command.
#[derive(Args, Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalArgs {
    /// Store profile name, handle or admin URL (or set SHOPLINE_STORE)
    #[arg(short = 's', long, global = true)]
    pub store: Option<String>,

    /// Output format: text|json (env SHOPLINE_OUTPUT)
    #[arg(short = 'o', long, global = true)]
    pub output: Option<String>,

    /// Shorthand for --output json
    #[arg(short = 'j', long, global = true)]
    pub json: bool,

    /// Color mode
    #[arg(long, global = true, default_value = "auto", value_parser = ["auto", "always", "never"])]
    pub color: String,

    /// jq filter applied to JSON output (e.g. '.items[] | .id')
    #[arg(short = 'q', long, global = true)]
    pub query: Option<String>,

    /// Same as --query
    #[arg(long, global = true)]
    pub jq: Option<String>,

    /// Read the query from a file ('-' for stdin)
    #[arg(long, global = true)]
    pub query_file: Option<String>,

    /// Comma separated fields to keep in JSON output
    #[arg(short = 'F', long, global = true)]
    pub fields: Option<String>,

    /// Output only the items array when present
    #[arg(long, global = true)]
    pub items_only: bool,

    /// Same as --items-only
    #[arg(long, global = true)]
    pub results_only: bool,

    /// Skip confirmation prompts
    #[arg(short = 'y', long, global = true)]
    pub yes: bool,

    /// Same as --yes
    #[arg(long, global = true)]
    pub force: bool,

    /// Never prompt
    #[arg(long, global = true)]
    pub no_input: bool,

    /// Limit number of results (sets --page-size on list commands)
    #[arg(short = 'l', long, global = true, allow_negative_numbers = true)]
    pub limit: Option<i64>,

    /// Sort results by field
    #[arg(long, global = true)]
    pub sort_by: Option<String>,

    /// Sort in descending order
    #[arg(short = 'D', long, global = true)]
    pub desc: bool,

    /// Print the planned request instead of sending it
    #[arg(long, global = true)]
    pub dry_run: bool,

    /// Debug logging on stderr
    #[arg(short = 'v', long, global = true)]
    pub verbose: bool,
}

/// `(id, long)` of every global flag.
pub fn global_arg_ids() -> Vec<(String, String)> {
    GlobalArgs::augment_args(Command::new("spl"))
        .get_arguments()
        .map(|arg| {
            let id = arg.get_id().as_str().to_string();
            let long = arg.get_long().map(str::to_string).unwrap_or_else(|| id.clone());
            (id, long)
        })
        .collect()
}

fn flag(long: &'static str, help: &'static str) -> Arg {
    Arg::new(long).long(long).help(help)
}

fn verb_command(resource: &Resource, parent: Option<&Resource>, verb: Verb) -> Command {
    let mut cmd = Command::new(verb.name()).about(verb.about(resource.name));

    if let Some(parent) = parent {
        let key = format!("{}-id", singular(parent.name));
        cmd = cmd.arg(
            Arg::new(key)
                .required(true)
                .help(format!("Parent {} ID", singular(parent.name))),
        );
    }
    if verb.takes_id() {
        cmd = cmd.arg(
            Arg::new("id")
                .required(true)
                .help(format!("{} ID or formatted ID token", singular(resource.name))),
        );
    }
    if verb == Verb::List {
        cmd = cmd
            .arg(
                Arg::new("page")
                    .long("page")
                    .value_parser(value_parser!(u32))
                    .help("Page number"),
            )
            .arg(
                Arg::new("page-size")
                    .long("page-size")
                    .value_parser(value_parser!(u32))
                    .help("Results per page"),
            );
    }
    if verb.takes_filters() {
        for f in resource.filters {
            cmd = cmd.arg(flag(f.long, f.help));
        }
    }
    if verb.takes_body() {
        cmd = cmd
            .arg(flag("body", "JSON request body"))
            .arg(flag("body-file", "Read the JSON body from a file ('-' for stdin)"));
    }
    cmd
}

fn resource_command(resource: &Resource, parent: Option<&Resource>) -> Command {
    let mut cmd = Command::new(resource.name)
        .about(resource.about)
        .subcommand_required(true)
        .arg_required_else_help(true);
    for verb in resource.verbs {
        cmd = cmd.subcommand(verb_command(resource, parent, *verb));
    }
    for nested in resource.nested {
        cmd = cmd.subcommand(resource_command(nested, Some(resource)));
    }
    cmd
}

fn auth_command() -> Command {
    Command::new("auth")
        .about("Manage store credentials")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .subcommand(
            Command::new("login")
                .about("Store credentials for a store")
                .arg(flag("name", "Profile name").required(true))
                .arg(flag("handle", "Store handle (subdomain)").required(true))
                .arg(flag("token", "Access token").required(true))
                .arg(flag("region", "Store region")),
        )
        .subcommand(Command::new("list").about("List stored profiles"))
        .subcommand(
            Command::new("logout")
                .about("Remove a stored profile")
                .arg(Arg::new("profile").required(true).help("Profile name")),
        )
}

fn config_command() -> Command {
    Command::new("config")
        .about("Show or change configuration")
        .arg(Arg::new("key").help("default-store or output"))
        .arg(Arg::new("value").help("New value (empty string clears it)"))
}

fn schema_command() -> Command {
    Command::new("schema")
        .about("Describe the resources the CLI knows about")
        .arg(Arg::new("resource").help("Resource name"))
}

fn help_json_command() -> Command {
    Command::new("help-json")
        .about("Describe a command as JSON")
        .arg(
            Arg::new("command")
                .num_args(0..)
                .action(ArgAction::Append)
                .help("Command path, aliases allowed"),
        )
}

/// The root command with every subcommand, alias and flag alias in place.
pub fn build_command_tree() -> Command {
    let mut root = GlobalArgs::augment_args(
        Command::new("spl")
            .version(env!("CARGO_PKG_VERSION"))
            .about("Command line for the Shopline platform API")
            .subcommand_required(true)
            .arg_required_else_help(true),
    );
    for resource in RESOURCES {
        root = root.subcommand(resource_command(resource, None));
    }
    root = root
        .subcommand(auth_command())
        .subcommand(config_command())
        .subcommand(schema_command())
        .subcommand(help_json_command());

    let mut root = apply_aliases(root);
    apply_root_flag_aliases(&mut root);
    apply_common_flag_aliases(&mut root);
    root
}

/// Follows `path` (names or aliases) from `root`.
pub fn find_command<'a>(root: &'a Command, path: &[String]) -> Option<&'a Command> {
    path.iter()
        .try_fold(root, |cmd, name| cmd.find_subcommand(name.as_str()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::flags::alias_of;
    use crate::invocation::Invocation;

    fn parse(args: &[&str]) -> Invocation {
        let mut root = build_command_tree();
        let matches = root.try_get_matches_from_mut(args).unwrap();
        Invocation::from_matches(&root, &matches).unwrap()
    }

    fn path(parts: &[&str]) -> Vec<String> {
        parts.iter().map(|p| p.to_string()).collect()
    }

    #[test]
    fn test_tree_is_valid() {
        build_command_tree().debug_assert();
    }

    #[test]
    fn test_resource_alias_resolves() {
        assert_eq!(parse(&["spl", "o", "list"]).path, vec!["orders", "list"]);
        assert_eq!(parse(&["spl", "orders", "l"]).path, vec!["orders", "list"]);
        assert_eq!(parse(&["spl", "cust", "ls"]).path, vec!["customers", "list"]);
    }

    #[test]
    fn test_singular_alias_resolves() {
        let inv = parse(&["spl", "product", "get", "p_1"]);
        assert_eq!(inv.path, vec!["products", "get"]);
        assert_eq!(inv.args(), vec!["p_1"]);
    }

    #[test]
    fn test_nested_verb_alias() {
        let inv = parse(&["spl", "o", "mf", "ls", "ord_1"]);
        assert_eq!(inv.path, vec!["orders", "metafields", "list"]);
        assert_eq!(inv.string("order-id").unwrap().as_deref(), Some("ord_1"));
    }

    #[test]
    fn test_no_stray_root_commands() {
        let root = build_command_tree();
        assert!(root.find_subcommand("l").is_none());
        assert!(root.find_subcommand("ls").is_none());
    }

    #[test]
    fn test_siblings_disjoint_everywhere() {
        fn check(cmd: &Command) {
            let mut seen: Vec<&str> = Vec::new();
            for child in cmd.get_subcommands() {
                for name in std::iter::once(child.get_name()).chain(child.get_all_aliases()) {
                    assert!(
                        !seen.contains(&name),
                        "{} is used twice under {}",
                        name,
                        cmd.get_name()
                    );
                    seen.push(name);
                }
                check(child);
            }
        }
        check(&build_command_tree());
    }

    #[test]
    fn test_flag_aliases_installed() {
        let root = build_command_tree();
        assert_eq!(alias_of(&root, "out").as_deref(), Some("output"));
        assert_eq!(alias_of(&root, "dr").as_deref(), Some("dry-run"));
        let list = find_command(&root, &path(&["orders", "list"])).unwrap();
        assert_eq!(alias_of(list, "ps").as_deref(), Some("page-size"));
        assert_eq!(alias_of(list, "S").as_deref(), Some("status"));
        assert_eq!(alias_of(list, "cid").as_deref(), Some("customer-id"));
    }

    #[test]
    fn test_local_flag_alias_marks_original() {
        let inv = parse(&["spl", "orders", "list", "--ps", "5", "--S", "open"]);
        assert_eq!(inv.u32("page-size").unwrap(), Some(5));
        assert!(inv.changed("page-size").unwrap());
        assert_eq!(inv.string("status").unwrap().as_deref(), Some("open"));
    }

    #[test]
    fn test_root_flag_alias() {
        let inv = parse(&["spl", "orders", "list", "--dr", "--out", "json"]);
        assert!(inv.globals.dry_run);
        assert_eq!(inv.globals.output.as_deref(), Some("json"));
        assert!(inv.global_changed("output"));
    }

    #[test]
    fn test_negative_limit_parses() {
        let inv = parse(&["spl", "orders", "list", "--limit", "-1"]);
        assert_eq!(inv.globals.limit, Some(-1));
    }

    #[test]
    fn test_find_command_with_aliases() {
        let root = build_command_tree();
        let cmd = find_command(&root, &path(&["o", "mf", "g"])).unwrap();
        assert_eq!(cmd.get_name(), "get");
        assert!(find_command(&root, &path(&["o", "nope"])).is_none());
    }

    #[test]
    fn test_global_arg_ids() {
        let ids = global_arg_ids();
        assert!(ids.contains(&("items_only".to_string(), "items-only".to_string())));
        assert!(ids.contains(&("store".to_string(), "store".to_string())));
    }
}
