//! A parsed command line, detached from clap.
//!
//! [`Invocation`] holds the canonical command path, the global flags, and the values of
//! the leaf command's own arguments keyed by long name (positionals by id). Every
//! accessor checks that the command actually declares the name it is asked for, so a
//! typo in a command body fails loudly with [`ShoplineError::UnknownFlag`] instead of
//! silently reading nothing.

use crate::command_tree::{global_arg_ids, GlobalArgs};
use crate::error::{Result, ShoplineError};
use clap::parser::ValueSource;
use clap::{ArgMatches, Command, FromArgMatches};
use std::collections::{BTreeMap, BTreeSet};

/// One local argument's values.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ArgValue {
    pub values: Vec<String>,
    /// Set explicitly on the command line (directly or through an alias).
    pub changed: bool,
    pub positional: bool,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
}

/// How results should be printed, settled by the pre-run hooks.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct OutputSettings {
    pub format: OutputFormat,
    /// jq filter applied to JSON output, field aliases expanded.
    pub query: Option<String>,
    /// Field projection from `--fields`, canonical names.
    pub fields: Vec<String>,
    pub items_only: bool,
}

#[derive(Debug, Clone, Default)]
pub struct Invocation {
    /// Canonical names from the root's child down to the invoked command.
    pub path: Vec<String>,
    pub globals: GlobalArgs,
    pub output: OutputSettings,
    explicit_globals: BTreeSet<String>,
    values: BTreeMap<String, ArgValue>,
    positional_order: Vec<String>,
}

fn is_builtin(id: &str) -> bool {
    id == "help" || id == "version"
}

impl Invocation {
    /// Builds an invocation from the matches of a parse of `root`.
    pub fn from_matches(root: &Command, matches: &ArgMatches) -> Result<Self> {
        let mut path = Vec::new();
        let mut leaf_cmd = root;
        let mut leaf = matches;
        while let Some((name, sub)) = leaf.subcommand() {
            path.push(name.to_string());
            leaf = sub;
            if let Some(cmd) = leaf_cmd.find_subcommand(name) {
                leaf_cmd = cmd;
            }
        }

        let globals =
            GlobalArgs::from_arg_matches(leaf).map_err(|e| ShoplineError::Usage(e.to_string()))?;
        let explicit_globals = global_arg_ids()
            .into_iter()
            .filter(|(id, _)| leaf.value_source(id) == Some(ValueSource::CommandLine))
            .map(|(_, long)| long)
            .collect();

        let mut inv = Self {
            path,
            globals,
            explicit_globals,
            ..Self::default()
        };

        for arg in leaf_cmd.get_arguments() {
            let id = arg.get_id().as_str();
            if arg.is_global_set() || is_builtin(id) {
                continue;
            }
            let key = arg.get_long().unwrap_or(id).to_string();
            let values = leaf
                .try_get_raw(id)
                .ok()
                .flatten()
                .map(|raw| raw.map(|v| v.to_string_lossy().into_owned()).collect())
                .unwrap_or_default();
            let value = ArgValue {
                values,
                changed: leaf.value_source(id) == Some(ValueSource::CommandLine),
                positional: arg.is_positional(),
            };
            inv.declare(&key, value);
        }
        Ok(inv)
    }

    /// Creates an invocation for `path` with default globals and no arguments.
    pub fn new(path: &[&str]) -> Self {
        Self {
            path: path.iter().map(|p| p.to_string()).collect(),
            ..Self::default()
        }
    }

    /// Declares an argument. Positionals keep their declaration order.
    pub fn declare(&mut self, key: &str, value: ArgValue) {
        if value.positional && !self.positional_order.iter().any(|k| k == key) {
            self.positional_order.push(key.to_string());
        }
        self.values.insert(key.to_string(), value);
    }

    pub fn command_name(&self) -> String {
        self.path.join(" ")
    }

    fn unknown(&self, name: &str) -> ShoplineError {
        ShoplineError::UnknownFlag {
            command: self.command_name(),
            flag: name.to_string(),
        }
    }

    fn value(&self, name: &str) -> Result<&ArgValue> {
        self.values.get(name).ok_or_else(|| self.unknown(name))
    }

    /// Whether the command declares `name`.
    pub fn has(&self, name: &str) -> bool {
        self.values.contains_key(name)
    }

    pub fn string(&self, name: &str) -> Result<Option<String>> {
        Ok(self.value(name)?.values.first().cloned())
    }

    pub fn strings(&self, name: &str) -> Result<Vec<String>> {
        Ok(self.value(name)?.values.clone())
    }

    pub fn u32(&self, name: &str) -> Result<Option<u32>> {
        match self.value(name)?.values.first() {
            None => Ok(None),
            Some(raw) => raw.parse().map(Some).map_err(|_| {
                ShoplineError::Usage(format!("invalid value '{}' for --{}", raw, name))
            }),
        }
    }

    pub fn flag(&self, name: &str) -> Result<bool> {
        Ok(self
            .value(name)?
            .values
            .first()
            .is_some_and(|v| v == "true"))
    }

    pub fn changed(&self, name: &str) -> Result<bool> {
        Ok(self.value(name)?.changed)
    }

    /// Replaces the values of `name` and marks it changed.
    pub fn set(&mut self, name: &str, values: Vec<String>) -> Result<()> {
        let unknown = self.unknown(name);
        let slot = self.values.get_mut(name).ok_or(unknown)?;
        slot.values = values;
        slot.changed = true;
        Ok(())
    }

    /// Positional values in declaration order.
    pub fn args(&self) -> Vec<String> {
        self.positional_order
            .iter()
            .filter_map(|k| self.values.get(k))
            .flat_map(|v| v.values.iter().cloned())
            .collect()
    }

    pub(crate) fn values_mut(&mut self) -> impl Iterator<Item = (&str, &mut ArgValue)> {
        self.values.iter_mut().map(|(k, v)| (k.as_str(), v))
    }

    /// Whether a global flag (by long name) was given on the command line.
    pub fn global_changed(&self, long: &str) -> bool {
        self.explicit_globals.contains(long)
    }

    pub fn mark_global(&mut self, long: &str) {
        self.explicit_globals.insert(long.to_string());
    }
}
