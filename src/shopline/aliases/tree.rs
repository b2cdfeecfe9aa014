//! Applies the alias tables to a fully built command tree.
//!
//! The walk is depth-first pre-order. For each child of a parent it tries, in order, the
//! verb candidates for the child's name, then (for direct children of the root only) the
//! singular form and the resource candidates. A candidate survives only if no sibling
//! already answers to it, so after the walk every name and alias under one parent is
//! unique. Dropped candidates are logged at debug level and otherwise ignored.

use super::{resource_aliases, singular, verb_aliases};
use clap::Command;
use tracing::debug;

/// Names and aliases of every child of one parent, indexed like the parent's children.
struct Siblings {
    taken: Vec<Vec<String>>,
}

impl Siblings {
    fn of(parent: &Command) -> Self {
        let taken = parent
            .get_subcommands()
            .map(|child| {
                std::iter::once(child.get_name())
                    .chain(child.get_all_aliases())
                    .map(str::to_string)
                    .collect()
            })
            .collect();
        Self { taken }
    }

    /// Records `alias` for the child at `index` if it is free. Returns whether it was.
    fn claim(&mut self, index: usize, alias: &str) -> bool {
        if alias.is_empty() || self.taken.iter().flatten().any(|t| t == alias) {
            return false;
        }
        self.taken[index].push(alias.to_string());
        true
    }
}

fn push_alias(cmd: &mut Command, alias: &str) {
    let owned = std::mem::take(cmd);
    *cmd = owned.alias(alias.to_string());
}

/// Adds `alias` to the child of `parent` named `child` unless it is empty, already used by
/// the child itself, or used as a name or alias by any sibling. Returns whether the
/// alias was added; a missing child is a no-op.
pub fn add_alias_if_safe(parent: &mut Command, child: &str, alias: &str) -> bool {
    let mut siblings = Siblings::of(parent);
    let Some(index) = parent.get_subcommands().position(|c| c.get_name() == child) else {
        return false;
    };
    if !siblings.claim(index, alias) {
        debug!(command = child, alias, "alias dropped, already taken");
        return false;
    }
    if let Some(cmd) = parent.get_subcommands_mut().nth(index) {
        push_alias(cmd, alias);
    }
    true
}

/// Adds verb, singular and resource aliases across the whole tree.
///
/// Meant to be called once, after every command has been registered. Calling it again
/// adds nothing because every candidate is then already taken.
pub fn apply_aliases(mut root: Command) -> Command {
    alias_children(&mut root, true);
    root
}

fn alias_children(parent: &mut Command, is_root: bool) {
    let mut siblings = Siblings::of(parent);

    for (index, child) in parent.get_subcommands_mut().enumerate() {
        let name = child.get_name().to_string();

        let mut candidates: Vec<String> =
            verb_aliases(&name).iter().map(|a| a.to_string()).collect();
        if is_root {
            let single = singular(&name);
            if single != name {
                candidates.push(single);
            }
            candidates.extend(resource_aliases(&name).iter().map(|a| a.to_string()));
        }

        for candidate in candidates {
            if siblings.claim(index, &candidate) {
                push_alias(child, &candidate);
            } else {
                debug!(command = %name, alias = %candidate, "alias dropped, already taken");
            }
        }

        alias_children(child, false);
    }
}
