//! Pre-run hooks.
//!
//! After parsing and before any command body runs, the invocation passes through a fixed
//! chain of hooks. Each one may rewrite values or reject the invocation; the first error
//! stops the chain. Order matters: IDs are normalized first, then `--limit` is mapped,
//! then the non-interactive flags are settled, and output settings are computed last.

use crate::config::validate_output;
use crate::error::{Result, ShoplineError};
use crate::fields::{normalize_query, parse_fields};
use crate::ids::{is_id_flag, normalize_id_token};
use crate::invocation::{Invocation, OutputFormat, OutputSettings};
use std::fs;
use std::io::Read;
use tracing::debug;

/// Largest accepted `--query-file`.
const MAX_QUERY_FILE_SIZE: u64 = 1 << 20;

/// State handed to every hook.
pub struct PreRun<'a> {
    pub inv: &'a mut Invocation,
    /// Read by `--query-file -`.
    pub input: &'a mut dyn Read,
    /// Output format from settings, used when `--output` is absent.
    pub default_output: &'a str,
}

pub type Hook = fn(&mut PreRun<'_>) -> Result<()>;

pub const PRE_RUN_HOOKS: &[Hook] = &[
    normalize_ids,
    apply_limit,
    apply_non_interactive,
    setup_query,
];

/// Runs every hook in order.
pub fn run_pre_run(pre: &mut PreRun<'_>) -> Result<()> {
    PRE_RUN_HOOKS.iter().try_for_each(|hook| hook(pre))
}

/// Strips `[prefix:$id]` decoration from positionals and ID flags.
pub fn normalize_ids(pre: &mut PreRun<'_>) -> Result<()> {
    for (key, value) in pre.inv.values_mut() {
        if !value.positional && !is_id_flag(key) {
            continue;
        }
        for v in value.values.iter_mut() {
            let (raw, matched) = normalize_id_token(v);
            if matched {
                debug!(arg = key, token = %v, id = %raw, "normalized id token");
                *v = raw;
            }
        }
    }
    Ok(())
}

/// Maps `--limit` onto `--page-size` for commands that declare it.
pub fn apply_limit(pre: &mut PreRun<'_>) -> Result<()> {
    let Some(limit) = pre.inv.globals.limit else {
        return Ok(());
    };
    if limit < 0 {
        return Err(ShoplineError::Usage("limit must be >= 0".into()));
    }
    if pre.inv.has("page-size") {
        pre.inv.set("page-size", vec![limit.to_string()])?;
    }
    Ok(())
}

/// `--force` implies `--yes`; `--results-only` implies `--items-only`.
pub fn apply_non_interactive(pre: &mut PreRun<'_>) -> Result<()> {
    let inv = &mut *pre.inv;
    if inv.globals.force {
        inv.globals.yes = true;
    }
    if inv.globals.results_only && !inv.global_changed("items-only") {
        inv.globals.items_only = true;
    }
    Ok(())
}

fn non_empty(value: &Option<String>) -> Option<&str> {
    value.as_deref().map(str::trim).filter(|v| !v.is_empty())
}

fn read_query_file(path: &str, input: &mut dyn Read) -> Result<String> {
    let path = path.trim();
    if path.is_empty() {
        return Err(ShoplineError::Usage("--query-file cannot be empty".into()));
    }
    let mut buf = String::new();
    let read = if path == "-" {
        input.take(MAX_QUERY_FILE_SIZE + 1).read_to_string(&mut buf)
    } else {
        fs::File::open(path).and_then(|f| f.take(MAX_QUERY_FILE_SIZE + 1).read_to_string(&mut buf))
    };
    read.map_err(|e| ShoplineError::Usage(format!("failed to read --query-file: {}", e)))?;
    if buf.len() as u64 > MAX_QUERY_FILE_SIZE {
        return Err(ShoplineError::Usage(format!(
            "--query-file too large ({} bytes, max {})",
            buf.len(),
            MAX_QUERY_FILE_SIZE
        )));
    }
    let query = buf.trim();
    if query.is_empty() {
        return Err(ShoplineError::Usage("--query-file is empty".into()));
    }
    Ok(query.to_string())
}

/// Settles the output format, the query and the field projection.
pub fn setup_query(pre: &mut PreRun<'_>) -> Result<()> {
    let inv = &mut *pre.inv;

    let mut format = inv
        .globals
        .output
        .clone()
        .unwrap_or_else(|| pre.default_output.to_string())
        .trim()
        .to_lowercase();
    if format.is_empty() {
        format = "text".into();
    }
    if format == "jsonl" || format == "ndjson" {
        format = "json".into();
    }
    validate_output(&format)?;

    let query = non_empty(&inv.globals.query).map(str::to_string);
    let jq = non_empty(&inv.globals.jq).map(str::to_string);
    let fields_raw = non_empty(&inv.globals.fields).map(str::to_string);
    let query_file = inv.globals.query_file.clone();

    let needs_json = inv.globals.json
        || query.is_some()
        || jq.is_some()
        || query_file.is_some()
        || fields_raw.is_some();
    if needs_json && format != "json" {
        if inv.global_changed("output") {
            return Err(ShoplineError::Usage(
                "--jq/--query/--query-file/--fields require --output json".into(),
            ));
        }
        format = "json".into();
    }

    if query.is_some() && jq.is_some() {
        return Err(ShoplineError::Usage(
            "--jq and --query cannot be used together (use one)".into(),
        ));
    }
    if query_file.is_some() && (query.is_some() || jq.is_some()) {
        return Err(ShoplineError::Usage(
            "--query-file and --query/--jq cannot be used together (use one)".into(),
        ));
    }

    let mut effective = query.or(jq);
    if let Some(path) = &query_file {
        effective = Some(read_query_file(path, &mut *pre.input)?);
    }

    let fields = match fields_raw {
        Some(_) if effective.is_some() => {
            return Err(ShoplineError::Usage(
                "--fields and --query/--jq/--query-file cannot be used together (use one)".into(),
            ))
        }
        Some(raw) => parse_fields(&raw),
        None => Vec::new(),
    };

    inv.output = OutputSettings {
        format: if format == "json" {
            OutputFormat::Json
        } else {
            OutputFormat::Text
        },
        query: effective.map(|q| normalize_query(&q)),
        fields,
        items_only: inv.globals.items_only,
    };
    Ok(())
}
