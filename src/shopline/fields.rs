//! Short aliases for JSON field names.
//!
//! `--fields i,n,ca` and `--query '.it[].n'` accept these in place of the canonical keys
//! (`id,name,created_at`, `.items[].name`). Aliases are lowercase identifiers of at most
//! three characters and each canonical key has at most one alias.

use once_cell::sync::Lazy;
use std::collections::HashMap;

const FIELD_ALIASES: &[(&str, &str)] = &[
    // universal
    ("i", "id"),
    ("n", "name"),
    ("e", "email"),
    ("st", "status"),
    ("ty", "type"),
    ("ct", "content"),
    ("tl", "title"),
    ("ds", "description"),
    ("it", "items"),
    ("mt", "meta"),
    ("dt", "data"),
    ("er", "error"),
    ("ca", "created_at"),
    ("ua", "updated_at"),
    ("hm", "has_more"),
    ("ps", "position"),
    ("tg", "tags"),
    ("cd", "code"),
    ("nt", "note"),
    // orders
    ("on", "order_number"),
    ("oi", "order_id"),
    ("pst", "payment_status"),
    ("fst", "fulfill_status"),
    ("tp", "total_price"),
    ("li", "line_items"),
    ("si", "subtotal_items"),
    // customers
    ("ci", "customer_id"),
    ("ce", "customer_email"),
    ("cn", "customer_name"),
    ("fn", "first_name"),
    ("ln", "last_name"),
    ("ph", "phone"),
    ("cb", "credit_balance"),
    ("am", "accepts_marketing"),
    ("oc", "orders_count"),
    ("ts", "total_spent"),
    // products
    ("pi", "product_id"),
    ("vi", "variant_id"),
    ("pr", "price"),
    ("tt", "title_translations"),
    ("qty", "quantity"),
    ("sk", "sku"),
    ("hd", "handle"),
    ("act", "active"),
    // addresses
    ("ad", "address"),
    ("sa", "shipping_address"),
    ("ba", "billing_address"),
    ("cy", "city"),
    ("pv", "province"),
    ("cty", "country"),
    ("cc", "country_code"),
    ("zp", "zip"),
    // pagination
    ("pg", "page"),
    ("pgs", "page_size"),
    ("tc", "total_count"),
    // money
    ("cu", "currency"),
    ("dv", "discount_value"),
    ("dty", "discount_type"),
    ("tn", "tracking_number"),
    ("sta", "starts_at"),
    ("ena", "ends_at"),
];

static FIELD_INDEX: Lazy<HashMap<&'static str, &'static str>> =
    Lazy::new(|| FIELD_ALIASES.iter().copied().collect());

/// The canonical key for a field alias.
pub fn canonical(alias: &str) -> Option<&'static str> {
    FIELD_INDEX.get(alias).copied()
}

fn canonicalize(token: &str) -> &str {
    canonical(token).unwrap_or(token)
}

/// Rewrites every dot-delimited segment of a field path (`sa.cy` → `shipping_address.city`).
pub fn normalize_path(path: &str) -> String {
    path.split('.')
        .map(canonicalize)
        .collect::<Vec<_>>()
        .join(".")
}

/// Splits a `--fields` value on commas, trims each entry and expands aliases.
pub fn parse_fields(raw: &str) -> Vec<String> {
    raw.split(',')
        .map(str::trim)
        .filter(|f| !f.is_empty())
        .map(normalize_path)
        .collect()
}

/// Function aliases, rewritten only where the token is called (`sl(...)`).
const FUNCTION_ALIASES: &[(&str, &str)] = &[("sl", "select")];

fn canonicalize_function(token: &str) -> &str {
    FUNCTION_ALIASES
        .iter()
        .find(|(alias, _)| *alias == token)
        .map_or(token, |(_, canonical)| *canonical)
}

fn is_ident_start(ch: char) -> bool {
    ch.is_ascii_alphabetic() || ch == '_'
}

/// End of the identifier starting at `start`, or `start` when there is none.
fn ident_end(expr: &str, start: usize) -> usize {
    match expr[start..].chars().next() {
        Some(ch) if is_ident_start(ch) => expr[start..]
            .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
            .map_or(expr.len(), |len| start + len),
        _ => start,
    }
}

/// Expands aliases in a jq expression (`.it[] | sl(.st == "open") | {i}`).
///
/// Rewritten: identifiers directly after a `.`, function aliases followed by `(`, and
/// object shorthand keys inside `{}` (`{i, n}`, not `{i: ...}`). String literals,
/// comments and `$variables` are left alone.
pub fn normalize_query(expr: &str) -> String {
    let mut out = String::with_capacity(expr.len());
    let mut in_string = false;
    let mut escaped = false;
    let mut in_comment = false;
    let mut brace_depth = 0usize;
    let mut i = 0;

    while let Some(ch) = expr[i..].chars().next() {
        if in_comment || in_string {
            out.push(ch);
            i += ch.len_utf8();
            if in_comment {
                in_comment = ch != '\n';
            } else if escaped {
                escaped = false;
            } else if ch == '\\' {
                escaped = true;
            } else if ch == '"' {
                in_string = false;
            }
            continue;
        }

        if ch == '.' {
            out.push(ch);
            i += 1;
            let end = ident_end(expr, i);
            out.push_str(canonicalize(&expr[i..end]));
            i = end;
            continue;
        }

        if is_ident_start(ch) {
            let end = ident_end(expr, i);
            let token = &expr[i..end];
            let next = expr[end..].trim_start().chars().next();
            let rewritten = if out.ends_with('$') {
                token
            } else if next == Some('(') {
                canonicalize_function(token)
            } else if brace_depth > 0 && matches!(next, None | Some(',') | Some('}')) {
                canonicalize(token)
            } else {
                token
            };
            out.push_str(rewritten);
            i = end;
            continue;
        }

        if ch.is_ascii_digit() {
            let end = expr[i..]
                .find(|c: char| !(c.is_ascii_alphanumeric() || c == '_'))
                .map_or(expr.len(), |len| i + len);
            out.push_str(&expr[i..end]);
            i = end;
            continue;
        }

        match ch {
            '"' => in_string = true,
            '#' => in_comment = true,
            '{' => brace_depth += 1,
            '}' => brace_depth = brace_depth.saturating_sub(1),
            _ => {}
        }
        out.push(ch);
        i += ch.len_utf8();
    }
    out
}
