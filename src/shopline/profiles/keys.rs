//! Lookup keys: the normalized spellings a store can be referred to by.
//!
//! A profile name, a store handle and whatever the user passed to `--store` are each
//! expanded into a key set. Two values refer to the same store when their sets intersect,
//! so `demo-shop`, `demo-shop.myshopline.com` and
//! `https://demo-shop.myshopline.com/admin/123` all meet at `demo-shop`.

use std::collections::BTreeSet;
use url::Url;

/// Platform domains whose removal leaves the bare store handle.
const PLATFORM_SUFFIXES: &[&str] = &[
    ".myshopline.com",
    ".myshoplineapp.com",
    ".shoplineapp.com",
    ".shoplineapp.cn",
];

pub type KeySet = BTreeSet<String>;

fn add_key(out: &mut KeySet, raw: &str) {
    let key = raw.trim().to_lowercase();
    let key = key.trim_matches('/');
    if !key.is_empty() {
        out.insert(key.to_string());
    }
}

fn add_host_keys(out: &mut KeySet, host: &str) {
    for suffix in PLATFORM_SUFFIXES {
        if let Some(handle) = host.strip_suffix(suffix) {
            add_key(out, handle);
        }
    }
    if let Some((label, _)) = host.split_once('.') {
        if !label.is_empty() && label != "www" && label != "admin" {
            add_key(out, label);
        }
    }
}

fn add_url_keys(out: &mut KeySet, raw: &str) {
    let Ok(parsed) = Url::parse(raw) else {
        return;
    };
    if let Some(host) = parsed.host_str() {
        let host = host.trim().to_lowercase();
        if !host.is_empty() {
            add_key(out, &host);
            add_host_keys(out, &host);
        }
    }

    let path = parsed.path().trim_matches('/');
    if path.is_empty() {
        return;
    }
    let parts: Vec<&str> = path.split('/').collect();
    for (i, part) in parts.iter().enumerate() {
        add_key(out, part);
        if *part == "admin" {
            if let Some(next) = parts.get(i + 1) {
                add_key(out, next);
            }
        }
    }
}

/// Every lookup key derived from `value`. Blank input yields an empty set.
pub fn lookup_keys(value: &str) -> KeySet {
    let mut out = KeySet::new();
    let normalized = value.trim().to_lowercase();
    if normalized.is_empty() {
        return out;
    }

    add_key(&mut out, &normalized);
    let has_scheme = normalized.contains("://");
    let has_path = normalized.contains('/');

    if has_scheme {
        add_url_keys(&mut out, &normalized);
    } else if has_path {
        add_url_keys(&mut out, &format!("https://{}", normalized));
    } else if normalized.contains('.') {
        add_host_keys(&mut out, &normalized);
    }
    out
}
