//! Plural-to-singular heuristic used to derive resource aliases.
//!
//! This is an ordered rule list, not a dictionary: English exceptions are out of reach
//! and not attempted. The rule for `us`/`ss`/`is` must run before the generic trailing-`s`
//! rule or words like `status` lose their last letter.
//!
//! A three-letter `"ies"` skips the first rule (length guard) and ends up as `"ie"`.
//! That is known and kept.

/// Returns the singular form of a (lowercase, ASCII) resource name.
pub fn singular(name: &str) -> String {
    if name.len() > 3 && name.ends_with("ies") {
        return format!("{}y", &name[..name.len() - 3]);
    }
    if ["xes", "ses", "ches", "shes"]
        .iter()
        .any(|suffix| name.ends_with(suffix))
    {
        return name[..name.len() - 2].to_string();
    }
    if ["us", "ss", "is"].iter().any(|suffix| name.ends_with(suffix)) {
        return name.to_string();
    }
    if name.len() > 1 {
        if let Some(stem) = name.strip_suffix('s') {
            return stem.to_string();
        }
    }
    name.to_string()
}
