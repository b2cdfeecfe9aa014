//! Formatted ID tokens.
//!
//! Text output decorates identifiers as `[prefix:$id]` (`[order:$ord_999]`) so they stand
//! out and say what they identify. Those tokens are accepted back as input: the pre-run
//! hooks strip the decoration from positionals and ID flags before a command body runs.

/// Renders `id` as a formatted ID token.
pub fn format_id(prefix: &str, id: &str) -> String {
    format!("[{}:${}]", prefix, id)
}

/// Strips the `[prefix:$id]` decoration.
///
/// Returns the raw id and `true` on a match, or the token unchanged and `false` for any
/// other shape, including half-decorated input.
pub fn normalize_id_token(token: &str) -> (String, bool) {
    let Some(inner) = token
        .strip_prefix('[')
        .and_then(|rest| rest.strip_suffix(']'))
    else {
        return (token.to_string(), false);
    };
    match inner.split_once(":$") {
        Some((prefix, id)) if !prefix.is_empty() && is_plain(prefix) && is_plain(id) => {
            (id.to_string(), true)
        }
        _ => (token.to_string(), false),
    }
}

fn is_plain(part: &str) -> bool {
    !part.contains(['[', ']', '$'])
}

/// Whether a flag's values are identifiers that should be normalized.
pub fn is_id_flag(name: &str) -> bool {
    name == "id" || name == "ids" || name.ends_with("-id") || name.ends_with("-ids")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_normalize_decorated() {
        assert_eq!(
            normalize_id_token("[order:$ord_999]"),
            ("ord_999".to_string(), true)
        );
        assert_eq!(
            normalize_id_token("[draft-order:$12:34]"),
            ("12:34".to_string(), true)
        );
    }

    #[test]
    fn test_plain_passes_through() {
        assert_eq!(normalize_id_token("ord_999"), ("ord_999".to_string(), false));
        assert_eq!(normalize_id_token(""), (String::new(), false));
    }

    #[test]
    fn test_partial_decorations_rejected() {
        for token in [
            "order:$ord_999]",
            "[order:$ord_999",
            "[order:ord_999]",
            "[order$ord_999]",
            "[:$ord_999]",
            "[",
            "[]",
            "[order:$a],[order:$b]",
            "[a:$x]y]",
            "[[a:$x]",
            "[a:$$x]",
            "[a$:$x]",
        ] {
            assert_eq!(normalize_id_token(token), (token.to_string(), false), "{}", token);
        }
    }

    #[test]
    fn test_format_then_normalize() {
        for id in ["1", "ord_999", "abc-def", "6543210987"] {
            assert_eq!(
                normalize_id_token(&format_id("x", id)),
                (id.to_string(), true)
            );
            assert_eq!(normalize_id_token(id), (id.to_string(), false));
        }
    }

    #[test]
    fn test_is_id_flag() {
        assert!(is_id_flag("id"));
        assert!(is_id_flag("ids"));
        assert!(is_id_flag("customer-id"));
        assert!(is_id_flag("order-ids"));
        assert!(!is_id_flag("valid"));
        assert!(!is_id_flag("identifier"));
        assert!(!is_id_flag("identity"));
        assert!(!is_id_flag("paid"));
    }
}
