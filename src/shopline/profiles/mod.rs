//! # Profile Resolution
//!
//! Turns the store token a user typed (`--store`, `SHOPLINE_STORE`, or the configured
//! default) into one stored profile.
//!
//! ## Matching
//!
//! 1. An exact profile name wins immediately (`store.get`).
//! 2. Otherwise every profile whose name or handle shares a [lookup key](keys) with the
//!    request is an **exact** match.
//! 3. Only if nothing matched exactly, profiles whose lowercased name or handle starts
//!    with a request key of three or more characters are **prefix** matches.
//!
//! One match is used (the caller tells the user which one); several matches are an
//! ambiguity error listing up to five candidates. Profiles that are listed but cannot be
//! read are skipped. Nothing is cached: profile sets are small and each invocation
//! resolves once.

use crate::config::Settings;
use crate::error::{Result, ShoplineError};
use crate::store::{CredentialStore, Credentials};
use tracing::{debug, info};

pub mod keys;

pub use keys::{lookup_keys, KeySet};

/// Candidates named in an ambiguity error.
const MAX_CANDIDATES: usize = 5;

/// Minimum request key length for prefix matching.
const MIN_PREFIX_LEN: usize = 3;

/// How a profile was found.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MatchKind {
    /// The request was the profile's exact name, or the only profile was taken.
    Direct,
    /// The request shared a lookup key with the profile's name or handle.
    Exact,
    /// A request key of three or more characters prefixed the name or handle.
    Prefix,
}

#[derive(Debug, Clone)]
pub struct ResolvedProfile {
    pub credentials: Credentials,
    pub requested: String,
    pub kind: MatchKind,
}

impl ResolvedProfile {
    /// The informational line shown when the request did not literally name the profile.
    pub fn note(&self) -> Option<String> {
        match self.kind {
            MatchKind::Direct => None,
            MatchKind::Exact | MatchKind::Prefix => Some(format!(
                "Using profile \"{}\" (matched from \"{}\")",
                self.credentials.name, self.requested
            )),
        }
    }
}

/// Where the API credentials for an invocation come from.
#[derive(Debug, Clone)]
pub enum Selection {
    Profile(ResolvedProfile),
    /// A token from the environment; the credential store was never opened.
    DirectToken(String),
}

fn not_found(requested: &str) -> ShoplineError {
    ShoplineError::ProfileNotFound {
        requested: requested.to_string(),
    }
}

fn has_prefix_match(request: &KeySet, name: &str, handle: &str) -> bool {
    let name = name.trim().to_lowercase();
    let handle = handle.trim().to_lowercase();
    request
        .iter()
        .filter(|key| key.len() >= MIN_PREFIX_LEN)
        .any(|key| name.starts_with(key.as_str()) || handle.starts_with(key.as_str()))
}

fn unique_sorted(mut matches: Vec<Credentials>) -> Vec<Credentials> {
    let mut seen = std::collections::HashSet::new();
    matches.retain(|c| {
        let key = c.name.trim().to_string();
        !key.is_empty() && seen.insert(key)
    });
    matches.sort_by_key(|c| c.name.to_lowercase());
    matches
}

/// Finds every profile matching `requested`, exact matches taking priority over prefix
/// matches.
pub fn find_matches(store: &dyn CredentialStore, requested: &str) -> Result<(Vec<Credentials>, MatchKind)> {
    let request_keys = lookup_keys(requested);
    let mut exact = Vec::new();
    let mut prefix = Vec::new();

    for name in store.list()? {
        let creds = match store.get(&name) {
            Ok(creds) => creds,
            Err(e) => {
                debug!(profile = %name, error = %e, "skipping unreadable profile");
                continue;
            }
        };
        let mut candidate_keys = lookup_keys(&name);
        candidate_keys.extend(lookup_keys(&creds.handle));

        if !request_keys.is_disjoint(&candidate_keys) {
            exact.push(creds);
        } else if has_prefix_match(&request_keys, &name, &creds.handle) {
            prefix.push(creds);
        }
    }

    if exact.is_empty() {
        Ok((unique_sorted(prefix), MatchKind::Prefix))
    } else {
        Ok((unique_sorted(exact), MatchKind::Exact))
    }
}

/// Resolves a store token to exactly one profile.
pub fn resolve(store: &dyn CredentialStore, requested: &str) -> Result<ResolvedProfile> {
    let name = requested.trim();
    if name.is_empty() {
        return Err(not_found(requested));
    }

    if let Ok(credentials) = store.get(name) {
        return Ok(ResolvedProfile {
            credentials,
            requested: requested.to_string(),
            kind: MatchKind::Direct,
        });
    }

    let (mut matches, kind) = find_matches(store, name)?;
    match matches.len() {
        0 => Err(not_found(requested)),
        1 => {
            let credentials = matches.remove(0);
            info!(profile = %credentials.name, requested, ?kind, "resolved profile");
            Ok(ResolvedProfile {
                credentials,
                requested: requested.to_string(),
                kind,
            })
        }
        _ => Err(ShoplineError::AmbiguousProfile {
            requested: requested.to_string(),
            candidates: matches
                .into_iter()
                .take(MAX_CANDIDATES)
                .map(|c| c.name)
                .collect(),
        }),
    }
}

/// Picks the credentials for one invocation.
///
/// The store token is `flag`, else the settings' default store, expanded through the
/// store aliases. Without a token, a direct access token from the environment is used
/// as-is; failing that the store is opened and must contain exactly one profile.
pub fn select_credentials<F>(flag: Option<&str>, settings: &Settings, open_store: F) -> Result<Selection>
where
    F: FnOnce() -> Result<Box<dyn CredentialStore>>,
{
    let token = flag
        .filter(|f| !f.is_empty())
        .map(str::to_string)
        .or_else(|| settings.default_store.clone())
        .unwrap_or_default();
    let token = settings.expand_store_alias(&token);

    if token.is_empty() {
        if let Some(direct) = &settings.direct_token {
            debug!("using direct access token from environment");
            return Ok(Selection::DirectToken(direct.clone()));
        }
    }

    let store = open_store().map_err(|e| ShoplineError::CredentialStore(e.to_string()))?;

    if token.is_empty() {
        let names = store.list()?;
        return match names.as_slice() {
            [] => Err(ShoplineError::NoProfiles),
            [only] => resolve(&*store, only).map(Selection::Profile),
            _ => Err(ShoplineError::MultipleProfiles),
        };
    }

    resolve(&*store, &token).map(Selection::Profile)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::memory::InMemoryCredentialStore;

    fn store(profiles: &[(&str, &str)]) -> InMemoryCredentialStore {
        InMemoryCredentialStore::with_profiles(profiles)
    }

    fn boxed(s: InMemoryCredentialStore) -> impl FnOnce() -> Result<Box<dyn CredentialStore>> {
        move || Ok(Box::new(s) as Box<dyn CredentialStore>)
    }

    #[test]
    fn test_exact_name_fast_path() {
        let s = store(&[("demo", "demo-shop")]);
        let resolved = resolve(&s, "demo").unwrap();
        assert_eq!(resolved.kind, MatchKind::Direct);
        assert_eq!(resolved.note(), None);
    }

    #[test]
    fn test_blank_request_not_found() {
        let s = store(&[("demo", "demo-shop")]);
        assert!(matches!(
            resolve(&s, "  "),
            Err(ShoplineError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_resolve_by_admin_url() {
        let s = store(&[("main", "demo-shop"), ("other", "other-shop")]);
        let resolved = resolve(&s, "https://demo-shop.myshoplineapp.com/admin/123").unwrap();
        assert_eq!(resolved.credentials.name, "main");
        assert_eq!(resolved.kind, MatchKind::Exact);
        assert_eq!(
            resolved.note().unwrap(),
            "Using profile \"main\" (matched from \"https://demo-shop.myshoplineapp.com/admin/123\")"
        );
    }

    #[test]
    fn test_resolve_by_handle() {
        let s = store(&[("main", "demo-shop")]);
        let resolved = resolve(&s, "Demo-Shop").unwrap();
        assert_eq!(resolved.credentials.name, "main");
    }

    #[test]
    fn test_exact_beats_prefix() {
        let s = store(&[("a", "shop"), ("b", "shopper")]);
        let resolved = resolve(&s, "shop.myshopline.com").unwrap();
        assert_eq!(resolved.credentials.name, "a");
        assert_eq!(resolved.kind, MatchKind::Exact);
    }

    #[test]
    fn test_single_prefix_match() {
        let s = store(&[("main", "demo-shop"), ("other", "zeta")]);
        let resolved = resolve(&s, "dem").unwrap();
        assert_eq!(resolved.credentials.name, "main");
        assert_eq!(resolved.kind, MatchKind::Prefix);
    }

    #[test]
    fn test_short_prefix_ignored() {
        let s = store(&[("main", "demo-shop")]);
        assert!(matches!(
            resolve(&s, "de"),
            Err(ShoplineError::ProfileNotFound { .. })
        ));
    }

    #[test]
    fn test_ambiguous_prefix() {
        let s = store(&[("beta", "shop-b"), ("alpha", "shop-a")]);
        match resolve(&s, "sho") {
            Err(ShoplineError::AmbiguousProfile { candidates, .. }) => {
                assert_eq!(candidates, vec!["alpha", "beta"]);
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_ambiguous_candidates_bounded() {
        let profiles: Vec<(String, String)> = (0..8)
            .map(|i| (format!("p{}", i), format!("shop-{}", i)))
            .collect();
        let refs: Vec<(&str, &str)> = profiles
            .iter()
            .map(|(n, h)| (n.as_str(), h.as_str()))
            .collect();
        let s = store(&refs);
        match resolve(&s, "shop") {
            Err(ShoplineError::AmbiguousProfile { candidates, .. }) => {
                assert_eq!(candidates.len(), 5);
                assert_eq!(candidates[0], "p0");
            }
            other => panic!("expected ambiguity, got {:?}", other),
        }
    }

    #[test]
    fn test_unreadable_profiles_skipped() {
        let s = store(&[("main", "demo-shop")]).with_broken("demo-shop-old");
        let resolved = resolve(&s, "demo").unwrap();
        assert_eq!(resolved.credentials.name, "main");
    }

    #[test]
    fn test_ambiguity_message() {
        let err = ShoplineError::AmbiguousProfile {
            requested: "sho".into(),
            candidates: vec!["a".into(), "b".into()],
        };
        let msg = err.to_string();
        assert!(msg.starts_with("profile not found: sho (multiple matches: a, b)"));
        assert!(msg.contains("spl auth ls"));
    }

    #[test]
    fn test_select_direct_token_bypasses_store() {
        let settings = Settings {
            direct_token: Some("env-token".into()),
            ..Settings::default()
        };
        let selection = select_credentials(None, &settings, || {
            Err(ShoplineError::Usage("store must not be opened".into()))
        })
        .unwrap();
        assert!(matches!(selection, Selection::DirectToken(t) if t == "env-token"));
    }

    #[test]
    fn test_select_requested_store_ignores_direct_token() {
        let settings = Settings {
            direct_token: Some("env-token".into()),
            ..Settings::default()
        };
        let selection =
            select_credentials(Some("demo"), &settings, boxed(store(&[("demo", "d")]))).unwrap();
        assert!(matches!(selection, Selection::Profile(p) if p.credentials.name == "demo"));
    }

    #[test]
    fn test_select_store_open_failure() {
        let err = select_credentials(Some("demo"), &Settings::default(), || {
            Err(ShoplineError::Usage("keyring locked".into()))
        })
        .unwrap_err();
        assert_eq!(err.to_string(), "failed to open credential store: keyring locked");
    }

    #[test]
    fn test_select_without_token() {
        let settings = Settings::default();
        assert!(matches!(
            select_credentials(None, &settings, boxed(store(&[]))),
            Err(ShoplineError::NoProfiles)
        ));
        assert!(matches!(
            select_credentials(None, &settings, boxed(store(&[("a", "x"), ("b", "y")]))),
            Err(ShoplineError::MultipleProfiles)
        ));
        let only = select_credentials(None, &settings, boxed(store(&[("a", "x")]))).unwrap();
        assert!(matches!(only, Selection::Profile(p) if p.kind == MatchKind::Direct));
    }

    #[test]
    fn test_select_uses_default_store_and_aliases() {
        let settings = Settings {
            default_store: Some("ds".into()),
            store_aliases: vec![("ds".into(), "demo".into())],
            ..Settings::default()
        };
        let selection =
            select_credentials(None, &settings, boxed(store(&[("demo", "d"), ("x", "y")])))
                .unwrap();
        assert!(matches!(selection, Selection::Profile(p) if p.credentials.name == "demo"));
    }
}
