//! # Credential Storage
//!
//! Stored credentials are grouped into named **profiles**, one per store. The
//! [`CredentialStore`] trait is the only thing the profile resolver and the `auth`
//! commands see, so backends can change without touching resolution logic.
//!
//! ## Implementations
//!
//! - [`fs::FileCredentialStore`]: production backend, a single `credentials.json` in the
//!   config directory, keyed by profile name.
//! - [`memory::InMemoryCredentialStore`]: no persistence, used by tests.
//!
//! The on-disk format is an implementation detail and may change between releases.

use crate::error::Result;
use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};

pub mod fs;
pub mod memory;

/// Credentials older than this are flagged by `spl auth ls`.
const MAX_AGE_DAYS: i64 = 90;

/// Authentication data for one store.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Credentials {
    /// Profile key the credentials are stored under.
    pub name: String,
    /// Store subdomain, e.g. `demo-shop` for `demo-shop.myshopline.com`.
    pub handle: String,
    pub access_token: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub region: Option<String>,
    pub created_at: DateTime<Utc>,
}

impl Credentials {
    pub fn new(name: impl Into<String>, handle: impl Into<String>, token: impl Into<String>) -> Self {
        Self {
            name: name.into(),
            handle: handle.into(),
            access_token: token.into(),
            region: None,
            created_at: Utc::now(),
        }
    }

    /// True once the credentials are older than 90 days.
    pub fn is_old(&self) -> bool {
        Utc::now() - self.created_at > Duration::days(MAX_AGE_DAYS)
    }
}

/// Abstract interface for credential storage.
pub trait CredentialStore {
    /// Names of all stored profiles, sorted.
    fn list(&self) -> Result<Vec<String>>;

    /// Credentials stored under exactly `name`.
    fn get(&self, name: &str) -> Result<Credentials>;

    /// Create or replace the profile named `creds.name`.
    fn save(&mut self, creds: &Credentials) -> Result<()>;

    /// Remove a profile. Removing a missing profile is an error.
    fn delete(&mut self, name: &str) -> Result<()>;
}
