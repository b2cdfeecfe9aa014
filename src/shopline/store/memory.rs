use super::{CredentialStore, Credentials};
use crate::error::{Result, ShoplineError};
use std::collections::BTreeMap;

/// Credential store that lives only as long as the value. Used in tests.
#[derive(Debug, Default, Clone)]
pub struct InMemoryCredentialStore {
    profiles: BTreeMap<String, Credentials>,
    /// Names whose `get` fails even though they are listed.
    broken: Vec<String>,
}

impl InMemoryCredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a store from `(name, handle)` pairs.
    pub fn with_profiles(profiles: &[(&str, &str)]) -> Self {
        let mut store = Self::new();
        for (name, handle) in profiles {
            store
                .profiles
                .insert(name.to_string(), Credentials::new(*name, *handle, "token"));
        }
        store
    }

    /// Lists `name` but fails every `get` for it, like a corrupted backend entry.
    pub fn with_broken(mut self, name: &str) -> Self {
        self.broken.push(name.to_string());
        self
    }
}

impl CredentialStore for InMemoryCredentialStore {
    fn list(&self) -> Result<Vec<String>> {
        let mut names: Vec<String> = self.profiles.keys().cloned().collect();
        names.extend(self.broken.iter().cloned());
        names.sort();
        Ok(names)
    }

    fn get(&self, name: &str) -> Result<Credentials> {
        if self.broken.iter().any(|b| b == name) {
            return Err(ShoplineError::CredentialStore(format!(
                "entry {} is unreadable",
                name
            )));
        }
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ShoplineError::ProfileNotFound {
                requested: name.to_string(),
            })
    }

    fn save(&mut self, creds: &Credentials) -> Result<()> {
        self.profiles.insert(creds.name.clone(), creds.clone());
        Ok(())
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        self.profiles
            .remove(name)
            .map(|_| ())
            .ok_or_else(|| ShoplineError::ProfileNotFound {
                requested: name.to_string(),
            })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_with_profiles() {
        let store = InMemoryCredentialStore::with_profiles(&[("b", "bh"), ("a", "ah")]);
        assert_eq!(store.list().unwrap(), vec!["a", "b"]);
        assert_eq!(store.get("a").unwrap().handle, "ah");
    }

    #[test]
    fn test_broken_entries_listed_but_unreadable() {
        let store = InMemoryCredentialStore::with_profiles(&[("a", "ah")]).with_broken("z");
        assert_eq!(store.list().unwrap(), vec!["a", "z"]);
        assert!(store.get("z").is_err());
    }

    #[test]
    fn test_save_and_delete() {
        let mut store = InMemoryCredentialStore::new();
        store.save(&Credentials::new("a", "ah", "t")).unwrap();
        assert!(store.get("a").is_ok());
        store.delete("a").unwrap();
        assert!(store.delete("a").is_err());
    }
}
