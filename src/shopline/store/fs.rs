use super::{CredentialStore, Credentials};
use crate::error::{Result, ShoplineError};
use std::collections::BTreeMap;
use std::fs::{self, File, OpenOptions};
use std::io::{self, Write};
use std::path::{Path, PathBuf};

const CREDENTIALS_FILENAME: &str = "credentials.json";

/// Profiles kept in `credentials.json`, keyed by profile name.
pub struct FileCredentialStore {
    path: PathBuf,
    profiles: BTreeMap<String, Credentials>,
}

impl FileCredentialStore {
    /// Opens the store in `dir`. A missing file is an empty store; an unreadable or
    /// malformed one is an error.
    pub fn open<P: AsRef<Path>>(dir: P) -> Result<Self> {
        let path = dir.as_ref().join(CREDENTIALS_FILENAME);
        let profiles = if path.exists() {
            let content = fs::read_to_string(&path).map_err(ShoplineError::Io)?;
            serde_json::from_str(&content).map_err(ShoplineError::Serialization)?
        } else {
            BTreeMap::new()
        };
        Ok(Self { path, profiles })
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn persist(&self) -> Result<()> {
        if let Some(dir) = self.path.parent() {
            if !dir.exists() {
                create_private_dir(dir).map_err(ShoplineError::Io)?;
            }
        }
        let content =
            serde_json::to_string_pretty(&self.profiles).map_err(ShoplineError::Serialization)?;
        let mut file = open_private(&self.path).map_err(ShoplineError::Io)?;
        file.write_all(content.as_bytes()).map_err(ShoplineError::Io)?;
        Ok(())
    }
}

/// Creates `dir` and any missing parents, readable by the owner only.
pub(crate) fn create_private_dir(dir: &Path) -> io::Result<()> {
    let mut builder = fs::DirBuilder::new();
    builder.recursive(true);
    #[cfg(unix)]
    {
        use std::os::unix::fs::DirBuilderExt;
        builder.mode(0o700);
    }
    builder.create(dir)
}

/// Opens `path` for rewriting as an owner-only file. Files left with looser
/// permissions by older versions are tightened.
#[cfg(unix)]
fn open_private(path: &Path) -> io::Result<File> {
    use std::os::unix::fs::{OpenOptionsExt, PermissionsExt};

    let file = OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .mode(0o600)
        .open(path)?;
    file.set_permissions(fs::Permissions::from_mode(0o600))?;
    Ok(file)
}

#[cfg(not(unix))]
fn open_private(path: &Path) -> io::Result<File> {
    OpenOptions::new()
        .write(true)
        .create(true)
        .truncate(true)
        .open(path)
}

impl CredentialStore for FileCredentialStore {
    fn list(&self) -> Result<Vec<String>> {
        Ok(self.profiles.keys().cloned().collect())
    }

    fn get(&self, name: &str) -> Result<Credentials> {
        self.profiles
            .get(name)
            .cloned()
            .ok_or_else(|| ShoplineError::ProfileNotFound {
                requested: name.to_string(),
            })
    }

    fn save(&mut self, creds: &Credentials) -> Result<()> {
        self.profiles.insert(creds.name.clone(), creds.clone());
        self.persist()
    }

    fn delete(&mut self, name: &str) -> Result<()> {
        if self.profiles.remove(name).is_none() {
            return Err(ShoplineError::ProfileNotFound {
                requested: name.to_string(),
            });
        }
        self.persist()
    }
}
