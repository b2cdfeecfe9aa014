//! Configuration: the `config.json` file plus environment overrides.
//!
//! [`ShoplineConfig`] is what lives on disk. [`Settings`] is what the rest of the
//! program reads: the file merged with the environment, environment first. Environment
//! access goes through a lookup function so tests never touch the process environment.

use crate::error::{Result, ShoplineError};
use crate::store::fs::create_private_dir;
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fs;
use std::path::{Path, PathBuf};

const CONFIG_FILENAME: &str = "config.json";

pub const ENV_STORE: &str = "SHOPLINE_STORE";
pub const ENV_STORE_ALIASES: &str = "SHOPLINE_STORE_ALIASES";
pub const ENV_OUTPUT: &str = "SHOPLINE_OUTPUT";
pub const ENV_CONFIG_DIR: &str = "SHOPLINE_CONFIG_DIR";
pub const ENV_API_BASE_URL: &str = "SHOPLINE_API_BASE_URL";
pub const ENV_LOG: &str = "SHOPLINE_LOG";

/// Direct access token variables, first non-blank wins.
pub const ENV_DIRECT_TOKENS: &[&str] = &[
    "SHOPLINE_ACCESS_TOKEN",
    "SHOPLINE_API_TOKEN",
    "SHOPLINE_TOKEN",
];

/// Keys accepted by `spl config <key> [value]`.
pub const CONFIG_KEYS: &[&str] = &["default-store", "output"];

/// Persistent configuration, stored in `config.json` in the config directory.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct ShoplineConfig {
    /// Profile used when neither `--store` nor `SHOPLINE_STORE` is given.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub default_store: Option<String>,

    /// Short store names, expanded before profile resolution.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub store_aliases: BTreeMap<String, String>,

    /// Default output format (`text` or `json`).
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub output: Option<String>,
}

impl ShoplineConfig {
    /// Load config from the given directory, or return defaults if not found
    pub fn load<P: AsRef<Path>>(config_dir: P) -> Result<Self> {
        let config_path = config_dir.as_ref().join(CONFIG_FILENAME);
        if !config_path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(&config_path).map_err(ShoplineError::Io)?;
        let config = serde_json::from_str(&content).map_err(ShoplineError::Serialization)?;
        Ok(config)
    }

    /// Save config to the given directory
    pub fn save<P: AsRef<Path>>(&self, config_dir: P) -> Result<()> {
        let config_dir = config_dir.as_ref();
        if !config_dir.exists() {
            create_private_dir(config_dir).map_err(ShoplineError::Io)?;
        }
        let content = serde_json::to_string_pretty(self).map_err(ShoplineError::Serialization)?;
        fs::write(config_dir.join(CONFIG_FILENAME), content).map_err(ShoplineError::Io)?;
        Ok(())
    }

    pub fn get(&self, key: &str) -> Result<Option<String>> {
        match key {
            "default-store" => Ok(self.default_store.clone()),
            "output" => Ok(self.output.clone()),
            _ => Err(unknown_key(key)),
        }
    }

    /// Sets a key. An empty value clears it.
    pub fn set(&mut self, key: &str, value: &str) -> Result<()> {
        let value = Some(value.trim().to_string()).filter(|v| !v.is_empty());
        match key {
            "default-store" => self.default_store = value,
            "output" => {
                if let Some(format) = &value {
                    validate_output(format)?;
                }
                self.output = value;
            }
            _ => return Err(unknown_key(key)),
        }
        Ok(())
    }
}

fn unknown_key(key: &str) -> ShoplineError {
    ShoplineError::Usage(format!(
        "unknown config key '{}' (valid keys: {})",
        key,
        CONFIG_KEYS.join(", ")
    ))
}

/// Accepts the output formats the renderer knows.
pub fn validate_output(format: &str) -> Result<()> {
    match format {
        "text" | "json" => Ok(()),
        other => Err(ShoplineError::Usage(format!(
            "invalid output format '{}' (use text or json)",
            other
        ))),
    }
}

/// Parses `alias1:full1,alias2:full2`. Malformed pairs are ignored.
pub fn parse_store_aliases(raw: &str) -> Vec<(String, String)> {
    raw.split(',')
        .filter_map(|pair| pair.split_once(':'))
        .map(|(alias, full)| (alias.trim().to_string(), full.trim().to_string()))
        .filter(|(alias, full)| !alias.is_empty() && !full.is_empty())
        .collect()
}

/// The platform config directory for `shopline-cli`.
pub fn default_config_dir() -> Result<PathBuf> {
    ProjectDirs::from("com", "shopline", "shopline-cli")
        .map(|dirs| dirs.config_dir().to_path_buf())
        .ok_or_else(|| {
            ShoplineError::Io(std::io::Error::new(
                std::io::ErrorKind::NotFound,
                "could not determine a config directory, set SHOPLINE_CONFIG_DIR",
            ))
        })
}

/// Effective settings for one invocation.
#[derive(Debug, Clone, Default)]
pub struct Settings {
    pub config_dir: PathBuf,
    pub default_store: Option<String>,
    /// Environment aliases first, then config file aliases.
    pub store_aliases: Vec<(String, String)>,
    pub direct_token: Option<String>,
    pub output: Option<String>,
    pub api_base_url: Option<String>,
}

fn non_blank(value: Option<String>) -> Option<String> {
    value
        .map(|v| v.trim().to_string())
        .filter(|v| !v.is_empty())
}

impl Settings {
    /// Reads the environment through `lookup` and loads `config.json` from the config
    /// directory it points at.
    pub fn load<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let config_dir = match non_blank(lookup(ENV_CONFIG_DIR)) {
            Some(dir) => PathBuf::from(dir),
            None => default_config_dir()?,
        };
        let config = ShoplineConfig::load(&config_dir)?;
        Ok(Self::merge(lookup, config, config_dir))
    }

    /// Settings from the process environment.
    pub fn from_env() -> Result<Self> {
        Self::load(|key| std::env::var(key).ok())
    }

    /// Combines environment values with a loaded config file.
    pub fn merge<F>(lookup: F, config: ShoplineConfig, config_dir: PathBuf) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut store_aliases = lookup(ENV_STORE_ALIASES)
            .map(|raw| parse_store_aliases(&raw))
            .unwrap_or_default();
        store_aliases.extend(config.store_aliases);

        Self {
            config_dir,
            default_store: non_blank(lookup(ENV_STORE)).or(config.default_store),
            store_aliases,
            direct_token: ENV_DIRECT_TOKENS
                .iter()
                .find_map(|name| non_blank(lookup(name))),
            output: non_blank(lookup(ENV_OUTPUT)).or(config.output),
            api_base_url: non_blank(lookup(ENV_API_BASE_URL)),
        }
    }

    /// Expands a short store name; alias match is case-insensitive, first match wins.
    pub fn expand_store_alias(&self, name: &str) -> String {
        let wanted = name.trim();
        if wanted.is_empty() {
            return name.to_string();
        }
        self.store_aliases
            .iter()
            .find(|(alias, _)| alias.eq_ignore_ascii_case(wanted))
            .map(|(_, full)| full.clone())
            .unwrap_or_else(|| name.to_string())
    }
}
