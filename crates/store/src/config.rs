//! Store configuration.
//!
//! Defaults work out of the box; environment variables override them:
//!
//! - `STOCKBOOK_STORAGE_KEY`: key of the durable slot (default `inventoryList`)
//! - `STOCKBOOK_DB_PATH`: SQLite file (default `{data_dir}/stockbook/store.db`)

use std::path::PathBuf;

use crate::error::ConfigError;

pub const DEFAULT_STORAGE_KEY: &str = "inventoryList";

const ENV_STORAGE_KEY: &str = "STOCKBOOK_STORAGE_KEY";
const ENV_DB_PATH: &str = "STOCKBOOK_DB_PATH";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Key the inventory list is written under.
    pub storage_key: String,
    /// Explicit SQLite path. `None` resolves to the OS data directory.
    pub database_path: Option<PathBuf>,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            database_path: None,
        }
    }
}

impl StoreConfig {
    /// Read overrides from the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Read overrides through `lookup` (environment-shaped key/value source).
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();

        if let Some(key) = lookup(ENV_STORAGE_KEY) {
            let key = key.trim();
            if key.is_empty() {
                return Err(ConfigError::Invalid {
                    name: ENV_STORAGE_KEY,
                    reason: "must not be empty".to_string(),
                });
            }
            config.storage_key = key.to_string();
        }

        if let Some(path) = lookup(ENV_DB_PATH) {
            if path.trim().is_empty() {
                return Err(ConfigError::Invalid {
                    name: ENV_DB_PATH,
                    reason: "must not be empty".to_string(),
                });
            }
            config.database_path = Some(PathBuf::from(path));
        }

        Ok(config)
    }

    pub fn with_storage_key(mut self, key: impl Into<String>) -> Self {
        self.storage_key = key.into();
        self
    }

    pub fn with_database_path(mut self, path: impl Into<PathBuf>) -> Self {
        self.database_path = Some(path.into());
        self
    }

    /// Effective SQLite path.
    pub fn database_path(&self) -> Result<PathBuf, ConfigError> {
        match &self.database_path {
            Some(path) => Ok(path.clone()),
            None => default_database_path(),
        }
    }
}

/// `{app_data_dir}/stockbook/store.db`.
fn default_database_path() -> Result<PathBuf, ConfigError> {
    let mut dir = dirs::data_dir()
        .or_else(|| {
            dirs::home_dir().map(|mut h| {
                h.push(".local");
                h.push("share");
                h
            })
        })
        .ok_or(ConfigError::NoDataDir)?;

    dir.push("stockbook");
    dir.push("store.db");
    Ok(dir)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn lookup(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn defaults_without_overrides() {
        let config = StoreConfig::from_lookup(lookup(&[])).unwrap();
        assert_eq!(config, StoreConfig::default());
        assert_eq!(config.storage_key, "inventoryList");
    }

    #[test]
    fn overrides_are_applied() {
        let config = StoreConfig::from_lookup(lookup(&[
            ("STOCKBOOK_STORAGE_KEY", " shopA "),
            ("STOCKBOOK_DB_PATH", "/tmp/shop.db"),
        ]))
        .unwrap();

        assert_eq!(config.storage_key, "shopA");
        assert_eq!(config.database_path().unwrap(), PathBuf::from("/tmp/shop.db"));
    }

    #[test]
    fn blank_overrides_are_rejected() {
        let err = StoreConfig::from_lookup(lookup(&[("STOCKBOOK_STORAGE_KEY", "  ")])).unwrap_err();
        assert!(matches!(err, ConfigError::Invalid { name: "STOCKBOOK_STORAGE_KEY", .. }));

        assert!(StoreConfig::from_lookup(lookup(&[("STOCKBOOK_DB_PATH", "")])).is_err());
    }

    #[test]
    fn default_path_ends_in_app_directory() {
        if let Ok(path) = StoreConfig::default().database_path() {
            assert!(path.ends_with("stockbook/store.db"));
        }
    }
}
