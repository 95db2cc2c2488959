//! Configuration management for `deck`.
//!
//! Configuration is resolved in layers:
//! - Data directory: `--data-dir`, then `DECK_DATA_DIR`, then `.deck`
//! - Workspace config: `<data dir>/config.yaml` (every key optional)
//! - Environment overrides: `DECK_STORAGE_KEY`, `DECK_INTEGRITY`,
//!   `DECK_NUMBERING`, `DECK_PERSIST`

use std::fmt::Display;
use std::fs;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use anyhow::{Context, Result};
use deck_core::persist::{DEFAULT_STORAGE_KEY, validate_storage_key};
use deck_core::{FileSlots, IntegrityMode, NumberingScope, PersistenceAdapter, Store, StoreOptions};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

/// Default data directory, relative to the working directory.
pub const DEFAULT_DATA_DIR: &str = ".deck";

/// Config file name inside the data directory.
pub const CONFIG_FILE: &str = "config.yaml";

/// Resolved configuration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default, rename_all = "kebab-case")]
pub struct DeckConfig {
    /// Where the snapshot slot and `config.yaml` live. Not read from YAML.
    #[serde(skip)]
    pub data_dir: PathBuf,

    pub storage_key: String,

    #[serde(serialize_with = "to_display", deserialize_with = "from_str_value")]
    pub integrity: IntegrityMode,

    #[serde(serialize_with = "to_display", deserialize_with = "from_str_value")]
    pub numbering: NumberingScope,

    /// When false the session runs on the seed only and nothing is written.
    pub persist: bool,
}

impl Default for DeckConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from(DEFAULT_DATA_DIR),
            storage_key: DEFAULT_STORAGE_KEY.to_string(),
            integrity: IntegrityMode::default(),
            numbering: NumberingScope::default(),
            persist: true,
        }
    }
}

fn to_display<T: Display, S: Serializer>(value: &T, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.collect_str(value)
}

fn from_str_value<'de, T, D>(deserializer: D) -> Result<T, D::Error>
where
    T: FromStr,
    T::Err: Display,
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    raw.parse().map_err(serde::de::Error::custom)
}

impl DeckConfig {
    /// Load configuration from the process environment.
    ///
    /// # Errors
    ///
    /// Returns an error if `config.yaml` exists but cannot be read or
    /// parsed, or an environment override has an invalid value.
    pub fn load(data_dir: Option<&Path>) -> Result<Self> {
        Self::load_with(data_dir, |key| std::env::var(key).ok())
    }

    /// Load configuration with an explicit environment lookup.
    ///
    /// # Errors
    ///
    /// Same as [`DeckConfig::load`].
    pub fn load_with(data_dir: Option<&Path>, env: impl Fn(&str) -> Option<String>) -> Result<Self> {
        let dir = data_dir
            .map(Path::to_path_buf)
            .or_else(|| env("DECK_DATA_DIR").map(PathBuf::from))
            .unwrap_or_else(|| PathBuf::from(DEFAULT_DATA_DIR));
        let dir = dunce::canonicalize(&dir).unwrap_or(dir);

        let path = dir.join(CONFIG_FILE);
        let mut config = if path.exists() {
            let content = fs::read_to_string(&path)
                .with_context(|| format!("Failed to read {}", path.display()))?;
            Self::from_yaml(&content).with_context(|| format!("Failed to parse {}", path.display()))?
        } else {
            Self::default()
        };
        config.data_dir = dir;
        config.apply_env_overrides(env)?;
        validate_storage_key(&config.storage_key).context("storage-key")?;

        tracing::debug!(
            data_dir = %config.data_dir.display(),
            storage_key = %config.storage_key,
            integrity = %config.integrity,
            numbering = %config.numbering,
            persist = config.persist,
            "Resolved configuration"
        );
        Ok(config)
    }

    /// Parse a YAML document. An empty document yields the defaults.
    ///
    /// # Errors
    ///
    /// Returns an error on malformed YAML or invalid option values.
    pub fn from_yaml(content: &str) -> Result<Self> {
        if content.trim().is_empty() {
            return Ok(Self::default());
        }
        Ok(serde_yaml::from_str(content)?)
    }

    /// Render the YAML form (without `data_dir`).
    ///
    /// # Errors
    ///
    /// Returns an error if serialization fails.
    pub fn to_yaml(&self) -> Result<String> {
        Ok(serde_yaml::to_string(self)?)
    }

    fn apply_env_overrides(&mut self, env: impl Fn(&str) -> Option<String>) -> Result<()> {
        if let Some(key) = env("DECK_STORAGE_KEY").filter(|k| !k.trim().is_empty()) {
            self.storage_key = key;
        }
        if let Some(mode) = env("DECK_INTEGRITY") {
            self.integrity = mode.parse().context("DECK_INTEGRITY")?;
        }
        if let Some(scope) = env("DECK_NUMBERING") {
            self.numbering = scope.parse().context("DECK_NUMBERING")?;
        }
        if let Some(persist) = env("DECK_PERSIST") {
            self.persist = parse_bool(&persist).context("DECK_PERSIST")?;
        }
        Ok(())
    }

    #[must_use]
    pub const fn store_options(&self) -> StoreOptions {
        StoreOptions {
            integrity: self.integrity,
            numbering: self.numbering,
        }
    }

    /// File-backed adapter, or `None` when persistence is disabled.
    #[must_use]
    pub fn persistence(&self) -> Option<PersistenceAdapter> {
        self.persist.then(|| {
            PersistenceAdapter::new(FileSlots::new(&self.data_dir), self.storage_key.clone())
        })
    }

    /// The one store instance for this process, seeded but not hydrated.
    #[must_use]
    pub fn build_store(&self) -> Store {
        Store::new(self.persistence(), self.store_options())
    }
}

fn parse_bool(raw: &str) -> Result<bool> {
    match raw.trim().to_lowercase().as_str() {
        "1" | "true" | "yes" | "on" => Ok(true),
        "0" | "false" | "no" | "off" => Ok(false),
        other => anyhow::bail!("expected a boolean, got {other:?}"),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use tempfile::TempDir;

    fn env_from(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| ((*k).to_string(), (*v).to_string()))
            .collect();
        move |key| map.get(key).cloned()
    }

    fn init_logging() {
        crate::logging::init_test_logging();
    }

    #[test]
    fn test_defaults_without_file() {
        let temp = TempDir::new().unwrap();
        let config = DeckConfig::load_with(Some(temp.path()), env_from(&[])).unwrap();
        assert_eq!(config.storage_key, DEFAULT_STORAGE_KEY);
        assert_eq!(config.integrity, IntegrityMode::Faithful);
        assert_eq!(config.numbering, NumberingScope::Global);
        assert!(config.persist);
    }

    #[test]
    fn test_yaml_file_is_read() {
        let temp = TempDir::new().unwrap();
        fs::write(
            temp.path().join(CONFIG_FILE),
            "storage-key: team-store\nintegrity: cascade\nnumbering: per-team\n",
        )
        .unwrap();
        let config = DeckConfig::load_with(Some(temp.path()), env_from(&[])).unwrap();
        assert_eq!(config.storage_key, "team-store");
        assert_eq!(config.integrity, IntegrityMode::Cascade);
        assert_eq!(config.numbering, NumberingScope::PerTeam);
    }

    #[test]
    fn test_env_overrides_file() {
        let temp = TempDir::new().unwrap();
        fs::write(temp.path().join(CONFIG_FILE), "integrity: cascade\n").unwrap();
        let config = DeckConfig::load_with(
            Some(temp.path()),
            env_from(&[
                ("DECK_INTEGRITY", "faithful"),
                ("DECK_STORAGE_KEY", "other"),
                ("DECK_PERSIST", "off"),
            ]),
        )
        .unwrap();
        assert_eq!(config.integrity, IntegrityMode::Faithful);
        assert_eq!(config.storage_key, "other");
        assert!(!config.persist);
        assert!(config.persistence().is_none());
    }

    #[test]
    fn test_data_dir_from_env() {
        let temp = TempDir::new().unwrap();
        let dir = temp.path().to_string_lossy().to_string();
        let config = DeckConfig::load_with(None, env_from(&[("DECK_DATA_DIR", dir.as_str())])).unwrap();
        assert_eq!(config.data_dir, dunce::canonicalize(temp.path()).unwrap());
    }

    #[test]
    fn test_storage_key_must_stay_in_data_dir() {
        init_logging();
        let temp = TempDir::new().unwrap();
        let err = DeckConfig::load_with(
            Some(temp.path()),
            env_from(&[("DECK_STORAGE_KEY", "../outside")]),
        )
        .unwrap_err();
        assert!(format!("{err:#}").contains("path separators"), "{err:#}");

        fs::write(temp.path().join(CONFIG_FILE), "storage-key: ..\n").unwrap();
        assert!(DeckConfig::load_with(Some(temp.path()), env_from(&[])).is_err());
    }

    #[test]
    fn test_built_store_persists_under_storage_key() {
        init_logging();
        let temp = TempDir::new().unwrap();
        let config =
            DeckConfig::load_with(Some(temp.path()), env_from(&[("DECK_STORAGE_KEY", "work")]))
                .unwrap();

        let mut store = config.build_store();
        store.hydrate();
        tracing::info!(version = store.version(), "Hydrated from empty data dir");
        assert!(store.delete_issue("1"));
        assert!(config.data_dir.join("work.json").exists());

        let mut reopened = config.build_store();
        reopened.hydrate();
        assert!(reopened.issue("1").is_none());
        assert_eq!(reopened.state().issues.len(), 9);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        assert!(DeckConfig::from_yaml("integrity: strict\n").is_err());
        let temp = TempDir::new().unwrap();
        assert!(
            DeckConfig::load_with(Some(temp.path()), env_from(&[("DECK_NUMBERING", "weekly")]))
                .is_err()
        );
    }

    #[test]
    fn test_yaml_round_trip_omits_data_dir() {
        let config = DeckConfig {
            integrity: IntegrityMode::Cascade,
            ..Default::default()
        };
        let yaml = config.to_yaml().unwrap();
        assert!(yaml.contains("integrity: cascade"));
        assert!(!yaml.contains("data"));
        assert_eq!(DeckConfig::from_yaml(&yaml).unwrap(), config);
    }
}
