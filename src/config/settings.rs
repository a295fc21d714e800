//! TOML-based configuration.
//!
//! Supports a config file (anyset.toml) with environment variable expansion
//! in text adapter settings.
//!
//! Example configuration:
//! ```toml
//! [query]
//! dialect = "duckdb"          # override each adapter's native dialect
//!
//! [storage]
//! max_concurrency = 8
//! acquire_timeout_ms = 5000
//!
//! [[datasets]]
//! name = "Sales"
//! path_prefix = "sales"
//! version = 1
//! adapter = "PostgreSQL"
//!
//! [datasets.adapter_config]
//! host = "${PG_HOST}"
//! schema = "analytics"
//!
//! [[datasets.tables]]
//! name = "orders"
//! columns = [
//!     { name = "region", classification = "Category", data_type = "String" },
//!     { name = "amount", classification = "Fact", data_type = "Number" },
//! ]
//! ```

use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::model::{AdapterConfigValue, DatasetDefinition};
use crate::sql::Dialect;
use crate::storage::{ConnectionGate, DEFAULT_ACQUIRE_TIMEOUT, DEFAULT_MAX_CONCURRENCY};

/// Environment variable naming an explicit config file.
pub const CONFIG_ENV_VAR: &str = "ANYSET_CONFIG";

/// Error type for settings.
#[derive(Debug, thiserror::Error)]
pub enum SettingsError {
    #[error("Config file not found: {0}")]
    FileNotFound(PathBuf),

    #[error("Failed to read config file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config file: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Missing environment variable: {0}")]
    MissingEnvVar(String),

    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),
}

/// A row of inline data keyed by column name.
pub type JsonRow = serde_json::Map<String, serde_json::Value>;

/// Root configuration structure.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct Settings {
    /// Compilation settings.
    pub query: QuerySettings,

    /// Adapter concurrency settings.
    pub storage: StorageSettings,

    /// Declared datasets.
    pub datasets: Vec<DatasetSettings>,
}

/// Compilation settings.
#[derive(Debug, Clone, Default, Deserialize, Serialize)]
#[serde(default)]
pub struct QuerySettings {
    /// Dialect for every dataset. When unset, each adapter's native dialect.
    pub dialect: Option<Dialect>,
}

/// Per-adapter concurrency limits.
#[derive(Debug, Clone, Deserialize, Serialize)]
#[serde(default)]
pub struct StorageSettings {
    /// Maximum concurrent backend calls per dataset.
    pub max_concurrency: usize,

    /// How long a call may wait for a free slot.
    pub acquire_timeout_ms: u64,
}

impl Default for StorageSettings {
    fn default() -> Self {
        Self {
            max_concurrency: DEFAULT_MAX_CONCURRENCY,
            acquire_timeout_ms: DEFAULT_ACQUIRE_TIMEOUT.as_millis() as u64,
        }
    }
}

impl StorageSettings {
    pub fn acquire_timeout(&self) -> Duration {
        Duration::from_millis(self.acquire_timeout_ms)
    }

    /// A fresh gate with these limits.
    pub fn gate(&self) -> ConnectionGate {
        ConnectionGate::new(self.max_concurrency, self.acquire_timeout())
    }
}

/// One `[[datasets]]` entry.
#[derive(Debug, Clone, Deserialize, Serialize)]
pub struct DatasetSettings {
    #[serde(flatten)]
    pub definition: DatasetDefinition,

    /// Inline rows per table, used by the in-memory adapter.
    #[serde(default, skip_serializing_if = "BTreeMap::is_empty")]
    pub rows: BTreeMap<String, Vec<JsonRow>>,
}

impl DatasetSettings {
    /// The definition with environment variables expanded in text adapter
    /// settings.
    pub fn resolved_definition(&self) -> Result<DatasetDefinition, SettingsError> {
        let mut definition = self.definition.clone();
        for value in definition.adapter_config.values_mut() {
            if let AdapterConfigValue::Text(text) = value {
                *text = expand_env_vars(text)?;
            }
        }
        Ok(definition)
    }
}

impl Settings {
    /// Load settings from a TOML file.
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self, SettingsError> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(SettingsError::FileNotFound(path.to_path_buf()));
        }

        let content = fs::read_to_string(path)?;
        Self::from_toml(&content)
    }

    /// Parse settings from TOML text.
    pub fn from_toml(content: &str) -> Result<Self, SettingsError> {
        let settings: Settings = toml::from_str(content)?;
        settings.check()?;
        Ok(settings)
    }

    /// Load settings from the default config file locations.
    ///
    /// Searches in order:
    /// 1. Environment variable `ANYSET_CONFIG`
    /// 2. `./anyset.toml`
    /// 3. `~/.config/anyset/config.toml`
    pub fn load() -> Result<Self, SettingsError> {
        // Check environment variable first
        if let Ok(path) = env::var(CONFIG_ENV_VAR) {
            return Self::from_file(&path);
        }

        // Check local directory
        let local_config = PathBuf::from("anyset.toml");
        if local_config.exists() {
            return Self::from_file(&local_config);
        }

        // Check user config directory
        if let Some(config_dir) = dirs::config_dir() {
            let user_config = config_dir.join("anyset").join("config.toml");
            if user_config.exists() {
                return Self::from_file(&user_config);
            }
        }

        // Return defaults if no config file found
        Ok(Settings::default())
    }

    fn check(&self) -> Result<(), SettingsError> {
        if self.storage.max_concurrency == 0 {
            return Err(SettingsError::InvalidConfig(
                "storage.max_concurrency must be at least 1".into(),
            ));
        }
        for dataset in &self.datasets {
            let def = &dataset.definition;
            if let Some(table) = dataset.rows.keys().find(|t| !def.tables.iter().any(|d| &d.name == *t)) {
                return Err(SettingsError::InvalidConfig(format!(
                    "rows declared for unknown table '{}' in dataset '{}'",
                    table, def.name
                )));
            }
        }
        Ok(())
    }
}

/// Expand environment variables in a string.
///
/// Supports `${VAR}` and `$VAR` syntax. A lone `$` is kept.
pub fn expand_env_vars(s: &str) -> Result<String, SettingsError> {
    let mut result = String::with_capacity(s.len());
    let mut chars = s.chars().peekable();

    while let Some(c) = chars.next() {
        if c != '$' {
            result.push(c);
            continue;
        }

        let var_name: String = if chars.next_if_eq(&'{').is_some() {
            chars.by_ref().take_while(|&ch| ch != '}').collect()
        } else {
            let mut name = String::new();
            while let Some(ch) = chars.next_if(|ch| ch.is_alphanumeric() || *ch == '_') {
                name.push(ch);
            }
            if name.is_empty() {
                result.push('$');
                continue;
            }
            name
        };

        let value = env::var(&var_name).map_err(|_| SettingsError::MissingEnvVar(var_name.clone()))?;
        result.push_str(&value);
    }

    Ok(result)
}
