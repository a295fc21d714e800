//! Configuration module.
//!
//! Handles the `anyset.toml` file, environment variable expansion, and the
//! dataset declarations it carries.

mod settings;

pub use settings::{
    expand_env_vars, DatasetSettings, JsonRow, QuerySettings, Settings, SettingsError,
    StorageSettings,
};
