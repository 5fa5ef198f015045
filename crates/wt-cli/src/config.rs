//! Configuration loading and management.

use std::fmt;
use std::num::NonZeroUsize;
use std::path::{Path, PathBuf};

use figment::Figment;
use figment::providers::{Env, Format, Serialized, Toml};
use serde::{Deserialize, Serialize};
use wt_core::AccountingPolicy;

/// Application configuration.
#[derive(Clone, Serialize, Deserialize)]
pub struct Config {
    /// Path to the clock event database.
    pub database_path: PathBuf,

    /// Per-day accounting rules.
    #[serde(default)]
    pub policy: AccountingPolicy,

    /// Number of event batches the totals cache keeps.
    #[serde(default = "default_cache_capacity")]
    pub cache_capacity: NonZeroUsize,
}

const fn default_cache_capacity() -> NonZeroUsize {
    wt_core::cache::DEFAULT_CAPACITY
}

impl fmt::Debug for Config {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Config")
            .field("database_path", &self.database_path)
            .field("policy", &self.policy)
            .field("cache_capacity", &self.cache_capacity)
            .finish()
    }
}

impl Default for Config {
    fn default() -> Self {
        let data_dir = dirs_data_path().unwrap_or_else(|| PathBuf::from("."));
        Self {
            database_path: data_dir.join("wt.db"),
            policy: AccountingPolicy::default(),
            cache_capacity: default_cache_capacity(),
        }
    }
}

impl Config {
    /// Loads configuration from default locations.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load() -> Result<Self, figment::Error> {
        Self::load_from(None)
    }

    /// Loads configuration, optionally from a specific file.
    #[expect(
        clippy::result_large_err,
        reason = "figment::Error is large but only returned at startup"
    )]
    pub fn load_from(config_path: Option<&Path>) -> Result<Self, figment::Error> {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        // Load from default config location
        if let Some(config_dir) = dirs_config_path() {
            figment = figment.merge(Toml::file(config_dir.join("config.toml")));
        }

        // Load from specified config file
        if let Some(path) = config_path {
            figment = figment.merge(Toml::file(path));
        }

        // Load from environment variables (WT_*, nested with WT_POLICY__*)
        figment = figment.merge(Env::prefixed("WT_").split("__"));

        figment.extract()
    }
}

/// Returns the platform-specific config directory for wt.
fn dirs_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|p| p.join("wt"))
}

/// Returns the platform-specific data directory for wt.
///
/// On Linux: `~/.local/share/wt`
pub fn dirs_data_path() -> Option<PathBuf> {
    dirs::data_dir().map(|p| p.join("wt"))
}
