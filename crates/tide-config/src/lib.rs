//! # tide-config
//!
//! Layered configuration loading for Tide using figment.
//!
//! Configuration sources (in priority order, highest wins):
//! 1. Environment variables (`TIDE_*` prefix, `__` as separator)
//! 2. Project-level `.tide/config.toml`
//! 3. User-level `~/.config/tide/config.toml`
//! 4. Built-in defaults
//!
//! # Environment Variable Mapping
//!
//! Figment maps `TIDE_TIMELINE__WINDOW_DAYS` -> `timeline.window_days`,
//! `TIDE_DATABASE__PATH` -> `database.path`, etc. The `__` (double
//! underscore) separates nested config sections.
//!
//! # Usage
//!
//! ```no_run
//! use tide_config::TideConfig;
//!
//! let config = TideConfig::load_with_dotenv().expect("config");
//!
//! if config.database.is_remote() {
//!     println!("Turso URL: {}", config.database.url);
//! }
//! ```

mod database;
mod error;
mod general;
mod timeline;

pub use database::DatabaseConfig;
pub use error::ConfigError;
pub use general::{GeneralConfig, OUTPUT_FORMATS};
pub use timeline::TimelineConfig;

use figment::{
    Figment,
    providers::{Env, Format, Serialized, Toml},
};
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

/// Project-local config file, relative to the working directory.
pub const PROJECT_CONFIG: &str = ".tide/config.toml";

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize, Serialize)]
pub struct TideConfig {
    #[serde(default)]
    pub timeline: TimelineConfig,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub general: GeneralConfig,
}

impl TideConfig {
    /// Load and validate configuration from TOML files and environment
    /// variables.
    ///
    /// Does NOT call `dotenvy`; use [`Self::load_with_dotenv`] for `.env`
    /// support.
    ///
    /// # Errors
    ///
    /// Returns `ConfigError::Figment` for unreadable or mistyped sources and
    /// `ConfigError::InvalidValue` for out-of-range values.
    pub fn load() -> Result<Self, ConfigError> {
        let config: Self = Self::figment().extract()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration after reading `.env` into the process environment.
    ///
    /// # Errors
    ///
    /// Same as [`Self::load`].
    pub fn load_with_dotenv() -> Result<Self, ConfigError> {
        Self::load_dotenv_from_workspace();
        Self::load()
    }

    /// Build the figment provider chain.
    ///
    /// Public so tests and the CLI can layer more providers on top.
    pub fn figment() -> Figment {
        let mut figment = Figment::from(Serialized::defaults(Self::default()));

        if let Some(global_path) = Self::global_config_path() {
            if global_path.exists() {
                figment = figment.merge(Toml::file(global_path));
            }
        }

        let local_path = PathBuf::from(PROJECT_CONFIG);
        if local_path.exists() {
            figment = figment.merge(Toml::file(local_path));
        }

        figment.merge(Env::prefixed("TIDE_").split("__"))
    }

    /// Check every section's value ranges.
    ///
    /// # Errors
    ///
    /// Returns the first `ConfigError::InvalidValue` found.
    pub fn validate(&self) -> Result<(), ConfigError> {
        self.timeline.validate()?;
        self.general.validate()?;
        if !self.database.url.is_empty() && !self.database.is_remote() {
            return Err(ConfigError::NotConfigured {
                section: "database".into(),
            });
        }
        Ok(())
    }

    /// Path to the user-global config file.
    pub fn global_config_path() -> Option<PathBuf> {
        dirs::config_dir().map(|p| p.join("tide").join("config.toml"))
    }

    /// Load `.env` from the workspace root, falling back to the current
    /// directory. Silently does nothing if no `.env` is found.
    fn load_dotenv_from_workspace() {
        if let Ok(manifest_dir) = std::env::var("CARGO_MANIFEST_DIR") {
            let mut dir = PathBuf::from(manifest_dir);
            // crate -> crates/ -> workspace root
            for _ in 0..3 {
                let env_path = dir.join(".env");
                if env_path.exists() {
                    let _ = dotenvy::from_path(&env_path);
                    return;
                }
                if !dir.pop() {
                    break;
                }
            }
        }

        let _ = dotenvy::dotenv();
    }
}
