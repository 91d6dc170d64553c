//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. Global config: `$XDG_CONFIG_HOME/treelink/treelink.toml`
//! 3. Local config: an explicit file passed by the caller
//! 4. Environment variables: `TREELINK__*` prefix, `__` between nested keys
//!    (e.g. `TREELINK__LAYOUT__LEVEL_SEPARATION=2`)

use std::path::{Path, PathBuf};

use config::{Config, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, instrument};

use crate::domain::{ChildSlots, Forest};
use crate::layout::LayoutParams;

#[derive(Error, Debug)]
pub enum SettingsError {
    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("config file not found: {0}")]
    NotFound(PathBuf),

    #[error("invalid setting {key}: {message}")]
    Invalid { key: &'static str, message: String },
}

/// Unified configuration for treelink.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct Settings {
    /// Run ancestor walks to reject loops on every linkage change
    pub strict: bool,
    /// Default layout separations and offsets
    pub layout: LayoutParams,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            strict: true,
            layout: LayoutParams::default(),
        }
    }
}

/// Get the XDG config directory for treelink.
pub fn global_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "treelink").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the global config file.
pub fn global_config_path() -> Option<PathBuf> {
    global_config_dir().map(|dir| dir.join("treelink.toml"))
}

impl Settings {
    /// Load settings with layered precedence, reading `TREELINK__*` from the process
    /// environment.
    pub fn load(local: Option<&Path>) -> Result<Self, SettingsError> {
        Self::load_with(local, Self::environment())
    }

    /// Same as [`Settings::load`] with an explicit environment source.
    #[instrument(level = "debug", skip(env))]
    pub fn load_with(local: Option<&Path>, env: Environment) -> Result<Self, SettingsError> {
        let mut builder = Config::builder();

        if let Some(global_path) = global_config_path() {
            if global_path.exists() {
                debug!("global config: {}", global_path.display());
                builder = builder.add_source(File::from(global_path).format(FileFormat::Toml));
            }
        }

        if let Some(path) = local {
            if !path.exists() {
                return Err(SettingsError::NotFound(path.to_path_buf()));
            }
            debug!("local config: {}", path.display());
            builder = builder.add_source(File::from(path).format(FileFormat::Toml));
        }

        let settings: Self = builder.add_source(env).build()?.try_deserialize()?;
        settings.validate()?;
        Ok(settings)
    }

    /// The `TREELINK__` environment source.
    pub fn environment() -> Environment {
        Environment::with_prefix("TREELINK")
            .separator("__")
            .try_parsing(true)
    }

    /// Reject separations that would make the layout meaningless.
    pub fn validate(&self) -> Result<(), SettingsError> {
        let checks = [
            ("layout.sibling_separation", self.layout.sibling_separation),
            ("layout.subtree_separation", self.layout.subtree_separation),
            ("layout.level_separation", self.layout.level_separation),
        ];
        for (key, value) in checks {
            if !value.is_finite() || value < 0.0 {
                return Err(SettingsError::Invalid {
                    key,
                    message: format!("must be a non-negative number, got {}", value),
                });
            }
        }
        Ok(())
    }

    /// An empty forest configured with these settings.
    pub fn forest<S: ChildSlots>(&self) -> Forest<S> {
        Forest::new().with_strict(self.strict)
    }
}
