//! Configuration management with layered loading
//!
//! Precedence (lowest to highest):
//! 1. Compiled defaults
//! 2. System config: `/etc/columnstore/mcs_cli.toml`
//! 3. User config: `$XDG_CONFIG_HOME/mcs/mcs.toml`
//! 4. Environment variables: `MCS_*` prefix, `__` for nesting
//!    (`MCS_CMAPI__API_KEY`)

use std::path::{Path, PathBuf};

use config::{Config, ConfigError, Environment, File, FileFormat};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::logging::DEFAULT_LOG_CONFIG;

/// System-wide settings file.
pub const SYSTEM_CONFIG_PATH: &str = "/etc/columnstore/mcs_cli.toml";

#[derive(Error, Debug)]
#[error("config error: {message}")]
pub struct SettingsError {
    pub message: String,
}

impl From<ConfigError> for SettingsError {
    fn from(e: ConfigError) -> Self {
        Self {
            message: e.to_string(),
        }
    }
}

/// Where the management API lives and how requests reach it.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct CmapiSettings {
    pub host: String,
    pub port: u16,
    pub api_version: String,
    pub api_key: Option<String>,
    /// External program performing HTTP requests (curl compatible flags)
    pub transport: String,
}

impl Default for CmapiSettings {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".into(),
            port: 8640,
            api_version: "0.4.0".into(),
            api_key: None,
            transport: "curl".into(),
        }
    }
}

impl CmapiSettings {
    pub fn base_url(&self) -> String {
        format!("https://{}:{}/cmapi", self.host, self.port)
    }
}

/// Unified configuration for mcs.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(default)]
pub struct Settings {
    /// Logging configuration read by the bootstrap
    pub log_config: PathBuf,
    /// Manual page viewer used by `help-all`
    pub man_viewer: String,
    /// Script performing backups and restores
    pub backup_manager: PathBuf,
    pub cmapi: CmapiSettings,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            log_config: PathBuf::from(DEFAULT_LOG_CONFIG),
            man_viewer: "man".into(),
            backup_manager: PathBuf::from("/usr/bin/mcs_backup_manager.sh"),
            cmapi: CmapiSettings::default(),
        }
    }
}

/// Get the XDG config directory for mcs.
pub fn user_config_dir() -> Option<PathBuf> {
    ProjectDirs::from("", "", "mcs").map(|dirs| dirs.config_dir().to_path_buf())
}

/// Get the path to the user config file.
pub fn user_config_path() -> Option<PathBuf> {
    user_config_dir().map(|dir| dir.join("mcs.toml"))
}

impl Settings {
    /// Load settings from the standard locations.
    pub fn load() -> Result<Self, SettingsError> {
        let user = user_config_path();
        Self::load_from(Some(Path::new(SYSTEM_CONFIG_PATH)), user.as_deref())
    }

    /// Load settings with explicit file layers; absent files are skipped.
    pub fn load_from(system: Option<&Path>, user: Option<&Path>) -> Result<Self, SettingsError> {
        let mut builder = Self::defaults_builder()?;

        for path in [system, user].into_iter().flatten() {
            if path.exists() {
                builder = builder.add_source(File::from(path).format(FileFormat::Toml).required(true));
            }
        }

        builder = builder.add_source(
            Environment::with_prefix("MCS")
                .prefix_separator("_")
                .separator("__"),
        );

        let mut settings: Self = builder.build()?.try_deserialize()?;
        settings.expand_paths();
        Ok(settings)
    }

    fn defaults_builder() -> Result<config::ConfigBuilder<config::builder::DefaultState>, SettingsError> {
        let defaults = Settings::default();
        let builder = Config::builder()
            .set_default("log_config", defaults.log_config.to_string_lossy().to_string())?
            .set_default("man_viewer", defaults.man_viewer)?
            .set_default(
                "backup_manager",
                defaults.backup_manager.to_string_lossy().to_string(),
            )?
            .set_default("cmapi.host", defaults.cmapi.host)?
            .set_default("cmapi.port", i64::from(defaults.cmapi.port))?
            .set_default("cmapi.api_version", defaults.cmapi.api_version)?
            .set_default("cmapi.transport", defaults.cmapi.transport)?;
        Ok(builder)
    }

    /// Expand `~`, `$VAR` and `${VAR}` in path-like fields.
    fn expand_paths(&mut self) {
        self.log_config = PathBuf::from(expand(&self.log_config.to_string_lossy()));
        self.backup_manager = PathBuf::from(expand(&self.backup_manager.to_string_lossy()));
        self.man_viewer = expand(&self.man_viewer);
    }
}

fn expand(value: &str) -> String {
    shellexpand::full(value)
        .map(|s| s.into_owned())
        .unwrap_or_else(|_| value.to_string())
}
