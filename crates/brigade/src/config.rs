//! Service configuration.
//!
//! Layered: built-in defaults, then the TOML config file, then `BRIGADE_*`
//! environment overrides (`__` separates sections, e.g.
//! `BRIGADE_AUTH__JWT_SECRET`). The signing secret is validated once at
//! startup; a missing or weak secret aborts the process before the listener
//! binds.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use ::config::{Config, Environment, File, FileFormat};
use serde::{Deserialize, Serialize};
use thiserror::Error;

const APP_NAME: &str = "brigade";

/// Top-level application configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub server: ServerConfig,
    pub auth: AuthConfig,
    pub database: DatabaseConfig,
    pub logging: LoggingConfig,
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
    /// Maximum accepted request body size in bytes.
    pub max_body_bytes: usize,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 8520,
            max_body_bytes: 1024 * 1024,
        }
    }
}

/// Token signing configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 signing secret. Supports `env:VAR_NAME` indirection.
    /// REQUIRED; there is no default.
    pub jwt_secret: Option<String>,

    /// Bearer token lifetime in seconds.
    pub token_lifetime_secs: i64,
}

impl Default for AuthConfig {
    fn default() -> Self {
        Self {
            // No default secret - must be explicitly configured
            jwt_secret: None,
            token_lifetime_secs: 3600,
        }
    }
}

impl AuthConfig {
    /// Resolve the signing secret, expanding `env:VAR_NAME` syntax.
    pub fn resolve_jwt_secret(&self) -> Result<Option<String>, ConfigValidationError> {
        match &self.jwt_secret {
            None => Ok(None),
            Some(value) => {
                if let Some(var_name) = value.strip_prefix("env:") {
                    match std::env::var(var_name) {
                        Ok(secret) if !secret.is_empty() => Ok(Some(secret)),
                        Ok(_) => Err(ConfigValidationError::EnvVarEmpty(var_name.to_string())),
                        Err(_) => Err(ConfigValidationError::EnvVarNotFound(var_name.to_string())),
                    }
                } else {
                    Ok(Some(value.clone()))
                }
            }
        }
    }

    /// Validate the auth configuration and return the resolved secret.
    ///
    /// Called once during startup; failure here is fatal.
    pub fn validate(&self) -> Result<String, ConfigValidationError> {
        let secret = self
            .resolve_jwt_secret()?
            .ok_or(ConfigValidationError::MissingJwtSecret)?;

        if secret.len() < 32 {
            return Err(ConfigValidationError::JwtSecretTooShort);
        }
        if self.token_lifetime_secs <= 0 {
            return Err(ConfigValidationError::InvalidTokenLifetime);
        }

        Ok(secret)
    }
}

/// Configuration validation errors.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ConfigValidationError {
    #[error(
        "signing secret is required. Set BRIGADE_AUTH__JWT_SECRET or jwt_secret in the config file"
    )]
    MissingJwtSecret,

    #[error("signing secret must be at least 32 characters long")]
    JwtSecretTooShort,

    #[error("token_lifetime_secs must be positive")]
    InvalidTokenLifetime,

    #[error("environment variable '{0}' not found (referenced via env:{0} in config)")]
    EnvVarNotFound(String),

    #[error("environment variable '{0}' is empty (referenced via env:{0} in config)")]
    EnvVarEmpty(String),
}

/// Database configuration.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct DatabaseConfig {
    /// SQLite file path. Defaults to the platform data directory.
    pub path: Option<PathBuf>,
}

impl DatabaseConfig {
    /// Resolve the database file path, falling back to the data directory.
    pub fn resolve_path(&self) -> Result<PathBuf> {
        if let Some(path) = &self.path {
            return Ok(path.clone());
        }
        let data_dir = dirs::data_dir()
            .context("resolving platform data directory")?
            .join(APP_NAME);
        Ok(data_dir.join("brigade.db"))
    }
}

/// Logging configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct LoggingConfig {
    pub level: String,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
        }
    }
}

/// Resolve the config file path, honoring an explicit override.
pub fn config_file_path(override_path: Option<PathBuf>) -> PathBuf {
    if let Some(path) = override_path {
        return path;
    }
    dirs::config_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join(APP_NAME)
        .join("config.toml")
}

/// Load the configuration, creating a default config file on first run.
pub fn load(config_file: &Path) -> Result<AppConfig> {
    if !config_file.exists() {
        write_default_config(config_file)?;
    }

    let built = Config::builder()
        .add_source(
            File::from(config_file)
                .format(FileFormat::Toml)
                .required(false),
        )
        .add_source(Environment::with_prefix("BRIGADE").separator("__"))
        .build()
        .context("building configuration")?;

    let config: AppConfig = built.try_deserialize().context("parsing configuration")?;
    Ok(config)
}

fn write_default_config(path: &Path) -> Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)
            .with_context(|| format!("creating config directory {}", parent.display()))?;
    }
    let rendered =
        toml::to_string_pretty(&AppConfig::default()).context("rendering default config")?;
    fs::write(path, rendered)
        .with_context(|| format!("writing default config to {}", path.display()))?;
    Ok(())
}
