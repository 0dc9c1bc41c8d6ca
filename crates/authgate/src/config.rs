//! Process configuration, resolved once at startup.

use anyhow::{Context, Result, bail};
use config::{Config, File, FileFormat};
use serde::Deserialize;
use std::env;
use std::path::{Path, PathBuf};

/// Deployment environment. Gates the `Secure` cookie flag.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(self) -> bool {
        matches!(self, Environment::Production)
    }
}

/// Authentication configuration.
///
/// Both secrets are required: startup fails when either is unset instead of
/// falling back to a hardcoded default.
#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct AuthConfig {
    /// HS256 secret for access tokens.
    pub access_token_secret: Option<String>,
    /// HS256 secret for refresh tokens.
    pub refresh_token_secret: Option<String>,
}

/// Application configuration.
#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    pub host: String,
    pub port: u16,
    pub environment: Environment,
    /// Prefix for all API routes.
    pub api_prefix: String,
    /// Path of the SQLite database file.
    pub database_path: PathBuf,
    /// Allowed CORS origins.
    pub allowed_origins: Vec<String>,
    pub auth: AuthConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            host: "127.0.0.1".to_string(),
            port: 7500,
            environment: Environment::Development,
            api_prefix: "/api/v1".to_string(),
            database_path: default_database_path(),
            allowed_origins: vec!["http://localhost:3000".to_string()],
            auth: AuthConfig::default(),
        }
    }
}

fn default_database_path() -> PathBuf {
    dirs::data_dir()
        .unwrap_or_else(|| PathBuf::from("."))
        .join("authgate")
        .join("authgate.db")
}

impl AppConfig {
    /// Load configuration from an optional TOML file, then apply environment
    /// overrides.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut builder = Config::builder();

        match path {
            Some(p) => {
                builder = builder.add_source(File::from(p).format(FileFormat::Toml));
            }
            None => {
                if let Some(dir) = dirs::config_dir() {
                    let default_path = dir.join("authgate").join("config.toml");
                    builder = builder
                        .add_source(File::from(default_path).format(FileFormat::Toml).required(false));
                }
            }
        }

        let mut config: AppConfig = builder
            .build()
            .context("loading configuration")?
            .try_deserialize()
            .context("parsing configuration")?;

        config.apply_env_overrides()?;
        Ok(config)
    }

    /// Apply the environment variables named by the deployment contract.
    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(secret) = env::var("ACCESS_TOKEN_SECRET") {
            self.auth.access_token_secret = Some(secret);
        }
        if let Ok(secret) = env::var("REFRESH_TOKEN_SECRET") {
            self.auth.refresh_token_secret = Some(secret);
        }
        if let Ok(port) = env::var("PORT") {
            self.port = port
                .parse()
                .with_context(|| format!("invalid PORT value: {port}"))?;
        }
        if let Ok(app_env) = env::var("APP_ENV") {
            self.environment = match app_env.as_str() {
                "production" => Environment::Production,
                _ => Environment::Development,
            };
        }
        Ok(())
    }

    /// Validate the configuration before serving.
    pub fn validate(&self) -> Result<()> {
        match &self.auth.access_token_secret {
            Some(s) if !s.is_empty() => {}
            _ => bail!(
                "access token secret is not configured; set ACCESS_TOKEN_SECRET or auth.access_token_secret"
            ),
        }
        match &self.auth.refresh_token_secret {
            Some(s) if !s.is_empty() => {}
            _ => bail!(
                "refresh token secret is not configured; set REFRESH_TOKEN_SECRET or auth.refresh_token_secret"
            ),
        }
        Ok(())
    }
}
