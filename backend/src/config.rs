//! Environment-driven configuration.
//!
//! Every setting has a development default so `cargo run` works out of the
//! box; deployments override them through environment variables.

use std::env;
use std::path::PathBuf;
use thiserror::Error;

const DEV_SECRET_KEY: &str = "portal-development-secret-change-this-in-production";
const DEFAULT_DATABASE_PATH: &str = "instance/portal.db";
const DEFAULT_UPLOAD_FOLDER: &str = "uploads";

/// 16 MiB, the largest request body an upload form may send.
pub const DEFAULT_MAX_CONTENT_LENGTH: usize = 16 * 1024 * 1024;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("SECRET_KEY must be at least 32 bytes long")]
    SecretKeyTooShort,
    #[error("unsupported DATABASE_URL '{0}': only sqlite is available")]
    UnsupportedDatabase(String),
    #[error("{name} has an invalid value '{value}'")]
    InvalidValue { name: &'static str, value: String },
}

#[derive(Debug, Clone)]
pub struct Config {
    pub secret_key: String,
    pub database_path: PathBuf,
    pub upload_folder: PathBuf,
    pub host: String,
    pub port: u16,
    pub student_id_prefix: String,
    pub bcrypt_cost: u32,
    pub max_content_length: usize,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            secret_key: DEV_SECRET_KEY.to_string(),
            database_path: PathBuf::from(DEFAULT_DATABASE_PATH),
            upload_folder: PathBuf::from(DEFAULT_UPLOAD_FOLDER),
            host: "127.0.0.1".to_string(),
            port: 8080,
            student_id_prefix: "MPC".to_string(),
            bcrypt_cost: bcrypt::DEFAULT_COST,
            max_content_length: DEFAULT_MAX_CONTENT_LENGTH,
        }
    }
}

impl Config {
    /// Reads `SECRET_KEY`, `DATABASE_URL`, `UPLOAD_FOLDER`, `HOST`, `PORT`,
    /// `STUDENT_ID_PREFIX`, `BCRYPT_COST` and `MAX_CONTENT_LENGTH`.
    pub fn from_env() -> Result<Self, ConfigError> {
        let mut config = Config::default();

        if let Some(key) = var("SECRET_KEY") {
            config.secret_key = key;
        }
        if let Some(url) = var("DATABASE_URL") {
            config.database_path = parse_database_url(&url)?;
        }
        if let Some(folder) = var("UPLOAD_FOLDER") {
            config.upload_folder = PathBuf::from(folder);
        }
        if let Some(host) = var("HOST") {
            config.host = host;
        }
        if let Some(port) = var("PORT") {
            config.port = parse_number("PORT", &port)?;
        }
        if let Some(prefix) = var("STUDENT_ID_PREFIX") {
            config.student_id_prefix = prefix;
        }
        if let Some(cost) = var("BCRYPT_COST") {
            config.bcrypt_cost = parse_number("BCRYPT_COST", &cost)?;
        }
        if let Some(limit) = var("MAX_CONTENT_LENGTH") {
            config.max_content_length = parse_number("MAX_CONTENT_LENGTH", &limit)?;
        }

        config.validate()?;
        Ok(config)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.secret_key.len() < 32 {
            return Err(ConfigError::SecretKeyTooShort);
        }
        Ok(())
    }

    pub fn gallery_folder(&self) -> PathBuf {
        self.upload_folder.join("gallery")
    }

    pub fn notes_folder(&self) -> PathBuf {
        self.upload_folder.join("notes")
    }

    pub fn avatars_folder(&self) -> PathBuf {
        self.upload_folder.join("avatars")
    }

    pub fn thumbnails_folder(&self) -> PathBuf {
        self.upload_folder.join("thumbnails")
    }
}

fn var(name: &str) -> Option<String> {
    env::var(name).ok().filter(|v| !v.trim().is_empty())
}

fn parse_number<T: std::str::FromStr>(name: &'static str, value: &str) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::InvalidValue {
        name,
        value: value.to_string(),
    })
}

/// Accepts `sqlite://relative/path`, `sqlite:///absolute/path` or a bare
/// filesystem path.
pub fn parse_database_url(url: &str) -> Result<PathBuf, ConfigError> {
    if let Some(rest) = url.strip_prefix("sqlite://") {
        if rest.is_empty() || rest.starts_with(":memory:") {
            return Err(ConfigError::UnsupportedDatabase(url.to_string()));
        }
        return Ok(PathBuf::from(rest));
    }
    if url.contains("://") {
        return Err(ConfigError::UnsupportedDatabase(url.to_string()));
    }
    Ok(PathBuf::from(url))
}
