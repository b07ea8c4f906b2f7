//! Backend configuration and bootstrap.
//!
//! # Responsibility
//! - Load the backend configuration object from JSON.
//! - Open the migrated database and hand out tree/blob stores over it.
//!
//! # Invariants
//! - `database_path` and `storage_bucket` are never empty after loading.
//! - Unknown keys are ignored, so hosted-backend config objects (API keys,
//!   project ids) can be passed through unchanged.

use crate::blob::SqliteBlobStore;
use crate::db::{open_db, open_db_in_memory, DbError};
use crate::logging::{default_log_level, init_logging, LoggingError};
use crate::tree::SqliteTreeStore;
use log::info;
use rusqlite::Connection;
use serde::Deserialize;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const DEFAULT_DOWNLOAD_BASE_URL: &str = "https://firebasestorage.googleapis.com";

/// Backend configuration object.
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BackendConfig {
    /// SQLite file holding the record tree and the photo bucket.
    pub database_path: PathBuf,
    /// Bucket name rendered into download URLs.
    pub storage_bucket: String,
    #[serde(default = "default_download_base_url")]
    pub download_base_url: String,
    /// `trace|debug|info|warn|error`; defaults per build mode.
    #[serde(default)]
    pub log_level: Option<String>,
    /// Absolute directory for rolling log files; logging stays off when unset.
    #[serde(default)]
    pub log_dir: Option<String>,
}

fn default_download_base_url() -> String {
    DEFAULT_DOWNLOAD_BASE_URL.to_string()
}

impl BackendConfig {
    pub fn from_json_str(raw: &str) -> Result<Self, ConfigError> {
        let config: Self = serde_json::from_str(raw).map_err(ConfigError::Parse)?;
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let raw = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_json_str(&raw)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid("databasePath cannot be empty".to_string()));
        }
        if self.storage_bucket.trim().is_empty() {
            return Err(ConfigError::Invalid("storageBucket cannot be empty".to_string()));
        }
        if !self.download_base_url.starts_with("http://")
            && !self.download_base_url.starts_with("https://")
        {
            return Err(ConfigError::Invalid(format!(
                "downloadBaseUrl must be an http(s) URL, got `{}`",
                self.download_base_url
            )));
        }
        Ok(())
    }
}

#[derive(Debug)]
pub enum ConfigError {
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    Parse(serde_json::Error),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, source } => {
                write!(f, "cannot read config `{}`: {source}", path.display())
            }
            Self::Parse(err) => write!(f, "malformed config: {err}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Parse(err) => Some(err),
            Self::Invalid(_) => None,
        }
    }
}

#[derive(Debug)]
pub enum BackendError {
    Config(ConfigError),
    Logging(LoggingError),
    Db(DbError),
}

impl Display for BackendError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Config(err) => write!(f, "{err}"),
            Self::Logging(err) => write!(f, "{err}"),
            Self::Db(err) => write!(f, "{err}"),
        }
    }
}

impl Error for BackendError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Config(err) => Some(err),
            Self::Logging(err) => Some(err),
            Self::Db(err) => Some(err),
        }
    }
}

impl From<ConfigError> for BackendError {
    fn from(value: ConfigError) -> Self {
        Self::Config(value)
    }
}

impl From<LoggingError> for BackendError {
    fn from(value: LoggingError) -> Self {
        Self::Logging(value)
    }
}

impl From<DbError> for BackendError {
    fn from(value: DbError) -> Self {
        Self::Db(value)
    }
}

/// Opened backend: one migrated connection shared by both stores.
pub struct Backend {
    conn: Connection,
    config: BackendConfig,
}

impl Backend {
    /// Validates `config`, starts logging when `log_dir` is set and opens
    /// the database file.
    pub fn open(config: BackendConfig) -> Result<Self, BackendError> {
        config.validate()?;
        if let Some(log_dir) = config.log_dir.as_deref() {
            let level = config.log_level.as_deref().unwrap_or(default_log_level());
            init_logging(level, log_dir)?;
        }
        let conn = open_db(&config.database_path)?;
        info!(
            "event=backend_open module=config status=ok bucket={}",
            config.storage_bucket
        );
        Ok(Self { conn, config })
    }

    /// Same as [`Backend::open`] but backed by an in-memory database.
    pub fn open_in_memory(config: BackendConfig) -> Result<Self, BackendError> {
        config.validate()?;
        let conn = open_db_in_memory()?;
        Ok(Self { conn, config })
    }

    pub fn config(&self) -> &BackendConfig {
        &self.config
    }

    pub fn connection(&self) -> &Connection {
        &self.conn
    }

    pub fn tree(&self) -> SqliteTreeStore<'_> {
        SqliteTreeStore::new(&self.conn)
    }

    pub fn blobs(&self) -> SqliteBlobStore<'_> {
        SqliteBlobStore::new(
            &self.conn,
            self.config.storage_bucket.as_str(),
            self.config.download_base_url.as_str(),
        )
    }
}
