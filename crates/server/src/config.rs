//! Process configuration read from the environment.

use std::path::PathBuf;

/// Default bind address.
pub const DEFAULT_LISTEN_ADDR: &str = "0.0.0.0:5800";
/// Default upload directory, relative to the working directory.
pub const DEFAULT_UPLOAD_DIR: &str = "uploads";
/// Default cap on request bodies, uploads included (10 MiB).
pub const DEFAULT_MAX_BODY_BYTES: usize = 10 * 1024 * 1024;
/// Connection string prefix selecting the in-memory store.
pub const MEMORY_URL_SCHEME: &str = "memory://";

/// Errors raised while loading [`Config`].
#[derive(Debug, thiserror::Error, PartialEq, Eq)]
pub enum ConfigError {
    /// A required variable is unset or blank.
    #[error("missing required environment variable `{0}`")]
    Missing(&'static str),

    /// A variable is set but cannot be parsed.
    #[error("invalid value `{value}` for environment variable `{key}`")]
    Invalid {
        /// Variable name.
        key: &'static str,
        /// Rejected value.
        value: String,
    },
}

/// Settings for one server process.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Config {
    /// Document store connection string (`MONGO_URL`).
    pub database_url: String,
    /// Database name (`DB_NAME`).
    pub database_name: String,
    /// Allowed CORS origins (`CORS_ORIGINS`, comma separated).
    pub cors_origins: Vec<String>,
    /// Bind address (`LISTEN_ADDR`).
    pub listen_addr: String,
    /// Upload directory (`UPLOAD_DIR`).
    pub upload_dir: PathBuf,
    /// Largest accepted request body in bytes (`MAX_BODY_BYTES`).
    pub max_body_bytes: usize,
}

impl Config {
    /// Loads `.env` if present, then reads the process environment.
    pub fn from_env() -> Result<Self, ConfigError> {
        if let Err(e) = dotenvy::dotenv()
            && !e.not_found()
        {
            tracing::warn!(error = %e, "failed to load .env file");
        }
        Self::from_lookup(|key| std::env::var(key).ok())
    }

    /// Builds a config from an arbitrary variable lookup.
    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |key: &str| lookup(key).map(|v| v.trim().to_owned()).filter(|v| !v.is_empty());
        let required = |key: &'static str| get(key).ok_or(ConfigError::Missing(key));

        let cors_origins = get("CORS_ORIGINS")
            .map(|raw| {
                raw.split(',')
                    .map(str::trim)
                    .filter(|o| !o.is_empty())
                    .map(ToOwned::to_owned)
                    .collect::<Vec<_>>()
            })
            .filter(|origins| !origins.is_empty())
            .unwrap_or_else(|| vec!["*".to_owned()]);

        let max_body_bytes = match get("MAX_BODY_BYTES") {
            Some(value) => value.parse().map_err(|_| ConfigError::Invalid {
                key: "MAX_BODY_BYTES",
                value,
            })?,
            None => DEFAULT_MAX_BODY_BYTES,
        };

        Ok(Self {
            database_url: required("MONGO_URL")?,
            database_name: required("DB_NAME")?,
            cors_origins,
            listen_addr: get("LISTEN_ADDR").unwrap_or_else(|| DEFAULT_LISTEN_ADDR.to_owned()),
            upload_dir: get("UPLOAD_DIR")
                .unwrap_or_else(|| DEFAULT_UPLOAD_DIR.to_owned())
                .into(),
            max_body_bytes,
        })
    }

    /// Returns `true` if `MONGO_URL` selects the in-memory store.
    #[must_use]
    pub fn uses_memory_store(&self) -> bool {
        self.database_url.starts_with(MEMORY_URL_SCHEME)
    }
}
