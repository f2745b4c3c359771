//! Runtime settings for the ingestion binaries loaded via OrthoConfig.
//!
//! Tunables carry defaults so a bare `DATABASE_URL` is enough to run.

use std::env;
use std::ffi::OsString;
use std::io;
use std::time::Duration;

use ortho_config::OrthoConfig;
use reqwest::Url;
use serde::Deserialize;

use crate::outbound::feed::FeedHttpIdentity;
use crate::outbound::persistence::{
    DEFAULT_CHUNK_SIZE, DEFAULT_POOL_CONNECTION_TIMEOUT, DEFAULT_POOL_MAX_SIZE, PoolConfig,
};

/// Default event feed query endpoint.
pub const DEFAULT_FEED_ENDPOINT: &str = "https://earthquake.usgs.gov/fdsnws/event/1/query";
const DEFAULT_FEED_TIMEOUT_SECS: u64 = 60;
const DEFAULT_FEED_RESULT_LIMIT: u32 = 20_000;
const DEFAULT_POOL_CONNECTION_TIMEOUT_SECS: u64 = DEFAULT_POOL_CONNECTION_TIMEOUT.as_secs();

/// Settings shared by the ingestion, reference load, and smoke binaries.
#[derive(Debug, Clone, Deserialize, OrthoConfig)]
#[ortho_config(prefix = "RISK_SIGNALS")]
pub struct IngestSettings {
    /// Database connection URL; `DATABASE_URL` is consulted when unset.
    pub database_url: Option<String>,
    /// Event feed query endpoint.
    #[ortho_config(default = DEFAULT_FEED_ENDPOINT.to_owned())]
    pub feed_endpoint: String,
    /// Whole-request deadline for the feed call, in seconds.
    #[ortho_config(default = DEFAULT_FEED_TIMEOUT_SECS)]
    pub feed_timeout_secs: u64,
    /// Value of the feed `limit` parameter.
    #[ortho_config(default = DEFAULT_FEED_RESULT_LIMIT)]
    pub feed_result_limit: u32,
    /// User agent sent to the feed; the adapter's own identity when unset.
    pub feed_user_agent: Option<String>,
    /// Rows bound into one upsert or insert statement.
    #[ortho_config(default = DEFAULT_CHUNK_SIZE)]
    pub upsert_chunk_size: usize,
    /// Maximum pooled connections.
    #[ortho_config(default = DEFAULT_POOL_MAX_SIZE)]
    pub pool_max_size: u32,
    /// Pool checkout deadline, in seconds.
    #[ortho_config(default = DEFAULT_POOL_CONNECTION_TIMEOUT_SECS)]
    pub pool_connection_timeout_secs: u64,
}

impl Default for IngestSettings {
    fn default() -> Self {
        Self {
            database_url: None,
            feed_endpoint: DEFAULT_FEED_ENDPOINT.to_owned(),
            feed_timeout_secs: DEFAULT_FEED_TIMEOUT_SECS,
            feed_result_limit: DEFAULT_FEED_RESULT_LIMIT,
            feed_user_agent: None,
            upsert_chunk_size: DEFAULT_CHUNK_SIZE,
            pool_max_size: DEFAULT_POOL_MAX_SIZE,
            pool_connection_timeout_secs: DEFAULT_POOL_CONNECTION_TIMEOUT_SECS,
        }
    }
}

impl IngestSettings {
    /// Load settings from the environment and config files only.
    ///
    /// Command-line flags belong to each binary, so no arguments are forwarded.
    ///
    /// # Errors
    ///
    /// Returns an error when a configured value cannot be parsed.
    pub fn load_from_env(binary: &str) -> io::Result<Self> {
        Self::load_from_iter([OsString::from(binary)])
            .map_err(|error| io::Error::other(format!("load settings: {error}")))
    }

    /// Return the parsed feed endpoint.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when the configured endpoint is not a URL.
    pub fn feed_endpoint(&self) -> io::Result<Url> {
        Url::parse(&self.feed_endpoint).map_err(|error| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                format!("invalid feed endpoint '{}': {error}", self.feed_endpoint),
            )
        })
    }

    /// Return the feed request deadline.
    pub fn feed_timeout(&self) -> Duration {
        Duration::from_secs(self.feed_timeout_secs)
    }

    /// Return the outbound identity for feed requests.
    pub fn feed_identity(&self) -> FeedHttpIdentity {
        let defaults = FeedHttpIdentity::default();
        FeedHttpIdentity {
            user_agent: self
                .feed_user_agent
                .clone()
                .unwrap_or(defaults.user_agent),
            result_limit: self.feed_result_limit,
        }
    }

    /// Return the statement chunk size for bulk writes.
    pub fn upsert_chunk_size(&self) -> usize {
        self.upsert_chunk_size.max(1)
    }

    /// Build the pool configuration for `database_url`.
    pub fn pool_config(&self, database_url: &str) -> PoolConfig {
        PoolConfig::new(database_url)
            .with_max_size(self.pool_max_size)
            .with_connection_timeout(Duration::from_secs(self.pool_connection_timeout_secs))
    }

    /// Resolve the database URL: explicit flag, then settings, then `DATABASE_URL`.
    ///
    /// # Errors
    ///
    /// Returns `InvalidInput` when no source provides a non-blank URL.
    pub fn resolve_database_url(&self, explicit: Option<String>) -> io::Result<String> {
        if let Some(value) = explicit {
            if value.trim().is_empty() {
                return Err(io::Error::new(
                    io::ErrorKind::InvalidInput,
                    "--database-url must not be empty when provided",
                ));
            }
            return Ok(value);
        }
        if let Some(value) = self
            .database_url
            .as_ref()
            .filter(|value| !value.trim().is_empty())
        {
            return Ok(value.clone());
        }

        let from_env = env::var("DATABASE_URL").map_err(|_| {
            io::Error::new(
                io::ErrorKind::InvalidInput,
                "database URL missing: set --database-url, RISK_SIGNALS_DATABASE_URL, or DATABASE_URL",
            )
        })?;
        if from_env.trim().is_empty() {
            return Err(io::Error::new(
                io::ErrorKind::InvalidInput,
                "DATABASE_URL must not be empty",
            ));
        }
        Ok(from_env)
    }
}
