//! Shared bb8 pool of `diesel-async` PostgreSQL connections.
//!
//! Each binary builds one pool per run and hands clones to its adapters.
//! Connections open lazily, so a batch run only dials the database when the
//! first adapter checks one out.

use std::time::Duration;

use diesel_async::AsyncPgConnection;
use diesel_async::pooled_connection::AsyncDieselConnectionManager;
use diesel_async::pooled_connection::bb8::{Pool, PooledConnection};

/// Connection ceiling used when no setting overrides it.
pub const DEFAULT_POOL_MAX_SIZE: u32 = 10;
/// Checkout deadline used when no setting overrides it.
pub const DEFAULT_POOL_CONNECTION_TIMEOUT: Duration = Duration::from_secs(30);

/// Pool setup and checkout failures.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum PoolError {
    /// No connection became available before the checkout deadline.
    #[error("connection checkout failed: {message}")]
    Checkout { message: String },

    /// The manager rejected the URL or the pool could not be assembled.
    #[error("connection pool setup failed: {message}")]
    Build { message: String },
}

impl PoolError {
    pub fn checkout(message: impl Into<String>) -> Self {
        Self::Checkout {
            message: message.into(),
        }
    }

    pub fn build(message: impl Into<String>) -> Self {
        Self::Build {
            message: message.into(),
        }
    }
}

/// Target database and sizing for a [`DbPool`].
#[derive(Debug, Clone)]
pub struct PoolConfig {
    database_url: String,
    max_size: u32,
    connection_timeout: Duration,
}

impl PoolConfig {
    pub fn new(database_url: impl Into<String>) -> Self {
        Self {
            database_url: database_url.into(),
            max_size: DEFAULT_POOL_MAX_SIZE,
            connection_timeout: DEFAULT_POOL_CONNECTION_TIMEOUT,
        }
    }

    /// Cap the number of open connections; zero is raised to one.
    pub fn with_max_size(mut self, max_size: u32) -> Self {
        self.max_size = max_size.max(1);
        self
    }

    pub fn with_connection_timeout(mut self, timeout: Duration) -> Self {
        self.connection_timeout = timeout;
        self
    }

    pub fn database_url(&self) -> &str {
        &self.database_url
    }

    pub fn max_size(&self) -> u32 {
        self.max_size
    }

    pub fn connection_timeout(&self) -> Duration {
        self.connection_timeout
    }
}

/// Cloneable handle to the shared connection pool.
#[derive(Clone)]
pub struct DbPool {
    inner: Pool<AsyncPgConnection>,
}

impl DbPool {
    /// Build the pool described by `config`.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Build`] when bb8 rejects the configuration.
    pub async fn new(config: PoolConfig) -> Result<Self, PoolError> {
        let manager = AsyncDieselConnectionManager::<AsyncPgConnection>::new(config.database_url);
        let inner = Pool::builder()
            .max_size(config.max_size)
            .connection_timeout(config.connection_timeout)
            .build(manager)
            .await
            .map_err(|error| PoolError::build(error.to_string()))?;
        Ok(Self { inner })
    }

    /// Check out a connection, waiting up to the configured deadline.
    ///
    /// # Errors
    ///
    /// Returns [`PoolError::Checkout`] when the deadline passes or the
    /// connection attempt fails.
    pub async fn get(&self) -> Result<PooledConnection<'_, AsyncPgConnection>, PoolError> {
        self.inner
            .get()
            .await
            .map_err(|error| PoolError::checkout(error.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[rstest]
    #[case::defaults(None, None, DEFAULT_POOL_MAX_SIZE, DEFAULT_POOL_CONNECTION_TIMEOUT)]
    #[case::overridden(Some(4), Some(5), 4, Duration::from_secs(5))]
    #[case::zero_size(Some(0), None, 1, DEFAULT_POOL_CONNECTION_TIMEOUT)]
    fn config_applies_overrides(
        #[case] max_size: Option<u32>,
        #[case] timeout_secs: Option<u64>,
        #[case] expected_size: u32,
        #[case] expected_timeout: Duration,
    ) {
        let mut config = PoolConfig::new("postgres://localhost/risk");
        if let Some(size) = max_size {
            config = config.with_max_size(size);
        }
        if let Some(secs) = timeout_secs {
            config = config.with_connection_timeout(Duration::from_secs(secs));
        }

        assert_eq!(config.database_url(), "postgres://localhost/risk");
        assert_eq!(config.max_size(), expected_size);
        assert_eq!(config.connection_timeout(), expected_timeout);
    }
}
