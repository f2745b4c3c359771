//! Driven port for checking that the geospatial store is reachable.

use async_trait::async_trait;

use super::define_port_error;

/// Smoke-check results reported by the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreHealth {
    /// Result of `SELECT 1`.
    pub select_one: i32,
    /// Result of `PostGIS_Version()`.
    pub postgis_version: String,
}

define_port_error! {
    /// Errors raised while checking the store.
    pub enum StoreHealthError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "store connection failed: {message}",
        /// A health query failed; PostGIS may be missing.
        Query { message: String } =>
            "store health query failed: {message}",
    }
}

/// Port for checking store connectivity and spatial support.
#[async_trait]
pub trait StoreHealthCheck: Send + Sync {
    /// Run the smoke queries.
    async fn check(&self) -> Result<StoreHealth, StoreHealthError>;
}
