//! PostgreSQL persistence adapters using Diesel.
//!
//! Adapters write through raw, array-bound SQL because the tables carry
//! PostGIS geometry columns that Diesel's typed schema cannot express.
//!
//! # Example
//!
//! ```ignore
//! use risk_signals::outbound::persistence::{DbPool, DieselEventRepository, PoolConfig};
//!
//! let pool = DbPool::new(PoolConfig::new("postgres://localhost/risk")).await?;
//! let repo = DieselEventRepository::new(pool).with_chunk_size(250);
//! ```

mod diesel_event_repository;
pub(crate) mod diesel_helpers;
mod diesel_reference_region_repository;
mod pool;
mod postgis_health_check;

pub use diesel_event_repository::DieselEventRepository;
pub use diesel_helpers::DEFAULT_CHUNK_SIZE;
pub use diesel_reference_region_repository::DieselReferenceRegionRepository;
pub use pool::{
    DEFAULT_POOL_CONNECTION_TIMEOUT, DEFAULT_POOL_MAX_SIZE, DbPool, PoolConfig, PoolError,
};
pub use postgis_health_check::PostgisHealthCheck;
