//! Driven port for the idempotent bronze event store.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::define_port_error;

/// Validated event row ready for a conflict-resolving write.
///
/// The point geometry is not part of the row: adapters derive it from
/// `longitude`/`latitude` on every write.
#[derive(Debug, Clone, PartialEq)]
pub struct EventRow {
    /// Source identifier; the primary key of the stored row.
    pub event_id: String,
    /// Observation time normalised to UTC.
    pub observed_at: DateTime<Utc>,
    /// Reported magnitude, when present.
    pub magnitude: Option<f64>,
    /// Human-readable place description, when present.
    pub description: Option<String>,
    /// Longitude in WGS84 degrees.
    pub longitude: f64,
    /// Latitude in WGS84 degrees.
    pub latitude: f64,
    /// Hypocentre depth in kilometres, when present.
    pub depth: Option<f64>,
    /// Source feature stored verbatim for audit and replay.
    pub raw_payload: Value,
}

define_port_error! {
    /// Errors raised while writing event rows.
    pub enum EventRepositoryError {
        /// Repository connection could not be established.
        Connection { message: String } =>
            "event store connection failed: {message}",
        /// The batch transaction failed and was rolled back.
        Query { message: String } =>
            "event store write failed: {message}",
        /// Rows could not be converted for persistence.
        Encode { message: String } =>
            "event row encoding failed: {message}",
    }
}

/// Port for writing event rows to the store.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventRepository: Send + Sync {
    /// Upsert rows keyed by `event_id` inside one transaction.
    ///
    /// On key collision every mutable column and `updated_at` are rewritten
    /// while `ingested_at` is preserved. Any failure rolls the whole batch
    /// back. Returns the number of rows inserted or updated.
    async fn upsert_events(&self, rows: &[EventRow]) -> Result<u64, EventRepositoryError>;
}

/// Fixture implementation that accepts every row without storing it.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureEventRepository;

#[async_trait]
impl EventRepository for FixtureEventRepository {
    async fn upsert_events(&self, rows: &[EventRow]) -> Result<u64, EventRepositoryError> {
        u64::try_from(rows.len()).map_err(|_| EventRepositoryError::encode("row count overflow"))
    }
}
