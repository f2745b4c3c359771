//! PostgreSQL-backed bronze event store adapter.

use std::collections::HashSet;

use chrono::{DateTime, Utc};
use diesel::sql_query;
use diesel::sql_types::{Array, Double, Jsonb, Nullable, Text, Timestamptz};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{EventRepository, EventRepositoryError, EventRow};

use super::diesel_helpers::{
    DEFAULT_CHUNK_SIZE, affected_rows, is_connection_error, map_diesel_error_message,
    map_pool_error_message,
};
use super::pool::{DbPool, PoolError};

/// Diesel-backed implementation of the event repository port.
#[derive(Clone)]
pub struct DieselEventRepository {
    pool: DbPool,
    chunk_size: usize,
}

impl DieselEventRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set how many rows are bound into one statement; zero is raised to one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

/// Column-wise arrays for one `unnest` statement.
#[derive(Debug, Default)]
struct EventUpsertBatch {
    event_ids: Vec<String>,
    observed_at: Vec<DateTime<Utc>>,
    magnitudes: Vec<Option<f64>>,
    descriptions: Vec<Option<String>>,
    longitudes: Vec<f64>,
    latitudes: Vec<f64>,
    depths: Vec<Option<f64>>,
    raw_payloads: Vec<serde_json::Value>,
}

impl EventUpsertBatch {
    fn from_rows(rows: &[&EventRow]) -> Self {
        let mut batch = Self::default();
        for row in rows {
            batch.event_ids.push(row.event_id.clone());
            batch.observed_at.push(row.observed_at);
            batch.magnitudes.push(row.magnitude);
            batch.descriptions.push(row.description.clone());
            batch.longitudes.push(row.longitude);
            batch.latitudes.push(row.latitude);
            batch.depths.push(row.depth);
            batch.raw_payloads.push(row.raw_payload.clone());
        }
        batch
    }
}

const UPSERT_EVENTS_SQL: &str = r#"
INSERT INTO bronze.usgs_earthquakes (
    event_id, observed_at, magnitude, description, longitude, latitude, depth,
    geometry, raw_payload, ingested_at, updated_at
)
SELECT
    source.event_id,
    source.observed_at,
    source.magnitude,
    source.description,
    source.longitude,
    source.latitude,
    source.depth,
    ST_SetSRID(ST_MakePoint(source.longitude, source.latitude), 4326),
    source.raw_payload,
    now(),
    now()
FROM unnest(
    $1::text[],
    $2::timestamptz[],
    $3::double precision[],
    $4::text[],
    $5::double precision[],
    $6::double precision[],
    $7::double precision[],
    $8::jsonb[]
) AS source(event_id, observed_at, magnitude, description, longitude, latitude, depth, raw_payload)
ON CONFLICT (event_id)
DO UPDATE SET
    observed_at = EXCLUDED.observed_at,
    magnitude = EXCLUDED.magnitude,
    description = EXCLUDED.description,
    longitude = EXCLUDED.longitude,
    latitude = EXCLUDED.latitude,
    depth = EXCLUDED.depth,
    geometry = EXCLUDED.geometry,
    raw_payload = EXCLUDED.raw_payload,
    updated_at = now()
"#;

fn map_pool_error(error: PoolError) -> EventRepositoryError {
    EventRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> EventRepositoryError {
    let connection_lost = is_connection_error(&error);
    let message = map_diesel_error_message(error, "event upsert");
    if connection_lost {
        EventRepositoryError::connection(message)
    } else {
        EventRepositoryError::query(message)
    }
}

/// Keep the last occurrence of each `event_id`, preserving feed order.
///
/// One `ON CONFLICT` statement cannot touch the same row twice.
fn collapse_duplicates(rows: &[EventRow]) -> Vec<&EventRow> {
    let mut seen = HashSet::with_capacity(rows.len());
    let mut kept = rows
        .iter()
        .rev()
        .filter(|row| seen.insert(row.event_id.as_str()))
        .collect::<Vec<_>>();
    kept.reverse();
    kept
}

#[async_trait::async_trait]
impl EventRepository for DieselEventRepository {
    async fn upsert_events(&self, rows: &[EventRow]) -> Result<u64, EventRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        if rows.is_empty() {
            return Ok(0);
        }
        let batches = collapse_duplicates(rows)
            .chunks(self.chunk_size)
            .map(EventUpsertBatch::from_rows)
            .collect::<Vec<_>>();
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // All chunks share one transaction so any failing row rolls back the
        // whole batch.
        let written = conn
            .transaction(|conn| {
                async move {
                    let mut written = 0_usize;
                    for batch in &batches {
                        written += sql_query(UPSERT_EVENTS_SQL)
                            .bind::<Array<Text>, _>(&batch.event_ids)
                            .bind::<Array<Timestamptz>, _>(&batch.observed_at)
                            .bind::<Array<Nullable<Double>>, _>(&batch.magnitudes)
                            .bind::<Array<Nullable<Text>>, _>(&batch.descriptions)
                            .bind::<Array<Double>, _>(&batch.longitudes)
                            .bind::<Array<Double>, _>(&batch.latitudes)
                            .bind::<Array<Nullable<Double>>, _>(&batch.depths)
                            .bind::<Array<Jsonb>, _>(&batch.raw_payloads)
                            .execute(conn)
                            .await?;
                    }
                    Ok(written)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(affected_rows(written))
    }
}
