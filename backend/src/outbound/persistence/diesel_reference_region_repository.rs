//! PostgreSQL-backed reference region table replacement.

use diesel::sql_query;
use diesel::sql_types::{Array, Text};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{
    ReferenceRegion, ReferenceRegionRepository, ReferenceRegionRepositoryError,
};

use super::diesel_helpers::{
    DEFAULT_CHUNK_SIZE, affected_rows, is_connection_error, map_diesel_error_message,
    map_pool_error_message,
};
use super::pool::{DbPool, PoolError};

/// Diesel-backed implementation of the reference region port.
#[derive(Clone)]
pub struct DieselReferenceRegionRepository {
    pool: DbPool,
    chunk_size: usize,
}

impl DieselReferenceRegionRepository {
    /// Create a new repository with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self {
            pool,
            chunk_size: DEFAULT_CHUNK_SIZE,
        }
    }

    /// Set how many regions are bound into one insert; zero is raised to one.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size.max(1);
        self
    }
}

/// Column-wise arrays for one insert; geometry travels as GeoJSON text.
#[derive(Debug, Default)]
struct RegionInsertBatch {
    region_codes: Vec<String>,
    jurisdiction_codes: Vec<String>,
    region_names: Vec<String>,
    geometries: Vec<String>,
}

const PREPARE_SCHEMA_SQL: &str = "CREATE SCHEMA IF NOT EXISTS ref";
const DROP_TABLE_SQL: &str = "DROP TABLE IF EXISTS ref.ref_county";
const CREATE_TABLE_SQL: &str = r#"
CREATE TABLE ref.ref_county (
    region_code char(5) NOT NULL,
    jurisdiction_code char(2) NOT NULL,
    region_name text NOT NULL,
    geometry geometry(MultiPolygon, 4326) NOT NULL
)
"#;
const INSERT_REGIONS_SQL: &str = r#"
INSERT INTO ref.ref_county (region_code, jurisdiction_code, region_name, geometry)
SELECT
    source.region_code,
    source.jurisdiction_code,
    source.region_name,
    ST_Multi(ST_SetSRID(ST_GeomFromGeoJSON(source.geometry), 4326))
FROM unnest(
    $1::text[],
    $2::text[],
    $3::text[],
    $4::text[]
) AS source(region_code, jurisdiction_code, region_name, geometry)
"#;
const FINALISE_TABLE_SQL: &[&str] = &[
    "ALTER TABLE ref.ref_county ADD CONSTRAINT ref_county_pkey PRIMARY KEY (region_code)",
    "CREATE INDEX ref_county_geometry_gist ON ref.ref_county USING GIST (geometry)",
    "CREATE INDEX ref_county_jurisdiction_code_idx ON ref.ref_county (jurisdiction_code)",
    "ANALYZE ref.ref_county",
];

fn map_pool_error(error: PoolError) -> ReferenceRegionRepositoryError {
    ReferenceRegionRepositoryError::connection(map_pool_error_message(error))
}

fn map_diesel_error(error: diesel::result::Error) -> ReferenceRegionRepositoryError {
    let connection_lost = is_connection_error(&error);
    let message = map_diesel_error_message(error, "reference table replacement");
    if connection_lost {
        ReferenceRegionRepositoryError::connection(message)
    } else {
        ReferenceRegionRepositoryError::query(message)
    }
}

fn to_insert_batch(
    regions: &[ReferenceRegion],
) -> Result<RegionInsertBatch, ReferenceRegionRepositoryError> {
    let mut batch = RegionInsertBatch::default();
    for region in regions {
        let geometry = geojson::Geometry::new(geojson::Value::from(&region.geometry));
        let encoded = serde_json::to_string(&geometry).map_err(|error| {
            ReferenceRegionRepositoryError::encode(format!(
                "failed to encode geometry for {}: {error}",
                region.region_code
            ))
        })?;
        batch.region_codes.push(region.region_code.clone());
        batch.jurisdiction_codes.push(region.jurisdiction_code.clone());
        batch.region_names.push(region.region_name.clone());
        batch.geometries.push(encoded);
    }
    Ok(batch)
}

#[async_trait::async_trait]
impl ReferenceRegionRepository for DieselReferenceRegionRepository {
    async fn replace_regions(
        &self,
        regions: &[ReferenceRegion],
    ) -> Result<u64, ReferenceRegionRepositoryError> {
        use diesel_async::AsyncConnection as _;
        use diesel_async::scoped_futures::ScopedFutureExt as _;

        let batches = regions
            .chunks(self.chunk_size)
            .map(to_insert_batch)
            .collect::<Result<Vec<_>, _>>()?;
        let mut conn = self.pool.get().await.map_err(map_pool_error)?;

        // PostgreSQL DDL is transactional: a failure anywhere restores the
        // previous table.
        let loaded = conn
            .transaction(|conn| {
                async move {
                    for statement in [PREPARE_SCHEMA_SQL, DROP_TABLE_SQL, CREATE_TABLE_SQL] {
                        sql_query(statement).execute(conn).await?;
                    }
                    let mut loaded = 0_usize;
                    for batch in &batches {
                        loaded += sql_query(INSERT_REGIONS_SQL)
                            .bind::<Array<Text>, _>(&batch.region_codes)
                            .bind::<Array<Text>, _>(&batch.jurisdiction_codes)
                            .bind::<Array<Text>, _>(&batch.region_names)
                            .bind::<Array<Text>, _>(&batch.geometries)
                            .execute(conn)
                            .await?;
                    }
                    for statement in FINALISE_TABLE_SQL {
                        sql_query(*statement).execute(conn).await?;
                    }
                    Ok(loaded)
                }
                .scope_boxed()
            })
            .await
            .map_err(map_diesel_error)?;

        Ok(affected_rows(loaded))
    }
}
