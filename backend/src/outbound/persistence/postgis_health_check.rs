//! Store smoke check: connectivity plus PostGIS availability.

use diesel::QueryableByName;
use diesel::sql_query;
use diesel::sql_types::{Integer, Text};
use diesel_async::RunQueryDsl;

use crate::domain::ports::{StoreHealth, StoreHealthCheck, StoreHealthError};

use super::diesel_helpers::{map_diesel_error_message, map_pool_error_message};
use super::pool::DbPool;

/// Runs `SELECT 1` and `SELECT PostGIS_Version()` through the pool.
#[derive(Clone)]
pub struct PostgisHealthCheck {
    pool: DbPool,
}

impl PostgisHealthCheck {
    /// Create a new health check with the given connection pool.
    pub fn new(pool: DbPool) -> Self {
        Self { pool }
    }
}

#[derive(QueryableByName)]
struct SelectOneRow {
    #[diesel(sql_type = Integer)]
    value: i32,
}

#[derive(QueryableByName)]
struct PostgisVersionRow {
    #[diesel(sql_type = Text)]
    version: String,
}

#[async_trait::async_trait]
impl StoreHealthCheck for PostgisHealthCheck {
    async fn check(&self) -> Result<StoreHealth, StoreHealthError> {
        let mut conn = self
            .pool
            .get()
            .await
            .map_err(|error| StoreHealthError::connection(map_pool_error_message(error)))?;
        let select_one = sql_query("SELECT 1 AS value")
            .get_result::<SelectOneRow>(&mut conn)
            .await
            .map_err(|error| {
                StoreHealthError::query(map_diesel_error_message(error, "select one"))
            })?;
        let postgis = sql_query("SELECT PostGIS_Version() AS version")
            .get_result::<PostgisVersionRow>(&mut conn)
            .await
            .map_err(|error| {
                StoreHealthError::query(map_diesel_error_message(error, "postgis version"))
            })?;

        Ok(StoreHealth {
            select_one: select_one.value,
            postgis_version: postgis.version,
        })
    }
}
