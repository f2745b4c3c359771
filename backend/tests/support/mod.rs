//! Shared helpers for integration tests against a real PostGIS database.
//!
//! Tests run only when `RISK_SIGNALS_TEST_DATABASE_URL` names a database the
//! suite may write to; otherwise they print a skip marker and return early.

#![allow(dead_code, reason = "each test binary uses a different subset")]

use std::sync::Mutex;

use postgres::{Client, NoTls};
use risk_signals::outbound::persistence::{DbPool, PoolConfig};
use tokio::runtime::Runtime;

/// Environment variable naming the integration test database.
pub const TEST_DATABASE_URL_VAR: &str = "RISK_SIGNALS_TEST_DATABASE_URL";

const BRONZE_DDL: &str = include_str!("../../sql/bronze_usgs_earthquakes.sql");

static SCHEMA_LOCK: Mutex<()> = Mutex::new(());

/// Return the test database URL, or print a skip marker and return `None`.
pub fn test_database_url(test_name: &str) -> Option<String> {
    match std::env::var(TEST_DATABASE_URL_VAR) {
        Ok(url) if !url.trim().is_empty() => Some(url),
        _ => {
            eprintln!("SKIP-TEST-DATABASE: {test_name} skipped; set {TEST_DATABASE_URL_VAR}");
            None
        }
    }
}

/// Connect a synchronous client for setup and assertions.
pub fn connect(url: &str) -> Result<Client, String> {
    Client::connect(url, NoTls).map_err(|err| format_postgres_error(&err))
}

/// Apply the bronze DDL once per process; concurrent `CREATE ... IF NOT EXISTS`
/// statements can still collide in the catalogue.
pub fn apply_bronze_schema(url: &str) -> Result<(), String> {
    let _guard = SCHEMA_LOCK.lock().map_err(|err| err.to_string())?;
    let mut client = connect(url)?;
    client
        .batch_execute(BRONZE_DDL)
        .map_err(|err| format_postgres_error(&err))
}

/// Build a small pool on a fresh runtime.
pub fn build_pool(runtime: &Runtime, url: &str) -> Result<DbPool, String> {
    let config = PoolConfig::new(url).with_max_size(2);
    runtime
        .block_on(async { DbPool::new(config).await })
        .map_err(|err| err.to_string())
}

/// Render a `postgres` error with its SQLSTATE, detail, and hint.
///
/// The `Display` implementation collapses server errors to `db error`.
pub fn format_postgres_error(error: &postgres::Error) -> String {
    let Some(db_error) = error.as_db_error() else {
        return error.to_string();
    };

    let mut summary = format!(
        "postgres error {:?}: {}",
        db_error.code(),
        db_error.message()
    );
    if let Some(detail) = db_error.detail() {
        summary.push_str("; detail: ");
        summary.push_str(detail);
    }
    if let Some(hint) = db_error.hint() {
        summary.push_str("; hint: ");
        summary.push_str(hint);
    }
    summary
}
