//! Check that the configured database is reachable and has PostGIS installed.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;

use clap::Parser;
use risk_signals::config::IngestSettings;
use risk_signals::domain::ports::StoreHealthCheck;
use risk_signals::outbound::persistence::{DbPool, PostgisHealthCheck};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

const BINARY_NAME: &str = "db-smoke";

/// `db-smoke` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "db-smoke",
    about = "Run SELECT 1 and PostGIS_Version() against the configured database",
    version
)]
struct CliArgs {
    /// Database connection URL. Falls back to settings, then `DATABASE_URL`.
    #[arg(long = "database-url", value_name = "url")]
    database_url: Option<String>,
}

fn main() -> io::Result<()> {
    let runtime = Builder::new_current_thread()
        .enable_all()
        .build()
        .map_err(|error| io::Error::other(format!("create Tokio runtime: {error}")))?;
    runtime.block_on(async_main())
}

async fn async_main() -> io::Result<()> {
    if let Err(error) = fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .json()
        .try_init()
    {
        warn!(error = %error, "tracing init failed");
    }

    let args = CliArgs::try_parse().map_err(io::Error::other)?;
    let settings = IngestSettings::load_from_env(BINARY_NAME)?;
    let database_url = settings.resolve_database_url(args.database_url)?;
    let pool = DbPool::new(settings.pool_config(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let health = PostgisHealthCheck::new(pool)
        .check()
        .await
        .map_err(|error| io::Error::other(format!("database smoke check failed: {error}")))?;

    println!("select_one={}", health.select_one);
    println!("postgis_version={}", health.postgis_version);

    Ok(())
}

#[cfg(test)]
mod tests {
    //! Unit tests for CLI parsing.

    use clap::Parser;
    use rstest::rstest;

    use super::CliArgs;

    #[rstest]
    fn database_url_is_optional() {
        let args = CliArgs::try_parse_from(["db-smoke"]).expect("parses without flags");
        assert!(args.database_url.is_none());
    }

    #[rstest]
    fn rejects_positional_arguments() {
        assert!(CliArgs::try_parse_from(["db-smoke", "extra"]).is_err());
    }
}
