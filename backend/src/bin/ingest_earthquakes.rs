//! Fetch a window of earthquake events and upsert them into the bronze table.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::sync::Arc;

use chrono::TimeDelta;
use clap::Parser;
use mockable::DefaultClock;
use risk_signals::config::IngestSettings;
use risk_signals::domain::EventIngestionService;
use risk_signals::domain::ports::{EventIngestionCommand, EventIngestionRequest};
use risk_signals::outbound::feed::UsgsFeedHttpSource;
use risk_signals::outbound::persistence::{DbPool, DieselEventRepository};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

const BINARY_NAME: &str = "ingest-earthquakes";

/// `ingest-earthquakes` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "ingest-earthquakes",
    about = "Fetch recent earthquakes and upsert them into bronze.usgs_earthquakes",
    version
)]
struct CliArgs {
    /// Lookback window in days, ending now.
    #[arg(
        long = "days-back",
        value_name = "days",
        default_value_t = 7,
        value_parser = parse_days_back
    )]
    days_back: i64,
    /// Minimum magnitude passed to the feed.
    #[arg(long = "min-magnitude", value_name = "magnitude", default_value_t = 2.5)]
    min_magnitude: f64,
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

    let feed = UsgsFeedHttpSource::with_identity(
        settings.feed_endpoint()?,
        settings.feed_timeout(),
        settings.feed_identity(),
    )
    .map_err(|error| io::Error::other(format!("create feed client: {error}")))?;
    let repository =
        DieselEventRepository::new(pool).with_chunk_size(settings.upsert_chunk_size());
    let command = EventIngestionService::new(
        Arc::new(feed),
        Arc::new(repository),
        Arc::new(DefaultClock),
    );

    let request = EventIngestionRequest {
        lookback: TimeDelta::days(args.days_back),
        min_magnitude: args.min_magnitude,
    };
    let stats = command
        .run(request)
        .await
        .map_err(|error| io::Error::other(format!("ingestion run failed: {error}")))?;

    println!("fetched={}", stats.fetched);
    println!("parsed={}", stats.parsed);
    println!("skipped={}", stats.skipped);
    println!("written={}", stats.written);

    Ok(())
}

fn parse_days_back(raw: &str) -> Result<i64, String> {
    let days = raw
        .trim()
        .parse::<i64>()
        .map_err(|error| format!("failed to parse days back: {error}"))?;
    if !(1..=3650).contains(&days) {
        return Err("days back must be between 1 and 3650".to_owned());
    }
    Ok(days)
}
