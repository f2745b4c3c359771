//! Replace the reference region table from a shapefile, GeoJSON, or zip archive.
#![cfg_attr(not(any(test, doctest)), deny(clippy::unwrap_used))]
#![cfg_attr(not(any(test, doctest)), deny(clippy::expect_used))]

use std::io;
use std::path::PathBuf;
use std::sync::Arc;

use clap::Parser;
use risk_signals::config::IngestSettings;
use risk_signals::domain::ReferenceLoadService;
use risk_signals::domain::ports::{ReferenceLoadCommand, ReferenceLoadRequest};
use risk_signals::outbound::dataset::FileRegionDatasetSource;
use risk_signals::outbound::persistence::{DbPool, DieselReferenceRegionRepository};
use tokio::runtime::Builder;
use tracing::warn;
use tracing_subscriber::{EnvFilter, fmt};

const BINARY_NAME: &str = "load-reference-regions";

/// `load-reference-regions` command arguments.
#[derive(Debug, Clone, Parser)]
#[command(
    name = "load-reference-regions",
    about = "Normalise a county boundary dataset and replace ref.ref_county",
    version
)]
struct CliArgs {
    /// Path to a `.shp`, `.geojson`, or `.zip` dataset.
    #[arg(value_name = "PATH")]
    source_path: PathBuf,
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
    ensure_source_exists(&args.source_path)?;

    let settings = IngestSettings::load_from_env(BINARY_NAME)?;
    let database_url = settings.resolve_database_url(args.database_url)?;
    let pool = DbPool::new(settings.pool_config(&database_url))
        .await
        .map_err(|error| io::Error::other(format!("create database pool: {error}")))?;

    let repository = DieselReferenceRegionRepository::new(pool)
        .with_chunk_size(settings.upsert_chunk_size());
    let command =
        ReferenceLoadService::new(Arc::new(FileRegionDatasetSource), Arc::new(repository));

    let stats = command
        .load(ReferenceLoadRequest {
            source_path: args.source_path,
        })
        .await
        .map_err(|error| {
            if error.affects_reference_table() {
                io::Error::other(format!(
                    "reference load failed during table replacement: {error}"
                ))
            } else {
                io::Error::other(format!("reference load failed: {error}"))
            }
        })?;

    println!("features_read={}", stats.features_read);
    println!("regions_loaded={}", stats.regions_loaded);
    println!("geometries_repaired={}", stats.geometries_repaired);
    println!(
        "source_epsg={}",
        stats
            .source_epsg
            .map_or_else(|| "none".to_owned(), |code| code.to_string())
    );
    println!("reprojected={}", stats.reprojected);
    println!("source_digest={}", stats.source_digest);

    Ok(())
}

/// Fail before touching the database when the input path is absent.
fn ensure_source_exists(path: &std::path::Path) -> io::Result<()> {
    if path.is_file() {
        return Ok(());
    }
    Err(io::Error::new(
        io::ErrorKind::NotFound,
        format!("reference dataset not found: {}", path.display()),
    ))
}
