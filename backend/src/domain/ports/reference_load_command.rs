//! Driving port for loading the reference region dataset.

use std::path::PathBuf;

use async_trait::async_trait;
use serde::{Deserialize, Serialize};

use crate::domain::Error;

/// Command request for one reference load.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ReferenceLoadRequest {
    /// Path to a shapefile, GeoJSON file, or zip archive containing either.
    pub source_path: PathBuf,
}

/// Statistics reported by a completed reference load.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoadStats {
    /// Features decoded from the dataset.
    pub features_read: u64,
    /// Rows written to the reference table.
    pub regions_loaded: u64,
    /// Geometries that failed validation and were repaired.
    pub geometries_repaired: u64,
    /// EPSG code declared by the source, if any.
    pub source_epsg: Option<u16>,
    /// Whether coordinates were reprojected to WGS84.
    pub reprojected: bool,
    /// Lowercase hex SHA-256 of the input file.
    pub source_digest: String,
}

/// Driving port for reference region loading.
#[async_trait]
pub trait ReferenceLoadCommand: Send + Sync {
    /// Normalise the dataset at `request.source_path` and replace the table.
    async fn load(&self, request: ReferenceLoadRequest) -> Result<LoadStats, Error>;
}
