//! Driven port for reading vector reference datasets from disk.
//!
//! Adapters decode the container format (shapefile, GeoJSON, zip archives)
//! and report the declared coordinate reference system untouched; the domain
//! owns projection, schema normalisation, and repair.

use std::collections::BTreeMap;
use std::path::Path;

use async_trait::async_trait;
use geo::Geometry;

use super::define_port_error;

/// One attribute cell read from a dataset.
#[derive(Debug, Clone, PartialEq)]
pub enum AttributeValue {
    /// Character data.
    Text(String),
    /// Integral numeric data.
    Integer(i64),
    /// Floating-point numeric data.
    Number(f64),
    /// Logical data.
    Boolean(bool),
    /// Empty cell.
    Null,
}

/// Coordinate reference system declared by the dataset.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub enum DeclaredCrs {
    /// No declaration; coordinates are taken as WGS84 degrees.
    #[default]
    Unspecified,
    /// Declaration resolved to an EPSG code.
    Epsg(u16),
    /// Declaration present but not resolvable; carries the raw text.
    Unrecognised(String),
}

/// A dataset row: attributes plus optional geometry in the source CRS.
#[derive(Debug, Clone, PartialEq)]
pub struct DatasetFeature {
    /// Attribute cells keyed by the column name as written in the source.
    pub attributes: BTreeMap<String, AttributeValue>,
    /// Geometry in source coordinates; `None` for null shapes.
    pub geometry: Option<Geometry<f64>>,
}

/// Decoded dataset handed to reference loading.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct RegionDataset {
    /// Column names exactly as found in the source.
    pub columns: Vec<String>,
    /// Declared coordinate reference system.
    pub crs: DeclaredCrs,
    /// Features in source order.
    pub features: Vec<DatasetFeature>,
    /// Lowercase hex SHA-256 of the input file.
    pub source_digest: String,
}

define_port_error! {
    /// Errors raised while reading reference datasets.
    pub enum RegionDatasetSourceError {
        /// The input path does not exist.
        Missing { path: String } =>
            "reference dataset not found: {path}",
        /// The input could not be opened or read.
        Read { message: String } =>
            "reference dataset read failed: {message}",
        /// The input could not be decoded into features.
        Decode { message: String } =>
            "reference dataset decode failed: {message}",
        /// The input format is not supported.
        Unsupported { message: String } =>
            "reference dataset format unsupported: {message}",
    }
}

/// Port for decoding a vector dataset from the filesystem.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait RegionDatasetSource: Send + Sync {
    /// Read every feature of the dataset at `path`.
    async fn read_dataset(&self, path: &Path) -> Result<RegionDataset, RegionDatasetSourceError>;
}
