//! Driven port for wholesale replacement of the reference region table.

use async_trait::async_trait;
use geo::MultiPolygon;

use super::define_port_error;

/// Normalised reference polygon ready for bulk load.
#[derive(Debug, Clone, PartialEq)]
pub struct ReferenceRegion {
    /// Five-character composite key; unique across a load.
    pub region_code: String,
    /// Two-character jurisdiction prefix of `region_code`.
    pub jurisdiction_code: String,
    /// Display name.
    pub region_name: String,
    /// Valid geometry in WGS84 degrees (SRID 4326).
    pub geometry: MultiPolygon<f64>,
}

define_port_error! {
    /// Errors raised while replacing the reference table.
    pub enum ReferenceRegionRepositoryError {
        /// Repository connection could not be established; table untouched.
        Connection { message: String } =>
            "reference store connection failed: {message}",
        /// A statement inside the replacement failed.
        Query { message: String } =>
            "reference table replacement failed: {message}",
        /// Regions could not be converted for persistence; table untouched.
        Encode { message: String } =>
            "reference region encoding failed: {message}",
    }
}

/// Port for replacing the reference table.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait ReferenceRegionRepository: Send + Sync {
    /// Drop, recreate, bulk insert, then add the primary key and indexes.
    ///
    /// Callers must serialise replacements. Returns the number of rows loaded.
    async fn replace_regions(
        &self,
        regions: &[ReferenceRegion],
    ) -> Result<u64, ReferenceRegionRepositoryError>;
}
