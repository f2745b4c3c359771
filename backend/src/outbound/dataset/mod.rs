//! Region dataset outbound adapters.
//!
//! Decodes shapefiles, GeoJSON, and zip archives containing either into the
//! `RegionDatasetSource` port's attribute and geometry model.

mod archive;
mod crs;
mod file_source;
mod geojson_format;
mod shapefile_format;
#[cfg(test)]
mod test_fixtures;

pub use file_source::FileRegionDatasetSource;
