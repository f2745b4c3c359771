//! Filesystem-backed region dataset source.
//!
//! Dispatches on the file extension: `.shp`, `.geojson`/`.json`, or `.zip`
//! wrapping either. The digest always covers the file named by the caller.

use std::io::{self, Read};
use std::path::Path;

use async_trait::async_trait;
use cap_std::{ambient_authority, fs::Dir};
use sha2::{Digest, Sha256};
use tracing::debug;

use super::archive::{has_extension, stage_archive};
use super::geojson_format::decode_geojson;
use super::shapefile_format::decode_shapefile;
use crate::domain::ports::{RegionDataset, RegionDatasetSource, RegionDatasetSourceError};

/// Dataset source reading from the local filesystem.
#[derive(Debug, Clone, Copy, Default)]
pub struct FileRegionDatasetSource;

#[async_trait]
impl RegionDatasetSource for FileRegionDatasetSource {
    async fn read_dataset(&self, path: &Path) -> Result<RegionDataset, RegionDatasetSourceError> {
        let owned = path.to_path_buf();
        tokio::task::spawn_blocking(move || read_dataset_blocking(&owned))
            .await
            .map_err(|error| {
                RegionDatasetSourceError::read(format!("dataset reader task failed: {error}"))
            })?
    }
}

fn read_dataset_blocking(path: &Path) -> Result<RegionDataset, RegionDatasetSourceError> {
    let source_digest = sha256_file(path)?;
    let mut dataset = decode_path(path)?;
    dataset.source_digest = source_digest;
    debug!(
        path = %path.display(),
        features = dataset.features.len(),
        digest = %dataset.source_digest,
        "decoded region dataset"
    );
    Ok(dataset)
}

fn decode_path(path: &Path) -> Result<RegionDataset, RegionDatasetSourceError> {
    if has_extension(path, &["zip"]) {
        let archive = open_file(path)?.into_std();
        let staged = stage_archive(archive)?;
        return decode_member(&staged.dataset_path);
    }
    decode_member(path)
}

fn decode_member(path: &Path) -> Result<RegionDataset, RegionDatasetSourceError> {
    if has_extension(path, &["shp"]) {
        return decode_shapefile(path);
    }
    if has_extension(path, &["geojson", "json"]) {
        let mut bytes = Vec::new();
        open_file(path)?
            .read_to_end(&mut bytes)
            .map_err(|error| read_error(path, &error))?;
        return decode_geojson(&bytes);
    }
    Err(RegionDatasetSourceError::unsupported(format!(
        "expected .shp, .geojson, .json, or .zip: {}",
        path.display()
    )))
}

fn open_file(path: &Path) -> Result<cap_std::fs::File, RegionDatasetSourceError> {
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let file_name = path.file_name().ok_or_else(|| {
        RegionDatasetSourceError::read(format!("input path must name a file: {}", path.display()))
    })?;
    let directory = Dir::open_ambient_dir(parent, ambient_authority())
        .map_err(|error| missing_or_read(path, &error))?;
    directory
        .open(Path::new(file_name))
        .map_err(|error| missing_or_read(path, &error))
}

fn sha256_file(path: &Path) -> Result<String, RegionDatasetSourceError> {
    let mut file = open_file(path)?;
    let mut hasher = Sha256::new();
    let mut buffer = [0_u8; 8 * 1024];
    loop {
        let read = file
            .read(&mut buffer)
            .map_err(|error| read_error(path, &error))?;
        if read == 0 {
            break;
        }
        hasher.update(&buffer[..read]);
    }
    Ok(format!("{:x}", hasher.finalize()))
}

fn missing_or_read(path: &Path, error: &io::Error) -> RegionDatasetSourceError {
    if error.kind() == io::ErrorKind::NotFound {
        RegionDatasetSourceError::missing(path.display().to_string())
    } else {
        read_error(path, error)
    }
}

fn read_error(path: &Path, error: &io::Error) -> RegionDatasetSourceError {
    RegionDatasetSourceError::read(format!("read {}: {error}", path.display()))
}
