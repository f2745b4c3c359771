//! Error and counter mapping helpers for reference loading.

use crate::domain::Error;
use crate::domain::ports::{ReferenceRegionRepositoryError, RegionDatasetSourceError};

pub(super) fn count(len: usize) -> Result<u64, Error> {
    u64::try_from(len).map_err(|_| Error::internal("feature count exceeds supported range"))
}

pub(super) fn map_dataset_error(error: RegionDatasetSourceError) -> Error {
    match error {
        RegionDatasetSourceError::Missing { path } => {
            Error::path(format!("reference dataset not found: {path}"))
        }
        other => Error::dataset(other.to_string()),
    }
}

pub(super) fn map_repository_error(error: ReferenceRegionRepositoryError) -> Error {
    match error {
        ReferenceRegionRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("reference store unavailable: {message}"))
        }
        ReferenceRegionRepositoryError::Encode { message } => {
            Error::internal(format!("reference regions could not be encoded: {message}"))
        }
        ReferenceRegionRepositoryError::Query { message } => Error::replace(format!(
            "reference table replacement failed; verify table state: {message}"
        )),
    }
}
