//! Error and counter mapping helpers for event ingestion.

use crate::domain::Error;
use crate::domain::ports::{EventFeedSourceError, EventRepositoryError};

pub(super) fn count(len: usize) -> Result<u64, Error> {
    u64::try_from(len).map_err(|_| Error::internal("feature count exceeds supported range"))
}

pub(super) fn map_feed_error(error: EventFeedSourceError) -> Error {
    match error {
        EventFeedSourceError::InvalidRequest { message } => {
            Error::invalid_request(format!("event feed rejected window: {message}"))
        }
        other => Error::fetch(other.to_string()),
    }
}

pub(super) fn map_repository_error(error: EventRepositoryError) -> Error {
    match error {
        EventRepositoryError::Connection { message } => {
            Error::service_unavailable(format!("event store unavailable: {message}"))
        }
        other => Error::write(other.to_string()),
    }
}
