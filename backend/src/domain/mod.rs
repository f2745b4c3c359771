//! Domain primitives, services, and ports.
//!
//! Purpose: hold the ingestion and reference-loading rules independent of
//! HTTP, filesystem, and database concerns. Adapters in `outbound` implement
//! the traits in [`ports`]; binaries wire them into the services here.
//!
//! Public surface:
//! - Error (alias to `error::Error`): fatal failure with a stable code.
//! - ErrorCode (alias to `error::ErrorCode`): failure category.
//! - EventIngestionService: fetch, validate, and upsert one feed window.
//! - ReferenceLoadService: normalise a region dataset and replace the table.
//! - parse_feature: per-record feed validation.

pub mod error;
pub mod event_feature;
pub mod event_ingestion;
pub mod ports;
pub mod reference_load;

pub use self::error::{Error, ErrorCode, ErrorValidationError};
pub use self::event_feature::{ParsedFeature, RejectionReason, millis_to_utc, parse_feature};
pub use self::event_ingestion::EventIngestionService;
pub use self::reference_load::ReferenceLoadService;
