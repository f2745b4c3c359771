//! Earthquake feed outbound adapters.
//!
//! This module provides a thin HTTP implementation of the `EventFeedSource`
//! port against the FDSN event query service.

mod dto;
mod http_source;

pub use http_source::{FeedHttpIdentity, UsgsFeedHttpSource};
