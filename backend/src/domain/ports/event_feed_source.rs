//! Driven port for fetching windowed batches from the earthquake event feed.
//!
//! The domain owns the window shape and keeps each returned feature as a raw
//! JSON value so malformed records can be rejected one at a time.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use serde_json::Value;

use super::define_port_error;

/// Time window and magnitude filter for one feed query.
#[derive(Debug, Clone, PartialEq)]
pub struct FeedWindow {
    /// Inclusive window start in UTC.
    pub start: DateTime<Utc>,
    /// Window end in UTC.
    pub end: DateTime<Utc>,
    /// Minimum magnitude passed to the feed as `minmagnitude`.
    pub min_magnitude: f64,
}

/// Raw feature collection returned by the feed.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct FeedBatch {
    /// Features exactly as delivered, one JSON object per event.
    pub features: Vec<Value>,
}

define_port_error! {
    /// Errors surfaced while calling the event feed.
    pub enum EventFeedSourceError {
        /// Network transport failed before receiving a response.
        Transport { message: String } =>
            "event feed transport failed: {message}",
        /// The request exceeded its deadline.
        Timeout { message: String } =>
            "event feed timeout: {message}",
        /// The feed answered with a non-success status.
        Status { message: String } =>
            "event feed returned error status: {message}",
        /// The response body was not a feature collection.
        Decode { message: String } =>
            "event feed response decode failed: {message}",
        /// Adapter rejected the window before execution.
        InvalidRequest { message: String } =>
            "event feed request invalid: {message}",
    }
}

/// Port for querying the event feed.
#[cfg_attr(test, mockall::automock)]
#[async_trait]
pub trait EventFeedSource: Send + Sync {
    /// Fetch all features observed inside `window`.
    ///
    /// Implementations issue exactly one request and never retry.
    ///
    /// # Examples
    ///
    /// ```rust,ignore
    /// use risk_signals::domain::ports::{EventFeedSource, FeedWindow, FixtureEventFeedSource};
    ///
    /// let batch = FixtureEventFeedSource.fetch_events(&window).await?;
    /// assert!(batch.features.is_empty());
    /// ```
    async fn fetch_events(&self, window: &FeedWindow) -> Result<FeedBatch, EventFeedSourceError>;
}

/// Fixture implementation returning an empty batch.
#[derive(Debug, Clone, Copy, Default)]
pub struct FixtureEventFeedSource;

#[async_trait]
impl EventFeedSource for FixtureEventFeedSource {
    async fn fetch_events(&self, _window: &FeedWindow) -> Result<FeedBatch, EventFeedSourceError> {
        Ok(FeedBatch::default())
    }
}
