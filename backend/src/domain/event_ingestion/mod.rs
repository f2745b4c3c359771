//! Earthquake event ingestion orchestration service.
//!
//! This service owns the fetch, validate, upsert sequence:
//! - one feed request per run, windowed on the injected clock;
//! - per-record rejection that never aborts the batch;
//! - a single transactional write of every valid row.

use std::sync::Arc;

use async_trait::async_trait;
use mockable::Clock;
use tracing::{debug, info};

use crate::domain::Error;
use crate::domain::event_feature::{ParsedFeature, parse_feature};
use crate::domain::ports::{
    EventFeedSource, EventIngestionCommand, EventIngestionRequest, EventRepository, EventRow,
    FeedWindow, RunStats,
};

mod mapping;

/// Domain service implementing the event ingestion command.
#[derive(Clone)]
pub struct EventIngestionService<S, R> {
    feed_source: Arc<S>,
    event_repo: Arc<R>,
    clock: Arc<dyn Clock>,
}

impl<S, R> EventIngestionService<S, R> {
    /// Create a new ingestion service.
    pub fn new(feed_source: Arc<S>, event_repo: Arc<R>, clock: Arc<dyn Clock>) -> Self {
        Self {
            feed_source,
            event_repo,
            clock,
        }
    }

    fn window_for(&self, request: &EventIngestionRequest) -> Result<FeedWindow, Error> {
        let end = self.clock.utc();
        let start = end.checked_sub_signed(request.lookback).ok_or_else(|| {
            Error::invalid_request("lookback reaches before the earliest representable time")
        })?;
        Ok(FeedWindow {
            start,
            end,
            min_magnitude: request.min_magnitude,
        })
    }
}

#[async_trait]
impl<S, R> EventIngestionCommand for EventIngestionService<S, R>
where
    S: EventFeedSource,
    R: EventRepository,
{
    async fn run(&self, request: EventIngestionRequest) -> Result<RunStats, Error> {
        validate_request(&request)?;
        let window = self.window_for(&request)?;
        info!(
            start = %window.start,
            end = %window.end,
            min_magnitude = window.min_magnitude,
            "starting event ingestion run"
        );

        let batch = self
            .feed_source
            .fetch_events(&window)
            .await
            .map_err(mapping::map_feed_error)?;
        let fetched = mapping::count(batch.features.len())?;

        let rows = partition_rows(&batch.features);
        let parsed = mapping::count(rows.len())?;
        let stats = RunStats {
            fetched,
            parsed,
            skipped: fetched - parsed,
            written: self
                .event_repo
                .upsert_events(&rows)
                .await
                .map_err(mapping::map_repository_error)?,
        };

        info!(
            fetched = stats.fetched,
            parsed = stats.parsed,
            skipped = stats.skipped,
            written = stats.written,
            "event ingestion run completed"
        );
        Ok(stats)
    }
}

fn validate_request(request: &EventIngestionRequest) -> Result<(), Error> {
    if request.lookback <= chrono::TimeDelta::zero() {
        return Err(Error::invalid_request("lookback must be positive"));
    }
    if !request.min_magnitude.is_finite() {
        return Err(Error::invalid_request("minimum magnitude must be finite"));
    }
    Ok(())
}

fn partition_rows(features: &[serde_json::Value]) -> Vec<EventRow> {
    features
        .iter()
        .enumerate()
        .filter_map(|(index, feature)| match parse_feature(feature) {
            ParsedFeature::Valid(row) => Some(row),
            ParsedFeature::Rejected(reason) => {
                debug!(index, reason = reason.as_str(), "skipping feed feature");
                None
            }
        })
        .collect()
}
