//! Driving port for one earthquake ingestion run.

use async_trait::async_trait;
use chrono::TimeDelta;
use serde::{Deserialize, Serialize};

use crate::domain::Error;

/// Command request for one ingestion run.
#[derive(Debug, Clone, PartialEq)]
pub struct EventIngestionRequest {
    /// How far back from "now" the feed window reaches.
    pub lookback: TimeDelta,
    /// Minimum magnitude forwarded to the feed.
    pub min_magnitude: f64,
}

/// Counters reported by every successful run.
///
/// `parsed + skipped == fetched` always holds.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RunStats {
    /// Features returned by the feed.
    pub fetched: u64,
    /// Features that produced a valid row.
    pub parsed: u64,
    /// Features rejected by validation.
    pub skipped: u64,
    /// Rows inserted or updated by the store.
    pub written: u64,
}

/// Driving port for idempotent event ingestion.
#[async_trait]
pub trait EventIngestionCommand: Send + Sync {
    /// Fetch, validate, and upsert one window of events.
    async fn run(&self, request: EventIngestionRequest) -> Result<RunStats, Error>;
}
