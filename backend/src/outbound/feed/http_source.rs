//! Reqwest-backed earthquake feed adapter.
//!
//! This adapter owns transport details only: query serialisation, timeout and
//! HTTP error mapping, and decoding the feature collection envelope.

use std::time::Duration;

use async_trait::async_trait;
use chrono::SecondsFormat;
use reqwest::{Client, StatusCode, Url};
use tracing::warn;

use super::dto::FeatureCollectionDto;
use crate::domain::ports::{EventFeedSource, EventFeedSourceError, FeedBatch, FeedWindow};

const DEFAULT_RESULT_LIMIT: u32 = 20_000;
const DEFAULT_USER_AGENT: &str = "risk-signals-ingest/0.1";

/// Outbound identity and result cap for feed requests.
pub struct FeedHttpIdentity {
    /// HTTP user-agent sent to the feed.
    pub user_agent: String,
    /// Value of the `limit` query parameter.
    pub result_limit: u32,
}

impl Default for FeedHttpIdentity {
    fn default() -> Self {
        Self {
            user_agent: DEFAULT_USER_AGENT.to_owned(),
            result_limit: DEFAULT_RESULT_LIMIT,
        }
    }
}

/// Feed adapter that performs one HTTP GET per window against one endpoint.
pub struct UsgsFeedHttpSource {
    client: Client,
    endpoint: Url,
    user_agent: String,
    result_limit: u32,
}

impl UsgsFeedHttpSource {
    /// Build an adapter using a reqwest client with an explicit request timeout.
    /// ```rust,ignore
    /// let source = UsgsFeedHttpSource::new(endpoint, Duration::from_secs(60));
    /// assert!(source.is_ok() || source.is_err());
    /// ```
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn new(endpoint: Url, timeout: Duration) -> Result<Self, reqwest::Error> {
        Self::with_identity(endpoint, timeout, FeedHttpIdentity::default())
    }

    /// Build an adapter with an explicit user agent and result cap.
    ///
    /// # Errors
    ///
    /// Returns an error when the reqwest client cannot be constructed.
    pub fn with_identity(
        endpoint: Url,
        timeout: Duration,
        identity: FeedHttpIdentity,
    ) -> Result<Self, reqwest::Error> {
        let client = Client::builder().timeout(timeout).build()?;
        Ok(Self {
            client,
            endpoint,
            user_agent: identity.user_agent,
            result_limit: identity.result_limit.max(1),
        })
    }
}

#[async_trait]
impl EventFeedSource for UsgsFeedHttpSource {
    async fn fetch_events(&self, window: &FeedWindow) -> Result<FeedBatch, EventFeedSourceError> {
        let query = build_query(window, self.result_limit)?;
        let response = self
            .client
            .get(self.endpoint.clone())
            .header(reqwest::header::USER_AGENT, self.user_agent.as_str())
            .header(reqwest::header::ACCEPT, "application/geo+json, application/json")
            .query(&query)
            .send()
            .await
            .map_err(map_transport_error)?;

        let status = response.status();
        let body = response.bytes().await.map_err(map_transport_error)?;
        if !status.is_success() {
            let error = map_status_error(status, body.as_ref());
            warn!(status = status.as_u16(), %error, "event feed request failed");
            return Err(error);
        }

        parse_batch(body.as_ref())
    }
}

fn parse_batch(body: &[u8]) -> Result<FeedBatch, EventFeedSourceError> {
    let decoded: FeatureCollectionDto = serde_json::from_slice(body).map_err(|error| {
        EventFeedSourceError::decode(format!("invalid feature collection payload: {error}"))
    })?;
    decoded.into_batch().map_err(EventFeedSourceError::decode)
}

fn build_query(
    window: &FeedWindow,
    result_limit: u32,
) -> Result<Vec<(&'static str, String)>, EventFeedSourceError> {
    if window.start >= window.end {
        return Err(EventFeedSourceError::invalid_request(
            "window start must precede window end",
        ));
    }
    if !window.min_magnitude.is_finite() {
        return Err(EventFeedSourceError::invalid_request(
            "minimum magnitude must be finite",
        ));
    }

    Ok(vec![
        ("format", "geojson".to_owned()),
        ("starttime", window.start.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ("endtime", window.end.to_rfc3339_opts(SecondsFormat::Secs, true)),
        ("minmagnitude", window.min_magnitude.to_string()),
        ("orderby", "time".to_owned()),
        ("limit", result_limit.to_string()),
    ])
}

fn map_transport_error(error: reqwest::Error) -> EventFeedSourceError {
    if error.is_timeout() {
        EventFeedSourceError::timeout(error.to_string())
    } else if error.is_decode() {
        EventFeedSourceError::decode(error.to_string())
    } else {
        EventFeedSourceError::transport(error.to_string())
    }
}

fn map_status_error(status: StatusCode, body: &[u8]) -> EventFeedSourceError {
    let body_preview = body_preview(body);
    let message = if body_preview.is_empty() {
        format!("status {}", status.as_u16())
    } else {
        format!("status {}: {}", status.as_u16(), body_preview)
    };

    match status {
        StatusCode::REQUEST_TIMEOUT | StatusCode::GATEWAY_TIMEOUT => {
            EventFeedSourceError::timeout(message)
        }
        _ => EventFeedSourceError::status(message),
    }
}

fn body_preview(body: &[u8]) -> String {
    const PREVIEW_CHAR_LIMIT: usize = 160;

    let compact = String::from_utf8_lossy(body)
        .split_whitespace()
        .collect::<Vec<_>>()
        .join(" ");
    let preview = compact.chars().take(PREVIEW_CHAR_LIMIT).collect::<String>();
    if compact.chars().count() > PREVIEW_CHAR_LIMIT {
        format!("{preview}...")
    } else {
        preview
    }
}
