//! DTOs for decoding feed responses.
//!
//! Features stay as raw JSON values; only the collection envelope is typed so
//! per-record validation remains a domain concern.

use serde::Deserialize;
use serde_json::Value;

use crate::domain::ports::FeedBatch;

#[derive(Debug, Deserialize)]
pub(super) struct FeatureCollectionDto {
    #[serde(rename = "type")]
    pub(super) collection_type: Option<String>,
    pub(super) features: Vec<Value>,
}

impl FeatureCollectionDto {
    pub(super) fn into_batch(self) -> Result<FeedBatch, String> {
        match self.collection_type.as_deref() {
            None | Some("FeatureCollection") => Ok(FeedBatch {
                features: self.features,
            }),
            Some(other) => Err(format!("expected FeatureCollection, got {other}")),
        }
    }
}
