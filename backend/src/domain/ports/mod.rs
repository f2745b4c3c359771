//! Domain ports and supporting types for the hexagonal boundary.

mod macros;
pub(crate) use macros::define_port_error;

mod event_feed_source;
mod event_ingestion_command;
mod event_repository;
mod reference_load_command;
mod reference_region_repository;
mod region_dataset_source;
mod store_health;

#[cfg(test)]
pub use event_feed_source::MockEventFeedSource;
pub use event_feed_source::{
    EventFeedSource, EventFeedSourceError, FeedBatch, FeedWindow, FixtureEventFeedSource,
};
pub use event_ingestion_command::{EventIngestionCommand, EventIngestionRequest, RunStats};
#[cfg(test)]
pub use event_repository::MockEventRepository;
pub use event_repository::{
    EventRepository, EventRepositoryError, EventRow, FixtureEventRepository,
};
pub use reference_load_command::{LoadStats, ReferenceLoadCommand, ReferenceLoadRequest};
#[cfg(test)]
pub use reference_region_repository::MockReferenceRegionRepository;
pub use reference_region_repository::{
    ReferenceRegion, ReferenceRegionRepository, ReferenceRegionRepositoryError,
};
#[cfg(test)]
pub use region_dataset_source::MockRegionDatasetSource;
pub use region_dataset_source::{
    AttributeValue, DatasetFeature, DeclaredCrs, RegionDataset, RegionDatasetSource,
    RegionDatasetSourceError,
};
pub use store_health::{StoreHealth, StoreHealthCheck, StoreHealthError};
