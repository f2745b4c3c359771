//! Outbound adapters implementing domain ports for external infrastructure.
//!
//! - **feed**: reqwest client for the earthquake event feed
//! - **dataset**: filesystem readers for shapefile, GeoJSON, and zip inputs
//! - **persistence**: PostgreSQL/PostGIS repositories using Diesel
//!
//! Adapters are thin translators between domain types and infrastructure
//! representations. They contain no business logic.

pub mod dataset;
pub mod feed;
pub mod persistence;
