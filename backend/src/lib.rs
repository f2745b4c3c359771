//! Idempotent earthquake ingestion and reference region loading.

pub mod config;
pub mod domain;
pub mod outbound;
