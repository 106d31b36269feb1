//! news-fetcher domain crate
//!
//! This crate contains the core domain logic following hexagonal architecture:
//! - `model`: Domain entities and value objects
//! - `normalize`: Pure text/URL normalization rules
//! - `classify`: Repost-origin classification over the repost chain
//! - `extract`: Attachment field-selection heuristics
//! - `record`: Canonical news-record assembly
//! - `ports`: Trait definitions for external dependencies (adapters)
//! - `usecases`: The ingestion pipeline

pub mod classify;
pub mod extract;
pub mod model;
pub mod normalize;
pub mod ports;
pub mod record;
pub mod usecases;

pub use model::*;
pub use ports::*;
