//! Application use cases

pub mod ingest;

pub use ingest::{ApiErrorCatalog, IngestConfig, IngestError, IngestPipeline, INVALID_TOKEN_CODE};
