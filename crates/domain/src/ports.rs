//! Port definitions (traits) for external dependencies
//!
//! These traits define the boundaries between the domain and external
//! systems. Adapters implement these traits to connect to real
//! infrastructure.

use async_trait::async_trait;
use thiserror::Error;

use crate::model::{NewsRecord, Source, WallPost};

/// Error type for feed operations
#[derive(Debug, Error)]
pub enum FeedError {
    /// Transport failed after the adapter's own retries
    #[error("network error: {0}")]
    Network(String),
    /// The API returned its error envelope instead of a page
    #[error("API error [{code}]: {message}")]
    Api { code: i64, message: String },
    #[error("decode error: {0}")]
    Decode(String),
}

/// One fetched page of the wall feed
///
/// `raw` keeps the decoded response verbatim for the optional debug
/// snapshot; it is never authoritative.
#[derive(Debug, Clone)]
pub struct FeedPage {
    pub posts: Vec<WallPost>,
    pub raw: serde_json::Value,
}

/// Port for fetching one page of recent posts from the feed
///
/// Bounded retry with backoff lives entirely behind this trait; the
/// pipeline sees a single call that either yields a page or fails.
#[async_trait]
pub trait FeedSource: Send + Sync {
    async fn fetch_page(&self) -> Result<FeedPage, FeedError>;
}

/// Error type for news store operations
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("database error: {0}")]
    Database(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// What an upsert did
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UpsertOutcome {
    Created,
    Updated,
    /// The stored record is manually edited; it was left untouched
    SkippedManual,
}

/// Port for persisting news records, keyed by (external_id, source)
///
/// The "manual edit wins" rule is part of this contract: `upsert` must
/// leave a record whose `is_manual` flag is set byte-for-byte unchanged
/// and report `SkippedManual`. Updates replace all fields wholesale
/// except `is_manual`.
#[async_trait]
pub trait NewsStore: Send + Sync {
    async fn find_by_external_id(
        &self,
        external_id: &str,
        source: Source,
    ) -> Result<Option<NewsRecord>, StoreError>;

    async fn upsert(&self, record: &NewsRecord) -> Result<UpsertOutcome, StoreError>;
}

/// Error type for admin notification delivery
#[derive(Debug, Error)]
pub enum NotifyError {
    #[error("delivery failed: {0}")]
    Delivery(String),
}

/// Port for alerting a human operator
///
/// Fire-and-forget at every call site: a delivery failure must never
/// affect the run's outcome.
#[async_trait]
pub trait AdminNotifier: Send + Sync {
    async fn notify(&self, message: &str) -> Result<(), NotifyError>;
}

/// Error type for snapshot writes
#[derive(Debug, Error)]
pub enum SnapshotError {
    #[error("IO error: {0}")]
    Io(String),
    #[error("serialization error: {0}")]
    Serialization(String),
}

/// Port for persisting the raw decoded page as a debug artifact
#[async_trait]
pub trait SnapshotSink: Send + Sync {
    async fn write_page(&self, raw: &serde_json::Value) -> Result<(), SnapshotError>;
}
