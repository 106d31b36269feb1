//! Ingestion use case - fetch a page, classify, build records, upsert

use std::collections::HashMap;
use std::sync::Arc;
use std::time::Duration;

use crate::model::{ProcessResult, WallPost};
use crate::ports::{AdminNotifier, FeedError, FeedSource, NewsStore, SnapshotSink, UpsertOutcome};
use crate::record::{BuildOutcome, RecordBuilder};

/// VK error code signalling an expired or revoked access token
pub const INVALID_TOKEN_CODE: i64 = 5;

/// Known API error codes mapped to human-readable messages
///
/// Unrecognized codes fall back to the upstream-provided message.
#[derive(Debug, Clone)]
pub struct ApiErrorCatalog {
    messages: HashMap<i64, &'static str>,
}

impl ApiErrorCatalog {
    pub fn message_for(&self, code: i64, upstream: &str) -> String {
        self.messages
            .get(&code)
            .map(|message| message.to_string())
            .unwrap_or_else(|| upstream.to_string())
    }
}

impl Default for ApiErrorCatalog {
    fn default() -> Self {
        Self {
            messages: HashMap::from([
                (5, "Invalid token"),
                (6, "Too many requests"),
                (15, "Access denied"),
                (30, "Profile is private"),
                (100, "Invalid parameter"),
                (113, "Invalid user ID"),
                (200, "Access denied"),
            ]),
        }
    }
}

/// Configuration for the ingestion pass
#[derive(Debug, Clone)]
pub struct IngestConfig {
    /// Pause between posts after the first, respecting the upstream rate limit
    pub inter_post_delay: Duration,
    pub error_catalog: ApiErrorCatalog,
}

impl Default for IngestConfig {
    fn default() -> Self {
        Self {
            inter_post_delay: Duration::from_secs(1),
            error_catalog: ApiErrorCatalog::default(),
        }
    }
}

/// Errors that abort a whole run
///
/// Per-post anomalies never surface here; they are folded into the
/// per-post results.
#[derive(Debug, thiserror::Error)]
pub enum IngestError {
    #[error("feed fetch failed: {0}")]
    Fetch(String),
    #[error("API error [{code}]: {message}")]
    Api { code: i64, message: String },
}

/// Single-pass ingestion orchestrator
pub struct IngestPipeline<F, S, N>
where
    F: FeedSource + ?Sized,
    S: NewsStore + ?Sized,
    N: AdminNotifier + ?Sized,
{
    feed: Arc<F>,
    store: Arc<S>,
    notifier: Arc<N>,
    snapshot: Option<Arc<dyn SnapshotSink>>,
    builder: RecordBuilder,
    config: IngestConfig,
}

impl<F, S, N> IngestPipeline<F, S, N>
where
    F: FeedSource + ?Sized,
    S: NewsStore + ?Sized,
    N: AdminNotifier + ?Sized,
{
    pub fn new(
        feed: Arc<F>,
        store: Arc<S>,
        notifier: Arc<N>,
        snapshot: Option<Arc<dyn SnapshotSink>>,
        builder: RecordBuilder,
        config: IngestConfig,
    ) -> Self {
        Self {
            feed,
            store,
            notifier,
            snapshot,
            builder,
            config,
        }
    }

    /// Process one page of the feed, strictly sequentially
    ///
    /// Returns per-post outcomes keyed by post id. Only transport and
    /// API-envelope failures abort the run.
    pub async fn run_once(&self) -> Result<Vec<(i64, ProcessResult)>, IngestError> {
        let page = match self.feed.fetch_page().await {
            Ok(page) => page,
            Err(FeedError::Api { code, message }) => {
                return Err(self.handle_api_error(code, message).await);
            }
            Err(error) => return Err(IngestError::Fetch(error.to_string())),
        };

        tracing::info!(count = page.posts.len(), "Fetched wall posts");

        if let Some(snapshot) = &self.snapshot {
            if let Err(error) = snapshot.write_page(&page.raw).await {
                tracing::warn!(error = %error, "Failed to write debug snapshot");
            }
        }

        let mut results = Vec::new();
        for (index, post) in page.posts.iter().enumerate() {
            if index > 0 && !self.config.inter_post_delay.is_zero() {
                tokio::time::sleep(self.config.inter_post_delay).await;
            }
            let result = self.process_post(post).await;
            results.push((post.id, result));
        }

        Ok(results)
    }

    async fn handle_api_error(&self, code: i64, upstream: String) -> IngestError {
        let message = self.config.error_catalog.message_for(code, &upstream);
        tracing::error!(code, message = %message, "VK API returned an error envelope");

        if code == INVALID_TOKEN_CODE {
            // fire-and-forget: delivery failure must not change the run's outcome
            if let Err(error) = self
                .notifier
                .notify("VK access token is invalid and must be refreshed")
                .await
            {
                tracing::warn!(error = %error, "Admin notification failed");
            }
        }

        IngestError::Api { code, message }
    }

    async fn process_post(&self, post: &WallPost) -> ProcessResult {
        let record = match self.builder.build(post) {
            BuildOutcome::Record(record) => record,
            BuildOutcome::Skip { reason } => {
                tracing::info!(post_id = post.id, reason = %reason, "Skipped post");
                return ProcessResult::Skipped { reason };
            }
        };

        match self.store.upsert(&record).await {
            Ok(UpsertOutcome::SkippedManual) => {
                tracing::info!(
                    external_id = %record.external_id,
                    source = %record.source,
                    "Skipping manually edited record"
                );
                ProcessResult::Skipped {
                    reason: "manually edited record".to_string(),
                }
            }
            Ok(outcome) => {
                tracing::info!(
                    external_id = %record.external_id,
                    source = %record.source,
                    title = %record.title,
                    "Saved news record"
                );
                ProcessResult::Saved {
                    external_id: record.external_id,
                    source: record.source,
                    created: outcome == UpsertOutcome::Created,
                }
            }
            Err(error) => {
                tracing::error!(post_id = post.id, error = %error, "Failed to save news record");
                ProcessResult::Failed {
                    error: error.to_string(),
                }
            }
        }
    }
}
