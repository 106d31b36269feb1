//! Filesystem sink for raw-page debug snapshots

use async_trait::async_trait;
use news_fetcher_domain::{SnapshotError, SnapshotSink};
use std::path::{Path, PathBuf};
use time::OffsetDateTime;
use time::macros::format_description;

/// Writes each fetched page as a timestamped pretty-printed JSON file
///
/// Non-authoritative debug artifact: callers log and ignore failures.
pub struct FsSnapshotSink {
    dir: PathBuf,
}

impl FsSnapshotSink {
    pub fn new(dir: PathBuf) -> Self {
        Self { dir }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }
}

#[async_trait]
impl SnapshotSink for FsSnapshotSink {
    async fn write_page(&self, raw: &serde_json::Value) -> Result<(), SnapshotError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(|e| SnapshotError::Io(e.to_string()))?;

        let format = format_description!("[year][month][day]_[hour][minute][second]");
        let timestamp = OffsetDateTime::now_utc()
            .format(&format)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        let path = self.dir.join(format!("vk_response_{timestamp}.json"));
        let body = serde_json::to_vec_pretty(raw)
            .map_err(|e| SnapshotError::Serialization(e.to_string()))?;

        tokio::fs::write(&path, body)
            .await
            .map_err(|e| SnapshotError::Io(e.to_string()))?;

        tracing::debug!(path = %path.display(), "Saved raw feed snapshot");
        Ok(())
    }
}
