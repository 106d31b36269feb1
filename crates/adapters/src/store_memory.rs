//! In-memory news store for testing and offline mode

use async_trait::async_trait;
use news_fetcher_domain::{NewsRecord, NewsStore, Source, StoreError, UpsertOutcome};
use std::collections::HashMap;
use std::sync::RwLock;

/// In-memory news store implementation
pub struct InMemoryNewsStore {
    records: RwLock<HashMap<(String, Source), NewsRecord>>,
}

impl InMemoryNewsStore {
    pub fn new() -> Self {
        Self {
            records: RwLock::new(HashMap::new()),
        }
    }

    /// Insert a record verbatim, bypassing the upsert rules
    ///
    /// Lets tests stage pre-existing state, including manually edited
    /// records the pipeline itself would never write.
    pub fn seed(&self, record: NewsRecord) {
        if let Ok(mut records) = self.records.write() {
            records.insert((record.external_id.clone(), record.source), record);
        }
    }

    pub fn len(&self) -> usize {
        self.records.read().map(|records| records.len()).unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl Default for InMemoryNewsStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait]
impl NewsStore for InMemoryNewsStore {
    async fn find_by_external_id(
        &self,
        external_id: &str,
        source: Source,
    ) -> Result<Option<NewsRecord>, StoreError> {
        let records = self
            .records
            .read()
            .map_err(|e| StoreError::Database(e.to_string()))?;
        Ok(records.get(&(external_id.to_string(), source)).cloned())
    }

    async fn upsert(&self, record: &NewsRecord) -> Result<UpsertOutcome, StoreError> {
        let mut records = self
            .records
            .write()
            .map_err(|e| StoreError::Database(e.to_string()))?;

        let key = (record.external_id.clone(), record.source);
        match records.get(&key) {
            Some(existing) if existing.is_manual => Ok(UpsertOutcome::SkippedManual),
            Some(_) => {
                records.insert(key, record.clone());
                Ok(UpsertOutcome::Updated)
            }
            None => {
                records.insert(key, record.clone());
                Ok(UpsertOutcome::Created)
            }
        }
    }
}
