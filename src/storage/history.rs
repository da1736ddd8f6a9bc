// file: src/storage/history.rs
// description: retention-bounded weekly history ledger
// reference: whole-document json store, upsert by week id

use crate::error::{PipelineError, Result};
use crate::models::HistoryRecord;
use crate::storage::atomic::{read_json, write_json_atomic};
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub const DEFAULT_RETENTION: usize = 12;

#[derive(Debug, Default, Serialize, Deserialize)]
struct HistoryDocument {
    #[serde(default)]
    history: Vec<HistoryRecord>,
}

pub struct HistoryLedger {
    path: PathBuf,
    retention: usize,
    write_lock: Mutex<()>,
}

impl HistoryLedger {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self::with_retention(path, DEFAULT_RETENTION)
    }

    pub fn with_retention(path: impl Into<PathBuf>, retention: usize) -> Self {
        Self {
            path: path.into(),
            retention: retention.max(1),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn retention(&self) -> usize {
        self.retention
    }

    /// All records, most recent first. Missing or corrupt ledgers read as empty.
    pub async fn list(&self) -> Vec<HistoryRecord> {
        match read_json::<HistoryDocument>(&self.path).await {
            Ok(Some(doc)) => doc.history,
            Ok(None) => {
                debug!("No history ledger found at {}", self.path.display());
                Vec::new()
            }
            Err(e) => {
                warn!("Ignoring unreadable history ledger: {}", e);
                Vec::new()
            }
        }
    }

    pub async fn get(&self, id: &str) -> Result<HistoryRecord> {
        self.list()
            .await
            .into_iter()
            .find(|r| r.id == id)
            .ok_or_else(|| PipelineError::NotFound(format!("history record {}", id)))
    }

    /// Insert `record` at the head, replacing any record with the same id and
    /// dropping the oldest entries beyond retention.
    pub async fn upsert(&self, record: HistoryRecord) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut history = self.list().await;
        history.retain(|r| r.id != record.id);

        let id = record.id.clone();
        history.insert(0, record);

        if history.len() > self.retention {
            let evicted = history.len() - self.retention;
            history.truncate(self.retention);
            debug!("Evicted {} history records beyond retention", evicted);
        }

        self.save(history).await?;
        info!("Recorded history entry {}", id);
        Ok(())
    }

    pub async fn delete(&self, id: &str) -> Result<()> {
        let _guard = self.write_lock.lock().await;

        let mut history = self.list().await;
        let before = history.len();
        history.retain(|r| r.id != id);

        if history.len() == before {
            return Err(PipelineError::NotFound(format!("history record {}", id)));
        }

        self.save(history).await?;
        info!("Deleted history entry {}", id);
        Ok(())
    }

    async fn save(&self, history: Vec<HistoryRecord>) -> Result<()> {
        write_json_atomic(&self.path, &HistoryDocument { history }).await
    }
}
