// file: src/storage/snapshot.rs
// description: persistence for the current ranked project snapshot
// reference: whole-document json store

use crate::error::{PipelineError, Result};
use crate::models::{Project, Snapshot};
use crate::storage::atomic::{read_json, write_json_atomic};
use chrono::{DateTime, Utc};
use std::path::{Path, PathBuf};
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

pub struct SnapshotStore {
    path: PathBuf,
    write_lock: Mutex<()>,
}

impl SnapshotStore {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self {
            path: path.into(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Replace the stored snapshot with `projects`, stamped now.
    pub async fn save(&self, projects: Vec<Project>) -> Result<Snapshot> {
        let _guard = self.write_lock.lock().await;

        let snapshot = Snapshot::new(projects);
        write_json_atomic(&self.path, &snapshot).await?;

        info!(
            "Saved snapshot with {} projects to {}",
            snapshot.count,
            self.path.display()
        );
        Ok(snapshot)
    }

    /// Last saved snapshot, or an empty one when the document is missing or corrupt.
    pub async fn load(&self) -> Snapshot {
        self.load_stored().await.unwrap_or_else(Snapshot::empty)
    }

    async fn load_stored(&self) -> Option<Snapshot> {
        match read_json::<Snapshot>(&self.path).await {
            Ok(Some(mut snapshot)) => {
                snapshot.count = snapshot.projects.len();
                Some(snapshot)
            }
            Ok(None) => {
                debug!("No snapshot found at {}", self.path.display());
                None
            }
            Err(e) => {
                warn!("Ignoring unreadable snapshot: {}", e);
                None
            }
        }
    }

    pub async fn projects(&self) -> Vec<Project> {
        self.load().await.projects
    }

    pub async fn find(&self, key: &str) -> Result<Project> {
        self.load()
            .await
            .find(key)
            .cloned()
            .ok_or_else(|| PipelineError::NotFound(format!("project {}", key)))
    }

    pub async fn last_updated(&self) -> Option<DateTime<Utc>> {
        self.load_stored().await.map(|s| s.timestamp)
    }
}
