// file: src/storage/atomic.rs
// description: whole-document json persistence with temp-file rename
// reference: https://docs.rs/tokio/latest/tokio/fs/fn.rename.html

use crate::error::{PipelineError, Result};
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::path::Path;
use tokio::fs;
use uuid::Uuid;

/// Serialize `value` and replace `path` in one rename so readers never see a
/// half-written document.
pub async fn write_json_atomic<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let contents = serde_json::to_string_pretty(value)?;

    if let Some(parent) = path.parent()
        && !parent.as_os_str().is_empty()
    {
        fs::create_dir_all(parent)
            .await
            .map_err(|source| PipelineError::FileOperation {
                path: parent.to_path_buf(),
                source,
            })?;
    }

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("store");
    let temp_path = path.with_file_name(format!(".{}.{}.tmp", file_name, Uuid::new_v4()));

    fs::write(&temp_path, contents)
        .await
        .map_err(|source| PipelineError::FileOperation {
            path: temp_path.clone(),
            source,
        })?;

    if let Err(source) = fs::rename(&temp_path, path).await {
        let _ = fs::remove_file(&temp_path).await;
        return Err(PipelineError::FileOperation {
            path: path.to_path_buf(),
            source,
        });
    }

    Ok(())
}

/// `Ok(None)` when the document does not exist yet.
pub async fn read_json<T: DeserializeOwned>(path: &Path) -> Result<Option<T>> {
    let contents = match fs::read_to_string(path).await {
        Ok(contents) => contents,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(PipelineError::FileOperation {
                path: path.to_path_buf(),
                source,
            });
        }
    };

    serde_json::from_str(&contents)
        .map(Some)
        .map_err(|e| PipelineError::MalformedLocalStore {
            path: path.to_path_buf(),
            message: e.to_string(),
        })
}
