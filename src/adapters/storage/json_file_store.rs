//! JSON file store for the roster document.
//!
//! The roster is one JSON array of flat record objects, written with
//! non-ASCII text kept verbatim. Saves go through a sibling temp file and a
//! rename so a failed write never truncates the previous document.

use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tokio::fs;

use crate::domain::account::AccountRecord;
use crate::ports::{AccountDocumentStore, StoreError};

/// File-backed roster document.
#[derive(Debug, Clone)]
pub struct JsonFileStore {
    path: PathBuf,
}

impl JsonFileStore {
    /// Creates a store for the document at `path`.
    ///
    /// # Example
    /// ```ignore
    /// let store = JsonFileStore::new("./accounts.json");
    /// ```
    pub fn new<P: AsRef<Path>>(path: P) -> Self {
        Self {
            path: path.as_ref().to_path_buf(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }

    async fn ensure_parent(&self) -> Result<(), StoreError> {
        match self.path.parent() {
            Some(parent) if !parent.as_os_str().is_empty() => fs::create_dir_all(parent)
                .await
                .map_err(|e| StoreError::io(parent, e)),
            _ => Ok(()),
        }
    }
}

#[async_trait]
impl AccountDocumentStore for JsonFileStore {
    async fn load(&self) -> Result<Vec<AccountRecord>, StoreError> {
        let text = match fs::read_to_string(&self.path).await {
            Ok(text) => text,
            Err(e) if e.kind() == ErrorKind::NotFound => {
                tracing::info!(path = %self.path.display(), "no roster document yet, starting empty");
                return Ok(Vec::new());
            }
            Err(e) => return Err(StoreError::io(&self.path, e)),
        };

        if text.trim().is_empty() {
            return Ok(Vec::new());
        }

        match serde_json::from_str::<Vec<AccountRecord>>(&text) {
            Ok(records) => {
                tracing::debug!(path = %self.path.display(), count = records.len(), "roster loaded");
                Ok(records)
            }
            Err(e) => {
                tracing::warn!(
                    path = %self.path.display(),
                    error = %e,
                    "roster document unreadable, starting empty"
                );
                Ok(Vec::new())
            }
        }
    }

    async fn save(&self, records: &[AccountRecord]) -> Result<(), StoreError> {
        self.ensure_parent().await?;

        let json = serde_json::to_string_pretty(records)
            .map_err(|e| StoreError::SerializationFailed(e.to_string()))?;

        let temp = self.temp_path();
        fs::write(&temp, json)
            .await
            .map_err(|e| StoreError::io(&temp, e))?;
        fs::rename(&temp, &self.path)
            .await
            .map_err(|e| StoreError::io(&self.path, e))?;

        tracing::debug!(path = %self.path.display(), count = records.len(), "roster saved");
        Ok(())
    }
}
