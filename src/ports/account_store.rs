//! Account Store Port - Interface for persisting the roster document.
//!
//! The whole roster is loaded and saved as one document. Loading is forgiving:
//! a missing or unreadable document is an empty roster, not an error.

use async_trait::async_trait;
use std::path::PathBuf;

use crate::domain::account::AccountRecord;

/// Errors that can occur while saving the roster document.
#[derive(Debug, thiserror::Error)]
pub enum StoreError {
    #[error("Failed to serialize roster: {0}")]
    SerializationFailed(String),

    #[error("IO error at {}: {message}", path.display())]
    Io { path: PathBuf, message: String },
}

impl StoreError {
    pub fn io(path: impl Into<PathBuf>, err: impl std::fmt::Display) -> Self {
        StoreError::Io {
            path: path.into(),
            message: err.to_string(),
        }
    }
}

/// Port for loading and saving the roster document.
#[async_trait]
pub trait AccountDocumentStore: Send + Sync {
    /// Load every record in document order.
    ///
    /// # Errors
    /// Only for I/O failures other than a missing document. A missing or
    /// unparseable document yields an empty roster.
    async fn load(&self) -> Result<Vec<AccountRecord>, StoreError>;

    /// Replace the whole document with `records`.
    ///
    /// # Errors
    /// Returns `StoreError` if the document could not be written; the previous
    /// document is left intact.
    async fn save(&self, records: &[AccountRecord]) -> Result<(), StoreError>;
}
