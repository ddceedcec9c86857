//! Remote Status Port - Interface for the external ban-status service.
//!
//! Given an account's remote player id, the service reports whether the
//! account is currently temporarily banned, its level, and the canonical
//! account id used by the rank service.
//!
//! # Example
//!
//! ```ignore
//! match status_service.query("player-123").await {
//!     Ok(snapshot) => println!("banned: {}", snapshot.banned),
//!     Err(e) => tracing::warn!(error = %e, "status lookup failed"),
//! }
//! ```

use async_trait::async_trait;
use thiserror::Error;

use crate::domain::reconciliation::StatusSnapshot;

/// Port for ban-status lookups.
#[async_trait]
pub trait RemoteStatusService: Send + Sync {
    /// Queries the current status of one player.
    ///
    /// # Errors
    ///
    /// Returns `RemoteError` on timeout, transport failure, a non-2xx status
    /// or a body that cannot be read.
    async fn query(&self, player_id: &str) -> Result<StatusSnapshot, RemoteError>;
}

/// Errors from remote status and rank lookups.
///
/// All of them are transient from the engine's point of view: the record is
/// skipped for this pass and retried on the next one.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum RemoteError {
    /// Request timed out.
    #[error("request timed out after {timeout_secs}s")]
    Timeout {
        /// Configured timeout.
        timeout_secs: u64,
    },

    /// Network error during request.
    #[error("network error: {0}")]
    Network(String),

    /// Service answered with a non-success status.
    #[error("unexpected status {status}: {body}")]
    Status {
        /// HTTP status code.
        status: u16,
        /// Response body, possibly truncated.
        body: String,
    },

    /// Failed to parse the response body.
    #[error("parse error: {0}")]
    Parse(String),

    /// The service endpoint is not configured.
    #[error("service not configured: {0}")]
    NotConfigured(&'static str),
}

impl RemoteError {
    /// Creates a network error.
    pub fn network(message: impl Into<String>) -> Self {
        Self::Network(message.into())
    }

    /// Creates a parse error.
    pub fn parse(message: impl Into<String>) -> Self {
        Self::Parse(message.into())
    }

    /// Creates a status error.
    pub fn status(status: u16, body: impl Into<String>) -> Self {
        Self::Status {
            status,
            body: body.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn RemoteStatusService) {}

    #[test]
    fn remote_error_messages() {
        assert_eq!(
            RemoteError::Timeout { timeout_secs: 10 }.to_string(),
            "request timed out after 10s"
        );
        assert_eq!(
            RemoteError::status(404, "not found").to_string(),
            "unexpected status 404: not found"
        );
        assert!(RemoteError::parse("missing field").to_string().contains("parse"));
    }
}
