//! HTTP Status Service - Implementation of RemoteStatusService over reqwest.
//!
//! # Wire contract
//!
//! `GET {base_url}/{player_id}` returns a JSON object:
//!
//! ```text
//! { "banType": "TemporaryBan", "tier": 3, "level": 120, "accountId": "account.9f.." }
//! ```
//!
//! Only `banType == "TemporaryBan"` means banned; any other value, or no
//! `banType` at all, means not banned. `tier`, `level` and `accountId` are
//! optional.
//!
//! # Configuration
//!
//! ```ignore
//! let config = StatusServiceConfig::new("https://bans.example.com/api/status")
//!     .with_timeout(Duration::from_secs(10));
//! let service = HttpStatusService::new(config)?;
//! ```

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::time::Duration;

use super::{join_segments, map_transport_error, parse_base_url, read_success_body};
use crate::domain::reconciliation::StatusSnapshot;
use crate::ports::{RemoteError, RemoteStatusService};

/// Ban type value that denotes a temporary ban.
pub const TEMPORARY_BAN: &str = "TemporaryBan";

/// Configuration for the HTTP status service.
#[derive(Debug, Clone)]
pub struct StatusServiceConfig {
    /// Endpoint the player id is appended to.
    pub base_url: String,
    /// Per-request timeout.
    pub timeout: Duration,
}

impl StatusServiceConfig {
    /// Creates a configuration with the default 10 second timeout.
    pub fn new(base_url: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            timeout: Duration::from_secs(10),
        }
    }

    /// Sets the request timeout.
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Ban-status lookups over HTTP.
pub struct HttpStatusService {
    config: StatusServiceConfig,
    base_url: Url,
    client: Client,
}

impl HttpStatusService {
    /// Creates the service with its own HTTP client.
    ///
    /// # Errors
    /// `NotConfigured` when the base URL cannot take a path segment.
    pub fn new(config: StatusServiceConfig) -> Result<Self, RemoteError> {
        let base_url = parse_base_url(&config.base_url, "remote.status_base_url")?;
        let client = Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| RemoteError::network(format!("Failed to create HTTP client: {}", e)))?;

        Ok(Self {
            config,
            base_url,
            client,
        })
    }

    fn status_url(&self, player_id: &str) -> Url {
        join_segments(&self.base_url, [player_id.trim()])
    }
}

#[async_trait]
impl RemoteStatusService for HttpStatusService {
    async fn query(&self, player_id: &str) -> Result<StatusSnapshot, RemoteError> {
        let url = self.status_url(player_id);
        tracing::debug!(%url, "querying ban status");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/json")
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout))?;

        let body = read_success_body(response, self.config.timeout).await?;
        parse_status_body(&body)
    }
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct StatusBody {
    ban_type: Option<String>,
    tier: Option<u32>,
    level: Option<u32>,
    account_id: Option<String>,
}

/// Reads a status response body into a snapshot.
pub fn parse_status_body(body: &str) -> Result<StatusSnapshot, RemoteError> {
    let parsed: StatusBody = serde_json::from_str(body)
        .map_err(|e| RemoteError::parse(format!("Failed to parse status response: {}", e)))?;

    let banned = parsed.ban_type.as_deref() == Some(TEMPORARY_BAN);
    let player_level = parsed
        .level
        .map(|level| StatusSnapshot::combined_level(parsed.tier.unwrap_or(1), level))
        .unwrap_or(0);

    Ok(StatusSnapshot::new(
        banned,
        player_level,
        parsed.account_id.unwrap_or_default(),
    ))
}
