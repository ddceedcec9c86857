//! Remote service adapters.
//!
//! - `HttpStatusService` / `HttpRankService` - Production clients over reqwest
//! - `MockStatusService` / `MockRankService` - Scripted services for tests

mod http_rank;
mod http_status;
mod mock;

pub use http_rank::{parse_rank_body, season_id, HttpRankService, RankServiceConfig};
pub use http_status::{parse_status_body, HttpStatusService, StatusServiceConfig, TEMPORARY_BAN};
pub use mock::{MockRankService, MockStatusService};

use reqwest::Url;
use std::time::Duration;

use crate::ports::RemoteError;

const MAX_ERROR_BODY: usize = 512;

/// Maps a reqwest transport failure onto the port error.
fn map_transport_error(err: reqwest::Error, timeout: Duration) -> RemoteError {
    if err.is_timeout() {
        RemoteError::Timeout {
            timeout_secs: timeout.as_secs(),
        }
    } else if err.is_connect() {
        RemoteError::network(format!("Connection failed: {}", err))
    } else {
        RemoteError::network(err.to_string())
    }
}

/// Parses a configured endpoint that path segments can be appended to.
fn parse_base_url(base_url: &str, setting: &'static str) -> Result<Url, RemoteError> {
    Url::parse(base_url.trim())
        .ok()
        .filter(|url| !url.cannot_be_a_base())
        .ok_or(RemoteError::NotConfigured(setting))
}

/// Appends `segments` to `base`, percent-encoding each one, so an id cannot
/// reach into the query, the fragment or another path.
fn join_segments<'a>(base: &Url, segments: impl IntoIterator<Item = &'a str>) -> Url {
    let mut url = base.clone();
    if let Ok(mut path) = url.path_segments_mut() {
        path.pop_if_empty().extend(segments);
    }
    url
}

/// Returns the body of a 2xx response, or a status error carrying a
/// truncated body for anything else.
async fn read_success_body(
    response: reqwest::Response,
    timeout: Duration,
) -> Result<String, RemoteError> {
    let status = response.status();
    let body = response
        .text()
        .await
        .map_err(|e| map_transport_error(e, timeout))?;

    if !status.is_success() {
        let truncated: String = body.chars().take(MAX_ERROR_BODY).collect();
        return Err(RemoteError::status(status.as_u16(), truncated));
    }

    Ok(body)
}
