//! HTTP Rank Service - Implementation of RemoteRankService over reqwest.
//!
//! `GET {base_url}/players/{account_id}/seasons/{season_prefix}-{season}/ranked`
//! returns the ranked stats document; the two tracked modes are read from
//! `data.attributes.rankedGameModeStats.squad` (TPP) and `...["squad-fpp"]` (FPP).

use async_trait::async_trait;
use reqwest::{Client, Url};
use serde::Deserialize;
use std::collections::HashMap;
use std::time::Duration;

use super::{join_segments, map_transport_error, parse_base_url, read_success_body};
use crate::domain::reconciliation::{RankResult, RankSnapshot};
use crate::ports::{RemoteError, RemoteRankService};

const TPP_MODE: &str = "squad";
const FPP_MODE: &str = "squad-fpp";

/// Configuration for the HTTP rank service.
#[derive(Debug, Clone)]
pub struct RankServiceConfig {
    pub base_url: String,
    /// Prefix of the season identifier, e.g. `division.bro.official.pc-2018`.
    pub season_prefix: String,
    pub timeout: Duration,
}

impl RankServiceConfig {
    pub fn new(base_url: impl Into<String>, season_prefix: impl Into<String>) -> Self {
        Self {
            base_url: base_url.into(),
            season_prefix: season_prefix.into(),
            timeout: Duration::from_secs(10),
        }
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

/// Season identifier in the `<prefix>-<number>` form the rank service expects.
pub fn season_id(prefix: &str, season: u32) -> String {
    format!("{}-{}", prefix.trim_end_matches('-'), season)
}

/// Ranked standings lookups over HTTP.
pub struct HttpRankService {
    config: RankServiceConfig,
    base_url: Url,
    client: Client,
}

impl HttpRankService {
    pub fn new(config: RankServiceConfig) -> Result<Self, RemoteError> {
        let base_url = parse_base_url(&config.base_url, "remote.rank_base_url")?;
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

    fn ranked_url(&self, account_id: &str, season: u32) -> Url {
        let season = season_id(&self.config.season_prefix, season);
        join_segments(
            &self.base_url,
            ["players", account_id.trim(), "seasons", season.as_str(), "ranked"],
        )
    }
}

#[async_trait]
impl RemoteRankService for HttpRankService {
    async fn query(&self, account_id: &str, season: u32) -> Result<RankSnapshot, RemoteError> {
        let url = self.ranked_url(account_id, season);
        tracing::debug!(%url, "querying ranked stats");

        let response = self
            .client
            .get(url)
            .header("Accept", "application/vnd.api+json")
            .send()
            .await
            .map_err(|e| map_transport_error(e, self.config.timeout))?;

        let body = read_success_body(response, self.config.timeout).await?;
        parse_rank_body(&body)
    }
}

#[derive(Debug, Deserialize)]
struct RankedDocument {
    data: RankedData,
}

#[derive(Debug, Deserialize)]
struct RankedData {
    attributes: RankedAttributes,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RankedAttributes {
    #[serde(default)]
    ranked_game_mode_stats: HashMap<String, ModeStats>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ModeStats {
    current_tier: Option<CurrentTier>,
    #[serde(default)]
    current_rank_point: f64,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct CurrentTier {
    tier: String,
    #[serde(default)]
    sub_tier: String,
}

/// Reads a ranked stats body into a snapshot.
pub fn parse_rank_body(body: &str) -> Result<RankSnapshot, RemoteError> {
    let mut document: RankedDocument = serde_json::from_str(body)
        .map_err(|e| RemoteError::parse(format!("Failed to parse rank response: {}", e)))?;
    let stats = &mut document.data.attributes.ranked_game_mode_stats;

    Ok(RankSnapshot {
        tpp: stats.remove(TPP_MODE).and_then(mode_result),
        fpp: stats.remove(FPP_MODE).and_then(mode_result),
    })
}

fn mode_result(stats: ModeStats) -> Option<RankResult> {
    let tier = stats.current_tier?;
    // Points arrive as a JSON number that may carry a fraction.
    let points = stats.current_rank_point.max(0.0).round() as u32;
    Some(RankResult::new(tier.tier, tier.sub_tier, points))
}
