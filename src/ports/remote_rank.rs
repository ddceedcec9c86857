//! Remote Rank Port - Interface for the external competitive rank service.

use async_trait::async_trait;

use super::RemoteError;
use crate::domain::reconciliation::RankSnapshot;

/// Port for ranked standings lookups, keyed by canonical account id.
#[async_trait]
pub trait RemoteRankService: Send + Sync {
    /// Queries ranked standings of one account for a season number.
    ///
    /// Modes without ranked data come back as `None` in the snapshot; that is
    /// not an error.
    async fn query(&self, account_id: &str, season: u32) -> Result<RankSnapshot, RemoteError>;
}
