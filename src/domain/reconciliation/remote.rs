//! What the remote services report, in domain terms.

/// Answer of a successful ban-status lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StatusSnapshot {
    pub banned: bool,
    /// Combined level; 0 when the service did not report one.
    pub player_level: u32,
    /// Canonical account id; empty when the service did not report one.
    pub account_id: String,
}

impl StatusSnapshot {
    pub fn new(banned: bool, player_level: u32, account_id: impl Into<String>) -> Self {
        Self {
            banned,
            player_level,
            account_id: account_id.into(),
        }
    }

    /// Level from a (tier, level-within-tier) pair: `(tier - 1) * 500 + level`.
    pub fn combined_level(tier: u32, level: u32) -> u32 {
        tier.saturating_sub(1).saturating_mul(500).saturating_add(level)
    }
}

/// Ranked standing in one mode as reported by the rank service.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RankResult {
    pub tier_name: String,
    pub sub_tier: String,
    pub rank_point: u32,
}

impl RankResult {
    pub fn new(tier_name: impl Into<String>, sub_tier: impl Into<String>, rank_point: u32) -> Self {
        Self {
            tier_name: tier_name.into(),
            sub_tier: sub_tier.into(),
            rank_point,
        }
    }
}

/// Answer of a successful rank lookup. `None` means no ranked data for that mode.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct RankSnapshot {
    /// Mode A: third-person squad.
    pub tpp: Option<RankResult>,
    /// Mode B: first-person squad.
    pub fpp: Option<RankResult>,
}
