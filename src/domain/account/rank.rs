//! Competitive rank tiers and per-mode (tier, points) pairs.

use once_cell::sync::Lazy;
use serde::{Deserialize, Deserializer, Serialize, Serializer};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

use crate::domain::foundation::ValidationError;

/// Label persisted for an account without a rank.
pub const UNRANKED_LABEL: &str = "未定级";

const MASTER_LABEL: &str = "大师";

/// Divisions below Master, lowest first. Each has five sub-tiers (5 lowest, 1 highest).
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Division {
    Bronze,
    Silver,
    Gold,
    Platinum,
    Diamond,
}

impl Division {
    pub const ALL: [Division; 5] = [
        Division::Bronze,
        Division::Silver,
        Division::Gold,
        Division::Platinum,
        Division::Diamond,
    ];

    fn label(&self) -> &'static str {
        match self {
            Division::Bronze => "青铜",
            Division::Silver => "白银",
            Division::Gold => "黄金",
            Division::Platinum => "铂金",
            Division::Diamond => "钻石",
        }
    }
}

/// Remote tier names and what they translate to.
static REMOTE_TIER_NAMES: Lazy<HashMap<&'static str, RemoteTier>> = Lazy::new(|| {
    HashMap::from([
        ("bronze", RemoteTier::Division(Division::Bronze)),
        ("silver", RemoteTier::Division(Division::Silver)),
        ("gold", RemoteTier::Division(Division::Gold)),
        ("platinum", RemoteTier::Division(Division::Platinum)),
        ("diamond", RemoteTier::Division(Division::Diamond)),
        ("master", RemoteTier::Master),
    ])
});

#[derive(Debug, Clone, Copy)]
enum RemoteTier {
    Division(Division),
    Master,
}

/// A competitive rank tier. Ordered lowest (unranked) to highest (master).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum RankTier {
    #[default]
    Unranked,
    /// `sub_tier` runs 5 (lowest) to 1 (highest).
    Ranked { division: Division, sub_tier: u8 },
    Master,
}

impl RankTier {
    /// Builds a divisional tier; `sub_tier` must be 1..=5.
    pub fn ranked(division: Division, sub_tier: u8) -> Result<Self, ValidationError> {
        if !(1..=5).contains(&sub_tier) {
            return Err(ValidationError::out_of_range("sub_tier", 1, 5, sub_tier as i64));
        }
        Ok(RankTier::Ranked { division, sub_tier })
    }

    /// Every tier in display order, unranked first.
    pub fn all() -> Vec<RankTier> {
        let mut tiers = vec![RankTier::Unranked];
        for division in Division::ALL {
            for sub_tier in (1..=5).rev() {
                tiers.push(RankTier::Ranked { division, sub_tier });
            }
        }
        tiers.push(RankTier::Master);
        tiers
    }

    /// Translates a remote `(tier, sub-tier)` pair, e.g. `("Gold", "2")`.
    ///
    /// Returns `None` when the tier name is not in the translation table or the
    /// sub-tier is not a number in 1..=5.
    pub fn from_remote(tier_name: &str, sub_tier: &str) -> Option<Self> {
        match REMOTE_TIER_NAMES.get(tier_name.trim().to_ascii_lowercase().as_str())? {
            RemoteTier::Master => Some(RankTier::Master),
            RemoteTier::Division(division) => {
                let sub_tier = sub_tier.trim().parse::<u8>().ok()?;
                RankTier::ranked(*division, sub_tier).ok()
            }
        }
    }

    /// Position in the display order; unranked is 0 and master is 26.
    pub fn ordinal(&self) -> u8 {
        match self {
            RankTier::Unranked => 0,
            RankTier::Ranked { division, sub_tier } => *division as u8 * 5 + 6u8.saturating_sub(*sub_tier),
            RankTier::Master => 26,
        }
    }

    pub fn is_ranked(&self) -> bool {
        !matches!(self, RankTier::Unranked)
    }

    pub fn label(&self) -> String {
        match self {
            RankTier::Unranked => UNRANKED_LABEL.to_string(),
            RankTier::Ranked { division, sub_tier } => {
                format!("{}{}", division.label(), sub_tier)
            }
            RankTier::Master => MASTER_LABEL.to_string(),
        }
    }
}

impl PartialOrd for RankTier {
    fn partial_cmp(&self, other: &Self) -> Option<std::cmp::Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for RankTier {
    fn cmp(&self, other: &Self) -> std::cmp::Ordering {
        self.ordinal().cmp(&other.ordinal())
    }
}

impl fmt::Display for RankTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.label())
    }
}

impl FromStr for RankTier {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let s = s.trim();
        if s.is_empty() || s == UNRANKED_LABEL {
            return Ok(RankTier::Unranked);
        }
        if s == MASTER_LABEL {
            return Ok(RankTier::Master);
        }
        for division in Division::ALL {
            if let Some(rest) = s.strip_prefix(division.label()) {
                let sub_tier = rest
                    .parse::<u8>()
                    .map_err(|_| ValidationError::invalid_format("rank", s))?;
                return RankTier::ranked(division, sub_tier);
            }
        }
        Err(ValidationError::invalid_format("rank", s))
    }
}

impl Serialize for RankTier {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.label())
    }
}

impl<'de> Deserialize<'de> for RankTier {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        text.parse().map_err(serde::de::Error::custom)
    }
}

/// A (tier, points) pair for one game mode.
///
/// An unranked tier always carries zero points.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct ModeRank {
    tier: RankTier,
    points: u32,
}

impl ModeRank {
    pub fn new(tier: RankTier, points: u32) -> Self {
        let points = if tier.is_ranked() { points } else { 0 };
        Self { tier, points }
    }

    pub fn unranked() -> Self {
        Self::default()
    }

    pub fn tier(&self) -> RankTier {
        self.tier
    }

    pub fn points(&self) -> u32 {
        self.points
    }
}

impl fmt::Display for ModeRank {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.tier.is_ranked() {
            write!(f, "{} ({})", self.tier, self.points)
        } else {
            write!(f, "{}", self.tier)
        }
    }
}

/// The two tracked game modes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum RankSlot {
    /// Third-person squad ranking.
    Tpp,
    /// First-person squad ranking.
    Fpp,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_lists_twenty_seven_tiers_in_ascending_order() {
        let tiers = RankTier::all();
        assert_eq!(tiers.len(), 27);
        assert_eq!(tiers[0], RankTier::Unranked);
        assert_eq!(tiers[1].label(), "青铜5");
        assert_eq!(tiers[5].label(), "青铜1");
        assert_eq!(tiers[26], RankTier::Master);
        assert!(tiers.windows(2).all(|w| w[0] < w[1]));
    }

    #[test]
    fn labels_parse_back() {
        for tier in RankTier::all() {
            assert_eq!(tier.label().parse::<RankTier>().unwrap(), tier);
        }
    }

    #[test]
    fn empty_label_is_unranked() {
        assert_eq!("".parse::<RankTier>().unwrap(), RankTier::Unranked);
    }

    #[test]
    fn unknown_label_is_rejected() {
        assert!("黄金9".parse::<RankTier>().is_err());
        assert!("Gold 2".parse::<RankTier>().is_err());
    }

    #[test]
    fn remote_names_translate() {
        assert_eq!(
            RankTier::from_remote("Gold", "2").unwrap().label(),
            "黄金2"
        );
        assert_eq!(RankTier::from_remote("Master", ""), Some(RankTier::Master));
        assert_eq!(RankTier::from_remote("Crystal", "1"), None);
        assert_eq!(RankTier::from_remote("Gold", "7"), None);
    }

    #[test]
    fn unranked_mode_rank_forces_zero_points() {
        let rank = ModeRank::new(RankTier::Unranked, 1500);
        assert_eq!(rank.points(), 0);
        assert_eq!(rank, ModeRank::unranked());
    }

    #[test]
    fn ranked_mode_rank_keeps_points() {
        let rank = ModeRank::new(RankTier::Master, 4100);
        assert_eq!(rank.points(), 4100);
        assert_eq!(rank.to_string(), "大师 (4100)");
    }
}
