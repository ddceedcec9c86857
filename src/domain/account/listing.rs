//! Ordering of the roster for display.

use std::cmp::Ordering;
use std::str::FromStr;

use super::rank::RankSlot;
use super::record::{AccountRecord, UnbanAt};
use crate::domain::foundation::{LocalTimestamp, ValidationError};

/// Column the roster listing can be ordered by.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SortKey {
    TppRank,
    FppRank,
    /// Not banned before banned.
    Status,
    /// Not banned first, then banned by unban time; banned without a readable
    /// time sorts last.
    UnbanTime,
}

impl FromStr for SortKey {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim() {
            "tpp" | "tpp_rank" => Ok(SortKey::TppRank),
            "fpp" | "fpp_rank" => Ok(SortKey::FppRank),
            "status" => Ok(SortKey::Status),
            "unban" | "unban_time" => Ok(SortKey::UnbanTime),
            other => Err(ValidationError::invalid_format(
                "sort",
                format!("unknown column '{}'", other),
            )),
        }
    }
}

fn compare(key: SortKey, a: &AccountRecord, b: &AccountRecord) -> Ordering {
    match key {
        SortKey::TppRank => a.rank(RankSlot::Tpp).tier().cmp(&b.rank(RankSlot::Tpp).tier()),
        SortKey::FppRank => a.rank(RankSlot::Fpp).tier().cmp(&b.rank(RankSlot::Fpp).tier()),
        SortKey::Status => a.is_banned().cmp(&b.is_banned()),
        SortKey::UnbanTime => unban_key(a).cmp(&unban_key(b)),
    }
}

fn unban_key(record: &AccountRecord) -> (u8, u8, Option<LocalTimestamp>) {
    if !record.is_banned() {
        return (0, 0, None);
    }
    match record.unban_at() {
        UnbanAt::At(at) => (1, 0, Some(*at)),
        UnbanAt::Absent | UnbanAt::Malformed(_) => (1, 1, None),
    }
}

/// Roster order for display, as `(roster index, record)` pairs.
///
/// Without an explicit key the roster order is kept, except that a roster
/// with nobody banned is shown by TPP rank, lowest first. Sorting is stable.
pub fn sorted_view(
    records: &[AccountRecord],
    key: Option<SortKey>,
    reverse: bool,
) -> Vec<(usize, &AccountRecord)> {
    let mut view: Vec<(usize, &AccountRecord)> = records.iter().enumerate().collect();

    let key = match key {
        Some(key) => key,
        None if records.iter().all(|r| !r.is_banned()) => SortKey::TppRank,
        None => return view,
    };

    view.sort_by(|(_, a), (_, b)| {
        let ordering = compare(key, a, b);
        if reverse {
            ordering.reverse()
        } else {
            ordering
        }
    });
    view
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::account::{BanMarker, BanSource, Division, ModeRank, RankTier};

    fn named(name: &str) -> AccountRecord {
        AccountRecord::new(name).unwrap()
    }

    fn ranked(name: &str, division: Division, sub: u8) -> AccountRecord {
        let mut record = named(name);
        record.set_rank(
            RankSlot::Tpp,
            ModeRank::new(RankTier::ranked(division, sub).unwrap(), 100),
        );
        record
    }

    fn banned(name: &str, unban_at: UnbanAt) -> AccountRecord {
        named(name).with_ban(unban_at, BanMarker::None, BanSource::Manual)
    }

    fn names(view: &[(usize, &AccountRecord)]) -> Vec<String> {
        view.iter().map(|(_, r)| r.name().to_string()).collect()
    }

    #[test]
    fn all_unbanned_defaults_to_tpp_rank() {
        let records = vec![
            ranked("gold", Division::Gold, 3),
            named("none"),
            ranked("bronze", Division::Bronze, 1),
        ];
        let view = sorted_view(&records, None, false);
        assert_eq!(names(&view), vec!["none", "bronze", "gold"]);
        assert_eq!(view[0].0, 1);
    }

    #[test]
    fn any_banned_keeps_roster_order() {
        let records = vec![ranked("gold", Division::Gold, 3), banned("b", UnbanAt::Absent)];
        assert_eq!(names(&sorted_view(&records, None, false)), vec!["gold", "b"]);
    }

    #[test]
    fn unban_time_groups_unbanned_first_and_unknown_last() {
        let at = |s: &str| UnbanAt::At(LocalTimestamp::parse(s).unwrap());
        let records = vec![
            banned("late", at("2024-05-09 00:00:00")),
            banned("unknown", UnbanAt::Malformed("soon".into())),
            named("free"),
            banned("early", at("2024-05-02 00:00:00")),
        ];
        let view = sorted_view(&records, Some(SortKey::UnbanTime), false);
        assert_eq!(names(&view), vec!["free", "early", "late", "unknown"]);

        let reversed = sorted_view(&records, Some(SortKey::UnbanTime), true);
        assert_eq!(names(&reversed), vec!["unknown", "late", "early", "free"]);
    }

    #[test]
    fn status_puts_banned_last() {
        let records = vec![banned("b", UnbanAt::Absent), named("a")];
        assert_eq!(
            names(&sorted_view(&records, Some(SortKey::Status), false)),
            vec!["a", "b"]
        );
    }

    #[test]
    fn sort_key_parses_column_names() {
        assert_eq!("tpp_rank".parse::<SortKey>().unwrap(), SortKey::TppRank);
        assert_eq!("unban".parse::<SortKey>().unwrap(), SortKey::UnbanTime);
        assert!("level".parse::<SortKey>().is_err());
    }
}
