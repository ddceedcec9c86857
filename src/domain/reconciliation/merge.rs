//! Per-record reconciliation rules.
//!
//! These functions decide what should change; they never touch the roster.
//! The engine feeds them a snapshot of one record plus whatever the remote
//! services answered and applies the resulting [`RecordPatch`].

use super::patch::{BanChange, RecordPatch};
use super::remote::{RankSnapshot, RankResult, StatusSnapshot};
use crate::domain::account::{
    closest_preset, extend_chase, AccountRecord, BanMarker, BanSource, DurationPreset, ModeRank,
    RankSlot, RankTier, ToleranceWindow, UnbanAt, FRESH_BAN_HOURS,
};
use crate::domain::foundation::LocalTimestamp;

/// Result of checking the locally stored unban time against the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LocalExpiry {
    /// Not banned, or banned without a time.
    NotApplicable,
    Running,
    Expired,
    /// The stored time does not parse; treated as expired.
    Unreadable,
}

impl LocalExpiry {
    pub fn is_expired(&self) -> bool {
        matches!(self, LocalExpiry::Expired | LocalExpiry::Unreadable)
    }
}

/// Outcome of the remote status lookup for one record.
#[derive(Debug, Clone, Copy)]
pub enum StatusLookup<'a> {
    /// The record has no player id.
    Skipped,
    /// The call failed; nothing is known beyond the local state.
    Failed,
    Succeeded(&'a StatusSnapshot),
}

pub fn local_expiry(record: &AccountRecord, now: LocalTimestamp) -> LocalExpiry {
    if !record.is_banned() {
        return LocalExpiry::NotApplicable;
    }
    match record.unban_at() {
        UnbanAt::Absent => LocalExpiry::NotApplicable,
        UnbanAt::At(at) if now >= *at => LocalExpiry::Expired,
        UnbanAt::At(_) => LocalExpiry::Running,
        UnbanAt::Malformed(_) => LocalExpiry::Unreadable,
    }
}

/// Decides the status-pass changes for one record.
///
/// Without a successful lookup only the local expiry can unban. With one, the
/// level and account id are always synced, and the remote ban flag is compared
/// against the record as it would be once an expired timer is honoured:
///
/// - remote banned, record not: a fresh 24-hour ban when no unban time was
///   ever recorded, otherwise a chase ban extended by [`extend_chase`];
/// - remote banned, record banned by hand with at most a fresh ban's time
///   left and no chase marker: the remote confirms a repeat offense, also a
///   chase. Longer manual bans are left alone, since the chase extension
///   only holds for a 24-hour ban;
/// - remote not banned, record banned: unban;
/// - otherwise an expired timer unbans and anything else is left alone.
pub fn merge_status(
    record: &AccountRecord,
    lookup: StatusLookup<'_>,
    now: LocalTimestamp,
) -> RecordPatch {
    let expired = local_expiry(record, now).is_expired();
    let mut patch = RecordPatch::default();

    let remote = match lookup {
        StatusLookup::Succeeded(remote) => remote,
        StatusLookup::Skipped | StatusLookup::Failed => {
            if expired {
                patch.ban = Some(BanChange::Unban);
            }
            return patch;
        }
    };

    if remote.player_level > 0 && remote.player_level != record.level() {
        patch.level = Some(remote.player_level);
    }
    let account_id = remote.account_id.trim();
    if !account_id.is_empty() && record.account_id() != Some(account_id) {
        patch.account_id = Some(account_id.to_string());
    }

    let working_banned = record.is_banned() && !expired;
    patch.ban = match (remote.banned, working_banned) {
        (true, false) => Some(match record.unban_at() {
            UnbanAt::Absent => BanChange::Ban {
                unban_at: now.plus_hours(FRESH_BAN_HOURS),
                marker: BanMarker::None,
            },
            existing => chase(existing.timestamp(), now),
        }),
        (true, true) if is_unconfirmed_fresh_manual_ban(record, now) => {
            Some(chase(record.unban_at().timestamp(), now))
        }
        (false, true) => Some(BanChange::Unban),
        (false, false) if expired => Some(BanChange::Unban),
        _ => None,
    };

    patch
}

/// Decides the rank-pass changes for one record.
///
/// Modes without ranked data, and tiers missing from the translation table,
/// are written as unranked with zero points.
pub fn merge_rank(record: &AccountRecord, snapshot: &RankSnapshot) -> RecordPatch {
    let tpp = translate(snapshot.tpp.as_ref());
    let fpp = translate(snapshot.fpp.as_ref());
    RecordPatch {
        tpp: (record.rank(RankSlot::Tpp) != tpp).then_some(tpp),
        fpp: (record.rank(RankSlot::Fpp) != fpp).then_some(fpp),
        ..RecordPatch::default()
    }
}

fn translate(result: Option<&RankResult>) -> ModeRank {
    result
        .and_then(|r| {
            RankTier::from_remote(&r.tier_name, &r.sub_tier)
                .map(|tier| ModeRank::new(tier, r.rank_point))
        })
        .unwrap_or_default()
}

fn chase(current: Option<LocalTimestamp>, now: LocalTimestamp) -> BanChange {
    BanChange::Ban {
        unban_at: extend_chase(current, now),
        marker: BanMarker::Chase,
    }
}

fn is_unconfirmed_fresh_manual_ban(record: &AccountRecord, now: LocalTimestamp) -> bool {
    if record.ban_source() != BanSource::Manual || record.marker() != BanMarker::None {
        return false;
    }
    match record.unban_at().timestamp() {
        Some(unban_at) => {
            unban_at <= now.plus_hours(FRESH_BAN_HOURS)
                || closest_preset(unban_at, now, ToleranceWindow::LOADED) == DurationPreset::Hours24
        }
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn now() -> LocalTimestamp {
        LocalTimestamp::parse("2024-06-01 12:00:00").unwrap()
    }

    fn banned_until(unban_at: UnbanAt, source: BanSource) -> AccountRecord {
        AccountRecord::new("alpha")
            .unwrap()
            .with_player_id("p-1")
            .with_ban(unban_at, BanMarker::None, source)
    }

    fn remote(banned: bool) -> StatusSnapshot {
        StatusSnapshot::new(banned, 0, "")
    }

    #[test]
    fn local_expiry_cases() {
        let clean = AccountRecord::new("alpha").unwrap();
        assert_eq!(local_expiry(&clean, now()), LocalExpiry::NotApplicable);

        let running = banned_until(UnbanAt::At(now().plus_hours(1)), BanSource::Manual);
        assert_eq!(local_expiry(&running, now()), LocalExpiry::Running);

        let exact = banned_until(UnbanAt::At(now()), BanSource::Manual);
        assert_eq!(local_expiry(&exact, now()), LocalExpiry::Expired);

        let junk = banned_until(UnbanAt::Malformed("soon".into()), BanSource::Manual);
        assert!(local_expiry(&junk, now()).is_expired());

        let open = banned_until(UnbanAt::Absent, BanSource::Manual);
        assert_eq!(local_expiry(&open, now()), LocalExpiry::NotApplicable);
    }

    #[test]
    fn fresh_ban_when_no_unban_time_known() {
        let record = AccountRecord::new("alpha").unwrap().with_player_id("p-1");
        let patch = merge_status(&record, StatusLookup::Succeeded(&remote(true)), now());
        assert_eq!(
            patch.ban,
            Some(BanChange::Ban {
                unban_at: now().plus_hours(24),
                marker: BanMarker::None,
            })
        );
    }

    #[test]
    fn manual_running_ban_confirmed_remotely_becomes_chase() {
        let original = now().plus_hours(20);
        let record = banned_until(UnbanAt::At(original), BanSource::Manual);
        let patch = merge_status(&record, StatusLookup::Succeeded(&remote(true)), now());
        assert_eq!(
            patch.ban,
            Some(BanChange::Ban {
                unban_at: original.plus_days(2),
                marker: BanMarker::Chase,
            })
        );
    }

    #[test]
    fn manual_ban_just_set_to_24h_confirmed_remotely_becomes_chase() {
        let original = now().plus_hours(24);
        let record = banned_until(UnbanAt::At(original), BanSource::Manual);
        let patch = merge_status(&record, StatusLookup::Succeeded(&remote(true)), now());
        assert_eq!(
            patch.ban,
            Some(BanChange::Ban {
                unban_at: original.plus_days(2),
                marker: BanMarker::Chase,
            })
        );
    }

    #[test]
    fn long_manual_bans_confirmed_remotely_are_left_alone() {
        for unban_at in [
            now().plus_hours(72),
            now().plus_days(7),
            now().plus_days(15),
            now().plus_days(30),
            now().plus_hours(40),
        ] {
            let record = banned_until(UnbanAt::At(unban_at), BanSource::Manual);
            let patch = merge_status(&record, StatusLookup::Succeeded(&remote(true)), now());
            assert_eq!(patch.ban, None, "unban at {}", unban_at);
        }
    }

    #[test]
    fn remote_detected_running_ban_is_left_alone() {
        let record = banned_until(UnbanAt::At(now().plus_hours(20)), BanSource::Remote);
        let patch = merge_status(&record, StatusLookup::Succeeded(&remote(true)), now());
        assert_eq!(patch.ban, None);
    }

    #[test]
    fn running_chase_ban_is_not_extended_again() {
        let record = AccountRecord::new("alpha").unwrap().with_ban(
            UnbanAt::At(now().plus_hours(30)),
            BanMarker::Chase,
            BanSource::Manual,
        );
        let patch = merge_status(&record, StatusLookup::Succeeded(&remote(true)), now());
        assert_eq!(patch.ban, None);
    }

    #[test]
    fn expired_ban_still_banned_remotely_chases_from_now() {
        let record = banned_until(UnbanAt::At(now().minus_hours(1)), BanSource::Remote);
        let patch = merge_status(&record, StatusLookup::Succeeded(&remote(true)), now());
        assert_eq!(
            patch.ban,
            Some(BanChange::Ban {
                unban_at: now().plus_days(3),
                marker: BanMarker::Chase,
            })
        );
    }

    #[test]
    fn unreadable_time_still_banned_remotely_chases_from_now() {
        let record = banned_until(UnbanAt::Malformed("??".into()), BanSource::Manual);
        let patch = merge_status(&record, StatusLookup::Succeeded(&remote(true)), now());
        assert_eq!(
            patch.ban,
            Some(BanChange::Ban {
                unban_at: now().plus_days(3),
                marker: BanMarker::Chase,
            })
        );
    }

    #[test]
    fn remote_unban_clears_running_ban() {
        let record = banned_until(UnbanAt::At(now().plus_hours(5)), BanSource::Manual);
        let patch = merge_status(&record, StatusLookup::Succeeded(&remote(false)), now());
        assert_eq!(patch.ban, Some(BanChange::Unban));
    }

    #[test]
    fn expired_ban_confirmed_by_remote_unbans() {
        let record = banned_until(UnbanAt::At(now().minus_hours(5)), BanSource::Manual);
        let patch = merge_status(&record, StatusLookup::Succeeded(&remote(false)), now());
        assert_eq!(patch.ban, Some(BanChange::Unban));
    }

    #[test]
    fn failed_lookup_applies_local_expiry_only() {
        let expired = banned_until(UnbanAt::At(now().minus_hours(5)), BanSource::Manual);
        let patch = merge_status(&expired, StatusLookup::Failed, now());
        assert_eq!(patch, RecordPatch { ban: Some(BanChange::Unban), ..Default::default() });

        let running = banned_until(UnbanAt::At(now().plus_hours(5)), BanSource::Manual);
        assert!(merge_status(&running, StatusLookup::Failed, now()).is_empty());
    }

    #[test]
    fn skipped_lookup_applies_local_expiry_only() {
        let record = AccountRecord::new("alpha").unwrap().with_ban(
            UnbanAt::At(now().minus_hours(1)),
            BanMarker::Chase,
            BanSource::Remote,
        );
        let patch = merge_status(&record, StatusLookup::Skipped, now());
        assert_eq!(patch.ban, Some(BanChange::Unban));
    }

    #[test]
    fn level_and_account_id_sync_without_ban_change() {
        let record = AccountRecord::new("alpha").unwrap().with_player_id("p-1");
        let snapshot = StatusSnapshot::new(false, 1120, "account.abc");
        let patch = merge_status(&record, StatusLookup::Succeeded(&snapshot), now());
        assert_eq!(patch.ban, None);
        assert_eq!(patch.level, Some(1120));
        assert_eq!(patch.account_id.as_deref(), Some("account.abc"));
    }

    #[test]
    fn unknown_level_and_blank_id_are_not_synced() {
        let mut record = AccountRecord::new("alpha").unwrap().with_account_id("account.abc");
        record.set_level(900);
        let snapshot = StatusSnapshot::new(false, 0, " ");
        let patch = merge_status(&record, StatusLookup::Succeeded(&snapshot), now());
        assert!(patch.is_empty());
    }

    #[test]
    fn rank_translation_and_unranked_fallback() {
        let record = AccountRecord::new("alpha").unwrap();
        let snapshot = RankSnapshot {
            tpp: Some(RankResult::new("Platinum", "3", 2450)),
            fpp: None,
        };
        let patch = merge_rank(&record, &snapshot);
        assert_eq!(patch.tpp.unwrap().tier().label(), "铂金3");
        assert_eq!(patch.tpp.unwrap().points(), 2450);
        assert_eq!(patch.fpp, None, "already unranked");
    }

    #[test]
    fn rank_loss_resets_to_unranked() {
        let mut record = AccountRecord::new("alpha").unwrap();
        record.set_rank(RankSlot::Fpp, ModeRank::new(RankTier::Master, 4000));
        let snapshot = RankSnapshot {
            tpp: None,
            fpp: Some(RankResult::new("Obsidian", "1", 10)),
        };
        let patch = merge_rank(&record, &snapshot);
        assert_eq!(patch.fpp, Some(ModeRank::unranked()));
    }
}
