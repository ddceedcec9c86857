//! Field-level changes computed by a reconciliation step.

use crate::domain::account::{AccountRecord, BanMarker, BanSource, ModeRank, RankSlot, UnbanAt};
use crate::domain::foundation::LocalTimestamp;

/// A change to the ban fields.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BanChange {
    Ban {
        unban_at: LocalTimestamp,
        marker: BanMarker,
    },
    Unban,
}

/// Changes to apply to one record. Empty fields leave the record alone.
///
/// A patch is computed from a snapshot of the record and applied later to
/// whatever the record looks like at that moment, so edits made between the
/// two are kept for every field the patch does not touch.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct RecordPatch {
    pub ban: Option<BanChange>,
    pub level: Option<u32>,
    pub account_id: Option<String>,
    pub tpp: Option<ModeRank>,
    pub fpp: Option<ModeRank>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        *self == RecordPatch::default()
    }

    /// Applies the patch and reports which groups of fields actually changed.
    pub fn apply(&self, record: &mut AccountRecord) -> PatchEffect {
        let before = record.clone();

        match self.ban {
            Some(BanChange::Ban { unban_at, marker }) => {
                record.ban(UnbanAt::At(unban_at), marker, BanSource::Remote)
            }
            Some(BanChange::Unban) => record.unban(),
            None => {}
        }
        let ban_changed = record.is_banned() != before.is_banned()
            || record.unban_at() != before.unban_at()
            || record.marker() != before.marker();

        let mut sync_changed = false;
        if let Some(level) = self.level {
            sync_changed |= record.set_level(level);
        }
        if let Some(account_id) = &self.account_id {
            sync_changed |= record.set_account_id(account_id.as_str());
        }

        let mut rank_changed = false;
        if let Some(rank) = self.tpp {
            rank_changed |= record.set_rank(RankSlot::Tpp, rank);
        }
        if let Some(rank) = self.fpp {
            rank_changed |= record.set_rank(RankSlot::Fpp, rank);
        }

        PatchEffect {
            ban_changed,
            sync_changed,
            rank_changed,
        }
    }
}

/// What applying a patch changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct PatchEffect {
    pub ban_changed: bool,
    /// Level or account id.
    pub sync_changed: bool,
    pub rank_changed: bool,
}

impl PatchEffect {
    pub fn any(&self) -> bool {
        self.ban_changed || self.sync_changed || self.rank_changed
    }
}
