//! Account module - the tracked game account and its ban rules.
//!
//! - `record` - the account record, its persisted form and roster counts
//! - `rank` - competitive tiers and per-mode rank pairs
//! - `duration` - ban duration presets, preset inference and chase extension
//! - `form` - the ban section of the account form as a state machine
//! - `listing` - display ordering of the roster

mod duration;
mod form;
mod listing;
mod rank;
mod record;

pub use duration::{
    closest_preset, expiry_for, extend_chase, DurationPreset, ToleranceWindow,
    CHASE_EXTENSION_DAYS, CHASE_TOTAL_DAYS, FRESH_BAN_HOURS,
};
pub use form::{reconcile, unban_time_for_save, BanForm, FormEvent};
pub use listing::{sorted_view, SortKey};
pub use rank::{Division, ModeRank, RankSlot, RankTier, UNRANKED_LABEL};
pub use record::{
    AccountRecord, BanMarker, BanSource, Credential, RosterStats, UnbanAt, DEFAULT_SEASON,
};
