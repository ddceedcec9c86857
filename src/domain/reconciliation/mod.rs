//! Reconciliation module - pure rules for merging remote answers into records.

mod events;
mod merge;
mod patch;
mod remote;

pub use events::{PassSummary, ReconcileEvent};
pub use merge::{local_expiry, merge_rank, merge_status, LocalExpiry, StatusLookup};
pub use patch::{BanChange, PatchEffect, RecordPatch};
pub use remote::{RankResult, RankSnapshot, StatusSnapshot};
