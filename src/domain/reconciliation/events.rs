//! Notifications emitted while a pass runs, and the pass summary.

use std::fmt;

use crate::domain::account::AccountRecord;
use crate::domain::foundation::PassId;

/// Counters for one completed pass.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PassSummary {
    pub pass_id: PassId,
    /// Records whose ban state, level or account id changed.
    pub status_changed: usize,
    /// Records whose rank changed.
    pub rank_changed: usize,
    pub status_queries: usize,
    pub rank_queries: usize,
    /// Remote calls that failed and were skipped.
    pub failed_queries: usize,
    /// Whether the roster was written back.
    pub persisted: bool,
}

impl PassSummary {
    pub fn new(pass_id: PassId) -> Self {
        Self {
            pass_id,
            status_changed: 0,
            rank_changed: 0,
            status_queries: 0,
            rank_queries: 0,
            failed_queries: 0,
            persisted: false,
        }
    }

    pub fn changed(&self) -> bool {
        self.status_changed > 0 || self.rank_changed > 0
    }

    /// One-line message for the user.
    pub fn message(&self) -> String {
        match (self.status_changed > 0, self.rank_changed > 0) {
            (true, true) => format!(
                "Ban status updated for {} account(s); rank updated for {} account(s)",
                self.status_changed, self.rank_changed
            ),
            (true, false) => format!("Ban status updated for {} account(s)", self.status_changed),
            (false, true) => format!("Rank updated for {} account(s)", self.rank_changed),
            (false, false) => "No changes".to_string(),
        }
    }
}

impl fmt::Display for PassSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.message())
    }
}

/// Messages sent from a running pass to the foreground.
#[derive(Debug, Clone)]
pub enum ReconcileEvent {
    PassStarted {
        pass_id: PassId,
        records: usize,
    },
    /// Free-form progress text.
    Progress(String),
    /// A record changed; carries its new state.
    RecordUpdated {
        index: usize,
        record: AccountRecord,
    },
    PassCompleted(PassSummary),
    PassFailed {
        pass_id: PassId,
        message: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn message_distinguishes_status_and_rank() {
        let mut summary = PassSummary::new(PassId::new());
        assert_eq!(summary.message(), "No changes");
        assert!(!summary.changed());

        summary.rank_changed = 2;
        assert_eq!(summary.message(), "Rank updated for 2 account(s)");

        summary.status_changed = 1;
        assert!(summary.message().starts_with("Ban status updated for 1"));
        assert!(summary.changed());
    }
}
