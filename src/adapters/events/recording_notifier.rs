//! Recording notifier for tests.
//!
//! Keeps every event in memory so tests can assert on what a pass reported.
//!
//! # Panics
//!
//! Helpers panic if the internal lock is poisoned. Test use only.

use std::sync::Mutex;

use crate::domain::account::AccountRecord;
use crate::domain::reconciliation::{PassSummary, ReconcileEvent};
use crate::ports::UpdateNotifier;

/// Captures every event it is given.
#[derive(Debug, Default)]
pub struct RecordingNotifier {
    events: Mutex<Vec<ReconcileEvent>>,
}

impl RecordingNotifier {
    pub fn new() -> Self {
        Self::default()
    }

    // === Test Helpers ===

    pub fn events(&self) -> Vec<ReconcileEvent> {
        self.events
            .lock()
            .expect("RecordingNotifier: lock poisoned")
            .clone()
    }

    /// `(index, record)` for every `RecordUpdated` event.
    pub fn updates(&self) -> Vec<(usize, AccountRecord)> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReconcileEvent::RecordUpdated { index, record } => Some((index, record)),
                _ => None,
            })
            .collect()
    }

    pub fn summaries(&self) -> Vec<PassSummary> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReconcileEvent::PassCompleted(summary) => Some(summary),
                _ => None,
            })
            .collect()
    }

    /// Messages of every `PassFailed` event.
    pub fn failures(&self) -> Vec<String> {
        self.events()
            .into_iter()
            .filter_map(|e| match e {
                ReconcileEvent::PassFailed { message, .. } => Some(message),
                _ => None,
            })
            .collect()
    }

    pub fn clear(&self) {
        self.events
            .lock()
            .expect("RecordingNotifier: lock poisoned")
            .clear();
    }
}

impl UpdateNotifier for RecordingNotifier {
    fn notify(&self, event: ReconcileEvent) {
        self.events
            .lock()
            .expect("RecordingNotifier: lock poisoned")
            .push(event);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::foundation::PassId;

    #[test]
    fn helpers_filter_by_kind() {
        let notifier = RecordingNotifier::new();
        let pass_id = PassId::new();
        notifier.notify(ReconcileEvent::PassStarted { pass_id, records: 1 });
        notifier.notify(ReconcileEvent::RecordUpdated {
            index: 0,
            record: AccountRecord::new("a").unwrap(),
        });
        notifier.notify(ReconcileEvent::PassCompleted(PassSummary::new(pass_id)));

        assert_eq!(notifier.events().len(), 3);
        assert_eq!(notifier.updates()[0].0, 0);
        assert_eq!(notifier.summaries().len(), 1);
        assert!(notifier.failures().is_empty());

        notifier.clear();
        assert!(notifier.events().is_empty());
    }
}
