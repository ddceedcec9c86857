//! Clock port - Source of the current local wall-clock time.

use crate::domain::foundation::LocalTimestamp;

/// Port for reading "now", so passes can run against a fixed time in tests.
pub trait Clock: Send + Sync {
    fn now(&self) -> LocalTimestamp;
}
