//! Clock adapters.

use std::sync::Mutex;

use crate::domain::foundation::LocalTimestamp;
use crate::ports::Clock;

/// Local wall-clock time.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemClock;

impl Clock for SystemClock {
    fn now(&self) -> LocalTimestamp {
        LocalTimestamp::now()
    }
}

/// A clock that only moves when told to.
#[derive(Debug)]
pub struct FixedClock {
    now: Mutex<LocalTimestamp>,
}

impl FixedClock {
    pub fn new(now: LocalTimestamp) -> Self {
        Self { now: Mutex::new(now) }
    }

    /// # Panics
    /// Panics if the internal lock is poisoned.
    pub fn set(&self, now: LocalTimestamp) {
        *self.now.lock().expect("FixedClock: lock poisoned") = now;
    }

    pub fn advance_hours(&self, hours: i64) {
        let mut now = self.now.lock().expect("FixedClock: lock poisoned");
        *now = now.plus_hours(hours);
    }
}

impl Clock for FixedClock {
    fn now(&self) -> LocalTimestamp {
        *self.now.lock().expect("FixedClock: lock poisoned")
    }
}
