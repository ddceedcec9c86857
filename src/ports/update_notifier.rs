//! UpdateNotifier port - Delivers pass progress to the foreground.
//!
//! Notifications are fire-and-forget. A pass never waits for the foreground
//! to consume them, and a foreground that has gone away is not an error.

use crate::domain::reconciliation::ReconcileEvent;

/// Port for sending reconciliation events to whoever displays them.
pub trait UpdateNotifier: Send + Sync {
    /// Queue one event for the foreground. Must not block.
    fn notify(&self, event: ReconcileEvent);
}

#[cfg(test)]
mod tests {
    use super::*;

    // Compile-time check that trait is object-safe
    #[allow(dead_code)]
    fn assert_object_safe(_: &dyn UpdateNotifier) {}
}
