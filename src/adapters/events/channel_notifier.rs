//! Channel-backed notifier.
//!
//! Events are pushed onto an unbounded tokio channel and the foreground drains
//! the receiver at its own pace. Sending never blocks the pass.

use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::domain::reconciliation::ReconcileEvent;
use crate::ports::UpdateNotifier;

/// Forwards reconciliation events to a foreground consumer.
#[derive(Debug, Clone)]
pub struct ChannelNotifier {
    sender: UnboundedSender<ReconcileEvent>,
}

impl ChannelNotifier {
    /// Creates the notifier together with the receiving end.
    pub fn new() -> (Self, UnboundedReceiver<ReconcileEvent>) {
        let (sender, receiver) = mpsc::unbounded_channel();
        (Self { sender }, receiver)
    }
}

impl UpdateNotifier for ChannelNotifier {
    fn notify(&self, event: ReconcileEvent) {
        if self.sender.send(event).is_err() {
            tracing::debug!("update receiver dropped, event discarded");
        }
    }
}
