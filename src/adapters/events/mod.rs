//! Update notifier adapters.
//!
//! - `ChannelNotifier` - Unbounded tokio channel drained by the foreground
//! - `RecordingNotifier` - Captures events for test assertions

mod channel_notifier;
mod recording_notifier;

pub use channel_notifier::ChannelNotifier;
pub use recording_notifier::RecordingNotifier;
