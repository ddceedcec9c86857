//! Adapters - Implementations of the ports.
//!
//! - `remote` - Ban-status and rank services (HTTP and scripted mocks)
//! - `storage` - Roster document stores (JSON file and in-memory)
//! - `events` - Update notifiers (channel and recording)
//! - `clock` - System and fixed clocks

pub mod clock;
pub mod events;
pub mod remote;
pub mod storage;

pub use clock::{FixedClock, SystemClock};
pub use events::{ChannelNotifier, RecordingNotifier};
pub use remote::{
    HttpRankService, HttpStatusService, MockRankService, MockStatusService, RankServiceConfig,
    StatusServiceConfig,
};
pub use storage::{InMemoryDocumentStore, JsonFileStore};
