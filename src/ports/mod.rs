//! Ports - Interfaces for external dependencies.
//!
//! Following hexagonal architecture, ports define the contracts between
//! the domain and the outside world. Adapters implement these ports.
//!
//! ## Remote Service Ports
//!
//! - `RemoteStatusService` - Ban status, level and account id by player id
//! - `RemoteRankService` - Ranked standings by account id and season
//!
//! ## Local Ports
//!
//! - `AccountDocumentStore` - Load/save of the whole roster document
//! - `UpdateNotifier` - Progress and per-record updates for the foreground
//! - `Clock` - Current local time

mod account_store;
mod clock;
mod remote_rank;
mod remote_status;
mod update_notifier;

pub use account_store::{AccountDocumentStore, StoreError};
pub use clock::Clock;
pub use remote_rank::RemoteRankService;
pub use remote_status::{RemoteError, RemoteStatusService};
pub use update_notifier::UpdateNotifier;
