//! Application layer - roster, command handlers, reconciliation and scheduling.
//!
//! This layer orchestrates domain rules and coordinates between ports.
//! Foreground commands go through the handlers; background passes go through
//! the [`Scheduler`], which owns the one [`ReconciliationEngine`] task.

pub mod engine;
pub mod handlers;
pub mod roster;
pub mod scheduler;

pub use engine::{EngineConfig, ReconcileError, ReconciliationEngine};
pub use handlers::{
    DeleteAccountCommand, DeleteAccountHandler, SaveAccountCommand, SaveAccountHandler,
    SaveAccountResult, SetSeasonCommand, SetSeasonHandler,
};
pub use roster::{Roster, RosterError};
pub use scheduler::{Scheduler, SchedulerConfig, TriggerOutcome};
