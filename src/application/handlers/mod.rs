//! Command handlers for the foreground.
//!
//! Each handler changes the roster and persists it straight away.

mod delete_account;
mod save_account;
mod set_season;

pub use delete_account::{DeleteAccountCommand, DeleteAccountHandler};
pub use save_account::{SaveAccountCommand, SaveAccountHandler, SaveAccountResult};
pub use set_season::{SetSeasonCommand, SetSeasonHandler};
