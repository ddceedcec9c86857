//! SetSeasonHandler - Command handler for changing the ranked season.

use std::sync::Arc;

use crate::application::roster::{Roster, RosterError};
use crate::ports::AccountDocumentStore;

/// Command to set the season token used by rank lookups.
#[derive(Debug, Clone, Copy)]
pub struct SetSeasonCommand {
    pub season: u32,
}

/// Handler for setting the season.
pub struct SetSeasonHandler {
    roster: Arc<Roster>,
    store: Arc<dyn AccountDocumentStore>,
}

impl SetSeasonHandler {
    pub fn new(roster: Arc<Roster>, store: Arc<dyn AccountDocumentStore>) -> Self {
        Self { roster, store }
    }

    pub async fn handle(&self, cmd: SetSeasonCommand) -> Result<(), RosterError> {
        self.roster.set_season(cmd.season).await?;
        self.roster.persist(self.store.as_ref()).await?;

        tracing::info!(season = cmd.season, "season updated");
        Ok(())
    }
}
