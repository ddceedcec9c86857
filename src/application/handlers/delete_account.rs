//! DeleteAccountHandler - Command handler for removing accounts.

use std::sync::Arc;

use crate::application::roster::{Roster, RosterError};
use crate::domain::account::AccountRecord;
use crate::ports::AccountDocumentStore;

/// Command to delete the account at `index`.
#[derive(Debug, Clone, Copy)]
pub struct DeleteAccountCommand {
    pub index: usize,
}

/// Handler for deleting accounts.
pub struct DeleteAccountHandler {
    roster: Arc<Roster>,
    store: Arc<dyn AccountDocumentStore>,
}

impl DeleteAccountHandler {
    pub fn new(roster: Arc<Roster>, store: Arc<dyn AccountDocumentStore>) -> Self {
        Self { roster, store }
    }

    /// Removes the record and persists. Returns the removed record.
    pub async fn handle(&self, cmd: DeleteAccountCommand) -> Result<AccountRecord, RosterError> {
        let removed = self.roster.remove(cmd.index).await?;
        self.roster.persist(self.store.as_ref()).await?;

        tracing::info!(index = cmd.index, account = removed.name(), "account deleted");
        Ok(removed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryDocumentStore;

    #[tokio::test]
    async fn deletes_and_persists_with_season_carried_over() {
        let mut first = AccountRecord::new("a").unwrap();
        first.set_season(Some(37));
        let records = vec![first, AccountRecord::new("b").unwrap()];
        let roster = Arc::new(Roster::new(records.clone()));
        let store = Arc::new(InMemoryDocumentStore::with_records(records));
        let handler = DeleteAccountHandler::new(roster.clone(), store.clone());

        let removed = handler.handle(DeleteAccountCommand { index: 0 }).await.unwrap();

        assert_eq!(removed.name(), "a");
        let stored = store.stored().await;
        assert_eq!(stored.len(), 1);
        assert_eq!(stored[0].season(), Some(37));
    }

    #[tokio::test]
    async fn missing_index_is_not_found() {
        let roster = Arc::new(Roster::default());
        let store = Arc::new(InMemoryDocumentStore::new());
        let handler = DeleteAccountHandler::new(roster, store.clone());

        assert!(matches!(
            handler.handle(DeleteAccountCommand { index: 0 }).await,
            Err(RosterError::NotFound { index: 0 })
        ));
        assert_eq!(store.save_count(), 0);
    }
}
