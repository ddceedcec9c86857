//! Roster - the shared, mutex-guarded list of tracked accounts.
//!
//! The foreground and a running pass both work on the roster. Every method
//! takes the lock for one discrete operation only, so foreground edits can
//! land between the per-record steps of a pass.
//!
//! Names are unique: [`Roster::insert`] and [`Roster::modify`] refuse a name
//! another record already has. A pass finds its record again by name and
//! player id, so a document loaded with repeated names is still updated
//! record by record.
//!
//! The season token lives on record 0; [`Roster::remove`] moves it to the new
//! first record when record 0 is deleted.

use thiserror::Error;
use tokio::sync::Mutex;

use crate::domain::account::{AccountRecord, RosterStats, DEFAULT_SEASON};
use crate::domain::foundation::ValidationError;
use crate::ports::{AccountDocumentStore, StoreError};

/// Errors from roster operations.
#[derive(Debug, Error)]
pub enum RosterError {
    #[error("No account at index {index}")]
    NotFound { index: usize },

    #[error(transparent)]
    Validation(#[from] ValidationError),

    #[error(transparent)]
    Store(#[from] StoreError),
}

/// Shared record list.
#[derive(Debug, Default)]
pub struct Roster {
    records: Mutex<Vec<AccountRecord>>,
}

impl Roster {
    pub fn new(records: Vec<AccountRecord>) -> Self {
        Self {
            records: Mutex::new(records),
        }
    }

    /// Loads the roster document. A missing or unreadable document is empty.
    pub async fn load(store: &dyn AccountDocumentStore) -> Result<Self, RosterError> {
        let records = store.load().await?;
        tracing::info!(count = records.len(), "roster loaded");
        Ok(Self::new(records))
    }

    pub async fn len(&self) -> usize {
        self.records.lock().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.records.lock().await.is_empty()
    }

    pub async fn get(&self, index: usize) -> Option<AccountRecord> {
        self.records.lock().await.get(index).cloned()
    }

    /// Copy of every record in roster order.
    pub async fn snapshot_all(&self) -> Vec<AccountRecord> {
        self.records.lock().await.clone()
    }

    pub async fn stats(&self) -> RosterStats {
        RosterStats::from_records(&self.records.lock().await)
    }

    /// Edits the record at `index` under one lock acquisition.
    ///
    /// `f` works on a copy; the copy is written back only if `f` succeeds and
    /// the resulting name is not used by another record.
    pub async fn modify<T>(
        &self,
        index: usize,
        f: impl FnOnce(&mut AccountRecord) -> Result<T, RosterError>,
    ) -> Result<T, RosterError> {
        let mut records = self.records.lock().await;
        let mut edited = records
            .get(index)
            .cloned()
            .ok_or(RosterError::NotFound { index })?;

        let output = f(&mut edited)?;
        ensure_unique_name(&records, edited.name(), Some(index))?;
        records[index] = edited;
        Ok(output)
    }

    /// Appends a record and returns its index.
    pub async fn insert(&self, record: AccountRecord) -> Result<usize, RosterError> {
        let mut records = self.records.lock().await;
        ensure_unique_name(&records, record.name(), None)?;
        records.push(record);
        Ok(records.len() - 1)
    }

    /// Removes the record at `index`, carrying the season token over to the
    /// new record 0 when the first record goes.
    pub async fn remove(&self, index: usize) -> Result<AccountRecord, RosterError> {
        let mut records = self.records.lock().await;
        if index >= records.len() {
            return Err(RosterError::NotFound { index });
        }
        let removed = records.remove(index);
        if index == 0 {
            if let (Some(season), Some(first)) = (removed.season(), records.first_mut()) {
                first.set_season(Some(season));
            }
        }
        Ok(removed)
    }

    /// Runs `f` on the current copy of `snapshot`: the first record with the
    /// same name and player id. Returns its index and the closure's result,
    /// or `None` if the record was deleted or renamed in the meantime.
    pub async fn modify_matching<T>(
        &self,
        snapshot: &AccountRecord,
        f: impl FnOnce(&mut AccountRecord) -> T,
    ) -> Option<(usize, T)> {
        let mut records = self.records.lock().await;
        let index = records
            .iter()
            .position(|r| r.name() == snapshot.name() && r.player_id() == snapshot.player_id())?;
        Some((index, f(&mut records[index])))
    }

    /// Season token from record 0, or the default.
    pub async fn season(&self) -> u32 {
        self.records
            .lock()
            .await
            .first()
            .and_then(AccountRecord::season)
            .unwrap_or(DEFAULT_SEASON)
    }

    pub async fn set_season(&self, season: u32) -> Result<(), RosterError> {
        if season == 0 {
            return Err(ValidationError::out_of_range("season", 1, i64::from(u32::MAX), 0).into());
        }
        let mut records = self.records.lock().await;
        let first = records
            .first_mut()
            .ok_or_else(|| ValidationError::invalid_format("season", "roster is empty"))?;
        first.set_season(Some(season));
        Ok(())
    }

    /// Writes the whole roster. The lock is held while writing so saves land
    /// in the order the roster changed.
    pub async fn persist(&self, store: &dyn AccountDocumentStore) -> Result<(), StoreError> {
        let records = self.records.lock().await;
        store.save(&records).await
    }
}

fn ensure_unique_name(
    records: &[AccountRecord],
    name: &str,
    except: Option<usize>,
) -> Result<(), ValidationError> {
    let taken = records
        .iter()
        .enumerate()
        .any(|(i, r)| Some(i) != except && r.name() == name);
    if taken {
        return Err(ValidationError::duplicate("name", name));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::InMemoryDocumentStore;

    fn named(name: &str) -> AccountRecord {
        AccountRecord::new(name).unwrap()
    }

    fn roster(names: &[&str]) -> Roster {
        Roster::new(names.iter().map(|n| named(n)).collect())
    }

    #[tokio::test]
    async fn modify_edits_in_place() {
        let roster = roster(&["a", "b"]);
        let level_set = roster
            .modify(1, |r| {
                r.rename("c")?;
                Ok(r.set_level(12))
            })
            .await
            .unwrap();

        assert!(level_set);
        let edited = roster.get(1).await.unwrap();
        assert_eq!(edited.name(), "c");
        assert_eq!(edited.level(), 12);
        assert!(matches!(
            roster.modify(5, |_| Ok(())).await,
            Err(RosterError::NotFound { index: 5 })
        ));
    }

    #[tokio::test]
    async fn modify_rejects_a_taken_name_and_keeps_the_record() {
        let roster = roster(&["a", "b"]);

        let result = roster
            .modify(1, |r| {
                r.set_level(7);
                r.rename("a")?;
                Ok(())
            })
            .await;

        assert!(matches!(
            result,
            Err(RosterError::Validation(ValidationError::Duplicate { .. }))
        ));
        let untouched = roster.get(1).await.unwrap();
        assert_eq!(untouched.name(), "b");
        assert_eq!(untouched.level(), 0);
    }

    #[tokio::test]
    async fn modify_may_keep_its_own_name() {
        let roster = roster(&["a", "b"]);
        roster.modify(0, |r| Ok(r.set_level(3))).await.unwrap();
        assert_eq!(roster.get(0).await.unwrap().level(), 3);
    }

    #[tokio::test]
    async fn insert_rejects_a_taken_name() {
        let roster = roster(&["a"]);
        assert_eq!(roster.insert(named("b")).await.unwrap(), 1);
        assert!(matches!(
            roster.insert(named("a")).await,
            Err(RosterError::Validation(ValidationError::Duplicate { .. }))
        ));
        assert_eq!(roster.len().await, 2);
    }

    #[tokio::test]
    async fn season_defaults_and_lives_on_first_record() {
        let roster = roster(&["a", "b"]);
        assert_eq!(roster.season().await, DEFAULT_SEASON);

        roster.set_season(36).await.unwrap();
        assert_eq!(roster.season().await, 36);
        assert_eq!(roster.get(0).await.unwrap().season(), Some(36));
        assert_eq!(roster.get(1).await.unwrap().season(), None);
    }

    #[tokio::test]
    async fn season_on_empty_roster_is_rejected() {
        let empty = Roster::default();
        assert!(matches!(
            empty.set_season(36).await,
            Err(RosterError::Validation(_))
        ));
        assert!(matches!(
            roster(&["a"]).set_season(0).await,
            Err(RosterError::Validation(_))
        ));
    }

    #[tokio::test]
    async fn removing_first_record_moves_season() {
        let roster = roster(&["a", "b", "c"]);
        roster.set_season(40).await.unwrap();

        roster.remove(0).await.unwrap();
        assert_eq!(roster.get(0).await.unwrap().name(), "b");
        assert_eq!(roster.season().await, 40);

        roster.remove(1).await.unwrap();
        assert_eq!(roster.season().await, 40);
    }

    #[tokio::test]
    async fn modify_matching_finds_current_position() {
        let roster = roster(&["a", "b"]);
        let b = roster.get(1).await.unwrap();
        let a = roster.remove(0).await.unwrap();

        let result = roster.modify_matching(&b, |r| r.set_level(10)).await;
        assert_eq!(result, Some((0, true)));
        assert_eq!(roster.modify_matching(&a, |r| r.set_level(1)).await, None);
    }

    #[tokio::test]
    async fn modify_matching_tells_repeated_names_apart_by_player_id() {
        let roster = Roster::new(vec![
            named("a").with_player_id("p1"),
            named("a").with_player_id("p2"),
        ]);
        let second = roster.get(1).await.unwrap();

        let result = roster.modify_matching(&second, |r| r.set_level(200)).await;

        assert_eq!(result, Some((1, true)));
        assert_eq!(roster.get(0).await.unwrap().level(), 0);
        assert_eq!(roster.get(1).await.unwrap().level(), 200);
    }

    #[tokio::test]
    async fn load_and_persist_round_trip_through_store() {
        let store = InMemoryDocumentStore::with_records(vec![named("a")]);
        let roster = Roster::load(&store).await.unwrap();
        roster.insert(named("b")).await.unwrap();

        roster.persist(&store).await.unwrap();
        assert_eq!(store.stored().await.len(), 2);
        assert_eq!(roster.stats().await.total, 2);
    }
}
