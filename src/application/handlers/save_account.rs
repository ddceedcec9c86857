//! SaveAccountHandler - Command handler for creating and editing accounts.

use std::sync::Arc;

use crate::application::roster::{Roster, RosterError};
use crate::domain::account::{
    unban_time_for_save, AccountRecord, BanForm, BanMarker, BanSource, Credential, ModeRank,
    RankSlot, UnbanAt,
};
use crate::ports::{AccountDocumentStore, Clock};

/// Command to create (`index == None`) or overwrite an account.
#[derive(Debug, Clone, Default)]
pub struct SaveAccountCommand {
    pub index: Option<usize>,
    pub name: String,
    pub password: Credential,
    pub phone: String,
    pub player_id: Option<String>,
    /// Manually entered ranks; `None` keeps what the record has.
    pub tpp_rank: Option<ModeRank>,
    pub fpp_rank: Option<ModeRank>,
    pub ban: BanForm,
}

/// Result of a successful save.
#[derive(Debug, Clone)]
pub struct SaveAccountResult {
    pub index: usize,
    pub record: AccountRecord,
    pub created: bool,
}

/// Handler for saving the account form.
pub struct SaveAccountHandler {
    roster: Arc<Roster>,
    store: Arc<dyn AccountDocumentStore>,
    clock: Arc<dyn Clock>,
}

impl SaveAccountHandler {
    pub fn new(
        roster: Arc<Roster>,
        store: Arc<dyn AccountDocumentStore>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            roster,
            store,
            clock,
        }
    }

    pub async fn handle(&self, cmd: SaveAccountCommand) -> Result<SaveAccountResult, RosterError> {
        // 1. Resolve the ban before touching the roster
        let ban = unban_time_for_save(&cmd.ban, self.clock.now());

        // 2. Apply to the current record under the roster lock, or append
        let index = cmd.index;
        let (index, record, created) = match index {
            Some(index) => {
                let record = self
                    .roster
                    .modify(index, move |record| {
                        record.rename(cmd.name.as_str())?;
                        apply_fields(record, cmd, ban);
                        Ok(record.clone())
                    })
                    .await?;
                (index, record, false)
            }
            None => {
                let mut record = AccountRecord::new(cmd.name.as_str())?;
                apply_fields(&mut record, cmd, ban);
                let index = self.roster.insert(record.clone()).await?;
                (index, record, true)
            }
        };

        // 3. Persist
        self.roster.persist(self.store.as_ref()).await?;

        tracing::info!(index, account = record.name(), created, "account saved");
        Ok(SaveAccountResult {
            index,
            record,
            created,
        })
    }
}

/// Copies the form onto `record`. `ban` of `None` clears the ban.
///
/// A ban whose unban time is unchanged keeps its marker and source.
fn apply_fields(record: &mut AccountRecord, cmd: SaveAccountCommand, ban: Option<UnbanAt>) {
    record.set_password(cmd.password);
    record.set_phone(cmd.phone);
    record.set_player_id(cmd.player_id);
    if let Some(rank) = cmd.tpp_rank {
        record.set_rank(RankSlot::Tpp, rank);
    }
    if let Some(rank) = cmd.fpp_rank {
        record.set_rank(RankSlot::Fpp, rank);
    }

    match ban {
        None => record.unban(),
        Some(unban_at) => {
            let unchanged = record.is_banned() && *record.unban_at() == unban_at;
            if !unchanged {
                record.ban(unban_at, BanMarker::None, BanSource::Manual);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::adapters::{FixedClock, InMemoryDocumentStore};
    use crate::domain::account::{reconcile, Division, DurationPreset, FormEvent, RankTier};
    use crate::domain::foundation::{LocalTimestamp, ValidationError};

    fn now() -> LocalTimestamp {
        LocalTimestamp::parse("2024-06-01 12:00:00").unwrap()
    }

    fn setup(records: Vec<AccountRecord>) -> (SaveAccountHandler, Arc<Roster>, Arc<InMemoryDocumentStore>) {
        let roster = Arc::new(Roster::new(records.clone()));
        let store = Arc::new(InMemoryDocumentStore::with_records(records));
        let handler = SaveAccountHandler::new(
            roster.clone(),
            store.clone(),
            Arc::new(FixedClock::new(now())),
        );
        (handler, roster, store)
    }

    fn command(name: &str) -> SaveAccountCommand {
        SaveAccountCommand {
            name: name.to_string(),
            ..SaveAccountCommand::default()
        }
    }

    #[tokio::test]
    async fn creates_and_persists() {
        let (handler, roster, store) = setup(vec![]);

        let result = handler.handle(command("  alt  ")).await.unwrap();

        assert!(result.created);
        assert_eq!(result.index, 0);
        assert_eq!(result.record.name(), "alt");
        assert_eq!(roster.len().await, 1);
        assert_eq!(store.save_count(), 1);
    }

    #[tokio::test]
    async fn empty_name_is_rejected_without_saving() {
        let (handler, roster, store) = setup(vec![]);

        let result = handler.handle(command("   ")).await;

        assert!(matches!(
            result,
            Err(RosterError::Validation(ValidationError::EmptyField { .. }))
        ));
        assert!(roster.is_empty().await);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn concrete_preset_is_recomputed_at_save() {
        let (handler, _, _) = setup(vec![]);
        let earlier = now().minus_hours(5);
        let form = reconcile(
            BanForm::default(),
            FormEvent::PresetSelected(DurationPreset::Days7),
            earlier,
        );

        let result = handler
            .handle(SaveAccountCommand {
                ban: form,
                ..command("alt")
            })
            .await
            .unwrap();

        assert!(result.record.is_banned());
        assert_eq!(
            result.record.unban_at(),
            &UnbanAt::At(now().plus_days(7))
        );
        assert_eq!(result.record.ban_source(), BanSource::Manual);
    }

    #[tokio::test]
    async fn custom_time_is_kept_verbatim() {
        let (handler, _, _) = setup(vec![]);
        let form = BanForm {
            banned: true,
            preset: DurationPreset::Custom,
            unban_time: "2024-06-03 08:30:00".into(),
            ..BanForm::default()
        };

        let result = handler
            .handle(SaveAccountCommand {
                ban: form,
                ..command("alt")
            })
            .await
            .unwrap();

        assert_eq!(result.record.unban_at().to_string(), "2024-06-03 08:30:00");
    }

    #[tokio::test]
    async fn editing_keeps_remote_fields_and_chase_marker() {
        let unban = LocalTimestamp::parse("2024-06-03 08:30:00").unwrap();
        let existing = AccountRecord::new("alt")
            .unwrap()
            .with_account_id("account.1")
            .with_ban(UnbanAt::At(unban), BanMarker::Chase, BanSource::Remote);
        let (handler, _, _) = setup(vec![existing.clone()]);
        let form = reconcile(BanForm::default(), FormEvent::Loaded(&existing), now());

        let result = handler
            .handle(SaveAccountCommand {
                index: Some(0),
                phone: "555".into(),
                ban: form,
                ..command("alt")
            })
            .await
            .unwrap();

        assert!(!result.created);
        assert_eq!(result.record.account_id(), Some("account.1"));
        assert_eq!(result.record.marker(), BanMarker::Chase);
        assert_eq!(result.record.phone(), "555");
    }

    #[tokio::test]
    async fn renaming_clears_account_id() {
        let existing = AccountRecord::new("alt").unwrap().with_account_id("account.1");
        let (handler, _, _) = setup(vec![existing]);

        let result = handler
            .handle(SaveAccountCommand {
                index: Some(0),
                ..command("main")
            })
            .await
            .unwrap();

        assert_eq!(result.record.account_id(), None);
    }

    #[tokio::test]
    async fn manual_rank_is_applied() {
        let (handler, _, _) = setup(vec![]);
        let gold = ModeRank::new(RankTier::ranked(Division::Gold, 2).unwrap(), 2300);

        let result = handler
            .handle(SaveAccountCommand {
                tpp_rank: Some(gold),
                ..command("alt")
            })
            .await
            .unwrap();

        assert_eq!(result.record.rank(RankSlot::Tpp), gold);
        assert_eq!(result.record.rank(RankSlot::Fpp), ModeRank::unranked());
    }

    #[tokio::test]
    async fn unknown_index_is_not_found() {
        let (handler, _, _) = setup(vec![]);
        let result = handler
            .handle(SaveAccountCommand {
                index: Some(3),
                ..command("alt")
            })
            .await;
        assert!(matches!(result, Err(RosterError::NotFound { index: 3 })));
    }

    #[tokio::test]
    async fn creating_a_taken_name_is_rejected_without_saving() {
        let (handler, roster, store) = setup(vec![AccountRecord::new("alt").unwrap()]);

        let result = handler.handle(command(" alt ")).await;

        assert!(matches!(
            result,
            Err(RosterError::Validation(ValidationError::Duplicate { .. }))
        ));
        assert_eq!(roster.len().await, 1);
        assert_eq!(store.save_count(), 0);
    }

    #[tokio::test]
    async fn renaming_onto_a_taken_name_is_rejected() {
        let (handler, roster, _) = setup(vec![
            AccountRecord::new("alt").unwrap(),
            AccountRecord::new("main").unwrap().with_player_id("p2"),
        ]);

        let result = handler
            .handle(SaveAccountCommand {
                index: Some(1),
                phone: "555".into(),
                ..command("alt")
            })
            .await;

        assert!(matches!(
            result,
            Err(RosterError::Validation(ValidationError::Duplicate { .. }))
        ));
        let untouched = roster.get(1).await.unwrap();
        assert_eq!(untouched.name(), "main");
        assert_eq!(untouched.phone(), "");
    }

    #[tokio::test]
    async fn update_builds_on_the_current_record() {
        let (handler, roster, _) = setup(vec![AccountRecord::new("alt").unwrap()]);
        // A pass step lands after the form was opened.
        roster
            .modify(0, |r| {
                r.set_level(640);
                r.set_account_id("account.1");
                Ok(())
            })
            .await
            .unwrap();

        let result = handler
            .handle(SaveAccountCommand {
                index: Some(0),
                phone: "555".into(),
                ..command("alt")
            })
            .await
            .unwrap();

        assert_eq!(result.record.level(), 640);
        assert_eq!(result.record.account_id(), Some("account.1"));
        assert_eq!(roster.get(0).await.unwrap().phone(), "555");
    }

    #[tokio::test]
    async fn persistence_failure_surfaces() {
        let (handler, roster, store) = setup(vec![]);
        store.set_fail_saves(true);

        let result = handler.handle(command("alt")).await;

        assert!(matches!(result, Err(RosterError::Store(_))));
        // The edit stays in memory.
        assert_eq!(roster.len().await, 1);
    }
}
