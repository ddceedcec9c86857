//! ReconciliationEngine - one full pass over the roster.
//!
//! A pass has two sub-passes run back to back:
//!
//! 1. **Status** - for every record in roster order, the remote ban status is
//!    looked up (records without a player id are only checked against their
//!    local timer) and merged into the record.
//! 2. **Rank** - for every record with an account id, ranked standings for
//!    the current season are looked up and merged.
//!
//! Remote calls are issued one at a time with a fixed delay between records.
//! A failed call only affects its own record. Each merge runs against the
//! record's state at that moment under the roster lock, so foreground edits
//! made while a call is in flight are kept. The roster is written once at the
//! end if anything changed.

use std::sync::Arc;
use std::time::Duration;

use thiserror::Error;
use tokio::time::sleep;
use tracing::Instrument;

use super::roster::Roster;
use crate::domain::account::{AccountRecord, RankTier};
use crate::domain::foundation::PassId;
use crate::domain::reconciliation::{
    merge_rank, merge_status, PassSummary, PatchEffect, RankSnapshot, ReconcileEvent,
    StatusLookup,
};
use crate::ports::{
    AccountDocumentStore, Clock, RemoteRankService, RemoteStatusService, StoreError,
    UpdateNotifier,
};

/// Errors that end a pass.
#[derive(Debug, Error)]
pub enum ReconcileError {
    /// Changes were made in memory but could not be written.
    #[error("Failed to persist roster after pass {pass_id}: {source}")]
    Persist {
        pass_id: PassId,
        #[source]
        source: StoreError,
    },
}

impl ReconcileError {
    pub fn pass_id(&self) -> PassId {
        match self {
            ReconcileError::Persist { pass_id, .. } => *pass_id,
        }
    }
}

/// Throttle settings for a pass.
#[derive(Debug, Clone)]
pub struct EngineConfig {
    /// Wait between records in the status sub-pass.
    pub status_delay: Duration,
    /// Wait between records in the rank sub-pass.
    pub rank_delay: Duration,
}

impl Default for EngineConfig {
    fn default() -> Self {
        Self {
            status_delay: Duration::from_millis(2000),
            rank_delay: Duration::from_millis(1000),
        }
    }
}

impl EngineConfig {
    /// No throttling. For tests.
    pub fn immediate() -> Self {
        Self {
            status_delay: Duration::ZERO,
            rank_delay: Duration::ZERO,
        }
    }

    pub fn with_status_delay(mut self, delay: Duration) -> Self {
        self.status_delay = delay;
        self
    }

    pub fn with_rank_delay(mut self, delay: Duration) -> Self {
        self.rank_delay = delay;
        self
    }
}

/// Runs reconciliation passes over a shared roster.
pub struct ReconciliationEngine {
    roster: Arc<Roster>,
    store: Arc<dyn AccountDocumentStore>,
    status_service: Arc<dyn RemoteStatusService>,
    rank_service: Option<Arc<dyn RemoteRankService>>,
    notifier: Arc<dyn UpdateNotifier>,
    clock: Arc<dyn Clock>,
    config: EngineConfig,
}

impl ReconciliationEngine {
    pub fn new(
        roster: Arc<Roster>,
        store: Arc<dyn AccountDocumentStore>,
        status_service: Arc<dyn RemoteStatusService>,
        notifier: Arc<dyn UpdateNotifier>,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            roster,
            store,
            status_service,
            rank_service: None,
            notifier,
            clock,
            config: EngineConfig::default(),
        }
    }

    /// Enables the rank sub-pass.
    pub fn with_rank_service(mut self, rank_service: Arc<dyn RemoteRankService>) -> Self {
        self.rank_service = Some(rank_service);
        self
    }

    pub fn with_config(mut self, config: EngineConfig) -> Self {
        self.config = config;
        self
    }

    /// Runs one complete pass.
    ///
    /// # Errors
    ///
    /// Only a failure to persist a changed roster is an error. Remote failures
    /// are logged and counted in the summary.
    pub async fn run_pass(&self) -> Result<PassSummary, ReconcileError> {
        let pass_id = PassId::new();
        let span = tracing::info_span!("reconcile_pass", %pass_id);
        self.run(pass_id).instrument(span).await
    }

    async fn run(&self, pass_id: PassId) -> Result<PassSummary, ReconcileError> {
        let records = self.roster.snapshot_all().await;
        tracing::info!(records = records.len(), "pass started");
        self.notifier.notify(ReconcileEvent::PassStarted {
            pass_id,
            records: records.len(),
        });

        let mut summary = PassSummary::new(pass_id);
        self.status_pass(&records, &mut summary).await;
        self.rank_pass(&mut summary).await;

        if summary.changed() {
            if let Err(source) = self.roster.persist(self.store.as_ref()).await {
                tracing::error!(error = %source, "failed to persist roster");
                return Err(ReconcileError::Persist { pass_id, source });
            }
            summary.persisted = true;
        }

        tracing::info!(
            status_changed = summary.status_changed,
            rank_changed = summary.rank_changed,
            failed_queries = summary.failed_queries,
            persisted = summary.persisted,
            "pass finished"
        );
        Ok(summary)
    }

    async fn status_pass(&self, records: &[AccountRecord], summary: &mut PassSummary) {
        let total = records.len();
        let mut queried_before = false;

        for (position, record) in records.iter().enumerate() {
            let name = record.name();
            let result = match record.player_id() {
                None => None,
                Some(player_id) => {
                    if queried_before {
                        sleep(self.config.status_delay).await;
                    }
                    queried_before = true;
                    self.progress(format!(
                        "Checking ban status {}/{}: {}",
                        position + 1,
                        total,
                        name
                    ));
                    summary.status_queries += 1;
                    Some(self.status_service.query(player_id).await)
                }
            };

            let lookup = match &result {
                None => StatusLookup::Skipped,
                Some(Ok(snapshot)) => StatusLookup::Succeeded(snapshot),
                Some(Err(e)) => {
                    tracing::warn!(account = name, error = %e, "status lookup failed, skipping");
                    summary.failed_queries += 1;
                    StatusLookup::Failed
                }
            };

            let now = self.clock.now();
            let effect = self
                .apply(record, |current| merge_status(current, lookup, now).apply(current))
                .await;
            if effect.is_some_and(|e| e.ban_changed || e.sync_changed) {
                summary.status_changed += 1;
            }
        }
    }

    async fn rank_pass(&self, summary: &mut PassSummary) {
        let Some(rank_service) = &self.rank_service else {
            tracing::debug!("no rank service configured, skipping rank sync");
            return;
        };

        let season = self.roster.season().await;
        let records = self.roster.snapshot_all().await;
        let total = records.len();
        let mut queried_before = false;

        for (position, record) in records.iter().enumerate() {
            let Some(account_id) = record.account_id() else {
                continue;
            };
            let name = record.name();

            if queried_before {
                sleep(self.config.rank_delay).await;
            }
            queried_before = true;
            self.progress(format!("Checking rank {}/{}: {}", position + 1, total, name));
            summary.rank_queries += 1;

            let snapshot = match rank_service.query(account_id, season).await {
                Ok(snapshot) => snapshot,
                Err(e) => {
                    tracing::warn!(account = name, error = %e, "rank lookup failed, skipping");
                    summary.failed_queries += 1;
                    continue;
                }
            };
            warn_unknown_tiers(name, &snapshot);

            let effect = self
                .apply(record, |current| merge_rank(current, &snapshot).apply(current))
                .await;
            if effect.is_some_and(|e| e.rank_changed) {
                summary.rank_changed += 1;
            }
        }
    }

    /// Merges into the current copy of `snapshot` and reports a change to
    /// the foreground. `None` if the record is gone.
    async fn apply(
        &self,
        snapshot: &AccountRecord,
        merge: impl FnOnce(&mut AccountRecord) -> PatchEffect,
    ) -> Option<PatchEffect> {
        let name = snapshot.name();
        let outcome = self
            .roster
            .modify_matching(snapshot, |current| {
                let effect = merge(current);
                (effect, effect.any().then(|| current.clone()))
            })
            .await;

        let Some((index, (effect, updated))) = outcome else {
            tracing::debug!(account = name, "record removed or re-keyed during pass, skipping");
            return None;
        };
        if let Some(record) = updated {
            tracing::debug!(
                account = name,
                index,
                banned = record.is_banned(),
                unban_at = %record.unban_at(),
                "record updated"
            );
            self.notifier
                .notify(ReconcileEvent::RecordUpdated { index, record });
        }
        Some(effect)
    }

    fn progress(&self, message: String) {
        tracing::debug!("{}", message);
        self.notifier.notify(ReconcileEvent::Progress(message));
    }
}

fn warn_unknown_tiers(name: &str, snapshot: &RankSnapshot) {
    for result in [&snapshot.tpp, &snapshot.fpp].into_iter().flatten() {
        if RankTier::from_remote(&result.tier_name, &result.sub_tier).is_none() {
            tracing::warn!(
                account = name,
                tier = %result.tier_name,
                sub_tier = %result.sub_tier,
                "unknown rank tier, recording as unranked"
            );
        }
    }
}
