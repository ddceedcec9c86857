//! Mock remote services for testing.
//!
//! Both mocks answer from a per-id table that can be changed between passes,
//! record every call, and can simulate latency. A gate (a semaphore the test
//! hands out permits on) holds each call until the test releases it, which is
//! how tests keep a pass "in progress".
//!
//! # Example
//!
//! ```ignore
//! let status = MockStatusService::new()
//!     .with_status("p1", StatusSnapshot::new(true, 0, "account.1"))
//!     .with_failure("p2", RemoteError::network("unreachable"));
//!
//! engine.run_pass().await?;
//! assert_eq!(status.calls(), vec!["p1", "p2"]);
//! ```

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::{Arc, Mutex};
use std::time::Duration;
use tokio::sync::Semaphore;
use tokio::time::sleep;

use crate::domain::reconciliation::{RankSnapshot, StatusSnapshot};
use crate::ports::{RemoteError, RemoteRankService, RemoteStatusService};

#[derive(Debug, Clone, Default)]
struct Behavior {
    delay: Duration,
    gate: Option<Arc<Semaphore>>,
}

impl Behavior {
    async fn before_answer(&self) {
        if let Some(gate) = &self.gate {
            if let Ok(permit) = gate.acquire().await {
                permit.forget();
            }
        }
        if !self.delay.is_zero() {
            sleep(self.delay).await;
        }
    }
}

fn unknown(id: &str) -> RemoteError {
    RemoteError::status(404, format!("unknown id {}", id))
}

/// Scripted ban-status service.
#[derive(Debug, Clone, Default)]
pub struct MockStatusService {
    answers: Arc<Mutex<HashMap<String, Result<StatusSnapshot, RemoteError>>>>,
    calls: Arc<Mutex<Vec<String>>>,
    behavior: Behavior,
}

impl MockStatusService {
    pub fn new() -> Self {
        Self::default()
    }

    /// Answers `player_id` with `snapshot`.
    pub fn with_status(self, player_id: impl Into<String>, snapshot: StatusSnapshot) -> Self {
        self.set_status(player_id, snapshot);
        self
    }

    /// Answers `player_id` with `error`.
    pub fn with_failure(self, player_id: impl Into<String>, error: RemoteError) -> Self {
        self.set_failure(player_id, error);
        self
    }

    /// Sets simulated latency per request.
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behavior.delay = delay;
        self
    }

    /// Holds each call until a permit is added to `gate`.
    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.behavior.gate = Some(gate);
        self
    }

    /// Replaces the answer for `player_id`, e.g. between passes.
    pub fn set_status(&self, player_id: impl Into<String>, snapshot: StatusSnapshot) {
        self.answers
            .lock()
            .unwrap()
            .insert(player_id.into(), Ok(snapshot));
    }

    pub fn set_failure(&self, player_id: impl Into<String>, error: RemoteError) {
        self.answers
            .lock()
            .unwrap()
            .insert(player_id.into(), Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// Player ids queried, in order.
    pub fn calls(&self) -> Vec<String> {
        self.calls.lock().unwrap().clone()
    }

    pub fn clear_calls(&self) {
        self.calls.lock().unwrap().clear();
    }
}

#[async_trait]
impl RemoteStatusService for MockStatusService {
    async fn query(&self, player_id: &str) -> Result<StatusSnapshot, RemoteError> {
        self.calls.lock().unwrap().push(player_id.to_string());
        self.behavior.before_answer().await;

        self.answers
            .lock()
            .unwrap()
            .get(player_id)
            .cloned()
            .unwrap_or_else(|| Err(unknown(player_id)))
    }
}

/// Scripted rank service.
#[derive(Debug, Clone, Default)]
pub struct MockRankService {
    answers: Arc<Mutex<HashMap<String, Result<RankSnapshot, RemoteError>>>>,
    calls: Arc<Mutex<Vec<(String, u32)>>>,
    behavior: Behavior,
}

impl MockRankService {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_rank(self, account_id: impl Into<String>, snapshot: RankSnapshot) -> Self {
        self.set_rank(account_id, snapshot);
        self
    }

    pub fn with_failure(self, account_id: impl Into<String>, error: RemoteError) -> Self {
        self.set_failure(account_id, error);
        self
    }

    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.behavior.delay = delay;
        self
    }

    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.behavior.gate = Some(gate);
        self
    }

    pub fn set_rank(&self, account_id: impl Into<String>, snapshot: RankSnapshot) {
        self.answers
            .lock()
            .unwrap()
            .insert(account_id.into(), Ok(snapshot));
    }

    pub fn set_failure(&self, account_id: impl Into<String>, error: RemoteError) {
        self.answers
            .lock()
            .unwrap()
            .insert(account_id.into(), Err(error));
    }

    pub fn call_count(&self) -> usize {
        self.calls.lock().unwrap().len()
    }

    /// `(account_id, season)` pairs queried, in order.
    pub fn calls(&self) -> Vec<(String, u32)> {
        self.calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl RemoteRankService for MockRankService {
    async fn query(&self, account_id: &str, season: u32) -> Result<RankSnapshot, RemoteError> {
        self.calls
            .lock()
            .unwrap()
            .push((account_id.to_string(), season));
        self.behavior.before_answer().await;

        self.answers
            .lock()
            .unwrap()
            .get(account_id)
            .cloned()
            .unwrap_or_else(|| Err(unknown(account_id)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::reconciliation::RankResult;

    #[tokio::test]
    async fn status_mock_answers_and_records() {
        let mock = MockStatusService::new()
            .with_status("p1", StatusSnapshot::new(true, 10, "account.1"))
            .with_failure("p2", RemoteError::network("down"));

        assert!(mock.query("p1").await.unwrap().banned);
        assert_eq!(mock.query("p2").await, Err(RemoteError::network("down")));
        assert!(matches!(
            mock.query("p3").await,
            Err(RemoteError::Status { status: 404, .. })
        ));
        assert_eq!(mock.calls(), vec!["p1", "p2", "p3"]);
    }

    #[tokio::test]
    async fn status_answer_can_change() {
        let mock = MockStatusService::new().with_status("p1", StatusSnapshot::new(true, 0, ""));
        mock.set_status("p1", StatusSnapshot::new(false, 0, ""));
        assert!(!mock.query("p1").await.unwrap().banned);
    }

    #[tokio::test]
    async fn gate_holds_calls_until_released() {
        let gate = Arc::new(Semaphore::new(0));
        let mock = MockStatusService::new()
            .with_status("p1", StatusSnapshot::new(false, 0, ""))
            .with_gate(gate.clone());

        let task = tokio::spawn({
            let mock = mock.clone();
            async move { mock.query("p1").await }
        });
        tokio::task::yield_now().await;
        assert!(!task.is_finished());

        gate.add_permits(1);
        assert!(task.await.unwrap().is_ok());
    }

    #[tokio::test]
    async fn rank_mock_records_season() {
        let snapshot = RankSnapshot {
            tpp: Some(RankResult::new("Gold", "2", 2345)),
            fpp: None,
        };
        let mock = MockRankService::new().with_rank("account.1", snapshot.clone());

        assert_eq!(mock.query("account.1", 35).await.unwrap(), snapshot);
        assert_eq!(mock.calls(), vec![("account.1".to_string(), 35)]);
    }
}
