use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::log;

use crate::db::Db;
use crate::errors::ApiError;
use crate::merge_service::MergeService;
use crate::models::{CardKind, TeamSide};
use crate::rest_client::RestClient;
use crate::LogResult;

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub enum PendingKind {
    Goal { team: TeamSide, scorer_id: u32, assistant_id: Option<u32>, minute: u32 },
    Card { team: TeamSide, player_id: u32, kind: CardKind, minute: u32 },
    GoalDeletion { team: TeamSide, scorer_id: u32 },
}

/// A write that could not reach the remote store yet. The key doubles
/// as an idempotency marker so a retried flush never files the same
/// mutation twice.
#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct PendingMutation {
    pub key: String,
    pub match_id: String,
    pub kind: PendingKind,
    pub attempts: u32,
    pub created_at: DateTime<Utc>,
}

/// Persisted queue of failed writes, drained oldest-first whenever the
/// remote store is reachable again. Entries survive restarts.
pub struct OutboxService {
    db: Db<String, PendingMutation>,
}

impl OutboxService {
    pub fn new() -> OutboxService {
        OutboxService { db: Db::new("v2_outbox") }
    }

    pub fn with_db(db: Db<String, PendingMutation>) -> OutboxService {
        OutboxService { db }
    }

    pub fn enqueue(&self, match_id: &str, kind: PendingKind) -> String {
        let created_at = Utc::now();
        let key = format!("{}_{}", match_id, created_at.timestamp_nanos_opt().unwrap_or(0));
        let mutation = PendingMutation {
            key: key.clone(),
            match_id: match_id.to_string(),
            kind,
            attempts: 0,
            created_at,
        };
        if self.db.write(&key, &mutation).ok_log("[OUTBOX] Failed to persist pending mutation").is_some() {
            log::info!("[OUTBOX] Queued pending mutation {key}");
        }
        key
    }

    pub fn pending(&self) -> Vec<PendingMutation> {
        let mut all = self.db.read_all();
        all.sort_by_key(|m| m.created_at);
        all
    }

    pub fn remove(&self, key: &str) {
        self.db.remove(&key.to_string());
    }

    /// One pass over the queue: replays each entry against the remote
    /// store, dropping the ones that land and bumping the attempt
    /// counter on the rest. Returns how many were delivered.
    pub async fn flush(&self, client: &RestClient) -> usize {
        let mut delivered = 0;
        for mut mutation in self.pending() {
            match self.dispatch(client, &mutation).await {
                Ok(()) => {
                    self.remove(&mutation.key);
                    delivered += 1;
                }
                Err(e) if e.is_retryable_write() => {
                    mutation.attempts += 1;
                    log::error!(
                        "[OUTBOX] Replay of {} failed (attempt {}): {e}",
                        mutation.key,
                        mutation.attempts
                    );
                    self.db.write(&mutation.key, &mutation).ok_log("[OUTBOX] Failed to update attempts");
                }
                Err(e) => {
                    // permanently invalid, keeps the queue from wedging
                    log::error!("[OUTBOX] Dropping unreplayable mutation {}: {e}", mutation.key);
                    self.remove(&mutation.key);
                }
            }
        }
        delivered
    }

    async fn dispatch(&self, client: &RestClient, mutation: &PendingMutation) -> Result<(), ApiError> {
        match &mutation.kind {
            PendingKind::Goal { team, scorer_id, assistant_id, minute } => {
                MergeService::submit_goal(client, &mutation.match_id, *team, *scorer_id, *assistant_id, *minute)
                    .await
            }
            PendingKind::Card { team, player_id, kind, minute } => {
                MergeService::submit_card(client, &mutation.match_id, *team, *player_id, *kind, *minute).await
            }
            PendingKind::GoalDeletion { team, scorer_id } => {
                MergeService::delete_goal(client, &mutation.match_id, *team, *scorer_id).await
            }
        }
    }
}

/// Seconds to wait before the next flush attempt, doubling per failed
/// attempt and capped at one minute.
pub fn backoff_s(attempts: u32) -> u64 {
    2u64.saturating_pow(attempts.min(6)).min(60)
}

impl Default for OutboxService {
    fn default() -> Self {
        OutboxService::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempdir::TempDir;

    fn outbox(dir: &TempDir) -> OutboxService {
        OutboxService::with_db(Db::new_in(dir.path().to_str().unwrap(), "v2_outbox"))
    }

    #[test]
    fn enqueue_persists_and_orders_by_age() {
        let dir = TempDir::new("outbox").expect("dir to be created");
        let outbox = outbox(&dir);

        let k1 = outbox.enqueue(
            "2092",
            PendingKind::Goal { team: TeamSide::Local, scorer_id: 5, assistant_id: None, minute: 10 },
        );
        let k2 = outbox.enqueue(
            "2092",
            PendingKind::Card { team: TeamSide::Visitor, player_id: 9, kind: CardKind::Yellow, minute: 30 },
        );

        let pending = outbox.pending();
        assert_eq!(pending.len(), 2);
        assert_eq!(pending[0].key, k1);
        assert_eq!(pending[1].key, k2);
        assert_eq!(pending[0].attempts, 0);

        outbox.remove(&k1);
        assert_eq!(outbox.pending().len(), 1);
    }

    #[test]
    fn keys_are_unique_per_enqueue() {
        let dir = TempDir::new("outbox").expect("dir to be created");
        let outbox = outbox(&dir);

        let k1 = outbox.enqueue(
            "2092",
            PendingKind::GoalDeletion { team: TeamSide::Local, scorer_id: 5 },
        );
        let k2 = outbox.enqueue(
            "2092",
            PendingKind::GoalDeletion { team: TeamSide::Local, scorer_id: 5 },
        );
        assert_ne!(k1, k2);
    }

    #[test]
    fn backoff_doubles_and_caps() {
        assert_eq!(backoff_s(0), 1);
        assert_eq!(backoff_s(1), 2);
        assert_eq!(backoff_s(3), 8);
        assert_eq!(backoff_s(10), 60);
    }
}
