use std::collections::{BTreeSet, HashMap};

use futures::future::join_all;
use tracing::log;

use crate::errors::ApiError;
use crate::models_external::snapshot::MatchSnapshot;
use crate::rest_client::RestClient;

/// Display names keyed by player id, populated lazily for ids that
/// actually appear in the current snapshot's events.
pub type PlayerDirectory = HashMap<u32, String>;

pub fn display_name(directory: &PlayerDirectory, player_id: u32) -> String {
    directory
        .get(&player_id)
        .cloned()
        .unwrap_or_else(|| placeholder_name(player_id))
}

fn placeholder_name(player_id: u32) -> String {
    format!("Player {player_id}")
}

pub struct SnapshotService;
impl SnapshotService {
    /// Fetch the authoritative snapshot and resolve the names of every
    /// participating player.
    pub async fn load(
        client: &RestClient,
        match_id: &str,
    ) -> Result<(MatchSnapshot, PlayerDirectory), ApiError> {
        let snapshot = client.get_snapshot(match_id).await?;
        let directory = SnapshotService::resolve_player_names(client, &snapshot.participant_ids()).await;
        Ok((snapshot, directory))
    }

    /// One independent request per id, no ordering guarantee. A failed
    /// lookup degrades to a placeholder name instead of failing the
    /// batch: one missing player must not block the timeline.
    pub async fn resolve_player_names(
        client: &RestClient,
        player_ids: &BTreeSet<u32>,
    ) -> PlayerDirectory {
        let lookups = player_ids.iter().map(|id| async move { (*id, client.get_player(*id).await) });

        let mut directory = PlayerDirectory::new();
        for (id, result) in join_all(lookups).await {
            let name = match result {
                Ok(player) if !player.title.rendered.is_empty() => player.title.rendered,
                Ok(_) => placeholder_name(id),
                Err(e) => {
                    log::error!("[PLAYERS] Lookup failed for {id}: {e}");
                    placeholder_name(id)
                }
            };
            directory.insert(id, name);
        }
        directory
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn display_name_falls_back_to_placeholder() {
        let mut directory = PlayerDirectory::new();
        directory.insert(5, "Ana Torres".to_string());
        assert_eq!(display_name(&directory, 5), "Ana Torres");
        assert_eq!(display_name(&directory, 9), "Player 9");
    }
}
