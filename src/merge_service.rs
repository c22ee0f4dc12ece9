use std::collections::HashMap;

use tracing::log;

use crate::errors::ApiError;
use crate::minute_codec;
use crate::models::{CardKind, StatKind, TeamSide};
use crate::models_external::snapshot::{
    GoalRecord, MatchSnapshot, MatchUpdate, PerformanceLine, TeamResult, TEAM_AGGREGATE_KEY,
};
use crate::rest_client::RestClient;

/// Builds and submits partial match updates.
///
/// Every write fetches a fresh snapshot first and reconciles against
/// that copy, never against whatever the caller holds. The payloads
/// carry only the fields a mutation touches; the remote store merges
/// them into the stored document.
pub struct MergeService;

impl MergeService {
    pub async fn submit_goal(
        client: &RestClient,
        match_id: &str,
        team: TeamSide,
        scorer_id: u32,
        assistant_id: Option<u32>,
        minute: u32,
    ) -> Result<(), ApiError> {
        if assistant_id == Some(scorer_id) {
            return Err(ApiError::Validation("a player cannot assist their own goal".to_string()));
        }

        let snapshot = client.get_snapshot(match_id).await?;
        let team_id = snapshot
            .team_id(team)
            .ok_or_else(|| ApiError::Validation(format!("snapshot has no {team} team")))?;

        let mut lines = team_lines(&snapshot, team_id);
        bump(&mut lines, TEAM_AGGREGATE_KEY, StatKind::Goals, minute);
        bump(&mut lines, &scorer_id.to_string(), StatKind::Goals, minute);
        if let Some(assistant_id) = assistant_id {
            bump(&mut lines, TEAM_AGGREGATE_KEY, StatKind::Assists, minute);
            bump(&mut lines, &assistant_id.to_string(), StatKind::Assists, minute);
        }

        let mut goals_data = snapshot.goals_data.clone();
        goals_data.push(GoalRecord { team_id, player_id: scorer_id, minute, assist_by: assistant_id });

        let update = MatchUpdate {
            main_results: Some(main_results(&snapshot, team_id, 1)),
            results: Some(results(&snapshot, team_id, 1)),
            goals_data: Some(goals_data),
            performance: Some(HashMap::from([(team_id.to_string(), lines)])),
        };
        client.post_update(match_id, &update).await?;
        log::info!("[MERGE] Goal by {scorer_id} at {minute}' saved to match {match_id}");
        Ok(())
    }

    pub async fn submit_card(
        client: &RestClient,
        match_id: &str,
        team: TeamSide,
        player_id: u32,
        kind: CardKind,
        minute: u32,
    ) -> Result<(), ApiError> {
        let snapshot = client.get_snapshot(match_id).await?;
        let team_id = snapshot
            .team_id(team)
            .ok_or_else(|| ApiError::Validation(format!("snapshot has no {team} team")))?;

        let mut lines = team_lines(&snapshot, team_id);
        bump(&mut lines, TEAM_AGGREGATE_KEY, kind.stat_kind(), minute);
        bump(&mut lines, &player_id.to_string(), kind.stat_kind(), minute);

        let update = MatchUpdate {
            performance: Some(HashMap::from([(team_id.to_string(), lines)])),
            ..Default::default()
        };
        client.post_update(match_id, &update).await?;
        log::info!("[MERGE] {kind:?} card for {player_id} at {minute}' saved to match {match_id}");
        Ok(())
    }

    /// Decrements goal counts for the team and scorer, floored at
    /// zero. Recorded minute markers stay behind; only the counts
    /// shrink.
    pub async fn delete_goal(
        client: &RestClient,
        match_id: &str,
        team: TeamSide,
        scorer_id: u32,
    ) -> Result<(), ApiError> {
        let snapshot = client.get_snapshot(match_id).await?;
        let team_id = snapshot
            .team_id(team)
            .ok_or_else(|| ApiError::Validation(format!("snapshot has no {team} team")))?;

        let mut lines = team_lines(&snapshot, team_id);
        decrement(&mut lines, TEAM_AGGREGATE_KEY, StatKind::Goals);
        decrement(&mut lines, &scorer_id.to_string(), StatKind::Goals);

        let update = MatchUpdate {
            main_results: Some(main_results(&snapshot, team_id, -1)),
            results: Some(results(&snapshot, team_id, -1)),
            performance: Some(HashMap::from([(team_id.to_string(), lines)])),
            goals_data: None,
        };
        client.post_update(match_id, &update).await?;
        log::info!("[MERGE] Goal by {scorer_id} removed from match {match_id}");
        Ok(())
    }

    pub async fn delete_card(
        _client: &RestClient,
        _match_id: &str,
    ) -> Result<(), ApiError> {
        Err(ApiError::Unsupported("card deletion is not supported by the remote store"))
    }
}

fn team_lines(snapshot: &MatchSnapshot, team_id: u32) -> HashMap<String, PerformanceLine> {
    snapshot.performance.get(&team_id.to_string()).cloned().unwrap_or_default()
}

fn bump(lines: &mut HashMap<String, PerformanceLine>, key: &str, kind: StatKind, minute: u32) {
    let line = lines.entry(key.to_string()).or_default();
    let existing = line.stat(kind).map(|e| e.to_str());
    line.set_stat(kind, minute_codec::reconcile_append(existing.as_deref(), minute));
}

fn decrement(lines: &mut HashMap<String, PerformanceLine>, key: &str, kind: StatKind) {
    let line = lines.entry(key.to_string()).or_default();
    let existing = line.stat(kind).map(|e| e.to_str());
    line.set_stat(kind, minute_codec::reconcile_decrement(existing.as_deref()));
}

/// Both team totals in team order, the touched one shifted by `delta`
/// and floored at zero.
fn main_results(snapshot: &MatchSnapshot, touched_team: u32, delta: i64) -> Vec<String> {
    snapshot
        .teams
        .iter()
        .map(|&id| shifted(snapshot.team_goals(id), if id == touched_team { delta } else { 0 }).to_string())
        .collect()
}

fn results(snapshot: &MatchSnapshot, touched_team: u32, delta: i64) -> HashMap<String, TeamResult> {
    snapshot
        .teams
        .iter()
        .map(|&id| {
            let goals = shifted(snapshot.team_goals(id), if id == touched_team { delta } else { 0 });
            (id.to_string(), TeamResult::with_goals(goals))
        })
        .collect()
}

fn shifted(value: u32, delta: i64) -> u32 {
    (value as i64 + delta).max(0) as u32
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn snapshot() -> MatchSnapshot {
        serde_json::from_value(json!({
            "teams": [10, 20],
            "results": { "10": { "goals": "1" }, "20": { "goals": "0" } },
            "performance": {
                "10": {
                    "0": { "goals": "1 (5')" },
                    "5": { "goals": "1 (5')", "position": "delantero" }
                },
                "20": { "0": {} }
            }
        }))
        .unwrap()
    }

    #[test]
    fn bump_appends_minute_to_existing_field() {
        let mut lines = team_lines(&snapshot(), 10);
        bump(&mut lines, "5", StatKind::Goals, 12);
        assert_eq!(lines["5"].goals.as_ref().unwrap().to_str(), "2 (5', 12')");
        // untouched backend fields stay on the line
        assert_eq!(lines["5"].extra.get("position"), Some(&json!("delantero")));
    }

    #[test]
    fn bump_creates_missing_lines() {
        let mut lines = team_lines(&snapshot(), 10);
        bump(&mut lines, "9", StatKind::Assists, 40);
        assert_eq!(lines["9"].assists.as_ref().unwrap().to_str(), "1 (40')");
    }

    #[test]
    fn decrement_floors_and_keeps_minutes() {
        let mut lines = team_lines(&snapshot(), 10);
        decrement(&mut lines, "5", StatKind::Goals);
        assert_eq!(lines["5"].goals.as_ref().unwrap().to_str(), "0 (5')");
        decrement(&mut lines, "5", StatKind::Goals);
        assert_eq!(lines["5"].goals.as_ref().unwrap().to_str(), "0 (5')");
    }

    #[test]
    fn totals_shift_only_the_touched_team() {
        let s = snapshot();
        assert_eq!(main_results(&s, 10, 1), vec!["2".to_string(), "0".to_string()]);
        assert_eq!(main_results(&s, 20, 1), vec!["1".to_string(), "1".to_string()]);
        assert_eq!(main_results(&s, 20, -1), vec!["1".to_string(), "0".to_string()]);

        let r = results(&s, 10, 1);
        assert_eq!(r["10"].goals.as_ref().unwrap().to_num(), 2);
        assert_eq!(r["20"].goals.as_ref().unwrap().to_num(), 0);
    }
}
