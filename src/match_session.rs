use serde::{Deserialize, Serialize};

use crate::errors::ApiError;
use crate::event_service::EventService;
use crate::models::{CardKind, TeamSide};
use crate::models_api::event::{ApiEventType, CardInfo, GoalInfo, MatchEvent};
use crate::models_api::scoreboard::Scoreboard;
use crate::models_external::snapshot::MatchSnapshot;
use crate::snapshot_service::PlayerDirectory;

/// Descriptive passthrough from the snapshot.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MatchInfo {
    pub match_id: String,
    pub local_team_id: u32,
    pub visitor_team_id: u32,
    pub date: Option<String>,
    pub league: Option<String>,
    pub season: Option<String>,
}

/// The active match session: the in-memory event timeline plus the
/// aggregate scoreboard, mutated optimistically and rebuilt wholesale
/// on every successful fetch.
///
/// Every mutation updates the timeline and the scoreboard together;
/// callers never observe one without the other.
pub struct MatchSession {
    pub info: MatchInfo,
    events: Vec<MatchEvent>,
    scoreboard: Scoreboard,
    next_event_id: u32,
}

impl MatchSession {
    pub fn from_snapshot(
        match_id: &str,
        snapshot: &MatchSnapshot,
        directory: &PlayerDirectory,
    ) -> Result<MatchSession, ApiError> {
        let (local_team_id, visitor_team_id) = match (snapshot.local_team(), snapshot.visitor_team()) {
            (Some(l), Some(v)) => (l, v),
            _ => return Err(ApiError::Validation("snapshot is missing team ids".to_string())),
        };

        let events = EventService::derive(snapshot, directory);
        let next_event_id = events.iter().map(|e| e.id).max().unwrap_or(0) + 1;

        Ok(MatchSession {
            info: MatchInfo {
                match_id: match_id.to_string(),
                local_team_id,
                visitor_team_id,
                date: snapshot.date.clone(),
                league: snapshot.leagues.first().map(|e| e.to_str()),
                season: snapshot.seasons.first().map(|e| e.to_str()),
            },
            scoreboard: Scoreboard::from_snapshot(snapshot),
            events,
            next_event_id,
        })
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn scoreboard(&self) -> &Scoreboard {
        &self.scoreboard
    }

    pub fn team_id(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Local => self.info.local_team_id,
            TeamSide::Visitor => self.info.visitor_team_id,
        }
    }

    pub fn add_goal(
        &mut self,
        team: TeamSide,
        scorer_id: u32,
        scorer_name: &str,
        assistant: Option<(u32, String)>,
        minute: u32,
    ) -> Result<u32, ApiError> {
        validate_minute(minute)?;
        let (assistant_id, assistant_name) = match assistant {
            Some((id, name)) => (Some(id), Some(name)),
            None => (None, None),
        };
        let id = self.insert(MatchEvent {
            id: 0,
            team,
            player_id: scorer_id,
            player_name: scorer_name.to_string(),
            minute,
            info: ApiEventType::Goal(GoalInfo { assistant: assistant_name, assistant_id }),
        });
        self.scoreboard.record_goal(team);
        Ok(id)
    }

    pub fn add_card(
        &mut self,
        team: TeamSide,
        player_id: u32,
        player_name: &str,
        kind: CardKind,
        minute: u32,
    ) -> Result<u32, ApiError> {
        validate_minute(minute)?;
        let id = self.insert(MatchEvent {
            id: 0,
            team,
            player_id,
            player_name: player_name.to_string(),
            minute,
            info: ApiEventType::Card(CardInfo { kind }),
        });
        self.scoreboard.record_card(team, kind);
        Ok(id)
    }

    /// Removes the event and rolls the matching counter back, floored
    /// at zero. Returns the removed event so the caller can decide
    /// whether a remote patch applies (cards cannot be deleted
    /// remotely).
    pub fn delete_event(&mut self, event_id: u32) -> Option<MatchEvent> {
        let pos = self.events.iter().position(|e| e.id == event_id)?;
        let event = self.events.remove(pos);
        match &event.info {
            ApiEventType::Goal(_) => self.scoreboard.remove_goal(event.team),
            ApiEventType::Card(c) => self.scoreboard.remove_card(event.team, c.kind),
        }
        Some(event)
    }

    /// Local-only re-attribution: no remote sync is performed for
    /// edits.
    pub fn edit_event(
        &mut self,
        event_id: u32,
        new_minute: u32,
        new_player: Option<(u32, String)>,
    ) -> Result<(), ApiError> {
        validate_minute(new_minute)?;
        let pos = self
            .events
            .iter()
            .position(|e| e.id == event_id)
            .ok_or_else(|| ApiError::Validation(format!("no event with id {event_id}")))?;

        let mut event = self.events.remove(pos);
        event.minute = new_minute;
        if let Some((player_id, player_name)) = new_player {
            event.player_id = player_id;
            event.player_name = player_name;
        }
        self.insert_sorted(event);
        Ok(())
    }

    fn insert(&mut self, mut event: MatchEvent) -> u32 {
        let id = self.next_event_id;
        self.next_event_id += 1;
        event.id = id;
        self.insert_sorted(event);
        id
    }

    // keeps the minute ordering invariant; equal minutes stay in
    // insertion order
    fn insert_sorted(&mut self, event: MatchEvent) {
        let pos = self.events.partition_point(|e| e.minute <= event.minute);
        self.events.insert(pos, event);
    }
}

fn validate_minute(minute: u32) -> Result<(), ApiError> {
    if minute == 0 {
        return Err(ApiError::Validation("minute must be a positive integer".to_string()));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn session() -> MatchSession {
        let snapshot: MatchSnapshot = serde_json::from_value(json!({
            "teams": [10, 20],
            "results": { "10": { "goals": "1" }, "20": { "goals": "0" } },
            "performance": {
                "10": { "0": { "goals": "1 (15')" }, "5": { "goals": "1 (15')" } },
                "20": { "0": {} }
            },
            "leagues": ["Liga A"],
            "seasons": ["2025"]
        }))
        .unwrap();
        let directory = [(5u32, "Ana".to_string())].into_iter().collect();
        MatchSession::from_snapshot("2092", &snapshot, &directory).unwrap()
    }

    #[test]
    fn builds_from_snapshot() {
        let session = session();
        assert_eq!(session.info.local_team_id, 10);
        assert_eq!(session.info.league.as_deref(), Some("Liga A"));
        assert_eq!(session.events().len(), 1);
        assert_eq!(session.scoreboard().local_score, 1);
    }

    #[test]
    fn add_goal_updates_score_in_lockstep() {
        let mut session = session();
        let before_visitor = session.scoreboard().visitor_score;

        session.add_goal(TeamSide::Local, 6, "Bea", None, 44).unwrap();
        assert_eq!(session.scoreboard().local_score, 2);
        assert_eq!(session.scoreboard().visitor_score, before_visitor);
        assert_eq!(session.events().len(), 2);
    }

    #[test]
    fn delete_goal_restores_score_and_floors() {
        let mut session = session();
        let id = session.add_goal(TeamSide::Local, 6, "Bea", None, 44).unwrap();

        assert!(session.delete_event(id).is_some());
        assert_eq!(session.scoreboard().local_score, 1);

        // deleting the derived goal too, then a missing id
        let derived_id = session.events()[0].id;
        assert!(session.delete_event(derived_id).is_some());
        assert_eq!(session.scoreboard().local_score, 0);
        assert!(session.delete_event(999).is_none());
        assert_eq!(session.scoreboard().local_score, 0);
    }

    #[test]
    fn card_counters_follow_add_and_delete() {
        let mut session = session();
        let id = session.add_card(TeamSide::Visitor, 9, "Carla", CardKind::Blue, 12).unwrap();
        assert_eq!(session.scoreboard().blue_cards.visitor, 1);

        let removed = session.delete_event(id).unwrap();
        assert_eq!(removed.card_kind(), Some(CardKind::Blue));
        assert_eq!(session.scoreboard().blue_cards.visitor, 0);
    }

    #[test]
    fn events_stay_sorted_through_mutations() {
        let mut session = session();
        session.add_card(TeamSide::Local, 6, "Bea", CardKind::Yellow, 3).unwrap();
        session.add_goal(TeamSide::Visitor, 9, "Carla", None, 50).unwrap();

        let minutes: Vec<u32> = session.events().iter().map(|e| e.minute).collect();
        assert_eq!(minutes, vec![3, 15, 50]);

        let first_id = session.events()[0].id;
        session.edit_event(first_id, 80, None).unwrap();
        let minutes: Vec<u32> = session.events().iter().map(|e| e.minute).collect();
        assert_eq!(minutes, vec![15, 50, 80]);
    }

    #[test]
    fn zero_minute_is_rejected() {
        let mut session = session();
        assert!(session.add_goal(TeamSide::Local, 6, "Bea", None, 0).is_err());
        assert!(session.add_card(TeamSide::Local, 6, "Bea", CardKind::Red, 0).is_err());
    }
}
