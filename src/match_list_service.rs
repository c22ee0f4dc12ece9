use chrono::NaiveDateTime;

use crate::errors::ApiError;
use crate::models_external::player::EventSummary;
use crate::rest_client::RestClient;

/// Fetches the match-picker listing: every event with two teams
/// attached, oldest first.
pub struct MatchListService;

impl MatchListService {
    pub async fn fetch(client: &RestClient) -> Result<Vec<EventSummary>, ApiError> {
        let mut events = client.get_event_list().await?;
        events.retain(|e| e.teams.len() >= 2);
        events.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));
        Ok(events)
    }
}

// dates arrive as "2025-05-01T20:00:00"; anything unparseable sorts
// after real dates, by raw string
fn sort_key(event: &EventSummary) -> (bool, Option<NaiveDateTime>, String) {
    let raw = event.date.clone().unwrap_or_default();
    let parsed = NaiveDateTime::parse_from_str(&raw, "%Y-%m-%dT%H:%M:%S").ok();
    (parsed.is_none(), parsed, raw)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models_external::player::Rendered;

    fn summary(id: u32, date: Option<&str>, teams: Vec<u32>) -> EventSummary {
        EventSummary {
            id,
            title: Rendered { rendered: format!("Match {id}") },
            date: date.map(|d| d.to_string()),
            teams,
            main_results: None,
        }
    }

    #[test]
    fn sorts_by_date_and_drops_incomplete_entries() {
        let mut events = vec![
            summary(1, Some("2025-05-08T20:00:00"), vec![10, 20]),
            summary(2, Some("2025-05-01T20:00:00"), vec![10, 20]),
            summary(3, Some("2025-05-03T20:00:00"), vec![10]),
            summary(4, None, vec![30, 40]),
        ];
        events.retain(|e| e.teams.len() >= 2);
        events.sort_by(|a, b| sort_key(a).cmp(&sort_key(b)));

        let ids: Vec<u32> = events.iter().map(|e| e.id).collect();
        assert_eq!(ids, vec![2, 1, 4]);
    }
}
