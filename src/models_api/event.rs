use std::fmt::Display;

use serde::{Deserialize, Serialize};

use crate::models::{CardKind, TeamSide};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq, Default)]
pub struct GoalInfo {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assistant_id: Option<u32>,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct CardInfo {
    pub kind: CardKind,
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(tag = "type", content = "info")]
pub enum ApiEventType {
    Goal(GoalInfo),
    Card(CardInfo),
}

/// One discrete match event in the local timeline, attributed to a
/// team and player.
#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct MatchEvent {
    pub id: u32,
    pub team: TeamSide,
    pub player_id: u32,
    pub player_name: String,
    pub minute: u32,
    #[serde(flatten)]
    pub info: ApiEventType,
}

impl MatchEvent {
    pub fn is_goal(&self) -> bool {
        matches!(self.info, ApiEventType::Goal(_))
    }

    pub fn card_kind(&self) -> Option<CardKind> {
        match &self.info {
            ApiEventType::Card(c) => Some(c.kind),
            ApiEventType::Goal(_) => None,
        }
    }

    pub fn assistant(&self) -> Option<&str> {
        match &self.info {
            ApiEventType::Goal(g) => g.assistant.as_deref(),
            ApiEventType::Card(_) => None,
        }
    }
}

impl Display for MatchEvent {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match &self.info {
            ApiEventType::Goal(g) => {
                write!(f, "{}' Goal {} ({})", self.minute, self.player_name, self.team)?;
                if let Some(assistant) = &g.assistant {
                    write!(f, " assist {assistant}")?;
                }
                Ok(())
            }
            ApiEventType::Card(c) => {
                write!(f, "{}' {} card {} ({})", self.minute, c.kind, self.player_name, self.team)
            }
        }
    }
}
