use std::collections::{BTreeSet, HashMap};

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::minute_codec;
use crate::models::{StatKind, StringOrNum, TeamSide};

/// Key of the per-team rollup entry stored alongside individual
/// players in the performance map.
pub const TEAM_AGGREGATE_KEY: &str = "0";

/// Full point-in-time read of a match's remote state.
///
/// Never mutated in place: every write cycle re-fetches a fresh copy
/// and treats any previously held one as stale.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct MatchSnapshot {
    /// Ordered pair: index 0 is the local team, index 1 the visitor.
    #[serde(default)]
    pub teams: Vec<u32>,
    #[serde(default)]
    pub results: HashMap<String, TeamResult>,
    /// performance[teamId][playerId]; playerId "0" is the team rollup.
    #[serde(default)]
    pub performance: HashMap<String, HashMap<String, PerformanceLine>>,
    #[serde(default)]
    pub date: Option<String>,
    #[serde(default)]
    pub leagues: Vec<StringOrNum>,
    #[serde(default)]
    pub seasons: Vec<StringOrNum>,
    /// Append-only structured audit trail of goals.
    #[serde(default)]
    pub goals_data: Vec<GoalRecord>,
}

#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct TeamResult {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<StringOrNum>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl TeamResult {
    pub fn with_goals(goals: u32) -> TeamResult {
        TeamResult { goals: Some(goals.to_string().as_str().into()), extra: Map::new() }
    }
}

/// One player's (or the team rollup's) stat bag. Stat fields hold
/// minute-encoded strings; `extra` carries every backend field we do
/// not interpret, so partial updates never drop them.
#[derive(Serialize, Deserialize, Debug, Clone, Default)]
pub struct PerformanceLine {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub goals: Option<StringOrNum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub assists: Option<StringOrNum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub yellowcards: Option<StringOrNum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub redcards: Option<StringOrNum>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub azul: Option<StringOrNum>,
    #[serde(flatten)]
    pub extra: Map<String, Value>,
}

impl PerformanceLine {
    pub fn stat(&self, kind: StatKind) -> Option<&StringOrNum> {
        match kind {
            StatKind::Goals => self.goals.as_ref(),
            StatKind::Assists => self.assists.as_ref(),
            StatKind::YellowCards => self.yellowcards.as_ref(),
            StatKind::RedCards => self.redcards.as_ref(),
            StatKind::BlueCards => self.azul.as_ref(),
        }
    }

    pub fn set_stat(&mut self, kind: StatKind, value: String) {
        let slot = match kind {
            StatKind::Goals => &mut self.goals,
            StatKind::Assists => &mut self.assists,
            StatKind::YellowCards => &mut self.yellowcards,
            StatKind::RedCards => &mut self.redcards,
            StatKind::BlueCards => &mut self.azul,
        };
        *slot = Some(StringOrNum::String(value));
    }

    /// Decoded count of a stat field; zero for absent or unparseable.
    pub fn stat_count(&self, kind: StatKind) -> u32 {
        minute_codec::decode(self.stat(kind).map(|e| e.to_str()).as_deref()).count
    }

    /// A player participates if any stat decodes to a non-zero count.
    /// Used to decide which ids are worth a name lookup.
    pub fn is_participant(&self) -> bool {
        [
            StatKind::Goals,
            StatKind::Assists,
            StatKind::YellowCards,
            StatKind::RedCards,
            StatKind::BlueCards,
        ]
        .iter()
        .any(|kind| self.stat_count(*kind) > 0)
    }
}

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
pub struct GoalRecord {
    pub team_id: u32,
    pub player_id: u32,
    pub minute: u32,
    #[serde(default)]
    pub assist_by: Option<u32>,
}

/// Typed view over one team's performance map. The backend overloads
/// player id "0" to mean the team rollup; this keeps the two apart.
#[derive(Debug)]
pub enum PerformanceEntry<'a> {
    TeamAggregate(&'a PerformanceLine),
    Player { id: u32, line: &'a PerformanceLine },
}

impl MatchSnapshot {
    pub fn local_team(&self) -> Option<u32> {
        self.teams.first().copied()
    }

    pub fn visitor_team(&self) -> Option<u32> {
        self.teams.get(1).copied()
    }

    pub fn team_id(&self, side: TeamSide) -> Option<u32> {
        match side {
            TeamSide::Local => self.local_team(),
            TeamSide::Visitor => self.visitor_team(),
        }
    }

    /// Team goal total from the results block.
    pub fn team_goals(&self, team_id: u32) -> u32 {
        self.results
            .get(&team_id.to_string())
            .and_then(|r| r.goals.as_ref())
            .map(|g| g.to_num())
            .unwrap_or(0)
    }

    pub fn aggregate(&self, team_id: u32) -> Option<&PerformanceLine> {
        self.performance.get(&team_id.to_string())?.get(TEAM_AGGREGATE_KEY)
    }

    /// Individual players of one team, ascending by id. The fixed
    /// order keeps derivation (and assist pairing) stable for a given
    /// snapshot regardless of map iteration order.
    pub fn players(&self, team_id: u32) -> Vec<(u32, &PerformanceLine)> {
        let mut players: Vec<(u32, &PerformanceLine)> = self
            .performance
            .get(&team_id.to_string())
            .map(|team| {
                team.iter()
                    .filter(|(id, _)| id.as_str() != TEAM_AGGREGATE_KEY)
                    .filter_map(|(id, line)| id.parse::<u32>().ok().map(|id| (id, line)))
                    .collect()
            })
            .unwrap_or_default();
        players.sort_by_key(|(id, _)| *id);
        players
    }

    pub fn entries(&self, team_id: u32) -> Vec<PerformanceEntry> {
        let mut entries = Vec::new();
        if let Some(agg) = self.aggregate(team_id) {
            entries.push(PerformanceEntry::TeamAggregate(agg));
        }
        for (id, line) in self.players(team_id) {
            entries.push(PerformanceEntry::Player { id, line });
        }
        entries
    }

    /// Ids of every player that shows up in at least one event, across
    /// both teams. These are the only ids worth name resolution.
    pub fn participant_ids(&self) -> BTreeSet<u32> {
        let mut ids = BTreeSet::new();
        for team_id in &self.teams {
            for (id, line) in self.players(*team_id) {
                if line.is_participant() {
                    ids.insert(id);
                }
            }
        }
        ids
    }
}

/// Partial update submitted to the remote store. Only touched fields
/// are serialized; the store merges rather than replaces.
#[derive(Serialize, Debug, Clone, Default)]
pub struct MatchUpdate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub main_results: Option<Vec<String>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub results: Option<HashMap<String, TeamResult>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub goals_data: Option<Vec<GoalRecord>>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub performance: Option<HashMap<String, HashMap<String, PerformanceLine>>>,
}
