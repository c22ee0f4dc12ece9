//! Derivation of a flat, minute-sorted event timeline from the
//! denormalized per-team/per-player performance data of a snapshot.

use rand::Rng;

use crate::minute_codec;
use crate::models::{CardKind, StatKind, TeamSide};
use crate::models_api::event::{ApiEventType, CardInfo, GoalInfo, MatchEvent};
use crate::models_external::snapshot::{MatchSnapshot, PerformanceLine};
use crate::snapshot_service::{display_name, PlayerDirectory};

pub struct EventService;
impl EventService {
    /// A pure function of the snapshot and directory, except for the
    /// fabricated minutes of legacy bare-count fields.
    ///
    /// Generation order is fixed (goals then assists then cards, local
    /// team before visitor, players ascending by id) so that the
    /// greedy assist pairing is stable for a given snapshot.
    pub fn derive(snapshot: &MatchSnapshot, directory: &PlayerDirectory) -> Vec<MatchEvent> {
        let mut events: Vec<MatchEvent> = Vec::new();
        let mut next_id = 1;

        for side in TeamSide::get_all() {
            let Some(team_id) = snapshot.team_id(side) else { continue };
            for (player_id, line) in snapshot.players(team_id) {
                for minute in occurrences(line, StatKind::Goals) {
                    events.push(MatchEvent {
                        id: next_id,
                        team: side,
                        player_id,
                        player_name: display_name(directory, player_id),
                        minute,
                        info: ApiEventType::Goal(GoalInfo::default()),
                    });
                    next_id += 1;
                }
            }
        }

        for side in TeamSide::get_all() {
            let Some(team_id) = snapshot.team_id(side) else { continue };
            for (player_id, line) in snapshot.players(team_id) {
                let assists = line.stat_count(StatKind::Assists);
                for _ in 0..assists {
                    assign_assist(&mut events, player_id, directory);
                }
            }
        }

        for kind in CardKind::get_all() {
            for side in TeamSide::get_all() {
                let Some(team_id) = snapshot.team_id(side) else { continue };
                for (player_id, line) in snapshot.players(team_id) {
                    for minute in occurrences(line, kind.stat_kind()) {
                        events.push(MatchEvent {
                            id: next_id,
                            team: side,
                            player_id,
                            player_name: display_name(directory, player_id),
                            minute,
                            info: ApiEventType::Card(CardInfo { kind }),
                        });
                        next_id += 1;
                    }
                }
            }
        }

        // stable: ties keep generation order
        events.sort_by_key(|e| e.minute);
        events
    }
}

/// Minutes at which a stat occurred. Legacy fields carry a count but
/// no minutes; fabricate one uniformly-random minute per occurrence so
/// cardinality is preserved even when precision is lost.
fn occurrences(line: &PerformanceLine, kind: StatKind) -> Vec<u32> {
    let field = minute_codec::decode(line.stat(kind).map(|e| e.to_str()).as_deref());
    if !field.minutes.is_empty() {
        return field.minutes;
    }
    let mut rng = rand::thread_rng();
    (0..field.count).map(|_| rng.gen_range(1..=90)).collect()
}

/// Greedy best-effort pairing: the first goal that has no assistant
/// yet and was not scored by the assisting player takes the credit.
fn assign_assist(events: &mut [MatchEvent], assistant_id: u32, directory: &PlayerDirectory) {
    let candidate = events.iter_mut().find(|e| match &e.info {
        ApiEventType::Goal(info) => info.assistant.is_none() && e.player_id != assistant_id,
        ApiEventType::Card(_) => false,
    });
    if let Some(goal) = candidate {
        if let ApiEventType::Goal(info) = &mut goal.info {
            info.assistant = Some(display_name(directory, assistant_id));
            info.assistant_id = Some(assistant_id);
        }
    }
}
