use serde::{Deserialize, Serialize};

use crate::models::{CardKind, TeamSide};
use crate::models_external::snapshot::MatchSnapshot;

#[derive(Serialize, Deserialize, Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct CardCounts {
    pub local: u32,
    pub visitor: u32,
}

impl CardCounts {
    pub fn get(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Local => self.local,
            TeamSide::Visitor => self.visitor,
        }
    }

    fn get_mut(&mut self, side: TeamSide) -> &mut u32 {
        match side {
            TeamSide::Local => &mut self.local,
            TeamSide::Visitor => &mut self.visitor,
        }
    }
}

/// Aggregate view of the match, derived once from a snapshot and then
/// mutated in lockstep with the event list.
#[derive(Serialize, Deserialize, Debug, Clone, Default, PartialEq, Eq)]
pub struct Scoreboard {
    pub local_score: u32,
    pub visitor_score: u32,
    pub yellow_cards: CardCounts,
    pub red_cards: CardCounts,
    pub blue_cards: CardCounts,
}

impl Scoreboard {
    pub fn from_snapshot(snapshot: &MatchSnapshot) -> Scoreboard {
        let mut board = Scoreboard::default();
        for side in TeamSide::get_all() {
            let Some(team_id) = snapshot.team_id(side) else { continue };
            *board.score_mut(side) = snapshot.team_goals(team_id);
            if let Some(agg) = snapshot.aggregate(team_id) {
                for kind in CardKind::get_all() {
                    *board.cards_mut(kind).get_mut(side) = agg.stat_count(kind.stat_kind());
                }
            }
        }
        board
    }

    pub fn score(&self, side: TeamSide) -> u32 {
        match side {
            TeamSide::Local => self.local_score,
            TeamSide::Visitor => self.visitor_score,
        }
    }

    pub fn cards(&self, kind: CardKind) -> &CardCounts {
        match kind {
            CardKind::Yellow => &self.yellow_cards,
            CardKind::Red => &self.red_cards,
            CardKind::Blue => &self.blue_cards,
        }
    }

    fn score_mut(&mut self, side: TeamSide) -> &mut u32 {
        match side {
            TeamSide::Local => &mut self.local_score,
            TeamSide::Visitor => &mut self.visitor_score,
        }
    }

    fn cards_mut(&mut self, kind: CardKind) -> &mut CardCounts {
        match kind {
            CardKind::Yellow => &mut self.yellow_cards,
            CardKind::Red => &mut self.red_cards,
            CardKind::Blue => &mut self.blue_cards,
        }
    }

    pub fn record_goal(&mut self, side: TeamSide) {
        *self.score_mut(side) += 1;
    }

    /// Floored at zero, repeated removals never go negative.
    pub fn remove_goal(&mut self, side: TeamSide) {
        let score = self.score_mut(side);
        *score = score.saturating_sub(1);
    }

    pub fn record_card(&mut self, side: TeamSide, kind: CardKind) {
        *self.cards_mut(kind).get_mut(side) += 1;
    }

    pub fn remove_card(&mut self, side: TeamSide, kind: CardKind) {
        let count = self.cards_mut(kind).get_mut(side);
        *count = count.saturating_sub(1);
    }
}
