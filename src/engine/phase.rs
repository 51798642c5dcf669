use super::*;
use crate::board::*;
use serde::Deserialize;
use serde::Serialize;

/// Turn phases, in cyclic order after the two pre-game phases.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum Phase {
    ResourceSelection,
    FirstPlayerSelection,
    PlaceEvicted,
    Answering,
    Action,
    Deployment,
    Redeployment,
    EndTurn,
    GameOver,
}

impl Phase {
    /// Shared-decision phases before the first turn.
    pub fn is_pregame(&self) -> bool {
        matches!(self, Self::ResourceSelection | Self::FirstPlayerSelection)
    }
    pub fn is_terminal(&self) -> bool {
        matches!(self, Self::GameOver)
    }
    /// Phases that belong to the active player's turn.
    pub fn is_turn(&self) -> bool {
        !self.is_pregame() && !self.is_terminal()
    }
}

impl std::fmt::Display for Phase {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::ResourceSelection => write!(f, "RESOURCE_SELECTION"),
            Self::FirstPlayerSelection => write!(f, "FIRST_PLAYER_SELECTION"),
            Self::PlaceEvicted => write!(f, "PLACE_EVICTED"),
            Self::Answering => write!(f, "ANSWERING"),
            Self::Action => write!(f, "ACTION"),
            Self::Deployment => write!(f, "DEPLOYMENT"),
            Self::Redeployment => write!(f, "REDEPLOYMENT"),
            Self::EndTurn => write!(f, "END_TURN"),
            Self::GameOver => write!(f, "GAME_OVER"),
        }
    }
}

/// Phase entry effects. These run on the reducer's private copy of the
/// state, after an action has been validated.
impl GameState {
    /// Leaves the draft and opens the die-off for first seat.
    pub(super) fn enter_first_player_selection(&mut self) {
        let contenders = self.active_seats();
        self.resource_selection = None;
        self.first_player_selection = Some(FirstPlayerSelection::new(contenders));
        self.phase = Phase::FirstPlayerSelection;
    }

    /// Seats the die-off winner and starts the first turn.
    pub(super) fn enter_first_turn(&mut self, first: PlayerId, catalog: &dyn Catalog) {
        self.first_player_selection = None;
        self.first_player_id = Some(first.clone());
        self.active_player_id = Some(first);
        self.turn_number = 1;
        self.begin_turn(catalog);
    }

    /// Turn start: reset per-turn counters, then place evicted units or answer.
    pub(super) fn begin_turn(&mut self, catalog: &dyn Catalog) {
        self.power_usage = PowerUsage::default();
        self.trade_offer = None;
        let evicted = self.active().map(|p| p.evicted()).unwrap_or(0);
        match evicted > 0 && self.has_open_stable_slot() {
            true => self.phase = Phase::PlaceEvicted,
            false => self.enter_answering(catalog),
        }
    }

    /// Answering entry: a headline at the start of each round, then a prompt.
    pub(super) fn enter_answering(&mut self, catalog: &dyn Catalog) {
        self.phase = Phase::Answering;
        if self.active_player_id.is_some() && self.active_player_id == self.first_player_id {
            self.run_headline(catalog);
        }
        self.prompt = self.prompt_deck.pop_front();
        if let Some(id) = self.prompt {
            self.prompt_deck.push_back(id);
        }
    }

    fn run_headline(&mut self, catalog: &dyn Catalog) {
        let Some(id) = self.headline_deck.pop_front() else {
            return;
        };
        self.headline_deck.push_back(id);
        self.headline = Some(id);
        let Some(headline) = catalog.headline(id) else {
            return;
        };
        for player in self.players.values_mut().filter(|p| p.is_active()) {
            match headline.bulletin {
                Bulletin::Gain(r) => player.gain(r),
                Bulletin::Levy(r) => player.spend(r),
                Bulletin::Reinforce(n) => player.enlist(n),
            }
        }
        self.note(None, format!("Headline: {}", headline.text));
    }

    /// End-of-turn entry: refill the shop and check for exhaustion.
    pub(super) fn enter_end_turn(&mut self) {
        self.phase = Phase::EndTurn;
        self.refill_shop();
        let stalled = self
            .players
            .values()
            .filter(|p| p.is_active())
            .all(|p| !p.has_units());
        if stalled {
            self.note(None, "No battalions remain anywhere".to_string());
            self.finish();
        }
    }

    /// Passes the turn to the next active seat.
    pub(super) fn pass_turn(&mut self, catalog: &dyn Catalog) {
        self.active_player_id = self.next_seat();
        self.turn_number += 1;
        self.begin_turn(catalog);
    }

    pub(super) fn refill_shop(&mut self) {
        while self.shop_row.len() < crate::SHOP_ROW {
            match self.shop_deck.pop_front() {
                Some(card) => self.shop_row.push(card),
                None => break,
            }
        }
    }

    /// Terminal check run after every successful transition.
    pub(super) fn check_game_over(&mut self) {
        if self.phase.is_terminal() {
            return;
        }
        let controlled = self.zones.iter().all(|z| z.majority_owner().is_some());
        let full = !self.has_open_stable_slot();
        let deserted = self.active_seats().len() < crate::MIN_PLAYERS;
        if controlled || full || deserted {
            self.finish();
        }
    }

    fn finish(&mut self) {
        self.phase = Phase::GameOver;
        self.prompt = None;
        self.trade_offer = None;
        let winners = self
            .winners()
            .iter()
            .map(|p| p.to_string())
            .collect::<Vec<_>>()
            .join(", ");
        self.note(None, format!("Game over. Winners: {}", winners));
    }

    /// Hands the round marker on when the first player leaves, so
    /// headlines keep firing once per round.
    pub(super) fn succeed_first_player(&mut self, departed: &PlayerId) {
        if self.first_player_id.as_ref() == Some(departed) {
            self.first_player_id = self.seat_after(departed);
        }
    }

    fn next_seat(&self) -> Option<PlayerId> {
        let current = self.active_player_id.as_ref()?;
        self.seat_after(current)
    }

    /// Next active seat clockwise from `from`, which may itself have left.
    fn seat_after(&self, from: &PlayerId) -> Option<PlayerId> {
        let at = self.seating.iter().position(|p| p == from)?;
        (1..=self.seating.len())
            .map(|k| &self.seating[(at + k) % self.seating.len()])
            .find(|p| self.player(p).is_some_and(|p| p.is_active()))
            .cloned()
    }
}
