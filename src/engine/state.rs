use super::*;
use crate::board::*;
use crate::*;
use rand::SeedableRng;
use rand::rngs::StdRng;
use rand::seq::SliceRandom;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;
use std::collections::VecDeque;

/// Seat colors handed out in join order.
const PALETTE: [&str; MAX_PLAYERS] = ["crimson", "cobalt", "amber", "jade", "violet"];

/// Resources every player starts with before the draft.
pub const STARTING_RESOURCES: Resources = Resources::new(2, 2, 1, 1);

/// A participant entering a new game.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Entrant {
    pub id: PlayerId,
    pub name: String,
}

impl Entrant {
    pub fn new(id: &str, name: &str) -> Self {
        Self {
            id: PlayerId::from(id),
            name: name.to_string(),
        }
    }
}

/// One line of the in-game log.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogEntry {
    pub turn: u32,
    pub player: Option<PlayerId>,
    pub message: String,
}

/// Final or running ranking of one player.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Standing {
    pub player: PlayerId,
    pub zones: usize,
    pub units: usize,
}

/// Aggregate root of one game.
///
/// Owned by the reducer: a transition clones the state, changes the clone,
/// and hands it back whole. Nothing outside the engine mutates it except the
/// sync layer's version counter.
///
/// Zones are stored in a vector indexed by [`ZoneId`]; players in an ordered
/// map so iteration is identical on every replica.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct GameState {
    pub(super) phase: Phase,
    pub(super) turn_number: u32,
    pub(super) active_player_id: Option<PlayerId>,
    pub(super) first_player_id: Option<PlayerId>,
    pub(super) seating: Vec<PlayerId>,
    pub(super) zones: Vec<Zone>,
    pub(super) players: BTreeMap<PlayerId, Player>,
    pub(super) prompt_deck: VecDeque<PromptId>,
    pub(super) headline_deck: VecDeque<HeadlineId>,
    pub(super) shop_row: Vec<CardId>,
    pub(super) shop_deck: VecDeque<CardId>,
    pub(super) prompt: Option<PromptId>,
    pub(super) headline: Option<HeadlineId>,
    pub(super) power_usage: PowerUsage,
    pub(super) state_version: Version,
    pub(super) resource_selection: Option<ResourceSelection>,
    pub(super) first_player_selection: Option<FirstPlayerSelection>,
    pub(super) trade_offer: Option<TradeOffer>,
    pub(super) log: Vec<LogEntry>,
}

impl GameState {
    /// Sets up a fresh game on the standard board.
    ///
    /// Every replica calling this with the same entrants (in the same order),
    /// seed, and catalog gets an identical state.
    pub fn new(entrants: &[Entrant], seed: u64, catalog: &dyn Catalog) -> anyhow::Result<Self> {
        Self::with_layout(entrants, seed, catalog, &layout::STANDARD)
    }

    pub fn with_layout(
        entrants: &[Entrant],
        seed: u64,
        catalog: &dyn Catalog,
        layout: &[layout::ZoneSpec],
    ) -> anyhow::Result<Self> {
        let n = entrants.len();
        if !(MIN_PLAYERS..=MAX_PLAYERS).contains(&n) {
            anyhow::bail!("need {}-{} players, got {}", MIN_PLAYERS, MAX_PLAYERS, n);
        }
        let mut players = BTreeMap::new();
        for (i, e) in entrants.iter().enumerate() {
            let mut player = Player::new(e.id.clone(), &e.name, PALETTE[i], STARTING_BATTALIONS[n]);
            player.gain(STARTING_RESOURCES);
            if players.insert(e.id.clone(), player).is_some() {
                anyhow::bail!("duplicate player id {}", e.id);
            }
        }
        let ref mut rng = StdRng::seed_from_u64(seed);
        let mut prompts = (0..catalog.prompts().len()).map(PromptId).collect::<Vec<_>>();
        let mut headlines = (0..catalog.headlines().len()).map(HeadlineId).collect::<Vec<_>>();
        let mut shop = (0..catalog.shop().len()).map(CardId).collect::<Vec<_>>();
        prompts.shuffle(rng);
        headlines.shuffle(rng);
        shop.shuffle(rng);
        let mut state = Self {
            phase: Phase::FirstPlayerSelection,
            turn_number: 0,
            active_player_id: None,
            first_player_id: None,
            seating: entrants.iter().map(|e| e.id.clone()).collect(),
            zones: layout::build(layout)?,
            players,
            prompt_deck: prompts.into(),
            headline_deck: headlines.into(),
            shop_row: Vec::new(),
            shop_deck: shop.into(),
            prompt: None,
            headline: None,
            power_usage: PowerUsage::default(),
            state_version: 0,
            resource_selection: None,
            first_player_selection: None,
            trade_offer: None,
            log: Vec::new(),
        };
        state.refill_shop();
        match n >= DRAFT_PLAYERS {
            true => {
                state.phase = Phase::ResourceSelection;
                state.resource_selection = Some(ResourceSelection::default());
            }
            false => state.enter_first_player_selection(),
        }
        state.note(None, format!("New game with {} players", n));
        Ok(state)
    }
}

/// Read-only views.
impl GameState {
    pub fn phase(&self) -> Phase {
        self.phase
    }
    pub fn turn_number(&self) -> u32 {
        self.turn_number
    }
    pub fn active_player_id(&self) -> Option<&PlayerId> {
        self.active_player_id.as_ref()
    }
    pub fn first_player_id(&self) -> Option<&PlayerId> {
        self.first_player_id.as_ref()
    }
    pub fn seating(&self) -> &[PlayerId] {
        &self.seating
    }
    pub fn zones(&self) -> &[Zone] {
        &self.zones
    }
    pub fn zone(&self, id: ZoneId) -> Option<&Zone> {
        self.zones.get(id.0)
    }
    pub fn players(&self) -> &BTreeMap<PlayerId, Player> {
        &self.players
    }
    pub fn player(&self, id: &PlayerId) -> Option<&Player> {
        self.players.get(id)
    }
    pub fn active(&self) -> Option<&Player> {
        self.active_player_id.as_ref().and_then(|id| self.players.get(id))
    }
    pub fn shop_row(&self) -> &[CardId] {
        &self.shop_row
    }
    pub fn prompt(&self) -> Option<PromptId> {
        self.prompt
    }
    pub fn headline(&self) -> Option<HeadlineId> {
        self.headline
    }
    pub fn power_usage(&self) -> &PowerUsage {
        &self.power_usage
    }
    pub fn version(&self) -> Version {
        self.state_version
    }
    pub fn resource_selection(&self) -> Option<&ResourceSelection> {
        self.resource_selection.as_ref()
    }
    pub fn first_player_selection(&self) -> Option<&FirstPlayerSelection> {
        self.first_player_selection.as_ref()
    }
    pub fn trade_offer(&self) -> Option<&TradeOffer> {
        self.trade_offer.as_ref()
    }
    pub fn log(&self) -> &[LogEntry] {
        &self.log
    }
    /// Players who have not departed, in seating order.
    pub fn active_seats(&self) -> Vec<PlayerId> {
        self.seating
            .iter()
            .filter(|p| self.player(p).is_some_and(|p| p.is_active()))
            .cloned()
            .collect()
    }
    pub fn has_open_stable_slot(&self) -> bool {
        self.zones.iter().any(|z| z.has_empty_stable_slot())
    }
    /// Units `player` has on the board.
    pub fn units(&self, player: &PlayerId) -> usize {
        self.zones.iter().map(|z| z.count(player)).sum()
    }
    /// Active players ranked by zones controlled, then units on the board.
    pub fn standings(&self) -> Vec<Standing> {
        let mut table = self
            .active_seats()
            .into_iter()
            .map(|player| Standing {
                zones: self
                    .zones
                    .iter()
                    .filter(|z| z.majority_owner() == Some(&player))
                    .count(),
                units: self.units(&player),
                player,
            })
            .collect::<Vec<_>>();
        table.sort_by(|a, b| (b.zones, b.units).cmp(&(a.zones, a.units)));
        table
    }
    /// Everyone sharing the top standing.
    pub fn winners(&self) -> Vec<PlayerId> {
        let table = self.standings();
        let Some(best) = table.first().map(|s| (s.zones, s.units)) else {
            return Vec::new();
        };
        table
            .into_iter()
            .filter(|s| (s.zones, s.units) == best)
            .map(|s| s.player)
            .collect()
    }
}

/// Crate-internal hooks.
impl GameState {
    /// Only the sync layer moves the version.
    pub(crate) fn set_version(&mut self, version: Version) {
        self.state_version = version;
    }
    pub(super) fn player_mut(&mut self, id: &PlayerId) -> Option<&mut Player> {
        self.players.get_mut(id)
    }
    pub(super) fn note(&mut self, player: Option<&PlayerId>, message: String) {
        log::trace!("[game] {}", message);
        self.log.push(LogEntry {
            turn: self.turn_number,
            player: player.cloned(),
            message,
        });
    }
}
