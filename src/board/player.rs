use super::*;
use crate::Battalions;
use crate::engine::CardId;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeSet;

/// Stable participant identifier, chosen by the client and shared by the room.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct PlayerId(String);

impl PlayerId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for PlayerId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl From<String> for PlayerId {
    fn from(s: String) -> Self {
        Self(s)
    }
}

impl std::fmt::Display for PlayerId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// One participant's seat at the table.
///
/// Created at game init from a name and color, mutated only by the reducer,
/// and never removed mid-game: departure just clears `active`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Player {
    id: PlayerId,
    name: String,
    color: String,
    resources: Resources,
    tracks: Tracks,
    battalions: Battalions,
    evicted: Battalions,
    cards: Vec<CardId>,
    elites: BTreeSet<Elite>,
    active_elite: Option<Elite>,
    active: bool,
}

impl Player {
    pub fn new(id: PlayerId, name: &str, color: &str, battalions: Battalions) -> Self {
        Self {
            id,
            name: name.to_string(),
            color: color.to_string(),
            resources: Resources::empty(),
            tracks: Tracks::default(),
            battalions,
            evicted: 0,
            cards: Vec::new(),
            elites: BTreeSet::new(),
            active_elite: None,
            active: true,
        }
    }
}

impl Player {
    pub fn id(&self) -> &PlayerId {
        &self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn color(&self) -> &str {
        &self.color
    }
    pub fn resources(&self) -> Resources {
        self.resources
    }
    pub fn tracks(&self) -> Tracks {
        self.tracks
    }
    pub fn battalions(&self) -> Battalions {
        self.battalions
    }
    pub fn evicted(&self) -> Battalions {
        self.evicted
    }
    pub fn cards(&self) -> &[CardId] {
        &self.cards
    }
    pub fn elites(&self) -> &BTreeSet<Elite> {
        &self.elites
    }
    pub fn active_elite(&self) -> Option<Elite> {
        self.active_elite
    }
    pub fn is_active(&self) -> bool {
        self.active
    }
    /// Units this player could still put on the board.
    pub fn has_units(&self) -> bool {
        self.battalions > 0 || self.evicted > 0
    }
}

/// Crate-internal mutators used by the reducer on its private copy.
impl Player {
    pub(crate) fn gain(&mut self, delta: Resources) {
        self.resources = self.resources.gain(delta);
    }
    pub(crate) fn spend(&mut self, cost: Resources) {
        self.resources = self.resources.spend(cost);
    }
    pub(crate) fn advance(&mut self, ideology: Ideology) {
        self.tracks = self.tracks.advance(ideology);
    }
    pub(crate) fn enlist(&mut self, n: Battalions) {
        self.battalions = self.battalions.saturating_add(n);
    }
    pub(crate) fn deploy(&mut self) {
        self.battalions = self.battalions.saturating_sub(1);
    }
    pub(crate) fn evict(&mut self) {
        self.evicted = self.evicted.saturating_add(1);
    }
    pub(crate) fn redeem(&mut self) {
        self.evicted = self.evicted.saturating_sub(1);
    }
    pub(crate) fn acquire(&mut self, card: CardId) {
        self.cards.push(card);
    }
    pub(crate) fn unlock(&mut self, elite: Elite) -> bool {
        self.elites.insert(elite)
    }
    pub(crate) fn activate(&mut self, elite: Elite) {
        self.active_elite = Some(elite);
    }
    pub(crate) fn depart(&mut self) {
        self.active = false;
    }
}
