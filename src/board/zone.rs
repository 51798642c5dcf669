use super::PlayerId;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Index of a zone on the board.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct ZoneId(pub usize);

impl std::fmt::Display for ZoneId {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "Z{}", self.0)
    }
}

/// Address of one unit slot: zone plus index within the zone.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct Slot {
    pub zone: ZoneId,
    pub index: usize,
}

impl Slot {
    pub fn new(zone: usize, index: usize) -> Self {
        Self {
            zone: ZoneId(zone),
            index,
        }
    }
}

impl std::fmt::Display for Slot {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}#{}", self.zone, self.index)
    }
}

/// A fixed-capacity area of the board.
///
/// Slots, locks, volatility, and fill stamps are parallel vectors of length
/// `capacity`. The fill stamp records the zone-local order in which slots were
/// occupied so that majority locks can be applied first-filled-first.
///
/// Mutation goes through [`crate::engine::Control`], which keeps
/// `majority_owner` and `locked` consistent.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Zone {
    id: ZoneId,
    name: String,
    capacity: usize,
    slots: Vec<Option<PlayerId>>,
    volatile: Vec<bool>,
    locked_slots: Vec<bool>,
    filled: Vec<u64>,
    stamp: u64,
    adjacent: Vec<ZoneId>,
    majority_owner: Option<PlayerId>,
}

impl Zone {
    /// Creates an empty zone.
    ///
    /// Fails when the capacity is too small to hold a majority, when a
    /// volatile index is out of range, or when the volatile slots alone could
    /// reach the majority threshold.
    pub fn new(
        id: usize,
        name: &str,
        capacity: usize,
        volatile: &[usize],
        adjacent: &[usize],
    ) -> anyhow::Result<Self> {
        if capacity < 3 {
            anyhow::bail!("zone {} capacity {} too small", name, capacity);
        }
        if let Some(i) = volatile.iter().find(|i| **i >= capacity) {
            anyhow::bail!("zone {} volatile index {} out of range", name, i);
        }
        if volatile.len() >= capacity / 2 + 1 {
            anyhow::bail!("zone {} has too many volatile slots", name);
        }
        let mut flags = vec![false; capacity];
        volatile.iter().for_each(|i| flags[*i] = true);
        Ok(Self {
            id: ZoneId(id),
            name: name.to_string(),
            capacity,
            slots: vec![None; capacity],
            volatile: flags,
            locked_slots: vec![false; capacity],
            filled: vec![0; capacity],
            stamp: 0,
            adjacent: adjacent.iter().copied().map(ZoneId).collect(),
            majority_owner: None,
        })
    }
}

/// Read-only queries.
impl Zone {
    pub fn id(&self) -> ZoneId {
        self.id
    }
    pub fn name(&self) -> &str {
        &self.name
    }
    pub fn capacity(&self) -> usize {
        self.capacity
    }
    pub fn adjacent(&self) -> &[ZoneId] {
        &self.adjacent
    }
    pub fn majority_owner(&self) -> Option<&PlayerId> {
        self.majority_owner.as_ref()
    }
    /// `floor(capacity / 2) + 1`.
    pub fn majority_required(&self) -> usize {
        self.capacity / 2 + 1
    }
    pub fn occupant(&self, index: usize) -> Option<&PlayerId> {
        self.slots.get(index).and_then(|s| s.as_ref())
    }
    pub fn contains(&self, index: usize) -> bool {
        index < self.capacity
    }
    pub fn is_empty(&self, index: usize) -> bool {
        self.contains(index) && self.slots[index].is_none()
    }
    pub fn is_volatile(&self, index: usize) -> bool {
        self.volatile.get(index).copied().unwrap_or(false)
    }
    pub fn is_locked(&self, index: usize) -> bool {
        self.locked_slots.get(index).copied().unwrap_or(false)
    }
    pub fn slots(&self) -> &[Option<PlayerId>] {
        &self.slots
    }
    /// Units held by `player` in this zone.
    pub fn count(&self, player: &PlayerId) -> usize {
        self.slots
            .iter()
            .filter(|s| s.as_ref() == Some(player))
            .count()
    }
    /// Units per player, in player order.
    pub fn counts(&self) -> BTreeMap<&PlayerId, usize> {
        self.slots.iter().flatten().fold(BTreeMap::new(), |mut m, p| {
            *m.entry(p).or_insert(0) += 1;
            m
        })
    }
    pub fn occupied(&self) -> usize {
        self.slots.iter().flatten().count()
    }
    pub fn empty_slots(&self) -> impl Iterator<Item = usize> + '_ {
        (0..self.capacity).filter(|i| self.slots[*i].is_none())
    }
    /// True while an empty non-volatile slot remains.
    pub fn has_empty_stable_slot(&self) -> bool {
        self.empty_slots().any(|i| !self.volatile[i])
    }
    /// Locked slots occupied by `player`.
    pub fn locked_by(&self, player: &PlayerId) -> usize {
        (0..self.capacity)
            .filter(|i| self.locked_slots[*i])
            .filter(|i| self.slots[*i].as_ref() == Some(player))
            .count()
    }
    /// Indices occupied by `player`, earliest fill first.
    pub fn fill_order(&self, player: &PlayerId) -> Vec<usize> {
        let mut mine = (0..self.capacity)
            .filter(|i| self.slots[*i].as_ref() == Some(player))
            .collect::<Vec<_>>();
        mine.sort_by_key(|i| self.filled[*i]);
        mine
    }
}

/// Raw mutators. These do not maintain the majority invariant on their own;
/// callers settle the zone afterwards.
impl Zone {
    pub(crate) fn put(&mut self, index: usize, player: PlayerId) {
        self.stamp += 1;
        self.slots[index] = Some(player);
        self.filled[index] = self.stamp;
        if self.volatile[index] {
            self.locked_slots[index] = true;
        }
    }
    pub(crate) fn take(&mut self, index: usize) -> Option<PlayerId> {
        self.locked_slots[index] = false;
        self.filled[index] = 0;
        self.slots[index].take()
    }
    pub(crate) fn lock(&mut self, index: usize) {
        self.locked_slots[index] = true;
    }
    pub(crate) fn unlock_stable(&mut self) {
        (0..self.capacity)
            .filter(|i| !self.volatile[*i])
            .for_each(|i| self.locked_slots[i] = false);
    }
    pub(crate) fn set_owner(&mut self, owner: Option<PlayerId>) {
        self.majority_owner = owner;
    }
}

impl std::fmt::Display for Zone {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{} ({}/{})", self.name, self.occupied(), self.capacity)
    }
}
