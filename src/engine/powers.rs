use crate::board::*;
use crate::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Active powers unlocked by ideology tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Power {
    Recruit,
    Mobilize,
    Evict,
    Purge,
    Lobby,
    Windfall,
    Canvass,
    Convert,
}

impl Power {
    pub const ALL: [Power; 8] = [
        Power::Recruit,
        Power::Mobilize,
        Power::Evict,
        Power::Purge,
        Power::Lobby,
        Power::Windfall,
        Power::Canvass,
        Power::Convert,
    ];
    /// Track and level that unlock this power.
    pub fn requirement(&self) -> (Ideology, Level) {
        match self {
            Self::Recruit => (Ideology::Reform, MINOR_POWER_LEVEL),
            Self::Mobilize => (Ideology::Reform, MAJOR_POWER_LEVEL),
            Self::Evict => (Ideology::Order, MINOR_POWER_LEVEL),
            Self::Purge => (Ideology::Order, MAJOR_POWER_LEVEL),
            Self::Lobby => (Ideology::Liberty, MINOR_POWER_LEVEL),
            Self::Windfall => (Ideology::Liberty, MAJOR_POWER_LEVEL),
            Self::Canvass => (Ideology::Unity, MINOR_POWER_LEVEL),
            Self::Convert => (Ideology::Unity, MAJOR_POWER_LEVEL),
        }
    }
    pub fn is_unlocked(&self, tracks: &Tracks) -> bool {
        let (ideology, level) = self.requirement();
        tracks.at_least(ideology, level)
    }
    /// Fixed price paid on each use.
    pub fn cost(&self) -> Resources {
        match self {
            Self::Recruit => Resources::new(0, 0, 1, 0),
            Self::Evict => Resources::new(0, 1, 0, 0),
            Self::Purge => Resources::new(0, 2, 0, 0),
            Self::Convert => Resources::new(0, 0, 0, 2),
            Self::Mobilize | Self::Lobby | Self::Windfall | Self::Canvass => Resources::empty(),
        }
    }
}

impl std::fmt::Display for Power {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}

/// A power invocation with its target, as carried by an action.
///
/// Mobilize has no invocation of its own; it is spent by redeploying a
/// locked unit.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "name", rename_all = "snake_case")]
pub enum PowerUse {
    Recruit,
    Evict { slot: Slot },
    Purge { slot: Slot },
    Lobby { give: ResourceKind, get: ResourceKind },
    Windfall,
    Canvass,
    Convert { slot: Slot },
}

impl PowerUse {
    pub fn power(&self) -> Power {
        match self {
            Self::Recruit => Power::Recruit,
            Self::Evict { .. } => Power::Evict,
            Self::Purge { .. } => Power::Purge,
            Self::Lobby { .. } => Power::Lobby,
            Self::Windfall => Power::Windfall,
            Self::Canvass => Power::Canvass,
            Self::Convert { .. } => Power::Convert,
        }
    }
}

/// Per-turn counters, reset whenever a participant's turn starts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PowerUsage {
    uses: BTreeMap<Power, u8>,
    purchases: u8,
    redeployments: u8,
}

impl PowerUsage {
    pub fn used(&self, power: Power) -> u8 {
        self.uses.get(&power).copied().unwrap_or(0)
    }
    pub fn can_use(&self, power: Power) -> bool {
        self.used(power) < POWER_USE_LIMIT
    }
    pub fn purchases(&self) -> u8 {
        self.purchases
    }
    pub fn redeployments(&self) -> u8 {
        self.redeployments
    }
    pub(crate) fn spend(&mut self, power: Power) {
        *self.uses.entry(power).or_insert(0) += 1;
    }
    pub(crate) fn purchase(&mut self) {
        self.purchases += 1;
    }
    pub(crate) fn redeploy(&mut self) {
        self.redeployments += 1;
    }
}

/// Track conditions for an elite: minimums and, optionally, ceilings.
#[derive(Debug, Clone, Copy)]
pub struct Requirement {
    pub at_least: [(Ideology, Level); 4],
    pub at_most: Option<(Ideology, Level)>,
}

/// What an active elite changes.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Patronage {
    /// Taken off every deployment cost.
    DeployDiscount(Resources),
    /// Added to every answered prompt.
    AnswerBonus(Resources),
    /// Extra redeployment moves per turn.
    ExtraRedeploys(u8),
}

/// Fixed elite table.
pub fn requirement(elite: Elite) -> Requirement {
    use Ideology::*;
    match elite {
        Elite::Technocrat => Requirement {
            at_least: [(Reform, 3), (Order, 2), (Liberty, 0), (Unity, 0)],
            at_most: None,
        },
        Elite::Magnate => Requirement {
            at_least: [(Reform, 0), (Order, 0), (Liberty, 4), (Unity, 0)],
            at_most: None,
        },
        Elite::Strongman => Requirement {
            at_least: [(Reform, 0), (Order, 4), (Liberty, 0), (Unity, 0)],
            at_most: Some((Reform, 1)),
        },
        Elite::Demagogue => Requirement {
            at_least: [(Reform, 0), (Order, 0), (Liberty, 0), (Unity, 4)],
            at_most: Some((Liberty, 0)),
        },
        Elite::Diplomat => Requirement {
            at_least: [(Reform, 2), (Order, 2), (Liberty, 2), (Unity, 2)],
            at_most: None,
        },
    }
}

pub fn patronage(elite: Elite) -> Patronage {
    match elite {
        Elite::Technocrat => Patronage::DeployDiscount(Resources::new(1, 0, 0, 0)),
        Elite::Magnate => Patronage::AnswerBonus(Resources::new(1, 0, 0, 0)),
        Elite::Strongman => Patronage::ExtraRedeploys(1),
        Elite::Demagogue => Patronage::AnswerBonus(Resources::new(0, 0, 0, 1)),
        Elite::Diplomat => Patronage::DeployDiscount(Resources::new(0, 1, 0, 0)),
    }
}

impl Requirement {
    pub fn is_met(&self, tracks: &Tracks) -> bool {
        self.at_least.iter().all(|(i, l)| tracks.at_least(*i, *l))
            && self.at_most.is_none_or(|(i, l)| tracks.level(i) <= l)
    }
}

/// Elites whose conditions the given tracks meet right now.
pub fn qualifying(tracks: &Tracks) -> Vec<Elite> {
    ELITES
        .into_iter()
        .filter(|e| requirement(*e).is_met(tracks))
        .collect()
}

pub const ELITES: [Elite; 5] = [
    Elite::Technocrat,
    Elite::Magnate,
    Elite::Strongman,
    Elite::Demagogue,
    Elite::Diplomat,
];

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn powers_unlock_at_three_and_five() {
        let tracks = Tracks::from([3, 5, 2, 0]);
        let powers = Power::ALL
            .into_iter()
            .filter(|p| p.is_unlocked(&tracks))
            .collect::<Vec<_>>();
        assert_eq!(powers, vec![Power::Recruit, Power::Evict, Power::Purge]);
    }
    #[test]
    fn usage_caps_at_limit() {
        let mut usage = PowerUsage::default();
        assert!(usage.can_use(Power::Evict));
        usage.spend(Power::Evict);
        usage.spend(Power::Evict);
        assert!(!usage.can_use(Power::Evict));
        assert!(usage.can_use(Power::Purge));
    }
    #[test]
    fn exclusions_block_elites() {
        assert_eq!(qualifying(&Tracks::from([0, 4, 0, 0])), vec![Elite::Strongman]);
        assert!(qualifying(&Tracks::from([2, 4, 0, 0])).is_empty());
        assert_eq!(qualifying(&Tracks::from([0, 0, 0, 4])), vec![Elite::Demagogue]);
        assert!(qualifying(&Tracks::from([0, 0, 1, 4])).is_empty());
    }
    #[test]
    fn diplomat_needs_every_track() {
        assert!(qualifying(&Tracks::from([2, 2, 2, 2])).contains(&Elite::Diplomat));
        assert!(!qualifying(&Tracks::from([2, 2, 2, 1])).contains(&Elite::Diplomat));
    }
    #[test]
    fn power_use_wire_shape() {
        let json = serde_json::to_value(PowerUse::Lobby {
            give: ResourceKind::Funds,
            get: ResourceKind::Trust,
        })
        .unwrap();
        assert_eq!(json["name"], "lobby");
        assert_eq!(json["give"], "funds");
    }
}
