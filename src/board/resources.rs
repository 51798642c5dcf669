use crate::Amount;
use crate::MAX_RESOURCES;
use serde::Deserialize;
use serde::Serialize;

/// The four counted resource types.
///
/// The declaration order is the fill order used when a gain would cross
/// [`MAX_RESOURCES`]: headroom goes to funds first, trust last.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ResourceKind {
    Funds,
    Clout,
    Media,
    Trust,
}

impl ResourceKind {
    pub const ORDER: [ResourceKind; 4] = [
        ResourceKind::Funds,
        ResourceKind::Clout,
        ResourceKind::Media,
        ResourceKind::Trust,
    ];
}

impl std::fmt::Display for ResourceKind {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Funds => write!(f, "funds"),
            Self::Clout => write!(f, "clout"),
            Self::Media => write!(f, "media"),
            Self::Trust => write!(f, "trust"),
        }
    }
}

/// A bundle of resources: a player's purse, a cost, or a gain.
///
/// Pure value object. Every operation returns a new bundle, so purses are
/// only ever replaced through the reducer.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Resources {
    #[serde(default)]
    pub funds: Amount,
    #[serde(default)]
    pub clout: Amount,
    #[serde(default)]
    pub media: Amount,
    #[serde(default)]
    pub trust: Amount,
}

impl Resources {
    pub const fn new(funds: Amount, clout: Amount, media: Amount, trust: Amount) -> Self {
        Self {
            funds,
            clout,
            media,
            trust,
        }
    }
    pub const fn empty() -> Self {
        Self::new(0, 0, 0, 0)
    }
    /// A bundle holding `n` of a single type.
    pub fn single(kind: ResourceKind, n: Amount) -> Self {
        Self::empty().with(kind, n)
    }
    pub fn get(&self, kind: ResourceKind) -> Amount {
        match kind {
            ResourceKind::Funds => self.funds,
            ResourceKind::Clout => self.clout,
            ResourceKind::Media => self.media,
            ResourceKind::Trust => self.trust,
        }
    }
    /// Copy with one type overwritten.
    pub fn with(mut self, kind: ResourceKind, n: Amount) -> Self {
        match kind {
            ResourceKind::Funds => self.funds = n,
            ResourceKind::Clout => self.clout = n,
            ResourceKind::Media => self.media = n,
            ResourceKind::Trust => self.trust = n,
        }
        self
    }
    pub fn total(&self) -> u16 {
        ResourceKind::ORDER
            .iter()
            .map(|k| self.get(*k) as u16)
            .sum()
    }
    pub fn is_empty(&self) -> bool {
        self.total() == 0
    }
}

/// Economy helpers.
impl Resources {
    /// Adds `delta` without letting the total cross [`MAX_RESOURCES`].
    ///
    /// Remaining headroom is handed out per type in [`ResourceKind::ORDER`];
    /// whatever does not fit is discarded. Gains are never pro-rated.
    pub fn gain(self, delta: Resources) -> Self {
        let mut headroom = (MAX_RESOURCES as u16).saturating_sub(self.total());
        ResourceKind::ORDER.iter().fold(self, |purse, kind| {
            let add = (delta.get(*kind) as u16).min(headroom);
            headroom -= add;
            purse.with(*kind, purse.get(*kind) + add as Amount)
        })
    }
    /// Exact-match affordability: every type covers its need.
    pub fn affords(&self, cost: &Resources) -> bool {
        ResourceKind::ORDER
            .iter()
            .all(|k| self.get(*k) >= cost.get(*k))
    }
    /// Per-type subtraction, clamped at zero.
    pub fn spend(self, cost: Resources) -> Self {
        ResourceKind::ORDER.iter().fold(self, |purse, kind| {
            purse.with(*kind, purse.get(*kind).saturating_sub(cost.get(*kind)))
        })
    }
    /// Uncapped per-type sum, for building costs.
    pub fn plus(self, other: Resources) -> Self {
        ResourceKind::ORDER.iter().fold(self, |acc, kind| {
            acc.with(*kind, acc.get(*kind).saturating_add(other.get(*kind)))
        })
    }
}

impl From<ResourceKind> for Resources {
    fn from(kind: ResourceKind) -> Self {
        Self::single(kind, 1)
    }
}

impl std::fmt::Display for Resources {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        let parts = ResourceKind::ORDER
            .iter()
            .filter(|k| self.get(**k) > 0)
            .map(|k| format!("{} {}", self.get(*k), k))
            .collect::<Vec<_>>();
        match parts.is_empty() {
            true => write!(f, "nothing"),
            false => write!(f, "{}", parts.join(", ")),
        }
    }
}
