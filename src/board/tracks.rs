use super::ResourceKind;
use crate::Level;
use crate::TRACK_MAX;
use serde::Deserialize;
use serde::Serialize;

/// The four ideology tracks.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Ideology {
    Reform,
    Order,
    Liberty,
    Unity,
}

impl Ideology {
    pub const ALL: [Ideology; 4] = [
        Ideology::Reform,
        Ideology::Order,
        Ideology::Liberty,
        Ideology::Unity,
    ];
    fn index(&self) -> usize {
        match self {
            Self::Reform => 0,
            Self::Order => 1,
            Self::Liberty => 2,
            Self::Unity => 3,
        }
    }
    /// Resource trickled by this track's passive bonus.
    pub fn resource(&self) -> ResourceKind {
        match self {
            Self::Reform => ResourceKind::Media,
            Self::Order => ResourceKind::Clout,
            Self::Liberty => ResourceKind::Funds,
            Self::Unity => ResourceKind::Trust,
        }
    }
}

impl std::fmt::Display for Ideology {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        match self {
            Self::Reform => write!(f, "Reform"),
            Self::Order => write!(f, "Order"),
            Self::Liberty => write!(f, "Liberty"),
            Self::Unity => write!(f, "Unity"),
        }
    }
}

/// Levels on all four ideology tracks.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Tracks([Level; 4]);

impl Tracks {
    pub fn level(&self, ideology: Ideology) -> Level {
        self.0[ideology.index()]
    }
    /// Copy with one track advanced by one, saturating at [`TRACK_MAX`].
    pub fn advance(mut self, ideology: Ideology) -> Self {
        let i = ideology.index();
        self.0[i] = (self.0[i] + 1).min(TRACK_MAX);
        self
    }
    pub fn at_least(&self, ideology: Ideology, level: Level) -> bool {
        self.level(ideology) >= level
    }
}

impl From<[Level; 4]> for Tracks {
    fn from(levels: [Level; 4]) -> Self {
        Self(levels.map(|l| l.min(TRACK_MAX)))
    }
}

/// Elite personas a player may unlock through their track profile.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Elite {
    Technocrat,
    Magnate,
    Strongman,
    Demagogue,
    Diplomat,
}

impl std::fmt::Display for Elite {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{:?}", self)
    }
}
