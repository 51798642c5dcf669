use super::*;
use crate::board::*;

/// Why the reducer turned an action into a no-op.
///
/// Rejections never reach other players and never enter the game log; they
/// exist so callers and tests can tell which precondition failed.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rejection {
    WrongPhase(Phase),
    NotYourTurn,
    UnknownPlayer,
    Departed,
    AlreadyDecided,
    InvalidRoll(u8),
    InvalidOption(usize),
    NoSuchSlot(Slot),
    SlotEmpty(Slot),
    SlotTaken(Slot),
    Volatile(Slot),
    Locked(Slot),
    SettledVolatile(Slot),
    OwnUnit(Slot),
    NotAdjacent(ZoneId, ZoneId),
    NoRights,
    AbandonsRights(ZoneId),
    NoBattalions,
    NoEvicted,
    CannotAfford(Resources),
    PowerLocked(Power),
    PowerSpent(Power),
    RedeploysSpent,
    PurchasesSpent,
    NoSuchCard(usize),
    EliteLocked(Elite),
    TradePending,
    NoTrade,
    NotTradeTarget,
    BadTrade,
}

impl std::fmt::Display for Rejection {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::WrongPhase(p) => write!(f, "not allowed during {}", p),
            Self::NotYourTurn => write!(f, "not your turn"),
            Self::UnknownPlayer => write!(f, "unknown player"),
            Self::Departed => write!(f, "player has departed"),
            Self::AlreadyDecided => write!(f, "already decided"),
            Self::InvalidRoll(r) => write!(f, "invalid roll {}", r),
            Self::InvalidOption(o) => write!(f, "invalid answer {}", o),
            Self::NoSuchSlot(s) => write!(f, "no slot {}", s),
            Self::SlotEmpty(s) => write!(f, "slot {} is empty", s),
            Self::SlotTaken(s) => write!(f, "slot {} is taken", s),
            Self::Volatile(s) => write!(f, "slot {} is volatile", s),
            Self::Locked(s) => write!(f, "slot {} is locked", s),
            Self::SettledVolatile(s) => write!(f, "owner cannot fill volatile slot {}", s),
            Self::OwnUnit(s) => write!(f, "slot {} holds your own unit", s),
            Self::NotAdjacent(a, b) => write!(f, "{} does not border {}", a, b),
            Self::NoRights => write!(f, "no redeployment rights"),
            Self::AbandonsRights(z) => write!(f, "move would abandon {}", z),
            Self::NoBattalions => write!(f, "no battalions in reserve"),
            Self::NoEvicted => write!(f, "no evicted battalions"),
            Self::CannotAfford(c) => write!(f, "cannot afford {}", c),
            Self::PowerLocked(p) => write!(f, "{} is locked", p),
            Self::PowerSpent(p) => write!(f, "{} already used up this turn", p),
            Self::RedeploysSpent => write!(f, "no redeployments left"),
            Self::PurchasesSpent => write!(f, "no purchases left"),
            Self::NoSuchCard(i) => write!(f, "no shop card {}", i),
            Self::EliteLocked(e) => write!(f, "{} not unlocked", e),
            Self::TradePending => write!(f, "a trade is already open"),
            Self::NoTrade => write!(f, "no open trade"),
            Self::NotTradeTarget => write!(f, "trade not addressed to you"),
            Self::BadTrade => write!(f, "malformed trade"),
        }
    }
}

impl std::error::Error for Rejection {}
