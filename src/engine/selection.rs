use crate::DIE_FACES;
use crate::board::*;
use serde::Deserialize;
use serde::Serialize;
use std::collections::BTreeMap;

/// Starting-resource draft, only held during `ResourceSelection`.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResourceSelection {
    picks: BTreeMap<PlayerId, ResourceKind>,
}

impl ResourceSelection {
    pub fn has_picked(&self, player: &PlayerId) -> bool {
        self.picks.contains_key(player)
    }
    pub fn picks(&self) -> &BTreeMap<PlayerId, ResourceKind> {
        &self.picks
    }
    pub(crate) fn pick(&mut self, player: PlayerId, kind: ResourceKind) {
        self.picks.insert(player, kind);
    }
    /// True once every listed player has picked.
    pub fn is_complete<'a>(&self, mut players: impl Iterator<Item = &'a PlayerId>) -> bool {
        players.all(|p| self.has_picked(p))
    }
}

/// Die-off for the first seat, only held during `FirstPlayerSelection`.
///
/// Everyone still contending rolls once. A unique high roll wins; otherwise
/// the tied players roll again and everyone else drops out.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FirstPlayerSelection {
    contenders: Vec<PlayerId>,
    rolls: BTreeMap<PlayerId, u8>,
    round: u8,
}

/// Outcome of recording a roll.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Rollout {
    Waiting,
    Tied(Vec<PlayerId>),
    Winner(PlayerId),
}

impl FirstPlayerSelection {
    pub fn new(contenders: Vec<PlayerId>) -> Self {
        Self {
            contenders,
            rolls: BTreeMap::new(),
            round: 1,
        }
    }
    pub fn contenders(&self) -> &[PlayerId] {
        &self.contenders
    }
    pub fn rolls(&self) -> &BTreeMap<PlayerId, u8> {
        &self.rolls
    }
    pub fn round(&self) -> u8 {
        self.round
    }
    pub fn may_roll(&self, player: &PlayerId) -> bool {
        self.contenders.contains(player) && !self.rolls.contains_key(player)
    }
    pub fn is_valid(roll: u8) -> bool {
        (1..=DIE_FACES).contains(&roll)
    }
    /// Records a roll and resolves the round once every contender has rolled.
    pub(crate) fn roll(&mut self, player: PlayerId, roll: u8) -> Rollout {
        self.rolls.insert(player, roll);
        self.resolve()
    }
    /// Drops a departed contender, which may complete the round.
    pub(crate) fn withdraw(&mut self, player: &PlayerId) -> Rollout {
        self.contenders.retain(|p| p != player);
        self.rolls.remove(player);
        match self.contenders.as_slice() {
            [] => Rollout::Waiting,
            [last] => Rollout::Winner(last.clone()),
            _ => self.resolve(),
        }
    }
    fn resolve(&mut self) -> Rollout {
        if self.contenders.iter().any(|p| !self.rolls.contains_key(p)) {
            return Rollout::Waiting;
        }
        let high = self.rolls.values().copied().max().unwrap_or(0);
        let top = self
            .contenders
            .iter()
            .filter(|p| self.rolls.get(*p) == Some(&high))
            .cloned()
            .collect::<Vec<_>>();
        match top.as_slice() {
            [winner] => Rollout::Winner(winner.clone()),
            _ => {
                self.contenders = top.clone();
                self.rolls.clear();
                self.round += 1;
                Rollout::Tied(top)
            }
        }
    }
}

/// An open resource swap proposed by the active player.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct TradeOffer {
    pub from: PlayerId,
    pub to: PlayerId,
    pub give: Resources,
    pub want: Resources,
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn unique_high_roll_wins() {
        let a = PlayerId::from("a");
        let b = PlayerId::from("b");
        let mut sel = FirstPlayerSelection::new(vec![a.clone(), b.clone()]);
        assert_eq!(sel.roll(a.clone(), 3), Rollout::Waiting);
        assert_eq!(sel.roll(b.clone(), 5), Rollout::Winner(b));
    }
    #[test]
    fn ties_reroll_among_tied_only() {
        let a = PlayerId::from("a");
        let b = PlayerId::from("b");
        let c = PlayerId::from("c");
        let mut sel = FirstPlayerSelection::new(vec![a.clone(), b.clone(), c.clone()]);
        sel.roll(a.clone(), 6);
        sel.roll(b.clone(), 2);
        assert_eq!(sel.roll(c.clone(), 6), Rollout::Tied(vec![a.clone(), c.clone()]));
        assert!(!sel.may_roll(&b));
        assert!(sel.may_roll(&a));
        assert_eq!(sel.round(), 2);
        sel.roll(c.clone(), 1);
        assert_eq!(sel.roll(a.clone(), 4), Rollout::Winner(a));
    }
    #[test]
    fn withdrawal_can_settle_the_round() {
        let a = PlayerId::from("a");
        let b = PlayerId::from("b");
        let c = PlayerId::from("c");
        let mut sel = FirstPlayerSelection::new(vec![a.clone(), b.clone(), c.clone()]);
        sel.roll(a.clone(), 2);
        sel.roll(b.clone(), 4);
        assert_eq!(sel.withdraw(&c), Rollout::Winner(b));
        let mut sel = FirstPlayerSelection::new(vec![a.clone(), c.clone()]);
        assert_eq!(sel.withdraw(&c), Rollout::Winner(a));
    }
    #[test]
    fn die_bounds() {
        assert!(!FirstPlayerSelection::is_valid(0));
        assert!(FirstPlayerSelection::is_valid(6));
        assert!(!FirstPlayerSelection::is_valid(7));
    }
}
