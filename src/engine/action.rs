use super::*;
use crate::board::*;
use serde::Deserialize;
use serde::Serialize;

/// A discrete, typed player intent.
///
/// The acting player travels alongside the action (see
/// [`Reducer::apply`]) rather than inside it, matching the
/// `{action, playerId}` envelope on the wire.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Action {
    /// Draft a starting bonus (3+ players).
    SelectResource { resource: ResourceKind },
    /// Submit a die roll for first seat.
    RollForFirst { roll: u8 },
    /// Return one evicted battalion to the board for free.
    PlaceEvicted { slot: Slot },
    /// Pick an answer to the current prompt.
    Answer { option: usize },
    UsePower { power: PowerUse },
    BuyCard { index: usize },
    ActivateElite { elite: Elite },
    ProposeTrade {
        to: PlayerId,
        give: Resources,
        want: Resources,
    },
    RespondTrade { accept: bool },
    CancelTrade,
    EndActions,
    Deploy { slot: Slot },
    EndDeployment,
    Redeploy { from: Slot, to: Slot },
    EndRedeployment,
    PassTurn,
    /// Leave the game for good; the seat stays but is skipped.
    Depart,
}

impl Action {
    /// Phases in which this action may be taken at all.
    pub fn phase(&self) -> Option<Phase> {
        match self {
            Self::SelectResource { .. } => Some(Phase::ResourceSelection),
            Self::RollForFirst { .. } => Some(Phase::FirstPlayerSelection),
            Self::PlaceEvicted { .. } => Some(Phase::PlaceEvicted),
            Self::Answer { .. } => Some(Phase::Answering),
            Self::UsePower { .. }
            | Self::BuyCard { .. }
            | Self::ActivateElite { .. }
            | Self::ProposeTrade { .. }
            | Self::RespondTrade { .. }
            | Self::CancelTrade
            | Self::EndActions => Some(Phase::Action),
            Self::Deploy { .. } | Self::EndDeployment => Some(Phase::Deployment),
            Self::Redeploy { .. } | Self::EndRedeployment => Some(Phase::Redeployment),
            Self::PassTurn => Some(Phase::EndTurn),
            Self::Depart => None,
        }
    }
    /// Actions any participant may take, not only the active player.
    pub fn is_shared(&self) -> bool {
        matches!(
            self,
            Self::SelectResource { .. }
                | Self::RollForFirst { .. }
                | Self::RespondTrade { .. }
                | Self::Depart
        )
    }
    pub fn label(&self) -> &'static str {
        match self {
            Self::SelectResource { .. } => "SelectResource",
            Self::RollForFirst { .. } => "RollForFirst",
            Self::PlaceEvicted { .. } => "PlaceEvicted",
            Self::Answer { .. } => "Answer",
            Self::UsePower { .. } => "UsePower",
            Self::BuyCard { .. } => "BuyCard",
            Self::ActivateElite { .. } => "ActivateElite",
            Self::ProposeTrade { .. } => "ProposeTrade",
            Self::RespondTrade { .. } => "RespondTrade",
            Self::CancelTrade => "CancelTrade",
            Self::EndActions => "EndActions",
            Self::Deploy { .. } => "Deploy",
            Self::EndDeployment => "EndDeployment",
            Self::Redeploy { .. } => "Redeploy",
            Self::EndRedeployment => "EndRedeployment",
            Self::PassTurn => "PassTurn",
            Self::Depart => "Depart",
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.label())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    #[test]
    fn wire_shape_is_kind_tagged() {
        let json = serde_json::to_value(Action::Deploy {
            slot: Slot::new(2, 3),
        })
        .unwrap();
        assert_eq!(json["kind"], "deploy");
        assert_eq!(json["slot"]["zone"], 2);
        assert_eq!(json["slot"]["index"], 3);
    }
    #[test]
    fn power_use_nests_under_power() {
        let action = Action::UsePower {
            power: PowerUse::Evict {
                slot: Slot::new(0, 1),
            },
        };
        let json = serde_json::to_value(&action).unwrap();
        assert_eq!(json["kind"], "use_power");
        assert_eq!(json["power"]["name"], "evict");
        let back = serde_json::from_value::<Action>(json).unwrap();
        assert_eq!(back, action);
    }
    #[test]
    fn unit_variants_parse() {
        let action = serde_json::from_str::<Action>(r#"{"kind":"pass_turn"}"#).unwrap();
        assert_eq!(action, Action::PassTurn);
        assert!(serde_json::from_str::<Action>(r#"{"kind":"fly"}"#).is_err());
    }
}
