use super::*;
use crate::board::*;
use crate::*;

/// Base price of putting a battalion on the board.
pub const DEPLOY_COST: Resources = Resources::new(1, 1, 0, 0);
/// Extra price for a volatile slot.
pub const VOLATILE_SURCHARGE: Resources = Resources::new(0, 0, 1, 0);

/// Outcome of [`Reducer::reduce`].
///
/// `changed` is false exactly when the action was rejected, in which case
/// `state` is an untouched copy of the input.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transition {
    pub state: GameState,
    pub changed: bool,
}

/// Pure transition function `(state, player, action) -> state`.
///
/// Every replica runs the same reducer over the same inputs, so nothing in
/// here reads a clock, an RNG, or anything outside the state and the catalog.
/// The version counter is left alone; the sync layer owns it.
#[derive(Clone, Copy)]
pub struct Reducer<'c> {
    catalog: &'c dyn Catalog,
}

impl Default for Reducer<'static> {
    fn default() -> Self {
        Self { catalog: &Standard }
    }
}

impl<'c> Reducer<'c> {
    pub fn new(catalog: &'c dyn Catalog) -> Self {
        Self { catalog }
    }
    pub fn catalog(&self) -> &'c dyn Catalog {
        self.catalog
    }

    /// Applies `action` on behalf of `actor`, or says why it cannot.
    pub fn apply(
        &self,
        state: &GameState,
        actor: &PlayerId,
        action: &Action,
    ) -> Result<GameState, Rejection> {
        self.entitle(state, actor, action)?;
        let mut next = state.clone();
        match action {
            Action::SelectResource { resource } => self.select(&mut next, actor, *resource),
            Action::RollForFirst { roll } => self.roll(&mut next, actor, *roll),
            Action::PlaceEvicted { slot } => self.place(&mut next, actor, *slot),
            Action::Answer { option } => self.answer(&mut next, actor, *option),
            Action::UsePower { power } => self.power(&mut next, actor, *power),
            Action::BuyCard { index } => self.buy(&mut next, actor, *index),
            Action::ActivateElite { elite } => self.activate(&mut next, actor, *elite),
            Action::ProposeTrade { to, give, want } => {
                self.propose(&mut next, actor, to, *give, *want)
            }
            Action::RespondTrade { accept } => self.respond(&mut next, actor, *accept),
            Action::CancelTrade => self.cancel(&mut next, actor),
            Action::EndActions => self.end_actions(&mut next, actor),
            Action::Deploy { slot } => self.deploy(&mut next, actor, *slot),
            Action::EndDeployment => self.end_deployment(&mut next, actor),
            Action::Redeploy { from, to } => self.redeploy(&mut next, actor, *from, *to),
            Action::EndRedeployment => self.end_redeployment(&mut next, actor),
            Action::PassTurn => self.pass(&mut next, actor),
            Action::Depart => self.depart(&mut next, actor),
        }?;
        next.check_game_over();
        Ok(next)
    }

    /// Like [`Reducer::apply`], but folds a rejection into an unchanged state.
    pub fn reduce(&self, state: &GameState, actor: &PlayerId, action: &Action) -> Transition {
        match self.apply(state, actor, action) {
            Ok(state) => Transition {
                state,
                changed: true,
            },
            Err(why) => {
                log::debug!("[reducer] {} {} ignored: {}", actor, action, why);
                Transition {
                    state: state.clone(),
                    changed: false,
                }
            }
        }
    }

    /// Who may take which action, and when.
    fn entitle(&self, state: &GameState, actor: &PlayerId, action: &Action) -> Result<(), Rejection> {
        let player = state.player(actor).ok_or(Rejection::UnknownPlayer)?;
        if !player.is_active() {
            return Err(Rejection::Departed);
        }
        if state.phase().is_terminal() {
            return Err(Rejection::WrongPhase(state.phase()));
        }
        if action.phase().is_some_and(|p| p != state.phase()) {
            return Err(Rejection::WrongPhase(state.phase()));
        }
        if !action.is_shared() {
            return match state.active_player_id() == Some(actor) {
                true => Ok(()),
                false => Err(Rejection::NotYourTurn),
            };
        }
        match action {
            Action::SelectResource { .. } => state
                .resource_selection()
                .is_none_or(|s| !s.has_picked(actor))
                .then_some(())
                .ok_or(Rejection::AlreadyDecided),
            Action::RollForFirst { .. } => state
                .first_player_selection()
                .is_some_and(|s| s.may_roll(actor))
                .then_some(())
                .ok_or(Rejection::AlreadyDecided),
            Action::RespondTrade { .. } => match state.trade_offer() {
                None => Err(Rejection::NoTrade),
                Some(offer) if &offer.to != actor => Err(Rejection::NotTradeTarget),
                Some(_) => Ok(()),
            },
            _ => Ok(()),
        }
    }
}

// ============================================================================
// PRE-GAME
// ============================================================================
impl Reducer<'_> {
    fn select(&self, state: &mut GameState, actor: &PlayerId, kind: ResourceKind) -> Result<(), Rejection> {
        seat(state, actor)?.gain(Resources::single(kind, DRAFT_BONUS));
        state.note(Some(actor), format!("{} drafted {}", who(state, actor), kind));
        let seats = state.active_seats();
        let selection = state.resource_selection.get_or_insert_with(Default::default);
        selection.pick(actor.clone(), kind);
        if selection.is_complete(seats.iter()) {
            state.enter_first_player_selection();
        }
        Ok(())
    }

    fn roll(&self, state: &mut GameState, actor: &PlayerId, roll: u8) -> Result<(), Rejection> {
        if !FirstPlayerSelection::is_valid(roll) {
            return Err(Rejection::InvalidRoll(roll));
        }
        let rollout = state
            .first_player_selection
            .as_mut()
            .ok_or(Rejection::WrongPhase(Phase::FirstPlayerSelection))?
            .roll(actor.clone(), roll);
        state.note(Some(actor), format!("{} rolled {}", who(state, actor), roll));
        self.settle_rollout(state, rollout);
        Ok(())
    }

    fn settle_rollout(&self, state: &mut GameState, rollout: Rollout) {
        match rollout {
            Rollout::Waiting => {}
            Rollout::Tied(tied) => {
                let names = tied.iter().map(|p| who(state, p)).collect::<Vec<_>>();
                state.note(None, format!("Tie between {}; rolling again", names.join(", ")));
            }
            Rollout::Winner(first) => {
                state.note(None, format!("{} goes first", who(state, &first)));
                state.enter_first_turn(first, self.catalog);
            }
        }
    }
}

// ============================================================================
// TURN OPENING
// ============================================================================
impl Reducer<'_> {
    fn place(&self, state: &mut GameState, actor: &PlayerId, slot: Slot) -> Result<(), Rejection> {
        let zone = state
            .zone(slot.zone)
            .filter(|z| z.contains(slot.index))
            .ok_or(Rejection::NoSuchSlot(slot))?;
        if !zone.is_empty(slot.index) {
            return Err(Rejection::SlotTaken(slot));
        }
        if zone.is_volatile(slot.index) {
            return Err(Rejection::Volatile(slot));
        }
        let player = seat(state, actor)?;
        if player.evicted() == 0 {
            return Err(Rejection::NoEvicted);
        }
        player.redeem();
        let remaining = player.evicted();
        state.note(Some(actor), format!("{} returned a battalion to {}", who(state, actor), slot));
        self.occupy(state, slot, actor.clone());
        if remaining == 0 || !state.has_open_stable_slot() {
            state.enter_answering(self.catalog);
        }
        Ok(())
    }

    fn answer(&self, state: &mut GameState, actor: &PlayerId, option: usize) -> Result<(), Rejection> {
        let answer = state
            .prompt()
            .and_then(|id| self.catalog.prompt(id))
            .and_then(|prompt| prompt.answers.get(option))
            .ok_or(Rejection::InvalidOption(option))?;
        let player = seat(state, actor)?;
        player.advance(answer.ideology);
        let tracks = player.tracks();
        let trickle = Ideology::ALL
            .into_iter()
            .filter(|i| tracks.at_least(*i, PASSIVE_LEVEL))
            .fold(Resources::empty(), |sum, i| {
                sum.plus(Resources::single(i.resource(), 1))
            });
        let bonus = match player.active_elite().map(patronage) {
            Some(Patronage::AnswerBonus(r)) => r,
            _ => Resources::empty(),
        };
        player.gain(answer.reward.plus(trickle).plus(bonus));
        state.note(
            Some(actor),
            format!("{} answered \"{}\" ({} +1)", who(state, actor), answer.label, answer.ideology),
        );
        self.promote(state, actor);
        state.prompt = None;
        state.phase = Phase::Action;
        Ok(())
    }
}

// ============================================================================
// ACTION PHASE
// ============================================================================
impl Reducer<'_> {
    fn power(&self, state: &mut GameState, actor: &PlayerId, used: PowerUse) -> Result<(), Rejection> {
        let power = used.power();
        let player = state.player(actor).ok_or(Rejection::UnknownPlayer)?;
        if !power.is_unlocked(&player.tracks()) {
            return Err(Rejection::PowerLocked(power));
        }
        if !state.power_usage().can_use(power) {
            return Err(Rejection::PowerSpent(power));
        }
        let cost = match used {
            PowerUse::Lobby { give, get } if give == get => return Err(Rejection::BadTrade),
            PowerUse::Lobby { give, .. } => Resources::single(give, 2),
            _ => power.cost(),
        };
        if !player.resources().affords(&cost) {
            return Err(Rejection::CannotAfford(cost));
        }
        if let PowerUse::Evict { slot } | PowerUse::Purge { slot } | PowerUse::Convert { slot } = used {
            target(state, actor, slot, power == Power::Purge)?;
        }
        seat(state, actor)?.spend(cost);
        state.power_usage.spend(power);
        let name = who(state, actor);
        match used {
            PowerUse::Recruit => seat(state, actor)?.enlist(1),
            PowerUse::Windfall => seat(state, actor)?.gain(Resources::new(2, 0, 0, 0)),
            PowerUse::Canvass => seat(state, actor)?.gain(Resources::new(0, 0, 1, 1)),
            PowerUse::Lobby { get, .. } => seat(state, actor)?.gain(Resources::single(get, 1)),
            PowerUse::Evict { slot } | PowerUse::Purge { slot } => {
                let (unit, shifts) = Control::new(&mut state.zones[slot.zone.0]).vacate(slot.index);
                if let Some(owner) = unit {
                    seat(state, &owner)?.evict();
                }
                state.note(Some(actor), format!("{} used {} on {}", name, power, slot));
                chronicle(state, slot.zone, shifts);
                return Ok(());
            }
            PowerUse::Convert { slot } => {
                let (_, shifts) =
                    Control::new(&mut state.zones[slot.zone.0]).convert(slot.index, actor.clone());
                state.note(Some(actor), format!("{} used {} on {}", name, power, slot));
                chronicle(state, slot.zone, shifts);
                return Ok(());
            }
        }
        state.note(Some(actor), format!("{} used {}", name, power));
        Ok(())
    }

    fn buy(&self, state: &mut GameState, actor: &PlayerId, index: usize) -> Result<(), Rejection> {
        if state.power_usage().purchases() >= PURCHASE_LIMIT {
            return Err(Rejection::PurchasesSpent);
        }
        let id = *state.shop_row().get(index).ok_or(Rejection::NoSuchCard(index))?;
        let card = self.catalog.card(id).ok_or(Rejection::NoSuchCard(index))?;
        let player = seat(state, actor)?;
        if !player.resources().affords(&card.cost) {
            return Err(Rejection::CannotAfford(card.cost));
        }
        player.spend(card.cost);
        player.acquire(id);
        match card.perk {
            Perk::Battalions(n) => player.enlist(n),
            Perk::Resources(r) => player.gain(r),
            Perk::Track(ideology) => player.advance(ideology),
        }
        state.power_usage.purchase();
        state.shop_row.remove(index);
        state.note(Some(actor), format!("{} bought {}", who(state, actor), card.name));
        if let Perk::Track(_) = card.perk {
            self.promote(state, actor);
        }
        Ok(())
    }

    fn activate(&self, state: &mut GameState, actor: &PlayerId, elite: Elite) -> Result<(), Rejection> {
        let player = seat(state, actor)?;
        if !player.elites().contains(&elite) {
            return Err(Rejection::EliteLocked(elite));
        }
        player.activate(elite);
        state.note(Some(actor), format!("{} now backs the {}", who(state, actor), elite));
        Ok(())
    }

    fn propose(
        &self,
        state: &mut GameState,
        actor: &PlayerId,
        to: &PlayerId,
        give: Resources,
        want: Resources,
    ) -> Result<(), Rejection> {
        if state.trade_offer().is_some() {
            return Err(Rejection::TradePending);
        }
        if to == actor || give.is_empty() || want.is_empty() {
            return Err(Rejection::BadTrade);
        }
        match state.player(to) {
            None => return Err(Rejection::UnknownPlayer),
            Some(p) if !p.is_active() => return Err(Rejection::Departed),
            Some(_) => {}
        }
        if !seat(state, actor)?.resources().affords(&give) {
            return Err(Rejection::CannotAfford(give));
        }
        state.trade_offer = Some(TradeOffer {
            from: actor.clone(),
            to: to.clone(),
            give,
            want,
        });
        let message = format!("{} offers {} {} for {}", who(state, actor), who(state, to), give, want);
        state.note(Some(actor), message);
        Ok(())
    }

    fn respond(&self, state: &mut GameState, actor: &PlayerId, accept: bool) -> Result<(), Rejection> {
        let offer = state.trade_offer.clone().ok_or(Rejection::NoTrade)?;
        if !accept {
            state.trade_offer = None;
            state.note(Some(actor), format!("{} declined the trade", who(state, actor)));
            return Ok(());
        }
        if !seat(state, &offer.to)?.resources().affords(&offer.want) {
            return Err(Rejection::CannotAfford(offer.want));
        }
        if !seat(state, &offer.from)?.resources().affords(&offer.give) {
            return Err(Rejection::CannotAfford(offer.give));
        }
        seat(state, &offer.from)?.spend(offer.give);
        seat(state, &offer.to)?.spend(offer.want);
        seat(state, &offer.from)?.gain(offer.want);
        seat(state, &offer.to)?.gain(offer.give);
        state.trade_offer = None;
        state.note(Some(actor), format!("{} accepted the trade", who(state, actor)));
        Ok(())
    }

    fn cancel(&self, state: &mut GameState, actor: &PlayerId) -> Result<(), Rejection> {
        state.trade_offer.take().ok_or(Rejection::NoTrade)?;
        state.note(Some(actor), format!("{} withdrew the trade", who(state, actor)));
        Ok(())
    }

    fn end_actions(&self, state: &mut GameState, actor: &PlayerId) -> Result<(), Rejection> {
        state.trade_offer = None;
        state.phase = Phase::Deployment;
        state.note(Some(actor), format!("{} moves to deployment", who(state, actor)));
        Ok(())
    }
}

// ============================================================================
// BOARD PHASES
// ============================================================================
impl Reducer<'_> {
    fn deploy(&self, state: &mut GameState, actor: &PlayerId, slot: Slot) -> Result<(), Rejection> {
        let zone = state
            .zone(slot.zone)
            .filter(|z| z.contains(slot.index))
            .ok_or(Rejection::NoSuchSlot(slot))?;
        if !zone.is_empty(slot.index) {
            return Err(Rejection::SlotTaken(slot));
        }
        let volatile = zone.is_volatile(slot.index);
        if volatile && zone.majority_owner() == Some(actor) {
            return Err(Rejection::SettledVolatile(slot));
        }
        let player = seat(state, actor)?;
        if player.battalions() == 0 {
            return Err(Rejection::NoBattalions);
        }
        let cost = match volatile {
            true => DEPLOY_COST.plus(VOLATILE_SURCHARGE),
            false => DEPLOY_COST,
        };
        let cost = match player.active_elite().map(patronage) {
            Some(Patronage::DeployDiscount(off)) => cost.spend(off),
            _ => cost,
        };
        if !player.resources().affords(&cost) {
            return Err(Rejection::CannotAfford(cost));
        }
        player.spend(cost);
        player.deploy();
        state.note(Some(actor), format!("{} deployed to {}", who(state, actor), slot));
        self.occupy(state, slot, actor.clone());
        Ok(())
    }

    fn end_deployment(&self, state: &mut GameState, actor: &PlayerId) -> Result<(), Rejection> {
        state.phase = Phase::Redeployment;
        state.note(Some(actor), format!("{} moves to redeployment", who(state, actor)));
        Ok(())
    }

    fn redeploy(&self, state: &mut GameState, actor: &PlayerId, from: Slot, to: Slot) -> Result<(), Rejection> {
        let player = state.player(actor).ok_or(Rejection::UnknownPlayer)?;
        let extra = match player.active_elite().map(patronage) {
            Some(Patronage::ExtraRedeploys(n)) => n,
            _ => 0,
        };
        if state.power_usage().redeployments() >= REDEPLOY_LIMIT + extra {
            return Err(Rejection::RedeploysSpent);
        }
        let mobilize = Power::Mobilize.is_unlocked(&player.tracks())
            && state.power_usage().can_use(Power::Mobilize);
        let plan = check_move(state.zones(), actor, from, to, mobilize)?;
        let (unit, out) = Control::new(&mut state.zones[from.zone.0]).vacate(from.index);
        let unit = unit.ok_or(Rejection::SlotEmpty(from))?;
        let into = Control::new(&mut state.zones[to.zone.0]).occupy(to.index, unit.clone());
        state.power_usage.redeploy();
        if plan.unlocks {
            state.power_usage.spend(Power::Mobilize);
        }
        let message = format!("{} moved {}'s unit from {} to {}", who(state, actor), who(state, &unit), from, to);
        state.note(Some(actor), message);
        chronicle(state, from.zone, out);
        chronicle(state, to.zone, into);
        Ok(())
    }

    fn end_redeployment(&self, state: &mut GameState, actor: &PlayerId) -> Result<(), Rejection> {
        state.note(Some(actor), format!("{} ends the turn", who(state, actor)));
        state.enter_end_turn();
        Ok(())
    }

    fn pass(&self, state: &mut GameState, actor: &PlayerId) -> Result<(), Rejection> {
        state.note(Some(actor), format!("{} passes", who(state, actor)));
        state.pass_turn(self.catalog);
        Ok(())
    }

    fn depart(&self, state: &mut GameState, actor: &PlayerId) -> Result<(), Rejection> {
        seat(state, actor)?.depart();
        state.note(Some(actor), format!("{} left the game", who(state, actor)));
        state.succeed_first_player(actor);
        if state
            .trade_offer()
            .is_some_and(|o| &o.from == actor || &o.to == actor)
        {
            state.trade_offer = None;
        }
        if state.active_seats().len() < MIN_PLAYERS {
            return Ok(());
        }
        match state.phase() {
            Phase::ResourceSelection => {
                let seats = state.active_seats();
                if state
                    .resource_selection()
                    .is_some_and(|s| s.is_complete(seats.iter()))
                {
                    state.enter_first_player_selection();
                }
            }
            Phase::FirstPlayerSelection => {
                if let Some(selection) = state.first_player_selection.as_mut() {
                    let rollout = selection.withdraw(actor);
                    self.settle_rollout(state, rollout);
                }
            }
            _ if state.active_player_id() == Some(actor) => state.pass_turn(self.catalog),
            _ => {}
        }
        Ok(())
    }
}

// ============================================================================
// SHARED STEPS
// ============================================================================
impl Reducer<'_> {
    /// Puts a unit into an already validated empty slot.
    fn occupy(&self, state: &mut GameState, slot: Slot, player: PlayerId) {
        let shifts = Control::new(&mut state.zones[slot.zone.0]).occupy(slot.index, player);
        chronicle(state, slot.zone, shifts);
    }

    /// Unlocks every elite the actor's tracks now qualify for.
    fn promote(&self, state: &mut GameState, actor: &PlayerId) {
        let Some(player) = state.player_mut(actor) else {
            return;
        };
        let fresh = qualifying(&player.tracks())
            .into_iter()
            .filter(|e| player.unlock(*e))
            .collect::<Vec<_>>();
        for elite in fresh {
            state.note(Some(actor), format!("{} unlocked the {}", who(state, actor), elite));
        }
    }
}

fn seat<'s>(state: &'s mut GameState, id: &PlayerId) -> Result<&'s mut Player, Rejection> {
    state.player_mut(id).ok_or(Rejection::UnknownPlayer)
}

fn who(state: &GameState, id: &PlayerId) -> String {
    state
        .player(id)
        .map(|p| p.name().to_string())
        .unwrap_or_else(|| id.to_string())
}

/// Validates the target of Evict, Purge, or Convert.
fn target(state: &GameState, actor: &PlayerId, slot: Slot, locked_ok: bool) -> Result<(), Rejection> {
    let zone = state
        .zone(slot.zone)
        .filter(|z| z.contains(slot.index))
        .ok_or(Rejection::NoSuchSlot(slot))?;
    match zone.occupant(slot.index) {
        None => Err(Rejection::SlotEmpty(slot)),
        Some(p) if p == actor => Err(Rejection::OwnUnit(slot)),
        Some(_) if zone.is_volatile(slot.index) => Err(Rejection::Volatile(slot)),
        Some(_) if zone.is_locked(slot.index) && !locked_ok => Err(Rejection::Locked(slot)),
        Some(_) => Ok(()),
    }
}

fn chronicle(state: &mut GameState, zone: ZoneId, shifts: Vec<Shift>) {
    let name = state
        .zone(zone)
        .map(|z| z.name().to_string())
        .unwrap_or_else(|| zone.to_string());
    for shift in shifts {
        match shift {
            Shift::Formed(p) => {
                let message = format!("{} took control of {}", who(state, &p), name);
                state.note(Some(&p), message);
            }
            Shift::Lost(p) => {
                let message = format!("{} lost control of {}", who(state, &p), name);
                state.note(Some(&p), message);
            }
            Shift::Steady => {}
        }
    }
}
