use super::*;
use crate::board::*;

/// Who may redeploy units into, out of, or through a zone.
///
/// Rights belong to the player with strictly more units than anyone else,
/// provided that count also reaches the zone's majority threshold. Exact ties
/// leave the zone without a rights holder.
pub fn rights_holder(zone: &Zone) -> Option<PlayerId> {
    let mut ranked = zone
        .counts()
        .into_iter()
        .map(|(p, n)| (n, p))
        .collect::<Vec<_>>();
    ranked.sort_by(|a, b| b.0.cmp(&a.0));
    let (lead, who) = ranked.first()?;
    let runner = ranked.get(1).map(|(n, _)| *n).unwrap_or(0);
    (*lead > runner && *lead >= zone.majority_required()).then(|| (*who).clone())
}

/// How a legal move was authorised.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Warrant {
    /// Mover holds rights in the origin zone.
    Origin,
    /// Mover holds rights in the destination zone.
    Destination,
}

/// A validated redeployment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Move {
    pub from: Slot,
    pub to: Slot,
    pub warrant: Warrant,
    /// The moved unit sits in a locked slot, which needs Mobilize.
    pub unlocks: bool,
}

/// Checks a redeployment of whatever unit sits in `from` to the empty `to`.
///
/// `mobilize` says whether the mover may still lift a locked unit this turn.
/// Any player's unit may be moved; only the mover's rights matter.
pub fn check_move(
    zones: &[Zone],
    mover: &PlayerId,
    from: Slot,
    to: Slot,
    mobilize: bool,
) -> Result<Move, Rejection> {
    let x = zones.get(from.zone.0).ok_or(Rejection::NoSuchSlot(from))?;
    let y = zones.get(to.zone.0).ok_or(Rejection::NoSuchSlot(to))?;
    if !x.contains(from.index) {
        return Err(Rejection::NoSuchSlot(from));
    }
    if !y.contains(to.index) {
        return Err(Rejection::NoSuchSlot(to));
    }
    if x.id() == y.id() || !x.adjacent().contains(&y.id()) {
        return Err(Rejection::NotAdjacent(x.id(), y.id()));
    }
    let via_x = rights_holder(x).as_ref() == Some(mover);
    let via_y = rights_holder(y).as_ref() == Some(mover);
    let warrant = match (via_x, via_y) {
        (_, true) => Warrant::Destination,
        (true, false) => Warrant::Origin,
        (false, false) => return Err(Rejection::NoRights),
    };
    let unit = x.occupant(from.index).ok_or(Rejection::SlotEmpty(from))?;
    if x.is_volatile(from.index) {
        return Err(Rejection::Volatile(from));
    }
    let unlocks = x.is_locked(from.index);
    if unlocks && !mobilize {
        return Err(Rejection::Locked(from));
    }
    if !y.is_empty(to.index) {
        return Err(Rejection::SlotTaken(to));
    }
    if y.is_volatile(to.index) {
        return Err(Rejection::Volatile(to));
    }
    if warrant == Warrant::Origin && unit == mover && x.count(mover) == 1 {
        return Err(Rejection::AbandonsRights(x.id()));
    }
    Ok(Move {
        from,
        to,
        warrant,
        unlocks,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn board() -> Vec<Zone> {
        vec![
            Zone::new(0, "x", 7, &[6], &[1]).unwrap(),
            Zone::new(1, "y", 7, &[], &[0, 2]).unwrap(),
            Zone::new(2, "w", 5, &[], &[1]).unwrap(),
        ]
    }

    fn fill(zone: &mut Zone, who: &PlayerId, slots: &[usize]) {
        for i in slots {
            Control::new(zone).occupy(*i, who.clone());
        }
    }

    #[test]
    fn tie_has_no_holder_until_tipped() {
        let mut zones = board();
        let p = PlayerId::from("p");
        let q = PlayerId::from("q");
        fill(&mut zones[1], &p, &[0, 1, 2]);
        fill(&mut zones[1], &q, &[3, 4, 5]);
        assert_eq!(rights_holder(&zones[1]), None);
        fill(&mut zones[1], &p, &[6]);
        assert_eq!(rights_holder(&zones[1]), Some(p));
    }

    #[test]
    fn plurality_below_threshold_has_no_holder() {
        let mut zones = board();
        let p = PlayerId::from("p");
        let q = PlayerId::from("q");
        fill(&mut zones[1], &p, &[0, 1, 2]);
        fill(&mut zones[1], &q, &[3]);
        assert_eq!(rights_holder(&zones[1]), None);
    }

    #[test]
    fn holder_may_move_opponent_units_out() {
        let mut zones = board();
        let p = PlayerId::from("p");
        let q = PlayerId::from("q");
        fill(&mut zones[0], &q, &[0]);
        fill(&mut zones[1], &p, &[0, 1, 2, 3]);
        let m = check_move(&zones, &p, Slot::new(0, 0), Slot::new(1, 4), false).unwrap();
        assert_eq!(m.warrant, Warrant::Destination);
        assert!(!m.unlocks);
    }

    #[test]
    fn no_rights_no_move() {
        let mut zones = board();
        let p = PlayerId::from("p");
        fill(&mut zones[0], &p, &[0]);
        assert_eq!(
            check_move(&zones, &p, Slot::new(0, 0), Slot::new(1, 0), false),
            Err(Rejection::NoRights)
        );
    }

    #[test]
    fn zones_must_border() {
        let mut zones = board();
        let p = PlayerId::from("p");
        fill(&mut zones[0], &p, &[0, 1, 2, 3]);
        assert_eq!(
            check_move(&zones, &p, Slot::new(0, 4), Slot::new(2, 0), false),
            Err(Rejection::NotAdjacent(ZoneId(0), ZoneId(2)))
        );
    }

    #[test]
    fn locked_units_need_mobilize() {
        let mut zones = board();
        let p = PlayerId::from("p");
        fill(&mut zones[0], &p, &[0, 1, 2, 3, 4]);
        assert!(zones[0].is_locked(0));
        assert_eq!(
            check_move(&zones, &p, Slot::new(0, 0), Slot::new(1, 0), false),
            Err(Rejection::Locked(Slot::new(0, 0)))
        );
        let m = check_move(&zones, &p, Slot::new(0, 0), Slot::new(1, 0), true).unwrap();
        assert!(m.unlocks);
        assert_eq!(
            check_move(&zones, &p, Slot::new(0, 4), Slot::new(1, 0), false)
                .map(|m| m.warrant),
            Ok(Warrant::Origin)
        );
    }

    #[test]
    fn volatile_slots_are_fixed() {
        let mut zones = board();
        let p = PlayerId::from("p");
        fill(&mut zones[1], &p, &[0, 1, 2, 3]);
        fill(&mut zones[0], &p, &[6]);
        assert_eq!(
            check_move(&zones, &p, Slot::new(0, 6), Slot::new(1, 5), false),
            Err(Rejection::Volatile(Slot::new(0, 6)))
        );
        assert_eq!(
            check_move(&zones, &p, Slot::new(1, 3), Slot::new(0, 6), false),
            Err(Rejection::SlotTaken(Slot::new(0, 6)))
        );
    }
}
