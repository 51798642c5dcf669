use crate::board::*;

/// Change in a zone's majority produced by a placement or removal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Shift {
    Formed(PlayerId),
    Lost(PlayerId),
    Steady,
}

/// Zone control: the only code that moves units in or out of slots.
///
/// Every mutation ends with [`Control::settle`], which restores the majority
/// invariant: when a zone has an owner, exactly `majority_required` of the
/// owner's slots are locked; volatile slots stay locked for as long as they
/// are occupied.
pub struct Control<'z> {
    zone: &'z mut Zone,
}

impl<'z> Control<'z> {
    pub fn new(zone: &'z mut Zone) -> Self {
        Self { zone }
    }

    /// Puts `player` into an empty slot.
    pub fn occupy(&mut self, index: usize, player: PlayerId) -> Vec<Shift> {
        debug_assert!(self.zone.is_empty(index), "occupy on a filled slot");
        self.zone.put(index, player);
        self.settle()
    }

    /// Removes the unit in a non-volatile slot.
    pub fn vacate(&mut self, index: usize) -> (Option<PlayerId>, Vec<Shift>) {
        debug_assert!(!self.zone.is_volatile(index), "volatile slots never unlock");
        let unit = self.zone.take(index);
        (unit, self.settle())
    }

    /// Swaps the occupant of a non-volatile slot for `player`.
    pub fn convert(&mut self, index: usize, player: PlayerId) -> (Option<PlayerId>, Vec<Shift>) {
        let (prior, mut shifts) = self.vacate(index);
        shifts.extend(self.occupy(index, player));
        (prior, shifts)
    }

    /// Re-evaluates ownership after the slot contents changed.
    pub fn settle(&mut self) -> Vec<Shift> {
        let mut shifts = Vec::new();
        let required = self.zone.majority_required();
        if let Some(owner) = self.zone.majority_owner().cloned() {
            if self.zone.count(&owner) < required {
                self.zone.set_owner(None);
                self.zone.unlock_stable();
                shifts.push(Shift::Lost(owner));
            } else if self.zone.locked_by(&owner) < required {
                self.form(&owner);
            }
        }
        if self.zone.majority_owner().is_none() {
            let leader = self
                .zone
                .counts()
                .into_iter()
                .find(|(_, n)| *n >= required)
                .map(|(p, _)| p.clone());
            if let Some(owner) = leader {
                self.form(&owner);
                shifts.push(Shift::Formed(owner));
            }
        }
        if shifts.is_empty() {
            shifts.push(Shift::Steady);
        }
        shifts
    }

    fn form(&mut self, owner: &PlayerId) {
        let required = self.zone.majority_required();
        let order = self.zone.fill_order(owner);
        let fixed = order.iter().filter(|i| self.zone.is_volatile(**i)).count();
        order
            .iter()
            .filter(|i| !self.zone.is_volatile(**i))
            .take(required.saturating_sub(fixed))
            .copied()
            .collect::<Vec<_>>()
            .into_iter()
            .for_each(|i| self.zone.lock(i));
        self.zone.set_owner(Some(owner.clone()));
        debug_assert_eq!(self.zone.locked_by(owner), required);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn zone(capacity: usize, volatile: &[usize]) -> Zone {
        Zone::new(0, "test", capacity, volatile, &[]).unwrap()
    }

    #[test]
    fn sixth_unit_of_eleven_forms_majority() {
        let mut z = zone(11, &[]);
        let p = PlayerId::from("p");
        let q = PlayerId::from("q");
        for i in 0..5 {
            Control::new(&mut z).occupy(i, p.clone());
        }
        Control::new(&mut z).occupy(5, q.clone());
        assert!(z.majority_owner().is_none());
        let shifts = Control::new(&mut z).occupy(6, p.clone());
        assert_eq!(shifts, vec![Shift::Formed(p.clone())]);
        assert_eq!(z.majority_owner(), Some(&p));
        assert_eq!(z.locked_by(&p), 6);
        assert_eq!(z.locked_by(&q), 0);
    }

    #[test]
    fn surplus_stays_unlocked_first_filled_locked() {
        let mut z = zone(5, &[]);
        let p = PlayerId::from("p");
        for i in [4, 2, 0] {
            Control::new(&mut z).occupy(i, p.clone());
        }
        Control::new(&mut z).occupy(1, p.clone());
        assert!(z.is_locked(4) && z.is_locked(2) && z.is_locked(0));
        assert!(!z.is_locked(1));
        assert_eq!(z.locked_by(&p), 3);
    }

    #[test]
    fn volatile_counts_toward_majority_locks() {
        let mut z = zone(5, &[4]);
        let p = PlayerId::from("p");
        Control::new(&mut z).occupy(0, p.clone());
        Control::new(&mut z).occupy(4, p.clone());
        assert!(z.is_locked(4));
        assert!(!z.is_locked(0));
        Control::new(&mut z).occupy(1, p.clone());
        Control::new(&mut z).occupy(2, p.clone());
        assert_eq!(z.locked_by(&p), 3);
        assert!(z.is_locked(4) && z.is_locked(0) && z.is_locked(1));
        assert!(!z.is_locked(2));
    }

    #[test]
    fn losing_majority_unlocks_stable_slots() {
        let mut z = zone(5, &[4]);
        let p = PlayerId::from("p");
        for i in [4, 0, 1] {
            Control::new(&mut z).occupy(i, p.clone());
        }
        assert_eq!(z.majority_owner(), Some(&p));
        let (unit, shifts) = Control::new(&mut z).vacate(0);
        assert_eq!(unit, Some(p.clone()));
        assert_eq!(shifts, vec![Shift::Lost(p.clone())]);
        assert!(z.majority_owner().is_none());
        assert!(!z.is_locked(1));
        assert!(z.is_locked(4));
    }

    #[test]
    fn removing_a_locked_unit_relocks_surplus() {
        let mut z = zone(5, &[]);
        let p = PlayerId::from("p");
        for i in 0..4 {
            Control::new(&mut z).occupy(i, p.clone());
        }
        assert!(!z.is_locked(3));
        let (_, shifts) = Control::new(&mut z).vacate(0);
        assert_eq!(shifts, vec![Shift::Steady]);
        assert_eq!(z.majority_owner(), Some(&p));
        assert!(z.is_locked(1) && z.is_locked(2) && z.is_locked(3));
        assert_eq!(z.locked_by(&p), 3);
    }

    #[test]
    fn tie_never_grants_majority() {
        let mut z = zone(6, &[]);
        let p = PlayerId::from("p");
        let q = PlayerId::from("q");
        for i in 0..3 {
            Control::new(&mut z).occupy(i, p.clone());
            Control::new(&mut z).occupy(i + 3, q.clone());
        }
        assert!(z.majority_owner().is_none());
        assert_eq!(z.locked_by(&p) + z.locked_by(&q), 0);
    }

    #[test]
    fn conversion_can_flip_ownership() {
        let mut z = zone(5, &[]);
        let p = PlayerId::from("p");
        let q = PlayerId::from("q");
        Control::new(&mut z).occupy(0, p.clone());
        Control::new(&mut z).occupy(1, p.clone());
        Control::new(&mut z).occupy(2, p.clone());
        Control::new(&mut z).occupy(3, q.clone());
        Control::new(&mut z).occupy(4, q.clone());
        let (prior, shifts) = Control::new(&mut z).convert(0, q.clone());
        assert_eq!(prior, Some(p.clone()));
        assert!(shifts.contains(&Shift::Lost(p.clone())));
        assert!(shifts.contains(&Shift::Formed(q.clone())));
        assert_eq!(z.locked_by(&q), 3);
    }
}
