//! Disjoint borrows over the combatant list
//!
//! While one combatant ticks it holds `&mut` to itself and an `Others` view
//! of everyone else. Damage flows through `Others::get_mut`, so each target
//! has a single writer at a time.

use crate::arena::combatant::Combatant;
use crate::core::types::CombatantId;

pub struct Others<'a> {
    before: &'a mut [Combatant],
    after: &'a mut [Combatant],
}

impl<'a> Others<'a> {
    /// Everyone else, in roster order
    pub fn iter(&self) -> impl Iterator<Item = &Combatant> {
        self.before.iter().chain(self.after.iter())
    }

    pub fn get(&self, id: CombatantId) -> Option<&Combatant> {
        self.iter().find(|c| c.id == id)
    }

    pub fn get_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.before
            .iter_mut()
            .chain(self.after.iter_mut())
            .find(|c| c.id == id)
    }

    pub fn len(&self) -> usize {
        self.before.len() + self.after.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// Split the roster into the combatant at `index` and the rest
///
/// Panics if `index` is out of bounds, like slice indexing.
pub fn split_roster(all: &mut [Combatant], index: usize) -> (&mut Combatant, Others<'_>) {
    let (before, rest) = all.split_at_mut(index);
    let (me, after) = rest.split_at_mut(1);
    (&mut me[0], Others { before, after })
}
