//! Target validation and nearest-hostile acquisition

use glam::Vec3;
use ordered_float::OrderedFloat;

use crate::arena::combatant::Combatant;
use crate::core::types::{CombatantId, Team};

/// Nearest alive hostile by Euclidean distance
///
/// Equidistant candidates resolve to the first one in roster order.
pub fn acquire_target<'a>(
    team: Team,
    position: Vec3,
    candidates: impl Iterator<Item = &'a Combatant>,
) -> Option<CombatantId> {
    candidates
        .filter(|c| c.is_alive() && team.is_hostile_to(c.team))
        .min_by_key(|c| OrderedFloat(position.distance(c.position())))
        .map(|c| c.id)
}

/// Is the candidate still worth fighting?
pub fn is_valid_target(team: Team, candidate: Option<&Combatant>) -> bool {
    candidate
        .map(|c| c.is_alive() && team.is_hostile_to(c.team))
        .unwrap_or(false)
}
