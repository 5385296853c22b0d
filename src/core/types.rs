//! Core type definitions used throughout the codebase

use glam::Vec3;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Simulation time in seconds
pub type Seconds = f32;

/// Identifier of a combatant within one duel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
pub struct CombatantId(pub u32);

impl CombatantId {
    pub fn new(id: u32) -> Self {
        Self(id)
    }
}

impl fmt::Display for CombatantId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

/// Team tag; combatants on different teams are hostile to each other
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Team {
    Red,
    Blue,
}

impl Team {
    pub fn opponent(&self) -> Team {
        match self {
            Team::Red => Team::Blue,
            Team::Blue => Team::Red,
        }
    }

    pub fn is_hostile_to(&self, other: Team) -> bool {
        *self != other
    }
}

/// Physics layer masks used by sensing queries
pub mod layers {
    pub const GROUND: u32 = 1 << 0;
    pub const OBSTACLE: u32 = 1 << 1;
    pub const ALL: u32 = GROUND | OBSTACLE;
}

/// Distance ignoring the vertical axis
pub fn horizontal_distance(a: Vec3, b: Vec3) -> f32 {
    let dx = a.x - b.x;
    let dz = a.z - b.z;
    (dx * dx + dz * dz).sqrt()
}
