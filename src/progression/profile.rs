//! Persistent per-character growth

use serde::{Deserialize, Serialize};

use crate::combat::skills::{DASH, PARRY};

/// Everything a character keeps between duels
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Profile {
    /// Permanent stat deltas accumulated from level-ups
    pub bonus_health: f32,
    pub bonus_damage: f32,
    pub bonus_speed: f32,

    pub level: u32,
    pub xp: u32,
    pub xp_to_next: u32,

    /// Weapon catalog id
    pub weapon: String,
    pub skills: Vec<String>,
}

impl Default for Profile {
    fn default() -> Self {
        Self::new_default()
    }
}

impl Profile {
    /// The deterministic profile of a character nobody has saved yet
    pub fn new_default() -> Self {
        Self::starting(100)
    }

    /// Fresh level 1 profile with a custom first threshold
    pub fn starting(base_xp_to_next: u32) -> Self {
        Self {
            bonus_health: 0.0,
            bonus_damage: 0.0,
            bonus_speed: 0.0,
            level: 1,
            xp: 0,
            xp_to_next: base_xp_to_next.max(1),
            weapon: "fists".into(),
            skills: vec![DASH.to_string(), PARRY.to_string()],
        }
    }
}
