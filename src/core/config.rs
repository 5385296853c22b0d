//! Arena configuration with documented constants
//!
//! All tunable numbers are collected here with explanations of their purpose
//! and how they interact. Loaded from TOML; every section falls back to its
//! defaults when omitted.

use serde::{Deserialize, Serialize};
use std::fs;
use std::path::Path;

use crate::combat::stats::BaseStats;
use crate::core::error::{ArenaError, Result};
use crate::core::types::Seconds;

/// Decision-making tunables for the AI state machine
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AiConfig {
    /// Extra distance beyond attack range before an attacker gives chase again
    ///
    /// Without this hysteresis a target hovering right at the edge of range
    /// makes the attacker flip between Attacking and Seeking every tick.
    pub engagement_buffer: f32,

    /// Health ratio at or below which the combatant disengages and retreats
    pub flee_threshold: f32,

    /// How far away from the threat a fleeing combatant aims to run
    pub flee_distance: f32,

    /// Minimum time between two path requests
    pub path_recompute_interval: Seconds,

    /// Radius of the ground probe under the feet
    pub grounded_radius: f32,

    /// Full interval between two jump decisions
    ///
    /// A jump blocked only by a low ceiling waits half of this instead.
    pub jump_cooldown: Seconds,

    /// Height advantage the target must have before jumping is considered
    pub jump_min_height: f32,

    /// Horizontal distance to the target below which jumping is considered
    pub jump_max_distance: f32,

    /// Clearance probed above the head before jumping
    pub jump_headroom: f32,

    /// Upward impulse applied by a tactical jump
    pub jump_impulse: f32,

    /// How long the victory celebration lasts before returning to Idle
    pub celebration_duration: Seconds,

    /// Per-tick chance of a celebratory hop while grounded
    pub celebration_jump_chance: f32,

    /// Upward impulse of a celebratory hop
    pub celebration_jump_impulse: f32,
}

impl Default for AiConfig {
    fn default() -> Self {
        Self {
            engagement_buffer: 0.75,
            flee_threshold: 0.25,
            flee_distance: 8.0,
            path_recompute_interval: 0.5,
            grounded_radius: 0.2,
            jump_cooldown: 2.0,
            jump_min_height: 1.0,
            jump_max_distance: 4.0,
            jump_headroom: 2.0,
            jump_impulse: 6.0,
            celebration_duration: 3.0,
            celebration_jump_chance: 0.02,
            celebration_jump_impulse: 4.0,
        }
    }
}

/// Combat resolution and resource tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Delay between death and removal from the simulation
    pub grace_delay: Seconds,

    /// Dash: invulnerable burst of movement
    pub dash_duration: Seconds,
    pub dash_cooldown: Seconds,
    pub dash_stamina_cost: f32,

    /// Parry: window during which an incoming hit is negated
    pub parry_window: Seconds,
    pub parry_cooldown: Seconds,
    pub parry_stamina_cost: f32,

    /// Stun applied to an attacker whose swing was parried
    pub parry_stun: Seconds,

    /// Fraction of incoming damage absorbed while blocking (0.0 to 1.0)
    pub block_reduction: f32,

    /// Stamina paid for every blocked hit; the block breaks if unpaid
    pub block_stamina_per_hit: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            grace_delay: 2.0,
            dash_duration: 0.25,
            dash_cooldown: 1.5,
            dash_stamina_cost: 25.0,
            parry_window: 0.3,
            parry_cooldown: 1.0,
            parry_stamina_cost: 15.0,
            parry_stun: 1.0,
            block_reduction: 0.6,
            block_stamina_per_hit: 10.0,
        }
    }
}

/// Experience and leveling tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct ProgressionConfig {
    /// XP threshold of a fresh level 1 profile
    pub base_xp_to_next: u32,

    /// Multiplier applied to the threshold after every level-up
    pub xp_growth: f32,

    /// Highest reachable level; also bounds the level-up loop
    pub level_cap: u32,

    /// Permanent stat increments granted by one upgrade
    pub health_per_level: f32,
    pub damage_per_level: f32,
    pub speed_per_level: f32,

    /// XP for winning a duel
    pub victory_xp: u32,

    /// Extra XP scaled by the survivor's remaining health ratio
    pub flawless_bonus: u32,
}

impl Default for ProgressionConfig {
    fn default() -> Self {
        Self {
            base_xp_to_next: 100,
            xp_growth: 1.5,
            level_cap: 50,
            health_per_level: 10.0,
            damage_per_level: 2.0,
            speed_per_level: 0.25,
            victory_xp: 100,
            flawless_bonus: 50,
        }
    }
}

/// Match orchestration tunables
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DuelConfig {
    /// Fixed simulation step
    pub tick_seconds: Seconds,

    /// Hold after the match is decided before control returns
    pub post_match_delay: Seconds,

    /// Distance between the two spawn points
    pub spawn_separation: f32,

    /// Hard time limit; the match is a draw when it runs out
    pub max_seconds: Seconds,
}

impl Default for DuelConfig {
    fn default() -> Self {
        Self {
            tick_seconds: 1.0 / 30.0,
            post_match_delay: 3.0,
            spawn_separation: 12.0,
            max_seconds: 180.0,
        }
    }
}

/// Complete arena configuration
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ArenaConfig {
    #[serde(default)]
    pub ai: AiConfig,
    #[serde(default)]
    pub combat: CombatConfig,
    #[serde(default)]
    pub progression: ProgressionConfig,
    #[serde(default)]
    pub duel: DuelConfig,
    /// Stats of an unleveled combatant before weapon and profile bonuses
    #[serde(default)]
    pub base_stats: BaseStats,
}

impl ArenaConfig {
    /// Parse a configuration from TOML text
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: ArenaConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let ai = &self.ai;
        if !(0.0..1.0).contains(&ai.flee_threshold) {
            return Err(ArenaError::InvalidConfig(format!(
                "flee_threshold ({}) must be in [0, 1)",
                ai.flee_threshold
            )));
        }
        if ai.engagement_buffer < 0.0 {
            return Err(ArenaError::InvalidConfig(
                "engagement_buffer must not be negative".into(),
            ));
        }
        if !(0.0..=1.0).contains(&ai.celebration_jump_chance) {
            return Err(ArenaError::InvalidConfig(
                "celebration_jump_chance must be a probability".into(),
            ));
        }
        if !(0.0..=1.0).contains(&self.combat.block_reduction) {
            return Err(ArenaError::InvalidConfig(
                "block_reduction must be in [0, 1]".into(),
            ));
        }

        let progression = &self.progression;
        if progression.xp_growth < 1.0 {
            return Err(ArenaError::InvalidConfig(format!(
                "xp_growth ({}) must be >= 1.0 or thresholds shrink",
                progression.xp_growth
            )));
        }
        if progression.base_xp_to_next == 0 || progression.level_cap == 0 {
            return Err(ArenaError::InvalidConfig(
                "base_xp_to_next and level_cap must be positive".into(),
            ));
        }

        if self.duel.tick_seconds <= 0.0 {
            return Err(ArenaError::InvalidConfig("tick_seconds must be positive".into()));
        }
        if self.duel.max_seconds <= 0.0 {
            return Err(ArenaError::InvalidConfig(format!(
                "max_seconds ({}) must be positive",
                self.duel.max_seconds
            )));
        }

        self.base_stats.validate()
    }
}

/// Load configuration from a TOML file
pub fn load_config(path: &Path) -> Result<ArenaConfig> {
    let contents = fs::read_to_string(path)?;
    ArenaConfig::from_toml_str(&contents)
}
