//! Experience grants and level-ups

use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::core::config::ProgressionConfig;
use crate::core::error::Result;
use crate::progression::profile::Profile;
use crate::progression::store::ProfileStore;

/// Permanent stat increment applied on level-up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum StatUpgrade {
    Health,
    Damage,
    Speed,
}

impl StatUpgrade {
    pub const ALL: [StatUpgrade; 3] = [StatUpgrade::Health, StatUpgrade::Damage, StatUpgrade::Speed];
}

/// Result of one experience grant
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct XpAward {
    pub character: String,
    pub amount: u32,
    pub level_before: u32,
    pub level_after: u32,
    /// One entry per level gained, in order
    pub upgrades: Vec<StatUpgrade>,
}

impl XpAward {
    pub fn leveled_up(&self) -> bool {
        !self.upgrades.is_empty()
    }
}

pub struct ProgressionEngine<S: ProfileStore> {
    store: S,
    config: ProgressionConfig,
    rng: ChaCha8Rng,
}

impl<S: ProfileStore> ProgressionEngine<S> {
    pub fn new(store: S, config: ProgressionConfig, seed: u64) -> Self {
        Self { store, config, rng: ChaCha8Rng::seed_from_u64(seed) }
    }

    pub fn config(&self) -> &ProgressionConfig {
        &self.config
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    pub fn into_store(self) -> S {
        self.store
    }

    /// Stored profile, or a fresh level 1 profile
    pub fn load_or_create(&self, character_id: &str) -> Profile {
        self.store
            .load_profile(character_id)
            .unwrap_or_else(|| Profile::starting(self.config.base_xp_to_next))
    }

    /// XP for a win, scaled up by how much health the survivor kept
    pub fn victory_xp(&self, survivor_health_ratio: f32) -> i64 {
        let bonus = (self.config.flawless_bonus as f32 * survivor_health_ratio.clamp(0.0, 1.0)).round();
        self.config.victory_xp as i64 + bonus as i64
    }

    /// Add XP, level up as far as it reaches, persist once
    ///
    /// Non-positive amounts and empty ids are ignored.
    pub fn grant_xp(&mut self, character_id: &str, amount: i64) -> Result<Option<XpAward>> {
        if amount <= 0 || character_id.is_empty() {
            return Ok(None);
        }
        let amount = amount.min(u32::MAX as i64) as u32;

        let mut profile = self.load_or_create(character_id);
        let level_before = profile.level;
        profile.xp = profile.xp.saturating_add(amount);

        let mut upgrades = Vec::new();
        while profile.xp >= profile.xp_to_next && profile.level < self.config.level_cap {
            profile.xp -= profile.xp_to_next;
            profile.xp_to_next = ((profile.xp_to_next as f32 * self.config.xp_growth).round() as u32).max(1);
            profile.level += 1;

            let upgrade = StatUpgrade::ALL[self.rng.gen_range(0..StatUpgrade::ALL.len())];
            self.apply_upgrade(&mut profile, upgrade);
            upgrades.push(upgrade);

            tracing::info!(character = character_id, "reached level {} ({:?} up)", profile.level, upgrade);
        }

        self.store.save_profile(&profile, character_id)?;

        Ok(Some(XpAward {
            character: character_id.to_string(),
            amount,
            level_before,
            level_after: profile.level,
            upgrades,
        }))
    }

    fn apply_upgrade(&self, profile: &mut Profile, upgrade: StatUpgrade) {
        match upgrade {
            StatUpgrade::Health => profile.bonus_health += self.config.health_per_level,
            StatUpgrade::Damage => profile.bonus_damage += self.config.damage_per_level,
            StatUpgrade::Speed => profile.bonus_speed += self.config.speed_per_level,
        }
    }
}
