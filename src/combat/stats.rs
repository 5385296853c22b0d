//! Base stats, weapon modifiers and the effective stats of an equipped combatant

use serde::{Deserialize, Serialize};

use crate::core::error::{ArenaError, Result};
use crate::core::types::Seconds;
use crate::progression::profile::Profile;

/// Stats of an unleveled, unarmed combatant
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct BaseStats {
    pub max_health: f32,
    pub move_speed: f32,
    pub attack_range: f32,
    pub attack_damage: f32,
    pub attack_cooldown: Seconds,
    pub max_stamina: f32,
    /// Stamina regained per second
    pub stamina_regen: f32,
}

impl Default for BaseStats {
    fn default() -> Self {
        Self {
            max_health: 100.0,
            move_speed: 4.0,
            attack_range: 1.8,
            attack_damage: 10.0,
            attack_cooldown: 1.0,
            max_stamina: 100.0,
            stamina_regen: 15.0,
        }
    }
}

impl BaseStats {
    pub fn validate(&self) -> Result<()> {
        if self.max_health <= 0.0 {
            return Err(ArenaError::InvalidStats(format!(
                "max_health must be positive, got {}",
                self.max_health
            )));
        }
        if self.attack_range <= 0.0 {
            return Err(ArenaError::InvalidStats(format!(
                "attack_range must be positive, got {}",
                self.attack_range
            )));
        }
        if self.move_speed < 0.0 || self.attack_damage < 0.0 || self.attack_cooldown < 0.0 {
            return Err(ArenaError::InvalidStats(
                "speed, damage and cooldown must not be negative".into(),
            ));
        }
        if self.max_stamina < 0.0 || self.stamina_regen < 0.0 {
            return Err(ArenaError::InvalidStats("stamina values must not be negative".into()));
        }
        Ok(())
    }
}

/// Multipliers contributed by the equipped weapon
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct WeaponModifiers {
    pub name: String,
    pub damage: f32,
    pub range: f32,
    pub cooldown: f32,
}

impl WeaponModifiers {
    pub fn fists() -> Self {
        Self { name: "fists".into(), damage: 1.0, range: 1.0, cooldown: 1.0 }
    }

    pub fn sword() -> Self {
        Self { name: "sword".into(), damage: 1.5, range: 1.2, cooldown: 1.0 }
    }

    pub fn spear() -> Self {
        Self { name: "spear".into(), damage: 1.2, range: 1.8, cooldown: 1.2 }
    }

    pub fn axe() -> Self {
        Self { name: "axe".into(), damage: 2.0, range: 1.1, cooldown: 1.5 }
    }

    pub fn dagger() -> Self {
        Self { name: "dagger".into(), damage: 0.8, range: 0.9, cooldown: 0.5 }
    }

    /// Look up a weapon by identifier
    pub fn lookup(id: &str) -> Result<Self> {
        match id {
            "fists" => Ok(Self::fists()),
            "sword" => Ok(Self::sword()),
            "spear" => Ok(Self::spear()),
            "axe" => Ok(Self::axe()),
            "dagger" => Ok(Self::dagger()),
            other => Err(ArenaError::UnknownWeapon(other.to_string())),
        }
    }

    /// Look up a weapon, falling back to bare fists for unknown identifiers
    pub fn lookup_or_fists(id: &str) -> Self {
        Self::lookup(id).unwrap_or_else(|e| {
            tracing::warn!("{}; equipping fists instead", e);
            Self::fists()
        })
    }
}

impl Default for WeaponModifiers {
    fn default() -> Self {
        Self::fists()
    }
}

/// Effective stats after profile bonuses and the weapon are applied
///
/// Range and cooldown multipliers are folded in here, at equip time.
/// The damage multiplier stays separate and is applied per swing.
#[derive(Debug, Clone, PartialEq)]
pub struct CombatStats {
    pub max_health: f32,
    pub move_speed: f32,
    pub attack_range: f32,
    pub attack_damage: f32,
    pub attack_cooldown: Seconds,
    pub max_stamina: f32,
    pub stamina_regen: f32,
    pub weapon: WeaponModifiers,
}

impl CombatStats {
    /// Combine base stats, permanent profile growth and the profile's weapon
    pub fn assemble(base: &BaseStats, profile: &Profile) -> Self {
        let weapon = WeaponModifiers::lookup_or_fists(&profile.weapon);
        Self::with_weapon(base, profile, weapon)
    }

    pub fn with_weapon(base: &BaseStats, profile: &Profile, weapon: WeaponModifiers) -> Self {
        Self {
            max_health: base.max_health + profile.bonus_health,
            move_speed: base.move_speed + profile.bonus_speed,
            attack_range: base.attack_range * weapon.range,
            attack_damage: base.attack_damage + profile.bonus_damage,
            attack_cooldown: base.attack_cooldown * weapon.cooldown,
            max_stamina: base.max_stamina,
            stamina_regen: base.stamina_regen,
            weapon,
        }
    }

    /// Unmodified stats with bare fists
    pub fn from_base(base: &BaseStats) -> Self {
        Self {
            max_health: base.max_health,
            move_speed: base.move_speed,
            attack_range: base.attack_range,
            attack_damage: base.attack_damage,
            attack_cooldown: base.attack_cooldown,
            max_stamina: base.max_stamina,
            stamina_regen: base.stamina_regen,
            weapon: WeaponModifiers::fists(),
        }
    }

    /// Damage of one landed swing
    pub fn swing_damage(&self) -> f32 {
        self.attack_damage * self.weapon.damage
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_base_stats_valid() {
        assert!(BaseStats::default().validate().is_ok());
    }

    #[test]
    fn test_zero_health_rejected() {
        let stats = BaseStats { max_health: 0.0, ..BaseStats::default() };
        assert!(matches!(stats.validate(), Err(ArenaError::InvalidStats(_))));
    }

    #[test]
    fn test_unknown_weapon_falls_back_to_fists() {
        assert!(WeaponModifiers::lookup("trebuchet").is_err());
        assert_eq!(WeaponModifiers::lookup_or_fists("trebuchet"), WeaponModifiers::fists());
    }

    #[test]
    fn test_range_folded_damage_applied_per_swing() {
        let base = BaseStats::default();
        let mut profile = Profile::new_default();
        profile.weapon = "spear".into();
        profile.bonus_damage = 2.0;

        let stats = CombatStats::assemble(&base, &profile);

        assert!((stats.attack_range - base.attack_range * 1.8).abs() < 0.0001);
        assert!((stats.attack_cooldown - base.attack_cooldown * 1.2).abs() < 0.0001);
        assert_eq!(stats.attack_damage, 12.0);
        assert!((stats.swing_damage() - 12.0 * 1.2).abs() < 0.0001);
    }
}
