//! Attack execution
//!
//! Range is a plain Euclidean check against the equip-time attack range.
//! A swing is gated by the attacker's attack cooldown and lands on exactly
//! one defender's health model.

use glam::Vec3;

use crate::combat::health::HealthModel;
use crate::combat::resources::{CooldownKind, ResourceModel};
use crate::combat::stats::CombatStats;
use crate::core::types::Seconds;

/// The side of an exchange that receives the swing
pub struct Defender<'a> {
    pub health: &'a mut HealthModel,
    pub resources: &'a mut ResourceModel,
}

/// What happened when an attack was issued
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum AttackOutcome {
    /// Attacking is disabled (dead attacker)
    Disabled,
    /// Attacker is stunned and cannot swing
    Stunned,
    /// Target already dead
    TargetDead,
    /// Swing timer still running; nothing happens
    OnCooldown,
    /// Target was invulnerable; the swing is spent
    Evaded,
    /// Target parried; the swing is spent and the attacker should be stunned
    Parried,
    Hit { damage: f32, killed: bool },
    Blocked { damage: f32, killed: bool },
}

impl AttackOutcome {
    /// Did the swing actually go out this tick?
    pub fn swung(&self) -> bool {
        !matches!(
            self,
            AttackOutcome::Disabled
                | AttackOutcome::Stunned
                | AttackOutcome::TargetDead
                | AttackOutcome::OnCooldown
        )
    }

    pub fn damage(&self) -> f32 {
        match self {
            AttackOutcome::Hit { damage, .. } | AttackOutcome::Blocked { damage, .. } => *damage,
            _ => 0.0,
        }
    }

    pub fn killed(&self) -> bool {
        matches!(
            self,
            AttackOutcome::Hit { killed: true, .. } | AttackOutcome::Blocked { killed: true, .. }
        )
    }
}

#[derive(Debug, Clone)]
pub struct CombatResolver {
    attack_range: f32,
    attack_cooldown: Seconds,
    base_damage: f32,
    damage_multiplier: f32,
    block_reduction: f32,
    enabled: bool,
}

impl CombatResolver {
    pub fn new(stats: &CombatStats, block_reduction: f32) -> Self {
        Self {
            attack_range: stats.attack_range,
            attack_cooldown: stats.attack_cooldown,
            base_damage: stats.attack_damage,
            damage_multiplier: stats.weapon.damage,
            block_reduction: block_reduction.clamp(0.0, 1.0),
            enabled: true,
        }
    }

    pub fn attack_range(&self) -> f32 {
        self.attack_range
    }

    pub fn attack_cooldown(&self) -> Seconds {
        self.attack_cooldown
    }

    pub fn swing_damage(&self) -> f32 {
        self.base_damage * self.damage_multiplier
    }

    pub fn is_enabled(&self) -> bool {
        self.enabled
    }

    pub fn is_in_range(&self, from: Vec3, target: Vec3) -> bool {
        from.distance(target) <= self.attack_range
    }

    pub fn enable_attack(&mut self) {
        self.enabled = true;
    }

    pub fn disable_attack(&mut self) {
        self.enabled = false;
    }

    /// Restart the swing timer (stun interrupts an attack in progress)
    pub fn interrupt(&self, own: &mut ResourceModel, now: Seconds) {
        own.put_on_cooldown(CooldownKind::Attack, self.attack_cooldown, now);
    }

    /// Swing at `target` if the attack cooldown allows it
    pub fn attack(&self, own: &mut ResourceModel, target: Defender<'_>, now: Seconds) -> AttackOutcome {
        if !self.enabled {
            return AttackOutcome::Disabled;
        }
        if own.is_stunned() {
            return AttackOutcome::Stunned;
        }
        if !target.health.is_alive() {
            return AttackOutcome::TargetDead;
        }
        if !own.is_ready(CooldownKind::Attack, now) {
            return AttackOutcome::OnCooldown;
        }

        own.put_on_cooldown(CooldownKind::Attack, self.attack_cooldown, now);

        let status = target.resources.status();
        if status.invulnerable {
            return AttackOutcome::Evaded;
        }
        if status.attempting_parry {
            target.resources.spend_parry();
            return AttackOutcome::Parried;
        }

        let mut damage = self.swing_damage();
        let blocked = status.blocking && target.resources.absorb_blocked_hit();
        if blocked {
            damage *= 1.0 - self.block_reduction;
        }

        let outcome = target.health.take_damage(damage, now);
        if blocked {
            AttackOutcome::Blocked { damage: outcome.applied, killed: outcome.killed }
        } else {
            AttackOutcome::Hit { damage: outcome.applied, killed: outcome.killed }
        }
    }
}
