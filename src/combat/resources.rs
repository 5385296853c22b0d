//! Stamina, status flags and cooldown bookkeeping
//!
//! Every timer here is a deadline compared against the current simulation
//! time; nothing waits. A cooldown deadline is only ever written as
//! `now + duration`.

use ahash::AHashMap;

use crate::combat::skills::SKILL_CATALOG;
use crate::core::config::CombatConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::Seconds;

/// Built-in cooldown slots
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum CooldownKind {
    Attack,
    Dash,
    Parry,
}

/// Transient combat status
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StatusFlags {
    pub blocking: bool,
    pub dashing: bool,
    pub invulnerable: bool,
    pub stunned: bool,
    pub attempting_parry: bool,
}

/// What expired during a resource tick
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ResourceTick {
    pub stun_cleared: bool,
    pub dash_ended: bool,
    pub parry_closed: bool,
}

/// Per-combatant stamina and cooldown model
#[derive(Debug, Clone)]
pub struct ResourceModel {
    stamina: f32,
    max_stamina: f32,
    regen_rate: f32,
    attack_ready_at: Seconds,
    dash_ready_at: Seconds,
    parry_ready_at: Seconds,
    skill_ready_at: AHashMap<String, Seconds>,
    status: StatusFlags,
    stun_end: Seconds,
    dash_end: Seconds,
    parry_end: Seconds,
    tuning: CombatConfig,
}

impl ResourceModel {
    /// Start at full stamina with every cooldown ready
    pub fn new(max_stamina: f32, regen_rate: f32, tuning: CombatConfig) -> Self {
        let max_stamina = max_stamina.max(0.0);
        let skill_ready_at = SKILL_CATALOG
            .iter()
            .map(|skill| (skill.to_string(), 0.0))
            .collect();

        Self {
            stamina: max_stamina,
            max_stamina,
            regen_rate: regen_rate.max(0.0),
            attack_ready_at: 0.0,
            dash_ready_at: 0.0,
            parry_ready_at: 0.0,
            skill_ready_at,
            status: StatusFlags::default(),
            stun_end: 0.0,
            dash_end: 0.0,
            parry_end: 0.0,
            tuning,
        }
    }

    pub fn stamina(&self) -> f32 {
        self.stamina
    }

    pub fn max_stamina(&self) -> f32 {
        self.max_stamina
    }

    pub fn status(&self) -> StatusFlags {
        self.status
    }

    pub fn is_stunned(&self) -> bool {
        self.status.stunned
    }

    pub fn stun_end(&self) -> Seconds {
        self.stun_end
    }

    /// Advance timers and regenerate stamina
    pub fn tick(&mut self, now: Seconds, dt: Seconds) -> ResourceTick {
        let mut result = ResourceTick::default();

        if self.status.stunned && now >= self.stun_end {
            // Movement is left halted; the AI decides when to resume.
            self.status.stunned = false;
            result.stun_cleared = true;
        }

        if self.status.dashing && now >= self.dash_end {
            self.status.dashing = false;
            self.status.invulnerable = false;
            result.dash_ended = true;
        }

        if self.status.attempting_parry && now >= self.parry_end {
            self.status.attempting_parry = false;
            result.parry_closed = true;
        }

        if !self.status.stunned && !self.status.dashing && dt > 0.0 {
            self.stamina = (self.stamina + self.regen_rate * dt).clamp(0.0, self.max_stamina);
        }

        result
    }

    /// Spend stamina; returns false without mutating when there is not enough
    pub fn consume_stamina(&mut self, amount: f32) -> bool {
        if amount <= 0.0 {
            return true;
        }
        if self.stamina < amount {
            return false;
        }
        self.stamina = (self.stamina - amount).max(0.0);
        true
    }

    pub fn restore_stamina(&mut self, amount: f32) {
        if amount > 0.0 {
            self.stamina = (self.stamina + amount).min(self.max_stamina);
        }
    }

    pub fn is_ready(&self, kind: CooldownKind, now: Seconds) -> bool {
        now >= self.ready_at(kind)
    }

    pub fn ready_at(&self, kind: CooldownKind) -> Seconds {
        match kind {
            CooldownKind::Attack => self.attack_ready_at,
            CooldownKind::Dash => self.dash_ready_at,
            CooldownKind::Parry => self.parry_ready_at,
        }
    }

    pub fn put_on_cooldown(&mut self, kind: CooldownKind, duration: Seconds, now: Seconds) {
        let ready_at = now + duration.max(0.0);
        match kind {
            CooldownKind::Attack => self.attack_ready_at = ready_at,
            CooldownKind::Dash => self.dash_ready_at = ready_at,
            CooldownKind::Parry => self.parry_ready_at = ready_at,
        }
    }

    /// Unknown skills are never ready
    pub fn is_skill_ready(&self, skill: &str, now: Seconds) -> bool {
        self.skill_ready_at
            .get(skill)
            .map(|ready_at| now >= *ready_at)
            .unwrap_or(false)
    }

    pub fn put_skill_on_cooldown(&mut self, skill: &str, duration: Seconds, now: Seconds) -> Result<()> {
        let ready_at = self
            .skill_ready_at
            .get_mut(skill)
            .ok_or_else(|| ArenaError::UnknownSkill(skill.to_string()))?;
        *ready_at = now + duration.max(0.0);
        Ok(())
    }

    /// Stun for `duration`; overlapping stuns extend, never shorten
    ///
    /// Only the flag bookkeeping lives here. Halting the navigator and
    /// interrupting the resolver happen at the combatant level.
    pub fn apply_stun(&mut self, duration: Seconds, now: Seconds) {
        if duration <= 0.0 {
            return;
        }
        self.status.stunned = true;
        self.stun_end = self.stun_end.max(now + duration);
        self.status.blocking = false;
        self.status.dashing = false;
        self.status.invulnerable = false;
        self.status.attempting_parry = false;
    }

    /// Start a dash: invulnerable until it ends
    pub fn try_dash(&mut self, now: Seconds) -> bool {
        if self.status.stunned || self.status.dashing || !self.is_ready(CooldownKind::Dash, now) {
            return false;
        }
        if !self.consume_stamina(self.tuning.dash_stamina_cost) {
            return false;
        }
        self.status.dashing = true;
        self.status.invulnerable = true;
        self.status.blocking = false;
        self.dash_end = now + self.tuning.dash_duration;
        self.put_on_cooldown(CooldownKind::Dash, self.tuning.dash_cooldown, now);
        true
    }

    /// Open a parry window
    pub fn try_parry(&mut self, now: Seconds) -> bool {
        if self.status.stunned || !self.is_ready(CooldownKind::Parry, now) {
            return false;
        }
        if !self.consume_stamina(self.tuning.parry_stamina_cost) {
            return false;
        }
        self.status.attempting_parry = true;
        self.parry_end = now + self.tuning.parry_window;
        self.put_on_cooldown(CooldownKind::Parry, self.tuning.parry_cooldown, now);
        true
    }

    /// Raise or lower the guard; cannot raise it while stunned or dashing
    pub fn set_blocking(&mut self, blocking: bool) -> bool {
        if blocking && (self.status.stunned || self.status.dashing) {
            return false;
        }
        self.status.blocking = blocking;
        true
    }

    /// Pay for a blocked hit. Returns false (and drops the guard) if unpaid.
    pub fn absorb_blocked_hit(&mut self) -> bool {
        if self.consume_stamina(self.tuning.block_stamina_per_hit) {
            true
        } else {
            self.status.blocking = false;
            false
        }
    }

    /// Consume an open parry window
    pub fn spend_parry(&mut self) {
        self.status.attempting_parry = false;
    }

    /// Drop every pending timer and transient flag (used on death)
    pub fn cancel_all(&mut self, now: Seconds) {
        self.status = StatusFlags::default();
        self.stun_end = self.stun_end.min(now);
        self.dash_end = self.dash_end.min(now);
        self.parry_end = self.parry_end.min(now);
    }

    pub fn tuning(&self) -> &CombatConfig {
        &self.tuning
    }
}
