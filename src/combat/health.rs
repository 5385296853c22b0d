//! Health, death detection and the post-death removal deadline

use crate::core::types::Seconds;

/// Notifications produced by a health model, drained by the owner
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HealthEvent {
    Changed { current: f32, max: f32 },
    Died,
}

/// Result of a damage application
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DamageOutcome {
    /// Health actually removed
    pub applied: f32,
    /// This hit took health to zero
    pub killed: bool,
}

#[derive(Debug, Clone)]
pub struct HealthModel {
    current: f32,
    max: f32,
    grace_delay: Seconds,
    death_notified: bool,
    removal_at: Option<Seconds>,
    events: Vec<HealthEvent>,
}

impl HealthModel {
    pub fn new(max: f32, grace_delay: Seconds) -> Self {
        let max = max.max(0.0);
        Self {
            current: max,
            max,
            grace_delay,
            death_notified: false,
            removal_at: None,
            events: Vec::new(),
        }
    }

    pub fn current(&self) -> f32 {
        self.current
    }

    pub fn max(&self) -> f32 {
        self.max
    }

    pub fn is_alive(&self) -> bool {
        self.current > 0.0
    }

    /// Current health as a fraction of max (0.0 when max is zero)
    pub fn ratio(&self) -> f32 {
        if self.max > 0.0 {
            self.current / self.max
        } else {
            0.0
        }
    }

    /// When the dead combatant should leave the simulation
    pub fn removal_at(&self) -> Option<Seconds> {
        self.removal_at
    }

    /// Apply damage; no-op once at zero
    pub fn take_damage(&mut self, amount: f32, now: Seconds) -> DamageOutcome {
        if !self.is_alive() || amount <= 0.0 {
            return DamageOutcome::default();
        }

        let before = self.current;
        self.current = (self.current - amount).max(0.0);
        let applied = before - self.current;
        self.events.push(HealthEvent::Changed { current: self.current, max: self.max });

        let killed = self.current <= 0.0;
        if killed && !self.death_notified {
            self.death_notified = true;
            self.removal_at = Some(now + self.grace_delay);
            self.events.push(HealthEvent::Died);
            tracing::debug!("health depleted, removal scheduled at {:.2}s", now + self.grace_delay);
        }

        DamageOutcome { applied, killed }
    }

    /// Heal by `amount`, clamped to max; the dead stay dead
    pub fn restore(&mut self, amount: f32) {
        if !self.is_alive() || amount <= 0.0 {
            return;
        }
        let before = self.current;
        self.current = (self.current + amount).clamp(0.0, self.max);
        if self.current != before {
            self.events.push(HealthEvent::Changed { current: self.current, max: self.max });
        }
    }

    pub fn restore_full(&mut self) {
        let missing = self.max - self.current;
        self.restore(missing);
    }

    /// Take pending notifications
    pub fn drain_events(&mut self) -> Vec<HealthEvent> {
        std::mem::take(&mut self.events)
    }
}
