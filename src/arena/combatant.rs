//! A fighting entity and its explicit wiring
//!
//! Every collaborator is injected through `CombatantBuilder`. When something
//! the AI needs is missing or invalid, the combatant is still created but
//! its AI stays disabled, so the other side of the duel is unaffected.

use std::sync::Arc;

use glam::Vec3;

use crate::ai::{AiState, AiStateMachine};
use crate::arena::events::{CombatEvent, EventLog};
use crate::combat::skills::is_known_skill;
use crate::combat::{CombatResolver, CombatStats, Defender, HealthModel, ResourceModel};
use crate::core::config::{AiConfig, CombatConfig};
use crate::core::error::{ArenaError, Result};
use crate::core::types::{CombatantId, Seconds, Team};
use crate::world::{Navigator, Physics, Rig, SimpleRig, Terrain};

pub struct Combatant {
    pub id: CombatantId,
    /// Character identity (profile key)
    pub name: String,
    pub team: Team,
    pub stats: CombatStats,
    pub skills: Vec<String>,
    pub health: HealthModel,
    pub resources: ResourceModel,
    pub resolver: CombatResolver,
    pub rig: Box<dyn Rig>,
    /// `None` when the AI could not be wired
    pub brain: Option<AiStateMachine>,
}

impl std::fmt::Debug for Combatant {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Combatant")
            .field("id", &self.id)
            .field("name", &self.name)
            .field("team", &self.team)
            .field("health", &self.health.current())
            .field("state", &self.state())
            .finish()
    }
}

impl Combatant {
    pub fn position(&self) -> Vec3 {
        self.rig.position()
    }

    pub fn is_alive(&self) -> bool {
        self.health.is_alive()
    }

    pub fn is_hostile_to(&self, other: &Combatant) -> bool {
        self.team.is_hostile_to(other.team)
    }

    /// AI state, if the AI is wired
    pub fn state(&self) -> Option<AiState> {
        self.brain.as_ref().map(|b| b.state())
    }

    pub fn target(&self) -> Option<CombatantId> {
        self.brain.as_ref().and_then(|b| b.target())
    }

    pub fn knows_skill(&self, skill: &str) -> bool {
        self.skills.iter().any(|s| s == skill)
    }

    /// Borrow the parts an incoming swing touches
    pub fn defender(&mut self) -> Defender<'_> {
        Defender { health: &mut self.health, resources: &mut self.resources }
    }

    /// Stun: flags, halted navigator, zero velocity, interrupted swing
    ///
    /// Movement stays halted after the stun clears until the AI resumes it.
    pub fn apply_stun(&mut self, duration: Seconds, now: Seconds, log: &mut EventLog) {
        if duration <= 0.0 || !self.is_alive() {
            return;
        }
        self.resources.apply_stun(duration, now);
        self.rig.set_can_move(false);
        self.rig.zero_velocity();
        self.resolver.interrupt(&mut self.resources, now);
        log.push(now, CombatEvent::Stunned { id: self.id, until: self.resources.stun_end() });
    }

    /// Stop moving, attacking and simulating; cancel every pending timer
    pub fn shut_down(&mut self, now: Seconds) {
        self.resolver.disable_attack();
        self.rig.set_can_move(false);
        self.rig.zero_velocity();
        self.rig.set_simulation_enabled(false);
        self.resources.cancel_all(now);
    }

    /// Force the terminal state; safe to call more than once
    pub fn handle_death(&mut self, log: &mut EventLog, now: Seconds) {
        match self.brain.take() {
            Some(mut brain) => {
                brain.die(self, log, now);
                self.brain = Some(brain);
            }
            None => self.shut_down(now),
        }
    }

    /// External "battle won" signal
    pub fn celebrate(&mut self, log: &mut EventLog, now: Seconds) {
        if let Some(mut brain) = self.brain.take() {
            brain.celebrate(self, log, now);
            self.brain = Some(brain);
        }
    }
}

/// Dependency injection for a combatant
pub struct CombatantBuilder {
    id: CombatantId,
    name: String,
    team: Team,
    stats: Option<CombatStats>,
    skills: Vec<String>,
    rig: Option<Box<dyn Rig>>,
    spawn: Vec3,
    ai: AiConfig,
    combat: CombatConfig,
    seed: u64,
}

impl CombatantBuilder {
    pub fn new(id: CombatantId, name: impl Into<String>, team: Team) -> Self {
        Self {
            id,
            name: name.into(),
            team,
            stats: None,
            skills: Vec::new(),
            rig: None,
            spawn: Vec3::ZERO,
            ai: AiConfig::default(),
            combat: CombatConfig::default(),
            seed: 42,
        }
    }

    pub fn stats(mut self, stats: CombatStats) -> Self {
        self.stats = Some(stats);
        self
    }

    pub fn skills(mut self, skills: &[String]) -> Self {
        self.skills = skills.to_vec();
        self
    }

    pub fn rig(mut self, rig: Box<dyn Rig>) -> Self {
        self.rig = Some(rig);
        self
    }

    /// Where an unwired combatant stands when no rig is provided
    pub fn spawn(mut self, position: Vec3) -> Self {
        self.spawn = position;
        self
    }

    pub fn ai_config(mut self, config: AiConfig) -> Self {
        self.ai = config;
        self
    }

    pub fn combat_config(mut self, config: CombatConfig) -> Self {
        self.combat = config;
        self
    }

    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// Wire the AI, or report what is missing
    fn wire_ai(&self, stats: Option<&CombatStats>) -> Result<AiStateMachine> {
        if self.rig.is_none() {
            return Err(ArenaError::MissingCollaborator("navigator"));
        }
        let stats = stats.ok_or(ArenaError::MissingCollaborator("stats"))?;
        AiStateMachine::new(self.ai.clone(), stats, self.seed)
    }

    /// Build the combatant. Wiring problems disable the AI, never the build.
    pub fn build(self, log: &mut EventLog) -> Combatant {
        let brain = match self.wire_ai(self.stats.as_ref()) {
            Ok(brain) => Some(brain),
            Err(e) => {
                tracing::warn!(combatant = %self.id, "AI disabled: {}", e);
                log.push(0.0, CombatEvent::AiDisabled { id: self.id, reason: e.to_string() });
                None
            }
        };

        let stats = self
            .stats
            .unwrap_or_else(|| CombatStats::from_base(&Default::default()));

        let rig: Box<dyn Rig> = match self.rig {
            Some(rig) => rig,
            None => {
                let mut inert = SimpleRig::new(Arc::new(Terrain::default()), self.spawn, 0.0);
                inert.set_can_move(false);
                Box::new(inert)
            }
        };

        let skills = self
            .skills
            .into_iter()
            .filter(|skill| {
                let known = is_known_skill(skill);
                if !known {
                    tracing::warn!(combatant = %self.id, "ignoring unknown skill '{}'", skill);
                }
                known
            })
            .collect();

        let mut rig = rig;
        rig.set_max_speed(stats.move_speed);

        Combatant {
            id: self.id,
            name: self.name,
            team: self.team,
            health: HealthModel::new(stats.max_health, self.combat.grace_delay),
            resources: ResourceModel::new(stats.max_stamina, stats.stamina_regen, self.combat.clone()),
            resolver: CombatResolver::new(&stats, self.combat.block_reduction),
            skills,
            stats,
            rig,
            brain,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::combat::BaseStats;

    fn rig() -> Box<dyn Rig> {
        Box::new(SimpleRig::new(Arc::new(Terrain::default()), Vec3::ZERO, 1.0))
    }

    #[test]
    fn test_fully_wired_combatant_has_ai() {
        let mut log = EventLog::new();
        let c = CombatantBuilder::new(CombatantId(1), "knight", Team::Red)
            .stats(CombatStats::from_base(&BaseStats::default()))
            .rig(rig())
            .build(&mut log);

        assert_eq!(c.state(), Some(AiState::Idle));
        assert_eq!(c.rig.max_speed(), BaseStats::default().move_speed);
        assert!(log.is_empty());
    }

    #[test]
    fn test_missing_navigator_disables_ai_only() {
        let mut log = EventLog::new();
        let c = CombatantBuilder::new(CombatantId(2), "ghost", Team::Blue)
            .stats(CombatStats::from_base(&BaseStats::default()))
            .spawn(Vec3::new(3.0, 0.0, 0.0))
            .build(&mut log);

        assert!(c.brain.is_none());
        assert!(c.is_alive());
        assert_eq!(c.position(), Vec3::new(3.0, 0.0, 0.0));
        assert_eq!(log.count_matching(|e| matches!(e, CombatEvent::AiDisabled { .. })), 1);
    }

    #[test]
    fn test_missing_or_invalid_stats_disable_ai() {
        let mut log = EventLog::new();
        let c = CombatantBuilder::new(CombatantId(3), "blank", Team::Blue)
            .rig(rig())
            .build(&mut log);
        assert!(c.brain.is_none());

        let mut broken = CombatStats::from_base(&BaseStats::default());
        broken.attack_range = 0.0;
        let c = CombatantBuilder::new(CombatantId(4), "broken", Team::Blue)
            .stats(broken)
            .rig(rig())
            .build(&mut log);
        assert!(c.brain.is_none());
    }

    #[test]
    fn test_unknown_skills_dropped() {
        let mut log = EventLog::new();
        let c = CombatantBuilder::new(CombatantId(5), "mage", Team::Red)
            .stats(CombatStats::from_base(&BaseStats::default()))
            .skills(&["dash".to_string(), "fireball".to_string()])
            .rig(rig())
            .build(&mut log);
        assert!(c.knows_skill("dash"));
        assert!(!c.knows_skill("fireball"));
    }

    #[test]
    fn test_stun_halts_and_interrupts() {
        let mut log = EventLog::new();
        let mut c = CombatantBuilder::new(CombatantId(6), "brute", Team::Red)
            .stats(CombatStats::from_base(&BaseStats::default()))
            .rig(rig())
            .build(&mut log);

        c.apply_stun(2.0, 1.0, &mut log);
        assert!(c.resources.is_stunned());
        assert!(!c.rig.can_move());
        assert!(!c.resources.is_ready(crate::combat::CooldownKind::Attack, 1.5));

        // Clearing the stun leaves movement halted
        c.resources.tick(3.0, 0.1);
        assert!(!c.resources.is_stunned());
        assert!(!c.rig.can_move());
    }

    #[test]
    fn test_death_without_ai_still_shuts_down() {
        let mut log = EventLog::new();
        let mut c = CombatantBuilder::new(CombatantId(7), "dummy", Team::Red)
            .stats(CombatStats::from_base(&BaseStats::default()))
            .build(&mut log);
        c.health.take_damage(1000.0, 0.0);
        c.handle_death(&mut log, 0.0);
        assert!(!c.resolver.is_enabled());
    }
}
