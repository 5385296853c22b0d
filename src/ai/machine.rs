//! Per-combatant AI decision loop
//!
//! Each tick, in priority order:
//! death -> ground sensor -> flee check -> target revalidation ->
//! path throttle -> jump heuristic -> state behavior.
//!
//! Transitions run their exit and entry side effects immediately, before any
//! state behavior of the same tick. Every timer is a deadline.

use glam::Vec3;
use rand::{Rng, SeedableRng};
use rand_chacha::ChaCha8Rng;

use crate::ai::jump::{evaluate_jump, jump_retry_delay, JumpCheck, JumpDecision};
use crate::ai::state::AiState;
use crate::ai::targeting::{acquire_target, is_valid_target};
use crate::arena::combatant::Combatant;
use crate::arena::events::{CombatEvent, EventLog};
use crate::arena::roster::Others;
use crate::combat::{AttackOutcome, CombatStats};
use crate::core::config::AiConfig;
use crate::core::error::{ArenaError, Result};
use crate::core::types::{horizontal_distance, layers, CombatantId, Seconds};
use crate::world::{Navigator, Physics};

/// Height of the headroom probe origin above the feet
const HEAD_HEIGHT: f32 = 1.8;

#[derive(Debug, Clone)]
pub struct AiStateMachine {
    config: AiConfig,
    state: AiState,
    target: Option<CombatantId>,
    grounded: bool,
    next_path_at: Seconds,
    next_jump_at: Seconds,
    celebration_ends_at: Option<Seconds>,
    rng: ChaCha8Rng,
}

impl AiStateMachine {
    /// Wire an AI for a combatant with the given stats
    pub fn new(config: AiConfig, stats: &CombatStats, seed: u64) -> Result<Self> {
        if stats.max_health <= 0.0 {
            return Err(ArenaError::InvalidStats("max_health must be positive".into()));
        }
        if stats.attack_range <= 0.0 {
            return Err(ArenaError::InvalidStats("attack_range must be positive".into()));
        }
        if !(0.0..1.0).contains(&config.flee_threshold) {
            return Err(ArenaError::InvalidConfig(format!(
                "flee_threshold ({}) must be in [0, 1)",
                config.flee_threshold
            )));
        }

        Ok(Self {
            config,
            state: AiState::Idle,
            target: None,
            grounded: false,
            next_path_at: 0.0,
            next_jump_at: 0.0,
            celebration_ends_at: None,
            rng: ChaCha8Rng::seed_from_u64(seed),
        })
    }

    pub fn state(&self) -> AiState {
        self.state
    }

    pub fn target(&self) -> Option<CombatantId> {
        self.target
    }

    pub fn is_grounded(&self) -> bool {
        self.grounded
    }

    pub fn config(&self) -> &AiConfig {
        &self.config
    }

    pub fn next_jump_at(&self) -> Seconds {
        self.next_jump_at
    }

    pub fn celebration_ends_at(&self) -> Option<Seconds> {
        self.celebration_ends_at
    }

    /// Run one decision step for `me`
    pub fn tick(&mut self, me: &mut Combatant, others: &mut Others<'_>, log: &mut EventLog, now: Seconds) {
        if self.state == AiState::Dead {
            return;
        }
        if !me.health.is_alive() {
            self.die(me, log, now);
            return;
        }

        self.grounded = me
            .rig
            .is_grounded(me.rig.position(), self.config.grounded_radius, layers::ALL);

        // Flee check: highest priority after death
        let threatened = is_valid_target(me.team, self.target.and_then(|id| others.get(id)))
            || others.iter().any(|c| c.is_alive() && me.is_hostile_to(c));
        let wants_to_flee = me.health.ratio() <= self.config.flee_threshold && threatened;
        if wants_to_flee && self.state != AiState::Fleeing {
            self.revalidate_target(me, others, log, now);
            let target_pos = self.target_position(others);
            self.transition(AiState::Fleeing, me, target_pos, log, now);
            return;
        }

        if !self.revalidate_target(me, others, log, now) && self.state.needs_target() {
            self.transition(AiState::Idle, me, None, log, now);
            return;
        }

        if self.state == AiState::Fleeing && !wants_to_flee {
            let target_pos = self.target_position(others);
            self.transition(AiState::Seeking, me, target_pos, log, now);
        }

        if me.resources.is_stunned() {
            return;
        }
        // Resume after a stun; clearing it does not do this on its own
        if self.state.is_moving() && !me.rig.can_move() {
            me.rig.set_can_move(true);
        }

        let target_pos = self.target_position(others);

        if self.state.is_moving() {
            if now >= self.next_path_at && !me.rig.is_path_pending() {
                self.recompute_path(me, target_pos, log, now);
            }
            self.try_tactical_jump(me, target_pos, log, now);
        }

        match self.state {
            AiState::Idle => {
                if self.target.is_some() {
                    self.transition(AiState::Seeking, me, target_pos, log, now);
                }
            }
            AiState::Seeking => {
                if let Some(tp) = target_pos {
                    if me.resolver.is_in_range(me.rig.position(), tp) {
                        self.transition(AiState::Attacking, me, target_pos, log, now);
                    }
                }
            }
            AiState::Attacking => self.attack_behavior(me, others, target_pos, log, now),
            AiState::Fleeing => {}
            AiState::Celebrating => self.celebrate_behavior(me, log, now),
            AiState::Dead => {}
        }
    }

    /// External "battle won" signal
    pub fn celebrate(&mut self, me: &mut Combatant, log: &mut EventLog, now: Seconds) {
        self.transition(AiState::Celebrating, me, None, log, now);
    }

    /// Force the terminal state (idempotent)
    pub fn die(&mut self, me: &mut Combatant, log: &mut EventLog, now: Seconds) {
        self.transition(AiState::Dead, me, None, log, now);
    }

    /// Keep the current target if still valid, otherwise pick the nearest hostile.
    /// Returns whether a target is held afterwards.
    fn revalidate_target(&mut self, me: &Combatant, others: &Others<'_>, log: &mut EventLog, now: Seconds) -> bool {
        if is_valid_target(me.team, self.target.and_then(|id| others.get(id))) {
            return true;
        }

        let previous = self.target.take();
        self.target = acquire_target(me.team, me.rig.position(), others.iter());
        if let Some(target) = self.target {
            if previous != Some(target) {
                tracing::debug!(combatant = %me.id, target = %target, "target acquired");
                log.push(now, CombatEvent::TargetAcquired { id: me.id, target });
            }
        }
        self.target.is_some()
    }

    fn target_position(&self, others: &Others<'_>) -> Option<Vec3> {
        self.target
            .and_then(|id| others.get(id))
            .map(|c| c.position())
    }

    fn transition(&mut self, to: AiState, me: &mut Combatant, target_pos: Option<Vec3>, log: &mut EventLog, now: Seconds) -> bool {
        if !self.state.can_transition_to(to) {
            return false;
        }

        let from = self.state;
        if from.halts_movement() {
            me.rig.set_can_move(true);
        }
        if from == AiState::Celebrating {
            self.celebration_ends_at = None;
        }

        self.state = to;

        match to {
            AiState::Idle => {
                me.rig.set_can_move(false);
                let here = me.rig.position();
                me.rig.set_destination(here);
                me.rig.zero_velocity();
            }
            AiState::Seeking | AiState::Fleeing => {
                me.rig.set_can_move(!me.resources.is_stunned());
                self.recompute_path(me, target_pos, log, now);
            }
            AiState::Attacking => {
                me.rig.set_can_move(false);
                me.rig.zero_velocity();
            }
            AiState::Celebrating => {
                me.rig.set_can_move(false);
                me.rig.zero_velocity();
                self.celebration_ends_at = Some(now + self.config.celebration_duration);
            }
            AiState::Dead => {
                me.shut_down(now);
                self.target = None;
                self.celebration_ends_at = None;
                self.next_path_at = f32::INFINITY;
                self.next_jump_at = f32::INFINITY;
            }
        }

        tracing::debug!(combatant = %me.id, "{:?} -> {:?}", from, to);
        log.push(now, CombatEvent::StateChanged { id: me.id, from, to });
        true
    }

    /// Request a path toward (Seeking) or away from (Fleeing) the target
    ///
    /// A failed request keeps the previous destination; the next throttle
    /// interval retries.
    fn recompute_path(&mut self, me: &mut Combatant, target_pos: Option<Vec3>, log: &mut EventLog, now: Seconds) {
        self.next_path_at = now + self.config.path_recompute_interval;

        let Some(target_pos) = target_pos else {
            return;
        };
        let from = me.rig.position();
        let destination = match self.state {
            AiState::Seeking => Some(target_pos),
            AiState::Fleeing => self.flee_point(me, from, target_pos),
            _ => None,
        };
        let Some(destination) = destination else {
            return;
        };

        match me.rig.request_path(from, destination) {
            Ok(()) => {
                tracing::debug!(
                    combatant = %me.id,
                    "path requested to ({:.1}, {:.1}, {:.1})",
                    destination.x,
                    destination.y,
                    destination.z
                );
            }
            Err(e) => {
                tracing::warn!(combatant = %me.id, "path request failed: {}", e);
                log.push(now, CombatEvent::PathFailed { id: me.id, reason: e.to_string() });
            }
        }
    }

    /// `flee_distance` along the horizontal direction from target to self, snapped
    fn flee_point(&self, me: &Combatant, from: Vec3, threat: Vec3) -> Option<Vec3> {
        let mut away = Vec3::new(from.x - threat.x, 0.0, from.z - threat.z).normalize_or_zero();
        if away == Vec3::ZERO {
            away = Vec3::X;
        }
        me.rig.nearest_navigable(from + away * self.config.flee_distance)
    }

    fn try_tactical_jump(&mut self, me: &mut Combatant, target_pos: Option<Vec3>, log: &mut EventLog, now: Seconds) {
        let position = me.rig.position();
        let check = JumpCheck {
            cooldown_elapsed: now >= self.next_jump_at,
            grounded: self.grounded,
            has_target: target_pos.is_some(),
            height_advantage: target_pos.map(|tp| tp.y - position.y).unwrap_or(0.0),
            horizontal_distance: target_pos
                .map(|tp| horizontal_distance(position, tp))
                .unwrap_or(f32::INFINITY),
        };

        let headroom = self.config.jump_headroom;
        let rig = &me.rig;
        let decision = evaluate_jump(&check, &self.config, || {
            !rig.probe_obstacle(position + Vec3::Y * HEAD_HEIGHT, Vec3::Y, headroom, layers::OBSTACLE)
        });

        if let Some(delay) = jump_retry_delay(decision, &self.config) {
            self.next_jump_at = now + delay;
        }

        match decision {
            JumpDecision::Jump => {
                me.rig.apply_impulse(Vec3::Y * self.config.jump_impulse);
                self.grounded = false;
                tracing::debug!(combatant = %me.id, "jumping toward higher ground");
                log.push(now, CombatEvent::Jumped { id: me.id, celebratory: false });
            }
            JumpDecision::Blocked => {
                tracing::debug!(combatant = %me.id, "jump blocked overhead");
            }
            JumpDecision::Hold => {}
        }
    }

    fn attack_behavior(
        &mut self,
        me: &mut Combatant,
        others: &mut Others<'_>,
        target_pos: Option<Vec3>,
        log: &mut EventLog,
        now: Seconds,
    ) {
        let (Some(target_id), Some(target_pos)) = (self.target, target_pos) else {
            return;
        };

        if me.rig.position().distance(target_pos) > me.resolver.attack_range() + self.config.engagement_buffer {
            self.transition(AiState::Seeking, me, Some(target_pos), log, now);
            return;
        }

        let Some(target) = others.get_mut(target_id) else {
            return;
        };

        let outcome = me.resolver.attack(&mut me.resources, target.defender(), now);
        if !outcome.swung() {
            return;
        }

        log.push(now, CombatEvent::Attack { attacker: me.id, target: target_id, outcome });
        if outcome.killed() {
            tracing::info!(attacker = %me.id, target = %target_id, "killing blow");
            target.handle_death(log, now);
        }
        if outcome == AttackOutcome::Parried {
            let stun = me.resources.tuning().parry_stun;
            me.apply_stun(stun, now, log);
        }
    }

    fn celebrate_behavior(&mut self, me: &mut Combatant, log: &mut EventLog, now: Seconds) {
        if self.celebration_ends_at.is_some_and(|end| now >= end) {
            self.transition(AiState::Idle, me, None, log, now);
            return;
        }

        if self.grounded && self.rng.gen::<f32>() < self.config.celebration_jump_chance {
            me.rig.apply_impulse(Vec3::Y * self.config.celebration_jump_impulse);
            self.grounded = false;
            log.push(now, CombatEvent::Jumped { id: me.id, celebratory: true });
        }
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Arc;

    use super::*;
    use crate::arena::combatant::CombatantBuilder;
    use crate::arena::roster::split_roster;
    use crate::combat::BaseStats;
    use crate::core::types::Team;
    use crate::world::{Aabb, Rig, SimpleRig, Terrain};

    fn fighter_on(terrain: Arc<Terrain>, id: u32, team: Team, at: Vec3, log: &mut EventLog) -> Combatant {
        CombatantBuilder::new(CombatantId(id), format!("c{id}"), team)
            .stats(CombatStats::from_base(&BaseStats::default()))
            .rig(Box::new(SimpleRig::new(terrain, at, 4.0)))
            .build(log)
    }

    fn duo(blue_x: f32, log: &mut EventLog) -> Vec<Combatant> {
        let terrain = Arc::new(Terrain::flat(20.0));
        vec![
            fighter_on(terrain.clone(), 1, Team::Red, Vec3::ZERO, log),
            fighter_on(terrain, 2, Team::Blue, Vec3::new(blue_x, 0.0, 0.0), log),
        ]
    }

    fn step(all: &mut [Combatant], index: usize, log: &mut EventLog, now: Seconds) {
        let (me, mut others) = split_roster(all, index);
        if let Some(mut brain) = me.brain.take() {
            brain.tick(me, &mut others, log, now);
            me.brain = Some(brain);
        }
    }

    #[test]
    fn test_idle_acquires_target_and_seeks() {
        let mut log = EventLog::new();
        let mut all = duo(6.0, &mut log);

        step(&mut all, 0, &mut log, 0.0);

        assert_eq!(all[0].target(), Some(CombatantId(2)));
        assert_eq!(all[0].state(), Some(AiState::Seeking));
        assert!(all[0].rig.is_path_pending());
        assert!(all[0].rig.can_move());
        assert_eq!(log.count_matching(|e| matches!(e, CombatEvent::TargetAcquired { .. })), 1);
    }

    #[test]
    fn test_in_range_attacks_and_damages() {
        let mut log = EventLog::new();
        let mut all = duo(1.0, &mut log);

        step(&mut all, 0, &mut log, 0.0);
        step(&mut all, 0, &mut log, 0.1);
        assert_eq!(all[0].state(), Some(AiState::Attacking));
        assert!(!all[0].rig.can_move());

        step(&mut all, 0, &mut log, 0.2);
        assert_eq!(all[1].health.current(), all[1].health.max() - 10.0);

        // Cooldown holds the next swing
        step(&mut all, 0, &mut log, 0.3);
        assert_eq!(all[1].health.current(), all[1].health.max() - 10.0);
    }

    #[test]
    fn test_resolver_owns_attack_range() {
        let mut log = EventLog::new();
        let mut all = duo(5.0, &mut log);
        // Stats are only the input; the wired resolver keeps its own range
        all[0].stats.attack_range = 10.0;

        step(&mut all, 0, &mut log, 0.0);
        step(&mut all, 0, &mut log, 0.1);
        assert_eq!(all[0].state(), Some(AiState::Seeking));
        assert!(!all[0].resolver.is_in_range(all[0].position(), all[1].position()));
    }

    #[test]
    fn test_attack_hysteresis() {
        let mut log = EventLog::new();
        let mut all = duo(1.0, &mut log);
        step(&mut all, 0, &mut log, 0.0);
        step(&mut all, 0, &mut log, 0.1);
        assert_eq!(all[0].state(), Some(AiState::Attacking));

        let range = all[0].stats.attack_range;
        all[1].rig.teleport(Vec3::new(range + 0.5, 0.0, 0.0));
        step(&mut all, 0, &mut log, 0.2);
        assert_eq!(all[0].state(), Some(AiState::Attacking));

        all[1].rig.teleport(Vec3::new(range + 1.0, 0.0, 0.0));
        step(&mut all, 0, &mut log, 0.3);
        assert_eq!(all[0].state(), Some(AiState::Seeking));
        assert!(all[0].rig.can_move());
    }

    #[test]
    fn test_low_health_flees_away_from_threat() {
        let mut log = EventLog::new();
        let mut all = duo(1.0, &mut log);
        all[0].health.take_damage(80.0, 0.0);

        step(&mut all, 0, &mut log, 0.0);
        assert_eq!(all[0].state(), Some(AiState::Fleeing));

        all[0].rig.advance(0.01);
        let destination = all[0].rig.destination().unwrap();
        assert!((destination.x + 8.0).abs() < 0.1, "{:?}", destination);
    }

    #[test]
    fn test_no_flee_without_threat() {
        let mut log = EventLog::new();
        let mut all = duo(1.0, &mut log);
        all[1].health.take_damage(1000.0, 0.0);
        all[0].health.take_damage(80.0, 0.0);

        step(&mut all, 0, &mut log, 0.0);
        assert_eq!(all[0].state(), Some(AiState::Idle));
    }

    #[test]
    fn test_recovered_health_resumes_seeking() {
        let mut log = EventLog::new();
        let mut all = duo(5.0, &mut log);
        all[0].health.take_damage(80.0, 0.0);
        step(&mut all, 0, &mut log, 0.0);
        assert_eq!(all[0].state(), Some(AiState::Fleeing));

        all[0].health.restore(50.0);
        step(&mut all, 0, &mut log, 0.1);
        assert_eq!(all[0].state(), Some(AiState::Seeking));
    }

    #[test]
    fn test_stun_keeps_movement_halted_until_next_tick() {
        let mut log = EventLog::new();
        let mut all = duo(6.0, &mut log);
        step(&mut all, 0, &mut log, 0.0);
        assert_eq!(all[0].state(), Some(AiState::Seeking));

        all[0].apply_stun(1.0, 0.1, &mut log);
        step(&mut all, 0, &mut log, 0.2);
        assert!(!all[0].rig.can_move());

        all[0].resources.tick(1.2, 0.1);
        assert!(!all[0].rig.can_move());
        step(&mut all, 0, &mut log, 1.2);
        assert!(all[0].rig.can_move());
    }

    #[test]
    fn test_death_is_terminal_and_shuts_down() {
        let mut log = EventLog::new();
        let mut all = duo(1.0, &mut log);
        all[0].health.take_damage(1000.0, 0.0);

        step(&mut all, 0, &mut log, 0.0);
        assert_eq!(all[0].state(), Some(AiState::Dead));
        assert!(!all[0].resolver.is_enabled());
        assert!(!all[0].rig.can_move());

        step(&mut all, 0, &mut log, 0.1);
        assert_eq!(all[0].state(), Some(AiState::Dead));
        assert_eq!(all[0].target(), None);
        assert_eq!(
            log.count_matching(|e| matches!(e, CombatEvent::StateChanged { to: AiState::Dead, .. })),
            1
        );
    }

    #[test]
    fn test_celebration_returns_to_idle() {
        let mut log = EventLog::new();
        let mut all = duo(3.0, &mut log);
        all[1].health.take_damage(1000.0, 0.0);

        all[0].celebrate(&mut log, 0.0);
        assert_eq!(all[0].state(), Some(AiState::Celebrating));

        step(&mut all, 0, &mut log, 1.0);
        assert_eq!(all[0].state(), Some(AiState::Celebrating));

        let duration = AiConfig::default().celebration_duration;
        step(&mut all, 0, &mut log, duration + 0.1);
        assert_eq!(all[0].state(), Some(AiState::Idle));
    }

    #[test]
    fn test_failed_path_is_logged() {
        let mut log = EventLog::new();
        let terrain = Arc::new(Terrain::flat(20.0));
        let mut rig = SimpleRig::new(terrain.clone(), Vec3::ZERO, 4.0);
        rig.fail_paths = true;
        let red = CombatantBuilder::new(CombatantId(1), "red", Team::Red)
            .stats(CombatStats::from_base(&BaseStats::default()))
            .rig(Box::new(rig))
            .build(&mut log);
        let blue = fighter_on(terrain, 2, Team::Blue, Vec3::new(6.0, 0.0, 0.0), &mut log);
        let mut all = vec![red, blue];

        step(&mut all, 0, &mut log, 0.0);
        assert_eq!(all[0].state(), Some(AiState::Seeking));
        assert_eq!(log.count_matching(|e| matches!(e, CombatEvent::PathFailed { .. })), 1);
    }

    #[test]
    fn test_jumps_toward_target_on_ledge() {
        let mut log = EventLog::new();
        let terrain = Arc::new(
            Terrain::flat(20.0).with_obstacle(Aabb::new(Vec3::new(2.0, 0.0, -1.0), Vec3::new(4.0, 1.5, 1.0))),
        );
        let mut all = vec![
            fighter_on(terrain.clone(), 1, Team::Red, Vec3::new(0.5, 0.0, 0.0), &mut log),
            fighter_on(terrain, 2, Team::Blue, Vec3::new(3.0, 1.5, 0.0), &mut log),
        ];

        step(&mut all, 0, &mut log, 0.0);
        step(&mut all, 0, &mut log, 0.1);
        assert_eq!(log.count_matching(|e| matches!(e, CombatEvent::Jumped { celebratory: false, .. })), 1);
        assert!(all[0].rig.velocity().y > 0.0);

        // Jump timer holds the next attempt
        step(&mut all, 0, &mut log, 0.2);
        assert_eq!(log.count_matching(|e| matches!(e, CombatEvent::Jumped { .. })), 1);
    }

    #[test]
    fn test_rejects_invalid_flee_threshold() {
        let config = AiConfig { flee_threshold: 1.5, ..AiConfig::default() };
        let stats = CombatStats::from_base(&BaseStats::default());
        assert!(AiStateMachine::new(config, &stats, 1).is_err());
    }
}
