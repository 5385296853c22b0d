//! One-on-one match orchestration
//!
//! The driver owns the simulation clock. Each `step` runs, in order:
//! resource timers, AI decisions (roster order), health and death
//! bookkeeping, physics, removal of the fallen, end-of-match detection.
//! New log entries are forwarded to the presenter at the end of the step.

use std::sync::Arc;

use glam::Vec3;
use serde::Serialize;
use uuid::Uuid;

use crate::ai::AiState;
use crate::arena::combatant::{Combatant, CombatantBuilder};
use crate::arena::events::{present, CombatEvent, EventLog, Presenter};
use crate::arena::roster::split_roster;
use crate::combat::{CombatStats, HealthEvent};
use crate::core::config::ArenaConfig;
use crate::core::error::Result;
use crate::core::types::{CombatantId, Seconds, Team};
use crate::progression::{Profile, ProfileStore, ProgressionEngine, XpAward};
use crate::world::{Rig, SimpleRig, Terrain};

/// A character entering the arena
#[derive(Debug, Clone)]
pub struct Entrant {
    pub character_id: String,
    pub profile: Profile,
}

impl Entrant {
    pub fn new(character_id: impl Into<String>, profile: Profile) -> Self {
        Self { character_id: character_id.into(), profile }
    }

    /// Entrant with whatever the engine has stored for `character_id`
    pub fn load<S: ProfileStore>(character_id: &str, engine: &ProgressionEngine<S>) -> Self {
        Self::new(character_id, engine.load_or_create(character_id))
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub enum DuelPhase {
    #[default]
    Fighting,
    /// Decided; holding for the post-match delay
    Ending,
    Finished,
}

/// Final state of one combatant
#[derive(Debug, Clone, Serialize)]
pub struct CombatantSummary {
    pub character_id: String,
    pub team: Team,
    pub health: f32,
    pub max_health: f32,
    pub state: Option<AiState>,
}

/// Serializable match result
#[derive(Debug, Clone, Serialize)]
pub struct DuelReport {
    pub match_id: Uuid,
    pub winner: Option<String>,
    pub winner_team: Option<Team>,
    /// Simulation time at which the match was decided
    pub decided_at: Seconds,
    pub timed_out: bool,
    pub xp_awards: Vec<XpAward>,
    /// Experience that was earned but could not be persisted
    pub progression_errors: Vec<String>,
    /// Combatants still standing when the report was taken
    pub survivors: Vec<CombatantSummary>,
    pub events: usize,
}

pub struct Duel {
    config: ArenaConfig,
    match_id: Uuid,
    now: Seconds,
    combatants: Vec<Combatant>,
    log: EventLog,
    presenter: Option<Box<dyn Presenter>>,
    presented: usize,
    phase: DuelPhase,
    winner: Option<CombatantId>,
    winner_name: Option<(String, Team)>,
    decided_at: Option<Seconds>,
    finish_at: Option<Seconds>,
    timed_out: bool,
    awards: Vec<XpAward>,
    progression_errors: Vec<String>,
}

impl Duel {
    /// Spawn both entrants on opposite sides of the arena center
    pub fn new(config: ArenaConfig, terrain: Arc<Terrain>, red: Entrant, blue: Entrant, seed: u64) -> Result<Self> {
        config.validate()?;

        let mut log = EventLog::new();
        let half = config.duel.spawn_separation * 0.5;
        let red = Self::spawn(&config, &terrain, red, CombatantId(1), Team::Red, Vec3::new(-half, 0.0, 0.0), seed, &mut log);
        let blue = Self::spawn(&config, &terrain, blue, CombatantId(2), Team::Blue, Vec3::new(half, 0.0, 0.0), seed.wrapping_add(1), &mut log);

        let match_id = Uuid::new_v4();
        tracing::info!(%match_id, "{} (red) vs {} (blue)", red.name, blue.name);

        Ok(Self {
            config,
            match_id,
            now: 0.0,
            combatants: vec![red, blue],
            log,
            presenter: None,
            presented: 0,
            phase: DuelPhase::Fighting,
            winner: None,
            winner_name: None,
            decided_at: None,
            finish_at: None,
            timed_out: false,
            awards: Vec::new(),
            progression_errors: Vec::new(),
        })
    }

    #[allow(clippy::too_many_arguments)]
    fn spawn(
        config: &ArenaConfig,
        terrain: &Arc<Terrain>,
        entrant: Entrant,
        id: CombatantId,
        team: Team,
        at: Vec3,
        seed: u64,
        log: &mut EventLog,
    ) -> Combatant {
        let stats = CombatStats::assemble(&config.base_stats, &entrant.profile);
        let at = terrain.nearest_navigable(at).unwrap_or(at);
        let rig = SimpleRig::new(terrain.clone(), at, stats.move_speed);

        CombatantBuilder::new(id, entrant.character_id, team)
            .stats(stats)
            .skills(&entrant.profile.skills)
            .rig(Box::new(rig))
            .ai_config(config.ai.clone())
            .combat_config(config.combat.clone())
            .seed(seed)
            .build(log)
    }

    pub fn set_presenter(&mut self, presenter: Box<dyn Presenter>) {
        self.presenter = Some(presenter);
    }

    pub fn match_id(&self) -> Uuid {
        self.match_id
    }

    pub fn now(&self) -> Seconds {
        self.now
    }

    pub fn phase(&self) -> DuelPhase {
        self.phase
    }

    pub fn is_finished(&self) -> bool {
        self.phase == DuelPhase::Finished
    }

    pub fn winner(&self) -> Option<CombatantId> {
        self.winner
    }

    pub fn log(&self) -> &EventLog {
        &self.log
    }

    /// Combatants still in the arena (the fallen leave after their grace delay)
    pub fn combatants(&self) -> &[Combatant] {
        &self.combatants
    }

    pub fn combatant(&self, id: CombatantId) -> Option<&Combatant> {
        self.combatants.iter().find(|c| c.id == id)
    }

    pub fn combatant_mut(&mut self, id: CombatantId) -> Option<&mut Combatant> {
        self.combatants.iter_mut().find(|c| c.id == id)
    }

    /// Advance the match by one fixed step
    pub fn step<S: ProfileStore>(&mut self, engine: &mut ProgressionEngine<S>) -> Result<DuelPhase> {
        if self.phase == DuelPhase::Finished {
            return Ok(self.phase);
        }

        let dt = self.config.duel.tick_seconds;
        self.now += dt;
        let now = self.now;

        for c in &mut self.combatants {
            if c.resources.tick(now, dt).stun_cleared {
                self.log.push(now, CombatEvent::StunCleared { id: c.id });
            }
        }

        for index in 0..self.combatants.len() {
            let (me, mut others) = split_roster(&mut self.combatants, index);
            // Once decided, only the winner keeps thinking
            if self.phase != DuelPhase::Fighting && Some(me.id) != self.winner {
                continue;
            }
            if let Some(mut brain) = me.brain.take() {
                brain.tick(me, &mut others, &mut self.log, now);
                me.brain = Some(brain);
            }
        }

        for c in &mut self.combatants {
            for event in c.health.drain_events() {
                match event {
                    HealthEvent::Changed { current, max } => {
                        self.log.push(now, CombatEvent::HealthChanged { id: c.id, current, max });
                    }
                    HealthEvent::Died => {
                        tracing::info!(combatant = %c.id, "{} has fallen", c.name);
                        self.log.push(now, CombatEvent::Died { id: c.id });
                        c.handle_death(&mut self.log, now);
                    }
                }
            }
        }

        for c in &mut self.combatants {
            c.rig.advance(dt);
        }

        let log = &mut self.log;
        self.combatants.retain(|c| {
            let expired = c.health.removal_at().is_some_and(|at| now >= at);
            if expired {
                tracing::debug!(combatant = %c.id, "removed from arena");
                log.push(now, CombatEvent::Removed { id: c.id });
            }
            !expired
        });

        match self.phase {
            DuelPhase::Fighting => {
                let alive = self.combatants.iter().filter(|c| c.is_alive()).count();
                let out_of_time = now >= self.config.duel.max_seconds;
                if alive <= 1 || out_of_time {
                    self.timed_out = alive > 1;
                    self.conclude(engine, now);
                }
            }
            DuelPhase::Ending => {
                if self.finish_at.is_some_and(|at| now >= at) {
                    tracing::info!(match_id = %self.match_id, "match finished");
                    self.phase = DuelPhase::Finished;
                }
            }
            DuelPhase::Finished => {}
        }

        if let Some(presenter) = self.presenter.as_mut() {
            present(presenter.as_mut(), self.log.since(self.presented));
        }
        self.presented = self.log.len();

        Ok(self.phase)
    }

    /// Step until the post-match delay has run out
    pub fn run<S: ProfileStore>(&mut self, engine: &mut ProgressionEngine<S>) -> Result<DuelReport> {
        while self.step(engine)? != DuelPhase::Finished {}
        Ok(self.report())
    }

    /// Declare the result, start the post-match hold and reward a sole survivor
    ///
    /// The decision is committed before any XP is granted; a failed save is
    /// logged and reported, never retried.
    fn conclude<S: ProfileStore>(&mut self, engine: &mut ProgressionEngine<S>, now: Seconds) {
        let survivor = if self.timed_out {
            None
        } else {
            self.combatants.iter().position(|c| c.is_alive())
        };

        self.winner = survivor.map(|i| self.combatants[i].id);
        self.decided_at = Some(now);
        self.finish_at = Some(now + self.config.duel.post_match_delay);
        self.phase = DuelPhase::Ending;
        self.log.push(now, CombatEvent::MatchEnded { winner: self.winner });

        let Some(index) = survivor else {
            if self.timed_out {
                tracing::info!(match_id = %self.match_id, "time limit reached, draw");
            } else {
                tracing::info!(match_id = %self.match_id, "no survivors, draw");
            }
            return;
        };

        let winner = &mut self.combatants[index];
        tracing::info!(match_id = %self.match_id, "{} wins at {:.1}s", winner.name, now);
        self.winner_name = Some((winner.name.clone(), winner.team));
        winner.celebrate(&mut self.log, now);

        let xp = engine.victory_xp(winner.health.ratio());
        match engine.grant_xp(&winner.name, xp) {
            Ok(Some(award)) => {
                for (i, upgrade) in award.upgrades.iter().enumerate() {
                    self.log.push(
                        now,
                        CombatEvent::LevelUp {
                            character: award.character.clone(),
                            level: award.level_before + i as u32 + 1,
                            upgrade: *upgrade,
                        },
                    );
                }
                self.awards.push(award);
            }
            Ok(None) => {}
            Err(e) => {
                tracing::warn!(match_id = %self.match_id, "could not save progression for {}: {}", winner.name, e);
                self.progression_errors.push(format!("{}: {}", winner.name, e));
            }
        }
    }

    pub fn report(&self) -> DuelReport {
        DuelReport {
            match_id: self.match_id,
            winner: self.winner_name.as_ref().map(|(name, _)| name.clone()),
            winner_team: self.winner_name.as_ref().map(|(_, team)| *team),
            decided_at: self.decided_at.unwrap_or(self.now),
            timed_out: self.timed_out,
            xp_awards: self.awards.clone(),
            progression_errors: self.progression_errors.clone(),
            survivors: self
                .combatants
                .iter()
                .filter(|c| c.is_alive())
                .map(|c| CombatantSummary {
                    character_id: c.name.clone(),
                    team: c.team,
                    health: c.health.current(),
                    max_health: c.health.max(),
                    state: c.state(),
                })
                .collect(),
            events: self.log.len(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::error::ArenaError;
    use crate::progression::MemoryProfileStore;

    /// Store whose disk is always full
    struct ReadOnlyStore;

    impl ProfileStore for ReadOnlyStore {
        fn load_profile(&self, _character_id: &str) -> Option<Profile> {
            None
        }

        fn save_profile(&mut self, _profile: &Profile, _character_id: &str) -> Result<()> {
            Err(ArenaError::IoError(std::io::Error::new(std::io::ErrorKind::Other, "disk full")))
        }
    }

    fn quick_config() -> ArenaConfig {
        let mut config = ArenaConfig::default();
        config.duel.spawn_separation = 4.0;
        config.duel.post_match_delay = 1.0;
        config.duel.max_seconds = 60.0;
        config
    }

    fn engine() -> ProgressionEngine<MemoryProfileStore> {
        ProgressionEngine::new(MemoryProfileStore::new(), quick_config().progression, 3)
    }

    #[test]
    fn test_spawns_on_opposite_teams() {
        let duel = Duel::new(
            quick_config(),
            Arc::new(Terrain::default()),
            Entrant::new("red", Profile::new_default()),
            Entrant::new("blue", Profile::new_default()),
            1,
        )
        .unwrap();

        let [red, blue] = duel.combatants() else { panic!("expected two combatants") };
        assert_eq!(red.team, Team::Red);
        assert_eq!(blue.team, Team::Blue);
        assert!((red.position().distance(blue.position()) - 4.0).abs() < 0.001);
        assert_eq!(duel.phase(), DuelPhase::Fighting);
    }

    #[test]
    fn test_stronger_fighter_wins_and_levels() {
        let mut strong = Profile::new_default();
        strong.weapon = "axe".into();
        strong.bonus_health = 100.0;

        let mut engine = engine();
        let mut duel = Duel::new(
            quick_config(),
            Arc::new(Terrain::default()),
            Entrant::new("champion", strong),
            Entrant::new("novice", Profile::new_default()),
            9,
        )
        .unwrap();

        let report = duel.run(&mut engine).unwrap();

        assert_eq!(report.winner.as_deref(), Some("champion"));
        assert_eq!(report.winner_team, Some(Team::Red));
        assert!(!report.timed_out);
        assert_eq!(report.xp_awards.len(), 1);
        assert!(report.xp_awards[0].amount >= 100);
        assert_eq!(engine.store().get("champion").unwrap().level, 2);
        assert!(engine.store().get("novice").is_none());
        assert!(duel.log().count_matching(|e| matches!(e, CombatEvent::LevelUp { .. })) >= 1);
        assert_eq!(duel.log().count_matching(|e| matches!(e, CombatEvent::MatchEnded { .. })), 1);
    }

    #[test]
    fn test_time_limit_is_a_draw() {
        let mut config = quick_config();
        config.duel.spawn_separation = 30.0;
        config.duel.max_seconds = 0.5;

        let mut engine = engine();
        let mut duel = Duel::new(
            config,
            Arc::new(Terrain::default()),
            Entrant::new("a", Profile::new_default()),
            Entrant::new("b", Profile::new_default()),
            2,
        )
        .unwrap();

        let report = duel.run(&mut engine).unwrap();
        assert!(report.timed_out);
        assert_eq!(report.winner, None);
        assert!(report.xp_awards.is_empty());
        assert_eq!(engine.store().saves, 0);
    }

    #[test]
    fn test_finishes_only_after_post_match_delay() {
        let mut engine = engine();
        let mut duel = Duel::new(
            quick_config(),
            Arc::new(Terrain::default()),
            Entrant::new("a", Profile::new_default()),
            Entrant::new("b", Profile::new_default()),
            4,
        )
        .unwrap();
        duel.combatant_mut(CombatantId(2)).unwrap().health.take_damage(1000.0, 0.0);

        assert_eq!(duel.step(&mut engine).unwrap(), DuelPhase::Ending);
        let decided = duel.now();
        while duel.step(&mut engine).unwrap() != DuelPhase::Finished {}
        assert!(duel.now() >= decided + 1.0);
        assert_eq!(duel.combatant(CombatantId(1)).unwrap().state(), Some(AiState::Celebrating));
    }

    #[test]
    fn test_failed_save_still_concludes_once() {
        let config = quick_config();
        let mut engine = ProgressionEngine::new(ReadOnlyStore, config.progression.clone(), 3);
        let mut duel = Duel::new(
            config,
            Arc::new(Terrain::default()),
            Entrant::new("a", Profile::new_default()),
            Entrant::new("b", Profile::new_default()),
            5,
        )
        .unwrap();
        duel.combatant_mut(CombatantId(2)).unwrap().health.take_damage(1000.0, 0.0);

        assert_eq!(duel.step(&mut engine).unwrap(), DuelPhase::Ending);
        assert_eq!(duel.winner(), Some(CombatantId(1)));
        assert_eq!(duel.combatant(CombatantId(1)).unwrap().state(), Some(AiState::Celebrating));

        let report = duel.run(&mut engine).unwrap();
        assert_eq!(report.winner.as_deref(), Some("a"));
        assert!(report.xp_awards.is_empty());
        assert_eq!(report.progression_errors.len(), 1);
        assert_eq!(duel.log().count_matching(|e| matches!(e, CombatEvent::MatchEnded { .. })), 1);
    }

    #[test]
    fn test_report_lists_only_the_living() {
        let mut config = quick_config();
        config.combat.grace_delay = 10.0;

        let mut engine = engine();
        let mut duel = Duel::new(
            config,
            Arc::new(Terrain::default()),
            Entrant::new("a", Profile::new_default()),
            Entrant::new("b", Profile::new_default()),
            6,
        )
        .unwrap();
        duel.combatant_mut(CombatantId(2)).unwrap().health.take_damage(1000.0, 0.0);

        let report = duel.run(&mut engine).unwrap();
        // The fallen fighter is still in the arena, but not a survivor
        assert_eq!(duel.combatants().len(), 2);
        assert_eq!(report.survivors.len(), 1);
        assert_eq!(report.survivors[0].character_id, "a");
    }
}
