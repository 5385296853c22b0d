//! Duel event log and presentation hooks
//!
//! Systems push events into the log as they happen. The driver forwards
//! new entries to an optional `Presenter` once per step.

use crate::ai::AiState;
use crate::combat::AttackOutcome;
use crate::core::types::{CombatantId, Seconds};
use crate::progression::StatUpgrade;

#[derive(Debug, Clone, PartialEq)]
pub enum CombatEvent {
    HealthChanged { id: CombatantId, current: f32, max: f32 },
    Died { id: CombatantId },
    StateChanged { id: CombatantId, from: AiState, to: AiState },
    TargetAcquired { id: CombatantId, target: CombatantId },
    Attack { attacker: CombatantId, target: CombatantId, outcome: AttackOutcome },
    Stunned { id: CombatantId, until: Seconds },
    StunCleared { id: CombatantId },
    Jumped { id: CombatantId, celebratory: bool },
    PathFailed { id: CombatantId, reason: String },
    AiDisabled { id: CombatantId, reason: String },
    Removed { id: CombatantId },
    MatchEnded { winner: Option<CombatantId> },
    LevelUp { character: String, level: u32, upgrade: StatUpgrade },
}

/// Log entry for duel events
#[derive(Debug, Clone, PartialEq)]
pub struct LoggedEvent {
    pub time: Seconds,
    pub event: CombatEvent,
}

#[derive(Debug, Clone, Default)]
pub struct EventLog {
    pub events: Vec<LoggedEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(&mut self, time: Seconds, event: CombatEvent) {
        self.events.push(LoggedEvent { time, event });
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }

    /// Entries recorded at or after `index`
    pub fn since(&self, index: usize) -> &[LoggedEvent] {
        self.events.get(index..).unwrap_or(&[])
    }

    pub fn count_matching(&self, predicate: impl Fn(&CombatEvent) -> bool) -> usize {
        self.events.iter().filter(|e| predicate(&e.event)).count()
    }
}

/// Receiver of the events a UI would bind to
pub trait Presenter {
    fn on_health_changed(&mut self, _id: CombatantId, _current: f32, _max: f32) {}

    fn on_death(&mut self, _id: CombatantId) {}

    fn on_state_changed(&mut self, _id: CombatantId, _state: AiState) {}
}

/// Feed logged events to a presenter
pub fn present(presenter: &mut dyn Presenter, events: &[LoggedEvent]) {
    for logged in events {
        match &logged.event {
            CombatEvent::HealthChanged { id, current, max } => {
                presenter.on_health_changed(*id, *current, *max)
            }
            CombatEvent::Died { id } => presenter.on_death(*id),
            CombatEvent::StateChanged { id, to, .. } => presenter.on_state_changed(*id, *to),
            _ => {}
        }
    }
}

/// Presenter that writes to the tracing log
#[derive(Debug, Default)]
pub struct TracingPresenter;

impl Presenter for TracingPresenter {
    fn on_health_changed(&mut self, id: CombatantId, current: f32, max: f32) {
        tracing::debug!(combatant = %id, "health {:.1}/{:.1}", current, max);
    }

    fn on_death(&mut self, id: CombatantId) {
        tracing::info!(combatant = %id, "died");
    }

    fn on_state_changed(&mut self, id: CombatantId, state: AiState) {
        tracing::debug!(combatant = %id, "state -> {:?}", state);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder {
        deaths: Vec<CombatantId>,
        states: Vec<AiState>,
        health: Vec<f32>,
    }

    impl Presenter for Recorder {
        fn on_health_changed(&mut self, _id: CombatantId, current: f32, _max: f32) {
            self.health.push(current);
        }

        fn on_death(&mut self, id: CombatantId) {
            self.deaths.push(id);
        }

        fn on_state_changed(&mut self, _id: CombatantId, state: AiState) {
            self.states.push(state);
        }
    }

    #[test]
    fn test_present_dispatches_only_new_entries() {
        let mut log = EventLog::new();
        let id = CombatantId(1);
        log.push(0.0, CombatEvent::StateChanged { id, from: AiState::Idle, to: AiState::Seeking });
        let cursor = log.len();
        log.push(1.0, CombatEvent::HealthChanged { id, current: 0.0, max: 10.0 });
        log.push(1.0, CombatEvent::Died { id });
        log.push(1.0, CombatEvent::Jumped { id, celebratory: false });

        let mut recorder = Recorder::default();
        present(&mut recorder, log.since(cursor));

        assert!(recorder.states.is_empty());
        assert_eq!(recorder.health, vec![0.0]);
        assert_eq!(recorder.deaths, vec![id]);
        assert!(log.since(99).is_empty());
    }
}
