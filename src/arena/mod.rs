//! Combatants, the duel driver and its event log

pub mod combatant;
pub mod duel;
pub mod events;
pub mod roster;

pub use combatant::{Combatant, CombatantBuilder};
pub use duel::{CombatantSummary, Duel, DuelPhase, DuelReport, Entrant};
pub use events::{CombatEvent, EventLog, LoggedEvent, Presenter, TracingPresenter};
pub use roster::{split_roster, Others};
