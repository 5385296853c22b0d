//! Combatant decision making

pub mod jump;
pub mod machine;
pub mod state;
pub mod targeting;

pub use machine::AiStateMachine;
pub use state::AiState;
