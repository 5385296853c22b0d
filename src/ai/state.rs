//! AI states and the legal transitions between them

use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub enum AiState {
    #[default]
    Idle,
    Seeking,
    Attacking,
    Fleeing,
    Celebrating,
    Dead,
}

impl AiState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, AiState::Dead)
    }

    /// States that lose their meaning without a target
    pub fn needs_target(&self) -> bool {
        matches!(self, AiState::Seeking | AiState::Attacking | AiState::Fleeing)
    }

    /// States driven by navigator movement
    pub fn is_moving(&self) -> bool {
        matches!(self, AiState::Seeking | AiState::Fleeing)
    }

    /// States whose exit re-enables movement
    pub fn halts_movement(&self) -> bool {
        matches!(self, AiState::Attacking | AiState::Fleeing | AiState::Celebrating)
    }

    /// Is `self -> to` an allowed edge?
    pub fn can_transition_to(&self, to: AiState) -> bool {
        use AiState::*;
        if *self == to || self.is_terminal() {
            return false;
        }
        match to {
            // Forced from any live state
            Dead | Fleeing | Celebrating => true,
            Seeking => matches!(self, Idle | Attacking | Fleeing),
            Attacking => matches!(self, Seeking),
            Idle => matches!(self, Seeking | Attacking | Fleeing | Celebrating),
        }
    }
}
