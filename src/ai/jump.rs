//! Tactical jump heuristic
//!
//! Jump toward a target standing on higher ground, but only when the jump
//! timer allows it, we are on the ground, the target is close enough and
//! nothing is overhead. A jump denied only by the headroom probe retries
//! after half the usual interval.

use crate::core::config::AiConfig;

/// Inputs gathered for one jump decision
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct JumpCheck {
    pub cooldown_elapsed: bool,
    pub grounded: bool,
    pub has_target: bool,
    /// Target height minus own height
    pub height_advantage: f32,
    pub horizontal_distance: f32,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum JumpDecision {
    /// Conditions not met; timer untouched
    Hold,
    /// Everything but the headroom probe passed
    Blocked,
    Jump,
}

/// Decide whether to jump. The headroom probe only runs if everything else passed.
pub fn evaluate_jump(check: &JumpCheck, config: &AiConfig, headroom_clear: impl FnOnce() -> bool) -> JumpDecision {
    let wants_jump = check.cooldown_elapsed
        && check.grounded
        && check.has_target
        && check.height_advantage > config.jump_min_height
        && check.horizontal_distance < config.jump_max_distance;

    if !wants_jump {
        return JumpDecision::Hold;
    }

    if headroom_clear() {
        JumpDecision::Jump
    } else {
        JumpDecision::Blocked
    }
}

/// Seconds until the next jump decision after `decision`
pub fn jump_retry_delay(decision: JumpDecision, config: &AiConfig) -> Option<f32> {
    match decision {
        JumpDecision::Hold => None,
        JumpDecision::Blocked => Some(config.jump_cooldown * 0.5),
        JumpDecision::Jump => Some(config.jump_cooldown),
    }
}
