//! Skill catalog
//!
//! Every known skill gets a cooldown slot when a combatant is created, so a
//! learned-but-never-used skill is still tracked (and ready). Costs and
//! cooldown lengths are tuning and live in `CombatConfig`.

pub const DASH: &str = "dash";
pub const PARRY: &str = "parry";
pub const CLEAVE: &str = "cleave";
pub const SECOND_WIND: &str = "second_wind";

/// All skills the arena knows about
pub const SKILL_CATALOG: &[&str] = &[DASH, PARRY, CLEAVE, SECOND_WIND];

pub fn is_known_skill(id: &str) -> bool {
    SKILL_CATALOG.contains(&id)
}
