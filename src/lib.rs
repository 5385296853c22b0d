//! Arena Duel - two-agent melee combat with persistent progression

pub mod ai;
pub mod arena;
pub mod combat;
pub mod core;
pub mod progression;
pub mod world;
