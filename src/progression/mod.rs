//! Post-match experience, leveling and profile persistence

pub mod engine;
pub mod profile;
pub mod store;

pub use engine::{ProgressionEngine, StatUpgrade, XpAward};
pub use profile::Profile;
pub use store::{JsonProfileStore, MemoryProfileStore, ProfileStore};
