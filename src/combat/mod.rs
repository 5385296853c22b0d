pub mod health;
pub mod resolver;
pub mod resources;
pub mod skills;
pub mod stats;

pub use health::{DamageOutcome, HealthEvent, HealthModel};
pub use resolver::{AttackOutcome, CombatResolver, Defender};
pub use resources::{CooldownKind, ResourceModel, ResourceTick, StatusFlags};
pub use stats::{BaseStats, CombatStats, WeaponModifiers};
