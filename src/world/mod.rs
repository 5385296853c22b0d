//! Collaborator capabilities consumed by the AI
//!
//! Architecture: the core only talks to movement and physics through these
//! traits. `SimpleRig` over a `Terrain` is the headless implementation used
//! by the duel driver and the tests.

pub mod rig;
pub mod terrain;

pub use rig::SimpleRig;
pub use terrain::{Aabb, Terrain};

use glam::Vec3;

use crate::core::error::Result;
use crate::core::types::Seconds;

/// Path computation and steering toward a destination
pub trait Navigator {
    /// Current position; the navigator owns it
    fn position(&self) -> Vec3;

    /// Steer directly toward `point`, dropping any pending path request
    fn set_destination(&mut self, point: Vec3);

    fn destination(&self) -> Option<Vec3>;

    /// Ask for a path; it resolves on a later step (see `is_path_pending`)
    fn request_path(&mut self, from: Vec3, to: Vec3) -> Result<()>;

    fn can_move(&self) -> bool;

    fn set_can_move(&mut self, can_move: bool);

    fn is_path_pending(&self) -> bool;

    fn reached_destination(&self) -> bool;

    fn max_speed(&self) -> f32;

    fn set_max_speed(&mut self, speed: f32);

    /// Closest point a combatant can stand on
    fn nearest_navigable(&self, point: Vec3) -> Option<Vec3>;
}

/// Impulses, ground sensing and obstacle probes
pub trait Physics {
    fn apply_impulse(&mut self, impulse: Vec3);

    fn is_grounded(&self, point: Vec3, radius: f32, mask: u32) -> bool;

    /// True when a ray from `origin` hits an obstacle within `max_distance`
    fn probe_obstacle(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> bool;

    fn zero_velocity(&mut self);

    fn set_simulation_enabled(&mut self, enabled: bool);
}

/// A combatant's body in the world: both a navigator and a physics body
pub trait Rig: Navigator + Physics {
    /// Advance steering and physics; called by the driver once per step
    fn advance(&mut self, dt: Seconds);

    fn velocity(&self) -> Vec3;

    /// Move instantly (spawning, tests)
    fn teleport(&mut self, position: Vec3);
}
