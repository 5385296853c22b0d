//! Kinematic combatant body over a `Terrain`
//!
//! Steering is straight-line toward the destination at `max_speed`.
//! Vertical motion integrates gravity and lands on the highest surface below.
//! Path requests resolve on the next `advance`, which is when
//! `is_path_pending` turns false.

use std::sync::Arc;

use glam::Vec3;

use crate::core::error::{ArenaError, Result};
use crate::core::types::{horizontal_distance, layers, Seconds};
use crate::world::terrain::Terrain;
use crate::world::{Navigator, Physics, Rig};

const GRAVITY: f32 = 9.81;
const STOPPING_DISTANCE: f32 = 0.1;
/// Ledges lower than this are walked up instead of blocking
const STEP_HEIGHT: f32 = 0.3;

#[derive(Debug, Clone)]
pub struct SimpleRig {
    terrain: Arc<Terrain>,
    position: Vec3,
    velocity: Vec3,
    destination: Option<Vec3>,
    pending_path: Option<Vec3>,
    can_move: bool,
    max_speed: f32,
    simulation_enabled: bool,
    /// Number of path requests accepted (telemetry)
    pub path_requests: u32,
    /// Reject every path request (failure injection)
    pub fail_paths: bool,
}

impl SimpleRig {
    pub fn new(terrain: Arc<Terrain>, position: Vec3, max_speed: f32) -> Self {
        Self {
            terrain,
            position,
            velocity: Vec3::ZERO,
            destination: None,
            pending_path: None,
            can_move: true,
            max_speed,
            simulation_enabled: true,
            path_requests: 0,
            fail_paths: false,
        }
    }

    pub fn simulation_enabled(&self) -> bool {
        self.simulation_enabled
    }

    fn surface_under(&self, p: Vec3) -> f32 {
        self.terrain
            .surface_below(p.x, p.z, p.y, layers::ALL)
            .unwrap_or(self.terrain.floor_height)
    }

    fn steer(&mut self, dt: Seconds) {
        let Some(destination) = self.destination else {
            self.velocity.x = 0.0;
            self.velocity.z = 0.0;
            return;
        };

        let to_go = Vec3::new(destination.x - self.position.x, 0.0, destination.z - self.position.z);
        let distance = to_go.length();
        if !self.can_move || distance <= STOPPING_DISTANCE {
            self.velocity.x = 0.0;
            self.velocity.z = 0.0;
            return;
        }

        let dir = to_go / distance;
        let step = (self.max_speed * dt).min(distance);
        let mut next = self.position + dir * step;
        next = self.terrain.clamp_to_bounds(next);

        // Walls taller than a step stop horizontal motion
        let probe = Vec3::new(next.x, self.position.y + STEP_HEIGHT, next.z);
        if self.terrain.is_blocked(probe) {
            self.velocity.x = 0.0;
            self.velocity.z = 0.0;
            return;
        }

        self.position.x = next.x;
        self.position.z = next.z;
        self.velocity.x = dir.x * self.max_speed;
        self.velocity.z = dir.z * self.max_speed;

        // Walk up low steps
        let ground = self.surface_under(Vec3::new(next.x, self.position.y + STEP_HEIGHT, next.z));
        if ground > self.position.y && ground - self.position.y <= STEP_HEIGHT {
            self.position.y = ground;
        }
    }

    fn fall(&mut self, dt: Seconds) {
        let ground = self.surface_under(self.position);
        let resting = (self.position.y - ground).abs() < 1e-4 && self.velocity.y <= 0.0;
        if resting {
            self.velocity.y = 0.0;
            self.position.y = ground;
            return;
        }

        self.velocity.y -= GRAVITY * dt;
        let previous_y = self.position.y;
        self.position.y += self.velocity.y * dt;

        if self.velocity.y <= 0.0 {
            let landing = self
                .terrain
                .surface_below(self.position.x, self.position.z, previous_y, layers::ALL)
                .unwrap_or(self.terrain.floor_height);
            if self.position.y <= landing {
                self.position.y = landing;
                self.velocity.y = 0.0;
            }
        }
    }
}

impl Navigator for SimpleRig {
    fn position(&self) -> Vec3 {
        self.position
    }

    fn set_destination(&mut self, point: Vec3) {
        self.pending_path = None;
        self.destination = Some(point);
    }

    fn destination(&self) -> Option<Vec3> {
        self.destination
    }

    fn request_path(&mut self, _from: Vec3, to: Vec3) -> Result<()> {
        if self.fail_paths {
            return Err(ArenaError::NavigationError("path service unavailable".into()));
        }
        if !self.terrain.in_bounds(to) {
            return Err(ArenaError::NavigationError(format!(
                "destination ({:.1}, {:.1}) outside arena",
                to.x, to.z
            )));
        }
        if self.terrain.is_blocked(to) {
            return Err(ArenaError::NavigationError("destination inside an obstacle".into()));
        }
        self.pending_path = Some(to);
        self.path_requests += 1;
        Ok(())
    }

    fn can_move(&self) -> bool {
        self.can_move
    }

    fn set_can_move(&mut self, can_move: bool) {
        self.can_move = can_move;
    }

    fn is_path_pending(&self) -> bool {
        self.pending_path.is_some()
    }

    fn reached_destination(&self) -> bool {
        self.destination
            .map(|d| horizontal_distance(self.position, d) <= STOPPING_DISTANCE)
            .unwrap_or(true)
    }

    fn max_speed(&self) -> f32 {
        self.max_speed
    }

    fn set_max_speed(&mut self, speed: f32) {
        self.max_speed = speed.max(0.0);
    }

    fn nearest_navigable(&self, point: Vec3) -> Option<Vec3> {
        self.terrain.nearest_navigable(point)
    }
}

impl Physics for SimpleRig {
    fn apply_impulse(&mut self, impulse: Vec3) {
        if self.simulation_enabled {
            self.velocity += impulse;
        }
    }

    fn is_grounded(&self, point: Vec3, radius: f32, mask: u32) -> bool {
        self.terrain
            .surface_below(point.x, point.z, point.y + radius, mask)
            .map(|surface| point.y - surface <= radius)
            .unwrap_or(false)
    }

    fn probe_obstacle(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> bool {
        self.terrain.probe(origin, direction, max_distance, mask)
    }

    fn zero_velocity(&mut self) {
        self.velocity = Vec3::ZERO;
    }

    fn set_simulation_enabled(&mut self, enabled: bool) {
        self.simulation_enabled = enabled;
        if !enabled {
            self.velocity = Vec3::ZERO;
        }
    }
}

impl Rig for SimpleRig {
    fn advance(&mut self, dt: Seconds) {
        if !self.simulation_enabled || dt <= 0.0 {
            return;
        }
        if let Some(to) = self.pending_path.take() {
            self.destination = Some(to);
        }
        self.steer(dt);
        self.fall(dt);
    }

    fn velocity(&self) -> Vec3 {
        self.velocity
    }

    fn teleport(&mut self, position: Vec3) {
        self.position = position;
    }
}
