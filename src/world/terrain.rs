//! Arena geometry: a flat square floor with box obstacles
//!
//! Boxes double as platforms (their tops can be stood on) and as ceilings
//! when they float above the floor.

use glam::Vec3;

use crate::core::types::layers;

/// Axis-aligned box
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: Vec3,
    pub max: Vec3,
}

impl Aabb {
    pub fn new(min: Vec3, max: Vec3) -> Self {
        Self { min: min.min(max), max: min.max(max) }
    }

    /// Is (x, z) inside the footprint?
    pub fn covers(&self, x: f32, z: f32) -> bool {
        x >= self.min.x && x <= self.max.x && z >= self.min.z && z <= self.max.z
    }

    pub fn contains(&self, p: Vec3) -> bool {
        self.covers(p.x, p.z) && p.y > self.min.y && p.y < self.max.y
    }

    /// Slab test; distance along `dir` to the first hit, if any
    pub fn ray_hit(&self, origin: Vec3, dir: Vec3) -> Option<f32> {
        let mut t_min = 0.0_f32;
        let mut t_max = f32::INFINITY;

        for axis in 0..3 {
            let o = origin[axis];
            let d = dir[axis];
            let (lo, hi) = (self.min[axis], self.max[axis]);
            if d.abs() < 1e-6 {
                if o < lo || o > hi {
                    return None;
                }
            } else {
                let inv = 1.0 / d;
                let mut t0 = (lo - o) * inv;
                let mut t1 = (hi - o) * inv;
                if t0 > t1 {
                    std::mem::swap(&mut t0, &mut t1);
                }
                t_min = t_min.max(t0);
                t_max = t_max.min(t1);
                if t_min > t_max {
                    return None;
                }
            }
        }

        Some(t_min)
    }
}

#[derive(Debug, Clone)]
pub struct Terrain {
    pub floor_height: f32,
    /// Floor spans [-half_extent, half_extent] on x and z
    pub half_extent: f32,
    pub obstacles: Vec<Aabb>,
}

impl Default for Terrain {
    fn default() -> Self {
        Self::flat(20.0)
    }
}

impl Terrain {
    pub fn flat(half_extent: f32) -> Self {
        Self { floor_height: 0.0, half_extent, obstacles: Vec::new() }
    }

    pub fn with_obstacle(mut self, obstacle: Aabb) -> Self {
        self.obstacles.push(obstacle);
        self
    }

    /// Highest standable surface at (x, z) not above `y`
    pub fn surface_below(&self, x: f32, z: f32, y: f32, mask: u32) -> Option<f32> {
        let mut best = None;
        if mask & layers::GROUND != 0 && y >= self.floor_height - 1e-4 {
            best = Some(self.floor_height);
        }
        if mask & layers::OBSTACLE != 0 {
            for top in self
                .obstacles
                .iter()
                .filter(|b| b.covers(x, z) && b.max.y <= y + 1e-4)
                .map(|b| b.max.y)
            {
                best = Some(best.map_or(top, |h: f32| h.max(top)));
            }
        }
        best
    }

    pub fn in_bounds(&self, p: Vec3) -> bool {
        p.x.abs() <= self.half_extent + 1e-4 && p.z.abs() <= self.half_extent + 1e-4
    }

    pub fn clamp_to_bounds(&self, p: Vec3) -> Vec3 {
        Vec3::new(
            p.x.clamp(-self.half_extent, self.half_extent),
            p.y,
            p.z.clamp(-self.half_extent, self.half_extent),
        )
    }

    pub fn is_blocked(&self, p: Vec3) -> bool {
        self.obstacles.iter().any(|b| b.contains(p))
    }

    /// Snap a point into the arena and onto the surface beneath it
    pub fn nearest_navigable(&self, p: Vec3) -> Option<Vec3> {
        let clamped = self.clamp_to_bounds(p);
        let y = self.surface_below(clamped.x, clamped.z, clamped.y.max(self.floor_height), layers::ALL)?;
        let snapped = Vec3::new(clamped.x, y, clamped.z);
        if self.is_blocked(snapped) {
            None
        } else {
            Some(snapped)
        }
    }

    pub fn probe(&self, origin: Vec3, direction: Vec3, max_distance: f32, mask: u32) -> bool {
        if mask & layers::OBSTACLE == 0 {
            return false;
        }
        let dir = direction.normalize_or_zero();
        if dir == Vec3::ZERO {
            return false;
        }
        self.obstacles
            .iter()
            .filter_map(|b| b.ray_hit(origin, dir))
            .any(|t| t <= max_distance)
    }
}
