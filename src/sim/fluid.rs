//! Oil and water pools
//!
//! Each pool keeps its droplet count in step with its level: droplets are
//! spawned or removed, never resized. Droplets rest on the lower of the bowl
//! floor and a flat pool surface, spread by a per-droplet depth offset.

use glam::Vec2;
use rand::Rng;

use crate::centered;
use crate::consts::*;

use super::bowl::Bowl;
use super::state::{FluidKind, FluidParticle};

/// Tuning for one fluid
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FluidParams {
    /// Droplets per level point
    pub per_level: f32,
    pub gravity: f32,
    /// Distance past the rim that counts as spilled
    pub spill_margin: f32,
    /// Pool depth per level point
    pub depth_per_level: f32,
    /// Horizontal damping on contact
    pub damping: f32,
    /// Pull toward the center while on the bowl floor
    pub slope_pull: f32,
    /// Random sideways jitter on the pool surface
    pub jitter: f32,
    /// Share of the wok velocity passed to the droplet
    pub coupling: Vec2,
    /// Sideways push from the wok tilt
    pub tilt_push: f32,
    /// Downward push for droplets climbing the upper walls
    pub rim_push: f32,
    /// Droplets spawned per frame while pouring
    pub pour_rate: usize,
}

impl FluidKind {
    pub const fn params(self) -> FluidParams {
        match self {
            FluidKind::Oil => FluidParams {
                per_level: 3.5,
                gravity: 0.8,
                spill_margin: 15.0,
                depth_per_level: 0.8,
                damping: 0.9,
                slope_pull: 0.06,
                jitter: 3.5,
                coupling: Vec2::new(0.03, 0.1),
                tilt_push: 1.0,
                rim_push: 2.0,
                pour_rate: 12,
            },
            FluidKind::Water => FluidParams {
                per_level: 4.0,
                gravity: 0.6,
                spill_margin: 5.0,
                depth_per_level: 0.9,
                damping: 0.95,
                slope_pull: 0.08,
                jitter: 4.5,
                coupling: Vec2::new(0.05, 0.15),
                tilt_push: 2.0,
                rim_push: 2.5,
                pour_rate: 15,
            },
        }
    }
}

/// Most droplets removed in one frame when the level drops
pub const MAX_REMOVED_PER_FRAME: usize = 10;
/// Wok velocity is clamped to this before coupling into particles
pub const MAX_COUPLED_VELOCITY: f32 = 18.0;

/// One pool of droplets
#[derive(Debug, Clone)]
pub struct FluidPool {
    kind: FluidKind,
    particles: Vec<FluidParticle>,
}

impl FluidPool {
    pub fn new(kind: FluidKind) -> Self {
        Self {
            kind,
            particles: Vec::new(),
        }
    }

    pub fn kind(&self) -> FluidKind {
        self.kind
    }

    pub fn particles(&self) -> &[FluidParticle] {
        &self.particles
    }

    pub fn particles_mut(&mut self) -> &mut Vec<FluidParticle> {
        &mut self.particles
    }

    pub fn len(&self) -> usize {
        self.particles.len()
    }

    pub fn is_empty(&self) -> bool {
        self.particles.is_empty()
    }

    /// Remove every droplet, handing them to the caller
    pub fn take(&mut self) -> Vec<FluidParticle> {
        std::mem::take(&mut self.particles)
    }

    pub fn clear(&mut self) {
        self.particles.clear();
    }

    pub fn target_count(&self, level: f32) -> usize {
        (level.max(0.0) * self.kind.params().per_level).floor() as usize
    }

    /// Spawn or remove droplets toward the level's target count.
    ///
    /// Oil appears at once unless it is being poured; water only arrives
    /// while pouring.
    pub fn sync<R: Rng + ?Sized>(&mut self, level: f32, pouring: bool, bowl: &Bowl, rng: &mut R) {
        let params = self.kind.params();
        let target = self.target_count(level);
        let current = self.particles.len();

        if target > current {
            let missing = target - current;
            let (count, instant) = match (self.kind, pouring) {
                (_, true) => (missing.min(params.pour_rate), false),
                (FluidKind::Oil, false) => (missing, true),
                (FluidKind::Water, false) => (0, false),
            };
            for _ in 0..count {
                let particle = if instant {
                    self.settled_drop(bowl, rng)
                } else {
                    self.falling_drop(bowl, rng)
                };
                self.particles.push(particle);
            }
        } else if target < current {
            for _ in 0..(current - target).min(MAX_REMOVED_PER_FRAME) {
                match self.particles.iter().position(|p| !p.spilled) {
                    Some(index) => {
                        self.particles.remove(index);
                    }
                    None => {
                        self.particles.pop();
                    }
                }
            }
        }
    }

    fn settled_drop<R: Rng + ?Sized>(&self, bowl: &Bowl, rng: &mut R) -> FluidParticle {
        FluidParticle {
            pos: Vec2::new(
                bowl.center.x + centered(rng, 100.0),
                bowl.center.y + 50.0 + rng.random::<f32>() * 50.0,
            ),
            vel: Vec2::new(centered(rng, 3.0), 0.0),
            size: 1.5 + rng.random::<f32>() * 2.0,
            spilled: false,
            depth_offset: rng.random(),
        }
    }

    fn falling_drop<R: Rng + ?Sized>(&self, bowl: &Bowl, rng: &mut R) -> FluidParticle {
        let (spread, drift, speed, size) = match self.kind {
            FluidKind::Oil => (10.0, 0.8, (8.0, 2.0), (1.5, 2.0)),
            FluidKind::Water => (20.0, 1.5, (10.0, 3.0), (2.0, 2.0)),
        };
        FluidParticle {
            pos: Vec2::new(
                bowl.center.x + centered(rng, spread),
                bowl.center.y - 180.0 - rng.random::<f32>() * 10.0,
            ),
            vel: Vec2::new(centered(rng, drift), speed.0 + rng.random::<f32>() * speed.1),
            size: size.0 + rng.random::<f32>() * size.1,
            spilled: false,
            depth_offset: rng.random(),
        }
    }

    /// Integrate one frame
    pub fn step<R: Rng + ?Sized>(&mut self, level: f32, bowl: &Bowl, wok_velocity: Vec2, frames: f32, rng: &mut R) {
        let params = self.kind.params();
        let coupled = wok_velocity.clamp(Vec2::splat(-MAX_COUPLED_VELOCITY), Vec2::splat(MAX_COUPLED_VELOCITY));
        let tilt = bowl.angle.sin() * params.tilt_push;
        let depth = level * params.depth_per_level;

        for p in &mut self.particles {
            p.vel.y += params.gravity * frames;
            p.pos += p.vel * frames;

            let dx = p.pos.x - bowl.center.x;
            if !p.spilled && bowl.is_outside_rim(p.pos, params.spill_margin, 20.0) {
                p.spilled = true;
            }
            if p.spilled {
                continue;
            }

            let (ground, clamped_dx, _) = bowl.ground_y(p.pos.x, 2.0, p.size);
            let surface = bowl.pool_surface_y(p.size, depth);
            let on_floor = surface >= ground;
            let rest = if on_floor {
                ground
            } else {
                surface + (ground - surface) * p.depth_offset
            };

            if p.pos.y >= rest {
                p.pos.y = rest;
                p.vel.y *= -0.1;
                p.vel.x *= params.damping;
                if on_floor {
                    p.vel.x -= clamped_dx * params.slope_pull;
                } else {
                    p.vel.x += centered(rng, params.jitter);
                }
                p.vel += coupled * params.coupling;
                p.vel.x += tilt;
            }

            if dx.abs() > bowl.radius * 0.7 && p.pos.y < bowl.center.y + 30.0 {
                p.vel.y += params.rim_push;
                p.vel.x *= 0.5;
            }
            bowl.contain(&mut p.pos, &mut p.vel, 5.0, 120.0);
        }

        self.particles.retain(|p| p.pos.y < CANVAS_HEIGHT + 100.0);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    #[test]
    fn test_oil_appears_at_once_when_not_pouring() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = FluidPool::new(FluidKind::Oil);
        pool.sync(20.0, false, &Bowl::at_rest(), &mut rng);
        assert_eq!(pool.len(), 70);
    }

    #[test]
    fn test_pouring_is_rate_limited() {
        let mut rng = Pcg32::seed_from_u64(1);
        let mut pool = FluidPool::new(FluidKind::Oil);
        pool.sync(20.0, true, &Bowl::at_rest(), &mut rng);
        assert_eq!(pool.len(), 12);
        assert!(pool.particles().iter().all(|p| p.pos.y < WOK_CENTER_Y - 170.0));
    }

    #[test]
    fn test_removal_prefers_droplets_in_the_pan() {
        let mut rng = Pcg32::seed_from_u64(2);
        let mut pool = FluidPool::new(FluidKind::Oil);
        let bowl = Bowl::at_rest();
        pool.sync(10.0, false, &bowl, &mut rng);
        assert_eq!(pool.len(), 35);
        pool.particles_mut()[0].spilled = true;
        pool.sync(0.0, false, &bowl, &mut rng);
        assert_eq!(pool.len(), 25);
        assert!(pool.particles()[0].spilled);
    }

    #[test]
    fn test_water_only_arrives_while_pouring() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut pool = FluidPool::new(FluidKind::Water);
        let bowl = Bowl::at_rest();
        pool.sync(30.0, false, &bowl, &mut rng);
        assert!(pool.is_empty());
        pool.sync(30.0, true, &bowl, &mut rng);
        assert_eq!(pool.len(), 15);
    }

    #[test]
    fn test_droplets_pool_in_the_bowl() {
        let mut rng = Pcg32::seed_from_u64(4);
        let mut pool = FluidPool::new(FluidKind::Oil);
        let bowl = Bowl::at_rest();
        for _ in 0..240 {
            pool.sync(30.0, true, &bowl, &mut rng);
            pool.step(30.0, &bowl, Vec2::ZERO, 1.0, &mut rng);
        }
        assert_eq!(pool.len(), 105);
        for p in pool.particles() {
            assert!(!p.spilled);
            assert!(p.pos.y > bowl.center.y);
            assert!((p.pos.x - bowl.center.x).abs() <= bowl.radius);
        }
    }
}
