//! Wok motion and one-shot animations
//!
//! [`WokMotion`] turns the toss vector into an eased wok offset and angle,
//! plus the spring used by clean and trash throws. [`ServeAnimation`] tips
//! the pan onto a passing plate.

use glam::Vec2;
use rand::Rng;

use crate::consts::*;
use crate::{centered, ease_factor};

use super::bowl::Bowl;
use super::state::{CosmeticKind, CosmeticParticle, FluidParticle, FoodParticle};

/// Fraction of the way to the target pose covered per frame
pub const MOTION_EASE: f32 = 0.4;
/// Per-frame wok displacement that counts as moving
pub const MOVING_THRESHOLD: f32 = 1.0;
/// Spring kick for clean and trash throws
pub const THROW_VELOCITY: f32 = 80.0;
pub const THROW_SHAKE: f32 = 5.0;

/// Animated wok pose
#[derive(Debug, Clone)]
pub struct WokMotion {
    offset: Vec2,
    angle: f32,
    prev: Option<Vec2>,
    /// Wok displacement per 60 Hz frame
    velocity: Vec2,
    throw_pos: f32,
    throw_vel: f32,
    shake: f32,
}

impl Default for WokMotion {
    fn default() -> Self {
        Self::new()
    }
}

impl WokMotion {
    pub fn new() -> Self {
        Self {
            offset: Vec2::ZERO,
            angle: 0.0,
            prev: None,
            velocity: Vec2::ZERO,
            throw_pos: 0.0,
            throw_vel: 0.0,
            shake: 0.0,
        }
    }

    /// Kick the wok sideways to fling its contents
    pub fn throw(&mut self) {
        self.throw_vel = THROW_VELOCITY;
        self.shake = self.shake.max(THROW_SHAKE);
    }

    /// Advance the pose and return this frame's bowl
    pub fn update(&mut self, toss: Vec2, serve_tilt: f32, frames: f32) -> Bowl {
        if self.shake > 0.0 {
            self.shake *= 0.8f32.powf(frames);
            if self.shake < 0.5 {
                self.shake = 0.0;
            }
        }

        self.throw_vel -= self.throw_pos * 0.12 * frames;
        self.throw_vel *= 0.85f32.powf(frames);
        self.throw_pos += self.throw_vel * frames;

        let target = Vec2::new(
            toss.x * 90.0 + self.throw_pos + serve_tilt * 30.0,
            toss.y * 35.0 - self.throw_pos * 0.2,
        );
        let target_angle = toss.x * -0.35 + self.throw_pos * 0.012 + serve_tilt;

        let k = ease_factor(MOTION_EASE, frames);
        self.offset += (target - self.offset) * k;
        self.angle += (target_angle - self.angle) * k;

        let current = self.center();
        let prev = self.prev.unwrap_or(current);
        self.velocity = if frames > 0.0 { (current - prev) / frames } else { Vec2::ZERO };
        self.prev = Some(current);

        self.bowl()
    }

    pub fn center(&self) -> Vec2 {
        Vec2::new(WOK_CENTER_X, WOK_CENTER_Y) + self.offset
    }

    pub fn angle(&self) -> f32 {
        self.angle
    }

    pub fn bowl(&self) -> Bowl {
        Bowl::new(self.center(), self.angle)
    }

    pub fn velocity(&self) -> Vec2 {
        self.velocity
    }

    /// The wok moved more than a pixel per frame on either axis
    pub fn is_moving(&self) -> bool {
        self.velocity.x.abs() > MOVING_THRESHOLD || self.velocity.y.abs() > MOVING_THRESHOLD
    }

    pub fn shake(&self) -> f32 {
        self.shake
    }

    /// Random camera offset for this frame
    pub fn shake_offset<R: Rng + ?Sized>(&self, rng: &mut R) -> Vec2 {
        if self.shake <= 0.0 {
            return Vec2::ZERO;
        }
        Vec2::new(centered(rng, self.shake), centered(rng, self.shake))
    }

    pub fn reset(&mut self) {
        *self = Self::new();
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServePhase {
    /// Plate slides in from the right
    PlateIn,
    /// Food and oil ease onto the plate
    Pour,
    /// Plate slides away with the dish
    PlateOut,
}

/// A food particle on its way to the plate
#[derive(Debug, Clone)]
pub struct PlatedFood {
    pub particle: FoodParticle,
    pub target: Vec2,
    pub landed: bool,
}

/// An oil droplet on its way to the plate
#[derive(Debug, Clone)]
pub struct PlatedOil {
    pub pos: Vec2,
    pub size: f32,
    pub target: Vec2,
    pub landed: bool,
}

/// Frames before a phase gives up waiting
const PLATE_IN_TIMEOUT: f32 = 20.0;
const POUR_TIMEOUT: f32 = 30.0;
/// Squared distance that counts as landed
const LANDED_DIST_SQ: f32 = 9.0;

/// Tip the wok onto a plate that slides in and out
#[derive(Debug, Clone)]
pub struct ServeAnimation {
    phase: ServePhase,
    /// Frames spent in the current phase
    timer: f32,
    plate_x: f32,
    plate_target_x: f32,
    plate_top: f32,
    tilt: f32,
    food: Vec<PlatedFood>,
    oil: Vec<PlatedOil>,
}

impl ServeAnimation {
    pub fn new() -> Self {
        Self {
            phase: ServePhase::PlateIn,
            timer: 0.0,
            plate_x: CANVAS_WIDTH + 80.0,
            plate_target_x: WOK_CENTER_X + WOK_RADIUS + 30.0,
            plate_top: WOK_CENTER_Y + WOK_RADIUS * 0.6,
            tilt: 0.0,
            food: Vec::new(),
            oil: Vec::new(),
        }
    }

    pub fn phase(&self) -> ServePhase {
        self.phase
    }

    pub fn tilt(&self) -> f32 {
        self.tilt
    }

    pub fn plate_position(&self) -> Vec2 {
        Vec2::new(self.plate_x, self.plate_top)
    }

    pub fn plated_food(&self) -> &[PlatedFood] {
        &self.food
    }

    pub fn plated_oil(&self) -> &[PlatedOil] {
        &self.oil
    }

    /// Advance one frame. Returns true once the plate has left the screen.
    pub fn step<R: Rng + ?Sized>(
        &mut self,
        frames: f32,
        food: &mut Vec<FoodParticle>,
        oil: &mut Vec<FluidParticle>,
        cosmetics: &mut Vec<CosmeticParticle>,
        rng: &mut R,
    ) -> bool {
        self.timer += frames;
        match self.phase {
            ServePhase::PlateIn => {
                self.plate_x += (self.plate_target_x - self.plate_x) * ease_factor(0.25, frames);
                self.tilt += (0.4 - self.tilt) * ease_factor(0.15, frames);
                if (self.plate_x - self.plate_target_x).abs() < 3.0 || self.timer > PLATE_IN_TIMEOUT {
                    self.plate_x = self.plate_target_x;
                    self.enter(ServePhase::Pour);
                }
                false
            }
            ServePhase::Pour => {
                self.tilt += (0.5 - self.tilt) * ease_factor(0.2, frames);
                self.pour(food, oil, cosmetics, rng);

                let all_landed = self.settle_items(frames);
                if (all_landed && food.is_empty()) || self.timer > POUR_TIMEOUT {
                    for item in &mut self.food {
                        item.particle.pos = item.target;
                        item.landed = true;
                    }
                    for item in &mut self.oil {
                        item.pos = item.target;
                        item.landed = true;
                    }
                    self.enter(ServePhase::PlateOut);
                }
                false
            }
            ServePhase::PlateOut => {
                let slide = (10.0 + self.timer * 0.5) * frames;
                self.plate_x += slide;
                self.tilt += (0.0 - self.tilt) * ease_factor(0.25, frames);
                for item in &mut self.food {
                    item.particle.pos.x += slide;
                }
                for item in &mut self.oil {
                    item.pos.x += slide;
                }
                self.plate_x > CANVAS_WIDTH + 100.0
            }
        }
    }

    fn enter(&mut self, phase: ServePhase) {
        self.phase = phase;
        self.timer = 0.0;
    }

    fn pour<R: Rng + ?Sized>(
        &mut self,
        food: &mut Vec<FoodParticle>,
        oil: &mut Vec<FluidParticle>,
        cosmetics: &mut Vec<CosmeticParticle>,
        rng: &mut R,
    ) {
        let rate = (food.len() as f32 * 0.5).ceil().max(2.0) as usize;
        for _ in 0..rate {
            let Some(particle) = food.pop() else {
                break;
            };
            for _ in 0..2 {
                cosmetics.push(CosmeticParticle {
                    kind: CosmeticKind::Sparkle,
                    pos: particle.pos,
                    vel: Vec2::new(3.0 + rng.random::<f32>() * 8.0, -5.0 - rng.random::<f32>() * 6.0),
                    life: 0.0,
                    max_life: 15.0 + rng.random::<f32>() * 10.0,
                    size: 1.5 + rng.random::<f32>() * 2.0,
                    color: [1.0, 0.9, 0.47, 0.9],
                });
            }
            let target = Vec2::new(
                self.plate_target_x + centered(rng, 50.0),
                self.plate_top - 5.0 - rng.random::<f32>() * 15.0,
            );
            self.food.push(PlatedFood {
                particle,
                target,
                landed: false,
            });
        }

        while let Some(drop) = oil.pop() {
            let target = Vec2::new(
                self.plate_target_x + centered(rng, 40.0),
                self.plate_top - rng.random::<f32>() * 8.0,
            );
            self.oil.push(PlatedOil {
                pos: drop.pos,
                size: drop.size,
                target,
                landed: false,
            });
        }
    }

    /// Ease plated items toward their targets; true when all food has landed
    fn settle_items(&mut self, frames: f32) -> bool {
        let food_k = ease_factor(0.2, frames);
        let mut all_landed = true;
        for item in self.food.iter_mut().filter(|i| !i.landed) {
            item.particle.pos += (item.target - item.particle.pos) * food_k;
            if item.particle.pos.distance_squared(item.target) < LANDED_DIST_SQ {
                item.particle.pos = item.target;
                item.landed = true;
            } else {
                all_landed = false;
            }
        }

        let oil_k = ease_factor(0.25, frames);
        for item in self.oil.iter_mut().filter(|i| !i.landed) {
            item.pos += (item.target - item.pos) * oil_k;
            if item.pos.distance_squared(item.target) < LANDED_DIST_SQ {
                item.pos = item.target;
                item.landed = true;
            }
        }
        all_landed
    }
}

impl Default for ServeAnimation {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::catalog::IngredientFamily;
    use crate::sim::state::FoodShape;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    fn grain(x: f32) -> FoodParticle {
        FoodParticle {
            ingredient: "rice".into(),
            family: IngredientFamily::Grain,
            instance_id: 1,
            cohort_size: 4,
            pos: Vec2::new(x, WOK_CENTER_Y + 100.0),
            vel: Vec2::ZERO,
            rotation: 0.0,
            rotation_speed: 0.0,
            size: 6.0,
            shape: FoodShape::Round,
            spilled: false,
        }
    }

    #[test]
    fn test_motion_settles_at_rest() {
        let mut motion = WokMotion::new();
        for _ in 0..120 {
            motion.update(Vec2::ZERO, 0.0, 1.0);
        }
        assert!(!motion.is_moving());
        assert!(motion.center().distance(Vec2::new(WOK_CENTER_X, WOK_CENTER_Y)) < 1e-3);
    }

    #[test]
    fn test_toss_moves_wok() {
        let mut motion = WokMotion::new();
        motion.update(Vec2::ZERO, 0.0, 1.0);
        motion.update(Vec2::new(1.0, 0.0), 0.0, 1.0);
        assert!(motion.is_moving());
        assert!((motion.velocity().x - 36.0).abs() < 1e-3);
        assert!(motion.angle() < 0.0);
    }

    #[test]
    fn test_throw_spring_returns_and_shake_decays() {
        let mut motion = WokMotion::new();
        motion.throw();
        assert_eq!(motion.shake(), THROW_SHAKE);
        let mut peak: f32 = 0.0;
        for _ in 0..300 {
            motion.update(Vec2::ZERO, 0.0, 1.0);
            peak = peak.max(motion.center().x - WOK_CENTER_X);
        }
        assert!(peak > 50.0);
        assert!((motion.center().x - WOK_CENTER_X).abs() < 0.5);
        assert_eq!(motion.shake(), 0.0);
    }

    #[test]
    fn test_serve_runs_through_phases() {
        let mut rng = Pcg32::seed_from_u64(3);
        let mut anim = ServeAnimation::new();
        let mut food: Vec<FoodParticle> = (0..6).map(|i| grain(180.0 + i as f32 * 5.0)).collect();
        let mut oil = vec![FluidParticle {
            pos: Vec2::new(200.0, 360.0),
            vel: Vec2::ZERO,
            size: 2.0,
            spilled: false,
            depth_offset: 0.5,
        }];
        let mut cosmetics = Vec::new();

        let mut phases = vec![anim.phase()];
        let mut done = false;
        for _ in 0..400 {
            done = anim.step(1.0, &mut food, &mut oil, &mut cosmetics, &mut rng);
            if phases.last() != Some(&anim.phase()) {
                phases.push(anim.phase());
            }
            if done {
                break;
            }
        }
        assert!(done);
        assert_eq!(phases, vec![ServePhase::PlateIn, ServePhase::Pour, ServePhase::PlateOut]);
        assert!(food.is_empty() && oil.is_empty());
        assert_eq!(anim.plated_food().len(), 6);
        assert!(anim.plated_food().iter().all(|f| f.landed));
        assert_eq!(cosmetics.len(), 12);
    }

    #[test]
    fn test_pour_times_out_on_stragglers() {
        let mut rng = Pcg32::seed_from_u64(9);
        let mut anim = ServeAnimation::new();
        let mut food = vec![grain(-1.0e6)];
        let mut oil = Vec::new();
        let mut cosmetics = Vec::new();
        while anim.phase() == ServePhase::PlateIn {
            anim.step(1.0, &mut food, &mut oil, &mut cosmetics, &mut rng);
        }
        for _ in 0..40 {
            anim.step(1.0, &mut food, &mut oil, &mut cosmetics, &mut rng);
        }
        assert_eq!(anim.phase(), ServePhase::PlateOut);
        assert!(anim.plated_food()[0].landed);
    }
}
