//! Toss pad gesture mapping
//!
//! Turns raw pad-local pointer samples into a bounded toss vector and the
//! velocity-derived signals the cooking tick and physics engine consume.

use glam::Vec2;

use crate::audio::CueThrottle;
use crate::ease_factor;

/// Sample-to-sample movement that counts as a toss
pub const TOSS_TICK_VELOCITY: f32 = 0.08;
/// Movement hard enough to pull heat and whoosh
pub const SWEEP_VELOCITY: f32 = 0.15;
/// Any movement above this keeps food "tossing"
pub const MOVING_VELOCITY: f32 = 0.02;
/// Holding the pointer past this radius also counts as tossing
pub const RIM_HOLD_RADIUS: f32 = 0.8;
/// Minimum gap between whoosh cues (seconds)
pub const WHOOSH_COOLDOWN: f64 = 0.22;
/// Fraction of the way back to center covered per 60 Hz frame after release
pub const RELEASE_EASE: f32 = 0.4;
/// Heat never drops below this from tossing
pub const TOSS_HEAT_FLOOR: f32 = 5.0;

/// Pointer position normalized by the pad half-extents, with its host timestamp
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerSample {
    pub x: f32,
    pub y: f32,
    /// Host clock in seconds
    pub timestamp: f64,
}

impl PointerSample {
    pub fn new(x: f32, y: f32, timestamp: f64) -> Self {
        Self { x, y, timestamp }
    }
}

/// What one pointer sample produced
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GestureOutput {
    /// Toss vector, inside the unit disk
    pub toss: Vec2,
    /// Distance moved since the previous sample
    pub velocity: f32,
    pub is_tossing: bool,
    /// Movement crossed the toss threshold: refresh the last-toss clock
    pub toss_tick: bool,
    /// Hard sweep: apply the toss cooling to heat
    pub sweep: bool,
    /// Sweep that is allowed to voice a whoosh (cooldown respected)
    pub whoosh: bool,
}

/// Stateful pointer-to-toss mapper
#[derive(Debug, Clone)]
pub struct GestureMapper {
    toss: Vec2,
    prev: Vec2,
    held: bool,
    is_tossing: bool,
    whoosh: CueThrottle,
}

impl Default for GestureMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl GestureMapper {
    pub fn new() -> Self {
        Self {
            toss: Vec2::ZERO,
            prev: Vec2::ZERO,
            held: false,
            is_tossing: false,
            whoosh: CueThrottle::new(WHOOSH_COOLDOWN),
        }
    }

    /// Feed one pointer sample
    pub fn sample(&mut self, sample: PointerSample) -> GestureOutput {
        let raw = Vec2::new(sample.x, sample.y);
        let raw = if raw.is_finite() { raw } else { Vec2::ZERO };
        let dist = raw.length();
        let toss = if dist > 1.0 { raw / dist } else { raw };

        let velocity = (toss - self.prev).length();
        let toss_tick = velocity > TOSS_TICK_VELOCITY;
        let sweep = velocity > SWEEP_VELOCITY;
        let whoosh = sweep && self.whoosh.try_fire(sample.timestamp);
        let is_tossing = velocity > MOVING_VELOCITY || dist > RIM_HOLD_RADIUS;

        self.toss = toss;
        self.prev = toss;
        self.held = true;
        self.is_tossing = is_tossing;

        GestureOutput {
            toss,
            velocity,
            is_tossing,
            toss_tick,
            sweep,
            whoosh,
        }
    }

    /// Pointer lifted: stop tossing and let the vector drift home
    pub fn release(&mut self) {
        self.held = false;
        self.is_tossing = false;
        self.prev = Vec2::ZERO;
    }

    /// Ease a released toss vector toward center over `frames` 60 Hz frames
    pub fn ease(&mut self, frames: f32) -> Vec2 {
        if !self.held {
            self.toss *= 1.0 - ease_factor(RELEASE_EASE, frames);
            if self.toss.length_squared() < 1e-6 {
                self.toss = Vec2::ZERO;
            }
        }
        self.toss
    }

    pub fn toss(&self) -> Vec2 {
        self.toss
    }

    pub fn is_tossing(&self) -> bool {
        self.is_tossing
    }

    pub fn is_held(&self) -> bool {
        self.held
    }
}

/// Heat after a hard sweep; heat at or below the floor is left alone
pub fn sweep_heat(heat: f32, cooling: f32) -> f32 {
    if heat > TOSS_HEAT_FLOOR {
        (heat - cooling).max(TOSS_HEAT_FLOOR)
    } else {
        heat
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;

    #[test]
    fn test_still_pointer_is_not_tossing() {
        let mut mapper = GestureMapper::new();
        mapper.sample(PointerSample::new(0.1, 0.0, 0.0));
        let out = mapper.sample(PointerSample::new(0.1, 0.0, 0.016));
        assert!(!out.is_tossing);
        assert!(!out.toss_tick);
        assert_eq!(out.velocity, 0.0);
    }

    #[test]
    fn test_rim_hold_counts_as_tossing() {
        let mut mapper = GestureMapper::new();
        mapper.sample(PointerSample::new(0.0, 0.95, 0.0));
        let out = mapper.sample(PointerSample::new(0.0, 0.95, 0.1));
        assert!(out.is_tossing);
        assert!(!out.toss_tick);
    }

    #[test]
    fn test_sweep_thresholds_and_whoosh_cooldown() {
        let mut mapper = GestureMapper::new();
        let a = mapper.sample(PointerSample::new(0.1, 0.0, 0.0));
        assert!(a.toss_tick && !a.sweep);
        let b = mapper.sample(PointerSample::new(0.5, 0.0, 0.05));
        assert!(b.sweep && b.whoosh);
        let c = mapper.sample(PointerSample::new(-0.1, 0.0, 0.10));
        assert!(c.sweep && !c.whoosh);
        let d = mapper.sample(PointerSample::new(0.5, 0.0, 0.30));
        assert!(d.sweep && d.whoosh);
    }

    #[test]
    fn test_release_eases_home() {
        let mut mapper = GestureMapper::new();
        mapper.sample(PointerSample::new(0.8, 0.0, 0.0));
        mapper.release();
        assert!(!mapper.is_tossing());
        let after_one = mapper.ease(1.0);
        assert!((after_one.x - 0.48).abs() < 1e-5);
        for _ in 0..60 {
            mapper.ease(1.0);
        }
        assert_eq!(mapper.toss(), Vec2::ZERO);
    }

    #[test]
    fn test_held_vector_does_not_ease() {
        let mut mapper = GestureMapper::new();
        mapper.sample(PointerSample::new(0.5, 0.5, 0.0));
        assert_eq!(mapper.ease(3.0), Vec2::new(0.5, 0.5));
    }

    #[test]
    fn test_sweep_heat_floor() {
        assert_eq!(sweep_heat(80.0, 0.2), 79.8);
        assert_eq!(sweep_heat(5.1, 0.6), 5.0);
        assert_eq!(sweep_heat(3.0, 0.2), 3.0);
    }

    proptest! {
        #[test]
        fn prop_toss_stays_in_unit_disk(x in -50.0f32..50.0, y in -50.0f32..50.0) {
            let mut mapper = GestureMapper::new();
            let out = mapper.sample(PointerSample::new(x, y, 0.0));
            prop_assert!(out.toss.length() <= 1.0 + 1e-5);
        }
    }
}
