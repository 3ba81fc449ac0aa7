//! Simulation state and particle types
//!
//! The snapshot is the only data shared by the cooking tick and the physics
//! frame. Particles belong to the physics engine and are never persisted.

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use crate::catalog::{IngredientFamily, IngredientId};
use crate::clamp_level;
use crate::consts::*;

/// Residue left behind whenever a wok full of food is emptied
pub const EMPTYING_RESIDUE: f32 = 15.0;
/// Delight meter bounds
pub const DELIGHT_MIN: i32 = -10;
pub const DELIGHT_MAX: i32 = 10;

/// The shared mutable cooking state
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationSnapshot {
    pub heat: f32,
    pub oil: f32,
    pub cook: f32,
    pub burn: f32,
    pub wok_hei: f32,
    pub residue: f32,
    pub water: f32,
    pub water_dirtiness: f32,
    /// Ingredients in insertion order
    pub contents: Vec<IngredientId>,
    /// Derived from gesture velocity every sample
    pub is_tossing: bool,
    /// Session clock (seconds) of the last toss tick
    pub last_toss_time: Option<f64>,
    pub is_cleaning: bool,
    pub is_oiling: bool,
    /// Current toss vector inside the unit disk
    pub toss: Vec2,
}

impl Default for SimulationSnapshot {
    fn default() -> Self {
        Self {
            heat: 40.0,
            oil: 20.0,
            cook: 0.0,
            burn: 0.0,
            wok_hei: 0.0,
            residue: 0.0,
            water: 0.0,
            water_dirtiness: 0.0,
            contents: Vec::with_capacity(MAX_CONTENTS),
            is_tossing: false,
            last_toss_time: None,
            is_cleaning: false,
            is_oiling: false,
            toss: Vec2::ZERO,
        }
    }
}

impl SimulationSnapshot {
    pub fn has_food(&self) -> bool {
        !self.contents.is_empty()
    }

    pub fn is_burnt(&self) -> bool {
        self.burn >= LEVEL_MAX
    }

    pub fn set_heat(&mut self, heat: f32) {
        self.heat = clamp_level(heat);
    }

    /// Force every meter back into [0, 100]
    pub fn clamp_all(&mut self) {
        for level in [
            &mut self.heat,
            &mut self.oil,
            &mut self.cook,
            &mut self.burn,
            &mut self.wok_hei,
            &mut self.residue,
            &mut self.water,
            &mut self.water_dirtiness,
        ] {
            *level = clamp_level(*level);
        }
    }

    /// Empty the wok. Oil leaves with the food; residue grows if food was present.
    ///
    /// Returns whether anything was in the wok.
    pub fn clear_wok(&mut self) -> bool {
        let had_food = self.has_food();
        if had_food {
            self.residue = clamp_level(self.residue + EMPTYING_RESIDUE);
        }
        self.contents.clear();
        self.cook = 0.0;
        self.burn = 0.0;
        self.wok_hei = 0.0;
        self.oil = 0.0;
        had_food
    }
}

/// Player currencies and streaks
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Wallet {
    pub cash: f64,
    pub score: f64,
    /// Tip overflow beyond the per-serve cap
    pub goodwill: f64,
    /// Earned by gifting matched dishes
    pub soul: u32,
    /// Streak counter, never below 1
    pub combo: u32,
    /// Customer mood in [-10, 10]
    pub delight: i32,
    pub game_over: bool,
}

impl Default for Wallet {
    fn default() -> Self {
        Self::new(0.0)
    }
}

impl Wallet {
    pub fn new(cash: f64) -> Self {
        Self {
            cash,
            score: 0.0,
            goodwill: 0.0,
            soul: 0,
            combo: 1,
            delight: 0,
            game_over: false,
        }
    }

    pub fn reset_combo(&mut self) {
        self.combo = 1;
    }

    /// Shift delight, returning true if this change ended the shift
    pub fn adjust_delight(&mut self, delta: i32) -> bool {
        self.delight = (self.delight + delta).clamp(DELIGHT_MIN, DELIGHT_MAX);
        if self.delight <= DELIGHT_MIN && !self.game_over {
            self.game_over = true;
            return true;
        }
        false
    }
}

/// Per-shape render data for a food particle
#[derive(Debug, Clone, PartialEq)]
pub enum FoodShape {
    /// Ellipse or dot sized by `size`
    Round,
    /// Rectangular cut
    Rect { w: f32, h: f32 },
    /// Egg curd made of three soft blobs (offset, radius)
    Blobs([(Vec2, f32); 3]),
    /// Wavy ribbon
    Strand { w: f32, h: f32, wave_phase: f32, wave_amp: f32 },
    /// Curled body that bends with its velocity
    Curl { bend: f32 },
}

impl FoodShape {
    /// Footprint used for overlap resolution
    pub fn extent(&self, size: f32) -> f32 {
        match self {
            FoodShape::Rect { w, h } | FoodShape::Strand { w, h, .. } => (w + h) / 2.0,
            _ => size,
        }
    }
}

/// One visible piece of an ingredient cohort
#[derive(Debug, Clone, PartialEq)]
pub struct FoodParticle {
    pub ingredient: IngredientId,
    pub family: IngredientFamily,
    /// Shared by every particle spawned from one add
    pub instance_id: u32,
    pub cohort_size: u32,
    pub pos: Vec2,
    pub vel: Vec2,
    pub rotation: f32,
    pub rotation_speed: f32,
    pub size: f32,
    pub shape: FoodShape,
    pub spilled: bool,
}

impl FoodParticle {
    pub fn mass(&self) -> f32 {
        self.family.profile().mass
    }

    pub fn bounciness(&self) -> f32 {
        self.family.profile().bounciness
    }

    pub fn is_strand(&self) -> bool {
        matches!(self.shape, FoodShape::Strand { .. })
    }

    pub fn extent(&self) -> f32 {
        self.shape.extent(self.size)
    }
}

/// Which pool a fluid particle belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum FluidKind {
    Oil,
    Water,
}

/// A droplet of oil or water
#[derive(Debug, Clone, PartialEq)]
pub struct FluidParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    pub size: f32,
    pub spilled: bool,
    /// Fraction of the way from pool surface to pan floor (0..1)
    pub depth_offset: f32,
}

/// Draw order relative to the wok silhouette
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FlameLayer {
    Back,
    Front,
}

/// Burner flame tongue or ember
#[derive(Debug, Clone, PartialEq)]
pub struct FireParticle {
    pub pos: Vec2,
    pub vel: Vec2,
    /// Age in 60 Hz frames
    pub age: f32,
    pub max_age: f32,
    pub size: f32,
    pub layer: FlameLayer,
    pub wobble_phase: f32,
    pub wobble_speed: f32,
}

impl FireParticle {
    pub fn is_alive(&self) -> bool {
        self.age < self.max_age
    }
}

/// Purely decorative particles
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CosmeticKind {
    /// Sauce drops, flung water, trashed food
    Splash,
    /// Powder sprinkle
    Dust,
    Smoke,
    OilSmoke,
    Bubble,
    /// Serve sparkle
    Sparkle,
}

#[derive(Debug, Clone, PartialEq)]
pub struct CosmeticParticle {
    pub kind: CosmeticKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub life: f32,
    pub max_life: f32,
    pub size: f32,
    /// Linear RGBA
    pub color: [f32; 4],
}

impl CosmeticParticle {
    pub fn is_alive(&self) -> bool {
        self.life < self.max_life
    }

    /// 1 when fresh, 0 when expired
    pub fn fade(&self) -> f32 {
        (1.0 - self.life / self.max_life).clamp(0.0, 1.0)
    }
}

/// RNG state wrapper for serialization
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RngState {
    pub seed: u64,
    pub stream: u64,
}

impl RngState {
    pub fn new(seed: u64) -> Self {
        Self { seed, stream: 0 }
    }

    pub fn to_rng(&self) -> Pcg32 {
        Pcg32::seed_from_u64(self.seed ^ self.stream)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn loaded() -> SimulationSnapshot {
        SimulationSnapshot {
            contents: vec!["rice".into(), "egg".into()],
            cook: 60.0,
            burn: 20.0,
            wok_hei: 30.0,
            oil: 45.0,
            residue: 10.0,
            ..SimulationSnapshot::default()
        }
    }

    #[test]
    fn test_clear_wok_is_idempotent() {
        let mut snap = loaded();
        assert!(snap.clear_wok());
        let first = snap.clone();
        assert!(!snap.clear_wok());
        assert_eq!(snap, first);
        assert!(snap.contents.is_empty());
        assert_eq!(snap.oil, 0.0);
        assert_eq!(snap.residue, 25.0);
    }

    #[test]
    fn test_clamp_all() {
        let mut snap = SimulationSnapshot {
            heat: 120.0,
            oil: -4.0,
            water_dirtiness: f32::NAN,
            ..SimulationSnapshot::default()
        };
        snap.clamp_all();
        assert_eq!(snap.heat, 100.0);
        assert_eq!(snap.oil, 0.0);
        assert_eq!(snap.water_dirtiness, 0.0);
    }

    #[test]
    fn test_delight_game_over_once() {
        let mut wallet = Wallet::default();
        for _ in 0..4 {
            assert!(!wallet.adjust_delight(-2));
        }
        assert!(wallet.adjust_delight(-2));
        assert!(wallet.game_over);
        assert!(!wallet.adjust_delight(-2));
        assert_eq!(wallet.delight, DELIGHT_MIN);
    }

    #[test]
    fn test_shape_extent() {
        assert_eq!(FoodShape::Rect { w: 30.0, h: 10.0 }.extent(20.0), 20.0);
        assert_eq!(FoodShape::Round.extent(7.0), 7.0);
    }
}
