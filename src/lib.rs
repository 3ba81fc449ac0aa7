//! Wok Star - a real-time wok cooking simulation
//!
//! Core modules:
//! - `catalog`: Ingredient, recipe, flavor-combo and special-event tables
//! - `sim`: Deterministic simulation (cooking state, particles, orders, scoring)
//! - `settings`: Difficulty, mode and quality configuration
//! - `audio`: Sound cue vocabulary and the sink trait hosts implement
//! - `persistence`: Optional mid-session save envelope
//! - `view`: Flat sprite instances for any 2D drawing surface

pub mod audio;
pub mod catalog;
pub mod persistence;
pub mod settings;
pub mod sim;
pub mod view;

pub use catalog::{Catalog, IngredientId};
pub use settings::{Difficulty, GameMode, QualityPreset, Settings};
pub use sim::SimulationSession;

use rand::Rng;

/// Simulation configuration constants
pub mod consts {
    /// Cooking state tick (10 Hz)
    pub const COOK_DT: f32 = 0.1;
    /// Physics/render frame (60 Hz)
    pub const RENDER_DT: f32 = 1.0 / 60.0;
    /// Maximum cooking substeps per `advance` call to prevent spiral of death
    pub const MAX_SUBSTEPS: u32 = 8;
    /// Largest frame scale a single physics step will integrate
    pub const MAX_FRAME_SCALE: f32 = 3.0;

    /// Drawing surface dimensions (y grows downward)
    pub const CANVAS_WIDTH: f32 = 400.0;
    pub const CANVAS_HEIGHT: f32 = 400.0;

    /// Wok bowl geometry at rest
    pub const WOK_CENTER_X: f32 = CANVAS_WIDTH / 2.0;
    pub const WOK_CENTER_Y: f32 = CANVAS_HEIGHT / 2.0 + 30.0;
    pub const WOK_RADIUS: f32 = 140.0;

    /// Upper bound on ingredients in the wok
    pub const MAX_CONTENTS: usize = 25;
    /// Every meter lives in [0, LEVEL_MAX]
    pub const LEVEL_MAX: f32 = 100.0;
}

/// Clamp a meter value to [0, 100] (NaN collapses to 0)
#[inline]
pub fn clamp_level(value: f32) -> f32 {
    if value.is_nan() {
        0.0
    } else {
        value.clamp(0.0, consts::LEVEL_MAX)
    }
}

/// Per-frame easing factor scaled by frame count.
///
/// `rate` is the fraction covered in one 60 Hz frame; `frames` may be fractional.
#[inline]
pub fn ease_factor(rate: f32, frames: f32) -> f32 {
    1.0 - (1.0 - rate).powf(frames.max(0.0))
}

/// Uniform sample in [-span/2, span/2)
#[inline]
pub fn centered<R: Rng + ?Sized>(rng: &mut R, span: f32) -> f32 {
    (rng.random::<f32>() - 0.5) * span
}

/// Round currency to whole cents
#[inline]
pub fn round_cents(amount: f64) -> f64 {
    (amount * 100.0).round() / 100.0
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_clamp_level() {
        assert_eq!(clamp_level(-5.0), 0.0);
        assert_eq!(clamp_level(150.0), 100.0);
        assert_eq!(clamp_level(f32::NAN), 0.0);
        assert_eq!(clamp_level(42.5), 42.5);
    }

    #[test]
    fn test_ease_factor_matches_single_frame_rate() {
        assert!((ease_factor(0.4, 1.0) - 0.4).abs() < 1e-6);
        assert_eq!(ease_factor(0.4, 0.0), 0.0);
        assert!(ease_factor(0.4, 2.0) > 0.4);
    }

    #[test]
    fn test_round_cents() {
        assert_eq!(round_cents(6.6749), 6.67);
        assert_eq!(round_cents(3.0), 3.0);
    }
}
