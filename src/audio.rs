//! Sound cue vocabulary
//!
//! The simulation never synthesizes audio. It names one-shot effects and
//! continuous loop levels; hosts implement [`AudioSink`] to voice them.

use serde::{Deserialize, Serialize};

/// How an ingredient sounds when it hits the pan
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum SoundProfile {
    /// Wet slap with a hiss (egg, meat, prawn)
    Wet,
    /// Sauce splash
    Liquid,
    /// Crisp rustle (greens, chili)
    Dry,
    /// Dull thud (rice, noodles)
    Heavy,
    /// Light sprinkle (spices, aromatics)
    Powder,
}

/// Sound effect types
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SoundEffect {
    /// Knife on board before an ingredient drops in
    Chop,
    /// Order bell after a serve
    Ding { perfect: bool },
    /// Food dumped out of the wok
    Trash,
    /// Hard toss sweep
    TossWhoosh,
    /// Food landing back in the pan mid-toss
    FoodImpact,
    /// Ingredient dropped into the wok
    IngredientAdd(SoundProfile),
}

/// Receiver for sound cues
pub trait AudioSink {
    /// Play a one-shot effect (fire-and-forget)
    fn play(&mut self, effect: SoundEffect);

    /// Burner roar level, 0..=100
    fn set_burner(&mut self, _heat: f32) {}

    /// Sizzle loop driven by heat and food in the pan
    fn set_sizzle(&mut self, _heat: f32, _has_food: bool) {}

    /// Water rinse loop
    fn set_cleaning(&mut self, _active: bool) {}
}

/// Audio sink that discards everything (headless runs and tests)
#[derive(Debug, Default, Clone, Copy)]
pub struct NullAudio;

impl AudioSink for NullAudio {
    fn play(&mut self, _effect: SoundEffect) {}
}

/// Minimum spacing between repeats of a cue
#[derive(Debug, Clone, Copy)]
pub struct CueThrottle {
    cooldown: f64,
    last: Option<f64>,
}

impl CueThrottle {
    pub const fn new(cooldown: f64) -> Self {
        Self { cooldown, last: None }
    }

    /// Returns true and arms the cooldown if the cue may fire at `now` (seconds)
    pub fn try_fire(&mut self, now: f64) -> bool {
        match self.last {
            Some(last) if now - last < self.cooldown => false,
            _ => {
                self.last = Some(now);
                true
            }
        }
    }

    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_throttle_cooldown() {
        let mut throttle = CueThrottle::new(0.22);
        assert!(throttle.try_fire(1.0));
        assert!(!throttle.try_fire(1.1));
        assert!(!throttle.try_fire(1.21));
        assert!(throttle.try_fire(1.23));
    }

    #[test]
    fn test_throttle_reset() {
        let mut throttle = CueThrottle::new(0.22);
        assert!(throttle.try_fire(0.0));
        throttle.reset();
        assert!(throttle.try_fire(0.01));
    }
}
