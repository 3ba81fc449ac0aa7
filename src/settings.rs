//! Game settings and preferences
//!
//! Stored as JSON next to the binary (or wherever the host decides).

use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::catalog::Upgrade;

/// Quality preset levels
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum QualityPreset {
    Low,
    #[default]
    Medium,
    High,
}

impl QualityPreset {
    pub fn as_str(&self) -> &'static str {
        match self {
            QualityPreset::Low => "Low",
            QualityPreset::Medium => "Medium",
            QualityPreset::High => "High",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "low" => Some(QualityPreset::Low),
            "medium" | "med" => Some(QualityPreset::Medium),
            "high" => Some(QualityPreset::High),
            _ => None,
        }
    }

    /// Maximum live fire particles for this preset
    pub fn fire_cap(&self) -> usize {
        match self {
            QualityPreset::Low => 80,
            QualityPreset::Medium => 200,
            QualityPreset::High => 300,
        }
    }

    /// Whether cosmetic smoke/steam is emitted
    pub fn smoke_enabled(&self) -> bool {
        !matches!(self, QualityPreset::Low)
    }
}

/// Difficulty scaling applied to burn speed, order targets and spill wastage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Difficulty {
    Easy,
    #[default]
    Normal,
    Hard,
}

impl Difficulty {
    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Easy => "Easy",
            Difficulty::Normal => "Normal",
            Difficulty::Hard => "Hard",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "easy" => Some(Difficulty::Easy),
            "normal" => Some(Difficulty::Normal),
            "hard" => Some(Difficulty::Hard),
            _ => None,
        }
    }

    pub fn burn_mult(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.6,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.6,
        }
    }

    pub fn target_mult(&self) -> f32 {
        match self {
            Difficulty::Easy => 0.6,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }

    pub fn spill_mult(&self) -> f64 {
        match self {
            Difficulty::Easy => 0.5,
            Difficulty::Normal => 1.0,
            Difficulty::Hard => 1.5,
        }
    }
}

/// How forgiving the shift is
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum GameMode {
    #[default]
    Campaign,
    Sandbox,
    Restaurant,
}

impl GameMode {
    /// No penalties, no expiry, no spill charges
    pub fn is_permissive(&self) -> bool {
        !matches!(self, GameMode::Campaign)
    }

    /// Largest tip allowed, as a fraction of revenue
    pub fn tip_cap_fraction(&self) -> f64 {
        if self.is_permissive() { 0.30 } else { 0.12 }
    }

    pub fn max_tickets(&self) -> usize {
        if self.is_permissive() { 5 } else { 3 }
    }

    /// Trashing still costs ingredients outside the sandbox
    pub fn charges_trash(&self) -> bool {
        !matches!(self, GameMode::Sandbox)
    }
}

/// Errors raised while reading or writing settings
#[derive(Debug, Error)]
pub enum SettingsError {
    #[error("settings json is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("settings file i/o failed: {0}")]
    Io(#[from] std::io::Error),
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Settings {
    pub difficulty: Difficulty,
    pub mode: GameMode,
    /// Graphics quality preset
    pub quality: QualityPreset,

    // === Visual Effects ===
    /// Screen shake on impacts and throws
    pub screen_shake: bool,

    // === Accessibility ===
    /// Reduced motion (no shake)
    pub reduced_motion: bool,

    // === Session ===
    /// RNG seed for particle scatter and order spawns
    pub seed: u64,
    /// Equipment bought in the shop
    pub owned_upgrades: Vec<Upgrade>,
    /// Campaign chapter; `None` unlocks every recipe
    pub chapter: Option<u32>,
    /// Recipe id that earns the daily-special bonus in Restaurant mode
    pub daily_special: Option<String>,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            difficulty: Difficulty::Normal,
            mode: GameMode::Campaign,
            quality: QualityPreset::Medium,
            screen_shake: true,
            reduced_motion: false,
            seed: 0x5EED_0F_F1AE,
            owned_upgrades: Vec::new(),
            chapter: Some(0),
            daily_special: None,
        }
    }
}

impl Settings {
    /// Revenue multiplier for the Restaurant daily special
    pub const DAILY_SPECIAL_MULT: f64 = 1.25;

    /// Create settings from a quality preset
    pub fn from_preset(preset: QualityPreset) -> Self {
        Self {
            quality: preset,
            ..Self::default()
        }
    }

    /// Effective screen shake (respects reduced_motion)
    pub fn effective_screen_shake(&self) -> bool {
        self.screen_shake && !self.reduced_motion
    }

    /// Revenue multiplier for a recipe under the current mode
    pub fn special_mult(&self, recipe_id: &str) -> f64 {
        match (&self.mode, &self.daily_special) {
            (GameMode::Restaurant, Some(special)) if special == recipe_id => Self::DAILY_SPECIAL_MULT,
            _ => 1.0,
        }
    }

    /// Cash goal scaled by difficulty
    pub fn cash_target(&self, base: f64) -> f64 {
        base * f64::from(self.difficulty.target_mult())
    }

    pub fn from_json(json: &str) -> Result<Self, SettingsError> {
        Ok(serde_json::from_str(json)?)
    }

    pub fn to_json(&self) -> Result<String, SettingsError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Load settings from a file, falling back to defaults when it is missing
    pub fn load(path: &Path) -> Result<Self, SettingsError> {
        if !path.exists() {
            log::info!("Using default settings");
            return Ok(Self::default());
        }
        let json = std::fs::read_to_string(path)?;
        let settings = Self::from_json(&json)?;
        log::info!("Loaded settings from {}", path.display());
        Ok(settings)
    }

    pub fn save(&self, path: &Path) -> Result<(), SettingsError> {
        std::fs::write(path, self.to_json()?)?;
        log::info!("Settings saved");
        Ok(())
    }
}
