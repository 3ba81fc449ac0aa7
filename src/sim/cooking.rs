//! Cooking state machine
//!
//! A deterministic differential update run at 10 Hz. Every rate below is
//! expressed per 0.1 s tick and scaled by `dt / COOK_DT`, so a host that
//! drives the tick at a different cadence still integrates the same curves.

use crate::catalog::{Ingredient, Modifiers};
use crate::clamp_level;
use crate::consts::*;

use super::state::SimulationSnapshot;

/// Cooking starts above this heat
pub const COOK_HEAT_MIN: f32 = 20.0;
/// Burning and wok hei both need more than this
pub const HIGH_HEAT: f32 = 70.0;
/// Oil vaporizes passively above this heat
pub const VAPOR_HEAT: f32 = 80.0;
/// Oil below this is a dry pan
pub const DRY_OIL: f32 = 20.0;
/// Oil above this is greasy
pub const GREASY_OIL: f32 = 75.0;
/// Oil needed before tossing builds wok hei
pub const WOK_HEI_OIL_MIN: f32 = 2.0;
/// Oil spent per tick while building wok hei
pub const WOK_HEI_OIL_COST: f32 = 0.6;
/// Oil added per tick while the oil button is held
pub const OILING_RATE: f32 = 6.0;
/// Residue above which an empty wok refuses food
pub const FILTHY_RESIDUE: f32 = 80.0;

/// Tuning for one session's cooking tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct CookingTuning {
    pub modifiers: Modifiers,
    /// Difficulty burn multiplier
    pub burn_mult: f32,
}

impl Default for CookingTuning {
    fn default() -> Self {
        Self {
            modifiers: Modifiers::default(),
            burn_mult: 1.0,
        }
    }
}

/// Why an ingredient was refused
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum AddRejected {
    /// Contents already burnt
    Burnt,
    /// Already holding the maximum number of items
    Full,
    /// Empty wok with too much residue
    TooFilthy,
    /// Not in the catalog
    UnknownIngredient,
    /// Rinse water is in the pan
    Rinsing,
}

impl AddRejected {
    pub fn message(&self) -> &'static str {
        match self {
            AddRejected::Burnt => "Burnt! Clear the wok first.",
            AddRejected::Full => "Wok is full!",
            AddRejected::TooFilthy => "Wok is too filthy! Clean first!",
            AddRejected::UnknownIngredient => "Nobody stocks that.",
            AddRejected::Rinsing => "Finish rinsing the wok first!",
        }
    }
}

/// Burn risk scale from time since the last toss.
///
/// Near zero while tossing, ramping up the longer the pan sits still.
pub fn burn_multiplier(is_tossing: bool, since_toss: Option<f64>) -> f32 {
    if is_tossing {
        return 0.02;
    }
    let Some(t) = since_toss else {
        return 0.85;
    };
    let t = t.max(0.0) as f32;
    if t < 0.4 {
        0.04
    } else if t < 1.2 {
        0.04 + (t - 0.4) * 0.45
    } else if t < 3.0 {
        0.4 + (t - 1.2) * 0.25
    } else {
        0.85
    }
}

/// Dry pans scorch; beyond that, more oil means more burn
pub fn oil_burn_modifier(oil: f32, heat: f32) -> f32 {
    if oil < DRY_OIL {
        3.0
    } else {
        let greasy_hot = if oil > GREASY_OIL && heat > VAPOR_HEAT { 0.8 } else { 0.0 };
        1.0 + oil / 100.0 * 0.9 + greasy_hot
    }
}

/// Dry pans foul faster than oiled ones
pub fn oil_residue_modifier(oil: f32) -> f32 {
    if oil < DRY_OIL { 3.0 } else { 0.5 }
}

/// Cook rate per tick before modifiers
pub fn cook_rate(heat: f32, oil: f32, content_count: usize, is_tossing: bool) -> f32 {
    if heat <= COOK_HEAT_MIN {
        return 0.0;
    }
    let base_speed = ((6.0 - content_count as f32) * 0.3).max(0.5);
    let toss_mult = if is_tossing { 1.5 } else { 0.5 };
    let oil_mult = if oil > GREASY_OIL { 0.4 } else { 1.0 };
    heat / 100.0 * 0.8 * base_speed * toss_mult * oil_mult
}

/// Advance the cooking state by `dt` seconds of session time.
///
/// `now` is the session clock at the start of the tick. All rates read the
/// values as they stood at the start of the tick.
pub fn cook_tick(snap: &mut SimulationSnapshot, tuning: &CookingTuning, now: f64, dt: f32) {
    let scale = dt / COOK_DT;
    if !scale.is_finite() || scale <= 0.0 {
        return;
    }
    let m = &tuning.modifiers;

    let heat = snap.heat;
    let oil = snap.oil;
    let cook = snap.cook;
    let residue = snap.residue;
    let tossing = snap.is_tossing;
    let count = snap.contents.len();

    // Rinsing only works on an empty pan
    if snap.is_cleaning && count == 0 {
        let removed = residue.min(3.0 * scale);
        snap.water += 8.0 * scale;
        snap.residue -= removed;
        snap.water_dirtiness += removed * 3.0;
        snap.heat -= 3.0 * scale;
        snap.oil = 0.0;
    }

    if snap.is_oiling {
        snap.oil += OILING_RATE * scale;
    }

    if heat > VAPOR_HEAT && oil > 0.0 {
        snap.oil = (snap.oil - (heat - VAPOR_HEAT) * 0.03 * scale).max(0.0);
    }

    if count > 0 {
        snap.cook += cook_rate(heat, oil, count, tossing) * m.cook_speed * scale;

        if heat > HIGH_HEAT {
            if tossing && oil > WOK_HEI_OIL_MIN {
                let gain = (8.0 - residue / 20.0).max(3.0);
                snap.wok_hei += gain * m.wok_hei_gain * scale;
                snap.oil = (snap.oil - WOK_HEI_OIL_COST * scale).max(0.0);
            } else if !tossing {
                snap.wok_hei -= 0.2 * scale;
            }

            let greasy_hot = oil > GREASY_OIL && heat > VAPOR_HEAT;
            let base_coeff = if greasy_hot { 0.0042 } else { 0.002 };
            let residue_mult = 1.0 + residue / 30.0;
            let since = snap.last_toss_time.map(|t| now - t);
            let duration_factor = 1.0 + cook / 100.0 * 0.65;
            snap.burn += (heat - 65.0)
                * base_coeff
                * residue_mult
                * burn_multiplier(tossing, since)
                * m.burn_resistance
                * tuning.burn_mult
                * oil_burn_modifier(oil, heat)
                * duration_factor
                * scale;
        } else {
            snap.wok_hei -= 0.3 * scale;
        }

        snap.residue += (0.15 + heat / 100.0 * 0.3) * oil_residue_modifier(oil) * m.residue_buildup * scale;
    } else {
        snap.cook = 0.0;
        snap.burn = 0.0;
        snap.wok_hei -= 1.0 * scale;
    }

    snap.clamp_all();
}

/// Drop an ingredient into the wok, soaking up some of the pan oil
pub fn add_ingredient(snap: &mut SimulationSnapshot, ingredient: &Ingredient) -> Result<(), AddRejected> {
    if snap.is_burnt() {
        return Err(AddRejected::Burnt);
    }
    if snap.is_cleaning || snap.water > 0.0 {
        return Err(AddRejected::Rinsing);
    }
    if !snap.has_food() && snap.residue > FILTHY_RESIDUE {
        return Err(AddRejected::TooFilthy);
    }
    if snap.contents.len() >= MAX_CONTENTS {
        return Err(AddRejected::Full);
    }
    snap.oil = clamp_level(snap.oil - ingredient.category.oil_absorption());
    snap.contents.push(ingredient.id.clone());
    Ok(())
}
