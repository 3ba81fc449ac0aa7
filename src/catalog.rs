//! Ingredient, recipe and event tables
//!
//! Read-only data supplied once at session start. The compiled-in tables are
//! the standard menu; hosts may replace them with JSON via [`Catalog::from_json`].

use std::collections::HashSet;
use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::audio::SoundProfile;

/// Ingredient identifier (e.g. `"rice"`, `"soy_sauce"`)
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct IngredientId(pub String);

impl IngredientId {
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<&str> for IngredientId {
    fn from(s: &str) -> Self {
        Self(s.to_string())
    }
}

impl fmt::Display for IngredientId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.0)
    }
}

/// Shelf grouping, which also decides how much oil an ingredient soaks up
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Category {
    Protein,
    Carb,
    Vegetable,
    Spice,
    Sauce,
}

impl Category {
    /// Oil absorbed from the pan when one unit is added
    pub fn oil_absorption(&self) -> f32 {
        match self {
            Category::Carb => 10.0,
            Category::Protein => 6.0,
            _ => 2.0,
        }
    }
}

/// Physical family of an ingredient: decides particle count, shape and feel
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum IngredientFamily {
    /// Small ellipses (rice)
    Grain,
    /// Soft clusters of sub-blobs (beaten egg)
    Egg,
    /// Wide flat slices (beef)
    SlicedMeat,
    /// Chunky rounded rectangles (char siu)
    Cube,
    /// Long wavy ribbons (ho fun)
    Strand,
    /// Curled bodies that bend with motion (prawn)
    Shellfish,
    /// Tall leafy pieces (gai lan)
    Stalk,
    /// Round caps (shiitake)
    Cap,
    /// Small flakes (chili)
    Flake,
    /// Thin green shreds (scallion)
    Shred,
    /// Tiny minced bits (garlic)
    Clove,
    /// Matchstick slivers (ginger)
    Sliver,
    /// Sauces: transient splash, not tracked as standing food
    Liquid,
    /// Powders: transient dust, not tracked as standing food
    Dust,
}

/// Spawn and feel parameters for one ingredient family
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct FamilyProfile {
    /// Particles spawned per add (cohort size when tracked)
    pub count: u32,
    /// Whether particles stand in the pan as food bodies
    pub tracked: bool,
    /// Base size and random extra
    pub size: (f32, f32),
    /// Width range for rectangular/strand cuts (base, extra)
    pub width: Option<(f32, f32)>,
    /// Height range for rectangular/strand cuts (base, extra)
    pub height: Option<(f32, f32)>,
    /// Spread of initial spin
    pub spin: f32,
    pub mass: f32,
    pub bounciness: f32,
    pub sound: SoundProfile,
}

impl IngredientFamily {
    pub const fn profile(self) -> FamilyProfile {
        use IngredientFamily::*;
        let (count, size, width, height, spin, sound) = match self {
            Grain => (50, (6.0, 2.0), None, None, 0.4, SoundProfile::Heavy),
            Egg => (15, (12.0, 0.0), None, None, 0.2, SoundProfile::Wet),
            SlicedMeat => (8, (20.0, 0.0), Some((25.0, 15.0)), Some((12.0, 6.0)), 0.3, SoundProfile::Wet),
            Cube => (10, (18.0, 0.0), Some((18.0, 8.0)), Some((14.0, 6.0)), 0.3, SoundProfile::Wet),
            Strand => (12, (26.0, 0.0), Some((55.0, 35.0)), Some((5.0, 4.0)), 0.15, SoundProfile::Heavy),
            Shellfish => (7, (14.0, 4.0), None, None, 0.35, SoundProfile::Wet),
            Stalk => (10, (24.0, 0.0), Some((12.0, 8.0)), Some((25.0, 10.0)), 0.4, SoundProfile::Dry),
            Cap => (12, (20.0, 0.0), Some((18.0, 8.0)), Some((18.0, 8.0)), 0.4, SoundProfile::Dry),
            Flake => (15, (7.0, 3.0), None, None, 0.5, SoundProfile::Dry),
            Shred => (25, (8.0, 3.0), None, None, 0.5, SoundProfile::Dry),
            Clove => (15, (5.0, 2.0), None, None, 0.5, SoundProfile::Powder),
            Sliver => (20, (4.0, 2.0), None, None, 0.5, SoundProfile::Powder),
            Liquid => (40, (3.0, 4.0), None, None, 0.0, SoundProfile::Liquid),
            Dust => (50, (1.0, 2.0), None, None, 0.0, SoundProfile::Powder),
        };
        let mass = match self {
            SlicedMeat | Cube | Stalk | Cap => 3.5,
            Grain | Strand | Shellfish => 2.5,
            _ => 2.0,
        };
        let bounciness = match self {
            Strand => 0.15,
            Shellfish => 0.25,
            Egg => 0.2,
            _ => 0.35,
        };
        FamilyProfile {
            count,
            tracked: !matches!(self, Liquid | Dust),
            size,
            width,
            height,
            spin,
            mass,
            bounciness,
            sound,
        }
    }
}

/// A purchasable ingredient or condiment
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Ingredient {
    pub id: IngredientId,
    pub name: String,
    pub cost: f64,
    pub umami: f32,
    pub oiliness: f32,
    pub category: Category,
    pub family: IngredientFamily,
}

/// A dish customers can order
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Recipe {
    pub id: String,
    pub name: String,
    /// First campaign chapter the recipe appears in
    pub chapter: u32,
    /// Required ingredient multiset, one entry per unit
    pub requires: Vec<IngredientId>,
    pub base_value: f64,
    /// Seconds before the ticket fails
    pub time_limit: f32,
    pub ideal_oil: f32,
}

/// A bonus for cooking a specific ingredient set together
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct FlavorCombo {
    pub name: String,
    pub items: Vec<IngredientId>,
    pub mult: f64,
}

impl FlavorCombo {
    /// All combo items are present (multiplicity ignored)
    pub fn is_satisfied_by(&self, contents: &[IngredientId]) -> bool {
        self.items.iter().all(|item| contents.contains(item))
    }
}

/// Ticket modifiers that occasionally ride on new orders
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SpecialEvent {
    /// Half time limit
    Rush,
    /// Must add chili
    SpiceFreak,
    /// Must add wine
    DrunkMaster,
    /// Requires high wok hei
    SikSanTest,
}

impl SpecialEvent {
    pub const ALL: [SpecialEvent; 4] = [
        SpecialEvent::Rush,
        SpecialEvent::SpiceFreak,
        SpecialEvent::DrunkMaster,
        SpecialEvent::SikSanTest,
    ];

    /// Wok hei the SikSanTest ticket demands
    pub const WOK_HEI_THRESHOLD: f32 = 90.0;

    pub fn name(&self) -> &'static str {
        match self {
            SpecialEvent::Rush => "TRIAD RUSH!",
            SpecialEvent::SpiceFreak => "SPICE FREAK!",
            SpecialEvent::DrunkMaster => "DRUNK MASTER!",
            SpecialEvent::SikSanTest => "SIK SAN'S TEST!",
        }
    }

    pub fn bonus_cash(&self) -> f64 {
        match self {
            SpecialEvent::Rush => 40.0,
            SpecialEvent::SpiceFreak => 15.0,
            SpecialEvent::DrunkMaster => 50.0,
            SpecialEvent::SikSanTest => 80.0,
        }
    }

    /// Extra required ingredient, if any
    pub fn extra_requirement(&self) -> Option<&'static str> {
        match self {
            SpecialEvent::SpiceFreak => Some("chili"),
            SpecialEvent::DrunkMaster => Some("wine"),
            _ => None,
        }
    }

    /// An event whose extra ingredient is already required would be a no-op
    pub fn conflicts_with(&self, requires: &[IngredientId]) -> bool {
        self.extra_requirement()
            .is_some_and(|extra| requires.iter().any(|r| r.as_str() == extra))
    }
}

/// Equipment upgrades that tune the simulation (the shop lives elsewhere)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Upgrade {
    Spatula,
    TurboBurner,
    MsgShaker,
    CursedChili,
    IronPalm,
    CarbonSeasoning,
    MonkSpoon,
    DragonWok,
}

/// Multipliers folded from owned upgrades
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Modifiers {
    pub wok_hei_gain: f32,
    pub burn_resistance: f32,
    pub cook_speed: f32,
    pub residue_buildup: f32,
    /// Heat lost per hard toss sweep
    pub toss_cooling: f32,
    pub cash: f64,
    /// Ticket patience decay rate
    pub patience_decay: f32,
}

impl Default for Modifiers {
    fn default() -> Self {
        Self {
            wok_hei_gain: 1.0,
            burn_resistance: 1.0,
            cook_speed: 1.0,
            residue_buildup: 1.0,
            toss_cooling: 0.2,
            cash: 1.0,
            patience_decay: 1.0,
        }
    }
}

impl Modifiers {
    pub fn from_upgrades(upgrades: &[Upgrade]) -> Self {
        let mut m = Self::default();
        for upgrade in upgrades {
            match upgrade {
                Upgrade::Spatula => m.wok_hei_gain += 0.2,
                Upgrade::TurboBurner => {
                    m.cook_speed += 0.5;
                    m.burn_resistance += 0.5;
                }
                Upgrade::MsgShaker => {
                    m.cash += 0.25;
                    m.patience_decay += 0.15;
                }
                Upgrade::CursedChili => {
                    m.cash += 0.5;
                    m.patience_decay += 0.3;
                }
                Upgrade::IronPalm => {
                    m.toss_cooling = 0.6;
                    m.wok_hei_gain -= 0.3;
                }
                Upgrade::CarbonSeasoning => m.residue_buildup *= 0.5,
                Upgrade::MonkSpoon => {
                    m.burn_resistance -= 0.8;
                    m.cook_speed -= 0.4;
                }
                Upgrade::DragonWok => {
                    m.wok_hei_gain += 1.0;
                    m.residue_buildup *= 2.0;
                }
            }
        }
        m.burn_resistance = m.burn_resistance.max(0.05);
        m.cook_speed = m.cook_speed.max(0.1);
        m.wok_hei_gain = m.wok_hei_gain.max(0.0);
        m
    }
}

/// Errors raised while loading a catalog
#[derive(Debug, Error)]
pub enum CatalogError {
    #[error("catalog json is malformed: {0}")]
    Json(#[from] serde_json::Error),
    #[error("duplicate ingredient id `{0}`")]
    DuplicateIngredient(String),
    #[error("recipe `{recipe}` requires unknown ingredient `{ingredient}`")]
    UnknownIngredient { recipe: String, ingredient: String },
    #[error("ingredient `{0}` has a negative cost")]
    NegativeCost(String),
    #[error("recipe `{0}` has no requirements")]
    EmptyRecipe(String),
}

/// Complete read-only table set
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Catalog {
    ingredients: Vec<Ingredient>,
    recipes: Vec<Recipe>,
    combos: Vec<FlavorCombo>,
}

impl Default for Catalog {
    fn default() -> Self {
        Self::standard()
    }
}

fn ids(items: &[&str]) -> Vec<IngredientId> {
    items.iter().map(|s| IngredientId::from(*s)).collect()
}

impl Catalog {
    /// The standard menu
    pub fn standard() -> Self {
        use Category::*;
        use IngredientFamily::*;

        let item = |id: &str, name: &str, cost: f64, umami: f32, oiliness: f32, category, family| Ingredient {
            id: id.into(),
            name: name.to_string(),
            cost,
            umami,
            oiliness,
            category,
            family,
        };

        let ingredients = vec![
            item("rice", "Day-Old Rice", 1.50, 1.0, 0.0, Carb, Grain),
            item("egg", "Beaten Egg", 1.80, 2.0, 2.0, Protein, Egg),
            item("scallion", "Scallions", 0.70, 1.0, 0.0, Vegetable, Shred),
            item("beef", "Velvet Beef", 11.50, 3.0, 3.0, Protein, SlicedMeat),
            item("char_siu", "Char Siu", 85.00, 3.0, 4.0, Protein, Cube),
            item("noodle", "Ho Fun", 2.20, 1.0, 1.0, Carb, Strand),
            item("shrimp", "Fresh Prawn", 25.00, 3.0, 1.0, Protein, Shellfish),
            item("gai_lan", "Gai Lan", 3.50, 1.0, 0.0, Vegetable, Stalk),
            item("mushroom", "Shiitake", 9.50, 4.0, 1.0, Vegetable, Cap),
            item("chili", "Birdseye Chili", 1.20, 1.0, 0.0, Spice, Flake),
            item("garlic", "Garlic", 0.40, 2.0, 1.0, Vegetable, Clove),
            item("ginger", "Ginger", 0.60, 1.0, 0.0, Vegetable, Sliver),
            item("soy_sauce", "Soy Sauce", 0.50, 4.0, 0.0, Sauce, Liquid),
            item("oyster_sauce", "Oyster Sauce", 1.80, 4.0, 1.0, Sauce, Liquid),
            item("xo_sauce", "XO Sauce", 45.00, 5.0, 4.0, Sauce, Liquid),
            item("wine", "Shaoxing Wine", 2.50, 1.0, 0.0, Sauce, Liquid),
            item("msg", "M.S.G.", 0.80, 5.0, 0.0, Spice, Dust),
            item("white_pepper", "White Pepper", 1.20, 1.0, 0.0, Spice, Dust),
            item("five_spice", "Five Spice", 1.50, 1.0, 0.0, Spice, Dust),
            item("salt", "Salt", 0.10, 2.0, 0.0, Spice, Dust),
            item("sugar", "Sugar", 0.20, 0.0, 0.0, Spice, Dust),
        ];

        let recipe = |id: &str, name: &str, chapter, requires: &[&str], base_value, time_limit, ideal_oil| Recipe {
            id: id.to_string(),
            name: name.to_string(),
            chapter,
            requires: ids(requires),
            base_value,
            time_limit,
            ideal_oil,
        };

        let recipes = vec![
            recipe("spicy_beef_rice", "Spicy Beef Fried Rice", 0, &["beef", "rice", "egg", "chili", "soy_sauce"], 22.00, 55.0, 35.0),
            recipe("beef_chow_fun", "Beef Chow Fun", 1, &["beef", "noodle", "scallion", "soy_sauce", "oyster_sauce"], 22.50, 50.0, 50.0),
            recipe("braised_shiitake", "Braised Shiitake", 1, &["mushroom", "gai_lan", "oyster_sauce", "wine"], 23.50, 48.0, 30.0),
            recipe("beef_gailan", "Beef & Gai Lan", 2, &["beef", "gai_lan", "oyster_sauce", "wine"], 26.00, 50.0, 45.0),
            recipe("fried_rice", "Yangzhou Fried Rice", 2, &["egg", "rice", "scallion", "shrimp", "msg"], 40.00, 60.0, 35.0),
            recipe("drunken_shrimp_noodle", "Drunken Shrimp Noodle", 3, &["shrimp", "noodle", "scallion", "wine", "white_pepper"], 42.50, 45.0, 40.0),
            recipe("xo_seafood_noodle", "XO Seafood Noodles", 4, &["shrimp", "noodle", "scallion", "xo_sauce"], 98.00, 45.0, 55.0),
            recipe("char_siu_rice", "Sorrowful Rice (Char Siu)", 4, &["char_siu", "rice", "egg", "scallion", "soy_sauce"], 120.00, 40.0, 40.0),
        ];

        let combo = |name: &str, items: &[&str], mult| FlavorCombo {
            name: name.to_string(),
            items: ids(items),
            mult,
        };

        let combos = vec![
            combo("Umami Bomb", &["mushroom", "oyster_sauce", "msg"], 1.5),
            combo("Spicy & Numbing", &["chili", "white_pepper"], 1.3),
            combo("Drunken Seafood", &["wine", "shrimp"], 1.4),
            combo("Emperor's Indulgence", &["xo_sauce", "beef"], 1.6),
            combo("Classic Wok Hei", &["soy_sauce", "scallion", "egg"], 1.2),
        ];

        Self {
            ingredients,
            recipes,
            combos,
        }
    }

    /// Parse and validate a catalog from JSON
    pub fn from_json(json: &str) -> Result<Self, CatalogError> {
        let catalog: Catalog = serde_json::from_str(json)?;
        catalog.validate()?;
        Ok(catalog)
    }

    pub fn to_json(&self) -> Result<String, CatalogError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    fn validate(&self) -> Result<(), CatalogError> {
        let mut seen = HashSet::new();
        for ing in &self.ingredients {
            if !seen.insert(ing.id.as_str()) {
                return Err(CatalogError::DuplicateIngredient(ing.id.0.clone()));
            }
            if ing.cost < 0.0 {
                return Err(CatalogError::NegativeCost(ing.id.0.clone()));
            }
        }
        for recipe in &self.recipes {
            if recipe.requires.is_empty() {
                return Err(CatalogError::EmptyRecipe(recipe.id.clone()));
            }
            if let Some(missing) = recipe.requires.iter().find(|r| !seen.contains(r.as_str())) {
                return Err(CatalogError::UnknownIngredient {
                    recipe: recipe.id.clone(),
                    ingredient: missing.0.clone(),
                });
            }
        }
        Ok(())
    }

    pub fn ingredient(&self, id: &str) -> Option<&Ingredient> {
        self.ingredients.iter().find(|i| i.id.as_str() == id)
    }

    pub fn ingredients(&self) -> &[Ingredient] {
        &self.ingredients
    }

    pub fn recipe(&self, id: &str) -> Option<&Recipe> {
        self.recipes.iter().find(|r| r.id == id)
    }

    pub fn recipes(&self) -> &[Recipe] {
        &self.recipes
    }

    /// Recipes unlocked at the given chapter (`None` unlocks everything)
    pub fn recipes_for_chapter(&self, chapter: Option<u32>) -> Vec<&Recipe> {
        self.recipes
            .iter()
            .filter(|r| chapter.is_none_or(|c| r.chapter <= c))
            .collect()
    }

    pub fn combos(&self) -> &[FlavorCombo] {
        &self.combos
    }

    /// Total purchase cost of a content list (unknown ids cost nothing)
    pub fn cost_of(&self, contents: &[IngredientId]) -> f64 {
        contents
            .iter()
            .filter_map(|id| self.ingredient(id.as_str()))
            .map(|i| i.cost)
            .sum()
    }

    /// Mean umami, rounded to one decimal
    pub fn average_umami(&self, contents: &[IngredientId]) -> f32 {
        if contents.is_empty() {
            return 0.0;
        }
        let total: f32 = contents
            .iter()
            .filter_map(|id| self.ingredient(id.as_str()))
            .map(|i| i.umami)
            .sum();
        (total / contents.len() as f32 * 10.0).round() / 10.0
    }

    pub fn average_oiliness(&self, contents: &[IngredientId]) -> f32 {
        if contents.is_empty() {
            return 0.0;
        }
        let total: f32 = contents
            .iter()
            .filter_map(|id| self.ingredient(id.as_str()))
            .map(|i| i.oiliness)
            .sum();
        total / contents.len() as f32
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_standard_catalog_is_valid() {
        let catalog = Catalog::standard();
        assert!(catalog.validate().is_ok());
        assert_eq!(catalog.ingredients().len(), 21);
        assert_eq!(catalog.recipes().len(), 8);
    }

    #[test]
    fn test_json_roundtrip_rejects_unknown_ingredient() {
        let mut catalog = Catalog::standard();
        catalog.recipes[0].requires.push("unicorn".into());
        let json = serde_json::to_string(&catalog).unwrap();
        match Catalog::from_json(&json) {
            Err(CatalogError::UnknownIngredient { ingredient, .. }) => assert_eq!(ingredient, "unicorn"),
            other => panic!("expected unknown ingredient, got {other:?}"),
        }
    }

    #[test]
    fn test_malformed_json() {
        assert!(matches!(Catalog::from_json("{"), Err(CatalogError::Json(_))));
    }

    #[test]
    fn test_oil_absorption_by_category() {
        let catalog = Catalog::standard();
        let absorb = |id: &str| catalog.ingredient(id).unwrap().category.oil_absorption();
        assert_eq!(absorb("rice"), 10.0);
        assert_eq!(absorb("beef"), 6.0);
        assert_eq!(absorb("salt"), 2.0);
    }

    #[test]
    fn test_family_profiles() {
        let rice = IngredientFamily::Grain.profile();
        assert_eq!(rice.count, 50);
        assert!(rice.tracked);
        assert!(!IngredientFamily::Liquid.profile().tracked);
        assert_eq!(IngredientFamily::SlicedMeat.profile().mass, 3.5);
        assert_eq!(IngredientFamily::Strand.profile().bounciness, 0.15);
    }

    #[test]
    fn test_chapter_filter() {
        let catalog = Catalog::standard();
        assert_eq!(catalog.recipes_for_chapter(Some(0)).len(), 1);
        assert_eq!(catalog.recipes_for_chapter(None).len(), 8);
    }

    #[test]
    fn test_average_umami_rounds() {
        let catalog = Catalog::standard();
        let contents = ids(&["beef", "rice", "egg", "chili", "soy_sauce"]);
        assert!((catalog.average_umami(&contents) - 2.2).abs() < 1e-6);
        assert!((catalog.cost_of(&contents) - 16.5).abs() < 1e-9);
    }

    #[test]
    fn test_upgrade_modifiers() {
        let m = Modifiers::from_upgrades(&[Upgrade::TurboBurner, Upgrade::MonkSpoon]);
        assert!((m.burn_resistance - 0.7).abs() < 1e-6);
        assert!((m.cook_speed - 1.1).abs() < 1e-6);
        let iron = Modifiers::from_upgrades(&[Upgrade::IronPalm]);
        assert_eq!(iron.toss_cooling, 0.6);
    }

    #[test]
    fn test_event_conflicts() {
        let requires = ids(&["beef", "chili"]);
        assert!(SpecialEvent::SpiceFreak.conflicts_with(&requires));
        assert!(!SpecialEvent::DrunkMaster.conflicts_with(&requires));
        assert!(!SpecialEvent::Rush.conflicts_with(&requires));
    }
}
