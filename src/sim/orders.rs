//! Order ticket queue
//!
//! Spawns, ages, merges and expires tickets. Queue order is significant:
//! the scoring engine matches the earliest eligible ticket.

use std::collections::BTreeMap;

use rand::Rng;
use serde::{Deserialize, Serialize};

use crate::catalog::{Catalog, IngredientId, Recipe, SpecialEvent};

/// Ingredient id → count
pub type Multiset = BTreeMap<IngredientId, u32>;

/// Chance per cooking tick of a new ticket arriving
pub const SPAWN_CHANCE: f64 = 0.02;
/// Chance a spawned ticket carries a special event
pub const EVENT_CHANCE: f64 = 0.25;
/// Failed tickets linger until their clock reaches this
pub const FAILED_LINGER: f32 = -2.0;

pub fn frequency_map(items: &[IngredientId]) -> Multiset {
    let mut map = Multiset::new();
    for item in items {
        *map.entry(item.clone()).or_insert(0) += 1;
    }
    map
}

/// `have` contains at least every unit of `need`
pub fn covers(have: &Multiset, need: &Multiset) -> bool {
    need.iter()
        .all(|(id, count)| have.get(id).copied().unwrap_or(0) >= *count)
}

/// Units of `need` that `have` lacks
pub fn missing(have: &Multiset, need: &Multiset) -> Vec<IngredientId> {
    need.iter()
        .filter(|(id, count)| have.get(*id).copied().unwrap_or(0) < **count)
        .map(|(id, _)| id.clone())
        .collect()
}

/// A customer ticket
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Order {
    pub id: u32,
    pub recipe_id: String,
    pub name: String,
    pub required: Multiset,
    pub base_value: f64,
    pub time_limit: f32,
    pub time_left: f32,
    pub ideal_oil: f32,
    /// Untimed tickets never expire and always count as fully patient
    pub timed: bool,
    pub event: Option<SpecialEvent>,
    pub bonus_cash: f64,
    /// Extra streak per batch unit on success
    pub bonus_combo: u32,
    pub requires_wok_hei: Option<f32>,
    pub batch_size: u32,
    pub merged: bool,
    pub failed: bool,
}

impl Order {
    pub fn from_recipe(id: u32, recipe: &Recipe, timed: bool) -> Self {
        Self {
            id,
            recipe_id: recipe.id.clone(),
            name: recipe.name.clone(),
            required: frequency_map(&recipe.requires),
            base_value: recipe.base_value,
            time_limit: recipe.time_limit,
            time_left: recipe.time_limit,
            ideal_oil: recipe.ideal_oil,
            timed,
            event: None,
            bonus_cash: 0.0,
            bonus_combo: 0,
            requires_wok_hei: None,
            batch_size: 1,
            merged: false,
            failed: false,
        }
    }

    /// Attach a special event, unless it would only repeat an existing requirement
    pub fn apply_event(&mut self, event: SpecialEvent) -> bool {
        if event.extra_requirement().is_some_and(|extra| self.required.contains_key(&IngredientId::from(extra))) {
            return false;
        }
        match event {
            SpecialEvent::Rush => {
                self.time_limit *= 0.5;
                self.time_left = self.time_limit;
            }
            SpecialEvent::SpiceFreak => self.bonus_combo = 1,
            SpecialEvent::SikSanTest => self.requires_wok_hei = Some(SpecialEvent::WOK_HEI_THRESHOLD),
            SpecialEvent::DrunkMaster => {}
        }
        if let Some(extra) = event.extra_requirement() {
            *self.required.entry(extra.into()).or_insert(0) += 1;
        }
        self.bonus_cash = event.bonus_cash();
        self.event = Some(event);
        true
    }

    /// Remaining patience in [0, 1]
    pub fn urgency(&self) -> f32 {
        if !self.timed || self.time_limit <= 0.0 {
            return 1.0;
        }
        (self.time_left / self.time_limit).clamp(0.0, 1.0)
    }

    pub fn is_active(&self) -> bool {
        !self.failed
    }

    /// Can be folded into a bulk order
    pub fn is_mergeable(&self) -> bool {
        !self.failed && !self.merged
    }

    pub fn unit_count(&self) -> u32 {
        self.required.values().sum()
    }
}

/// Where new tickets come from
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SpawnPolicy {
    /// Campaign chapter gate; `None` allows every recipe
    pub chapter: Option<u32>,
    pub max_tickets: usize,
    pub timed: bool,
    /// Random arrivals each cooking tick
    pub auto_spawn: bool,
    pub events: bool,
}

/// Ordered ticket rail
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct OrderQueue {
    orders: Vec<Order>,
    next_id: u32,
}

impl OrderQueue {
    pub fn new() -> Self {
        Self {
            orders: Vec::new(),
            next_id: 1,
        }
    }

    fn allocate_id(&mut self) -> u32 {
        let id = self.next_id.max(1);
        self.next_id = id + 1;
        id
    }

    /// Append a ticket for `recipe`, optionally carrying an event
    pub fn enqueue(&mut self, recipe: &Recipe, event: Option<SpecialEvent>, timed: bool) -> u32 {
        let id = self.allocate_id();
        let mut order = Order::from_recipe(id, recipe, timed);
        if let Some(event) = event {
            if !order.apply_event(event) {
                log::debug!("Skipped {:?} on {}: requirement already present", event, recipe.id);
            }
        }
        self.orders.push(order);
        id
    }

    /// Fold every mergeable ticket for `recipe_id` into one bulk ticket at the back
    pub fn merge_duplicates(&mut self, recipe_id: &str) -> Option<u32> {
        let count = self
            .orders
            .iter()
            .filter(|o| o.recipe_id == recipe_id && o.is_mergeable())
            .count();
        if count < 2 {
            return None;
        }

        let (matching, others): (Vec<Order>, Vec<Order>) = std::mem::take(&mut self.orders)
            .into_iter()
            .partition(|o| o.recipe_id == recipe_id && o.is_mergeable());
        self.orders = others;

        let base = &matching[0];
        let n = matching.len() as u32;
        let mut required = Multiset::new();
        for order in &matching {
            for (id, count) in &order.required {
                *required.entry(id.clone()).or_insert(0) += count;
            }
        }
        let time_limit = base.time_limit * (1.0 + (n - 1) as f32 * 0.5);
        let id = self.allocate_id();
        let merged = Order {
            id,
            name: format!("{}x {}", n, base.name),
            required,
            base_value: base.base_value * n as f64,
            time_limit,
            time_left: time_limit,
            batch_size: n,
            merged: true,
            ..base.clone()
        };
        log::info!("Merged {} tickets into {}", n, merged.name);
        self.orders.push(merged);
        Some(id)
    }

    /// Age timed tickets. Returns tickets that failed during this step.
    pub fn tick_expiry(&mut self, dt: f32, patience_decay: f32) -> Vec<Order> {
        let mut failed = Vec::new();
        for order in self.orders.iter_mut().filter(|o| o.timed) {
            order.time_left -= dt * patience_decay;
            if order.time_left <= 0.0 && !order.failed {
                order.failed = true;
                order.time_left = 0.0;
                failed.push(order.clone());
            }
        }
        self.orders.retain(|o| !o.timed || o.time_left > FAILED_LINGER);
        failed
    }

    /// Random arrival check for one cooking tick
    pub fn spawn_random<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        catalog: &Catalog,
        policy: &SpawnPolicy,
    ) -> Option<u32> {
        if !policy.auto_spawn || self.orders.len() >= policy.max_tickets {
            return None;
        }
        if !rng.random_bool(SPAWN_CHANCE) {
            return None;
        }
        self.spawn(rng, catalog, policy)
    }

    /// Spawn a ticket now (the "+" button), respecting the ticket cap
    pub fn force_next<R: Rng + ?Sized>(
        &mut self,
        rng: &mut R,
        catalog: &Catalog,
        policy: &SpawnPolicy,
    ) -> Option<u32> {
        if self.orders.len() >= policy.max_tickets {
            return None;
        }
        self.spawn(rng, catalog, policy)
    }

    fn spawn<R: Rng + ?Sized>(&mut self, rng: &mut R, catalog: &Catalog, policy: &SpawnPolicy) -> Option<u32> {
        let available = catalog.recipes_for_chapter(policy.chapter);
        if available.is_empty() {
            return None;
        }
        let recipe = available[rng.random_range(0..available.len())];
        let event = if policy.events && policy.chapter.is_some_and(|c| c > 0) && rng.random_bool(EVENT_CHANCE) {
            Some(SpecialEvent::ALL[rng.random_range(0..SpecialEvent::ALL.len())])
        } else {
            None
        };
        Some(self.enqueue(recipe, event, policy.timed))
    }

    pub fn bring_to_front(&mut self, id: u32) -> bool {
        let Some(index) = self.orders.iter().position(|o| o.id == id) else {
            return false;
        };
        let order = self.orders.remove(index);
        self.orders.insert(0, order);
        true
    }

    pub fn remove(&mut self, id: u32) -> Option<Order> {
        let index = self.orders.iter().position(|o| o.id == id)?;
        Some(self.orders.remove(index))
    }

    pub fn get(&self, id: u32) -> Option<&Order> {
        self.orders.iter().find(|o| o.id == id)
    }

    pub fn get_mut(&mut self, id: u32) -> Option<&mut Order> {
        self.orders.iter_mut().find(|o| o.id == id)
    }

    pub fn orders(&self) -> &[Order] {
        &self.orders
    }

    pub fn active(&self) -> impl Iterator<Item = &Order> {
        self.orders.iter().filter(|o| o.is_active())
    }

    /// Earliest active ticket whose requirements are covered
    pub fn find_match(&self, have: &Multiset) -> Option<&Order> {
        self.active().find(|o| covers(have, &o.required))
    }

    /// Recipe ids with at least two mergeable tickets, in queue order
    pub fn mergeable_recipes(&self) -> Vec<String> {
        let mut seen: Vec<String> = Vec::new();
        for order in self.orders.iter().filter(|o| o.is_mergeable()) {
            let n = self
                .orders
                .iter()
                .filter(|o| o.is_mergeable() && o.recipe_id == order.recipe_id)
                .count();
            if n >= 2 && !seen.contains(&order.recipe_id) {
                seen.push(order.recipe_id.clone());
            }
        }
        seen
    }

    pub fn len(&self) -> usize {
        self.orders.len()
    }

    pub fn is_empty(&self) -> bool {
        self.orders.is_empty()
    }

    pub fn clear(&mut self) {
        self.orders.clear();
    }
}
