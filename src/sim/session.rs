//! One cooking shift
//!
//! [`SimulationSession`] owns the snapshot, the wallet, the ticket rail and the
//! particle engine, and drives them on two clocks: a fixed 10 Hz cooking tick
//! and a delta-time scaled render frame. Hosts feed it pointer samples and
//! button state, call [`SimulationSession::advance`] once per display frame,
//! and drain the resulting [`SimEvent`]s.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::audio::{AudioSink, SoundEffect};
use crate::catalog::{Catalog, Modifiers};
use crate::consts::*;
use crate::settings::{GameMode, Settings};

use super::cooking::{self, AddRejected, CookingTuning};
use super::events::{EffectSink, FailReason, SimEvent, Trigger, TriggerQueue};
use super::gesture::{GestureMapper, PointerSample, sweep_heat};
use super::orders::{OrderQueue, SpawnPolicy};
use super::physics::{FrameContext, PhysicsEngine, spill_cost};
use super::scoring::{
    self, DELIGHT_STEP, ScoringContext, ServeAction, ServeOutcome, SpecialOutcome, WokClear, shift_delight,
};
use super::state::{SimulationSnapshot, Wallet};

/// A running shift
#[derive(Debug, Clone)]
pub struct SimulationSession {
    catalog: Catalog,
    settings: Settings,
    modifiers: Modifiers,
    tuning: CookingTuning,
    snapshot: SimulationSnapshot,
    wallet: Wallet,
    orders: OrderQueue,
    gesture: GestureMapper,
    engine: PhysicsEngine,
    triggers: TriggerQueue,
    rng: Pcg32,
    /// Seconds of cooking ticks run this shift
    clock: f64,
    ticks: u64,
    accumulator: f32,
    /// Spill cost waiting for the next cooking tick
    pending_wastage: f64,
    events: Vec<SimEvent>,
}

impl SimulationSession {
    pub fn new(catalog: Catalog, settings: Settings) -> Self {
        let modifiers = Modifiers::from_upgrades(&settings.owned_upgrades);
        let tuning = CookingTuning {
            modifiers,
            burn_mult: settings.difficulty.burn_mult(),
        };
        let mut session = Self {
            rng: Pcg32::seed_from_u64(settings.seed),
            catalog,
            settings,
            modifiers,
            tuning,
            snapshot: SimulationSnapshot::default(),
            wallet: Wallet::default(),
            orders: OrderQueue::new(),
            gesture: GestureMapper::new(),
            engine: PhysicsEngine::new(),
            triggers: TriggerQueue::default(),
            clock: 0.0,
            ticks: 0,
            accumulator: 0.0,
            pending_wastage: 0.0,
            events: Vec::new(),
        };
        session.open_rail();
        log::info!(
            "Shift started: {:?} on {:?}, seed {}",
            session.settings.mode,
            session.settings.difficulty,
            session.settings.seed
        );
        session
    }

    /// Standard menu with default settings
    pub fn with_defaults() -> Self {
        Self::new(Catalog::standard(), Settings::default())
    }

    /// Start a fresh shift with the same catalog and settings
    pub fn reset(&mut self) {
        *self = Self::new(self.catalog.clone(), self.settings.clone());
    }

    fn spawn_policy(&self) -> SpawnPolicy {
        let mode = self.settings.mode;
        SpawnPolicy {
            chapter: if mode == GameMode::Campaign { self.settings.chapter } else { None },
            max_tickets: mode.max_tickets(),
            timed: !mode.is_permissive(),
            auto_spawn: mode != GameMode::Sandbox,
            events: mode == GameMode::Campaign,
        }
    }

    /// Seed the rail with the first ticket of the shift
    fn open_rail(&mut self) {
        let policy = self.spawn_policy();
        let id = if self.settings.mode == GameMode::Campaign {
            let first = self.catalog.recipes_for_chapter(policy.chapter).first().copied();
            first.map(|recipe| self.orders.enqueue(recipe, None, policy.timed))
        } else {
            self.orders.force_next(&mut self.rng, &self.catalog, &policy)
        };
        if let Some(order_id) = id {
            self.events.push(SimEvent::OrderSpawned { order_id });
        }
    }

    // === Clocks ===

    /// Run cooking ticks owed for `elapsed` seconds, then one render frame.
    ///
    /// Returns the number of cooking ticks run.
    pub fn advance(&mut self, elapsed: f32) -> u32 {
        let elapsed = if elapsed.is_finite() { elapsed.max(0.0) } else { 0.0 };
        self.accumulator += elapsed;

        let mut substeps = 0;
        while self.accumulator >= COOK_DT && substeps < MAX_SUBSTEPS {
            self.tick(COOK_DT);
            self.accumulator -= COOK_DT;
            substeps += 1;
        }
        if substeps == MAX_SUBSTEPS && self.accumulator >= COOK_DT {
            log::debug!("Dropping {:.2}s of cooking backlog", self.accumulator);
            self.accumulator = 0.0;
        }

        self.render(elapsed);
        substeps
    }

    /// One cooking tick of `dt` seconds
    pub fn tick(&mut self, dt: f32) {
        let permissive = self.settings.mode.is_permissive();
        self.charge_wastage(permissive);

        if !self.wallet.game_over {
            for order in self.orders.tick_expiry(dt, self.modifiers.patience_decay) {
                log::info!("Ticket {} ({}) ran out of patience", order.id, order.recipe_id);
                if !permissive {
                    shift_delight(&mut self.wallet, -DELIGHT_STEP, &mut self.events);
                }
                self.wallet.reset_combo();
                self.events.push(SimEvent::OrderFailed {
                    order,
                    reason: FailReason::Expired,
                });
            }

            let policy = self.spawn_policy();
            if let Some(order_id) = self.orders.spawn_random(&mut self.rng, &self.catalog, &policy) {
                self.events.push(SimEvent::OrderSpawned { order_id });
            }
        }

        cooking::cook_tick(&mut self.snapshot, &self.tuning, self.clock, dt);
        self.clock += f64::from(dt);
        self.ticks += 1;
    }

    fn charge_wastage(&mut self, permissive: bool) {
        if self.pending_wastage <= 0.0 {
            return;
        }
        let amount = std::mem::take(&mut self.pending_wastage);
        if !permissive {
            self.wallet.cash -= amount;
            self.events.push(SimEvent::Wastage { amount });
        }
    }

    /// One physics frame of `dt` seconds
    pub fn render(&mut self, dt: f32) {
        let frames = if dt.is_finite() { (dt * 60.0).clamp(0.0, MAX_FRAME_SCALE) } else { 0.0 };
        self.snapshot.toss = self.gesture.ease(frames);

        let start = self.events.len();
        let ctx = FrameContext {
            snapshot: &self.snapshot,
            catalog: &self.catalog,
            quality: self.settings.quality,
        };
        self.engine.step(&ctx, &mut self.triggers, frames, &mut self.rng, &mut self.events);

        let spill_mult = self.settings.difficulty.spill_mult();
        for event in &self.events[start..] {
            if let SimEvent::Spill { ingredient, cohort_size, .. } = event {
                let unit_cost = self.catalog.ingredient(ingredient.as_str()).map_or(0.0, |i| i.cost);
                self.pending_wastage += spill_cost(unit_cost, *cohort_size) * spill_mult;
            }
        }
    }

    // === Input ===

    /// Feed one pointer sample from the toss pad
    pub fn pointer(&mut self, sample: PointerSample) {
        let out = self.gesture.sample(sample);
        self.snapshot.toss = out.toss;
        self.snapshot.is_tossing = out.is_tossing;
        if out.toss_tick {
            self.snapshot.last_toss_time = Some(self.clock);
            self.events.push(SimEvent::TossTick);
        }
        if out.sweep {
            self.snapshot.heat = sweep_heat(self.snapshot.heat, self.modifiers.toss_cooling);
        }
        if out.whoosh {
            self.events.push(SimEvent::Sound(SoundEffect::TossWhoosh));
        }
    }

    pub fn release_pointer(&mut self) {
        self.gesture.release();
        self.snapshot.is_tossing = false;
    }

    /// Burner dial, clamped to [0, 100]
    pub fn set_heat(&mut self, heat: f32) {
        self.snapshot.set_heat(heat);
    }

    pub fn set_oiling(&mut self, held: bool) {
        self.snapshot.is_oiling = held;
    }

    /// Hold or release the rinse button.
    ///
    /// Rinsing only starts in an empty wok. Letting go with water in the pan
    /// throws it out. Returns false if the press was refused.
    pub fn set_cleaning(&mut self, held: bool) -> bool {
        if held {
            if self.snapshot.has_food() {
                log::debug!("Cannot rinse with food in the wok");
                return false;
            }
            self.snapshot.is_cleaning = true;
            return true;
        }

        self.snapshot.is_cleaning = false;
        if self.snapshot.water > 0.0 {
            self.snapshot.water = 0.0;
            self.snapshot.water_dirtiness = 0.0;
            self.triggers.push(Trigger::CleanToss);
        }
        true
    }

    /// Drop one unit of an ingredient into the wok
    pub fn add_ingredient(&mut self, id: &str) -> Result<(), AddRejected> {
        let ingredient = self.catalog.ingredient(id).ok_or(AddRejected::UnknownIngredient)?;
        cooking::add_ingredient(&mut self.snapshot, ingredient)?;
        log::debug!("Added {} ({} in wok)", id, self.snapshot.contents.len());
        self.events.push(SimEvent::Sound(SoundEffect::Chop));
        self.events
            .push(SimEvent::Sound(SoundEffect::IngredientAdd(ingredient.family.profile().sound)));
        Ok(())
    }

    // === Actions ===

    pub fn serve(&mut self) -> ServeOutcome {
        self.resolve(ServeAction::Serve)
    }

    /// Donate the dish: earns soul instead of cash
    pub fn gift(&mut self) -> ServeOutcome {
        self.resolve(ServeAction::Gift)
    }

    fn resolve(&mut self, action: ServeAction) -> ServeOutcome {
        let ctx = ScoringContext {
            catalog: &self.catalog,
            settings: &self.settings,
            modifiers: &self.modifiers,
        };
        let outcome = scoring::evaluate(action, &self.snapshot, &self.orders, &self.wallet, &ctx);
        let clear = scoring::settle(action, &outcome, &mut self.wallet, &mut self.orders, &self.settings, &mut self.events);
        self.apply_clear(clear);
        if outcome.is_success() {
            self.refill_rail();
        }
        outcome
    }

    /// Dump the wok. Returns the ingredient cost charged.
    pub fn trash(&mut self) -> f64 {
        if !self.snapshot.has_food() {
            return 0.0;
        }
        let cost = if self.settings.mode.charges_trash() {
            self.catalog.cost_of(&self.snapshot.contents)
        } else {
            0.0
        };
        self.wallet.cash -= cost;
        self.wallet.reset_combo();
        log::info!("Trashed {} items for {:.2}", self.snapshot.contents.len(), cost);
        self.apply_clear(WokClear::Trash);
        cost
    }

    /// Offer the wok contents to ticket `order_id` at `markup` times cost
    pub fn propose_special(&mut self, order_id: u32, markup: f64) -> SpecialOutcome {
        let outcome = scoring::propose_special(
            order_id,
            markup,
            &self.snapshot,
            &self.orders,
            &self.wallet,
            &self.catalog,
            &mut self.rng,
        );
        let clear = scoring::settle_special(&outcome, &mut self.wallet, &mut self.orders, &mut self.events);
        self.apply_clear(clear);
        if matches!(outcome, SpecialOutcome::Accepted(_)) {
            self.refill_rail();
        }
        outcome
    }

    fn apply_clear(&mut self, clear: WokClear) {
        match clear {
            WokClear::Keep => {}
            WokClear::Immediate => {
                self.snapshot.clear_wok();
                self.engine.clear();
            }
            WokClear::Trash => {
                self.snapshot.clear_wok();
                self.triggers.push(Trigger::TrashToss);
                self.events.push(SimEvent::Sound(SoundEffect::Trash));
            }
            WokClear::Serve => {
                self.snapshot.clear_wok();
                self.pending_wastage = 0.0;
                self.triggers.push(Trigger::ServeToss);
            }
        }
    }

    /// Keep at least one live ticket on the rail after a sale
    fn refill_rail(&mut self) {
        if self.orders.active().next().is_some() {
            return;
        }
        let policy = self.spawn_policy();
        if let Some(order_id) = self.orders.force_next(&mut self.rng, &self.catalog, &policy) {
            self.events.push(SimEvent::OrderSpawned { order_id });
        }
    }

    // === Ticket rail ===

    /// The "+" button: spawn a ticket now if the rail has room
    pub fn force_next_order(&mut self) -> Option<u32> {
        let policy = self.spawn_policy();
        let id = self.orders.force_next(&mut self.rng, &self.catalog, &policy)?;
        self.events.push(SimEvent::OrderSpawned { order_id: id });
        Some(id)
    }

    /// Fold duplicate tickets for a recipe into one bulk ticket
    pub fn merge_orders(&mut self, recipe_id: &str) -> Option<u32> {
        let id = self.orders.merge_duplicates(recipe_id)?;
        let batch_size = self.orders.get(id).map_or(1, |o| o.batch_size);
        log::info!("Merged {} tickets for {}", batch_size, recipe_id);
        self.events.push(SimEvent::OrderMerged {
            order_id: id,
            batch_size,
        });
        Some(id)
    }

    pub fn bring_to_front(&mut self, order_id: u32) -> bool {
        self.orders.bring_to_front(order_id)
    }

    // === Output ===

    /// Take every event raised since the last drain
    pub fn drain_events(&mut self) -> Vec<SimEvent> {
        std::mem::take(&mut self.events)
    }

    /// Hand pending events to a collaborator
    pub fn dispatch<S: EffectSink + ?Sized>(&mut self, sink: &mut S) {
        for event in self.events.drain(..) {
            sink.emit(event);
        }
    }

    /// Update the continuous audio loops from the current state
    pub fn sync_audio<A: AudioSink + ?Sized>(&self, audio: &mut A) {
        audio.set_burner(self.snapshot.heat);
        audio.set_sizzle(self.snapshot.heat, self.snapshot.has_food());
        audio.set_cleaning(self.snapshot.is_cleaning);
    }

    /// Replace the saved parts of the shift; particles respawn from the contents
    pub fn restore(&mut self, mut snapshot: SimulationSnapshot, wallet: Wallet, orders: OrderQueue, ticks: u64) {
        snapshot.clamp_all();
        snapshot.contents.truncate(MAX_CONTENTS);
        snapshot.is_tossing = false;
        snapshot.last_toss_time = None;
        self.snapshot = snapshot;
        self.wallet = wallet;
        self.orders = orders;
        self.ticks = ticks;
        self.clock = ticks as f64 * f64::from(COOK_DT);
        self.engine.reset();
        self.gesture = GestureMapper::new();
        self.triggers.clear();
        self.pending_wastage = 0.0;
    }

    /// Cash goal for a chapter whose normal target is `base`
    pub fn goal_met(&self, base: f64) -> bool {
        self.wallet.cash >= self.settings.cash_target(base)
    }

    pub fn snapshot(&self) -> &SimulationSnapshot {
        &self.snapshot
    }

    /// Direct access for hosts that script scenarios or debug overlays
    pub fn snapshot_mut(&mut self) -> &mut SimulationSnapshot {
        &mut self.snapshot
    }

    pub fn wallet(&self) -> &Wallet {
        &self.wallet
    }

    pub fn orders(&self) -> &OrderQueue {
        &self.orders
    }

    pub fn engine(&self) -> &PhysicsEngine {
        &self.engine
    }

    pub fn catalog(&self) -> &Catalog {
        &self.catalog
    }

    pub fn settings(&self) -> &Settings {
        &self.settings
    }

    pub fn modifiers(&self) -> &Modifiers {
        &self.modifiers
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn clock(&self) -> f64 {
        self.clock
    }

    pub fn is_game_over(&self) -> bool {
        self.wallet.game_over
    }
}
