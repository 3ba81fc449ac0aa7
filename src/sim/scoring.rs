//! Serve scoring
//!
//! [`evaluate`] is a pure read of the snapshot, the wallet and the ticket rail.
//! [`settle`] applies an outcome to the wallet and the rail and reports how the
//! wok must be emptied; the session owns the snapshot clear itself.

use rand::Rng;

use crate::audio::SoundEffect;
use crate::catalog::{Catalog, IngredientId, Modifiers};
use crate::round_cents;
use crate::settings::Settings;

use super::events::{EffectSink, FailReason, SimEvent};
use super::orders::{Multiset, Order, OrderQueue, frequency_map, missing};
use super::state::{SimulationSnapshot, Wallet};

/// Minimum cook progress for a sale
pub const SERVE_COOK_MIN: f32 = 75.0;
/// Minimum cook progress for a chef's special
pub const SPECIAL_COOK_MIN: f32 = 50.0;
/// Delight lost or gained per judged dish
pub const DELIGHT_STEP: i32 = 2;
/// Ideal oil when a ticket does not name one
pub const DEFAULT_IDEAL_OIL: f32 = 40.0;
/// Chef's special markup bounds
pub const MARKUP_MIN: f64 = 1.5;
pub const MARKUP_MAX: f64 = 4.0;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ServeAction {
    Serve,
    /// Donate the dish: matched gifts earn soul, unmatched ones cost ingredients
    Gift,
}

/// Headline grade of a dish
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QualityTag {
    Good,
    /// Cook ≥ 95 with burn < 20
    Perfect,
    /// Wok hei above 80
    WokHeiMaster,
}

/// How the pan oil compared to the ticket's ideal
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OilMatch {
    Perfect,
    Balanced,
    TooDry,
    TooGreasy,
    WayTooGreasy,
}

impl OilMatch {
    /// Oiliness of the ingredients shifts the oil the customer tastes
    pub fn effective_oil(oil: f32, avg_oiliness: f32) -> f32 {
        oil + (avg_oiliness - 1.5) * 8.0
    }

    pub fn classify(effective: f32, ideal: f32) -> Self {
        if (effective - ideal).abs() <= 12.0 {
            OilMatch::Perfect
        } else if effective > ideal + 35.0 {
            OilMatch::WayTooGreasy
        } else if effective > ideal + 20.0 {
            OilMatch::TooGreasy
        } else if effective < ideal - 25.0 {
            OilMatch::TooDry
        } else {
            OilMatch::Balanced
        }
    }

    pub fn mult(&self) -> f64 {
        match self {
            OilMatch::Perfect => 1.25,
            OilMatch::Balanced => 1.0,
            OilMatch::TooDry => 0.85,
            OilMatch::TooGreasy => 0.7,
            OilMatch::WayTooGreasy => 0.5,
        }
    }

    /// Tip per batch unit
    pub fn tip(&self) -> f64 {
        if *self == OilMatch::Perfect { 1.5 } else { 0.0 }
    }

    fn prefix(&self) -> &'static str {
        match self {
            OilMatch::Perfect => "Perfect Oil! ",
            OilMatch::Balanced => "",
            OilMatch::TooDry => "Too Dry! ",
            OilMatch::TooGreasy => "Too Greasy! ",
            OilMatch::WayTooGreasy => "Way Too Greasy! ",
        }
    }
}

/// Everything that went into a dish's grade
#[derive(Debug, Clone, PartialEq)]
pub struct Quality {
    pub tag: QualityTag,
    pub oil: OilMatch,
    /// Names of satisfied flavor combos
    pub combos: Vec<String>,
    pub deep_umami: bool,
    pub batch_size: u32,
    pub chefs_special: bool,
}

impl Quality {
    /// Customer-facing headline
    pub fn label(&self) -> String {
        let mut label = match (self.chefs_special, self.tag) {
            (false, QualityTag::Good) => "Good!".to_string(),
            (false, QualityTag::Perfect) => "Perfect!".to_string(),
            (false, QualityTag::WokHeiMaster) => "WOK HEI MASTER!".to_string(),
            (true, QualityTag::WokHeiMaster) => "WOK HEI SPECIAL!".to_string(),
            (true, _) => "CHEF'S SPECIAL!".to_string(),
        };
        label.insert_str(0, self.oil.prefix());
        if !self.combos.is_empty() {
            let suffix = if self.chefs_special { " SPECIAL!" } else { "!" };
            label = format!("{}{}", self.combos.join(" + "), suffix);
        }
        if self.deep_umami {
            let prefix = if self.chefs_special { "Deep Umami " } else { "Deep Umami! " };
            label.insert_str(0, prefix);
        }
        if self.batch_size > 1 {
            label = format!("BULK x{}! {}", self.batch_size, label);
        }
        label
    }
}

/// Priced result of a matched dish
#[derive(Debug, Clone, PartialEq)]
pub struct ServeReport {
    pub order_id: u32,
    pub recipe_id: String,
    pub batch_size: u32,
    /// Ingredient cost of everything in the wok
    pub cost: f64,
    /// Base value times every multiplier
    pub selling_price: f64,
    /// Tips kept after the cap
    pub tips: f64,
    /// Tip overflow converted to goodwill
    pub goodwill: f64,
    /// Selling price plus kept tips (and any daily special)
    pub revenue: f64,
    /// Revenue minus cost, rounded to cents
    pub profit: f64,
    pub quality: Quality,
    pub is_perfect: bool,
    pub effective_oil: f32,
    /// Streak after this serve
    pub new_combo: u32,
}

/// Soft rejections that still empty the wok
#[derive(Debug, Clone, PartialEq)]
pub enum RejectReason {
    /// Matched a ticket but cooked below the threshold
    Undercooked { order_id: u32, cook: f32 },
    /// Nothing on the rail matches; lists what the first active ticket lacks
    NoMatch { missing: Vec<IngredientId> },
    /// Gift that matched nothing: ingredients are paid for
    ImperfectGift { cost: f64 },
}

/// Result of a serve or gift
#[derive(Debug, Clone, PartialEq)]
pub enum ServeOutcome {
    /// Nothing to serve; state untouched
    EmptyWok,
    /// Serve with no active tickets; state untouched
    NoActiveOrders,
    Burnt,
    /// Matched a ticket demanding more wok hei than the dish has
    WokHeiGate { order_id: u32, wok_hei: f32, required: f32 },
    Rejected(RejectReason),
    Served(ServeReport),
    Gifted { report: ServeReport, soul: u32 },
}

impl ServeOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, ServeOutcome::Served(_) | ServeOutcome::Gifted { .. })
    }
}

/// How the wok must be emptied after settling
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WokClear {
    /// Leave everything as is
    Keep,
    /// Drop particles now, no animation
    Immediate,
    /// Fling food out of the pan
    Trash,
    /// Tip food onto a plate
    Serve,
}

/// Streak popups
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StreakMilestone {
    HeatingUp,
    WokAndRoll,
    ShaolinSpeed,
    SorrowfulTears,
    SikSan,
    ChefsSpecial,
}

impl StreakMilestone {
    pub fn title(&self) -> &'static str {
        match self {
            StreakMilestone::HeatingUp => "HEATING UP!",
            StreakMilestone::WokAndRoll => "WOK & ROLL!",
            StreakMilestone::ShaolinSpeed => "SHAOLIN SPEED!",
            StreakMilestone::SorrowfulTears => "SORROWFUL TEARS!",
            StreakMilestone::SikSan => "SIK SAN!",
            StreakMilestone::ChefsSpecial => "CHEF'S SPECIAL!",
        }
    }
}

/// First streak threshold crossed going from `old` to `new`
pub fn streak_milestone(old: u32, new: u32) -> Option<StreakMilestone> {
    if new >= 3 && old < 3 {
        Some(StreakMilestone::HeatingUp)
    } else if new >= 5 && old < 5 {
        Some(StreakMilestone::WokAndRoll)
    } else if new >= 10 && old < 10 {
        Some(StreakMilestone::ShaolinSpeed)
    } else if new >= 15 && old < 15 {
        Some(StreakMilestone::SorrowfulTears)
    } else if new >= 20 && new % 5 == 0 {
        Some(StreakMilestone::SikSan)
    } else {
        None
    }
}

/// Streak revenue multiplier, log-scaled
pub fn combo_mult(combo: u32) -> f64 {
    1.0 + (combo.max(1) as f64).log2() * 0.15
}

pub fn batch_mult(batch: u32) -> f64 {
    1.0 + (batch.max(1) - 1) as f64 * 0.4
}

/// Read-only inputs shared by every pricing path
#[derive(Debug, Clone, Copy)]
pub struct ScoringContext<'a> {
    pub catalog: &'a Catalog,
    pub settings: &'a Settings,
    pub modifiers: &'a Modifiers,
}

/// Ingredient-derived figures for the current wok
#[derive(Debug, Clone, PartialEq)]
pub struct DishMetrics {
    pub cost: f64,
    pub avg_umami: f32,
    pub avg_oiliness: f32,
    pub flavor_mult: f64,
    pub combos: Vec<String>,
}

impl DishMetrics {
    pub fn measure(contents: &[IngredientId], catalog: &Catalog) -> Self {
        let mut flavor_mult = 1.0;
        let mut combos = Vec::new();
        for combo in catalog.combos() {
            if combo.is_satisfied_by(contents) {
                flavor_mult *= combo.mult;
                combos.push(combo.name.clone());
            }
        }
        Self {
            cost: catalog.cost_of(contents),
            avg_umami: catalog.average_umami(contents),
            avg_oiliness: catalog.average_oiliness(contents),
            flavor_mult,
            combos,
        }
    }

    pub fn umami_mult(&self) -> f64 {
        1.0 + self.avg_umami.min(5.0) as f64 * 0.06
    }
}

fn grade(snap: &SimulationSnapshot) -> (QualityTag, f64, bool) {
    let is_perfect = snap.cook >= 95.0 && snap.burn < 20.0;
    if snap.wok_hei > 80.0 {
        (QualityTag::WokHeiMaster, 1.5, is_perfect)
    } else if is_perfect {
        (QualityTag::Perfect, 1.2, is_perfect)
    } else {
        (QualityTag::Good, 1.0, is_perfect)
    }
}

/// Price the wok contents against a matched ticket
pub fn price_dish(order: &Order, snap: &SimulationSnapshot, combo: u32, ctx: &ScoringContext<'_>) -> ServeReport {
    let metrics = DishMetrics::measure(&snap.contents, ctx.catalog);
    let batch = order.batch_size.max(1);
    let (tag, wok_hei_mult, is_perfect) = grade(snap);

    let ideal = if order.ideal_oil > 0.0 { order.ideal_oil } else { DEFAULT_IDEAL_OIL };
    let effective_oil = OilMatch::effective_oil(snap.oil, metrics.avg_oiliness);
    let oil = OilMatch::classify(effective_oil, ideal);

    let batch_m = batch_mult(batch);
    let selling_price = order.base_value
        * wok_hei_mult
        * metrics.flavor_mult
        * metrics.umami_mult()
        * combo_mult(combo)
        * batch_m
        * oil.mult()
        * ctx.modifiers.cash;

    let speed_tip = order.urgency() as f64 * 2.0 * batch_m * batch as f64;
    let total_tips = order.bonus_cash + speed_tip + oil.tip() * batch as f64;
    let tips = total_tips.min(selling_price * ctx.settings.mode.tip_cap_fraction());
    let goodwill = (total_tips - tips).max(0.0);
    let revenue = (selling_price + tips) * ctx.settings.special_mult(&order.recipe_id);

    ServeReport {
        order_id: order.id,
        recipe_id: order.recipe_id.clone(),
        batch_size: batch,
        cost: metrics.cost,
        selling_price,
        tips,
        goodwill,
        revenue,
        profit: round_cents(revenue - metrics.cost),
        quality: Quality {
            tag,
            oil,
            deep_umami: metrics.avg_umami >= 3.0,
            combos: metrics.combos,
            batch_size: batch,
            chefs_special: false,
        },
        is_perfect,
        effective_oil,
        new_combo: combo + batch + order.bonus_combo * batch,
    }
}

/// Judge a serve or gift without changing anything
pub fn evaluate(
    action: ServeAction,
    snap: &SimulationSnapshot,
    orders: &OrderQueue,
    wallet: &Wallet,
    ctx: &ScoringContext<'_>,
) -> ServeOutcome {
    if !snap.has_food() {
        return ServeOutcome::EmptyWok;
    }
    if snap.is_burnt() {
        return ServeOutcome::Burnt;
    }

    let have: Multiset = frequency_map(&snap.contents);
    let matched = orders.find_match(&have);

    if let Some(order) = matched {
        if let Some(required) = order.requires_wok_hei {
            if snap.wok_hei < required {
                return ServeOutcome::WokHeiGate {
                    order_id: order.id,
                    wok_hei: snap.wok_hei,
                    required,
                };
            }
        }
        if snap.cook >= SERVE_COOK_MIN {
            let report = price_dish(order, snap, wallet.combo, ctx);
            return match action {
                ServeAction::Serve => ServeOutcome::Served(report),
                ServeAction::Gift => {
                    let soul = (report.revenue / 10.0).floor().max(0.0) as u32 + report.batch_size;
                    ServeOutcome::Gifted { report, soul }
                }
            };
        }
    }

    match action {
        ServeAction::Gift => ServeOutcome::Rejected(RejectReason::ImperfectGift {
            cost: ctx.catalog.cost_of(&snap.contents),
        }),
        ServeAction::Serve => {
            let Some(first) = orders.active().next() else {
                return ServeOutcome::NoActiveOrders;
            };
            match matched {
                Some(order) => ServeOutcome::Rejected(RejectReason::Undercooked {
                    order_id: order.id,
                    cook: snap.cook,
                }),
                None => ServeOutcome::Rejected(RejectReason::NoMatch {
                    missing: missing(&have, &first.required),
                }),
            }
        }
    }
}

pub(crate) fn shift_delight(wallet: &mut Wallet, delta: i32, sink: &mut impl EffectSink) {
    let ended = wallet.adjust_delight(delta);
    sink.emit(SimEvent::DelightChanged { delight: wallet.delight });
    if ended {
        log::warn!("Delight bottomed out, shift over");
        sink.emit(SimEvent::GameOver);
    }
}

/// Apply an outcome to the wallet and rail
pub fn settle(
    action: ServeAction,
    outcome: &ServeOutcome,
    wallet: &mut Wallet,
    orders: &mut OrderQueue,
    settings: &Settings,
    sink: &mut impl EffectSink,
) -> WokClear {
    let permissive = settings.mode.is_permissive();
    match outcome {
        ServeOutcome::EmptyWok | ServeOutcome::NoActiveOrders => WokClear::Keep,
        ServeOutcome::Burnt => {
            let penalized = !permissive && action == ServeAction::Serve;
            log::info!("Burnt dish refused");
            if penalized {
                shift_delight(wallet, -DELIGHT_STEP, sink);
            }
            wallet.reset_combo();
            sink.emit(SimEvent::BurntServe { penalized });
            WokClear::Immediate
        }
        ServeOutcome::WokHeiGate { order_id, .. } => {
            if let Some(order) = orders.remove(*order_id) {
                log::info!("Ticket {} failed its wok hei test", order.id);
                sink.emit(SimEvent::OrderFailed {
                    order,
                    reason: FailReason::WokHeiGate,
                });
            }
            if !permissive {
                shift_delight(wallet, -DELIGHT_STEP, sink);
            }
            wallet.reset_combo();
            WokClear::Trash
        }
        ServeOutcome::Rejected(reason) => {
            wallet.reset_combo();
            match reason {
                RejectReason::ImperfectGift { cost } => {
                    if settings.mode.charges_trash() {
                        wallet.cash -= cost;
                    }
                    sink.emit(SimEvent::ServeRejected {
                        reason: reason.clone(),
                        penalized: false,
                    });
                    WokClear::Serve
                }
                _ => {
                    if !permissive {
                        shift_delight(wallet, -DELIGHT_STEP, sink);
                    }
                    sink.emit(SimEvent::ServeRejected {
                        reason: reason.clone(),
                        penalized: !permissive,
                    });
                    WokClear::Trash
                }
            }
        }
        ServeOutcome::Served(report) => {
            let old_combo = wallet.combo;
            wallet.cash += report.profit;
            wallet.score += report.revenue;
            wallet.goodwill += report.goodwill;
            wallet.combo = report.new_combo;
            orders.remove(report.order_id);
            log::info!("Served {} for {:.2} profit", report.recipe_id, report.profit);

            if !permissive {
                shift_delight(wallet, DELIGHT_STEP, sink);
                if report.quality.oil == OilMatch::WayTooGreasy {
                    shift_delight(wallet, -DELIGHT_STEP, sink);
                }
            }
            if let Some(milestone) = streak_milestone(old_combo, wallet.combo) {
                sink.emit(SimEvent::Streak(milestone));
            }
            sink.emit(SimEvent::ServeResult {
                order_id: report.order_id,
                profit: report.profit,
                quality: report.quality.label(),
                is_perfect: report.is_perfect,
            });
            sink.emit(SimEvent::Sound(SoundEffect::Ding {
                perfect: report.is_perfect,
            }));
            WokClear::Serve
        }
        ServeOutcome::Gifted { report, soul } => {
            wallet.soul += soul;
            wallet.cash -= report.cost;
            orders.remove(report.order_id);
            log::info!("Gifted {} for {} soul", report.recipe_id, soul);
            sink.emit(SimEvent::Gifted {
                order_id: report.order_id,
                soul: *soul,
                cost: report.cost,
            });
            sink.emit(SimEvent::Sound(SoundEffect::Ding {
                perfect: report.is_perfect,
            }));
            WokClear::Serve
        }
    }
}

/// Why a chef's special could not be offered
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpecialBlock {
    NoSuchOrder,
    EmptyWok,
    Undercooked,
    Burnt,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SpecialOutcome {
    NotAllowed(SpecialBlock),
    Accepted(ServeReport),
    Rejected { order_id: u32, patience_lost: f32 },
}

/// Percent chance a customer takes the chef's special instead of their ticket
pub fn accept_chance(order: &Order, snap: &SimulationSnapshot, avg_umami: f32, markup: f64) -> f64 {
    let mut chance = 35.0
        + avg_umami as f64 * 7.0
        + snap.cook as f64 / 100.0 * 12.0
        + order.urgency() as f64 * 8.0
        + snap.wok_hei as f64 / 100.0 * 10.0
        - snap.burn as f64 / 100.0 * 25.0;
    if order.event.is_some() {
        chance -= 15.0;
    }
    if order.merged {
        chance -= 10.0;
    }
    chance -= (markup - 2.0).max(0.0) * 12.0;
    chance.clamp(5.0, 95.0)
}

/// Price the current wok as an off-menu special
pub fn price_special(order: &Order, snap: &SimulationSnapshot, combo: u32, markup: f64, catalog: &Catalog) -> ServeReport {
    let metrics = DishMetrics::measure(&snap.contents, catalog);
    let (tag, _, is_perfect) = grade(snap);
    let wok_hei_mult = if tag == QualityTag::WokHeiMaster { 1.5 } else { 1.0 };
    let effective_oil = OilMatch::effective_oil(snap.oil, metrics.avg_oiliness);
    let oil = OilMatch::classify(effective_oil, DEFAULT_IDEAL_OIL);

    let base = metrics.cost * markup * (1.0 + metrics.avg_umami as f64 * 0.15);
    let revenue = base * wok_hei_mult * metrics.flavor_mult * metrics.umami_mult() * 1.3 * combo_mult(combo) * oil.mult();

    ServeReport {
        order_id: order.id,
        recipe_id: order.recipe_id.clone(),
        batch_size: 1,
        cost: metrics.cost,
        selling_price: revenue,
        tips: 0.0,
        goodwill: 0.0,
        revenue,
        profit: round_cents(revenue - metrics.cost),
        quality: Quality {
            tag,
            oil,
            deep_umami: metrics.avg_umami >= 3.0,
            combos: metrics.combos,
            batch_size: 1,
            chefs_special: true,
        },
        is_perfect,
        effective_oil,
        new_combo: combo + 1,
    }
}

/// Offer the wok contents to a ticket at `markup` times ingredient cost
pub fn propose_special<R: Rng + ?Sized>(
    order_id: u32,
    markup: f64,
    snap: &SimulationSnapshot,
    orders: &OrderQueue,
    wallet: &Wallet,
    catalog: &Catalog,
    rng: &mut R,
) -> SpecialOutcome {
    let Some(order) = orders.get(order_id).filter(|o| o.is_active()) else {
        return SpecialOutcome::NotAllowed(SpecialBlock::NoSuchOrder);
    };
    if !snap.has_food() {
        return SpecialOutcome::NotAllowed(SpecialBlock::EmptyWok);
    }
    if snap.cook < SPECIAL_COOK_MIN {
        return SpecialOutcome::NotAllowed(SpecialBlock::Undercooked);
    }
    if snap.is_burnt() {
        return SpecialOutcome::NotAllowed(SpecialBlock::Burnt);
    }

    let markup = if markup.is_finite() { markup.clamp(MARKUP_MIN, MARKUP_MAX) } else { MARKUP_MIN };
    let avg_umami = catalog.average_umami(&snap.contents);
    let chance = accept_chance(order, snap, avg_umami, markup);
    let roll = rng.random::<f64>() * 100.0;
    if roll < chance {
        SpecialOutcome::Accepted(price_special(order, snap, wallet.combo, markup, catalog))
    } else {
        SpecialOutcome::Rejected {
            order_id,
            patience_lost: 3.0 + rng.random::<f32>() * 5.0,
        }
    }
}

/// Apply a chef's special outcome
pub fn settle_special(
    outcome: &SpecialOutcome,
    wallet: &mut Wallet,
    orders: &mut OrderQueue,
    sink: &mut impl EffectSink,
) -> WokClear {
    match outcome {
        SpecialOutcome::NotAllowed(_) => WokClear::Keep,
        SpecialOutcome::Accepted(report) => {
            let old_combo = wallet.combo;
            wallet.cash += report.profit;
            wallet.score += report.revenue;
            wallet.combo = report.new_combo;
            orders.remove(report.order_id);
            log::info!("Chef's special accepted for {:.2}", report.profit);
            let milestone = match streak_milestone(old_combo, wallet.combo) {
                Some(m @ (StreakMilestone::HeatingUp | StreakMilestone::WokAndRoll)) => m,
                _ => StreakMilestone::ChefsSpecial,
            };
            sink.emit(SimEvent::Streak(milestone));
            sink.emit(SimEvent::SpecialAccepted {
                order_id: report.order_id,
                profit: report.profit,
            });
            sink.emit(SimEvent::Sound(SoundEffect::Ding {
                perfect: report.is_perfect,
            }));
            WokClear::Serve
        }
        SpecialOutcome::Rejected { order_id, patience_lost } => {
            if let Some(order) = orders.get_mut(*order_id) {
                order.time_left -= patience_lost;
            }
            sink.emit(SimEvent::SpecialRejected {
                order_id: *order_id,
                patience_lost: *patience_lost,
            });
            WokClear::Keep
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::settings::GameMode;

    fn snapshot(items: &[&str], cook: f32, burn: f32) -> SimulationSnapshot {
        SimulationSnapshot {
            contents: items.iter().map(|s| (*s).into()).collect(),
            cook,
            burn,
            oil: 0.0,
            ..SimulationSnapshot::default()
        }
    }

    const SPICY: [&str; 5] = ["beef", "rice", "egg", "chili", "soy_sauce"];

    #[test]
    fn test_oil_classification() {
        assert_eq!(OilMatch::classify(45.0, 40.0), OilMatch::Perfect);
        assert_eq!(OilMatch::classify(80.0, 40.0), OilMatch::WayTooGreasy);
        assert_eq!(OilMatch::classify(65.0, 40.0), OilMatch::TooGreasy);
        assert_eq!(OilMatch::classify(10.0, 40.0), OilMatch::TooDry);
        assert_eq!(OilMatch::classify(56.0, 40.0), OilMatch::Balanced);
    }

    #[test]
    fn test_streak_milestones() {
        assert_eq!(streak_milestone(1, 3), Some(StreakMilestone::HeatingUp));
        assert_eq!(streak_milestone(3, 4), None);
        assert_eq!(streak_milestone(4, 6), Some(StreakMilestone::WokAndRoll));
        assert_eq!(streak_milestone(19, 20), Some(StreakMilestone::SikSan));
        assert_eq!(streak_milestone(20, 21), None);
        assert_eq!(streak_milestone(24, 25), Some(StreakMilestone::SikSan));
    }

    #[test]
    fn test_combo_and_batch_mult() {
        assert_eq!(combo_mult(1), 1.0);
        assert!((combo_mult(4) - 1.3).abs() < 1e-12);
        assert!((batch_mult(3) - 1.8).abs() < 1e-12);
    }

    #[test]
    fn test_spicy_beef_rice_profit() {
        let catalog = Catalog::standard();
        let settings = Settings::default();
        let modifiers = Modifiers::default();
        let ctx = ScoringContext {
            catalog: &catalog,
            settings: &settings,
            modifiers: &modifiers,
        };
        let mut orders = OrderQueue::new();
        orders.enqueue(catalog.recipe("spicy_beef_rice").unwrap(), None, true);
        let snap = snapshot(&SPICY, 80.0, 10.0);

        let ServeOutcome::Served(report) = evaluate(ServeAction::Serve, &snap, &orders, &Wallet::default(), &ctx) else {
            panic!("expected a sale");
        };
        assert_eq!(report.quality.oil, OilMatch::TooDry);
        assert!((report.cost - 16.5).abs() < 1e-9);
        assert_eq!(report.profit, 6.67);
        assert_eq!(report.new_combo, 2);
    }

    #[test]
    fn test_undercooked_keeps_order() {
        let catalog = Catalog::standard();
        let settings = Settings::default();
        let modifiers = Modifiers::default();
        let ctx = ScoringContext {
            catalog: &catalog,
            settings: &settings,
            modifiers: &modifiers,
        };
        let mut orders = OrderQueue::new();
        orders.enqueue(catalog.recipe("spicy_beef_rice").unwrap(), None, true);
        let snap = snapshot(&SPICY, 60.0, 10.0);
        let outcome = evaluate(ServeAction::Serve, &snap, &orders, &Wallet::default(), &ctx);
        assert!(matches!(outcome, ServeOutcome::Rejected(RejectReason::Undercooked { .. })));

        let mut wallet = Wallet::default();
        let mut events = Vec::new();
        let clear = settle(ServeAction::Serve, &outcome, &mut wallet, &mut orders, &settings, &mut events);
        assert_eq!(clear, WokClear::Trash);
        assert_eq!(orders.len(), 1);
        assert_eq!(wallet.delight, -2);
    }

    #[test]
    fn test_tip_overflow_becomes_goodwill() {
        let catalog = Catalog::standard();
        let settings = Settings::default();
        let modifiers = Modifiers::default();
        let ctx = ScoringContext {
            catalog: &catalog,
            settings: &settings,
            modifiers: &modifiers,
        };
        let mut orders = OrderQueue::new();
        orders.enqueue(
            catalog.recipe("spicy_beef_rice").unwrap(),
            Some(crate::catalog::SpecialEvent::Rush),
            true,
        );
        let snap = snapshot(&SPICY, 80.0, 10.0);
        let ServeOutcome::Served(report) = evaluate(ServeAction::Serve, &snap, &orders, &Wallet::default(), &ctx) else {
            panic!("expected a sale");
        };
        assert!((report.tips - report.selling_price * 0.12).abs() < 1e-9);
        assert!((report.goodwill - (42.0 - report.tips)).abs() < 1e-9);
    }

    #[test]
    fn test_gift_converts_to_soul() {
        let catalog = Catalog::standard();
        let settings = Settings::default();
        let modifiers = Modifiers::default();
        let ctx = ScoringContext {
            catalog: &catalog,
            settings: &settings,
            modifiers: &modifiers,
        };
        let mut orders = OrderQueue::new();
        orders.enqueue(catalog.recipe("spicy_beef_rice").unwrap(), None, true);
        let snap = snapshot(&SPICY, 80.0, 10.0);
        let outcome = evaluate(ServeAction::Gift, &snap, &orders, &Wallet::default(), &ctx);
        let ServeOutcome::Gifted { soul, .. } = outcome else {
            panic!("expected a gift");
        };
        // revenue 23.17 -> 2 soul, plus one per batch unit
        assert_eq!(soul, 3);

        let mut wallet = Wallet::default();
        let mut events = Vec::new();
        settle(ServeAction::Gift, &outcome, &mut wallet, &mut orders, &settings, &mut events);
        assert_eq!(wallet.soul, 3);
        assert!((wallet.cash + 16.5).abs() < 1e-9);
        assert_eq!(wallet.combo, 1);
        assert!(orders.is_empty());
    }

    #[test]
    fn test_permissive_mode_skips_penalties() {
        let catalog = Catalog::standard();
        let settings = Settings {
            mode: GameMode::Sandbox,
            ..Settings::default()
        };
        let modifiers = Modifiers::default();
        let ctx = ScoringContext {
            catalog: &catalog,
            settings: &settings,
            modifiers: &modifiers,
        };
        let mut orders = OrderQueue::new();
        orders.enqueue(catalog.recipe("fried_rice").unwrap(), None, false);
        let snap = snapshot(&["salt"], 90.0, 0.0);
        let outcome = evaluate(ServeAction::Serve, &snap, &orders, &Wallet::default(), &ctx);
        let mut wallet = Wallet::default();
        let mut events = Vec::new();
        settle(ServeAction::Serve, &outcome, &mut wallet, &mut orders, &settings, &mut events);
        assert_eq!(wallet.delight, 0);
        assert!(events.iter().any(|e| matches!(e, SimEvent::ServeRejected { penalized: false, .. })));
    }

    #[test]
    fn test_no_active_orders_leaves_state() {
        let catalog = Catalog::standard();
        let settings = Settings::default();
        let modifiers = Modifiers::default();
        let ctx = ScoringContext {
            catalog: &catalog,
            settings: &settings,
            modifiers: &modifiers,
        };
        let orders = OrderQueue::new();
        let snap = snapshot(&SPICY, 80.0, 0.0);
        assert_eq!(
            evaluate(ServeAction::Serve, &snap, &orders, &Wallet::default(), &ctx),
            ServeOutcome::NoActiveOrders
        );
        assert_eq!(
            evaluate(ServeAction::Serve, &SimulationSnapshot::default(), &orders, &Wallet::default(), &ctx),
            ServeOutcome::EmptyWok
        );
    }

    #[test]
    fn test_accept_chance_bounds() {
        let catalog = Catalog::standard();
        let mut orders = OrderQueue::new();
        let id = orders.enqueue(catalog.recipe("fried_rice").unwrap(), None, true);
        let order = orders.get(id).unwrap();
        let snap = snapshot(&SPICY, 100.0, 0.0);
        // 35 + 2.2*7 + 12 + 8 = 70.4
        assert!((accept_chance(order, &snap, 2.2, 2.0) - 70.4).abs() < 1e-4);
        assert_eq!(accept_chance(order, &snap, 5.0, 1.5), 90.0);
        let burnt = snapshot(&SPICY, 0.0, 100.0);
        assert_eq!(accept_chance(order, &burnt, 0.0, 4.0), 5.0);
    }

    #[test]
    fn test_quality_label() {
        let quality = Quality {
            tag: QualityTag::Perfect,
            oil: OilMatch::Perfect,
            combos: Vec::new(),
            deep_umami: true,
            batch_size: 2,
            chefs_special: false,
        };
        assert_eq!(quality.label(), "BULK x2! Deep Umami! Perfect Oil! Perfect!");
    }
}
