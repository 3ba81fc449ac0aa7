//! Per-frame particle physics
//!
//! Owns every particle and the animated wok. Reads the shared snapshot but
//! never writes it: cooking changes flow in through `contents` and the meter
//! levels, one-shot animations through the [`TriggerQueue`], and everything
//! that happens comes back out as [`SimEvent`]s.

use std::collections::HashSet;

use rand::Rng;

use crate::audio::{CueThrottle, SoundEffect};
use crate::catalog::{Catalog, IngredientId};
use crate::consts::*;
use crate::settings::QualityPreset;

use super::bowl::Bowl;
use super::choreography::{ServeAnimation, WokMotion};
use super::cosmetics::{self, TRASHED_FOOD_COLOR, TRASHED_OIL_COLOR, fling, water_color};
use super::events::{EffectSink, SimEvent, Trigger, TriggerQueue};
use super::fire;
use super::fluid::FluidPool;
use super::food;
use super::state::{CosmeticParticle, FireParticle, FluidKind, FoodParticle, SimulationSnapshot};

/// Minimum seconds between food impact cues
pub const IMPACT_COOLDOWN: f64 = 0.08;
/// Distance past the rim (and above the center line) that counts as spilled
const SPILL_MARGIN: f32 = 5.0;

/// Wastage for one spilled particle of a cohort
pub fn spill_cost(unit_cost: f64, cohort_size: u32) -> f64 {
    unit_cost / f64::from(cohort_size.max(1))
}

/// What one physics frame reads
#[derive(Debug, Clone, Copy)]
pub struct FrameContext<'a> {
    pub snapshot: &'a SimulationSnapshot,
    pub catalog: &'a Catalog,
    pub quality: QualityPreset,
}

/// Particle world for one session
#[derive(Debug, Clone)]
pub struct PhysicsEngine {
    food: Vec<FoodParticle>,
    oil: FluidPool,
    water: FluidPool,
    fire: Vec<FireParticle>,
    cosmetics: Vec<CosmeticParticle>,
    motion: WokMotion,
    serve: Option<ServeAnimation>,
    /// Ingredients already given particles, parallel to `contents`
    spawned: Vec<IngredientId>,
    /// Instances that have reported their first spill
    spilled_instances: HashSet<u32>,
    next_instance_id: u32,
    impact: CueThrottle,
    /// Last grime level seen while water was in the pan
    rinse_dirtiness: f32,
    /// Seconds of simulated frames
    clock: f64,
}

impl Default for PhysicsEngine {
    fn default() -> Self {
        Self::new()
    }
}

impl PhysicsEngine {
    pub fn new() -> Self {
        Self {
            food: Vec::new(),
            oil: FluidPool::new(FluidKind::Oil),
            water: FluidPool::new(FluidKind::Water),
            fire: Vec::new(),
            cosmetics: Vec::new(),
            motion: WokMotion::new(),
            serve: None,
            spawned: Vec::new(),
            spilled_instances: HashSet::new(),
            next_instance_id: 1,
            impact: CueThrottle::new(IMPACT_COOLDOWN),
            rinse_dirtiness: 0.0,
            clock: 0.0,
        }
    }

    /// Advance one render frame of `frames` 60 Hz frames
    pub fn step<R, S>(&mut self, ctx: &FrameContext, triggers: &mut TriggerQueue, frames: f32, rng: &mut R, sink: &mut S)
    where
        R: Rng + ?Sized,
        S: EffectSink + ?Sized,
    {
        let frames = frames.clamp(0.0, MAX_FRAME_SCALE);
        let snap = ctx.snapshot;
        self.clock += f64::from(frames / 60.0);
        if snap.water > 0.0 {
            self.rinse_dirtiness = snap.water_dirtiness;
        }

        self.run_triggers(triggers, rng, sink);

        let serve_tilt = self.serve.as_ref().map_or(0.0, ServeAnimation::tilt);
        let bowl = self.motion.update(snap.toss, serve_tilt, frames);
        let moving = self.motion.is_moving();
        let serving = self.serve.is_some();

        if !serving {
            self.sync_food(snap, ctx.catalog, &bowl, rng);
        }
        self.step_food(&bowl, moving, frames, sink);

        if !serving {
            self.oil.sync(snap.oil, snap.is_oiling, &bowl, rng);
        }
        self.oil.step(snap.oil, &bowl, self.motion.velocity(), frames, rng);
        self.water.sync(snap.water, snap.is_cleaning, &bowl, rng);
        self.water.step(snap.water, &bowl, self.motion.velocity(), frames, rng);

        if !snap.is_cleaning {
            fire::emit(&mut self.fire, snap.heat, ctx.quality.fire_cap(), &bowl, rng);
        }
        fire::step(&mut self.fire, snap.heat, &bowl, frames);

        cosmetics::emit_ambient(
            &mut self.cosmetics,
            snap.heat,
            !self.food.is_empty(),
            !self.oil.is_empty(),
            snap.water > 0.0,
            ctx.quality.smoke_enabled(),
            &bowl,
            rng,
        );
        cosmetics::step(&mut self.cosmetics, frames);

        if let Some(anim) = &mut self.serve {
            let done = anim.step(frames, &mut self.food, self.oil.particles_mut(), &mut self.cosmetics, rng);
            if done {
                self.serve = None;
                self.food.clear();
                self.oil.clear();
                self.spawned.clear();
                self.spilled_instances.clear();
                log::debug!("Serve animation finished");
            }
        }
    }

    fn run_triggers<R, S>(&mut self, triggers: &mut TriggerQueue, rng: &mut R, sink: &mut S)
    where
        R: Rng + ?Sized,
        S: EffectSink + ?Sized,
    {
        let mut deferred = Vec::new();
        for trigger in triggers.drain() {
            match trigger {
                Trigger::CleanToss => self.clean_toss(rng, sink),
                Trigger::TrashToss => self.trash_toss(rng, sink),
                Trigger::ServeToss if self.serve.is_some() => deferred.push(trigger),
                Trigger::ServeToss => self.serve = Some(ServeAnimation::new()),
            }
        }
        for trigger in deferred.into_iter().rev() {
            triggers.defer(trigger);
        }
    }

    /// Spawn cohorts for new contents; drop everything once the wok is emptied
    fn sync_food<R: Rng + ?Sized>(&mut self, snap: &SimulationSnapshot, catalog: &Catalog, bowl: &Bowl, rng: &mut R) {
        if snap.contents.is_empty() {
            if !self.spawned.is_empty() {
                self.food.clear();
                self.spawned.clear();
            }
            return;
        }
        if snap.contents.len() < self.spawned.len() {
            self.spawned.truncate(snap.contents.len());
            return;
        }

        for id in &snap.contents[self.spawned.len()..] {
            match catalog.ingredient(id.as_str()) {
                Some(ingredient) => {
                    let instance_id = self.next_instance_id;
                    self.next_instance_id += 1;
                    food::spawn_cohort(&mut self.food, &mut self.cosmetics, ingredient, instance_id, bowl, rng);
                }
                None => log::warn!("No catalog entry for {}, nothing spawned", id),
            }
            self.spawned.push(id.clone());
        }
    }

    fn step_food<S: EffectSink + ?Sized>(&mut self, bowl: &Bowl, moving: bool, frames: f32, sink: &mut S) {
        let wok_velocity = self.motion.velocity();
        for p in &mut self.food {
            food::integrate(p, moving, bowl.center.y, frames);

            if !p.spilled && bowl.is_outside_rim(p.pos, SPILL_MARGIN, SPILL_MARGIN) {
                p.spilled = true;
                let first_for_instance = self.spilled_instances.insert(p.instance_id);
                sink.emit(SimEvent::Spill {
                    ingredient: p.ingredient.clone(),
                    instance_id: p.instance_id,
                    cohort_size: p.cohort_size,
                    first_for_instance,
                });
                if first_for_instance {
                    sink.emit(SimEvent::Sound(SoundEffect::Trash));
                }
            }

            if food::collide(p, bowl, wok_velocity, moving, frames) && self.impact.try_fire(self.clock) {
                sink.emit(SimEvent::Sound(SoundEffect::FoodImpact));
            }
        }
        food::separate(&mut self.food, moving);
        self.food.retain(|p| p.pos.y < CANVAS_HEIGHT + 100.0);
    }

    /// Fling the rinse water over the rim
    fn clean_toss<R, S>(&mut self, rng: &mut R, sink: &mut S)
    where
        R: Rng + ?Sized,
        S: EffectSink + ?Sized,
    {
        let color = water_color(self.rinse_dirtiness);
        for drop in self.water.take() {
            let size = 3.0 + rng.random::<f32>() * 4.0;
            fling(&mut self.cosmetics, drop.pos, (25.0, 20.0), (15.0, 15.0), (30.0, 20.0), size, color, rng);
        }
        self.rinse_dirtiness = 0.0;
        self.motion.throw();
        sink.emit(SimEvent::Sound(SoundEffect::TossWhoosh));
    }

    /// Fling food and oil over the rim and forget them
    fn trash_toss<R, S>(&mut self, rng: &mut R, sink: &mut S)
    where
        R: Rng + ?Sized,
        S: EffectSink + ?Sized,
    {
        for p in self.food.drain(..) {
            let size = p.size * 0.4 + rng.random::<f32>() * 3.0;
            fling(&mut self.cosmetics, p.pos, (20.0, 25.0), (12.0, 18.0), (35.0, 20.0), size, TRASHED_FOOD_COLOR, rng);
        }
        for drop in self.oil.take() {
            let size = 2.0 + rng.random::<f32>() * 3.0;
            fling(&mut self.cosmetics, drop.pos, (18.0, 15.0), (10.0, 12.0), (25.0, 15.0), size, TRASHED_OIL_COLOR, rng);
        }
        self.spawned.clear();
        self.spilled_instances.clear();
        self.motion.throw();
        sink.emit(SimEvent::Sound(SoundEffect::TossWhoosh));
    }

    /// Drop food and oil at once (burnt dishes skip the animation)
    pub fn clear(&mut self) {
        self.food.clear();
        self.oil.clear();
        self.spawned.clear();
        self.spilled_instances.clear();
    }

    /// Back to a cold, empty pan
    pub fn reset(&mut self) {
        *self = Self::new();
    }

    pub fn food(&self) -> &[FoodParticle] {
        &self.food
    }

    pub fn oil(&self) -> &FluidPool {
        &self.oil
    }

    pub fn water(&self) -> &FluidPool {
        &self.water
    }

    pub fn fire(&self) -> &[FireParticle] {
        &self.fire
    }

    pub fn cosmetics(&self) -> &[CosmeticParticle] {
        &self.cosmetics
    }

    pub fn motion(&self) -> &WokMotion {
        &self.motion
    }

    pub fn serve_animation(&self) -> Option<&ServeAnimation> {
        self.serve.as_ref()
    }

    pub fn is_serving(&self) -> bool {
        self.serve.is_some()
    }

    pub fn bowl(&self) -> Bowl {
        self.motion.bowl()
    }

    #[cfg(test)]
    pub(crate) fn food_mut(&mut self) -> &mut Vec<FoodParticle> {
        &mut self.food
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;
    use rand::SeedableRng;
    use rand_pcg::Pcg32;

    struct Rig {
        engine: PhysicsEngine,
        snap: SimulationSnapshot,
        catalog: Catalog,
        triggers: TriggerQueue,
        rng: Pcg32,
        events: Vec<SimEvent>,
    }

    impl Rig {
        fn new(contents: &[&str]) -> Self {
            Self {
                engine: PhysicsEngine::new(),
                snap: SimulationSnapshot {
                    contents: contents.iter().map(|&id| id.into()).collect(),
                    ..SimulationSnapshot::default()
                },
                catalog: Catalog::standard(),
                triggers: TriggerQueue::default(),
                rng: Pcg32::seed_from_u64(17),
                events: Vec::new(),
            }
        }

        fn frame(&mut self) {
            let ctx = FrameContext {
                snapshot: &self.snap,
                catalog: &self.catalog,
                quality: QualityPreset::Medium,
            };
            self.engine.step(&ctx, &mut self.triggers, 1.0, &mut self.rng, &mut self.events);
        }

        fn spills(&self) -> Vec<&SimEvent> {
            self.events.iter().filter(|e| matches!(e, SimEvent::Spill { .. })).collect()
        }
    }

    fn push_over_rim(p: &mut FoodParticle) {
        p.pos = Vec2::new(WOK_CENTER_X + WOK_RADIUS + 40.0, WOK_CENTER_Y);
        p.vel = Vec2::ZERO;
    }

    #[test]
    fn test_contents_spawn_cohorts_once() {
        let mut rig = Rig::new(&["rice", "soy_sauce", "beef"]);
        rig.frame();
        assert_eq!(rig.engine.food().len(), 58);
        rig.frame();
        assert_eq!(rig.engine.food().len(), 58);
        let ids: HashSet<u32> = rig.engine.food().iter().map(|p| p.instance_id).collect();
        assert_eq!(ids.len(), 2);
    }

    #[test]
    fn test_emptied_wok_drops_food() {
        let mut rig = Rig::new(&["rice"]);
        rig.frame();
        assert!(!rig.engine.food().is_empty());
        rig.snap.contents.clear();
        rig.frame();
        assert!(rig.engine.food().is_empty());
    }

    #[test]
    fn test_spill_reports_first_for_instance_once() {
        let mut rig = Rig::new(&["beef"]);
        rig.frame();
        for p in rig.engine.food_mut().iter_mut().take(3) {
            push_over_rim(p);
        }
        rig.frame();
        rig.frame();
        let spills = rig.spills();
        assert_eq!(spills.len(), 3);
        let firsts = spills
            .iter()
            .filter(|e| matches!(e, SimEvent::Spill { first_for_instance: true, .. }))
            .count();
        assert_eq!(firsts, 1);
        let trash_cues = rig
            .events
            .iter()
            .filter(|e| **e == SimEvent::Sound(SoundEffect::Trash))
            .count();
        assert_eq!(trash_cues, 1);
    }

    #[test]
    fn test_trash_toss_flings_everything() {
        let mut rig = Rig::new(&["rice"]);
        rig.frame();
        rig.snap.contents.clear();
        rig.snap.oil = 0.0;
        rig.triggers.push(Trigger::TrashToss);
        rig.frame();
        assert!(rig.engine.food().is_empty());
        assert!(rig.engine.oil().is_empty());
        assert!(rig.events.contains(&SimEvent::Sound(SoundEffect::TossWhoosh)));
        assert!(rig.engine.cosmetics().len() >= 50);
    }

    #[test]
    fn test_clean_toss_empties_water() {
        let mut rig = Rig::new(&[]);
        rig.snap.water = 20.0;
        rig.snap.water_dirtiness = 50.0;
        rig.snap.is_cleaning = true;
        for _ in 0..10 {
            rig.frame();
        }
        assert!(!rig.engine.water().is_empty());
        rig.snap.water = 0.0;
        rig.snap.is_cleaning = false;
        rig.triggers.push(Trigger::CleanToss);
        rig.frame();
        assert!(rig.engine.water().is_empty());
        assert!(rig.engine.motion().shake() > 0.0);
    }

    #[test]
    fn test_serve_clears_only_when_finished() {
        let mut rig = Rig::new(&["beef"]);
        for _ in 0..30 {
            rig.frame();
        }
        rig.snap.contents.clear();
        rig.snap.oil = 0.0;
        rig.triggers.push(Trigger::ServeToss);
        rig.frame();
        assert!(rig.engine.is_serving());
        assert!(!rig.engine.food().is_empty());

        rig.triggers.push(Trigger::ServeToss);
        rig.frame();
        assert_eq!(rig.triggers.len(), 1);

        for _ in 0..400 {
            rig.frame();
            if !rig.engine.is_serving() {
                break;
            }
        }
        assert!(rig.engine.food().is_empty());
        assert!(rig.engine.oil().is_empty());
    }

    #[test]
    fn test_finished_serve_forgets_spilled_instances() {
        let mut rig = Rig::new(&["beef"]);
        rig.frame();
        push_over_rim(&mut rig.engine.food_mut()[0]);
        rig.frame();
        assert_eq!(rig.engine.spilled_instances.len(), 1);

        rig.snap.contents.clear();
        rig.snap.oil = 0.0;
        rig.triggers.push(Trigger::ServeToss);
        for _ in 0..400 {
            rig.frame();
            if !rig.engine.is_serving() {
                break;
            }
        }
        assert!(!rig.engine.is_serving());
        assert!(rig.engine.spilled_instances.is_empty());
    }

    #[test]
    fn test_low_quality_caps_fire() {
        let mut rig = Rig::new(&[]);
        rig.snap.heat = 100.0;
        for _ in 0..200 {
            let ctx = FrameContext {
                snapshot: &rig.snap,
                catalog: &rig.catalog,
                quality: QualityPreset::Low,
            };
            rig.engine.step(&ctx, &mut rig.triggers, 1.0, &mut rig.rng, &mut rig.events);
            assert!(rig.engine.fire().len() <= QualityPreset::Low.fire_cap());
        }
    }

    #[test]
    fn test_spill_cost_prorates_by_cohort() {
        assert_eq!(spill_cost(1.5, 50), 0.03);
        assert_eq!(spill_cost(2.0, 0), 2.0);
    }

    proptest! {
        #![proptest_config(ProptestConfig::with_cases(24))]

        #[test]
        fn prop_spilling_a_cohort_costs_its_unit_cost(batches in prop::collection::vec(1usize..12, 1..8)) {
            let mut rig = Rig::new(&["rice"]);
            rig.frame();
            let unit_cost = rig.catalog.ingredient("rice").map_or(0.0, |i| i.cost);
            let cohort = rig.engine.food().len();

            for batch in batches.iter().copied().chain(std::iter::once(cohort)) {
                for p in rig.engine.food_mut().iter_mut().filter(|p| !p.spilled).take(batch) {
                    push_over_rim(p);
                }
                rig.frame();
            }

            let wastage: f64 = rig
                .events
                .iter()
                .filter_map(|e| match e {
                    SimEvent::Spill { cohort_size, .. } => Some(spill_cost(unit_cost, *cohort_size)),
                    _ => None,
                })
                .sum();
            prop_assert_eq!(rig.spills().len(), cohort);
            prop_assert!((wastage - unit_cost).abs() < 1e-9);
        }
    }
}
