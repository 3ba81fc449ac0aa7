//! Outbound effects and one-shot animation triggers
//!
//! Simulation code never calls collaborators directly. It pushes
//! [`SimEvent`]s, and hosts drain them once per frame.

use std::collections::VecDeque;

use crate::audio::{AudioSink, SoundEffect};
use crate::catalog::IngredientId;

use super::orders::Order;
use super::scoring::{RejectReason, StreakMilestone};

/// Why a ticket left the rail unserved
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FailReason {
    /// Ran out of patience
    Expired,
    /// Served below the ticket's wok hei demand
    WokHeiGate,
}

/// Something collaborators may want to react to
#[derive(Debug, Clone, PartialEq)]
pub enum SimEvent {
    /// Pointer moved fast enough to count as a toss
    TossTick,
    /// A food particle left the wok
    Spill {
        ingredient: IngredientId,
        instance_id: u32,
        cohort_size: u32,
        first_for_instance: bool,
    },
    /// Accumulated spill cost charged on a cooking tick
    Wastage { amount: f64 },
    ServeResult {
        order_id: u32,
        profit: f64,
        quality: String,
        is_perfect: bool,
    },
    /// A matched dish was donated
    Gifted { order_id: u32, soul: u32, cost: f64 },
    BurntServe { penalized: bool },
    ServeRejected { reason: RejectReason, penalized: bool },
    OrderFailed { order: Order, reason: FailReason },
    OrderSpawned { order_id: u32 },
    OrderMerged { order_id: u32, batch_size: u32 },
    /// Chef's special accepted
    SpecialAccepted { order_id: u32, profit: f64 },
    /// Chef's special turned down, ticket lost some patience
    SpecialRejected { order_id: u32, patience_lost: f32 },
    Streak(StreakMilestone),
    DelightChanged { delight: i32 },
    GameOver,
    Sound(SoundEffect),
}

/// Receiver for simulation effects
pub trait EffectSink {
    fn emit(&mut self, event: SimEvent);
}

impl EffectSink for Vec<SimEvent> {
    fn emit(&mut self, event: SimEvent) {
        self.push(event);
    }
}

/// Voices the sound events of a batch through an [`AudioSink`]
pub struct AudioAdapter<'a, A: AudioSink + ?Sized> {
    audio: &'a mut A,
}

impl<'a, A: AudioSink + ?Sized> AudioAdapter<'a, A> {
    pub fn new(audio: &'a mut A) -> Self {
        Self { audio }
    }
}

impl<A: AudioSink + ?Sized> EffectSink for AudioAdapter<'_, A> {
    fn emit(&mut self, event: SimEvent) {
        if let SimEvent::Sound(effect) = event {
            self.audio.play(effect);
        }
    }
}

/// Animation the physics engine plays once
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Trigger {
    /// Fling the rinse water out
    CleanToss,
    /// Fling food and oil out
    TrashToss,
    /// Tip the food onto a passing plate
    ServeToss,
}

/// Bounded FIFO of pending triggers, drained once per frame
#[derive(Debug, Clone)]
pub struct TriggerQueue {
    pending: VecDeque<Trigger>,
    capacity: usize,
}

impl Default for TriggerQueue {
    fn default() -> Self {
        Self::new(Self::DEFAULT_CAPACITY)
    }
}

impl TriggerQueue {
    pub const DEFAULT_CAPACITY: usize = 8;

    pub fn new(capacity: usize) -> Self {
        Self {
            pending: VecDeque::with_capacity(capacity),
            capacity: capacity.max(1),
        }
    }

    /// Queue a trigger; returns false (and drops it) when full
    pub fn push(&mut self, trigger: Trigger) -> bool {
        if self.pending.len() >= self.capacity {
            log::warn!("Trigger queue full, dropping {:?}", trigger);
            return false;
        }
        self.pending.push_back(trigger);
        true
    }

    /// Put a trigger back at the head (not yet playable this frame)
    pub fn defer(&mut self, trigger: Trigger) {
        if self.pending.len() >= self.capacity {
            self.pending.pop_back();
        }
        self.pending.push_front(trigger);
    }

    pub fn drain(&mut self) -> Vec<Trigger> {
        self.pending.drain(..).collect()
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }

    pub fn clear(&mut self) {
        self.pending.clear();
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[derive(Default)]
    struct Recorder(Vec<SoundEffect>);

    impl AudioSink for Recorder {
        fn play(&mut self, effect: SoundEffect) {
            self.0.push(effect);
        }
    }

    #[test]
    fn test_trigger_queue_is_bounded() {
        let mut queue = TriggerQueue::new(2);
        assert!(queue.push(Trigger::CleanToss));
        assert!(queue.push(Trigger::TrashToss));
        assert!(!queue.push(Trigger::ServeToss));
        assert_eq!(queue.drain(), vec![Trigger::CleanToss, Trigger::TrashToss]);
        assert!(queue.is_empty());
    }

    #[test]
    fn test_defer_goes_to_front() {
        let mut queue = TriggerQueue::new(4);
        queue.push(Trigger::TrashToss);
        queue.defer(Trigger::ServeToss);
        assert_eq!(queue.drain(), vec![Trigger::ServeToss, Trigger::TrashToss]);
    }

    #[test]
    fn test_audio_adapter_only_plays_sounds() {
        let mut audio = Recorder::default();
        let mut adapter = AudioAdapter::new(&mut audio);
        adapter.emit(SimEvent::GameOver);
        adapter.emit(SimEvent::Sound(SoundEffect::Chop));
        adapter.emit(SimEvent::Sound(SoundEffect::Ding { perfect: true }));
        assert_eq!(audio.0, vec![SoundEffect::Chop, SoundEffect::Ding { perfect: true }]);
    }
}
