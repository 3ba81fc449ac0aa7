//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed cooking tick, delta-time scaled physics frames
//! - Seeded RNG only
//! - Stable iteration order (insertion order for contents, particles and tickets)
//! - No rendering, audio or platform dependencies

pub mod bowl;
pub mod choreography;
pub mod cooking;
pub mod cosmetics;
pub mod events;
pub mod fire;
pub mod fluid;
pub mod food;
pub mod gesture;
pub mod orders;
pub mod physics;
pub mod scoring;
pub mod session;
pub mod state;

pub use cooking::{AddRejected, CookingTuning, add_ingredient, cook_tick};
pub use events::{AudioAdapter, EffectSink, FailReason, SimEvent, Trigger, TriggerQueue};
pub use gesture::{GestureMapper, GestureOutput, PointerSample};
pub use orders::{Order, OrderQueue, SpawnPolicy};
pub use physics::{FrameContext, PhysicsEngine};
pub use scoring::{ServeAction, ServeOutcome, ServeReport, SpecialOutcome};
pub use session::SimulationSession;
pub use state::{SimulationSnapshot, Wallet};
