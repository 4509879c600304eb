//! Deterministic simulation module
//!
//! All gameplay logic lives here. This module must be pure and deterministic:
//! - Fixed timestep only
//! - Seeded RNG only
//! - Stable iteration order (spawn order)
//! - No rendering, audio, or platform dependencies

pub mod boss;
pub mod collision;
pub mod entity;
pub mod events;
pub mod formation;
pub mod scheduler;
pub mod score;
pub mod state;
pub mod tick;

pub use collision::{Contact, detect_contacts, overlaps};
pub use entity::{Category, Entity, EntityId, EntityKind, EntityStore};
pub use events::{ExplosionMagnitude, GameEvent};
pub use scheduler::{CallbackTag, ScheduledAction, Scheduler};
pub use score::ComboTracker;
pub use state::{
    ActiveEffects, BossPhase, BossState, FormationState, GameMode, GameState, PowerUpKind,
    is_boss_level,
};
pub use tick::{TickInput, populate_level, restart, tick};
