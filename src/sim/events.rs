//! Events emitted by the simulation for rendering and audio collaborators.
//!
//! Events are fire-and-forget: the core pushes them during a tick and the
//! embedding app drains them afterward. Nothing in here feeds back into
//! gameplay.

use glam::Vec2;
use serde::{Deserialize, Serialize};

use super::state::PowerUpKind;

/// Explosion size hint for visual/audio scaling.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ExplosionMagnitude {
    Small,
    Big,
}

/// Outbound event for the render/audio collaborators.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type")]
pub enum GameEvent {
    /// A player or boss volley left the barrel.
    ShotFired,
    /// Something blew up at `pos`.
    Explosion { pos: Vec2, magnitude: ExplosionMagnitude },
    /// The player picked up a power-up.
    PowerUpCollected { kind: PowerUpKind },
    /// The player took a hit (or a shield absorbed one).
    PlayerHit,
    /// The boss took a hit.
    BossHit,
    /// A level was cleared (carries the completed level index).
    LevelComplete { level: u32 },
    /// The boss defeat sequence started.
    BossDefeated,
    /// The run ended.
    GameOver { final_score: u64 },
    /// Score changed; `high_score` reflects any update for the persistence
    /// collaborator to store.
    ScoreChanged { score: u64, high_score: u64 },
}
