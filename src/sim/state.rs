//! Game state and core simulation types
//!
//! Everything the tick loop mutates lives here; behavior is spread across the
//! sibling modules (`formation`, `boss`, `collision`, `tick`).

use glam::Vec2;
use rand::SeedableRng;
use rand_pcg::Pcg32;
use serde::{Deserialize, Serialize};

use super::entity::{EntityId, EntityKind, EntityStore};
use super::events::GameEvent;
use super::scheduler::{CallbackTag, ScheduledAction, Scheduler};
use super::score::ComboTracker;
use crate::consts::*;

/// Top-level game mode. Exactly one is active at any instant; transitions are
/// the reentrancy guards for level completion and game over.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum GameMode {
    /// Normal tick processing.
    Playing,
    /// Simulation frozen; only the pause toggle is observed.
    Paused,
    /// Level-complete sequence in progress; simulation frozen, scheduler
    /// still polled so the transition can finish.
    Transitioning,
    /// Terminal; only restart is accepted.
    GameOver,
}

/// Power-up kinds dropped by destroyed enemies.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PowerUpKind {
    Shield,
    RapidFire,
    TripleShot,
    ExtraLife,
    Bomb,
}

impl PowerUpKind {
    pub const ALL: [PowerUpKind; 5] = [
        PowerUpKind::Shield,
        PowerUpKind::RapidFire,
        PowerUpKind::TripleShot,
        PowerUpKind::ExtraLife,
        PowerUpKind::Bomb,
    ];
}

/// Active timed power-up flags. Expiries are enforced by `ExpireEffect`
/// callbacks; re-arming cancels the prior callback, so at most one expiry per
/// kind is ever outstanding.
#[derive(Debug, Clone, Copy, Default)]
pub struct ActiveEffects {
    pub shield: bool,
    pub rapid_fire: bool,
    pub triple_shot: bool,
}

/// Swarm movement state. The formation moves as a unit in discrete steps;
/// see `formation::update`.
#[derive(Debug, Clone)]
pub struct FormationState {
    /// Horizontal direction: -1.0 or +1.0.
    pub direction: f32,
    /// Speed multiplier applied to the per-step stride.
    pub speed: f32,
    /// Seconds between steps in normal mode.
    pub move_interval: f32,
    pub last_step_tick: u64,
    /// Animation frame (0/1), toggled once per step for the renderer.
    pub anim_frame: u8,
    /// Per-tick maximum-speed movement (debug toggle).
    pub panic: bool,
}

impl FormationState {
    pub fn for_level(level: u32) -> Self {
        let mut state = Self {
            direction: 1.0,
            speed: 0.0,
            move_interval: 0.0,
            last_step_tick: 0,
            anim_frame: 0,
            panic: false,
        };
        state.retune(level);
        state
    }

    /// Recompute the difficulty-scaled parameters for `level`.
    pub fn retune(&mut self, level: u32) {
        self.move_interval = (0.5 - level as f32 * 0.03).max(0.1);
        self.speed = 1.0 + level as f32 * 0.2;
    }
}

/// Boss encounter phase.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BossPhase {
    /// Patrolling and firing.
    Active,
    /// Health hit zero; staged defeat sequence is playing out.
    Defeating,
}

/// Present only during boss levels.
#[derive(Debug, Clone)]
pub struct BossState {
    pub entity: EntityId,
    pub health: i32,
    pub max_health: i32,
    pub phase: BossPhase,
    /// Index into the waypoint pattern.
    pub leg: usize,
    /// Seconds elapsed in the current leg.
    pub leg_elapsed: f32,
}

/// True when `level` hosts a boss encounter instead of a formation.
pub fn is_boss_level(level: u32) -> bool {
    level % BOSS_LEVEL_EVERY == 0
}

/// Complete simulation state, advanced by `tick::tick`.
#[derive(Debug, Clone)]
pub struct GameState {
    /// Run seed for reproducibility.
    pub seed: u64,
    pub rng: Pcg32,
    pub mode: GameMode,
    pub lives: u32,
    pub score: u64,
    /// Highest score seen, seeded from the persistence collaborator.
    pub high_score: u64,
    pub level: u32,
    /// Simulation tick counter; monotonic across restarts.
    pub time_ticks: u64,
    pub combo: ComboTracker,
    pub effects: ActiveEffects,
    pub formation: FormationState,
    pub boss: Option<BossState>,
    pub entities: EntityStore,
    pub scheduler: Scheduler,
    pub player: EntityId,
    /// Tick of the last player shot, for the cooldown gate.
    pub last_shot_tick: Option<u64>,
    /// Debug invulnerability (also one-shots the boss).
    pub god_mode: bool,
    /// Gates the debug intents in `TickInput`.
    pub developer_mode: bool,
    /// Outbound events accumulated this tick; drained by the embedder.
    pub events: Vec<GameEvent>,
}

impl GameState {
    /// Create a fresh session. `high_score` is the single integer read from
    /// the persistence collaborator at startup.
    pub fn new(seed: u64, high_score: u64) -> Self {
        let mut state = Self {
            seed,
            rng: Pcg32::seed_from_u64(seed),
            mode: GameMode::Playing,
            lives: START_LIVES,
            score: 0,
            high_score,
            level: 1,
            time_ticks: 0,
            combo: ComboTracker::new(),
            effects: ActiveEffects::default(),
            formation: FormationState::for_level(1),
            boss: None,
            entities: EntityStore::new(),
            scheduler: Scheduler::new(),
            player: EntityId(0),
            last_shot_tick: None,
            god_mode: false,
            developer_mode: false,
            events: Vec::new(),
        };
        state.player = state
            .entities
            .spawn(EntityKind::Player, PLAYER_SPAWN, Vec2::ZERO);
        super::tick::populate_level(&mut state);
        state.scheduler.every(
            0,
            ENEMY_FIRE_INTERVAL,
            CallbackTag::Session,
            ScheduledAction::EnemyVolley,
        );
        state
    }

    /// Elapsed simulation time in seconds.
    pub fn time_secs(&self) -> f32 {
        self.time_ticks as f32 * SIM_DT
    }

    pub fn push_event(&mut self, event: GameEvent) {
        self.events.push(event);
    }

    /// Hand the accumulated events to the render/audio collaborators.
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Player position, if the player entity is live.
    pub fn player_pos(&self) -> Option<Vec2> {
        self.entities.get(self.player).map(|e| e.pos)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Category;

    #[test]
    fn test_new_session_spawns_level_one() {
        let state = GameState::new(7, 0);
        assert_eq!(state.mode, GameMode::Playing);
        assert_eq!(state.lives, START_LIVES);
        assert_eq!(state.level, 1);
        assert_eq!(
            state.entities.count(Category::Enemy),
            FORMATION_ROWS * FORMATION_COLS
        );
        assert!(state.boss.is_none());
        assert!(state.entities.get(state.player).is_some());
    }

    #[test]
    fn test_boss_level_cadence() {
        assert!(!is_boss_level(1));
        assert!(!is_boss_level(4));
        assert!(is_boss_level(5));
        assert!(!is_boss_level(6));
        assert!(is_boss_level(10));
    }

    #[test]
    fn test_formation_tuning_formulas() {
        let f = FormationState::for_level(1);
        assert!((f.move_interval - 0.47).abs() < 1e-6);
        assert!((f.speed - 1.2).abs() < 1e-6);

        // Interval floors at 0.1 s on deep levels.
        let f = FormationState::for_level(20);
        assert!((f.move_interval - 0.1).abs() < 1e-6);
        assert!((f.speed - 5.0).abs() < 1e-6);
    }
}
