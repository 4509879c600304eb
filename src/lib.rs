//! Star Swarm - simulation core of a fixed-camera arcade shooter
//!
//! Core modules:
//! - `sim`: Deterministic simulation (entities, formation movement,
//!   collisions, boss encounters, scoring, game state machine)
//! - `settings`: Persisted preferences, including the developer-mode gate
//!
//! Rendering, audio, windowing, and high-score storage are external
//! collaborators: they feed `sim::TickInput` in and drain `sim::GameEvent`s
//! out, and never touch simulation state directly.

pub mod settings;
pub mod sim;

pub use settings::Settings;
pub use sim::{GameEvent, GameMode, GameState, TickInput, tick};

/// Game configuration constants
pub mod consts {
    use glam::Vec2;

    /// Fixed simulation timestep (60 Hz arcade tick)
    pub const SIM_DT: f32 = 1.0 / 60.0;

    /// Playfield dimensions
    pub const FIELD_WIDTH: f32 = 800.0;
    pub const FIELD_HEIGHT: f32 = 600.0;

    /// Player defaults
    pub const PLAYER_SPEED: f32 = 480.0;
    pub const PLAYER_SPAWN_Y: f32 = 50.0;
    pub const PLAYER_MIN_X: f32 = 20.0;
    pub const PLAYER_MAX_X: f32 = FIELD_WIDTH - 20.0;
    pub const START_LIVES: u32 = 3;
    pub const MAX_LIVES: u32 = 5;

    /// Shooting
    pub const SHOT_COOLDOWN: f32 = 0.3;
    pub const RAPID_FIRE_DIVISOR: f32 = 3.0;
    pub const PLAYER_BULLET_SPEED: f32 = 750.0;
    pub const BULLET_SPAWN_OFFSET_Y: f32 = 35.0;
    pub const TRIPLE_SHOT_ANGLES: [f32; 3] = [-0.2, 0.0, 0.2];

    /// Enemy fire
    pub const ENEMY_FIRE_INTERVAL: f32 = 1.5;
    pub const ENEMY_BULLET_SPEED: f32 = 360.0;

    /// Formation grid
    pub const FORMATION_ROWS: usize = 5;
    pub const FORMATION_COLS: usize = 10;
    pub const FORMATION_COL_SPACING: f32 = 50.0;
    pub const FORMATION_ROW_SPACING: f32 = 40.0;
    pub const FORMATION_TOP_Y: f32 = FIELD_HEIGHT - 100.0;

    /// Formation movement. Normal mode steps on a level-scaled interval;
    /// panic mode steps every tick.
    pub const FORMATION_STRIDE: f32 = 10.0;
    pub const FORMATION_EDGE_MARGIN: f32 = 30.0;
    pub const FORMATION_DESCENT: f32 = 15.0;
    pub const PANIC_STRIDE: f32 = 20.0;
    pub const PANIC_EDGE_MARGIN: f32 = 20.0;
    pub const PANIC_DESCENT: f32 = 8.0;
    /// An enemy below this height ends the run.
    pub const LOSS_Y: f32 = 80.0;

    /// Power-ups
    pub const POWER_UP_DROP_CHANCE: f64 = 0.2;
    pub const POWER_UP_FALL_SPEED: f32 = 100.0;
    pub const POWER_UP_TTL: f32 = 10.0;
    pub const SHIELD_DURATION: f32 = 10.0;
    pub const RAPID_FIRE_DURATION: f32 = 8.0;
    pub const TRIPLE_SHOT_DURATION: f32 = 10.0;
    pub const BOMB_BOSS_DAMAGE: i32 = 10;

    /// Scoring
    pub const KILL_SCORE: u64 = 10;
    pub const COMBO_WINDOW: f32 = 2.0;
    pub const BOSS_SCORE_PER_LEVEL: u64 = 500;

    /// Boss encounter
    pub const BOSS_LEVEL_EVERY: u32 = 5;
    pub const BOSS_FIRE_INTERVAL: f32 = 2.0;
    pub const BOSS_BULLET_SPEED: f32 = 540.0;
    pub const BOSS_SPREAD_ANGLES: [f32; 3] = [-0.3, 0.0, 0.3];
    pub const BOSS_DEFEAT_EXPLOSIONS: u32 = 8;
    pub const BOSS_EXPLOSION_SPACING: f32 = 0.1;
    pub const BOSS_SETTLE_DELAY: f32 = 0.8;

    /// Level transition length (externally animated; simulation frozen)
    pub const TRANSITION_DURATION: f32 = 3.0;

    /// Outstanding scheduler callbacks are capped; the oldest one-shot is
    /// shed past this.
    pub const MAX_PENDING_CALLBACKS: usize = 64;

    /// Playfield center, where the player starts.
    pub const PLAYER_SPAWN: Vec2 = Vec2::new(FIELD_WIDTH / 2.0, PLAYER_SPAWN_Y);
}

/// Convert a duration in seconds to a whole number of simulation ticks.
#[inline]
pub fn secs_to_ticks(secs: f32) -> u64 {
    (secs / consts::SIM_DT).round() as u64
}
