//! Headless autoplay harness
//!
//! Runs the simulation with a simple autopilot and logs the events a real
//! frontend would render and sonify. Useful for eyeballing balance and for
//! soak-testing determinism without a window:
//!
//! ```text
//! star-swarm [seed] [seconds]
//! ```

use star_swarm::Settings;
use star_swarm::consts::*;
use star_swarm::sim::{Category, GameEvent, GameMode, GameState, TickInput, tick};

fn main() {
    env_logger::init();

    let mut args = std::env::args().skip(1);
    let seed: u64 = args
        .next()
        .and_then(|s| s.parse().ok())
        .unwrap_or(0xCAFE_F00D);
    let seconds: f32 = args.next().and_then(|s| s.parse().ok()).unwrap_or(120.0);

    let stored = std::env::var("STAR_SWARM_SETTINGS").ok();
    let settings = Settings::load_or_default(stored.as_deref());

    let mut state = GameState::new(seed, 0);
    state.developer_mode = settings.developer_mode;
    log::info!("autoplay: seed {seed}, {seconds} s");

    for _ in 0..star_swarm::secs_to_ticks(seconds) {
        let input = autopilot(&state);
        tick(&mut state, &input, SIM_DT);

        for event in state.drain_events() {
            match event {
                GameEvent::LevelComplete { level } => log::info!("level {level} complete"),
                GameEvent::BossDefeated => log::info!("boss defeated"),
                GameEvent::PowerUpCollected { kind } => log::info!("picked up {kind:?}"),
                GameEvent::PlayerHit => log::info!("player hit, {} lives left", state.lives),
                GameEvent::GameOver { final_score } => log::info!("game over, score {final_score}"),
                GameEvent::ScoreChanged { .. }
                | GameEvent::ShotFired
                | GameEvent::Explosion { .. }
                | GameEvent::BossHit => {}
            }
        }

        if state.mode == GameMode::GameOver {
            break;
        }
    }

    println!(
        "seed {seed}: level {}, score {}, high score {}, {:.1} s simulated",
        state.level,
        state.score,
        state.high_score,
        state.time_secs()
    );
}

/// Chase the nearest target's column while holding fire, the simplest thing
/// that plays a passable game.
fn autopilot(state: &GameState) -> TickInput {
    let mut input = TickInput {
        shoot: true,
        ..Default::default()
    };

    let Some(player) = state.player_pos() else {
        return input;
    };

    let target_x = state
        .entities
        .iter(Category::Enemy)
        .chain(state.entities.iter(Category::Boss))
        .map(|e| e.pos)
        .min_by(|a, b| {
            a.distance_squared(player)
                .partial_cmp(&b.distance_squared(player))
                .unwrap_or(std::cmp::Ordering::Equal)
        })
        .map(|pos| pos.x);

    if let Some(target_x) = target_x {
        if target_x < player.x - 5.0 {
            input.move_left = true;
        } else if target_x > player.x + 5.0 {
            input.move_right = true;
        }
    }

    input
}
