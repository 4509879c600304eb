//! Boss encounter: waypoint patrol, spread fire, staged defeat.
//!
//! A boss replaces the formation on every fifth level. It repeats a fixed
//! waypoint cycle, fires a three-way spread on a cadence timer, and on defeat
//! plays a staged explosion sequence before the level advances.

use glam::Vec2;
use rand::Rng;

use super::entity::EntityKind;
use super::events::GameEvent;
use super::scheduler::{CallbackTag, ScheduledAction};
use super::state::{BossPhase, BossState, GameState};
use crate::consts::*;

/// Repeating patrol cycle: (relative displacement, duration in seconds).
const PATTERN: [(Vec2, f32); 4] = [
    (Vec2::new(-200.0, 0.0), 2.0),
    (Vec2::new(0.0, -20.0), 0.5),
    (Vec2::new(200.0, 0.0), 2.0),
    (Vec2::new(0.0, -20.0), 0.5),
];

pub fn max_health(level: u32) -> i32 {
    20 + 5 * level as i32
}

/// Spawn the boss for the current level and start its fire cadence.
pub fn spawn(state: &mut GameState) {
    let entity = state.entities.spawn(
        EntityKind::Boss,
        Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - 100.0),
        Vec2::ZERO,
    );
    let health = max_health(state.level);
    state.boss = Some(BossState {
        entity,
        health,
        max_health: health,
        phase: BossPhase::Active,
        leg: 0,
        leg_elapsed: 0.0,
    });
    state.scheduler.every(
        state.time_ticks,
        BOSS_FIRE_INTERVAL,
        CallbackTag::Boss,
        ScheduledAction::BossVolley,
    );
    log::info!("boss spawned for level {} with {} hp", state.level, health);
}

/// Advance the patrol pattern by `dt` seconds.
pub fn update(state: &mut GameState, dt: f32) {
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    if boss.phase != BossPhase::Active {
        return;
    }
    let Some(entity) = state.entities.get_mut(boss.entity) else {
        return;
    };

    // Consume dt across leg boundaries so the cycle tracks the waypoints
    // exactly instead of drifting.
    let mut remaining = dt;
    while remaining > 0.0 {
        let (delta, duration) = PATTERN[boss.leg];
        let left_in_leg = duration - boss.leg_elapsed;
        let step = remaining.min(left_in_leg);
        entity.pos += delta * (step / duration);
        boss.leg_elapsed += step;
        remaining -= step;
        if boss.leg_elapsed >= duration {
            boss.leg = (boss.leg + 1) % PATTERN.len();
            boss.leg_elapsed = 0.0;
        }
    }
}

/// Fire the three-way spread from the boss's underside.
pub fn fire(state: &mut GameState) {
    let Some(boss) = state.boss.as_ref() else {
        return;
    };
    if boss.phase != BossPhase::Active {
        return;
    }
    let Some(origin) = state.entities.get(boss.entity).map(|e| e.pos) else {
        return;
    };

    state.push_event(GameEvent::ShotFired);
    for angle in BOSS_SPREAD_ANGLES {
        state.entities.spawn(
            EntityKind::EnemyBullet,
            origin - Vec2::new(0.0, 40.0),
            Vec2::new(angle.sin(), -angle.cos()) * BOSS_BULLET_SPEED,
        );
    }
}

/// Apply damage. Health floors at zero; the transition to `Defeating` happens
/// exactly once, and further damage while defeating is ignored.
pub fn damage(state: &mut GameState, amount: i32) {
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    if boss.phase != BossPhase::Active {
        return;
    }
    boss.health = boss.health.saturating_sub(amount).max(0);
    if boss.health == 0 {
        begin_defeat(state);
    }
}

/// Start the staged defeat sequence: award score, remove the boss entity,
/// schedule the chained explosions and the settle delay that completes the
/// level.
fn begin_defeat(state: &mut GameState) {
    let Some(boss) = state.boss.as_mut() else {
        return;
    };
    boss.phase = BossPhase::Defeating;
    let entity = boss.entity;
    let center = state
        .entities
        .get(entity)
        .map(|e| e.pos)
        .unwrap_or(Vec2::new(FIELD_WIDTH / 2.0, FIELD_HEIGHT - 100.0));
    state.entities.remove(entity);

    // Fire cadence stops; defeat staging reuses the Boss tag so a restart or
    // level skip cancels the whole set.
    state.scheduler.cancel(CallbackTag::Boss);
    for i in 0..BOSS_DEFEAT_EXPLOSIONS {
        state.scheduler.after(
            state.time_ticks,
            i as f32 * BOSS_EXPLOSION_SPACING,
            CallbackTag::Boss,
            ScheduledAction::BossExplosion { pos: center },
        );
    }
    state.scheduler.after(
        state.time_ticks,
        BOSS_SETTLE_DELAY,
        CallbackTag::Boss,
        ScheduledAction::FinishBossDefeat,
    );

    state.push_event(GameEvent::BossDefeated);
    let points = BOSS_SCORE_PER_LEVEL * u64::from(state.level);
    super::tick::add_score(state, points);
    log::info!("boss defeated on level {}", state.level);
}

/// One staged explosion at a scattered offset around the boss's last position.
pub fn staged_explosion(state: &mut GameState, center: Vec2) {
    let offset = Vec2::new(
        state.rng.random_range(-50.0..50.0),
        state.rng.random_range(-40.0..40.0),
    );
    state.push_event(GameEvent::Explosion {
        pos: center + offset,
        magnitude: super::events::ExplosionMagnitude::Big,
    });
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::Category;
    use crate::sim::state::GameMode;

    fn boss_state() -> GameState {
        let mut state = GameState::new(3, 0);
        state.level = 5;
        let ids: Vec<_> = state.entities.iter(Category::Enemy).map(|e| e.id).collect();
        for id in ids {
            state.entities.remove(id);
        }
        state.entities.sweep();
        spawn(&mut state);
        state
    }

    #[test]
    fn test_spawn_health_formula() {
        let state = boss_state();
        let boss = state.boss.as_ref().expect("boss present");
        assert_eq!(boss.health, 45);
        assert_eq!(boss.phase, BossPhase::Active);
        assert_eq!(state.entities.count(Category::Boss), 1);
    }

    #[test]
    fn test_patrol_returns_to_cycle_start_x() {
        let mut state = boss_state();
        let start = state
            .entities
            .get(state.boss.as_ref().unwrap().entity)
            .unwrap()
            .pos;

        // One full 5-second cycle in uneven slices.
        let mut elapsed = 0.0;
        while elapsed < 5.0 {
            let dt = 0.013_f32.min(5.0 - elapsed);
            update(&mut state, dt);
            elapsed += dt;
        }
        let end = state
            .entities
            .get(state.boss.as_ref().unwrap().entity)
            .unwrap()
            .pos;
        assert!((end.x - start.x).abs() < 0.1);
        assert!((end.y - (start.y - 40.0)).abs() < 0.1);
    }

    #[test]
    fn test_health_floors_at_zero_and_defeat_fires_once() {
        let mut state = boss_state();
        damage(&mut state, 40);
        assert_eq!(state.boss.as_ref().unwrap().health, 5);

        // Overkill plus repeated hits in the same tick.
        damage(&mut state, 10);
        damage(&mut state, 10);
        damage(&mut state, 10);

        let boss = state.boss.as_ref().unwrap();
        assert_eq!(boss.health, 0);
        assert_eq!(boss.phase, BossPhase::Defeating);
        assert_eq!(state.score, 500 * 5);
        assert_eq!(
            state
                .events
                .iter()
                .filter(|e| matches!(e, GameEvent::BossDefeated))
                .count(),
            1
        );
        // Boss entity is gone immediately; mode untouched until settle.
        assert_eq!(state.entities.count(Category::Boss), 0);
        assert_eq!(state.mode, GameMode::Playing);
    }

    #[test]
    fn test_fire_spawns_spread() {
        let mut state = boss_state();
        fire(&mut state);
        let bullets: Vec<_> = state.entities.iter(Category::EnemyBullet).collect();
        assert_eq!(bullets.len(), 3);
        assert!(bullets.iter().all(|b| b.vel.y < 0.0));
        // Outer bullets angle apart, center flies straight down.
        assert!(bullets.iter().any(|b| b.vel.x < -1.0));
        assert!(bullets.iter().any(|b| b.vel.x > 1.0));
        assert!(bullets.iter().any(|b| b.vel.x.abs() < 1e-3));
    }
}
