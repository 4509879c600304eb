//! Fixed timestep simulation tick
//!
//! One call to `tick` advances the whole game by a single step: due scheduler
//! callbacks fire first, then movement, then contact resolution, then
//! progression checks. Inputs are sampled once per tick; collaborators queue
//! intents between ticks and never mutate state directly.

use glam::Vec2;
use rand::Rng;

use super::boss;
use super::collision::{self, Contact};
use super::entity::{Category, EntityId, EntityKind};
use super::events::{ExplosionMagnitude, GameEvent};
use super::formation::{self, FormationOutcome};
use super::scheduler::{CallbackTag, ScheduledAction};
use super::state::{
    ActiveEffects, BossPhase, FormationState, GameMode, GameState, PowerUpKind, is_boss_level,
};
use crate::consts::*;
use crate::secs_to_ticks;

/// Input commands for a single tick. Held flags reflect key state; the rest
/// are edge-triggered intents. Debug intents are ignored unless the state was
/// constructed with developer mode enabled.
#[derive(Debug, Clone, Default)]
pub struct TickInput {
    /// Held movement state.
    pub move_left: bool,
    pub move_right: bool,
    /// Held fire button; the cooldown gate decides when a shot leaves.
    pub shoot: bool,
    /// Pause toggle.
    pub pause: bool,
    /// Restart (honored only in `GameOver`).
    pub restart: bool,
    /// Debug: jump to the next boss level.
    pub skip_to_boss: bool,
    /// Debug: toggle invulnerability (also one-shots the boss).
    pub toggle_invulnerability: bool,
    /// Debug: wipe the field (requires invulnerability, like the original
    /// cheat chord).
    pub kill_all_enemies: bool,
    /// Debug: toggle maximum-speed formation movement.
    pub toggle_panic: bool,
}

/// Advance the game state by one fixed timestep.
pub fn tick(state: &mut GameState, input: &TickInput, dt: f32) {
    if input.restart && state.mode == GameMode::GameOver {
        restart(state);
        return;
    }

    if input.pause {
        match state.mode {
            GameMode::Playing => {
                state.mode = GameMode::Paused;
                return;
            }
            GameMode::Paused => state.mode = GameMode::Playing,
            _ => {}
        }
    }

    match state.mode {
        GameMode::Paused | GameMode::GameOver => return,
        GameMode::Transitioning => {
            // Simulation frozen, but the transition sequencing (and any boss
            // defeat staging) still runs off the scheduler.
            state.time_ticks += 1;
            for action in state.scheduler.poll(state.time_ticks) {
                execute_action(state, action);
            }
            state.entities.sweep();
            return;
        }
        GameMode::Playing => {}
    }

    state.time_ticks += 1;

    // Due callbacks fire before movement and collision processing.
    for action in state.scheduler.poll(state.time_ticks) {
        execute_action(state, action);
    }
    if state.mode != GameMode::Playing {
        state.entities.sweep();
        return;
    }

    if state.developer_mode {
        apply_debug_intents(state, input);
    }

    move_player(state, input, dt);
    try_shoot(state, input);
    move_projectiles(state, dt);

    if state.boss.is_some() {
        boss::update(state, dt);
    } else if !is_boss_level(state.level)
        && formation::update(state) == FormationOutcome::ReachedPlayer
    {
        // The swarm descended to the player's row: terminal, regardless of
        // remaining lives.
        game_over(state);
        state.entities.sweep();
        return;
    }

    resolve_contacts(state);

    state.combo.update(state.time_ticks);
    state.entities.sweep();
}

/// Spawn the entities for the current level: a boss on every fifth level, the
/// swarm grid otherwise.
pub fn populate_level(state: &mut GameState) {
    if is_boss_level(state.level) {
        boss::spawn(state);
    } else {
        formation::populate(state);
        state.formation.last_step_tick = state.time_ticks;
    }
}

/// Full session reset: back to level 1 with initial lives and score. Cancels
/// every outstanding callback and timed effect; only the high score survives.
pub fn restart(state: &mut GameState) {
    log::info!("restarting session");
    state.scheduler.clear();
    state.entities.clear();
    state.boss = None;
    state.mode = GameMode::Playing;
    state.lives = START_LIVES;
    state.score = 0;
    state.level = 1;
    state.combo.reset();
    state.effects = ActiveEffects::default();
    state.formation = FormationState::for_level(1);
    state.last_shot_tick = None;
    state.player = state
        .entities
        .spawn(EntityKind::Player, PLAYER_SPAWN, Vec2::ZERO);
    populate_level(state);
    state.scheduler.every(
        state.time_ticks,
        ENEMY_FIRE_INTERVAL,
        CallbackTag::Session,
        ScheduledAction::EnemyVolley,
    );
}

fn execute_action(state: &mut GameState, action: ScheduledAction) {
    match action {
        ScheduledAction::EnemyVolley => enemy_volley(state),
        ScheduledAction::BossVolley => boss::fire(state),
        ScheduledAction::ExpireEffect(kind) => expire_effect(state, kind),
        ScheduledAction::BossExplosion { pos } => boss::staged_explosion(state, pos),
        ScheduledAction::FinishBossDefeat => {
            state.boss = None;
            complete_level(state);
        }
        ScheduledAction::FinishTransition => finish_transition(state),
    }
}

/// A random formation enemy fires straight down. Suspended on boss levels and
/// outside normal play.
fn enemy_volley(state: &mut GameState) {
    if state.mode != GameMode::Playing || state.boss.is_some() {
        return;
    }
    let count = state.entities.count(Category::Enemy);
    if count == 0 {
        return;
    }
    let pick = state.rng.random_range(0..count);
    let Some(origin) = state
        .entities
        .iter(Category::Enemy)
        .nth(pick)
        .map(|e| e.pos)
    else {
        return;
    };
    state.entities.spawn(
        EntityKind::EnemyBullet,
        origin - Vec2::new(0.0, 15.0),
        Vec2::new(0.0, -ENEMY_BULLET_SPEED),
    );
}

fn expire_effect(state: &mut GameState, kind: PowerUpKind) {
    match kind {
        PowerUpKind::Shield => state.effects.shield = false,
        PowerUpKind::RapidFire => state.effects.rapid_fire = false,
        PowerUpKind::TripleShot => state.effects.triple_shot = false,
        // Instantaneous kinds never schedule an expiry.
        PowerUpKind::ExtraLife | PowerUpKind::Bomb => {}
    }
}

fn apply_debug_intents(state: &mut GameState, input: &TickInput) {
    if input.toggle_invulnerability {
        state.god_mode = !state.god_mode;
        log::info!(
            "invulnerability {}",
            if state.god_mode { "on" } else { "off" }
        );
    }
    if input.toggle_panic {
        state.formation.panic = !state.formation.panic;
        log::info!("panic mode {}", if state.formation.panic { "on" } else { "off" });
    }
    if input.skip_to_boss {
        skip_to_boss(state);
    }
    if input.kill_all_enemies && state.god_mode {
        kill_all_enemies(state);
    }
}

/// Debug: clear the field and jump straight to the next boss encounter.
fn skip_to_boss(state: &mut GameState) {
    let victims: Vec<EntityId> = state
        .entities
        .iter(Category::Enemy)
        .chain(state.entities.iter(Category::Boss))
        .map(|e| e.id)
        .collect();
    for id in victims {
        state.entities.remove(id);
    }
    state.scheduler.cancel(CallbackTag::Boss);
    state.boss = None;
    state.level = state.level.next_multiple_of(BOSS_LEVEL_EVERY);
    log::info!("skipping to boss level {}", state.level);
    populate_level(state);
}

/// Debug: destroy every enemy (and the boss) for flat score, then advance.
fn kill_all_enemies(state: &mut GameState) {
    let victims: Vec<(EntityId, Vec2)> = state
        .entities
        .iter(Category::Enemy)
        .map(|e| (e.id, e.pos))
        .collect();
    let mut points = victims.len() as u64 * KILL_SCORE;
    for (id, pos) in victims {
        state.entities.remove(id);
        state.push_event(GameEvent::Explosion {
            pos,
            magnitude: ExplosionMagnitude::Small,
        });
    }

    if let Some(boss_state) = state.boss.as_ref() {
        if boss_state.phase == BossPhase::Active {
            let entity = boss_state.entity;
            if let Some(pos) = state.entities.get(entity).map(|e| e.pos) {
                state.push_event(GameEvent::Explosion {
                    pos,
                    magnitude: ExplosionMagnitude::Big,
                });
            }
            state.entities.remove(entity);
            state.scheduler.cancel(CallbackTag::Boss);
            state.boss = None;
            points += BOSS_SCORE_PER_LEVEL * u64::from(state.level);
        }
    }

    if points > 0 {
        add_score(state, points);
    }
    complete_level(state);
}

fn move_player(state: &mut GameState, input: &TickInput, dt: f32) {
    let Some(player) = state.entities.get_mut(state.player) else {
        return;
    };
    if input.move_left {
        player.pos.x -= PLAYER_SPEED * dt;
    }
    if input.move_right {
        player.pos.x += PLAYER_SPEED * dt;
    }
    player.pos.x = player.pos.x.clamp(PLAYER_MIN_X, PLAYER_MAX_X);
}

/// Held-fire with the cooldown gate; triple shot fans the volley.
fn try_shoot(state: &mut GameState, input: &TickInput) {
    if !input.shoot {
        return;
    }
    let cooldown_secs = if state.effects.rapid_fire {
        SHOT_COOLDOWN / RAPID_FIRE_DIVISOR
    } else {
        SHOT_COOLDOWN
    };
    let cooldown = secs_to_ticks(cooldown_secs).max(1);
    if let Some(last) = state.last_shot_tick {
        if state.time_ticks.saturating_sub(last) < cooldown {
            return;
        }
    }
    let Some(origin) = state.player_pos() else {
        return;
    };
    state.last_shot_tick = Some(state.time_ticks);
    state.push_event(GameEvent::ShotFired);

    let angles: &[f32] = if state.effects.triple_shot {
        &TRIPLE_SHOT_ANGLES
    } else {
        &[0.0]
    };
    for &angle in angles {
        state.entities.spawn(
            EntityKind::PlayerBullet,
            origin + Vec2::new(0.0, BULLET_SPAWN_OFFSET_Y),
            Vec2::new(angle.sin(), angle.cos()) * PLAYER_BULLET_SPEED,
        );
    }
}

/// Advance bullets and falling power-ups; cull what leaves the field or times
/// out.
fn move_projectiles(state: &mut GameState, dt: f32) {
    let mut cull: Vec<EntityId> = Vec::new();

    for bullet in state.entities.iter_mut(Category::PlayerBullet) {
        bullet.pos += bullet.vel * dt;
        if bullet.pos.y > FIELD_HEIGHT + 20.0 {
            cull.push(bullet.id);
        }
    }
    for bullet in state.entities.iter_mut(Category::EnemyBullet) {
        bullet.pos += bullet.vel * dt;
        if bullet.pos.y < -20.0 {
            cull.push(bullet.id);
        }
    }
    for power_up in state.entities.iter_mut(Category::PowerUp) {
        power_up.pos += power_up.vel * dt;
        if let Some(ttl) = power_up.ttl.as_mut() {
            *ttl = ttl.saturating_sub(1);
            if *ttl == 0 {
                cull.push(power_up.id);
            }
        }
        if power_up.pos.y < -20.0 {
            cull.push(power_up.id);
        }
    }

    for id in cull {
        state.entities.remove(id);
    }
}

fn resolve_contacts(state: &mut GameState) {
    for contact in collision::detect_contacts(&state.entities) {
        resolve_contact(state, contact);
    }
}

/// Apply one contact's effects. Liveness is re-checked here so every pair
/// resolves at most once even when the same entity shows up in several
/// detected contacts.
fn resolve_contact(state: &mut GameState, contact: Contact) {
    match contact {
        Contact::BulletEnemy { bullet, enemy } => {
            if !state.entities.is_alive(bullet) || !state.entities.is_alive(enemy) {
                return;
            }
            let Some(pos) = state.entities.get(enemy).map(|e| e.pos) else {
                return;
            };
            state.entities.remove(bullet);
            state.entities.remove(enemy);
            state.push_event(GameEvent::Explosion {
                pos,
                magnitude: ExplosionMagnitude::Small,
            });
            maybe_drop_power_up(state, pos);
            let points = state.combo.register_kill(state.time_ticks);
            add_score(state, points);
            if state.entities.count(Category::Enemy) == 0 && !is_boss_level(state.level) {
                complete_level(state);
            }
        }
        Contact::BulletBoss { bullet } => {
            if !state.entities.is_alive(bullet) {
                return;
            }
            let Some(phase) = state.boss.as_ref().map(|b| b.phase) else {
                return;
            };
            if phase != BossPhase::Active {
                return;
            }
            state.entities.remove(bullet);
            state.push_event(GameEvent::BossHit);
            let amount = if state.god_mode { i32::MAX } else { 1 };
            boss::damage(state, amount);
        }
        Contact::EnemyBulletPlayer { bullet } => {
            if !state.entities.is_alive(bullet) {
                return;
            }
            state.entities.remove(bullet);
            player_hit(state);
        }
        Contact::PowerUpPlayer { power_up, kind } => {
            if !state.entities.is_alive(power_up) {
                return;
            }
            state.entities.remove(power_up);
            apply_power_up(state, kind);
        }
    }
}

/// 20% chance to drop a uniformly random power-up at a kill position.
fn maybe_drop_power_up(state: &mut GameState, pos: Vec2) {
    if !state.rng.random_bool(POWER_UP_DROP_CHANCE) {
        return;
    }
    let kind = PowerUpKind::ALL[state.rng.random_range(0..PowerUpKind::ALL.len())];
    let id = state.entities.spawn(
        EntityKind::PowerUp { kind },
        pos,
        Vec2::new(0.0, -POWER_UP_FALL_SPEED),
    );
    if let Some(power_up) = state.entities.get_mut(id) {
        power_up.ttl = Some(secs_to_ticks(POWER_UP_TTL) as u32);
    }
}

/// The player absorbed an enemy bullet. Shield eats the hit; invulnerability
/// ignores it; otherwise a life goes.
pub(crate) fn player_hit(state: &mut GameState) {
    if state.god_mode {
        return;
    }
    state.push_event(GameEvent::PlayerHit);
    if state.effects.shield {
        state.effects.shield = false;
        state.scheduler.cancel(CallbackTag::Effect(PowerUpKind::Shield));
        return;
    }
    state.lives = state.lives.saturating_sub(1);
    if state.lives == 0 {
        game_over(state);
    }
}

pub(crate) fn apply_power_up(state: &mut GameState, kind: PowerUpKind) {
    state.push_event(GameEvent::PowerUpCollected { kind });
    match kind {
        PowerUpKind::Shield | PowerUpKind::RapidFire | PowerUpKind::TripleShot => {
            arm_timed_effect(state, kind);
        }
        PowerUpKind::ExtraLife => {
            state.lives = (state.lives + 1).min(MAX_LIVES);
        }
        PowerUpKind::Bomb => detonate_bomb(state),
    }
}

/// Arm (or re-arm) a duration effect. The previous expiry for the same kind
/// is cancelled first, so two outstanding expiries can never coexist.
fn arm_timed_effect(state: &mut GameState, kind: PowerUpKind) {
    let duration = match kind {
        PowerUpKind::Shield => {
            state.effects.shield = true;
            SHIELD_DURATION
        }
        PowerUpKind::RapidFire => {
            state.effects.rapid_fire = true;
            RAPID_FIRE_DURATION
        }
        PowerUpKind::TripleShot => {
            state.effects.triple_shot = true;
            TRIPLE_SHOT_DURATION
        }
        PowerUpKind::ExtraLife | PowerUpKind::Bomb => return,
    };
    state.scheduler.cancel(CallbackTag::Effect(kind));
    state.scheduler.after(
        state.time_ticks,
        duration,
        CallbackTag::Effect(kind),
        ScheduledAction::ExpireEffect(kind),
    );
}

/// Bomb: wipe the formation for flat score, chip the boss, and complete the
/// level if that emptied a normal wave.
fn detonate_bomb(state: &mut GameState) {
    if let Some(pos) = state.player_pos() {
        state.push_event(GameEvent::Explosion {
            pos,
            magnitude: ExplosionMagnitude::Big,
        });
    }

    let victims: Vec<(EntityId, Vec2)> = state
        .entities
        .iter(Category::Enemy)
        .map(|e| (e.id, e.pos))
        .collect();
    let points = victims.len() as u64 * KILL_SCORE;
    for (id, pos) in victims {
        state.entities.remove(id);
        state.push_event(GameEvent::Explosion {
            pos,
            magnitude: ExplosionMagnitude::Small,
        });
    }
    if points > 0 {
        add_score(state, points);
    }

    if state.boss.is_some() {
        boss::damage(state, BOMB_BOSS_DAMAGE);
    }

    if state.entities.count(Category::Enemy) == 0 && !is_boss_level(state.level) {
        complete_level(state);
    }
}

/// Bank points, track the high score, and notify collaborators.
pub(crate) fn add_score(state: &mut GameState, points: u64) {
    state.score += points;
    if state.score > state.high_score {
        state.high_score = state.score;
    }
    state.push_event(GameEvent::ScoreChanged {
        score: state.score,
        high_score: state.high_score,
    });
}

/// Enter the level transition. The mode change is the reentrancy guard: a
/// second trigger in the same tick (bomb plus last-kill, or any other pair of
/// paths) sees `Transitioning` and is rejected structurally.
pub(crate) fn complete_level(state: &mut GameState) {
    if state.mode != GameMode::Playing {
        return;
    }
    state.mode = GameMode::Transitioning;
    state.push_event(GameEvent::LevelComplete { level: state.level });
    state.level += 1;
    cull_projectiles(state);
    state.scheduler.after(
        state.time_ticks,
        TRANSITION_DURATION,
        CallbackTag::Transition,
        ScheduledAction::FinishTransition,
    );
    log::info!("level complete, advancing to {}", state.level);
}

/// Stray bullets don't carry across the frozen transition; falling power-ups
/// do, and can still be collected next level.
fn cull_projectiles(state: &mut GameState) {
    let stray: Vec<EntityId> = state
        .entities
        .iter(Category::PlayerBullet)
        .chain(state.entities.iter(Category::EnemyBullet))
        .map(|e| e.id)
        .collect();
    for id in stray {
        state.entities.remove(id);
    }
}

fn finish_transition(state: &mut GameState) {
    if state.mode != GameMode::Transitioning {
        return;
    }
    state.mode = GameMode::Playing;
    populate_level(state);
}

/// Terminal. Emits the final score; only a restart leaves this mode.
pub(crate) fn game_over(state: &mut GameState) {
    if state.mode == GameMode::GameOver {
        return;
    }
    state.mode = GameMode::GameOver;
    if let Some(pos) = state.player_pos() {
        state.push_event(GameEvent::Explosion {
            pos,
            magnitude: ExplosionMagnitude::Big,
        });
    }
    state.push_event(GameEvent::GameOver {
        final_score: state.score,
    });
    log::info!("game over with score {}", state.score);
}
