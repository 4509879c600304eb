//! Swarm movement: discrete steps, edge bounce, descent.
//!
//! The formation advances in lockstep. Normal mode steps on a level-scaled
//! interval; panic mode steps every tick at a fixed larger stride with a
//! tighter edge margin. Any enemy touching an edge margin flips the direction
//! for the whole swarm and triggers a descent on the same step.

use glam::Vec2;

use super::entity::{Category, EntityKind};
use super::state::GameState;
use crate::consts::*;
use crate::secs_to_ticks;

/// Outcome of a formation update.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FormationOutcome {
    Ok,
    /// An enemy descended past the loss threshold: terminal, regardless of
    /// remaining lives.
    ReachedPlayer,
}

/// Spawn the fixed 5×10 grid for the current level and retune movement.
pub fn populate(state: &mut GameState) {
    let start_x = (FIELD_WIDTH - (FORMATION_COLS - 1) as f32 * FORMATION_COL_SPACING) / 2.0;
    for row in 0..FORMATION_ROWS {
        for col in 0..FORMATION_COLS {
            state.entities.spawn(
                EntityKind::Enemy { row: row as u8 },
                Vec2::new(
                    start_x + col as f32 * FORMATION_COL_SPACING,
                    FORMATION_TOP_Y - row as f32 * FORMATION_ROW_SPACING,
                ),
                Vec2::ZERO,
            );
        }
    }
    state.formation.retune(state.level);
}

/// Advance the swarm for this tick.
pub fn update(state: &mut GameState) -> FormationOutcome {
    if state.formation.panic {
        return step(state, PANIC_STRIDE, PANIC_EDGE_MARGIN, PANIC_DESCENT, false);
    }

    let interval = secs_to_ticks(state.formation.move_interval);
    if state.time_ticks.saturating_sub(state.formation.last_step_tick) < interval {
        return FormationOutcome::Ok;
    }
    state.formation.last_step_tick = state.time_ticks;
    step(
        state,
        FORMATION_STRIDE,
        FORMATION_EDGE_MARGIN,
        FORMATION_DESCENT,
        true,
    )
}

/// One discrete formation step. `scaled` applies the level speed multiplier
/// to the stride (normal mode); panic mode moves at the raw stride.
fn step(state: &mut GameState, stride: f32, margin: f32, descent: f32, scaled: bool) -> FormationOutcome {
    // Edge scan before moving, so a flip applies to this step's movement.
    let flip = state
        .entities
        .iter(Category::Enemy)
        .any(|e| e.pos.x <= margin || e.pos.x >= FIELD_WIDTH - margin);
    if flip {
        state.formation.direction = -state.formation.direction;
    }

    state.formation.anim_frame ^= 1;

    let dx = if scaled {
        stride * state.formation.direction * state.formation.speed
    } else {
        stride * state.formation.direction
    };

    let mut reached_player = false;
    for enemy in state.entities.iter_mut(Category::Enemy) {
        enemy.pos.x += dx;
        if flip {
            enemy.pos.y -= descent;
        }
        if enemy.pos.y < LOSS_Y {
            reached_player = true;
        }
    }

    if reached_player {
        FormationOutcome::ReachedPlayer
    } else {
        FormationOutcome::Ok
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sim::entity::EntityId;
    use crate::sim::state::GameState;

    fn enemy_positions(state: &GameState) -> Vec<(EntityId, Vec2)> {
        state
            .entities
            .iter(Category::Enemy)
            .map(|e| (e.id, e.pos))
            .collect()
    }

    /// Fresh state with the stock grid removed and a single enemy placed.
    fn single_enemy_state(pos: Vec2) -> GameState {
        let mut state = GameState::new(1, 0);
        let ids: Vec<_> = state.entities.iter(Category::Enemy).map(|e| e.id).collect();
        for id in ids {
            state.entities.remove(id);
        }
        state.entities.sweep();
        state
            .entities
            .spawn(EntityKind::Enemy { row: 0 }, pos, Vec2::ZERO);
        state
    }

    #[test]
    fn test_steps_gated_by_interval() {
        let mut state = GameState::new(1, 0);
        let before = enemy_positions(&state);

        state.time_ticks += 1;
        assert_eq!(update(&mut state), FormationOutcome::Ok);
        assert_eq!(enemy_positions(&state), before, "no step before interval");

        state.time_ticks += secs_to_ticks(state.formation.move_interval);
        update(&mut state);
        let after = enemy_positions(&state);
        assert_ne!(after, before);
        assert_eq!(state.formation.anim_frame, 1);

        // Uniform displacement, no descent away from the edges.
        let dx = after[0].1.x - before[0].1.x;
        assert!((dx - 10.0 * state.formation.speed).abs() < 1e-4);
        assert!(after
            .iter()
            .zip(&before)
            .all(|(a, b)| (a.1.x - b.1.x - dx).abs() < 1e-4 && a.1.y == b.1.y));
    }

    #[test]
    fn test_edge_flip_and_descent_together() {
        let mut state = single_enemy_state(Vec2::new(FIELD_WIDTH - 25.0, 400.0));
        state.formation.last_step_tick = 0;
        state.time_ticks = secs_to_ticks(state.formation.move_interval);

        assert_eq!(state.formation.direction, 1.0);
        update(&mut state);
        assert_eq!(state.formation.direction, -1.0);

        let (_, pos) = enemy_positions(&state)[0];
        assert_eq!(pos.y, 400.0 - FORMATION_DESCENT);
        // Moved leftward after the flip.
        assert!(pos.x < FIELD_WIDTH - 25.0);
    }

    #[test]
    fn test_panic_mode_steps_every_tick() {
        let mut state = single_enemy_state(Vec2::new(400.0, 400.0));
        state.formation.panic = true;

        for tick in 0..3 {
            state.time_ticks = tick;
            update(&mut state);
        }
        let (_, pos) = enemy_positions(&state)[0];
        assert_eq!(pos.x, 400.0 + 3.0 * PANIC_STRIDE);
        assert_eq!(state.formation.anim_frame, 1); // toggled three times
    }

    #[test]
    fn test_crossing_loss_threshold_is_terminal() {
        let mut state = single_enemy_state(Vec2::new(400.0, LOSS_Y + 5.0));
        state.formation.panic = true;
        // Park a second enemy at the edge to force a descent.
        state.entities.spawn(
            EntityKind::Enemy { row: 1 },
            Vec2::new(PANIC_EDGE_MARGIN - 1.0, 400.0),
            Vec2::ZERO,
        );

        assert_eq!(update(&mut state), FormationOutcome::ReachedPlayer);
    }
}
