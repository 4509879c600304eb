//! Entity store with stable identities and deferred removal.
//!
//! All live gameplay objects (player, swarm enemies, bullets, power-ups, the
//! boss) live in one store. Identities are monotonically allocated and never
//! reused, even across `clear()`. Removal marks an entity dead immediately
//! (invisible to every iterator from that point on) but the slot is only
//! dropped by `sweep()` at the end of the tick, so traversals that are still
//! in flight never observe a shifted collection.

use glam::Vec2;

use super::state::PowerUpKind;

/// Unique entity identity, stable for the entity's lifetime and never reused.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct EntityId(pub u32);

/// Collision category. Determines which contact pairs an entity participates
/// in (see `collision::detect_contacts`).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Category {
    Player,
    Enemy,
    Boss,
    PlayerBullet,
    EnemyBullet,
    PowerUp,
}

/// Per-variant payload.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum EntityKind {
    Player,
    /// Formation enemy; `row` selects the sprite family for the renderer.
    Enemy { row: u8 },
    Boss,
    PlayerBullet,
    EnemyBullet,
    PowerUp { kind: PowerUpKind },
}

impl EntityKind {
    pub fn category(&self) -> Category {
        match self {
            EntityKind::Player => Category::Player,
            EntityKind::Enemy { .. } => Category::Enemy,
            EntityKind::Boss => Category::Boss,
            EntityKind::PlayerBullet => Category::PlayerBullet,
            EntityKind::EnemyBullet => Category::EnemyBullet,
            EntityKind::PowerUp { .. } => Category::PowerUp,
        }
    }

    /// Bounding half-extents for contact tests. Enemy sizes follow the sprite
    /// family per formation row (squid, crab, octopus).
    pub fn half_extents(&self) -> Vec2 {
        match self {
            EntityKind::Player => Vec2::new(19.5, 12.0),
            EntityKind::Enemy { row } => match row {
                0 => Vec2::new(12.0, 12.0),
                1 | 2 => Vec2::new(16.5, 12.0),
                _ => Vec2::new(18.0, 12.0),
            },
            EntityKind::Boss => Vec2::new(60.0, 35.0),
            EntityKind::PlayerBullet => Vec2::new(4.0, 10.0),
            EntityKind::EnemyBullet => Vec2::new(5.0, 5.0),
            EntityKind::PowerUp { .. } => Vec2::new(12.0, 12.0),
        }
    }
}

/// A live gameplay entity.
#[derive(Debug, Clone)]
pub struct Entity {
    pub id: EntityId,
    pub kind: EntityKind,
    pub pos: Vec2,
    pub vel: Vec2,
    pub half_extents: Vec2,
    /// Remaining lifetime in ticks (power-ups only).
    pub ttl: Option<u32>,
    pub alive: bool,
}

impl Entity {
    pub fn category(&self) -> Category {
        self.kind.category()
    }
}

/// Owner of all live entities. Components request removal here instead of
/// holding their own authoritative lists.
#[derive(Debug, Clone, Default)]
pub struct EntityStore {
    entities: Vec<Entity>,
    next_id: u32,
}

impl EntityStore {
    pub fn new() -> Self {
        Self {
            entities: Vec::new(),
            next_id: 1,
        }
    }

    /// Spawn a new entity. Ids are allocated monotonically; spawn order is
    /// iteration order.
    pub fn spawn(&mut self, kind: EntityKind, pos: Vec2, vel: Vec2) -> EntityId {
        let id = EntityId(self.next_id);
        self.next_id += 1;
        self.entities.push(Entity {
            id,
            kind,
            pos,
            vel,
            half_extents: kind.half_extents(),
            ttl: None,
            alive: true,
        });
        id
    }

    /// Mark an entity dead. Idempotent: removing an already-removed or unknown
    /// id is a no-op. The entity disappears from all queries immediately; its
    /// slot is reclaimed by `sweep()`.
    pub fn remove(&mut self, id: EntityId) {
        if let Ok(idx) = self.entities.binary_search_by_key(&id, |e| e.id) {
            self.entities[idx].alive = false;
        }
    }

    pub fn is_alive(&self, id: EntityId) -> bool {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .map(|idx| self.entities[idx].alive)
            .unwrap_or(false)
    }

    pub fn get(&self, id: EntityId) -> Option<&Entity> {
        self.entities
            .binary_search_by_key(&id, |e| e.id)
            .ok()
            .map(|idx| &self.entities[idx])
            .filter(|e| e.alive)
    }

    pub fn get_mut(&mut self, id: EntityId) -> Option<&mut Entity> {
        match self.entities.binary_search_by_key(&id, |e| e.id) {
            Ok(idx) if self.entities[idx].alive => Some(&mut self.entities[idx]),
            _ => None,
        }
    }

    /// Live entities of one category, in spawn order.
    pub fn iter(&self, category: Category) -> impl Iterator<Item = &Entity> + '_ {
        self.entities
            .iter()
            .filter(move |e| e.alive && e.category() == category)
    }

    pub fn iter_mut(&mut self, category: Category) -> impl Iterator<Item = &mut Entity> + '_ {
        self.entities
            .iter_mut()
            .filter(move |e| e.alive && e.category() == category)
    }

    /// All live entities, in spawn order.
    pub fn iter_all(&self) -> impl Iterator<Item = &Entity> + '_ {
        self.entities.iter().filter(|e| e.alive)
    }

    pub fn count(&self, category: Category) -> usize {
        self.iter(category).count()
    }

    /// Remove everything. Id allocation continues from where it was.
    pub fn clear(&mut self) {
        self.entities.clear();
    }

    /// Drop dead slots. Called once at the end of each tick.
    pub fn sweep(&mut self) {
        self.entities.retain(|e| e.alive);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use glam::Vec2;
    use proptest::prelude::*;

    fn spawn_enemy(store: &mut EntityStore) -> EntityId {
        store.spawn(EntityKind::Enemy { row: 0 }, Vec2::new(100.0, 400.0), Vec2::ZERO)
    }

    #[test]
    fn test_ids_monotonic_and_unique() {
        let mut store = EntityStore::new();
        let a = spawn_enemy(&mut store);
        let b = spawn_enemy(&mut store);
        let c = store.spawn(EntityKind::PlayerBullet, Vec2::ZERO, Vec2::ZERO);
        assert!(a < b && b < c);
    }

    #[test]
    fn test_remove_is_idempotent() {
        let mut store = EntityStore::new();
        let id = spawn_enemy(&mut store);
        store.remove(id);
        store.remove(id);
        assert!(!store.is_alive(id));
        store.sweep();
        store.remove(id); // unknown after sweep, still a no-op
        assert_eq!(store.count(Category::Enemy), 0);
    }

    #[test]
    fn test_removal_visible_before_sweep() {
        let mut store = EntityStore::new();
        let a = spawn_enemy(&mut store);
        let b = spawn_enemy(&mut store);
        store.remove(a);
        // Dead entity is invisible immediately, even though the slot remains.
        assert_eq!(store.count(Category::Enemy), 1);
        assert!(store.get(a).is_none());
        assert!(store.iter(Category::Enemy).all(|e| e.id == b));
        store.sweep();
        assert_eq!(store.count(Category::Enemy), 1);
    }

    #[test]
    fn test_ids_not_reused_after_clear() {
        let mut store = EntityStore::new();
        let a = spawn_enemy(&mut store);
        store.clear();
        let b = spawn_enemy(&mut store);
        assert!(b > a);
    }

    #[test]
    fn test_enemy_extents_follow_row_family() {
        assert_eq!(EntityKind::Enemy { row: 0 }.half_extents().x, 12.0);
        assert_eq!(EntityKind::Enemy { row: 2 }.half_extents().x, 16.5);
        assert_eq!(EntityKind::Enemy { row: 4 }.half_extents().x, 18.0);
    }

    proptest! {
        /// Any interleaving of spawns, removals, sweeps, and clears keeps ids
        /// unique and strictly increasing.
        #[test]
        fn prop_ids_never_reused(ops in prop::collection::vec(0u8..4, 1..64)) {
            let mut store = EntityStore::new();
            let mut seen = Vec::new();
            let mut live = Vec::new();
            for op in ops {
                match op {
                    0 => {
                        let id = spawn_enemy(&mut store);
                        prop_assert!(!seen.contains(&id));
                        prop_assert!(seen.iter().all(|&s| s < id));
                        seen.push(id);
                        live.push(id);
                    }
                    1 => {
                        if let Some(id) = live.pop() {
                            store.remove(id);
                        }
                    }
                    2 => store.sweep(),
                    _ => {
                        store.clear();
                        live.clear();
                    }
                }
            }
        }
    }
}
