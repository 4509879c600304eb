//! Contact detection between entity categories.
//!
//! Detection is a pure scan over the store: it reports every overlapping pair
//! whose categories are mutually interested, in spawn order. Resolution (in
//! `tick`) re-checks liveness per contact, so a bullet overlapping two enemies
//! in the same tick kills exactly one and an enemy clipped by two bullets dies
//! exactly once.

use super::entity::{Category, Entity, EntityId, EntityStore};
use super::state::PowerUpKind;

/// Category pairs the resolver cares about.
pub const CONTACT_PAIRS: [(Category, Category); 4] = [
    (Category::PlayerBullet, Category::Enemy),
    (Category::PlayerBullet, Category::Boss),
    (Category::EnemyBullet, Category::Player),
    (Category::PowerUp, Category::Player),
];

/// A detected contact between two live entities.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Contact {
    BulletEnemy { bullet: EntityId, enemy: EntityId },
    BulletBoss { bullet: EntityId },
    EnemyBulletPlayer { bullet: EntityId },
    PowerUpPlayer { power_up: EntityId, kind: PowerUpKind },
}

/// Axis-aligned bounding-box overlap test.
pub fn overlaps(a: &Entity, b: &Entity) -> bool {
    let d = (a.pos - b.pos).abs();
    let extent = a.half_extents + b.half_extents;
    d.x <= extent.x && d.y <= extent.y
}

/// Scan the store for all interested contacts this tick.
pub fn detect_contacts(store: &EntityStore) -> Vec<Contact> {
    let mut contacts = Vec::new();

    for bullet in store.iter(Category::PlayerBullet) {
        for enemy in store.iter(Category::Enemy) {
            if overlaps(bullet, enemy) {
                contacts.push(Contact::BulletEnemy {
                    bullet: bullet.id,
                    enemy: enemy.id,
                });
            }
        }
        for boss in store.iter(Category::Boss) {
            if overlaps(bullet, boss) {
                contacts.push(Contact::BulletBoss { bullet: bullet.id });
            }
        }
    }

    for bullet in store.iter(Category::EnemyBullet) {
        for player in store.iter(Category::Player) {
            if overlaps(bullet, player) {
                contacts.push(Contact::EnemyBulletPlayer { bullet: bullet.id });
            }
        }
    }

    for power_up in store.iter(Category::PowerUp) {
        if let super::entity::EntityKind::PowerUp { kind } = power_up.kind {
            for player in store.iter(Category::Player) {
                if overlaps(power_up, player) {
                    contacts.push(Contact::PowerUpPlayer {
                        power_up: power_up.id,
                        kind,
                    });
                }
            }
        }
    }

    contacts
}
