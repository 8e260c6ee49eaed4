//! Projectile pool.
//!
//! Slots are allocated lazily and never released for the rest of the
//! session. Freed slots go on a free list and are handed out again by
//! `spawn`. Per-tick movement and hit resolution live in
//! `systems::projectiles`.

use glam::Vec2;
use hecs::Entity;
use log::debug;

use skirmish_core::constants::PROJECTILE_SIZE;
use skirmish_core::enums::Faction;
use skirmish_core::types::Rect;

/// Index of a pool slot.
pub type ProjectileId = usize;

#[derive(Debug, Clone, PartialEq)]
pub struct Projectile {
    pub position: Vec2,
    pub velocity: Vec2,
    pub damage: i32,
    /// Combatant that fired it. Never damaged by its own projectile.
    pub owner: Option<Entity>,
    pub faction: Faction,
    pub active: bool,
    /// Seconds since spawn.
    pub age_secs: f32,
}

impl Projectile {
    fn inactive() -> Self {
        Self {
            position: Vec2::ZERO,
            velocity: Vec2::ZERO,
            damage: 0,
            owner: None,
            faction: Faction::Player,
            active: false,
            age_secs: 0.0,
        }
    }

    /// Axis-aligned bounds, anchored at the position corner.
    pub fn bounds(&self) -> Rect {
        Rect::new(
            self.position.x,
            self.position.y,
            PROJECTILE_SIZE,
            PROJECTILE_SIZE,
        )
    }
}

#[derive(Debug, Default)]
pub struct ProjectilePool {
    slots: Vec<Projectile>,
    free: Vec<ProjectileId>,
    /// Active slots in spawn order.
    active: Vec<ProjectileId>,
}

impl ProjectilePool {
    pub fn new() -> Self {
        Self::default()
    }

    /// Activate a projectile, reusing a freed slot when one exists.
    pub fn spawn(
        &mut self,
        origin: Vec2,
        velocity: Vec2,
        damage: i32,
        owner: Entity,
        faction: Faction,
    ) -> ProjectileId {
        let id = match self.free.pop() {
            Some(id) => id,
            None => {
                self.slots.push(Projectile::inactive());
                debug!("Projectile pool grew to {}", self.slots.len());
                self.slots.len() - 1
            }
        };
        self.slots[id] = Projectile {
            position: origin,
            velocity,
            damage,
            owner: Some(owner),
            faction,
            active: true,
            age_secs: 0.0,
        };
        self.active.push(id);
        id
    }

    /// Return a projectile to the pool. No-op (returns false) if the slot is
    /// unknown or already inactive.
    pub fn free(&mut self, id: ProjectileId) -> bool {
        let Some(slot) = self.slots.get_mut(id) else {
            return false;
        };
        if !slot.active {
            return false;
        }
        *slot = Projectile::inactive();
        self.active.retain(|&a| a != id);
        self.free.push(id);
        true
    }

    pub fn get(&self, id: ProjectileId) -> Option<&Projectile> {
        self.slots.get(id)
    }

    pub(crate) fn get_mut(&mut self, id: ProjectileId) -> Option<&mut Projectile> {
        self.slots.get_mut(id)
    }

    /// Stable copy of the active ids, safe to iterate while freeing.
    pub fn active_ids(&self) -> Vec<ProjectileId> {
        self.active.clone()
    }

    pub fn iter_active(&self) -> impl Iterator<Item = &Projectile> {
        self.active.iter().map(|&id| &self.slots[id])
    }

    pub fn active_count(&self) -> usize {
        self.active.len()
    }

    /// Slots allocated so far, active or not.
    pub fn capacity(&self) -> usize {
        self.slots.len()
    }

    /// Free every projectile. Capacity is kept.
    pub fn reset(&mut self) {
        for id in std::mem::take(&mut self.active) {
            self.slots[id] = Projectile::inactive();
            self.free.push(id);
        }
        // Lowest slot first on the next spawn.
        self.free.sort_unstable_by(|a, b| b.cmp(a));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn owner() -> Entity {
        let mut world = hecs::World::new();
        world.spawn(())
    }

    #[test]
    fn test_spawn_reuses_freed_slot() {
        let mut pool = ProjectilePool::new();
        let o = owner();
        let a = pool.spawn(Vec2::ZERO, Vec2::X, 1, o, Faction::Player);
        let b = pool.spawn(Vec2::ZERO, Vec2::X, 1, o, Faction::Player);
        assert_eq!(pool.capacity(), 2);
        assert!(pool.free(a));
        assert_eq!(pool.active_count(), 1);
        let c = pool.spawn(Vec2::ONE, Vec2::Y, 2, o, Faction::Hostile);
        assert_eq!(c, a, "Freed slot should be reused");
        assert_eq!(pool.capacity(), 2);
        assert_eq!(pool.active_ids(), vec![b, c]);
    }

    #[test]
    fn test_free_resets_slot_and_is_idempotent() {
        let mut pool = ProjectilePool::new();
        let id = pool.spawn(Vec2::new(5.0, 5.0), Vec2::X, 3, owner(), Faction::Hostile);
        assert!(pool.free(id));
        let slot = pool.get(id).unwrap();
        assert!(!slot.active);
        assert_eq!(slot.position, Vec2::ZERO);
        assert_eq!(slot.velocity, Vec2::ZERO);
        assert_eq!(slot.owner, None);
        assert!(!pool.free(id), "Second free is a no-op");
        assert!(!pool.free(99));
        assert_eq!(pool.active_count(), 0);
    }

    #[test]
    fn test_reset_keeps_capacity() {
        let mut pool = ProjectilePool::new();
        let o = owner();
        for _ in 0..5 {
            pool.spawn(Vec2::ZERO, Vec2::X, 1, o, Faction::Player);
        }
        pool.reset();
        assert_eq!(pool.active_count(), 0);
        assert_eq!(pool.capacity(), 5);
        pool.reset();
        assert_eq!(pool.capacity(), 5);
        assert_eq!(pool.spawn(Vec2::ZERO, Vec2::X, 1, o, Faction::Player), 0);
    }
}
