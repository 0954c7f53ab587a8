//! Live units and the store that owns them
//!
//! The store is the only place units live. A unit whose health reaches
//! zero is removed in the same call that dealt the damage, so no query can
//! ever observe a dead unit.

use std::collections::{BTreeMap, BTreeSet};

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::battle::registry::UnitCategory;
use crate::core::types::{CategoryId, Faction, Timestamp, UnitId, Vec2};

/// A live combat entity
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Unit {
    pub id: UnitId,
    pub category: CategoryId,
    pub faction: Faction,
    pub health: u32,
    pub position: Vec2,
    pub last_attack_at: Timestamp,
}

impl Unit {
    /// Has the attack cooldown elapsed at `now`?
    pub fn attack_ready(&self, now: Timestamp, interval_ms: u64) -> bool {
        now.saturating_sub(self.last_attack_at) >= interval_ms
    }

    pub fn distance_to(&self, other: &Unit) -> f32 {
        self.position.distance(&other.position)
    }
}

/// Result of applying damage to a unit
#[derive(Debug, Clone, PartialEq)]
pub enum DamageOutcome {
    Wounded { remaining: u32 },
    /// The unit dropped to zero and has already left the store
    Killed(Unit),
}

/// Arena of live units keyed by id, indexed by category
#[derive(Debug, Clone, Default)]
pub struct UnitStore {
    units: BTreeMap<UnitId, Unit>,
    by_category: AHashMap<CategoryId, BTreeSet<UnitId>>,
    next_id: u64,
}

impl UnitStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a unit at full health
    pub fn spawn(&mut self, category: &UnitCategory, position: Vec2, now: Timestamp) -> UnitId {
        self.next_id += 1;
        let id = UnitId(self.next_id);
        let unit = Unit {
            id,
            category: category.id,
            faction: category.faction,
            health: category.stats.max_health,
            position,
            last_attack_at: now,
        };
        debug_assert!(unit.health > 0);
        self.units.insert(id, unit);
        self.by_category.entry(category.id).or_default().insert(id);
        id
    }

    pub fn get(&self, id: UnitId) -> Option<&Unit> {
        self.units.get(&id)
    }

    pub fn get_mut(&mut self, id: UnitId) -> Option<&mut Unit> {
        self.units.get_mut(&id)
    }

    pub fn contains(&self, id: UnitId) -> bool {
        self.units.contains_key(&id)
    }

    pub fn remove(&mut self, id: UnitId) -> Option<Unit> {
        let unit = self.units.remove(&id)?;
        if let Some(ids) = self.by_category.get_mut(&unit.category) {
            ids.remove(&id);
        }
        Some(unit)
    }

    /// Subtract damage; removes the unit when it reaches zero
    pub fn apply_damage(&mut self, id: UnitId, damage: u32) -> Option<DamageOutcome> {
        let unit = self.units.get_mut(&id)?;
        unit.health = unit.health.saturating_sub(damage);
        if unit.health > 0 {
            return Some(DamageOutcome::Wounded {
                remaining: unit.health,
            });
        }
        self.remove(id).map(DamageOutcome::Killed)
    }

    /// Ids of one category in issue order
    pub fn ids_of_category(&self, category: CategoryId) -> impl Iterator<Item = UnitId> + '_ {
        self.by_category
            .get(&category)
            .into_iter()
            .flat_map(|ids| ids.iter().copied())
    }

    pub fn units_of_category(&self, category: CategoryId) -> impl Iterator<Item = &Unit> + '_ {
        self.ids_of_category(category)
            .filter_map(move |id| self.units.get(&id))
    }

    pub fn count_category(&self, category: CategoryId) -> usize {
        self.by_category.get(&category).map_or(0, |ids| ids.len())
    }

    pub fn has_living(&self, category: CategoryId) -> bool {
        self.count_category(category) > 0
    }

    pub fn count_faction(&self, faction: Faction) -> usize {
        self.units.values().filter(|u| u.faction == faction).count()
    }

    /// All units in issue order
    pub fn iter(&self) -> impl Iterator<Item = &Unit> {
        self.units.values()
    }

    pub fn len(&self) -> usize {
        self.units.len()
    }

    pub fn is_empty(&self) -> bool {
        self.units.is_empty()
    }

    /// Drop every unit. Ids keep counting up.
    pub fn clear(&mut self) {
        self.units.clear();
        self.by_category.clear();
    }

    /// Reset every unit's cooldown baseline
    pub fn reset_attack_clocks(&mut self, now: Timestamp) {
        for unit in self.units.values_mut() {
            unit.last_attack_at = now;
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::registry::{UnitRegistry, UnitStats};
    use crate::core::config::SkirmishConfig;

    fn registry() -> UnitRegistry {
        UnitRegistry::from_config(&SkirmishConfig::default().categories).unwrap()
    }

    #[test]
    fn test_spawn_at_full_health() {
        let registry = registry();
        let ant = registry.category(registry.resolve("ant").unwrap()).unwrap();
        let mut store = UnitStore::new();

        let id = store.spawn(ant, Vec2::new(-10.0, 0.0), 100);
        let unit = store.get(id).unwrap();
        assert_eq!(unit.health, 40);
        assert_eq!(unit.faction, Faction::Player);
        assert_eq!(unit.last_attack_at, 100);
        assert_eq!(store.count_category(ant.id), 1);
    }

    #[test]
    fn test_ids_are_sequential() {
        let registry = registry();
        let ant = registry.category(registry.resolve("ant").unwrap()).unwrap();
        let mut store = UnitStore::new();

        let a = store.spawn(ant, Vec2::default(), 0);
        let b = store.spawn(ant, Vec2::default(), 0);
        assert!(a < b);

        store.clear();
        let c = store.spawn(ant, Vec2::default(), 0);
        assert!(c > b, "ids are never reused");
    }

    #[test]
    fn test_damage_kills_and_removes() {
        let registry = registry();
        let bee = registry.category(registry.resolve("bee").unwrap()).unwrap();
        let mut store = UnitStore::new();
        let id = store.spawn(bee, Vec2::default(), 0);

        assert_eq!(
            store.apply_damage(id, 5),
            Some(DamageOutcome::Wounded { remaining: 7 })
        );
        match store.apply_damage(id, 10) {
            Some(DamageOutcome::Killed(unit)) => assert_eq!(unit.health, 0),
            other => panic!("expected kill, got {:?}", other),
        }
        assert!(!store.contains(id));
        assert!(!store.has_living(bee.id));
        assert_eq!(store.ids_of_category(bee.id).count(), 0);
        assert_eq!(store.apply_damage(id, 1), None);
    }

    #[test]
    fn test_zero_damage_leaves_health() {
        let category = UnitCategory {
            id: CategoryId(0),
            name: "aphid".into(),
            display_name: "Aphid".into(),
            faction: Faction::Player,
            stats: UnitStats { max_health: 5, damage: 0, cost: 1 },
            priority_chain: vec![],
            counts_for_victory: false,
        };
        let mut store = UnitStore::new();
        let id = store.spawn(&category, Vec2::default(), 0);
        assert_eq!(
            store.apply_damage(id, 0),
            Some(DamageOutcome::Wounded { remaining: 5 })
        );
    }

    #[test]
    fn test_category_and_faction_queries() {
        let registry = registry();
        let ant = registry.category(registry.resolve("ant").unwrap()).unwrap();
        let wasp = registry.category(registry.resolve("wasp").unwrap()).unwrap();
        let mut store = UnitStore::new();

        let a1 = store.spawn(ant, Vec2::new(-5.0, 0.0), 0);
        let w1 = store.spawn(wasp, Vec2::new(5.0, 0.0), 0);
        let a2 = store.spawn(ant, Vec2::new(-6.0, 0.0), 0);

        let ants: Vec<UnitId> = store.ids_of_category(ant.id).collect();
        assert_eq!(ants, vec![a1, a2]);
        assert_eq!(store.count_faction(Faction::Player), 2);
        assert_eq!(store.count_faction(Faction::Enemy), 1);

        store.remove(w1);
        assert_eq!(store.count_faction(Faction::Enemy), 0);
        assert_eq!(store.len(), 2);
    }

    #[test]
    fn test_attack_ready_and_clock_reset() {
        let registry = registry();
        let ant = registry.category(registry.resolve("ant").unwrap()).unwrap();
        let mut store = UnitStore::new();
        let id = store.spawn(ant, Vec2::default(), 0);

        assert!(store.get(id).unwrap().attack_ready(1000, 1000));
        store.reset_attack_clocks(500);
        assert!(!store.get(id).unwrap().attack_ready(1000, 1000));
        assert!(store.get(id).unwrap().attack_ready(1500, 1000));
        // A clock running backwards never unlocks an attack early
        assert!(!store.get(id).unwrap().attack_ready(100, 1));
    }
}
