//! Target selection
//!
//! A unit walks its category's priority chain and engages the first
//! category that still has living members. Categories drop out of contention
//! the moment their last unit is removed, so every unit degrades to its next
//! preferred opponent without any per-roster special cases.

use ordered_float::OrderedFloat;

use crate::battle::units::{Unit, UnitStore};
use crate::core::types::{CategoryId, Timestamp, UnitId};

/// What a unit will do this tick
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum UnitDecision {
    /// Nothing in the priority chain is alive
    Idle,
    /// Strike a target in range
    Attack { target: UnitId },
    /// A target is in range but the cooldown has not elapsed; stay put
    Hold { target: UnitId },
    /// Close in on the nearest member of the active category
    Approach { target: UnitId },
}

/// First category in the chain with at least one living member
pub fn resolve_target_category(store: &UnitStore, chain: &[CategoryId]) -> Option<CategoryId> {
    chain.iter().copied().find(|category| store.has_living(*category))
}

/// First unit of `category` (issue order) strictly within `range`
pub fn first_in_range(
    store: &UnitStore,
    attacker: &Unit,
    category: CategoryId,
    range: f32,
) -> Option<UnitId> {
    store
        .units_of_category(category)
        .find(|candidate| attacker.distance_to(candidate) < range)
        .map(|candidate| candidate.id)
}

/// Closest unit of `category`; the earliest issued wins ties
pub fn nearest(store: &UnitStore, attacker: &Unit, category: CategoryId) -> Option<UnitId> {
    store
        .units_of_category(category)
        .min_by_key(|candidate| OrderedFloat(attacker.distance_to(candidate)))
        .map(|candidate| candidate.id)
}

/// Decide a unit's action for this tick
pub fn decide(
    store: &UnitStore,
    unit: &Unit,
    chain: &[CategoryId],
    attack_range: f32,
    attack_interval_ms: u64,
    now: Timestamp,
) -> UnitDecision {
    let Some(category) = resolve_target_category(store, chain) else {
        return UnitDecision::Idle;
    };

    if let Some(target) = first_in_range(store, unit, category, attack_range) {
        return if unit.attack_ready(now, attack_interval_ms) {
            UnitDecision::Attack { target }
        } else {
            UnitDecision::Hold { target }
        };
    }

    match nearest(store, unit, category) {
        Some(target) => UnitDecision::Approach { target },
        None => UnitDecision::Idle,
    }
}
