//! Attack resolution
//!
//! Damage is a flat per-category value; there is no variance and no armor.

use crate::battle::units::{DamageOutcome, UnitStore};
use crate::core::types::{Timestamp, UnitId};

/// Result of a single strike
#[derive(Debug, Clone, PartialEq)]
pub struct StrikeResult {
    pub attacker: UnitId,
    pub target: UnitId,
    pub damage: u32,
    pub outcome: DamageOutcome,
}

impl StrikeResult {
    pub fn killed(&self) -> bool {
        matches!(self.outcome, DamageOutcome::Killed(_))
    }

    pub fn remaining_health(&self) -> u32 {
        match self.outcome {
            DamageOutcome::Wounded { remaining } => remaining,
            DamageOutcome::Killed(_) => 0,
        }
    }
}

/// Strike `target` and restart the attacker's cooldown
///
/// Returns `None` if either side has already left the store.
pub fn resolve_strike(
    store: &mut UnitStore,
    attacker: UnitId,
    target: UnitId,
    damage: u32,
    now: Timestamp,
) -> Option<StrikeResult> {
    if !store.contains(target) {
        return None;
    }
    store.get_mut(attacker)?.last_attack_at = now;
    let outcome = store.apply_damage(target, damage)?;

    Some(StrikeResult {
        attacker,
        target,
        damage,
        outcome,
    })
}
