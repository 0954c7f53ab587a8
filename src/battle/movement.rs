//! Unit movement toward a chosen target

use crate::battle::units::UnitStore;
use crate::core::types::{UnitId, Vec2};

/// Result of a movement step
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct MovementResult {
    pub moved: bool,
    pub distance: f32,
}

/// Position after moving from `from` toward `to` by at most `step`
///
/// Never overshoots: a target closer than `step` is reached exactly.
pub fn step_towards(from: Vec2, to: Vec2, step: f32) -> Vec2 {
    let offset = to - from;
    let remaining = offset.length();
    if remaining <= f32::EPSILON || step <= 0.0 {
        return from;
    }
    let travel = step.min(remaining);
    from + offset.normalize() * travel
}

/// Move `unit` one step toward `target`'s current position
pub fn advance_unit(store: &mut UnitStore, unit: UnitId, target: UnitId, step: f32) -> MovementResult {
    let Some(destination) = store.get(target).map(|t| t.position) else {
        return MovementResult::default();
    };
    let Some(mover) = store.get_mut(unit) else {
        return MovementResult::default();
    };

    let start = mover.position;
    mover.position = step_towards(start, destination, step);
    let distance = start.distance(&mover.position);

    MovementResult {
        moved: distance > 0.0,
        distance,
    }
}
