//! Combat tick
//!
//! Each tick visits every live unit once: categories in registry order,
//! units in issue order within a category. A unit removed earlier in the same
//! tick is skipped; its own attack never happens.

use serde::{Deserialize, Serialize};

use crate::battle::economy::Treasury;
use crate::battle::engagement::{decide, UnitDecision};
use crate::battle::events::{EventLog, MatchEventKind};
use crate::battle::movement::advance_unit;
use crate::battle::registry::UnitRegistry;
use crate::battle::resolution::resolve_strike;
use crate::battle::units::UnitStore;
use crate::core::config::{CombatConfig, PayoutConfig};
use crate::core::error::Result;
use crate::core::types::{Faction, Timestamp, UnitId};

/// Counters for one tick
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct TickSummary {
    pub attacks: u32,
    pub kills: u32,
    pub moves: u32,
    pub held: u32,
    pub idle: u32,
    pub bounty_paid: u32,
}

/// A defeat recorded during a tick
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Kill {
    pub victim: UnitId,
    pub killer: UnitId,
    pub killer_faction: Faction,
}

/// Stateless combat rules applied tick after tick
#[derive(Debug, Clone)]
pub struct CombatEngine {
    pub attack_range: f32,
    pub attack_interval_ms: u64,
    pub step_distance: f32,
    pub kill_bounty: u32,
}

impl CombatEngine {
    pub fn new(combat: &CombatConfig, payout: &PayoutConfig) -> Self {
        Self {
            attack_range: combat.attack_range,
            attack_interval_ms: combat.attack_interval_ms,
            step_distance: combat.step_distance,
            kill_bounty: payout.kill_bounty,
        }
    }

    /// Unit ids in processing order, fixed at the start of the tick
    fn processing_order(store: &UnitStore, registry: &UnitRegistry) -> Vec<UnitId> {
        let mut order = Vec::with_capacity(store.len());
        for category in registry.iter() {
            order.extend(store.ids_of_category(category.id));
        }
        order
    }

    /// Run one combat tick at `now`
    pub fn run_tick(
        &self,
        store: &mut UnitStore,
        registry: &UnitRegistry,
        treasury: &mut Treasury,
        events: &mut EventLog,
        now: Timestamp,
    ) -> Result<TickSummary> {
        let mut summary = TickSummary::default();

        for id in Self::processing_order(store, registry) {
            let Some(unit) = store.get(id).cloned() else {
                continue;
            };
            let category = registry.category(unit.category)?;

            let decision = decide(
                store,
                &unit,
                &category.priority_chain,
                self.attack_range,
                self.attack_interval_ms,
                now,
            );
            tracing::trace!("{} {}: {:?}", category.display_name, id, decision);

            match decision {
                UnitDecision::Idle => summary.idle += 1,
                UnitDecision::Hold { .. } => summary.held += 1,
                UnitDecision::Approach { target } => {
                    if advance_unit(store, id, target, self.step_distance).moved {
                        summary.moves += 1;
                    }
                }
                UnitDecision::Attack { target } => {
                    let damage = category.stats.damage;
                    let Some(victim_category) = store.get(target).map(|t| t.category) else {
                        debug_assert!(false, "decided to attack missing unit {}", target);
                        continue;
                    };
                    let Some(strike) = resolve_strike(store, id, target, damage, now) else {
                        continue;
                    };
                    summary.attacks += 1;

                    let victim_name = &registry.category(victim_category)?.display_name;

                    events.push(
                        now,
                        MatchEventKind::Attacked {
                            attacker: id,
                            target,
                            damage,
                            remaining_health: strike.remaining_health(),
                        },
                        format!("{} attacks {}", category.display_name, victim_name),
                        true,
                        false,
                    );

                    if strike.killed() {
                        summary.kills += 1;
                        let kill = Kill {
                            victim: target,
                            killer: id,
                            killer_faction: unit.faction,
                        };
                        tracing::debug!(
                            "{} {} defeated {} {}",
                            category.display_name,
                            kill.killer,
                            victim_name,
                            kill.victim
                        );
                        events.push(
                            now,
                            MatchEventKind::Defeated {
                                unit: kill.victim,
                                category: victim_category,
                                by: kill.killer,
                            },
                            format!("{} is defeated!", victim_name),
                            false,
                            true,
                        );

                        if self.kill_bounty > 0 {
                            treasury.credit(kill.killer_faction, self.kill_bounty);
                            summary.bounty_paid =
                                summary.bounty_paid.saturating_add(self.kill_bounty);
                        }
                    }
                }
            }
        }

        tracing::trace!(
            "tick at {}ms: {} attacks, {} kills, {} moves",
            now,
            summary.attacks,
            summary.kills,
            summary.moves
        );

        Ok(summary)
    }
}
