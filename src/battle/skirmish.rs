//! Match state machine
//!
//! A `Skirmish` owns every piece of mutable match state: the unit store, the
//! treasury, the pending placement queue and the event log. All mutation goes
//! through `&mut self`, so a placement can never interleave with a running
//! tick; hosts that receive input while a tick is in flight queue it with
//! `queue_placement` and it is applied at the start of the next tick.
//!
//! ```text
//!   NotStarted --start()--> Running --decided--> Ended --end()--> NotStarted
//!                              |                                     ^
//!                              +---------------end()-----------------+
//! ```

use std::collections::VecDeque;

use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;
use serde::{Deserialize, Serialize};

use crate::battle::economy::{procedural_procure, ProcurementReport, Treasury};
use crate::battle::events::{capitalize, EventLog, EventSink, MatchEvent, MatchEventKind};
use crate::battle::execution::{CombatEngine, TickSummary};
use crate::battle::registry::{UnitCategory, UnitRegistry};
use crate::battle::territory::{PlacementRejection, Territory};
use crate::battle::units::UnitStore;
use crate::core::config::SkirmishConfig;
use crate::core::error::{Result, SkirmishError};
use crate::core::types::{CategoryId, Faction, Timestamp, UnitId, Vec2};

/// Match lifecycle
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum MatchPhase {
    #[default]
    NotStarted,
    Running,
    Ended,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum MatchResult {
    Victory(Faction),
    /// Both sides lost their last victory-relevant unit in the same tick
    Draw,
}

impl MatchResult {
    pub fn winner(&self) -> Option<Faction> {
        match self {
            MatchResult::Victory(faction) => Some(*faction),
            MatchResult::Draw => None,
        }
    }
}

/// Record of a decided match, kept after the board is reset
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct MatchOutcome {
    pub result: MatchResult,
    pub player_payout: u32,
    pub enemy_payout: u32,
    pub player_survivors: usize,
    pub enemy_survivors: usize,
    pub ticks: u64,
    pub decided_at: Timestamp,
}

impl MatchOutcome {
    pub fn payout(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Player => self.player_payout,
            Faction::Enemy => self.enemy_payout,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlacementOutcome {
    Placed(UnitId),
    Rejected(PlacementRejection),
}

impl PlacementOutcome {
    pub fn is_placed(&self) -> bool {
        matches!(self, PlacementOutcome::Placed(_))
    }

    pub fn unit(&self) -> Option<UnitId> {
        match self {
            PlacementOutcome::Placed(id) => Some(*id),
            PlacementOutcome::Rejected(_) => None,
        }
    }

    pub fn rejection(&self) -> Option<PlacementRejection> {
        match self {
            PlacementOutcome::Placed(_) => None,
            PlacementOutcome::Rejected(reason) => Some(*reason),
        }
    }
}

/// A placement waiting for the next safe point
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlacementRequest {
    pub category: CategoryId,
    pub position: Vec2,
}

/// Read-only view of a unit for renderers
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct UnitSnapshot {
    pub id: UnitId,
    pub category: String,
    pub faction: Faction,
    pub position: Vec2,
    pub health: u32,
    pub max_health: u32,
    pub alive: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TickReport {
    pub tick: u64,
    pub summary: TickSummary,
    /// Set on the tick that decided the match
    pub outcome: Option<MatchOutcome>,
}

/// One battlefield and the match being fought on it
#[derive(Debug, Clone)]
pub struct Skirmish {
    config: SkirmishConfig,
    registry: UnitRegistry,
    territory: Territory,
    engine: CombatEngine,
    store: UnitStore,
    treasury: Treasury,
    phase: MatchPhase,
    selected: Option<CategoryId>,
    events: EventLog,
    pending: VecDeque<PlacementRequest>,
    rng: ChaCha8Rng,
    ticks: u64,
    started_at: Option<Timestamp>,
    last_outcome: Option<MatchOutcome>,
}

impl Skirmish {
    /// Build a match in `NotStarted`, with the enemy army already procured
    pub fn new(config: SkirmishConfig, now: Timestamp) -> Result<Self> {
        config.validate()?;
        let registry = UnitRegistry::from_config(&config.categories)?;
        let selected = default_selection(&config, &registry)?;
        let rng = match config.session.seed {
            Some(seed) => ChaCha8Rng::seed_from_u64(seed),
            None => ChaCha8Rng::from_entropy(),
        };

        let mut skirmish = Self {
            territory: Territory::from_config(&config.territory),
            engine: CombatEngine::new(&config.combat, &config.payout),
            treasury: Treasury::from_config(&config.economy),
            store: UnitStore::new(),
            phase: MatchPhase::NotStarted,
            selected,
            events: EventLog::new(),
            pending: VecDeque::new(),
            rng,
            ticks: 0,
            started_at: None,
            last_outcome: None,
            registry,
            config,
        };

        if skirmish.config.session.auto_procure_enemy {
            skirmish.procure_army(Faction::Enemy, now)?;
        }

        tracing::info!(
            "Skirmish ready: {} categories, {} enemy units, {} gold for the player",
            skirmish.registry.len(),
            skirmish.store.count_faction(Faction::Enemy),
            skirmish.treasury.balance(Faction::Player)
        );

        Ok(skirmish)
    }

    // ---- Accessors ----

    pub fn phase(&self) -> MatchPhase {
        self.phase
    }

    pub fn config(&self) -> &SkirmishConfig {
        &self.config
    }

    pub fn registry(&self) -> &UnitRegistry {
        &self.registry
    }

    pub fn territory(&self) -> &Territory {
        &self.territory
    }

    pub fn store(&self) -> &UnitStore {
        &self.store
    }

    pub fn gold(&self, faction: Faction) -> u32 {
        self.treasury.balance(faction)
    }

    pub fn selected(&self) -> Option<CategoryId> {
        self.selected
    }

    pub fn ticks(&self) -> u64 {
        self.ticks
    }

    pub fn started_at(&self) -> Option<Timestamp> {
        self.started_at
    }

    pub fn last_outcome(&self) -> Option<&MatchOutcome> {
        self.last_outcome.as_ref()
    }

    pub fn pending_placements(&self) -> usize {
        self.pending.len()
    }

    /// Living units that keep `faction` in the match
    pub fn survivors(&self, faction: Faction) -> usize {
        self.registry
            .of_faction(faction)
            .filter(|category| category.counts_for_victory)
            .map(|category| self.store.count_category(category.id))
            .sum()
    }

    // ---- Placement ----

    /// Make `category` the target of `place_selected`
    pub fn select_category(&mut self, category: CategoryId, now: Timestamp) -> Result<()> {
        let name = self.registry.category(category)?.display_name.clone();
        self.selected = Some(category);
        self.events.push(
            now,
            MatchEventKind::CategorySelected { category },
            format!("{} selected", capitalize(&name)),
            false,
            false,
        );
        Ok(())
    }

    pub fn select_by_name(&mut self, name: &str, now: Timestamp) -> Result<CategoryId> {
        let category = self.registry.resolve(name)?;
        self.select_category(category, now)?;
        Ok(category)
    }

    /// Buy and place one unit of `category` at `position`
    ///
    /// Gold is checked before geometry, so an unaffordable request in enemy
    /// territory reports the missing gold. A rejected request changes
    /// nothing but the event log.
    pub fn place_unit(
        &mut self,
        category: CategoryId,
        position: Vec2,
        now: Timestamp,
    ) -> Result<PlacementOutcome> {
        let (faction, cost, name) = {
            let entry = self.registry.category(category)?;
            (entry.faction, entry.stats.cost, entry.display_name.clone())
        };

        if self.phase == MatchPhase::Ended {
            return Ok(self.reject(
                Some(category),
                PlacementRejection::PhaseClosed(self.phase),
                now,
            ));
        }

        if let Err(short) = self.treasury.spend(faction, cost) {
            let reason = PlacementRejection::InsufficientFunds {
                needed: short.needed,
                available: short.available,
            };
            return Ok(self.reject(Some(category), reason, now));
        }

        if let Err(reason) = self.territory.validate_placement(position, faction) {
            self.treasury.credit(faction, cost);
            return Ok(self.reject(Some(category), reason, now));
        }

        let unit = self
            .store
            .spawn(self.registry.category(category)?, position, now);
        self.events.push(
            now,
            MatchEventKind::Placed {
                unit,
                category,
                faction,
                position,
            },
            format!("{} placed!", capitalize(&name)),
            true,
            false,
        );
        tracing::debug!(
            "{} {} placed at ({:.1}, {:.1}); {} gold left",
            name,
            unit,
            position.x,
            position.y,
            self.treasury.balance(faction)
        );

        Ok(PlacementOutcome::Placed(unit))
    }

    /// Place the currently selected category
    pub fn place_selected(&mut self, position: Vec2, now: Timestamp) -> Result<PlacementOutcome> {
        match self.selected {
            Some(category) => self.place_unit(category, position, now),
            None => Ok(self.reject(None, PlacementRejection::NoCategorySelected, now)),
        }
    }

    /// Defer a placement until the next tick or `process_pending`
    ///
    /// The category is resolved here so a bad request never reaches the tick.
    pub fn queue_placement(&mut self, category: CategoryId, position: Vec2) -> Result<()> {
        self.registry.category(category)?;
        self.pending.push_back(PlacementRequest { category, position });
        Ok(())
    }

    /// Apply queued placements in arrival order
    pub fn process_pending(&mut self, now: Timestamp) -> Result<Vec<PlacementOutcome>> {
        let mut outcomes = Vec::with_capacity(self.pending.len());
        while let Some(request) = self.pending.pop_front() {
            outcomes.push(self.place_unit(request.category, request.position, now)?);
        }
        Ok(outcomes)
    }

    fn reject(
        &mut self,
        category: Option<CategoryId>,
        reason: PlacementRejection,
        now: Timestamp,
    ) -> PlacementOutcome {
        let message = match reason {
            PlacementRejection::InsufficientFunds { .. } => "Not enough gold!",
            PlacementRejection::EnemyTerritory => "Cannot place unit in enemy territory!",
            PlacementRejection::BetweenTerritories => "Unit must be placed inside your territory!",
            PlacementRejection::OutOfBounds => "Unit must be placed between the territories!",
            PlacementRejection::NoCategorySelected => "Select a unit first!",
            PlacementRejection::PhaseClosed(_) => "Wait for the next game to place units!",
        };
        tracing::debug!("Placement rejected: {}", reason);
        self.events.push(
            now,
            MatchEventKind::PlacementRejected { category, reason },
            message.to_string(),
            true,
            true,
        );
        PlacementOutcome::Rejected(reason)
    }

    // ---- Procurement ----

    /// Randomly buy units for `faction` with up to `attempts` draws
    pub fn procure(
        &mut self,
        faction: Faction,
        attempts: u32,
        now: Timestamp,
    ) -> Result<ProcurementReport> {
        if self.phase == MatchPhase::Ended {
            return Err(SkirmishError::InvalidPhase {
                operation: "procure",
                phase: self.phase,
            });
        }

        let catalog: Vec<&UnitCategory> = self.registry.of_faction(faction).collect();
        let report = procedural_procure(
            faction,
            &catalog,
            attempts,
            &mut self.treasury,
            &mut self.store,
            &self.territory,
            &mut self.rng,
            now,
        );

        for &unit in &report.spawned {
            let Some(placed) = self.store.get(unit) else {
                continue;
            };
            let name = &self.registry.category(placed.category)?.display_name;
            self.events.push(
                now,
                MatchEventKind::Placed {
                    unit,
                    category: placed.category,
                    faction,
                    position: placed.position,
                },
                format!("{} placed!", capitalize(name)),
                false,
                false,
            );
        }
        self.events.push(
            now,
            MatchEventKind::Procured {
                faction,
                units: report.spawned.len(),
                spent: report.spent,
            },
            format!(
                "{} gold after buying units: {}",
                faction,
                self.treasury.balance(faction)
            ),
            false,
            false,
        );

        Ok(report)
    }

    /// Pre-match bulk purchase
    pub fn procure_army(&mut self, faction: Faction, now: Timestamp) -> Result<ProcurementReport> {
        let attempts = self.config.economy.bulk_procure_attempts;
        self.procure(faction, attempts, now)
    }

    /// Small purchase with whatever gold is left, e.g. mid-match
    pub fn procure_reinforcements(
        &mut self,
        faction: Faction,
        now: Timestamp,
    ) -> Result<ProcurementReport> {
        let attempts = self.config.economy.trickle_procure_attempts;
        self.procure(faction, attempts, now)
    }

    // ---- Lifecycle ----

    /// Begin combat
    pub fn start(&mut self, now: Timestamp) -> Result<()> {
        if self.phase != MatchPhase::NotStarted {
            return Err(SkirmishError::InvalidPhase {
                operation: "start",
                phase: self.phase,
            });
        }

        self.process_pending(now)?;

        if self.config.economy.require_full_spend {
            let remaining = self.treasury.balance(Faction::Player);
            let cheapest = self.registry.cheapest_cost(Faction::Player).unwrap_or(0);
            if cheapest > 0 && remaining >= cheapest {
                return Err(SkirmishError::GoldNotSpent {
                    remaining,
                    cheapest,
                });
            }
        }

        self.store.reset_attack_clocks(now);
        self.phase = MatchPhase::Running;
        self.started_at = Some(now);
        self.ticks = 0;
        self.events.push(
            now,
            MatchEventKind::MatchStarted,
            "The battle begins!".to_string(),
            false,
            false,
        );
        tracing::info!(
            "Match started: {} player units vs {} enemy units",
            self.store.count_faction(Faction::Player),
            self.store.count_faction(Faction::Enemy)
        );
        Ok(())
    }

    /// Advance the running match by one combat tick
    pub fn tick(&mut self, now: Timestamp) -> Result<TickReport> {
        if self.phase != MatchPhase::Running {
            return Err(SkirmishError::InvalidPhase {
                operation: "tick",
                phase: self.phase,
            });
        }

        self.process_pending(now)?;

        let summary = self.engine.run_tick(
            &mut self.store,
            &self.registry,
            &mut self.treasury,
            &mut self.events,
            now,
        )?;
        self.ticks += 1;
        let tick = self.ticks;

        // A decided match may reset the counter
        let outcome = self.evaluate_status(now)?;
        Ok(TickReport {
            tick,
            summary,
            outcome,
        })
    }

    /// Decide the match once a faction has no victory-relevant units left
    ///
    /// Does nothing unless the match is running.
    pub fn evaluate_status(&mut self, now: Timestamp) -> Result<Option<MatchOutcome>> {
        if self.phase != MatchPhase::Running {
            return Ok(None);
        }

        let player_survivors = self.survivors(Faction::Player);
        let enemy_survivors = self.survivors(Faction::Enemy);
        let result = match (player_survivors, enemy_survivors) {
            (0, 0) => MatchResult::Draw,
            (_, 0) => MatchResult::Victory(Faction::Player),
            (0, _) => MatchResult::Victory(Faction::Enemy),
            _ => return Ok(None),
        };

        let payout = &self.config.payout;
        let winner_payout = |survivors: usize| {
            let survivors = u32::try_from(survivors).unwrap_or(u32::MAX);
            payout
                .win_bonus
                .saturating_add(payout.per_survivor_bonus.saturating_mul(survivors))
        };
        let (player_payout, enemy_payout) = match result {
            MatchResult::Victory(Faction::Player) => {
                (winner_payout(player_survivors), payout.consolation_bonus)
            }
            MatchResult::Victory(Faction::Enemy) => {
                (payout.consolation_bonus, winner_payout(enemy_survivors))
            }
            MatchResult::Draw => (payout.consolation_bonus, payout.consolation_bonus),
        };
        self.treasury.credit(Faction::Player, player_payout);
        self.treasury.credit(Faction::Enemy, enemy_payout);

        let outcome = MatchOutcome {
            result,
            player_payout,
            enemy_payout,
            player_survivors,
            enemy_survivors,
            ticks: self.ticks,
            decided_at: now,
        };
        self.phase = MatchPhase::Ended;
        self.last_outcome = Some(outcome.clone());

        let message = match result {
            MatchResult::Victory(Faction::Player) => "All enemy units defeated! You win!",
            MatchResult::Victory(Faction::Enemy) => "All your units have been defeated! You lose!",
            MatchResult::Draw => "Both armies have fallen! It's a draw!",
        };
        self.events.push(
            now,
            MatchEventKind::MatchDecided {
                result,
                player_payout,
                enemy_payout,
            },
            message.to_string(),
            true,
            true,
        );
        tracing::info!(
            "Match decided after {} ticks: {:?} (payouts: player {}, enemy {})",
            self.ticks,
            result,
            player_payout,
            enemy_payout
        );

        if self.config.session.auto_reset {
            self.end(now)?;
        }

        Ok(Some(outcome))
    }

    /// Clear the board and arm the next match
    ///
    /// Also usable on a running match to abandon it.
    pub fn end(&mut self, now: Timestamp) -> Result<()> {
        if self.phase == MatchPhase::NotStarted {
            return Err(SkirmishError::InvalidPhase {
                operation: "end",
                phase: self.phase,
            });
        }

        self.events.push(
            now,
            MatchEventKind::GameOver,
            "Game Over!".to_string(),
            false,
            true,
        );

        let cleared = self.store.len();
        self.store.clear();
        self.pending.clear();
        if !self.config.economy.carry_winnings {
            self.treasury.reset(&self.config.economy);
        }
        self.selected = default_selection(&self.config, &self.registry)?;
        self.phase = MatchPhase::NotStarted;
        self.started_at = None;
        self.ticks = 0;
        tracing::info!("Board cleared ({} units removed)", cleared);

        if self.config.session.auto_procure_enemy {
            self.procure_army(Faction::Enemy, now)?;
        }

        self.events.push(
            now,
            MatchEventKind::ReadyForNextMatch,
            "You can now start a new game!".to_string(),
            false,
            true,
        );
        Ok(())
    }

    // ---- Observation ----

    /// Current units in issue order
    pub fn snapshot(&self) -> Vec<UnitSnapshot> {
        self.store
            .iter()
            .filter_map(|unit| {
                let category = self.registry.category(unit.category).ok()?;
                Some(UnitSnapshot {
                    id: unit.id,
                    category: category.name.clone(),
                    faction: unit.faction,
                    position: unit.position,
                    health: unit.health,
                    max_health: category.stats.max_health,
                    alive: unit.health > 0,
                })
            })
            .collect()
    }

    /// Events not yet drained
    pub fn events(&self) -> &[MatchEvent] {
        self.events.events()
    }

    pub fn drain_events(&mut self) -> Vec<MatchEvent> {
        self.events.drain()
    }

    /// Drain pending events into `sink` as log records
    pub fn flush_to<S: EventSink + ?Sized>(&mut self, sink: &mut S) -> usize {
        let events = self.events.drain();
        for event in &events {
            sink.record(event.log_record());
        }
        events.len()
    }
}

fn default_selection(config: &SkirmishConfig, registry: &UnitRegistry) -> Result<Option<CategoryId>> {
    config
        .session
        .default_selection
        .as_deref()
        .map(|name| registry.resolve(name))
        .transpose()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::battle::events::LogRecord;

    fn quiet_config() -> SkirmishConfig {
        let mut config = SkirmishConfig::default().with_seed(11);
        config.session.auto_procure_enemy = false;
        config
    }

    fn id(skirmish: &Skirmish, name: &str) -> CategoryId {
        skirmish.registry().resolve(name).unwrap()
    }

    #[test]
    fn test_new_procures_enemy_army() {
        let skirmish = Skirmish::new(SkirmishConfig::default().with_seed(3), 0).unwrap();
        assert_eq!(skirmish.phase(), MatchPhase::NotStarted);
        assert!(skirmish.store().count_faction(Faction::Enemy) > 0);
        assert_eq!(skirmish.store().count_faction(Faction::Player), 0);
        assert!(skirmish.gold(Faction::Enemy) < 500);
        assert_eq!(skirmish.gold(Faction::Player), 500);
        assert_eq!(skirmish.selected(), Some(id(&skirmish, "ant")));
    }

    #[test]
    fn test_place_selected_spends_and_logs() {
        let mut skirmish = Skirmish::new(quiet_config(), 0).unwrap();
        let outcome = skirmish.place_selected(Vec2::new(-10.0, 0.0), 5).unwrap();
        assert!(outcome.is_placed());
        assert_eq!(skirmish.gold(Faction::Player), 440);

        let last = skirmish.events().last().unwrap();
        assert_eq!(last.description, "Ant placed!");
        assert!(last.reveal);
        assert!(!last.highlight);
    }

    #[test]
    fn test_rejected_placement_changes_nothing() {
        let mut skirmish = Skirmish::new(quiet_config(), 0).unwrap();
        let ant = id(&skirmish, "ant");

        let outcome = skirmish.place_unit(ant, Vec2::new(10.0, 0.0), 0).unwrap();
        assert_eq!(
            outcome.rejection(),
            Some(PlacementRejection::EnemyTerritory)
        );
        assert_eq!(skirmish.gold(Faction::Player), 500);
        assert!(skirmish.store().is_empty());
        assert_eq!(
            skirmish.events().last().unwrap().description,
            "Cannot place unit in enemy territory!"
        );
    }

    #[test]
    fn test_unaffordable_placement() {
        let mut config = quiet_config();
        config.economy.player_starting_gold = 100;
        let mut skirmish = Skirmish::new(config, 0).unwrap();
        let bee = id(&skirmish, "bee");

        let outcome = skirmish.place_unit(bee, Vec2::new(-10.0, 0.0), 0).unwrap();
        assert_eq!(
            outcome.rejection(),
            Some(PlacementRejection::InsufficientFunds {
                needed: 220,
                available: 100
            })
        );
        assert_eq!(skirmish.gold(Faction::Player), 100);
        assert_eq!(skirmish.events().last().unwrap().description, "Not enough gold!");
    }

    #[test]
    fn test_no_selection_rejected() {
        let mut config = quiet_config();
        config.session.default_selection = None;
        let mut skirmish = Skirmish::new(config, 0).unwrap();
        let outcome = skirmish.place_selected(Vec2::new(-10.0, 0.0), 0).unwrap();
        assert_eq!(
            outcome.rejection(),
            Some(PlacementRejection::NoCategorySelected)
        );
    }

    #[test]
    fn test_unknown_category_is_an_error() {
        let mut skirmish = Skirmish::new(quiet_config(), 0).unwrap();
        let err = skirmish
            .place_unit(CategoryId(99), Vec2::new(-10.0, 0.0), 0)
            .unwrap_err();
        assert!(matches!(err, SkirmishError::UnknownCategory(_)));
        assert!(skirmish.select_by_name("hornet", 0).is_err());
    }

    #[test]
    fn test_lifecycle_phase_errors() {
        let mut skirmish = Skirmish::new(quiet_config(), 0).unwrap();
        assert!(matches!(
            skirmish.tick(0),
            Err(SkirmishError::InvalidPhase { operation: "tick", .. })
        ));
        assert!(matches!(
            skirmish.end(0),
            Err(SkirmishError::InvalidPhase { operation: "end", .. })
        ));

        skirmish.start(0).unwrap();
        assert!(matches!(
            skirmish.start(1),
            Err(SkirmishError::InvalidPhase { operation: "start", .. })
        ));
    }

    #[test]
    fn test_empty_board_is_a_draw() {
        let mut skirmish = Skirmish::new(quiet_config(), 0).unwrap();
        skirmish.start(0).unwrap();
        let report = skirmish.tick(16).unwrap();

        let outcome = report.outcome.unwrap();
        assert_eq!(outcome.result, MatchResult::Draw);
        assert_eq!(outcome.player_payout, 500);
        assert_eq!(outcome.enemy_payout, 500);
        // auto_reset put the board back
        assert_eq!(skirmish.phase(), MatchPhase::NotStarted);
        assert_eq!(skirmish.gold(Faction::Player), 500);
    }

    #[test]
    fn test_without_auto_reset_match_stays_ended() {
        let mut config = quiet_config();
        config.session.auto_reset = false;
        let mut skirmish = Skirmish::new(config, 0).unwrap();
        let ant = id(&skirmish, "ant");
        skirmish.place_unit(ant, Vec2::new(-10.0, 0.0), 0).unwrap();
        skirmish.start(0).unwrap();

        let outcome = skirmish.tick(16).unwrap().outcome.unwrap();
        assert_eq!(outcome.result, MatchResult::Victory(Faction::Player));
        assert_eq!(outcome.player_payout, 505);
        assert_eq!(skirmish.phase(), MatchPhase::Ended);
        assert_eq!(skirmish.gold(Faction::Player), 440 + 505);

        let late = skirmish.place_unit(ant, Vec2::new(-12.0, 0.0), 20).unwrap();
        assert_eq!(
            late.rejection(),
            Some(PlacementRejection::PhaseClosed(MatchPhase::Ended))
        );

        skirmish.end(30).unwrap();
        assert_eq!(skirmish.phase(), MatchPhase::NotStarted);
        assert!(skirmish.store().is_empty());
        assert_eq!(skirmish.gold(Faction::Player), 500);
    }

    #[test]
    fn test_queue_applies_in_order_on_tick() {
        let mut config = quiet_config();
        config.session.auto_reset = false;
        let mut skirmish = Skirmish::new(config, 0).unwrap();
        let ant = id(&skirmish, "ant");
        let black_ant = id(&skirmish, "black_ant");

        skirmish.place_unit(ant, Vec2::new(-50.0, 0.0), 0).unwrap();
        skirmish.place_unit(black_ant, Vec2::new(50.0, 0.0), 0).unwrap();
        skirmish.start(0).unwrap();

        skirmish.queue_placement(ant, Vec2::new(-60.0, 0.0)).unwrap();
        skirmish.queue_placement(ant, Vec2::new(60.0, 0.0)).unwrap();
        assert_eq!(skirmish.pending_placements(), 2);
        assert_eq!(skirmish.store().count_category(ant), 1);

        skirmish.tick(16).unwrap();
        assert_eq!(skirmish.pending_placements(), 0);
        assert_eq!(skirmish.store().count_category(ant), 2);
        assert_eq!(skirmish.gold(Faction::Player), 500 - 120);
    }

    #[test]
    fn test_queue_rejects_unknown_category() {
        let mut config = quiet_config();
        config.session.auto_reset = false;
        let mut skirmish = Skirmish::new(config, 0).unwrap();
        let ant = id(&skirmish, "ant");
        let black_ant = id(&skirmish, "black_ant");
        skirmish.place_unit(ant, Vec2::new(-50.0, 0.0), 0).unwrap();
        skirmish.place_unit(black_ant, Vec2::new(50.0, 0.0), 0).unwrap();
        skirmish.start(0).unwrap();

        let result = skirmish.queue_placement(CategoryId(999), Vec2::new(-60.0, 0.0));
        assert!(matches!(result, Err(SkirmishError::UnknownCategory(_))));
        assert_eq!(skirmish.pending_placements(), 0);

        skirmish.queue_placement(ant, Vec2::new(-60.0, 0.0)).unwrap();
        skirmish.tick(16).unwrap();
        assert_eq!(skirmish.store().count_category(ant), 2);
    }

    #[test]
    fn test_deciding_tick_reports_its_number_after_reset() {
        let mut skirmish = Skirmish::new(quiet_config(), 0).unwrap();
        assert!(skirmish.config().session.auto_reset);
        skirmish.place_selected(Vec2::new(-10.0, 0.0), 0).unwrap();
        skirmish.start(0).unwrap();

        let report = skirmish.tick(16).unwrap();
        let outcome = report.outcome.unwrap();
        assert_eq!(outcome.result, MatchResult::Victory(Faction::Player));
        assert_eq!(report.tick, 1);
        assert_eq!(report.tick, outcome.ticks);
        assert_eq!(skirmish.ticks(), 0);
    }

    #[test]
    fn test_flush_to_sink() {
        let mut skirmish = Skirmish::new(quiet_config(), 0).unwrap();
        skirmish.place_selected(Vec2::new(-10.0, 0.0), 0).unwrap();
        skirmish.place_selected(Vec2::new(10.0, 0.0), 0).unwrap();

        let mut sink: Vec<LogRecord> = Vec::new();
        assert_eq!(skirmish.flush_to(&mut sink), 2);
        assert_eq!(sink[0].message, "Ant placed!");
        assert_eq!(sink[1].message, "Cannot place unit in enemy territory!");
        assert!(sink[1].highlight);
        assert!(skirmish.events().is_empty());
    }

    #[test]
    fn test_snapshot_reports_live_units() {
        let mut skirmish = Skirmish::new(quiet_config(), 0).unwrap();
        skirmish.select_by_name("beetle", 0).unwrap();
        let placed = skirmish
            .place_selected(Vec2::new(-20.0, 3.0), 0)
            .unwrap()
            .unit()
            .unwrap();

        let snapshot = skirmish.snapshot();
        assert_eq!(snapshot.len(), 1);
        assert_eq!(snapshot[0].id, placed);
        assert_eq!(snapshot[0].category, "beetle");
        assert_eq!(snapshot[0].health, 90);
        assert_eq!(snapshot[0].max_health, 90);
        assert!(snapshot[0].alive);
    }

    #[test]
    fn test_full_spend_policy_blocks_start() {
        let mut config = quiet_config();
        config.economy.require_full_spend = true;
        let mut skirmish = Skirmish::new(config, 0).unwrap();

        assert!(matches!(
            skirmish.start(0),
            Err(SkirmishError::GoldNotSpent { remaining: 500, cheapest: 60 })
        ));

        // 8 ants leave 20 gold, less than any unit costs
        for i in 0..8 {
            let x = -10.0 - i as f32;
            assert!(skirmish.place_selected(Vec2::new(x, 0.0), 0).unwrap().is_placed());
        }
        assert_eq!(skirmish.gold(Faction::Player), 20);
        skirmish.start(0).unwrap();
        assert_eq!(skirmish.phase(), MatchPhase::Running);
    }

    #[test]
    fn test_reinforcements_mid_match() {
        let mut config = quiet_config();
        config.session.auto_reset = false;
        let mut skirmish = Skirmish::new(config, 0).unwrap();
        let ant = id(&skirmish, "ant");
        let black_ant = id(&skirmish, "black_ant");
        skirmish.place_unit(ant, Vec2::new(-90.0, 0.0), 0).unwrap();
        skirmish.place_unit(black_ant, Vec2::new(90.0, 0.0), 0).unwrap();
        skirmish.start(0).unwrap();

        let before = skirmish.store().count_faction(Faction::Enemy);
        let report = skirmish.procure_reinforcements(Faction::Enemy, 100).unwrap();
        assert_eq!(report.attempts, 5);
        assert_eq!(
            skirmish.store().count_faction(Faction::Enemy),
            before + report.spawned.len()
        );
        for id in &report.spawned {
            assert_eq!(skirmish.store().get(*id).unwrap().last_attack_at, 100);
        }
    }
}
