//! Skirmish configuration with documented defaults
//!
//! Every tunable number the match reads is collected here. Rosters are
//! loaded from TOML; any section left out of a file falls back to the
//! defaults below, which describe the standard ant/beetle/bee roster.

use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::battle::constants::*;
use crate::battle::registry::UnitRegistry;
use crate::core::error::{Result, SkirmishError};
use crate::core::types::Faction;

/// Combat pacing shared by every unit
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct CombatConfig {
    /// Euclidean distance within which a unit may strike
    pub attack_range: f32,
    /// Minimum wall-clock gap between two attacks of the same unit.
    ///
    /// Zero means a unit attacks on every tick its target is in range.
    pub attack_interval_ms: u64,
    /// Distance a unit closes toward its target per tick
    pub step_distance: f32,
}

impl Default for CombatConfig {
    fn default() -> Self {
        Self {
            attack_range: ATTACK_RANGE,
            attack_interval_ms: ATTACK_INTERVAL_MS,
            step_distance: STEP_DISTANCE,
        }
    }
}

/// Gold balances and procurement limits
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct EconomyConfig {
    pub player_starting_gold: u32,
    pub enemy_starting_gold: u32,
    /// Samples drawn by the pre-match bulk buy
    pub bulk_procure_attempts: u32,
    /// Samples drawn by a mid-match reinforcement buy
    pub trickle_procure_attempts: u32,
    /// Refuse to start while the player can still afford a unit
    pub require_full_spend: bool,
    /// Keep post-payout balances across a reset instead of restoring
    /// the starting gold
    pub carry_winnings: bool,
}

impl Default for EconomyConfig {
    fn default() -> Self {
        Self {
            player_starting_gold: STARTING_GOLD,
            enemy_starting_gold: STARTING_GOLD,
            bulk_procure_attempts: BULK_PROCURE_ATTEMPTS,
            trickle_procure_attempts: TRICKLE_PROCURE_ATTEMPTS,
            require_full_spend: false,
            carry_winnings: false,
        }
    }
}

impl EconomyConfig {
    pub fn starting_gold(&self, faction: Faction) -> u32 {
        match faction {
            Faction::Player => self.player_starting_gold,
            Faction::Enemy => self.enemy_starting_gold,
        }
    }
}

/// Gold handed out when a match is decided
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PayoutConfig {
    pub win_bonus: u32,
    /// Paid to the winner for each of its surviving victory-relevant units
    pub per_survivor_bonus: u32,
    /// Paid to the loser, and to both sides on a draw
    pub consolation_bonus: u32,
    /// Paid to the killer's faction for every unit defeated
    pub kill_bounty: u32,
}

impl Default for PayoutConfig {
    fn default() -> Self {
        Self {
            win_bonus: WIN_BONUS,
            per_survivor_bonus: PER_SURVIVOR_BONUS,
            consolation_bonus: CONSOLATION_BONUS,
            kill_bounty: 0,
        }
    }
}

/// Closed X-interval owned by one faction
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ZoneConfig {
    pub min_x: f32,
    pub max_x: f32,
}

/// Battlefield layout
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct TerritoryConfig {
    pub player_zone: ZoneConfig,
    pub enemy_zone: ZoneConfig,
    /// Placements need |y| <= half_depth
    pub half_depth: f32,
    /// Y coordinate procured units spawn on
    pub baseline_y: f32,
}

impl Default for TerritoryConfig {
    fn default() -> Self {
        Self {
            player_zone: ZoneConfig {
                min_x: -FIELD_HALF_WIDTH,
                max_x: -NEUTRAL_HALF_WIDTH,
            },
            enemy_zone: ZoneConfig {
                min_x: NEUTRAL_HALF_WIDTH,
                max_x: FIELD_HALF_WIDTH,
            },
            half_depth: FIELD_HALF_DEPTH,
            baseline_y: 0.0,
        }
    }
}

/// Match-level policy
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SessionConfig {
    /// Seed for procurement sampling; random when absent
    pub seed: Option<u64>,
    /// Category selected at startup and after every reset
    pub default_selection: Option<String>,
    /// Run `end()` as soon as a winner is decided
    pub auto_reset: bool,
    /// Let the enemy buy its army procedurally before each match
    pub auto_procure_enemy: bool,
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            seed: None,
            default_selection: Some("ant".to_string()),
            auto_reset: true,
            auto_procure_enemy: true,
        }
    }
}

fn default_true() -> bool {
    true
}

/// One row of the roster table
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CategoryConfig {
    pub name: String,
    /// Human-readable name for log messages (defaults to `name`)
    #[serde(default)]
    pub display_name: Option<String>,
    pub faction: Faction,
    pub max_health: u32,
    pub damage: u32,
    pub cost: u32,
    /// Opposing categories to engage, most preferred first
    #[serde(default)]
    pub priority: Vec<String>,
    /// Whether survivors of this category keep the faction in the match
    #[serde(default = "default_true")]
    pub counts_for_victory: bool,
}

impl CategoryConfig {
    fn new(
        name: &str,
        display_name: &str,
        faction: Faction,
        (max_health, damage, cost): (u32, u32, u32),
        priority: &[&str],
    ) -> Self {
        Self {
            name: name.to_string(),
            display_name: Some(display_name.to_string()),
            faction,
            max_health,
            damage,
            cost,
            priority: priority.iter().map(|p| p.to_string()).collect(),
            counts_for_victory: true,
        }
    }
}

/// The standard roster, listed in the order the combat loop visits it
fn default_categories() -> Vec<CategoryConfig> {
    vec![
        CategoryConfig::new(
            "ant",
            "Ant",
            Faction::Player,
            (40, 3, 60),
            &["black_ant", "grey_roller", "wasp"],
        ),
        CategoryConfig::new(
            "black_ant",
            "Black ant",
            Faction::Enemy,
            (40, 3, 60),
            &["ant", "beetle", "bee"],
        ),
        CategoryConfig::new(
            "bee",
            "Bee",
            Faction::Player,
            (12, 10, 220),
            &["grey_roller", "black_ant", "wasp"],
        ),
        CategoryConfig::new(
            "wasp",
            "Wasp",
            Faction::Enemy,
            (12, 10, 220),
            &["beetle", "ant", "bee"],
        ),
        CategoryConfig::new(
            "beetle",
            "Beetle",
            Faction::Player,
            (90, 2, 120),
            &["black_ant", "wasp", "grey_roller"],
        ),
        CategoryConfig::new(
            "grey_roller",
            "Grey roller",
            Faction::Enemy,
            (90, 2, 120),
            &["ant", "bee", "beetle"],
        ),
    ]
}

/// Complete configuration for one deployment
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SkirmishConfig {
    pub combat: CombatConfig,
    pub economy: EconomyConfig,
    pub payout: PayoutConfig,
    pub territory: TerritoryConfig,
    pub session: SessionConfig,
    pub categories: Vec<CategoryConfig>,
}

impl Default for SkirmishConfig {
    fn default() -> Self {
        Self {
            combat: CombatConfig::default(),
            economy: EconomyConfig::default(),
            payout: PayoutConfig::default(),
            territory: TerritoryConfig::default(),
            session: SessionConfig::default(),
            categories: default_categories(),
        }
    }
}

impl SkirmishConfig {
    /// Create a new config with default values
    pub fn new() -> Self {
        Self::default()
    }

    /// Parse a roster from TOML text and validate it
    pub fn from_toml_str(contents: &str) -> Result<Self> {
        let config: SkirmishConfig = toml::from_str(contents)?;
        config.validate()?;
        Ok(config)
    }

    /// Load a roster file, e.g. `data/rosters/default.toml`
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let contents = fs::read_to_string(path.as_ref())?;
        let config = Self::from_toml_str(&contents)?;
        tracing::debug!(
            "Loaded roster {:?} with {} categories",
            path.as_ref(),
            config.categories.len()
        );
        Ok(config)
    }

    /// Same as `default()` but with a fixed procurement seed
    pub fn with_seed(mut self, seed: u64) -> Self {
        self.session.seed = Some(seed);
        self
    }

    /// Validate configuration for internal consistency
    pub fn validate(&self) -> Result<()> {
        let combat = &self.combat;
        if !(combat.attack_range.is_finite() && combat.attack_range > 0.0) {
            return Err(SkirmishError::InvalidConfig(format!(
                "attack_range ({}) must be a positive number",
                combat.attack_range
            )));
        }
        if !(combat.step_distance.is_finite() && combat.step_distance >= 0.0) {
            return Err(SkirmishError::InvalidConfig(format!(
                "step_distance ({}) must be zero or positive",
                combat.step_distance
            )));
        }

        let territory = &self.territory;
        for (label, zone) in [
            ("player_zone", territory.player_zone),
            ("enemy_zone", territory.enemy_zone),
        ] {
            if !(zone.min_x.is_finite() && zone.max_x.is_finite() && zone.min_x <= zone.max_x) {
                return Err(SkirmishError::InvalidConfig(format!(
                    "{} [{}, {}] is not a valid interval",
                    label, zone.min_x, zone.max_x
                )));
            }
        }
        let (player, enemy) = (territory.player_zone, territory.enemy_zone);
        if player.max_x >= enemy.min_x && enemy.max_x >= player.min_x {
            return Err(SkirmishError::InvalidConfig(format!(
                "player_zone [{}, {}] overlaps enemy_zone [{}, {}]",
                player.min_x, player.max_x, enemy.min_x, enemy.max_x
            )));
        }
        if !(territory.half_depth.is_finite() && territory.half_depth > 0.0) {
            return Err(SkirmishError::InvalidConfig(format!(
                "half_depth ({}) must be positive",
                territory.half_depth
            )));
        }
        if territory.baseline_y.abs() > territory.half_depth {
            return Err(SkirmishError::InvalidConfig(format!(
                "baseline_y ({}) lies outside the battlefield depth",
                territory.baseline_y
            )));
        }

        // Category table: names, priority chains, factions
        let registry = UnitRegistry::from_config(&self.categories)?;

        if let Some(selection) = &self.session.default_selection {
            let id = registry.resolve(selection)?;
            if registry.category(id)?.faction != Faction::Player {
                return Err(SkirmishError::InvalidConfig(format!(
                    "default_selection {} is not a player category",
                    selection
                )));
            }
        }

        Ok(())
    }
}
