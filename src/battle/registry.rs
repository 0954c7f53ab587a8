//! Unit categories and their stats
//!
//! The registry is the static catalog a match is built around: per-category
//! health, damage and cost, plus the priority chain naming which opposing
//! categories a unit prefers to engage. It is built once from the roster
//! table and never mutated.

use ahash::AHashMap;
use serde::{Deserialize, Serialize};

use crate::core::config::CategoryConfig;
use crate::core::error::{Result, SkirmishError};
use crate::core::types::{CategoryId, Faction};

/// Fixed combat stats of a category
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct UnitStats {
    pub max_health: u32,
    pub damage: u32,
    pub cost: u32,
}

/// A unit archetype
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct UnitCategory {
    pub id: CategoryId,
    pub name: String,
    pub display_name: String,
    pub faction: Faction,
    pub stats: UnitStats,
    /// Opposing categories, most preferred first
    pub priority_chain: Vec<CategoryId>,
    pub counts_for_victory: bool,
}

/// Immutable catalog of categories in registry order
#[derive(Debug, Clone)]
pub struct UnitRegistry {
    categories: Vec<UnitCategory>,
    by_name: AHashMap<String, CategoryId>,
}

impl UnitRegistry {
    /// Build the registry from roster rows, rejecting malformed tables
    pub fn from_config(rows: &[CategoryConfig]) -> Result<Self> {
        let mut by_name = AHashMap::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            let id = u16::try_from(index)
                .map(CategoryId)
                .map_err(|_| SkirmishError::InvalidConfig("too many categories".into()))?;
            if by_name.insert(row.name.clone(), id).is_some() {
                return Err(SkirmishError::DuplicateCategory(row.name.clone()));
            }
        }

        let mut categories = Vec::with_capacity(rows.len());
        for (index, row) in rows.iter().enumerate() {
            if row.max_health == 0 {
                return Err(SkirmishError::InvalidConfig(format!(
                    "category {} must have positive max_health",
                    row.name
                )));
            }

            let mut priority_chain = Vec::with_capacity(row.priority.len());
            for target_name in &row.priority {
                let target = *by_name
                    .get(target_name)
                    .ok_or_else(|| SkirmishError::UnknownCategory(target_name.clone()))?;
                if rows[target.index()].faction == row.faction {
                    return Err(SkirmishError::SameFactionTarget {
                        category: row.name.clone(),
                        target: target_name.clone(),
                    });
                }
                priority_chain.push(target);
            }

            categories.push(UnitCategory {
                id: CategoryId(index as u16),
                name: row.name.clone(),
                display_name: row.display_name.clone().unwrap_or_else(|| row.name.clone()),
                faction: row.faction,
                stats: UnitStats {
                    max_health: row.max_health,
                    damage: row.damage,
                    cost: row.cost,
                },
                priority_chain,
                counts_for_victory: row.counts_for_victory,
            });
        }

        for faction in Faction::ALL {
            if !categories.iter().any(|c| c.faction == faction) {
                return Err(SkirmishError::EmptyFaction(faction));
            }
        }

        Ok(Self { categories, by_name })
    }

    /// Look up a category by its roster name
    pub fn resolve(&self, name: &str) -> Result<CategoryId> {
        self.by_name
            .get(name)
            .copied()
            .ok_or_else(|| SkirmishError::UnknownCategory(name.to_string()))
    }

    pub fn category(&self, id: CategoryId) -> Result<&UnitCategory> {
        self.categories
            .get(id.index())
            .ok_or_else(|| SkirmishError::UnknownCategory(format!("{:?}", id)))
    }

    pub fn stats_of(&self, id: CategoryId) -> Result<UnitStats> {
        self.category(id).map(|c| c.stats)
    }

    pub fn priority_chain_of(&self, id: CategoryId) -> Result<&[CategoryId]> {
        self.category(id).map(|c| c.priority_chain.as_slice())
    }

    /// All categories in registry order
    pub fn iter(&self) -> impl Iterator<Item = &UnitCategory> {
        self.categories.iter()
    }

    /// Categories of one faction, in registry order
    pub fn of_faction(&self, faction: Faction) -> impl Iterator<Item = &UnitCategory> {
        self.categories.iter().filter(move |c| c.faction == faction)
    }

    /// Cost of the cheapest category a faction can buy
    pub fn cheapest_cost(&self, faction: Faction) -> Option<u32> {
        self.of_faction(faction).map(|c| c.stats.cost).min()
    }

    pub fn len(&self) -> usize {
        self.categories.len()
    }

    pub fn is_empty(&self) -> bool {
        self.categories.is_empty()
    }
}
