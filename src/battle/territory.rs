//! Battlefield geometry: faction zones and placement validation
//!
//! Purely geometric, no side effects.

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::battle::skirmish::MatchPhase;
use crate::core::config::{TerritoryConfig, ZoneConfig};
use crate::core::types::{Faction, Vec2};

/// Closed X-interval of the battlefield plane
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Zone {
    pub min_x: f32,
    pub max_x: f32,
}

impl Zone {
    pub fn new(min_x: f32, max_x: f32) -> Self {
        Self { min_x, max_x }
    }

    pub fn contains(&self, x: f32) -> bool {
        x >= self.min_x && x <= self.max_x
    }

    pub fn width(&self) -> f32 {
        self.max_x - self.min_x
    }

    /// Whether two zones share any point
    pub fn overlaps(&self, other: &Zone) -> bool {
        self.min_x <= other.max_x && other.min_x <= self.max_x
    }
}

impl From<ZoneConfig> for Zone {
    fn from(config: ZoneConfig) -> Self {
        Self::new(config.min_x, config.max_x)
    }
}

/// Why a placement request was turned down
///
/// These are ordinary negative results; the request leaves no trace on the
/// match state.
#[derive(Debug, Clone, Copy, PartialEq, Error, Serialize, Deserialize)]
pub enum PlacementRejection {
    #[error("position lies inside the opposing faction's territory")]
    EnemyTerritory,
    #[error("position lies in the neutral strip between the territories")]
    BetweenTerritories,
    #[error("position lies outside the battlefield")]
    OutOfBounds,
    #[error("not enough gold: need {needed}, have {available}")]
    InsufficientFunds { needed: u32, available: u32 },
    #[error("no unit category selected")]
    NoCategorySelected,
    #[error("placement is closed while the match is {0:?}")]
    PhaseClosed(MatchPhase),
}

/// The two faction zones plus the neutral strip between them
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Territory {
    pub player_zone: Zone,
    pub enemy_zone: Zone,
    pub half_depth: f32,
    pub baseline_y: f32,
}

impl Territory {
    pub fn from_config(config: &TerritoryConfig) -> Self {
        let territory = Self {
            player_zone: config.player_zone.into(),
            enemy_zone: config.enemy_zone.into(),
            half_depth: config.half_depth,
            baseline_y: config.baseline_y,
        };
        debug_assert!(!territory.player_zone.overlaps(&territory.enemy_zone));
        territory
    }

    pub fn zone_of(&self, faction: Faction) -> Zone {
        match faction {
            Faction::Player => self.player_zone,
            Faction::Enemy => self.enemy_zone,
        }
    }

    /// Is x strictly between the two zones?
    pub fn in_buffer(&self, x: f32) -> bool {
        let (left, right) = if self.player_zone.max_x < self.enemy_zone.min_x {
            (self.player_zone, self.enemy_zone)
        } else {
            (self.enemy_zone, self.player_zone)
        };
        x > left.max_x && x < right.min_x
    }

    /// Accept a position only inside the placing faction's own zone
    pub fn validate_placement(
        &self,
        position: Vec2,
        faction: Faction,
    ) -> Result<(), PlacementRejection> {
        if !position.x.is_finite() || !position.y.is_finite() || position.y.abs() > self.half_depth
        {
            return Err(PlacementRejection::OutOfBounds);
        }
        if self.zone_of(faction.opponent()).contains(position.x) {
            return Err(PlacementRejection::EnemyTerritory);
        }
        if self.in_buffer(position.x) {
            return Err(PlacementRejection::BetweenTerritories);
        }
        if !self.zone_of(faction).contains(position.x) {
            return Err(PlacementRejection::OutOfBounds);
        }
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn territory() -> Territory {
        Territory::from_config(&TerritoryConfig::default())
    }

    #[test]
    fn test_own_zone_accepted() {
        let t = territory();
        assert!(t.validate_placement(Vec2::new(-50.0, 10.0), Faction::Player).is_ok());
        assert!(t.validate_placement(Vec2::new(50.0, -10.0), Faction::Enemy).is_ok());
    }

    #[test]
    fn test_zone_edges_inclusive() {
        let t = territory();
        let max = t.player_zone.max_x;
        assert!(t.validate_placement(Vec2::new(max, 0.0), Faction::Player).is_ok());
        let min = t.enemy_zone.min_x;
        assert!(t.validate_placement(Vec2::new(min, 0.0), Faction::Enemy).is_ok());
    }

    #[test]
    fn test_enemy_zone_rejected() {
        let t = territory();
        assert_eq!(
            t.validate_placement(Vec2::new(40.0, 0.0), Faction::Player),
            Err(PlacementRejection::EnemyTerritory)
        );
        assert_eq!(
            t.validate_placement(Vec2::new(-40.0, 0.0), Faction::Enemy),
            Err(PlacementRejection::EnemyTerritory)
        );
    }

    #[test]
    fn test_buffer_rejected() {
        let t = territory();
        assert_eq!(
            t.validate_placement(Vec2::new(0.0, 0.0), Faction::Player),
            Err(PlacementRejection::BetweenTerritories)
        );
        assert_eq!(
            t.validate_placement(Vec2::new(0.5, 0.0), Faction::Enemy),
            Err(PlacementRejection::BetweenTerritories)
        );
    }

    #[test]
    fn test_out_of_bounds_rejected() {
        let t = territory();
        assert_eq!(
            t.validate_placement(Vec2::new(-150.0, 0.0), Faction::Player),
            Err(PlacementRejection::OutOfBounds)
        );
        assert_eq!(
            t.validate_placement(Vec2::new(-50.0, 80.0), Faction::Player),
            Err(PlacementRejection::OutOfBounds)
        );
        assert_eq!(
            t.validate_placement(Vec2::new(f32::NAN, 0.0), Faction::Player),
            Err(PlacementRejection::OutOfBounds)
        );
    }

    #[test]
    fn test_adjacent_zones_have_no_buffer() {
        let t = Territory {
            player_zone: Zone::new(-100.0, -0.01),
            enemy_zone: Zone::new(0.0, 100.0),
            half_depth: 50.0,
            baseline_y: 0.0,
        };
        assert!(!t.in_buffer(-0.01));
        assert!(!t.in_buffer(0.0));
        assert_eq!(
            t.validate_placement(Vec2::new(0.0, 0.0), Faction::Player),
            Err(PlacementRejection::EnemyTerritory)
        );
    }

    #[test]
    fn test_zone_overlap() {
        assert!(Zone::new(0.0, 10.0).overlaps(&Zone::new(5.0, 20.0)));
        assert!(!Zone::new(0.0, 10.0).overlaps(&Zone::new(10.5, 20.0)));
        assert_eq!(Zone::new(-2.0, 3.0).width(), 5.0);
    }
}
