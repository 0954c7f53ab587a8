//! Hive Skirmish - insect armies fight over a strip of dirt
//!
//! The crate is headless: a host feeds it timestamps and placement requests,
//! and reads back unit snapshots and a stream of match events.

pub mod battle;
pub mod core;

pub use crate::battle::{MatchEvent, MatchOutcome, MatchPhase, MatchResult, PlacementOutcome, Skirmish};
pub use crate::core::{Faction, Result, SkirmishConfig, SkirmishError, Vec2};
