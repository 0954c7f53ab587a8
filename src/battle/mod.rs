//! Battle system - two-faction skirmish on a flat field
//!
//! Players buy units, drop them into their own territory and watch them
//! fight. Every unit picks its opponent from a fixed priority chain, closes
//! the distance and strikes on a cooldown until one side has nothing left.

pub mod constants;
pub mod economy;
pub mod engagement;
pub mod events;
pub mod execution;
pub mod movement;
pub mod registry;
pub mod resolution;
pub mod skirmish;
pub mod territory;
pub mod units;

// Re-exports for convenient access
pub use constants::*;
pub use economy::{procedural_procure, InsufficientFunds, ProcurementReport, Treasury};
pub use engagement::{decide, first_in_range, nearest, resolve_target_category, UnitDecision};
pub use events::{EventLog, EventSink, LogRecord, MatchEvent, MatchEventKind, TracingSink};
pub use execution::{CombatEngine, Kill, TickSummary};
pub use movement::{advance_unit, step_towards, MovementResult};
pub use registry::{UnitCategory, UnitRegistry, UnitStats};
pub use resolution::{resolve_strike, StrikeResult};
pub use skirmish::{
    MatchOutcome, MatchPhase, MatchResult, PlacementOutcome, PlacementRequest, Skirmish,
    TickReport, UnitSnapshot,
};
pub use territory::{PlacementRejection, Territory, Zone};
pub use units::{DamageOutcome, Unit, UnitStore};
