//! Structured match events and the log-record stream handed to presentation
//!
//! Every state change the match makes is recorded as a `MatchEvent`. The
//! host drains them; a UI log only needs the flattened `LogRecord`.

use serde::{Deserialize, Serialize};

use crate::battle::skirmish::MatchResult;
use crate::battle::territory::PlacementRejection;
use crate::core::types::{CategoryId, Faction, Timestamp, UnitId, Vec2};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum MatchEventKind {
    CategorySelected {
        category: CategoryId,
    },
    Placed {
        unit: UnitId,
        category: CategoryId,
        faction: Faction,
        position: Vec2,
    },
    PlacementRejected {
        category: Option<CategoryId>,
        reason: PlacementRejection,
    },
    Procured {
        faction: Faction,
        units: usize,
        spent: u32,
    },
    MatchStarted,
    Attacked {
        attacker: UnitId,
        target: UnitId,
        damage: u32,
        remaining_health: u32,
    },
    Defeated {
        unit: UnitId,
        category: CategoryId,
        by: UnitId,
    },
    MatchDecided {
        result: MatchResult,
        player_payout: u32,
        enemy_payout: u32,
    },
    GameOver,
    ReadyForNextMatch,
}

/// One entry of the match log
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MatchEvent {
    pub timestamp: Timestamp,
    pub kind: MatchEventKind,
    pub description: String,
    /// Ask the UI to open its log panel if hidden
    pub reveal: bool,
    /// Ask the UI to emphasise the entry
    pub highlight: bool,
}

impl MatchEvent {
    pub fn log_record(&self) -> LogRecord {
        LogRecord {
            message: self.description.clone(),
            should_reveal: self.reveal,
            highlight: self.highlight,
        }
    }
}

/// What an append-only UI log receives
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LogRecord {
    pub message: String,
    pub should_reveal: bool,
    pub highlight: bool,
}

/// Receiver of log records. The match never reads anything back.
pub trait EventSink {
    fn record(&mut self, record: LogRecord);
}

impl EventSink for Vec<LogRecord> {
    fn record(&mut self, record: LogRecord) {
        self.push(record);
    }
}

/// Forwards log records to `tracing`
#[derive(Debug, Clone, Copy, Default)]
pub struct TracingSink;

impl EventSink for TracingSink {
    fn record(&mut self, record: LogRecord) {
        if record.highlight {
            tracing::info!(target: "hive_skirmish::log", "{}", record.message);
        } else {
            tracing::debug!(target: "hive_skirmish::log", "{}", record.message);
        }
    }
}

/// Ordered buffer of events not yet drained by the host
#[derive(Debug, Clone, Default)]
pub struct EventLog {
    events: Vec<MatchEvent>,
}

impl EventLog {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn push(
        &mut self,
        timestamp: Timestamp,
        kind: MatchEventKind,
        description: String,
        reveal: bool,
        highlight: bool,
    ) {
        self.events.push(MatchEvent {
            timestamp,
            kind,
            description,
            reveal,
            highlight,
        });
    }

    pub fn events(&self) -> &[MatchEvent] {
        &self.events
    }

    pub fn drain(&mut self) -> Vec<MatchEvent> {
        std::mem::take(&mut self.events)
    }

    pub fn len(&self) -> usize {
        self.events.len()
    }

    pub fn is_empty(&self) -> bool {
        self.events.is_empty()
    }
}

/// Upper-case the first letter, e.g. for "Ant placed!"
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
