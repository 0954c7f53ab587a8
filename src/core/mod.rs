pub mod config;
pub mod error;
pub mod types;

pub use config::SkirmishConfig;
pub use error::{Result, SkirmishError};
pub use types::{CategoryId, Faction, Timestamp, UnitId, Vec2};
