//! Skirmish defaults - all tunable values in one place
//!
//! These feed `SkirmishConfig::default()`; a roster file overrides them.

// Battlefield layout (world units). Each faction owns one half of the
// plane, minus a neutral strip along the centre line.
pub const FIELD_HALF_WIDTH: f32 = 100.0;
pub const FIELD_HALF_DEPTH: f32 = 50.0;
pub const NEUTRAL_HALF_WIDTH: f32 = 2.0;

// Combat
pub const ATTACK_RANGE: f32 = 1.5;
pub const ATTACK_INTERVAL_MS: u64 = 0; // attack every tick while in range
pub const STEP_DISTANCE: f32 = 0.1; // per tick

// Economy
pub const STARTING_GOLD: u32 = 500;
pub const BULK_PROCURE_ATTEMPTS: u32 = 50;
pub const TRICKLE_PROCURE_ATTEMPTS: u32 = 5;

// Payouts
pub const WIN_BONUS: u32 = 500;
pub const PER_SURVIVOR_BONUS: u32 = 5;
pub const CONSOLATION_BONUS: u32 = 500;
