//! Time-Related Constants
//!
//! Conversion factors and tick-cadence limits shared by both estimation
//! pipelines.

// ===== TIME UNIT CONVERSIONS =====

/// Milliseconds per second.
pub const MS_PER_SECOND: u64 = 1000;

/// Seconds per minute.
pub const SECONDS_PER_MINUTE: u32 = 60;

/// Minutes per hour.
pub const MINUTES_PER_HOUR: u32 = 60;

/// Hours per day.
pub const HOURS_PER_DAY: u32 = 24;

/// Seconds per hour.
pub const SECONDS_PER_HOUR: u32 = SECONDS_PER_MINUTE * MINUTES_PER_HOUR;

/// Minutes per day.
pub const MINUTES_PER_DAY: u32 = MINUTES_PER_HOUR * HOURS_PER_DAY;

/// Milliseconds per minute.
pub const MS_PER_MINUTE: u64 = MS_PER_SECOND * SECONDS_PER_MINUTE as u64;

/// Milliseconds per hour.
pub const MS_PER_HOUR: u64 = MS_PER_MINUTE * MINUTES_PER_HOUR as u64;

// ===== TICK CADENCE =====

/// Elapsed time assumed when the host does not report one (milliseconds).
///
/// Matches the 1 Hz poll loop most hosts run.
pub const DEFAULT_ELAPSED_MS: u64 = 1000;

/// Upper bound applied to a single tick's elapsed time (seconds).
///
/// A process suspend or clock jump would otherwise inject one huge step
/// into every EMA and integrator. Hosts poll every 1-5 s, so anything
/// beyond this is treated as a pause, not as measured elapsed time.
pub const MAX_TICK_DT_S: f32 = 5.0;
