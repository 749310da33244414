//! Constants for Sunwatch Core
//!
//! Every default tunable lives here with its unit and intent, so the config
//! structs never carry magic numbers.
//!
//! ## Organization
//!
//! - **Time**: unit conversions and tick-cadence limits
//! - **Power**: channel smoothing, noise model, quality, deadband, path
//! - **Battery**: capacity, chemistry voltage windows, anchor and confidence
//! - **Light**: day/night envelope, hysteresis and sunset learning
//!
//! Names carry their unit suffix (`_S`, `_W`, `_V`, `_WH`, `_MS`).

/// Time-related constants for unit conversion and tick cadence.
pub mod time;

/// Power channel, deadband and classifier defaults.
pub mod power;

/// Battery capacity, voltage windows and state-of-charge defaults.
pub mod battery;

/// Day/night envelope and sunset-learning defaults.
pub mod light;

pub use time::{
    MS_PER_SECOND, MS_PER_MINUTE, MS_PER_HOUR, SECONDS_PER_HOUR,
    MINUTES_PER_DAY, DEFAULT_ELAPSED_MS, MAX_TICK_DT_S,
};

pub use power::{
    POWER_EMA_TAU_S, DEADBAND_MIN_W, DEADBAND_NOISE_MULTIPLIER,
    PATH_ACTIVE_W, PATH_MARGIN_W, ROLLING_BUCKETS, MAX_ROLLING_BUCKETS,
};

pub use battery::{DEFAULT_CAPACITY_WH, MIN_CAPACITY_WH, IDLE_ANCHOR_S};

pub use light::{LIGHT_EMA_TAU_S, CONFIRM_DWELL_S};
