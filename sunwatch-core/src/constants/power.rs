//! Power Channel, Deadband and Classification Defaults
//!
//! Every tunable used by the power half of the estimator. Values assume a
//! small solar node: a panel in the single-digit watt range and a load that
//! idles in the tens of milliwatts.

// ===== CHANNEL SMOOTHING =====

/// Time constant of the per-channel power EMA (seconds).
///
/// Long enough to flatten MPPT hunting and PWM ripple, short enough that a
/// cloud edge shows up within a minute.
pub const POWER_EMA_TAU_S: f32 = 20.0;

/// Time constant applied to the raw signal-quality score (seconds).
pub const QUALITY_EMA_TAU_S: f32 = 10.0;

/// Time constant of the idle-noise-floor EMA (seconds).
pub const NOISE_EMA_TAU_S: f32 = 60.0;

// ===== IDLE NOISE MODEL =====

/// Both channels must read below this before the noise floor learns (W).
///
/// Keeps genuine charge/discharge flow out of the noise model.
pub const IDLE_CANDIDATE_W: f32 = 0.08;

/// Upper clamp of the learned noise floor (W).
pub const NOISE_FLOOR_MAX_W: f32 = 5.0;

// ===== SIGNAL QUALITY =====

/// Minimum deviation scale used by the quality score (W).
pub const QUALITY_SCALE_BASE_W: f32 = 0.05;

/// Fraction of the EMA magnitude added to the quality scale.
///
/// A 10 W channel tolerates proportionally more ripple than a 0.1 W one.
pub const QUALITY_SCALE_FRACTION: f32 = 0.15;

/// Noise floor above which quality takes the first penalty (W).
///
/// The floor only learns from idle-candidate readings, so both tiers sit
/// below [`IDLE_CANDIDATE_W`].
pub const NOISE_PENALTY_LOW_W: f32 = 0.02;

/// Multiplier applied past [`NOISE_PENALTY_LOW_W`].
pub const NOISE_PENALTY_LOW_FACTOR: f32 = 0.85;

/// Noise floor above which quality takes the heavy penalty (W).
pub const NOISE_PENALTY_HIGH_W: f32 = 0.05;

/// Multiplier applied past [`NOISE_PENALTY_HIGH_W`].
pub const NOISE_PENALTY_HIGH_FACTOR: f32 = 0.6;

/// Largest power either channel can physically carry (W).
///
/// Panel STC rating for the input side; the output side shares it by default.
pub const CHANNEL_MAX_W: f32 = 20.0;

/// Raw readings above `CHANNEL_MAX_W` times this are suspicious.
pub const OVER_RANGE_SOFT_MULTIPLIER: f32 = 1.25;

/// Quality multiplier for a suspicious over-range reading.
pub const OVER_RANGE_SOFT_FACTOR: f32 = 0.7;

/// Raw readings above `CHANNEL_MAX_W` times this are implausible.
pub const OVER_RANGE_HARD_MULTIPLIER: f32 = 1.6;

/// Quality multiplier for an implausible over-range reading.
pub const OVER_RANGE_HARD_FACTOR: f32 = 0.4;

// ===== DEADBAND =====

/// Floor of the dynamic deadband (W).
pub const DEADBAND_MIN_W: f32 = 0.05;

/// Multiple of the learned noise floor used as the deadband.
pub const DEADBAND_NOISE_MULTIPLIER: f32 = 3.0;

// ===== POWER PATH =====

/// Activity threshold for the power-path classifier (W).
pub const PATH_ACTIVE_W: f32 = 0.05;

/// Hysteresis margin separating "input dominates" from "balanced" (W).
pub const PATH_MARGIN_W: f32 = 0.1;

// ===== ROLLING WINDOW =====

/// Default number of hourly buckets in the rolling window.
pub const ROLLING_BUCKETS: usize = 24;

/// Storage capacity of the rolling window; configured counts are capped here.
pub const MAX_ROLLING_BUCKETS: usize = 48;
