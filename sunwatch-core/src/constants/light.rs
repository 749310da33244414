//! Day/Night Learner Defaults
//!
//! The light scalar is unit-agnostic (lux, raw ADC counts, or W/m^2 all work)
//! because thresholds are derived from the learned envelope.

// ===== SMOOTHING =====

/// Time constant of the light EMA (seconds).
pub const LIGHT_EMA_TAU_S: f32 = 90.0;

/// Time constant of the night-base EMA (seconds).
pub const BASE_EMA_TAU_S: f32 = 1800.0;

/// Time constant of the day-peak EMA (seconds).
pub const PEAK_EMA_TAU_S: f32 = 1800.0;

/// Proportional decay of the peak toward the base, per elapsed hour.
///
/// Lets the envelope follow the seasons instead of latching onto one
/// exceptional summer noon.
pub const PEAK_DECAY_PER_HOUR: f32 = 0.02;

// ===== ENVELOPE =====

/// Night base assumed before learning.
pub const INITIAL_BASE: f32 = 2.0;

/// Day peak assumed before learning.
pub const INITIAL_PEAK: f32 = 1000.0;

/// Upper clamp of the night base.
pub const BASE_MAX: f32 = 50.0;

/// Minimum gap kept between peak and base.
pub const MIN_ENVELOPE_SPREAD: f32 = 1.0;

/// Spread needed, once a dusk has been observed, before the learned sunset
/// is published.
pub const SUNSET_PUBLISH_SPREAD: f32 = 50.0;

/// Entry threshold position inside the envelope (night -> day).
pub const ENTRY_FRACTION: f32 = 0.12;

/// Exit threshold position inside the envelope (day -> night).
pub const EXIT_FRACTION: f32 = 0.08;

// ===== HYSTERESIS =====

/// Dwell on the far side of a threshold before the flag flips (seconds).
pub const CONFIRM_DWELL_S: f32 = 420.0;

// ===== SUNSET LEARNING =====

/// End-of-day minute assumed before the first observed sunset (18:00).
pub const INITIAL_END_MINUTE: f32 = 1080.0;

/// EMA weight of each observed sunset.
pub const END_MINUTE_RATE: f32 = 0.2;

/// Largest shift of the learned minute per transition (minutes).
pub const END_MINUTE_MAX_STEP: f32 = 60.0;
