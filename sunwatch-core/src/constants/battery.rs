//! Battery and State-of-Charge Defaults
//!
//! Rates are expressed per second so they hold under any tick cadence.

// ===== CAPACITY =====

/// Usable capacity assumed when the host reports none (Wh).
///
/// One 18650 cell: 3.6 V x 2.6 Ah, derated to ~9.4 Wh.
pub const DEFAULT_CAPACITY_WH: f32 = 9.4;

/// Floor for the usable capacity divisor (Wh).
pub const MIN_CAPACITY_WH: f32 = 0.5;

// ===== VOLTAGE WINDOWS =====

/// Single Li-ion cell resting voltage at 0% SoC (V).
pub const LI_ION_EMPTY_V: f32 = 3.30;

/// Single Li-ion cell resting voltage at 100% SoC (V).
pub const LI_ION_FULL_V: f32 = 4.15;

/// Single LiFePO4 cell resting voltage at 0% SoC (V).
pub const LIFEPO4_EMPTY_V: f32 = 3.00;

/// Single LiFePO4 cell resting voltage at 100% SoC (V).
pub const LIFEPO4_FULL_V: f32 = 3.40;

/// 12 V flooded lead-acid resting voltage at 0% SoC (V).
pub const LEAD_ACID_EMPTY_V: f32 = 11.80;

/// 12 V flooded lead-acid resting voltage at 100% SoC (V).
pub const LEAD_ACID_FULL_V: f32 = 12.70;

// ===== INITIAL ESTIMATE =====

/// SoC assumed before any evidence arrives.
pub const INITIAL_SOC: f32 = 0.5;

/// Confidence in [`INITIAL_SOC`].
pub const INITIAL_CONFIDENCE: f32 = 0.3;

// ===== VOLTAGE ANCHOR =====

/// Continuous idle time required before the voltage anchor is trusted (s).
///
/// Resting voltage needs a few minutes to recover from load sag.
pub const IDLE_ANCHOR_S: f32 = 300.0;

/// Minimum channel quality for anchoring.
pub const ANCHOR_QUALITY_FLOOR: f32 = 0.6;

/// Anchor correction gain per second, scaled by confidence.
pub const ANCHOR_GAIN_PER_S: f32 = 0.01;

/// Largest fraction of the SoC error corrected in a single tick.
pub const ANCHOR_GAIN_CEILING: f32 = 0.05;

// ===== CONFIDENCE =====

/// Confidence gained per second while idle, stable and healthy.
pub const CONFIDENCE_UP_PER_S: f32 = 0.002;

/// Confidence lost per second while unstable or low quality.
pub const CONFIDENCE_DOWN_PER_S: f32 = 0.004;

/// Confidence lost per second while the power state is MIXED.
pub const CONFIDENCE_MIXED_DECAY_PER_S: f32 = 0.0005;

/// Input raw/EMA deviation beyond which the channel is unstable (W).
pub const INSTABILITY_W: f32 = 0.25;

/// Quality below which confidence is withdrawn.
pub const LOW_QUALITY_FLOOR: f32 = 0.3;
