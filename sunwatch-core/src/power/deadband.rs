//! Deadband & Anti-Noise Integrator
//!
//! ## Deadband
//!
//! ```text
//! deadband = max(minimum, K · max(noise_in, noise_out))
//! ```
//!
//! Recomputed every tick from the two learned noise floors. It is derived
//! state, never stored as a source of truth: the noise floors are.
//!
//! ## Integration
//!
//! ```text
//! ΔWh = power · dt / 3600   if power > 0 and power ≥ deadband
//!     = 0                   otherwise
//! ```
//!
//! A shunt that jitters ±20 mW around zero would otherwise integrate a few
//! Wh of phantom energy per day. Gating on the deadband means true idle
//! periods accumulate nothing.

use crate::{
    config::EstimatorConfig,
    constants::time::SECONDS_PER_HOUR,
    traits::DayKey,
};

/// Dynamic noise threshold from both channels' noise floors (W)
///
/// Never below the configured minimum, non-decreasing in either floor.
pub fn deadband_w(noise_in_w: f32, noise_out_w: f32, config: &EstimatorConfig) -> f32 {
    let noise = noise_in_w.max(noise_out_w);
    let scaled = config.deadband_multiplier * noise;
    if scaled.is_finite() {
        scaled.max(config.deadband_min_w)
    } else {
        config.deadband_min_w
    }
}

/// Energy contributed by one channel over one tick (Wh)
pub fn integrate_wh(power_w: f32, dt_s: f32, deadband_w: f32) -> f32 {
    if power_w > 0.0 && power_w >= deadband_w && dt_s > 0.0 {
        power_w * dt_s / SECONDS_PER_HOUR as f32
    } else {
        0.0
    }
}

/// Today's energy accumulators, keyed on the reference-timezone day
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergyTotals {
    day_key: Option<DayKey>,
    wh_in: f32,
    wh_out: f32,
}

impl EnergyTotals {
    /// Empty totals with no day assigned yet
    pub const fn new() -> Self {
        Self {
            day_key: None,
            wh_in: 0.0,
            wh_out: 0.0,
        }
    }

    /// Move to `day_key`, zeroing the totals if the day changed
    ///
    /// Returns `true` only when an existing day rolled over; the first call
    /// just adopts the key.
    pub fn roll_to(&mut self, day_key: DayKey) -> bool {
        match self.day_key {
            Some(current) if current == day_key => false,
            Some(_) => {
                self.day_key = Some(day_key);
                self.wh_in = 0.0;
                self.wh_out = 0.0;
                true
            }
            None => {
                self.day_key = Some(day_key);
                false
            }
        }
    }

    /// Add one tick's integrated energy
    pub fn accumulate(&mut self, wh_in: f32, wh_out: f32) {
        self.wh_in += wh_in;
        self.wh_out += wh_out;
    }

    /// Current day key, if any tick has run
    pub fn day_key(&self) -> Option<DayKey> {
        self.day_key
    }

    /// Energy in today (Wh)
    pub fn wh_in(&self) -> f32 {
        self.wh_in
    }

    /// Energy out today (Wh)
    pub fn wh_out(&self) -> f32 {
        self.wh_out
    }

    /// Net energy today (Wh)
    pub fn wh_net(&self) -> f32 {
        self.wh_in - self.wh_out
    }
}
