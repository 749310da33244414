//! Power Channel Tracker
//!
//! One [`PowerChannel`] per physical channel (panel input, load output).
//! Each tick a channel:
//!
//! 1. Stores the raw reading, coercing negative power to zero
//! 2. Smooths power with a continuous-time EMA (`τ ≈ 20 s`)
//! 3. Learns its idle-noise floor, *only* when both channels look idle
//! 4. Scores signal quality and smooths the score (`τ ≈ 10 s`)
//!
//! ## Signal Quality
//!
//! ```text
//! scale   = base + fraction·|ema|
//! q_raw   = exp(−|raw − ema| / scale)
//!         × low_factor  if noise > low_w   (× high_factor if noise > high_w)
//!         × 0.7         if raw > 1.25·max  (× 0.4 if raw > 1.6·max)
//! quality = EMA(q_raw)
//! ```
//!
//! The noise tiers come from [`EstimatorConfig`]. The floor only learns
//! from idle-candidate readings, so useful tiers sit below
//! `idle_candidate_w`.
//!
//! Negative power is treated as a shunt-offset artifact, never as reverse
//! flow: direction is encoded by *which* channel carries the power.

use libm::{expf, fabsf};

use crate::{
    config::EstimatorConfig,
    constants::power::{
        OVER_RANGE_HARD_FACTOR, OVER_RANGE_HARD_MULTIPLIER, OVER_RANGE_SOFT_FACTOR,
        OVER_RANGE_SOFT_MULTIPLIER,
    },
    filter::{ema_step, Ema},
};

/// One instantaneous channel reading as reported by the device model
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelReading {
    /// Power (W); negative or non-finite readings count as 0
    pub power_w: f32,
    /// Voltage (V); non-finite readings keep the previous value
    pub voltage_v: f32,
    /// Current (A); non-finite readings keep the previous value
    pub current_a: f32,
}

impl ChannelReading {
    /// Full reading
    pub const fn new(power_w: f32, voltage_v: f32, current_a: f32) -> Self {
        Self {
            power_w,
            voltage_v,
            current_a,
        }
    }

    /// Power-only reading; voltage and current keep their previous values
    pub const fn power(power_w: f32) -> Self {
        Self {
            power_w,
            voltage_v: f32::NAN,
            current_a: f32::NAN,
        }
    }
}

/// Coerce a power reading to a finite, non-negative value
pub fn coerce_power(power_w: f32) -> f32 {
    if power_w.is_finite() && power_w > 0.0 {
        power_w
    } else {
        0.0
    }
}

/// Smoothed state of one physical power channel
#[derive(Debug, Clone, PartialEq)]
pub struct PowerChannel {
    raw_w: f32,
    ema_w: Ema,
    noise_floor_w: f32,
    quality: Ema,
    voltage_v: f32,
    current_a: f32,
}

impl PowerChannel {
    /// Fresh channel using the configured time constants
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            raw_w: 0.0,
            ema_w: Ema::new(0.0, config.power_tau_s),
            noise_floor_w: 0.0,
            quality: Ema::new(1.0, config.quality_tau_s),
            voltage_v: 0.0,
            current_a: 0.0,
        }
    }

    /// Store the raw sample and advance the power EMA
    pub fn observe(&mut self, reading: &ChannelReading, dt_s: f32) {
        self.raw_w = coerce_power(reading.power_w);
        if reading.voltage_v.is_finite() {
            self.voltage_v = reading.voltage_v;
        }
        if reading.current_a.is_finite() {
            self.current_a = reading.current_a;
        }
        self.ema_w.update(self.raw_w, dt_s);
    }

    /// Advance the idle-noise floor toward `|raw|`
    ///
    /// Callers only invoke this on idle-candidate ticks.
    pub fn learn_noise(&mut self, dt_s: f32, config: &EstimatorConfig) {
        let floor = ema_step(self.noise_floor_w, fabsf(self.raw_w), dt_s, config.noise_tau_s);
        self.noise_floor_w = floor.clamp(0.0, config.noise_floor_max_w);
    }

    /// Score this tick's signal quality and fold it into the smoothed score
    pub fn score_quality(&mut self, dt_s: f32, config: &EstimatorConfig) -> f32 {
        let raw_quality = self.instant_quality(config);
        self.quality.update(raw_quality, dt_s);
        self.quality.set(self.quality.value().clamp(0.0, 1.0));
        self.quality.value()
    }

    fn instant_quality(&self, config: &EstimatorConfig) -> f32 {
        let ema = self.ema_w.value();
        let scale = config.quality_scale_base_w + config.quality_scale_fraction * fabsf(ema);
        let mut quality = expf(-fabsf(self.raw_w - ema) / scale);

        if self.noise_floor_w > config.noise_penalty_high_w {
            quality *= config.noise_penalty_high_factor;
        } else if self.noise_floor_w > config.noise_penalty_low_w {
            quality *= config.noise_penalty_low_factor;
        }

        if self.raw_w > config.channel_max_w * OVER_RANGE_HARD_MULTIPLIER {
            quality *= OVER_RANGE_HARD_FACTOR;
        } else if self.raw_w > config.channel_max_w * OVER_RANGE_SOFT_MULTIPLIER {
            quality *= OVER_RANGE_SOFT_FACTOR;
        }

        quality.clamp(0.0, 1.0)
    }

    /// Latest coerced raw power (W)
    pub fn raw_w(&self) -> f32 {
        self.raw_w
    }

    /// Smoothed power (W)
    pub fn ema_w(&self) -> f32 {
        self.ema_w.value()
    }

    /// Learned idle-noise floor (W)
    pub fn noise_floor_w(&self) -> f32 {
        self.noise_floor_w
    }

    /// Smoothed signal quality in [0, 1]
    pub fn quality(&self) -> f32 {
        self.quality.value()
    }

    /// Last finite voltage reading (V)
    pub fn voltage_v(&self) -> f32 {
        self.voltage_v
    }

    /// Last finite current reading (A)
    pub fn current_a(&self) -> f32 {
        self.current_a
    }

    /// Absolute raw/EMA deviation (W)
    pub fn deviation_w(&self) -> f32 {
        fabsf(self.raw_w - self.ema_w.value())
    }

    /// Read-only snapshot for publishing
    pub fn summary(&self) -> ChannelSummary {
        ChannelSummary {
            raw_w: self.raw_w,
            ema_w: self.ema_w(),
            noise_floor_w: self.noise_floor_w,
            quality: self.quality(),
            voltage_v: self.voltage_v,
            current_a: self.current_a,
        }
    }
}

/// Published per-channel values
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ChannelSummary {
    /// Latest coerced raw power (W)
    pub raw_w: f32,
    /// Smoothed power (W)
    pub ema_w: f32,
    /// Learned idle-noise floor (W)
    pub noise_floor_w: f32,
    /// Smoothed signal quality in [0, 1]
    pub quality: f32,
    /// Last finite voltage (V)
    pub voltage_v: f32,
    /// Last finite current (A)
    pub current_a: f32,
}

/// Run one tracker step over both channels
///
/// Returns whether the tick was an idle candidate (both raw readings under
/// the idle-candidate threshold), in which case both noise floors learned.
pub fn track_channels(
    input: &mut PowerChannel,
    output: &mut PowerChannel,
    input_reading: &ChannelReading,
    output_reading: &ChannelReading,
    dt_s: f32,
    config: &EstimatorConfig,
) -> bool {
    input.observe(input_reading, dt_s);
    output.observe(output_reading, dt_s);

    let idle_candidate =
        input.raw_w() < config.idle_candidate_w && output.raw_w() < config.idle_candidate_w;
    if idle_candidate {
        input.learn_noise(dt_s, config);
        output.learn_noise(dt_s, config);
    }

    input.score_quality(dt_s, config);
    output.score_quality(dt_s, config);
    idle_candidate
}
