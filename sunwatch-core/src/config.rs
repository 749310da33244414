//! Estimator Configuration
//!
//! Two plain configuration structs, one per pipeline:
//!
//! - [`EstimatorConfig`] - power channels, deadband, classifier, rolling
//!   window and state-of-charge tunables
//! - [`DayNightConfig`] - light smoothing, envelope learning, hysteresis and
//!   sunset learning tunables
//!
//! Every field defaults to the documented value in [`crate::constants`].
//! With the `serde` feature both structs deserialize from partial documents,
//! missing fields falling back to their defaults:
//!
//! ```rust
//! # #[cfg(feature = "serde")] {
//! use sunwatch_core::EstimatorConfig;
//!
//! let config: EstimatorConfig = serde_json::from_str(r#"{ "deadband_min_w": 0.1 }"#).unwrap();
//! assert_eq!(config.deadband_min_w, 0.1);
//! assert_eq!(config.rolling_buckets, 24);
//! # }
//! ```
//!
//! ## Degenerate Values
//!
//! `validate()` reports the first problem it finds. Estimators built with
//! `new` never refuse a configuration: they run `sanitized()` first, which
//! clamps each degenerate value to a safe minimum (so a zero capacity can
//! never become a division by zero).

use crate::{
    constants::{battery, light, power, time},
    errors::{check_bounds, check_gap, check_ordered, check_positive, ConfigError, ConfigResult},
};

/// Battery chemistry, selecting the resting-voltage window for the anchor
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub enum BatteryChemistry {
    /// Single Li-ion / Li-polymer cell
    LithiumIon,
    /// Single lithium iron phosphate cell
    LiFePo4,
    /// 12 V flooded lead-acid bank
    LeadAcid12V,
    /// Explicit resting-voltage window
    Custom {
        /// Resting voltage at 0% SoC
        low_v: f32,
        /// Resting voltage at 100% SoC
        high_v: f32,
    },
}

impl BatteryChemistry {
    /// Resting-voltage window `(empty, full)` in volts
    pub const fn voltage_window(&self) -> (f32, f32) {
        match self {
            BatteryChemistry::LithiumIon => (battery::LI_ION_EMPTY_V, battery::LI_ION_FULL_V),
            BatteryChemistry::LiFePo4 => (battery::LIFEPO4_EMPTY_V, battery::LIFEPO4_FULL_V),
            BatteryChemistry::LeadAcid12V => {
                (battery::LEAD_ACID_EMPTY_V, battery::LEAD_ACID_FULL_V)
            }
            BatteryChemistry::Custom { low_v, high_v } => (*low_v, *high_v),
        }
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for BatteryChemistry {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::LithiumIon => defmt::write!(fmt, "LithiumIon"),
            Self::LiFePo4 => defmt::write!(fmt, "LiFePo4"),
            Self::LeadAcid12V => defmt::write!(fmt, "LeadAcid12V"),
            Self::Custom { low_v, high_v } => {
                defmt::write!(fmt, "Custom {{ low_v: {}, high_v: {} }}", low_v, high_v)
            }
        }
    }
}

impl Default for BatteryChemistry {
    fn default() -> Self {
        BatteryChemistry::LithiumIon
    }
}

/// Tunables for the power/charge estimator
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct EstimatorConfig {
    /// Per-channel power EMA time constant (s)
    pub power_tau_s: f32,
    /// Signal-quality smoothing time constant (s)
    pub quality_tau_s: f32,
    /// Idle-noise-floor EMA time constant (s)
    pub noise_tau_s: f32,
    /// Both channels below this make the tick an idle candidate (W)
    pub idle_candidate_w: f32,
    /// Upper clamp of the learned noise floor (W)
    pub noise_floor_max_w: f32,
    /// Minimum quality deviation scale (W)
    pub quality_scale_base_w: f32,
    /// Quality scale growth per watt of EMA
    pub quality_scale_fraction: f32,
    /// Noise floor past which quality takes the light penalty (W)
    pub noise_penalty_low_w: f32,
    /// Quality multiplier past the light penalty tier
    pub noise_penalty_low_factor: f32,
    /// Noise floor past which quality takes the heavy penalty (W)
    pub noise_penalty_high_w: f32,
    /// Quality multiplier past the heavy penalty tier
    pub noise_penalty_high_factor: f32,
    /// Largest physically possible channel power (W)
    pub channel_max_w: f32,
    /// Deadband floor (W)
    pub deadband_min_w: f32,
    /// Deadband multiple of the noise floor
    pub deadband_multiplier: f32,
    /// Power-path activity threshold (W)
    pub path_active_w: f32,
    /// Power-path hysteresis margin (W)
    pub path_margin_w: f32,
    /// Hourly buckets kept in the rolling window
    pub rolling_buckets: usize,
    /// Battery chemistry for the voltage anchor
    pub chemistry: BatteryChemistry,
    /// Usable capacity when the host reports none (Wh)
    pub capacity_wh: f32,
    /// Floor for the capacity divisor (Wh)
    pub min_capacity_wh: f32,
    /// Idle dwell before the voltage anchor engages (s)
    pub idle_anchor_s: f32,
    /// Minimum channel quality for anchoring
    pub anchor_quality_floor: f32,
    /// Anchor gain per second
    pub anchor_gain_per_s: f32,
    /// Anchor gain ceiling per tick
    pub anchor_gain_ceiling: f32,
    /// Confidence gain per second while idle and healthy
    pub confidence_up_per_s: f32,
    /// Confidence loss per second while unstable or low quality
    pub confidence_down_per_s: f32,
    /// Confidence loss per second while power state is MIXED
    pub confidence_mixed_decay_per_s: f32,
    /// Input raw/EMA deviation marking the tick unstable (W)
    pub instability_w: f32,
    /// Quality below which confidence is withdrawn
    pub low_quality_floor: f32,
    /// Initial SoC estimate
    pub initial_soc: f32,
    /// Initial SoC confidence
    pub initial_confidence: f32,
    /// Largest elapsed time accepted for one tick (s)
    pub max_dt_s: f32,
}

impl Default for EstimatorConfig {
    fn default() -> Self {
        Self {
            power_tau_s: power::POWER_EMA_TAU_S,
            quality_tau_s: power::QUALITY_EMA_TAU_S,
            noise_tau_s: power::NOISE_EMA_TAU_S,
            idle_candidate_w: power::IDLE_CANDIDATE_W,
            noise_floor_max_w: power::NOISE_FLOOR_MAX_W,
            quality_scale_base_w: power::QUALITY_SCALE_BASE_W,
            quality_scale_fraction: power::QUALITY_SCALE_FRACTION,
            noise_penalty_low_w: power::NOISE_PENALTY_LOW_W,
            noise_penalty_low_factor: power::NOISE_PENALTY_LOW_FACTOR,
            noise_penalty_high_w: power::NOISE_PENALTY_HIGH_W,
            noise_penalty_high_factor: power::NOISE_PENALTY_HIGH_FACTOR,
            channel_max_w: power::CHANNEL_MAX_W,
            deadband_min_w: power::DEADBAND_MIN_W,
            deadband_multiplier: power::DEADBAND_NOISE_MULTIPLIER,
            path_active_w: power::PATH_ACTIVE_W,
            path_margin_w: power::PATH_MARGIN_W,
            rolling_buckets: power::ROLLING_BUCKETS,
            chemistry: BatteryChemistry::default(),
            capacity_wh: battery::DEFAULT_CAPACITY_WH,
            min_capacity_wh: battery::MIN_CAPACITY_WH,
            idle_anchor_s: battery::IDLE_ANCHOR_S,
            anchor_quality_floor: battery::ANCHOR_QUALITY_FLOOR,
            anchor_gain_per_s: battery::ANCHOR_GAIN_PER_S,
            anchor_gain_ceiling: battery::ANCHOR_GAIN_CEILING,
            confidence_up_per_s: battery::CONFIDENCE_UP_PER_S,
            confidence_down_per_s: battery::CONFIDENCE_DOWN_PER_S,
            confidence_mixed_decay_per_s: battery::CONFIDENCE_MIXED_DECAY_PER_S,
            instability_w: battery::INSTABILITY_W,
            low_quality_floor: battery::LOW_QUALITY_FLOOR,
            initial_soc: battery::INITIAL_SOC,
            initial_confidence: battery::INITIAL_CONFIDENCE,
            max_dt_s: time::MAX_TICK_DT_S,
        }
    }
}

impl EstimatorConfig {
    /// Set the power EMA time constant
    pub fn with_power_tau_s(mut self, tau_s: f32) -> Self {
        self.power_tau_s = tau_s;
        self
    }

    /// Set the deadband floor and noise multiplier
    pub fn with_deadband(mut self, min_w: f32, multiplier: f32) -> Self {
        self.deadband_min_w = min_w;
        self.deadband_multiplier = multiplier;
        self
    }

    /// Set the two noise-floor quality penalty tiers
    ///
    /// A learned floor above `low_w` multiplies quality by `low_factor`;
    /// above `high_w` by `high_factor` instead.
    pub fn with_noise_penalty(
        mut self,
        low_w: f32,
        low_factor: f32,
        high_w: f32,
        high_factor: f32,
    ) -> Self {
        self.noise_penalty_low_w = low_w;
        self.noise_penalty_low_factor = low_factor;
        self.noise_penalty_high_w = high_w;
        self.noise_penalty_high_factor = high_factor;
        self
    }

    /// Set the power-path threshold and hysteresis margin
    pub fn with_path_thresholds(mut self, active_w: f32, margin_w: f32) -> Self {
        self.path_active_w = active_w;
        self.path_margin_w = margin_w;
        self
    }

    /// Set the battery chemistry
    pub fn with_chemistry(mut self, chemistry: BatteryChemistry) -> Self {
        self.chemistry = chemistry;
        self
    }

    /// Set the default usable capacity
    pub fn with_capacity_wh(mut self, capacity_wh: f32) -> Self {
        self.capacity_wh = capacity_wh;
        self
    }

    /// Set the idle dwell before anchoring
    pub fn with_idle_anchor_s(mut self, idle_s: f32) -> Self {
        self.idle_anchor_s = idle_s;
        self
    }

    /// Set the rolling window length in hourly buckets
    pub fn with_rolling_buckets(mut self, buckets: usize) -> Self {
        self.rolling_buckets = buckets;
        self
    }

    /// Set the starting SoC estimate and confidence
    pub fn with_initial_soc(mut self, soc: f32, confidence: f32) -> Self {
        self.initial_soc = soc;
        self.initial_confidence = confidence;
        self
    }

    /// Report the first invalid field
    pub fn validate(&self) -> ConfigResult<()> {
        check_positive("power_tau_s", self.power_tau_s)?;
        check_positive("quality_tau_s", self.quality_tau_s)?;
        check_positive("noise_tau_s", self.noise_tau_s)?;
        check_positive("idle_candidate_w", self.idle_candidate_w)?;
        check_positive("noise_floor_max_w", self.noise_floor_max_w)?;
        check_positive("quality_scale_base_w", self.quality_scale_base_w)?;
        check_bounds("quality_scale_fraction", self.quality_scale_fraction, 0.0, 10.0)?;
        check_positive("noise_penalty_low_w", self.noise_penalty_low_w)?;
        check_ordered("noise_penalty_tiers", self.noise_penalty_low_w, self.noise_penalty_high_w)?;
        check_bounds("noise_penalty_low_factor", self.noise_penalty_low_factor, 0.0, 1.0)?;
        check_bounds("noise_penalty_high_factor", self.noise_penalty_high_factor, 0.0, 1.0)?;
        check_positive("channel_max_w", self.channel_max_w)?;
        check_positive("deadband_min_w", self.deadband_min_w)?;
        check_bounds("deadband_multiplier", self.deadband_multiplier, 0.0, 100.0)?;
        check_positive("path_active_w", self.path_active_w)?;
        check_positive("path_margin_w", self.path_margin_w)?;

        if self.rolling_buckets == 0 || self.rolling_buckets > power::MAX_ROLLING_BUCKETS {
            return Err(ConfigError::CapacityExceeded {
                requested: self.rolling_buckets,
                max: power::MAX_ROLLING_BUCKETS,
            });
        }

        let (low_v, high_v) = self.chemistry.voltage_window();
        check_ordered("chemistry", low_v, high_v)?;
        check_positive("capacity_wh", self.capacity_wh)?;
        check_positive("min_capacity_wh", self.min_capacity_wh)?;
        check_bounds("idle_anchor_s", self.idle_anchor_s, 0.0, f32::MAX)?;
        check_bounds("anchor_quality_floor", self.anchor_quality_floor, 0.0, 1.0)?;
        check_bounds("anchor_gain_per_s", self.anchor_gain_per_s, 0.0, 1.0)?;
        check_bounds("anchor_gain_ceiling", self.anchor_gain_ceiling, 0.0, 1.0)?;
        check_bounds("confidence_up_per_s", self.confidence_up_per_s, 0.0, 1.0)?;
        check_bounds("confidence_down_per_s", self.confidence_down_per_s, 0.0, 1.0)?;
        check_bounds(
            "confidence_mixed_decay_per_s",
            self.confidence_mixed_decay_per_s,
            0.0,
            1.0,
        )?;
        check_positive("instability_w", self.instability_w)?;
        check_bounds("low_quality_floor", self.low_quality_floor, 0.0, 1.0)?;
        check_bounds("initial_soc", self.initial_soc, 0.0, 1.0)?;
        check_bounds("initial_confidence", self.initial_confidence, 0.0, 1.0)?;
        check_positive("max_dt_s", self.max_dt_s)?;
        Ok(())
    }

    /// Clamp degenerate values to safe minimums
    ///
    /// Fields that are already valid are left untouched, so
    /// `config.sanitized() == config` whenever `config.validate()` passes.
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        self.power_tau_s = positive_or(self.power_tau_s, defaults.power_tau_s);
        self.quality_tau_s = positive_or(self.quality_tau_s, defaults.quality_tau_s);
        self.noise_tau_s = positive_or(self.noise_tau_s, defaults.noise_tau_s);
        self.idle_candidate_w = positive_or(self.idle_candidate_w, defaults.idle_candidate_w);
        self.noise_floor_max_w = positive_or(self.noise_floor_max_w, defaults.noise_floor_max_w);
        self.quality_scale_base_w =
            positive_or(self.quality_scale_base_w, defaults.quality_scale_base_w);
        self.quality_scale_fraction =
            bounded_or(self.quality_scale_fraction, 0.0, 10.0, defaults.quality_scale_fraction);
        let (low_w, high_w) = (self.noise_penalty_low_w, self.noise_penalty_high_w);
        let tiers_valid = check_positive("noise_penalty_low_w", low_w).is_ok()
            && check_ordered("noise_penalty_tiers", low_w, high_w).is_ok();
        if !tiers_valid {
            self.noise_penalty_low_w = defaults.noise_penalty_low_w;
            self.noise_penalty_high_w = defaults.noise_penalty_high_w;
        }
        self.noise_penalty_low_factor =
            unit_or(self.noise_penalty_low_factor, defaults.noise_penalty_low_factor);
        self.noise_penalty_high_factor =
            unit_or(self.noise_penalty_high_factor, defaults.noise_penalty_high_factor);
        self.channel_max_w = positive_or(self.channel_max_w, defaults.channel_max_w);
        self.deadband_min_w = positive_or(self.deadband_min_w, defaults.deadband_min_w);
        self.deadband_multiplier =
            bounded_or(self.deadband_multiplier, 0.0, 100.0, defaults.deadband_multiplier);
        self.path_active_w = positive_or(self.path_active_w, defaults.path_active_w);
        self.path_margin_w = positive_or(self.path_margin_w, defaults.path_margin_w);
        self.rolling_buckets = self.rolling_buckets.clamp(1, power::MAX_ROLLING_BUCKETS);

        let (low_v, high_v) = self.chemistry.voltage_window();
        if check_ordered("chemistry", low_v, high_v).is_err() {
            self.chemistry = defaults.chemistry;
        }
        self.min_capacity_wh = positive_or(self.min_capacity_wh, defaults.min_capacity_wh);
        self.capacity_wh = if self.capacity_wh.is_finite() {
            self.capacity_wh.max(self.min_capacity_wh)
        } else {
            defaults.capacity_wh
        };
        self.idle_anchor_s = bounded_or(self.idle_anchor_s, 0.0, f32::MAX, defaults.idle_anchor_s);
        self.anchor_quality_floor =
            unit_or(self.anchor_quality_floor, defaults.anchor_quality_floor);
        self.anchor_gain_per_s = unit_or(self.anchor_gain_per_s, defaults.anchor_gain_per_s);
        self.anchor_gain_ceiling = unit_or(self.anchor_gain_ceiling, defaults.anchor_gain_ceiling);
        self.confidence_up_per_s = unit_or(self.confidence_up_per_s, defaults.confidence_up_per_s);
        self.confidence_down_per_s =
            unit_or(self.confidence_down_per_s, defaults.confidence_down_per_s);
        self.confidence_mixed_decay_per_s =
            unit_or(self.confidence_mixed_decay_per_s, defaults.confidence_mixed_decay_per_s);
        self.instability_w = positive_or(self.instability_w, defaults.instability_w);
        self.low_quality_floor = unit_or(self.low_quality_floor, defaults.low_quality_floor);
        self.initial_soc = unit_or(self.initial_soc, defaults.initial_soc);
        self.initial_confidence = unit_or(self.initial_confidence, defaults.initial_confidence);
        self.max_dt_s = positive_or(self.max_dt_s, defaults.max_dt_s);
        self
    }
}

/// Tunables for the day/night detector and sunset learner
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct DayNightConfig {
    /// Light EMA time constant (s)
    pub light_tau_s: f32,
    /// Night-base EMA time constant (s)
    pub base_tau_s: f32,
    /// Day-peak EMA time constant (s)
    pub peak_tau_s: f32,
    /// Proportional peak decay per elapsed hour
    pub peak_decay_per_hour: f32,
    /// Initial night base
    pub initial_base: f32,
    /// Initial day peak
    pub initial_peak: f32,
    /// Upper clamp of the night base
    pub base_max: f32,
    /// Minimum peak-base gap
    pub min_spread: f32,
    /// Spread needed before publishing the learned sunset
    pub sunset_publish_spread: f32,
    /// Entry threshold fraction of the envelope
    pub entry_fraction: f32,
    /// Exit threshold fraction of the envelope
    pub exit_fraction: f32,
    /// Confirmation dwell before the flag flips (s)
    pub confirm_dwell_s: f32,
    /// Initial learned end-of-day minute
    pub initial_end_minute: f32,
    /// EMA weight of each observed sunset
    pub end_minute_rate: f32,
    /// Largest learned-minute step per transition
    pub end_minute_max_step: f32,
    /// Largest elapsed time accepted for one tick (s)
    pub max_dt_s: f32,
}

impl Default for DayNightConfig {
    fn default() -> Self {
        Self {
            light_tau_s: light::LIGHT_EMA_TAU_S,
            base_tau_s: light::BASE_EMA_TAU_S,
            peak_tau_s: light::PEAK_EMA_TAU_S,
            peak_decay_per_hour: light::PEAK_DECAY_PER_HOUR,
            initial_base: light::INITIAL_BASE,
            initial_peak: light::INITIAL_PEAK,
            base_max: light::BASE_MAX,
            min_spread: light::MIN_ENVELOPE_SPREAD,
            sunset_publish_spread: light::SUNSET_PUBLISH_SPREAD,
            entry_fraction: light::ENTRY_FRACTION,
            exit_fraction: light::EXIT_FRACTION,
            confirm_dwell_s: light::CONFIRM_DWELL_S,
            initial_end_minute: light::INITIAL_END_MINUTE,
            end_minute_rate: light::END_MINUTE_RATE,
            end_minute_max_step: light::END_MINUTE_MAX_STEP,
            max_dt_s: time::MAX_TICK_DT_S,
        }
    }
}

impl DayNightConfig {
    /// Set the light EMA time constant
    pub fn with_light_tau_s(mut self, tau_s: f32) -> Self {
        self.light_tau_s = tau_s;
        self
    }

    /// Set the confirmation dwell
    pub fn with_confirm_dwell_s(mut self, dwell_s: f32) -> Self {
        self.confirm_dwell_s = dwell_s;
        self
    }

    /// Set the starting envelope
    pub fn with_envelope(mut self, base: f32, peak: f32) -> Self {
        self.initial_base = base;
        self.initial_peak = peak;
        self
    }

    /// Set the entry/exit threshold fractions
    pub fn with_threshold_fractions(mut self, entry: f32, exit: f32) -> Self {
        self.entry_fraction = entry;
        self.exit_fraction = exit;
        self
    }

    /// Report the first invalid field
    pub fn validate(&self) -> ConfigResult<()> {
        check_positive("light_tau_s", self.light_tau_s)?;
        check_positive("base_tau_s", self.base_tau_s)?;
        check_positive("peak_tau_s", self.peak_tau_s)?;
        check_bounds("peak_decay_per_hour", self.peak_decay_per_hour, 0.0, 1.0)?;
        check_bounds("base_max", self.base_max, 0.0, f32::MAX)?;
        check_bounds("initial_base", self.initial_base, 0.0, self.base_max)?;
        check_positive("min_spread", self.min_spread)?;
        check_gap("envelope", self.initial_base, self.initial_peak, self.min_spread)?;
        check_bounds("sunset_publish_spread", self.sunset_publish_spread, 0.0, f32::MAX)?;
        check_bounds("entry_fraction", self.entry_fraction, 0.0, 1.0)?;
        check_bounds("exit_fraction", self.exit_fraction, 0.0, 1.0)?;
        check_ordered("threshold_fractions", self.exit_fraction, self.entry_fraction)?;
        check_bounds("confirm_dwell_s", self.confirm_dwell_s, 0.0, f32::MAX)?;
        check_bounds("initial_end_minute", self.initial_end_minute, 0.0, 1440.0)?;
        check_bounds("end_minute_rate", self.end_minute_rate, 0.0, 1.0)?;
        check_bounds("end_minute_max_step", self.end_minute_max_step, 0.0, 1440.0)?;
        check_positive("max_dt_s", self.max_dt_s)?;
        Ok(())
    }

    /// Clamp degenerate values to safe minimums
    pub fn sanitized(mut self) -> Self {
        let defaults = Self::default();

        self.light_tau_s = positive_or(self.light_tau_s, defaults.light_tau_s);
        self.base_tau_s = positive_or(self.base_tau_s, defaults.base_tau_s);
        self.peak_tau_s = positive_or(self.peak_tau_s, defaults.peak_tau_s);
        self.peak_decay_per_hour = unit_or(self.peak_decay_per_hour, defaults.peak_decay_per_hour);
        self.base_max = bounded_or(self.base_max, 0.0, f32::MAX, defaults.base_max);
        let base_fallback = defaults.initial_base.min(self.base_max);
        self.initial_base = bounded_or(self.initial_base, 0.0, self.base_max, base_fallback);
        self.min_spread = positive_or(self.min_spread, defaults.min_spread);

        let min_peak = self.initial_base + self.min_spread;
        self.initial_peak = if self.initial_peak.is_finite() {
            self.initial_peak.max(min_peak)
        } else {
            defaults.initial_peak.max(min_peak)
        };

        self.sunset_publish_spread = bounded_or(
            self.sunset_publish_spread,
            0.0,
            f32::MAX,
            defaults.sunset_publish_spread,
        );
        self.entry_fraction = unit_or(self.entry_fraction, defaults.entry_fraction);
        self.exit_fraction = unit_or(self.exit_fraction, defaults.exit_fraction);
        if self.exit_fraction >= self.entry_fraction {
            self.entry_fraction = defaults.entry_fraction;
            self.exit_fraction = defaults.exit_fraction;
        }
        self.confirm_dwell_s =
            bounded_or(self.confirm_dwell_s, 0.0, f32::MAX, defaults.confirm_dwell_s);
        self.initial_end_minute =
            bounded_or(self.initial_end_minute, 0.0, 1440.0, defaults.initial_end_minute);
        self.end_minute_rate = unit_or(self.end_minute_rate, defaults.end_minute_rate);
        self.end_minute_max_step =
            bounded_or(self.end_minute_max_step, 0.0, 1440.0, defaults.end_minute_max_step);
        self.max_dt_s = positive_or(self.max_dt_s, defaults.max_dt_s);
        self
    }
}

fn positive_or(value: f32, fallback: f32) -> f32 {
    if value.is_finite() && value > 0.0 {
        value
    } else {
        fallback
    }
}

fn bounded_or(value: f32, min: f32, max: f32, fallback: f32) -> f32 {
    if value.is_finite() {
        value.clamp(min, max)
    } else {
        fallback
    }
}

fn unit_or(value: f32, fallback: f32) -> f32 {
    bounded_or(value, 0.0, 1.0, fallback)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn defaults_are_valid() {
        assert!(EstimatorConfig::default().validate().is_ok());
        assert!(DayNightConfig::default().validate().is_ok());
    }

    #[test]
    fn sanitize_is_identity_on_valid_config() {
        let config = EstimatorConfig::default();
        assert_eq!(config.clone().sanitized(), config);

        let config = DayNightConfig::default();
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn zero_capacity_clamped_to_floor() {
        let config = EstimatorConfig::default().with_capacity_wh(0.0);
        assert!(matches!(
            config.validate(),
            Err(ConfigError::NonPositive { field: "capacity_wh", .. })
        ));

        let sanitized = config.sanitized();
        assert_eq!(sanitized.capacity_wh, sanitized.min_capacity_wh);
        assert!(sanitized.validate().is_ok());
    }

    #[test]
    fn oversized_rolling_window_rejected() {
        let config = EstimatorConfig::default().with_rolling_buckets(1000);
        assert_eq!(
            config.validate(),
            Err(ConfigError::CapacityExceeded {
                requested: 1000,
                max: power::MAX_ROLLING_BUCKETS,
            })
        );
        assert_eq!(config.sanitized().rolling_buckets, power::MAX_ROLLING_BUCKETS);
    }

    #[test]
    fn inverted_chemistry_window_rejected() {
        let config = EstimatorConfig::default()
            .with_chemistry(BatteryChemistry::Custom { low_v: 4.2, high_v: 3.0 });
        assert!(matches!(config.validate(), Err(ConfigError::InvalidRange { .. })));
        assert_eq!(config.sanitized().chemistry, BatteryChemistry::LithiumIon);
    }

    #[test]
    fn exit_above_entry_rejected() {
        let config = DayNightConfig::default().with_threshold_fractions(0.05, 0.10);
        assert!(config.validate().is_err());

        let sanitized = config.sanitized();
        assert!(sanitized.entry_fraction > sanitized.exit_fraction);
        assert!(sanitized.validate().is_ok());
    }

    #[test]
    fn narrow_envelope_rejected_and_clamped_to_min_spread() {
        let config = DayNightConfig::default().with_envelope(2.0, 2.5);
        assert_eq!(
            config.validate(),
            Err(ConfigError::InvalidRange {
                field: "envelope",
                low: 2.0,
                high: 2.5,
            })
        );

        let sanitized = config.sanitized();
        assert_eq!(sanitized.initial_peak, 2.0 + sanitized.min_spread);
        assert!(sanitized.validate().is_ok());
    }

    #[test]
    fn envelope_at_min_spread_is_valid_and_untouched() {
        let config = DayNightConfig::default().with_envelope(2.0, 3.0);
        assert!(config.validate().is_ok());
        assert_eq!(config.clone().sanitized(), config);
    }

    #[test]
    fn noise_penalty_tiers_validated() {
        let config = EstimatorConfig::default();
        assert!(config.noise_penalty_high_w < config.idle_candidate_w);

        let inverted = config.clone().with_noise_penalty(0.05, 0.85, 0.02, 0.6);
        assert!(matches!(
            inverted.validate(),
            Err(ConfigError::InvalidRange { field: "noise_penalty_tiers", .. })
        ));
        let sanitized = inverted.sanitized();
        assert_eq!(sanitized.noise_penalty_low_w, config.noise_penalty_low_w);
        assert_eq!(sanitized.noise_penalty_high_w, config.noise_penalty_high_w);

        let boosting = config.with_noise_penalty(0.01, 1.5, 0.03, 0.5);
        assert!(matches!(
            boosting.validate(),
            Err(ConfigError::OutOfBounds { field: "noise_penalty_low_factor", .. })
        ));
        assert_eq!(boosting.sanitized().noise_penalty_low_factor, 1.0);
    }

    #[cfg(feature = "defmt")]
    #[test]
    fn public_enums_format_with_defmt() {
        fn assert_format<T: defmt::Format>() {}
        assert_format::<BatteryChemistry>();
        assert_format::<ConfigError>();
    }

    #[test]
    fn chemistry_windows_ordered() {
        for chemistry in [
            BatteryChemistry::LithiumIon,
            BatteryChemistry::LiFePo4,
            BatteryChemistry::LeadAcid12V,
        ] {
            let (low, high) = chemistry.voltage_window();
            assert!(low < high);
        }
    }
}
