//! Hybrid State-of-Charge Estimator
//!
//! ## Two Sources, Two Failure Modes
//!
//! - **Coulomb counting** (here: Wh counting) is smooth and always available,
//!   but drifts: every calibration error in the shunts integrates forever.
//! - **Resting voltage** is drift-free, but only meaningful after the battery
//!   has rested. Under load the voltage sags; during charge it floats high.
//!
//! The estimator runs the first continuously and lets the second pull the
//! estimate back, gently, only when the battery has provably been resting.
//!
//! ## Per-Tick Update
//!
//! ```text
//! 1. soc += ΔWh_net / capacity                       (always)
//! 2. confidence ± rate·dt                            (see below)
//! 3. if idle ≥ dwell ∧ min(q_in, q_out) ≥ floor ∧ V finite:
//!        target = smoothstep(V_empty, V_full, V)
//!        gain   = clamp(k·dt·confidence, 0, ceiling)
//!        soc   += (target − soc)·gain
//! ```
//!
//! `ΔWh_net` is the change in today's net accumulator since the previous
//! tick, so the integrator is never run twice. At day rollover the
//! accumulator is zeroed and the baseline with it, in the same tick.
//!
//! ## Confidence
//!
//! | condition                                   | effect             |
//! |---------------------------------------------|--------------------|
//! | input unstable or either quality < low floor | − down-rate·dt    |
//! | idle, stable, both qualities ≥ anchor floor  | + up-rate·dt      |
//! | power state `Mixed`                          | − mixed-decay·dt  |
//!
//! Both the estimate and the confidence are clamped to [0, 1] every tick.

use crate::{
    config::{BatteryChemistry, EstimatorConfig},
    filter::smoothstep,
    power::classifier::PowerState,
    time::Timestamp,
};

/// Bisection steps used by [`voltage_for_soc`]; 2⁻³² of the window is far below ADC resolution
const INVERSE_ITERATIONS: usize = 32;

/// Map a resting voltage onto [0, 1] with a smoothstep over the chemistry window
pub fn soc_from_voltage(voltage_v: f32, chemistry: &BatteryChemistry) -> f32 {
    let (empty_v, full_v) = chemistry.voltage_window();
    smoothstep(empty_v, full_v, voltage_v)
}

/// Resting voltage that [`soc_from_voltage`] maps to `soc`
///
/// Useful for simulators that want to drive the anchor toward a known SoC.
pub fn voltage_for_soc(soc: f32, chemistry: &BatteryChemistry) -> f32 {
    let (empty_v, full_v) = chemistry.voltage_window();
    let target = if soc.is_finite() {
        soc.clamp(0.0, 1.0)
    } else {
        0.0
    };

    let (mut low, mut high) = (empty_v, full_v);
    for _ in 0..INVERSE_ITERATIONS {
        let mid = 0.5 * (low + high);
        if smoothstep(empty_v, full_v, mid) < target {
            low = mid;
        } else {
            high = mid;
        }
    }
    0.5 * (low + high)
}

/// Everything the estimator reads from the rest of the tick
#[derive(Debug, Clone, Copy)]
pub struct SocInputs {
    /// Today's net energy accumulator after this tick (Wh)
    pub net_wh_today: f32,
    /// Usable capacity, already floor-clamped (Wh)
    pub capacity_wh: f32,
    /// Elapsed seconds this tick
    pub dt_s: f32,
    /// Continuous idle dwell (s)
    pub idle_s: f32,
    /// Smoothed input channel quality
    pub quality_in: f32,
    /// Smoothed output channel quality
    pub quality_out: f32,
    /// Whether the input channel's raw/EMA deviation exceeds the bound
    pub unstable: bool,
    /// This tick's power state
    pub power_state: PowerState,
    /// Battery voltage reading, if any
    pub battery_voltage_v: Option<f32>,
    /// Wall-clock time of the tick
    pub now: Timestamp,
}

/// Outcome of one estimator step
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SocStep {
    /// SoC change from Wh counting
    pub coulomb_delta: f32,
    /// SoC change from the voltage anchor
    pub anchor_delta: f32,
    /// Whether the anchor ran this tick
    pub anchored: bool,
}

/// SoC estimate with confidence and delta-tracking baseline
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SocEstimator {
    soc: f32,
    confidence: f32,
    net_baseline_wh: f32,
    last_anchor_ms: Option<Timestamp>,
    anchor_active: bool,
}

impl SocEstimator {
    /// Estimator at the configured initial SoC and confidence
    pub fn new(config: &EstimatorConfig) -> Self {
        Self {
            soc: config.initial_soc.clamp(0.0, 1.0),
            confidence: config.initial_confidence.clamp(0.0, 1.0),
            net_baseline_wh: 0.0,
            last_anchor_ms: None,
            anchor_active: false,
        }
    }

    /// Re-base delta tracking on the given accumulator value
    ///
    /// Called in the same tick the daily accumulator is zeroed.
    pub fn reset_baseline(&mut self, net_wh: f32) {
        self.net_baseline_wh = net_wh;
    }

    /// Advance one tick
    pub fn update(&mut self, inputs: &SocInputs, config: &EstimatorConfig) -> SocStep {
        let coulomb_delta = self.count(inputs);
        self.update_confidence(inputs, config);
        let (anchored, anchor_delta) = self.anchor(inputs, config);

        SocStep {
            coulomb_delta,
            anchor_delta,
            anchored,
        }
    }

    fn count(&mut self, inputs: &SocInputs) -> f32 {
        if !inputs.net_wh_today.is_finite() {
            return 0.0;
        }
        let d_wh = inputs.net_wh_today - self.net_baseline_wh;
        self.net_baseline_wh = inputs.net_wh_today;

        let before = self.soc;
        self.soc = (self.soc + d_wh / inputs.capacity_wh).clamp(0.0, 1.0);
        self.soc - before
    }

    fn update_confidence(&mut self, inputs: &SocInputs, config: &EstimatorConfig) {
        let dt = inputs.dt_s.max(0.0);
        let min_quality = inputs.quality_in.min(inputs.quality_out);

        if inputs.unstable || min_quality < config.low_quality_floor {
            self.confidence -= config.confidence_down_per_s * dt;
        } else if inputs.power_state == PowerState::Idle
            && min_quality >= config.anchor_quality_floor
        {
            self.confidence += config.confidence_up_per_s * dt;
        }

        if inputs.power_state == PowerState::Mixed {
            self.confidence -= config.confidence_mixed_decay_per_s * dt;
        }

        self.confidence = self.confidence.clamp(0.0, 1.0);
    }

    fn anchor(&mut self, inputs: &SocInputs, config: &EstimatorConfig) -> (bool, f32) {
        let min_quality = inputs.quality_in.min(inputs.quality_out);
        let voltage = inputs.battery_voltage_v.filter(|v| v.is_finite() && *v > 0.0);

        let eligible =
            inputs.idle_s >= config.idle_anchor_s && min_quality >= config.anchor_quality_floor;
        let Some(voltage) = voltage.filter(|_| eligible) else {
            self.anchor_active = false;
            return (false, 0.0);
        };

        if !self.anchor_active {
            log_debug!(
                "voltage anchor engaged after {}s idle at {}V (soc {})",
                inputs.idle_s,
                voltage,
                self.soc
            );
        }
        self.anchor_active = true;

        let target = soc_from_voltage(voltage, &config.chemistry);
        let gain = (config.anchor_gain_per_s * inputs.dt_s.max(0.0) * self.confidence)
            .clamp(0.0, config.anchor_gain_ceiling);

        let before = self.soc;
        self.soc = (self.soc + (target - self.soc) * gain).clamp(0.0, 1.0);
        self.last_anchor_ms = Some(inputs.now);
        (true, self.soc - before)
    }

    /// Current SoC estimate in [0, 1]
    pub fn soc(&self) -> f32 {
        self.soc
    }

    /// Current confidence in [0, 1]
    pub fn confidence(&self) -> f32 {
        self.confidence
    }

    /// When the voltage anchor last ran
    pub fn last_anchor_ms(&self) -> Option<Timestamp> {
        self.last_anchor_ms
    }

    /// Whether the anchor ran on the latest tick
    pub fn anchor_active(&self) -> bool {
        self.anchor_active
    }

    /// Accumulator value the next delta is measured from (Wh)
    pub fn net_baseline_wh(&self) -> f32 {
        self.net_baseline_wh
    }
}
