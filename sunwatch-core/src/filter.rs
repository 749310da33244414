//! Continuous-Time Smoothing Primitives
//!
//! ## Why Not a Fixed Alpha?
//!
//! A textbook EMA `y += α·(x − y)` with a constant α assumes every sample is
//! the same distance apart. Sensor poll loops are not that polite: a 1 s loop
//! stretches to 3 s under radio load and collapses to 0 s when two readings
//! land in the same tick. A constant α then smooths faster whenever the host
//! happens to poll faster.
//!
//! Every smoother here instead derives α from elapsed time:
//!
//! ```text
//! α = 1 − e^(−dt/τ)
//!
//! dt = 0      → α = 0   (no change)
//! dt = τ      → α ≈ 0.63
//! dt → ∞      → α → 1   (jump to the sample)
//! ```
//!
//! Two 1 s steps produce exactly the same result as one 2 s step toward a
//! constant input, which is what makes the estimators cadence-independent.

use libm::expf;

/// Smoothing weight for a step of `dt_s` seconds with time constant `tau_s`
///
/// Returns 0 for non-positive or non-finite `dt_s`, and 1 for a
/// non-positive time constant (no smoothing).
pub fn alpha(dt_s: f32, tau_s: f32) -> f32 {
    if !(dt_s > 0.0) || !dt_s.is_finite() {
        return 0.0;
    }
    if !(tau_s > 0.0) {
        return 1.0;
    }
    (1.0 - expf(-dt_s / tau_s)).clamp(0.0, 1.0)
}

/// One smoothing step of `current` toward `target`
pub fn ema_step(current: f32, target: f32, dt_s: f32, tau_s: f32) -> f32 {
    current + alpha(dt_s, tau_s) * (target - current)
}

/// Exponential decay factor `e^(−rate·dt)` for a per-unit-time rate
pub fn decay_factor(rate: f32, dt: f32) -> f32 {
    if !(rate > 0.0) || !(dt > 0.0) {
        return 1.0;
    }
    expf(-rate * dt)
}

/// Cubic smoothstep of `value` across `[edge0, edge1]`
///
/// Monotonic, flat at both ends, steepest in the middle of the window:
/// `s(x) = x²·(3 − 2x)` with `x` the clamped position inside the window.
pub fn smoothstep(edge0: f32, edge1: f32, value: f32) -> f32 {
    if !(edge1 > edge0) || !value.is_finite() {
        return 0.0;
    }
    let x = ((value - edge0) / (edge1 - edge0)).clamp(0.0, 1.0);
    x * x * (3.0 - 2.0 * x)
}

/// Time-constant EMA with first-sample seeding
///
/// Until the first sample arrives the filter reports its seed value; the
/// first sample replaces it outright rather than ramping up from the seed.
#[derive(Debug, Clone, Copy, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Ema {
    value: f32,
    tau_s: f32,
    seeded: bool,
}

impl Ema {
    /// Unseeded filter reporting `initial` until the first sample
    pub const fn new(initial: f32, tau_s: f32) -> Self {
        Self {
            value: initial,
            tau_s,
            seeded: false,
        }
    }

    /// Feed one sample after `dt_s` seconds, returning the new value
    pub fn update(&mut self, sample: f32, dt_s: f32) -> f32 {
        if !sample.is_finite() {
            return self.value;
        }
        if self.seeded {
            self.value = ema_step(self.value, sample, dt_s, self.tau_s);
        } else {
            self.value = sample;
            self.seeded = true;
        }
        self.value
    }

    /// Current smoothed value
    pub fn value(&self) -> f32 {
        self.value
    }

    /// Whether a sample has been seen
    pub fn is_seeded(&self) -> bool {
        self.seeded
    }

    /// Overwrite the smoothed value (e.g. after clamping by the caller)
    pub fn set(&mut self, value: f32) {
        self.value = value;
    }
}
