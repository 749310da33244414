//! Shared helpers for the integration tests
//!
//! - Deterministic RNG (xorshift) so noisy scenarios are reproducible
//! - Signal generators for power jitter and a synthetic daylight curve
//! - A stepping driver that owns the clock for estimator scenarios
//! - Tolerance assertions

#![allow(dead_code)]

use sunwatch_core::{
    calendar::ZonedCalendar,
    time::{FixedTime, Timestamp},
    ChannelReading, EnergyEstimator, EnergySummary, EstimatorConfig, PowerTick, TimeSource,
};

/// 2024-06-01T00:00:00Z
pub const JUNE_1_UTC_MS: Timestamp = 1_717_200_000_000;

/// One hour in milliseconds
pub const HOUR_MS: u64 = 3_600_000;

/// One minute in milliseconds
pub const MINUTE_MS: u64 = 60_000;

/// Xorshift RNG for reproducible noise
pub struct TestRng {
    state: u32,
}

impl TestRng {
    pub fn new(seed: u32) -> Self {
        Self { state: seed.max(1) }
    }

    pub fn next_u32(&mut self) -> u32 {
        self.state ^= self.state << 13;
        self.state ^= self.state >> 17;
        self.state ^= self.state << 5;
        self.state
    }

    pub fn next_f32(&mut self) -> f32 {
        (self.next_u32() >> 8) as f32 / 16777216.0
    }

    pub fn gen_range(&mut self, min: f32, max: f32) -> f32 {
        min + self.next_f32() * (max - min)
    }
}

/// Zero-mean jitter of the given amplitude
///
/// Negative samples are passed through as-is; the channel coerces them.
pub fn jitter(rng: &mut TestRng, amplitude: f32) -> f32 {
    rng.gen_range(-amplitude, amplitude)
}

/// Clear-sky light curve: zero outside [sunrise, sunset], half-sine between
pub fn daylight(minute_of_day: f32, sunrise: f32, sunset: f32, peak: f32) -> f32 {
    if minute_of_day <= sunrise || minute_of_day >= sunset {
        return 0.0;
    }
    let phase = (minute_of_day - sunrise) / (sunset - sunrise);
    peak * (core::f32::consts::PI * phase).sin()
}

/// Estimator under test plus the clock driving it
pub struct Driver {
    pub estimator: EnergyEstimator<ZonedCalendar<chrono::Utc>>,
    pub clock: FixedTime,
}

impl Driver {
    pub fn new(config: EstimatorConfig, start: Timestamp) -> Self {
        Self {
            estimator: EnergyEstimator::new(config, ZonedCalendar::utc()),
            clock: FixedTime::new(start),
        }
    }

    /// Advance the clock by `step_ms` and tick once
    pub fn step(&mut self, step_ms: u64, tick: PowerTick) -> EnergySummary {
        self.clock.advance(step_ms);
        let tick = PowerTick {
            elapsed_ms: Some(step_ms),
            ..tick
        };
        self.estimator.tick(self.clock.now(), &tick)
    }

    /// Hold the same readings for `count` one-second ticks
    pub fn hold(&mut self, count: usize, tick: PowerTick) -> EnergySummary {
        let mut last = self.estimator.summary();
        for _ in 0..count {
            last = self.step(1000, tick);
        }
        last
    }
}

/// Tick with steady input/output power and optional battery voltage
pub fn power_tick(input_w: f32, output_w: f32, battery_v: Option<f32>) -> PowerTick {
    PowerTick {
        elapsed_ms: Some(1000),
        input: ChannelReading::power(input_w),
        output: ChannelReading::power(output_w),
        battery_voltage_v: battery_v,
        battery_capacity_wh: None,
    }
}

/// Assert two floats agree within an absolute tolerance
#[macro_export]
macro_rules! assert_within_tolerance {
    ($actual:expr, $expected:expr, $tol:expr) => {{
        let (actual, expected, tol): (f32, f32, f32) = ($actual, $expected, $tol);
        assert!(
            (actual - expected).abs() <= tol,
            "expected {} within ±{} of {}, got {} (diff {})",
            stringify!($actual),
            tol,
            expected,
            actual,
            (actual - expected).abs()
        );
    }};
}
