//! Integration tests for the power/charge estimator
//!
//! Whole-pipeline scenarios driven through `EnergyEstimator::tick`:
//! - Steady charging with energy totals and classification
//! - Anti-chatter under sub-deadband jitter
//! - Midnight rollover of totals and the SoC baseline
//! - Voltage-anchor convergence after an idle dwell
//! - Cadence independence and dt clamping
//! - Rolling window bound

#![cfg(test)]

#[macro_use]
mod common;

use sunwatch_core::{
    config::BatteryChemistry,
    power::voltage_for_soc,
    EstimatorConfig, PowerPathState, PowerState,
};

use common::{jitter, power_tick, Driver, TestRng, HOUR_MS, JUNE_1_UTC_MS, MINUTE_MS};

#[test]
fn steady_charging_hour() {
    let mut driver = Driver::new(EstimatorConfig::default(), JUNE_1_UTC_MS + HOUR_MS);

    let summary = driver.hold(3600, power_tick(0.5, 0.1, None));

    assert_within_tolerance!(summary.wh_in_today, 0.5, 0.005);
    assert_within_tolerance!(summary.wh_out_today, 0.1, 0.002);
    assert_within_tolerance!(summary.wh_net_today, 0.4, 0.005);
    assert_within_tolerance!(summary.deadband_w, 0.05, 1e-6);
    assert_eq!(summary.power_state, PowerState::Charging);
    assert_eq!(summary.power_path_state, PowerPathState::SolarToBatt);
    assert_eq!(summary.idle_seconds, 0.0);

    // Rolling window saw the same energy in a single hour bucket
    assert_eq!(summary.rolling_bucket_count, 1);
    assert_within_tolerance!(summary.rolling_wh_in, summary.wh_in_today, 1e-4);

    // 0.4 Wh on a 9.4 Wh pack
    assert_within_tolerance!(summary.soc_est, 0.5 + 0.4 / 9.4, 0.002);
}

#[test]
fn sub_deadband_jitter_accumulates_nothing() {
    let mut driver = Driver::new(EstimatorConfig::default(), JUNE_1_UTC_MS + HOUR_MS);
    let mut rng = TestRng::new(7);

    for _ in 0..7200 {
        let tick = power_tick(jitter(&mut rng, 0.03), jitter(&mut rng, 0.03), None);
        let summary = driver.step(1000, tick);
        assert_eq!(summary.power_state, PowerState::Idle);
    }
    let last = driver.estimator.summary();

    assert_eq!(last.wh_in_today, 0.0);
    assert_eq!(last.wh_out_today, 0.0);
    assert!(last.input.noise_floor_w > 0.0, "noise floor should learn from idle jitter");
    assert!(last.deadband_w >= EstimatorConfig::default().deadband_min_w);
    assert_within_tolerance!(last.idle_seconds, 7200.0, 1.0);
}

#[test]
fn midnight_rollover_resets_once_without_soc_jump() {
    let start = JUNE_1_UTC_MS + 23 * HOUR_MS + 30 * MINUTE_MS;
    let mut driver = Driver::new(EstimatorConfig::default(), start);
    let tick = power_tick(1.0, 0.0, None);

    let mut previous = driver.step(1000, tick);
    let first_day = previous.day_key;
    let mut resets = 0;

    for _ in 1..3600 {
        let current = driver.step(1000, tick);

        if current.wh_in_today < previous.wh_in_today {
            resets += 1;
            assert_eq!(current.day_key.zip(first_day).map(|(a, b)| a - b), Some(1));
            assert!(current.wh_in_today < 0.001);
            assert_eq!(current.wh_out_today, 0.0);
        }

        // SoC moves by one tick's worth of energy, never by the reset
        let per_tick = 1.0 / 3600.0 / 9.4;
        assert_within_tolerance!(current.soc_est - previous.soc_est, per_tick, 1e-5);

        previous = current;
    }

    assert_eq!(resets, 1);
    assert_within_tolerance!(previous.wh_in_today, 0.5, 0.01);
    assert_within_tolerance!(previous.soc_est, 0.5 + 1.0 / 9.4, 0.002);
}

#[test]
fn idle_voltage_anchor_converges() {
    let chemistry = BatteryChemistry::LithiumIon;
    let config = EstimatorConfig::default().with_chemistry(chemistry);
    let idle_anchor_s = config.idle_anchor_s;
    let initial_soc = config.initial_soc;
    let mut driver = Driver::new(config, JUNE_1_UTC_MS + 2 * HOUR_MS);

    let v80 = voltage_for_soc(0.8, &chemistry);
    let tick = power_tick(0.0, 0.0, Some(v80));

    // Before the dwell elapses only counting runs, and nothing flows
    let early = driver.hold(idle_anchor_s as usize - 10, tick);
    assert_eq!(early.power_state, PowerState::Idle);
    assert!(!early.anchor_active);
    assert_eq!(early.soc_est, initial_soc);
    assert!(early.last_anchor_ms.is_none());

    let late = driver.hold(2 * 3600, tick);
    assert!(late.anchor_active);
    assert!(late.last_anchor_ms.is_some());
    assert_within_tolerance!(late.soc_est, 0.8, 0.01);
    assert_within_tolerance!(late.soc_confidence, 1.0, 1e-3);
}

#[test]
fn anchor_needs_voltage() {
    let mut driver = Driver::new(EstimatorConfig::default(), JUNE_1_UTC_MS);
    let summary = driver.hold(1200, power_tick(0.0, 0.0, None));

    assert!(!summary.anchor_active);
    assert_eq!(summary.soc_est, EstimatorConfig::default().initial_soc);
}

#[test]
fn load_only_discharges() {
    let mut driver = Driver::new(EstimatorConfig::default(), JUNE_1_UTC_MS + HOUR_MS);
    let summary = driver.hold(1800, power_tick(0.0, 1.0, None));

    assert_eq!(summary.power_state, PowerState::Discharging);
    assert_eq!(summary.power_path_state, PowerPathState::BattToLoad);
    assert_within_tolerance!(summary.wh_net_today, -0.5, 0.005);
    assert!(summary.soc_est < EstimatorConfig::default().initial_soc);
}

#[test]
fn balanced_flow_is_mixed_and_erodes_confidence() {
    let config = EstimatorConfig::default();
    let initial_confidence = config.initial_confidence;
    let mut driver = Driver::new(config, JUNE_1_UTC_MS + HOUR_MS);

    let summary = driver.hold(600, power_tick(0.5, 0.45, None));

    assert_eq!(summary.power_state, PowerState::Mixed);
    assert_eq!(summary.power_path_state, PowerPathState::SolarToLoad);
    assert!(summary.soc_confidence < initial_confidence);
}

#[test]
fn cadence_does_not_change_results() {
    let tick = power_tick(0.8, 0.2, None);
    let mut fine = Driver::new(EstimatorConfig::default(), JUNE_1_UTC_MS + HOUR_MS);
    let mut coarse = Driver::new(EstimatorConfig::default(), JUNE_1_UTC_MS + HOUR_MS);

    // Seed both with a zero reading so the EMA has something to move from
    fine.step(1000, power_tick(0.0, 0.0, None));
    coarse.step(1000, power_tick(0.0, 0.0, None));

    for _ in 0..60 {
        fine.step(1000, tick);
        fine.step(1000, tick);
        coarse.step(2000, tick);
    }
    let a = fine.estimator.summary();
    let b = coarse.estimator.summary();

    assert_within_tolerance!(a.input.ema_w, b.input.ema_w, 1e-4);
    assert_within_tolerance!(a.output.ema_w, b.output.ema_w, 1e-4);
    assert_within_tolerance!(a.wh_in_today, b.wh_in_today, 1e-4);
    assert_eq!(a.power_state, b.power_state);
}

#[test]
fn long_pause_is_clamped() {
    let config = EstimatorConfig::default();
    let max_dt_s = config.max_dt_s;
    let mut driver = Driver::new(config, JUNE_1_UTC_MS + HOUR_MS);

    // Ten minutes of suspend count as one clamped step
    let summary = driver.step(10 * MINUTE_MS, power_tick(3.6, 0.0, None));
    assert_within_tolerance!(summary.wh_in_today, 3.6 * max_dt_s / 3600.0, 1e-6);
}

#[test]
fn rolling_window_is_bounded() {
    let config = EstimatorConfig::default();
    let buckets = config.rolling_buckets;
    let mut driver = Driver::new(config, JUNE_1_UTC_MS);

    for _ in 0..(buckets + 12) {
        let summary = driver.step(HOUR_MS, power_tick(1.0, 0.25, None));
        assert!(summary.rolling_bucket_count <= buckets);
    }
    let summary = driver.estimator.summary();

    let window = driver.estimator.rolling_window();
    let (wh_in, wh_out) = window
        .buckets()
        .fold((0.0f32, 0.0f32), |(i, o), b| (i + b.wh_in, o + b.wh_out));

    assert_eq!(window.len(), buckets);
    assert_within_tolerance!(summary.rolling_wh_in, wh_in, 1e-6);
    assert_within_tolerance!(summary.rolling_wh_out, wh_out, 1e-6);
    assert_within_tolerance!(summary.rolling_wh_net, wh_in - wh_out, 1e-6);
}

#[test]
fn reported_capacity_overrides_config() {
    let mut small = Driver::new(EstimatorConfig::default(), JUNE_1_UTC_MS + HOUR_MS);
    let mut large = Driver::new(EstimatorConfig::default(), JUNE_1_UTC_MS + HOUR_MS);

    let mut tick = power_tick(2.0, 0.0, None);
    tick.battery_capacity_wh = Some(2.0);
    let s = small.hold(1800, tick);

    tick.battery_capacity_wh = Some(50.0);
    let l = large.hold(1800, tick);

    assert_within_tolerance!(s.soc_est, 1.0, 1e-6);
    assert_within_tolerance!(l.soc_est, 0.5 + 1.0 / 50.0, 0.002);
}
