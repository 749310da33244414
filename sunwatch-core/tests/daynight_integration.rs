//! Integration tests for the day/night detector and sunset learner
//!
//! - Dusk transition with sunset-minute learning
//! - Hysteresis under excursions shorter than the confirmation dwell
//! - Two synthetic clear-sky days

#![cfg(test)]

#[macro_use]
mod common;

use sunwatch_core::{
    calendar::ZonedCalendar,
    time::{FixedTime, Timestamp},
    DayNightConfig, DayNightLearner, DayNightSummary, LightTick, TimeSource,
};

use common::{daylight, HOUR_MS, JUNE_1_UTC_MS, MINUTE_MS};

struct LightDriver {
    learner: DayNightLearner<ZonedCalendar<chrono::Utc>>,
    clock: FixedTime,
}

impl LightDriver {
    fn new(start: Timestamp) -> Self {
        Self {
            learner: DayNightLearner::new(DayNightConfig::default(), ZonedCalendar::utc()),
            clock: FixedTime::new(start),
        }
    }

    fn step(&mut self, step_ms: u64, light: f32) -> DayNightSummary {
        self.clock.advance(step_ms);
        self.learner.tick(self.clock.now(), &LightTick::new(Some(step_ms), light))
    }

    fn minute_of_day(&self) -> f32 {
        (self.clock.now() % (24 * HOUR_MS)) as f32 / MINUTE_MS as f32
    }
}

#[test]
fn dusk_flips_once_and_learns_minute() {
    let mut driver = LightDriver::new(JUNE_1_UTC_MS + 19 * HOUR_MS);
    let initial_end = DayNightConfig::default().initial_end_minute;

    assert!(driver.step(1000, 1000.0).is_day);

    let mut flips = 0;
    let mut learned_updates = 0;
    let mut flip_minute = None;
    let mut previous = driver.learner.summary();

    for _ in 0..900 {
        let current = driver.step(1000, 0.0);

        if previous.is_day && !current.is_day {
            flips += 1;
            flip_minute = Some(driver.minute_of_day());
        }
        if current.learned_end_minute != previous.learned_end_minute {
            learned_updates += 1;
            assert!(previous.is_day && !current.is_day, "minute may only move on DAY->NIGHT");
        }
        previous = current;
    }

    assert_eq!(flips, 1);
    assert_eq!(learned_updates, 1);
    assert!(!previous.is_day);
    assert_eq!(previous.hours_to_sunset, 0.0);

    let minute = flip_minute.unwrap_or_default();
    // Exit crossing (~225 s) plus the 420 s dwell
    assert!(minute > 19.0 * 60.0 + 9.0 && minute < 19.0 * 60.0 + 12.0, "flipped at {}", minute);

    let expected = initial_end + DayNightConfig::default().end_minute_rate * (minute - initial_end);
    assert_within_tolerance!(previous.learned_end_minute, expected, 0.05);
}

#[test]
fn short_bright_bursts_never_flip_to_day() {
    let mut driver = LightDriver::new(JUNE_1_UTC_MS + 2 * HOUR_MS);
    assert!(!driver.step(1000, 0.0).is_day);

    for cycle in 0..20 {
        let light = if cycle % 2 == 0 { 500.0 } else { 0.0 };
        for _ in 0..180 {
            let summary = driver.step(1000, light);
            assert!(!summary.is_day);
            assert!(summary.day_pending_s < DayNightConfig::default().confirm_dwell_s);
        }
    }
}

#[test]
fn short_dark_dips_never_flip_to_night() {
    let mut driver = LightDriver::new(JUNE_1_UTC_MS + 11 * HOUR_MS);
    assert!(driver.step(1000, 1000.0).is_day);
    let learned = driver.learner.learned_end_minute();

    for cycle in 0..24 {
        let light = if cycle % 2 == 0 { 0.0 } else { 1000.0 };
        for _ in 0..300 {
            assert!(driver.step(1000, light).is_day);
        }
    }

    assert_eq!(driver.learner.learned_end_minute(), learned);
}

#[test]
fn two_clear_days() {
    const SUNRISE: f32 = 6.0 * 60.0;
    const SUNSET: f32 = 20.0 * 60.0;
    const STEP_MS: u64 = 5000;

    let mut driver = LightDriver::new(JUNE_1_UTC_MS);
    let initial_end = DayNightConfig::default().initial_end_minute;

    let mut sunrises = 0;
    let mut sunsets = 0;
    let mut previous = driver.step(STEP_MS, 0.0);
    assert!(!previous.is_day);

    let ticks = (48 * HOUR_MS / STEP_MS) as usize;
    for _ in 1..ticks {
        let light = daylight(driver.minute_of_day(), SUNRISE, SUNSET, 800.0);
        let current = driver.step(STEP_MS, light);

        match (previous.is_day, current.is_day) {
            (false, true) => sunrises += 1,
            (true, false) => {
                sunsets += 1;
                let minute = driver.minute_of_day();
                assert!(minute > SUNSET - 60.0 && minute < SUNSET + 30.0, "dusk at {}", minute);
            }
            _ => {}
        }

        let minute = driver.minute_of_day();
        if (11.0 * 60.0..13.0 * 60.0).contains(&minute) {
            assert!(current.is_day);
            assert!(current.hours_to_sunset > 0.0);
        }
        if minute < 4.0 * 60.0 || minute > 22.0 * 60.0 {
            assert!(!current.is_day);
            assert_eq!(current.hours_to_sunset, 0.0);
        }

        previous = current;
    }

    assert_eq!(sunrises, 2);
    assert_eq!(sunsets, 2);
    assert_eq!(previous.dusks_observed, 2);

    // Learned end of day moved later, toward the observed dusk
    assert!(previous.learned_end_minute > initial_end);
    assert!(previous.learned_end_minute < SUNSET + 30.0);

    // Envelope stays ordered and the sunset signal is the learned one
    assert!(previous.peak > previous.base);
    assert!(previous.entry_threshold > previous.exit_threshold);
    assert!(previous.sunset.learned);
    let day_start = driver.clock.now() - driver.clock.now() % (24 * HOUR_MS);
    let expected = day_start + (previous.learned_end_minute * MINUTE_MS as f32) as u64;
    assert_eq!(previous.sunset.estimated_ms, Some(expected));
}

#[test]
fn supplied_sunset_is_preserved() {
    let mut driver = LightDriver::new(JUNE_1_UTC_MS + 12 * HOUR_MS);
    let supplied = JUNE_1_UTC_MS + 20 * HOUR_MS + 15 * MINUTE_MS;

    driver.clock.advance(1000);
    let tick = LightTick::new(Some(1000), 900.0).with_supplied_sunset(supplied);
    let summary = driver.learner.tick(driver.clock.now(), &tick);
    assert_eq!(summary.sunset.supplied_ms, Some(supplied));

    // Until the first dusk is learned the supplied value is the estimate
    assert!(!summary.sunset.learned);
    assert_eq!(summary.sunset.estimated_ms, Some(supplied));

    let mut summary = driver.step(1000, 900.0);
    for _ in 0..30 * 60 {
        assert_eq!(summary.sunset.supplied_ms, Some(supplied));
        assert_eq!(summary.sunset.estimated_ms, Some(supplied));
        assert!(!summary.sunset.learned);
        summary = driver.step(1000, 900.0);
    }

    // First dusk: the learned estimate takes over, the supplied value stays
    while summary.dusks_observed == 0 {
        assert_eq!(summary.sunset.estimated_ms, Some(supplied));
        summary = driver.step(1000, 0.0);
    }
    assert!(summary.sunset.learned);
    assert_eq!(summary.sunset.supplied_ms, Some(supplied));

    let day_start = driver.clock.now() - driver.clock.now() % (24 * HOUR_MS);
    let expected = day_start + (summary.learned_end_minute * MINUTE_MS as f32) as u64;
    assert_eq!(summary.sunset.estimated_ms, Some(expected));
}
