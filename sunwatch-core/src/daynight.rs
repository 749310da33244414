//! Day/Night Detector & Sunset-Time Learner
//!
//! Classifies ambient light into day or night against an envelope it learns
//! itself, then learns when the reference day usually ends.
//!
//! ## Envelope
//!
//! ```text
//! peak ┤‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾‾   rises with the light EMA by day,
//!      │                               decays toward base every hour
//! entry┤─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─    base + 12 % of spread
//! exit ┤─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─ ─    base +  8 % of spread
//! base ┤______________________________ tracks the light EMA by night
//! ```
//!
//! The flag only flips after the light EMA has stayed past the relevant
//! threshold for the whole confirmation dwell. Dipping back resets the
//! dwell to zero.
//!
//! ## Sunset Learning
//!
//! On DAY→NIGHT only, the learned end-of-day minute moves toward the
//! minute of the transition by `rate · (minute − learned)`, bounded by
//! `end_minute_max_step`. The difference is taken the short way around
//! midnight.
//!
//! The learned sunset replaces the supplied one only after at least one
//! dusk has been observed and the envelope spread reaches
//! `sunset_publish_spread`. Until then the supplied value is echoed.
//!
//! An absent or non-finite light reading makes the tick a no-op.

use crate::{
    config::DayNightConfig,
    constants::time::{MINUTES_PER_DAY, MINUTES_PER_HOUR, MS_PER_MINUTE},
    errors::ConfigResult,
    filter::{decay_factor, ema_step, Ema},
    time::{ElapsedTime, Timestamp},
    traits::Calendar,
};

/// Per-tick input to the day/night learner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct LightTick {
    /// Milliseconds since the previous tick; `None` means 1000
    pub elapsed_ms: Option<u64>,
    /// Ambient light scalar; `None` skips the tick
    pub light: Option<f32>,
    /// Sunset timestamp supplied upstream, if any
    pub supplied_sunset_ms: Option<Timestamp>,
}

impl LightTick {
    /// Tick carrying one light sample
    pub fn new(elapsed_ms: Option<u64>, light: f32) -> Self {
        Self {
            elapsed_ms,
            light: Some(light),
            supplied_sunset_ms: None,
        }
    }

    /// Attach an upstream sunset timestamp
    pub fn with_supplied_sunset(mut self, sunset_ms: Timestamp) -> Self {
        self.supplied_sunset_ms = Some(sunset_ms);
        self
    }
}

/// Sunset timestamp shared with downstream consumers
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct SunsetSignal {
    /// Best current estimate; the learned value once a dusk has been seen
    pub estimated_ms: Option<Timestamp>,
    /// Value supplied upstream, preserved untouched
    pub supplied_ms: Option<Timestamp>,
    /// Whether `estimated_ms` comes from the learner
    pub learned: bool,
}

/// Published, read-only view of the day/night learner
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct DayNightSummary {
    /// Confirmed day flag
    pub is_day: bool,
    /// Smoothed light
    pub light_ema: f32,
    /// Learned night base
    pub base: f32,
    /// Learned day peak
    pub peak: f32,
    /// Night→day threshold
    pub entry_threshold: f32,
    /// Day→night threshold
    pub exit_threshold: f32,
    /// Hours until the learned end of day; 0 at night
    pub hours_to_sunset: f32,
    /// Learned end-of-day minute of the reference day
    pub learned_end_minute: f32,
    /// Dwell accumulated toward a night→day flip (s)
    pub day_pending_s: f32,
    /// Dwell accumulated toward a day→night flip (s)
    pub night_pending_s: f32,
    /// Confirmed DAY→NIGHT transitions since construction or reset
    pub dusks_observed: u32,
    /// Sunset timestamps
    pub sunset: SunsetSignal,
}

/// Lux-based day/night classifier with sunset learning
#[derive(Debug, Clone)]
pub struct DayNightLearner<C: Calendar> {
    config: DayNightConfig,
    calendar: C,
    light: Ema,
    base: f32,
    peak: f32,
    is_day: bool,
    last_is_day: bool,
    day_pending_s: f32,
    night_pending_s: f32,
    learned_end_minute: f32,
    dusks_observed: u32,
    hours_to_sunset: f32,
    sunset: SunsetSignal,
}

impl<C: Calendar> DayNightLearner<C> {
    /// Build a learner, clamping degenerate configuration values
    pub fn new(config: DayNightConfig, calendar: C) -> Self {
        if let Err(e) = config.validate() {
            log_warn!("day/night config sanitised: {}", e);
        }
        Self::from_config(config.sanitized(), calendar)
    }

    /// Build a learner, rejecting invalid configuration
    pub fn try_new(config: DayNightConfig, calendar: C) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::from_config(config, calendar))
    }

    fn from_config(config: DayNightConfig, calendar: C) -> Self {
        Self {
            light: Ema::new(0.0, config.light_tau_s),
            base: config.initial_base,
            peak: config.initial_peak,
            is_day: false,
            last_is_day: false,
            day_pending_s: 0.0,
            night_pending_s: 0.0,
            learned_end_minute: config.initial_end_minute,
            dusks_observed: 0,
            hours_to_sunset: 0.0,
            sunset: SunsetSignal::default(),
            config,
            calendar,
        }
    }

    /// Run one tick at wall-clock time `now`
    pub fn tick(&mut self, now: Timestamp, tick: &LightTick) -> DayNightSummary {
        let Some(light) = tick.light.filter(|l| l.is_finite()) else {
            return self.summary();
        };

        let dt = ElapsedTime::from_millis(tick.elapsed_ms, self.config.max_dt_s);
        let dt_s = dt.seconds();
        let parts = self.calendar.resolve(now);

        let first_sample = !self.light.is_seeded();
        let ema = self.light.update(light.max(0.0), dt_s);
        if first_sample {
            self.is_day = ema >= self.entry_threshold();
            self.last_is_day = self.is_day;
        }

        self.update_envelope(ema, dt_s, dt.hours());
        self.update_flag(ema, dt_s);

        let minute = parts.ms_of_day as f32 / MS_PER_MINUTE as f32;
        if self.last_is_day && !self.is_day {
            self.learn_end_minute(minute);
        }
        self.last_is_day = self.is_day;

        self.hours_to_sunset = if self.is_day {
            ((self.learned_end_minute - minute) / MINUTES_PER_HOUR as f32).max(0.0)
        } else {
            0.0
        };

        self.publish_sunset(now, parts.ms_of_day, tick.supplied_sunset_ms);
        self.summary()
    }

    fn update_envelope(&mut self, ema: f32, dt_s: f32, dt_h: f32) {
        let config = &self.config;

        if self.is_day {
            if ema > self.peak {
                self.peak = ema_step(self.peak, ema, dt_s, config.peak_tau_s);
            }
        } else {
            self.base = ema_step(self.base, ema, dt_s, config.base_tau_s)
                .clamp(0.0, config.base_max);
        }

        let decay = decay_factor(config.peak_decay_per_hour, dt_h);
        self.peak = self.base + (self.peak - self.base) * decay;
        self.peak = self.peak.max(self.base + config.min_spread);
    }

    fn update_flag(&mut self, ema: f32, dt_s: f32) {
        let dwell = self.config.confirm_dwell_s;

        if self.is_day {
            self.day_pending_s = 0.0;
            if ema <= self.exit_threshold() {
                self.night_pending_s += dt_s;
                if self.night_pending_s >= dwell {
                    self.is_day = false;
                    self.night_pending_s = 0.0;
                }
            } else {
                self.night_pending_s = 0.0;
            }
        } else {
            self.night_pending_s = 0.0;
            if ema >= self.entry_threshold() {
                self.day_pending_s += dt_s;
                if self.day_pending_s >= dwell {
                    self.is_day = true;
                    self.day_pending_s = 0.0;
                    log_info!("night -> day at light {}", ema);
                }
            } else {
                self.day_pending_s = 0.0;
            }
        }
    }

    fn learn_end_minute(&mut self, minute: f32) {
        let day = MINUTES_PER_DAY as f32;
        let mut diff = minute - self.learned_end_minute;
        if diff > day / 2.0 {
            diff -= day;
        } else if diff < -day / 2.0 {
            diff += day;
        }

        let max_step = self.config.end_minute_max_step;
        let step = (self.config.end_minute_rate * diff).clamp(-max_step, max_step);
        let mut learned = self.learned_end_minute + step;
        if learned < 0.0 {
            learned += day;
        } else if learned >= day {
            learned -= day;
        }

        log_info!(
            "day -> night at minute {}, learned end of day {} -> {}",
            minute,
            self.learned_end_minute,
            learned
        );
        self.learned_end_minute = learned;
        self.dusks_observed = self.dusks_observed.saturating_add(1);
    }

    fn publish_sunset(&mut self, now: Timestamp, ms_of_day: u64, supplied: Option<Timestamp>) {
        if supplied.is_some() {
            self.sunset.supplied_ms = supplied;
        }

        if self.dusks_observed > 0 && self.spread() >= self.config.sunset_publish_spread {
            let day_start = now.saturating_sub(ms_of_day);
            let offset = (self.learned_end_minute * MS_PER_MINUTE as f32) as u64;
            self.sunset.estimated_ms = Some(day_start.saturating_add(offset));
            self.sunset.learned = true;
        } else {
            self.sunset.estimated_ms = self.sunset.supplied_ms;
            self.sunset.learned = false;
        }
    }

    fn spread(&self) -> f32 {
        self.peak - self.base
    }

    /// Night→day threshold for the current envelope
    pub fn entry_threshold(&self) -> f32 {
        self.base + self.config.entry_fraction * self.spread()
    }

    /// Day→night threshold for the current envelope
    pub fn exit_threshold(&self) -> f32 {
        self.base + self.config.exit_fraction * self.spread()
    }

    /// Confirmed day flag
    pub fn is_day(&self) -> bool {
        self.is_day
    }

    /// Learned end-of-day minute
    pub fn learned_end_minute(&self) -> f32 {
        self.learned_end_minute
    }

    /// Snapshot of every published value
    pub fn summary(&self) -> DayNightSummary {
        DayNightSummary {
            is_day: self.is_day,
            light_ema: self.light.value(),
            base: self.base,
            peak: self.peak,
            entry_threshold: self.entry_threshold(),
            exit_threshold: self.exit_threshold(),
            hours_to_sunset: self.hours_to_sunset,
            learned_end_minute: self.learned_end_minute,
            day_pending_s: self.day_pending_s,
            night_pending_s: self.night_pending_s,
            dusks_observed: self.dusks_observed,
            sunset: self.sunset,
        }
    }

    /// Restore every documented default, keeping config and calendar
    pub fn reset(&mut self) {
        let config = self.config.clone();
        self.light = Ema::new(0.0, config.light_tau_s);
        self.base = config.initial_base;
        self.peak = config.initial_peak;
        self.is_day = false;
        self.last_is_day = false;
        self.day_pending_s = 0.0;
        self.night_pending_s = 0.0;
        self.learned_end_minute = config.initial_end_minute;
        self.dusks_observed = 0;
        self.hours_to_sunset = 0.0;
        self.sunset = SunsetSignal::default();
    }

    /// Active (sanitised) configuration
    pub fn config(&self) -> &DayNightConfig {
        &self.config
    }
}
