//! Energy Estimator
//!
//! Drives the power pipeline once per tick and publishes an
//! [`EnergySummary`]. The estimator owns all of its state; consumers only
//! ever receive the summary, a `Copy` snapshot they cannot write back
//! through.
//!
//! ## Tick Order
//!
//! ```text
//! 1. dt        ← clamp(elapsed)
//! 2. rollover  ← zero today's totals + SoC baseline together if the day key changed
//! 3. channels  ← raw, EMA, noise floor (idle candidates only), quality
//! 4. deadband  ← max(min, K·max(noise_in, noise_out))
//! 5. integrate ← gated Wh into today's totals
//! 6. classify  ← power state, power path, idle dwell
//! 7. rolling   ← hourly bucket update, sums recomputed
//! 8. soc       ← ΔWh counting, confidence, voltage anchor
//! ```
//!
//! Step 2 runs before step 5 so the first tick of a new day integrates into
//! fresh totals and the SoC delta for that tick is just the tick's own energy.
//!
//! ## Example
//!
//! ```rust
//! use sunwatch_core::{
//!     EnergyEstimator, EstimatorConfig, PowerTick, ChannelReading, PowerState,
//!     calendar::ZonedCalendar,
//! };
//!
//! let mut estimator = EnergyEstimator::new(EstimatorConfig::default(), ZonedCalendar::utc());
//! let tick = PowerTick::new(Some(1000))
//!     .with_input(ChannelReading::power(2.0))
//!     .with_output(ChannelReading::power(0.0))
//!     .with_battery_voltage(3.9);
//!
//! let summary = estimator.tick(1_717_200_000_000, &tick);
//! assert_eq!(summary.power_state, PowerState::Charging);
//! ```

use crate::{
    config::EstimatorConfig,
    errors::ConfigResult,
    power::{
        channel::{track_channels, ChannelReading, ChannelSummary, PowerChannel},
        classifier::{
            classify_power_path, classify_power_state, IdleTimer, PowerPathState, PowerState,
        },
        deadband::{deadband_w, integrate_wh, EnergyTotals},
        rolling::RollingWindow,
        soc::{SocEstimator, SocInputs},
    },
    time::{ElapsedTime, Timestamp},
    traits::{Calendar, DayKey},
};

/// Per-tick input from the device model
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct PowerTick {
    /// Milliseconds since the previous tick; `None` means 1000
    pub elapsed_ms: Option<u64>,
    /// Solar/input channel
    pub input: ChannelReading,
    /// Load/output channel
    pub output: ChannelReading,
    /// Battery terminal voltage, if measured this tick
    pub battery_voltage_v: Option<f32>,
    /// Usable battery capacity, if reported (Wh)
    pub battery_capacity_wh: Option<f32>,
}

impl PowerTick {
    /// Tick with both channels at zero power and no voltage or current
    pub fn new(elapsed_ms: Option<u64>) -> Self {
        Self {
            elapsed_ms,
            input: ChannelReading::power(0.0),
            output: ChannelReading::power(0.0),
            ..Self::default()
        }
    }

    /// Set the input channel reading
    pub fn with_input(mut self, reading: ChannelReading) -> Self {
        self.input = reading;
        self
    }

    /// Set the output channel reading
    pub fn with_output(mut self, reading: ChannelReading) -> Self {
        self.output = reading;
        self
    }

    /// Set the battery voltage
    pub fn with_battery_voltage(mut self, voltage_v: f32) -> Self {
        self.battery_voltage_v = Some(voltage_v);
        self
    }

    /// Set the usable capacity
    pub fn with_capacity_wh(mut self, capacity_wh: f32) -> Self {
        self.battery_capacity_wh = Some(capacity_wh);
        self
    }
}

/// Published, read-only view of the power pipeline
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct EnergySummary {
    /// Input channel
    pub input: ChannelSummary,
    /// Output channel
    pub output: ChannelSummary,
    /// Energy in since reference-day midnight (Wh)
    pub wh_in_today: f32,
    /// Energy out since reference-day midnight (Wh)
    pub wh_out_today: f32,
    /// Net energy since reference-day midnight (Wh)
    pub wh_net_today: f32,
    /// Energy in over the rolling window (Wh)
    pub rolling_wh_in: f32,
    /// Energy out over the rolling window (Wh)
    pub rolling_wh_out: f32,
    /// Net energy over the rolling window (Wh)
    pub rolling_wh_net: f32,
    /// Retained rolling buckets
    pub rolling_bucket_count: usize,
    /// Coarse battery flow state
    pub power_state: PowerState,
    /// Dominant energy path
    pub power_path_state: PowerPathState,
    /// State-of-charge estimate in [0, 1]
    pub soc_est: f32,
    /// Confidence in `soc_est`, in [0, 1]
    pub soc_confidence: f32,
    /// Current deadband (W)
    pub deadband_w: f32,
    /// Continuous idle dwell (s)
    pub idle_seconds: f32,
    /// Whether the voltage anchor ran this tick
    pub anchor_active: bool,
    /// When the voltage anchor last ran
    pub last_anchor_ms: Option<Timestamp>,
    /// Reference-timezone day the totals belong to
    pub day_key: Option<DayKey>,
}

/// Power/charge estimation engine
#[derive(Debug, Clone)]
pub struct EnergyEstimator<C: Calendar> {
    config: EstimatorConfig,
    calendar: C,
    input: PowerChannel,
    output: PowerChannel,
    totals: EnergyTotals,
    rolling: RollingWindow,
    idle: IdleTimer,
    soc: SocEstimator,
    power_state: PowerState,
    power_path_state: PowerPathState,
    deadband_w: f32,
}

impl<C: Calendar> EnergyEstimator<C> {
    /// Build an estimator, clamping degenerate configuration values
    pub fn new(config: EstimatorConfig, calendar: C) -> Self {
        if let Err(e) = config.validate() {
            log_warn!("estimator config sanitised: {}", e);
        }
        Self::from_config(config.sanitized(), calendar)
    }

    /// Build an estimator, rejecting invalid configuration
    pub fn try_new(config: EstimatorConfig, calendar: C) -> ConfigResult<Self> {
        config.validate()?;
        Ok(Self::from_config(config, calendar))
    }

    fn from_config(config: EstimatorConfig, calendar: C) -> Self {
        Self {
            input: PowerChannel::new(&config),
            output: PowerChannel::new(&config),
            totals: EnergyTotals::new(),
            rolling: RollingWindow::new(config.rolling_buckets),
            idle: IdleTimer::default(),
            soc: SocEstimator::new(&config),
            power_state: PowerState::Unknown,
            power_path_state: PowerPathState::Unknown,
            deadband_w: config.deadband_min_w,
            config,
            calendar,
        }
    }

    /// Run one tick at wall-clock time `now`
    pub fn tick(&mut self, now: Timestamp, tick: &PowerTick) -> EnergySummary {
        let dt = ElapsedTime::from_millis(tick.elapsed_ms, self.config.max_dt_s);
        if dt.was_clamped() {
            log_debug!("elapsed {:?}ms clamped to {}s", tick.elapsed_ms, dt.seconds());
        }
        let dt_s = dt.seconds();
        let parts = self.calendar.resolve(now);

        if self.totals.roll_to(parts.day_key) {
            self.soc.reset_baseline(self.totals.wh_net());
            log_info!("day rollover to {}, totals reset", parts.day_key);
        }

        let config = &self.config;
        track_channels(&mut self.input, &mut self.output, &tick.input, &tick.output, dt_s, config);

        self.deadband_w =
            deadband_w(self.input.noise_floor_w(), self.output.noise_floor_w(), config);

        let wh_in = integrate_wh(self.input.raw_w(), dt_s, self.deadband_w);
        let wh_out = integrate_wh(self.output.raw_w(), dt_s, self.deadband_w);
        self.totals.accumulate(wh_in, wh_out);

        let (in_ema, out_ema) = (self.input.ema_w(), self.output.ema_w());
        self.power_state =
            classify_power_state(in_ema, out_ema, self.deadband_w, config.path_margin_w);
        self.power_path_state =
            classify_power_path(in_ema, out_ema, config.path_active_w, config.path_margin_w);
        let idle_s = self.idle.update(self.power_state, dt_s);

        self.rolling.record(parts.hour_key, wh_in, wh_out);

        let capacity_wh = tick
            .battery_capacity_wh
            .filter(|c| c.is_finite())
            .unwrap_or(config.capacity_wh)
            .max(config.min_capacity_wh);

        self.soc.update(
            &SocInputs {
                net_wh_today: self.totals.wh_net(),
                capacity_wh,
                dt_s,
                idle_s,
                quality_in: self.input.quality(),
                quality_out: self.output.quality(),
                unstable: self.input.deviation_w() > config.instability_w,
                power_state: self.power_state,
                battery_voltage_v: tick.battery_voltage_v,
                now,
            },
            config,
        );

        self.summary()
    }

    /// Snapshot of every published value
    pub fn summary(&self) -> EnergySummary {
        EnergySummary {
            input: self.input.summary(),
            output: self.output.summary(),
            wh_in_today: self.totals.wh_in(),
            wh_out_today: self.totals.wh_out(),
            wh_net_today: self.totals.wh_net(),
            rolling_wh_in: self.rolling.wh_in(),
            rolling_wh_out: self.rolling.wh_out(),
            rolling_wh_net: self.rolling.wh_net(),
            rolling_bucket_count: self.rolling.len(),
            power_state: self.power_state,
            power_path_state: self.power_path_state,
            soc_est: self.soc.soc(),
            soc_confidence: self.soc.confidence(),
            deadband_w: self.deadband_w,
            idle_seconds: self.idle.seconds(),
            anchor_active: self.soc.anchor_active(),
            last_anchor_ms: self.soc.last_anchor_ms(),
            day_key: self.totals.day_key(),
        }
    }

    /// Restore every documented default, keeping config and calendar
    pub fn reset(&mut self) {
        let config = self.config.clone();
        self.input = PowerChannel::new(&config);
        self.output = PowerChannel::new(&config);
        self.totals = EnergyTotals::new();
        self.rolling = RollingWindow::new(config.rolling_buckets);
        self.idle = IdleTimer::default();
        self.soc = SocEstimator::new(&config);
        self.power_state = PowerState::Unknown;
        self.power_path_state = PowerPathState::Unknown;
        self.deadband_w = config.deadband_min_w;
    }

    /// Active (sanitised) configuration
    pub fn config(&self) -> &EstimatorConfig {
        &self.config
    }

    /// Read-only access to the rolling window buckets
    pub fn rolling_window(&self) -> &RollingWindow {
        &self.rolling
    }
}
