//! Telemetry Interpretation Layer
//!
//! Host-facing context bundling the energy estimator and the day/night
//! learner. The host owns one [`TelemetryLayer`], calls [`tick`] once per
//! poll interval, and hands the returned [`TelemetryView`] to whatever
//! consumes it. The view is a copy; nothing downstream can reach back into
//! estimator state.
//!
//! The two pipelines share only the frame timestamp.
//!
//! [`tick`]: TelemetryLayer::tick

use crate::{
    config::{DayNightConfig, EstimatorConfig},
    daynight::{DayNightLearner, DayNightSummary, LightTick},
    errors::ConfigResult,
    estimator::{EnergyEstimator, EnergySummary, PowerTick},
    time::{TimeSource, Timestamp},
    traits::Calendar,
};

/// Everything one tick needs
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetryFrame {
    /// Wall-clock time of the frame
    pub timestamp: Timestamp,
    /// Electrical readings
    pub power: PowerTick,
    /// Ambient light reading
    pub light: LightTick,
}

/// Read-only output of one tick
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct TelemetryView {
    /// Power/charge estimates
    pub energy: EnergySummary,
    /// Day/night estimates
    pub daynight: DayNightSummary,
}

/// Both interpretation pipelines behind a single tick
#[derive(Debug, Clone)]
pub struct TelemetryLayer<C: Calendar + Clone> {
    energy: EnergyEstimator<C>,
    daynight: DayNightLearner<C>,
}

impl<C: Calendar + Clone> TelemetryLayer<C> {
    /// Build both pipelines on the same calendar
    pub fn new(energy: EstimatorConfig, daynight: DayNightConfig, calendar: C) -> Self {
        Self {
            energy: EnergyEstimator::new(energy, calendar.clone()),
            daynight: DayNightLearner::new(daynight, calendar),
        }
    }

    /// Build both pipelines, rejecting invalid configuration
    pub fn try_new(
        energy: EstimatorConfig,
        daynight: DayNightConfig,
        calendar: C,
    ) -> ConfigResult<Self> {
        Ok(Self {
            energy: EnergyEstimator::try_new(energy, calendar.clone())?,
            daynight: DayNightLearner::try_new(daynight, calendar)?,
        })
    }

    /// Run both pipelines for one frame
    pub fn tick(&mut self, frame: &TelemetryFrame) -> TelemetryView {
        TelemetryView {
            energy: self.energy.tick(frame.timestamp, &frame.power),
            daynight: self.daynight.tick(frame.timestamp, &frame.light),
        }
    }

    /// Run one frame stamped by `clock`, ignoring `frame.timestamp`
    pub fn tick_with<T: TimeSource>(&mut self, clock: &T, frame: &TelemetryFrame) -> TelemetryView {
        let frame = TelemetryFrame {
            timestamp: clock.now(),
            ..*frame
        };
        self.tick(&frame)
    }

    /// Latest published values without advancing
    pub fn view(&self) -> TelemetryView {
        TelemetryView {
            energy: self.energy.summary(),
            daynight: self.daynight.summary(),
        }
    }

    /// Full state reset to documented defaults
    pub fn reset(&mut self) {
        self.energy.reset();
        self.daynight.reset();
    }

    /// Energy estimator
    pub fn energy(&self) -> &EnergyEstimator<C> {
        &self.energy
    }

    /// Day/night learner
    pub fn daynight(&self) -> &DayNightLearner<C> {
        &self.daynight
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{calendar::ZonedCalendar, power::ChannelReading, time::FixedTime, PowerState};

    const T0: Timestamp = 1_717_243_200_000;

    fn layer() -> TelemetryLayer<ZonedCalendar<chrono::Utc>> {
        TelemetryLayer::new(
            EstimatorConfig::default(),
            DayNightConfig::default(),
            ZonedCalendar::utc(),
        )
    }

    fn frame(timestamp: Timestamp) -> TelemetryFrame {
        TelemetryFrame {
            timestamp,
            power: PowerTick::new(Some(1000)).with_input(ChannelReading::power(2.0)),
            light: LightTick::new(Some(1000), 800.0),
        }
    }

    #[test]
    fn tick_drives_both_pipelines() {
        let mut layer = layer();
        let view = layer.tick(&frame(T0));

        assert_eq!(view.energy.power_state, PowerState::Charging);
        assert!(view.daynight.is_day);
        assert_eq!(layer.view(), view);
    }

    #[test]
    fn tick_with_uses_clock() {
        let mut layer = layer();
        let clock = FixedTime::new(T0 + 86_400_000);
        let view = layer.tick_with(&clock, &frame(0));

        assert_eq!(view.energy.day_key, Some(ZonedCalendar::utc().day_key(T0) + 1));
    }

    #[test]
    fn reset_clears_both_pipelines() {
        let mut layer = layer();
        for i in 0..30 {
            layer.tick(&frame(T0 + i * 1000));
        }
        assert!(layer.view().energy.wh_in_today > 0.0);
        layer.reset();

        let view = layer.view();
        assert_eq!(view.energy.wh_in_today, 0.0);
        assert_eq!(view.energy.power_state, PowerState::Unknown);
        assert!(!view.daynight.is_day);
        assert_eq!(view.daynight.sunset, Default::default());
    }
}
