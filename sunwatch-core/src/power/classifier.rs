//! Power State & Power-Path Classifier
//!
//! Both classifications are pure functions of the two channel EMAs and the
//! thresholds; nothing about the previous tick's label is remembered. The
//! only state this module carries is [`IdleTimer`], which gates the
//! voltage anchor in the SoC estimator.
//!
//! ## Power State
//!
//! | input > db | output > db | net flow             | state         |
//! |------------|-------------|----------------------|---------------|
//! | no         | no          | -                    | `Idle`        |
//! | yes        | no          | -                    | `Charging`    |
//! | no         | yes         | -                    | `Discharging` |
//! | yes        | yes         | in ≥ out + margin    | `Charging`    |
//! | yes        | yes         | out ≥ in + margin    | `Discharging` |
//! | yes        | yes         | within ±margin       | `Mixed`       |
//!
//! ## Power Path
//!
//! Uses the fixed activity threshold `th` instead of the deadband:
//!
//! | input > th | output > th | relation          | path          |
//! |------------|-------------|-------------------|---------------|
//! | yes        | no          | -                 | `Float`       |
//! | no         | yes         | -                 | `BattToLoad`  |
//! | yes        | yes         | out ≥ in + m      | `BattToLoad`  |
//! | yes        | yes         | in ≥ out + m      | `SolarToBatt` |
//! | yes        | yes         | within ±m         | `SolarToLoad` |
//! | no         | no          | -                 | `Unknown`     |

use core::fmt;

/// Coarse energy-flow state of the battery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PowerState {
    /// Not yet classified
    #[default]
    Unknown,
    /// Both channels inside the deadband
    Idle,
    /// Net flow into the battery
    Charging,
    /// Net flow out of the battery
    Discharging,
    /// Both channels active with no clear net direction
    Mixed,
}

impl PowerState {
    /// Stable upper-case label
    pub const fn as_str(&self) -> &'static str {
        match self {
            PowerState::Unknown => "UNKNOWN",
            PowerState::Idle => "IDLE",
            PowerState::Charging => "CHARGING",
            PowerState::Discharging => "DISCHARGING",
            PowerState::Mixed => "MIXED",
        }
    }
}

impl fmt::Display for PowerState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

/// Dominant direction of energy among source, load and storage
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "serde", serde(rename_all = "SCREAMING_SNAKE_CASE"))]
pub enum PowerPathState {
    /// No channel active
    #[default]
    Unknown,
    /// Solar input only, battery floating
    Float,
    /// Solar covers the load with little left over
    SolarToLoad,
    /// Solar surplus charging the battery
    SolarToBatt,
    /// Battery supplying the load
    BattToLoad,
}

impl PowerPathState {
    /// Stable upper-case label
    pub const fn as_str(&self) -> &'static str {
        match self {
            PowerPathState::Unknown => "UNKNOWN",
            PowerPathState::Float => "FLOAT",
            PowerPathState::SolarToLoad => "SOLAR_TO_LOAD",
            PowerPathState::SolarToBatt => "SOLAR_TO_BATT",
            PowerPathState::BattToLoad => "BATT_TO_LOAD",
        }
    }
}

impl fmt::Display for PowerPathState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PowerState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.as_str())
    }
}

#[cfg(feature = "defmt")]
impl defmt::Format for PowerPathState {
    fn format(&self, fmt: defmt::Formatter) {
        defmt::write!(fmt, "{}", self.as_str())
    }
}

/// Classify the power state from channel EMAs and the deadband
pub fn classify_power_state(
    in_ema_w: f32,
    out_ema_w: f32,
    deadband_w: f32,
    margin_w: f32,
) -> PowerState {
    if !in_ema_w.is_finite() || !out_ema_w.is_finite() {
        return PowerState::Unknown;
    }

    let input_active = in_ema_w > deadband_w;
    let output_active = out_ema_w > deadband_w;

    match (input_active, output_active) {
        (false, false) => PowerState::Idle,
        (true, false) => PowerState::Charging,
        (false, true) => PowerState::Discharging,
        (true, true) if in_ema_w >= out_ema_w + margin_w => PowerState::Charging,
        (true, true) if out_ema_w >= in_ema_w + margin_w => PowerState::Discharging,
        (true, true) => PowerState::Mixed,
    }
}

/// Classify the power path from channel EMAs
pub fn classify_power_path(
    in_ema_w: f32,
    out_ema_w: f32,
    active_w: f32,
    margin_w: f32,
) -> PowerPathState {
    if !in_ema_w.is_finite() || !out_ema_w.is_finite() {
        return PowerPathState::Unknown;
    }

    let input_active = in_ema_w > active_w;
    let output_active = out_ema_w > active_w;

    match (input_active, output_active) {
        (true, false) => PowerPathState::Float,
        (false, true) => PowerPathState::BattToLoad,
        (true, true) if out_ema_w >= in_ema_w + margin_w => PowerPathState::BattToLoad,
        (true, true) if in_ema_w >= out_ema_w + margin_w => PowerPathState::SolarToBatt,
        (true, true) => PowerPathState::SolarToLoad,
        (false, false) => PowerPathState::Unknown,
    }
}

/// Continuous time spent in `PowerState::Idle`
#[derive(Debug, Clone, Copy, PartialEq, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct IdleTimer {
    seconds: f32,
}

impl IdleTimer {
    /// Accumulate while idle, reset otherwise; returns the new dwell
    pub fn update(&mut self, state: PowerState, dt_s: f32) -> f32 {
        if state == PowerState::Idle {
            self.seconds += dt_s.max(0.0);
        } else {
            self.seconds = 0.0;
        }
        self.seconds
    }

    /// Current idle dwell (s)
    pub fn seconds(&self) -> f32 {
        self.seconds
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const DB: f32 = 0.05;
    const M: f32 = 0.1;

    #[test]
    fn power_state_table() {
        assert_eq!(classify_power_state(0.01, 0.02, DB, M), PowerState::Idle);
        assert_eq!(classify_power_state(1.0, 0.0, DB, M), PowerState::Charging);
        assert_eq!(classify_power_state(0.0, 1.0, DB, M), PowerState::Discharging);
        assert_eq!(classify_power_state(0.5, 0.1, DB, M), PowerState::Charging);
        assert_eq!(classify_power_state(0.1, 0.5, DB, M), PowerState::Discharging);
        assert_eq!(classify_power_state(0.5, 0.45, DB, M), PowerState::Mixed);
        assert_eq!(classify_power_state(f32::NAN, 0.0, DB, M), PowerState::Unknown);
    }

    #[test]
    fn exactly_at_deadband_is_idle() {
        assert_eq!(classify_power_state(DB, DB, DB, M), PowerState::Idle);
    }

    #[test]
    fn power_path_table() {
        assert_eq!(classify_power_path(1.0, 0.0, DB, M), PowerPathState::Float);
        assert_eq!(classify_power_path(0.0, 1.0, DB, M), PowerPathState::BattToLoad);
        assert_eq!(classify_power_path(0.2, 0.5, DB, M), PowerPathState::BattToLoad);
        assert_eq!(classify_power_path(0.5, 0.1, DB, M), PowerPathState::SolarToBatt);
        assert_eq!(classify_power_path(0.5, 0.45, DB, M), PowerPathState::SolarToLoad);
        assert_eq!(classify_power_path(0.0, 0.0, DB, M), PowerPathState::Unknown);
    }

    #[test]
    fn idle_timer_resets_on_activity() {
        let mut timer = IdleTimer::default();
        timer.update(PowerState::Idle, 2.0);
        timer.update(PowerState::Idle, 3.0);
        assert_eq!(timer.seconds(), 5.0);

        timer.update(PowerState::Charging, 1.0);
        assert_eq!(timer.seconds(), 0.0);
    }

    #[test]
    fn labels() {
        assert_eq!(PowerState::Discharging.as_str(), "DISCHARGING");
        assert_eq!(PowerPathState::SolarToBatt.as_str(), "SOLAR_TO_BATT");
    }
}
