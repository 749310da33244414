//! Adaptive telemetry interpretation for solar-powered devices
//!
//! Turns noisy, irregularly sampled power and light readings into stable,
//! confidence-scored signals: battery state of charge, power-flow
//! topology, and a learned day/night boundary. The layer only publishes;
//! it never makes or reads control decisions.
//!
//! Key constraints:
//! - Runs `no_std` without an allocator (fixed-size rolling window)
//! - Ticks never fail; bad readings degrade to `Unknown` or low confidence
//! - All smoothing is continuous-time, so cadence may vary tick to tick
//!
//! ```rust
//! use sunwatch_core::{
//!     ChannelReading, DayNightConfig, EstimatorConfig, LightTick, PowerTick,
//!     TelemetryFrame, TelemetryLayer, ZonedCalendar,
//! };
//!
//! let mut layer = TelemetryLayer::new(
//!     EstimatorConfig::default(),
//!     DayNightConfig::default(),
//!     ZonedCalendar::utc(),
//! );
//!
//! let view = layer.tick(&TelemetryFrame {
//!     timestamp: 1_717_243_200_000,
//!     power: PowerTick::new(Some(1000))
//!         .with_input(ChannelReading::power(1.2))
//!         .with_output(ChannelReading::power(0.3))
//!         .with_battery_voltage(3.85),
//!     light: LightTick::new(Some(1000), 640.0),
//! });
//!
//! assert!((0.0..=1.0).contains(&view.energy.soc_est));
//! assert!(view.daynight.is_day);
//! ```

#![cfg_attr(not(feature = "std"), no_std)]
#![deny(unsafe_code)]
#![warn(missing_docs)]

#[macro_use]
mod logging;

pub mod calendar;
pub mod config;
pub mod constants;
pub mod daynight;
pub mod errors;
pub mod estimator;
pub mod filter;
pub mod layer;
pub mod power;
pub mod time;
pub mod traits;

// Public API
pub use calendar::ZonedCalendar;
pub use config::{BatteryChemistry, DayNightConfig, EstimatorConfig};
pub use daynight::{DayNightLearner, DayNightSummary, LightTick, SunsetSignal};
pub use errors::{ConfigError, ConfigResult};
pub use estimator::{EnergyEstimator, EnergySummary, PowerTick};
pub use layer::{TelemetryFrame, TelemetryLayer, TelemetryView};
pub use power::{ChannelReading, ChannelSummary, PowerPathState, PowerState};
pub use time::Timestamp;
pub use traits::{Calendar, CalendarParts, TimeSource};

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
