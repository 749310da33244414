//! Power & Charge Estimation
//!
//! The components the [`EnergyEstimator`](crate::EnergyEstimator) runs each
//! tick, leaves first:
//!
//! ```text
//! readings ─► channel ─► deadband ─► integrator ─► rolling
//!                │           │                        │
//!                └──► classifier ◄────┘               │
//!                        │ idle dwell                 │
//!                        ▼                            │
//!                       soc ◄──── ΔWh net ────────────┘
//! ```
//!
//! - [`channel`] - raw/EMA smoothing, idle-noise learning, signal quality
//! - [`deadband`] - dynamic noise threshold, gated Wh integration, daily totals
//! - [`classifier`] - power state, power path, idle dwell
//! - [`rolling`] - hourly 24 h window
//! - [`soc`] - Wh counting with voltage-anchor correction

pub mod channel;
pub mod classifier;
pub mod deadband;
pub mod rolling;
pub mod soc;

pub use channel::{ChannelReading, ChannelSummary, PowerChannel};
pub use classifier::{IdleTimer, PowerPathState, PowerState};
pub use deadband::EnergyTotals;
pub use rolling::{HourBucket, RollingWindow};
pub use soc::{soc_from_voltage, voltage_for_soc, SocEstimator};
