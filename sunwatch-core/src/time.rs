//! Time management for the estimation tick
//!
//! Two kinds of time flow into every tick:
//! - A wall-clock timestamp, used only for calendar keys (day, hour, minute)
//! - An elapsed interval, used for every smoothing and integration step
//!
//! Keeping them apart means a host whose clock is stepped by NTP still
//! integrates correctly, and a host with jittery poll intervals still lands
//! on the right calendar day.

use crate::constants::time::{DEFAULT_ELAPSED_MS, MAX_TICK_DT_S, MS_PER_SECOND};

pub use crate::traits::TimeSource;

/// Timestamp in milliseconds since the Unix epoch
pub type Timestamp = u64;

/// Sanitised elapsed time for one tick
///
/// Built from the host-reported milliseconds since the previous tick.
/// Missing values fall back to [`DEFAULT_ELAPSED_MS`]; values beyond the
/// configured ceiling are clamped so a suspend/resume cannot inject one
/// pathological step.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ElapsedTime {
    seconds: f32,
    clamped: bool,
}

impl ElapsedTime {
    /// Zero elapsed time (a no-op tick)
    pub const ZERO: Self = Self {
        seconds: 0.0,
        clamped: false,
    };

    /// Build from host-reported milliseconds, clamped to `max_dt_s`
    pub fn from_millis(elapsed_ms: Option<u64>, max_dt_s: f32) -> Self {
        let ms = elapsed_ms.unwrap_or(DEFAULT_ELAPSED_MS);
        let seconds = ms as f32 / MS_PER_SECOND as f32;
        let ceiling = if max_dt_s.is_finite() && max_dt_s > 0.0 {
            max_dt_s
        } else {
            MAX_TICK_DT_S
        };

        if seconds > ceiling {
            Self {
                seconds: ceiling,
                clamped: true,
            }
        } else {
            Self {
                seconds,
                clamped: false,
            }
        }
    }

    /// Elapsed seconds after clamping
    pub fn seconds(&self) -> f32 {
        self.seconds
    }

    /// Elapsed hours after clamping
    pub fn hours(&self) -> f32 {
        self.seconds / 3600.0
    }

    /// Whether the reported interval exceeded the ceiling
    pub fn was_clamped(&self) -> bool {
        self.clamped
    }

    /// Whether this tick carries no time at all
    pub fn is_zero(&self) -> bool {
        self.seconds <= 0.0
    }
}

/// System time source (requires std)
#[cfg(feature = "std")]
#[derive(Debug, Clone, Default)]
pub struct SystemTime;

#[cfg(feature = "std")]
impl TimeSource for SystemTime {
    fn now(&self) -> Timestamp {
        use std::time::{SystemTime as StdSystemTime, UNIX_EPOCH};

        StdSystemTime::now()
            .duration_since(UNIX_EPOCH)
            .unwrap_or_default()
            .as_millis() as Timestamp
    }

    fn is_wall_clock(&self) -> bool {
        true
    }
}

/// Fixed time source for testing and simulation drivers
#[derive(Debug, Clone)]
pub struct FixedTime {
    timestamp: Timestamp,
}

impl FixedTime {
    /// Start at the given timestamp
    pub fn new(timestamp: Timestamp) -> Self {
        Self { timestamp }
    }

    /// Jump to an absolute timestamp
    pub fn set(&mut self, timestamp: Timestamp) {
        self.timestamp = timestamp;
    }

    /// Move forward by `ms` milliseconds
    pub fn advance(&mut self, ms: u64) {
        self.timestamp = self.timestamp.saturating_add(ms);
    }
}

impl TimeSource for FixedTime {
    fn now(&self) -> Timestamp {
        self.timestamp
    }

    fn is_wall_clock(&self) -> bool {
        false
    }
}
