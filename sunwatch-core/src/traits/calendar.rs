//! Calendar Abstraction
//!
//! Day rollover, the hourly rolling window and sunset learning all need to
//! know where a timestamp falls in the *reference* timezone's day, not the
//! host's locale. The `Calendar` trait isolates that lookup so tests can pin
//! a fixed offset and firmware can plug in whatever zone data it carries.

use crate::time::Timestamp;

/// Calendar key for one reference-timezone day (days since 0001-01-01)
pub type DayKey = i32;

/// Calendar key for one reference-timezone hour (`day_key * 24 + hour`)
pub type HourKey = i64;

/// Where a timestamp falls in the reference timezone
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct CalendarParts {
    /// Reference-timezone day
    pub day_key: DayKey,
    /// Reference-timezone hour
    pub hour_key: HourKey,
    /// Minute of the reference day, 0..1440
    pub minute_of_day: u32,
    /// Milliseconds elapsed since the reference day's local midnight
    pub ms_of_day: u64,
}

/// Resolves timestamps to reference-timezone calendar parts
///
/// Implementations must be pure: the same timestamp always yields the same
/// parts. A timestamp that cannot be represented must still resolve to
/// *some* parts rather than panic.
pub trait Calendar {
    /// Resolve a timestamp
    fn resolve(&self, timestamp: Timestamp) -> CalendarParts;

    /// Day key only
    fn day_key(&self, timestamp: Timestamp) -> DayKey {
        self.resolve(timestamp).day_key
    }

    /// Hour key only
    fn hour_key(&self, timestamp: Timestamp) -> HourKey {
        self.resolve(timestamp).hour_key
    }

    /// Minute of the reference day only
    fn minute_of_day(&self, timestamp: Timestamp) -> u32 {
        self.resolve(timestamp).minute_of_day
    }
}

impl<C: Calendar + ?Sized> Calendar for &C {
    fn resolve(&self, timestamp: Timestamp) -> CalendarParts {
        (**self).resolve(timestamp)
    }
}
