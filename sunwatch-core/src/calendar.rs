//! Reference-Timezone Calendar
//!
//! [`ZonedCalendar`] resolves timestamps with any `chrono::TimeZone`:
//!
//! - `chrono::Utc` or `chrono::FixedOffset` for devices that keep standard
//!   time all year (and for deterministic tests)
//! - `chrono_tz::Tz` for hosts that want daylight-saving aware keys
//!
//! ## Key Layout
//!
//! ```text
//! day_key  = days since 0001-01-01 (proleptic Gregorian, local date)
//! hour_key = day_key * 24 + local hour
//! minute   = local hour * 60 + local minute
//! ```
//!
//! Hour keys stay distinct across a DST fall-back hour repeat only if the
//! zone reports different local hours; a repeated local hour maps onto the
//! same bucket, which is the behaviour a wall-clock rolling window wants.

use chrono::{DateTime, Datelike, TimeZone, Timelike, Utc};

use crate::{
    constants::time::{HOURS_PER_DAY, MINUTES_PER_HOUR, MS_PER_SECOND},
    time::Timestamp,
    traits::{Calendar, CalendarParts, DayKey, HourKey},
};

/// Calendar bound to one reference timezone
#[derive(Debug, Clone)]
pub struct ZonedCalendar<Tz: TimeZone> {
    zone: Tz,
}

impl<Tz: TimeZone> ZonedCalendar<Tz> {
    /// Resolve calendar keys in `zone`
    pub fn new(zone: Tz) -> Self {
        Self { zone }
    }

    /// The reference timezone
    pub fn zone(&self) -> &Tz {
        &self.zone
    }
}

impl ZonedCalendar<Utc> {
    /// Calendar keyed on UTC days
    pub fn utc() -> Self {
        Self::new(Utc)
    }
}

impl Default for ZonedCalendar<Utc> {
    fn default() -> Self {
        Self::utc()
    }
}

impl<Tz: TimeZone> Calendar for ZonedCalendar<Tz> {
    fn resolve(&self, timestamp: Timestamp) -> CalendarParts {
        // Timestamps past i64::MAX ms or outside chrono's range fall back to the epoch
        let utc = i64::try_from(timestamp)
            .ok()
            .and_then(DateTime::<Utc>::from_timestamp_millis)
            .unwrap_or_default();
        let local = utc.with_timezone(&self.zone);

        let day_key: DayKey = local.num_days_from_ce();
        let hour = local.hour();
        let hour_key: HourKey = day_key as HourKey * HOURS_PER_DAY as HourKey + hour as HourKey;
        let minute_of_day = hour * MINUTES_PER_HOUR + local.minute();
        let ms_of_day = local.num_seconds_from_midnight() as u64 * MS_PER_SECOND
            + (local.nanosecond() / 1_000_000).min(999) as u64;

        CalendarParts {
            day_key,
            hour_key,
            minute_of_day,
            ms_of_day,
        }
    }
}
