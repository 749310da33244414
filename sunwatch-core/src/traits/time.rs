//! Time Source Abstraction
//!
//! Hosts feed the estimator timestamps they read themselves, but simulation
//! drivers and firmware loops both need a common way to ask "what time is
//! it". `TimeSource` is that seam.
//!
//! ## Common Implementations
//!
//! - `SystemTime`: wall clock (may jump due to NTP)
//! - `FixedTime`: controllable time for tests and simulators

use crate::time::Timestamp;

/// Source of time for the host loop
///
/// ## Example Implementation
///
/// ```rust
/// use sunwatch_core::traits::TimeSource;
/// use sunwatch_core::time::Timestamp;
///
/// struct RtcTimeSource {
///     // ... RTC peripheral handle
/// }
///
/// impl TimeSource for RtcTimeSource {
///     fn now(&self) -> Timestamp {
///         // Read the battery-backed RTC and convert to ms since epoch
///         0 // placeholder
///     }
///
///     fn is_wall_clock(&self) -> bool {
///         true
///     }
/// }
/// ```
pub trait TimeSource: Send {
    /// Get current timestamp in milliseconds since the Unix epoch
    fn now(&self) -> Timestamp;

    /// Check if this source provides wall clock time (vs simulated)
    ///
    /// Calendar keys derived from a non-wall-clock source are only as
    /// meaningful as the epoch the source was started at.
    fn is_wall_clock(&self) -> bool;
}
