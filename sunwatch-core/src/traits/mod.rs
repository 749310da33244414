//! Core Traits and Abstractions
//!
//! The seams where a host plugs its own environment into the estimators.
//!
//! ## Module Organization
//!
//! - [`time`] - Time source abstraction for host loops
//! - [`calendar`] - Reference-timezone calendar resolution
//!
//! Both are deliberately narrow: the estimators only ever need "now" and
//! "which day/hour/minute is this", and tests need to control both.

pub mod calendar;
pub mod time;

pub use calendar::{Calendar, CalendarParts, DayKey, HourKey};
pub use time::TimeSource;
