//! Configuration Error Types
//!
//! ## Design Philosophy
//!
//! The estimation ticks never fail: malformed or missing readings resolve to
//! documented fallbacks and the worst outcome is an `Unknown` classification
//! or low confidence. The only fallible surface is configuration, checked once
//! when an estimator is built.
//!
//! Like the rest of the crate these errors are built for embedded hosts:
//!
//! 1. **No Heap Allocation**: field names are `&'static str`, values are inline.
//! 2. **Copy Semantics**: errors are small enough to return and store by value.
//! 3. **Actionable**: each variant names the offending field and the bound it broke.
//!
//! ## Usage
//!
//! ```rust
//! use sunwatch_core::{ConfigError, EstimatorConfig};
//!
//! let config = EstimatorConfig::default().with_power_tau_s(-1.0);
//! match config.validate() {
//!     Err(ConfigError::NonPositive { field, .. }) => assert_eq!(field, "power_tau_s"),
//!     other => panic!("unexpected: {:?}", other),
//! }
//! ```

use thiserror_no_std::Error;

/// Result type for configuration checks
pub type ConfigResult<T> = Result<T, ConfigError>;

/// Configuration errors - kept small for embedded use
#[derive(Error, Debug, Clone, Copy, PartialEq)]
pub enum ConfigError {
    /// A time constant, rate or capacity that must be strictly positive
    #[error("{field} must be positive, got {value}")]
    NonPositive {
        /// Name of the offending configuration field
        field: &'static str,
        /// Value that was supplied
        value: f32,
    },

    /// A lower/upper pair supplied in the wrong order
    #[error("{field}: lower bound {low} must be below upper bound {high}")]
    InvalidRange {
        /// Name of the offending configuration pair
        field: &'static str,
        /// Supplied lower bound
        low: f32,
        /// Supplied upper bound
        high: f32,
    },

    /// A scalar outside the interval it is defined on
    #[error("{field} = {value} outside [{min}, {max}]")]
    OutOfBounds {
        /// Name of the offending configuration field
        field: &'static str,
        /// Value that was supplied
        value: f32,
        /// Smallest accepted value
        min: f32,
        /// Largest accepted value
        max: f32,
    },

    /// A count larger than the fixed storage behind it
    #[error("Requested {requested} slots, storage holds {max}")]
    CapacityExceeded {
        /// Count that was asked for
        requested: usize,
        /// Fixed storage capacity
        max: usize,
    },
}

#[cfg(feature = "defmt")]
impl defmt::Format for ConfigError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::NonPositive { field, value } => {
                defmt::write!(fmt, "{} must be positive, got {}", field, value)
            }
            Self::InvalidRange { field, low, high } => {
                defmt::write!(fmt, "{}: {} !< {}", field, low, high)
            }
            Self::OutOfBounds { field, value, min, max } => {
                defmt::write!(fmt, "{} = {} outside [{}, {}]", field, value, min, max)
            }
            Self::CapacityExceeded { requested, max } => {
                defmt::write!(fmt, "Requested {} slots, storage holds {}", requested, max)
            }
        }
    }
}

/// Check that a finite value is strictly positive
pub(crate) fn check_positive(field: &'static str, value: f32) -> ConfigResult<()> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        Err(ConfigError::NonPositive { field, value })
    }
}

/// Check that a finite value lies inside `[min, max]`
pub(crate) fn check_bounds(
    field: &'static str,
    value: f32,
    min: f32,
    max: f32,
) -> ConfigResult<()> {
    if value.is_finite() && value >= min && value <= max {
        Ok(())
    } else {
        Err(ConfigError::OutOfBounds {
            field,
            value,
            min,
            max,
        })
    }
}

/// Check that `high` sits at least `gap` above `low`
pub(crate) fn check_gap(field: &'static str, low: f32, high: f32, gap: f32) -> ConfigResult<()> {
    if low.is_finite() && high.is_finite() && high >= low + gap {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { field, low, high })
    }
}

/// Check that `low < high`
pub(crate) fn check_ordered(field: &'static str, low: f32, high: f32) -> ConfigResult<()> {
    if low.is_finite() && high.is_finite() && low < high {
        Ok(())
    } else {
        Err(ConfigError::InvalidRange { field, low, high })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn positive_check() {
        assert!(check_positive("tau", 1.0).is_ok());
        assert!(check_positive("tau", 0.0).is_err());
        assert!(check_positive("tau", f32::NAN).is_err());
    }

    #[test]
    fn bounds_check() {
        assert!(check_bounds("fraction", 0.5, 0.0, 1.0).is_ok());
        assert_eq!(
            check_bounds("fraction", 1.5, 0.0, 1.0),
            Err(ConfigError::OutOfBounds {
                field: "fraction",
                value: 1.5,
                min: 0.0,
                max: 1.0,
            })
        );
    }

    #[test]
    fn ordered_check() {
        assert!(check_ordered("voltage", 3.0, 4.2).is_ok());
        assert!(check_ordered("voltage", 4.2, 3.0).is_err());
        assert!(check_ordered("voltage", 3.0, 3.0).is_err());
    }

    #[test]
    fn gap_check() {
        assert!(check_gap("envelope", 2.0, 3.0, 1.0).is_ok());
        assert_eq!(
            check_gap("envelope", 2.0, 2.5, 1.0),
            Err(ConfigError::InvalidRange {
                field: "envelope",
                low: 2.0,
                high: 2.5,
            })
        );
        assert!(check_gap("envelope", 2.0, f32::INFINITY, 1.0).is_err());
    }
}
