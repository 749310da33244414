//! Feature-gated logging macros
//!
//! Forward to the `log` facade when the `log` feature is on and compile to
//! nothing otherwise, so firmware builds without a logger pay no cost. The
//! disabled variants still type-check their arguments.

#[cfg(feature = "log")]
macro_rules! log_debug {
    ($($arg:tt)*) => { log::debug!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_debug {
    ($($arg:tt)*) => {{ if false { let _ = core::format_args!($($arg)*); } }};
}

#[cfg(feature = "log")]
macro_rules! log_info {
    ($($arg:tt)*) => { log::info!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_info {
    ($($arg:tt)*) => {{ if false { let _ = core::format_args!($($arg)*); } }};
}

#[cfg(feature = "log")]
macro_rules! log_warn {
    ($($arg:tt)*) => { log::warn!($($arg)*) };
}

#[cfg(not(feature = "log"))]
macro_rules! log_warn {
    ($($arg:tt)*) => {{ if false { let _ = core::format_args!($($arg)*); } }};
}
