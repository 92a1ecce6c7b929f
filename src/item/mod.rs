#[cfg(feature = "logger")]
/// This module provides a logger item writer, useful for debugging.
pub mod logger;

/// This module provides typed CSV item readers and writers.
pub mod csv;
