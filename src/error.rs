//! Error types for the console core

use defmt::Format;

/// Result type used by fallible hardware paths
pub type Result<T> = core::result::Result<T, Error>;

/// Error kinds surfaced by the core.
///
/// Only `HardwareInit` is fatal; it aborts bootstrap before the tasks
/// start. Everything else is absorbed where it occurs.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Format)]
pub enum Error {
    /// Expander bring-up failed during bootstrap
    HardwareInit,
    /// A single I²C transaction failed at runtime
    I2cTransient,
    /// A bounded queue rejected an element
    QueueFull,
    /// The offline buffer evicted its oldest event
    BufferOverflow,
}
