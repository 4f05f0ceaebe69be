//! Unified error type for standby-watch.
//!
//! We avoid `alloc` - all error variants carry only fixed-size data.
//! Implements `defmt::Format` for efficient on-target logging.

/// Top-level error type used across the application.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum Error {
    // UI / Display
    /// The GUI draw buffer could not be allocated (zero length).
    DrawBufferUnavailable,

    /// A flushed region does not fit the draw buffer or the screen.
    InvalidArea,

    /// SPI transaction to the display failed.
    Display,

    /// I²C transaction to the touch controller failed.
    Touch,

    // Companion link
    /// The SoftDevice returned a BLE-level error.
    Ble(BleError),

    /// A link queue is full and the item was dropped.
    QueueFull,

    /// The phone sent a date or time outside the calendar.
    InvalidDateTime,
}

/// Subset of BLE errors we propagate (keeps the enum `Copy`-friendly).
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "defmt", derive(defmt::Format))]
pub enum BleError {
    /// Advertising could not start or timed out.
    AdvertiseFailed,
    /// Advertising payload did not fit in 31 bytes.
    AdvertisementTooLong,
}

// Convenience conversions

impl From<BleError> for Error {
    fn from(e: BleError) -> Self {
        Error::Ble(e)
    }
}

impl core::fmt::Display for Error {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        match self {
            Error::DrawBufferUnavailable => f.write_str("draw buffer allocation failed"),
            Error::InvalidArea => f.write_str("flush area out of bounds"),
            Error::Display => f.write_str("display bus error"),
            Error::Touch => f.write_str("touch controller error"),
            Error::Ble(e) => write!(f, "ble error: {:?}", e),
            Error::QueueFull => f.write_str("queue full"),
            Error::InvalidDateTime => f.write_str("invalid date or time"),
        }
    }
}

pub type Result<T> = core::result::Result<T, Error>;
