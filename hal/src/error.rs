//! Common error types for HAL operations

use core::fmt;

/// HAL operation errors
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HalError {
    /// Invalid parameter provided (pin out of range, zero baud rate, ...)
    InvalidParameter,
    /// Peripheral is busy
    Busy,
    /// Operation timed out
    Timeout,
    /// Hardware error occurred
    HardwareError,
    /// Every UART handle slot is taken
    RegistryFull,
    /// Handle was never initialized or has been torn down
    NotRegistered,
    /// Vendor-specific error code
    VendorError(i32),
}

impl fmt::Display for HalError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::InvalidParameter => write!(f, "invalid parameter"),
            Self::Busy => write!(f, "peripheral busy"),
            Self::Timeout => write!(f, "operation timeout"),
            Self::HardwareError => write!(f, "hardware error"),
            Self::RegistryFull => write!(f, "handle registry full"),
            Self::NotRegistered => write!(f, "handle not registered"),
            Self::VendorError(code) => write!(f, "vendor error code: {}", code),
        }
    }
}

#[cfg(feature = "std")]
impl std::error::Error for HalError {}

#[cfg(feature = "defmt")]
impl defmt::Format for HalError {
    fn format(&self, fmt: defmt::Formatter) {
        match self {
            Self::InvalidParameter => defmt::write!(fmt, "InvalidParameter"),
            Self::Busy => defmt::write!(fmt, "Busy"),
            Self::Timeout => defmt::write!(fmt, "Timeout"),
            Self::HardwareError => defmt::write!(fmt, "HardwareError"),
            Self::RegistryFull => defmt::write!(fmt, "RegistryFull"),
            Self::NotRegistered => defmt::write!(fmt, "NotRegistered"),
            Self::VendorError(code) => defmt::write!(fmt, "VendorError({})", code),
        }
    }
}

impl embedded_hal::digital::Error for HalError {
    fn kind(&self) -> embedded_hal::digital::ErrorKind {
        embedded_hal::digital::ErrorKind::Other
    }
}

/// Result type for HAL operations
pub type HalResult<T> = Result<T, HalError>;
