//! Error types for the CH341A adapter

use std::fmt;

use ch341_i2c_core::error::DriverError;

/// Result type for CH341A operations
pub type Result<T> = std::result::Result<T, Ch341aError>;

/// Errors that can occur when using the CH341A
#[derive(Debug)]
pub enum Ch341aError {
    /// No CH341A at the requested index
    DeviceNotFound(usize),
    /// Failed to open device
    OpenFailed(String),
    /// Failed to claim interface
    ClaimFailed(String),
    /// USB transfer failed
    TransferFailed(String),
    /// Invalid response from device
    InvalidResponse,
    /// Timeout during operation
    Timeout,
    /// Device has already been closed
    Closed,
}

impl fmt::Display for Ch341aError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Ch341aError::DeviceNotFound(index) => {
                write!(f, "CH341A device #{} not found (VID:1a86 PID:5512)", index)
            }
            Ch341aError::OpenFailed(msg) => write!(f, "Failed to open CH341A: {}", msg),
            Ch341aError::ClaimFailed(msg) => write!(f, "Failed to claim interface: {}", msg),
            Ch341aError::TransferFailed(msg) => write!(f, "USB transfer failed: {}", msg),
            Ch341aError::InvalidResponse => write!(f, "Invalid response from CH341A"),
            Ch341aError::Timeout => write!(f, "Timeout during USB transfer"),
            Ch341aError::Closed => write!(f, "CH341A device is closed"),
        }
    }
}

impl std::error::Error for Ch341aError {}

impl From<Ch341aError> for DriverError {
    fn from(e: Ch341aError) -> Self {
        match e {
            Ch341aError::DeviceNotFound(_)
            | Ch341aError::OpenFailed(_)
            | Ch341aError::ClaimFailed(_) => DriverError::OpenFailed(e.to_string()),
            Ch341aError::Closed => DriverError::Closed,
            Ch341aError::TransferFailed(_) | Ch341aError::InvalidResponse | Ch341aError::Timeout => {
                DriverError::TransferFailed(e.to_string())
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_driver_error_mapping() {
        assert!(matches!(
            DriverError::from(Ch341aError::DeviceNotFound(2)),
            DriverError::OpenFailed(msg) if msg.contains("#2")
        ));
        assert_eq!(DriverError::from(Ch341aError::Closed), DriverError::Closed);
        assert!(matches!(
            DriverError::from(Ch341aError::Timeout),
            DriverError::TransferFailed(_)
        ));
    }
}
