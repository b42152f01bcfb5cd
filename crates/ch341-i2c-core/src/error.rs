//! Error types for ch341-i2c-core
//!
//! Errors fall into three groups, each handled where it is detected:
//! malformed user or file input ([`ValidationError`]), file access
//! ([`Error::Io`]) and adapter failures ([`DriverError`]).

use std::path::PathBuf;
use thiserror::Error;

/// A command, request or CSV record failed validation
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ValidationError {
    /// Device address is not a binary string of at most 7 digits
    #[error("invalid device address ({0})")]
    InvalidAddress(String),

    /// Register address is not a binary string of at most 8 digits
    #[error("invalid register address ({0})")]
    InvalidRegister(String),

    /// A write data token is not a binary string of at most 8 digits
    #[error("invalid write data ({0})")]
    InvalidData(String),

    /// Register and data bytes together exceed the write limit
    #[error("exceeded write limit of {limit} bytes ({count} given)")]
    WriteLimitExceeded {
        /// Maximum number of bytes allowed
        limit: usize,
        /// Number of bytes supplied
        count: usize,
    },

    /// Read length outside 0-1023
    #[error("read length {0} out of range (0-1023)")]
    ReadLengthOutOfRange(i64),

    /// Speed mode outside 0-3
    #[error("speed mode {0} out of range (0-3)")]
    SpeedModeOutOfRange(i64),

    /// A command with this name already exists
    #[error("command \"{0}\" already exists")]
    DuplicateName(String),

    /// No register, no write data and a read length of zero
    #[error("nothing to read/write")]
    NothingToDo,

    /// Command name is empty
    #[error("empty command name")]
    EmptyName,

    /// Command name contains a line break
    #[error("command name contains a line break ({0:?})")]
    InvalidName(String),

    /// A CSV record ended before a required field
    #[error("missing {0} field")]
    MissingField(&'static str),

    /// A numeric CSV field is not a decimal integer
    #[error("invalid {field} ({value})")]
    InvalidNumber {
        /// Field name
        field: &'static str,
        /// Offending text
        value: String,
    },

    /// A quoted command name is unterminated or not followed by a comma
    #[error("malformed quoted command name")]
    MalformedName,
}

/// Failure reported by an I2C adapter
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum DriverError {
    /// The adapter could not be opened
    #[error("failed to open adapter: {0}")]
    OpenFailed(String),

    /// The adapter rejected the bus speed
    #[error("failed to set bus speed to {0}")]
    SpeedFailed(String),

    /// The transaction did not complete
    #[error("transaction failed: {0}")]
    TransferFailed(String),

    /// The adapter returned a different amount of data than requested
    #[error("short read: expected {expected} bytes, got {actual}")]
    ShortRead {
        /// Requested read length
        expected: usize,
        /// Bytes actually returned
        actual: usize,
    },

    /// The adapter has been closed
    #[error("adapter is closed")]
    Closed,
}

/// Top-level error type
#[derive(Debug, Error)]
pub enum Error {
    /// Invalid input
    #[error(transparent)]
    Validation(#[from] ValidationError),

    /// File open/read/write failure
    #[error("failed to access \"{}\": {source}", path.display())]
    Io {
        /// Path that was being accessed
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// Adapter failure, usually a disconnected or misbehaving device
    #[error("{0}, please reconnect the CH341 device")]
    Driver(#[from] DriverError),

    /// No stored command has this name
    #[error("command \"{0}\" not found")]
    CommandNotFound(String),
}

/// Result type alias using the core Error type
pub type Result<T> = std::result::Result<T, Error>;
