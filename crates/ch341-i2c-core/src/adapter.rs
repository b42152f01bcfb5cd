//! I2C adapter trait
//!
//! Hardware drivers implement [`I2cAdapter`]. The core only ever talks to
//! an adapter through this trait, so tests can substitute an emulated bus.

use crate::error::{DriverError, ValidationError};
use crate::transaction::I2cTransaction;
use std::fmt;

/// Bus speed presets supported by the CH341 I2C engine
///
/// The discriminant is the speed mode stored in command files.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum BusSpeed {
    /// 20 kHz (mode 0)
    Khz20 = 0,
    /// 100 kHz (mode 1, default)
    #[default]
    Khz100 = 1,
    /// 400 kHz (mode 2)
    Khz400 = 2,
    /// 750 kHz (mode 3)
    Khz750 = 3,
}

impl BusSpeed {
    /// All presets in mode order
    pub const ALL: [BusSpeed; 4] = [
        BusSpeed::Khz20,
        BusSpeed::Khz100,
        BusSpeed::Khz400,
        BusSpeed::Khz750,
    ];

    /// Look up a preset by its speed mode number
    pub fn from_mode(mode: i64) -> Result<Self, ValidationError> {
        match mode {
            0 => Ok(BusSpeed::Khz20),
            1 => Ok(BusSpeed::Khz100),
            2 => Ok(BusSpeed::Khz400),
            3 => Ok(BusSpeed::Khz750),
            _ => Err(ValidationError::SpeedModeOutOfRange(mode)),
        }
    }

    /// Speed mode number (0-3)
    pub fn mode(self) -> u8 {
        self as u8
    }

    /// Nominal clock frequency in kHz
    pub fn khz(self) -> u32 {
        match self {
            BusSpeed::Khz20 => 20,
            BusSpeed::Khz100 => 100,
            BusSpeed::Khz400 => 400,
            BusSpeed::Khz750 => 750,
        }
    }
}

impl fmt::Display for BusSpeed {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{} kHz", self.khz())
    }
}

/// Version information reported by an adapter
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Versions {
    /// Version of the host-side library talking to the adapter
    pub library: String,
    /// Version of the driver or device firmware
    pub driver: String,
}

/// An I2C master reachable from the host
///
/// Adapters are opened by their own constructors (usually by device index)
/// and released by [`close`](I2cAdapter::close) or on drop.
pub trait I2cAdapter {
    /// Human-readable description of the opened device
    fn description(&self) -> String;

    /// Library and driver versions
    fn versions(&self) -> Versions;

    /// Select one of the four bus speed presets
    fn set_speed(&mut self, speed: BusSpeed) -> Result<(), DriverError>;

    /// Run a single I2C transaction
    ///
    /// `buffer` starts with the address byte (7-bit address shifted left,
    /// R/W bit in bit 0) followed by register and data bytes. If `read_len`
    /// is non-zero, that many bytes are read back after the write phase and
    /// returned; otherwise the result is empty.
    fn transact(&mut self, buffer: &[u8], read_len: usize) -> Result<Vec<u8>, DriverError>;

    /// Release the device
    fn close(&mut self) {}
}

/// Set the bus speed and run one transaction
///
/// Returns the bytes read, exactly `tx.read_len()` of them.
pub fn execute<A: I2cAdapter + ?Sized>(
    adapter: &mut A,
    tx: &I2cTransaction,
    speed: BusSpeed,
) -> Result<Vec<u8>, DriverError> {
    adapter.set_speed(speed)?;
    log::debug!("Bus speed: {}", speed);
    log::debug!("Address: {:07b}", tx.address());

    for byte in tx.write_bytes() {
        log::debug!("Writing: {:08b}", byte);
    }

    let read = adapter.transact(&tx.encode(), tx.read_len())?;
    if read.len() != tx.read_len() {
        return Err(DriverError::ShortRead {
            expected: tx.read_len(),
            actual: read.len(),
        });
    }

    for byte in &read {
        log::debug!("Reading: {:08b}", byte);
    }

    Ok(read)
}

impl<A: I2cAdapter + ?Sized> I2cAdapter for Box<A> {
    fn description(&self) -> String {
        (**self).description()
    }

    fn versions(&self) -> Versions {
        (**self).versions()
    }

    fn set_speed(&mut self, speed: BusSpeed) -> Result<(), DriverError> {
        (**self).set_speed(speed)
    }

    fn transact(&mut self, buffer: &[u8], read_len: usize) -> Result<Vec<u8>, DriverError> {
        (**self).transact(buffer, read_len)
    }

    fn close(&mut self) {
        (**self).close()
    }
}
