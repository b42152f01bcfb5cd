//! ch341-i2c-dummy - In-memory I2C bus emulator for testing
//!
//! This crate provides a dummy adapter that emulates an I2C bus populated
//! with simple register-file devices (the way a 24C02 EEPROM or most
//! sensors behave): the first written byte sets the register pointer,
//! further written bytes are stored from there, and reads return bytes
//! from the pointer onwards. The pointer auto-increments and wraps.

use std::collections::BTreeMap;

use ch341_i2c_core::adapter::{BusSpeed, I2cAdapter, Versions};
use ch341_i2c_core::error::DriverError;

/// Configuration for the dummy bus
#[derive(Debug, Clone)]
pub struct DummyConfig {
    /// 7-bit addresses of the emulated devices
    pub addresses: Vec<u8>,
    /// Number of registers per device
    pub register_count: usize,
}

impl Default for DummyConfig {
    fn default() -> Self {
        Self {
            // A generic peripheral and a 24C02-style EEPROM
            addresses: vec![0x0A, 0x50],
            register_count: 256,
        }
    }
}

/// One completed transaction, as seen on the bus
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Transfer {
    /// 7-bit device address
    pub address: u8,
    /// Bytes written after the address byte
    pub written: Vec<u8>,
    /// Bytes read back
    pub read: Vec<u8>,
    /// Bus speed in effect
    pub speed: BusSpeed,
}

#[derive(Debug, Clone)]
struct RegisterDevice {
    registers: Vec<u8>,
    pointer: usize,
}

impl RegisterDevice {
    fn new(size: usize) -> Self {
        Self {
            registers: vec![0xFF; size],
            pointer: 0,
        }
    }

    fn write(&mut self, payload: &[u8]) {
        let Some((&pointer, data)) = payload.split_first() else {
            return;
        };
        self.pointer = pointer as usize % self.registers.len();
        for &byte in data {
            self.registers[self.pointer] = byte;
            self.advance();
        }
    }

    fn read(&mut self, len: usize) -> Vec<u8> {
        (0..len)
            .map(|_| {
                let byte = self.registers[self.pointer];
                self.advance();
                byte
            })
            .collect()
    }

    fn advance(&mut self) {
        self.pointer = (self.pointer + 1) % self.registers.len();
    }
}

/// Dummy I2C adapter
///
/// Emulates an I2C bus in memory for testing purposes.
pub struct DummyBus {
    devices: BTreeMap<u8, RegisterDevice>,
    speed: BusSpeed,
    transfers: Vec<Transfer>,
    closed: bool,
}

impl DummyBus {
    /// Create a bus with the given configuration
    pub fn new(config: DummyConfig) -> Self {
        let size = config.register_count.max(1);
        let devices = config
            .addresses
            .iter()
            .map(|&addr| (addr & 0x7F, RegisterDevice::new(size)))
            .collect();

        Self {
            devices,
            speed: BusSpeed::default(),
            transfers: Vec::new(),
            closed: false,
        }
    }

    /// Create a bus with the default configuration (devices at 0x0A and 0x50)
    pub fn new_default() -> Self {
        Self::new(DummyConfig::default())
    }

    /// Register contents of the device at `address`
    pub fn registers(&self, address: u8) -> Option<&[u8]> {
        self.devices.get(&address).map(|d| d.registers.as_slice())
    }

    /// Mutable register contents of the device at `address`
    pub fn registers_mut(&mut self, address: u8) -> Option<&mut [u8]> {
        self.devices
            .get_mut(&address)
            .map(|d| d.registers.as_mut_slice())
    }

    /// Currently selected bus speed
    pub fn speed(&self) -> BusSpeed {
        self.speed
    }

    /// All transactions completed so far
    pub fn transfers(&self) -> &[Transfer] {
        &self.transfers
    }

    /// True once [`close`](I2cAdapter::close) has been called
    pub fn is_closed(&self) -> bool {
        self.closed
    }
}

impl I2cAdapter for DummyBus {
    fn description(&self) -> String {
        let addrs: Vec<String> = self.devices.keys().map(|a| format!("{:07b}", a)).collect();
        format!("Dummy I2C bus (devices at {})", addrs.join(", "))
    }

    fn versions(&self) -> Versions {
        Versions {
            library: env!("CARGO_PKG_VERSION").to_string(),
            driver: "emulated".to_string(),
        }
    }

    fn set_speed(&mut self, speed: BusSpeed) -> Result<(), DriverError> {
        if self.closed {
            return Err(DriverError::Closed);
        }
        self.speed = speed;
        Ok(())
    }

    fn transact(&mut self, buffer: &[u8], read_len: usize) -> Result<Vec<u8>, DriverError> {
        if self.closed {
            return Err(DriverError::Closed);
        }

        let (&addr_byte, payload) = buffer
            .split_first()
            .ok_or_else(|| DriverError::TransferFailed("empty transaction".into()))?;
        let address = addr_byte >> 1;
        let read_bit = addr_byte & 1 == 1;

        if read_bit && !payload.is_empty() {
            return Err(DriverError::TransferFailed(
                "write data after a read address byte".into(),
            ));
        }

        let device = self.devices.get_mut(&address).ok_or_else(|| {
            DriverError::TransferFailed(format!("no ACK from address {:07b}", address))
        })?;

        device.write(payload);
        let read = device.read(read_len);

        log::trace!(
            "dummy: addr {:07b} wrote {} byte(s), read {} byte(s)",
            address,
            payload.len(),
            read.len()
        );

        self.transfers.push(Transfer {
            address,
            written: payload.to_vec(),
            read: read.clone(),
            speed: self.speed,
        });

        Ok(read)
    }

    fn close(&mut self) {
        self.closed = true;
    }
}
