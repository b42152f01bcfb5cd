//! ch341-i2c-ch341a - CH341A USB-to-I2C adapter support
//!
//! This crate drives the I2C engine of the CH341A, a cheap and widely
//! available USB bridge, directly over USB with `nusb`. No vendor driver
//! or library is needed.
//!
//! # Protocol Overview
//!
//! The CH341A communicates via USB bulk transfers. I2C traffic is sent as
//! `I2C_STREAM` packets of at most 32 bytes holding START/STOP, byte-out
//! and byte-in sub-commands. Bytes clocked in are returned on the bulk IN
//! endpoint. The stream speed selects one of four bus clocks
//! (20/100/400/750 kHz).
//!
//! # Example
//!
//! ```no_run
//! use ch341_i2c_ch341a::Ch341a;
//! use ch341_i2c_core::{execute, BusSpeed, I2cTransaction};
//!
//! let mut ch341a = Ch341a::open()?;
//! // Read 4 bytes from register 0x00 of an EEPROM at 0x50
//! let tx = I2cTransaction::new(0x50, Some(0x00), &[], 4)?;
//! let data = execute(&mut ch341a, &tx, BusSpeed::Khz100)?;
//! println!("{:02X?}", data);
//! # Ok::<(), Box<dyn std::error::Error>>(())
//! ```

mod device;
mod error;
mod protocol;

pub use device::{Ch341a, Ch341aDeviceInfo};
pub use error::{Ch341aError, Result};
