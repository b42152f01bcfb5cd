//! CH341A device implementation
//!
//! This module provides the main `Ch341a` struct that implements USB
//! communication with the CH341A and the `I2cAdapter` trait.

use std::time::Duration;

use ch341_i2c_core::adapter::{BusSpeed, I2cAdapter, Versions};
use ch341_i2c_core::error::DriverError;
use nusb::transfer::{Buffer, Bulk, In, Out};
use nusb::{Endpoint, MaybeFuture};

use crate::error::{Ch341aError, Result};
use crate::protocol::*;

/// CH341A USB-to-I2C adapter
///
/// This struct represents a claimed CH341A and implements the
/// `I2cAdapter` trait. All methods are synchronous and blocking.
pub struct Ch341a {
    /// Position among attached CH341A devices
    index: usize,
    /// Device release number from the USB descriptor
    device_version: u16,
    /// Bulk OUT endpoint for writes, `None` once closed
    out_ep: Option<Endpoint<Bulk, Out>>,
    /// Bulk IN endpoint for reads, `None` once closed
    in_ep: Option<Endpoint<Bulk, In>>,
}

impl Ch341a {
    /// Open the first CH341A device
    pub fn open() -> Result<Self> {
        Self::open_nth(0)
    }

    /// Open the nth CH341A device (0-indexed)
    ///
    /// Useful when multiple CH341A devices are connected.
    pub fn open_nth(index: usize) -> Result<Self> {
        let devices: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(|e| Ch341aError::OpenFailed(e.to_string()))?
            .filter(|d| d.vendor_id() == CH341A_USB_VENDOR && d.product_id() == CH341A_USB_PRODUCT)
            .collect();

        let device_info = devices
            .get(index)
            .ok_or(Ch341aError::DeviceNotFound(index))?;

        log::info!(
            "Opening CH341A device #{} at bus {} address {}",
            index,
            device_info.busnum(),
            device_info.device_address()
        );

        let device = device_info
            .open()
            .wait()
            .map_err(|e| Ch341aError::OpenFailed(e.to_string()))?;

        let interface = device
            .claim_interface(0)
            .wait()
            .map_err(|e| Ch341aError::ClaimFailed(e.to_string()))?;

        let out_ep = interface
            .endpoint::<Bulk, Out>(WRITE_EP)
            .map_err(|e| Ch341aError::ClaimFailed(e.to_string()))?;
        let in_ep = interface
            .endpoint::<Bulk, In>(READ_EP)
            .map_err(|e| Ch341aError::ClaimFailed(e.to_string()))?;

        let mut ch341a = Self {
            index,
            device_version: device_info.device_version(),
            out_ep: Some(out_ep),
            in_ep: Some(in_ep),
        };

        // Start from the 100 kHz default until a command picks its own speed
        ch341a.config_stream(CH341A_STM_I2C_100K)?;

        log::info!("Opened CH341A device #{}", index);
        Ok(ch341a)
    }

    /// List all connected CH341A devices
    pub fn list_devices() -> Result<Vec<Ch341aDeviceInfo>> {
        let devices: Vec<_> = nusb::list_devices()
            .wait()
            .map_err(|e| Ch341aError::OpenFailed(e.to_string()))?
            .filter(|d| d.vendor_id() == CH341A_USB_VENDOR && d.product_id() == CH341A_USB_PRODUCT)
            .enumerate()
            .map(|(index, d)| Ch341aDeviceInfo {
                index,
                bus: d.busnum(),
                address: d.device_address(),
            })
            .collect();

        Ok(devices)
    }

    /// Device release number formatted as `major.minor`
    fn driver_version(&self) -> String {
        format!(
            "{:x}.{:02x}",
            self.device_version >> 8,
            self.device_version & 0xFF
        )
    }

    /// Configure the stream interface speed
    fn config_stream(&mut self, mode: u8) -> Result<()> {
        self.usb_write(&speed_packet(mode))
    }

    /// Write data to USB endpoint
    fn usb_write(&mut self, data: &[u8]) -> Result<()> {
        let out_ep = self.out_ep.as_mut().ok_or(Ch341aError::Closed)?;
        out_ep.submit(Buffer::from(data.to_vec()));

        let completion = out_ep
            .wait_next_complete(Duration::from_millis(USB_TIMEOUT_MS))
            .ok_or(Ch341aError::Timeout)?;

        completion
            .status
            .map_err(|e| Ch341aError::TransferFailed(e.to_string()))?;

        log::trace!("USB write {} bytes", data.len());
        Ok(())
    }

    /// Read exactly `len` bytes from the USB endpoint
    fn usb_read(&mut self, len: usize) -> Result<Vec<u8>> {
        let in_ep = self.in_ep.as_mut().ok_or(Ch341aError::Closed)?;
        let request_len = in_ep.max_packet_size();
        let mut data = Vec::with_capacity(len);

        while data.len() < len {
            in_ep.submit(Buffer::new(request_len));

            let completion = in_ep
                .wait_next_complete(Duration::from_millis(USB_TIMEOUT_MS))
                .ok_or(Ch341aError::Timeout)?;

            completion
                .status
                .map_err(|e| Ch341aError::TransferFailed(e.to_string()))?;

            if completion.actual_len == 0 {
                return Err(Ch341aError::InvalidResponse);
            }

            let take = completion.actual_len.min(len - data.len());
            data.extend_from_slice(&completion.buffer[..take]);
        }

        log::trace!("USB read {} bytes", data.len());
        Ok(data)
    }

    /// Run one I2C transaction: START, write phase, optional repeated START
    /// and read phase, STOP.
    fn stream_i2c(&mut self, buffer: &[u8], read_len: usize) -> Result<Vec<u8>> {
        for packet in write_packets(buffer) {
            self.usb_write(&packet)?;
        }

        let mut read = Vec::with_capacity(read_len);
        if read_len > 0 {
            // A pure read already sent the address with the read bit set
            if buffer.len() > 1 {
                self.usb_write(&restart_packet(buffer[0]))?;
            }

            for (packet, count) in read_packets(read_len) {
                self.usb_write(&packet)?;
                read.extend(self.usb_read(count)?);
            }
        }

        self.usb_write(&stop_packet())?;
        Ok(read)
    }

    /// Cancel and drain all pending transfers on both endpoints.
    fn drain_all_pending(&mut self) {
        if let Some(out_ep) = self.out_ep.as_mut() {
            out_ep.cancel_all();
            while out_ep.pending() > 0 {
                let _ = out_ep.wait_next_complete(Duration::from_secs(1));
            }
        }
        if let Some(in_ep) = self.in_ep.as_mut() {
            in_ep.cancel_all();
            while in_ep.pending() > 0 {
                let _ = in_ep.wait_next_complete(Duration::from_secs(1));
            }
        }
    }

    /// Abort whatever is in flight and try to release the bus
    fn recover(&mut self) {
        self.drain_all_pending();
        if let Err(e) = self.usb_write(&stop_packet()) {
            log::debug!("Failed to send STOP after error: {}", e);
        }
    }
}

/// Information about a connected CH341A device
#[derive(Debug, Clone)]
pub struct Ch341aDeviceInfo {
    /// Index to pass to [`Ch341a::open_nth`]
    pub index: usize,
    /// USB bus number
    pub bus: u8,
    /// USB device address
    pub address: u8,
}

impl std::fmt::Display for Ch341aDeviceInfo {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "CH341A #{} at bus {} address {}",
            self.index, self.bus, self.address
        )
    }
}

impl Drop for Ch341a {
    fn drop(&mut self) {
        self.close();
    }
}

// ---------------------------------------------------------------------------
// I2cAdapter trait implementation
// ---------------------------------------------------------------------------

impl I2cAdapter for Ch341a {
    fn description(&self) -> String {
        format!(
            "CH341A device #{} (VID:{:04x} PID:{:04x})",
            self.index, CH341A_USB_VENDOR, CH341A_USB_PRODUCT
        )
    }

    fn versions(&self) -> Versions {
        Versions {
            library: format!("{} {}", env!("CARGO_PKG_NAME"), env!("CARGO_PKG_VERSION")),
            driver: self.driver_version(),
        }
    }

    fn set_speed(&mut self, speed: BusSpeed) -> std::result::Result<(), DriverError> {
        self.config_stream(stream_speed(speed)).map_err(|e| {
            log::error!("Failed to set bus speed to {}: {}", speed, e);
            DriverError::SpeedFailed(speed.to_string())
        })
    }

    fn transact(
        &mut self,
        buffer: &[u8],
        read_len: usize,
    ) -> std::result::Result<Vec<u8>, DriverError> {
        if self.out_ep.is_none() {
            return Err(DriverError::Closed);
        }

        self.stream_i2c(buffer, read_len).map_err(|e| {
            self.recover();
            DriverError::from(e)
        })
    }

    fn close(&mut self) {
        if self.out_ep.is_none() {
            return;
        }
        log::info!("Closing CH341A device #{}", self.index);
        self.drain_all_pending();
        self.out_ep = None;
        self.in_ep = None;
    }
}
