//! I2C transaction encoding
//!
//! A transaction is a single START ... STOP exchange with one device: an
//! optional write phase (register byte and data bytes) followed by an
//! optional read phase.

use crate::error::ValidationError;

/// Maximum number of register plus data bytes in one transaction
pub const MAX_WRITE_LEN: usize = 1022;

/// Maximum number of bytes read in one transaction
pub const MAX_READ_LEN: usize = 1023;

/// A validated I2C transaction
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct I2cTransaction {
    address: u8,
    write: Vec<u8>,
    read_len: usize,
}

impl I2cTransaction {
    /// Build a transaction
    ///
    /// `address` is the 7-bit device address. The register byte, if any, is
    /// sent before `data` and counts against [`MAX_WRITE_LEN`].
    pub fn new(
        address: u8,
        register: Option<u8>,
        data: &[u8],
        read_len: usize,
    ) -> Result<Self, ValidationError> {
        if address > 0x7F {
            return Err(ValidationError::InvalidAddress(format!("{:b}", address)));
        }
        if read_len > MAX_READ_LEN {
            return Err(ValidationError::ReadLengthOutOfRange(read_len as i64));
        }

        let mut write = Vec::with_capacity(data.len() + 1);
        write.extend(register);
        write.extend_from_slice(data);

        if write.is_empty() && read_len == 0 {
            return Err(ValidationError::NothingToDo);
        }
        if write.len() > MAX_WRITE_LEN {
            return Err(ValidationError::WriteLimitExceeded {
                limit: MAX_WRITE_LEN,
                count: write.len(),
            });
        }

        Ok(Self {
            address,
            write,
            read_len,
        })
    }

    /// 7-bit device address
    pub fn address(&self) -> u8 {
        self.address
    }

    /// Register and data bytes, in bus order
    pub fn write_bytes(&self) -> &[u8] {
        &self.write
    }

    /// Number of bytes to read
    pub fn read_len(&self) -> usize {
        self.read_len
    }

    /// True if the transaction has no write phase
    pub fn is_read_only(&self) -> bool {
        self.write.is_empty()
    }

    /// Address byte as sent on the bus
    ///
    /// The R/W bit is set only for pure reads; a write followed by a read
    /// uses a repeated START, which the adapter issues itself.
    pub fn address_byte(&self) -> u8 {
        (self.address << 1) | u8::from(self.is_read_only())
    }

    /// Encode the adapter buffer: address byte, then register and data bytes
    pub fn encode(&self) -> Vec<u8> {
        let mut buf = Vec::with_capacity(self.write.len() + 1);
        buf.push(self.address_byte());
        buf.extend_from_slice(&self.write);
        buf
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_encode_write() {
        let tx = I2cTransaction::new(0x0A, None, &[0xFF], 0).unwrap();
        assert_eq!(tx.encode(), vec![0x14, 0xFF]);
        assert!(!tx.is_read_only());
    }

    #[test]
    fn test_encode_register_read() {
        let tx = I2cTransaction::new(0x50, Some(0x10), &[], 4).unwrap();
        assert_eq!(tx.encode(), vec![0xA0, 0x10]);
        assert_eq!(tx.read_len(), 4);
    }

    #[test]
    fn test_encode_pure_read_sets_rw_bit() {
        let tx = I2cTransaction::new(0x50, None, &[], 2).unwrap();
        assert!(tx.is_read_only());
        assert_eq!(tx.encode(), vec![0xA1]);
    }

    #[test]
    fn test_nothing_to_do() {
        assert_eq!(
            I2cTransaction::new(0x50, None, &[], 0),
            Err(ValidationError::NothingToDo)
        );
    }

    #[test]
    fn test_write_limit_counts_register() {
        let data = vec![0u8; MAX_WRITE_LEN];
        assert!(I2cTransaction::new(0x50, None, &data, 0).is_ok());
        assert!(I2cTransaction::new(0x50, Some(0), &data[1..], 0).is_ok());
        assert_eq!(
            I2cTransaction::new(0x50, Some(0), &data, 0),
            Err(ValidationError::WriteLimitExceeded {
                limit: MAX_WRITE_LEN,
                count: MAX_WRITE_LEN + 1
            })
        );
    }

    #[test]
    fn test_read_limit() {
        assert!(I2cTransaction::new(0x50, None, &[], MAX_READ_LEN).is_ok());
        assert_eq!(
            I2cTransaction::new(0x50, None, &[], MAX_READ_LEN + 1),
            Err(ValidationError::ReadLengthOutOfRange(1024))
        );
    }
}
