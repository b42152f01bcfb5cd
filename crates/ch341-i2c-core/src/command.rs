//! Command presets and ad-hoc requests
//!
//! A [`Request`] is the raw form input: address, register and data as typed
//! by the user, plus read length and speed mode. Validating a request
//! yields either an [`I2cTransaction`] to run right away or a named
//! [`Command`] with normalised (zero-padded) fields to keep in a store.

use crate::adapter::BusSpeed;
use crate::bits::{self, ADDRESS_WIDTH, BYTE_WIDTH};
use crate::error::ValidationError;
use crate::transaction::{I2cTransaction, MAX_READ_LEN};

/// Unvalidated transaction fields
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Request {
    /// Device address, up to 7 binary digits
    pub address: String,
    /// Register address, up to 8 binary digits, or empty for none
    pub register: String,
    /// Whitespace-separated data bytes, each up to 8 binary digits
    pub data: String,
    /// Number of bytes to read (0-1023)
    pub read_length: i64,
    /// Bus speed mode (0-3)
    pub speed_mode: i64,
}

/// Request fields after validation and padding
struct Normalized {
    address: String,
    register: String,
    data: Vec<String>,
    transaction: I2cTransaction,
    speed: BusSpeed,
}

impl Request {
    /// Create a request from its raw fields
    pub fn new(
        address: impl Into<String>,
        register: impl Into<String>,
        data: impl Into<String>,
        read_length: i64,
        speed_mode: i64,
    ) -> Self {
        Self {
            address: address.into(),
            register: register.into(),
            data: data.into(),
            read_length,
            speed_mode,
        }
    }

    /// Validate the request and build the transaction and bus speed to use
    pub fn to_transaction(&self) -> Result<(I2cTransaction, BusSpeed), ValidationError> {
        let normalized = self.normalize()?;
        Ok((normalized.transaction, normalized.speed))
    }

    fn normalize(&self) -> Result<Normalized, ValidationError> {
        if !bits::is_valid_address(&self.address) {
            return Err(ValidationError::InvalidAddress(self.address.clone()));
        }
        let address = bits::pad_left(&self.address, ADDRESS_WIDTH);

        let register = if self.register.is_empty() {
            String::new()
        } else if bits::is_valid_byte(&self.register) {
            bits::pad_left(&self.register, BYTE_WIDTH)
        } else {
            return Err(ValidationError::InvalidRegister(self.register.clone()));
        };

        let data = bits::parse_write_data(&self.data).map_err(ValidationError::InvalidData)?;

        if !(0..=MAX_READ_LEN as i64).contains(&self.read_length) {
            return Err(ValidationError::ReadLengthOutOfRange(self.read_length));
        }

        let data_bytes: Vec<u8> = data.iter().filter_map(|b| bits::bits_to_u8(b)).collect();
        let transaction = I2cTransaction::new(
            bits::bits_to_u8(&address).unwrap_or_default(),
            bits::bits_to_u8(&register),
            &data_bytes,
            self.read_length as usize,
        )?;

        let speed = BusSpeed::from_mode(self.speed_mode)?;

        Ok(Normalized {
            address,
            register,
            data,
            transaction,
            speed,
        })
    }
}

/// A named, validated command preset
///
/// All bit fields are stored zero-padded: the address to 7 digits, the
/// register (when present) and every data token to 8 digits.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Command {
    /// Unique command name
    pub name: String,
    /// Device address, 7 binary digits
    pub address: String,
    /// Register address, 8 binary digits, or empty
    pub register: String,
    /// Space-separated data bytes, 8 binary digits each, or empty
    pub data: String,
    /// Number of bytes to read
    pub read_length: u16,
    /// Bus speed preset
    pub speed: BusSpeed,
}

impl Command {
    /// Validate a request and turn it into a named command
    pub fn from_request(name: &str, request: &Request) -> Result<Self, ValidationError> {
        if name.is_empty() {
            return Err(ValidationError::EmptyName);
        }
        if name.contains(['\n', '\r']) {
            return Err(ValidationError::InvalidName(name.to_string()));
        }

        let normalized = request.normalize()?;

        Ok(Self {
            name: name.to_string(),
            address: normalized.address,
            register: normalized.register,
            data: normalized.data.join(" "),
            read_length: normalized.transaction.read_len() as u16,
            speed: normalized.speed,
        })
    }

    /// The command's fields as an editable request
    pub fn to_request(&self) -> Request {
        Request::new(
            self.address.clone(),
            self.register.clone(),
            self.data.clone(),
            i64::from(self.read_length),
            i64::from(self.speed.mode()),
        )
    }

    /// Build the transaction this command describes
    pub fn transaction(&self) -> Result<I2cTransaction, ValidationError> {
        self.to_request().to_transaction().map(|(tx, _)| tx)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::transaction::MAX_WRITE_LEN;

    fn data_tokens(count: usize) -> String {
        vec!["1"; count].join(" ")
    }

    #[test]
    fn test_from_request_pads_fields() {
        let cmd = Command::from_request("LED_ON", &Request::new("1010", "1", "1 10", 2, 3)).unwrap();
        assert_eq!(cmd.address, "0001010");
        assert_eq!(cmd.register, "00000001");
        assert_eq!(cmd.data, "00000001 00000010");
        assert_eq!(cmd.read_length, 2);
        assert_eq!(cmd.speed, BusSpeed::Khz750);
    }

    #[test]
    fn test_empty_register_stays_empty() {
        let cmd = Command::from_request("x", &Request::new("0001010", "", "11111111", 0, 1)).unwrap();
        assert_eq!(cmd.register, "");
        assert_eq!(cmd.data, "11111111");
    }

    #[test]
    fn test_whitespace_data_normalizes_to_empty() {
        let cmd = Command::from_request("x", &Request::new("1", "", "  \t ", 1, 1)).unwrap();
        assert_eq!(cmd.data, "");
    }

    #[test]
    fn test_validation_failures() {
        let check = |req: Request| Command::from_request("x", &req).unwrap_err();

        assert_eq!(
            check(Request::new("10000000", "", "1", 0, 1)),
            ValidationError::InvalidAddress("10000000".into())
        );
        assert_eq!(
            check(Request::new("1", "100000000", "", 1, 1)),
            ValidationError::InvalidRegister("100000000".into())
        );
        assert_eq!(
            check(Request::new("1", "", "101 bad 0", 0, 1)),
            ValidationError::InvalidData("bad".into())
        );
        assert_eq!(check(Request::new("1", "", "", 0, 1)), ValidationError::NothingToDo);
        assert_eq!(
            check(Request::new("1", "", "", 1024, 1)),
            ValidationError::ReadLengthOutOfRange(1024)
        );
        assert_eq!(
            check(Request::new("1", "", "", -1, 1)),
            ValidationError::ReadLengthOutOfRange(-1)
        );
        assert_eq!(
            check(Request::new("1", "", "", 1, 4)),
            ValidationError::SpeedModeOutOfRange(4)
        );
        assert_eq!(
            Command::from_request("", &Request::new("1", "", "", 1, 1)).unwrap_err(),
            ValidationError::EmptyName
        );
    }

    #[test]
    fn test_register_alone_is_enough() {
        assert!(Command::from_request("x", &Request::new("1", "0", "", 0, 1)).is_ok());
    }

    #[test]
    fn test_boundaries() {
        assert!(Command::from_request("x", &Request::new("1", "", "", 1023, 3)).is_ok());
        assert!(Command::from_request("x", &Request::new("1", "", "1", 0, 0)).is_ok());
    }

    #[test]
    fn test_write_limit() {
        let ok = |reg: &str, n: usize| {
            Command::from_request("x", &Request::new("1", reg, data_tokens(n), 0, 1)).is_ok()
        };

        assert!(ok("1", MAX_WRITE_LEN - 1));
        assert!(!ok("1", MAX_WRITE_LEN));
        assert!(ok("", MAX_WRITE_LEN));
        assert!(!ok("", MAX_WRITE_LEN + 1));
    }

    #[test]
    fn test_transaction_from_command() {
        let cmd = Command::from_request("x", &Request::new("1010000", "10000", "", 8, 2)).unwrap();
        let tx = cmd.transaction().unwrap();
        assert_eq!(tx.encode(), vec![0xA0, 0x10]);
        assert_eq!(tx.read_len(), 8);
    }

    #[test]
    fn test_request_round_trip() {
        let cmd = Command::from_request("x", &Request::new("11", "", "1 0", 0, 0)).unwrap();
        let again = Command::from_request("x", &cmd.to_request()).unwrap();
        assert_eq!(cmd, again);
    }
}
