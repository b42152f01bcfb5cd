//! Binary-digit string validation and normalisation
//!
//! Addresses, registers and data bytes are entered as strings of `0` and
//! `1` characters. Shorter strings are accepted and left-padded with zeros
//! to their fixed width before use.

/// Width of a device address in bits
pub const ADDRESS_WIDTH: usize = 7;

/// Width of a register address or data byte in bits
pub const BYTE_WIDTH: usize = 8;

/// Check that `token` is a non-empty string of at most `max_width` binary digits
pub fn is_binary_digit_string(token: &str, max_width: usize) -> bool {
    !token.is_empty()
        && token.len() <= max_width
        && token.bytes().all(|b| b == b'0' || b == b'1')
}

/// Check that `token` is a valid register address or data byte
pub fn is_valid_byte(token: &str) -> bool {
    is_binary_digit_string(token, BYTE_WIDTH)
}

/// Check that `token` is a valid 7-bit device address
pub fn is_valid_address(token: &str) -> bool {
    is_binary_digit_string(token, ADDRESS_WIDTH)
}

/// Left-pad `token` with `0` characters up to `width`
///
/// Tokens already at or beyond `width` are returned unchanged.
pub fn pad_left(token: &str, width: usize) -> String {
    format!("{:0>width$}", token, width = width)
}

/// Interpret a validated binary-digit string as an unsigned value
///
/// Returns `None` if the string is empty, contains other characters or does
/// not fit in a byte.
pub fn bits_to_u8(bits: &str) -> Option<u8> {
    if !is_valid_byte(bits) {
        return None;
    }
    u8::from_str_radix(bits, 2).ok()
}

/// Render a byte as an 8-digit binary string
pub fn u8_to_bits(value: u8) -> String {
    format!("{:08b}", value)
}

/// Render bytes as space-separated 8-digit binary strings
pub fn format_bytes(bytes: &[u8]) -> String {
    bytes
        .iter()
        .map(|b| u8_to_bits(*b))
        .collect::<Vec<_>>()
        .join(" ")
}

/// Split whitespace-separated write data into padded byte tokens
///
/// Empty (or all-whitespace) input yields an empty list. On failure the
/// first token that is not a valid byte is returned and nothing else.
pub fn parse_write_data(text: &str) -> Result<Vec<String>, String> {
    text.split_whitespace()
        .map(|token| {
            if is_valid_byte(token) {
                Ok(pad_left(token, BYTE_WIDTH))
            } else {
                Err(token.to_string())
            }
        })
        .collect()
}
