//! CH341A protocol constants and I2C stream packet builders
//!
//! The CH341A runs I2C through its "I2C stream" command: a packet starts
//! with [`CH341A_CMD_I2C_STREAM`] and is followed by sub-commands that
//! generate START/STOP conditions, shift bytes out or clock bytes in. A
//! packet may be at most [`CH341_PACKET_LENGTH`] bytes long.

use ch341_i2c_core::adapter::BusSpeed;

/// CH341A USB VID
pub const CH341A_USB_VENDOR: u16 = 0x1A86;
/// CH341A USB PID (parallel/serial interface mode)
pub const CH341A_USB_PRODUCT: u16 = 0x5512;

/// Bulk OUT endpoint
pub const WRITE_EP: u8 = 0x02;
/// Bulk IN endpoint
pub const READ_EP: u8 = 0x82;

/// USB timeout in milliseconds
pub const USB_TIMEOUT_MS: u64 = 1000;

/// Maximum length of a command packet
pub const CH341_PACKET_LENGTH: usize = 0x20;

/// I2C stream command
pub const CH341A_CMD_I2C_STREAM: u8 = 0xAA;

// I2C stream sub-commands
/// Generate a START condition
pub const CH341A_CMD_I2C_STM_STA: u8 = 0x74;
/// Generate a STOP condition
pub const CH341A_CMD_I2C_STM_STO: u8 = 0x75;
/// Shift out bytes, length in bits 5-0
pub const CH341A_CMD_I2C_STM_OUT: u8 = 0x80;
/// Clock in bytes with ACK, length in bits 5-0; length 0 reads one byte and NACKs it
pub const CH341A_CMD_I2C_STM_IN: u8 = 0xC0;
/// Configure the stream interface, speed mode in bits 1-0
pub const CH341A_CMD_I2C_STM_SET: u8 = 0x60;
/// End of the current stream packet
pub const CH341A_CMD_I2C_STM_END: u8 = 0x00;

// Stream speed settings (bits 1-0 of STM_SET)
/// 20 kHz
pub const CH341A_STM_I2C_20K: u8 = 0x00;
/// 100 kHz
pub const CH341A_STM_I2C_100K: u8 = 0x01;
/// 400 kHz
pub const CH341A_STM_I2C_400K: u8 = 0x02;
/// 750 kHz
pub const CH341A_STM_I2C_750K: u8 = 0x03;

/// Largest payload of an OUT sub-command that still fits a packet
///
/// A packet carries the stream command, an optional START, the OUT
/// sub-command and the END marker around the payload.
const OUT_CHUNK: usize = CH341_PACKET_LENGTH - 4;

/// Largest number of bytes read per packet
///
/// Bounded by the IN endpoint packet size so each packet's reply arrives
/// in a single bulk transfer.
pub const IN_CHUNK: usize = CH341_PACKET_LENGTH;

/// Stream speed setting for a bus speed preset
pub fn stream_speed(speed: BusSpeed) -> u8 {
    match speed {
        BusSpeed::Khz20 => CH341A_STM_I2C_20K,
        BusSpeed::Khz100 => CH341A_STM_I2C_100K,
        BusSpeed::Khz400 => CH341A_STM_I2C_400K,
        BusSpeed::Khz750 => CH341A_STM_I2C_750K,
    }
}

/// Packet selecting the I2C speed mode
pub fn speed_packet(mode: u8) -> Vec<u8> {
    vec![
        CH341A_CMD_I2C_STREAM,
        CH341A_CMD_I2C_STM_SET | (mode & 0x3),
        CH341A_CMD_I2C_STM_END,
    ]
}

/// Packets for the write phase: START followed by every buffer byte
///
/// The first buffer byte is the address byte. The bytes are split across
/// as many packets as needed; only the first packet carries the START.
pub fn write_packets(buffer: &[u8]) -> Vec<Vec<u8>> {
    let mut packets = Vec::new();

    for (i, chunk) in buffer.chunks(OUT_CHUNK).enumerate() {
        let mut packet = Vec::with_capacity(CH341_PACKET_LENGTH);
        packet.push(CH341A_CMD_I2C_STREAM);
        if i == 0 {
            packet.push(CH341A_CMD_I2C_STM_STA);
        }
        packet.push(CH341A_CMD_I2C_STM_OUT | chunk.len() as u8);
        packet.extend_from_slice(chunk);
        packet.push(CH341A_CMD_I2C_STM_END);
        packets.push(packet);
    }

    if packets.is_empty() {
        packets.push(vec![
            CH341A_CMD_I2C_STREAM,
            CH341A_CMD_I2C_STM_STA,
            CH341A_CMD_I2C_STM_END,
        ]);
    }

    packets
}

/// Packet for a repeated START addressing the device for reading
pub fn restart_packet(address_byte: u8) -> Vec<u8> {
    vec![
        CH341A_CMD_I2C_STREAM,
        CH341A_CMD_I2C_STM_STA,
        CH341A_CMD_I2C_STM_OUT | 1,
        address_byte | 1,
        CH341A_CMD_I2C_STM_END,
    ]
}

/// Packets for the read phase, each paired with the number of bytes it returns
///
/// Every byte is ACKed except the very last one, which is NACKed to tell
/// the device the read is over.
pub fn read_packets(read_len: usize) -> Vec<(Vec<u8>, usize)> {
    let mut packets = Vec::new();
    let mut remaining = read_len;

    while remaining > 0 {
        let count = remaining.min(IN_CHUNK);
        remaining -= count;

        let mut packet = vec![CH341A_CMD_I2C_STREAM];
        if remaining == 0 {
            if count > 1 {
                packet.push(CH341A_CMD_I2C_STM_IN | (count - 1) as u8);
            }
            packet.push(CH341A_CMD_I2C_STM_IN);
        } else {
            packet.push(CH341A_CMD_I2C_STM_IN | count as u8);
        }
        packet.push(CH341A_CMD_I2C_STM_END);

        packets.push((packet, count));
    }

    packets
}

/// Packet generating a STOP condition
pub fn stop_packet() -> Vec<u8> {
    vec![
        CH341A_CMD_I2C_STREAM,
        CH341A_CMD_I2C_STM_STO,
        CH341A_CMD_I2C_STM_END,
    ]
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_speed_packet() {
        assert_eq!(speed_packet(CH341A_STM_I2C_400K), vec![0xAA, 0x62, 0x00]);
        assert_eq!(speed_packet(7), vec![0xAA, 0x63, 0x00]);
    }

    #[test]
    fn test_stream_speed_follows_mode() {
        for speed in BusSpeed::ALL {
            assert_eq!(stream_speed(speed), speed.mode());
        }
        assert_eq!(speed_packet(stream_speed(BusSpeed::Khz750)), vec![0xAA, 0x63, 0x00]);
    }

    #[test]
    fn test_single_write_packet() {
        let packets = write_packets(&[0xA0, 0x10, 0x55]);
        assert_eq!(packets, vec![vec![0xAA, 0x74, 0x83, 0xA0, 0x10, 0x55, 0x00]]);
    }

    #[test]
    fn test_write_packets_split() {
        let buffer: Vec<u8> = (0..60).collect();
        let packets = write_packets(&buffer);

        assert_eq!(packets.len(), 3);
        assert!(packets.iter().all(|p| p.len() <= CH341_PACKET_LENGTH));
        assert_eq!(&packets[0][..3], &[0xAA, 0x74, 0x80 | OUT_CHUNK as u8]);
        assert_eq!(packets[1][1], 0x80 | OUT_CHUNK as u8);

        let payload: Vec<u8> = packets
            .iter()
            .flat_map(|p| {
                let start = if p[1] == CH341A_CMD_I2C_STM_STA { 3 } else { 2 };
                p[start..p.len() - 1].to_vec()
            })
            .collect();
        assert_eq!(payload, buffer);
    }

    #[test]
    fn test_restart_packet() {
        assert_eq!(restart_packet(0xA0), vec![0xAA, 0x74, 0x81, 0xA1, 0x00]);
    }

    #[test]
    fn test_read_single_byte_nacks() {
        assert_eq!(read_packets(1), vec![(vec![0xAA, 0xC0, 0x00], 1)]);
    }

    #[test]
    fn test_read_packets_split() {
        let packets = read_packets(IN_CHUNK + 3);
        assert_eq!(
            packets,
            vec![
                (vec![0xAA, 0xC0 | IN_CHUNK as u8, 0x00], IN_CHUNK),
                (vec![0xAA, 0xC2, 0xC0, 0x00], 3),
            ]
        );
        assert!(read_packets(0).is_empty());
    }

    #[test]
    fn test_read_len_total() {
        let total: usize = read_packets(1023).iter().map(|(_, n)| n).sum();
        assert_eq!(total, 1023);
    }
}
