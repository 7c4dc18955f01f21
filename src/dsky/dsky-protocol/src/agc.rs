use crate::channel::{ChannelError, ChannelWord, ChannelWrite};
use crate::codec::WORD_MASK;

pub const PACKET_LEN: usize = 4;

// Header byte flag marking a packet whose value is a bitmask for the next write
const MASK_FLAG: u8 = 0x20;

/// Parsed 4-byte yaAGC socket packet
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Packet {
    mask: bool,    // Value is a bitmask for the following packet
    io_addr: u16,  // 7-bit IO channel address
    io_value: u16, // 15-bit data value
}

impl Packet {
    /// Parses raw bytes, returning `None` when the framing bits are wrong
    pub fn new(input: &[u8; PACKET_LEN]) -> Option<Self> {
        let (mask, io_addr, io_value) = parse_dsky_packet(*input)?;
        Some(Packet {
            mask,
            io_addr,
            io_value,
        })
    }

    pub fn data(channel: u16, value: u16) -> Self {
        Packet {
            mask: false,
            io_addr: channel,
            io_value: value & WORD_MASK,
        }
    }

    pub fn is_mask(&self) -> bool {
        self.mask
    }

    pub fn channel(&self) -> u16 {
        self.io_addr
    }

    pub fn value(&self) -> u16 {
        self.io_value
    }

    /// Typed channel word carried by a data packet
    pub fn word(&self) -> Result<ChannelWord, ChannelError> {
        ChannelWord::from_raw(self.io_addr, self.io_value)
    }

    /// Change the packet back to DSKY wire format
    pub fn serialize(&self) -> [u8; PACKET_LEN] {
        if self.mask {
            generate_mask_packet(self.io_addr, self.io_value)
        } else {
            generate_dsky_packet(self.io_addr, self.io_value)
        }
    }
}

/// Constructs a data packet:
/// [00 u t Addr(3-6) | 01 Addr(0-2) Data(12-14) | 10 Data(6-11) | 11 Data(0-5)]
pub fn generate_dsky_packet(addr: u16, data_val: u16) -> [u8; PACKET_LEN] {
    let header = ((addr >> 3) & 0x0F) as u8;
    let upper_bits = 0x40 | ((addr & 0x7) << 3) as u8 | ((data_val >> 12) & 0x7) as u8;
    let middle = 0x80 | ((data_val >> 6) & 0x3F) as u8;
    let lower = 0xC0 | (data_val & 0x3F) as u8;
    [header, upper_bits, middle, lower]
}

/// Constructs a mask packet; the simulator applies it to the next data packet
pub fn generate_mask_packet(addr: u16, mask: u16) -> [u8; PACKET_LEN] {
    let mut packet = generate_dsky_packet(addr, mask);
    packet[0] |= MASK_FLAG;
    packet
}

/// Extracts (mask flag, address, value) from packet bytes
pub fn parse_dsky_packet(packet: [u8; PACKET_LEN]) -> Option<(bool, u16, u16)> {
    let [b0, b1, b2, b3] = packet;

    // Validate framing bits
    let valid = (b0 & 0xC0 == 0x00) &&  // Header: 00
               (b1 & 0xC0 == 0x40) &&  // Upper:  01
               (b2 & 0xC0 == 0x80) &&  // Middle: 10
               (b3 & 0xC0 == 0xC0); // Lower:  11

    if !valid {
        return None;
    }

    // Reconstruct 15-bit value
    let combined = ((b1 as u16 & 0x07) << 12) | ((b2 as u16 & 0x3F) << 6) | (b3 as u16 & 0x3F);

    // Reconstruct 7-bit address
    let addr = ((b0 as u16 & 0x0F) << 3) | ((b1 as u16 >> 3) & 0x07);

    Some((b0 & MASK_FLAG != 0, addr, combined))
}

impl ChannelWrite {
    /// Wire packets for this write: a mask packet precedes the data packet
    /// unless every bit is being written
    pub fn packets(&self) -> heapless::Vec<[u8; PACKET_LEN], 2> {
        let addr = self.channel.number();
        let mut out = heapless::Vec::new();
        if self.mask != WORD_MASK {
            // Capacity is 2, neither push can fail
            let _ = out.push(generate_mask_packet(addr, self.mask));
        }
        let _ = out.push(generate_dsky_packet(addr, self.value));
        out
    }
}

#[cfg(test)]
mod packet_tests {
    use super::*;
    use crate::channel::Channel;

    #[test]
    fn test_generate_known_bytes() {
        assert_eq!(
            generate_dsky_packet(0o10, 0o54321),
            [0x01, 0x45, 0xA3, 0xD1]
        );
        assert_eq!(generate_dsky_packet(0o163, 0), [0x0E, 0x58, 0x80, 0xC0]);
    }

    #[test]
    fn test_parse_known_bytes() {
        assert_eq!(
            parse_dsky_packet([0x01, 0x45, 0xA3, 0xD1]),
            Some((false, 0o10, 0o54321))
        );
        assert_eq!(
            parse_dsky_packet([0x23, 0x52, 0x80, 0xC0]),
            Some((true, 0o32, 0o20000))
        );
    }

    #[test]
    fn test_bad_framing_rejected() {
        assert_eq!(parse_dsky_packet([0x41, 0x45, 0xA3, 0xD1]), None);
        assert_eq!(parse_dsky_packet([0x01, 0x05, 0xA3, 0xD1]), None);
        assert_eq!(parse_dsky_packet([0x01, 0x45, 0xE3, 0xD1]), None);
        assert_eq!(parse_dsky_packet([0x01, 0x45, 0xA3, 0x11]), None);
        assert!(Packet::new(&[0xFF, 0xFF, 0xFF, 0xFF]).is_none());
    }

    #[test]
    fn test_packet_word() {
        let packet = Packet::new(&[0x01, 0x45, 0xA3, 0xD1]).unwrap();
        assert!(!packet.is_mask());
        assert_eq!(
            packet.word(),
            Ok(ChannelWord::new(Channel::Dsky, 0o54321))
        );
        assert_eq!(packet.serialize(), [0x01, 0x45, 0xA3, 0xD1]);

        // Channel 12 frames correctly but is not a DSKY channel
        let packet = Packet::data(0o12, 1);
        assert!(packet.word().is_err());
    }

    #[test]
    fn test_masked_write_emits_mask_first() {
        let write = ChannelWrite::new(Channel::Chan32, 0, 0o20000);
        let packets = write.packets();
        assert_eq!(packets.len(), 2);
        assert_eq!(packets[0], [0x23, 0x52, 0x80, 0xC0]);
        assert_eq!(packets[1], [0x03, 0x50, 0x80, 0xC0]);
    }

    #[test]
    fn test_full_write_has_no_mask() {
        let write = ChannelWrite::new(Channel::MnKeyIn, 0o07, 0o77777);
        let packets = write.packets();
        assert_eq!(packets.len(), 1);
        assert_eq!(parse_dsky_packet(packets[0]), Some((false, 0o15, 0o07)));
    }
}
