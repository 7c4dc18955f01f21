use dsky_core::{Digit, Sign};

// Segment bits, gfedcba order
pub const SEG_A: u8 = 0x01;
pub const SEG_B: u8 = 0x02;
pub const SEG_C: u8 = 0x04;
pub const SEG_D: u8 = 0x08;
pub const SEG_E: u8 = 0x10;
pub const SEG_F: u8 = 0x20;
pub const SEG_G: u8 = 0x40;

// Table to map digits to 7-segment display values; index 10 is blank
const SEVEN_SEG_TABLE: [u8; 11] = [
    0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F, 0x00,
];

/// 7-segment pattern for a digit position
pub fn get_7seg(digit: Digit) -> u8 {
    match digit {
        Digit::Lit(d) if d < 10 => SEVEN_SEG_TABLE[d as usize],
        _ => SEVEN_SEG_TABLE[10],
    }
}

/// Combines two digit patterns into one 16-bit value, first digit high
pub fn get_7seg_value(first: Digit, second: Digit) -> u16 {
    (get_7seg(first) as u16) << 8 | get_7seg(second) as u16
}

/// Sign segment: the horizontal bar is the middle segment, plus adds the
/// vertical bar (reported as segments b and c)
pub fn get_sign_segments(sign: Sign) -> u8 {
    match sign {
        Sign::Blank => 0,
        Sign::Minus => SEG_G,
        Sign::Plus => SEG_G | SEG_B | SEG_C,
    }
}
