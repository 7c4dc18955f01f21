// 15-bit one's-complement codec used on every AGC channel word

/// Mask for a full 15-bit channel word
pub const WORD_MASK: u16 = 0o77777;
/// Sign bit (bit 15 in AGC numbering)
pub const SIGN_BIT: u16 = 0o40000;
/// Magnitude bits below the sign
pub const MAGNITUDE_MASK: u16 = 0o37777;
/// Largest magnitude representable in 15-bit one's complement
pub const MAX_MAGNITUDE: i16 = 0o37777;

/// Converts a 15-bit one's-complement word into a signed value.
///
/// Negative zero (0o77777) collapses to 0. Bits above the 15th are ignored,
/// so the function is total over every `u16`.
pub fn decode_ones_complement(word: u16) -> i16 {
    let word = word & WORD_MASK;
    if word & SIGN_BIT != 0 {
        -(((!word) & MAGNITUDE_MASK) as i16)
    } else {
        word as i16
    }
}

/// Converts a signed value into a 15-bit one's-complement word.
///
/// Values beyond +/-16383 saturate. Zero always encodes as +0 (0o00000).
pub fn encode_ones_complement(value: i16) -> u16 {
    let clamped = value.clamp(-MAX_MAGNITUDE, MAX_MAGNITUDE);
    if clamped < 0 {
        !(clamped.unsigned_abs()) & WORD_MASK
    } else {
        clamped as u16
    }
}
