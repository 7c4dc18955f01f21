use core::convert::TryFrom;

use dsky_protocol::{Channel, ChannelWord};
use log::{debug, warn};

use crate::behavior::FlashField;
use crate::constants::{chan13, digits, dsalmout, flash, relay};
use crate::display::{Digit, DisplayState, Indicator, RegisterId};

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum DecodeError {
    #[error("channel 0o{0:o} is not a DSKY output channel")]
    InvalidChannel(u16),
}

/// Outcome of applying one channel word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Applied {
    /// Display state was updated
    Display,
    /// Channel 163 word, for the behavior engine
    FlashControl(FlashControl),
    /// Word carried nothing the DSKY shows
    Ignored,
}

/// Flash-enable bits carried by channel 163
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct FlashControl(u16);

impl FlashControl {
    pub fn from_bits(value: u16) -> Self {
        FlashControl(value)
    }

    pub fn is_flashing(&self, field: FlashField) -> bool {
        FLASH_BITS
            .iter()
            .any(|(mask, f)| *f == field && self.0 & mask != 0)
    }
}

/// Target of one digit slot in a relay word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum DigitSlot {
    Prog(usize),
    Verb(usize),
    Noun(usize),
    Register(RegisterId, usize),
}

/// Sign relay driven by bit B of a relay word
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum SignRelay {
    Plus(RegisterId),
    Minus(RegisterId),
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct RelayRoute {
    pub relay: u8,
    pub first: Option<DigitSlot>,
    pub second: Option<DigitSlot>,
    pub sign: Option<SignRelay>,
}

const fn route(
    relay: u8,
    first: Option<DigitSlot>,
    second: Option<DigitSlot>,
    sign: Option<SignRelay>,
) -> RelayRoute {
    RelayRoute {
        relay,
        first,
        second,
        sign,
    }
}

use DigitSlot::{Noun, Prog, Register as Reg, Verb};
use RegisterId::{R1, R2, R3};

/// Channel 10 relay code routing
pub const RELAY_ROUTES: [RelayRoute; 11] = [
    route(relay::RELAY_PROG, Some(Prog(0)), Some(Prog(1)), None),
    route(relay::RELAY_VERB, Some(Verb(0)), Some(Verb(1)), None),
    route(relay::RELAY_NOUN, Some(Noun(0)), Some(Noun(1)), None),
    route(8, None, Some(Reg(R1, 0)), None),
    route(7, Some(Reg(R1, 1)), Some(Reg(R1, 2)), Some(SignRelay::Plus(R1))),
    route(6, Some(Reg(R1, 3)), Some(Reg(R1, 4)), Some(SignRelay::Minus(R1))),
    route(5, Some(Reg(R2, 0)), Some(Reg(R2, 1)), Some(SignRelay::Plus(R2))),
    route(4, Some(Reg(R2, 2)), Some(Reg(R2, 3)), Some(SignRelay::Minus(R2))),
    route(3, Some(Reg(R2, 4)), Some(Reg(R3, 0)), None),
    route(2, Some(Reg(R3, 1)), Some(Reg(R3, 2)), Some(SignRelay::Plus(R3))),
    route(1, Some(Reg(R3, 3)), Some(Reg(R3, 4)), Some(SignRelay::Minus(R3))),
];

/// Relay 12 lamp word
pub const RELAY_LAMP_BITS: [(u16, Indicator); 8] = [
    (relay::LAMP_PRIO_DISP, Indicator::PrioDisp),
    (relay::LAMP_NO_DAP, Indicator::NoDap),
    (relay::LAMP_VEL, Indicator::Vel),
    (relay::LAMP_NO_ATT, Indicator::NoAtt),
    (relay::LAMP_ALT, Indicator::Alt),
    (relay::LAMP_GIMBAL_LOCK, Indicator::GimbalLock),
    (relay::LAMP_TRACKER, Indicator::Tracker),
    (relay::LAMP_PROG, Indicator::Prog),
];

/// Channel 11
pub const DSALMOUT_BITS: [(u16, Indicator); 5] = [
    (dsalmout::COMP_ACTY, Indicator::CompActy),
    (dsalmout::UPLINK_ACTY, Indicator::UplinkActy),
    (dsalmout::TEMP, Indicator::Temp),
    (dsalmout::KEY_REL, Indicator::KeyRel),
    (dsalmout::OPR_ERR, Indicator::OprErr),
];

/// Channel 13
pub const CHAN13_BITS: [(u16, Indicator); 2] = [
    (chan13::RESTART, Indicator::Restart),
    (chan13::STBY, Indicator::Stby),
];

/// Channel 163
pub const FLASH_BITS: [(u16, FlashField); 3] = [
    (flash::KEY_REL, FlashField::KeyRel),
    (flash::VERB_NOUN, FlashField::VerbNoun),
    (flash::OPR_ERR, FlashField::OprErr),
];

/// Maps a 5-bit relay digit code to a digit; `None` for codes no digit uses
pub fn digit_from_code(code: u8) -> Option<Digit> {
    if code == digits::BLANK {
        return Some(Digit::Blank);
    }
    digits::CODES
        .iter()
        .position(|c| *c == code)
        .map(|d| Digit::Lit(d as u8))
}

/// Inverse of [`digit_from_code`]
pub fn code_from_digit(digit: Digit) -> u8 {
    match digit {
        Digit::Lit(d) if (d as usize) < digits::CODES.len() => digits::CODES[d as usize],
        _ => digits::BLANK,
    }
}

/// Builds a channel 10 word from its fields
pub fn relay_word(relay_code: u8, sign: bool, first: Digit, second: Digit) -> u16 {
    let mut word = (relay_code as u16 & relay::RELAY_MASK) << relay::RELAY_SHIFT;
    if sign {
        word |= relay::SIGN_BIT;
    }
    word |= (code_from_digit(first) as u16) << relay::FIRST_DIGIT_SHIFT;
    word | code_from_digit(second) as u16
}

fn decode_digit(code: u8) -> Digit {
    match digit_from_code(code) {
        Some(digit) => digit,
        None => {
            warn!("Malformed digit code 0o{:o}, blanking", code);
            Digit::Blank
        }
    }
}

fn store_digit(state: &mut DisplayState, slot: DigitSlot, digit: Digit) {
    match slot {
        DigitSlot::Prog(i) => state.prog[i] = digit,
        DigitSlot::Verb(i) => state.verb[i] = digit,
        DigitSlot::Noun(i) => state.noun[i] = digit,
        DigitSlot::Register(id, i) => state.registers[id.index()].digits[i] = digit,
    }
}

fn apply_bits(state: &mut DisplayState, table: &[(u16, Indicator)], value: u16) {
    for (mask, indicator) in table.iter() {
        state.indicators.set(*indicator, value & mask != 0);
    }
}

/// Channel 10 relay word
fn decode_relay_word(state: &mut DisplayState, value: u16) -> Applied {
    let relay_code = ((value >> relay::RELAY_SHIFT) & relay::RELAY_MASK) as u8;

    if relay_code == relay::RELAY_LAMPS {
        apply_bits(state, &RELAY_LAMP_BITS, value);
        return Applied::Display;
    }

    let route = match RELAY_ROUTES.iter().find(|r| r.relay == relay_code) {
        Some(route) => route,
        None => {
            debug!("Ignoring relay code {} (word 0o{:o})", relay_code, value);
            return Applied::Ignored;
        }
    };

    let sign = value & relay::SIGN_BIT != 0;
    let first = ((value >> relay::FIRST_DIGIT_SHIFT) & relay::DIGIT_MASK) as u8;
    let second = (value & relay::DIGIT_MASK) as u8;

    if let Some(slot) = route.first {
        store_digit(state, slot, decode_digit(first));
    }
    if let Some(slot) = route.second {
        store_digit(state, slot, decode_digit(second));
    }
    match route.sign {
        Some(SignRelay::Plus(id)) => state.registers[id.index()].plus = sign,
        Some(SignRelay::Minus(id)) => state.registers[id.index()].minus = sign,
        None => {}
    }
    Applied::Display
}

/// Applies one AGC output word to the display state
///
/// Channel 163 is not stored; it is handed back as [`Applied::FlashControl`].
/// On error the state is left untouched.
pub fn apply_channel(
    state: &mut DisplayState,
    channel: u16,
    value: u16,
) -> Result<Applied, DecodeError> {
    let channel = Channel::try_from(channel).map_err(|_| DecodeError::InvalidChannel(channel))?;
    apply_word(state, ChannelWord::new(channel, value))
}

pub fn apply_word(state: &mut DisplayState, word: ChannelWord) -> Result<Applied, DecodeError> {
    debug!("Channel {} <- 0o{:05o}", word.channel, word.value);
    match word.channel {
        Channel::Dsky => Ok(decode_relay_word(state, word.value)),
        Channel::DsAlmOut => {
            apply_bits(state, &DSALMOUT_BITS, word.value);
            Ok(Applied::Display)
        }
        Channel::Chan13 => {
            apply_bits(state, &CHAN13_BITS, word.value);
            Ok(Applied::Display)
        }
        Channel::DskyFlash => Ok(Applied::FlashControl(FlashControl::from_bits(word.value))),
        Channel::MnKeyIn | Channel::Chan32 => {
            Err(DecodeError::InvalidChannel(word.channel.number()))
        }
    }
}

#[cfg(test)]
mod decoder_tests {
    use super::*;
    use crate::display::{Indicators, Sign};

    fn lit(d: u8) -> Digit {
        Digit::Lit(d)
    }

    fn apply(state: &mut DisplayState, channel: u16, value: u16) -> Applied {
        apply_channel(state, channel, value).unwrap()
    }

    #[test]
    fn test_digit_code_table() {
        let expected = [
            (21, 0),
            (3, 1),
            (25, 2),
            (27, 3),
            (15, 4),
            (30, 5),
            (28, 6),
            (19, 7),
            (29, 8),
            (31, 9),
        ];
        for (code, digit) in expected.iter() {
            assert_eq!(digit_from_code(*code), Some(lit(*digit)));
            assert_eq!(code_from_digit(lit(*digit)), *code);
        }
        assert_eq!(digit_from_code(0), Some(Digit::Blank));
    }

    #[test]
    fn test_invalid_digit_codes_are_malformed() {
        let valid = [0u8, 21, 3, 25, 27, 15, 30, 28, 19, 29, 31];
        for code in 0..32u8 {
            if !valid.contains(&code) {
                assert_eq!(digit_from_code(code), None, "code {}", code);
            }
        }
    }

    #[test]
    fn test_prog_word_touches_only_prog() {
        let mut state = DisplayState::new();
        apply(&mut state, 0o10, relay_word(10, false, lit(3), lit(5)));
        apply(&mut state, 0o10, relay_word(9, false, lit(1), lit(6)));
        apply(&mut state, 0o10, relay_word(5, true, lit(4), lit(2)));
        let before = state.clone();

        for tens in 0..10 {
            for ones in 0..10 {
                let mut next = before.clone();
                apply(&mut next, 0o10, relay_word(11, false, lit(tens), lit(ones)));
                assert_eq!(next.prog(), [lit(tens), lit(ones)]);
                assert_eq!(next.verb(), before.verb());
                assert_eq!(next.noun(), before.noun());
                assert_eq!(next.registers, before.registers);
                assert_eq!(next.indicators(), before.indicators());
            }
        }
    }

    #[test]
    fn test_verb_and_noun_routes() {
        let mut state = DisplayState::new();
        apply(&mut state, 0o10, relay_word(10, false, lit(3), lit(7)));
        apply(&mut state, 0o10, relay_word(9, false, lit(0), lit(6)));
        assert_eq!(state.verb(), [lit(3), lit(7)]);
        assert_eq!(state.noun(), [lit(0), lit(6)]);
    }

    #[test]
    fn test_register_routes() {
        // (relay, first digit target, second digit target)
        let cases: [(u8, Option<(RegisterId, usize)>, (RegisterId, usize)); 8] = [
            (8, None, (R1, 0)),
            (7, Some((R1, 1)), (R1, 2)),
            (6, Some((R1, 3)), (R1, 4)),
            (5, Some((R2, 0)), (R2, 1)),
            (4, Some((R2, 2)), (R2, 3)),
            (3, Some((R2, 4)), (R3, 0)),
            (2, Some((R3, 1)), (R3, 2)),
            (1, Some((R3, 3)), (R3, 4)),
        ];
        for (code, first, (second_id, second_pos)) in cases.iter() {
            let mut state = DisplayState::new();
            apply(&mut state, 0o10, relay_word(*code, false, lit(4), lit(9)));
            assert_eq!(state.register(*second_id).digits()[*second_pos], lit(9));

            let lit_count: usize = RegisterId::ALL
                .iter()
                .map(|id| {
                    state
                        .register(*id)
                        .digits()
                        .iter()
                        .filter(|d| **d != Digit::Blank)
                        .count()
                })
                .sum();
            match first {
                Some((id, pos)) => {
                    assert_eq!(state.register(*id).digits()[*pos], lit(4));
                    assert_eq!(lit_count, 2, "relay {}", code);
                }
                None => assert_eq!(lit_count, 1, "relay {}", code),
            }
        }
    }

    #[test]
    fn test_relay_3_splits_r2_and_r3() {
        let mut state = DisplayState::new();
        apply(&mut state, 0o10, relay_word(3, false, lit(5), lit(1)));
        assert_eq!(state.register(R2).digits()[4], lit(5));
        assert_eq!(state.register(R3).digits()[0], lit(1));
    }

    #[test]
    fn test_relay_8_ignores_first_digit() {
        let mut state = DisplayState::new();
        apply(&mut state, 0o10, relay_word(8, true, lit(7), lit(2)));
        assert_eq!(state.register(R1).digits()[0], lit(2));
        assert_eq!(state.register(R1).sign(), Sign::Blank);
        assert_eq!(state.prog(), [Digit::Blank; 2]);
    }

    #[test]
    fn test_sign_relays() {
        let cases = [
            (7, 6, R1),
            (5, 4, R2),
            (2, 1, R3),
        ];
        for (plus, minus, id) in cases.iter() {
            let mut state = DisplayState::new();
            apply(&mut state, 0o10, relay_word(*minus, true, lit(0), lit(0)));
            assert_eq!(state.register(*id).sign(), Sign::Minus);
            apply(&mut state, 0o10, relay_word(*plus, true, lit(0), lit(0)));
            assert_eq!(state.register(*id).sign(), Sign::Plus);
            apply(&mut state, 0o10, relay_word(*plus, false, lit(0), lit(0)));
            assert_eq!(state.register(*id).sign(), Sign::Minus);
            apply(&mut state, 0o10, relay_word(*minus, false, lit(0), lit(0)));
            assert_eq!(state.register(*id).sign(), Sign::Blank);
        }
    }

    #[test]
    fn test_r2_sign_is_sticky() {
        let mut state = DisplayState::new();
        apply(&mut state, 0o10, relay_word(4, true, lit(1), lit(1)));
        assert_eq!(state.register(R2).sign(), Sign::Minus);

        // Relay 3 carries R2 digits but no R2 sign relay
        for d in 0..10 {
            apply(&mut state, 0o10, relay_word(3, true, lit(d), lit(d)));
            apply(&mut state, 0o10, relay_word(3, false, lit(d), lit(d)));
        }
        assert_eq!(state.register(R2).sign(), Sign::Minus);
        assert_eq!(state.register(R3).sign(), Sign::Blank);
    }

    #[test]
    fn test_malformed_digit_blanks_only_itself() {
        let mut state = DisplayState::new();
        apply(&mut state, 0o10, relay_word(11, false, lit(6), lit(3)));
        apply(&mut state, 0o10, relay_word(10, false, lit(1), lit(6)));

        // Code 0o12 is not a digit
        let word = (11 << 11) | (0o12 << 5) | 19;
        assert_eq!(apply(&mut state, 0o10, word), Applied::Display);
        assert_eq!(state.prog(), [Digit::Blank, lit(7)]);
        assert_eq!(state.verb(), [lit(1), lit(6)]);

        let word = (11 << 11) | (21 << 5) | 0o12;
        apply(&mut state, 0o10, word);
        assert_eq!(state.prog(), [lit(0), Digit::Blank]);
    }

    #[test]
    fn test_relay_lamp_word() {
        for (mask, indicator) in RELAY_LAMP_BITS.iter() {
            let mut state = DisplayState::new();
            apply(&mut state, 0o10, (12u16 << 11) | *mask);
            for other in crate::display::Indicator::ALL.iter() {
                assert_eq!(state.indicator(*other), other == indicator);
            }
        }
    }

    #[test]
    fn test_unused_relay_codes_ignored() {
        for code in [0u16, 13, 14, 15].iter() {
            let mut state = DisplayState::new();
            let result = apply(&mut state, 0o10, (*code << 11) | 0o1777);
            assert_eq!(result, Applied::Ignored);
            assert_eq!(state, DisplayState::new());
        }
    }

    #[test]
    fn test_dsalmout_bits() {
        for (mask, indicator) in DSALMOUT_BITS.iter() {
            let mut state = DisplayState::new();
            apply(&mut state, 0o11, *mask);
            for other in crate::display::Indicator::ALL.iter() {
                assert_eq!(state.indicator(*other), other == indicator);
            }
        }
    }

    #[test]
    fn test_dsalmout_bit_independence() {
        let all: u16 = DSALMOUT_BITS.iter().fold(0, |acc, (m, _)| acc | m);
        for background in 0..(1u16 << DSALMOUT_BITS.len()) {
            // Spread the background pattern over the lamp bits
            let base = DSALMOUT_BITS
                .iter()
                .enumerate()
                .filter(|(i, _)| background & (1u16 << *i) != 0)
                .fold(0, |acc, (_, (m, _))| acc | m);
            for (mask, indicator) in DSALMOUT_BITS.iter() {
                let mut on = DisplayState::new();
                let mut off = DisplayState::new();
                apply(&mut on, 0o11, base | mask);
                apply(&mut off, 0o11, base & !mask);
                assert!(on.indicator(*indicator));
                assert!(!off.indicator(*indicator));
                for (_, other) in DSALMOUT_BITS.iter().filter(|(m, _)| m != mask) {
                    assert_eq!(on.indicator(*other), off.indicator(*other));
                }
            }
        }
        let mut state = DisplayState::new();
        apply(&mut state, 0o11, all);
        assert!(state.comp_acty());
    }

    #[test]
    fn test_chan13_bits() {
        let mut state = DisplayState::new();
        apply(&mut state, 0o13, chan13::STBY);
        assert!(state.indicator(Indicator::Stby));
        assert!(!state.indicator(Indicator::Restart));
        apply(&mut state, 0o13, chan13::RESTART);
        assert!(!state.indicator(Indicator::Stby));
        assert!(state.indicator(Indicator::Restart));
    }

    #[test]
    fn test_flash_channel_not_stored() {
        let mut state = DisplayState::new();
        let result = apply(&mut state, 0o163, flash::VERB_NOUN | flash::OPR_ERR);
        match result {
            Applied::FlashControl(control) => {
                assert!(control.is_flashing(FlashField::VerbNoun));
                assert!(control.is_flashing(FlashField::OprErr));
                assert!(!control.is_flashing(FlashField::KeyRel));
            }
            other => panic!("unexpected {:?}", other),
        }
        assert_eq!(state, DisplayState::new());
    }

    #[test]
    fn test_invalid_channels_leave_state() {
        let mut state = DisplayState::new();
        apply(&mut state, 0o11, dsalmout::TEMP);
        let before = state.clone();
        for channel in [0o12u16, 0o15, 0o32, 0o34, 0o777].iter() {
            assert_eq!(
                apply_channel(&mut state, *channel, 0o77777),
                Err(DecodeError::InvalidChannel(*channel))
            );
        }
        assert_eq!(state, before);
        assert_eq!(state.indicators(), {
            let mut lamps = Indicators::default();
            lamps.set(Indicator::Temp, true);
            lamps
        });
    }
}
