use dsky_core::constants::dsalmout;
use dsky_core::decoder::{relay_word, DigitSlot, SignRelay, RELAY_ROUTES};
use dsky_core::{Digit, Sign};

/// Fixed display contents used by `simulate`
pub struct Pattern {
    pub prog: [Digit; 2],
    pub verb: [Digit; 2],
    pub noun: [Digit; 2],
    pub registers: [(Sign, [Digit; 5]); 3],
    pub comp_acty: bool,
}

pub const PATTERN_NAMES: [&str; 4] = ["blank", "eights", "v16n36", "counting"];

fn digits<const N: usize>(values: [u8; N]) -> [Digit; N] {
    values.map(Digit::Lit)
}

impl Pattern {
    pub fn by_name(name: &str) -> Option<Pattern> {
        let pattern = match name {
            "blank" => Pattern {
                prog: [Digit::Blank; 2],
                verb: [Digit::Blank; 2],
                noun: [Digit::Blank; 2],
                registers: [(Sign::Blank, [Digit::Blank; 5]); 3],
                comp_acty: false,
            },
            "eights" => Pattern {
                prog: digits([8, 8]),
                verb: digits([8, 8]),
                noun: digits([8, 8]),
                registers: [
                    (Sign::Plus, digits([8; 5])),
                    (Sign::Minus, digits([8; 5])),
                    (Sign::Plus, digits([8; 5])),
                ],
                comp_acty: true,
            },
            "v16n36" => Pattern {
                prog: digits([0, 0]),
                verb: digits([1, 6]),
                noun: digits([3, 6]),
                registers: [(Sign::Plus, digits([0; 5])); 3],
                comp_acty: false,
            },
            "counting" => Pattern {
                prog: digits([1, 2]),
                verb: digits([3, 4]),
                noun: digits([5, 6]),
                registers: [
                    (Sign::Plus, digits([1, 2, 3, 4, 5])),
                    (Sign::Minus, digits([6, 7, 8, 9, 0])),
                    (Sign::Blank, digits([9, 8, 7, 6, 5])),
                ],
                comp_acty: true,
            },
            _ => return None,
        };
        Some(pattern)
    }

    fn digit(&self, slot: DigitSlot) -> Digit {
        match slot {
            DigitSlot::Prog(i) => self.prog[i],
            DigitSlot::Verb(i) => self.verb[i],
            DigitSlot::Noun(i) => self.noun[i],
            DigitSlot::Register(id, i) => self.registers[id.index()].1[i],
        }
    }

    /// (channel, value) pairs that make the AGC side show this pattern
    pub fn channel_words(&self) -> Vec<(u16, u16)> {
        let mut words: Vec<(u16, u16)> = RELAY_ROUTES
            .iter()
            .map(|route| {
                let sign = match route.sign {
                    Some(SignRelay::Plus(id)) => self.registers[id.index()].0 == Sign::Plus,
                    Some(SignRelay::Minus(id)) => self.registers[id.index()].0 == Sign::Minus,
                    None => false,
                };
                let first = route.first.map_or(Digit::Blank, |s| self.digit(s));
                let second = route.second.map_or(Digit::Blank, |s| self.digit(s));
                (0o10, relay_word(route.relay, sign, first, second))
            })
            .collect();
        let lamps = if self.comp_acty { dsalmout::COMP_ACTY } else { 0 };
        words.push((0o11, lamps));
        words
    }
}
