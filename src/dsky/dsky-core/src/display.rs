use crate::constants::{PAIR_DIGITS, REGISTER_COUNT, REGISTER_DIGITS};

/// One seven-segment digit position
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Digit {
    #[default]
    Blank,
    Lit(u8),
}

impl Digit {
    pub const EIGHT: Digit = Digit::Lit(8);

    pub fn value(self) -> Option<u8> {
        match self {
            Digit::Blank => None,
            Digit::Lit(d) => Some(d),
        }
    }
}

/// Register sign as shown on the plus/minus segment
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub enum Sign {
    #[default]
    Blank,
    Plus,
    Minus,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum RegisterId {
    R1,
    R2,
    R3,
}

impl RegisterId {
    pub const ALL: [RegisterId; REGISTER_COUNT] = [RegisterId::R1, RegisterId::R2, RegisterId::R3];

    pub fn index(self) -> usize {
        match self {
            RegisterId::R1 => 0,
            RegisterId::R2 => 1,
            RegisterId::R3 => 2,
        }
    }
}

/// Discrete status lamps plus COMP ACTY
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Indicator {
    CompActy,
    PrioDisp,
    NoDap,
    Vel,
    NoAtt,
    Alt,
    GimbalLock,
    Tracker,
    Prog,
    UplinkActy,
    Temp,
    KeyRel,
    OprErr,
    Stby,
    Restart,
}

impl Indicator {
    pub const ALL: [Indicator; 15] = [
        Indicator::CompActy,
        Indicator::PrioDisp,
        Indicator::NoDap,
        Indicator::Vel,
        Indicator::NoAtt,
        Indicator::Alt,
        Indicator::GimbalLock,
        Indicator::Tracker,
        Indicator::Prog,
        Indicator::UplinkActy,
        Indicator::Temp,
        Indicator::KeyRel,
        Indicator::OprErr,
        Indicator::Stby,
        Indicator::Restart,
    ];

    pub fn label(self) -> &'static str {
        match self {
            Indicator::CompActy => "COMP ACTY",
            Indicator::PrioDisp => "PRIO DISP",
            Indicator::NoDap => "NO DAP",
            Indicator::Vel => "VEL",
            Indicator::NoAtt => "NO ATT",
            Indicator::Alt => "ALT",
            Indicator::GimbalLock => "GIMBAL LOCK",
            Indicator::Tracker => "TRACKER",
            Indicator::Prog => "PROG",
            Indicator::UplinkActy => "UPLINK ACTY",
            Indicator::Temp => "TEMP",
            Indicator::KeyRel => "KEY REL",
            Indicator::OprErr => "OPR ERR",
            Indicator::Stby => "STBY",
            Indicator::Restart => "RESTART",
        }
    }

    fn bit(self) -> u16 {
        1 << (self as u16)
    }
}

/// Bitset of lit indicators
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Indicators(u16);

impl Indicators {
    pub fn all_on() -> Self {
        Indicator::ALL
            .iter()
            .fold(Indicators::default(), |acc, ind| Indicators(acc.0 | ind.bit()))
    }

    pub fn is_on(&self, indicator: Indicator) -> bool {
        self.0 & indicator.bit() != 0
    }

    pub fn set(&mut self, indicator: Indicator, on: bool) {
        if on {
            self.0 |= indicator.bit();
        } else {
            self.0 &= !indicator.bit();
        }
    }
}

/// Five digits plus the two sign relays of a data register
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct Register {
    pub(crate) digits: [Digit; REGISTER_DIGITS],
    pub(crate) plus: bool,
    pub(crate) minus: bool,
}

impl Register {
    pub fn digits(&self) -> [Digit; REGISTER_DIGITS] {
        self.digits
    }

    /// Plus wins when both relays are latched: it lights the minus bar too
    pub fn sign(&self) -> Sign {
        if self.plus {
            Sign::Plus
        } else if self.minus {
            Sign::Minus
        } else {
            Sign::Blank
        }
    }
}

/// Authoritative steady-state content of the DSKY
///
/// Only the channel decoder writes here; everything else reads
/// [`RenderableState`] copies.
#[derive(Clone, Debug, PartialEq, Eq, Default)]
pub struct DisplayState {
    pub(crate) prog: [Digit; PAIR_DIGITS],
    pub(crate) verb: [Digit; PAIR_DIGITS],
    pub(crate) noun: [Digit; PAIR_DIGITS],
    pub(crate) registers: [Register; REGISTER_COUNT],
    pub(crate) indicators: Indicators,
}

impl DisplayState {
    /// All digits blank, all lamps off
    pub fn new() -> Self {
        Self::default()
    }

    pub fn prog(&self) -> [Digit; PAIR_DIGITS] {
        self.prog
    }

    pub fn verb(&self) -> [Digit; PAIR_DIGITS] {
        self.verb
    }

    pub fn noun(&self) -> [Digit; PAIR_DIGITS] {
        self.noun
    }

    pub fn register(&self, id: RegisterId) -> &Register {
        &self.registers[id.index()]
    }

    pub fn comp_acty(&self) -> bool {
        self.indicators.is_on(Indicator::CompActy)
    }

    pub fn indicator(&self, indicator: Indicator) -> bool {
        self.indicators.is_on(indicator)
    }

    pub fn indicators(&self) -> Indicators {
        self.indicators
    }

    /// Raw state as a renderable value, no flashing or lamp test applied
    pub fn snapshot(&self) -> RenderableState {
        let mut registers = [RenderedRegister::default(); REGISTER_COUNT];
        for (out, reg) in registers.iter_mut().zip(self.registers.iter()) {
            *out = RenderedRegister {
                sign: reg.sign(),
                digits: reg.digits,
            };
        }
        RenderableState {
            prog: self.prog,
            verb: self.verb,
            noun: self.noun,
            registers,
            indicators: self.indicators,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RenderedRegister {
    pub sign: Sign,
    pub digits: [Digit; REGISTER_DIGITS],
}

/// Immutable snapshot handed to rendering and LED backends
#[derive(Clone, Copy, Debug, PartialEq, Eq, Default)]
pub struct RenderableState {
    pub prog: [Digit; PAIR_DIGITS],
    pub verb: [Digit; PAIR_DIGITS],
    pub noun: [Digit; PAIR_DIGITS],
    pub registers: [RenderedRegister; REGISTER_COUNT],
    pub indicators: Indicators,
}

impl RenderableState {
    /// Every segment and lamp lit
    pub fn fully_lit() -> Self {
        let register = RenderedRegister {
            sign: Sign::Plus,
            digits: [Digit::EIGHT; REGISTER_DIGITS],
        };
        RenderableState {
            prog: [Digit::EIGHT; PAIR_DIGITS],
            verb: [Digit::EIGHT; PAIR_DIGITS],
            noun: [Digit::EIGHT; PAIR_DIGITS],
            registers: [register; REGISTER_COUNT],
            indicators: Indicators::all_on(),
        }
    }

    pub fn register(&self, id: RegisterId) -> &RenderedRegister {
        &self.registers[id.index()]
    }

    pub fn comp_acty(&self) -> bool {
        self.indicators.is_on(Indicator::CompActy)
    }

    pub fn indicator(&self, indicator: Indicator) -> bool {
        self.indicators.is_on(indicator)
    }
}
