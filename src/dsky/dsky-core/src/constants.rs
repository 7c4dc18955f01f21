// Default lamp test length (VERB 35)
pub const DEFAULT_LAMP_TEST_MS: u64 = 5000;
// Default flash half-period for VERB/NOUN, KEY REL and OPR ERR
pub const DEFAULT_FLASH_HALF_PERIOD_MS: u64 = 500;

pub const PAIR_DIGITS: usize = 2;
pub const REGISTER_DIGITS: usize = 5;
pub const REGISTER_COUNT: usize = 3;

pub mod ports {
    // Channel constants (I/O port identifiers)
    pub const CHANNEL_DSKY: usize = 0o10;
    pub const CHANNEL_DSALMOUT: usize = 0o11;
    pub const CHANNEL_CHAN13: usize = 0o13;
    pub const CHANNEL_MNKEYIN: usize = 0o15;
    pub const CHANNEL_CHAN32: usize = 0o32;
    pub const CHANNEL_DSKY_FLASH: usize = 0o163;
}

pub mod relay {
    // Channel 10 word layout: AAAA B CCCCC DDDDD
    pub const RELAY_SHIFT: u16 = 11;
    pub const RELAY_MASK: u16 = 0o17;
    pub const SIGN_BIT: u16 = 0o2000;
    pub const FIRST_DIGIT_SHIFT: u16 = 5;
    pub const DIGIT_MASK: u16 = 0o37;

    // Relay codes
    pub const RELAY_PROG: u8 = 11;
    pub const RELAY_VERB: u8 = 10;
    pub const RELAY_NOUN: u8 = 9;
    pub const RELAY_LAMPS: u8 = 12;

    // Relay 12 lamp word
    pub const LAMP_PRIO_DISP: u16 = 0o1;
    pub const LAMP_NO_DAP: u16 = 0o2;
    pub const LAMP_VEL: u16 = 0o4;
    pub const LAMP_NO_ATT: u16 = 0o10;
    pub const LAMP_ALT: u16 = 0o20;
    pub const LAMP_GIMBAL_LOCK: u16 = 0o40;
    pub const LAMP_TRACKER: u16 = 0o200;
    pub const LAMP_PROG: u16 = 0o400;
}

pub mod digits {
    // Relay digit codes indexed by the digit they light
    pub const CODES: [u8; 10] = [21, 3, 25, 27, 15, 30, 28, 19, 29, 31];
    pub const BLANK: u8 = 0;
}

pub mod dsalmout {
    // Channel 11 lamp bits
    pub const COMP_ACTY: u16 = 0o2;
    pub const UPLINK_ACTY: u16 = 0o4;
    pub const TEMP: u16 = 0o10;
    pub const KEY_REL: u16 = 0o20;
    pub const OPR_ERR: u16 = 0o100;
}

pub mod chan13 {
    pub const RESTART: u16 = 0o200;
    pub const STBY: u16 = 0o400;
}

pub mod flash {
    // Channel 163 flash-enable bits
    pub const KEY_REL: u16 = 0o20;
    pub const VERB_NOUN: u16 = 0o40;
    pub const OPR_ERR: u16 = 0o100;
}

pub mod keys {
    // MNKEYIN (channel 15) key codes
    pub const KEYCODE_MASK: u16 = 0o37;
    pub const KEY_0: u16 = 0o20;
    pub const KEY_1: u16 = 0o01;
    pub const KEY_2: u16 = 0o02;
    pub const KEY_3: u16 = 0o03;
    pub const KEY_4: u16 = 0o04;
    pub const KEY_5: u16 = 0o05;
    pub const KEY_6: u16 = 0o06;
    pub const KEY_7: u16 = 0o07;
    pub const KEY_8: u16 = 0o10;
    pub const KEY_9: u16 = 0o11;
    pub const KEY_VERB: u16 = 0o21;
    pub const KEY_RSET: u16 = 0o22;
    pub const KEY_KEY_REL: u16 = 0o31;
    pub const KEY_PLUS: u16 = 0o32;
    pub const KEY_MINUS: u16 = 0o33;
    pub const KEY_ENTR: u16 = 0o34;
    pub const KEY_CLR: u16 = 0o36;
    pub const KEY_NOUN: u16 = 0o37;

    // PRO key lives on channel 32 bit 14, active low
    pub const PRO_BIT: u16 = 0o20000;
}

pub mod interrupts {
    pub const INTERRUPT_KEYPRESS1: u8 = 0x5;
}
