use dsky_protocol::{Channel, ChannelWrite};

use crate::constants::keys::*;

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum KeyError {
    #[error("unknown DSKY key")]
    UnknownKey,
}

/// The 19 DSKY keys
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Key {
    Zero,
    One,
    Two,
    Three,
    Four,
    Five,
    Six,
    Seven,
    Eight,
    Nine,
    Verb,
    Noun,
    Entr,
    Clr,
    KeyRel,
    Rset,
    Plus,
    Minus,
    Pro,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Transition {
    Pressed,
    Released,
}

/// One debounced key edge
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct KeyEvent {
    pub key: Key,
    pub transition: Transition,
}

impl KeyEvent {
    pub fn pressed(key: Key) -> Self {
        Self {
            key,
            transition: Transition::Pressed,
        }
    }

    pub fn released(key: Key) -> Self {
        Self {
            key,
            transition: Transition::Released,
        }
    }
}

/// Channel writes produced by one key event
pub type KeyWrites = heapless::Vec<ChannelWrite, 1>;

impl Key {
    pub const ALL: [Key; 19] = [
        Key::Zero,
        Key::One,
        Key::Two,
        Key::Three,
        Key::Four,
        Key::Five,
        Key::Six,
        Key::Seven,
        Key::Eight,
        Key::Nine,
        Key::Verb,
        Key::Noun,
        Key::Entr,
        Key::Clr,
        Key::KeyRel,
        Key::Rset,
        Key::Plus,
        Key::Minus,
        Key::Pro,
    ];

    /// MNKEYIN code; `None` for PRO, which is not on channel 15
    pub fn keycode(self) -> Option<u16> {
        let code = match self {
            Key::Zero => KEY_0,
            Key::One => KEY_1,
            Key::Two => KEY_2,
            Key::Three => KEY_3,
            Key::Four => KEY_4,
            Key::Five => KEY_5,
            Key::Six => KEY_6,
            Key::Seven => KEY_7,
            Key::Eight => KEY_8,
            Key::Nine => KEY_9,
            Key::Verb => KEY_VERB,
            Key::Noun => KEY_NOUN,
            Key::Entr => KEY_ENTR,
            Key::Clr => KEY_CLR,
            Key::KeyRel => KEY_KEY_REL,
            Key::Rset => KEY_RSET,
            Key::Plus => KEY_PLUS,
            Key::Minus => KEY_MINUS,
            Key::Pro => return None,
        };
        Some(code)
    }

    pub fn label(self) -> &'static str {
        match self {
            Key::Zero => "0",
            Key::One => "1",
            Key::Two => "2",
            Key::Three => "3",
            Key::Four => "4",
            Key::Five => "5",
            Key::Six => "6",
            Key::Seven => "7",
            Key::Eight => "8",
            Key::Nine => "9",
            Key::Verb => "VERB",
            Key::Noun => "NOUN",
            Key::Entr => "ENTR",
            Key::Clr => "CLR",
            Key::KeyRel => "KEY REL",
            Key::Rset => "RSET",
            Key::Plus => "+",
            Key::Minus => "-",
            Key::Pro => "PRO",
        }
    }

    /// Keyboard shortcut letters used by simulator front panels
    pub fn from_char(c: char) -> Result<Key, KeyError> {
        let key = match c.to_ascii_uppercase() {
            '0' => Key::Zero,
            '1' => Key::One,
            '2' => Key::Two,
            '3' => Key::Three,
            '4' => Key::Four,
            '5' => Key::Five,
            '6' => Key::Six,
            '7' => Key::Seven,
            '8' => Key::Eight,
            '9' => Key::Nine,
            'V' => Key::Verb,
            'N' => Key::Noun,
            'E' => Key::Entr,
            'C' => Key::Clr,
            'K' => Key::KeyRel,
            'R' => Key::Rset,
            '+' => Key::Plus,
            '-' => Key::Minus,
            'P' => Key::Pro,
            _ => return Err(KeyError::UnknownKey),
        };
        Ok(key)
    }

    /// Accepts a key label (case-insensitive, "KEYREL" also allowed) or a
    /// single shortcut character
    pub fn from_name(name: &str) -> Result<Key, KeyError> {
        let name = name.trim();
        let mut chars = name.chars();
        if let (Some(c), None) = (chars.next(), chars.next()) {
            return Key::from_char(c);
        }
        Key::ALL
            .iter()
            .copied()
            .find(|key| {
                key.label().eq_ignore_ascii_case(name)
                    || (*key == Key::KeyRel && name.eq_ignore_ascii_case("KEYREL"))
            })
            .ok_or(KeyError::UnknownKey)
    }
}

/// Encodes one key edge as channel writes towards the AGC
pub fn encode(event: &KeyEvent) -> KeyWrites {
    let write = match (event.key.keycode(), event.transition) {
        (Some(code), Transition::Pressed) => {
            ChannelWrite::new(Channel::MnKeyIn, code, KEYCODE_MASK)
        }
        (Some(_), Transition::Released) => ChannelWrite::new(Channel::MnKeyIn, 0, KEYCODE_MASK),
        // PRO is active low
        (None, Transition::Pressed) => ChannelWrite::new(Channel::Chan32, 0, PRO_BIT),
        (None, Transition::Released) => ChannelWrite::new(Channel::Chan32, PRO_BIT, PRO_BIT),
    };
    let mut writes = KeyWrites::new();
    // Capacity 1, a single push cannot fail
    let _ = writes.push(write);
    writes
}

/// Encodes a key given by name; unknown keys produce no writes
pub fn encode_named(name: &str, transition: Transition) -> Result<KeyWrites, KeyError> {
    let key = Key::from_name(name)?;
    Ok(encode(&KeyEvent { key, transition }))
}
