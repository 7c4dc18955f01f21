use core::convert::TryFrom;
use core::fmt;

use crate::codec::WORD_MASK;

/// AGC I/O channels spoken by the DSKY
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Channel {
    /// Display relay words (relay code, sign, two digits)
    Dsky,
    /// Indicator lamps driven by the AGC (DSALMOUT)
    DsAlmOut,
    /// STBY / RESTART lamps
    Chan13,
    /// Main DSKY keyboard input (MNKEYIN)
    MnKeyIn,
    /// Discrete inputs; carries the PRO key on bit 14
    Chan32,
    /// Simulator-only channel carrying flash control bits
    DskyFlash,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, thiserror::Error)]
pub enum ChannelError {
    #[error("invalid channel 0o{0:o}")]
    InvalidChannel(u16),
}

impl Channel {
    pub const ALL: [Channel; 6] = [
        Channel::Dsky,
        Channel::DsAlmOut,
        Channel::Chan13,
        Channel::MnKeyIn,
        Channel::Chan32,
        Channel::DskyFlash,
    ];

    /// Octal channel number as used on the wire
    pub const fn number(self) -> u16 {
        match self {
            Channel::Dsky => 0o10,
            Channel::DsAlmOut => 0o11,
            Channel::Chan13 => 0o13,
            Channel::MnKeyIn => 0o15,
            Channel::Chan32 => 0o32,
            Channel::DskyFlash => 0o163,
        }
    }
}

impl TryFrom<u16> for Channel {
    type Error = ChannelError;

    fn try_from(number: u16) -> Result<Self, Self::Error> {
        match number {
            0o10 => Ok(Channel::Dsky),
            0o11 => Ok(Channel::DsAlmOut),
            0o13 => Ok(Channel::Chan13),
            0o15 => Ok(Channel::MnKeyIn),
            0o32 => Ok(Channel::Chan32),
            0o163 => Ok(Channel::DskyFlash),
            _ => Err(ChannelError::InvalidChannel(number)),
        }
    }
}

impl fmt::Display for Channel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:o}", self.number())
    }
}

/// A single 15-bit value on a channel, as read from or written to the AGC
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelWord {
    pub channel: Channel,
    pub value: u16,
}

impl ChannelWord {
    pub fn new(channel: Channel, value: u16) -> Self {
        Self {
            channel,
            value: value & WORD_MASK,
        }
    }

    /// Builds a word from a raw channel number, rejecting unknown channels
    pub fn from_raw(channel: u16, value: u16) -> Result<Self, ChannelError> {
        Ok(Self::new(Channel::try_from(channel)?, value))
    }
}

/// Masked write towards the AGC: only bits set in `mask` are affected
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ChannelWrite {
    pub channel: Channel,
    pub value: u16,
    pub mask: u16,
}

impl ChannelWrite {
    pub const fn new(channel: Channel, value: u16, mask: u16) -> Self {
        Self {
            channel,
            value: value & WORD_MASK,
            mask: mask & WORD_MASK,
        }
    }

    /// Applies this write on top of the previous channel contents
    pub fn merge(&self, previous: u16) -> u16 {
        ((previous & !self.mask) | (self.value & self.mask)) & WORD_MASK
    }

    pub fn as_tuple(&self) -> (u16, u16, u16) {
        (self.channel.number(), self.value, self.mask)
    }
}
