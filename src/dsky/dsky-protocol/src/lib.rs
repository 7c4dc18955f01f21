#![no_std]

pub mod agc;
pub mod channel;
pub mod codec;

pub use channel::{Channel, ChannelError, ChannelWord, ChannelWrite};
pub use codec::{decode_ones_complement, encode_ones_complement};
