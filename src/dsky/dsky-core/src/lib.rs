#![no_std]

pub mod behavior;
pub mod constants;
pub mod decoder;
pub mod display;
pub mod dsky;
pub mod keyboard;
pub mod periph;

pub use behavior::{BehaviorEngine, FieldState, FlashField, Phase};
pub use decoder::{apply_channel, Applied, DecodeError, FlashControl};
pub use display::{Digit, DisplayState, Indicator, RegisterId, RenderableState, Sign};
pub use dsky::Dsky;
pub use keyboard::{encode, encode_named, Key, KeyError, KeyEvent, Transition};
