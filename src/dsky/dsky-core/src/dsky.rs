use core::time::Duration;

use dsky_protocol::{Channel, ChannelWord, ChannelWrite};
use log::{debug, warn};

use crate::behavior::BehaviorEngine;
use crate::constants::{interrupts, keys, ports};
use crate::decoder::{self, Applied, DecodeError};
use crate::display::{DisplayState, RenderableState};
use crate::keyboard::{self, KeyEvent, KeyWrites};
use crate::periph::IoPeriph;

/// The protocol engine: display state, behavior layer and keyboard image
///
/// Single writer: every mutating call must come from one thread.
pub struct Dsky {
    display: DisplayState,
    behavior: BehaviorEngine,
    mnkeyin: u16, // Last value written to channel 15
    chan32: u16,  // Channel 32 image, PRO idles high
    keyrupt: bool,
}

impl Dsky {
    pub fn new(flash_half_period: Duration) -> Self {
        Self {
            display: DisplayState::new(),
            behavior: BehaviorEngine::new(flash_half_period),
            mnkeyin: 0,
            chan32: 0o77777,
            keyrupt: false,
        }
    }

    pub fn display(&self) -> &DisplayState {
        &self.display
    }

    pub fn behavior(&self) -> &BehaviorEngine {
        &self.behavior
    }

    /// Applies an AGC output word, routing channel 163 to the behavior engine
    pub fn apply(&mut self, word: ChannelWord) -> Result<Applied, DecodeError> {
        let applied = decoder::apply_word(&mut self.display, word).map_err(|e| {
            warn!("Dropping word 0o{:05o}: {}", word.value, e);
            e
        })?;
        if let Applied::FlashControl(control) = applied {
            self.behavior.set_flash_control(control);
        }
        Ok(applied)
    }

    pub fn apply_raw(&mut self, channel: u16, value: u16) -> Result<Applied, DecodeError> {
        match Channel::try_from(channel) {
            Ok(channel) => self.apply(ChannelWord::new(channel, value)),
            Err(_) => {
                warn!("Dropping word 0o{:05o} for channel 0o{:o}", value, channel);
                Err(DecodeError::InvalidChannel(channel))
            }
        }
    }

    /// Encodes a key edge and latches it into the keyboard channel image
    pub fn press(&mut self, event: KeyEvent) -> KeyWrites {
        let writes = keyboard::encode(&event);
        for write in writes.iter() {
            self.latch(write);
        }
        writes
    }

    fn latch(&mut self, write: &ChannelWrite) {
        match write.channel {
            Channel::MnKeyIn => {
                self.mnkeyin = write.merge(self.mnkeyin);
                if write.value & keys::KEYCODE_MASK != 0 {
                    self.keyrupt = true;
                }
            }
            Channel::Chan32 => self.chan32 = write.merge(self.chan32),
            other => debug!("Key write to channel {} not latched", other),
        }
    }

    pub fn tick(&mut self, now: Duration) {
        self.behavior.tick(now);
    }

    pub fn start_lamp_test(&mut self, duration: Duration, now: Duration) {
        self.behavior.start_lamp_test(duration, now);
    }

    /// Effective state to show at `now`
    pub fn render(&self, now: Duration) -> RenderableState {
        self.behavior.effective_state(&self.display, now)
    }
}

impl IoPeriph for Dsky {
    fn read(&self, channel_idx: usize) -> u16 {
        match channel_idx {
            ports::CHANNEL_MNKEYIN => self.mnkeyin,
            ports::CHANNEL_CHAN32 => self.chan32,
            _ => 0o00000,
        }
    }

    fn write(&mut self, channel_idx: usize, value: u16) {
        match channel_idx {
            ports::CHANNEL_DSKY
            | ports::CHANNEL_DSALMOUT
            | ports::CHANNEL_CHAN13
            | ports::CHANNEL_DSKY_FLASH => {
                let _ = self.apply_raw(channel_idx as u16, value);
            }
            // Other channels belong to other peripherals
            _ => {}
        }
    }

    fn is_interrupt(&mut self) -> u16 {
        if self.keyrupt {
            self.keyrupt = false;
            1 << interrupts::INTERRUPT_KEYPRESS1
        } else {
            0
        }
    }
}

#[cfg(test)]
mod dsky_tests {
    use super::*;
    use crate::constants::flash;
    use crate::decoder::relay_word;
    use crate::display::{Digit, Indicator};
    use crate::keyboard::Key;

    fn ms(value: u64) -> Duration {
        Duration::from_millis(value)
    }

    #[test]
    fn test_flash_word_reaches_behavior() {
        let mut dsky = Dsky::new(ms(500));
        dsky.apply_raw(0o10, relay_word(10, false, Digit::Lit(3), Digit::Lit(5)))
            .unwrap();
        dsky.apply_raw(0o163, flash::VERB_NOUN).unwrap();
        assert_eq!(dsky.render(ms(0)).verb, [Digit::Lit(3), Digit::Lit(5)]);
        assert_eq!(dsky.render(ms(500)).verb, [Digit::Blank; 2]);
        // Raw state is unaffected by flashing
        assert_eq!(dsky.display().verb(), [Digit::Lit(3), Digit::Lit(5)]);
    }

    #[test]
    fn test_invalid_channel_dropped() {
        let mut dsky = Dsky::new(ms(500));
        assert_eq!(
            dsky.apply_raw(0o15, 0o07),
            Err(DecodeError::InvalidChannel(0o15))
        );
        assert_eq!(
            dsky.apply_raw(0o77, 0o07),
            Err(DecodeError::InvalidChannel(0o77))
        );
        assert_eq!(dsky.render(ms(0)), RenderableState::default());
    }

    #[test]
    fn test_periph_write_decodes() {
        let mut dsky = Dsky::new(ms(500));
        IoPeriph::write(&mut dsky, ports::CHANNEL_DSALMOUT, 0o2);
        IoPeriph::write(&mut dsky, 0o34, 0o77777);
        assert!(dsky.display().comp_acty());
        assert!(!dsky.display().indicator(Indicator::Temp));
    }

    #[test]
    fn test_key_latch_and_keyrupt() {
        let mut dsky = Dsky::new(ms(500));
        assert_eq!(dsky.is_interrupt(), 0);

        dsky.press(KeyEvent::pressed(Key::Verb));
        assert_eq!(IoPeriph::read(&dsky, ports::CHANNEL_MNKEYIN), 0o21);
        assert_eq!(dsky.is_interrupt(), 1 << 5);
        assert_eq!(dsky.is_interrupt(), 0);

        dsky.press(KeyEvent::released(Key::Verb));
        assert_eq!(IoPeriph::read(&dsky, ports::CHANNEL_MNKEYIN), 0);
        assert_eq!(dsky.is_interrupt(), 0);
    }

    #[test]
    fn test_pro_latch() {
        let mut dsky = Dsky::new(ms(500));
        assert_eq!(IoPeriph::read(&dsky, ports::CHANNEL_CHAN32), 0o77777);
        let writes = dsky.press(KeyEvent::pressed(Key::Pro));
        assert_eq!(writes[0].as_tuple(), (0o32, 0, 0o20000));
        assert_eq!(IoPeriph::read(&dsky, ports::CHANNEL_CHAN32), 0o57777);
        dsky.press(KeyEvent::released(Key::Pro));
        assert_eq!(IoPeriph::read(&dsky, ports::CHANNEL_CHAN32), 0o77777);
        assert_eq!(dsky.is_interrupt(), 0);
    }

    #[test]
    fn test_lamp_test_via_facade() {
        let mut dsky = Dsky::new(ms(500));
        dsky.start_lamp_test(ms(5000), ms(100));
        assert_eq!(dsky.render(ms(5100)), RenderableState::fully_lit());
        dsky.tick(ms(5101));
        assert!(!dsky.behavior().lamp_test_active(ms(5101)));
        assert_eq!(dsky.render(ms(5101)), RenderableState::default());
    }
}
