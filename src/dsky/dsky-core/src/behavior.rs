use core::time::Duration;

use log::{debug, info};

use crate::decoder::FlashControl;
use crate::display::{Digit, DisplayState, Indicator, RenderableState};

/// Fields whose visibility channel 163 can modulate
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum FlashField {
    VerbNoun,
    KeyRel,
    OprErr,
}

impl FlashField {
    pub const ALL: [FlashField; 3] = [FlashField::VerbNoun, FlashField::KeyRel, FlashField::OprErr];

    fn index(self) -> usize {
        match self {
            FlashField::VerbNoun => 0,
            FlashField::KeyRel => 1,
            FlashField::OprErr => 2,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Phase {
    On,
    Off,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FieldState {
    Steady,
    Flashing { phase: Phase },
}

/// Time-driven layer over [`DisplayState`]: flashing and lamp test
///
/// Times are offsets from an epoch chosen by the caller and must never go
/// backwards. The flash square wave is referenced to that epoch, so the
/// phase is always derived from a time and never stored.
pub struct BehaviorEngine {
    half_period: Duration,
    flashing: [bool; 3],
    lamp_test_deadline: Option<Duration>,
    last_tick: Duration,
}

impl BehaviorEngine {
    pub fn new(half_period: Duration) -> Self {
        Self {
            half_period,
            flashing: [false; 3],
            lamp_test_deadline: None,
            last_tick: Duration::ZERO,
        }
    }

    /// Field state as of the last tick
    pub fn field_state(&self, field: FlashField) -> FieldState {
        if self.flashing[field.index()] {
            FieldState::Flashing {
                phase: self.phase_at(self.last_tick),
            }
        } else {
            FieldState::Steady
        }
    }

    pub fn last_tick(&self) -> Duration {
        self.last_tick
    }

    /// Square-wave phase at `now`; a zero half-period never blanks
    pub fn phase_at(&self, now: Duration) -> Phase {
        let half = self.half_period.as_nanos();
        if half == 0 || (now.as_nanos() / half) % 2 == 0 {
            Phase::On
        } else {
            Phase::Off
        }
    }

    /// Enters or leaves flashing for each field from a channel 163 word
    pub fn set_flash_control(&mut self, control: FlashControl) {
        for field in FlashField::ALL.iter() {
            let slot = &mut self.flashing[field.index()];
            let flashing = control.is_flashing(*field);
            if *slot != flashing {
                debug!("{:?} {}", field, if flashing { "flashing" } else { "steady" });
                *slot = flashing;
            }
        }
    }

    /// Records the tick time and expires the lamp test
    pub fn tick(&mut self, now: Duration) {
        self.last_tick = now;
        if let Some(deadline) = self.lamp_test_deadline {
            if now > deadline {
                info!("Lamp test finished");
                self.lamp_test_deadline = None;
            }
        }
    }

    /// Lights everything for `duration` starting at `now`
    ///
    /// Calling again while a test runs restarts the timer.
    pub fn start_lamp_test(&mut self, duration: Duration, now: Duration) {
        if self.lamp_test_deadline.is_some() {
            info!("Lamp test restarted for {:?}", duration);
        } else {
            info!("Lamp test started for {:?}", duration);
        }
        // Saturates so an unbounded test never expires
        self.lamp_test_deadline = Some(now.saturating_add(duration));
    }

    pub fn lamp_test_active(&self, now: Duration) -> bool {
        match self.lamp_test_deadline {
            Some(deadline) => now <= deadline,
            None => false,
        }
    }

    fn visible(&self, field: FlashField, now: Duration) -> bool {
        !self.flashing[field.index()] || self.phase_at(now) == Phase::On
    }

    /// Composes display state, flashing and lamp test into what is shown
    pub fn effective_state(&self, display: &DisplayState, now: Duration) -> RenderableState {
        if self.lamp_test_active(now) {
            return RenderableState::fully_lit();
        }

        let mut shown = display.snapshot();
        if !self.visible(FlashField::VerbNoun, now) {
            shown.verb = [Digit::Blank; 2];
            shown.noun = [Digit::Blank; 2];
        }
        if !self.visible(FlashField::KeyRel, now) {
            shown.indicators.set(Indicator::KeyRel, false);
        }
        if !self.visible(FlashField::OprErr, now) {
            shown.indicators.set(Indicator::OprErr, false);
        }
        shown
    }
}
