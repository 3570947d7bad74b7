//! Countdown that a cut wire freezes
//!
//! The number starts at 10 and the first second shows 9. At 0 the display
//! blinks until reset. Cutting the wire stops the count where it is.

use crate::config::COUNTDOWN_START;
use crate::drivers::Symbol;

#[derive(Debug)]
pub struct Countdown {
    number: u8,
    running: bool,
    visible: bool,
}

impl Countdown {
    pub const fn new() -> Self {
        Self {
            number: COUNTDOWN_START,
            running: true,
            visible: true,
        }
    }

    /// Advance by one second; returns the glyph to show when the count moved
    pub fn second(&mut self) -> Option<Symbol> {
        if !self.running {
            return None;
        }

        self.number = self.number.saturating_sub(1);
        if self.number == 0 {
            self.running = false;
        }
        Some(self.symbol())
    }

    /// Wire cut: no further second is counted
    pub fn cut_wire(&mut self) {
        if self.running {
            log::info!("countdown halted at {}", self.number);
        }
        self.running = false;
    }

    #[inline]
    pub fn number(&self) -> u8 {
        self.number
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.running
    }

    /// The display blinks once the count reached zero
    #[inline]
    pub fn is_blinking(&self) -> bool {
        self.number == 0
    }

    /// Flip visibility while blinking; returns whether the display is on
    pub fn blink(&mut self) -> bool {
        if self.is_blinking() {
            self.visible = !self.visible;
        }
        self.visible
    }

    pub fn symbol(&self) -> Symbol {
        if self.number < 10 {
            Symbol::Digit(self.number)
        } else {
            Symbol::Blank
        }
    }
}

impl Default for Countdown {
    fn default() -> Self {
        Self::new()
    }
}
