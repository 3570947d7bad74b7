//! Light-triggered servo press
//!
//! The potentiometer sets a threshold; when the photoresistor reads above
//! it, the servo presses a key and releases it one window later. The RTC
//! overflow marks the end of each 100 ms window.

use crate::config::{SERVO_DUTY_DOWN, SERVO_DUTY_NEUTRAL};
use crate::drivers::Symbol;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum ServoPosition {
    Neutral,
    Pressed,
}

impl ServoPosition {
    pub const fn duty(self) -> u16 {
        match self {
            ServoPosition::Neutral => SERVO_DUTY_NEUTRAL,
            ServoPosition::Pressed => SERVO_DUTY_DOWN,
        }
    }
}

/// Hundreds of the threshold, `A` for 1000 and above
pub const fn threshold_symbol(threshold: u16) -> Symbol {
    match threshold / 100 {
        hundreds if hundreds < 10 => Symbol::Digit(hundreds as u8),
        _ => Symbol::A,
    }
}

#[derive(Debug)]
pub struct Reflex {
    position: ServoPosition,
}

impl Reflex {
    pub const fn new() -> Self {
        Self {
            position: ServoPosition::Neutral,
        }
    }

    #[inline]
    pub fn position(&self) -> ServoPosition {
        self.position
    }

    /// Decide the next servo command once the servo is ready
    ///
    /// Returns the new position; the caller programs its duty and restarts
    /// the readiness window.
    pub fn update(&mut self, ldr: u16, threshold: u16) -> Option<ServoPosition> {
        let next = match self.position {
            ServoPosition::Pressed => ServoPosition::Neutral,
            ServoPosition::Neutral if ldr > threshold => ServoPosition::Pressed,
            ServoPosition::Neutral => return None,
        };
        self.position = next;
        Some(next)
    }
}

impl Default for Reflex {
    fn default() -> Self {
        Self::new()
    }
}
