//! Seven-segment display on a full 8-bit port
//!
//! Bits 0..6 drive segments a..g, bit 7 is unused. The common side of the
//! display is switched by a transistor on a separate pin.

use super::lcd::ParallelBus;
use embedded_hal::digital::v2::OutputPin;

const DIGITS: [u8; 10] = [0x3F, 0x06, 0x5B, 0x4F, 0x66, 0x6D, 0x7D, 0x07, 0x7F, 0x6F];
const GLYPH_A: u8 = 0x77;
const GLYPH_E: u8 = 0x79;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Symbol {
    Digit(u8),
    A,
    /// Error marker
    E,
    Blank,
}

impl Symbol {
    /// Segment bitmap; digits above 9 are shown as the error marker
    pub const fn glyph(self) -> u8 {
        match self {
            Symbol::Digit(digit) if digit < 10 => DIGITS[digit as usize],
            Symbol::Digit(_) | Symbol::E => GLYPH_E,
            Symbol::A => GLYPH_A,
            Symbol::Blank => 0x00,
        }
    }
}

pub struct SevenSegment<B, P> {
    segments: B,
    enable: P,
}

impl<B, P> SevenSegment<B, P>
where
    B: ParallelBus,
    P: OutputPin,
{
    /// Clear the segments and switch the display on
    pub fn new(mut segments: B, mut enable: P) -> Result<Self, P::Error> {
        segments.write(Symbol::Blank.glyph());
        enable.set_high()?;
        Ok(Self { segments, enable })
    }

    pub fn show(&mut self, symbol: Symbol) {
        self.segments.write(symbol.glyph());
    }

    pub fn set_enabled(&mut self, on: bool) -> Result<(), P::Error> {
        if on {
            self.enable.set_high()
        } else {
            self.enable.set_low()
        }
    }
}
