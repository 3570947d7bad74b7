//! HD44780 16x2 character LCD on an 8-bit parallel bus
//!
//! E strobes the bus, RS selects instruction (low) or data (high). R/W is
//! tied to write, so the busy flag is never read and every write is
//! followed by a fixed settle delay instead.

use crate::config::{LCD_CLEAR_DELAY_US, LCD_COLUMNS, LCD_COMMAND_DELAY_US, LCD_ENABLE_PULSE_US};
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;

/// Eight data lines written as one byte
pub trait ParallelBus {
    fn write(&mut self, value: u8);
}

pub mod command {
    pub const CLEAR: u8 = 0x01;
    /// Auto-increment address, no display shift
    pub const ENTRY_MODE: u8 = 0x06;
    /// Display on, cursor off, blink off
    pub const DISPLAY_ON: u8 = 0x0C;
    /// 8-bit bus, 2 lines, 5x11 font
    pub const FUNCTION_SET: u8 = 0x3C;
    pub const SET_DDRAM_ADDRESS: u8 = 0x80;
}

/// DDRAM address command for line `x` (parity selects the line) and column `y`
pub const fn cursor_command(x: u8, y: u8) -> u8 {
    let max_column = (LCD_COLUMNS - 1) as u8;
    let column = if y > max_column { max_column } else { y };
    command::SET_DDRAM_ADDRESS | ((x & 1) << 6) | column
}

pub struct Lcd<E, RS, D, DL> {
    enable: E,
    select: RS,
    bus: D,
    delay: DL,
}

impl<E, RS, D, DL, PinError> Lcd<E, RS, D, DL>
where
    E: OutputPin<Error = PinError>,
    RS: OutputPin<Error = PinError>,
    D: ParallelBus,
    DL: DelayUs<u16>,
{
    pub fn new(enable: E, select: RS, bus: D, delay: DL) -> Self {
        Self { enable, select, bus, delay }
    }

    /// Controller setup; the supply must have been stable for 100 ms
    pub fn init(&mut self) -> Result<(), PinError> {
        self.command(command::FUNCTION_SET)?;
        // Datasheet asks for the function set twice
        self.command(command::FUNCTION_SET)?;
        self.command(command::DISPLAY_ON)?;
        self.clear()?;
        self.command(command::ENTRY_MODE)
    }

    pub fn command(&mut self, value: u8) -> Result<(), PinError> {
        self.select.set_low()?;
        self.write(value)
    }

    pub fn data(&mut self, value: u8) -> Result<(), PinError> {
        self.select.set_high()?;
        self.write(value)
    }

    pub fn clear(&mut self) -> Result<(), PinError> {
        self.command(command::CLEAR)?;
        self.delay.delay_us(LCD_CLEAR_DELAY_US);
        Ok(())
    }

    pub fn set_cursor(&mut self, x: u8, y: u8) -> Result<(), PinError> {
        self.command(cursor_command(x, y))
    }

    /// Write characters until the end of `text` or a NUL byte
    pub fn write_str(&mut self, text: &str) -> Result<(), PinError> {
        self.write_bytes(text.as_bytes())
    }

    pub fn write_bytes(&mut self, bytes: &[u8]) -> Result<(), PinError> {
        for &byte in bytes.iter().take_while(|&&byte| byte != 0) {
            self.data(byte)?;
        }
        Ok(())
    }

    pub fn release(self) -> (E, RS, D, DL) {
        (self.enable, self.select, self.bus, self.delay)
    }

    fn write(&mut self, value: u8) -> Result<(), PinError> {
        self.bus.write(value);
        self.pulse()?;
        self.delay.delay_us(LCD_COMMAND_DELAY_US);
        Ok(())
    }

    fn pulse(&mut self) -> Result<(), PinError> {
        let Self { enable, delay, .. } = self;
        // An interrupt between the edges would stretch the pulse
        critical_section::with(|_| {
            enable.set_high()?;
            delay.delay_us(LCD_ENABLE_PULSE_US);
            enable.set_low()
        })
    }
}
