use embedded_hal::serial::{Read, Write};

/// Blocking text output over a serial transmitter
pub struct SerialConsole<S> {
    serial: S,
}

impl<S> SerialConsole<S> {
    pub fn new(serial: S) -> Self {
        Self { serial }
    }

    pub fn release(self) -> S {
        self.serial
    }
}

impl<S: Write<u8>> SerialConsole<S> {
    /// Spin until the data register is empty, then send `byte`
    pub fn write_byte(&mut self, byte: u8) -> Result<(), S::Error> {
        nb::block!(self.serial.write(byte))
    }

    pub fn write_str(&mut self, s: &str) -> Result<(), S::Error> {
        s.bytes().try_for_each(|byte| self.write_byte(byte))
    }

    pub fn write_line(&mut self, s: &str) -> Result<(), S::Error> {
        self.write_str(s)?;
        self.write_str("\r\n")
    }

    pub fn flush(&mut self) -> Result<(), S::Error> {
        nb::block!(self.serial.flush())
    }
}

impl<S: Read<u8>> SerialConsole<S> {
    /// Next received byte, if one is waiting
    pub fn read_byte(&mut self) -> Option<u8> {
        self.serial.read().ok()
    }
}

impl<S: Write<u8>> ufmt::uWrite for SerialConsole<S> {
    type Error = S::Error;

    fn write_str(&mut self, s: &str) -> Result<(), S::Error> {
        SerialConsole::write_str(self, s)
    }
}
