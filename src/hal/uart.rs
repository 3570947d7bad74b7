use super::gpio::{Input, Pin};
use super::pac::{PORTA, USART0};
use crate::config::{CPU_FREQ_HZ, UART_BAUD};
use core::convert::Infallible;
use embedded_hal::serial::{Read, Write};

const RXEN: u8 = 0x80;
const TXEN: u8 = 0x40;
const RXCIF: u8 = 0x80;
const TXCIF: u8 = 0x40;
const DREIF: u8 = 0x20;

/// BAUD register value for normal speed asynchronous mode, rounded
pub const fn baud_register(cpu_hz: u32, baud: u32) -> u16 {
    ((64 * cpu_hz as u64 + 8 * baud as u64) / (16 * baud as u64)) as u16
}

/// USART0 on PA0/PA1, 8N1, polled
pub struct Usart0 {
    tx: Tx,
    rx: Rx,
}

/// Transmit half of [`Usart0`]
pub struct Tx {
    _private: (),
}

/// Receive half of [`Usart0`]
pub struct Rx {
    _private: (),
}

fn status() -> u8 {
    // SAFETY: read-only status access
    unsafe { (*USART0::ptr()).status.read().bits() }
}

impl Usart0 {
    pub fn new(tx: Pin<PORTA, 0, Input>) -> Self {
        let _tx = tx.into_output();
        // SAFETY: USART0 is owned by this driver
        unsafe {
            let usart = &*USART0::ptr();
            usart.baud.write(|w| w.bits(baud_register(CPU_FREQ_HZ, UART_BAUD)));
            usart.ctrlb.write(|w| w.bits(RXEN | TXEN));
        }
        Self {
            tx: Tx { _private: () },
            rx: Rx { _private: () },
        }
    }

    pub fn split(self) -> (Tx, Rx) {
        (self.tx, self.rx)
    }
}

impl Write<u8> for Tx {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
        if status() & DREIF == 0 {
            return Err(nb::Error::WouldBlock);
        }
        // SAFETY: data register is empty and only this half writes it
        unsafe { (*USART0::ptr()).txdatal.write(|w| w.bits(word)) };
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        if status() & TXCIF == 0 {
            return Err(nb::Error::WouldBlock);
        }
        Ok(())
    }
}

impl Read<u8> for Rx {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        if status() & RXCIF == 0 {
            return Err(nb::Error::WouldBlock);
        }
        // SAFETY: reading RXDATAL clears RXCIF, only this half reads it
        Ok(unsafe { (*USART0::ptr()).rxdatal.read().bits() })
    }
}
