//! ATmega4809 peripheral access
//!
//! Thin register-level drivers implementing the embedded-hal traits the
//! portable drivers are written against. Registers the generated PAC does
//! not expose as plain fields (TCA0 in single-slope view, the 8-bit halves
//! of TCB compare) are reached through [`Reg8`]/[`Reg16`].

pub mod adc;
pub mod gpio;
pub mod pwm;
pub mod rtc;
pub mod timer;
pub mod uart;

pub use avr_device::atmega4809 as pac;

pub use adc::Adc0;
pub use gpio::{Pins, PortBus};
pub use pwm::{BacklightPwm, Servo};
pub use timer::{BusyDelay, KernelTimer};
pub use uart::Usart0;

/// Claimed board resources
pub struct Board {
    pub pins: Pins,
}

impl Board {
    /// Claim the board; `None` on every call after the first
    pub fn take() -> Option<Self> {
        pac::Peripherals::take().map(|_| Self { pins: Pins::new() })
    }
}

/// Idle until the next interrupt
pub fn sleep() {
    const SLEEP_ENABLE_IDLE: u8 = 0x01;
    // SAFETY: SLPCTRL is only touched here
    unsafe {
        (*pac::SLPCTRL::ptr()).ctrla.write(|w| w.bits(SLEEP_ENABLE_IDLE));
    }
    avr_device::asm::sleep();
}

/// 8-bit I/O register at a data-space address
#[derive(Copy, Clone)]
pub(crate) struct Reg8(usize);

impl Reg8 {
    pub const fn at(address: usize) -> Self {
        Self(address)
    }

    #[inline]
    pub fn read(self) -> u8 {
        // SAFETY: constructed only from datasheet I/O addresses
        unsafe { core::ptr::read_volatile(self.0 as *const u8) }
    }

    #[inline]
    pub fn write(self, value: u8) {
        // SAFETY: constructed only from datasheet I/O addresses
        unsafe { core::ptr::write_volatile(self.0 as *mut u8, value) }
    }

    #[inline]
    pub fn modify(self, f: impl FnOnce(u8) -> u8) {
        self.write(f(self.read()));
    }
}

/// 16-bit I/O register, accessed low byte first through the TEMP latch
#[derive(Copy, Clone)]
pub(crate) struct Reg16(usize);

impl Reg16 {
    pub const fn at(address: usize) -> Self {
        Self(address)
    }

    pub fn write(self, value: u16) {
        let [low, high] = value.to_le_bytes();
        critical_section::with(|_| {
            Reg8::at(self.0).write(low);
            Reg8::at(self.0 + 1).write(high);
        });
    }
}
