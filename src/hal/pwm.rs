//! Backlight and servo PWM channels

use super::gpio::{Input, Output, Pin};
use super::pac::{PORTB, PORTMUX, TCB3};
use super::{Reg16, Reg8};
use embedded_hal::PwmPin;

const TCB_ENABLE: u8 = 0x01;
const TCB_CNTMODE_PWM8: u8 = 0x07;
const TCB_CCMPEN: u8 = 0x10;
/// Period 0xFF in CCMPL, zero duty in CCMPH
const TCB_CCMP_INITIAL: u16 = 0x00FF;
const TCB3_CCMPH: usize = 0x0ABD;

/// TCB3 8-bit PWM on PB5
pub struct BacklightPwm {
    _pin: Pin<PORTB, 5, Output>,
}

impl BacklightPwm {
    pub fn new(pin: Pin<PORTB, 5, Input>) -> Self {
        let pin = pin.into_output();
        // SAFETY: TCB3 is owned by this channel
        unsafe {
            let tcb = &*TCB3::ptr();
            tcb.ccmp.write(|w| w.bits(TCB_CCMP_INITIAL));
            tcb.ctrlb.write(|w| w.bits(TCB_CNTMODE_PWM8 | TCB_CCMPEN));
        }
        Self { _pin: pin }
    }
}

impl PwmPin for BacklightPwm {
    type Duty = u8;

    fn disable(&mut self) {
        // SAFETY: TCB3 is owned by this channel
        unsafe { (*TCB3::ptr()).ctrla.write(|w| w.bits(0)) };
    }

    fn enable(&mut self) {
        // CLK_PER undivided
        // SAFETY: TCB3 is owned by this channel
        unsafe { (*TCB3::ptr()).ctrla.write(|w| w.bits(TCB_ENABLE)) };
    }

    fn get_duty(&self) -> u8 {
        Reg8::at(TCB3_CCMPH).read()
    }

    fn get_max_duty(&self) -> u8 {
        u8::MAX
    }

    fn set_duty(&mut self, duty: u8) {
        // In 8-bit PWM mode the compare halves are independent registers
        Reg8::at(TCB3_CCMPH).write(duty);
    }
}

mod tca {
    pub const CTRLA: usize = 0x0A00;
    pub const CTRLB: usize = 0x0A01;
    pub const PERBUF: usize = 0x0A36;
    pub const CMP2BUF: usize = 0x0A3C;

    pub const ENABLE: u8 = 0x01;
    pub const CLKSEL_DIV16: u8 = 0x04 << 1;
    pub const WGMODE_SINGLESLOPE: u8 = 0x03;
    pub const CMP2EN: u8 = 0x40;
    pub const ROUTE_PORTB: u8 = 0x01;
}

/// Hobby servo on TCA0 compare channel 2, routed to PB2
pub struct Servo {
    duty: u16,
    _pin: Pin<PORTB, 2, Output>,
}

impl Servo {
    pub fn new(pin: Pin<PORTB, 2, Input>, period: u16, duty: u16) -> Self {
        let pin = pin.into_output();
        // SAFETY: TCA0 routing is only set here
        unsafe { (*PORTMUX::ptr()).tcaroutea.write(|w| w.bits(tca::ROUTE_PORTB)) };
        Reg8::at(tca::CTRLA).write(tca::CLKSEL_DIV16);
        Reg8::at(tca::CTRLB).write(tca::WGMODE_SINGLESLOPE);
        Reg16::at(tca::CMP2BUF).write(duty);
        Reg16::at(tca::PERBUF).write(period);
        Reg8::at(tca::CTRLB).modify(|ctrl| ctrl | tca::CMP2EN);
        Reg8::at(tca::CTRLA).modify(|ctrl| ctrl | tca::ENABLE);
        Self { duty, _pin: pin }
    }

    /// Buffered, takes effect at the next period
    pub fn set_duty(&mut self, duty: u16) {
        Reg16::at(tca::CMP2BUF).write(duty);
        self.duty = duty;
    }

    #[inline]
    pub fn duty(&self) -> u16 {
        self.duty
    }
}
