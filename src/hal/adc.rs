use super::gpio::{Analog, Pin};
use super::pac::{ADC0, PORTE, PORTF, VREF};
use crate::drivers::{AdcConverter, AdcInput, Reference};

const ENABLE: u8 = 0x01;
const PRESC_DIV16: u8 = 0x03;
const REFSEL_INTREF: u8 = 0x00 << 4;
const REFSEL_VDDREF: u8 = 0x01 << 4;
const ADC0REFSEL_2V5: u8 = 0x02;
const STCONV: u8 = 0x01;
const RESRDY: u8 = 0x01;

/// ADC0 in 10-bit single conversion mode
pub struct Adc0 {
    _ldr: Pin<PORTE, 0, Analog>,
    _ntc: Pin<PORTE, 1, Analog>,
    _pot: Pin<PORTF, 4, Analog>,
}

impl Adc0 {
    pub fn new(
        ldr: Pin<PORTE, 0, Analog>,
        ntc: Pin<PORTE, 1, Analog>,
        pot: Pin<PORTF, 4, Analog>,
    ) -> Self {
        // SAFETY: VREF and ADC0 are owned by this driver
        unsafe {
            (*VREF::ptr()).ctrla.write(|w| w.bits(ADC0REFSEL_2V5));
            (*ADC0::ptr()).ctrlc.write(|w| w.bits(PRESC_DIV16));
            (*ADC0::ptr()).ctrla.write(|w| w.bits(ENABLE));
        }
        Self {
            _ldr: ldr,
            _ntc: ntc,
            _pot: pot,
        }
    }
}

impl AdcConverter for Adc0 {
    fn select(&mut self, input: AdcInput) {
        let reference = match input.reference {
            Reference::Internal => REFSEL_INTREF,
            Reference::Vdd => REFSEL_VDDREF,
        };
        // SAFETY: ADC0 is owned by this driver
        unsafe {
            (*ADC0::ptr()).muxpos.write(|w| w.bits(input.muxpos));
            (*ADC0::ptr()).ctrlc.write(|w| w.bits(PRESC_DIV16 | reference));
        }
    }

    fn convert(&mut self) -> u16 {
        // SAFETY: ADC0 is owned by this driver
        unsafe {
            let adc = &*ADC0::ptr();
            adc.command.write(|w| w.bits(STCONV));
            while adc.intflags.read().bits() & RESRDY == 0 {}
            // Reading RES clears RESRDY
            adc.res.read().bits()
        }
    }
}
