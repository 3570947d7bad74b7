//! Shared ADC access
//!
//! One converter serves several tasks. The whole conversion sequence
//! (mux select, reference select, two conversions, result read) runs while
//! the lock is held, so a reader only ever sees its own channel.

use crate::rtos::{Interest, Mutex, Waitable};
use core::convert::Infallible;

/// Analog sensors wired to the board
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Sensor {
    /// Light-dependent resistor, AIN8 (PE0)
    Ldr,
    /// Thermistor, AIN9 (PE1)
    Ntc,
    /// Potentiometer, AIN14 (PF4)
    Pot,
}

impl Sensor {
    pub const ALL: [Sensor; 3] = [Sensor::Ldr, Sensor::Ntc, Sensor::Pot];

    pub const fn label(self) -> &'static str {
        match self {
            Sensor::Ldr => "LDR",
            Sensor::Ntc => "NTC",
            Sensor::Pot => "POT",
        }
    }

    pub const fn input(self) -> AdcInput {
        match self {
            Sensor::Ldr => AdcInput { muxpos: 8, reference: Reference::Internal },
            Sensor::Ntc => AdcInput { muxpos: 9, reference: Reference::Internal },
            Sensor::Pot => AdcInput { muxpos: 14, reference: Reference::Vdd },
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Reference {
    /// 2.5 V internal reference
    Internal,
    Vdd,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct AdcInput {
    pub muxpos: u8,
    pub reference: Reference,
}

/// Raw converter access implemented by the hardware layer
pub trait AdcConverter {
    fn select(&mut self, input: AdcInput);

    /// Start one conversion and spin until its result is ready
    fn convert(&mut self) -> u16;
}

pub struct SharedAdc<A> {
    converter: Mutex<A>,
}

impl<A: AdcConverter> SharedAdc<A> {
    pub const fn new(converter: A) -> Self {
        Self {
            converter: Mutex::new(converter),
        }
    }

    /// Read a 10-bit sample, `WouldBlock` while another task holds the converter
    pub fn try_read(&self, sensor: Sensor) -> nb::Result<u16, Infallible> {
        let mut adc = self.converter.try_lock().ok_or(nb::Error::WouldBlock)?;
        adc.select(sensor.input());

        // The first result after a mux/reference change is not settled
        let _ = adc.convert();
        Ok(adc.convert() & 0x03FF)
    }
}

impl<A> Waitable for SharedAdc<A> {
    fn poll_ready(&self, interest: Interest) -> bool {
        self.converter.poll_ready(interest)
    }
}
