use super::pac::{PORTA, PORTB, PORTC, PORTD, PORTE, PORTF};
use super::Reg8;
use crate::drivers::ParallelBus;
use core::convert::Infallible;
use core::marker::PhantomData;
use embedded_hal::digital::v2::{InputPin, OutputPin, ToggleableOutputPin};

pub struct Input;
pub struct Output;
/// Digital input buffer disabled, pin used by the ADC
pub struct Analog;

mod pinctrl {
    pub const ISC_MASK: u8 = 0x07;
    pub const ISC_RISING: u8 = 0x02;
    pub const ISC_INPUT_DISABLE: u8 = 0x04;
    pub const PULLUPEN: u8 = 0x08;
}

/// Offset of PIN0CTRL inside a PORT block
const PINCTRL_OFFSET: usize = 0x10;

pub struct Pin<PORT, const N: u8, MODE> {
    _port: PhantomData<PORT>,
    _mode: PhantomData<MODE>,
}

impl<PORT, const N: u8, MODE> Pin<PORT, N, MODE> {
    const fn new() -> Self {
        Self {
            _port: PhantomData,
            _mode: PhantomData,
        }
    }
}

/// A whole port, before it is turned into a bus
pub struct Port<PORT> {
    _port: PhantomData<PORT>,
}

/// All eight pins of a port driven as one byte
pub struct PortBus<PORT> {
    _port: PhantomData<PORT>,
}

macro_rules! impl_port {
    ($PORT:ident) => {
        impl<const N: u8, MODE> Pin<$PORT, N, MODE> {
            fn pinctrl() -> Reg8 {
                Reg8::at($PORT::ptr() as usize + PINCTRL_OFFSET + N as usize)
            }

            pub fn into_output(self) -> Pin<$PORT, N, Output> {
                // SAFETY: DIRSET only affects the bits written as one
                unsafe { (*$PORT::ptr()).dirset.write(|w| w.bits(1 << N)) };
                Pin::new()
            }

            /// Drive the pin high before enabling the output driver
            pub fn into_output_high(self) -> Pin<$PORT, N, Output> {
                // SAFETY: OUTSET and DIRSET only affect the bits written as one
                unsafe {
                    (*$PORT::ptr()).outset.write(|w| w.bits(1 << N));
                    (*$PORT::ptr()).dirset.write(|w| w.bits(1 << N));
                }
                Pin::new()
            }

            pub fn into_pull_up_input(self) -> Pin<$PORT, N, Input> {
                // SAFETY: DIRCLR only affects the bits written as one
                unsafe { (*$PORT::ptr()).dirclr.write(|w| w.bits(1 << N)) };
                Self::pinctrl().modify(|ctrl| ctrl | pinctrl::PULLUPEN);
                Pin::new()
            }

            pub fn into_analog_input(self) -> Pin<$PORT, N, Analog> {
                // SAFETY: DIRCLR only affects the bits written as one
                unsafe { (*$PORT::ptr()).dirclr.write(|w| w.bits(1 << N)) };
                Self::pinctrl()
                    .modify(|ctrl| (ctrl & !pinctrl::ISC_MASK) | pinctrl::ISC_INPUT_DISABLE);
                Pin::new()
            }
        }

        impl<const N: u8> Pin<$PORT, N, Input> {
            /// Raise the port interrupt on rising edges of this pin
            pub fn sense_rising_edge(&mut self) {
                Self::pinctrl().modify(|ctrl| (ctrl & !pinctrl::ISC_MASK) | pinctrl::ISC_RISING);
            }

            /// Acknowledge this pin's edge flag, for use in the port ISR
            pub fn clear_edge_flag() {
                // SAFETY: INTFLAGS bits are cleared by writing one
                unsafe { (*$PORT::ptr()).intflags.write(|w| w.bits(1 << N)) };
            }
        }

        impl<const N: u8> OutputPin for Pin<$PORT, N, Output> {
            type Error = Infallible;

            fn set_high(&mut self) -> Result<(), Infallible> {
                // SAFETY: OUTSET only affects the bits written as one
                unsafe { (*$PORT::ptr()).outset.write(|w| w.bits(1 << N)) };
                Ok(())
            }

            fn set_low(&mut self) -> Result<(), Infallible> {
                // SAFETY: OUTCLR only affects the bits written as one
                unsafe { (*$PORT::ptr()).outclr.write(|w| w.bits(1 << N)) };
                Ok(())
            }
        }

        impl<const N: u8> ToggleableOutputPin for Pin<$PORT, N, Output> {
            type Error = Infallible;

            fn toggle(&mut self) -> Result<(), Infallible> {
                // SAFETY: OUTTGL only affects the bits written as one
                unsafe { (*$PORT::ptr()).outtgl.write(|w| w.bits(1 << N)) };
                Ok(())
            }
        }

        impl<const N: u8> InputPin for Pin<$PORT, N, Input> {
            type Error = Infallible;

            fn is_high(&self) -> Result<bool, Infallible> {
                // SAFETY: read-only access to the input register
                let levels = unsafe { (*$PORT::ptr()).in_.read().bits() };
                Ok(levels & (1 << N) != 0)
            }

            fn is_low(&self) -> Result<bool, Infallible> {
                self.is_high().map(|high| !high)
            }
        }

        impl Port<$PORT> {
            pub fn into_bus(self) -> PortBus<$PORT> {
                // SAFETY: the whole port belongs to this bus
                unsafe { (*$PORT::ptr()).dirset.write(|w| w.bits(0xFF)) };
                PortBus { _port: PhantomData }
            }
        }

        impl ParallelBus for PortBus<$PORT> {
            fn write(&mut self, value: u8) {
                // SAFETY: the whole port belongs to this bus
                unsafe { (*$PORT::ptr()).out.write(|w| w.bits(value)) };
            }
        }
    };
}

impl_port!(PORTA);
impl_port!(PORTB);
impl_port!(PORTC);
impl_port!(PORTD);
impl_port!(PORTE);
impl_port!(PORTF);

/// Board pins used by the firmware, all inputs after reset
pub struct Pins {
    /// USART0 TXD
    pub pa0: Pin<PORTA, 0, Input>,
    /// Button or red wire
    pub pa4: Pin<PORTA, 4, Input>,
    /// Servo PWM (TCA0 WO2)
    pub pb2: Pin<PORTB, 2, Input>,
    /// LCD E
    pub pb3: Pin<PORTB, 3, Input>,
    /// LCD RS
    pub pb4: Pin<PORTB, 4, Input>,
    /// Backlight PWM (TCB3 WO)
    pub pb5: Pin<PORTB, 5, Input>,
    /// LDR
    pub pe0: Pin<PORTE, 0, Input>,
    /// NTC
    pub pe1: Pin<PORTE, 1, Input>,
    /// Potentiometer
    pub pf4: Pin<PORTF, 4, Input>,
    /// LED and seven-segment enable transistor
    pub pf5: Pin<PORTF, 5, Input>,
    /// Seven-segment segments
    pub portc: Port<PORTC>,
    /// LCD data
    pub portd: Port<PORTD>,
}

impl Pins {
    pub(super) const fn new() -> Self {
        Self {
            pa0: Pin::new(),
            pa4: Pin::new(),
            pb2: Pin::new(),
            pb3: Pin::new(),
            pb4: Pin::new(),
            pb5: Pin::new(),
            pe0: Pin::new(),
            pe1: Pin::new(),
            pf4: Pin::new(),
            pf5: Pin::new(),
            portc: Port { _port: PhantomData },
            portd: Port { _port: PhantomData },
        }
    }
}
