//! Kernel tick timer and busy-wait delays

use super::pac::TCB0;
use crate::config::{CPU_FREQ_HZ, TICK_HZ};
use embedded_hal::blocking::delay::{DelayMs, DelayUs};

const ENABLE: u8 = 0x01;
const CNTMODE_INT: u8 = 0x00;
const CAPT: u8 = 0x01;

/// TCB0 periodic interrupt driving the kernel tick
pub struct KernelTimer {
    _private: (),
}

impl KernelTimer {
    /// Compare value for one tick with CLK_PER undivided
    pub const COMPARE: u16 = (CPU_FREQ_HZ / TICK_HZ - 1) as u16;

    pub fn start() -> Self {
        // SAFETY: TCB0 is owned by the kernel timer
        unsafe {
            let tcb = &*TCB0::ptr();
            tcb.ctrlb.write(|w| w.bits(CNTMODE_INT));
            tcb.ccmp.write(|w| w.bits(Self::COMPARE));
            tcb.intctrl.write(|w| w.bits(CAPT));
            tcb.ctrla.write(|w| w.bits(ENABLE));
        }
        Self { _private: () }
    }

    /// Acknowledge the tick, called from `TCB0_INT`
    #[inline]
    pub fn clear_interrupt() {
        // SAFETY: INTFLAGS bits are cleared by writing one
        unsafe { (*TCB0::ptr()).intflags.write(|w| w.bits(CAPT)) };
    }
}

/// Spin delay calibrated to the main clock
#[derive(Clone, Copy, Default)]
pub struct BusyDelay;

impl BusyDelay {
    /// Cycles spent in one loop iteration
    const CYCLES_PER_LOOP: u32 = 4;

    #[inline(never)]
    fn spin(cycles: u32) {
        for _ in 0..cycles / Self::CYCLES_PER_LOOP + 1 {
            avr_device::asm::nop();
        }
    }
}

impl DelayUs<u16> for BusyDelay {
    fn delay_us(&mut self, us: u16) {
        Self::spin(us as u32 * (CPU_FREQ_HZ / 1_000_000));
    }
}

impl DelayMs<u16> for BusyDelay {
    fn delay_ms(&mut self, ms: u16) {
        for _ in 0..ms {
            Self::spin(CPU_FREQ_HZ / 1000);
        }
    }
}
