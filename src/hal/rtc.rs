//! Real-time counter on the internal 32.768 kHz oscillator

use super::pac::RTC;

const RTCEN: u8 = 0x01;
const PRESCALER_DIV64: u8 = 0x06 << 3;
const CLKSEL_INT32K: u8 = 0x00;
const OVF: u8 = 0x01;
const PITEN: u8 = 0x01;
const PERIOD_CYC4096: u8 = 0x0B << 3;
const PI: u8 = 0x01;

fn rtc() -> &'static super::pac::rtc::RegisterBlock {
    // SAFETY: the RTC is configured once at startup and then only
    // touched through flag writes
    unsafe { &*RTC::ptr() }
}

fn wait_synchronized() {
    while rtc().status.read().bits() != 0 {}
    while rtc().pitstatus.read().bits() != 0 {}
}

/// Periodic interrupt every 4096 cycles of 32.768 kHz (125 ms)
pub fn start_pit() {
    wait_synchronized();
    // SAFETY: RTC configuration at startup
    unsafe {
        rtc().clksel.write(|w| w.bits(CLKSEL_INT32K));
        rtc().pitintctrl.write(|w| w.bits(PI));
        rtc().pitctrla.write(|w| w.bits(PERIOD_CYC4096 | PITEN));
    }
}

/// Overflow interrupt every `period + 1` ticks of 32.768 kHz / 64
pub fn start_overflow(period: u16) {
    wait_synchronized();
    // SAFETY: RTC configuration at startup
    unsafe {
        rtc().per.write(|w| w.bits(period));
        rtc().clksel.write(|w| w.bits(CLKSEL_INT32K));
        rtc().ctrla.write(|w| w.bits(PRESCALER_DIV64 | RTCEN));
        rtc().intctrl.write(|w| w.bits(OVF));
    }
}

/// Restart the overflow window from zero
pub fn restart_count() {
    while rtc().status.read().bits() != 0 {}
    // SAFETY: CNT accepts any value
    unsafe { rtc().cnt.write(|w| w.bits(0)) };
}

/// Acknowledge the periodic interrupt, called from `RTC_PIT`
#[inline]
pub fn clear_pit() {
    // SAFETY: flags are cleared by writing one
    unsafe { rtc().pitintflags.write(|w| w.bits(PI)) };
}

/// Acknowledge the overflow interrupt, called from `RTC_CNT`
#[inline]
pub fn clear_overflow() {
    // SAFETY: flags are cleared by writing one
    unsafe { rtc().intflags.write(|w| w.bits(OVF)) };
}
