//! Seven-segment countdown, stopped by cutting the red wire on PA4

#![cfg_attr(target_arch = "avr", no_std, no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use atmega4809_dashboard::config::{COUNTDOWN_BLINK_MS, PIT_TICKS_PER_SECOND};
    use atmega4809_dashboard::drivers::SevenSegment;
    use atmega4809_dashboard::hal::gpio::{Input, Pin};
    use atmega4809_dashboard::hal::pac::PORTA;
    use atmega4809_dashboard::hal::{self, rtc, Board, BusyDelay};
    use atmega4809_dashboard::os::{IrqFlag, TickDivider};
    use atmega4809_dashboard::precursor::Countdown;
    use embedded_hal::blocking::delay::DelayMs;
    use panic_halt as _;

    type RedWire = Pin<PORTA, 4, Input>;

    static PIT_DIVIDER: TickDivider<PIT_TICKS_PER_SECOND> = TickDivider::new();
    static SECOND: IrqFlag = IrqFlag::new(false);
    static HALT: IrqFlag = IrqFlag::new(false);

    #[avr_device::interrupt(atmega4809)]
    fn RTC_PIT() {
        rtc::clear_pit();
        PIT_DIVIDER.tick();
        if PIT_DIVIDER.at_boundary() {
            SECOND.raise();
        }
    }

    #[avr_device::interrupt(atmega4809)]
    fn PORTA_PORT() {
        RedWire::clear_edge_flag();
        HALT.raise();
    }

    #[avr_device::entry]
    fn main() -> ! {
        #[allow(clippy::empty_loop)]
        let Some(board) = Board::take() else { loop {} };
        let pins = board.pins;

        let mut display = SevenSegment::new(pins.portc.into_bus(), pins.pf5.into_output())
            .unwrap_or_else(|never| match never {});
        let mut wire: RedWire = pins.pa4.into_pull_up_input();
        wire.sense_rising_edge();
        let mut delay = BusyDelay;
        let mut countdown = Countdown::new();

        rtc::start_pit();
        // SAFETY: flags and divider are initialised statics
        unsafe { avr_device::interrupt::enable() };

        loop {
            // A cut wire wins over a second that elapsed at the same time
            if HALT.take() {
                countdown.cut_wire();
            }
            if SECOND.take() {
                if let Some(symbol) = countdown.second() {
                    display.show(symbol);
                }
            }

            if countdown.is_blinking() {
                delay.delay_ms(COUNTDOWN_BLINK_MS);
                let visible = countdown.blink();
                display.set_enabled(visible).ok();
            } else {
                hal::sleep();
            }
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
