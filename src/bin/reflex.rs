//! Light-triggered servo: presses a key whenever the LDR reads above the
//! threshold set on the potentiometer

#![cfg_attr(target_arch = "avr", no_std, no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use atmega4809_dashboard::config::{RTC_SERVO_PERIOD, SERVO_DUTY_NEUTRAL, SERVO_PWM_PERIOD};
    use atmega4809_dashboard::drivers::{AdcConverter, Sensor, SevenSegment, SharedAdc};
    use atmega4809_dashboard::hal::{rtc, Adc0, Board, Servo};
    use atmega4809_dashboard::os::IrqFlag;
    use atmega4809_dashboard::precursor::reflex::threshold_symbol;
    use atmega4809_dashboard::precursor::Reflex;
    use panic_halt as _;

    /// Set when the current 100 ms servo window has elapsed
    static SERVO_READY: IrqFlag = IrqFlag::new(true);

    #[avr_device::interrupt(atmega4809)]
    fn RTC_CNT() {
        rtc::clear_overflow();
        SERVO_READY.raise();
    }

    fn read<A: AdcConverter>(adc: &SharedAdc<A>, sensor: Sensor) -> u16 {
        nb::block!(adc.try_read(sensor)).unwrap_or_else(|never| match never {})
    }

    #[avr_device::entry]
    fn main() -> ! {
        #[allow(clippy::empty_loop)]
        let Some(board) = Board::take() else { loop {} };
        let pins = board.pins;

        let mut display = SevenSegment::new(pins.portc.into_bus(), pins.pf5.into_output())
            .unwrap_or_else(|never| match never {});
        let adc = SharedAdc::new(Adc0::new(
            pins.pe0.into_analog_input(),
            pins.pe1.into_analog_input(),
            pins.pf4.into_analog_input(),
        ));
        let mut servo = Servo::new(pins.pb2, SERVO_PWM_PERIOD, SERVO_DUTY_NEUTRAL);
        let mut reflex = Reflex::new();

        rtc::start_overflow(RTC_SERVO_PERIOD);
        // SAFETY: the ready flag is an initialised static
        unsafe { avr_device::interrupt::enable() };

        loop {
            let threshold = read(&adc, Sensor::Pot);
            display.show(threshold_symbol(threshold));

            if !SERVO_READY.is_raised() {
                continue;
            }
            let ldr = read(&adc, Sensor::Ldr);
            if let Some(position) = reflex.update(ldr, threshold) {
                servo.set_duty(position.duty());
                rtc::restart_count();
                SERVO_READY.clear();
            }
        }
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
