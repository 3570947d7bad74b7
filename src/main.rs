//! LCD sensor dashboard
//!
//! Seven kernel tasks share the ADC, the LCD message queue and the
//! backlight. TCB0 provides the 1 ms kernel tick; the CPU idles between
//! ticks when no task is ready.

#![cfg_attr(target_arch = "avr", no_std, no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use atmega4809_dashboard::application::{
        ids, Activity, AdcReporter, Gate, LcdQueue, Marshaller, Regulator, Scroller, SerialReporter,
        TASK_COUNT,
    };
    use atmega4809_dashboard::config::{MANUFACTURER_TEXT, SCROLL_SPEED_CPS};
    use atmega4809_dashboard::drivers::{Backlight, Lcd, SerialConsole, SharedAdc};
    use atmega4809_dashboard::hal::{self, Adc0, BacklightPwm, Board, BusyDelay, KernelTimer, Usart0};
    use atmega4809_dashboard::rtos::{Kernel, TaskBuilder, TaskPriority};
    use atmega4809_dashboard::{logger, os};
    use core::cell::RefCell;
    use panic_halt as _;

    #[avr_device::interrupt(atmega4809)]
    fn TCB0_INT() {
        KernelTimer::clear_interrupt();
        os::SYSTEM_TICK.tick();
    }

    #[avr_device::entry]
    fn main() -> ! {
        #[allow(clippy::empty_loop)]
        let Some(board) = Board::take() else { loop {} };
        let pins = board.pins;

        // The LED is active low, keep it dark until the activity task decides
        let led = pins.pf5.into_output_high();

        logger::init();

        let adc = SharedAdc::new(Adc0::new(
            pins.pe0.into_analog_input(),
            pins.pe1.into_analog_input(),
            pins.pf4.into_analog_input(),
        ));
        let backlight = RefCell::new(Backlight::new(BacklightPwm::new(pins.pb5)));
        let lcd_queue = LcdQueue::new();
        let lcd = Lcd::new(
            pins.pb3.into_output(),
            pins.pb4.into_output(),
            pins.portd.into_bus(),
            BusyDelay,
        );
        let (tx, _rx) = Usart0::new(pins.pa0).split();

        let mut activity = Activity::new(&adc, led, ids::GATE);
        let mut regulator = Regulator::new(&adc, &backlight);
        let mut gate = Gate::new(ids::REGULATOR, &backlight);
        let mut marshaller = Marshaller::new(&lcd_queue, lcd);
        let mut scroller = Scroller::new(&lcd_queue, MANUFACTURER_TEXT, SCROLL_SPEED_CPS);
        let mut adc_reporter = AdcReporter::new(&adc, &lcd_queue);
        let mut serial_reporter =
            SerialReporter::new(&adc, SerialConsole::new(tx), &logger::LOG_RING);

        let mut kernel: Kernel<'_, TASK_COUNT> = Kernel::new();
        let spawned = [
            TaskBuilder::new(ids::ACTIVITY, &mut activity)
                .name("activity")
                .priority(TaskPriority::Critical)
                .spawn(&mut kernel),
            TaskBuilder::new(ids::REGULATOR, &mut regulator)
                .name("bl_adjust")
                .spawn(&mut kernel),
            TaskBuilder::new(ids::GATE, &mut gate)
                .name("bl_control")
                .spawn(&mut kernel),
            TaskBuilder::new(ids::MARSHALLER, &mut marshaller)
                .name("lcd")
                .spawn(&mut kernel),
            TaskBuilder::new(ids::SCROLLER, &mut scroller)
                .name("scroll")
                .spawn(&mut kernel),
            TaskBuilder::new(ids::ADC_REPORTER, &mut adc_reporter)
                .name("adc_lcd")
                .spawn(&mut kernel),
            TaskBuilder::new(ids::SERIAL_REPORTER, &mut serial_reporter)
                .name("usart")
                .spawn(&mut kernel),
        ];
        if spawned.iter().any(Result::is_err) {
            log::error!("task table misconfigured");
        }

        let _tick = KernelTimer::start();
        // SAFETY: all shared state is initialised
        unsafe { avr_device::interrupt::enable() };
        log::info!("dashboard started");

        kernel.run(os::now, hal::sleep)
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
