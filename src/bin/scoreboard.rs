//! Serial scoreboard: digits typed on the terminal appear on the display

#![cfg_attr(target_arch = "avr", no_std, no_main)]
#![cfg_attr(target_arch = "avr", feature(abi_avr_interrupt))]

#[cfg(target_arch = "avr")]
mod firmware {
    use atmega4809_dashboard::drivers::{SerialConsole, SevenSegment};
    use atmega4809_dashboard::hal::{self, Board, KernelTimer, Usart0};
    use atmega4809_dashboard::os;
    use atmega4809_dashboard::precursor::scoreboard::DigitQueue;
    use atmega4809_dashboard::precursor::{Display, Receiver, Sender};
    use atmega4809_dashboard::rtos::{Kernel, TaskBuilder, TaskId};
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

        let display = SevenSegment::new(pins.portc.into_bus(), pins.pf5.into_output())
            .unwrap_or_else(|never| match never {});
        let (tx, rx) = Usart0::new(pins.pa0).split();
        let to_sender = DigitQueue::new();
        let to_display = DigitQueue::new();

        let mut receiver = Receiver::new(rx, &to_sender, &to_display);
        let mut sender = Sender::new(SerialConsole::new(tx), &to_sender);
        let mut shown = Display::new(display, &to_display);

        let mut kernel: Kernel<'_, 3> = Kernel::new();
        let spawned = [
            TaskBuilder::new(TaskId(0), &mut receiver).name("usart_rx").spawn(&mut kernel),
            TaskBuilder::new(TaskId(1), &mut sender).name("usart_tx").spawn(&mut kernel),
            TaskBuilder::new(TaskId(2), &mut shown).name("display").spawn(&mut kernel),
        ];
        if spawned.iter().any(Result::is_err) {
            loop {}
        }

        let _tick = KernelTimer::start();
        // SAFETY: all shared state is initialised
        unsafe { avr_device::interrupt::enable() };

        kernel.run(os::now, hal::sleep)
    }
}

#[cfg(not(target_arch = "avr"))]
fn main() {}
