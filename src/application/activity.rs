//! Temperature alarm LED and knob activity detection

use crate::config::{ACTIVITY_PERIOD_MS, POT_DEADBAND, STARTUP_GUARD_MS};
use crate::drivers::{AdcConverter, Sensor, SharedAdc};
use crate::rtos::{Context, Task, TaskId, Wait};
use embedded_hal::digital::v2::OutputPin;

/// Compares NTC against the potentiometer and reports knob movement
///
/// The LED is active low: it is lit while the thermistor reads above the
/// knob setting. A knob change of at least [`POT_DEADBAND`] counts gives
/// the backlight gate one notification.
pub struct Activity<'r, A, L> {
    adc: &'r SharedAdc<A>,
    led: L,
    gate: TaskId,
    previous_pot: u16,
    started: bool,
}

impl<'r, A, L: OutputPin> Activity<'r, A, L> {
    pub fn new(adc: &'r SharedAdc<A>, led: L, gate: TaskId) -> Self {
        Self {
            adc,
            led,
            gate,
            previous_pot: 0,
            started: false,
        }
    }

    fn show_alarm(&mut self, ntc: u16, pot: u16) {
        let result = if ntc > pot {
            self.led.set_low()
        } else {
            self.led.set_high()
        };
        if result.is_err() {
            log::warn!("alarm led write failed");
        }
    }
}

impl<'a, 'r: 'a, A, L> Task<'a> for Activity<'r, A, L>
where
    A: AdcConverter + 'a,
    L: OutputPin,
{
    fn run(&mut self, cx: &mut Context<'_, 'a>) -> Wait<'a> {
        if !self.started {
            self.started = true;
            return Wait::millis(STARTUP_GUARD_MS);
        }

        // Both reads run in one step, so nothing can take the lock between them
        let reads = (self.adc.try_read(Sensor::Ntc), self.adc.try_read(Sensor::Pot));
        let (Ok(ntc), Ok(pot)) = reads else {
            return Wait::lock(self.adc);
        };

        self.show_alarm(ntc, pot);

        if pot.abs_diff(self.previous_pot) >= POT_DEADBAND {
            log::debug!("knob moved to {}", pot);
            cx.notify_give(self.gate);
            self.previous_pot = pot;
        }

        Wait::millis(ACTIVITY_PERIOD_MS)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::rtos::{Instant, Kernel, TaskPriority};
    use crate::testing::{FakeAdc, FakePin, SensorValues};
    use std::rc::Rc;

    struct Harness {
        values: Rc<SensorValues>,
        adc: SharedAdc<FakeAdc>,
        led: FakePin,
    }

    fn harness(ntc: u16, pot: u16) -> Harness {
        let values = Rc::new(SensorValues::new(0, ntc, pot));
        Harness {
            adc: SharedAdc::new(FakeAdc::new(values.clone())),
            values,
            led: FakePin::default(),
        }
    }

    #[test]
    fn led_is_lit_while_ntc_exceeds_pot() {
        let h = harness(600, 500);
        let mut activity = Activity::new(&h.adc, h.led.clone(), TaskId(1));
        let mut kernel: Kernel<'_, 2> = Kernel::new();
        kernel.spawn(TaskId(0), "activity", TaskPriority::Critical, &mut activity).unwrap();

        kernel.poll(Instant::from_millis(0));
        kernel.poll(Instant::from_millis(200));
        assert!(!h.led.is_high());

        h.values.ntc.set(400);
        kernel.poll(Instant::from_millis(300));
        assert!(h.led.is_high());
    }

    /// Occupies the gate slot without consuming notifications
    struct Sleeper;

    impl<'a> Task<'a> for Sleeper {
        fn run(&mut self, _cx: &mut Context<'_, 'a>) -> Wait<'a> {
            Wait::millis(u32::MAX / 2)
        }
    }

    #[test]
    fn knob_deadband() {
        let h = harness(0, 100);
        let mut activity = Activity::new(&h.adc, h.led.clone(), TaskId(1));
        let mut sleeper = Sleeper;
        let mut kernel: Kernel<'_, 2> = Kernel::new();
        kernel.spawn(TaskId(0), "activity", TaskPriority::Critical, &mut activity).unwrap();
        kernel.spawn(TaskId(1), "gate", TaskPriority::Low, &mut sleeper).unwrap();

        kernel.poll(Instant::from_millis(0));
        // First sample moves the knob from 0 to 100
        kernel.poll(Instant::from_millis(200));
        assert_eq!(kernel.pending_notifications(TaskId(1)), Some(1));

        let steps = [(300, 109, 1), (400, 110, 2), (500, 101, 2), (600, 100, 3)];
        for (at, pot, expected) in steps {
            h.values.pot.set(pot);
            kernel.poll(Instant::from_millis(at));
            assert_eq!(kernel.pending_notifications(TaskId(1)), Some(expected), "at {} ms", at);
        }
    }
}
