//! Whole-dashboard runs against the host doubles

use super::*;
use crate::config::{MANUFACTURER_TEXT, SCROLL_SPEED_CPS};
use crate::drivers::{Backlight, SerialConsole, SharedAdc};
use crate::logger::LogRing;
use crate::rtos::{Instant, Kernel, TaskBuilder, TaskPriority, TaskState};
use crate::testing::{fake_lcd, FakeAdc, FakeLcd, FakePin, FakePwm, FakeSerial, SensorValues};
use core::cell::RefCell;
use std::rc::Rc;

const LDR: u16 = 512;
const NTC: u16 = 300;
const POT: u16 = 500;

struct Bench {
    values: Rc<SensorValues>,
    adc: SharedAdc<FakeAdc>,
    backlight: RefCell<Backlight<FakePwm>>,
    lcd_queue: LcdQueue,
    log: LogRing,
    serial: FakeSerial,
    led: FakePin,
}

impl Bench {
    fn new() -> Self {
        let values = Rc::new(SensorValues::new(LDR, NTC, POT));
        Self {
            adc: SharedAdc::new(FakeAdc::new(values.clone())),
            values,
            backlight: RefCell::new(Backlight::new(FakePwm::default())),
            lcd_queue: LcdQueue::new(),
            log: LogRing::new(),
            serial: FakeSerial::default(),
            led: FakePin::default(),
        }
    }

    fn level(&self) -> u8 {
        self.backlight.borrow().level()
    }
}

/// Spawn the seven dashboard tasks and poll them once per millisecond
fn with_dashboard<F>(bench: &Bench, lcd: FakeLcd, until_ms: u32, mut each_ms: F)
where
    F: FnMut(u32, &Kernel<'_, TASK_COUNT>),
{
    let mut activity = Activity::new(&bench.adc, bench.led.clone(), ids::GATE);
    let mut regulator = Regulator::new(&bench.adc, &bench.backlight);
    let mut gate = Gate::new(ids::REGULATOR, &bench.backlight);
    let mut marshaller = Marshaller::new(&bench.lcd_queue, lcd);
    let mut scroller = Scroller::new(&bench.lcd_queue, MANUFACTURER_TEXT, SCROLL_SPEED_CPS);
    let mut adc_reporter = AdcReporter::new(&bench.adc, &bench.lcd_queue);
    let mut serial_reporter =
        SerialReporter::new(&bench.adc, SerialConsole::new(bench.serial.clone()), &bench.log);

    let mut kernel: Kernel<'_, TASK_COUNT> = Kernel::new();
    TaskBuilder::new(ids::ACTIVITY, &mut activity)
        .name("activity")
        .priority(TaskPriority::Critical)
        .spawn(&mut kernel)
        .unwrap();
    TaskBuilder::new(ids::REGULATOR, &mut regulator).name("bl_adjust").spawn(&mut kernel).unwrap();
    TaskBuilder::new(ids::GATE, &mut gate).name("bl_control").spawn(&mut kernel).unwrap();
    TaskBuilder::new(ids::MARSHALLER, &mut marshaller).name("lcd").spawn(&mut kernel).unwrap();
    TaskBuilder::new(ids::SCROLLER, &mut scroller).name("scroll").spawn(&mut kernel).unwrap();
    TaskBuilder::new(ids::ADC_REPORTER, &mut adc_reporter).name("adc_lcd").spawn(&mut kernel).unwrap();
    TaskBuilder::new(ids::SERIAL_REPORTER, &mut serial_reporter)
        .name("usart")
        .spawn(&mut kernel)
        .unwrap();

    for ms in 0..=until_ms {
        kernel.poll(Instant::from_millis(ms));
        each_ms(ms, &kernel);
    }
}

#[test]
fn backlight_goes_dark_after_ten_quiet_seconds() {
    let bench = Bench::new();
    let (lcd, screen) = fake_lcd();
    let mut upper_lines = Vec::new();

    with_dashboard(&bench, lcd, 12_000, |ms, kernel| {
        let parked = kernel.state(ids::REGULATOR) == Some(TaskState::Suspended);
        match ms {
            200..=10_199 => {
                assert!(!parked, "parked early at {} ms", ms);
                assert_eq!(bench.level(), (LDR / 4) as u8);
            }
            10_200.. => {
                assert!(parked, "still regulating at {} ms", ms);
                assert_eq!(bench.level(), 0);
            }
            _ => {}
        }

        if ms >= 10_200 {
            let line = screen.borrow().line(0);
            if upper_lines.last() != Some(&line) {
                upper_lines.push(line);
            }
        }
    });

    // Readings keep flowing to the LCD while the backlight is off
    assert_eq!(upper_lines, ["LDR value: 512  ", "NTC value: 300  ", "POT value: 500  "]);
}

#[test]
fn knob_turn_wakes_the_backlight() {
    let bench = Bench::new();
    let (lcd, _screen) = fake_lcd();
    let mut resumed_at = None;

    with_dashboard(&bench, lcd, 11_000, |ms, kernel| {
        let parked = kernel.state(ids::REGULATOR) == Some(TaskState::Suspended);
        if ms == 10_500 {
            assert!(parked);
            bench.values.pot.set(POT + 15);
        }
        if ms > 10_500 && !parked && resumed_at.is_none() {
            assert_eq!(bench.level(), (LDR / 4) as u8);
            resumed_at = Some(ms);
        }
        if resumed_at.is_some() {
            assert!(!parked, "parked again at {} ms", ms);
        }
    });

    // The next activity sample after the turn is at 10.6 s
    assert_eq!(resumed_at, Some(10_600));
    assert!(bench.led.is_high());
}

#[test]
fn shared_adc_keeps_channels_apart() {
    let bench = Bench::new();
    let (lcd, screen) = fake_lcd();
    let expected_lines = ["LDR value: 512  ", "NTC value: 300  ", "POT value: 500  "];
    let mut seen = Vec::new();

    with_dashboard(&bench, lcd, 10_000, |_, _| {
        let line = screen.borrow().line(0);
        if line.trim().is_empty() {
            return;
        }
        assert!(expected_lines.contains(&line.as_str()), "unexpected lcd line {:?}", line);
        if seen.last() != Some(&line) {
            seen.push(line);
        }
    });

    // A reading every 660 ms from 200 ms on
    assert_eq!(seen.len(), 15);
    assert!(bench.led.is_high());

    let report = "LDR value: 512\r\nNTC value: 300\r\nPOT value: 500\r\n\r\n";
    assert_eq!(bench.serial.sent_text(), report.repeat(10));
}
