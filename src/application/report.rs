//! Periodic serial telemetry
//!
//! Once a second the three sensors are sampled into a text report. The
//! report and then any pending log output go out one byte per step, so a
//! higher priority task never waits longer than one character time. Log
//! bytes lost to a full ring since the previous report are counted in a
//! `LOG dropped: N` line ahead of the closing blank line.

use crate::config::{SERIAL_REPORT_MS, STARTUP_GUARD_MS};
use crate::drivers::{AdcConverter, SerialConsole, Sensor, SharedAdc};
use crate::logger::LogRing;
use crate::rtos::{Context, Task, Wait};
use embedded_hal::serial::Write;
use heapless::String;

/// Room for three `XXX value: 1023\r\n` lines, the drop count and the closing blank line
pub const REPORT_CAPACITY: usize = 80;

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Phase {
    Startup,
    Sample(usize),
    Transmit(usize),
    Drain,
}

pub struct SerialReporter<'r, A, S> {
    adc: &'r SharedAdc<A>,
    console: SerialConsole<S>,
    log: &'r LogRing,
    report: String<REPORT_CAPACITY>,
    dropped_seen: u16,
    phase: Phase,
}

impl<'r, A, S> SerialReporter<'r, A, S> {
    pub fn new(adc: &'r SharedAdc<A>, console: SerialConsole<S>, log: &'r LogRing) -> Self {
        Self {
            adc,
            console,
            log,
            report: String::new(),
            dropped_seen: 0,
            phase: Phase::Startup,
        }
    }
}

/// Append one report line for `sensor`
pub fn append_reading<const N: usize>(report: &mut String<N>, sensor: Sensor, value: u16) {
    // A full report is cut short rather than failing
    ufmt::uwrite!(report, "{} value: {}\r\n", sensor.label(), value).ok();
}

impl<'r, A, S: Write<u8>> SerialReporter<'r, A, S> {
    fn append_dropped(&mut self) {
        let dropped = self.log.dropped();
        if dropped != self.dropped_seen {
            let lost = dropped.wrapping_sub(self.dropped_seen);
            ufmt::uwrite!(self.report, "LOG dropped: {}\r\n", lost).ok();
            self.dropped_seen = dropped;
        }
    }

    fn send(&mut self, byte: u8) {
        if self.console.write_byte(byte).is_err() {
            log::warn!("serial write failed");
        }
    }
}

impl<'a, 'r: 'a, A, S> Task<'a> for SerialReporter<'r, A, S>
where
    A: AdcConverter + 'a,
    S: Write<u8>,
{
    fn run(&mut self, _cx: &mut Context<'_, 'a>) -> Wait<'a> {
        match self.phase {
            Phase::Startup => {
                self.phase = Phase::Sample(0);
                Wait::millis(STARTUP_GUARD_MS)
            }
            Phase::Sample(index) => {
                let Some(&sensor) = Sensor::ALL.get(index) else {
                    self.append_dropped();
                    self.report.push_str("\r\n").ok();
                    self.phase = Phase::Transmit(0);
                    return Wait::Yield;
                };
                match self.adc.try_read(sensor) {
                    Ok(value) => {
                        append_reading(&mut self.report, sensor, value);
                        self.phase = Phase::Sample(index + 1);
                        Wait::Yield
                    }
                    Err(_) => Wait::lock(self.adc),
                }
            }
            Phase::Transmit(sent) => match self.report.as_bytes().get(sent) {
                Some(&byte) => {
                    self.send(byte);
                    self.phase = Phase::Transmit(sent + 1);
                    Wait::Yield
                }
                None => {
                    self.report.clear();
                    self.phase = Phase::Drain;
                    Wait::Yield
                }
            },
            Phase::Drain => match self.log.pop() {
                Some(byte) => {
                    self.send(byte);
                    Wait::Yield
                }
                None => {
                    self.phase = Phase::Sample(0);
                    Wait::millis(SERIAL_REPORT_MS)
                }
            },
        }
    }
}
