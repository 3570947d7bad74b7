//! Backlight regulation and the inactivity gate
//!
//! The regulator tracks ambient light while the user is around. The gate
//! parks it after 10 s without knob activity and blanks the backlight.
//! Only one of them writes the PWM at a time: the gate suspends the
//! regulator before touching the duty.

use crate::config::{BACKLIGHT_PERIOD_MS, INACTIVITY_TIMEOUT_MS, STARTUP_GUARD_MS};
use crate::drivers::backlight::{level_from_sample, Backlight};
use crate::drivers::{AdcConverter, Sensor, SharedAdc};
use crate::rtos::{Context, Task, TaskId, Wait};
use core::cell::RefCell;
use embedded_hal::PwmPin;

pub struct Regulator<'r, A, P> {
    adc: &'r SharedAdc<A>,
    backlight: &'r RefCell<Backlight<P>>,
    started: bool,
}

impl<'r, A, P> Regulator<'r, A, P> {
    pub fn new(adc: &'r SharedAdc<A>, backlight: &'r RefCell<Backlight<P>>) -> Self {
        Self {
            adc,
            backlight,
            started: false,
        }
    }
}

impl<'a, 'r: 'a, A, P> Task<'a> for Regulator<'r, A, P>
where
    A: AdcConverter + 'a,
    P: PwmPin<Duty = u8>,
{
    fn run(&mut self, _cx: &mut Context<'_, 'a>) -> Wait<'a> {
        if !self.started {
            self.started = true;
            return Wait::millis(STARTUP_GUARD_MS);
        }

        match self.adc.try_read(Sensor::Ldr) {
            Ok(sample) => {
                self.backlight.borrow_mut().set_level(level_from_sample(sample));
                Wait::millis(BACKLIGHT_PERIOD_MS)
            }
            Err(_) => Wait::lock(self.adc),
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum BacklightMode {
    /// Regulator running, backlight follows ambient light
    Active,
    /// Regulator parked, backlight off
    Idle,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum GatePhase {
    Startup,
    Listen,
    Evaluate,
}

pub struct Gate<'r, P> {
    regulator: TaskId,
    backlight: &'r RefCell<Backlight<P>>,
    mode: BacklightMode,
    phase: GatePhase,
}

impl<'r, P: PwmPin<Duty = u8>> Gate<'r, P> {
    pub fn new(regulator: TaskId, backlight: &'r RefCell<Backlight<P>>) -> Self {
        Self {
            regulator,
            backlight,
            mode: BacklightMode::Active,
            phase: GatePhase::Startup,
        }
    }

    #[inline]
    pub fn mode(&self) -> BacklightMode {
        self.mode
    }

    fn activate(&mut self, cx: &mut Context<'_, '_>) {
        cx.resume(self.regulator);
        if self.mode != BacklightMode::Active {
            log::info!("backlight active");
        }
        self.mode = BacklightMode::Active;
    }

    fn idle(&mut self, cx: &mut Context<'_, '_>) {
        // Park the regulator first so it cannot overwrite the zero duty
        cx.suspend(self.regulator);
        self.backlight.borrow_mut().off();
        if self.mode != BacklightMode::Idle {
            log::info!("backlight idle");
        }
        self.mode = BacklightMode::Idle;
    }
}

impl<'a, 'r: 'a, P: PwmPin<Duty = u8>> Task<'a> for Gate<'r, P> {
    fn run(&mut self, cx: &mut Context<'_, 'a>) -> Wait<'a> {
        match self.phase {
            GatePhase::Startup => {
                self.phase = GatePhase::Listen;
                return Wait::millis(STARTUP_GUARD_MS);
            }
            GatePhase::Listen => self.phase = GatePhase::Evaluate,
            GatePhase::Evaluate => {
                if cx.take_notification() > 0 {
                    self.activate(cx);
                } else {
                    self.idle(cx);
                }
            }
        }
        Wait::notification(INACTIVITY_TIMEOUT_MS)
    }
}
