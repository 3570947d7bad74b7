//! LCD content: the marshaller owning the display and the tasks feeding it

use super::{LcdMessage, LcdQueue, Line};
use crate::config::{ADC_REPORT_CELL_MS, LCD_COLUMNS, LCD_POWER_UP_MS, STARTUP_GUARD_MS};
use crate::drivers::lcd::{Lcd, ParallelBus};
use crate::drivers::{AdcConverter, Sensor, SharedAdc};
use crate::rtos::{Context, Task, Wait};
use embedded_hal::blocking::delay::DelayUs;
use embedded_hal::digital::v2::OutputPin;
use heapless::String;

/// Copy `text` into a full display line, filling the rest with spaces
pub fn pad_line(text: &str) -> [u8; LCD_COLUMNS] {
    let mut line = [b' '; LCD_COLUMNS];
    for (cell, byte) in line.iter_mut().zip(text.bytes().take_while(|&byte| byte != 0)) {
        *cell = byte;
    }
    line
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum MarshallerPhase {
    PowerUp,
    Init,
    Serve,
}

/// Sole owner of the LCD; writes queued messages as full 16-column lines
pub struct Marshaller<'q, E, RS, D, DL> {
    queue: &'q LcdQueue,
    lcd: Lcd<E, RS, D, DL>,
    phase: MarshallerPhase,
}

impl<'q, E, RS, D, DL> Marshaller<'q, E, RS, D, DL> {
    pub fn new(queue: &'q LcdQueue, lcd: Lcd<E, RS, D, DL>) -> Self {
        Self {
            queue,
            lcd,
            phase: MarshallerPhase::PowerUp,
        }
    }
}

impl<'a, 'q: 'a, E, RS, D, DL, PinError> Task<'a> for Marshaller<'q, E, RS, D, DL>
where
    E: OutputPin<Error = PinError>,
    RS: OutputPin<Error = PinError>,
    D: ParallelBus,
    DL: DelayUs<u16>,
{
    fn run(&mut self, _cx: &mut Context<'_, 'a>) -> Wait<'a> {
        match self.phase {
            MarshallerPhase::PowerUp => {
                self.phase = MarshallerPhase::Init;
                Wait::millis(LCD_POWER_UP_MS)
            }
            MarshallerPhase::Init => {
                if self.lcd.init().is_err() {
                    log::warn!("lcd init failed");
                }
                self.phase = MarshallerPhase::Serve;
                Wait::millis(STARTUP_GUARD_MS)
            }
            MarshallerPhase::Serve => match self.queue.try_receive() {
                Some(message) => {
                    let line = pad_line(&message.text);
                    let written = self
                        .lcd
                        .set_cursor(message.line as u8, 0)
                        .and_then(|()| self.lcd.write_bytes(&line));
                    if written.is_err() {
                        log::warn!("lcd write failed");
                    }
                    Wait::Yield
                }
                None => Wait::receive(self.queue),
            },
        }
    }
}

/// Reflecting window over a banner longer than the display
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub struct Scroll {
    text: &'static str,
    index: usize,
    forward: bool,
}

impl Scroll {
    /// `None` when the text fits the display and needs no scrolling
    pub fn new(text: &'static str) -> Option<Self> {
        (text.len() > LCD_COLUMNS).then_some(Self {
            text,
            index: 0,
            forward: true,
        })
    }

    #[inline]
    pub fn index(&self) -> usize {
        self.index
    }

    #[inline]
    pub fn direction(&self) -> i8 {
        if self.forward {
            1
        } else {
            -1
        }
    }

    pub fn window(&self) -> &'static str {
        self.text.get(self.index..self.index + LCD_COLUMNS).unwrap_or("")
    }

    /// Move one character, turning around at either end
    pub fn advance(&mut self) {
        let last = self.text.len() - LCD_COLUMNS;
        if self.forward {
            self.index += 1;
        } else {
            self.index -= 1;
        }

        if self.index == last {
            self.forward = false;
        } else if self.index == 0 {
            self.forward = true;
        }
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum ScrollerPhase {
    Startup,
    Send,
}

/// Lower line banner
pub struct Scroller<'q> {
    queue: &'q LcdQueue,
    text: &'static str,
    scroll: Option<Scroll>,
    step_ms: u32,
    phase: ScrollerPhase,
}

impl<'q> Scroller<'q> {
    /// A non-positive `speed_cps` shows the start of the text without scrolling
    pub fn new(queue: &'q LcdQueue, text: &'static str, speed_cps: i16) -> Self {
        let scroll = if speed_cps > 0 { Scroll::new(text) } else { None };
        let step_ms = if speed_cps > 0 { 1000 / speed_cps as u32 } else { 0 };
        Self {
            queue,
            text,
            scroll,
            step_ms,
            phase: ScrollerPhase::Startup,
        }
    }
}

impl<'a, 'q: 'a> Task<'a> for Scroller<'q> {
    fn run(&mut self, _cx: &mut Context<'_, 'a>) -> Wait<'a> {
        if self.phase == ScrollerPhase::Startup {
            self.phase = ScrollerPhase::Send;
            return Wait::millis(STARTUP_GUARD_MS);
        }

        match &mut self.scroll {
            None => match self.queue.try_send(LcdMessage::new(Line::Lower, self.text)) {
                Ok(()) => Wait::Exit,
                Err(_) => Wait::send(self.queue),
            },
            Some(scroll) => match self.queue.try_send(LcdMessage::new(Line::Lower, scroll.window())) {
                Ok(()) => {
                    scroll.advance();
                    Wait::millis(self.step_ms)
                }
                Err(_) => Wait::send(self.queue),
            },
        }
    }
}

/// Upper line text for one reading, e.g. `LDR value: 512`
pub fn reading_text(sensor: Sensor, value: u16) -> String<LCD_COLUMNS> {
    let mut text = String::new();
    // Cannot overflow: the longest reading is 15 characters
    ufmt::uwrite!(text, "{} value: {}", sensor.label(), value).ok();
    text
}

/// Cycles the three sensors through the upper line
pub struct AdcReporter<'r, A> {
    adc: &'r SharedAdc<A>,
    queue: &'r LcdQueue,
    next: usize,
    pending: Option<LcdMessage>,
    started: bool,
}

impl<'r, A> AdcReporter<'r, A> {
    pub fn new(adc: &'r SharedAdc<A>, queue: &'r LcdQueue) -> Self {
        Self {
            adc,
            queue,
            next: 0,
            pending: None,
            started: false,
        }
    }
}

impl<'a, 'r: 'a, A: AdcConverter + 'a> Task<'a> for AdcReporter<'r, A> {
    fn run(&mut self, _cx: &mut Context<'_, 'a>) -> Wait<'a> {
        if !self.started {
            self.started = true;
            return Wait::millis(STARTUP_GUARD_MS);
        }

        let message = match self.pending.take() {
            Some(message) => message,
            None => {
                let sensor = Sensor::ALL[self.next];
                match self.adc.try_read(sensor) {
                    Ok(value) => LcdMessage {
                        line: Line::Upper,
                        text: reading_text(sensor, value),
                    },
                    Err(_) => return Wait::lock(self.adc),
                }
            }
        };

        match self.queue.try_send(message) {
            Ok(()) => {
                self.next = (self.next + 1) % Sensor::ALL.len();
                Wait::millis(ADC_REPORT_CELL_MS)
            }
            Err(message) => {
                self.pending = Some(message);
                Wait::send(self.queue)
            }
        }
    }
}
