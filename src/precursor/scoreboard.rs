//! Serial digit scoreboard
//!
//! The receiver turns each incoming character into a digit (10 for
//! anything that is not `0`..`9`) and hands it to the sender and the
//! display through two queues. Sends give up after a short timeout so a
//! starved consumer drops digits instead of stalling the receiver.

use crate::config::{SCOREBOARD_QUEUE_CAPACITY, SCOREBOARD_SEND_TIMEOUT_MS, STARTUP_GUARD_MS};
use crate::drivers::lcd::ParallelBus;
use crate::drivers::{SerialConsole, SevenSegment, Symbol};
use crate::rtos::{Context, Queue, Task, Wait, Wake};
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial::{Read, Write};

/// Digit standing for any invalid character
pub const INVALID_DIGIT: u8 = 10;

pub const REPLY_RECEIVED: &str = "Number received!\r\n";
pub const REPLY_INVALID: &str = "Error! Not a valid digit.\r\n";

pub type DigitQueue = Queue<u8, SCOREBOARD_QUEUE_CAPACITY>;

pub const fn parse_digit(byte: u8) -> u8 {
    let digit = byte.wrapping_sub(b'0');
    if digit > 9 {
        INVALID_DIGIT
    } else {
        digit
    }
}

pub const fn reply(digit: u8) -> &'static str {
    if digit == INVALID_DIGIT {
        REPLY_INVALID
    } else {
        REPLY_RECEIVED
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Delivery {
    Idle,
    ToSender(u8),
    ToDisplay(u8),
}

/// Polls the receiver and fans each digit out to both consumers
pub struct Receiver<'q, R> {
    serial: R,
    to_sender: &'q DigitQueue,
    to_display: &'q DigitQueue,
    delivery: Delivery,
}

impl<'q, R: Read<u8>> Receiver<'q, R> {
    pub fn new(serial: R, to_sender: &'q DigitQueue, to_display: &'q DigitQueue) -> Self {
        Self {
            serial,
            to_sender,
            to_display,
            delivery: Delivery::Idle,
        }
    }

    fn deliver(&self, queue: &'q DigitQueue, digit: u8) -> Option<Wait<'q>> {
        match queue.try_send(digit) {
            Ok(()) => None,
            Err(_) => Some(Wait::send_timeout(queue, SCOREBOARD_SEND_TIMEOUT_MS)),
        }
    }
}

impl<'a, 'q: 'a, R: Read<u8>> Task<'a> for Receiver<'q, R> {
    fn run(&mut self, cx: &mut Context<'_, 'a>) -> Wait<'a> {
        let timed_out = cx.wake() == Wake::Timeout;

        loop {
            match self.delivery {
                Delivery::Idle => match self.serial.read() {
                    Ok(byte) => self.delivery = Delivery::ToSender(parse_digit(byte)),
                    // Poll again on the next tick
                    Err(_) => return Wait::millis(1),
                },
                Delivery::ToSender(digit) => {
                    if timed_out {
                        log::warn!("sender queue full, reply dropped");
                    } else if let Some(wait) = self.deliver(self.to_sender, digit) {
                        return wait;
                    }
                    self.delivery = Delivery::ToDisplay(digit);
                    return Wait::Yield;
                }
                Delivery::ToDisplay(digit) => {
                    if timed_out {
                        log::warn!("display queue full, digit dropped");
                    } else if let Some(wait) = self.deliver(self.to_display, digit) {
                        return wait;
                    }
                    self.delivery = Delivery::Idle;
                    return Wait::Yield;
                }
            }
        }
    }
}

/// Replies to each digit, one character per step
pub struct Sender<'q, S> {
    console: SerialConsole<S>,
    digits: &'q DigitQueue,
    message: Option<(&'static str, usize)>,
}

impl<'q, S: Write<u8>> Sender<'q, S> {
    pub fn new(console: SerialConsole<S>, digits: &'q DigitQueue) -> Self {
        Self {
            console,
            digits,
            message: None,
        }
    }
}

impl<'a, 'q: 'a, S: Write<u8>> Task<'a> for Sender<'q, S> {
    fn run(&mut self, _cx: &mut Context<'_, 'a>) -> Wait<'a> {
        let Some((message, sent)) = self.message else {
            return match self.digits.try_receive() {
                Some(digit) => {
                    self.message = Some((reply(digit), 0));
                    Wait::Yield
                }
                None => Wait::receive(self.digits),
            };
        };

        match message.as_bytes().get(sent) {
            Some(&byte) => {
                if self.console.write_byte(byte).is_err() {
                    log::warn!("serial write failed");
                }
                self.message = Some((message, sent + 1));
            }
            None => self.message = None,
        }
        Wait::Yield
    }
}

/// Shows the latest digit, or `E` for invalid input
pub struct Display<'q, B, P> {
    display: SevenSegment<B, P>,
    digits: &'q DigitQueue,
    started: bool,
}

impl<'q, B, P> Display<'q, B, P> {
    pub fn new(display: SevenSegment<B, P>, digits: &'q DigitQueue) -> Self {
        Self {
            display,
            digits,
            started: false,
        }
    }
}

impl<'a, 'q: 'a, B, P> Task<'a> for Display<'q, B, P>
where
    B: ParallelBus,
    P: OutputPin,
{
    fn run(&mut self, _cx: &mut Context<'_, 'a>) -> Wait<'a> {
        if !self.started {
            self.started = true;
            return Wait::millis(STARTUP_GUARD_MS);
        }

        if let Some(digit) = self.digits.try_receive() {
            self.display.show(Symbol::Digit(digit));
        }
        Wait::receive(self.digits)
    }
}
