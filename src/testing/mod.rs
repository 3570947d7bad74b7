//! Host-side doubles for the board peripherals

use crate::drivers::lcd::{Lcd, ParallelBus};
use crate::drivers::{AdcConverter, AdcInput};
use core::cell::{Cell, RefCell};
use core::convert::Infallible;
use embedded_hal::digital::v2::OutputPin;
use embedded_hal::serial::{Read, Write};
use embedded_hal::PwmPin;
use embedded_hal_mock::delay::MockNoop;
use std::collections::VecDeque;
use std::rc::Rc;

/// Analog levels seen by [`FakeAdc`], adjustable while tasks run
pub struct SensorValues {
    pub ldr: Cell<u16>,
    pub ntc: Cell<u16>,
    pub pot: Cell<u16>,
}

impl SensorValues {
    pub fn new(ldr: u16, ntc: u16, pot: u16) -> Self {
        Self {
            ldr: Cell::new(ldr),
            ntc: Cell::new(ntc),
            pot: Cell::new(pot),
        }
    }
}

pub struct FakeAdc {
    values: Rc<SensorValues>,
    selected: Option<AdcInput>,
}

impl FakeAdc {
    pub fn new(values: Rc<SensorValues>) -> Self {
        Self { values, selected: None }
    }
}

impl AdcConverter for FakeAdc {
    fn select(&mut self, input: AdcInput) {
        self.selected = Some(input);
    }

    fn convert(&mut self) -> u16 {
        match self.selected.map(|input| input.muxpos) {
            Some(8) => self.values.ldr.get(),
            Some(9) => self.values.ntc.get(),
            Some(14) => self.values.pot.get(),
            _ => 0,
        }
    }
}

#[derive(Default)]
pub struct FakePwm {
    pub duty: u8,
    pub enabled: bool,
}

impl PwmPin for FakePwm {
    type Duty = u8;

    fn disable(&mut self) {
        self.enabled = false;
    }

    fn enable(&mut self) {
        self.enabled = true;
    }

    fn get_duty(&self) -> u8 {
        self.duty
    }

    fn get_max_duty(&self) -> u8 {
        u8::MAX
    }

    fn set_duty(&mut self, duty: u8) {
        self.duty = duty;
    }
}

/// Output pin whose clones share one level
#[derive(Clone, Default)]
pub struct FakePin(Rc<Cell<bool>>);

impl FakePin {
    pub fn is_high(&self) -> bool {
        self.0.get()
    }
}

impl OutputPin for FakePin {
    type Error = Infallible;

    fn set_low(&mut self) -> Result<(), Infallible> {
        self.0.set(false);
        Ok(())
    }

    fn set_high(&mut self) -> Result<(), Infallible> {
        self.0.set(true);
        Ok(())
    }
}

#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum LcdWrite {
    Command(u8),
    Data(u8),
}

/// Emulated HD44780 display memory
pub struct Screen {
    writes: Vec<LcdWrite>,
    ddram: [[u8; 64]; 2],
    line: usize,
    column: usize,
}

impl Screen {
    fn new() -> Self {
        Self {
            writes: Vec::new(),
            ddram: [[b' '; 64]; 2],
            line: 0,
            column: 0,
        }
    }

    fn record(&mut self, write: LcdWrite) {
        match write {
            LcdWrite::Command(0x01) => {
                self.ddram = [[b' '; 64]; 2];
                self.line = 0;
                self.column = 0;
            }
            LcdWrite::Command(address) if address & 0x80 != 0 => {
                self.line = ((address >> 6) & 1) as usize;
                self.column = (address & 0x3F) as usize;
            }
            LcdWrite::Command(_) => {}
            LcdWrite::Data(byte) => {
                if let Some(cell) = self.ddram[self.line].get_mut(self.column) {
                    *cell = byte;
                }
                self.column += 1;
            }
        }
        self.writes.push(write);
    }

    /// Visible 16 columns of `line`
    pub fn line(&self, line: usize) -> String {
        String::from_utf8_lossy(&self.ddram[line][..16]).into_owned()
    }

    pub fn commands(&self) -> Vec<u8> {
        self.writes
            .iter()
            .filter_map(|write| match write {
                LcdWrite::Command(command) => Some(*command),
                LcdWrite::Data(_) => None,
            })
            .collect()
    }

    /// Lengths of the uninterrupted data write sequences
    pub fn data_runs(&self) -> Vec<usize> {
        let mut runs = Vec::new();
        let mut current = 0;
        for write in &self.writes {
            match write {
                LcdWrite::Data(_) => current += 1,
                LcdWrite::Command(_) if current > 0 => {
                    runs.push(current);
                    current = 0;
                }
                LcdWrite::Command(_) => {}
            }
        }
        if current > 0 {
            runs.push(current);
        }
        runs
    }
}

pub struct ScreenBus {
    select: FakePin,
    screen: Rc<RefCell<Screen>>,
}

impl ParallelBus for ScreenBus {
    fn write(&mut self, value: u8) {
        let write = if self.select.is_high() {
            LcdWrite::Data(value)
        } else {
            LcdWrite::Command(value)
        };
        self.screen.borrow_mut().record(write);
    }
}

pub type FakeLcd = Lcd<FakePin, FakePin, ScreenBus, MockNoop>;

pub fn fake_lcd() -> (FakeLcd, Rc<RefCell<Screen>>) {
    let screen = Rc::new(RefCell::new(Screen::new()));
    let select = FakePin::default();
    let bus = ScreenBus {
        select: select.clone(),
        screen: screen.clone(),
    };
    (Lcd::new(FakePin::default(), select, bus, MockNoop::new()), screen)
}

/// Serial port with a shared transmit log and receive queue
#[derive(Clone, Default)]
pub struct FakeSerial {
    pub sent: Rc<RefCell<Vec<u8>>>,
    pub incoming: Rc<RefCell<VecDeque<u8>>>,
}

impl FakeSerial {
    pub fn sent_text(&self) -> String {
        String::from_utf8_lossy(&self.sent.borrow()).into_owned()
    }
}

impl Write<u8> for FakeSerial {
    type Error = Infallible;

    fn write(&mut self, word: u8) -> nb::Result<(), Infallible> {
        self.sent.borrow_mut().push(word);
        Ok(())
    }

    fn flush(&mut self) -> nb::Result<(), Infallible> {
        Ok(())
    }
}

impl Read<u8> for FakeSerial {
    type Error = Infallible;

    fn read(&mut self) -> nb::Result<u8, Infallible> {
        self.incoming.borrow_mut().pop_front().ok_or(nb::Error::WouldBlock)
    }
}
