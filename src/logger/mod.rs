//! `log` backend writing formatted records into a byte ring
//!
//! Records are rendered as `[LEVEL] target: message\r\n`. The ring is
//! drained by the serial reporter, so the USART keeps a single owner and
//! logging never waits on the transmitter. Bytes that do not fit are
//! dropped and counted.

use crate::config::LOG_BUFFER_SIZE;
use core::cell::{Cell, RefCell};
use core::fmt::{self, Write};
use critical_section::Mutex;
use heapless::Deque;
use log::{LevelFilter, Log, Metadata, Record};

pub struct LogRing {
    bytes: Mutex<RefCell<Deque<u8, LOG_BUFFER_SIZE>>>,
    dropped: Mutex<Cell<u16>>,
}

impl LogRing {
    pub const fn new() -> Self {
        Self {
            bytes: Mutex::new(RefCell::new(Deque::new())),
            dropped: Mutex::new(Cell::new(0)),
        }
    }

    /// Append `data`, dropping whatever does not fit
    pub fn push(&self, data: &[u8]) {
        critical_section::with(|cs| {
            let mut bytes = self.bytes.borrow_ref_mut(cs);
            let lost = data.iter().filter(|&&byte| bytes.push_back(byte).is_err()).count();
            if lost > 0 {
                let dropped = self.dropped.borrow(cs);
                dropped.set(dropped.get().saturating_add(lost as u16));
            }
        });
    }

    pub fn pop(&self) -> Option<u8> {
        critical_section::with(|cs| self.bytes.borrow_ref_mut(cs).pop_front())
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.bytes.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Number of bytes lost to a full ring since startup
    pub fn dropped(&self) -> u16 {
        critical_section::with(|cs| self.dropped.borrow(cs).get())
    }
}

impl Default for LogRing {
    fn default() -> Self {
        Self::new()
    }
}

impl Write for &LogRing {
    fn write_str(&mut self, s: &str) -> fmt::Result {
        self.push(s.as_bytes());
        Ok(())
    }
}

pub struct RingLogger<'r> {
    ring: &'r LogRing,
    level: LevelFilter,
}

impl<'r> RingLogger<'r> {
    pub const fn new(ring: &'r LogRing, level: LevelFilter) -> Self {
        Self { ring, level }
    }
}

impl Log for RingLogger<'_> {
    fn enabled(&self, metadata: &Metadata) -> bool {
        metadata.level() <= self.level
    }

    fn log(&self, record: &Record) {
        if !self.enabled(record.metadata()) {
            return;
        }
        let mut ring = self.ring;
        // Writing into the ring cannot fail
        write!(ring, "[{}] {}: {}\r\n", record.level(), record.target(), record.args()).ok();
    }

    fn flush(&self) {}
}

/// Ring shared by the installed logger and the serial reporter
pub static LOG_RING: LogRing = LogRing::new();

const LEVEL: LevelFilter = if cfg!(feature = "debug") {
    LevelFilter::Debug
} else {
    LevelFilter::Info
};

static LOGGER: RingLogger<'static> = RingLogger::new(&LOG_RING, LEVEL);

/// Install the ring logger; call once, before interrupts are enabled
#[cfg(target_arch = "avr")]
pub fn init() {
    // SAFETY: called once during startup with interrupts still disabled
    unsafe {
        log::set_logger_racy(&LOGGER).ok();
        log::set_max_level_racy(LEVEL);
    }
}

#[cfg(not(target_arch = "avr"))]
pub fn init() {
    if log::set_logger(&LOGGER).is_ok() {
        log::set_max_level(LEVEL);
    }
}
