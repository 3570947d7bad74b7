//! Interrupt-to-task signalling and system time
//!
//! Interrupt handlers only publish: they bump the tick, raise a flag or
//! advance a divider. Consumers run in task or main-loop context. AVR has
//! no atomic read-modify-write, so every flag has exactly one writer per
//! direction: the ISR sets, the consumer clears.

use crate::rtos::Instant;
use core::cell::Cell;
use core::sync::atomic::{AtomicBool, AtomicU8, Ordering};
use critical_section::Mutex;

/// Millisecond counter advanced by the kernel tick interrupt
pub struct SysTick {
    ticks: Mutex<Cell<u32>>,
}

impl SysTick {
    pub const fn new() -> Self {
        Self {
            ticks: Mutex::new(Cell::new(0)),
        }
    }

    /// Advance by one tick, called from the tick ISR
    #[inline]
    pub fn tick(&self) {
        critical_section::with(|cs| {
            let ticks = self.ticks.borrow(cs);
            ticks.set(ticks.get().wrapping_add(1));
        });
    }

    /// Current time; the 32-bit counter is read inside a critical section
    #[inline]
    pub fn now(&self) -> Instant {
        Instant::from_millis(critical_section::with(|cs| self.ticks.borrow(cs).get()))
    }
}

impl Default for SysTick {
    fn default() -> Self {
        Self::new()
    }
}

/// Global system tick
pub static SYSTEM_TICK: SysTick = SysTick::new();

#[inline]
pub fn now() -> Instant {
    SYSTEM_TICK.now()
}

/// Single-byte event flag published by an interrupt handler
pub struct IrqFlag(AtomicBool);

impl IrqFlag {
    pub const fn new(raised: bool) -> Self {
        Self(AtomicBool::new(raised))
    }

    /// Publish the event, ISR side
    #[inline]
    pub fn raise(&self) {
        self.0.store(true, Ordering::Release);
    }

    #[inline]
    pub fn is_raised(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }

    /// Consume the event, main side
    #[inline]
    pub fn take(&self) -> bool {
        let raised = self.0.load(Ordering::Acquire);
        if raised {
            self.0.store(false, Ordering::Relaxed);
        }
        raised
    }

    #[inline]
    pub fn clear(&self) {
        self.0.store(false, Ordering::Relaxed);
    }
}

/// Modulo-`N` counter of periodic interrupts
///
/// The ISR calls [`TickDivider::tick`]; the consumer treats phase 0 as the
/// start of a new period.
pub struct TickDivider<const N: u8>(AtomicU8);

impl<const N: u8> TickDivider<N> {
    pub const fn new() -> Self {
        Self(AtomicU8::new(0))
    }

    #[inline]
    pub fn tick(&self) {
        let phase = self.0.load(Ordering::Relaxed);
        self.0.store((phase + 1) % N, Ordering::Release);
    }

    #[inline]
    pub fn phase(&self) -> u8 {
        self.0.load(Ordering::Acquire)
    }

    #[inline]
    pub fn at_boundary(&self) -> bool {
        self.phase() == 0
    }
}

impl<const N: u8> Default for TickDivider<N> {
    fn default() -> Self {
        Self::new()
    }
}
