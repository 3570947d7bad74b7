//! Kernel time base: millisecond timestamps on a wrapping 32-bit tick counter

use core::cmp::Ordering;
use core::ops::{Add, Sub};

/// Length of a time span in kernel ticks (milliseconds)
#[derive(Copy, Clone, Debug, PartialEq, Eq, PartialOrd, Ord, Default)]
pub struct Duration(u32);

impl Duration {
    pub const ZERO: Duration = Duration(0);

    #[inline]
    pub const fn from_millis(ms: u32) -> Self {
        Duration(ms)
    }

    #[inline]
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    #[inline]
    pub const fn is_zero(self) -> bool {
        self.0 == 0
    }
}

/// Point in time since the kernel tick was started
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub struct Instant(u32);

impl Instant {
    #[inline]
    pub const fn from_millis(ms: u32) -> Self {
        Instant(ms)
    }

    #[inline]
    pub const fn as_millis(self) -> u32 {
        self.0
    }

    /// Time passed from `earlier` to `self`, zero if `earlier` lies in the future
    #[inline]
    pub fn saturating_since(self, earlier: Instant) -> Duration {
        if self >= earlier {
            Duration(self.0.wrapping_sub(earlier.0))
        } else {
            Duration::ZERO
        }
    }
}

// Comparison is valid as long as both instants are less than 2^31 ms apart.
impl Ord for Instant {
    #[inline]
    fn cmp(&self, other: &Self) -> Ordering {
        if self.0 == other.0 {
            Ordering::Equal
        } else if self.0.wrapping_sub(other.0) & (1 << (u32::BITS - 1)) == 0 {
            Ordering::Greater
        } else {
            Ordering::Less
        }
    }
}

impl PartialOrd for Instant {
    #[inline]
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Add<Duration> for Instant {
    type Output = Instant;

    #[inline]
    fn add(self, rhs: Duration) -> Instant {
        Instant(self.0.wrapping_add(rhs.0))
    }
}

impl Sub<Instant> for Instant {
    type Output = Duration;

    #[inline]
    fn sub(self, rhs: Instant) -> Duration {
        self.saturating_since(rhs)
    }
}
