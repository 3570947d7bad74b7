//! Bounded FIFO shared between tasks

use super::task::{Interest, Waitable};
use core::cell::RefCell;
use critical_section::Mutex;
use heapless::Deque;

pub struct Queue<T, const N: usize> {
    items: Mutex<RefCell<Deque<T, N>>>,
}

impl<T, const N: usize> Queue<T, N> {
    pub const fn new() -> Self {
        Self {
            items: Mutex::new(RefCell::new(Deque::new())),
        }
    }

    /// Append `item`, handing it back when the queue is full
    pub fn try_send(&self, item: T) -> Result<(), T> {
        critical_section::with(|cs| self.items.borrow_ref_mut(cs).push_back(item))
    }

    pub fn try_receive(&self) -> Option<T> {
        critical_section::with(|cs| self.items.borrow_ref_mut(cs).pop_front())
    }

    pub fn len(&self) -> usize {
        critical_section::with(|cs| self.items.borrow_ref(cs).len())
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    pub fn is_full(&self) -> bool {
        self.len() == N
    }

    pub const fn capacity(&self) -> usize {
        N
    }
}

impl<T, const N: usize> Default for Queue<T, N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T, const N: usize> Waitable for Queue<T, N> {
    fn poll_ready(&self, interest: Interest) -> bool {
        match interest {
            Interest::Receive => !self.is_empty(),
            Interest::Send => !self.is_full(),
            Interest::Lock => false,
        }
    }
}
