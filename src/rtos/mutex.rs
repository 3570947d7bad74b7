//! Binary lock protecting a shared peripheral

use super::task::{Interest, Waitable};
use core::cell::{Cell, UnsafeCell};
use core::ops::{Deref, DerefMut};

pub struct Mutex<T> {
    locked: critical_section::Mutex<Cell<bool>>,
    value: UnsafeCell<T>,
}

// SAFETY: Access to `value` is only granted through a `MutexGuard`,
//         and at most one guard exists while `locked` is set.
unsafe impl<T: Send> Sync for Mutex<T> {}

impl<T> Mutex<T> {
    pub const fn new(value: T) -> Self {
        Self {
            locked: critical_section::Mutex::new(Cell::new(false)),
            value: UnsafeCell::new(value),
        }
    }

    /// Take the lock if it is free
    pub fn try_lock(&self) -> Option<MutexGuard<'_, T>> {
        let acquired = critical_section::with(|cs| {
            let locked = self.locked.borrow(cs);
            if locked.get() {
                false
            } else {
                locked.set(true);
                true
            }
        });
        acquired.then(|| MutexGuard { mutex: self })
    }

    pub fn is_locked(&self) -> bool {
        critical_section::with(|cs| self.locked.borrow(cs).get())
    }
}

impl<T> Waitable for Mutex<T> {
    fn poll_ready(&self, interest: Interest) -> bool {
        interest == Interest::Lock && !self.is_locked()
    }
}

pub struct MutexGuard<'m, T> {
    mutex: &'m Mutex<T>,
}

impl<T> Deref for MutexGuard<'_, T> {
    type Target = T;

    fn deref(&self) -> &T {
        // SAFETY: The guard owns the lock.
        unsafe { &*self.mutex.value.get() }
    }
}

impl<T> DerefMut for MutexGuard<'_, T> {
    fn deref_mut(&mut self) -> &mut T {
        // SAFETY: The guard owns the lock and is borrowed mutably.
        unsafe { &mut *self.mutex.value.get() }
    }
}

impl<T> Drop for MutexGuard<'_, T> {
    fn drop(&mut self) {
        critical_section::with(|cs| self.mutex.locked.borrow(cs).set(false));
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_one_guard_at_a_time() {
        let mutex = Mutex::new(0u16);
        {
            let mut guard = mutex.try_lock().unwrap();
            *guard = 512;
            assert!(mutex.try_lock().is_none());
            assert!(!mutex.poll_ready(Interest::Lock));
        }
        assert!(mutex.poll_ready(Interest::Lock));
        assert_eq!(*mutex.try_lock().unwrap(), 512);
    }
}
