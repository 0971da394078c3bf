//! Exclusive access to the single physical converter

use core::ops::{Deref, DerefMut};

use embassy_sync::{
    blocking_mutex::raw::RawMutex,
    mutex::{Mutex, MutexGuard},
};

use crate::hardware::SleepHold;

/// Owns the converter state; only one conversion cycle can hold it at a time.
///
/// Waiters are parked on the mutex and woken in the order the mutex picks,
/// there is no priority between channels.
pub struct HardwareGate<M: RawMutex, T> {
    /// The guarded converter state
    inner: Mutex<M, T>,
}

impl<M: RawMutex, T> HardwareGate<M, T> {
    /// Creates a free gate around `value`
    pub const fn new(value: T) -> Self {
        Self {
            inner: Mutex::new(value),
        }
    }

    /// Waits until the converter is free and takes ownership of it.
    ///
    /// The caller's sleep hold is lifted while it waits, because nothing runs
    /// on its behalf until the gate is granted, and re-asserted on return.
    pub async fn acquire(&self, hold: &mut SleepHold<'_>) -> GateGuard<'_, M, T> {
        hold.suspend();
        let guard = self.inner.lock().await;
        hold.resume();
        GateGuard { guard }
    }

    /// Takes the gate if it is free right now
    #[cfg(test)]
    pub(crate) fn try_acquire(&self) -> Option<GateGuard<'_, M, T>> {
        self.inner.try_lock().ok().map(|guard| GateGuard { guard })
    }
}

/// Proof of ownership of the converter, released when dropped
pub struct GateGuard<'a, M: RawMutex, T> {
    /// Underlying mutex guard
    guard: MutexGuard<'a, M, T>,
}

impl<M: RawMutex, T> Deref for GateGuard<'_, M, T> {
    type Target = T;

    fn deref(&self) -> &T {
        &self.guard
    }
}

impl<M: RawMutex, T> DerefMut for GateGuard<'_, M, T> {
    fn deref_mut(&mut self) -> &mut T {
        &mut self.guard
    }
}
