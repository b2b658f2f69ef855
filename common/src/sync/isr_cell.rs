use core::cell::UnsafeCell;

/// Storage shared between foreground code and exactly one interrupt handler.
///
/// Unlike a spinlock this never spins: on a
/// single-core MCU the only other writer is the ISR, and the foreground
/// excludes it by masking that ISR's interrupt source before touching the
/// data. `IsrCell` only provides the storage; every access is `unsafe`
/// and the caller states which source is masked.
///
/// Valid for single-core targets where the ISR is the only concurrent
/// writer. Not a substitute for a lock on multi-core or preemptive hosts.
pub struct IsrCell<T> {
    data: UnsafeCell<T>,
}

// SAFETY: access discipline is delegated to the callers of `get`/`get_mut`,
// which must mask the competing interrupt source first.
unsafe impl<T: Send> Sync for IsrCell<T> {}

impl<T> IsrCell<T> {
    /// Create a new cell.
    pub const fn new(data: T) -> Self {
        Self {
            data: UnsafeCell::new(data),
        }
    }

    /// Shared access.
    ///
    /// # Safety
    ///
    /// No `&mut` obtained from [`get_mut`](Self::get_mut) may be live, in
    /// this context or in an interrupt handler that can preempt it.
    #[inline(always)]
    pub unsafe fn get(&self) -> &T {
        unsafe { &*self.data.get() }
    }

    /// Exclusive access.
    ///
    /// # Safety
    ///
    /// The caller is either the owning ISR, or foreground code running with
    /// the owning ISR's interrupt source (or all interrupts) masked.
    #[inline(always)]
    #[allow(clippy::mut_from_ref)]
    pub unsafe fn get_mut(&self) -> &mut T {
        unsafe { &mut *self.data.get() }
    }
}
