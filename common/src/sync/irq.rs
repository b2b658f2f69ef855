use core::fmt::Debug;

/// Global interrupt masking interface.
///
/// Implemented once per target by the architecture layer. Foreground code
/// uses it to open the short "all interrupts off" windows needed to take a
/// consistent snapshot of state that an ISR also writes.
pub trait IrqControl {
    /// Saved interrupt state
    type State: Copy + Debug;

    /// Disable interrupts and return the previous state.
    fn disable() -> Self::State;

    /// Restore interrupts to a previous state.
    fn restore(state: Self::State);

    /// Run `f` with interrupts disabled, restoring the previous state after.
    #[inline(always)]
    fn free<R>(f: impl FnOnce() -> R) -> R {
        let state = Self::disable();
        let out = f();
        Self::restore(state);
        out
    }
}

/// Interrupt control for hosted builds.
///
/// There is no interrupt controller on the host: ISR entry points are
/// called directly from the same thread, so masking is a no-op.
#[derive(Debug, Clone, Copy, Default)]
pub struct NoIrq;

impl IrqControl for NoIrq {
    type State = ();

    #[inline(always)]
    fn disable() {}

    #[inline(always)]
    fn restore(_state: ()) {}
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn free_returns_closure_value() {
        assert_eq!(NoIrq::free(|| 7u8 + 1), 8);
    }
}
