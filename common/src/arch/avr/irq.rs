use crate::sync::irq::IrqControl;
use core::ptr::{read_volatile, write_volatile};
use core::sync::atomic::{Ordering, compiler_fence};

/// Status register, data-space address.
const SREG: *mut u8 = 0x5F as *mut u8;

/// Global interrupt enable bit in SREG.
const SREG_I_BIT: u8 = 1 << 7;

pub struct AvrIrq;

/// Interrupt control for 8-bit AVR cores.
///
/// The I flag lives in SREG, which is memory mapped, so masking is a
/// plain read-modify-write with no inline assembly.
///
/// # State Management
/// The `State` type is `bool`: whether the I flag was set before
/// `disable()`. `restore` only re-enables when it was.
impl IrqControl for AvrIrq {
    type State = bool;

    #[inline(always)]
    fn disable() -> bool {
        unsafe {
            let sreg = read_volatile(SREG);
            write_volatile(SREG, sreg & !SREG_I_BIT);
            // Keep the protected accesses after the mask.
            compiler_fence(Ordering::SeqCst);
            sreg & SREG_I_BIT != 0
        }
    }

    #[inline(always)]
    fn restore(prev_enabled: bool) {
        // Keep the protected accesses before the unmask.
        compiler_fence(Ordering::SeqCst);
        if prev_enabled {
            unsafe {
                let sreg = read_volatile(SREG);
                write_volatile(SREG, sreg | SREG_I_BIT);
            }
        }
    }
}
