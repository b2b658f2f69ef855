//! 8-bit register bus.
//!
//! Every I/O register on the AVR is a byte in the data space, so the
//! whole driver layer is written against one small trait: read a byte
//! at an address, write a byte at an address.

use core::ptr::{read_volatile, write_volatile};

/// Byte-wide access to memory-mapped I/O registers.
///
/// Implementations must not cache: every `read` observes the register
/// and every `write` reaches it, in program order.
pub trait RegisterBus {
    /// Read the register at data-space address `addr`.
    fn read(&self, addr: usize) -> u8;

    /// Write `value` to the register at data-space address `addr`.
    fn write(&self, addr: usize, value: u8);

    /// Read-modify-write: set every bit in `mask`.
    #[inline]
    fn set_bits(&self, addr: usize, mask: u8) {
        let value = self.read(addr);
        self.write(addr, value | mask);
    }

    /// Read-modify-write: clear every bit in `mask`.
    #[inline]
    fn clear_bits(&self, addr: usize, mask: u8) {
        let value = self.read(addr);
        self.write(addr, value & !mask);
    }
}

impl<B: RegisterBus + ?Sized> RegisterBus for &B {
    #[inline]
    fn read(&self, addr: usize) -> u8 {
        (**self).read(addr)
    }

    #[inline]
    fn write(&self, addr: usize, value: u8) {
        (**self).write(addr, value)
    }
}

/// Volatile access to the real data space.
#[derive(Debug, Copy, Clone)]
pub struct Mmio {
    _private: (),
}

impl Mmio {
    /// Create a handle to the MCU's I/O registers.
    ///
    /// # Safety
    ///
    /// - Must only be used on the target the register maps describe
    /// - Every address passed to `read`/`write` must be a valid register
    pub const unsafe fn new() -> Self {
        Self { _private: () }
    }
}

impl RegisterBus for Mmio {
    #[inline(always)]
    fn read(&self, addr: usize) -> u8 {
        unsafe { read_volatile(addr as *const u8) }
    }

    #[inline(always)]
    fn write(&self, addr: usize, value: u8) {
        unsafe { write_volatile(addr as *mut u8, value) }
    }
}
