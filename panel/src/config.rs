//! Compile-time limits.
//!
//! Every table in the I/O layer is sized here; nothing is allocated at
//! runtime.

pub use drivers::gpio::MAX_GPIO_RSVD;
pub use drivers::peripheral::usart::SERIAL_BUFFER_LEN;

/// Open-file table capacity.
pub const MAX_OPEN_DESCRIPTORS: usize = 8;

/// Driver-class registry capacity.
pub const MAX_CHAR_DRIVERS: usize = 4;

/// Longest device name accepted by `open`, options included.
pub const MAX_DEVSTRN_LEN: usize = 32;

/// Number of loopback minors (`/dev/loop/0` ..).
pub const LOOPBACK_MINORS: usize = 4;

/// Capacity of each loopback direction, in bytes.
pub const LOOPBACK_BUFFER_LEN: usize = 64;
