/// System clock frequency (external crystal on Mega2560 boards).
pub const F_CPU: u32 = 16_000_000;

/// MCU control register.
pub const MCUCR: usize = 0x55;

/// Pull-up disable bit in MCUCR. Set: every pull-up is off.
pub const MCUCR_PUD: u8 = 1 << 4;
