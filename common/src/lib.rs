//! Target-independent support shared by the driver and framework crates.
//!
//! - [`sync`]: interrupt masking and ISR-shared storage
//! - [`arch`]: the interrupt-control implementation for the build target

#![cfg_attr(not(test), no_std)]

pub mod arch;
pub mod sync;
