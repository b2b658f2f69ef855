//! Hardware Driver Subsystem
//!
//! This crate provides a layered architecture for hardware access:
//!
//! # Module Organization
//!
//! - [`hal`]: Target-independent types and the register bus trait
//! - [`hw`]: MCU register maps (and the host simulation of them)
//! - [`gpio`]: GPIO resource manager (pin/port ownership and registers)
//! - [`peripheral`]: Peripheral drivers (USART)
//!
//! # Usage Example
//!
//! ```ignore
//! use drivers::gpio::GpioManager;
//! use drivers::hal::bus::Mmio;
//! use drivers::hal::gpio::{PinMode, Port};
//!
//! let mut gpio = GpioManager::new(unsafe { Mmio::new() });
//! gpio.init();
//! let led = gpio.register_pin(Port::B, 7, PinMode::OutputLow)?;
//! gpio.toggle(led)?;
//! ```

#![cfg_attr(not(test), no_std)]

#[cfg(any(test, feature = "sim"))]
extern crate alloc;

pub mod gpio;
pub mod hal;
pub mod hw;
pub mod peripheral;

// Re-export commonly used types
pub use gpio::{GpioError, GpioHandle, GpioManager};
pub use hal::bus::{Mmio, RegisterBus};
pub use hal::gpio::{PinLevel, PinMode, Port};
pub use hal::serial::{SerialConfig, SerialError};
pub use peripheral::usart::SerialPort;
