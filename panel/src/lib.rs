//! Front-panel I/O core.
//!
//! Ties the hardware drivers into one character-device API:
//!
//! - [`dev`]: driver-class registry, open-file table, UART and loopback classes
//! - [`irq`]: interrupt vector dispatch to the serial driver
//! - [`system`]: bring-up of the GPIO manager and the driver registry
//! - [`config`]: compile-time table sizes
//!
//! # Usage Example
//!
//! ```ignore
//! let uart = UartDriver::new(bus);
//! let mut system = System::new(bus);
//! system.register_uart(&uart)?;
//! system.init();
//!
//! let h = system.devices.open("/dev/uart/1,9600,8,N,1", OpenMode::RDWR)?;
//! system.devices.write(h, b"AT\r\n")?;
//! ```

#![cfg_attr(not(test), no_std)]

pub mod config;
pub mod dev;
pub mod irq;
pub mod system;

pub use dev::{CharDriver, DevError, DevHandle, IoctlCmd, OpenMode};
pub use dev::loopback::LoopbackDriver;
pub use dev::registry::DriverRegistry;
pub use dev::uart::{TargetUart, UartDriver};
pub use system::System;
