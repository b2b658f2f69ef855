//! Peripheral Drivers
//!
//! Drivers for on-chip peripherals, written against
//! [`RegisterBus`](crate::hal::bus::RegisterBus) so they run unchanged on
//! the MCU and against the host simulation.
//!
//! # Available Peripherals
//!
//! - [`usart`]: Interrupt-driven AVR USART with Tx/Rx ring buffers

pub mod usart;
