//! Hardware Abstraction Layer (HAL) - Target-Independent Types
//!
//! Types shared by the MCU register maps, the GPIO manager and the
//! USART driver. Nothing in here touches a register directly; all
//! register traffic goes through [`bus::RegisterBus`].
//!
//! # Available Interfaces
//!
//! - [`bus`]: 8-bit register access (volatile MMIO or host simulation)
//! - [`gpio`]: Port, pin mode and pin level types
//! - [`serial`]: Serial line configuration and errors

pub mod bus;
pub mod gpio;
pub mod serial;
