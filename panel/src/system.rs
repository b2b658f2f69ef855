//! System bring-up.
//!
//! [`System`] owns the GPIO manager and the driver registry. Driver
//! classes live outside it (typically in statics, so the vector table can
//! reach the UART) and are registered by reference.

use common::sync::IrqControl;
use drivers::gpio::GpioManager;
use drivers::hal::bus::RegisterBus;

use crate::dev::loopback::{LOOPBACK_PREFIX, LoopbackDriver};
use crate::dev::registry::DriverRegistry;
use crate::dev::uart::{UART_PREFIX, UartDriver};
use crate::dev::DevError;

pub struct System<'a, B: RegisterBus> {
    pub gpio: GpioManager<B>,
    pub devices: DriverRegistry<'a>,
}

impl<'a, B: RegisterBus> System<'a, B> {
    pub const fn new(bus: B) -> Self {
        Self {
            gpio: GpioManager::new(bus),
            devices: DriverRegistry::new(),
        }
    }

    /// Register the serial class under `/dev/uart/`.
    pub fn register_uart<U, I>(&mut self, uart: &'a UartDriver<U, I>) -> Result<usize, DevError>
    where
        U: RegisterBus + Copy,
        I: IrqControl,
    {
        self.devices.register_class(UART_PREFIX, uart)
    }

    /// Register the loopback class under `/dev/loop/`.
    pub fn register_loopback(&mut self, loopback: &'a LoopbackDriver) -> Result<usize, DevError> {
        self.devices.register_class(LOOPBACK_PREFIX, loopback)
    }

    /// Initialize the GPIO manager (once) and every registered class.
    /// Returns the number of classes initialized.
    pub fn init(&mut self) -> usize {
        if !self.gpio.is_initialized() {
            self.gpio.init();
        }
        let classes = self.devices.driver_init();
        log::info!("system: gpio ready, {} driver classes", classes);
        classes
    }
}
