//! `/dev/uart/<minor>[,baud[,bits[,parity[,stops]]]]`
//!
//! One minor per USART compiled in through the `uartN` features. Each
//! minor is a [`SerialPort`] with its own ring buffers; the interrupt
//! vectors reach them through [`UartDriver::on_interrupt`].

use common::arch::TargetIrq;
use common::sync::IrqControl;
use drivers::hal::bus::RegisterBus;
use drivers::hw::mcu::usart::{USART_COUNT, usart_enabled, usart_regs};
use drivers::peripheral::usart::SerialPort;

use super::options::{parse_serial_options, split_minor};
use super::{CharDriver, DevError, IoctlCmd, Minor, OpenMode};
use crate::irq::{UsartEvent, Vector};

/// Namespace prefix of the class.
pub const UART_PREFIX: &str = "/dev/uart/";

/// The serial class with the build target's interrupt control.
pub type TargetUart<B> = UartDriver<B, TargetIrq>;

pub struct UartDriver<B: RegisterBus + Copy, I: IrqControl> {
    ports: [Option<SerialPort<B, I>>; USART_COUNT],
}

impl<B: RegisterBus + Copy, I: IrqControl> UartDriver<B, I> {
    /// Build the driver with one closed port per enabled USART.
    pub const fn new(bus: B) -> Self {
        Self {
            ports: [
                Self::port_for(bus, 0),
                Self::port_for(bus, 1),
                Self::port_for(bus, 2),
                Self::port_for(bus, 3),
            ],
        }
    }

    const fn port_for(bus: B, index: u8) -> Option<SerialPort<B, I>> {
        if !usart_enabled(index) {
            return None;
        }
        match usart_regs(index) {
            Some(regs) => Some(SerialPort::new(bus, regs)),
            None => None,
        }
    }

    /// The port behind `minor`, if that USART is compiled in.
    pub fn port(&self, minor: Minor) -> Option<&SerialPort<B, I>> {
        self.ports.get(minor as usize)?.as_ref()
    }

    fn open_port(&self, minor: Minor) -> Result<&SerialPort<B, I>, DevError> {
        self.port(minor).ok_or(DevError::NoSuchDevice)
    }

    /// Run the handler for `vector`. Returns `false` when no enabled
    /// port owns it.
    pub fn on_interrupt(&self, vector: Vector) -> bool {
        let Some(port) = self.port(vector.usart) else {
            return false;
        };
        match vector.event {
            UsartEvent::RxComplete => port.on_rx_complete(),
            UsartEvent::DataRegisterEmpty => port.on_data_register_empty(),
            UsartEvent::TxComplete => port.on_tx_complete(),
        }
        true
    }
}

impl<B: RegisterBus + Copy, I: IrqControl> CharDriver for UartDriver<B, I> {
    fn init(&self) {
        let enabled = self.ports.iter().flatten().count();
        log::debug!("uart: {} ports enabled", enabled);
    }

    fn open(&self, name: &str, _mode: OpenMode) -> Result<Minor, DevError> {
        let (minor, options) = split_minor(name)?;
        let config = parse_serial_options(options)?;
        let port = self.open_port(minor)?;
        port.open(config)?;
        log::debug!(
            "uart{}: {} baud (real {}), {:?} {:?} {:?}",
            minor,
            config.baud_rate,
            port.real_baud(),
            config.data_bits,
            config.parity,
            config.stop_bits
        );
        Ok(minor)
    }

    fn close(&self, minor: Minor) -> Result<(), DevError> {
        Ok(self.open_port(minor)?.close()?)
    }

    fn read(&self, minor: Minor, buf: &mut [u8]) -> Result<usize, DevError> {
        Ok(self.open_port(minor)?.read(buf)?)
    }

    fn write(&self, minor: Minor, buf: &[u8]) -> Result<usize, DevError> {
        Ok(self.open_port(minor)?.write(buf)?)
    }

    fn reset(&self, minor: Minor) -> Result<(), DevError> {
        let port = self.open_port(minor)?;
        if !port.is_open() {
            return Err(DevError::NotOpen);
        }
        port.reset();
        Ok(())
    }

    fn ioctl(&self, minor: Minor, cmd: IoctlCmd) -> Result<u32, DevError> {
        let port = self.open_port(minor)?;
        let value = match cmd {
            IoctlCmd::RxPeek => port.readable()? as u32,
            IoctlCmd::TxPeek => port.writable()? as u32,
            IoctlCmd::ReadBaud if port.is_open() => port.real_baud(),
            IoctlCmd::ReadBaud => return Err(DevError::NotOpen),
        };
        Ok(value)
    }
}
