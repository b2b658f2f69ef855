//! Host-side simulation of the MCU register file.
//!
//! `SimBus` stores every data-space byte below [`SIM_SPACE`] and layers
//! the few register side effects the drivers rely on:
//!
//! - reading `PINx` returns `(PORTx & DDRx) | (external & !DDRx)`
//! - writing `PINx` toggles the corresponding `PORTx` bits
//! - writing `UDRn` appends the byte to that USART's wire log
//! - reading `UDRn` returns the byte last injected with [`SimBus::inject_rx`]

use alloc::vec::Vec;
use core::cell::RefCell;

use super::mcu::gpio::port_regs;
use super::mcu::usart::{USART_COUNT, usart_regs};
use crate::hal::bus::RegisterBus;
use crate::hal::gpio::{PORT_COUNT, Port};

/// Size of the simulated data space; covers every I/O register used.
pub const SIM_SPACE: usize = 0x140;

enum Special {
    Pin { ddr: usize, port: usize, ext: usize },
    Udr(usize),
    Plain,
}

pub struct SimBus {
    mem: RefCell<[u8; SIM_SPACE]>,
    external: RefCell<[u8; PORT_COUNT]>,
    rx_latch: RefCell<[u8; USART_COUNT]>,
    wire: RefCell<[Vec<u8>; USART_COUNT]>,
}

impl SimBus {
    pub fn new() -> Self {
        Self {
            mem: RefCell::new([0; SIM_SPACE]),
            external: RefCell::new([0; PORT_COUNT]),
            rx_latch: RefCell::new([0; USART_COUNT]),
            wire: RefCell::new(Default::default()),
        }
    }

    fn classify(addr: usize) -> Special {
        for port in Port::ALL {
            let regs = port_regs(port);
            if regs.pin == addr {
                return Special::Pin {
                    ddr: regs.ddr,
                    port: regs.port,
                    ext: port.index(),
                };
            }
        }
        for index in 0..USART_COUNT as u8 {
            if let Some(regs) = usart_regs(index) {
                if regs.udr == addr {
                    return Special::Udr(index as usize);
                }
            }
        }
        Special::Plain
    }

    /// Raw register content, without side effects.
    pub fn peek(&self, addr: usize) -> u8 {
        self.mem.borrow()[addr]
    }

    /// Overwrite a register, without side effects.
    pub fn poke(&self, addr: usize, value: u8) {
        self.mem.borrow_mut()[addr] = value;
    }

    /// Drive the external levels seen on a port's input pins.
    pub fn set_external(&self, port: Port, levels: u8) {
        self.external.borrow_mut()[port.index()] = levels;
    }

    /// Latch a received byte into `UDRn`.
    pub fn inject_rx(&self, usart: usize, byte: u8) {
        self.rx_latch.borrow_mut()[usart] = byte;
    }

    /// Bytes written to `UDRn` so far.
    pub fn wire(&self, usart: usize) -> Vec<u8> {
        self.wire.borrow()[usart].clone()
    }

    /// Drain the bytes written to `UDRn`.
    pub fn take_wire(&self, usart: usize) -> Vec<u8> {
        core::mem::take(&mut self.wire.borrow_mut()[usart])
    }
}

impl Default for SimBus {
    fn default() -> Self {
        Self::new()
    }
}

impl RegisterBus for SimBus {
    fn read(&self, addr: usize) -> u8 {
        match Self::classify(addr) {
            Special::Pin { ddr, port, ext } => {
                let mem = self.mem.borrow();
                let ddr = mem[ddr];
                (mem[port] & ddr) | (self.external.borrow()[ext] & !ddr)
            }
            Special::Udr(usart) => self.rx_latch.borrow()[usart],
            Special::Plain => self.peek(addr),
        }
    }

    fn write(&self, addr: usize, value: u8) {
        match Self::classify(addr) {
            Special::Pin { port, .. } => {
                self.mem.borrow_mut()[port] ^= value;
            }
            Special::Udr(usart) => {
                self.wire.borrow_mut()[usart].push(value);
                self.poke(addr, value);
            }
            Special::Plain => self.poke(addr, value),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn pin_register_mixes_outputs_and_external_levels() {
        let bus = SimBus::new();
        let regs = port_regs(Port::C);
        bus.write(regs.ddr, 0x0F);
        bus.write(regs.port, 0x05);
        bus.set_external(Port::C, 0xA3);
        assert_eq!(bus.read(regs.pin), 0xA5);
    }

    #[test]
    fn writing_pin_toggles_port_latch() {
        let bus = SimBus::new();
        let regs = port_regs(Port::H);
        bus.write(regs.port, 0x81);
        bus.write(regs.pin, 0x03);
        assert_eq!(bus.peek(regs.port), 0x82);
    }

    #[test]
    fn udr_writes_reach_the_wire() {
        let bus = SimBus::new();
        let Some(regs) = usart_regs(3) else {
            panic!("usart 3 missing");
        };
        bus.write(regs.udr, b'h');
        bus.write(regs.udr, b'i');
        assert_eq!(bus.take_wire(3), b"hi");
        assert!(bus.wire(3).is_empty());
    }
}
