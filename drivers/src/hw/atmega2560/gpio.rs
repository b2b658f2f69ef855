use crate::hal::gpio::Port;

/// Data-space addresses of one port's registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct PortRegs {
    /// Input pins; writing 1s toggles the PORT latch.
    pub pin: usize,
    /// Data direction, 1 = output.
    pub ddr: usize,
    /// Output latch / pull-up enable.
    pub port: usize,
    /// Number of bonded-out pins, starting at bit 0.
    pub pin_count: u8,
}

impl PortRegs {
    /// Placeholder for a port record that has not been attached yet.
    pub const DETACHED: PortRegs = PortRegs {
        pin: 0,
        ddr: 0,
        port: 0,
        pin_count: 0,
    };

    const fn at(pin: usize, pin_count: u8) -> Self {
        Self {
            pin,
            ddr: pin + 1,
            port: pin + 2,
            pin_count,
        }
    }

    /// Mask of the bits that correspond to existing pins.
    pub const fn exist_mask(&self) -> u8 {
        if self.pin_count >= 8 {
            0xFF
        } else {
            (1u8 << self.pin_count) - 1
        }
    }
}

// Ports A-G sit in the I/O space (0x20 offset), H-L in extended I/O.
const PORT_REGS: [PortRegs; 11] = [
    PortRegs::at(0x20, 8),  // A
    PortRegs::at(0x23, 8),  // B
    PortRegs::at(0x26, 8),  // C
    PortRegs::at(0x29, 8),  // D
    PortRegs::at(0x2C, 8),  // E
    PortRegs::at(0x2F, 8),  // F
    PortRegs::at(0x32, 6),  // G
    PortRegs::at(0x100, 8), // H
    PortRegs::at(0x103, 8), // J
    PortRegs::at(0x106, 8), // K
    PortRegs::at(0x109, 8), // L
];

/// Register addresses for `port`.
#[inline]
pub const fn port_regs(port: Port) -> PortRegs {
    PORT_REGS[port.index()]
}
