use crate::hal::serial::{DataBits, Parity, StopBits};

/// Number of USARTs on the die.
pub const USART_COUNT: usize = 4;

const USART_BASES: [usize; USART_COUNT] = [0xC0, 0xC8, 0xD0, 0x130];

// Register offsets from a USART base
const UCSRA_OFFSET: usize = 0;
const UCSRB_OFFSET: usize = 1;
const UCSRC_OFFSET: usize = 2;
const UBRRL_OFFSET: usize = 4;
const UBRRH_OFFSET: usize = 5;
const UDR_OFFSET: usize = 6;

// UCSRnB bits
pub const UCSRB_RXCIE: u8 = 1 << 7;
pub const UCSRB_TXCIE: u8 = 1 << 6;
pub const UCSRB_UDRIE: u8 = 1 << 5;
pub const UCSRB_RXEN: u8 = 1 << 4;
pub const UCSRB_TXEN: u8 = 1 << 3;
pub const UCSRB_UCSZ2: u8 = 1 << 2;

// UCSRnC bits
pub const UCSRC_MODE_ASYNC: u8 = 0x00;
pub const UCSRC_PARITY_EVEN: u8 = 0x20;
pub const UCSRC_PARITY_ODD: u8 = 0x30;
pub const UCSRC_STOP_2: u8 = 0x08;

/// Upper four bits of UBRRnH must be written as zero.
pub const UBRRH_MASK: u8 = 0x0F;

/// Data-space addresses of one USART's registers.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UsartRegs {
    pub ucsra: usize,
    pub ucsrb: usize,
    pub ucsrc: usize,
    pub ubrrl: usize,
    pub ubrrh: usize,
    pub udr: usize,
}

impl UsartRegs {
    const fn at(base: usize) -> Self {
        Self {
            ucsra: base + UCSRA_OFFSET,
            ucsrb: base + UCSRB_OFFSET,
            ucsrc: base + UCSRC_OFFSET,
            ubrrl: base + UBRRL_OFFSET,
            ubrrh: base + UBRRH_OFFSET,
            udr: base + UDR_OFFSET,
        }
    }
}

/// Register addresses of USART `index`, if the die has one.
pub const fn usart_regs(index: u8) -> Option<UsartRegs> {
    if (index as usize) < USART_COUNT {
        Some(UsartRegs::at(USART_BASES[index as usize]))
    } else {
        None
    }
}

/// Whether USART `index` is compiled into this build.
pub const fn usart_enabled(index: u8) -> bool {
    match index {
        0 => cfg!(feature = "uart0"),
        1 => cfg!(feature = "uart1"),
        2 => cfg!(feature = "uart2"),
        3 => cfg!(feature = "uart3"),
        _ => false,
    }
}

/// Interrupt vector numbers of one USART.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct UsartVectors {
    /// Receive complete.
    pub rx: u8,
    /// Data register empty.
    pub udre: u8,
    /// Transmit complete.
    pub tx: u8,
}

/// Vector numbers, indexed by USART.
pub const USART_VECTORS: [UsartVectors; USART_COUNT] = [
    UsartVectors { rx: 25, udre: 26, tx: 27 },
    UsartVectors { rx: 36, udre: 37, tx: 38 },
    UsartVectors { rx: 51, udre: 52, tx: 53 },
    UsartVectors { rx: 54, udre: 55, tx: 56 },
];

/// Character-size encoding: (UCSRnC bits, UCSRnB bits).
pub const fn frame_bits(bits: DataBits) -> (u8, u8) {
    match bits {
        DataBits::Five => (0x00, 0x00),
        DataBits::Six => (0x02, 0x00),
        DataBits::Seven => (0x04, 0x00),
        DataBits::Eight => (0x06, 0x00),
        DataBits::Nine => (0x06, UCSRB_UCSZ2),
    }
}

pub const fn parity_bits(parity: Parity) -> u8 {
    match parity {
        Parity::None => 0x00,
        Parity::Even => UCSRC_PARITY_EVEN,
        Parity::Odd => UCSRC_PARITY_ODD,
    }
}

pub const fn stop_bits(stop: StopBits) -> u8 {
    match stop {
        StopBits::One => 0x00,
        StopBits::Two => UCSRC_STOP_2,
    }
}
