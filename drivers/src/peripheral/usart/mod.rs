//! AVR USART driver, interrupt driven.
//!
//! Each port owns a transmit and a receive [`RingBuffer`]. The foreground
//! fills the Tx ring and drains the Rx ring; the interrupt handlers do
//! the opposite, one byte per interrupt.
//!
//! # Sharing with the ISRs
//!
//! Each ring has exactly one ISR on the other side:
//!
//! - Tx ring: data-register-empty (UDRE) handler
//! - Rx ring: receive-complete (RXC) handler
//!
//! Foreground code only mutates a ring while that ring's interrupt source
//! is disabled in UCSRnB, so the other direction keeps running. Counters
//! are sampled inside a short global mask window ([`IrqControl::free`]).
//! The scheme assumes a single core.
//!
//! # Example
//!
//! ```ignore
//! use drivers::hal::bus::Mmio;
//! use drivers::hal::serial::SerialConfig;
//! use drivers::peripheral::usart::SerialPort;
//! use drivers::hw::mcu::usart::usart_regs;
//! use common::arch::TargetIrq;
//!
//! static UART0: SerialPort<Mmio, TargetIrq> =
//!     SerialPort::new(unsafe { Mmio::new() }, usart_regs(0).unwrap());
//!
//! UART0.open(SerialConfig::new_8n1(9600))?;
//! UART0.write(b"AT\r\n")?;
//! ```

pub mod ring;

use core::marker::PhantomData;
use core::sync::atomic::{Ordering, compiler_fence};

use common::sync::{IrqControl, IsrCell};

use crate::hal::bus::RegisterBus;
use crate::hal::serial::{SerialConfig, SerialError};
use crate::hw::mcu::cpu::F_CPU;
use crate::hw::mcu::usart::{
    UBRRH_MASK, UCSRB_RXCIE, UCSRB_RXEN, UCSRB_TXCIE, UCSRB_TXEN, UCSRB_UDRIE, UCSRC_MODE_ASYNC,
    UsartRegs, frame_bits, parity_bits, stop_bits,
};
pub use ring::RingBuffer;

/// Default capacity of each ring, in bytes.
pub const SERIAL_BUFFER_LEN: usize = 128;

/// Baud rates accepted by [`SerialPort::open`].
pub const SUPPORTED_BAUD_RATES: [u32; 5] = [9600, 19200, 38400, 57600, 115200];

struct LineState {
    open: bool,
    config: SerialConfig,
    ubrr: u16,
    real_baud: u32,
}

struct RxState<const N: usize> {
    ring: RingBuffer<N>,
    overflow: u32,
}

/// One USART with its buffers.
pub struct SerialPort<B: RegisterBus, I: IrqControl, const N: usize = SERIAL_BUFFER_LEN> {
    bus: B,
    regs: UsartRegs,
    line: IsrCell<LineState>,
    tx: IsrCell<RingBuffer<N>>,
    rx: IsrCell<RxState<N>>,
    _irq: PhantomData<fn() -> I>,
}

impl<B: RegisterBus, I: IrqControl, const N: usize> SerialPort<B, I, N> {
    /// Create a closed port on the USART at `regs`.
    pub const fn new(bus: B, regs: UsartRegs) -> Self {
        Self {
            bus,
            regs,
            line: IsrCell::new(LineState {
                open: false,
                config: SerialConfig::new_8n1(9600),
                ubrr: 0,
                real_baud: 0,
            }),
            tx: IsrCell::new(RingBuffer::new()),
            rx: IsrCell::new(RxState {
                ring: RingBuffer::new(),
                overflow: 0,
            }),
            _irq: PhantomData,
        }
    }

    /// Divisor for `baud`: F_CPU / 16 / baud - 1.
    fn divisor(baud: u32) -> Option<u16> {
        let ubrr = (F_CPU / 16).checked_div(baud)?.checked_sub(1)?;
        u16::try_from(ubrr).ok().filter(|&ubrr| ubrr <= 0x0FFF)
    }

    fn real_rate(ubrr: u16) -> u32 {
        F_CPU / (16 * (ubrr as u32 + 1))
    }

    /// Baud rate the hardware would actually produce for `baud`.
    /// Touches no state.
    pub fn achievable_baud(baud: u32) -> Option<u32> {
        Self::divisor(baud).map(Self::real_rate)
    }

    pub fn regs(&self) -> &UsartRegs {
        &self.regs
    }

    pub fn is_open(&self) -> bool {
        // SAFETY: `open` is only written by the foreground.
        unsafe { self.line.get() }.open
    }

    /// Configuration of the last successful `open`.
    pub fn config(&self) -> SerialConfig {
        // SAFETY: line state is only written by the foreground.
        unsafe { self.line.get() }.config
    }

    /// Last programmed UBRR value.
    pub fn divisor_value(&self) -> u16 {
        // SAFETY: as in `config`.
        unsafe { self.line.get() }.ubrr
    }

    /// Baud rate produced by the last programmed divisor.
    pub fn real_baud(&self) -> u32 {
        // SAFETY: as in `config`.
        unsafe { self.line.get() }.real_baud
    }

    /// Program the USART and start receiving.
    pub fn open(&self, config: SerialConfig) -> Result<(), SerialError> {
        if self.is_open() {
            return Err(SerialError::Busy);
        }
        if !SUPPORTED_BAUD_RATES.contains(&config.baud_rate) {
            return Err(SerialError::UnsupportedBaud);
        }
        let ubrr = Self::divisor(config.baud_rate).ok_or(SerialError::UnsupportedBaud)?;
        let (ucsrc_frame, ucsrb_frame) = frame_bits(config.data_bits);

        self.bus
            .write(self.regs.ubrrh, ((ubrr >> 8) as u8) & UBRRH_MASK);
        self.bus.write(self.regs.ubrrl, ubrr as u8);
        self.bus.write(self.regs.ucsra, 0);
        self.bus.write(
            self.regs.ucsrc,
            UCSRC_MODE_ASYNC | parity_bits(config.parity) | stop_bits(config.stop_bits) | ucsrc_frame,
        );
        self.bus
            .write(self.regs.ucsrb, UCSRB_RXEN | UCSRB_TXEN | ucsrb_frame);

        // SAFETY: both interrupt sources are off after the UCSRB write.
        unsafe {
            let line = self.line.get_mut();
            line.config = config;
            line.ubrr = ubrr;
            line.real_baud = Self::real_rate(ubrr);
            self.tx.get_mut().clear();
            self.rx.get_mut().ring.clear();
            line.open = true;
        }

        self.enable(UCSRB_RXCIE);
        Ok(())
    }

    /// Stop both interrupt sources and the USART. Queued bytes are dropped.
    pub fn close(&self) -> Result<(), SerialError> {
        if !self.is_open() {
            return Err(SerialError::NotOpen);
        }
        I::free(|| {
            self.bus
                .clear_bits(self.regs.ucsrb, UCSRB_RXCIE | UCSRB_UDRIE);
            self.bus.write(self.regs.ucsrb, 0);
            // SAFETY: interrupts are masked.
            unsafe {
                self.line.get_mut().open = false;
                self.tx.get_mut().clear();
                self.rx.get_mut().ring.clear();
            }
        });
        Ok(())
    }

    /// Discard everything queued in both directions.
    pub fn reset(&self) {
        let open = self.is_open();
        if open {
            self.disable(UCSRB_UDRIE | UCSRB_RXCIE);
        }
        // SAFETY: both sources are masked, or the port is closed and the
        // ISRs ignore the rings.
        unsafe {
            self.tx.get_mut().clear();
            self.rx.get_mut().ring.clear();
        }
        if open {
            self.enable(UCSRB_RXCIE);
        }
    }

    /// Queue bytes for transmission. Returns how many were accepted;
    /// fewer than `bytes.len()` when the Tx ring fills up.
    pub fn write(&self, bytes: &[u8]) -> Result<usize, SerialError> {
        if !self.is_open() {
            return Err(SerialError::NotOpen);
        }
        self.disable(UCSRB_UDRIE);
        // SAFETY: UDRE is masked; the Tx ring is ours.
        let tx = unsafe { self.tx.get_mut() };
        let accepted = tx.write_from(bytes);
        if !tx.is_empty() {
            self.enable(UCSRB_UDRIE);
        }
        Ok(accepted)
    }

    /// Copy received bytes into `buf`. Returns how many were copied.
    pub fn read(&self, buf: &mut [u8]) -> Result<usize, SerialError> {
        if !self.is_open() {
            return Err(SerialError::NotOpen);
        }
        self.disable(UCSRB_RXCIE);
        // SAFETY: RXC is masked; the Rx ring is ours.
        let copied = unsafe { self.rx.get_mut() }.ring.read_into(buf);
        self.enable(UCSRB_RXCIE);
        Ok(copied)
    }

    /// Bytes waiting in the Rx ring.
    pub fn readable(&self) -> Result<usize, SerialError> {
        if !self.is_open() {
            return Err(SerialError::NotOpen);
        }
        Ok(I::free(|| unsafe { self.rx.get() }.ring.used()))
    }

    /// Free space in the Tx ring.
    pub fn writable(&self) -> Result<usize, SerialError> {
        if !self.is_open() {
            return Err(SerialError::NotOpen);
        }
        Ok(I::free(|| unsafe { self.tx.get() }.free()))
    }

    /// Bytes dropped because the Rx ring was full.
    pub fn overflow_count(&self) -> u32 {
        I::free(|| unsafe { self.rx.get() }.overflow)
    }

    /// Receive-complete handler.
    ///
    /// Always reads UDR to clear the interrupt; the byte is dropped when
    /// the port is closed or the Rx ring is full.
    pub fn on_rx_complete(&self) {
        let byte = self.bus.read(self.regs.udr);
        if !self.is_open() {
            return;
        }
        // SAFETY: running as the RXC handler.
        let rx = unsafe { self.rx.get_mut() };
        if !rx.ring.push(byte) {
            rx.overflow = rx.overflow.wrapping_add(1);
        }
    }

    /// Data-register-empty handler: send one byte, or switch itself off.
    pub fn on_data_register_empty(&self) {
        // SAFETY: running as the UDRE handler.
        let next = if self.is_open() {
            unsafe { self.tx.get_mut() }.pop()
        } else {
            None
        };
        match next {
            Some(byte) => self.bus.write(self.regs.udr, byte),
            None => self.disable(UCSRB_UDRIE),
        }
    }

    /// Transmit-complete handler.
    pub fn on_tx_complete(&self) {
        self.disable(UCSRB_TXCIE);
    }

    /// Unmask `mask` in UCSRB. Ring accesses before the call stay before
    /// the register write.
    fn enable(&self, mask: u8) {
        compiler_fence(Ordering::SeqCst);
        I::free(|| self.bus.set_bits(self.regs.ucsrb, mask));
    }

    /// Mask `mask` in UCSRB. Ring accesses after the call stay after the
    /// register write.
    fn disable(&self, mask: u8) {
        I::free(|| self.bus.clear_bits(self.regs.ucsrb, mask));
        compiler_fence(Ordering::SeqCst);
    }
}
