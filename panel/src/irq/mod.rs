//! Interrupt vector decoding and dispatch.
//!
//! The MCU vector table calls [`dispatch`] with the vector number; only
//! the USART vectors are routed, everything else is reported as
//! unhandled.

use common::sync::IrqControl;
use drivers::hal::bus::RegisterBus;
use drivers::hw::mcu::usart::{USART_COUNT, USART_VECTORS};

use crate::dev::uart::UartDriver;

/// Which USART interrupt fired.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum UsartEvent {
    RxComplete,
    DataRegisterEmpty,
    TxComplete,
}

/// A decoded USART vector.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Vector {
    pub usart: u8,
    pub event: UsartEvent,
}

impl Vector {
    /// Decode a hardware vector number.
    pub fn from_number(number: u8) -> Option<Self> {
        USART_VECTORS
            .iter()
            .enumerate()
            .find_map(|(usart, vectors)| {
                let event = if number == vectors.rx {
                    UsartEvent::RxComplete
                } else if number == vectors.udre {
                    UsartEvent::DataRegisterEmpty
                } else if number == vectors.tx {
                    UsartEvent::TxComplete
                } else {
                    return None;
                };
                Some(Vector {
                    usart: usart as u8,
                    event,
                })
            })
    }

    /// Hardware vector number.
    pub fn number(self) -> Option<u8> {
        if self.usart as usize >= USART_COUNT {
            return None;
        }
        let vectors = USART_VECTORS[self.usart as usize];
        Some(match self.event {
            UsartEvent::RxComplete => vectors.rx,
            UsartEvent::DataRegisterEmpty => vectors.udre,
            UsartEvent::TxComplete => vectors.tx,
        })
    }
}

/// Route vector `number` to its handler.
///
/// Returns `false` for vectors nobody handles. Runs in interrupt context:
/// no logging, no allocation.
pub fn dispatch<B, I>(uart: &UartDriver<B, I>, number: u8) -> bool
where
    B: RegisterBus + Copy,
    I: IrqControl,
{
    match Vector::from_number(number) {
        Some(vector) => uart.on_interrupt(vector),
        None => false,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn usart_vectors_decode() {
        assert_eq!(
            Vector::from_number(25),
            Some(Vector {
                usart: 0,
                event: UsartEvent::RxComplete
            })
        );
        assert_eq!(
            Vector::from_number(37),
            Some(Vector {
                usart: 1,
                event: UsartEvent::DataRegisterEmpty
            })
        );
        assert_eq!(
            Vector::from_number(56),
            Some(Vector {
                usart: 3,
                event: UsartEvent::TxComplete
            })
        );
        assert_eq!(Vector::from_number(24), None);
    }

    #[test]
    fn number_inverts_decode() {
        for number in [25u8, 26, 27, 36, 37, 38, 51, 52, 53, 54, 55, 56] {
            let vector = Vector::from_number(number).unwrap();
            assert_eq!(vector.number(), Some(number));
        }
    }
}
