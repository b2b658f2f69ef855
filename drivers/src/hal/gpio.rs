//! GPIO (General Purpose Input/Output) types.
//!
//! The integer encodings of [`Port`] and [`PinMode`] are the ones used by
//! the raw, byte-oriented front-panel API; `TryFrom<u8>` converts them.

use crate::gpio::GpioError;

/// Pin logic level.
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PinLevel {
    /// Logic low (ground).
    #[default]
    Low,
    /// Logic high (VCC).
    High,
}

impl From<bool> for PinLevel {
    fn from(value: bool) -> Self {
        if value {
            PinLevel::High
        } else {
            PinLevel::Low
        }
    }
}

impl From<PinLevel> for bool {
    fn from(level: PinLevel) -> bool {
        matches!(level, PinLevel::High)
    }
}

impl From<PinLevel> for u8 {
    fn from(level: PinLevel) -> u8 {
        level as u8
    }
}

/// Direction and initial level requested for a pin or a whole port.
#[repr(u8)]
#[derive(Debug, Copy, Clone, Default, PartialEq, Eq)]
pub enum PinMode {
    /// Lock the pin for a non-GPIO function (SPI, USART, ...) without
    /// touching any register.
    #[default]
    Unchanged = 0,
    /// Input, high impedance.
    InputTriState = 1,
    /// Input with the internal pull-up enabled.
    InputPullUp = 2,
    /// Output driven low.
    OutputLow = 3,
    /// Output driven high.
    OutputHigh = 4,
}

impl PinMode {
    /// `true` for both output modes.
    pub const fn is_output(self) -> bool {
        matches!(self, PinMode::OutputLow | PinMode::OutputHigh)
    }

    /// `true` only for [`PinMode::InputPullUp`].
    pub const fn is_pull_up(self) -> bool {
        matches!(self, PinMode::InputPullUp)
    }
}

impl TryFrom<u8> for PinMode {
    type Error = GpioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        match value {
            0 => Ok(PinMode::Unchanged),
            1 => Ok(PinMode::InputTriState),
            2 => Ok(PinMode::InputPullUp),
            3 => Ok(PinMode::OutputLow),
            4 => Ok(PinMode::OutputHigh),
            _ => Err(GpioError::InvalidMode),
        }
    }
}

/// The I/O ports of the MCU. There is no port I.
#[repr(u8)]
#[derive(Debug, Copy, Clone, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Port {
    A = 0,
    B = 1,
    C = 2,
    D = 3,
    E = 4,
    F = 5,
    G = 6,
    H = 7,
    J = 8,
    K = 9,
    L = 10,
}

/// Number of ports in [`Port`].
pub const PORT_COUNT: usize = 11;

/// Maximum number of pins on one port.
pub const PINS_PER_PORT: u8 = 8;

impl Port {
    /// Every port, in index order.
    pub const ALL: [Port; PORT_COUNT] = [
        Port::A,
        Port::B,
        Port::C,
        Port::D,
        Port::E,
        Port::F,
        Port::G,
        Port::H,
        Port::J,
        Port::K,
        Port::L,
    ];

    #[inline]
    pub const fn index(self) -> usize {
        self as usize
    }
}

impl TryFrom<u8> for Port {
    type Error = GpioError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        Port::ALL
            .get(value as usize)
            .copied()
            .ok_or(GpioError::InvalidPort)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn raw_port_numbers_skip_i() {
        assert_eq!(Port::try_from(7), Ok(Port::H));
        assert_eq!(Port::try_from(8), Ok(Port::J));
        assert_eq!(Port::try_from(PORT_COUNT as u8), Err(GpioError::InvalidPort));
    }

    #[test]
    fn raw_modes() {
        assert_eq!(PinMode::try_from(2), Ok(PinMode::InputPullUp));
        assert!(PinMode::try_from(4).unwrap().is_output());
        assert_eq!(PinMode::try_from(5), Err(GpioError::InvalidMode));
    }

    #[test]
    fn level_conversions() {
        assert_eq!(PinLevel::from(true), PinLevel::High);
        assert_eq!(u8::from(PinLevel::High), 1);
        assert!(!bool::from(PinLevel::default()));
    }
}
