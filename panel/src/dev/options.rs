//! Device-name parsing.
//!
//! The part of a device name after the class prefix is
//! `<minor>[,opt1[,opt2...]]`. Every field must be non-empty; a trailing
//! comma is an empty field.

use drivers::hal::serial::{DataBits, Parity, SerialConfig, StopBits};

use super::{DevError, Minor};

/// Options following the minor number.
#[derive(Debug, Clone)]
pub struct Options<'n> {
    rest: Option<&'n str>,
}

impl<'n> Options<'n> {
    pub fn is_empty(&self) -> bool {
        self.rest.is_none()
    }
}

impl<'n> Iterator for Options<'n> {
    type Item = &'n str;

    fn next(&mut self) -> Option<&'n str> {
        let rest = self.rest?;
        match rest.split_once(',') {
            Some((field, tail)) => {
                self.rest = Some(tail);
                Some(field)
            }
            None => {
                self.rest = None;
                Some(rest)
            }
        }
    }
}

/// Split `name` into its minor number and the option fields.
pub fn split_minor(name: &str) -> Result<(Minor, Options<'_>), DevError> {
    let (minor, rest) = match name.split_once(',') {
        Some((minor, rest)) => (minor, Some(rest)),
        None => (name, None),
    };
    Ok((parse_number(minor)?, Options { rest }))
}

fn parse_number<T: core::str::FromStr>(field: &str) -> Result<T, DevError> {
    if field.is_empty() || !field.bytes().all(|b| b.is_ascii_digit()) {
        return Err(DevError::InvalidArgument);
    }
    field.parse().map_err(|_| DevError::InvalidArgument)
}

/// Parse `baud,frameBits,parity,stopBits`; omitted trailing fields keep
/// the 9600 8N1 defaults. Nothing is applied unless every field parses.
pub fn parse_serial_options(options: Options<'_>) -> Result<SerialConfig, DevError> {
    let mut config = SerialConfig::default();
    for (index, field) in options.enumerate() {
        match index {
            0 => config.baud_rate = parse_number(field)?,
            1 => config.data_bits = DataBits::try_from(parse_number::<u8>(field)?)?,
            2 => config.parity = parse_parity(field)?,
            3 => config.stop_bits = StopBits::try_from(parse_number::<u8>(field)?)?,
            _ => return Err(DevError::InvalidArgument),
        }
    }
    Ok(config)
}

fn parse_parity(field: &str) -> Result<Parity, DevError> {
    match field {
        "N" | "n" => Ok(Parity::None),
        "E" | "e" => Ok(Parity::Even),
        "O" | "o" => Ok(Parity::Odd),
        _ => Err(DevError::InvalidArgument),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn serial(name: &str) -> Result<(Minor, SerialConfig), DevError> {
        let (minor, options) = split_minor(name)?;
        Ok((minor, parse_serial_options(options)?))
    }

    #[test]
    fn bare_minor_uses_defaults() {
        assert_eq!(serial("1"), Ok((1, SerialConfig::default())));
    }

    #[test]
    fn full_option_list() {
        let (minor, config) = serial("0,115200,7,e,2").unwrap();
        assert_eq!(minor, 0);
        assert_eq!(
            config,
            SerialConfig {
                baud_rate: 115200,
                data_bits: DataBits::Seven,
                parity: Parity::Even,
                stop_bits: StopBits::Two,
            }
        );
    }

    #[test]
    fn trailing_fields_may_be_omitted() {
        let (_, config) = serial("1,19200,8").unwrap();
        assert_eq!(config.baud_rate, 19200);
        assert_eq!(config.parity, Parity::None);
        assert_eq!(config.stop_bits, StopBits::One);
    }

    #[test]
    fn malformed_fields_are_rejected() {
        for name in [
            "",
            "x",
            "1,",
            "1,9600,",
            "1,9600,10",
            "1,9600,8,",
            "1,9600,8,Q",
            "1,9600,8,N,",
            "1,9600,5,E,3",
            "1,9600,8,N,1,extra",
            "1,-9600",
            "300",
        ] {
            assert_eq!(serial(name), Err(DevError::InvalidArgument), "{name:?}");
        }
    }
}
