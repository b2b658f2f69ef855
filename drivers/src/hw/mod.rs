//! MCU register maps.
//!
//! Exactly one MCU is selected through Cargo features and re-exported as
//! [`mcu`]. The host simulation of the same register file lives in
//! [`sim`].

cfg_if::cfg_if! {
    if #[cfg(feature = "atmega2560")] {
        pub mod atmega2560;
        pub use atmega2560 as mcu;
    } else {
        compile_error!(
            "No MCU selected!\n\
            Use: cargo build --features atmega2560"
        );
    }
}

#[cfg(any(test, feature = "sim"))]
pub mod sim;
