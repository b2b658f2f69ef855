cfg_if::cfg_if! {
    if #[cfg(target_arch = "avr")] {
        pub mod avr;
        pub use avr::AvrIrq as TargetIrq;
    } else {
        pub use crate::sync::NoIrq as TargetIrq;
    }
}
