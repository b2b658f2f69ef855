pub mod irq;
pub use irq::AvrIrq;
