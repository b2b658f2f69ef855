pub mod irq;
pub mod isr_cell;
pub use irq::{IrqControl, NoIrq};
pub use isr_cell::IsrCell;
