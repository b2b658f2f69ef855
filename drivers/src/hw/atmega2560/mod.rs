pub mod cpu;
pub mod gpio;
pub mod usart;
