//! GPIO resource manager.
//!
//! Hands out exclusive registrations for single pins or whole 8-bit ports
//! and performs every GPIO register access on their behalf. A pin that
//! belongs to a registration cannot be registered again, alone or as part
//! of its port, so two subsystems can never drive the same wire.
//!
//! Non-GPIO users (SPI, USART, ...) register with [`PinMode::Unchanged`]
//! to lock their pins without touching the registers.
//!
//! # Register model
//!
//! Each port has three registers: `PIN` (input, write-1-to-toggle),
//! `DDR` (direction, 1 = output) and `PORT` (output latch; on inputs it
//! enables the pull-up). The manager keeps two masks per port:
//!
//! - output mask: bit set ⇔ the pin is in an output mode
//! - pull-up mask: bit set ⇔ the pin is an input with pull-up
//!
//! Writes are composed so that pins owned by other registrations keep
//! their output level and pulled-up inputs keep their pull-up.

use core::fmt;

use crate::hal::bus::RegisterBus;
use crate::hal::gpio::{PINS_PER_PORT, PORT_COUNT, PinLevel, PinMode, Port};
use crate::hw::mcu::cpu::{MCUCR, MCUCR_PUD};
use crate::hw::mcu::gpio::{PortRegs, port_regs};

/// Maximum number of registrations over the manager's lifetime.
pub const MAX_GPIO_RSVD: usize = 40;

/// GPIO errors.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum GpioError {
    /// `init()` has not been called.
    NotInitialized,
    /// Port number out of range.
    InvalidPort,
    /// Pin number out of range, or the pin is not bonded out.
    InvalidPin,
    /// Unknown pin mode.
    InvalidMode,
    /// Every registration slot has been handed out.
    TableFull,
    /// The pin, or a pin of the port, is already registered.
    Locked,
    /// The handle was never issued.
    BadHandle,
}

impl fmt::Display for GpioError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            GpioError::NotInitialized => write!(f, "gpio manager not initialized"),
            GpioError::InvalidPort => write!(f, "invalid port"),
            GpioError::InvalidPin => write!(f, "invalid pin"),
            GpioError::InvalidMode => write!(f, "invalid pin mode"),
            GpioError::TableFull => write!(f, "gpio registration table full"),
            GpioError::Locked => write!(f, "pin already registered"),
            GpioError::BadHandle => write!(f, "bad gpio handle"),
        }
    }
}

/// Registration handle. Never 0; never reused.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct GpioHandle(u16);

impl GpioHandle {
    /// Rebuild a handle from its raw number. The manager validates it on use.
    pub const fn from_raw(raw: u16) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u16 {
        self.0
    }
}

#[derive(Debug, Copy, Clone)]
struct PinSlot {
    exists: bool,
    locked: bool,
    mode: PinMode,
    state: PinLevel,
}

impl PinSlot {
    const ABSENT: PinSlot = PinSlot {
        exists: false,
        locked: false,
        mode: PinMode::Unchanged,
        state: PinLevel::Low,
    };
}

#[derive(Debug, Copy, Clone)]
struct PortRecord {
    pins: [PinSlot; PINS_PER_PORT as usize],
    regs: PortRegs,
    output_mask: u8,
    pullup_mask: u8,
}

impl PortRecord {
    const DETACHED: PortRecord = PortRecord {
        pins: [PinSlot::ABSENT; PINS_PER_PORT as usize],
        regs: PortRegs::DETACHED,
        output_mask: 0,
        pullup_mask: 0,
    };

    fn attach(port: Port) -> Self {
        let regs = port_regs(port);
        let mut record = Self::DETACHED;
        record.regs = regs;
        for slot in record.pins.iter_mut().take(regs.pin_count as usize) {
            slot.exists = true;
        }
        record
    }

    /// Update the masks for the bits in `bits` switching to `mode`.
    fn track(&mut self, bits: u8, mode: PinMode) {
        if mode.is_output() {
            self.output_mask |= bits;
        } else {
            self.output_mask &= !bits;
        }
        if mode.is_pull_up() {
            self.pullup_mask |= bits;
        } else {
            self.pullup_mask &= !bits;
        }
    }
}

#[derive(Debug, Copy, Clone)]
enum Target {
    Pin(u8),
    Port,
}

#[derive(Debug, Copy, Clone)]
struct Registration {
    port: Port,
    target: Target,
    /// Whole-port registrations: last value read or written.
    port_state: u8,
}

/// Owner of every GPIO pin and port register.
pub struct GpioManager<B: RegisterBus> {
    bus: B,
    ports: [PortRecord; PORT_COUNT],
    registrations: [Option<Registration>; MAX_GPIO_RSVD],
    next_handle: u16,
    initialized: bool,
}

impl<B: RegisterBus> GpioManager<B> {
    /// Create an uninitialized manager. Every operation but
    /// [`init`](Self::init) fails with [`GpioError::NotInitialized`].
    pub const fn new(bus: B) -> Self {
        Self {
            bus,
            ports: [PortRecord::DETACHED; PORT_COUNT],
            registrations: [None; MAX_GPIO_RSVD],
            next_handle: 1,
            initialized: false,
        }
    }

    /// Reset all bookkeeping and attach every port's registers.
    ///
    /// Not idempotent: a second call forgets every registration. Callers
    /// check [`is_initialized`](Self::is_initialized) first.
    pub fn init(&mut self) {
        for port in Port::ALL {
            self.ports[port.index()] = PortRecord::attach(port);
        }
        self.registrations = [None; MAX_GPIO_RSVD];
        self.next_handle = 1;
        self.initialized = true;
        log::debug!("gpio: {} ports attached", PORT_COUNT);
    }

    pub fn is_initialized(&self) -> bool {
        self.initialized
    }

    pub fn bus(&self) -> &B {
        &self.bus
    }

    /// Globally enable or disable every pull-up (MCUCR.PUD).
    pub fn set_global_pullups(&mut self, enabled: bool) -> Result<(), GpioError> {
        self.ensure_initialized()?;
        if enabled {
            self.bus.clear_bits(MCUCR, MCUCR_PUD);
        } else {
            self.bus.set_bits(MCUCR, MCUCR_PUD);
        }
        Ok(())
    }

    /// Register a single pin and program its direction and initial level.
    pub fn register_pin(
        &mut self,
        port: Port,
        pin: u8,
        mode: PinMode,
    ) -> Result<GpioHandle, GpioError> {
        self.ensure_initialized()?;
        if pin >= PINS_PER_PORT {
            return Err(GpioError::InvalidPin);
        }
        self.ensure_capacity()?;

        let slot = self.ports[port.index()].pins[pin as usize];
        if !slot.exists {
            log::warn!("gpio: P{:?}{} does not exist", port, pin);
            return Err(GpioError::InvalidPin);
        }
        if slot.locked {
            log::warn!("gpio: P{:?}{} already registered", port, pin);
            return Err(GpioError::Locked);
        }

        let record = &mut self.ports[port.index()];
        record.pins[pin as usize].locked = true;
        record.pins[pin as usize].mode = mode;
        self.apply_pin_mode(port, pin, mode);

        let handle = self.allocate(Registration {
            port,
            target: Target::Pin(pin),
            port_state: 0,
        });
        log::debug!("gpio: P{:?}{} -> {:?} as {}", port, pin, mode, handle.0);
        Ok(handle)
    }

    /// Register all pins of a port. `preset` is the initial output byte
    /// and only applies to output modes.
    pub fn register_port(
        &mut self,
        port: Port,
        preset: u8,
        mode: PinMode,
    ) -> Result<GpioHandle, GpioError> {
        self.ensure_initialized()?;
        self.ensure_capacity()?;

        let record = &mut self.ports[port.index()];
        if record.pins.iter().any(|slot| slot.exists && slot.locked) {
            log::warn!("gpio: port {:?} has registered pins", port);
            return Err(GpioError::Locked);
        }
        for slot in record.pins.iter_mut().filter(|slot| slot.exists) {
            slot.locked = true;
            slot.mode = mode;
        }
        self.apply_port_mode(port, preset, mode);

        let handle = self.allocate(Registration {
            port,
            target: Target::Port,
            port_state: 0,
        });
        log::debug!("gpio: port {:?} -> {:?} as {}", port, mode, handle.0);
        Ok(handle)
    }

    /// Change the direction of a registered pin or port. A port switching
    /// to output drives its last read/written value.
    pub fn change_direction(&mut self, handle: GpioHandle, mode: PinMode) -> Result<(), GpioError> {
        let reg = self.lookup(handle)?;
        if mode == PinMode::Unchanged {
            return Ok(());
        }
        let record = &mut self.ports[reg.port.index()];
        match reg.target {
            Target::Pin(pin) => {
                record.pins[pin as usize].mode = mode;
                self.apply_pin_mode(reg.port, pin, mode);
            }
            Target::Port => {
                for slot in record.pins.iter_mut().filter(|slot| slot.exists) {
                    slot.mode = mode;
                }
                self.apply_port_mode(reg.port, reg.port_state, mode);
            }
        }
        Ok(())
    }

    /// Drive a pin (0 / non-zero) or a whole port (full byte).
    pub fn write(&mut self, handle: GpioHandle, value: u8) -> Result<(), GpioError> {
        let index = self.index_of(handle)?;
        let reg = self.lookup(handle)?;
        let record = &mut self.ports[reg.port.index()];
        let exist = record.regs.exist_mask();

        let (keep, bits) = match reg.target {
            Target::Pin(pin) => {
                let bit = 1u8 << pin;
                let level = PinLevel::from(value != 0);
                record.pins[pin as usize].state = level;
                (!bit, if value != 0 { bit } else { 0 })
            }
            Target::Port => (0, value & exist),
        };

        let previous = self.bus.read(record.regs.port);
        let composed = (previous & keep & record.output_mask) | bits | record.pullup_mask;
        self.bus.write(record.regs.port, composed);

        if let (Target::Port, Some(reg)) = (reg.target, self.registrations[index].as_mut()) {
            reg.port_state = bits;
        }
        Ok(())
    }

    /// Read a pin (0 or 1) or a port (masked to its existing pins).
    pub fn read(&mut self, handle: GpioHandle) -> Result<u8, GpioError> {
        let index = self.index_of(handle)?;
        let reg = self.lookup(handle)?;
        let record = &mut self.ports[reg.port.index()];
        let raw = self.bus.read(record.regs.pin);

        match reg.target {
            Target::Pin(pin) => {
                let level = PinLevel::from(raw & (1 << pin) != 0);
                record.pins[pin as usize].state = level;
                Ok(level.into())
            }
            Target::Port => {
                let value = raw & record.regs.exist_mask();
                if let Some(reg) = self.registrations[index].as_mut() {
                    reg.port_state = value;
                }
                Ok(value)
            }
        }
    }

    /// Toggle the owned outputs through the PIN register.
    ///
    /// Does nothing, successfully, unless every owned bit is an output.
    pub fn toggle(&mut self, handle: GpioHandle) -> Result<(), GpioError> {
        let reg = self.lookup(handle)?;
        let record = &self.ports[reg.port.index()];
        let mask = match reg.target {
            Target::Pin(pin) => 1u8 << pin,
            Target::Port => record.regs.exist_mask(),
        };
        if mask & record.output_mask == mask {
            self.bus.write(record.regs.pin, mask);
        }
        Ok(())
    }

    fn ensure_initialized(&self) -> Result<(), GpioError> {
        if self.initialized {
            Ok(())
        } else {
            Err(GpioError::NotInitialized)
        }
    }

    fn ensure_capacity(&self) -> Result<(), GpioError> {
        if (self.next_handle as usize) > MAX_GPIO_RSVD {
            log::warn!("gpio: registration table full");
            Err(GpioError::TableFull)
        } else {
            Ok(())
        }
    }

    fn allocate(&mut self, reg: Registration) -> GpioHandle {
        let handle = GpioHandle(self.next_handle);
        self.registrations[self.next_handle as usize - 1] = Some(reg);
        self.next_handle += 1;
        handle
    }

    fn index_of(&self, handle: GpioHandle) -> Result<usize, GpioError> {
        self.ensure_initialized()?;
        if handle.0 == 0 || handle.0 >= self.next_handle {
            return Err(GpioError::BadHandle);
        }
        Ok(handle.0 as usize - 1)
    }

    fn lookup(&self, handle: GpioHandle) -> Result<Registration, GpioError> {
        let index = self.index_of(handle)?;
        self.registrations[index].ok_or(GpioError::BadHandle)
    }

    fn apply_pin_mode(&mut self, port: Port, pin: u8, mode: PinMode) {
        let record = &mut self.ports[port.index()];
        let bit = 1u8 << pin;
        let regs = record.regs;
        match mode {
            PinMode::Unchanged => return,
            PinMode::InputTriState => {
                self.bus.clear_bits(regs.ddr, bit);
                self.bus.clear_bits(regs.port, bit);
            }
            PinMode::InputPullUp => {
                self.bus.clear_bits(regs.ddr, bit);
                self.bus.set_bits(regs.port, bit);
            }
            PinMode::OutputLow => {
                self.bus.set_bits(regs.ddr, bit);
                self.bus.clear_bits(regs.port, bit);
            }
            PinMode::OutputHigh => {
                self.bus.set_bits(regs.ddr, bit);
                self.bus.set_bits(regs.port, bit);
            }
        }
        record.track(bit, mode);
    }

    fn apply_port_mode(&mut self, port: Port, preset: u8, mode: PinMode) {
        let record = &mut self.ports[port.index()];
        let regs = record.regs;
        let exist = regs.exist_mask();
        let (ddr, latch) = match mode {
            PinMode::Unchanged => return,
            PinMode::InputTriState => (0x00, 0x00),
            PinMode::InputPullUp => (0x00, exist),
            PinMode::OutputLow | PinMode::OutputHigh => (exist, preset & exist),
        };
        self.bus.write(regs.ddr, ddr);
        self.bus.write(regs.port, latch);
        record.track(exist, mode);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::hw::sim::SimBus;

    fn manager(bus: &SimBus) -> GpioManager<&SimBus> {
        let mut gpio = GpioManager::new(bus);
        gpio.init();
        gpio
    }

    #[test]
    fn operations_fail_before_init() {
        let bus = SimBus::new();
        let mut gpio = GpioManager::new(&bus);
        assert!(!gpio.is_initialized());
        assert_eq!(
            gpio.register_pin(Port::A, 0, PinMode::OutputLow),
            Err(GpioError::NotInitialized)
        );
        assert_eq!(
            gpio.read(GpioHandle::from_raw(1)),
            Err(GpioError::NotInitialized)
        );
        assert_eq!(gpio.set_global_pullups(false), Err(GpioError::NotInitialized));
    }

    #[test]
    fn pin_registration_programs_ddr_and_port() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        let regs = port_regs(Port::A);

        let tri = gpio.register_pin(Port::A, 0, PinMode::InputTriState).unwrap();
        let pu = gpio.register_pin(Port::A, 1, PinMode::InputPullUp).unwrap();
        let lo = gpio.register_pin(Port::A, 4, PinMode::OutputLow).unwrap();
        let hi = gpio.register_pin(Port::A, 6, PinMode::OutputHigh).unwrap();
        assert_eq!([tri.raw(), pu.raw(), lo.raw(), hi.raw()], [1, 2, 3, 4]);
        assert_eq!(bus.peek(regs.ddr), 0x50);
        assert_eq!(bus.peek(regs.port), 0x42);

        let pa7 = gpio.register_pin(Port::A, 7, PinMode::OutputLow).unwrap();
        assert_eq!(bus.peek(regs.ddr), 0xD0);

        gpio.write(pa7, 1).unwrap();
        assert_eq!(bus.peek(regs.port), 0xC2);
        gpio.write(hi, 0).unwrap();
        assert_eq!(bus.peek(regs.port), 0x82);

        gpio.change_direction(pa7, PinMode::InputTriState).unwrap();
        assert_eq!(bus.peek(regs.ddr), 0x50);
        assert_eq!(bus.peek(regs.port), 0x02);

        gpio.change_direction(hi, PinMode::InputPullUp).unwrap();
        assert_eq!(bus.peek(regs.ddr), 0x10);
        assert_eq!(bus.peek(regs.port), 0x42);

        gpio.toggle(lo).unwrap();
        assert_eq!(bus.peek(regs.port), 0x52);
    }

    #[test]
    fn double_registration_keeps_first_lock() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        let first = gpio.register_pin(Port::D, 3, PinMode::OutputHigh).unwrap();
        assert_eq!(
            gpio.register_pin(Port::D, 3, PinMode::InputTriState),
            Err(GpioError::Locked)
        );
        assert_eq!(
            gpio.register_port(Port::D, 0, PinMode::OutputLow),
            Err(GpioError::Locked)
        );
        gpio.write(first, 0).unwrap();
        assert_eq!(bus.peek(port_regs(Port::D).port), 0x00);
    }

    #[test]
    fn missing_pins_are_rejected() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        assert_eq!(
            gpio.register_pin(Port::G, 6, PinMode::OutputLow),
            Err(GpioError::InvalidPin)
        );
        assert_eq!(
            gpio.register_pin(Port::A, 8, PinMode::OutputLow),
            Err(GpioError::InvalidPin)
        );
        assert_eq!(Port::try_from(11), Err(GpioError::InvalidPort));
        assert_eq!(PinMode::try_from(5), Err(GpioError::InvalidMode));
    }

    #[test]
    fn output_port_reads_back_written_value() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        let regs = port_regs(Port::B);

        let portb = gpio.register_port(Port::B, 0xAA, PinMode::OutputLow).unwrap();
        assert_eq!(bus.peek(regs.ddr), 0xFF);
        assert_eq!(bus.peek(regs.port), 0xAA);
        assert_eq!(gpio.read(portb), Ok(0xAA));

        gpio.write(portb, 0x15).unwrap();
        assert_eq!(bus.peek(regs.port), 0x15);
        gpio.write(portb, 0xA5).unwrap();
        assert_eq!(gpio.read(portb), Ok(0xA5));

        gpio.toggle(portb).unwrap();
        assert_eq!(bus.peek(regs.port), 0x5A);
    }

    #[test]
    fn port_registration_locks_every_pin() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);

        let portc = gpio.register_port(Port::C, 0, PinMode::OutputLow).unwrap();
        for pin in 0..PINS_PER_PORT {
            assert_eq!(
                gpio.register_pin(Port::C, pin, PinMode::InputPullUp),
                Err(GpioError::Locked)
            );
        }
        assert_eq!(
            gpio.register_port(Port::C, 0, PinMode::InputTriState),
            Err(GpioError::Locked)
        );
        assert_eq!(gpio.read(portc), Ok(0));
        assert!(gpio.register_pin(Port::D, 5, PinMode::OutputLow).is_ok());
    }

    #[test]
    fn port_toggle_with_inputs_is_a_noop() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        let regs = port_regs(Port::K);
        let portk = gpio.register_port(Port::K, 0, PinMode::InputPullUp).unwrap();
        assert_eq!(bus.peek(regs.port), 0xFF);

        assert_eq!(gpio.toggle(portk), Ok(()));
        assert_eq!(bus.peek(regs.port), 0xFF);
        assert_eq!(bus.peek(regs.ddr), 0x00);
    }

    #[test]
    fn port_g_reads_only_six_bits() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        bus.set_external(Port::G, 0xFF);
        let portg = gpio.register_port(Port::G, 0, PinMode::InputTriState).unwrap();
        assert_eq!(gpio.read(portg), Ok(0x3F));
    }

    #[test]
    fn port_switching_to_output_drives_last_value() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        let regs = port_regs(Port::L);
        bus.set_external(Port::L, 0x3C);
        let portl = gpio.register_port(Port::L, 0, PinMode::InputTriState).unwrap();
        assert_eq!(gpio.read(portl), Ok(0x3C));

        gpio.change_direction(portl, PinMode::OutputLow).unwrap();
        assert_eq!(bus.peek(regs.ddr), 0xFF);
        assert_eq!(bus.peek(regs.port), 0x3C);
    }

    #[test]
    fn pin_read_follows_external_level() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        let pin = gpio.register_pin(Port::J, 2, PinMode::InputTriState).unwrap();
        assert_eq!(gpio.read(pin), Ok(0));
        bus.set_external(Port::J, 0x04);
        assert_eq!(gpio.read(pin), Ok(1));
    }

    #[test]
    fn unchanged_mode_locks_without_touching_registers() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        let regs = port_regs(Port::B);
        bus.poke(regs.ddr, 0x07);
        gpio.register_pin(Port::B, 1, PinMode::Unchanged).unwrap();
        assert_eq!(bus.peek(regs.ddr), 0x07);
        assert_eq!(
            gpio.register_pin(Port::B, 1, PinMode::OutputLow),
            Err(GpioError::Locked)
        );
    }

    #[test]
    fn unknown_handles_are_rejected() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        assert_eq!(gpio.write(GpioHandle::from_raw(0), 1), Err(GpioError::BadHandle));
        assert_eq!(gpio.toggle(GpioHandle::from_raw(1)), Err(GpioError::BadHandle));
    }

    #[test]
    fn registration_table_is_bounded() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        let mut issued = 0;
        'outer: for port in Port::ALL {
            for pin in 0..PINS_PER_PORT {
                match gpio.register_pin(port, pin, PinMode::Unchanged) {
                    Ok(_) => issued += 1,
                    Err(GpioError::TableFull) => break 'outer,
                    Err(GpioError::InvalidPin) => continue,
                    Err(e) => panic!("unexpected error {e}"),
                }
            }
        }
        assert_eq!(issued, MAX_GPIO_RSVD);
    }

    #[test]
    fn global_pullup_control_drives_pud() {
        let bus = SimBus::new();
        let mut gpio = manager(&bus);
        gpio.set_global_pullups(false).unwrap();
        assert_eq!(bus.peek(MCUCR) & MCUCR_PUD, MCUCR_PUD);
        gpio.set_global_pullups(true).unwrap();
        assert_eq!(bus.peek(MCUCR) & MCUCR_PUD, 0);
    }
}
