//! GPIO manager scenarios driven through `System`.

use drivers::gpio::GpioError;
use drivers::hal::gpio::{PinMode, Port};
use drivers::hw::mcu::gpio::port_regs;
use drivers::hw::sim::SimBus;
use panel::System;

#[test]
fn keyboard_columns_and_led_segments_share_a_port() {
    let bus = SimBus::new();
    let mut system = System::new(&bus);
    system.init();
    let gpio = &mut system.gpio;
    let regs = port_regs(Port::F);

    let cols: Vec<_> = (0..4)
        .map(|pin| gpio.register_pin(Port::F, pin, PinMode::InputPullUp).unwrap())
        .collect();
    let seg = gpio.register_pin(Port::F, 7, PinMode::OutputLow).unwrap();
    assert_eq!(bus.peek(regs.ddr), 0x80);
    assert_eq!(bus.peek(regs.port), 0x0F);

    gpio.write(seg, 1).unwrap();
    assert_eq!(bus.peek(regs.port), 0x8F);

    bus.set_external(Port::F, 0x0D);
    assert_eq!(gpio.read(cols[1]), Ok(0));
    assert_eq!(gpio.read(cols[2]), Ok(1));

    assert_eq!(
        gpio.register_port(Port::F, 0, PinMode::OutputLow),
        Err(GpioError::Locked)
    );
}

#[test]
fn whole_port_bus_round_trip() {
    let bus = SimBus::new();
    let mut system = System::new(&bus);
    system.init();
    let gpio = &mut system.gpio;

    let data = gpio.register_port(Port::A, 0x00, PinMode::OutputLow).unwrap();
    gpio.write(data, 0xA5).unwrap();
    assert_eq!(gpio.read(data), Ok(0xA5));

    gpio.change_direction(data, PinMode::InputTriState).unwrap();
    bus.set_external(Port::A, 0x3C);
    assert_eq!(gpio.read(data), Ok(0x3C));
    assert_eq!(gpio.toggle(data), Ok(()));
    assert_eq!(bus.peek(port_regs(Port::A).port), 0x00);
}
