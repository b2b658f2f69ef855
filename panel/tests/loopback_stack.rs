//! Framework tests against the loopback class.

use panel::dev::loopback::LOOPBACK_PREFIX;
use panel::{DevError, DevHandle, DriverRegistry, IoctlCmd, LoopbackDriver, OpenMode};

fn registry(lo: &LoopbackDriver) -> DriverRegistry<'_> {
    let mut registry = DriverRegistry::new();
    assert_eq!(registry.register_class(LOOPBACK_PREFIX, lo), Ok(0));
    assert_eq!(registry.driver_init(), 1);
    registry
}

#[test]
fn open_write_read_close() {
    let lo = LoopbackDriver::new();
    let mut devices = registry(&lo);

    let h = devices.open("/dev/loop/0", OpenMode::RDWR).unwrap();
    assert_ne!(h.raw(), 0);
    assert!(devices.lookup(h).is_some());

    assert_eq!(devices.write(h, b"hello"), Ok(5));
    let mut out = [0u8; 8];
    assert_eq!(lo.collect(0, &mut out), Ok(5));
    assert_eq!(&out[..5], b"hello");

    lo.inject(0, b"world").unwrap();
    assert_eq!(devices.ioctl(h, IoctlCmd::RxPeek), Ok(5));
    assert_eq!(devices.read(h, &mut out), Ok(5));
    assert_eq!(&out[..5], b"world");

    devices.close(h).unwrap();
    assert!(devices.lookup(h).is_none());
    assert!(!lo.is_open(0));
}

#[test]
fn handles_are_unique_and_not_reused() {
    let lo = LoopbackDriver::new();
    let mut devices = registry(&lo);

    let a = devices.open("/dev/loop/0", OpenMode::RDWR).unwrap();
    let b = devices.open("/dev/loop/1", OpenMode::RDWR).unwrap();
    assert_ne!(a, b);
    devices.close(a).unwrap();
    let c = devices.open("/dev/loop/0", OpenMode::RDWR).unwrap();
    assert_ne!(c, a);
    assert_ne!(c, b);
}

#[test]
fn reset_discards_both_directions() {
    let lo = LoopbackDriver::new();
    let mut devices = registry(&lo);

    let h = devices.open("/dev/loop/2", OpenMode::RDWR).unwrap();
    devices.write(h, b"out").unwrap();
    lo.inject(2, b"in").unwrap();
    devices.reset(h).unwrap();

    assert_eq!(devices.ioctl(h, IoctlCmd::RxPeek), Ok(0));
    assert_eq!(lo.collect(2, &mut [0u8; 4]), Ok(0));
}

#[test]
fn read_only_handle_cannot_write() {
    let lo = LoopbackDriver::new();
    let mut devices = registry(&lo);

    let h = devices.open("/dev/loop/0", OpenMode::READ).unwrap();
    assert_eq!(devices.write(h, b"no"), Err(DevError::PermissionDenied));
    assert_eq!(lo.collect(0, &mut [0u8; 2]), Ok(0));
}

#[test]
fn unknown_handle_is_rejected_everywhere() {
    let lo = LoopbackDriver::new();
    let mut devices = registry(&lo);
    let bogus = DevHandle::from_raw(42);

    assert!(devices.lookup(bogus).is_none());
    assert_eq!(devices.read(bogus, &mut [0u8; 1]), Err(DevError::BadHandle));
    assert_eq!(devices.write(bogus, b"x"), Err(DevError::BadHandle));
    assert_eq!(devices.reset(bogus), Err(DevError::BadHandle));
    assert_eq!(devices.ioctl(bogus, IoctlCmd::TxPeek), Err(DevError::BadHandle));
    assert_eq!(devices.close(bogus), Err(DevError::BadHandle));
}
