//! `/dev/loop/<minor>`: a device with no hardware behind it.
//!
//! What user code writes to a minor is queued for the backend
//! ([`LoopbackDriver::collect`]); what the backend injects
//! ([`LoopbackDriver::inject`]) is what user code reads. Used to exercise
//! the framework on the host.

use drivers::peripheral::usart::RingBuffer;
use spin::Mutex;

use super::options::split_minor;
use super::{CharDriver, DevError, IoctlCmd, Minor, OpenMode};
use crate::config::{LOOPBACK_BUFFER_LEN, LOOPBACK_MINORS};

/// Namespace prefix of the class.
pub const LOOPBACK_PREFIX: &str = "/dev/loop/";

struct LoopInstance {
    open: bool,
    /// Backend -> user.
    inbound: RingBuffer<LOOPBACK_BUFFER_LEN>,
    /// User -> backend.
    outbound: RingBuffer<LOOPBACK_BUFFER_LEN>,
}

impl LoopInstance {
    const CLOSED: LoopInstance = LoopInstance {
        open: false,
        inbound: RingBuffer::new(),
        outbound: RingBuffer::new(),
    };

    fn clear(&mut self) {
        self.inbound.clear();
        self.outbound.clear();
    }
}

pub struct LoopbackDriver {
    minors: Mutex<[LoopInstance; LOOPBACK_MINORS]>,
}

impl LoopbackDriver {
    pub const fn new() -> Self {
        Self {
            minors: Mutex::new([LoopInstance::CLOSED; LOOPBACK_MINORS]),
        }
    }

    fn with_open<R>(
        &self,
        minor: Minor,
        f: impl FnOnce(&mut LoopInstance) -> R,
    ) -> Result<R, DevError> {
        let mut minors = self.minors.lock();
        let instance = minors
            .get_mut(minor as usize)
            .ok_or(DevError::NoSuchDevice)?;
        if !instance.open {
            return Err(DevError::NotOpen);
        }
        Ok(f(instance))
    }

    /// Backend: is `minor` currently open?
    pub fn is_open(&self, minor: Minor) -> bool {
        self.minors
            .lock()
            .get(minor as usize)
            .is_some_and(|instance| instance.open)
    }

    /// Backend: queue bytes for the user to read. Returns how many fit.
    pub fn inject(&self, minor: Minor, data: &[u8]) -> Result<usize, DevError> {
        self.with_open(minor, |instance| instance.inbound.write_from(data))
    }

    /// Backend: take bytes the user wrote. Returns how many were copied.
    pub fn collect(&self, minor: Minor, out: &mut [u8]) -> Result<usize, DevError> {
        self.with_open(minor, |instance| instance.outbound.read_into(out))
    }

    /// Backend: drop everything queued in both directions.
    pub fn flush(&self, minor: Minor) -> Result<(), DevError> {
        self.with_open(minor, LoopInstance::clear)
    }
}

impl Default for LoopbackDriver {
    fn default() -> Self {
        Self::new()
    }
}

impl CharDriver for LoopbackDriver {
    fn init(&self) {
        for instance in self.minors.lock().iter_mut() {
            instance.open = false;
            instance.clear();
        }
    }

    fn open(&self, name: &str, _mode: OpenMode) -> Result<Minor, DevError> {
        let (minor, options) = split_minor(name)?;
        if !options.is_empty() {
            return Err(DevError::InvalidArgument);
        }
        let mut minors = self.minors.lock();
        let instance = minors
            .get_mut(minor as usize)
            .ok_or(DevError::NoSuchDevice)?;
        if instance.open {
            return Err(DevError::Busy);
        }
        instance.clear();
        instance.open = true;
        Ok(minor)
    }

    fn close(&self, minor: Minor) -> Result<(), DevError> {
        self.with_open(minor, |instance| {
            instance.open = false;
            instance.clear();
        })
    }

    fn read(&self, minor: Minor, buf: &mut [u8]) -> Result<usize, DevError> {
        self.with_open(minor, |instance| instance.inbound.read_into(buf))
    }

    fn write(&self, minor: Minor, buf: &[u8]) -> Result<usize, DevError> {
        self.with_open(minor, |instance| instance.outbound.write_from(buf))
    }

    fn reset(&self, minor: Minor) -> Result<(), DevError> {
        self.with_open(minor, LoopInstance::clear)
    }

    fn ioctl(&self, minor: Minor, cmd: IoctlCmd) -> Result<u32, DevError> {
        let value = self.with_open(minor, |instance| match cmd {
            IoctlCmd::RxPeek => Some(instance.inbound.used() as u32),
            IoctlCmd::TxPeek => Some(instance.outbound.free() as u32),
            IoctlCmd::ReadBaud => None,
        })?;
        value.ok_or(DevError::NotSupported)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn user_and_backend_see_each_other() {
        let lo = LoopbackDriver::new();
        let minor = lo.open("2", OpenMode::RDWR).unwrap();
        assert!(lo.is_open(2));

        assert_eq!(lo.write(minor, b"ping"), Ok(4));
        let mut out = [0u8; 8];
        assert_eq!(lo.collect(minor, &mut out), Ok(4));
        assert_eq!(&out[..4], b"ping");

        assert_eq!(lo.inject(minor, b"pong"), Ok(4));
        assert_eq!(lo.ioctl(minor, IoctlCmd::RxPeek), Ok(4));
        assert_eq!(lo.read(minor, &mut out), Ok(4));
        assert_eq!(&out[..4], b"pong");
    }

    #[test]
    fn tx_peek_reports_free_space() {
        let lo = LoopbackDriver::new();
        lo.open("0", OpenMode::RDWR).unwrap();
        lo.write(0, &[0u8; 10]).unwrap();
        assert_eq!(
            lo.ioctl(0, IoctlCmd::TxPeek),
            Ok((LOOPBACK_BUFFER_LEN - 10) as u32)
        );
        assert_eq!(lo.ioctl(0, IoctlCmd::ReadBaud), Err(DevError::NotSupported));
    }

    #[test]
    fn minors_are_exclusive_and_bounded() {
        let lo = LoopbackDriver::new();
        lo.open("1", OpenMode::READ).unwrap();
        assert_eq!(lo.open("1", OpenMode::READ), Err(DevError::Busy));
        assert_eq!(
            lo.open(&LOOPBACK_MINORS.to_string(), OpenMode::READ),
            Err(DevError::NoSuchDevice)
        );
        assert_eq!(lo.open("0,fast", OpenMode::READ), Err(DevError::InvalidArgument));
    }

    #[test]
    fn closed_minor_rejects_io() {
        let lo = LoopbackDriver::new();
        lo.open("3", OpenMode::RDWR).unwrap();
        lo.inject(3, b"zz").unwrap();
        lo.close(3).unwrap();
        assert!(!lo.is_open(3));
        assert_eq!(lo.read(3, &mut [0u8; 2]), Err(DevError::NotOpen));
        assert_eq!(lo.inject(3, b"a"), Err(DevError::NotOpen));
        assert_eq!(lo.close(3), Err(DevError::NotOpen));
    }
}
