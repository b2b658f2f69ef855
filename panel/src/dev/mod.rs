//! Character-device driver framework.
//!
//! Device families ("classes") implement [`CharDriver`] and register under
//! a name prefix such as `/dev/uart/`. User code opens a device by full
//! name, `/dev/<class>/<minor>[,opt...]`, and gets back a [`DevHandle`];
//! every later call goes through the handle.
//!
//! ```text
//!   open("/dev/uart/1,9600") ──> registry ──prefix──> UartDriver::open("1,9600")
//!                                   │                      └─> minor 1
//!                                   └─> FileTable { handle, class, minor, mode }
//! ```

pub mod fd;
pub mod loopback;
pub mod options;
pub mod registry;
pub mod uart;

use core::fmt;

use drivers::hal::serial::SerialError;

/// Class-local device number.
pub type Minor = u8;

/// Handle to an open device. Never 0.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash)]
pub struct DevHandle(u32);

impl DevHandle {
    pub const fn from_raw(raw: u32) -> Self {
        Self(raw)
    }

    pub const fn raw(self) -> u32 {
        self.0
    }
}

impl fmt::Display for DevHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

bitflags::bitflags! {
    /// Access requested at open time.
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct OpenMode: u8 {
        const READ  = 1 << 0;
        const WRITE = 1 << 1;
        const RDWR  = Self::READ.bits() | Self::WRITE.bits();
    }
}

/// Out-of-band commands.
#[repr(u16)]
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum IoctlCmd {
    /// Bytes waiting to be read.
    RxPeek = 0x11,
    /// Free space for writing.
    TxPeek = 0x12,
    /// Baud rate actually produced by the hardware.
    ReadBaud = 0x13,
}

impl TryFrom<u16> for IoctlCmd {
    type Error = DevError;

    fn try_from(code: u16) -> Result<Self, Self::Error> {
        match code {
            0x11 => Ok(IoctlCmd::RxPeek),
            0x12 => Ok(IoctlCmd::TxPeek),
            0x13 => Ok(IoctlCmd::ReadBaud),
            _ => Err(DevError::NotSupported),
        }
    }
}

/// A device class.
///
/// One value serves every minor of the class, so all methods take `&self`
/// and implementations keep per-minor state behind interior mutability.
pub trait CharDriver {
    /// One-time class initialization, called by
    /// [`DriverRegistry::driver_init`](registry::DriverRegistry::driver_init).
    fn init(&self) {}

    /// Open the device named by `name`, the part of the full name after
    /// the class prefix (`"1,9600,8,N,1"`). Returns the minor opened.
    fn open(&self, name: &str, mode: OpenMode) -> Result<Minor, DevError>;

    fn close(&self, minor: Minor) -> Result<(), DevError>;

    fn read(&self, minor: Minor, buf: &mut [u8]) -> Result<usize, DevError>;

    fn write(&self, minor: Minor, buf: &[u8]) -> Result<usize, DevError>;

    /// Drop everything buffered in both directions.
    fn reset(&self, minor: Minor) -> Result<(), DevError>;

    fn ioctl(&self, _minor: Minor, _cmd: IoctlCmd) -> Result<u32, DevError> {
        Err(DevError::NotSupported)
    }
}

/// Device framework errors
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum DevError {
    TooManyClasses,
    TooManyFiles,
    NoSuchDevice,
    BadHandle,
    InvalidArgument,
    Busy,
    NotOpen,
    NotSupported,
    PermissionDenied,
}

impl From<SerialError> for DevError {
    fn from(err: SerialError) -> Self {
        match err {
            SerialError::InvalidConfig | SerialError::UnsupportedBaud => DevError::InvalidArgument,
            SerialError::Busy => DevError::Busy,
            SerialError::NotOpen => DevError::NotOpen,
            SerialError::NoSuchDevice => DevError::NoSuchDevice,
        }
    }
}

impl fmt::Display for DevError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DevError::TooManyClasses => write!(f, "driver registry full"),
            DevError::TooManyFiles => write!(f, "too many open files"),
            DevError::NoSuchDevice => write!(f, "no such device"),
            DevError::BadHandle => write!(f, "bad device handle"),
            DevError::InvalidArgument => write!(f, "invalid argument"),
            DevError::Busy => write!(f, "device busy"),
            DevError::NotOpen => write!(f, "device not open"),
            DevError::NotSupported => write!(f, "operation not supported"),
            DevError::PermissionDenied => write!(f, "permission denied"),
        }
    }
}
