//! Driver-class registry and handle dispatch.

use core::fmt;

use super::fd::{FileTable, OpenFile};
use super::{CharDriver, DevError, DevHandle, IoctlCmd, OpenMode};
use crate::config::{MAX_CHAR_DRIVERS, MAX_DEVSTRN_LEN};

#[derive(Copy, Clone)]
struct DriverClass<'a> {
    prefix: &'static str,
    driver: &'a dyn CharDriver,
}

/// Registered device classes plus the table of open devices.
pub struct DriverRegistry<'a> {
    classes: [Option<DriverClass<'a>>; MAX_CHAR_DRIVERS],
    files: FileTable,
}

impl<'a> DriverRegistry<'a> {
    pub const fn new() -> Self {
        Self {
            classes: [None; MAX_CHAR_DRIVERS],
            files: FileTable::new(),
        }
    }

    /// Register a class under `prefix` (e.g. `"/dev/uart/"`).
    /// Returns its registry index.
    pub fn register_class(
        &mut self,
        prefix: &'static str,
        driver: &'a dyn CharDriver,
    ) -> Result<usize, DevError> {
        let (index, slot) = self
            .classes
            .iter_mut()
            .enumerate()
            .find(|(_, slot)| slot.is_none())
            .ok_or(DevError::TooManyClasses)?;
        *slot = Some(DriverClass { prefix, driver });
        log::debug!("dev: class {} registered at {}", prefix, index);
        Ok(index)
    }

    /// Call every class's `init()` once, in registration order.
    /// Returns the number of classes initialized.
    pub fn driver_init(&self) -> usize {
        let mut count = 0;
        for class in self.classes.iter().flatten() {
            class.driver.init();
            count += 1;
        }
        count
    }

    /// Open a device by full name. The class with the longest matching
    /// prefix receives the rest of the name.
    pub fn open(&mut self, name: &str, mode: OpenMode) -> Result<DevHandle, DevError> {
        if name.len() > MAX_DEVSTRN_LEN || mode.is_empty() {
            return Err(DevError::InvalidArgument);
        }
        let (class, entry) = self
            .classes
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.as_ref().map(|class| (index, *class)))
            .filter(|(_, class)| name.starts_with(class.prefix))
            .max_by_key(|(_, class)| class.prefix.len())
            .ok_or(DevError::NoSuchDevice)?;

        if !self.files.has_free_slot() {
            log::warn!("dev: open {} rejected, file table full", name);
            return Err(DevError::TooManyFiles);
        }

        let minor = entry
            .driver
            .open(&name[entry.prefix.len()..], mode)
            .inspect_err(|err| log::warn!("dev: open {} failed: {}", name, err))?;

        let handle = self.files.next_handle();
        self.files.insert(OpenFile {
            handle,
            class,
            minor,
            mode,
        })?;
        log::debug!("dev: {} opened as {}", name, handle);
        Ok(handle)
    }

    /// Driver behind an open handle; `None` once it is closed.
    pub fn lookup(&self, handle: DevHandle) -> Option<&'a dyn CharDriver> {
        let file = self.files.get(handle).ok()?;
        self.class_of(file).ok()
    }

    /// Close a handle. The entry is removed even if the driver reports
    /// an error, which is passed on.
    pub fn close(&mut self, handle: DevHandle) -> Result<(), DevError> {
        let file = *self.files.get(handle)?;
        let driver = self.class_of(&file)?;
        let result = driver.close(file.minor);
        self.files.remove(handle)?;
        log::debug!("dev: {} closed", handle);
        result
    }

    pub fn read(&self, handle: DevHandle, buf: &mut [u8]) -> Result<usize, DevError> {
        let file = self.files.get(handle)?;
        file.check_read()?;
        self.class_of(file)?.read(file.minor, buf)
    }

    pub fn write(&self, handle: DevHandle, buf: &[u8]) -> Result<usize, DevError> {
        let file = self.files.get(handle)?;
        file.check_write()?;
        self.class_of(file)?.write(file.minor, buf)
    }

    pub fn ioctl(&self, handle: DevHandle, cmd: IoctlCmd) -> Result<u32, DevError> {
        let file = self.files.get(handle)?;
        self.class_of(file)?.ioctl(file.minor, cmd)
    }

    pub fn reset(&self, handle: DevHandle) -> Result<(), DevError> {
        let file = self.files.get(handle)?;
        self.class_of(file)?.reset(file.minor)
    }

    pub fn open_count(&self) -> usize {
        self.files.count()
    }

    pub fn class_count(&self) -> usize {
        self.classes.iter().flatten().count()
    }

    fn class_of(&self, file: &OpenFile) -> Result<&'a dyn CharDriver, DevError> {
        self.classes
            .get(file.class)
            .copied()
            .flatten()
            .map(|class| class.driver)
            .ok_or(DevError::BadHandle)
    }
}

impl Default for DriverRegistry<'_> {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Debug for DriverRegistry<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("DriverRegistry")
            .field("classes", &self.class_count())
            .field("files", &self.files)
            .finish()
    }
}
