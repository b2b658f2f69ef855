use core::fmt;

use super::{DevError, DevHandle, Minor, OpenMode};
use crate::config::MAX_OPEN_DESCRIPTORS;

/// An entry in the open-file table
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct OpenFile {
    pub handle: DevHandle,
    /// Index of the owning class in the registry.
    pub class: usize,
    pub minor: Minor,
    pub mode: OpenMode,
}

impl OpenFile {
    pub fn check_read(&self) -> Result<(), DevError> {
        if self.mode.contains(OpenMode::READ) {
            Ok(())
        } else {
            Err(DevError::PermissionDenied)
        }
    }

    pub fn check_write(&self) -> Result<(), DevError> {
        if self.mode.contains(OpenMode::WRITE) {
            Ok(())
        } else {
            Err(DevError::PermissionDenied)
        }
    }
}

/// Bounded table of open devices.
///
/// Handles come from a monotonic `u32` counter that skips 0 when it wraps.
/// After a full wraparound a new handle can equal one that is still open;
/// with 2^32 opens between them this is accepted rather than checked.
pub struct FileTable<const N: usize = MAX_OPEN_DESCRIPTORS> {
    slots: [Option<OpenFile>; N],
    last_handle: u32,
}

impl<const N: usize> FileTable<N> {
    pub const fn new() -> Self {
        Self {
            slots: [None; N],
            last_handle: 0,
        }
    }

    pub fn has_free_slot(&self) -> bool {
        self.slots.iter().any(Option::is_none)
    }

    /// Issue the next handle id.
    pub fn next_handle(&mut self) -> DevHandle {
        self.last_handle = self.last_handle.wrapping_add(1);
        if self.last_handle == 0 {
            self.last_handle = 1;
        }
        DevHandle(self.last_handle)
    }

    pub fn insert(&mut self, file: OpenFile) -> Result<(), DevError> {
        let slot = self
            .slots
            .iter_mut()
            .find(|slot| slot.is_none())
            .ok_or(DevError::TooManyFiles)?;
        *slot = Some(file);
        Ok(())
    }

    pub fn get(&self, handle: DevHandle) -> Result<&OpenFile, DevError> {
        self.slots
            .iter()
            .flatten()
            .find(|file| file.handle == handle)
            .ok_or(DevError::BadHandle)
    }

    pub fn remove(&mut self, handle: DevHandle) -> Result<OpenFile, DevError> {
        self.slots
            .iter_mut()
            .find(|slot| matches!(slot, Some(file) if file.handle == handle))
            .and_then(Option::take)
            .ok_or(DevError::BadHandle)
    }

    pub fn count(&self) -> usize {
        self.slots.iter().filter(|slot| slot.is_some()).count()
    }

    #[cfg(test)]
    fn set_last_handle(&mut self, last: u32) {
        self.last_handle = last;
    }
}

impl<const N: usize> Default for FileTable<N> {
    fn default() -> Self {
        Self::new()
    }
}

impl<const N: usize> fmt::Debug for FileTable<N> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("FileTable")
            .field("open", &self.count())
            .field("capacity", &N)
            .field("last_handle", &self.last_handle)
            .finish()
    }
}
