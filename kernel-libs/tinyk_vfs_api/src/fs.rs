use core::any::Any;

use alloc::boxed::Box;
use bitflags::bitflags;
use vfs_error::{VfsError, VfsResult};

use crate::{
    DeviceId, FsTypeId,
    dirent::{DirCursor, DirEntry},
    inode::{InodeNo, InodePayload},
    mode::Mode,
};

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
    pub struct SuperblockFlags: u8 {
        const DIRTY = 1 << 0;
        const READ_ONLY = 1 << 1;
    }
}

/// Caller-supplied parameters of a mount request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct MountOptions {
    pub fs_type: FsTypeId,
    pub read_only: bool,
}

impl MountOptions {
    pub const fn new(fs_type: FsTypeId) -> Self {
        Self {
            fs_type,
            read_only: false,
        }
    }
}

/// State of one mounted filesystem instance.
pub struct Superblock {
    pub dev: DeviceId,
    pub block_size: usize,
    pub flags: SuperblockFlags,
    driver: &'static dyn FsDriver,
    data: Option<Box<dyn Any + Send + Sync>>,
}

impl Superblock {
    /// An unread superblock for `dev`, to be filled in by `driver`.
    pub fn new(driver: &'static dyn FsDriver, dev: DeviceId, flags: SuperblockFlags) -> Self {
        Self {
            dev,
            block_size: 0,
            flags,
            driver,
            data: None,
        }
    }

    pub fn driver(&self) -> &'static dyn FsDriver {
        self.driver
    }

    pub fn is_read_only(&self) -> bool {
        self.flags.contains(SuperblockFlags::READ_ONLY)
    }

    /// Attaches the driver-private state and records its owner.
    pub fn attach<T: Any + Send + Sync>(&mut self, driver: &'static dyn FsDriver, data: T) {
        self.driver = driver;
        self.data = Some(Box::new(data));
    }

    pub fn data<T: Any>(&self) -> VfsResult<&T> {
        self.data
            .as_deref()
            .and_then(|d| d.downcast_ref())
            .ok_or(VfsError::InvalidArgument)
    }

    pub fn data_mut<T: Any>(&mut self) -> VfsResult<&mut T> {
        self.data
            .as_deref_mut()
            .and_then(|d| d.downcast_mut())
            .ok_or(VfsError::InvalidArgument)
    }
}

impl core::fmt::Debug for Superblock {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("Superblock")
            .field("dev", &self.dev)
            .field("block_size", &self.block_size)
            .field("flags", &self.flags)
            .field("driver", &self.driver.name())
            .finish_non_exhaustive()
    }
}

/// Operations a filesystem implementation provides to the VFS.
///
/// Every operation but `read_superblock` defaults to `NotImplemented`, so a
/// driver only spells out what it supports.
pub trait FsDriver: Sync {
    fn name(&self) -> &'static str;
    fn fs_type(&self) -> FsTypeId;

    /// Fills in `sb` for a freshly mounted instance.
    fn read_superblock(&'static self, sb: &mut Superblock) -> VfsResult<()>;

    fn make_directory(&self, _sb: &mut Superblock, _path: &str, _mode: Mode) -> VfsResult<InodeNo> {
        Err(VfsError::NotImplemented)
    }

    /// Returns the entry at `cursor` in directory `dir` and advances the
    /// cursor, or `None` once the directory is exhausted. Changing the
    /// directory while a cursor is live may make it skip or repeat entries.
    fn get_direntry(
        &self,
        _sb: &Superblock,
        _dir: InodeNo,
        _cursor: &mut DirCursor,
    ) -> VfsResult<Option<DirEntry>> {
        Err(VfsError::NotImplemented)
    }

    /// Creates an inode that no directory refers to yet.
    fn make_inode(
        &self,
        _sb: &mut Superblock,
        _mode: Mode,
        _payload: InodePayload,
    ) -> VfsResult<InodeNo> {
        Err(VfsError::NotImplemented)
    }

    fn lookup_inode(&self, _sb: &Superblock, _path: &str) -> VfsResult<InodeNo> {
        Err(VfsError::NotImplemented)
    }

    fn link_inode(&self, _sb: &mut Superblock, _ino: InodeNo, _path: &str) -> VfsResult<()> {
        Err(VfsError::NotImplemented)
    }

    fn unlink_inode(&self, _sb: &mut Superblock, _path: &str) -> VfsResult<()> {
        Err(VfsError::NotImplemented)
    }

    /// Drops an inode that no directory refers to, such as one from
    /// `make_inode` whose `link_inode` failed.
    fn release_inode(&self, _sb: &mut Superblock, _ino: InodeNo) -> VfsResult<()> {
        Err(VfsError::NotImplemented)
    }
}
