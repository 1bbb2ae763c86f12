#![no_std]

extern crate alloc;

pub mod dirent;
pub mod fs;
pub mod inode;
pub mod mode;

pub use vfs_error::{VfsError, VfsResult, status};

/// Size of a kernel page, used as the block size of memory-backed filesystems.
pub const PAGE_SIZE: usize = 4096;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
#[repr(C)]
pub struct DeviceId {
    pub major: u32,
    pub minor: u32,
}

impl DeviceId {
    /// Virtual device for filesystems without backing storage.
    pub const UNSPECIFIED: Self = Self::new(0, 0);

    pub const fn new(major: u32, minor: u32) -> Self {
        Self { major, minor }
    }
}

/// Identifier a filesystem driver registers under.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct FsTypeId(pub u32);

impl core::fmt::Display for FsTypeId {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{:#010x}", self.0)
    }
}
