use smallvec::SmallVec;
use vfs_error::{VfsError, VfsResult};

use crate::{
    DeviceId,
    mode::{FileType, Mode, Permissions},
};

pub const N_DIRECT_BLOCKS: usize = 12;
pub const N_INDIRECT_LEVELS: usize = 3;
pub const MAX_SHORT_SYMLINK_SIZE: usize = 60;

/// Per-filesystem inode number. Zero never names an inode.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct InodeNo(pub usize);

impl InodeNo {
    pub const INVALID: Self = Self(0);

    pub const fn is_valid(&self) -> bool {
        self.0 != 0
    }
}

impl core::fmt::Display for InodeNo {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Symlink target, stored inline while it fits in the inode.
pub type SymlinkTarget = SmallVec<[u8; MAX_SHORT_SYMLINK_SIZE]>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InodePayload {
    Regular {
        block_count: usize,
        direct: [usize; N_DIRECT_BLOCKS],
        /// Single, double and triple indirect blocks.
        indirect: [usize; N_INDIRECT_LEVELS],
    },
    /// Entries live in the filesystem's directory table, not in the inode.
    Directory,
    CharDevice {
        device: DeviceId,
    },
    BlockDevice {
        device: DeviceId,
    },
    Symlink {
        target: SymlinkTarget,
    },
    Socket,
    NamedPipe,
}

impl InodePayload {
    pub const fn empty_regular() -> Self {
        Self::Regular {
            block_count: 0,
            direct: [0; N_DIRECT_BLOCKS],
            indirect: [0; N_INDIRECT_LEVELS],
        }
    }

    pub fn symlink(target: &str) -> VfsResult<Self> {
        let mut buf = SymlinkTarget::new();
        buf.try_reserve_exact(target.len())
            .map_err(|_| VfsError::OutOfMemory)?;
        buf.extend_from_slice(target.as_bytes());
        Ok(Self::Symlink { target: buf })
    }

    pub const fn file_type(&self) -> FileType {
        match self {
            Self::Regular { .. } => FileType::RegularFile,
            Self::Directory => FileType::Directory,
            Self::CharDevice { .. } => FileType::CharDevice,
            Self::BlockDevice { .. } => FileType::BlockDevice,
            Self::Symlink { .. } => FileType::SymbolicLink,
            Self::Socket => FileType::Socket,
            Self::NamedPipe => FileType::NamedPipe,
        }
    }
}

/// Metadata record of a filesystem object.
///
/// The file type is not stored separately: it is always read off the
/// payload, so the mode can never disagree with the active variant.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Inode {
    pub no: InodeNo,
    pub permissions: Permissions,
    pub uid: u16,
    pub gid: u16,
    pub nlinks: usize,
    pub payload: InodePayload,
}

impl Inode {
    pub const fn new(no: InodeNo, permissions: Permissions, payload: InodePayload) -> Self {
        Self {
            no,
            permissions,
            uid: 0,
            gid: 0,
            nlinks: 0,
            payload,
        }
    }

    pub const fn mode(&self) -> Mode {
        Mode::new(self.payload.file_type(), self.permissions)
    }

    pub const fn is_dir(&self) -> bool {
        matches!(self.payload, InodePayload::Directory)
    }

    /// Symlink target bytes, `None` for other inode types.
    pub fn symlink_target(&self) -> Option<&[u8]> {
        match &self.payload {
            InodePayload::Symlink { target } => Some(target.as_slice()),
            _ => None,
        }
    }
}
