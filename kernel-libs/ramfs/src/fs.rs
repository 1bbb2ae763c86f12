use log::debug;
use tinyk_vfs_api::{
    FsTypeId, PAGE_SIZE, VfsError, VfsResult,
    dirent::{DirCursor, DirEntry},
    fs::{FsDriver, Superblock, SuperblockFlags},
    inode::{InodeNo, InodePayload},
    mode::{FileType, Mode},
};

use crate::superblock::RamFsData;

pub const RAMFS_NAME: &str = "ramfs";
/// "RAM"
pub const RAMFS_ID: FsTypeId = FsTypeId(0x004d_4152);

pub static RAMFS: RamFs = RamFs;

/// Memory-only filesystem: every instance starts as an empty root directory.
#[derive(Debug, Clone, Copy, Default)]
pub struct RamFs;

/// Runs a mutating operation against the private state of `sb`, refusing
/// read-only mounts and flagging the superblock dirty on success.
fn mutate<T>(
    sb: &mut Superblock,
    op: impl FnOnce(&mut RamFsData) -> VfsResult<T>,
) -> VfsResult<T> {
    if sb.is_read_only() {
        return Err(VfsError::ReadOnlyFilesystem);
    }

    let out = op(sb.data_mut::<RamFsData>()?)?;
    sb.flags.insert(SuperblockFlags::DIRTY);
    Ok(out)
}

impl FsDriver for RamFs {
    fn name(&self) -> &'static str {
        RAMFS_NAME
    }

    fn fs_type(&self) -> FsTypeId {
        RAMFS_ID
    }

    fn read_superblock(&'static self, sb: &mut Superblock) -> VfsResult<()> {
        sb.block_size = PAGE_SIZE;

        let data = RamFsData::new()?;
        let root = data.root;
        sb.attach(self, data);

        debug!("ramfs: superblock ready on {:?}, root inode {root}", sb.dev);
        Ok(())
    }

    fn make_directory(&self, sb: &mut Superblock, path: &str, mode: Mode) -> VfsResult<InodeNo> {
        if mode.file_type != FileType::Directory {
            return Err(VfsError::InvalidArgument);
        }

        let ino = mutate(sb, |data| data.make_directory(path, mode.permissions))?;
        debug!("ramfs: mkdir {path} -> inode {ino}");
        Ok(ino)
    }

    fn get_direntry(
        &self,
        sb: &Superblock,
        dir: InodeNo,
        cursor: &mut DirCursor,
    ) -> VfsResult<Option<DirEntry>> {
        sb.data::<RamFsData>()?.get_direntry(dir, cursor)
    }

    fn make_inode(&self, sb: &mut Superblock, mode: Mode, payload: InodePayload) -> VfsResult<InodeNo> {
        let ino = mutate(sb, |data| data.make_inode(mode, payload))?;
        debug!("ramfs: new {:?} inode {ino}", mode.file_type);
        Ok(ino)
    }

    fn lookup_inode(&self, sb: &Superblock, path: &str) -> VfsResult<InodeNo> {
        sb.data::<RamFsData>()?.lookup(path)
    }

    fn link_inode(&self, sb: &mut Superblock, ino: InodeNo, path: &str) -> VfsResult<()> {
        mutate(sb, |data| data.link_inode(ino, path))?;
        debug!("ramfs: link {path} -> inode {ino}");
        Ok(())
    }

    fn unlink_inode(&self, sb: &mut Superblock, path: &str) -> VfsResult<()> {
        let ino = mutate(sb, |data| data.unlink_inode(path))?;
        debug!("ramfs: unlink {path} (inode {ino})");
        Ok(())
    }

    fn release_inode(&self, sb: &mut Superblock, ino: InodeNo) -> VfsResult<()> {
        mutate(sb, |data| data.release_inode(ino))?;
        debug!("ramfs: released unlinked inode {ino}");
        Ok(())
    }
}
