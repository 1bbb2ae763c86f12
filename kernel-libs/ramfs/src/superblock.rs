use alloc::{string::String, vec::Vec};
use tinyk_vfs_api::{
    VfsError, VfsResult,
    dirent::{DirCursor, DirEntry},
    inode::{Inode, InodeNo, InodePayload},
    mode::{Mode, Permissions},
};

use crate::{
    inode::{
        directory::{DirTable, check_name},
        index::InodeIndex,
    },
    path::{lookup_inode, split_parent},
};

pub const INODE_INDEX_FANOUT: usize = 64;
pub const RAMFS_ROOT_INO: InodeNo = InodeNo(1);

/// Private state a ramfs superblock carries.
pub(crate) struct RamFsData {
    pub(crate) inodes: InodeIndex<Inode>,
    /// Directory tables, keyed by the inode number of their directory.
    pub(crate) dirs: InodeIndex<DirTable>,
    pub(crate) root: InodeNo,
    next_ino: usize,
    free: Vec<InodeNo>,
}

impl RamFsData {
    pub(crate) fn new() -> VfsResult<Self> {
        let mut inodes = InodeIndex::new(INODE_INDEX_FANOUT)?;
        let mut dirs = InodeIndex::new(INODE_INDEX_FANOUT)?;

        let root = RAMFS_ROOT_INO;
        let mut idata = Inode::new(root, Permissions::DIR_DEFAULT, InodePayload::Directory);
        idata.nlinks = 2;
        dirs.insert(root, DirTable::for_directory(root, root)?)?;
        inodes.insert(root, idata)?;

        Ok(Self {
            inodes,
            dirs,
            root,
            next_ino: root.0 + 1,
            free: Vec::new(),
        })
    }

    pub(crate) fn lookup(&self, path: &str) -> VfsResult<InodeNo> {
        lookup_inode(&self.inodes, &self.dirs, self.root, path)
    }

    fn next_free_ino(&self) -> InodeNo {
        self.free
            .last()
            .copied()
            .unwrap_or(InodeNo(self.next_ino))
    }

    /// Marks the number handed out by `next_free_ino` as used.
    fn claim_ino(&mut self, ino: InodeNo) {
        if self.free.last() == Some(&ino) {
            self.free.pop();
        } else {
            self.next_ino += 1;
        }
    }

    fn release_ino(&mut self, ino: InodeNo) {
        // A number that cannot be queued for reuse is simply never reused.
        if self.free.try_reserve(1).is_ok() {
            self.free.push(ino);
        }
    }

    /// Resolves the parent of `path` and checks that its last component is
    /// free in there.
    fn new_entry_target<'p>(&self, path: &'p str) -> VfsResult<(InodeNo, &'p str)> {
        let (parent_path, name) = split_parent(path)?;
        check_name(name)?;

        let parent = self.lookup(parent_path)?;
        let table = self.dirs.get(parent).ok_or(VfsError::NotADirectory)?;
        if table.contains(name) {
            return Err(VfsError::AlreadyExists);
        }
        Ok((parent, name))
    }

    pub(crate) fn make_directory(&mut self, path: &str, permissions: Permissions) -> VfsResult<InodeNo> {
        let (parent, name) = self.new_entry_target(path)?;

        let ino = self.next_free_ino();
        let mut idata = Inode::new(ino, permissions, InodePayload::Directory);
        idata.nlinks = 2;

        self.dirs.insert(ino, DirTable::for_directory(ino, parent)?)?;
        if let Err(e) = self.inodes.insert(ino, idata) {
            self.dirs.remove(ino);
            return Err(e);
        }
        let linked = self
            .dirs
            .get_mut(parent)
            .ok_or(VfsError::NotADirectory)
            .and_then(|table| table.insert(name, ino));
        if let Err(e) = linked {
            self.inodes.remove(ino);
            self.dirs.remove(ino);
            return Err(e);
        }

        if let Some(parent) = self.inodes.get_mut(parent) {
            parent.nlinks += 1;
        }
        self.claim_ino(ino);
        Ok(ino)
    }

    pub(crate) fn make_inode(&mut self, mode: Mode, payload: InodePayload) -> VfsResult<InodeNo> {
        if matches!(payload, InodePayload::Directory) {
            return Err(VfsError::IsADirectory);
        }
        if mode.file_type != payload.file_type() {
            return Err(VfsError::InvalidArgument);
        }

        let ino = self.next_free_ino();
        self.inodes
            .insert(ino, Inode::new(ino, mode.permissions, payload))?;
        self.claim_ino(ino);
        Ok(ino)
    }

    pub(crate) fn link_inode(&mut self, ino: InodeNo, path: &str) -> VfsResult<()> {
        match self.inodes.get(ino) {
            None => return Err(VfsError::NoSuchEntry),
            Some(idata) if idata.is_dir() => return Err(VfsError::IsADirectory),
            Some(_) => (),
        }

        let (parent, name) = self.new_entry_target(path)?;
        self.dirs
            .get_mut(parent)
            .ok_or(VfsError::NotADirectory)?
            .insert(name, ino)?;

        if let Some(idata) = self.inodes.get_mut(ino) {
            idata.nlinks += 1;
        }
        Ok(())
    }

    /// Removes the entry at `path`. The inode goes away with its last link;
    /// directories must not hold anything but `.` and `..`.
    pub(crate) fn unlink_inode(&mut self, path: &str) -> VfsResult<InodeNo> {
        let (parent_path, name) = split_parent(path)?;
        let parent = self.lookup(parent_path)?;
        let ino = self
            .dirs
            .get(parent)
            .ok_or(VfsError::NotADirectory)?
            .lookup(name)
            .ok_or(VfsError::NoSuchEntry)?;

        let subdir = self.dirs.get(ino).map(DirTable::len);
        if subdir.is_some_and(|len| len > 2) {
            return Err(VfsError::DirectoryNotEmpty);
        }

        if let Some(table) = self.dirs.get_mut(parent) {
            table.remove(name);
        }

        if subdir.is_some() {
            self.dirs.remove(ino);
            self.inodes.remove(ino);
            self.release_ino(ino);
            if let Some(parent) = self.inodes.get_mut(parent) {
                parent.nlinks = parent.nlinks.saturating_sub(1);
            }
            return Ok(ino);
        }

        let orphaned = match self.inodes.get_mut(ino) {
            Some(idata) => {
                idata.nlinks = idata.nlinks.saturating_sub(1);
                idata.nlinks == 0
            }
            None => false,
        };
        if orphaned {
            self.inodes.remove(ino);
            self.release_ino(ino);
        }
        Ok(ino)
    }

    /// Drops `ino` if nothing links to it. Directories always have a name
    /// and go through `unlink_inode`.
    pub(crate) fn release_inode(&mut self, ino: InodeNo) -> VfsResult<()> {
        match self.inodes.get(ino) {
            None => return Err(VfsError::NoSuchEntry),
            Some(idata) if idata.is_dir() => return Err(VfsError::IsADirectory),
            Some(idata) if idata.nlinks > 0 => return Err(VfsError::InvalidArgument),
            Some(_) => (),
        }

        self.inodes.remove(ino);
        self.release_ino(ino);
        Ok(())
    }

    pub(crate) fn get_direntry(&self, dir: InodeNo, cursor: &mut DirCursor) -> VfsResult<Option<DirEntry>> {
        let Some(table) = self.dirs.get(dir) else {
            return Err(if self.inodes.get(dir).is_some() {
                VfsError::NotADirectory
            } else {
                VfsError::NoSuchEntry
            });
        };

        let Some((name, ino)) = table.entry_at(cursor) else {
            return Ok(None);
        };

        let mut owned = String::new();
        owned.try_reserve_exact(name.len())?;
        owned.push_str(name);
        Ok(Some(DirEntry { name: owned, ino }))
    }
}
