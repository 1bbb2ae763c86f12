#![no_std]

extern crate alloc;

use core::fmt;

use log::{error, info};
use tinyk_vfs_api::{
    dirent::DirCursor,
    fs::{FsDriver, MountOptions, Superblock, SuperblockFlags},
    inode::InodeNo,
    mode::Mode,
};

use crate::{
    mount::{MountIdx, MountTree},
    registry::DriverRegistry,
};

pub mod mount;
pub mod registry;
pub mod setup;
pub mod sysfs;

pub use setup::vfs_setup;
pub use tinyk_vfs_api::{DeviceId, FsTypeId, VfsError, VfsResult, status};

/// An inode of some mounted filesystem.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InodeRef(MountIdx, InodeNo);

impl InodeRef {
    pub const fn fs(&self) -> MountIdx {
        self.0
    }

    pub const fn inode(&self) -> InodeNo {
        self.1
    }
}

/// The virtual filesystem: known drivers plus everything mounted with them.
///
/// Nothing here locks. A kernel sharing one `Vfs` between contexts wraps it
/// with [`Vfs::into_locked`].
#[derive(Default)]
pub struct Vfs {
    drivers: DriverRegistry,
    mounts: MountTree,
}

impl Vfs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register_filesystem(&mut self, driver: &'static dyn FsDriver) -> VfsResult<()> {
        self.drivers.register(driver).inspect_err(|e| {
            error!(
                "vfs: cannot register {} as {}: {e}",
                driver.name(),
                driver.fs_type()
            )
        })
    }

    pub const fn drivers(&self) -> &DriverRegistry {
        &self.drivers
    }

    pub const fn mounts(&self) -> &MountTree {
        &self.mounts
    }

    pub const fn root(&self) -> Option<MountIdx> {
        self.mounts.root()
    }

    /// Mounts the filesystem `opts` names, backed by `source`, at `target`.
    ///
    /// Only the root can be mounted for now: `target` has to be `"/"` and
    /// nothing may be mounted yet.
    pub fn mount(
        &mut self,
        source: DeviceId,
        target: &str,
        opts: &MountOptions,
    ) -> VfsResult<MountIdx> {
        if self.mounts.root().is_some() {
            error!("vfs: mount({target}): only the root can be mounted");
            return Err(VfsError::MountNotSupported);
        }
        if target != "/" {
            error!("vfs: mount({target}) with no root");
            return Err(VfsError::InvalidMountRequest);
        }

        let Some(driver) = self.drivers.find_by_type(opts.fs_type) else {
            error!("vfs: mount({target}): no filesystem type {}", opts.fs_type);
            return Err(VfsError::NoSuchFilesystemType);
        };

        let mut flags = SuperblockFlags::empty();
        flags.set(SuperblockFlags::READ_ONLY, opts.read_only);
        let mut sb = Superblock::new(driver, source, flags);
        if let Err(e) = driver.read_superblock(&mut sb) {
            error!("vfs: mount({target}): {} read_superblock failed: {e}", driver.name());
            return Err(e);
        }

        let idx = self.mounts.install_root(sb)?;
        info!("vfs: {} ({:?}) mounted on {target}", driver.name(), source);
        Ok(idx)
    }

    /// Unmounts the root, dropping the superblock and everything its driver
    /// kept in it.
    pub fn umount(&mut self, target: &str) -> VfsResult<()> {
        if target != "/" {
            error!("vfs: umount({target}): only the root can be unmounted");
            return Err(VfsError::InvalidMountRequest);
        }

        let sb = self
            .mounts
            .remove_root()
            .inspect_err(|e| error!("vfs: umount({target}): {e}"))?;
        info!("vfs: {} unmounted from {target}", sb.driver().name());
        Ok(())
    }

    pub fn mkdir(&mut self, path: &str, _mode: Mode) -> VfsResult<()> {
        error!("vfs: mkdir({path}) is not implemented");
        Err(VfsError::NotImplemented)
    }

    /// Resolves `path` through the mount tree and the responsible driver.
    pub fn lookup(&self, path: &str) -> VfsResult<InodeRef> {
        let (fs, rest) = self.mounts.resolve(path).ok_or(VfsError::NoSuchEntry)?;
        let sb = self.superblock(fs).ok_or(VfsError::NoSuchEntry)?;
        let ino = sb.driver().lookup_inode(sb, rest)?;
        Ok(InodeRef(fs, ino))
    }

    pub fn superblock(&self, fs: MountIdx) -> Option<&Superblock> {
        self.mounts.get(fs).map(|m| m.superblock())
    }

    pub fn superblock_mut(&mut self, fs: MountIdx) -> Option<&mut Superblock> {
        self.mounts.get_mut(fs).map(|m| m.superblock_mut())
    }

    /// Lists what is mounted where, root first.
    pub fn print_mount(&self, out: &mut impl fmt::Write) -> fmt::Result {
        let Some(root) = self.mounts.root() else {
            return Ok(());
        };
        self.print_mount_at(root, out)
    }

    fn print_mount_at(&self, idx: MountIdx, out: &mut impl fmt::Write) -> fmt::Result {
        let Some(mount) = self.mounts.get(idx) else {
            return Ok(());
        };

        write!(out, "{} on ", mount.superblock().driver().name())?;
        self.mounts.write_path(idx, out)?;
        out.write_char('\n')?;

        for child in self.mounts.children(idx) {
            self.print_mount_at(child, out)?;
        }
        Ok(())
    }

    /// Writes the names in directory `path`, one per line. A path that does
    /// not name a listable directory produces a single `ls:` error line.
    pub fn print_ls(&self, path: &str, out: &mut impl fmt::Write) -> fmt::Result {
        match self.ls(path, out) {
            Ok(written) => written,
            Err(e) => {
                error!("vfs: ls({path}): {e}");
                writeln!(out, "ls: {path}: {e}")
            }
        }
    }

    fn ls(&self, path: &str, out: &mut impl fmt::Write) -> VfsResult<fmt::Result> {
        let dir = self.lookup(path)?;
        let sb = self.superblock(dir.fs()).ok_or(VfsError::NoSuchEntry)?;

        let mut cursor = DirCursor::default();
        while let Some(de) = sb.driver().get_direntry(sb, dir.inode(), &mut cursor)? {
            if let Err(e) = writeln!(out, "{}", de.name) {
                return Ok(Err(e));
            }
        }
        Ok(Ok(()))
    }

    pub const fn into_locked<R: lock_api::RawRwLock>(self) -> lock_api::RwLock<R, Self> {
        lock_api::RwLock::new(self)
    }
}
