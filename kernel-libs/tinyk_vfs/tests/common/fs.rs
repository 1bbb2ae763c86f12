use ramfs::{RAMFS, RAMFS_ID};
use tinyk_vfs::{DeviceId, FsTypeId, Vfs, VfsError, VfsResult, mount::MountIdx};
use tinyk_vfs_api::{
    fs::{FsDriver, MountOptions, Superblock},
    inode::{InodeNo, InodePayload},
    mode::{FileType, Mode, Permissions},
};

/// A driver whose superblocks never come up.
pub struct Exhausted;

pub const EXHAUSTED_ID: FsTypeId = FsTypeId(0x0045_4f4d);
pub static EXHAUSTED: Exhausted = Exhausted;

impl FsDriver for Exhausted {
    fn name(&self) -> &'static str {
        "exhausted"
    }

    fn fs_type(&self) -> FsTypeId {
        EXHAUSTED_ID
    }

    fn read_superblock(&'static self, _: &mut Superblock) -> VfsResult<()> {
        Err(VfsError::OutOfMemory)
    }
}

pub fn ramfs_options() -> MountOptions {
    MountOptions::new(RAMFS_ID)
}

/// A VFS with ramfs registered and mounted as the root.
pub fn ramfs_root() -> (Vfs, MountIdx) {
    let mut vfs = Vfs::new();
    vfs.register_filesystem(&RAMFS).expect("ramfs registers");
    let root = vfs
        .mount(DeviceId::UNSPECIFIED, "/", &ramfs_options())
        .expect("root mount");
    (vfs, root)
}

/// Populates `/etc/motd` and `/bin/sh` through the root driver.
pub fn example_tree(vfs: &mut Vfs, root: MountIdx) -> (InodeNo, InodeNo) {
    let sb = vfs.superblock_mut(root).expect("a root superblock");
    let driver = sb.driver();
    let dir = Mode::new(FileType::Directory, Permissions::DIR_DEFAULT);
    let file = Mode::new(FileType::RegularFile, Permissions::FILE_DEFAULT);

    driver.make_directory(sb, "/etc", dir).expect("mkdir /etc");
    driver.make_directory(sb, "/bin", dir).expect("mkdir /bin");

    let motd = driver
        .make_inode(sb, file, InodePayload::empty_regular())
        .expect("motd inode");
    driver.link_inode(sb, motd, "/etc/motd").expect("link motd");

    let sh = driver
        .make_inode(sb, file, InodePayload::empty_regular())
        .expect("sh inode");
    driver.link_inode(sb, sh, "/bin/sh").expect("link sh");

    (motd, sh)
}

pub fn sorted_lines(out: &str) -> Vec<&str> {
    let mut lines: Vec<_> = out.lines().collect();
    lines.sort_unstable();
    lines
}
