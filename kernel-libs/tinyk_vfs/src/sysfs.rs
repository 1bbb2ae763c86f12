use tinyk_vfs_api::{
    FsTypeId, VfsError, VfsResult,
    fs::{FsDriver, Superblock},
};

pub const SYSFS_NAME: &str = "sysfs";
/// "SYS"
pub const SYSFS_ID: FsTypeId = FsTypeId(0x0053_5953);

pub static SYSFS: SysFs = SysFs;

/// Placeholder for the kernel object filesystem. It can be registered, but
/// cannot be mounted yet.
#[derive(Debug, Clone, Copy, Default)]
pub struct SysFs;

impl FsDriver for SysFs {
    fn name(&self) -> &'static str {
        SYSFS_NAME
    }

    fn fs_type(&self) -> FsTypeId {
        SYSFS_ID
    }

    fn read_superblock(&'static self, _sb: &mut Superblock) -> VfsResult<()> {
        Err(VfsError::NotImplemented)
    }
}
