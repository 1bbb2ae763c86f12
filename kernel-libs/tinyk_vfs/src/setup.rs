use log::{error, info};
use ramfs::{RAMFS, RAMFS_ID};
use tinyk_vfs_api::{DeviceId, VfsResult, fs::MountOptions};

use crate::{Vfs, sysfs::SYSFS};

/// Registers the built-in filesystems and mounts a ramfs as the root.
pub fn vfs_setup() -> VfsResult<Vfs> {
    let mut vfs = Vfs::new();
    vfs.register_filesystem(&RAMFS)?;
    vfs.register_filesystem(&SYSFS)?;

    let opts = MountOptions::new(RAMFS_ID);
    let root = vfs
        .mount(DeviceId::UNSPECIFIED, "/", &opts)
        .inspect_err(|e| error!("vfs: root mount on ramfs failed ({})", i32::from(*e)))?;

    if let Some(sb) = vfs.superblock(root) {
        info!("{} on / mounted successfully", sb.driver().name());
    }
    Ok(vfs)
}
