#![no_std]

extern crate alloc;

pub mod fs;
pub mod inode;
pub mod path;
mod superblock;

pub use fs::{RAMFS, RAMFS_ID, RAMFS_NAME, RamFs};
pub use superblock::{INODE_INDEX_FANOUT, RAMFS_ROOT_INO};
