use alloc::string::String;

use crate::inode::InodeNo;

/// One name in a directory, as handed out by `FsDriver::get_direntry`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DirEntry {
    pub name: String,
    pub ino: InodeNo,
}

/// Iteration position inside a directory.
///
/// Drivers interpret the two words however they like; a default cursor
/// always means "before the first entry".
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct DirCursor {
    pub bucket: usize,
    pub offset: usize,
}
