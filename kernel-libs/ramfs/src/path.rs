//! Path resolution over the directory tables of one ramfs instance.
//!
//! Paths are resolved from the filesystem root whether or not they start
//! with a separator. Runs of separators count as one. A path made only of
//! separators names the root, and a trailing separator is accepted after a
//! directory. The empty path is rejected.

use tinyk_vfs_api::{
    VfsError, VfsResult,
    inode::{Inode, InodeNo},
};

use crate::inode::{directory::DirTable, index::InodeIndex};

pub const FS_SEP: u8 = b'/';

fn skip_separators(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b != FS_SEP)
        .map_or(bytes.len(), |off| from + off)
}

fn component_end(bytes: &[u8], from: usize) -> usize {
    bytes[from..]
        .iter()
        .position(|&b| b == FS_SEP)
        .map_or(bytes.len(), |off| from + off)
}

/// Resolves `path` to an inode number, starting at directory `root`.
pub fn lookup_inode(
    inodes: &InodeIndex<Inode>,
    dirs: &InodeIndex<DirTable>,
    root: InodeNo,
    path: &str,
) -> VfsResult<InodeNo> {
    //     "some/longdirectoryname/to/examplefilename"
    //           ^                ^
    //       basename        basename_end
    let bytes = path.as_bytes();
    if bytes.is_empty() {
        return Err(VfsError::InvalidArgument);
    }

    let mut dir = root;
    let mut basename = skip_separators(bytes, 0);
    loop {
        if basename == bytes.len() {
            return Ok(dir);
        }

        let basename_end = component_end(bytes, basename);
        let ino = dirs
            .get(dir)
            .ok_or(VfsError::NotADirectory)?
            .lookup(&path[basename..basename_end])
            .ok_or(VfsError::NoSuchEntry)?;

        if basename_end == bytes.len() {
            return Ok(ino);
        }

        let idata = inodes.get(ino).ok_or(VfsError::NoSuchEntry)?;
        if !idata.is_dir() {
            return Err(VfsError::NotADirectory);
        }

        dir = ino;
        basename = skip_separators(bytes, basename_end);
    }
}

/// Splits `path` into the path of its parent directory and its last
/// component. The root itself and the `.`/`..` entries cannot be split off.
pub fn split_parent(path: &str) -> VfsResult<(&str, &str)> {
    let trimmed = path.trim_end_matches(FS_SEP as char);
    if trimmed.is_empty() {
        return Err(VfsError::InvalidArgument);
    }

    let (parent, name) = match trimmed.rfind(FS_SEP as char) {
        Some(sep) => (&trimmed[..=sep], &trimmed[sep + 1..]),
        None => ("/", trimmed),
    };

    if name == "." || name == ".." {
        return Err(VfsError::InvalidArgument);
    }
    Ok((parent, name))
}
