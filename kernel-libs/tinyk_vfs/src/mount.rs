//! The tree of mounted superblocks.
//!
//! Every mount but the root hangs off a parent, under a path relative to the
//! parent's mountpoint. Children of one parent form a singly linked list.

use core::fmt;

use alloc::string::String;
use kernel_utils::hash::strhash;
use slotmap::SlotMap;
use tinyk_vfs_api::{VfsError, VfsResult, fs::Superblock};

const FS_SEP: char = '/';

slotmap::new_key_type! {
    pub struct MountIdx;
}

pub struct Mount {
    sb: Superblock,
    /// Mountpoint relative to the parent's, without surrounding separators.
    /// Empty for the root.
    rel_path: String,
    path_hash: u32,
    parent: Option<MountIdx>,
    first_child: Option<MountIdx>,
    next_sibling: Option<MountIdx>,
}

impl Mount {
    fn root(sb: Superblock) -> Self {
        Self {
            sb,
            rel_path: String::new(),
            path_hash: 0,
            parent: None,
            first_child: None,
            next_sibling: None,
        }
    }

    pub const fn superblock(&self) -> &Superblock {
        &self.sb
    }

    pub const fn superblock_mut(&mut self) -> &mut Superblock {
        &mut self.sb
    }

    pub fn rel_path(&self) -> &str {
        &self.rel_path
    }

    pub const fn parent(&self) -> Option<MountIdx> {
        self.parent
    }

    pub const fn first_child(&self) -> Option<MountIdx> {
        self.first_child
    }

    pub const fn next_sibling(&self) -> Option<MountIdx> {
        self.next_sibling
    }

    /// Does `path` (with leading separators already skipped) start at this
    /// mountpoint? Returns what is left of it below the mountpoint.
    fn strip<'p>(&self, path: &'p str) -> Option<&'p str> {
        let len = self.rel_path.len();
        let head = path.get(..len)?;
        let rest = &path[len..];
        if !(rest.is_empty() || rest.starts_with(FS_SEP)) {
            return None;
        }

        (strhash(head.as_bytes()) == self.path_hash && head == self.rel_path).then_some(rest)
    }
}

/// Arena of mounts plus the handle of the root.
///
/// `Vfs::mount` only installs a root for now, so child mounts are created by
/// the tests alone until mounting below the root is supported.
#[derive(Default)]
pub struct MountTree {
    mounts: SlotMap<MountIdx, Mount>,
    root: Option<MountIdx>,
}

impl MountTree {
    pub fn new() -> Self {
        Self::default()
    }

    pub const fn root(&self) -> Option<MountIdx> {
        self.root
    }

    pub fn len(&self) -> usize {
        self.mounts.len()
    }

    pub fn is_empty(&self) -> bool {
        self.mounts.is_empty()
    }

    pub fn get(&self, idx: MountIdx) -> Option<&Mount> {
        self.mounts.get(idx)
    }

    pub fn get_mut(&mut self, idx: MountIdx) -> Option<&mut Mount> {
        self.mounts.get_mut(idx)
    }

    /// Makes `sb` the root mount. There can only be one.
    pub fn install_root(&mut self, sb: Superblock) -> VfsResult<MountIdx> {
        if self.root.is_some() {
            return Err(VfsError::MountNotSupported);
        }

        let idx = self.mounts.insert(Mount::root(sb));
        self.root = Some(idx);
        Ok(idx)
    }

    /// Detaches the root mount and hands back its superblock. A root that
    /// still carries child mounts stays in place.
    pub fn remove_root(&mut self) -> VfsResult<Superblock> {
        let root = self.root.ok_or(VfsError::NoSuchEntry)?;
        if self.mounts.get(root).is_some_and(|m| m.first_child.is_some()) {
            return Err(VfsError::MountNotSupported);
        }

        self.root = None;
        self.mounts
            .remove(root)
            .map(|m| m.sb)
            .ok_or(VfsError::NoSuchEntry)
    }

    pub fn children(&self, parent: MountIdx) -> impl Iterator<Item = MountIdx> + '_ {
        let first = self.mounts.get(parent).and_then(|m| m.first_child);
        core::iter::successors(first, |&idx| {
            self.mounts.get(idx).and_then(|m| m.next_sibling)
        })
    }

    /// Finds the mount responsible for `path` and the part of `path` to hand
    /// to its driver.
    ///
    /// Descends into a child whenever the path continues below its
    /// mountpoint. A path ending exactly at a child mountpoint leaves `"/"`,
    /// the root of that child. Without a matching child the root receives
    /// the path untouched.
    pub fn resolve<'p>(&self, path: &'p str) -> Option<(MountIdx, &'p str)> {
        let mut idx = self.root?;
        let mut rest = path;

        'descend: loop {
            let trimmed = rest.trim_start_matches(FS_SEP);
            for child in self.children(idx) {
                let Some(below) = self.mounts.get(child).and_then(|m| m.strip(trimmed)) else {
                    continue;
                };
                idx = child;
                rest = if below.is_empty() { "/" } else { below };
                continue 'descend;
            }
            return Some((idx, rest));
        }
    }

    /// Writes the absolute mountpoint of `idx`.
    pub fn write_path(&self, idx: MountIdx, out: &mut impl fmt::Write) -> fmt::Result {
        let Some(mount) = self.mounts.get(idx) else {
            return Ok(());
        };
        match mount.parent {
            None => out.write_char(FS_SEP),
            Some(parent) => {
                if self.mounts.get(parent).is_some_and(|p| p.parent.is_some()) {
                    self.write_path(parent, out)?;
                }
                write!(out, "{FS_SEP}{}", mount.rel_path)
            }
        }
    }

    /// Hangs `sb` under `parent` at `rel_path`.
    #[cfg(test)]
    pub(crate) fn attach_child(
        &mut self,
        parent: MountIdx,
        rel_path: &str,
        sb: Superblock,
    ) -> VfsResult<MountIdx> {
        let rel_path = rel_path.trim_matches(FS_SEP);
        let next_sibling = self.mounts.get(parent).ok_or(VfsError::NoSuchEntry)?.first_child;

        let mut owned = String::new();
        owned.try_reserve_exact(rel_path.len())?;
        owned.push_str(rel_path);

        let idx = self.mounts.insert(Mount {
            sb,
            path_hash: strhash(owned.as_bytes()),
            rel_path: owned,
            parent: Some(parent),
            first_child: None,
            next_sibling,
        });
        if let Some(parent) = self.mounts.get_mut(parent) {
            parent.first_child = Some(idx);
        }
        Ok(idx)
    }
}
