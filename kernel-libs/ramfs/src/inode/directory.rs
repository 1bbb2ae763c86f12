use alloc::{string::String, vec::Vec};
use kernel_utils::hash::strhash;
use tinyk_vfs_api::{VfsError, VfsResult, dirent::DirCursor, inode::InodeNo};

use crate::path::FS_SEP;

pub const DIR_TABLE_INITIAL_CAPACITY: usize = 16;
/// Average chain length that triggers a rehash into twice the buckets.
pub const DIR_TABLE_MAX_LOAD: usize = 2;
pub const MAX_NAME_LEN: usize = 255;

struct DirTableEntry {
    name_hash: u32,
    name: String,
    ino: InodeNo,
}

/// Name to inode hashtable holding the entries of one directory.
///
/// Collisions are chained per bucket. Names are unique within a table.
pub struct DirTable {
    size: usize,
    buckets: Vec<Vec<DirTableEntry>>,
}

impl DirTable {
    pub fn new() -> VfsResult<Self> {
        Self::with_capacity(DIR_TABLE_INITIAL_CAPACITY)
    }

    pub fn with_capacity(htcap: usize) -> VfsResult<Self> {
        Ok(Self {
            size: 0,
            buckets: empty_buckets(htcap.max(1))?,
        })
    }

    /// A fresh directory table already holding `.` and `..`.
    pub fn for_directory(this: InodeNo, parent: InodeNo) -> VfsResult<Self> {
        let mut table = Self::new()?;
        table.insert(".", this)?;
        table.insert("..", parent)?;
        Ok(table)
    }

    pub const fn len(&self) -> usize {
        self.size
    }

    pub const fn is_empty(&self) -> bool {
        self.size == 0
    }

    /// Number of buckets.
    pub fn capacity(&self) -> usize {
        self.buckets.len()
    }

    fn bucket(&self, hash: u32) -> usize {
        hash as usize % self.buckets.len()
    }

    /// Returns the inode `basename` names in this directory.
    pub fn lookup(&self, basename: &str) -> Option<InodeNo> {
        let hash = strhash(basename.as_bytes());

        self.buckets[self.bucket(hash)]
            .iter()
            .find(|de| de.name_hash == hash && de.name == basename)
            .map(|de| de.ino)
    }

    pub fn contains(&self, basename: &str) -> bool {
        self.lookup(basename).is_some()
    }

    pub fn insert(&mut self, name: &str, ino: InodeNo) -> VfsResult<()> {
        check_name(name)?;
        if !ino.is_valid() {
            return Err(VfsError::InvalidArgument);
        }
        if self.contains(name) {
            return Err(VfsError::AlreadyExists);
        }

        if self.size >= self.buckets.len() * DIR_TABLE_MAX_LOAD {
            self.rehash()?;
        }

        let mut owned = String::new();
        owned.try_reserve_exact(name.len())?;
        owned.push_str(name);

        let name_hash = strhash(name.as_bytes());
        let idx = self.bucket(name_hash);
        let chain = &mut self.buckets[idx];
        chain.try_reserve(1)?;
        chain.push(DirTableEntry {
            name_hash,
            name: owned,
            ino,
        });
        self.size += 1;
        Ok(())
    }

    pub fn remove(&mut self, name: &str) -> Option<InodeNo> {
        let name_hash = strhash(name.as_bytes());
        let idx = self.bucket(name_hash);
        let chain = &mut self.buckets[idx];
        let pos = chain
            .iter()
            .position(|de| de.name_hash == name_hash && de.name == name)?;

        self.size -= 1;
        Some(chain.remove(pos).ino)
    }

    /// Returns the entry under `cursor` and steps past it.
    ///
    /// Entries come out in bucket order. Inserting while a cursor is live may
    /// rehash the table, after which the cursor can skip or repeat entries.
    pub fn entry_at(&self, cursor: &mut DirCursor) -> Option<(&str, InodeNo)> {
        while let Some(chain) = self.buckets.get(cursor.bucket) {
            if let Some(de) = chain.get(cursor.offset) {
                cursor.offset += 1;
                return Some((de.name.as_str(), de.ino));
            }
            cursor.bucket += 1;
            cursor.offset = 0;
        }
        None
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, InodeNo)> {
        self.buckets
            .iter()
            .flatten()
            .map(|de| (de.name.as_str(), de.ino))
    }

    /// Doubles the bucket count. Every chain is sized before anything moves,
    /// so an allocation failure leaves the table untouched.
    fn rehash(&mut self) -> VfsResult<()> {
        let htcap = self
            .buckets
            .len()
            .checked_mul(2)
            .ok_or(VfsError::NoSpace)?;

        let mut counts = Vec::new();
        counts.try_reserve_exact(htcap)?;
        counts.resize(htcap, 0usize);
        for de in self.buckets.iter().flatten() {
            counts[de.name_hash as usize % htcap] += 1;
        }

        let mut buckets = Vec::new();
        buckets.try_reserve_exact(htcap)?;
        for count in counts {
            let mut chain = Vec::new();
            chain.try_reserve_exact(count)?;
            buckets.push(chain);
        }

        for de in self.buckets.drain(..).flatten() {
            buckets[de.name_hash as usize % htcap].push(de);
        }
        self.buckets = buckets;
        Ok(())
    }
}

fn empty_buckets(htcap: usize) -> VfsResult<Vec<Vec<DirTableEntry>>> {
    let mut buckets = Vec::new();
    buckets.try_reserve_exact(htcap)?;
    buckets.resize_with(htcap, Vec::new);
    Ok(buckets)
}

/// Validates a single path component before it becomes an entry name.
pub fn check_name(name: &str) -> VfsResult<()> {
    if name.is_empty() || name.bytes().any(|b| b == FS_SEP) {
        Err(VfsError::InvalidArgument)
    } else if name.len() > MAX_NAME_LEN {
        Err(VfsError::NameTooLong)
    } else {
        Ok(())
    }
}
