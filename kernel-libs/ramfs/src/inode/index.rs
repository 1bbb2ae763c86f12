//! Fixed-fanout radix index from inode numbers to records.
//!
//! An index of depth `L` addresses `[0, F^(L+1))`. Every internal node has
//! exactly `F` slots; the slot taken at each level is a digit of the inode
//! number in base `F`, most significant first, so a lookup costs `L + 1`
//! steps and no comparisons.

use alloc::vec::Vec;
use tinyk_vfs_api::{VfsError, VfsResult, inode::InodeNo};

enum Node<T> {
    Leaf(Vec<Option<T>>),
    Inner(Vec<Option<Node<T>>>),
}

impl<T> Node<T> {
    fn new(fanout: usize, level: u32) -> VfsResult<Self> {
        Ok(if level == 0 {
            Self::Leaf(empty_slots(fanout)?)
        } else {
            Self::Inner(empty_slots(fanout)?)
        })
    }
}

fn empty_slots<U>(fanout: usize) -> VfsResult<Vec<Option<U>>> {
    let mut slots = Vec::new();
    slots.try_reserve_exact(fanout)?;
    slots.resize_with(fanout, || None);
    Ok(slots)
}

pub struct InodeIndex<T> {
    fanout: usize,
    level: u32,
    root: Node<T>,
    len: usize,
}

impl<T> InodeIndex<T> {
    /// Creates an index of depth 0.
    pub fn new(fanout: usize) -> VfsResult<Self> {
        if fanout < 2 {
            return Err(VfsError::InvalidArgument);
        }

        Ok(Self {
            fanout,
            level: 0,
            root: Node::new(fanout, 0)?,
            len: 0,
        })
    }

    pub const fn fanout(&self) -> usize {
        self.fanout
    }

    pub const fn level(&self) -> u32 {
        self.level
    }

    pub const fn len(&self) -> usize {
        self.len
    }

    pub const fn is_empty(&self) -> bool {
        self.len == 0
    }

    // `level_for` never picks a depth whose capacity overflows a usize,
    // so neither of these can overflow.
    fn stride(&self) -> usize {
        self.fanout.pow(self.level)
    }

    /// Number of addressable inode numbers at the current depth.
    pub fn capacity(&self) -> usize {
        self.stride() * self.fanout
    }

    /// Looks up `ino` without ever growing the index.
    pub fn get(&self, ino: InodeNo) -> Option<&T> {
        let mut stride = self.stride();
        if stride * self.fanout - 1 < ino.0 {
            return None;
        }

        let mut n = ino.0;
        let mut node = &self.root;
        loop {
            match node {
                Node::Inner(children) => {
                    node = children.get(n / stride)?.as_ref()?;
                    n %= stride;
                    stride /= self.fanout;
                }
                Node::Leaf(slots) => return slots.get(n)?.as_ref(),
            }
        }
    }

    pub fn get_mut(&mut self, ino: InodeNo) -> Option<&mut T> {
        self.leaf_slot(ino)?.as_mut()
    }

    fn leaf_slot(&mut self, ino: InodeNo) -> Option<&mut Option<T>> {
        let fanout = self.fanout;
        let mut stride = self.stride();
        if stride * fanout - 1 < ino.0 {
            return None;
        }

        let mut n = ino.0;
        let mut node = &mut self.root;
        loop {
            let digit = n / stride;
            n %= stride;
            stride /= fanout;
            node = match node {
                Node::Inner(children) => children.get_mut(digit)?.as_mut()?,
                Node::Leaf(slots) => return slots.get_mut(digit),
            };
        }
    }

    /// Stores `value` under `ino`, returning the record it replaced.
    ///
    /// Missing intermediate nodes are allocated on the way down; an `ino`
    /// past the current capacity first deepens the tree.
    pub fn insert(&mut self, ino: InodeNo, value: T) -> VfsResult<Option<T>> {
        if ino.0 >= self.capacity() {
            self.grow_to(self.level_for(ino)?)?;
        }

        let fanout = self.fanout;
        let mut stride = self.stride();
        let mut level = self.level;
        let mut n = ino.0;
        let mut node = &mut self.root;
        let slot = loop {
            let digit = n / stride;
            n %= stride;
            stride /= fanout;
            node = match node {
                Node::Inner(children) => {
                    level -= 1;
                    match children.get_mut(digit).ok_or(VfsError::NoSpace)? {
                        Some(child) => child,
                        empty => empty.insert(Node::new(fanout, level)?),
                    }
                }
                Node::Leaf(slots) => break slots.get_mut(digit).ok_or(VfsError::NoSpace)?,
            };
        };

        let old = slot.replace(value);
        if old.is_none() {
            self.len += 1;
        }
        Ok(old)
    }

    pub fn remove(&mut self, ino: InodeNo) -> Option<T> {
        let old = self.leaf_slot(ino)?.take();
        if old.is_some() {
            self.len -= 1;
        }
        old
    }

    /// Smallest depth whose capacity covers `ino`.
    fn level_for(&self, ino: InodeNo) -> VfsResult<u32> {
        let mut level = self.level;
        let mut capacity = self.capacity();
        while ino.0 >= capacity {
            capacity = capacity.checked_mul(self.fanout).ok_or(VfsError::NoSpace)?;
            level += 1;
        }
        Ok(level)
    }

    /// Adds levels on top until the index is `level` deep; each old root
    /// becomes child 0 of the new one. Every new node is allocated before
    /// the tree changes, so a failure leaves the depth as it was.
    fn grow_to(&mut self, level: u32) -> VfsResult<()> {
        let mut tops = Vec::new();
        tops.try_reserve_exact(level.saturating_sub(self.level) as usize)?;
        for _ in self.level..level {
            tops.push(empty_slots(self.fanout)?);
        }

        for mut children in tops {
            children[0] = Some(core::mem::replace(&mut self.root, Node::Leaf(Vec::new())));
            self.root = Node::Inner(children);
            self.level += 1;
        }
        Ok(())
    }
}
