use alloc::collections::btree_map::{BTreeMap, Entry};
use tinyk_vfs_api::{FsTypeId, VfsError, VfsResult, fs::FsDriver};

/// Filesystem drivers available for mounting, keyed by type id.
#[derive(Default)]
pub struct DriverRegistry {
    drivers: BTreeMap<FsTypeId, &'static dyn FsDriver>,
}

impl DriverRegistry {
    pub const fn new() -> Self {
        Self {
            drivers: BTreeMap::new(),
        }
    }

    /// Adds `driver`. Type ids are unique: a second driver claiming a taken
    /// id is refused and the first one stays registered.
    pub fn register(&mut self, driver: &'static dyn FsDriver) -> VfsResult<()> {
        match self.drivers.entry(driver.fs_type()) {
            Entry::Occupied(_) => Err(VfsError::AlreadyExists),
            Entry::Vacant(slot) => {
                slot.insert(driver);
                Ok(())
            }
        }
    }

    pub fn find_by_type(&self, fs_type: FsTypeId) -> Option<&'static dyn FsDriver> {
        self.drivers.get(&fs_type).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = &'static dyn FsDriver> + '_ {
        self.drivers.values().copied()
    }

    pub fn len(&self) -> usize {
        self.drivers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.drivers.is_empty()
    }
}
