use bitflags::bitflags;
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// Mask of the file-type bits inside an encoded mode.
pub const S_IFMT: u32 = 0o170000;

#[derive(IntoPrimitive, TryFromPrimitive, Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u32)]
pub enum FileType {
    NamedPipe = 0o010000,
    CharDevice = 0o020000,
    Directory = 0o040000,
    BlockDevice = 0o060000,
    RegularFile = 0o100000,
    SymbolicLink = 0o120000,
    Socket = 0o140000,
}

bitflags! {
    #[derive(Debug, Clone, Copy, PartialEq, Eq)]
    pub struct Permissions: u32 {
        const SET_UID = 0o4000;
        const SET_GID = 0o2000;
        const STICKY = 0o1000;

        const USER_READ = 0o400;
        const USER_WRITE = 0o200;
        const USER_EXEC = 0o100;
        const GROUP_READ = 0o040;
        const GROUP_WRITE = 0o020;
        const GROUP_EXEC = 0o010;
        const OTHER_READ = 0o004;
        const OTHER_WRITE = 0o002;
        const OTHER_EXEC = 0o001;
    }
}

impl Permissions {
    /// `rwxr-xr-x`
    pub const DIR_DEFAULT: Self = Self::from_bits_truncate(0o755);
    /// `rw-r--r--`
    pub const FILE_DEFAULT: Self = Self::from_bits_truncate(0o644);
}

/// File type plus permission bits.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Mode {
    pub file_type: FileType,
    pub permissions: Permissions,
}

impl Mode {
    pub const fn new(file_type: FileType, permissions: Permissions) -> Self {
        Self {
            file_type,
            permissions,
        }
    }

    pub const fn is_dir(&self) -> bool {
        matches!(self.file_type, FileType::Directory)
    }

    /// Encodes as `S_IFMT | 0o7777`.
    pub fn bits(&self) -> u32 {
        u32::from(self.file_type) | self.permissions.bits()
    }

    /// Decodes an encoded mode. Unknown file types yield `None`, unknown
    /// permission bits are dropped.
    pub fn from_bits(bits: u32) -> Option<Self> {
        let file_type = FileType::try_from(bits & S_IFMT).ok()?;
        Some(Self::new(file_type, Permissions::from_bits_truncate(bits)))
    }
}

#[cfg(test)]
mod tests {
    use super::{FileType, Mode, Permissions};

    #[test]
    fn encodes_like_stat() {
        let mode = Mode::new(FileType::Directory, Permissions::DIR_DEFAULT);
        assert_eq!(0o40755, mode.bits());
        assert!(mode.is_dir());
    }

    #[test]
    fn decodes_encoded_modes() {
        let mode = Mode::from_bits(0o100644).unwrap();
        assert_eq!(FileType::RegularFile, mode.file_type);
        assert_eq!(Permissions::FILE_DEFAULT, mode.permissions);
        assert_eq!(0o100644, mode.bits());
    }

    #[test]
    fn rejects_unknown_file_type() {
        assert_eq!(None, Mode::from_bits(0o644));
        assert_eq!(None, Mode::from_bits(0o070644));
    }
}
