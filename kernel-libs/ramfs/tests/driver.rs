use ramfs::{RAMFS, RAMFS_ROOT_INO};
use tinyk_vfs_api::{
    DeviceId, VfsError,
    dirent::DirCursor,
    fs::{FsDriver, Superblock, SuperblockFlags},
    inode::{InodeNo, InodePayload},
    mode::{FileType, Mode, Permissions},
};

fn mounted(flags: SuperblockFlags) -> Superblock {
    let mut sb = Superblock::new(&RAMFS, DeviceId::UNSPECIFIED, flags);
    RAMFS.read_superblock(&mut sb).expect("ramfs superblock");
    sb
}

fn dir_mode() -> Mode {
    Mode::new(FileType::Directory, Permissions::DIR_DEFAULT)
}

fn file_mode() -> Mode {
    Mode::new(FileType::RegularFile, Permissions::FILE_DEFAULT)
}

fn new_file(sb: &mut Superblock, path: &str) -> InodeNo {
    let ino = RAMFS
        .make_inode(sb, file_mode(), InodePayload::empty_regular())
        .expect("an inode");
    RAMFS.link_inode(sb, ino, path).expect("a link");
    ino
}

fn list(sb: &Superblock, dir: InodeNo) -> Vec<(String, InodeNo)> {
    let mut cursor = DirCursor::default();
    let mut entries = Vec::new();
    while let Some(de) = RAMFS.get_direntry(sb, dir, &mut cursor).expect("a directory") {
        entries.push((de.name, de.ino));
    }
    entries.sort();
    entries
}

#[test]
fn root_resolves_to_itself() {
    let sb = mounted(SuperblockFlags::empty());
    assert_eq!(Ok(RAMFS_ROOT_INO), RAMFS.lookup_inode(&sb, "/"));
    assert_eq!(Ok(RAMFS_ROOT_INO), RAMFS.lookup_inode(&sb, "/."));
    assert_eq!(Ok(RAMFS_ROOT_INO), RAMFS.lookup_inode(&sb, "/.."));
    assert_eq!(Err(VfsError::InvalidArgument), RAMFS.lookup_inode(&sb, ""));
}

#[test]
fn build_and_resolve_a_tree() {
    let mut sb = mounted(SuperblockFlags::empty());

    let etc = RAMFS.make_directory(&mut sb, "/etc", dir_mode()).unwrap();
    let motd = new_file(&mut sb, "/etc/motd");

    assert_eq!(InodeNo(2), etc);
    assert_eq!(InodeNo(3), motd);
    assert_eq!(Ok(etc), RAMFS.lookup_inode(&sb, "/etc"));
    assert_eq!(Ok(motd), RAMFS.lookup_inode(&sb, "/etc/motd"));
    assert_eq!(Ok(RAMFS_ROOT_INO), RAMFS.lookup_inode(&sb, "/etc/.."));
    assert_eq!(Err(VfsError::NoSuchEntry), RAMFS.lookup_inode(&sb, "/etc/nope"));
    assert_eq!(Err(VfsError::NotADirectory), RAMFS.lookup_inode(&sb, "/etc/motd/x"));
    assert!(sb.flags.contains(SuperblockFlags::DIRTY));
}

#[test]
fn directory_listing() {
    let mut sb = mounted(SuperblockFlags::empty());
    let etc = RAMFS.make_directory(&mut sb, "etc", dir_mode()).unwrap();
    let motd = new_file(&mut sb, "etc/motd");

    assert_eq!(
        list(&sb, etc),
        [
            (".".to_string(), etc),
            ("..".to_string(), RAMFS_ROOT_INO),
            ("motd".to_string(), motd),
        ]
    );

    let mut cursor = DirCursor::default();
    assert_eq!(
        Err(VfsError::NotADirectory),
        RAMFS.get_direntry(&sb, motd, &mut cursor)
    );
    assert_eq!(
        Err(VfsError::NoSuchEntry),
        RAMFS.get_direntry(&sb, InodeNo(99), &mut cursor)
    );
}

#[test]
fn mkdir_rejects_existing_names_and_bad_parents() {
    let mut sb = mounted(SuperblockFlags::empty());
    RAMFS.make_directory(&mut sb, "/etc", dir_mode()).unwrap();
    new_file(&mut sb, "/etc/motd");

    assert_eq!(
        Err(VfsError::AlreadyExists),
        RAMFS.make_directory(&mut sb, "/etc", dir_mode())
    );
    assert_eq!(
        Err(VfsError::NoSuchEntry),
        RAMFS.make_directory(&mut sb, "/usr/lib", dir_mode())
    );
    assert_eq!(
        Err(VfsError::NotADirectory),
        RAMFS.make_directory(&mut sb, "/etc/motd/d", dir_mode())
    );
    assert_eq!(
        Err(VfsError::InvalidArgument),
        RAMFS.make_directory(&mut sb, "/", dir_mode())
    );
    assert_eq!(
        Err(VfsError::InvalidArgument),
        RAMFS.make_directory(&mut sb, "/var", file_mode())
    );
}

#[test]
fn link_counts() {
    let mut sb = mounted(SuperblockFlags::empty());
    let etc = RAMFS.make_directory(&mut sb, "/etc", dir_mode()).unwrap();
    let motd = new_file(&mut sb, "/etc/motd");
    RAMFS.link_inode(&mut sb, motd, "/motd").unwrap();

    assert_eq!(Ok(motd), RAMFS.lookup_inode(&sb, "/motd"));
    assert_eq!(
        Err(VfsError::AlreadyExists),
        RAMFS.link_inode(&mut sb, motd, "/etc/motd")
    );
    assert_eq!(
        Err(VfsError::IsADirectory),
        RAMFS.link_inode(&mut sb, etc, "/etc2")
    );
    assert_eq!(
        Err(VfsError::NoSuchEntry),
        RAMFS.link_inode(&mut sb, InodeNo(42), "/x")
    );

    RAMFS.unlink_inode(&mut sb, "/etc/motd").unwrap();
    assert_eq!(Ok(motd), RAMFS.lookup_inode(&sb, "/motd"));
    RAMFS.unlink_inode(&mut sb, "/motd").unwrap();
    assert_eq!(Err(VfsError::NoSuchEntry), RAMFS.lookup_inode(&sb, "/motd"));

    // The released number is handed out again.
    assert_eq!(motd, new_file(&mut sb, "/issue"));
}

#[test]
fn unlink_directories() {
    let mut sb = mounted(SuperblockFlags::empty());
    RAMFS.make_directory(&mut sb, "/etc", dir_mode()).unwrap();
    new_file(&mut sb, "/etc/motd");

    assert_eq!(
        Err(VfsError::DirectoryNotEmpty),
        RAMFS.unlink_inode(&mut sb, "/etc")
    );
    assert_eq!(
        Err(VfsError::InvalidArgument),
        RAMFS.unlink_inode(&mut sb, "/etc/..")
    );
    assert_eq!(Err(VfsError::InvalidArgument), RAMFS.unlink_inode(&mut sb, "/"));

    RAMFS.unlink_inode(&mut sb, "/etc/motd").unwrap();
    RAMFS.unlink_inode(&mut sb, "/etc/").unwrap();
    assert_eq!(Err(VfsError::NoSuchEntry), RAMFS.lookup_inode(&sb, "/etc"));
    assert_eq!(
        list(&sb, RAMFS_ROOT_INO),
        [
            (".".to_string(), RAMFS_ROOT_INO),
            ("..".to_string(), RAMFS_ROOT_INO),
        ]
    );
}

#[test]
fn unlinked_inodes_can_be_released() {
    let mut sb = mounted(SuperblockFlags::empty());
    new_file(&mut sb, "/taken");

    let orphan = RAMFS
        .make_inode(&mut sb, file_mode(), InodePayload::empty_regular())
        .unwrap();
    assert_eq!(
        Err(VfsError::AlreadyExists),
        RAMFS.link_inode(&mut sb, orphan, "/taken")
    );
    RAMFS.release_inode(&mut sb, orphan).unwrap();

    let again = RAMFS
        .make_inode(&mut sb, file_mode(), InodePayload::empty_regular())
        .unwrap();
    assert_eq!(orphan, again);
    assert_eq!(
        Err(VfsError::NoSuchEntry),
        RAMFS.release_inode(&mut sb, InodeNo(99))
    );
}

#[test]
fn linked_inodes_and_directories_are_not_released() {
    let mut sb = mounted(SuperblockFlags::empty());
    let etc = RAMFS.make_directory(&mut sb, "/etc", dir_mode()).unwrap();
    let motd = new_file(&mut sb, "/etc/motd");

    assert_eq!(
        Err(VfsError::InvalidArgument),
        RAMFS.release_inode(&mut sb, motd)
    );
    assert_eq!(Err(VfsError::IsADirectory), RAMFS.release_inode(&mut sb, etc));
    assert_eq!(
        Err(VfsError::IsADirectory),
        RAMFS.release_inode(&mut sb, RAMFS_ROOT_INO)
    );
    assert_eq!(Ok(motd), RAMFS.lookup_inode(&sb, "/etc/motd"));
}

#[test]
fn make_inode_checks_mode_against_payload() {
    let mut sb = mounted(SuperblockFlags::empty());

    assert_eq!(
        Err(VfsError::IsADirectory),
        RAMFS.make_inode(&mut sb, dir_mode(), InodePayload::Directory)
    );
    assert_eq!(
        Err(VfsError::InvalidArgument),
        RAMFS.make_inode(&mut sb, file_mode(), InodePayload::Socket)
    );

    let dev = RAMFS
        .make_inode(
            &mut sb,
            Mode::new(FileType::CharDevice, Permissions::FILE_DEFAULT),
            InodePayload::CharDevice {
                device: DeviceId::new(4, 0),
            },
        )
        .unwrap();
    let link = RAMFS
        .make_inode(
            &mut sb,
            Mode::new(FileType::SymbolicLink, Permissions::all()),
            InodePayload::symlink("/dev/tty0").unwrap(),
        )
        .unwrap();
    assert_ne!(dev, link);
}

#[test]
fn read_only_mount_refuses_changes() {
    let mut sb = mounted(SuperblockFlags::READ_ONLY);

    assert_eq!(
        Err(VfsError::ReadOnlyFilesystem),
        RAMFS.make_directory(&mut sb, "/etc", dir_mode())
    );
    assert_eq!(
        Err(VfsError::ReadOnlyFilesystem),
        RAMFS.make_inode(&mut sb, file_mode(), InodePayload::empty_regular())
    );
    assert_eq!(
        Err(VfsError::ReadOnlyFilesystem),
        RAMFS.unlink_inode(&mut sb, "/x")
    );
    assert_eq!(
        Err(VfsError::ReadOnlyFilesystem),
        RAMFS.release_inode(&mut sb, RAMFS_ROOT_INO)
    );
    assert!(!sb.flags.contains(SuperblockFlags::DIRTY));
    assert_eq!(Ok(RAMFS_ROOT_INO), RAMFS.lookup_inode(&sb, "/"));
}

#[test]
fn many_inodes_deepen_the_index() {
    let mut sb = mounted(SuperblockFlags::empty());
    RAMFS.make_directory(&mut sb, "/bulk", dir_mode()).unwrap();

    let inos: Vec<_> = (0..200)
        .map(|i| new_file(&mut sb, &format!("/bulk/f{i}")))
        .collect();

    for (i, ino) in inos.iter().enumerate() {
        assert_eq!(Ok(*ino), RAMFS.lookup_inode(&sb, &format!("/bulk/f{i}")));
    }
    assert_eq!(202, list(&sb, InodeNo(2)).len());
}
