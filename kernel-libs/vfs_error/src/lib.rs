#![no_std]

extern crate alloc;

use alloc::collections::TryReserveError;
use num_enum::{IntoPrimitive, TryFromPrimitive};
use thiserror::Error;

/// Failure modes of the VFS and its drivers.
///
/// The discriminants are the status codes handed back to callers that speak
/// integers (`0` is success, see [`status`]). Most follow the errno numbering.
#[derive(IntoPrimitive, TryFromPrimitive, Debug, Error, Clone, Copy, PartialEq, Eq)]
#[repr(i32)]
pub enum VfsError {
    #[error("Mount target is invalid while no root is mounted")]
    InvalidMountRequest = -1,
    #[error("No such entry")]
    NoSuchEntry = -2,
    #[error("Out of memory")]
    OutOfMemory = -12,
    #[error("Already exists")]
    AlreadyExists = -17,
    #[error("No such filesystem type")]
    NoSuchFilesystemType = -19,
    #[error("Not a directory")]
    NotADirectory = -20,
    #[error("Is a directory")]
    IsADirectory = -21,
    #[error("Invalid argument")]
    InvalidArgument = -22,
    #[error("No space left")]
    NoSpace = -28,
    #[error("Read-only filesystem")]
    ReadOnlyFilesystem = -30,
    #[error("Name too long")]
    NameTooLong = -36,
    #[error("Not implemented")]
    NotImplemented = -38,
    #[error("Directory not empty")]
    DirectoryNotEmpty = -39,
    #[error("Mounting here is not supported yet")]
    MountNotSupported = -110,
}

pub type VfsResult<T> = Result<T, VfsError>;

impl From<TryReserveError> for VfsError {
    fn from(_: TryReserveError) -> Self {
        Self::OutOfMemory
    }
}

/// Flattens a result into the integer status convention.
pub fn status(result: VfsResult<()>) -> i32 {
    match result {
        Ok(()) => 0,
        Err(e) => e.into(),
    }
}
