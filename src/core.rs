use std::fmt;

use thiserror::Error;

use crate::vfs::{AccessMode, Attributes, DirListing, VolumeStats};

/// The operations surface a host binding dispatches against.
///
/// Every method takes `&self`: implementations must tolerate concurrent callers.
pub trait FsOps {
    /// Checks whether `path` may be accessed with `mode`.
    fn access(&self, path: &str, mode: AccessMode) -> Result<()>;

    /// Returns freshly synthesized attributes of `path`.
    fn getattr(&self, path: &str) -> Result<Attributes>;

    /// Returns the listing of the directory at `path`. Never fails.
    fn readdir(&self, path: &str) -> Result<DirListing>;

    /// Returns file system statistics. `path` is any path inside the file system. Never fails.
    fn statfs(&self, path: &str) -> Result<VolumeStats>;

    /// Catch-all for everything outside the supported surface.
    fn unsupported(&self, op: Operation) -> Result<()> {
        Err(FsError::Unsupported(op))
    }
}

/// Operations the file system refuses to perform.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Operation {
    Create,
    Mknod,
    Mkdir,
    Unlink,
    Rmdir,
    Symlink,
    Rename,
    Link,
    Open,
    Read,
    Write,
    Truncate,
    SetAttr,
    Flush,
    Fsync,
    GetXattr,
    SetXattr,
    ListXattr,
    RemoveXattr,
    Readlink,
    Release,
}

impl Operation {
    pub fn name(&self) -> &'static str {
        match self {
            Operation::Create => "create",
            Operation::Mknod => "mknod",
            Operation::Mkdir => "mkdir",
            Operation::Unlink => "unlink",
            Operation::Rmdir => "rmdir",
            Operation::Symlink => "symlink",
            Operation::Rename => "rename",
            Operation::Link => "link",
            Operation::Open => "open",
            Operation::Read => "read",
            Operation::Write => "write",
            Operation::Truncate => "truncate",
            Operation::SetAttr => "setattr",
            Operation::Flush => "flush",
            Operation::Fsync => "fsync",
            Operation::GetXattr => "getxattr",
            Operation::SetXattr => "setxattr",
            Operation::ListXattr => "listxattr",
            Operation::RemoveXattr => "removexattr",
            Operation::Readlink => "readlink",
            Operation::Release => "release",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

/// Failure kinds of the core. Malformed paths are never reported on their own:
/// they simply do not exist.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum FsError {
    #[error("{0} does not exist")]
    NotFound(String),

    #[error("permission denied: {0}")]
    PermissionDenied(String),

    #[error("operation not supported: {0}")]
    Unsupported(Operation),
}

impl FsError {
    /// The native error code a host binding reports for this failure.
    pub fn errno(&self) -> i32 {
        match self {
            FsError::NotFound(_) => libc::ENOENT,
            FsError::PermissionDenied(_) => libc::EACCES,
            FsError::Unsupported(_) => libc::ENOSYS,
        }
    }
}

pub type Result<T> = std::result::Result<T, FsError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_errno_mapping() {
        assert_eq!(FsError::NotFound("/x".into()).errno(), libc::ENOENT);
        assert_eq!(FsError::PermissionDenied("/x".into()).errno(), libc::EACCES);
        assert_eq!(FsError::Unsupported(Operation::Write).errno(), libc::ENOSYS);
    }

    #[test]
    fn test_error_messages() {
        assert_eq!(
            FsError::NotFound("/exist/0.3".into()).to_string(),
            "/exist/0.3 does not exist"
        );
        assert_eq!(
            FsError::Unsupported(Operation::Mkdir).to_string(),
            "operation not supported: mkdir"
        );
        assert_eq!(
            FsError::Unsupported(Operation::SetAttr).to_string(),
            "operation not supported: setattr"
        );
    }
}
