use std::time::{Duration, SystemTime, UNIX_EPOCH};

use serde::Serialize;

/// Directory bit plus `rwxrwxr-x`.
pub const DIR_MODE: u32 = libc::S_IFDIR as u32 | 0o775;

/// Synthesized attributes of an existing node. Keys serialize as `stat(2)` field names.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct Attributes {
    /// Seconds since the epoch.
    #[serde(rename = "st_atime")]
    pub atime: f64,
    #[serde(rename = "st_ctime")]
    pub ctime: f64,
    #[serde(rename = "st_mtime")]
    pub mtime: f64,
    #[serde(rename = "st_gid")]
    pub gid: u32,
    #[serde(rename = "st_uid")]
    pub uid: u32,
    #[serde(rename = "st_mode")]
    pub mode: u32,
    #[serde(rename = "st_nlink")]
    pub nlink: u32,
    #[serde(rename = "st_size")]
    pub size: u64,
}

impl Attributes {
    pub fn is_dir(&self) -> bool {
        (self.mode & libc::S_IFMT as u32) == libc::S_IFDIR as u32
    }

    /// Permission bits only.
    pub fn perm(&self) -> u16 {
        (self.mode & 0o7777) as u16
    }

    pub fn accessed(&self) -> SystemTime {
        to_system_time(self.atime)
    }

    pub fn changed(&self) -> SystemTime {
        to_system_time(self.ctime)
    }

    pub fn modified(&self) -> SystemTime {
        to_system_time(self.mtime)
    }
}

fn to_system_time(secs: f64) -> SystemTime {
    UNIX_EPOCH + Duration::from_secs_f64(secs.max(0.0))
}

/// File system statistics, keyed like `statvfs(3)`.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct VolumeStats {
    /// Free blocks for unprivileged users.
    #[serde(rename = "f_bavail")]
    pub bavail: u64,
    #[serde(rename = "f_bfree")]
    pub bfree: u64,
    #[serde(rename = "f_blocks")]
    pub blocks: u64,
    #[serde(rename = "f_bsize")]
    pub bsize: u64,
    /// Free inodes for unprivileged users.
    #[serde(rename = "f_favail")]
    pub favail: u64,
    #[serde(rename = "f_ffree")]
    pub ffree: u64,
    #[serde(rename = "f_files")]
    pub files: u64,
    #[serde(rename = "f_flag")]
    pub flag: u64,
    #[serde(rename = "f_frsize")]
    pub frsize: u64,
    #[serde(rename = "f_namemax")]
    pub namemax: u64,
}

/// Ordered names of a directory, `.` and `..` included.
#[derive(Debug, Clone, PartialEq)]
pub struct DirListing {
    names: Vec<String>,
}

impl DirListing {
    pub fn new<I, S>(names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            names: names.into_iter().map(Into::into).collect(),
        }
    }

    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn iter(&self) -> impl Iterator<Item = &str> {
        self.names.iter().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.names.len()
    }

    pub fn is_empty(&self) -> bool {
        self.names.is_empty()
    }
}

/// Access request bitmask, as passed to `access(2)`.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct AccessMode(i32);

impl AccessMode {
    pub const EXISTS: AccessMode = AccessMode(libc::F_OK);
    pub const READ: AccessMode = AccessMode(libc::R_OK);
    pub const WRITE: AccessMode = AccessMode(libc::W_OK);
    pub const EXECUTE: AccessMode = AccessMode(libc::X_OK);

    pub fn from_bits(bits: i32) -> Self {
        AccessMode(bits)
    }

    pub fn bits(&self) -> i32 {
        self.0
    }

    pub fn wants_write(&self) -> bool {
        self.0 & libc::W_OK != 0
    }
}

impl std::ops::BitOr for AccessMode {
    type Output = AccessMode;

    fn bitor(self, rhs: Self) -> Self::Output {
        AccessMode(self.0 | rhs.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_dir_mode() {
        let attrs = Attributes {
            atime: 0.0,
            ctime: 1.5,
            mtime: 2.0,
            gid: 100,
            uid: 1000,
            mode: DIR_MODE,
            nlink: 1,
            size: 0,
        };
        assert!(attrs.is_dir());
        assert_eq!(attrs.perm(), 0o775);
        assert_eq!(attrs.accessed(), UNIX_EPOCH);
        assert_eq!(attrs.changed(), UNIX_EPOCH + Duration::from_millis(1500));
        assert_eq!(attrs.modified(), UNIX_EPOCH + Duration::from_secs(2));
    }

    #[test]
    fn test_access_mode_write_intent() {
        assert!(!AccessMode::EXISTS.wants_write());
        assert!(!(AccessMode::READ | AccessMode::EXECUTE).wants_write());
        assert!(AccessMode::WRITE.wants_write());
        assert!((AccessMode::READ | AccessMode::WRITE).wants_write());
        assert_eq!(AccessMode::from_bits(libc::R_OK).bits(), libc::R_OK);
    }

    #[test]
    fn test_listing() {
        let listing = DirListing::new([".", "..", "exist"]);
        assert_eq!(listing.len(), 3);
        assert!(!listing.is_empty());
        assert_eq!(listing.iter().collect::<Vec<_>>(), vec![".", "..", "exist"]);
        assert_eq!(listing.names()[2], "exist");
    }
}
