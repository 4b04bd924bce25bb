//! Host binding: exposes any [`FsOps`] as a FUSE file system via `fuser`.
//!
//! FUSE speaks inodes, the core speaks paths. An inode number is handed out when the kernel
//! looks a path up and lives until the kernel forgets it; whether that path exists is decided
//! anew on every request.

use std::collections::HashMap;
use std::ffi::OsStr;
use std::path::Path;
use std::time::{Duration, SystemTime, UNIX_EPOCH};

use fuser::{
    FileAttr, FileType, Filesystem, MountOption, ReplyAttr, ReplyCreate, ReplyData,
    ReplyDirectory, ReplyEmpty, ReplyEntry, ReplyOpen, ReplyStatfs, ReplyWrite, ReplyXattr,
    Request, TimeOrNow,
};
use tracing::{debug, info};

use crate::core::{FsOps, Operation};
use crate::vfs::{AccessMode, Attributes, DirListing, VolumeStats};

/// The kernel must not cache anything: each observation is a fresh trial.
const TTL: Duration = Duration::ZERO;

const ROOT_INO: u64 = 1;
const BLOCK_SIZE: u32 = 512;

/// `d_ino` of listed entries the kernel has not looked up yet. Plain readdir ignores it.
const UNLISTED_INO: u64 = u64::MAX;

/// Inode <-> path map with kernel lookup counts. The root is never evicted.
struct InodeTable {
    paths: HashMap<u64, String>,
    inodes: HashMap<String, u64>,
    lookups: HashMap<u64, u64>,
    next: u64,
}

impl InodeTable {
    fn new() -> Self {
        let mut table = Self {
            paths: HashMap::new(),
            inodes: HashMap::new(),
            lookups: HashMap::new(),
            next: ROOT_INO + 1,
        };
        table.paths.insert(ROOT_INO, "/".to_string());
        table.inodes.insert("/".to_string(), ROOT_INO);
        table
    }

    fn path(&self, ino: u64) -> Option<&str> {
        self.paths.get(&ino).map(String::as_str)
    }

    /// Inode of `path` if the kernel currently holds one.
    fn known(&self, path: &str) -> Option<u64> {
        self.inodes.get(path).copied()
    }

    /// Returns the inode of `path` and counts one kernel lookup against it.
    fn lookup(&mut self, path: &str) -> u64 {
        let ino = match self.known(path) {
            Some(ino) => ino,
            None => {
                let ino = self.next;
                self.next += 1;
                self.paths.insert(ino, path.to_string());
                self.inodes.insert(path.to_string(), ino);
                ino
            }
        };
        if ino != ROOT_INO {
            *self.lookups.entry(ino).or_insert(0) += 1;
        }
        ino
    }

    /// Drops `nlookup` references; evicts the inode when none remain.
    fn forget(&mut self, ino: u64, nlookup: u64) {
        let Some(count) = self.lookups.get_mut(&ino) else {
            return;
        };
        *count = count.saturating_sub(nlookup);
        if *count == 0 {
            self.lookups.remove(&ino);
            if let Some(path) = self.paths.remove(&ino) {
                self.inodes.remove(&path);
            }
        }
    }

    fn len(&self) -> usize {
        self.paths.len()
    }
}

fn child_path(parent: &str, name: &str) -> String {
    if parent == "/" {
        format!("/{name}")
    } else {
        format!("{parent}/{name}")
    }
}

fn parent_path(path: &str) -> &str {
    match path.rfind('/') {
        Some(0) | None => "/",
        Some(i) => &path[..i],
    }
}

fn file_attr(ino: u64, attrs: &Attributes) -> FileAttr {
    FileAttr {
        ino,
        size: attrs.size,
        blocks: attrs.size.div_ceil(BLOCK_SIZE as u64),
        atime: attrs.accessed(),
        mtime: attrs.modified(),
        ctime: attrs.changed(),
        crtime: UNIX_EPOCH,
        kind: if attrs.is_dir() {
            FileType::Directory
        } else {
            FileType::RegularFile
        },
        perm: attrs.perm(),
        nlink: attrs.nlink,
        uid: attrs.uid,
        gid: attrs.gid,
        rdev: 0,
        blksize: BLOCK_SIZE,
        flags: 0,
    }
}

/// A readdir entry: inode, offset of the next entry, name.
type DirEntry<'a> = (u64, i64, &'a str);

/// Entries of `listing` (the directory `path`, inode `ino`) from `offset` on.
fn dir_entries<'a>(
    table: &InodeTable,
    path: &str,
    ino: u64,
    listing: &'a DirListing,
    offset: i64,
) -> Vec<DirEntry<'a>> {
    listing
        .iter()
        .enumerate()
        .skip(offset.max(0) as usize)
        .map(|(i, name)| {
            let entry_ino = match name {
                "." => ino,
                ".." => table.known(parent_path(path)).unwrap_or(ROOT_INO),
                _ => table.known(&child_path(path, name)).unwrap_or(UNLISTED_INO),
            };
            (entry_ino, (i + 1) as i64, name)
        })
        .collect()
}

/// Arguments of `ReplyStatfs::statfs`, in its order:
/// blocks, bfree, bavail, files, ffree, bsize, namelen, frsize.
/// FUSE has no slot for favail and flag.
fn statfs_args(stats: &VolumeStats) -> (u64, u64, u64, u64, u64, u32, u32, u32) {
    (
        stats.blocks,
        stats.bfree,
        stats.bavail,
        stats.files,
        stats.ffree,
        stats.bsize as u32,
        stats.namemax as u32,
        stats.frsize as u32,
    )
}

/// Adapts an [`FsOps`] to `fuser::Filesystem`.
pub struct FuseAdapter<T> {
    ops: T,
    inodes: InodeTable,
}

impl<T: FsOps> FuseAdapter<T> {
    pub fn new(ops: T) -> Self {
        Self {
            ops,
            inodes: InodeTable::new(),
        }
    }

    fn path_of(&self, ino: u64) -> Result<String, i32> {
        self.inodes
            .path(ino)
            .map(str::to_string)
            .ok_or(libc::ENOENT)
    }

    fn lookup_entry(&mut self, parent: u64, name: &OsStr) -> Result<FileAttr, i32> {
        let parent = self.path_of(parent)?;
        let name = name.to_str().ok_or(libc::ENOENT)?;
        let path = child_path(&parent, name);
        let attrs = self.ops.getattr(&path).map_err(|e| e.errno())?;
        let ino = self.inodes.lookup(&path);
        Ok(file_attr(ino, &attrs))
    }

    fn attr_of(&self, ino: u64) -> Result<FileAttr, i32> {
        let path = self.path_of(ino)?;
        let attrs = self.ops.getattr(&path).map_err(|e| e.errno())?;
        Ok(file_attr(ino, &attrs))
    }

    fn check_access(&self, ino: u64, mask: i32) -> Result<(), i32> {
        let path = self.path_of(ino)?;
        self.ops
            .access(&path, AccessMode::from_bits(mask))
            .map_err(|e| e.errno())
    }

    fn list(&self, ino: u64, offset: i64) -> Result<Vec<(u64, i64, String)>, i32> {
        let path = self.path_of(ino)?;
        let listing = self.ops.readdir(&path).map_err(|e| e.errno())?;
        Ok(dir_entries(&self.inodes, &path, ino, &listing, offset)
            .into_iter()
            .map(|(ino, next, name)| (ino, next, name.to_string()))
            .collect())
    }

    fn volume_stats(&self, ino: u64) -> Result<VolumeStats, i32> {
        let path = self.path_of(ino).unwrap_or_else(|_| "/".to_string());
        self.ops.statfs(&path).map_err(|e| e.errno())
    }

    fn refuse(&self, op: Operation) -> i32 {
        match self.ops.unsupported(op) {
            Ok(()) => libc::ENOSYS,
            Err(e) => e.errno(),
        }
    }
}

impl<T: FsOps> Filesystem for FuseAdapter<T> {
    fn lookup(&mut self, _req: &Request<'_>, parent: u64, name: &OsStr, reply: ReplyEntry) {
        match self.lookup_entry(parent, name) {
            Ok(attr) => reply.entry(&TTL, &attr, 0),
            Err(errno) => reply.error(errno),
        }
    }

    fn forget(&mut self, _req: &Request<'_>, ino: u64, nlookup: u64) {
        self.inodes.forget(ino, nlookup);
    }

    fn getattr(&mut self, _req: &Request<'_>, ino: u64, _fh: Option<u64>, reply: ReplyAttr) {
        match self.attr_of(ino) {
            Ok(attr) => reply.attr(&TTL, &attr),
            Err(errno) => reply.error(errno),
        }
    }

    fn access(&mut self, _req: &Request<'_>, ino: u64, mask: i32, reply: ReplyEmpty) {
        match self.check_access(ino, mask) {
            Ok(()) => reply.ok(),
            Err(errno) => reply.error(errno),
        }
    }

    fn readdir(
        &mut self,
        _req: &Request<'_>,
        ino: u64,
        _fh: u64,
        offset: i64,
        mut reply: ReplyDirectory,
    ) {
        match self.list(ino, offset) {
            Ok(entries) => {
                for (entry_ino, next, name) in entries {
                    // reply.add returns true when the buffer is full.
                    if reply.add(entry_ino, next, FileType::Directory, &name) {
                        break;
                    }
                }
                reply.ok();
            }
            Err(errno) => reply.error(errno),
        }
    }

    fn statfs(&mut self, _req: &Request<'_>, ino: u64, reply: ReplyStatfs) {
        match self.volume_stats(ino) {
            Ok(stats) => {
                let (blocks, bfree, bavail, files, ffree, bsize, namelen, frsize) =
                    statfs_args(&stats);
                reply.statfs(blocks, bfree, bavail, files, ffree, bsize, namelen, frsize);
            }
            Err(errno) => reply.error(errno),
        }
    }

    fn setattr(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _mode: Option<u32>,
        _uid: Option<u32>,
        _gid: Option<u32>,
        size: Option<u64>,
        _atime: Option<TimeOrNow>,
        _mtime: Option<TimeOrNow>,
        _ctime: Option<SystemTime>,
        _fh: Option<u64>,
        _crtime: Option<SystemTime>,
        _chgtime: Option<SystemTime>,
        _bkuptime: Option<SystemTime>,
        _flags: Option<u32>,
        reply: ReplyAttr,
    ) {
        let op = if size.is_some() {
            Operation::Truncate
        } else {
            Operation::SetAttr
        };
        reply.error(self.refuse(op));
    }

    fn readlink(&mut self, _req: &Request<'_>, _ino: u64, reply: ReplyData) {
        reply.error(self.refuse(Operation::Readlink));
    }

    fn mknod(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        _rdev: u32,
        reply: ReplyEntry,
    ) {
        reply.error(self.refuse(Operation::Mknod));
    }

    fn mkdir(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        reply: ReplyEntry,
    ) {
        reply.error(self.refuse(Operation::Mkdir));
    }

    fn unlink(&mut self, _req: &Request<'_>, _parent: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.error(self.refuse(Operation::Unlink));
    }

    fn rmdir(&mut self, _req: &Request<'_>, _parent: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.error(self.refuse(Operation::Rmdir));
    }

    fn symlink(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _link_name: &OsStr,
        _target: &Path,
        reply: ReplyEntry,
    ) {
        reply.error(self.refuse(Operation::Symlink));
    }

    fn rename(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _new_parent: u64,
        _new_name: &OsStr,
        _flags: u32,
        reply: ReplyEmpty,
    ) {
        reply.error(self.refuse(Operation::Rename));
    }

    fn link(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _new_parent: u64,
        _new_name: &OsStr,
        reply: ReplyEntry,
    ) {
        reply.error(self.refuse(Operation::Link));
    }

    fn open(&mut self, _req: &Request<'_>, _ino: u64, _flags: i32, reply: ReplyOpen) {
        reply.error(self.refuse(Operation::Open));
    }

    fn read(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _offset: i64,
        _size: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyData,
    ) {
        reply.error(self.refuse(Operation::Read));
    }

    fn write(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _offset: i64,
        _data: &[u8],
        _write_flags: u32,
        _flags: i32,
        _lock_owner: Option<u64>,
        reply: ReplyWrite,
    ) {
        reply.error(self.refuse(Operation::Write));
    }

    fn flush(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _lock_owner: u64,
        reply: ReplyEmpty,
    ) {
        reply.error(self.refuse(Operation::Flush));
    }

    fn release(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _flags: i32,
        _lock_owner: Option<u64>,
        _flush: bool,
        reply: ReplyEmpty,
    ) {
        reply.error(self.refuse(Operation::Release));
    }

    fn fsync(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _fh: u64,
        _datasync: bool,
        reply: ReplyEmpty,
    ) {
        reply.error(self.refuse(Operation::Fsync));
    }

    fn setxattr(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _name: &OsStr,
        _value: &[u8],
        _flags: i32,
        _position: u32,
        reply: ReplyEmpty,
    ) {
        reply.error(self.refuse(Operation::SetXattr));
    }

    fn getxattr(
        &mut self,
        _req: &Request<'_>,
        _ino: u64,
        _name: &OsStr,
        _size: u32,
        reply: ReplyXattr,
    ) {
        reply.error(self.refuse(Operation::GetXattr));
    }

    fn listxattr(&mut self, _req: &Request<'_>, _ino: u64, _size: u32, reply: ReplyXattr) {
        reply.error(self.refuse(Operation::ListXattr));
    }

    fn removexattr(&mut self, _req: &Request<'_>, _ino: u64, _name: &OsStr, reply: ReplyEmpty) {
        reply.error(self.refuse(Operation::RemoveXattr));
    }

    fn create(
        &mut self,
        _req: &Request<'_>,
        _parent: u64,
        _name: &OsStr,
        _mode: u32,
        _umask: u32,
        _flags: i32,
        reply: ReplyCreate,
    ) {
        reply.error(self.refuse(Operation::Create));
    }
}

/// Mounts `ops` read-only at `mountpoint` and serves requests until unmounted.
pub fn mount<T: FsOps + 'static>(
    ops: T,
    mountpoint: &Path,
    allow_other: bool,
) -> std::io::Result<()> {
    let mut options = vec![
        MountOption::FSName("exist".to_string()),
        MountOption::RO,
        MountOption::AutoUnmount,
    ];
    if allow_other {
        options.push(MountOption::AllowOther);
    }
    info!(mountpoint = %mountpoint.display(), "mounting");
    fuser::mount2(FuseAdapter::new(ops), mountpoint, &options)?;
    debug!("unmounted");
    Ok(())
}
