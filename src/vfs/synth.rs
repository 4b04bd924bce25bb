//! Random metadata. Every call draws fresh values; nothing is remembered between calls.

use std::time::{SystemTime, UNIX_EPOCH};

use rand::{Rng, RngCore};

use super::entry::{Attributes, DIR_MODE, VolumeStats};
use crate::config::Identity;

/// Exclusive upper bound of every size-like draw.
pub const MAX_SIZE: u64 = 1 << 30;

pub fn size(rng: &mut dyn RngCore) -> u64 {
    rng.random_range(0..MAX_SIZE)
}

/// An instant between the epoch and now, in seconds.
pub fn timestamp(rng: &mut dyn RngCore) -> f64 {
    let now = SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .unwrap_or_default()
        .as_secs_f64();
    rng.random::<f64>() * now
}

/// Attributes of a node that already passed the existence check.
///
/// Ownership is the caller's own identity so the mount stays readable; mode and link count
/// are fixed. Sizes and the three timestamps are independent draws.
pub fn attributes(identity: &Identity, rng: &mut dyn RngCore) -> Attributes {
    Attributes {
        atime: timestamp(rng),
        ctime: timestamp(rng),
        mtime: timestamp(rng),
        gid: identity.gid,
        uid: identity.uid,
        mode: DIR_MODE,
        nlink: 1,
        size: size(rng),
    }
}

/// Statistics with no relation to any real resource.
pub fn volume_stats(rng: &mut dyn RngCore) -> VolumeStats {
    VolumeStats {
        bavail: size(rng),
        bfree: size(rng),
        blocks: size(rng),
        bsize: size(rng),
        favail: size(rng),
        ffree: size(rng),
        files: size(rng),
        flag: size(rng),
        frsize: size(rng),
        namemax: size(rng),
    }
}

/// Name of a probability entry, drawn uniformly from `[0, 1)`.
pub fn entry_name(rng: &mut dyn RngCore) -> String {
    format_name(rng.random())
}

/// Shortest text that parses back to `p`. Small values use exponent notation so the name
/// stays within `NAME_MAX`.
fn format_name(p: f64) -> String {
    if p != 0.0 && p.abs() < 1e-4 {
        format!("{p:e}")
    } else {
        p.to_string()
    }
}
