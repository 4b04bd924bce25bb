//! A stochastic virtual file system for exercising clients against racy, inconsistent state.
//!
//! ### Overview
//!
//! `exist-fs` answers file system queries without storing anything. Every entry under
//! `/exist` is named by a number `p` in `[0, 1]` and exists on any single query with
//! probability `p`. All metadata (sizes, timestamps, listings, volume statistics) is
//! redrawn on every observation.
//!
//! **Key ideas**:
//! - **No state**: nothing is cached between calls; the same path may exist for `access`
//!   and vanish for the following `getattr`.
//! - **Read-only**: write intent is always refused and mutating operations are unsupported.
//! - **Testability**: the random source is injected, so seeded or stub generators make
//!   every verdict reproducible.
//! - **Pluggable host**: the `FsOps` trait is the whole surface; the `fuse` module
//!   mounts any implementation through `fuser`.

mod config;
mod core;
#[cfg(feature = "fuse")]
pub mod fuse;
pub mod logging;
mod vfs;

pub use crate::config::{Config, Identity};
pub use crate::core::{FsError, FsOps, Operation, Result};
pub use crate::vfs::{
    AccessMode, Attributes, DIR_MODE, DirListing, ExistFs, MAX_SIZE, PathCategory, Traced,
    VolumeStats, classify, exists,
};
