//! The randomized file system itself: dispatches each operation to the classifier, the
//! existence oracle and the synthesizers, all drawing from one shared random source.

use std::sync::{Mutex, PoisonError};

use rand::RngCore;
use tracing::trace;

use super::entry::{AccessMode, Attributes, DirListing, VolumeStats};
use super::path::{PathCategory, classify};
use super::{oracle, synth};
use crate::config::{Config, Identity};
use crate::core::{FsError, FsOps, Result};

/// A file system where entries in `/exist` pop in and out of existence.
///
/// Any entry `/exist/<p>` with `p` a number in `[0, 1]` exists on a given query with
/// probability `p`. Nothing is cached: two queries on the same path are independent trials,
/// and every attribute is redrawn on each observation.
///
/// ### Thread Safety
///
/// The random source sits behind a `Mutex`, every other field is immutable. Share it as
/// `Arc<ExistFs>` between workers.
///
/// ### Example
///
/// ```
/// use exist_fs::{AccessMode, Config, ExistFs, FsOps, Identity};
///
/// let fs = ExistFs::new(Config::new(Identity { uid: 1000, gid: 1000 }).seed(1));
///
/// assert!(fs.getattr("/exist").is_ok());
/// assert!(fs.getattr("/exist/1").is_ok());
/// assert!(fs.getattr("/exist/abc").is_err());
/// assert!(fs.access("/", AccessMode::WRITE).is_ok());
/// assert!(fs.access("/exist/1", AccessMode::WRITE).is_err());
/// ```
pub struct ExistFs {
    identity: Identity,
    rng: Mutex<Box<dyn RngCore + Send>>,
}

impl ExistFs {
    pub fn new(config: Config) -> Self {
        Self::with_rng(config.identity(), config.rng())
    }

    /// Creates an instance drawing from the given random source.
    pub fn with_rng(identity: Identity, rng: Box<dyn RngCore + Send>) -> Self {
        Self {
            identity,
            rng: Mutex::new(rng),
        }
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Runs `f` with exclusive access to the random source.
    fn draw<T>(&self, f: impl FnOnce(&mut dyn RngCore) -> T) -> T {
        // Poisoning is ignored: every generator state is a valid one.
        let mut rng = self.rng.lock().unwrap_or_else(PoisonError::into_inner);
        f(&mut **rng)
    }

    /// Rolls the dice once for `path`.
    pub fn exists(&self, path: &str) -> bool {
        self.exists_as(path, &classify(path))
    }

    fn exists_as(&self, path: &str, category: &PathCategory) -> bool {
        let verdict = self.draw(|rng| oracle::exists(category, rng));
        trace!(path, ?category, verdict, "existence check");
        verdict
    }
}

impl FsOps for ExistFs {
    /// Fixed directories are always accessible, write intent never is, and everything else
    /// is accessible when it exists right now.
    fn access(&self, path: &str, mode: AccessMode) -> Result<()> {
        let category = classify(path);
        if category.is_fixed() {
            return Ok(());
        }
        if mode.wants_write() || !self.exists_as(path, &category) {
            return Err(FsError::PermissionDenied(path.to_string()));
        }
        Ok(())
    }

    fn getattr(&self, path: &str) -> Result<Attributes> {
        if !self.exists(path) {
            return Err(FsError::NotFound(path.to_string()));
        }
        Ok(self.draw(|rng| synth::attributes(&self.identity, rng)))
    }

    /// The root always lists `exist`; any other directory lists one freshly drawn entry,
    /// uncorrelated with whether that entry would exist if queried.
    fn readdir(&self, path: &str) -> Result<DirListing> {
        if classify(path) == PathCategory::Root {
            return Ok(DirListing::new([".", "..", "exist"]));
        }
        let name = self.draw(synth::entry_name);
        Ok(DirListing::new([".".to_string(), "..".to_string(), name]))
    }

    fn statfs(&self, _path: &str) -> Result<VolumeStats> {
        Ok(self.draw(synth::volume_stats))
    }
}
