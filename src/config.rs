//! Startup configuration: who owns the files and where randomness comes from.

use rand::rngs::SmallRng;
use rand::{RngCore, SeedableRng};

/// Owner reported for every node. Captured once at startup.
#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub struct Identity {
    pub uid: u32,
    pub gid: u32,
}

impl Identity {
    /// Real user and group id of the running process.
    pub fn current() -> Self {
        // SAFETY: getuid/getgid take no arguments and cannot fail.
        let uid = unsafe { libc::getuid() };
        let gid = unsafe { libc::getgid() };
        Self { uid, gid }
    }
}

#[derive(Debug, Clone)]
pub struct Config {
    identity: Identity,
    seed: Option<u64>,
}

impl Config {
    pub fn new(identity: Identity) -> Self {
        Self {
            identity,
            seed: None,
        }
    }

    /// Makes every draw reproducible across runs.
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = Some(seed);
        self
    }

    pub fn identity(&self) -> Identity {
        self.identity
    }

    /// Builds the random source: seeded if a seed was given, otherwise from the OS.
    pub fn rng(&self) -> Box<dyn RngCore + Send> {
        let rng = match self.seed {
            Some(seed) => SmallRng::seed_from_u64(seed),
            None => SmallRng::from_os_rng(),
        };
        Box::new(rng)
    }
}

impl Default for Config {
    fn default() -> Self {
        Self::new(Identity::current())
    }
}
