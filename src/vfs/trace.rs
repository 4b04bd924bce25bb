use tracing::debug;

use super::entry::{AccessMode, Attributes, DirListing, VolumeStats};
use crate::core::{FsOps, Operation, Result};

/// Logs every call and its outcome around an inner [`FsOps`], without touching results.
pub struct Traced<T> {
    inner: T,
}

impl<T: FsOps> Traced<T> {
    pub fn new(inner: T) -> Self {
        Self { inner }
    }

    pub fn inner(&self) -> &T {
        &self.inner
    }

    pub fn into_inner(self) -> T {
        self.inner
    }
}

impl<T: FsOps> FsOps for Traced<T> {
    fn access(&self, path: &str, mode: AccessMode) -> Result<()> {
        debug!(path, mode = mode.bits(), ">>> access");
        let result = self.inner.access(path, mode);
        debug!(?result, "<<< access");
        result
    }

    fn getattr(&self, path: &str) -> Result<Attributes> {
        debug!(path, ">>> getattr");
        let result = self.inner.getattr(path);
        debug!(?result, "<<< getattr");
        result
    }

    fn readdir(&self, path: &str) -> Result<DirListing> {
        debug!(path, ">>> readdir");
        let result = self.inner.readdir(path);
        debug!(?result, "<<< readdir");
        result
    }

    fn statfs(&self, path: &str) -> Result<VolumeStats> {
        debug!(path, ">>> statfs");
        let result = self.inner.statfs(path);
        debug!(?result, "<<< statfs");
        result
    }

    fn unsupported(&self, op: Operation) -> Result<()> {
        debug!(%op, ">>> unsupported");
        let result = self.inner.unsupported(op);
        debug!(?result, "<<< unsupported");
        result
    }
}

#[cfg(test)]
mod tests {
    use std::sync::Mutex;

    use super::*;
    use crate::core::FsError;

    /// Records which operations reached it and answers with fixed values.
    #[derive(Default)]
    struct Recorder {
        calls: Mutex<Vec<String>>,
    }

    impl Recorder {
        fn record(&self, call: String) {
            self.calls.lock().unwrap().push(call);
        }
    }

    impl FsOps for Recorder {
        fn access(&self, path: &str, mode: AccessMode) -> Result<()> {
            self.record(format!("access {path} {}", mode.bits()));
            Err(FsError::PermissionDenied(path.to_string()))
        }

        fn getattr(&self, path: &str) -> Result<Attributes> {
            self.record(format!("getattr {path}"));
            Err(FsError::NotFound(path.to_string()))
        }

        fn readdir(&self, path: &str) -> Result<DirListing> {
            self.record(format!("readdir {path}"));
            Ok(DirListing::new([".", "..", "0.5"]))
        }

        fn statfs(&self, path: &str) -> Result<VolumeStats> {
            self.record(format!("statfs {path}"));
            Ok(VolumeStats {
                bavail: 1,
                bfree: 2,
                blocks: 3,
                bsize: 4,
                favail: 5,
                ffree: 6,
                files: 7,
                flag: 8,
                frsize: 9,
                namemax: 10,
            })
        }
    }

    #[test]
    fn test_results_pass_through() {
        let traced = Traced::new(Recorder::default());

        assert_eq!(
            traced.access("/exist/0.1", AccessMode::READ),
            Err(FsError::PermissionDenied("/exist/0.1".into()))
        );
        assert_eq!(
            traced.getattr("/exist/0.2"),
            Err(FsError::NotFound("/exist/0.2".into()))
        );
        assert_eq!(
            traced.readdir("/exist"),
            Ok(DirListing::new([".", "..", "0.5"]))
        );
        assert_eq!(traced.statfs("/").map(|s| s.namemax), Ok(10));
        assert_eq!(
            traced.unsupported(Operation::Write),
            Err(FsError::Unsupported(Operation::Write))
        );

        let calls = traced.into_inner().calls.into_inner().unwrap();
        assert_eq!(
            calls,
            vec![
                format!("access /exist/0.1 {}", libc::R_OK),
                "getattr /exist/0.2".to_string(),
                "readdir /exist".to_string(),
                "statfs /".to_string(),
            ]
        );
    }

    #[test]
    fn test_wraps_the_real_file_system() {
        use rand::SeedableRng;
        use rand::rngs::SmallRng;

        use crate::config::Identity;
        use crate::vfs::ExistFs;

        let fs = ExistFs::with_rng(
            Identity { uid: 1, gid: 1 },
            Box::new(SmallRng::seed_from_u64(0)),
        );
        let traced = Traced::new(fs);
        assert!(traced.getattr("/exist/1").is_ok());
        assert_eq!(traced.readdir("/").unwrap().names(), [".", "..", "exist"]);
        assert_eq!(traced.inner().identity(), Identity { uid: 1, gid: 1 });
    }
}
