//! Advisory locking around the index and ref read-modify-write cycles.
//!
//! Object writes never take this lock: their destination is a pure function
//! of content.

use super::{error::io_at, Error, Result};
use fs2::FileExt;
use std::fs::{File, OpenOptions};
use std::path::Path;
use std::thread;
use std::time::{Duration, Instant};
use tracing::debug;

/// An exclusive lock on the repository, released on drop.
#[derive(Debug)]
pub struct RepoLock {
    _file: File,
}

impl RepoLock {
    pub fn acquire<P: AsRef<Path>>(path: P, timeout: Duration) -> Result<Self> {
        let path = path.as_ref();
        let file = OpenOptions::new()
            .create(true)
            .write(true)
            .truncate(false)
            .open(path)
            .map_err(io_at(path))?;

        let start = Instant::now();
        let poll_interval = Duration::from_millis(10);

        loop {
            match file.try_lock_exclusive() {
                Ok(()) => {
                    debug!(path = %path.display(), "lock acquired");
                    return Ok(Self { _file: file });
                }
                Err(_) if start.elapsed() >= timeout => {
                    return Err(Error::LockTimeout(path.into()));
                }
                Err(_) => thread::sleep(poll_interval),
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_releases_on_drop() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minigit.lock");
        {
            let _lock = RepoLock::acquire(&path, Duration::from_secs(1)).unwrap();
            assert!(path.exists());
        }
        let _again = RepoLock::acquire(&path, Duration::from_secs(1)).unwrap();
    }

    #[test]
    fn it_times_out_while_held() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("minigit.lock");
        let _held = RepoLock::acquire(&path, Duration::from_secs(1)).unwrap();

        let start = Instant::now();
        let result = RepoLock::acquire(&path, Duration::from_millis(50));
        assert!(matches!(result, Err(Error::LockTimeout(_))));
        assert!(start.elapsed() >= Duration::from_millis(50));
    }
}
