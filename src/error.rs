use std::io;
use std::path::{Path, PathBuf};
use thiserror::Error as ThisError;

#[derive(Debug, ThisError)]
pub enum Error {
    #[error("ERR - Not a repository (or any of the parent directories): {}", .start.display())]
    NotARepository { start: PathBuf },

    #[error("ERR - Repository already exists: {}", .0.display())]
    AlreadyExists(PathBuf),

    #[error("ERR - Io: {}: {source}", .path.display())]
    Io { path: PathBuf, source: io::Error },

    #[error("ERR - Corrupt object: {0}")]
    CorruptObject(String),

    #[error("ERR - Unknown object type: {0}")]
    UnknownObjectType(String),

    #[error("ERR - Invalid object id: {0}")]
    InvalidObjectId(String),

    #[error("ERR - Corrupt index at line {line}: {reason}")]
    CorruptIndex { line: usize, reason: String },

    #[error("ERR - Invalid ref: {0}")]
    InvalidRef(String),

    #[error("ERR - Nothing to commit (index is empty)")]
    EmptyIndex,

    #[error("ERR - Invalid path: {0}")]
    InvalidPath(String),

    #[error("ERR - Invalid arguments: {0}")]
    InvalidArgs(String),

    #[error("ERR - Timed out waiting for lock: {}", .0.display())]
    LockTimeout(PathBuf),
}

impl Error {
    pub(crate) fn corrupt<S: Into<String>>(msg: S) -> Self {
        Self::CorruptObject(msg.into())
    }
}

/// Attaches the failing path to an `io::Error`.
pub(crate) fn io_at<P: AsRef<Path>>(path: P) -> impl FnOnce(io::Error) -> Error {
    let path = path.as_ref().to_path_buf();
    move |source| Error::Io { path, source }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn it_reports_the_failing_path() {
        let err = io_at("/tmp/missing")(io::Error::from(io::ErrorKind::NotFound));
        let msg = err.to_string();
        assert!(msg.starts_with("ERR - Io: /tmp/missing"), "{msg}");
    }
}
