//! The staging area: an ordered list of `(mode, id, path)` records keyed by
//! path, persisted one `"<mode> <id> <path>"` line per entry.

use super::{error::io_at, object::Mode, Error, ObjectId, Result};
use std::fs;
use std::io::{self, Write};
use std::path::Path;
use tempfile::NamedTempFile;
use tracing::debug;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IndexEntry {
    mode: Mode,
    id: ObjectId,
    path: String,
}

impl IndexEntry {
    pub fn new<S: Into<String>>(mode: Mode, id: ObjectId, path: S) -> Self {
        Self {
            mode,
            id,
            path: path.into(),
        }
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn path(&self) -> &str {
        &self.path
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Index {
    entries: Vec<IndexEntry>,
}

impl Index {
    pub fn new() -> Self {
        Self::default()
    }

    /// Stages `path`. An existing entry for the same path is replaced where
    /// it stands; new paths go to the end.
    pub fn add<S: Into<String>>(&mut self, mode: Mode, id: ObjectId, path: S) {
        let entry = IndexEntry::new(mode, id, path);
        match self.position(&entry.path) {
            Some(pos) => self.entries[pos] = entry,
            None => self.entries.push(entry),
        }
    }

    pub fn remove(&mut self, path: &str) -> bool {
        match self.position(path) {
            Some(pos) => {
                self.entries.remove(pos);
                true
            }
            None => false,
        }
    }

    pub fn get(&self, path: &str) -> Option<&IndexEntry> {
        self.entries.iter().find(|e| e.path == path)
    }

    pub fn entries(&self) -> &[IndexEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    fn position(&self, path: &str) -> Option<usize> {
        self.entries.iter().position(|e| e.path == path)
    }

    /// Reads the index file. A missing file is an empty index.
    pub fn load<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        let text = match fs::read_to_string(path) {
            Ok(text) => text,
            Err(err) if err.kind() == io::ErrorKind::NotFound => {
                debug!(path = %path.display(), "no index file, starting empty");
                return Ok(Self::new());
            }
            Err(err) => return Err(io_at(path)(err)),
        };
        let index = Self::parse(&text)?;
        debug!(path = %path.display(), entries = index.len(), "index loaded");
        Ok(index)
    }

    pub fn parse(text: &str) -> Result<Self> {
        let mut index = Self::new();

        for (i, line) in text.lines().enumerate() {
            if line.is_empty() {
                continue;
            }
            let corrupt = |reason: String| Error::CorruptIndex {
                line: i + 1,
                reason,
            };

            let mut fields = line.splitn(3, ' ');
            let (Some(mode), Some(id), Some(path)) = (fields.next(), fields.next(), fields.next())
            else {
                return Err(corrupt(format!("expected \"<mode> <id> <path>\", got {line:?}")));
            };
            if path.is_empty() {
                return Err(corrupt("empty path".into()));
            }

            let mode = mode
                .parse::<Mode>()
                .map_err(|_| corrupt(format!("unknown mode {mode:?}")))?;
            let id = id
                .parse::<ObjectId>()
                .map_err(|_| corrupt(format!("invalid object id {id:?}")))?;
            index.add(mode, id, path);
        }

        Ok(index)
    }

    pub fn serialize(&self) -> String {
        self.entries
            .iter()
            .map(|e| format!("{} {} {}\n", e.mode, e.id, e.path))
            .collect()
    }

    /// Replaces the index file atomically.
    ///
    /// Fails with `InvalidPath` when an entry's path could not be read back
    /// as a single line.
    pub fn save<P: AsRef<Path>>(&self, path: P) -> Result<()> {
        let path = path.as_ref();
        if let Some(entry) = self.entries.iter().find(|e| !is_line_safe(&e.path)) {
            return Err(Error::InvalidPath(format!(
                "{:?} cannot be stored in the index",
                entry.path
            )));
        }
        let dir = path
            .parent()
            .filter(|p| !p.as_os_str().is_empty())
            .unwrap_or(Path::new("."));
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_at(dir))?;
        tmp.write_all(self.serialize().as_bytes())
            .map_err(io_at(tmp.path()))?;
        tmp.persist(path).map_err(|err| io_at(path)(err.error))?;
        debug!(path = %path.display(), entries = self.len(), "index saved");
        Ok(())
    }
}

pub(crate) fn is_line_safe(path: &str) -> bool {
    !path.is_empty() && !path.contains(['\n', '\r'])
}
