use super::{
    codec,
    error::io_at,
    object::{Object, ObjectKind},
    ObjectId, Result,
};
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::debug;

/// Loose objects under `<git dir>/objects`, one zlib file per digest.
#[derive(Debug, Clone)]
pub struct ObjectStore {
    dir: PathBuf,
}

impl ObjectStore {
    pub fn new<P: AsRef<Path>>(dir: P) -> Self {
        Self {
            dir: dir.as_ref().into(),
        }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// `objects/<first 2 hex>/<remaining 38 hex>`.
    pub fn path_of(&self, id: &ObjectId) -> PathBuf {
        let hex = id.hex();
        self.dir.join(&hex[..2]).join(&hex[2..])
    }

    pub fn contains(&self, id: &ObjectId) -> bool {
        self.path_of(id).is_file()
    }

    pub fn write(&self, object: &Object) -> Result<ObjectId> {
        let canonical = object.canonical();
        let id = codec::digest(&canonical);
        let path = self.path_of(&id);

        if path.is_file() {
            debug!(%id, kind = %object.kind(), "object already stored");
            return Ok(id);
        }

        let compressed = codec::compress(&canonical)?;
        let dir = path.parent().unwrap_or(&self.dir);
        fs::create_dir_all(dir).map_err(io_at(dir))?;

        // Same content always lands on the same path, so a lost rename race
        // leaves identical bytes behind.
        let mut tmp = NamedTempFile::new_in(dir).map_err(io_at(dir))?;
        tmp.write_all(&compressed).map_err(io_at(tmp.path()))?;
        tmp.persist(&path).map_err(|err| io_at(&path)(err.error))?;

        debug!(%id, kind = %object.kind(), size = canonical.len(), "object written");
        Ok(id)
    }

    /// Type tag and content bytes of a stored object.
    pub fn read_raw(&self, id: &ObjectId) -> Result<(ObjectKind, Vec<u8>)> {
        let path = self.path_of(id);
        let compressed = fs::read(&path).map_err(io_at(&path))?;
        let data = codec::decompress(&compressed)?;
        let (kind, content) = codec::decode(&data)?;
        Ok((kind, content.to_vec()))
    }

    pub fn read(&self, id: &ObjectId) -> Result<Object> {
        let (kind, content) = self.read_raw(id)?;
        Object::deserialize(kind, &content)
    }
}
