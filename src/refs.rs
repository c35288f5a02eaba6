use super::{error::io_at, Error, ObjectId, Result, HEAD};
use std::fs;
use std::io::{self, Write};
use std::path::{Component, Path, PathBuf};
use tempfile::NamedTempFile;
use tracing::info;

const SYMREF_PREFIX: &str = "ref: ";

/// What HEAD points at.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Head {
    /// `ref: <name>`, the normal state.
    Symbolic(String),
    Detached(ObjectId),
}

/// Named pointers stored as files under the git directory.
#[derive(Debug, Clone)]
pub struct RefStore {
    git_dir: PathBuf,
}

impl RefStore {
    pub fn new<P: AsRef<Path>>(git_dir: P) -> Self {
        Self {
            git_dir: git_dir.as_ref().into(),
        }
    }

    pub fn read_head(&self) -> Result<Head> {
        let path = self.git_dir.join(HEAD);
        let content = fs::read_to_string(&path).map_err(io_at(&path))?;
        let content = content.trim();

        match content.strip_prefix(SYMREF_PREFIX) {
            Some(target) => Ok(Head::Symbolic(target.trim().to_string())),
            None => content
                .parse()
                .map(Head::Detached)
                .map_err(|_| Error::InvalidRef(format!("HEAD holds {content:?}"))),
        }
    }

    /// Points HEAD at `name`.
    pub fn set_head(&self, name: &str) -> Result<()> {
        self.ref_path(name)?;
        self.write_file(HEAD, &format!("{SYMREF_PREFIX}{name}\n"))?;
        info!(target_ref = name, "HEAD updated");
        Ok(())
    }

    /// Resolves `name` to an id. `None` means the ref has no commits yet.
    ///
    /// HEAD is followed through at most one symbolic hop.
    pub fn read_ref(&self, name: &str) -> Result<Option<ObjectId>> {
        if name == HEAD {
            return match self.read_head()? {
                Head::Symbolic(target) => self.read_direct(&target),
                Head::Detached(id) => Ok(Some(id)),
            };
        }
        self.read_direct(name)
    }

    pub fn write_ref(&self, name: &str, id: &ObjectId) -> Result<()> {
        self.write_file(name, &format!("{id}\n"))?;
        info!(name, %id, "ref updated");
        Ok(())
    }

    /// The branch HEAD points at. Fails when HEAD is detached.
    pub fn current_branch(&self) -> Result<String> {
        match self.read_head()? {
            Head::Symbolic(target) => Ok(target),
            Head::Detached(id) => Err(Error::InvalidRef(format!(
                "HEAD is detached at {}",
                id.short()
            ))),
        }
    }

    fn read_direct(&self, name: &str) -> Result<Option<ObjectId>> {
        let path = self.ref_path(name)?;
        let content = match fs::read_to_string(&path) {
            Ok(content) => content,
            Err(err) if err.kind() == io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(io_at(&path)(err)),
        };

        let content = content.trim();
        if content.is_empty() {
            return Ok(None);
        }
        if content.starts_with(SYMREF_PREFIX) {
            return Err(Error::InvalidRef(format!(
                "{name} is itself symbolic; only HEAD may alias"
            )));
        }
        content
            .parse()
            .map(Some)
            .map_err(|_| Error::InvalidRef(format!("{name} holds {content:?}")))
    }

    fn write_file(&self, name: &str, content: &str) -> Result<()> {
        let path = self.ref_path(name)?;
        let dir = path.parent().unwrap_or(&self.git_dir);
        fs::create_dir_all(dir).map_err(io_at(dir))?;

        let mut tmp = NamedTempFile::new_in(dir).map_err(io_at(dir))?;
        tmp.write_all(content.as_bytes())
            .map_err(io_at(tmp.path()))?;
        tmp.persist(&path).map_err(|err| io_at(&path)(err.error))?;
        Ok(())
    }

    fn ref_path(&self, name: &str) -> Result<PathBuf> {
        let rel = Path::new(name);
        let valid = !name.is_empty()
            && rel
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        if !valid {
            return Err(Error::InvalidRef(format!("{name:?} is not a valid ref name")));
        }
        Ok(self.git_dir.join(rel))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const MAIN: &str = "refs/heads/main";

    fn setup() -> (tempfile::TempDir, RefStore) {
        let dir = tempfile::tempdir().unwrap();
        let refs = RefStore::new(dir.path());
        refs.set_head(MAIN).unwrap();
        (dir, refs)
    }

    fn id(byte: u8) -> ObjectId {
        [byte; 20].into()
    }

    #[test]
    fn it_returns_none_for_unborn_branch() {
        let (_dir, refs) = setup();
        assert_eq!(refs.read_ref(MAIN).unwrap(), None);
        assert_eq!(refs.read_ref(HEAD).unwrap(), None);
    }

    #[test]
    fn it_writes_and_resolves_through_head() {
        let (dir, refs) = setup();
        refs.write_ref(MAIN, &id(1)).unwrap();

        assert_eq!(
            fs::read_to_string(dir.path().join(MAIN)).unwrap(),
            format!("{}\n", id(1))
        );
        assert_eq!(refs.read_ref(MAIN).unwrap(), Some(id(1)));
        assert_eq!(refs.read_ref(HEAD).unwrap(), Some(id(1)));

        refs.write_ref(MAIN, &id(2)).unwrap();
        assert_eq!(refs.read_ref(HEAD).unwrap(), Some(id(2)));
    }

    #[test]
    fn it_reports_current_branch() {
        let (_dir, refs) = setup();
        assert_eq!(refs.current_branch().unwrap(), MAIN);
        assert_eq!(refs.read_head().unwrap(), Head::Symbolic(MAIN.into()));
    }

    #[test]
    fn it_rejects_detached_head_as_branch() {
        let (dir, refs) = setup();
        fs::write(dir.path().join(HEAD), format!("{}\n", id(7))).unwrap();

        assert_eq!(refs.read_head().unwrap(), Head::Detached(id(7)));
        assert_eq!(refs.read_ref(HEAD).unwrap(), Some(id(7)));
        assert!(matches!(refs.current_branch(), Err(Error::InvalidRef(_))));
    }

    #[test]
    fn it_follows_only_one_symbolic_hop() {
        let (dir, refs) = setup();
        fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        fs::write(dir.path().join(MAIN), "ref: refs/heads/other\n").unwrap();
        refs.write_ref("refs/heads/other", &id(3)).unwrap();

        assert!(matches!(refs.read_ref(HEAD), Err(Error::InvalidRef(_))));
    }

    #[test]
    fn it_rejects_garbage_ref_content() {
        let (dir, refs) = setup();
        fs::create_dir_all(dir.path().join("refs/heads")).unwrap();
        fs::write(dir.path().join(MAIN), "not an id\n").unwrap();
        assert!(matches!(refs.read_ref(MAIN), Err(Error::InvalidRef(_))));
    }

    #[test]
    fn it_rejects_escaping_names() {
        let (_dir, refs) = setup();
        assert!(matches!(
            refs.write_ref("../outside", &id(1)),
            Err(Error::InvalidRef(_))
        ));
        assert!(matches!(refs.read_ref("/etc/passwd"), Err(Error::InvalidRef(_))));
        assert!(matches!(refs.read_ref(""), Err(Error::InvalidRef(_))));
    }
}
