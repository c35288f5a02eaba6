use super::{
    error::io_at,
    index::{self, Index, IndexEntry},
    lock::RepoLock,
    object::{self, Blob, Commit, Mode, Object},
    refs::RefStore,
    storage::ObjectStore,
    tree::TreeBuilder,
    Error, ObjectId, Result, DEFAULT_BRANCH, GIT_DIR, HEADS_DIR, INDEX_FILE, LOCK_FILE,
    LOCK_TIMEOUT, OBJECTS_DIR, TAGS_DIR,
};
use chrono::{DateTime, FixedOffset};
use std::fmt;
use std::fs;
use std::path::{Component, Path, PathBuf};
use tracing::info;

/// Walks `start` and its ancestors looking for a `.git` directory.
pub fn find_git_dir<P: AsRef<Path>>(start: P) -> Option<PathBuf> {
    start
        .as_ref()
        .ancestors()
        .map(|dir| dir.join(GIT_DIR))
        .find(|candidate| candidate.is_dir())
}

#[derive(Debug, Clone)]
pub struct Repository {
    work_tree: PathBuf,
    git_dir: PathBuf,
    objects: ObjectStore,
    refs: RefStore,
}

/// Result of a successful commit.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CommitSummary {
    pub id: ObjectId,
    pub branch: String,
    pub parent: Option<ObjectId>,
    pub message: String,
}

impl fmt::Display for CommitSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let branch = self
            .branch
            .strip_prefix(HEADS_DIR)
            .and_then(|b| b.strip_prefix('/'))
            .unwrap_or(&self.branch);
        let root = if self.parent.is_none() {
            " (root-commit)"
        } else {
            ""
        };
        write!(f, "[{branch}{root} {}] {}", self.id.short(), self.message)
    }
}

impl Repository {
    /// Creates an empty repository in `path`.
    pub fn init<P: AsRef<Path>>(path: P) -> Result<Self> {
        let work_tree = path.as_ref();
        let git_dir = work_tree.join(GIT_DIR);
        if git_dir.exists() {
            return Err(Error::AlreadyExists(git_dir));
        }

        for dir in [
            git_dir.clone(),
            git_dir.join(OBJECTS_DIR),
            git_dir.join(HEADS_DIR),
            git_dir.join(TAGS_DIR),
        ] {
            fs::create_dir_all(&dir).map_err(io_at(&dir))?;
        }

        let repo = Self::open(work_tree)?;
        repo.refs.set_head(DEFAULT_BRANCH)?;
        info!(git_dir = %repo.git_dir.display(), "initialized empty repository");
        Ok(repo)
    }

    /// Opens the repository whose work tree is exactly `work_tree`.
    pub fn open<P: AsRef<Path>>(work_tree: P) -> Result<Self> {
        let work_tree = work_tree.as_ref();
        let git_dir = work_tree.join(GIT_DIR);
        if !git_dir.is_dir() {
            return Err(Error::NotARepository {
                start: work_tree.into(),
            });
        }
        let work_tree = fs::canonicalize(work_tree).map_err(io_at(work_tree))?;
        let git_dir = work_tree.join(GIT_DIR);

        Ok(Self {
            objects: ObjectStore::new(git_dir.join(OBJECTS_DIR)),
            refs: RefStore::new(&git_dir),
            work_tree,
            git_dir,
        })
    }

    /// Opens the nearest repository containing `start`.
    pub fn discover<P: AsRef<Path>>(start: P) -> Result<Self> {
        let start = start.as_ref();
        let git_dir = find_git_dir(start).ok_or_else(|| Error::NotARepository {
            start: start.into(),
        })?;
        let work_tree = git_dir.parent().unwrap_or(start);
        Self::open(work_tree)
    }

    pub fn work_tree(&self) -> &Path {
        &self.work_tree
    }

    pub fn git_dir(&self) -> &Path {
        &self.git_dir
    }

    pub fn objects(&self) -> &ObjectStore {
        &self.objects
    }

    pub fn refs(&self) -> &RefStore {
        &self.refs
    }

    pub fn index_path(&self) -> PathBuf {
        self.git_dir.join(INDEX_FILE)
    }

    pub fn load_index(&self) -> Result<Index> {
        Index::load(self.index_path())
    }

    pub fn write_object(&self, object: &Object) -> Result<ObjectId> {
        self.objects.write(object)
    }

    pub fn read_object(&self, id: &ObjectId) -> Result<Object> {
        self.objects.read(id)
    }

    /// Stores the contents of `path` as a blob.
    pub fn hash_file<P: AsRef<Path>>(&self, path: P) -> Result<ObjectId> {
        let path = path.as_ref();
        let content = fs::read(path).map_err(io_at(path))?;
        self.write_object(&Object::from(Blob::from(content)))
    }

    /// Writes the file at `path` as a blob and stages it.
    pub fn stage_path<P: AsRef<Path>>(&self, path: P) -> Result<IndexEntry> {
        let path = path.as_ref();
        let absolute = if path.is_absolute() {
            path.to_path_buf()
        } else {
            self.work_tree.join(path)
        };
        let absolute = match normalize(&absolute) {
            path if path.starts_with(&self.work_tree) => path,
            path => resolve_parent(&path)?,
        };
        let rel = self.relative_path(&absolute)?;

        let meta = fs::metadata(&absolute).map_err(io_at(&absolute))?;
        if !meta.is_file() {
            return Err(Error::InvalidPath(format!("{rel} is not a regular file")));
        }
        let mode = Mode::from_metadata(&meta);
        let id = self.hash_file(&absolute)?;

        let _lock = self.lock()?;
        let mut index = self.load_index()?;
        index.add(mode, id, rel.as_str());
        index.save(self.index_path())?;

        info!(path = %rel, %id, %mode, "staged");
        Ok(IndexEntry::new(mode, id, rel))
    }

    /// Builds and stores the tree for the current index.
    pub fn write_tree(&self) -> Result<ObjectId> {
        let index = self.load_index()?;
        TreeBuilder::new(&self.objects).build(index.entries())
    }

    /// Commits the index onto the current branch, stamped with the current time.
    pub fn commit(&self, author: &str, committer: &str, message: &str) -> Result<CommitSummary> {
        self.commit_at(author, committer, message, object::now())
    }

    pub fn commit_at(
        &self,
        author: &str,
        committer: &str,
        message: &str,
        when: DateTime<FixedOffset>,
    ) -> Result<CommitSummary> {
        let _lock = self.lock()?;

        let index = self.load_index()?;
        if index.is_empty() {
            return Err(Error::EmptyIndex);
        }
        let tree = TreeBuilder::new(&self.objects).build(index.entries())?;

        let mut commit = Commit::new(tree, author, committer, message, when);
        let branch = self.refs.current_branch()?;
        let parent = self.refs.read_ref(&branch)?;
        if let Some(parent) = parent {
            commit.add_parent(parent);
        }

        let id = self.write_object(&Object::from(commit))?;
        self.refs.write_ref(&branch, &id)?;

        Ok(CommitSummary {
            id,
            branch,
            parent,
            message: message.into(),
        })
    }

    fn lock(&self) -> Result<RepoLock> {
        RepoLock::acquire(self.git_dir.join(LOCK_FILE), LOCK_TIMEOUT)
    }

    /// `/`-separated path of `absolute` relative to the work tree.
    fn relative_path(&self, absolute: &Path) -> Result<String> {
        let rel = absolute.strip_prefix(&self.work_tree).map_err(|_| {
            Error::InvalidPath(format!("{} is outside the repository", absolute.display()))
        })?;

        let mut segments = vec![];
        for component in rel.components() {
            match component {
                Component::Normal(segment) => {
                    let segment = segment.to_str().ok_or_else(|| {
                        Error::InvalidPath(format!("{} is not valid utf-8", rel.display()))
                    })?;
                    if !index::is_line_safe(segment) {
                        return Err(Error::InvalidPath(format!(
                            "{segment:?} contains a line break"
                        )));
                    }
                    segments.push(segment);
                }
                _ => {
                    return Err(Error::InvalidPath(format!(
                        "{} is not a plain relative path",
                        rel.display()
                    )))
                }
            }
        }

        match segments.first() {
            None => Err(Error::InvalidPath("the work tree itself cannot be staged".into())),
            Some(&GIT_DIR) => Err(Error::InvalidPath(format!(
                "{} is inside the git directory",
                rel.display()
            ))),
            Some(_) => Ok(segments.join("/")),
        }
    }
}

/// Resolves `.` and `..` lexically without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut out = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                out.pop();
            }
            other => out.push(other),
        }
    }
    out
}

/// Canonicalizes the directory part of `path` and keeps its final name as
/// given, so a symlink is staged under its own name.
fn resolve_parent(path: &Path) -> Result<PathBuf> {
    let name = path
        .file_name()
        .ok_or_else(|| Error::InvalidPath(format!("{} does not name a file", path.display())))?;
    let parent = match path.parent() {
        Some(parent) if !parent.as_os_str().is_empty() => parent,
        _ => Path::new("."),
    };
    let parent = fs::canonicalize(parent).map_err(io_at(parent))?;
    Ok(parent.join(name))
}
