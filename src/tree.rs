use super::{
    index::IndexEntry,
    object::{Mode, Object, Tree, TreeEntry},
    storage::ObjectStore,
    Error, ObjectId, Result,
};
use std::collections::BTreeMap;
use tracing::debug;

/// Turns the flat list of staged paths into nested tree objects.
#[derive(Debug)]
pub struct TreeBuilder<'a> {
    store: &'a ObjectStore,
}

/// A staged entry with the path segments still to be placed.
#[derive(Debug)]
struct Pending<'e> {
    segments: Vec<&'e str>,
    entry: &'e IndexEntry,
}

impl<'a> TreeBuilder<'a> {
    pub fn new(store: &'a ObjectStore) -> Self {
        Self { store }
    }

    /// Writes every subtree, children before parents, and returns the root id.
    pub fn build(&self, entries: &[IndexEntry]) -> Result<ObjectId> {
        if entries.is_empty() {
            return Err(Error::EmptyIndex);
        }

        let pending = entries
            .iter()
            .map(|entry| {
                let segments: Vec<&str> = entry.path().split('/').collect();
                if segments.iter().any(|s| s.is_empty()) {
                    return Err(Error::InvalidPath(format!(
                        "staged path {:?} has an empty segment",
                        entry.path()
                    )));
                }
                Ok(Pending { segments, entry })
            })
            .collect::<Result<Vec<_>>>()?;

        self.write_level(pending, "")
    }

    fn write_level(&self, pending: Vec<Pending<'_>>, prefix: &str) -> Result<ObjectId> {
        let mut tree = Tree::new();
        let mut subdirs: BTreeMap<&str, Vec<Pending<'_>>> = BTreeMap::new();

        for Pending { segments, entry } in pending {
            let Some((name, rest)) = segments.split_first() else {
                continue;
            };
            if rest.is_empty() {
                tree.add(TreeEntry::new(entry.mode(), *name, entry.id())?);
            } else {
                subdirs.entry(*name).or_default().push(Pending {
                    segments: rest.to_vec(),
                    entry,
                });
            }
        }

        for (dir, children) in subdirs {
            let path = join(prefix, dir);
            if tree.get(dir).is_some() {
                return Err(Error::InvalidPath(format!(
                    "{path:?} is staged as both a file and a directory"
                )));
            }
            let id = self.write_level(children, &path)?;
            tree.add(TreeEntry::new(Mode::Directory, dir, id)?);
        }

        let id = self.store.write(&Object::Tree(tree))?;
        let shown = if prefix.is_empty() { "/" } else { prefix };
        debug!(%id, path = shown, "tree written");
        Ok(id)
    }
}

fn join(prefix: &str, name: &str) -> String {
    if prefix.is_empty() {
        name.to_string()
    } else {
        format!("{prefix}/{name}")
    }
}
