use super::{Error, Repository, Result};
use crate::{
    object::{Object, Tree},
    ObjectId,
};

pub(crate) fn run(repo: &Repository, id: &str, name_only: bool) -> Result<()> {
    let id: ObjectId = id.parse()?;
    let tree = match repo.read_object(&id)? {
        Object::Tree(tree) => tree,
        // A commit lists its root tree.
        Object::Commit(commit) => match repo.read_object(&commit.tree())? {
            Object::Tree(tree) => tree,
            other => return Err(not_a_tree(&commit.tree(), &other)),
        },
        other => return Err(not_a_tree(&id, &other)),
    };

    for line in lines(&tree, name_only) {
        println!("{line}");
    }
    Ok(())
}

fn lines(tree: &Tree, name_only: bool) -> Vec<String> {
    tree.entries()
        .map(|entry| {
            if name_only {
                entry.name().into()
            } else {
                entry.to_string()
            }
        })
        .collect()
}

fn not_a_tree(id: &ObjectId, obj: &Object) -> Error {
    Error::InvalidArgs(format!("{} is a {}, not a tree", id.short(), obj.kind()))
}
