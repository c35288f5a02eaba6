mod blob;
mod commit;
mod tree;

use super::{codec, Error, ObjectId, Result};
use std::fmt;
use std::str::FromStr;

pub use blob::Blob;
pub use commit::{now, Commit};
pub use tree::{Mode, Tree, TreeEntry};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum ObjectKind {
    Blob,
    Tree,
    Commit,
}

impl ObjectKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Blob => "blob",
            Self::Tree => "tree",
            Self::Commit => "commit",
        }
    }
}

impl FromStr for ObjectKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "blob" => Ok(Self::Blob),
            "tree" => Ok(Self::Tree),
            "commit" => Ok(Self::Commit),
            other => Err(Error::UnknownObjectType(other.into())),
        }
    }
}

impl fmt::Display for ObjectKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    pub fn kind(&self) -> ObjectKind {
        match self {
            Self::Blob(_) => ObjectKind::Blob,
            Self::Tree(_) => ObjectKind::Tree,
            Self::Commit(_) => ObjectKind::Commit,
        }
    }

    /// The content bytes, without the canonical header.
    pub fn serialize(&self) -> Vec<u8> {
        match self {
            Self::Blob(blob) => blob.serialize(),
            Self::Tree(tree) => tree.serialize(),
            Self::Commit(commit) => commit.serialize(),
        }
    }

    pub fn deserialize(kind: ObjectKind, content: &[u8]) -> Result<Self> {
        let obj = match kind {
            ObjectKind::Blob => Self::Blob(Blob::deserialize(content)),
            ObjectKind::Tree => Self::Tree(Tree::deserialize(content)?),
            ObjectKind::Commit => Self::Commit(Commit::deserialize(content)?),
        };
        Ok(obj)
    }

    pub fn canonical(&self) -> Vec<u8> {
        codec::encode(self.kind(), &self.serialize())
    }

    pub fn id(&self) -> ObjectId {
        codec::digest(&self.canonical())
    }
}

impl From<Blob> for Object {
    fn from(value: Blob) -> Self {
        Self::Blob(value)
    }
}

impl From<Tree> for Object {
    fn from(value: Tree) -> Self {
        Self::Tree(value)
    }
}

impl From<Commit> for Object {
    fn from(value: Commit) -> Self {
        Self::Commit(value)
    }
}

impl fmt::Display for Object {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Blob(blob) => fmt::Display::fmt(blob, f),
            Self::Tree(tree) => fmt::Display::fmt(tree, f),
            Self::Commit(commit) => fmt::Display::fmt(commit, f),
        }
    }
}

pub(crate) fn zero_position(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|&b| b == b'\0')
}

pub(crate) fn space_position(bytes: &[u8]) -> Option<usize> {
    bytes.iter().position(|&b| b == b' ')
}

#[cfg(test)]
mod tests {
    use super::*;
    use bytes::Bytes;

    #[test]
    fn it_calculates_sha1_hash() {
        let obj = Object::from(Blob::from(Bytes::from_static(b"hello world")));
        let expected = hex::encode(ObjectId::digest(b"blob 11\0hello world").as_bytes());
        assert_eq!(obj.id().hex(), expected);
    }

    #[test]
    fn it_addresses_equal_content_equally() {
        let a = Object::from(Blob::from(b"same bytes".to_vec()));
        let b = Object::from(Blob::from(b"same bytes".to_vec()));
        let c = Object::from(Blob::from(b"diff bytes".to_vec()));
        assert_eq!(a.id(), b.id());
        assert_ne!(a.id(), c.id());
    }

    #[test]
    fn it_dispatches_on_kind() {
        let obj = Object::deserialize(ObjectKind::Blob, b"raw").unwrap();
        assert_eq!(obj.kind(), ObjectKind::Blob);
        assert_eq!(obj.serialize(), b"raw");

        let obj = Object::deserialize(ObjectKind::Tree, b"").unwrap();
        assert_eq!(obj, Object::Tree(Tree::new()));
    }

    #[test]
    fn it_parses_kind_names() {
        assert_eq!("tree".parse::<ObjectKind>().unwrap(), ObjectKind::Tree);
        assert!(matches!(
            "blobby".parse::<ObjectKind>(),
            Err(Error::UnknownObjectType(_))
        ));
    }
}
