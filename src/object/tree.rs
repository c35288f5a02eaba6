use super::{space_position, zero_position, Error, ObjectId, Result};
use crate::hash::SHA1_HASH_SIZE;
#[cfg(unix)]
use std::os::unix::fs::PermissionsExt;
use std::{cmp::Ordering, collections::BTreeMap, fmt, fs::Metadata, io::Cursor, str::FromStr};

#[derive(Debug, Copy, Clone, PartialEq, Eq)]
pub enum Mode {
    File,
    Executable,
    Directory,
}

impl Mode {
    /// Mode as written into tree and index records.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::File => "100644",
            Self::Executable => "100755",
            Self::Directory => "40000",
        }
    }

    pub fn is_tree(&self) -> bool {
        *self == Self::Directory
    }

    /// Regular files are executable when any execute bit is set.
    pub fn from_metadata(meta: &Metadata) -> Self {
        if is_executable(meta) {
            Self::Executable
        } else {
            Self::File
        }
    }
}

#[cfg(unix)]
fn is_executable(meta: &Metadata) -> bool {
    meta.permissions().mode() & 0o111 != 0
}

#[cfg(not(unix))]
fn is_executable(_meta: &Metadata) -> bool {
    false
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "100644" => Ok(Self::File),
            "100755" => Ok(Self::Executable),
            "40000" | "040000" => Ok(Self::Directory),
            _ => Err(Error::corrupt(format!("unknown mode {s:?}"))),
        }
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A named child of a tree.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeEntry {
    mode: Mode,
    name: String,
    id: ObjectId,
}

impl TreeEntry {
    pub fn new<S: Into<String>>(mode: Mode, name: S, id: ObjectId) -> Result<Self> {
        let name = name.into();
        validate_name(&name)?;
        Ok(Self { mode, name, id })
    }

    pub fn mode(&self) -> Mode {
        self.mode
    }

    pub fn name(&self) -> &str {
        self.name.as_str()
    }

    pub fn id(&self) -> ObjectId {
        self.id
    }

    pub fn serialize(&self) -> Vec<u8> {
        let header = format!("{} {}\0", self.mode, self.name);
        [header.as_bytes(), self.id.as_bytes()].concat()
    }

    /// Parses a single `"<mode> <name>\0<20 bytes>"` record.
    fn parse(buf: &[u8]) -> Result<Self> {
        let zero_pos = zero_position(buf).ok_or(Error::corrupt("tree record has no \\0"))?;
        let header = &buf[..zero_pos];
        let sp_pos = space_position(header).ok_or_else(|| {
            Error::corrupt(format!(
                "tree record header {:?} has no space",
                String::from_utf8_lossy(header)
            ))
        })?;

        let mode = std::str::from_utf8(&header[..sp_pos])
            .map_err(|err| Error::corrupt(format!("tree mode is not utf-8. {err}")))?
            .parse::<Mode>()?;
        let name = std::str::from_utf8(&header[(sp_pos + 1)..])
            .map_err(|err| Error::corrupt(format!("tree entry name is not utf-8. {err}")))?;
        let id = ObjectId::try_from(&buf[(zero_pos + 1)..])?;

        Self::new(mode, name, id).map_err(|err| Error::corrupt(err.to_string()))
    }
}

impl PartialOrd for TreeEntry {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for TreeEntry {
    fn cmp(&self, other: &Self) -> Ordering {
        self.name.as_bytes().cmp(other.name.as_bytes())
    }
}

impl fmt::Display for TreeEntry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{:0>6} {} {}\t{}",
            self.mode.as_str(),
            if self.mode.is_tree() { "tree" } else { "blob" },
            self.id.hex(),
            self.name,
        )
    }
}

fn validate_name(name: &str) -> Result<()> {
    if name.is_empty() || name == "." || name == ".." {
        return Err(Error::InvalidPath(format!("{name:?} is not a valid entry name")));
    }
    if name.contains(['/', '\0']) {
        return Err(Error::InvalidPath(format!(
            "entry name {name:?} contains a separator"
        )));
    }
    Ok(())
}

/// A directory listing. Entries are unique by name and kept in byte-wise
/// name order, so serialization does not depend on insertion order.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    entries: BTreeMap<Vec<u8>, TreeEntry>,
}

impl Tree {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts `entry`, returning the entry it replaced, if any.
    pub fn add(&mut self, entry: TreeEntry) -> Option<TreeEntry> {
        self.entries.insert(entry.name.as_bytes().to_vec(), entry)
    }

    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries.get(name.as_bytes())
    }

    pub fn entries(&self) -> impl Iterator<Item = &TreeEntry> {
        self.entries.values()
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn serialize(&self) -> Vec<u8> {
        self.entries().flat_map(TreeEntry::serialize).collect()
    }

    pub fn deserialize(content: &[u8]) -> Result<Self> {
        let mut tree = Self::new();
        for entry in TreeRecords::new(content) {
            if let Some(dup) = tree.add(entry?) {
                return Err(Error::corrupt(format!(
                    "duplicate tree entry {:?}",
                    dup.name()
                )));
            }
        }
        Ok(tree)
    }
}

impl FromIterator<TreeEntry> for Tree {
    fn from_iter<I: IntoIterator<Item = TreeEntry>>(iter: I) -> Self {
        let mut tree = Self::new();
        for entry in iter {
            tree.add(entry);
        }
        tree
    }
}

impl fmt::Display for Tree {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for entry in self.entries() {
            writeln!(f, "{entry}")?;
        }
        Ok(())
    }
}

/// Walks the records of a serialized tree.
#[derive(Debug)]
pub struct TreeRecords<'a> {
    cursor: Cursor<&'a [u8]>,
}

impl<'a> TreeRecords<'a> {
    pub fn new(bytes: &'a [u8]) -> Self {
        Self {
            cursor: Cursor::new(bytes),
        }
    }
}

impl<'a> Iterator for TreeRecords<'a> {
    type Item = Result<TreeEntry>;

    fn next(&mut self) -> Option<Self::Item> {
        let current = self.cursor.position() as usize;
        let bytes: &'a [u8] = *self.cursor.get_ref();
        let rest = &bytes[current..];
        if rest.is_empty() {
            return None;
        }

        // Any failure ends the walk; the remaining bytes cannot be re-synced.
        let end = bytes.len() as u64;
        let Some(zero_pos) = zero_position(rest) else {
            self.cursor.set_position(end);
            return Some(Err(Error::corrupt("tree record has no \\0")));
        };
        let record_size = zero_pos + 1 + SHA1_HASH_SIZE;
        if rest.len() < record_size {
            self.cursor.set_position(end);
            return Some(Err(Error::corrupt(format!(
                "tree record truncated: need {SHA1_HASH_SIZE} id bytes, have {}",
                rest.len() - zero_pos - 1
            ))));
        }

        self.cursor.set_position((current + record_size) as u64);
        let parsed = TreeEntry::parse(&rest[..record_size]);
        if parsed.is_err() {
            self.cursor.set_position(end);
        }
        Some(parsed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn id(byte: u8) -> ObjectId {
        [byte; SHA1_HASH_SIZE].into()
    }

    #[test]
    fn it_creates_file_entry() {
        let bytes = b"100644 file1\x0011111111111111111111";
        let entry = TreeEntry::parse(bytes).unwrap();
        let expected = TreeEntry {
            mode: Mode::File,
            name: "file1".into(),
            id: id(b'1'),
        };
        assert_eq!(entry, expected);
    }

    #[test]
    fn it_creates_dir_entry() {
        let bytes = b"40000 dir1\x0099999999999999999999";
        let entry = TreeEntry::parse(bytes).unwrap();
        assert_eq!(entry.mode(), Mode::Directory);
        assert_eq!(entry.name(), "dir1");
        assert_eq!(entry.id(), id(b'9'));
    }

    #[test]
    fn it_generates_entries_from_tree_records() {
        let bytes = b"100644 file1\x001111111111111111111140000 dir1\x0099999999999999999999";
        let mut records = TreeRecords::new(bytes);

        let entry = records.next().unwrap().unwrap();
        assert_eq!(entry.name(), "file1");

        let entry = records.next().unwrap().unwrap();
        assert_eq!(entry.name(), "dir1");
        assert_eq!(entry.mode(), Mode::Directory);

        assert!(records.next().is_none());
    }

    #[test]
    fn it_serializes_sorted_by_name() {
        let mut tree = Tree::new();
        tree.add(TreeEntry::new(Mode::File, "b.txt", id(2)).unwrap());
        tree.add(TreeEntry::new(Mode::Directory, "a", id(1)).unwrap());

        let mut expected = b"40000 a\0".to_vec();
        expected.extend_from_slice(&[1; SHA1_HASH_SIZE]);
        expected.extend_from_slice(b"100644 b.txt\0");
        expected.extend_from_slice(&[2; SHA1_HASH_SIZE]);
        assert_eq!(tree.serialize(), expected);
    }

    #[test]
    fn it_is_independent_of_insertion_order() {
        let entries = vec![
            TreeEntry::new(Mode::File, "zeta", id(3)).unwrap(),
            TreeEntry::new(Mode::Executable, "alpha", id(1)).unwrap(),
            TreeEntry::new(Mode::Directory, "Mid", id(2)).unwrap(),
        ];
        let forward: Tree = entries.iter().cloned().collect();
        let backward: Tree = entries.into_iter().rev().collect();
        assert_eq!(forward.serialize(), backward.serialize());

        // Byte-wise order puts upper case first.
        let names: Vec<&str> = forward.entries().map(TreeEntry::name).collect();
        assert_eq!(names, vec!["Mid", "alpha", "zeta"]);
    }

    #[test]
    fn it_replaces_entries_with_the_same_name() {
        let mut tree = Tree::new();
        tree.add(TreeEntry::new(Mode::File, "x", id(1)).unwrap());
        let old = tree.add(TreeEntry::new(Mode::File, "x", id(2)).unwrap());
        assert_eq!(old.map(|e| e.id()), Some(id(1)));
        assert_eq!(tree.len(), 1);
        assert_eq!(tree.get("x").map(TreeEntry::id), Some(id(2)));
    }

    #[test]
    fn it_round_trips_through_bytes() {
        let tree: Tree = [
            TreeEntry::new(Mode::File, "a.txt", id(4)).unwrap(),
            TreeEntry::new(Mode::Directory, "src", id(5)).unwrap(),
        ]
        .into_iter()
        .collect();
        assert_eq!(Tree::deserialize(&tree.serialize()).unwrap(), tree);
    }

    #[test]
    fn it_rejects_names_with_separators() {
        assert!(matches!(
            TreeEntry::new(Mode::File, "a/b", id(1)),
            Err(Error::InvalidPath(_))
        ));
        assert!(TreeEntry::new(Mode::File, "", id(1)).is_err());
        assert!(TreeEntry::new(Mode::File, "..", id(1)).is_err());
    }

    #[test]
    fn it_fails_on_missing_nul() {
        assert!(matches!(
            Tree::deserialize(b"100644 file1"),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn it_fails_on_truncated_id() {
        assert!(matches!(
            Tree::deserialize(b"100644 file1\x00111"),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn it_fails_on_partial_trailing_record() {
        let mut bytes = b"100644 file1\x0011111111111111111111".to_vec();
        bytes.extend_from_slice(b"100644 fi");
        assert!(matches!(
            Tree::deserialize(&bytes),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn it_fails_on_header_without_space() {
        assert!(matches!(
            Tree::deserialize(b"100644file1\x0011111111111111111111"),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn it_fails_on_unknown_mode() {
        assert!(matches!(
            Tree::deserialize(b"120000 link\x0011111111111111111111"),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn it_accepts_only_exact_mode_strings() {
        assert_eq!("040000".parse::<Mode>().unwrap(), Mode::Directory);
        assert_eq!("40000".parse::<Mode>().unwrap(), Mode::Directory);
        for bad in ["+100644", "0100644", "0040000", "100644 "] {
            assert!(bad.parse::<Mode>().is_err(), "{bad:?}");
        }
    }

    #[test]
    fn it_fails_on_duplicate_names() {
        let mut bytes = b"100644 same\x00".to_vec();
        bytes.extend_from_slice(&[1; 20]);
        bytes.extend_from_slice(b"100644 same\x00");
        bytes.extend_from_slice(&[2; 20]);
        assert!(matches!(
            Tree::deserialize(&bytes),
            Err(Error::CorruptObject(_))
        ));
    }

    #[test]
    fn it_prints_like_ls_tree() {
        let entry = TreeEntry::new(Mode::Directory, "src", id(0xab)).unwrap();
        assert_eq!(
            entry.to_string(),
            format!("040000 tree {}\tsrc", "ab".repeat(20))
        );
    }
}
