use std::fmt;

use crate::error::{Error, Result};
use crate::hash::Hash;

/// file-permission-and-type tag carried by a tree entry
///
/// the recognized values follow the classic unix mode constants:
///
/// * `0o100644` - regular file
/// * `0o100755` - executable file
/// * `0o120000` - symbolic link
/// * `0o040000` - subdirectory (entry target is a tree)
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum FileMode {
    Regular,
    Executable,
    Symlink,
    Directory,
}

impl FileMode {
    /// convert from a mode integer, failing on anything unrecognized
    pub fn from_mode(value: u32) -> Option<FileMode> {
        match value {
            0o100644 => Some(FileMode::Regular),
            0o100755 => Some(FileMode::Executable),
            0o120000 => Some(FileMode::Symlink),
            0o040000 => Some(FileMode::Directory),
            _ => None,
        }
    }

    /// convert to the mode integer
    pub fn as_u32(self) -> u32 {
        match self {
            FileMode::Regular => 0o100644,
            FileMode::Executable => 0o100755,
            FileMode::Symlink => 0o120000,
            FileMode::Directory => 0o040000,
        }
    }

    /// does this entry point at a tree
    pub fn is_tree(self) -> bool {
        matches!(self, FileMode::Directory)
    }
}

impl fmt::Display for FileMode {
    /// octal form without leading zero, as encoded in tree objects
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:o}", self.as_u32())
    }
}

/// a single entry in a tree
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct TreeEntry {
    pub mode: FileMode,
    pub name: String,
    pub target: Hash,
}

impl TreeEntry {
    pub fn new(mode: FileMode, name: impl Into<String>, target: Hash) -> Self {
        Self {
            mode,
            name: name.into(),
            target,
        }
    }
}

/// a directory listing - entries sorted byte-wise by name
///
/// the sort order is part of the canonical form: two trees with the same
/// entry set serialize identically regardless of insertion order.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tree {
    entries: Vec<TreeEntry>,
}

impl Tree {
    /// create a new tree, validating and sorting entries
    pub fn new(mut entries: Vec<TreeEntry>) -> Result<Self> {
        for entry in &entries {
            validate_entry_name(&entry.name)?;
        }

        // sort by name (byte-wise)
        entries.sort_by(|a, b| a.name.as_bytes().cmp(b.name.as_bytes()));

        for window in entries.windows(2) {
            if window[0].name == window[1].name {
                return Err(Error::MalformedObject(format!(
                    "duplicate tree entry name: {}",
                    window[0].name
                )));
            }
        }

        Ok(Self { entries })
    }

    /// create an empty tree
    pub fn empty() -> Self {
        Self { entries: vec![] }
    }

    /// get entries slice
    pub fn entries(&self) -> &[TreeEntry] {
        &self.entries
    }

    /// consume and return entries
    pub fn into_entries(self) -> Vec<TreeEntry> {
        self.entries
    }

    /// look up entry by name
    pub fn get(&self, name: &str) -> Option<&TreeEntry> {
        self.entries
            .binary_search_by(|e| e.name.as_bytes().cmp(name.as_bytes()))
            .ok()
            .map(|i| &self.entries[i])
    }

    /// number of entries
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// is tree empty
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

/// validate an entry name
fn validate_entry_name(name: &str) -> Result<()> {
    if name.is_empty() {
        return Err(Error::MalformedObject("empty tree entry name".to_string()));
    }
    if name.contains('/') {
        return Err(Error::MalformedObject(format!(
            "tree entry name contains '/': {name}"
        )));
    }
    if name.contains('\0') {
        return Err(Error::MalformedObject(format!(
            "tree entry name contains null byte: {name}"
        )));
    }
    if name == "." || name == ".." {
        return Err(Error::MalformedObject(format!(
            "reserved tree entry name: {name}"
        )));
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tree_sorts_entries() {
        let tree = Tree::new(vec![
            TreeEntry::new(FileMode::Regular, "zebra", Hash::ZERO),
            TreeEntry::new(FileMode::Regular, "apple", Hash::ZERO),
            TreeEntry::new(FileMode::Directory, "mango", Hash::ZERO),
        ])
        .unwrap();

        let names: Vec<_> = tree.entries().iter().map(|e| e.name.as_str()).collect();
        assert_eq!(names, vec!["apple", "mango", "zebra"]);
    }

    #[test]
    fn test_tree_byte_wise_order() {
        // uppercase sorts before lowercase in byte order
        let tree = Tree::new(vec![
            TreeEntry::new(FileMode::Regular, "a", Hash::ZERO),
            TreeEntry::new(FileMode::Regular, "B", Hash::ZERO),
        ])
        .unwrap();

        assert_eq!(tree.entries()[0].name, "B");
    }

    #[test]
    fn test_tree_get() {
        let tree = Tree::new(vec![
            TreeEntry::new(FileMode::Regular, "file.txt", Hash::ZERO),
            TreeEntry::new(FileMode::Directory, "subdir", Hash::ZERO),
        ])
        .unwrap();

        assert!(tree.get("file.txt").is_some());
        assert!(tree.get("subdir").unwrap().mode.is_tree());
        assert!(tree.get("missing").is_none());
    }

    #[test]
    fn test_tree_duplicate_name() {
        let result = Tree::new(vec![
            TreeEntry::new(FileMode::Regular, "twice", Hash::ZERO),
            TreeEntry::new(FileMode::Directory, "twice", Hash::ZERO),
        ]);
        assert!(matches!(result, Err(Error::MalformedObject(_))));
    }

    #[test]
    fn test_invalid_entry_names() {
        assert!(validate_entry_name("").is_err());
        assert!(validate_entry_name("a/b").is_err());
        assert!(validate_entry_name("nul\0byte").is_err());
        assert!(validate_entry_name(".").is_err());
        assert!(validate_entry_name("..").is_err());

        assert!(validate_entry_name("plain").is_ok());
        assert!(validate_entry_name(".hidden").is_ok());
    }

    #[test]
    fn test_file_mode_roundtrip() {
        for mode in [
            FileMode::Regular,
            FileMode::Executable,
            FileMode::Symlink,
            FileMode::Directory,
        ] {
            assert_eq!(FileMode::from_mode(mode.as_u32()), Some(mode));
        }
        assert_eq!(FileMode::from_mode(0o160000), None);
        assert_eq!(FileMode::from_mode(0), None);
    }

    #[test]
    fn test_file_mode_octal_display() {
        assert_eq!(FileMode::Regular.to_string(), "100644");
        assert_eq!(FileMode::Directory.to_string(), "40000");
    }

    #[test]
    fn test_empty_tree() {
        let tree = Tree::empty();
        assert!(tree.is_empty());
        assert_eq!(tree.len(), 0);
    }
}
