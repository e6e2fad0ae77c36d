mod commit;
mod tag;
mod tree;

pub use commit::{Commit, Signature};
pub use tag::Tag;
pub use tree::{FileMode, Tree, TreeEntry};

use std::fmt;
use std::str::FromStr;

use crate::error::Error;

/// the four object kinds
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum Kind {
    Blob,
    Tree,
    Commit,
    Tag,
}

impl Kind {
    /// type tag as written in the object header
    pub fn as_str(&self) -> &'static str {
        match self {
            Kind::Blob => "blob",
            Kind::Tree => "tree",
            Kind::Commit => "commit",
            Kind::Tag => "tag",
        }
    }

}

impl FromStr for Kind {
    type Err = Error;

    /// parse a type tag, failing on anything unrecognized
    fn from_str(s: &str) -> std::result::Result<Self, Error> {
        match s {
            "blob" => Ok(Kind::Blob),
            "tree" => Ok(Kind::Tree),
            "commit" => Ok(Kind::Commit),
            "tag" => Ok(Kind::Tag),
            other => Err(Error::MalformedObject(format!(
                "unknown object type: {other}"
            ))),
        }
    }
}

impl fmt::Display for Kind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// an object in the store - closed tagged union, immutable once written
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Object {
    /// opaque file content
    Blob(Vec<u8>),
    /// sorted directory listing
    Tree(Tree),
    /// snapshot of a tree with ancestry
    Commit(Commit),
    /// annotated tag
    Tag(Tag),
}

impl Object {
    pub fn kind(&self) -> Kind {
        match self {
            Object::Blob(_) => Kind::Blob,
            Object::Tree(_) => Kind::Tree,
            Object::Commit(_) => Kind::Commit,
            Object::Tag(_) => Kind::Tag,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Object::Tree(t) => Some(t),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            Object::Commit(c) => Some(c),
            _ => None,
        }
    }

    pub fn as_tag(&self) -> Option<&Tag> {
        match self {
            Object::Tag(t) => Some(t),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::Hash;

    #[test]
    fn test_kind_tags() {
        for kind in [Kind::Blob, Kind::Tree, Kind::Commit, Kind::Tag] {
            assert_eq!(kind.as_str().parse::<Kind>().unwrap(), kind);
        }
    }

    #[test]
    fn test_kind_unknown_tag() {
        let err = "blub".parse::<Kind>().unwrap_err();
        assert!(matches!(err, Error::MalformedObject(_)));
    }

    #[test]
    fn test_object_kind() {
        assert_eq!(Object::Blob(vec![]).kind(), Kind::Blob);
        assert_eq!(Object::Tree(Tree::empty()).kind(), Kind::Tree);

        let commit = Commit::new(Hash::ZERO, vec![], Signature::new("a", "a@x", 0), "m");
        assert_eq!(Object::Commit(commit).kind(), Kind::Commit);

        let tag = Tag::new(Hash::ZERO, Kind::Commit, "v1", Signature::new("a", "a@x", 0), "m");
        assert_eq!(Object::Tag(tag).kind(), Kind::Tag);
    }

    #[test]
    fn test_object_accessors() {
        let blob = Object::Blob(b"data".to_vec());
        assert!(blob.as_tree().is_none());
        assert!(blob.as_commit().is_none());

        let tree = Object::Tree(Tree::empty());
        assert!(tree.as_tree().is_some());
    }
}
