use crate::hash::Hash;
use crate::types::{Kind, Signature};

/// an annotated tag object
///
/// lightweight tags are plain refs under `refs/tags/` with no backing
/// object; this type only exists for the annotated form.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Tag {
    /// the tagged object
    pub target: Hash,
    /// kind of the tagged object (usually a commit)
    pub kind: Kind,
    /// tag name, e.g. "v1.0"
    pub name: String,
    pub tagger: Signature,
    pub message: String,
}

impl Tag {
    pub fn new(
        target: Hash,
        kind: Kind,
        name: impl Into<String>,
        tagger: Signature,
        message: impl Into<String>,
    ) -> Self {
        Self {
            target,
            kind,
            name: name.into(),
            tagger,
            message: message.into(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tag_new() {
        let tagger = Signature::new("T. Agger", "t@example.com", 1234567890);
        let tag = Tag::new(Hash::ZERO, Kind::Commit, "v1.0", tagger, "first release");

        assert_eq!(tag.target, Hash::ZERO);
        assert_eq!(tag.kind, Kind::Commit);
        assert_eq!(tag.name, "v1.0");
        assert_eq!(tag.message, "first release");
    }
}
